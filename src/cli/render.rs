//! Terminal rendering of a route's instruction list

use butterfly_directions::{RouteResult, RouteStep};

/// Glyph shown in front of an instruction
pub fn glyph(step: &RouteStep) -> &'static str {
    let modifier = step.modifier();
    match (step.kind(), modifier.as_deref()) {
        (Some("turn"), Some("left")) => "↰",
        (Some("turn"), Some("right")) => "↱",
        (Some("stop"), _) => "✋",
        _ => "↑",
    }
}

/// One line per maneuver: glyph followed by the instruction
pub fn instruction_lines(route: &RouteResult) -> Vec<String> {
    route
        .maneuvers
        .iter()
        .map(|step| format!("{} {}", glyph(step), step.instruction().unwrap_or("(no instruction)")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use butterfly_directions::ManeuverTemplate;
    use serde_json::json;

    #[test]
    fn test_glyphs() {
        let left = RouteStep::Provider(json!({"type": "turn", "modifier": "left", "instruction": "Turn left"}));
        let right = RouteStep::Provider(json!({"type": "turn", "modifier": "right", "instruction": "Turn right"}));
        let slight = RouteStep::Provider(json!({"type": "turn", "modifier": "slight right"}));
        let stop = RouteStep::Local(ManeuverTemplate::stop("Check in").at([0.0, 0.0]));

        assert_eq!(glyph(&left), "↰");
        assert_eq!(glyph(&right), "↱");
        assert_eq!(glyph(&slight), "↑");
        assert_eq!(glyph(&stop), "✋");
    }

    #[test]
    fn test_instruction_lines() {
        let route = RouteResult {
            geometry: vec![],
            maneuvers: vec![
                RouteStep::Local(ManeuverTemplate::stop("Check out at the security gate.").at([0.0, 0.0])),
                RouteStep::Provider(json!({"type": "arrive"})),
            ],
        };

        assert_eq!(
            instruction_lines(&route),
            vec![
                "✋ Check out at the security gate.".to_string(),
                "↑ (no instruction)".to_string(),
            ]
        );
    }
}
