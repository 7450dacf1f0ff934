//! Geometry helpers: bearings, haversine distances, compass names

/// Geographic coordinate as `[lon, lat]` in degrees
pub type Point = [f64; 2];

/// Great-circle distance between two points in meters
#[allow(deprecated)]
pub fn distance(a: Point, b: Point) -> f64 {
    use geo::HaversineDistance;

    let p1 = geo::Point::new(a[0], a[1]);
    let p2 = geo::Point::new(b[0], b[1]);
    p1.haversine_distance(&p2)
}

/// Initial bearing from `a` to `b` in degrees, normalized to [0, 360)
pub fn bearing(a: Point, b: Point) -> f64 {
    let lat1 = a[1].to_radians();
    let lat2 = b[1].to_radians();
    let delta_lon = (b[0] - a[0]).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();
    normalize_bearing(y.atan2(x).to_degrees())
}

/// Wrap any angle into [0, 360)
pub fn normalize_bearing(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed change of heading from `before` to `after`, in (-180, 180].
///
/// Positive values turn right (clockwise), negative values turn left.
pub fn bearing_delta(before: f64, after: f64) -> f64 {
    let mut delta = after - before;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta <= -180.0 {
        delta += 360.0;
    }
    delta
}

/// 8-way compass name for a bearing
pub fn cardinal(deg: f64) -> &'static str {
    let deg = normalize_bearing(deg);
    match deg {
        d if d < 22.5 => "north",
        d if d < 67.5 => "northeast",
        d if d < 112.5 => "east",
        d if d < 157.5 => "southeast",
        d if d < 202.5 => "south",
        d if d < 247.5 => "southwest",
        d if d < 292.5 => "west",
        d if d < 337.5 => "northwest",
        _ => "north",
    }
}

/// Human-readable length: "1.25 km" from 1000 m up, whole meters below.
///
/// The switch happens on the rounded value, so 999.6 m reads "1.00 km".
pub fn format_distance(meters: f64) -> String {
    if meters.round() >= 1000.0 {
        format!("{:.2} km", meters / 1000.0)
    } else {
        format!("{:.0} meters", meters)
    }
}

/// True if both coordinates are finite and within lon/lat ranges
pub fn is_valid_point(p: Point) -> bool {
    p[0].is_finite() && p[1].is_finite() && p[0].abs() <= 180.0 && p[1].abs() <= 90.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_bearing_cardinal_axes() {
        let origin = [0.0, 0.0];
        assert_abs_diff_eq!(bearing(origin, [0.0, 0.01]), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(bearing(origin, [0.01, 0.0]), 90.0, epsilon = 1e-6);
        assert_abs_diff_eq!(bearing(origin, [0.0, -0.01]), 180.0, epsilon = 1e-6);
        assert_abs_diff_eq!(bearing(origin, [-0.01, 0.0]), 270.0, epsilon = 1e-6);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        // One degree of latitude is ~111.2 km on the mean-radius sphere
        let d = distance([0.0, 0.0], [0.0, 1.0]);
        assert_abs_diff_eq!(d, 111_195.0, epsilon = 10.0);
    }

    #[test]
    fn test_bearing_delta_wraps() {
        assert_eq!(bearing_delta(350.0, 10.0), 20.0);
        assert_eq!(bearing_delta(10.0, 350.0), -20.0);
        assert_eq!(bearing_delta(90.0, 136.0), 46.0);
        assert_eq!(bearing_delta(136.0, 90.0), -46.0);
        // Exactly opposite headings resolve to +180
        assert_eq!(bearing_delta(0.0, 180.0), 180.0);
        assert_eq!(bearing_delta(180.0, 0.0), 180.0);
    }

    #[test]
    fn test_cardinal_boundaries() {
        assert_eq!(cardinal(0.0), "north");
        assert_eq!(cardinal(22.4), "north");
        assert_eq!(cardinal(22.5), "northeast");
        assert_eq!(cardinal(90.0), "east");
        assert_eq!(cardinal(180.0), "south");
        assert_eq!(cardinal(225.0), "southwest");
        assert_eq!(cardinal(270.0), "west");
        assert_eq!(cardinal(337.4), "northwest");
        assert_eq!(cardinal(337.5), "north");
        assert_eq!(cardinal(-45.0), "northwest");
        assert_eq!(cardinal(405.0), "northeast");
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.0), "0 meters");
        assert_eq!(format_distance(123.4), "123 meters");
        assert_eq!(format_distance(999.4), "999 meters");
        assert_eq!(format_distance(1000.0), "1.00 km");
        assert_eq!(format_distance(999.5), "1.00 km");
        assert_eq!(format_distance(999.99), "1.00 km");
        assert_eq!(format_distance(2346.0), "2.35 km");
    }

    #[test]
    fn test_is_valid_point() {
        assert!(is_valid_point([-100.38, 47.13]));
        assert!(!is_valid_point([f64::NAN, 47.0]));
        assert!(!is_valid_point([200.0, 47.0]));
        assert!(!is_valid_point([0.0, 91.0]));
    }
}
