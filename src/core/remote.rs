//! Remote directions on public roads
//!
//! The routing machine only needs [`RemoteDirections`]; [`MapboxDirections`]
//! implements it against the Mapbox Directions v5 HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use serde_json::Value;

use crate::core::error::{Error, Result};
use crate::core::geo::Point;
use crate::core::options::RemoteApiConfig;

/// Shared HTTP client for directions requests
static GLOBAL_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .tcp_keepalive(Duration::from_secs(60))
        .pool_idle_timeout(Duration::from_secs(90))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(format!("butterfly-directions/{}", env!("BUTTERFLY_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Travel profile requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    #[default]
    Driving,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Driving => "driving",
        }
    }
}

/// Route returned by a remote provider
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRoute {
    pub geometry: Vec<Point>,
    /// Provider-native maneuvers, passed through untouched
    pub maneuvers: Vec<Value>,
}

/// Capability the routing machine needs from a public-road directions service
#[async_trait]
pub trait RemoteDirections: Send + Sync {
    /// Route through `waypoints` in order
    async fn route(&self, waypoints: &[Point], profile: Profile) -> Result<RemoteRoute>;
}

/// Mapbox Directions API client
pub struct MapboxDirections {
    client: Client,
    config: RemoteApiConfig,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<ResponseRoute>,
}

#[derive(Debug, Deserialize)]
struct ResponseRoute {
    geometry: ResponseGeometry,
    #[serde(default)]
    legs: Vec<ResponseLeg>,
}

#[derive(Debug, Deserialize)]
struct ResponseGeometry {
    coordinates: Vec<Point>,
}

#[derive(Debug, Deserialize)]
struct ResponseLeg {
    #[serde(default)]
    steps: Vec<ResponseStep>,
}

#[derive(Debug, Deserialize)]
struct ResponseStep {
    maneuver: Value,
}

impl MapboxDirections {
    /// Create a client using the shared connection pool
    pub fn new(config: RemoteApiConfig) -> Self {
        Self {
            client: GLOBAL_CLIENT.clone(),
            config,
        }
    }

    /// Create a client with a caller-provided `reqwest::Client`
    pub fn with_client(client: Client, config: RemoteApiConfig) -> Self {
        Self { client, config }
    }

    /// Request URL for a set of waypoints, without the access token
    fn request_url(&self, waypoints: &[Point], profile: Profile) -> String {
        let coordinates = waypoints
            .iter()
            .map(|p| format!("{},{}", p[0], p[1]))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/directions/v5/mapbox/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            profile.as_str(),
            coordinates
        )
    }
}

#[async_trait]
impl RemoteDirections for MapboxDirections {
    async fn route(&self, waypoints: &[Point], profile: Profile) -> Result<RemoteRoute> {
        if waypoints.len() < 2 {
            return Err(Error::InvalidInput(format!(
                "a remote route needs at least two waypoints, got {}",
                waypoints.len()
            )));
        }

        let url = self.request_url(waypoints, profile);
        debug!("Requesting remote directions: {url}");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("geometries", "geojson"),
                ("steps", "true"),
                ("overview", "full"),
                ("access_token", self.config.access_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("Directions provider answered {status}");
            return Err(Error::adapter(status.as_u16(), body));
        }

        let parsed: DirectionsResponse = serde_json::from_str(&body)
            .map_err(|e| Error::adapter(status.as_u16(), format!("unreadable response ({e}): {body}")))?;

        let route = match parsed.routes.into_iter().next() {
            Some(route) => route,
            None => return Err(Error::adapter(status.as_u16(), body)),
        };

        let maneuvers = route
            .legs
            .into_iter()
            .flat_map(|leg| leg.steps)
            .map(|step| step.maneuver)
            .collect();

        Ok(RemoteRoute {
            geometry: route.geometry.coordinates,
            maneuvers,
        })
    }
}
