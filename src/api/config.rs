//! Purpose: Transport configuration for the campus-history client.
//! Exports: `ClientConfig`, `Endpoints`, and default constants.
//! Role: Keeps base URL, endpoint paths and timeouts out of the decoder.
//! Invariants: Endpoint paths are relative and resolve under the base URL.
//! Invariants: Defaults are a 2 s timeout, a 0.1 memory radius and 100 m fence queries.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_MEMORY_RADIUS: f64 = 0.1;
pub const DEFAULT_GEOFENCE_RADIUS: i64 = 100;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Endpoints {
    pub historical_info: String,
    pub memories_info: String,
    pub add_memory: String,
    pub geofences: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            historical_info: "info".to_string(),
            memories_info: "memories".to_string(),
            add_memory: "addMemory".to_string(),
            geofences: "geofences".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub endpoints: Endpoints,
    pub timeout: Duration,
    /// Search radius sent with memory queries, in the backend's units.
    pub memory_radius: f64,
    /// Search radius sent with geofence queries, in meters.
    pub geofence_radius: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoints: Endpoints::default(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            memory_radius: DEFAULT_MEMORY_RADIUS,
            geofence_radius: DEFAULT_GEOFENCE_RADIUS,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_memory_radius(mut self, radius: f64) -> Self {
        self.memory_radius = radius;
        self
    }

    pub fn with_geofence_radius(mut self, radius: i64) -> Self {
        self.geofence_radius = radius;
        self
    }
}
