//! Purpose: Great-circle distance and geofence containment on a spherical earth.
//! Exports: `Coordinate`, `distance_meters`, `EARTH_RADIUS_METERS`.
//! Role: Pure math used by geofence records and the `distance` command.
//! Invariants: Distances are in meters on a sphere of radius 6378137 m.
//! Invariants: Inputs are degrees; no normalization or validation is applied.

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_meters(*self, *other)
    }
}

/// Haversine distance between two coordinates, in meters.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let phi_a = a.latitude.to_radians();
    let phi_b = b.latitude.to_radians();
    let delta_phi = (a.latitude - b.latitude).to_radians();
    let delta_lambda = (a.longitude - b.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (delta_lambda / 2.0).sin().powi(2);
    2.0 * h.sqrt().atan2((1.0 - h).sqrt()) * EARTH_RADIUS_METERS
}
