//! Geographical positions.

use crate::entity::Entity;

/// A latitude/longitude pair in decimal degrees on some stellar body.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// The body the coordinate refers to, e.g. Earth (`Q2`).
    pub globe: Entity,
    pub precision: f64,
}

impl GlobeCoordinate {
    pub fn new(latitude: f64, longitude: f64, globe: Entity, precision: f64) -> Self {
        Self {
            latitude,
            longitude,
            globe,
            precision,
        }
    }
}
