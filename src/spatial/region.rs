//! Paddock boundary and containment test
//!
//! The boundary is a simple polygon over (latitude, longitude) vertices.
//! Containment uses a ray-casting parity test with latitude as the
//! ordinate axis; downstream paddock definitions were authored against
//! this convention, so it must not be swapped back to the textbook form.

use crate::core::config::RegionConfig;
use crate::core::error::{Result, SimError};

/// A geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Polygonal containment region, immutable for the run's lifetime
#[derive(Debug, Clone)]
pub struct Region {
    vertices: Vec<GeoPoint>,
}

impl Region {
    /// Build a region from an ordered vertex list
    ///
    /// Rejects degenerate boundaries: fewer than 3 vertices, or a
    /// zero-length edge (consecutive duplicate vertices, wrapping
    /// last to first).
    pub fn new(vertices: Vec<GeoPoint>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(SimError::Config(format!(
                "region needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        for i in 0..vertices.len() {
            let j = (i + 1) % vertices.len();
            if vertices[i] == vertices[j] {
                return Err(SimError::Config(format!(
                    "region has a zero-length edge at vertex {}",
                    i
                )));
            }
        }
        Ok(Self { vertices })
    }

    pub fn from_config(config: &RegionConfig) -> Result<Self> {
        Self::new(
            config
                .vertices
                .iter()
                .map(|v| GeoPoint::new(v.lat, v.lng))
                .collect(),
        )
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }

    /// True iff the point lies inside the boundary polygon
    ///
    /// Each edge whose longitude span straddles the point's longitude
    /// toggles the parity flag when the point's latitude is below the
    /// edge's interpolated latitude at that longitude. Points exactly on
    /// an edge take whichever branch floating-point comparison yields.
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        let mut inside = false;
        let n = self.vertices.len();

        for i in 0..n {
            let j = (i + 1) % n;
            let a = self.vertices[i];
            let b = self.vertices[j];

            if (a.lng > lng) != (b.lng > lng)
                && lat < (b.lat - a.lat) * (lng - a.lng) / (b.lng - a.lng) + a.lat
            {
                inside = !inside;
            }
        }

        inside
    }
}
