//! Row types extracted from the three input tables.
//!
//! All of them are plain values: a render takes an immutable snapshot of the
//! tables and never mutates it.

use serde::{Deserialize, Serialize};

use crate::geom::Point2;

/// One scattered ground-surface sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    pub easting: f64,
    pub northing: f64,
    pub elevation: f64,
}

impl SurfacePoint {
    #[must_use]
    pub const fn new(easting: f64, northing: f64, elevation: f64) -> Self {
        Self {
            easting,
            northing,
            elevation,
        }
    }

    #[must_use]
    pub const fn position(&self) -> Point2 {
        Point2::new(self.easting, self.northing)
    }
}

/// A borehole collar location. `id` is the join key into the layer table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borehole {
    pub id: String,
    pub easting: f64,
    pub northing: f64,
}

impl Borehole {
    #[must_use]
    pub fn new(id: impl Into<String>, easting: f64, northing: f64) -> Self {
        Self {
            id: id.into(),
            easting,
            northing,
        }
    }

    #[must_use]
    pub const fn position(&self) -> Point2 {
        Point2::new(self.easting, self.northing)
    }
}

/// One stratigraphy interval. Depths are positive-down from the borehole's
/// own ground level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub borehole_id: String,
    pub from_depth: f64,
    pub to_depth: f64,
    pub soil_type: String,
}

impl Layer {
    #[must_use]
    pub fn new(
        borehole_id: impl Into<String>,
        from_depth: f64,
        to_depth: f64,
        soil_type: impl Into<String>,
    ) -> Self {
        Self {
            borehole_id: borehole_id.into(),
            from_depth,
            to_depth,
            soil_type: soil_type.into(),
        }
    }

    /// `TO > FROM` and neither depth is negative.
    #[must_use]
    pub fn is_valid_interval(&self) -> bool {
        self.from_depth >= 0.0 && self.to_depth > self.from_depth
    }
}

#[cfg(test)]
mod tests {
    use super::Layer;

    #[test]
    fn interval_validity() {
        assert!(Layer::new("BH-01", 0.0, 2.5, "SM").is_valid_interval());
        assert!(!Layer::new("BH-01", 2.5, 2.5, "SM").is_valid_interval());
        assert!(!Layer::new("BH-01", 3.0, 2.0, "SM").is_valid_interval());
        assert!(!Layer::new("BH-01", -1.0, 2.0, "SM").is_valid_interval());
    }
}
