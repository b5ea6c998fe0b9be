use thiserror::Error;

use super::{BBox2, Point2, SurfaceMesh};

/// Whether a query fell inside the interpolated region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// Inside the fitted surface; the value is interpolated.
    Inside,
    /// Outside the fitted surface; the value comes from the field's
    /// extrapolation rule and carries reduced confidence.
    Extrapolated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationSample {
    pub elevation: f64,
    pub coverage: Coverage,
}

impl ElevationSample {
    #[must_use]
    pub fn is_inside(&self) -> bool {
        self.coverage == Coverage::Inside
    }
}

/// The surface could not be fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("at least 3 non-collinear surface points are required, found {usable} usable point(s)")]
pub struct InsufficientDataError {
    pub usable: usize,
}

/// Continuous ground elevation over the (easting, northing) plane.
///
/// Implementations must interpolate input samples exactly, be deterministic
/// for a fixed input, and answer every query: points outside the fitted
/// region are resolved by a documented extrapolation rule and flagged with
/// [`Coverage::Extrapolated`].
pub trait ElevationField: Send + Sync {
    fn sample(&self, at: Point2) -> ElevationSample;

    fn elevation_at(&self, easting: f64, northing: f64) -> f64 {
        self.sample(Point2::new(easting, northing)).elevation
    }

    fn covers(&self, at: Point2) -> bool {
        self.sample(at).is_inside()
    }

    /// Renderable mesh over the covered region, in world coordinates.
    fn mesh(&self) -> SurfaceMesh;

    /// Horizontal extent of the input samples.
    fn bounds(&self) -> BBox2;
}
