//! Horizontal-plane geometry and surface interpolation.

mod core;
mod field;
mod grid;
mod mesh;
mod triangulation;

pub use core::{BBox2, Point2, Tolerance, orient2d};
pub use field::{Coverage, ElevationField, ElevationSample, InsufficientDataError};
pub use grid::{MAX_GRID_RESOLUTION, resample_grid};
pub use mesh::SurfaceMesh;
pub use triangulation::TriangulatedField;

#[cfg(test)]
mod tests;
