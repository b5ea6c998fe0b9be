//! Delaunay-backed elevation field.
//!
//! The (easting, northing) projections of the samples are triangulated with
//! `delaunator` and elevation is interpolated linearly inside each triangle.
//! Queries outside the convex hull return the elevation of the nearest input
//! sample and are reported as [`Coverage::Extrapolated`].

use super::core::orient2d;
use super::field::{Coverage, ElevationField, ElevationSample, InsufficientDataError};
use super::{BBox2, Point2, SurfaceMesh, Tolerance};
use crate::model::SurfacePoint;

/// Barycentric weights may dip this far below zero and still count as inside.
const BARYCENTRIC_EPS: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct TriangulatedField {
    /// Local frame origin (minimum corner of the samples).
    origin: Point2,
    /// Sample positions relative to `origin`.
    local: Vec<Point2>,
    elevations: Vec<f64>,
    triangles: Vec<[usize; 3]>,
    triangle_bounds: Vec<BBox2>,
    bounds: BBox2,
    bbox_eps: f64,
}

impl TriangulatedField {
    /// Triangulate the samples. Non-finite samples are ignored.
    pub fn build(points: &[SurfacePoint]) -> Result<Self, InsufficientDataError> {
        let usable: Vec<SurfacePoint> = points
            .iter()
            .copied()
            .filter(|p| p.position().is_finite() && p.elevation.is_finite())
            .collect();

        let Some(bounds) = BBox2::from_points(usable.iter().map(SurfacePoint::position)) else {
            return Err(InsufficientDataError { usable: 0 });
        };
        if usable.len() < 3 {
            return Err(InsufficientDataError {
                usable: usable.len(),
            });
        }

        // Large survey coordinates lose precision in the orientation tests,
        // so everything below runs relative to the minimum corner.
        let origin = bounds.min;
        let local: Vec<Point2> = usable.iter().map(|p| p.position() - origin).collect();
        let elevations: Vec<f64> = usable.iter().map(|p| p.elevation).collect();

        let delaunator_points: Vec<delaunator::Point> = local
            .iter()
            .map(|p| delaunator::Point { x: p.x, y: p.y })
            .collect();
        let triangulation = delaunator::triangulate(&delaunator_points);

        let span = bounds.span();
        let min_area2 = Tolerance::ZERO_AREA.relative_to(span * span);
        let mut triangles = Vec::with_capacity(triangulation.triangles.len() / 3);
        let mut triangle_bounds = Vec::with_capacity(triangulation.triangles.len() / 3);
        for tri in triangulation.triangles.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]];
            if orient2d(local[a], local[b], local[c]).abs() <= min_area2 {
                continue;
            }
            triangles.push([a, b, c]);
            if let Some(tb) = BBox2::from_points([local[a], local[b], local[c]]) {
                triangle_bounds.push(tb);
            }
        }

        if triangles.is_empty() {
            log::warn!(
                "surface samples are collinear; {} point(s) give no triangle",
                usable.len()
            );
            return Err(InsufficientDataError {
                usable: usable.len(),
            });
        }

        log::debug!(
            "triangulated {} surface samples into {} triangles",
            usable.len(),
            triangles.len()
        );

        Ok(Self {
            origin,
            local,
            elevations,
            triangles,
            triangle_bounds,
            bounds,
            bbox_eps: Tolerance::DEFAULT.relative_to(span),
        })
    }

    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.local.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// First triangle (in triangulation order) containing `p`, with the
    /// barycentric weights of its three corners.
    fn locate(&self, p: Point2) -> Option<(usize, [f64; 3])> {
        self.triangles
            .iter()
            .zip(&self.triangle_bounds)
            .enumerate()
            .filter(|(_, (_, tb))| tb.contains_point(p, self.bbox_eps))
            .find_map(|(idx, (tri, _))| {
                let [a, b, c] = tri.map(|i| self.local[i]);
                let area = orient2d(a, b, c);
                let weights = [
                    orient2d(p, b, c) / area,
                    orient2d(a, p, c) / area,
                    orient2d(a, b, p) / area,
                ];
                weights
                    .iter()
                    .all(|w| *w >= -BARYCENTRIC_EPS)
                    .then_some((idx, weights))
            })
    }

    /// Index of the closest sample; ties resolve to the lowest index.
    fn nearest_sample(&self, p: Point2) -> usize {
        let mut best = 0;
        let mut best_d2 = f64::INFINITY;
        for (idx, q) in self.local.iter().enumerate() {
            let d2 = q.distance_squared_to(p);
            if d2 < best_d2 {
                best = idx;
                best_d2 = d2;
            }
        }
        best
    }
}

impl ElevationField for TriangulatedField {
    fn sample(&self, at: Point2) -> ElevationSample {
        let p = at - self.origin;
        if let Some((idx, weights)) = self.locate(p) {
            let tri = self.triangles[idx];
            let elevation = weights
                .iter()
                .zip(tri)
                .map(|(w, i)| w * self.elevations[i])
                .sum();
            return ElevationSample {
                elevation,
                coverage: Coverage::Inside,
            };
        }

        ElevationSample {
            elevation: self.elevations[self.nearest_sample(p)],
            coverage: Coverage::Extrapolated,
        }
    }

    fn mesh(&self) -> SurfaceMesh {
        let positions = self
            .local
            .iter()
            .zip(&self.elevations)
            .map(|(p, z)| [p.x + self.origin.x, p.y + self.origin.y, *z])
            .collect();
        let indices = self
            .triangles
            .iter()
            .flat_map(|t| t.map(|i| i as u32))
            .collect();
        // Duplicate samples are left out of the triangulation.
        SurfaceMesh::new(positions, indices).compacted()
    }

    fn bounds(&self) -> BBox2 {
        self.bounds
    }
}
