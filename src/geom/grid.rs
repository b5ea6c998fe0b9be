use super::field::ElevationField;
use super::{Point2, SurfaceMesh};

/// Largest accepted node count per side.
pub const MAX_GRID_RESOLUTION: usize = 2000;

/// Resample `field` on a `resolution × resolution` node grid spanning its
/// bounds and triangulate the covered cells.
///
/// Nodes outside the field's coverage are dropped together with every
/// triangle touching them, so the mesh follows the hull of the samples with
/// a stair-stepped edge. Each quad is split along the same diagonal.
/// `resolution` is clamped to `2..=MAX_GRID_RESOLUTION`.
#[must_use]
pub fn resample_grid(field: &dyn ElevationField, resolution: usize) -> SurfaceMesh {
    let n = resolution.clamp(2, MAX_GRID_RESOLUTION);
    let bounds = field.bounds();
    let step_x = bounds.width() / (n - 1) as f64;
    let step_y = bounds.height() / (n - 1) as f64;

    let mut positions = Vec::new();
    let mut node_index: Vec<Option<u32>> = Vec::with_capacity(n * n);
    for row in 0..n {
        let y = bounds.min.y + step_y * row as f64;
        for col in 0..n {
            let x = bounds.min.x + step_x * col as f64;
            let sample = field.sample(Point2::new(x, y));
            if sample.is_inside() {
                node_index.push(Some(positions.len() as u32));
                positions.push([x, y, sample.elevation]);
            } else {
                node_index.push(None);
            }
        }
    }

    let mut indices = Vec::with_capacity((n - 1) * (n - 1) * 6);
    for row in 0..n - 1 {
        for col in 0..n - 1 {
            let i0 = node_index[row * n + col];
            let i1 = node_index[row * n + col + 1];
            let i2 = node_index[(row + 1) * n + col];
            let i3 = node_index[(row + 1) * n + col + 1];

            if let (Some(a), Some(b), Some(c)) = (i0, i1, i2) {
                indices.extend_from_slice(&[a, b, c]);
            }
            if let (Some(c), Some(b), Some(d)) = (i2, i1, i3) {
                indices.extend_from_slice(&[c, b, d]);
            }
        }
    }

    log::debug!(
        "grid resample {n}x{n}: {} covered nodes, {} triangles",
        positions.len(),
        indices.len() / 3
    );

    SurfaceMesh::new(positions, indices).compacted()
}
