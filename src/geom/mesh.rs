use serde::Serialize;

/// Renderable triangle mesh of the ground surface in world coordinates
/// (`[easting, northing, elevation]`).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SurfaceMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions
            .iter()
            .any(|p| !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite())
    }

    /// Returns true if all vertex indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len();
        self.indices.iter().all(|&i| (i as usize) < n)
    }

    #[must_use]
    pub fn has_triangle_indices(&self) -> bool {
        self.indices.len() % 3 == 0
    }

    /// Triangle-list shape, finite coordinates and in-range indices.
    pub fn validate(&self) -> Result<(), String> {
        if !self.has_triangle_indices() {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self.has_invalid_vertices() {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        Ok(())
    }

    /// Minimum and maximum elevation over all vertices.
    #[must_use]
    pub fn elevation_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.positions.iter().map(|p| p[2]);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), z| (lo.min(z), hi.max(z))))
    }

    /// Drop vertices no triangle references and re-index the remainder.
    ///
    /// Vertex order is preserved, so the result is deterministic.
    #[must_use]
    pub fn compacted(&self) -> Self {
        let mut remap = vec![u32::MAX; self.positions.len()];
        for &i in &self.indices {
            remap[i as usize] = 0;
        }

        let mut positions = Vec::with_capacity(self.positions.len());
        for (old, slot) in remap.iter_mut().enumerate() {
            if *slot == 0 {
                *slot = positions.len() as u32;
                positions.push(self.positions[old]);
            }
        }

        let indices = self.indices.iter().map(|&i| remap[i as usize]).collect();
        Self { positions, indices }
    }
}

#[cfg(test)]
mod tests {
    use super::SurfaceMesh;

    fn quad() -> SurfaceMesh {
        SurfaceMesh::new(
            vec![
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 2.0],
                [0.0, 1.0, 3.0],
                [1.0, 1.0, 4.0],
            ],
            vec![0, 1, 2, 2, 1, 3],
        )
    }

    #[test]
    fn validate_accepts_well_formed_mesh() {
        let mesh = quad();
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.elevation_range(), Some((1.0, 4.0)));
    }

    #[test]
    fn validate_rejects_out_of_bounds_index() {
        let mut mesh = quad();
        mesh.indices[5] = 9;
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn validate_rejects_nan_vertex() {
        let mut mesh = quad();
        mesh.positions[0][2] = f64::NAN;
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn compacted_drops_unreferenced_vertices() {
        let mesh = SurfaceMesh::new(
            vec![
                [9.0, 9.0, 9.0],
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            vec![1, 2, 3],
        );
        let compact = mesh.compacted();
        assert_eq!(compact.vertex_count(), 3);
        assert_eq!(compact.indices, vec![0, 1, 2]);
        assert_eq!(compact.positions[0], [0.0, 0.0, 0.0]);
    }
}
