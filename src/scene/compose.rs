//! Scene assembly.
//!
//! All geometry goes through one [`SceneFrame`]: horizontal coordinates are
//! shifted to a fixed reference origin and multiplied by the horizontal
//! exaggeration, elevations are shifted to the lowest surface sample and
//! multiplied by the vertical exaggeration. The origin depends only on the
//! input data, so composing at `(1, 1)` and scaling afterwards gives the
//! same scene as composing with the factors directly.

use serde::Serialize;

use crate::config::RenderConfig;
use crate::geom::{ElevationField, SurfaceMesh, resample_grid};
use crate::strata::{BoreholeColumn, Rgb};

/// Maps world coordinates into scene coordinates and back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneFrame {
    /// World `[easting, northing, elevation]` mapped to the scene origin.
    pub origin: [f64; 3],
    pub horizontal_exaggeration: f64,
    pub vertical_exaggeration: f64,
}

impl SceneFrame {
    #[must_use]
    pub fn to_scene(&self, world: [f64; 3]) -> [f64; 3] {
        [
            (world[0] - self.origin[0]) * self.horizontal_exaggeration,
            (world[1] - self.origin[1]) * self.horizontal_exaggeration,
            self.elevation_to_scene(world[2]),
        ]
    }

    #[must_use]
    pub fn elevation_to_scene(&self, elevation: f64) -> f64 {
        (elevation - self.origin[2]) * self.vertical_exaggeration
    }

    #[must_use]
    pub fn to_world(&self, scene: [f64; 3]) -> [f64; 3] {
        [
            scene[0] / self.horizontal_exaggeration + self.origin[0],
            scene[1] / self.horizontal_exaggeration + self.origin[1],
            scene[2] / self.vertical_exaggeration + self.origin[2],
        ]
    }
}

/// Ground surface in scene coordinates; `elevations` keeps the true value of
/// every vertex for colouring.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
    pub elevations: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSegment {
    pub label: String,
    pub color: Rgb,
    /// Scene z of the top and bottom of the layer.
    pub top: f64,
    pub bottom: f64,
    pub top_elevation: f64,
    pub bottom_elevation: f64,
    pub from_depth: f64,
    pub to_depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneColumn {
    pub borehole_id: String,
    /// Collar in scene coordinates; the column hangs straight down from it.
    pub collar: [f64; 3],
    pub ground_elevation: f64,
    pub inside_surface: bool,
    pub segments: Vec<SceneSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
}

/// A composed, render-ready scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub title: String,
    pub frame: SceneFrame,
    pub surface: SceneMesh,
    pub columns: Vec<SceneColumn>,
    pub legend: Vec<LegendEntry>,
}

impl Scene {
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.columns.iter().map(|c| c.segments.len()).sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Combine the surface and the borehole columns into one scene.
///
/// `config` is expected to be validated; see [`RenderConfig::validate`].
#[must_use]
pub fn compose(
    field: &dyn ElevationField,
    columns: &[BoreholeColumn],
    config: &RenderConfig,
) -> Scene {
    let triangulated = field.mesh();
    let frame = reference_frame(field, &triangulated, columns, config);

    let surface_mesh = match config.grid_resolution {
        Some(resolution) => resample_grid(field, resolution),
        None => triangulated,
    };
    let surface = SceneMesh {
        positions: surface_mesh
            .positions
            .iter()
            .map(|p| frame.to_scene(*p))
            .collect(),
        elevations: surface_mesh.positions.iter().map(|p| p[2]).collect(),
        indices: surface_mesh.indices,
    };

    let columns: Vec<SceneColumn> = columns
        .iter()
        .map(|column| SceneColumn {
            borehole_id: column.borehole_id.clone(),
            collar: frame.to_scene(column.collar()),
            ground_elevation: column.ground_elevation,
            inside_surface: column.inside_surface,
            segments: column
                .segments
                .iter()
                .map(|segment| SceneSegment {
                    label: segment.label.clone(),
                    color: segment.color,
                    top: frame.elevation_to_scene(segment.top_elevation),
                    bottom: frame.elevation_to_scene(segment.bottom_elevation),
                    top_elevation: segment.top_elevation,
                    bottom_elevation: segment.bottom_elevation,
                    from_depth: segment.from_depth,
                    to_depth: segment.to_depth,
                })
                .collect(),
        })
        .collect();

    let legend = legend_entries(&columns);
    let title = config.title.clone().unwrap_or_else(|| {
        format!(
            "3D Ground Model (Horizontal ×{}, Vertical ×{})",
            config.horizontal_exaggeration, config.vertical_exaggeration
        )
    });

    log::debug!(
        "composed scene: {} surface triangles, {} columns, {} legend entries",
        surface.indices.len() / 3,
        columns.len(),
        legend.len()
    );

    Scene {
        title,
        frame,
        surface,
        columns,
        legend,
    }
}

/// Minimum easting/northing over surface and collars, lowest surface
/// elevation.
fn reference_frame(
    field: &dyn ElevationField,
    triangulated: &SurfaceMesh,
    columns: &[BoreholeColumn],
    config: &RenderConfig,
) -> SceneFrame {
    let bounds = field.bounds();
    let (min_e, min_n) = columns.iter().fold((bounds.min.x, bounds.min.y), |(e, n), c| {
        (e.min(c.easting), n.min(c.northing))
    });
    let min_z = triangulated.elevation_range().map_or(0.0, |(lo, _)| lo);

    SceneFrame {
        origin: [min_e, min_n, min_z],
        horizontal_exaggeration: config.horizontal_exaggeration,
        vertical_exaggeration: config.vertical_exaggeration,
    }
}

/// One entry per distinct soil type drawn, in order of first appearance.
fn legend_entries(columns: &[SceneColumn]) -> Vec<LegendEntry> {
    let mut legend: Vec<LegendEntry> = Vec::new();
    for segment in columns.iter().flat_map(|c| &c.segments) {
        if !legend.iter().any(|entry| entry.label == segment.label) {
            legend.push(LegendEntry {
                label: segment.label.clone(),
                color: segment.color,
            });
        }
    }
    legend
}
