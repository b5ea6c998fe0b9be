//! End-to-end render: tables in, scene and warnings out.

use thiserror::Error;

use crate::config::{ConfigError, RenderConfig};
use crate::diagnostics::Diagnostics;
use crate::geom::{InsufficientDataError, TriangulatedField};
use crate::parse::{InputTables, RawTable, SchemaError, TableError, TableRole};
use crate::scene::{Scene, compose};
use crate::strata::{SoilColorResolver, build_columns};

/// Fatal render failures. Everything else is reported as a warning.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("ground surface could not be built: {0}")]
    InsufficientData(#[from] InsufficientDataError),
}

#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub scene: Scene,
    pub warnings: Diagnostics,
}

/// Render already-typed inputs.
pub fn render(tables: &InputTables, config: &RenderConfig) -> Result<RenderOutput, RenderError> {
    render_with(tables, config, Diagnostics::new())
}

/// Validate and render three raw tables. Row-level problems found while
/// typing the tables come first in the returned warnings.
pub fn render_tables(
    surface: RawTable,
    boreholes: RawTable,
    layers: RawTable,
    config: &RenderConfig,
) -> Result<RenderOutput, RenderError> {
    config.validate()?;
    let (tables, mut row_warnings) = InputTables::from_raw(surface, boreholes, layers)?;
    let mut warnings = Diagnostics::new();
    warnings.append(&mut row_warnings);
    render_with(&tables, config, warnings)
}

/// Render from CSV text.
pub fn render_csv(
    surface: &str,
    boreholes: &str,
    layers: &str,
    config: &RenderConfig,
) -> Result<RenderOutput, RenderError> {
    render_tables(
        RawTable::from_csv_str(TableRole::Surface, surface)?,
        RawTable::from_csv_str(TableRole::Boreholes, boreholes)?,
        RawTable::from_csv_str(TableRole::Layers, layers)?,
        config,
    )
}

fn render_with(
    tables: &InputTables,
    config: &RenderConfig,
    mut warnings: Diagnostics,
) -> Result<RenderOutput, RenderError> {
    config.validate()?;
    log::debug!(
        "render: {} surface points, {} boreholes, {} layers",
        tables.surface.len(),
        tables.boreholes.len(),
        tables.layers.len()
    );

    let field = TriangulatedField::build(&tables.surface)?;
    log::debug!(
        "surface: {} samples, {} triangles",
        field.sample_count(),
        field.triangle_count()
    );

    let palette = config.palette();
    let mut resolver = SoilColorResolver::new(&palette);
    let (columns, mut column_warnings) =
        build_columns(&tables.boreholes, &tables.layers, &field, &mut resolver);
    warnings.append(&mut column_warnings);

    let scene = compose(&field, &columns, config);
    log::debug!(
        "render finished: {} columns, {} segments, {} warning(s)",
        scene.columns.len(),
        scene.segment_count(),
        warnings.len()
    );

    Ok(RenderOutput { scene, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Warning;

    const SURFACE: &str = "Easting,Northing,Elevation\n0,0,100\n10,0,102\n0,10,104\n";
    const BOREHOLES: &str = "BH ID,Easting,Northing\nBH-01,3,3\n";

    #[test]
    fn invalid_config_is_rejected_before_reading_data() {
        let config = RenderConfig::default().with_exaggeration(-1.0, 1.0);
        let err = render_csv(SURFACE, BOREHOLES, "BH,FROM,TO,SOIL TYPE\n", &config).unwrap_err();
        assert!(matches!(err, RenderError::Config(_)));
    }

    #[test]
    fn too_few_surface_points_is_fatal() {
        let err = render_csv(
            "Easting,Northing,Elevation\n0,0,1\n1,1,2\n",
            BOREHOLES,
            "BH,FROM,TO,SOIL TYPE\n",
            &RenderConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::InsufficientData(_)));
    }

    #[test]
    fn row_warnings_precede_column_warnings() {
        let output = render_csv(
            SURFACE,
            BOREHOLES,
            "BH,FROM,TO,SOIL TYPE\nBH-01,0,abc,SM\nBH-01,0,2,PEAT\n",
            &RenderConfig::default(),
        )
        .unwrap();

        let warnings = output.warnings.as_slice();
        assert_eq!(warnings.len(), 2);
        assert!(matches!(warnings[0], Warning::InvalidRow { role: TableRole::Layers, .. }));
        assert!(matches!(warnings[1], Warning::UnmappedSoilType { .. }));
    }

    #[test]
    fn typed_render_matches_csv_render() {
        let layers = "BH,FROM,TO,SOIL TYPE\nBH-01,0,2,SM\n";
        let from_csv = render_csv(SURFACE, BOREHOLES, layers, &RenderConfig::default()).unwrap();

        let (tables, _) = InputTables::from_raw(
            RawTable::from_csv_str(TableRole::Surface, SURFACE).unwrap(),
            RawTable::from_csv_str(TableRole::Boreholes, BOREHOLES).unwrap(),
            RawTable::from_csv_str(TableRole::Layers, layers).unwrap(),
        )
        .unwrap();
        let typed = render(&tables, &RenderConfig::default()).unwrap();

        assert_eq!(from_csv.scene, typed.scene);
    }
}
