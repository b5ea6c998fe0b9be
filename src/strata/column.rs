//! Borehole stratigraphy columns.
//!
//! A column is anchored at the interpolated ground level below its collar;
//! each valid layer becomes one coloured segment between
//! `ground - from_depth` and `ground - to_depth`. Building happens in two
//! steps so the geometric part can run on worker threads: [`plan_column`]
//! only reads the shared elevation field, and [`ColumnPlan::colorize`] runs
//! afterwards, in borehole order, against the render's colour resolver.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::soil::{Rgb, SoilColorResolver};
use crate::diagnostics::Warning;
use crate::geom::{Coverage, ElevationField, ElevationSample, Tolerance};
use crate::model::{Borehole, Layer};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One layer of one borehole, in world elevations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColoredSegment {
    pub borehole_id: String,
    pub top_elevation: f64,
    pub bottom_elevation: f64,
    pub from_depth: f64,
    pub to_depth: f64,
    pub color: Rgb,
    pub label: String,
}

/// All segments of one borehole, top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoreholeColumn {
    pub borehole_id: String,
    pub easting: f64,
    pub northing: f64,
    pub ground_elevation: f64,
    pub inside_surface: bool,
    pub segments: Vec<ColoredSegment>,
}

impl BoreholeColumn {
    /// A borehole without usable layers; drawn as a collar marker only.
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn collar(&self) -> [f64; 3] {
        [self.easting, self.northing, self.ground_elevation]
    }
}

/// Geometry of one column before colours are assigned.
#[derive(Debug, Clone)]
pub struct ColumnPlan<'a> {
    borehole: &'a Borehole,
    ground: ElevationSample,
    intervals: Vec<&'a Layer>,
    warnings: Vec<Warning>,
}

impl ColumnPlan<'_> {
    /// Resolve colours and emit the finished column together with every
    /// warning raised for this borehole.
    pub fn colorize(self, resolver: &mut SoilColorResolver<'_>) -> (BoreholeColumn, Vec<Warning>) {
        let Self {
            borehole,
            ground,
            intervals,
            mut warnings,
        } = self;
        let ground_elevation = ground.elevation;

        let segments = intervals
            .into_iter()
            .map(|layer| {
                let (color, warning) = resolver.resolve(&layer.soil_type);
                warnings.extend(warning);
                ColoredSegment {
                    borehole_id: borehole.id.clone(),
                    top_elevation: ground_elevation - layer.from_depth,
                    bottom_elevation: ground_elevation - layer.to_depth,
                    from_depth: layer.from_depth,
                    to_depth: layer.to_depth,
                    color,
                    label: layer.soil_type.clone(),
                }
            })
            .collect();

        let column = BoreholeColumn {
            borehole_id: borehole.id.clone(),
            easting: borehole.easting,
            northing: borehole.northing,
            ground_elevation,
            inside_surface: ground.coverage == Coverage::Inside,
            segments,
        };
        (column, warnings)
    }
}

/// Anchor `borehole` on `field` and order its layers.
///
/// Invalid intervals are dropped; gaps and overlaps between consecutive
/// layers are reported but kept.
#[must_use]
pub fn plan_column<'a>(
    borehole: &'a Borehole,
    layers: &[&'a Layer],
    field: &dyn ElevationField,
) -> ColumnPlan<'a> {
    let mut warnings = Vec::new();

    let ground = field.sample(borehole.position());
    if ground.coverage == Coverage::Extrapolated {
        log::info!(
            "borehole {} outside surface coverage, ground taken as {}",
            borehole.id,
            ground.elevation
        );
        warnings.push(Warning::OutsideCoverage {
            borehole_id: borehole.id.clone(),
            ground_elevation: ground.elevation,
        });
    }

    let mut intervals: Vec<&Layer> = Vec::with_capacity(layers.len());
    for layer in layers {
        if layer.is_valid_interval() {
            intervals.push(*layer);
        } else {
            warnings.push(Warning::InvalidInterval {
                borehole_id: borehole.id.clone(),
                from_depth: layer.from_depth,
                to_depth: layer.to_depth,
            });
        }
    }
    intervals.sort_by(|a, b| a.from_depth.total_cmp(&b.from_depth));

    let tol = Tolerance::DEPTH;
    for pair in intervals.windows(2) {
        let (upper, lower) = (pair[0], pair[1]);
        if tol.approx_eq_f64(upper.to_depth, lower.from_depth) {
            continue;
        }
        let (upper_to, lower_from) = (upper.to_depth, lower.from_depth);
        let borehole_id = borehole.id.clone();
        warnings.push(if lower_from > upper_to {
            Warning::DepthGap {
                borehole_id,
                upper_to,
                lower_from,
            }
        } else {
            Warning::DepthOverlap {
                borehole_id,
                upper_to,
                lower_from,
            }
        });
    }

    ColumnPlan {
        borehole,
        ground,
        intervals,
        warnings,
    }
}

/// Build the segments of a single borehole from its own layers.
pub fn build_column(
    borehole: &Borehole,
    layers: &[Layer],
    field: &dyn ElevationField,
    resolver: &mut SoilColorResolver<'_>,
) -> (BoreholeColumn, Vec<Warning>) {
    let layers: Vec<&Layer> = layers.iter().collect();
    plan_column(borehole, &layers, field).colorize(resolver)
}

/// Join layers to boreholes and build every column.
///
/// Columns come back in borehole-table order. Layers whose id is not in
/// `boreholes` produce one [`Warning::OrphanLayers`] per id and no geometry.
pub fn build_columns(
    boreholes: &[Borehole],
    layers: &[Layer],
    field: &dyn ElevationField,
    resolver: &mut SoilColorResolver<'_>,
) -> (Vec<BoreholeColumn>, Vec<Warning>) {
    let mut by_id: HashMap<&str, Vec<&Layer>> = HashMap::new();
    let mut id_order: Vec<&str> = Vec::new();
    for layer in layers {
        let entry = by_id.entry(layer.borehole_id.as_str()).or_insert_with(|| {
            id_order.push(layer.borehole_id.as_str());
            Vec::new()
        });
        entry.push(layer);
    }

    let mut warnings = Vec::new();
    let known: HashSet<&str> = boreholes.iter().map(|b| b.id.as_str()).collect();
    for id in id_order.iter().filter(|id| !known.contains(*id)) {
        let rows = by_id.get(id).map_or(0, Vec::len);
        log::warn!("borehole {id} missing coordinates, {rows} layer row(s) skipped");
        warnings.push(Warning::OrphanLayers {
            borehole_id: (*id).to_owned(),
            rows,
        });
    }

    #[cfg(feature = "parallel")]
    let plans: Vec<ColumnPlan<'_>> = boreholes
        .par_iter()
        .map(|borehole| plan_column(borehole, layers_of(&by_id, &borehole.id), field))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let plans: Vec<ColumnPlan<'_>> = boreholes
        .iter()
        .map(|borehole| plan_column(borehole, layers_of(&by_id, &borehole.id), field))
        .collect();

    let mut columns = Vec::with_capacity(plans.len());
    for plan in plans {
        let (column, mut column_warnings) = plan.colorize(resolver);
        warnings.append(&mut column_warnings);
        columns.push(column);
    }

    log::debug!(
        "built {} borehole columns with {} segments",
        columns.len(),
        columns.iter().map(|c| c.segments.len()).sum::<usize>()
    );
    (columns, warnings)
}

fn layers_of<'m, 'a>(by_id: &'m HashMap<&str, Vec<&'a Layer>>, id: &str) -> &'m [&'a Layer] {
    by_id.get(id).map_or(&[][..], Vec::as_slice)
}
