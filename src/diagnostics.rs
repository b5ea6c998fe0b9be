//! Per-render warnings.
//!
//! Data-quality problems never abort a render. They are recovered locally
//! and collected, in the order they were found, into a [`Diagnostics`] value
//! that travels next to the scene.

use std::fmt;

use serde::Serialize;

use crate::parse::TableRole;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A data row could not be read and was skipped. `row` is 1-based and
    /// excludes the header line.
    InvalidRow {
        role: TableRole,
        row: usize,
        message: String,
    },
    /// The same `BH ID` appeared more than once; the first row is kept.
    DuplicateBorehole { borehole_id: String },
    /// `TO <= FROM` or a negative depth; the layer was skipped.
    InvalidInterval {
        borehole_id: String,
        from_depth: f64,
        to_depth: f64,
    },
    /// Consecutive layers leave part of the hole undescribed.
    DepthGap {
        borehole_id: String,
        upper_to: f64,
        lower_from: f64,
    },
    /// Consecutive layers describe the same depth twice.
    DepthOverlap {
        borehole_id: String,
        upper_to: f64,
        lower_from: f64,
    },
    /// Layer rows reference a borehole id missing from the borehole table.
    OrphanLayers { borehole_id: String, rows: usize },
    /// The collar lies outside the surface; its ground level was taken from
    /// the nearest surface sample.
    OutsideCoverage {
        borehole_id: String,
        ground_elevation: f64,
    },
    /// Soil type without a palette entry; drawn in black.
    UnmappedSoilType { label: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRow { role, row, message } => {
                write!(f, "{role} row {row} skipped: {message}")
            }
            Self::DuplicateBorehole { borehole_id } => {
                write!(f, "borehole {borehole_id} is listed more than once; using the first location")
            }
            Self::InvalidInterval {
                borehole_id,
                from_depth,
                to_depth,
            } => write!(
                f,
                "borehole {borehole_id}: layer {from_depth}–{to_depth} has an invalid depth interval and was skipped"
            ),
            Self::DepthGap {
                borehole_id,
                upper_to,
                lower_from,
            } => write!(
                f,
                "borehole {borehole_id}: gap between {upper_to} and {lower_from}"
            ),
            Self::DepthOverlap {
                borehole_id,
                upper_to,
                lower_from,
            } => write!(
                f,
                "borehole {borehole_id}: layers overlap between {lower_from} and {upper_to}"
            ),
            Self::OrphanLayers { borehole_id, rows } => write!(
                f,
                "borehole {borehole_id} missing coordinates – {rows} layer row(s) skipped"
            ),
            Self::OutsideCoverage {
                borehole_id,
                ground_elevation,
            } => write!(
                f,
                "borehole {borehole_id} lies outside the surface; ground level {ground_elevation} taken from the nearest surface point"
            ),
            Self::UnmappedSoilType { label } => {
                write!(f, "soil type '{label}' not predefined – using black")
            }
        }
    }
}

/// Ordered warning list for one render.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        log::debug!("render warning: {warning}");
        self.warnings.push(warning);
    }

    pub fn append(&mut self, other: &mut Vec<Warning>) {
        for warning in other.drain(..) {
            self.push(warning);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Warning] {
        &self.warnings
    }

    /// Human-readable messages, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Warning> {
        self.warnings
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.warnings.iter()
    }
}
