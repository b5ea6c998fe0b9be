//! Stratigraphy: soil colours and borehole columns.

pub mod column;
pub mod soil;

pub use column::{BoreholeColumn, ColoredSegment, ColumnPlan, build_column, build_columns, plan_column};
pub use soil::{Rgb, SoilColorResolver, SoilPalette};
