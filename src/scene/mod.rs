//! Scene composition and HTML export.

pub mod compose;
pub mod export;

pub use compose::{LegendEntry, Scene, SceneColumn, SceneFrame, SceneMesh, SceneSegment, compose};
pub use export::{ExportError, PLOTLY_CDN, export_html, figure, to_html, write_html};
