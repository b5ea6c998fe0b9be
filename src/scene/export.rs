//! Self-contained interactive HTML export.
//!
//! The page loads plotly.js from its CDN and draws the figure built by
//! [`figure`]. Scene data is embedded as JSON inside a non-executing script
//! element with every `<` escaped, so labels cannot close the element.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use thiserror::Error;

use super::compose::{Scene, SceneColumn, SceneSegment};

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const SEGMENT_LINE_WIDTH: u32 = 20;
const COLLAR_MARKER_SIZE: u32 = 5;
const COLLAR_COLOR: &str = "red";
const SURFACE_COLORSCALE: &str = "Turbo";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not serialize the scene: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("could not write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not write the document: {0}")]
    Stream(#[source] io::Error),
}

/// Plotly figure (`{"data": [...], "layout": {...}}`) for `scene`.
#[must_use]
pub fn figure(scene: &Scene) -> Value {
    let mut data = vec![surface_trace(scene)];
    if !scene.columns.is_empty() {
        data.push(collar_trace(&scene.columns));
    }
    for column in &scene.columns {
        data.extend(
            column
                .segments
                .iter()
                .map(|segment| segment_trace(column, segment)),
        );
    }
    for entry in &scene.legend {
        // Legend-only trace: no drawable point.
        data.push(json!({
            "type": "scatter3d",
            "mode": "lines",
            "x": [null],
            "y": [null],
            "z": [null],
            "line": { "color": entry.color.to_string(), "width": SEGMENT_LINE_WIDTH },
            "name": entry.label,
            "legendgroup": entry.label,
            "showlegend": true,
        }));
    }

    json!({ "data": data, "layout": layout(scene) })
}

fn surface_trace(scene: &Scene) -> Value {
    let mesh = &scene.surface;
    let (i, (j, k)): (Vec<u32>, (Vec<u32>, Vec<u32>)) = mesh
        .indices
        .chunks_exact(3)
        .map(|tri| (tri[0], (tri[1], tri[2])))
        .unzip();

    json!({
        "type": "mesh3d",
        "name": "Ground Surface",
        "x": mesh.positions.iter().map(|p| p[0]).collect::<Vec<_>>(),
        "y": mesh.positions.iter().map(|p| p[1]).collect::<Vec<_>>(),
        "z": mesh.positions.iter().map(|p| p[2]).collect::<Vec<_>>(),
        "i": i,
        "j": j,
        "k": k,
        "intensity": mesh.elevations,
        "colorscale": SURFACE_COLORSCALE,
        "opacity": 0.85,
        "showscale": true,
        "colorbar": { "title": { "text": "Elevation (m)" }, "len": 0.6 },
        "hovertemplate": "Elevation %{intensity:.2f} m<extra></extra>",
        "showlegend": true,
    })
}

fn collar_trace(columns: &[SceneColumn]) -> Value {
    json!({
        "type": "scatter3d",
        "mode": "markers+text",
        "name": "Boreholes",
        "x": columns.iter().map(|c| c.collar[0]).collect::<Vec<_>>(),
        "y": columns.iter().map(|c| c.collar[1]).collect::<Vec<_>>(),
        "z": columns.iter().map(|c| c.collar[2]).collect::<Vec<_>>(),
        "text": columns.iter().map(|c| c.borehole_id.as_str()).collect::<Vec<_>>(),
        "textposition": "top center",
        "hovertext": columns
            .iter()
            .map(|c| format!("{}<br>Ground level {:.2} m", c.borehole_id, c.ground_elevation))
            .collect::<Vec<_>>(),
        "hoverinfo": "text",
        "marker": { "size": COLLAR_MARKER_SIZE, "color": COLLAR_COLOR },
    })
}

fn segment_trace(column: &SceneColumn, segment: &SceneSegment) -> Value {
    let hover = format!(
        "{}<br>{}<br>{:.2}–{:.2} m depth<br>Elevation {:.2} to {:.2} m",
        column.borehole_id,
        segment.label,
        segment.from_depth,
        segment.to_depth,
        segment.top_elevation,
        segment.bottom_elevation
    );
    json!({
        "type": "scatter3d",
        "mode": "lines",
        "x": [column.collar[0], column.collar[0]],
        "y": [column.collar[1], column.collar[1]],
        "z": [segment.top, segment.bottom],
        "line": { "color": segment.color.to_string(), "width": SEGMENT_LINE_WIDTH },
        "name": segment.label,
        "legendgroup": segment.label,
        "showlegend": false,
        "hovertext": [hover.clone(), hover],
        "hoverinfo": "text",
    })
}

fn layout(scene: &Scene) -> Value {
    let frame = &scene.frame;
    json!({
        "title": { "text": scene.title },
        "scene": {
            "xaxis": { "title": { "text": format!(
                "Easting − {} (×{})", frame.origin[0], frame.horizontal_exaggeration
            ) } },
            "yaxis": { "title": { "text": format!(
                "Northing − {} (×{})", frame.origin[1], frame.horizontal_exaggeration
            ) } },
            "zaxis": { "title": { "text": format!(
                "Elevation − {} (×{})", frame.origin[2], frame.vertical_exaggeration
            ) } },
            "aspectmode": "data",
        },
        "legend": { "title": { "text": "Soil Types & Boreholes" }, "x": 0, "y": 0.5 },
        "margin": { "l": 0, "r": 0, "t": 50, "b": 0 },
    })
}

/// Render the complete HTML document in memory.
pub fn to_html(scene: &Scene) -> Result<String, ExportError> {
    let data = serde_json::to_string(&figure(scene))?.replace('<', "\\u003c");
    let title = escape_html(&scene.title);

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{PLOTLY_CDN}" charset="utf-8"></script>
<style>html, body {{ margin: 0; height: 100%; }} #scene {{ width: 100%; height: 100%; }}</style>
</head>
<body>
<div id="scene"></div>
<script type="application/json" id="scene-data">{data}</script>
<script>
const figure = JSON.parse(document.getElementById("scene-data").textContent);
Plotly.newPlot("scene", figure.data, figure.layout, {{ responsive: true }});
</script>
</body>
</html>
"#
    ))
}

pub fn write_html<W: Write>(scene: &Scene, mut writer: W) -> Result<(), ExportError> {
    let html = to_html(scene)?;
    writer
        .write_all(html.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(ExportError::Stream)
}

/// Write the document to `path`.
///
/// The document is rendered fully before anything touches the disk, then
/// written to a sibling temp file and renamed over `path`. On failure the
/// temp file is removed and an existing `path` is left as it was.
pub fn export_html(scene: &Scene, path: &Path) -> Result<(), ExportError> {
    let html = to_html(scene)?;
    let tmp = temp_sibling(path);

    let written = File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(html.as_bytes())?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));

    if let Err(source) = written {
        let _ = fs::remove_file(&tmp);
        return Err(ExportError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    log::debug!("exported scene to {} ({} bytes)", path.display(), html.len());
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "scene.html".to_owned(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
