#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Borehole logs and a ground surface rendered as one interactive 3D scene.
//!
//! The library reads three tables (surface samples, borehole collars and
//! layer descriptions), interpolates the ground surface, hangs a coloured
//! column under every collar and composes the result into a [`Scene`] that
//! can be exported as a standalone HTML document.

pub mod config;
pub mod diagnostics;
pub mod geom;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod scene;
pub mod strata;

use std::fmt;

use serde::Serialize;
use thiserror::Error;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

pub use config::{ConfigError, RenderConfig};
pub use diagnostics::{Diagnostics, Warning};
pub use model::{Borehole, Layer, SurfacePoint};
pub use pipeline::{RenderError, RenderOutput, render, render_csv, render_tables};
pub use scene::{ExportError, Scene, export_html, to_html};

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    // A second start-up (e.g. a reloaded module) keeps the first logger.
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("could not start the rayon thread pool: {err}")))
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Failure of [`Engine::render_tables`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// What a render hands back to the host page.
#[derive(Debug, Clone, Serialize)]
pub struct RenderResponse {
    pub html: String,
    pub warnings: Diagnostics,
    pub messages: Vec<String>,
}

/// Public entry point for browser consumers.
#[wasm_bindgen]
pub struct Engine {
    initialized: bool,
    config: RenderConfig,
    last_output: Option<RenderOutput>,
    last_html: Option<String>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Engine {
        Engine {
            initialized: true,
            config: RenderConfig::default(),
            last_output: None,
            last_html: None,
        }
    }

    #[wasm_bindgen]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Set both exaggeration factors; each must be finite and greater than 0.
    #[wasm_bindgen]
    pub fn set_exaggeration(&mut self, horizontal: f64, vertical: f64) -> Result<(), JsValue> {
        let config = self.config.clone().with_exaggeration(horizontal, vertical);
        config.validate().map_err(to_js_error)?;
        self.config = config;
        Ok(())
    }

    /// `None` draws the triangulated surface; `Some(n)` an `n × n` grid.
    #[wasm_bindgen]
    pub fn set_grid_resolution(&mut self, resolution: Option<u32>) -> Result<(), JsValue> {
        let config = RenderConfig {
            grid_resolution: resolution.map(|n| n as usize),
            ..self.config.clone()
        };
        config.validate().map_err(to_js_error)?;
        self.config = config;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_soil_color(&mut self, label: &str, r: u8, g: u8, b: u8) {
        self.config
            .soil_colors
            .insert(label.to_owned(), strata::Rgb(r, g, b));
    }

    /// Replace the whole configuration with a JSON document.
    #[wasm_bindgen]
    pub fn load_config(&mut self, json: &str) -> Result<(), JsValue> {
        self.config = RenderConfig::from_json_str(json).map_err(to_js_error)?;
        Ok(())
    }

    /// Render three CSV documents. Returns `{ html, warnings, messages }`.
    #[wasm_bindgen]
    pub fn render(
        &mut self,
        surface_csv: &str,
        boreholes_csv: &str,
        layers_csv: &str,
    ) -> Result<JsValue, JsValue> {
        let response = self
            .render_tables(surface_csv, boreholes_csv, layers_csv)
            .map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&response).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn get_html(&self) -> Result<String, JsValue> {
        self.last_html
            .clone()
            .ok_or_else(|| js_error("nothing has been rendered yet"))
    }

    #[wasm_bindgen]
    pub fn get_warnings(&self) -> Result<JsValue, JsValue> {
        let output = self
            .last_output
            .as_ref()
            .ok_or_else(|| js_error("nothing has been rendered yet"))?;
        serde_wasm_bindgen::to_value(&output.warnings).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn get_scene(&self) -> Result<JsValue, JsValue> {
        let output = self
            .last_output
            .as_ref()
            .ok_or_else(|| js_error("nothing has been rendered yet"))?;
        serde_wasm_bindgen::to_value(&output.scene).map_err(to_js_error)
    }
}

impl Engine {
    /// Native-callable form of [`Engine::render`].
    ///
    /// On failure the previous render stays available.
    pub fn render_tables(
        &mut self,
        surface_csv: &str,
        boreholes_csv: &str,
        layers_csv: &str,
    ) -> Result<RenderResponse, EngineError> {
        let output = render_csv(surface_csv, boreholes_csv, layers_csv, &self.config)?;
        let html = to_html(&output.scene)?;
        debug_log!(
            "engine render: {} columns, {} warning(s), {} bytes of html",
            output.scene.columns.len(),
            output.warnings.len(),
            html.len()
        );

        let response = RenderResponse {
            html: html.clone(),
            warnings: output.warnings.clone(),
            messages: output.warnings.messages(),
        };
        self.last_html = Some(html);
        self.last_output = Some(output);
        Ok(response)
    }

    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[must_use]
    pub fn last_output(&self) -> Option<&RenderOutput> {
        self.last_output.as_ref()
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::Engine;

    const SURFACE: &str = "Easting,Northing,Elevation\n0,0,100\n10,0,102\n0,10,104\n";
    const BOREHOLES: &str = "BH ID,Easting,Northing\nBH-01,3,3\n";
    const LAYERS: &str = "BH,FROM,TO,SOIL TYPE\nBH-01,0,2,SM\nBH-01,2,5,CL\n";

    #[test]
    fn engine_keeps_settings_between_renders() {
        let mut engine = Engine::new();
        engine.set_exaggeration(2.0, 5.0).unwrap();
        engine.set_grid_resolution(Some(10)).unwrap();

        let response = engine.render_tables(SURFACE, BOREHOLES, LAYERS).unwrap();
        assert!(response.warnings.is_empty());
        assert!(response.html.contains("mesh3d"));

        let scene = &engine.last_output().unwrap().scene;
        assert_eq!(scene.frame.horizontal_exaggeration, 2.0);
        assert_eq!(scene.frame.vertical_exaggeration, 5.0);
        assert_eq!(engine.get_html().unwrap(), response.html);
    }

    #[test]
    fn invalid_settings_are_rejected_and_not_applied() {
        let mut engine = Engine::new();
        assert!(engine.set_exaggeration(0.0, 1.0).is_err());
        assert!(engine.set_grid_resolution(Some(1)).is_err());
        assert_eq!(engine.config().horizontal_exaggeration, 1.0);
        assert_eq!(engine.config().grid_resolution, None);
    }

    #[test]
    fn failed_render_keeps_previous_output() {
        let mut engine = Engine::new();
        engine.render_tables(SURFACE, BOREHOLES, LAYERS).unwrap();
        assert!(
            engine
                .render_tables("Easting,Northing\n", BOREHOLES, LAYERS)
                .is_err()
        );
        assert!(engine.get_html().is_ok());
    }

    #[test]
    fn custom_soil_color_applies_to_next_render() {
        let mut engine = Engine::new();
        engine.set_soil_color("PEAT", 60, 40, 20);
        let response = engine
            .render_tables(SURFACE, BOREHOLES, "BH,FROM,TO,SOIL TYPE\nBH-01,0,1,PEAT\n")
            .unwrap();
        assert!(response.warnings.is_empty());
        assert!(response.html.contains("rgb(60,40,20)"));
    }
}
