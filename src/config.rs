//! Render settings.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::MAX_GRID_RESOLUTION;
use crate::strata::{Rgb, SoilPalette};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{axis} exaggeration must be a finite number greater than 0, got {value}")]
    InvalidExaggeration { axis: &'static str, value: f64 },
    #[error("grid resolution must be between 2 and {max}, got {0}", max = MAX_GRID_RESOLUTION)]
    InvalidGridResolution(usize),
    #[error("invalid render configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Options for one render. Every field has a default, so `{}` is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Multiplier for easting and northing offsets.
    pub horizontal_exaggeration: f64,
    /// Multiplier for elevation offsets.
    pub vertical_exaggeration: f64,
    /// Draw the surface as an `n × n` grid instead of the triangulation.
    pub grid_resolution: Option<usize>,
    /// Extra or replacement colours, merged over the standard palette.
    pub soil_colors: BTreeMap<String, Rgb>,
    pub title: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            horizontal_exaggeration: 1.0,
            vertical_exaggeration: 1.0,
            grid_resolution: None,
            soil_colors: BTreeMap::new(),
            title: None,
        }
    }
}

impl RenderConfig {
    #[must_use]
    pub fn with_exaggeration(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal_exaggeration = horizontal;
        self.vertical_exaggeration = vertical;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, value) in [
            ("horizontal", self.horizontal_exaggeration),
            ("vertical", self.vertical_exaggeration),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidExaggeration { axis, value });
            }
        }
        if let Some(resolution) = self.grid_resolution {
            if !(2..=MAX_GRID_RESOLUTION).contains(&resolution) {
                return Err(ConfigError::InvalidGridResolution(resolution));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Standard palette with `soil_colors` applied on top.
    #[must_use]
    pub fn palette(&self) -> SoilPalette {
        SoilPalette::standard().with_overrides(&self.soil_colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = RenderConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.horizontal_exaggeration, 1.0);
        assert_eq!(config.vertical_exaggeration, 1.0);
    }

    #[test]
    fn parses_overrides_and_grid() {
        let config = RenderConfig::from_json_str(
            r#"{
                "vertical_exaggeration": 5,
                "grid_resolution": 40,
                "soil_colors": { "PEAT": [60, 40, 20] },
                "title": "Site A"
            }"#,
        )
        .unwrap();

        assert_eq!(config.vertical_exaggeration, 5.0);
        assert_eq!(config.grid_resolution, Some(40));
        assert_eq!(config.palette().get("PEAT"), Some(Rgb(60, 40, 20)));
        assert_eq!(config.palette().get("SM"), Some(Rgb(255, 255, 224)));
        assert_eq!(config.title.as_deref(), Some("Site A"));
    }

    #[test]
    fn rejects_non_positive_exaggeration() {
        let err = RenderConfig::default()
            .with_exaggeration(0.0, 1.0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidExaggeration { axis: "horizontal", .. }
        ));

        let err = RenderConfig::default()
            .with_exaggeration(1.0, f64::NAN)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidExaggeration { axis: "vertical", .. }));

        assert!(RenderConfig::from_json_str(r#"{"vertical_exaggeration": -2}"#).is_err());
    }

    #[test]
    fn rejects_degenerate_grid() {
        let config = RenderConfig {
            grid_resolution: Some(1),
            ..RenderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGridResolution(1))
        ));
    }

    #[test]
    fn rejects_oversized_grid() {
        let err = RenderConfig::from_json_str(r#"{"grid_resolution": 1000000}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGridResolution(1_000_000)));

        let config = RenderConfig {
            grid_resolution: Some(MAX_GRID_RESOLUTION),
            ..RenderConfig::default()
        };
        assert!(config.validate().is_ok());
        let config = RenderConfig {
            grid_resolution: Some(MAX_GRID_RESOLUTION + 1),
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            RenderConfig::from_json_str("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }
}
