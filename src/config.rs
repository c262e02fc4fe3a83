use crate::error::SneakpeekError;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Preview settings, read from an optional TOML file and then overridden
/// from the command line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Preview width used when a cue's region doesn't specify one.
    pub width: f64,
    /// Preview height used when a cue's region doesn't specify one.
    pub height: f64,
    /// Prefix for sprite sheet paths that carry a region fragment.
    pub base_path: String,
    /// Query string parameters appended to every image URL.
    pub url_params: BTreeMap<String, String>,
    /// Only adopt the metadata track with this label.
    pub track_label: Option<String>,
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: '{}'", path.display()))?;
        let settings: Settings = toml::from_str(&data)
            .context(format!("Failed to parse config file: '{}'", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.width.is_finite() || self.width < 0.0 {
            return Err(SneakpeekError::InvalidConfig(format!(
                "width must be a non-negative number, got {}",
                self.width
            ))
            .into());
        }
        if !self.height.is_finite() || self.height < 0.0 {
            return Err(SneakpeekError::InvalidConfig(format!(
                "height must be a non-negative number, got {}",
                self.height
            ))
            .into());
        }
        Ok(())
    }

    /// Renders `url_params` as `?key=value&...`, or an empty string.
    pub fn query_string(&self) -> String {
        if self.url_params.is_empty() {
            return String::new();
        }
        let pairs: Vec<String> = self
            .url_params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        format!("?{}", pairs.join("&"))
    }
}
