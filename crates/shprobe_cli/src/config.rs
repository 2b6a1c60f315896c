//! shprobe configuration file handling
//!
//! A bake is described by `shprobe.toml` next to the face images:
//!
//! ```toml
//! [projection]
//! mip_level = 4
//! color_space = "linear"
//!
//! [faces]
//! positive_x = "px.png"
//! # ...
//!
//! [output]
//! format = "json"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shprobe_core::{CubemapFace, ProjectionSettings};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file name looked up in the bake directory
pub const CONFIG_FILE: &str = "shprobe.toml";

/// Bake configuration stored in shprobe.toml
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ShprobeConfig {
    #[serde(default)]
    pub projection: ProjectionSettings,
    #[serde(default)]
    pub faces: FacesConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Face image paths, relative to the config directory
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct FacesConfig {
    pub positive_x: String,
    pub negative_x: String,
    pub positive_y: String,
    pub negative_y: String,
    pub positive_z: String,
    pub negative_z: String,
}

impl Default for FacesConfig {
    fn default() -> Self {
        Self {
            positive_x: "px.png".to_string(),
            negative_x: "nx.png".to_string(),
            positive_y: "py.png".to_string(),
            negative_y: "ny.png".to_string(),
            positive_z: "pz.png".to_string(),
            negative_z: "nz.png".to_string(),
        }
    }
}

impl FacesConfig {
    /// Configured path for `face`
    pub fn path(&self, face: CubemapFace) -> &str {
        match face {
            CubemapFace::PositiveX => &self.positive_x,
            CubemapFace::NegativeX => &self.negative_x,
            CubemapFace::PositiveY => &self.positive_y,
            CubemapFace::NegativeY => &self.negative_y,
            CubemapFace::PositiveZ => &self.positive_z,
            CubemapFace::NegativeZ => &self.negative_z,
        }
    }

    /// Path for `face` resolved against `base`
    pub fn resolve(&self, base: &Path, face: CubemapFace) -> PathBuf {
        base.join(self.path(face))
    }
}

/// Coefficient output format
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Toml,
}

/// Where and how coefficients are written
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Output file, relative to the config directory; stdout when unset
    #[serde(default)]
    pub path: Option<String>,
}

impl ShprobeConfig {
    /// Load configuration from a directory
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = path.join(CONFIG_FILE);
        if !config_path.exists() {
            anyhow::bail!(
                "No {} found in {}. Run `shprobe init` to create one.",
                CONFIG_FILE,
                path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to a directory
    pub fn save_to_dir(&self, path: &Path) -> Result<()> {
        let config_path = path.join(CONFIG_FILE);
        let content = self.to_toml()?;
        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        Ok(())
    }
}
