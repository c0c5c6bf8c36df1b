use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BATCH_EXTENSIONS, DEFAULT_BIT_DEPTH, DEFAULT_GLCM_ANGLES, DEFAULT_GLCM_DISTANCES,
    DEFAULT_LBP_POINTS, DEFAULT_LBP_RADIUS, DEFAULT_PCA_COMPONENTS,
};
use crate::error::Result;

/// Top-level configuration for a QC run, usually loaded from TOML.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QcConfig {
    #[serde(default)]
    pub intensity: IntensityConfig,
    #[serde(default)]
    pub texture: TextureConfig,
    #[serde(default)]
    pub reduction: ReductionConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl QcConfig {
    /// Read a config file. Missing sections fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntensityConfig {
    /// Bit depth used to normalize pixel values and size the histogram.
    pub default_bit_depth: u32,
}

impl Default for IntensityConfig {
    fn default() -> Self {
        Self {
            default_bit_depth: DEFAULT_BIT_DEPTH,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureConfig {
    /// GLCM pixel-pair distances.
    pub distances: Vec<usize>,
    /// GLCM angles in radians.
    pub angles: Vec<f64>,
    pub lbp_radius: f64,
    pub lbp_points: usize,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            distances: DEFAULT_GLCM_DISTANCES.to_vec(),
            angles: DEFAULT_GLCM_ANGLES.to_vec(),
            lbp_radius: DEFAULT_LBP_RADIUS,
            lbp_points: DEFAULT_LBP_POINTS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReductionConfig {
    pub n_components: usize,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            n_components: DEFAULT_PCA_COMPONENTS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Lower-case extensions picked up when walking a folder.
    pub extensions: Vec<String>,
    /// Worker count for per-file processing. `None` uses rayon's default.
    #[serde(default)]
    pub threads: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_BATCH_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            threads: None,
        }
    }
}

impl BatchConfig {
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_ascii_lowercase();
                self.extensions.iter().any(|x| *x == e)
            })
            .unwrap_or(false)
    }
}
