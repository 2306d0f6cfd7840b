use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables for the background renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Number of random fills per pass.
    pub fill_count: u32,
    /// Fill diameters are drawn from `[0, max_fill_diameter)`.
    pub max_fill_diameter: f64,
    /// Size of the worker pool.
    pub worker_threads: usize,
    /// Largest canvas, in pixels, a pass will allocate.
    pub max_pixels: u64,
    /// Fixed seed for reproducible passes; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            fill_count: 25_001,
            max_fill_diameter: 80.0,
            worker_threads: 2,
            max_pixels: 64 * 1024 * 1024,
            seed: None,
        }
    }
}

impl RendererConfig {
    pub fn with_fill_count(mut self, fill_count: u32) -> Self {
        self.fill_count = fill_count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_threads == 0 {
            return Err(ConfigError::InvalidValue {
                field: "worker_threads",
                message: "must be at least 1".to_string(),
            });
        }
        if !self.max_fill_diameter.is_finite() || self.max_fill_diameter < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "max_fill_diameter",
                message: format!("{} is not a finite, non-negative size", self.max_fill_diameter),
            });
        }
        if self.max_pixels == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_pixels",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded renderer config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
