// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Processing configuration, persisted as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BildwerkError, Result};

/// Settings threaded into operations and encode calls.
///
/// There is no process-wide instance: callers load one value at start-up and
/// pass it (or the parts they need) down explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Target width used by `resize` when the caller gives none.
    pub default_width: u32,
    /// Target height used by `resize` when the caller gives none.
    pub default_height: u32,
    /// Rotation in degrees used by `rotate` when the caller gives none.
    pub default_angle: f64,
    /// JPEG encode quality (1-100).
    pub jpeg_quality: u8,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            default_width: 800,
            default_height: 600,
            default_angle: 90.0,
            jpeg_quality: 75,
        }
    }
}

impl ProcessorConfig {
    /// Read and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        debug!(path = %path.as_ref().display(), ?config, "Configuration loaded");
        Ok(config)
    }

    /// Load a configuration file, falling back to defaults on any failure.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    path = %path.as_ref().display(),
                    error = %err,
                    "error loading config file, using default values"
                );
                Self::default()
            }
        }
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(BildwerkError::invalid_parameter(
                "config",
                format!("jpeg_quality must be in 1..=100, got {}", self.jpeg_quality),
            ));
        }
        if self.default_width == 0 || self.default_height == 0 {
            return Err(BildwerkError::invalid_parameter(
                "config",
                "default dimensions must be non-zero",
            ));
        }
        if !self.default_angle.is_finite() {
            return Err(BildwerkError::invalid_parameter(
                "config",
                "default_angle must be finite",
            ));
        }
        Ok(())
    }
}
