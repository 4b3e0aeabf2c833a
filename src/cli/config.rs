//! TOML configuration file support.
//!
//! Spillover matrices and save settings live in a config file instead of on
//! the command line:
//!
//! ```toml
//! # flowgate.toml
//! [save]
//! byte_order = "msbf"
//!
//! [matrices.panel_a]
//! parameters = ["FITC-A", "PE-A"]
//! rows = [
//!     [1.0, 0.15],
//!     [0.02, 1.0],
//! ]
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use flowgate_events::codec::{CodecConfig, FileByteOrder};

/// Root configuration structure for flowgate.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Save settings.
    #[serde(default)]
    pub save: SaveConfig,

    /// Named spillover matrices.
    #[serde(default)]
    pub matrices: BTreeMap<String, MatrixConfig>,
}

/// Byte order choice for saved files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrderSetting {
    /// Whatever the host uses.
    Native,
    /// Least significant byte first.
    Lsbf,
    /// Most significant byte first.
    Msbf,
}

/// Configuration applied when writing files.
#[derive(Debug, Default, Deserialize)]
pub struct SaveConfig {
    /// Byte order of written bodies (default: native).
    pub byte_order: Option<ByteOrderSetting>,

    /// Lock files while reading or writing (default: true).
    pub lock_files: Option<bool>,
}

/// A spillover matrix keyed by parameter name.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixConfig {
    /// Parameter names, in row/column order.
    pub parameters: Vec<String>,

    /// Matrix rows; row `i` is the spillover of `parameters[i]` into each detector.
    pub rows: Vec<Vec<f64>>,
}

impl MatrixConfig {
    /// Row-major matrix values, checked to be square over the parameters.
    pub fn flatten(&self) -> Result<Vec<f64>> {
        let n = self.parameters.len();
        if self.rows.len() != n {
            bail!("matrix has {} rows for {} parameters", self.rows.len(), n);
        }
        if let Some((i, row)) = self.rows.iter().enumerate().find(|(_, row)| row.len() != n) {
            bail!("matrix row {} has {} entries, expected {}", i + 1, row.len(), n);
        }
        Ok(self.rows.iter().flatten().copied().collect())
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Codec configuration derived from the `[save]` section.
    pub fn codec_config(&self) -> CodecConfig {
        let mut config = CodecConfig::default();
        if let Some(order) = self.save.byte_order {
            config.byte_order = match order {
                ByteOrderSetting::Native => FileByteOrder::native(),
                ByteOrderSetting::Lsbf => FileByteOrder::LittleEndian,
                ByteOrderSetting::Msbf => FileByteOrder::BigEndian,
            };
        }
        if let Some(lock_files) = self.save.lock_files {
            config.lock_files = lock_files;
        }
        config
    }

    /// Select a matrix by name, or the only one defined when no name is given.
    pub fn matrix(&self, name: Option<&str>) -> Result<(&str, &MatrixConfig)> {
        match name {
            Some(name) => self
                .matrices
                .get_key_value(name)
                .map(|(k, v)| (k.as_str(), v))
                .with_context(|| format!("No matrix named '{}' in config", name)),
            None => {
                let mut iter = self.matrices.iter();
                match (iter.next(), iter.next()) {
                    (Some((k, v)), None) => Ok((k.as_str(), v)),
                    (None, _) => bail!("Config defines no [matrices]"),
                    _ => bail!(
                        "Config defines several matrices ({}); choose one with --matrix",
                        self.matrices.keys().cloned().collect::<Vec<_>>().join(", ")
                    ),
                }
            }
        }
    }
}
