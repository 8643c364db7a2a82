use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::digest::{AlgorithmSet, DigestAlgorithm};
use crate::error::ImageError;
use crate::pipeline::ImageOptions;
use crate::stream::DEFAULT_CHUNK_SIZE;

/// Global configuration loaded from `~/.config/dimg/config.toml`.
/// Every key is optional; missing keys take the built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DimgConfig {
    /// Bytes per read/write chunk.
    pub chunk_size: usize,
    /// Digest algorithms computed during copy and verify, in feed order.
    pub algorithms: Vec<DigestAlgorithm>,
    /// Read the next chunk while the current one is written and digested.
    pub read_ahead: bool,
    /// fsync the image before the verify pass reads it back.
    pub sync_destination: bool,
}

impl Default for DimgConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            algorithms: vec![DigestAlgorithm::Md5, DigestAlgorithm::Sha1],
            read_ahead: true,
            sync_destination: true,
        }
    }
}

impl DimgConfig {
    /// Validated pipeline options (fresh abort token, no progress channel).
    pub fn to_options(&self) -> Result<ImageOptions, ImageError> {
        let options = ImageOptions {
            chunk_size: self.chunk_size,
            algorithms: AlgorithmSet::new(self.algorithms.iter().copied())?,
            read_ahead: self.read_ahead,
            sync_destination: self.sync_destination,
            ..ImageOptions::default()
        };
        options.validate()?;
        Ok(options)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dimg")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DimgConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DimgConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: DimgConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = DimgConfig::default();
        assert_eq!(cfg.chunk_size, 1_048_576);
        assert_eq!(cfg.algorithms, vec![DigestAlgorithm::Md5, DigestAlgorithm::Sha1]);
        assert!(cfg.read_ahead);
        assert!(cfg.sync_destination);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = DimgConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: DimgConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.chunk_size, cfg.chunk_size);
        assert_eq!(parsed.algorithms, cfg.algorithms);
        assert_eq!(parsed.read_ahead, cfg.read_ahead);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            chunk_size = 65536
            algorithms = ["sha256", "sha-1", "md5"]
            read_ahead = false
        "#;
        let cfg: DimgConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.chunk_size, 65536);
        assert_eq!(
            cfg.algorithms,
            vec![DigestAlgorithm::Sha256, DigestAlgorithm::Sha1, DigestAlgorithm::Md5]
        );
        assert!(!cfg.read_ahead);
        assert!(cfg.sync_destination);
    }

    #[test]
    fn config_toml_empty_is_default() {
        let cfg: DimgConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(cfg.algorithms.len(), 2);
    }

    #[test]
    fn config_toml_unknown_algorithm_rejected() {
        assert!(toml::from_str::<DimgConfig>(r#"algorithms = ["crc32"]"#).is_err());
    }

    #[test]
    fn to_options_validates() {
        let opts = DimgConfig::default().to_options().unwrap();
        assert_eq!(opts.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(opts.algorithms, AlgorithmSet::default());

        let zero = DimgConfig {
            chunk_size: 0,
            ..DimgConfig::default()
        };
        assert!(zero.to_options().is_err());

        let none = DimgConfig {
            algorithms: Vec::new(),
            ..DimgConfig::default()
        };
        assert!(none.to_options().is_err());
    }
}
