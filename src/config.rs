//! Optional JSON run configuration.
//!
//! ```json
//! {
//!   "operation": "edges",
//!   "params": { "threshold1": 50, "threshold2": 150, "kernel_size": 5 },
//!   "output": { "format": "png", "quality": 90 }
//! }
//! ```
//!
//! Every section and field is optional. Numeric parameters are read wide and
//! clamped later, so out-of-range values never fail parsing.
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::{OperationKind, ParameterSet};
use crate::io::{DEFAULT_QUALITY, SaveFormat};

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(p, e) => write!(f, "Failed to read config {}: {}", p.display(), e),
            ConfigError::Parse(p, e) => write!(f, "Failed to parse config {}: {}", p.display(), e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub operation: Option<OperationKind>,
    pub params: ParamsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ParamsConfig {
    pub threshold1: Option<i64>,
    pub threshold2: Option<i64>,
    pub kernel_size: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: Option<String>,
    pub quality: Option<i64>,
}

impl RunConfig {
    /// Merge overrides (e.g. command-line flags) on top of this file's values
    /// and the built-in defaults, clamping into range.
    pub fn resolve_params(&self, t1: Option<i64>, t2: Option<i64>, k: Option<i64>) -> ParameterSet {
        let d = ParameterSet::default();
        ParameterSet::clamped(
            t1.or(self.params.threshold1).unwrap_or(d.threshold1 as i64),
            t2.or(self.params.threshold2).unwrap_or(d.threshold2 as i64),
            k.or(self.params.kernel_size).unwrap_or(d.kernel_size as i64),
        )
    }

    pub fn resolve_operation(&self, cli: Option<&str>) -> OperationKind {
        match cli {
            Some(name) => OperationKind::from_name(name),
            None => self.operation.unwrap_or_default(),
        }
    }

    /// Output format named in the file, if it names a known one.
    pub fn format(&self) -> Option<SaveFormat> {
        let name = self.output.format.as_deref()?;
        let format = SaveFormat::from_name(name);
        if format.is_none() {
            log_warn!("Config names unknown output format '{}', ignoring it", name);
        }
        format
    }

    /// JPEG quality, clamped to 1..=100.
    pub fn quality(&self, cli: Option<i64>) -> u8 {
        cli.or(self.output.quality)
            .unwrap_or(DEFAULT_QUALITY as i64)
            .clamp(1, 100) as u8
    }
}

pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let data = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
    parse_config(&data).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
}

pub fn parse_config(data: &str) -> Result<RunConfig, serde_json::Error> {
    serde_json::from_str(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let cfg = parse_config("{}").unwrap();
        assert_eq!(cfg.resolve_params(None, None, None), ParameterSet::default());
        assert_eq!(cfg.resolve_operation(None), OperationKind::Identity);
        assert_eq!(cfg.quality(None), DEFAULT_QUALITY);
        assert_eq!(cfg.format(), None);
    }

    #[test]
    fn cli_overrides_file_which_overrides_defaults() {
        let cfg = parse_config(
            r#"{"operation": "erode", "params": {"threshold1": 10, "kernel_size": 8}}"#,
        )
        .unwrap();
        let p = cfg.resolve_params(None, Some(99), Some(3));
        assert_eq!(p, ParameterSet::new(10, 99, 3));
        assert_eq!(cfg.resolve_operation(None), OperationKind::Erode);
        assert_eq!(cfg.resolve_operation(Some("blur")), OperationKind::Blur);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = parse_config(r#"{"params": {"threshold1": -4, "threshold2": 900, "kernel_size": 64}}"#)
            .unwrap();
        assert_eq!(cfg.resolve_params(None, None, None), ParameterSet::new(0, 255, 31));
    }

    #[test]
    fn output_section_is_read() {
        let cfg = parse_config(r#"{"output": {"format": "jpeg", "quality": 120}}"#).unwrap();
        assert_eq!(cfg.format(), Some(SaveFormat::Jpeg));
        assert_eq!(cfg.quality(None), 100);
        assert_eq!(cfg.quality(Some(40)), 40);
    }

    #[test]
    fn wild_quality_and_unknown_format_still_parse() {
        let cfg = parse_config(r#"{"output": {"format": "gif", "quality": 300}}"#).unwrap();
        assert_eq!(cfg.quality(None), 100);
        assert_eq!(cfg.format(), None);
        let cfg = parse_config(r#"{"output": {"quality": -7}}"#).unwrap();
        assert_eq!(cfg.quality(None), 1);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let path = std::env::temp_dir().join(format!("filterlab-cfg-{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();
        let res = load_config(&path);
        let _ = fs::remove_file(&path);
        assert!(matches!(res, Err(ConfigError::Parse(..))));
    }
}
