//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `--config FILE`
//! 2. `$PLANUM_CONFIG`
//! 3. `config.toml` in the platform config directory
//! 4. Built-in defaults (every field is optional)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use planum_calculus::QuadratureConfig;
use planum_optimize::{ExtremaConfig, LagrangeConfig};
use planum_regions::GreenOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "PLANUM_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub greens: GreenOptions,
    pub quadrature: QuadratureConfig,
    pub extrema: ExtremaConfig,
    pub lagrange: LagrangeConfig,
    pub output: OutputConfig,
}

/// How reports are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    /// Named by the user; must exist.
    Explicit(PathBuf),
    /// The platform default; may be absent.
    Default(PathBuf),
    None,
}

fn locate(flag: Option<PathBuf>, env: Option<PathBuf>, default: Option<PathBuf>) -> Source {
    if let Some(path) = flag.or(env) {
        return Source::Explicit(path);
    }
    default.map_or(Source::None, Source::Default)
}

/// The platform config file, e.g. `~/.config/planum/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "planum", "planum").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Loads the configuration following the lookup order.
pub fn load_config(flag: Option<PathBuf>) -> Result<Config> {
    let env = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()).map(PathBuf::from);
    match locate(flag, env, default_config_path()) {
        Source::Explicit(path) => read_config(&path),
        Source::Default(path) if path.exists() => read_config(&path),
        Source::Default(_) | Source::None => {
            debug!("using built-in configuration");
            Ok(Config::default())
        }
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = parse_config(&content).with_context(|| format!("parsing {}", path.display()))?;
    debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Parses TOML text; missing sections and fields take their defaults.
pub fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use planum_regions::{DiskMode, IntegrationOrder};

    #[test]
    fn test_empty_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = parse_config(
            r#"
            [greens]
            order = "x-then-y"
            disk_mode = "area"

            [quadrature]
            abs_tol = 1e-6

            [lagrange]
            seeds = 8

            [output]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.greens.order, IntegrationOrder::XThenY);
        assert_eq!(config.greens.disk_mode, DiskMode::Area);
        assert_eq!(config.greens.plot_samples, GreenOptions::default().plot_samples);
        assert!((config.quadrature.abs_tol - 1e-6).abs() < f64::EPSILON);
        assert_eq!(config.quadrature.max_subdivisions, QuadratureConfig::default().max_subdivisions);
        assert_eq!(config.lagrange.seeds, 8);
        assert_eq!(config.extrema, ExtremaConfig::default());
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_invalid_values() {
        assert!(parse_config("[greens]\norder = \"sideways\"").is_err());
        assert!(parse_config("[extrema]\nsamples = -1").is_err());
    }

    #[test]
    fn test_lookup_order() {
        let flag = Some(PathBuf::from("flag.toml"));
        let env = Some(PathBuf::from("env.toml"));
        let default = Some(PathBuf::from("default.toml"));
        assert_eq!(
            locate(flag.clone(), env.clone(), default.clone()),
            Source::Explicit(PathBuf::from("flag.toml"))
        );
        assert_eq!(
            locate(None, env, default.clone()),
            Source::Explicit(PathBuf::from("env.toml"))
        );
        assert_eq!(locate(None, None, default), Source::Default(PathBuf::from("default.toml")));
        assert_eq!(locate(None, None, None), Source::None);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = load_config(Some(PathBuf::from("/nonexistent/planum.toml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/planum.toml"));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let text = toml::to_string(&Config::default()).unwrap();
        assert_eq!(parse_config(&text).unwrap(), Config::default());
    }
}
