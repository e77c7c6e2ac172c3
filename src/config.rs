use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::{LaplaceError, LaplaceResult};
use crate::mechanism::LaplaceMechanism;
use crate::series::SeriesParams;
use crate::types::{PrivacyBudget, Sensitivity};

pub const DEFAULT_OUTPUT: &str = "laplace_noise_timeseries_grid.png";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ConfigFormat {
    Auto,
    Toml,
    Yaml,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {format:?} config: {details}")]
    Parse {
        format: ConfigFormat,
        details: String,
    },
    #[error("configuration invalid: {0}")]
    Validation(String),
}

/// Every knob of one run. Missing keys fall back to the stock demo values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExperimentConfig {
    pub length: usize,
    pub peak: f64,
    pub noise_std: f64,
    pub series_seed: u64,
    pub epsilons: Vec<f64>,
    pub sensitivity: f64,
    /// Shared by every ε so the panels stay comparable.
    pub noise_seed: u64,
    pub output: PathBuf,
    pub dpi: u32,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        let series = SeriesParams::default();
        Self {
            length: series.len,
            peak: series.peak,
            noise_std: series.noise_std,
            series_seed: series.seed,
            epsilons: vec![0.2, 1.0, 5.0],
            sensitivity: 1.0,
            noise_seed: 123,
            output: PathBuf::from(DEFAULT_OUTPUT),
            dpi: 300,
        }
    }
}

impl ExperimentConfig {
    pub fn series_params(&self) -> SeriesParams {
        SeriesParams {
            len: self.length,
            peak: self.peak,
            noise_std: self.noise_std,
            seed: self.series_seed,
        }
    }

    /// One mechanism per configured ε, in config order.
    pub fn mechanisms(&self) -> LaplaceResult<Vec<LaplaceMechanism>> {
        if self.epsilons.is_empty() {
            return Err(LaplaceError::invalid("epsilons", "at least one privacy budget is required"));
        }
        let sensitivity = Sensitivity::new(self.sensitivity)?;
        self.epsilons
            .iter()
            .map(|eps| {
                PrivacyBudget::new(*eps)
                    .and_then(|epsilon| LaplaceMechanism::new(epsilon, sensitivity))
            })
            .collect()
    }

    pub fn validate(&self) -> LaplaceResult<()> {
        self.series_params().validate()?;
        self.mechanisms()?;
        if self.dpi == 0 {
            return Err(LaplaceError::invalid("dpi", "must be greater than zero"));
        }
        Ok(())
    }
}

pub fn load_config(path: &Path, format: ConfigFormat) -> Result<ExperimentConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&contents, resolve_format(path, format))?;
    config
        .validate()
        .map_err(|err| ConfigError::Validation(err.to_string()))?;
    Ok(config)
}

pub fn parse_config(contents: &str, format: ConfigFormat) -> Result<ExperimentConfig, ConfigError> {
    match format {
        ConfigFormat::Toml | ConfigFormat::Auto => {
            toml::from_str(contents).map_err(|err| ConfigError::Parse {
                format: ConfigFormat::Toml,
                details: err.to_string(),
            })
        }
        ConfigFormat::Yaml => serde_yaml::from_str(contents).map_err(|err| ConfigError::Parse {
            format,
            details: err.to_string(),
        }),
    }
}

fn resolve_format(path: &Path, format: ConfigFormat) -> ConfigFormat {
    match format {
        ConfigFormat::Auto => match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Toml,
        },
        _ => format,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_run() {
        let config = ExperimentConfig::default();
        assert_eq!(config.length, 40);
        assert_eq!(config.epsilons, vec![0.2, 1.0, 5.0]);
        assert_eq!(config.noise_seed, 123);
        assert_eq!(config.output, PathBuf::from("laplace_noise_timeseries_grid.png"));
        config.validate().unwrap();
    }

    #[test]
    fn detects_bad_epsilons() {
        let mut config = ExperimentConfig::default();
        config.epsilons.clear();
        assert!(config.validate().unwrap_err().is_invalid_parameter());
        config.epsilons = vec![1.0, 0.0];
        assert!(config.validate().is_err());
        config.epsilons = vec![1.0];
        config.sensitivity = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_partial_toml_config() {
        let contents = r#"
            length = 60
            epsilons = [0.5, 2.0]
            noise-seed = 7
        "#;
        let config = parse_config(contents, ConfigFormat::Toml).unwrap();
        assert_eq!(
            config,
            ExperimentConfig {
                length: 60,
                epsilons: vec![0.5, 2.0],
                noise_seed: 7,
                ..ExperimentConfig::default()
            }
        );
    }

    #[test]
    fn parses_yaml_config() {
        let contents = r#"
            peak: 80.0
            noise-std: 0.0
            output: out/grid.png
        "#;
        let config = parse_config(contents, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.peak, 80.0);
        assert_eq!(config.noise_std, 0.0);
        assert_eq!(config.output, PathBuf::from("out/grid.png"));
    }

    #[test]
    fn load_picks_format_from_extension_and_validates() {
        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(yaml, "epsilons: [1.0, 3.0]").unwrap();
        let config = load_config(yaml.path(), ConfigFormat::Auto).unwrap();
        assert_eq!(config.epsilons, vec![1.0, 3.0]);

        let mut toml_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(toml_file, "epsilons = [-1.0]").unwrap();
        let err = load_config(toml_file.path(), ConfigFormat::Auto).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("does/not/exist.toml"), ConfigFormat::Auto).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
