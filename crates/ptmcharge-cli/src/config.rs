use crate::error::{CliError, Result};
use ptmcharge::engine::config::{self as core_config, AgreementBands, EngineConfig};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSelectionConfig {
    enumeration_max_copies: Option<u64>,
    exact_max_copies: Option<u64>,
    fft_max_copies: Option<u64>,
    prefer_enumeration: Option<bool>,
    enumeration_max_combinations: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialFftConfig {
    min_operand_len: Option<usize>,
    noise_floor: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialGaussianConfig {
    tail_sigmas: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialNumericsConfig {
    max_drift: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialAgreementConfig {
    identical: Option<f64>,
    exact: Option<f64>,
    approximate: Option<f64>,
}

/// Engine configuration as read from TOML, with every value optional.
///
/// ```toml
/// [selection]
/// exact-max-copies = 80
///
/// [fft]
/// min-operand-len = 32
///
/// [agreement]
/// approximate = 0.05
/// ```
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialEngineConfig {
    selection: Option<PartialSelectionConfig>,
    fft: Option<PartialFftConfig>,
    gaussian: Option<PartialGaussianConfig>,
    numerics: Option<PartialNumericsConfig>,
    agreement: Option<PartialAgreementConfig>,
}

impl PartialEngineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading engine configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads the optional config file, applies `-S` overrides and validates the result.
    pub fn load(path: Option<&Path>, set_values: &[String]) -> Result<EngineConfig> {
        let partial = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        partial.merge_with_cli(set_values)
    }

    pub fn merge_with_cli(mut self, set_values: &[String]) -> Result<EngineConfig> {
        self.apply_set_values(set_values)?;

        let selection = self.selection.unwrap_or_default();
        let fft = self.fft.unwrap_or_default();
        let gaussian = self.gaussian.unwrap_or_default();
        let numerics = self.numerics.unwrap_or_default();
        let agreement = self.agreement.unwrap_or_default();

        let defaults = AgreementBands::default();
        let bands = AgreementBands {
            identical: agreement.identical.unwrap_or(defaults.identical),
            exact: agreement.exact.unwrap_or(defaults.exact),
            approximate: agreement.approximate.unwrap_or(defaults.approximate),
        };

        let mut builder = core_config::EngineConfigBuilder::new().agreement(bands);
        if let Some(n) = selection.enumeration_max_copies {
            builder = builder.enumeration_max_copies(n);
        }
        if let Some(n) = selection.exact_max_copies {
            builder = builder.exact_max_copies(n);
        }
        if let Some(n) = selection.fft_max_copies {
            builder = builder.fft_max_copies(n);
        }
        if let Some(prefer) = selection.prefer_enumeration {
            builder = builder.prefer_enumeration(prefer);
        }
        if let Some(cap) = selection.enumeration_max_combinations {
            builder = builder.enumeration_max_combinations(cap);
        }
        if let Some(len) = fft.min_operand_len {
            builder = builder.fft_min_operand_len(len);
        }
        if let Some(floor) = fft.noise_floor {
            builder = builder.fft_noise_floor(floor);
        }
        if let Some(k) = gaussian.tail_sigmas {
            builder = builder.tail_sigmas(k);
        }
        if let Some(drift) = numerics.max_drift {
            builder = builder.max_drift(drift);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            let value_str = value_str.trim();

            match key {
                "selection.enumeration-max-copies" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .enumeration_max_copies = Some(parse_value(key, value_str)?);
                }
                "selection.exact-max-copies" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .exact_max_copies = Some(parse_value(key, value_str)?);
                }
                "selection.fft-max-copies" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .fft_max_copies = Some(parse_value(key, value_str)?);
                }
                "selection.prefer-enumeration" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .prefer_enumeration = Some(parse_value(key, value_str)?);
                }
                "selection.enumeration-max-combinations" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .enumeration_max_combinations = Some(parse_value(key, value_str)?);
                }
                "fft.min-operand-len" => {
                    self.fft.get_or_insert_with(Default::default).min_operand_len =
                        Some(parse_value(key, value_str)?);
                }
                "fft.noise-floor" => {
                    self.fft.get_or_insert_with(Default::default).noise_floor =
                        Some(parse_value(key, value_str)?);
                }
                "gaussian.tail-sigmas" => {
                    self.gaussian.get_or_insert_with(Default::default).tail_sigmas =
                        Some(parse_value(key, value_str)?);
                }
                "numerics.max-drift" => {
                    self.numerics.get_or_insert_with(Default::default).max_drift =
                        Some(parse_value(key, value_str)?);
                }
                "agreement.identical" => {
                    self.agreement.get_or_insert_with(Default::default).identical =
                        Some(parse_value(key, value_str)?);
                }
                "agreement.exact" => {
                    self.agreement.get_or_insert_with(Default::default).exact =
                        Some(parse_value(key, value_str)?);
                }
                "agreement.approximate" => {
                    self.agreement
                        .get_or_insert_with(Default::default)
                        .approximate = Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            std::any::type_name::<T>(),
            key,
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    #[test]
    fn missing_file_and_overrides_yield_core_defaults() {
        let config = PartialEngineConfig::load(None, &[]).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn file_values_are_applied_over_defaults() {
        let path = write_config_file(
            "engine.toml",
            r#"
            [selection]
            exact-max-copies = 80
            prefer-enumeration = true

            [fft]
            min-operand-len = 16

            [agreement]
            approximate = 0.05
            "#,
        );
        let config = PartialEngineConfig::load(Some(&path), &[]).unwrap();
        assert_eq!(config.selection.exact_max_copies, 80);
        assert!(config.selection.prefer_enumeration);
        assert_eq!(config.selection.fft_max_copies, 200);
        assert_eq!(config.fft.min_operand_len, 16);
        assert_eq!(config.agreement.approximate, 0.05);
        assert_eq!(config.agreement.exact, 1e-6);
    }

    #[test]
    fn set_values_override_file_values() {
        let path = write_config_file(
            "engine_set.toml",
            r#"
            [gaussian]
            tail-sigmas = 5.0 # Will be overridden by --set
            "#,
        );
        let set_values = vec![
            "gaussian.tail-sigmas=8".to_string(),
            "numerics.max-drift = 1e-8".to_string(),
        ];
        let config = PartialEngineConfig::load(Some(&path), &set_values).unwrap();
        assert_eq!(config.gaussian.tail_sigmas, 8.0);
        assert_eq!(config.numerics.max_drift, 1e-8);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let path = write_config_file("engine_unknown.toml", "[fft]\nwindow = 3\n");
        let result = PartialEngineConfig::load(Some(&path), &[]);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));

        let result = PartialEngineConfig::load(None, &["fft.window=3".to_string()]);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        let result = PartialEngineConfig::load(None, &["selection.exact-max-copies".to_string()]);
        assert!(matches!(result, Err(CliError::Config(_))));

        let result =
            PartialEngineConfig::load(None, &["selection.exact-max-copies=many".to_string()]);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("exact-max-copies")));
    }

    #[test]
    fn core_validation_errors_surface_as_config_errors() {
        let result = PartialEngineConfig::load(None, &["selection.fft-max-copies=10".to_string()]);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("exact_max_copies")));
    }
}
