use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::models::{same_commodity, PerishabilityClass};
use crate::pipeline::EngineConfig;

pub const DEFAULT_CONFIG_FILE: &str = "harvest-advisor.toml";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub engine: EngineConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub trailing_window: Option<usize>,
    pub reference_quantity: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
            engine: EngineConfig::default(),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides(read_env)?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        if let Some(analysis) = patch.analysis {
            if let Some(trailing_window) = analysis.trailing_window {
                self.engine.trailing_window = trailing_window;
            }
        }

        if let Some(classification) = patch.classification {
            let target = &mut self.engine.classification;
            if let Some(perishability) = classification.perishability {
                merge_commodity_table(&mut target.perishability, perishability);
            }
            if let Some(default_class) = classification.default_class {
                target.default_class = default_class.into_class();
            }
            if let Some(monsoon_months) = classification.monsoon_months {
                target.monsoon_months = monsoon_months;
            }
        }

        if let Some(economics) = patch.economics {
            let target = &mut self.engine.economics;
            if let Some(value) = economics.reference_quantity {
                target.reference_quantity = value;
            }
            if let Some(value) = economics.cold_storage_cost_per_day_per_unit {
                target.cold_storage_cost_per_day_per_unit = value;
            }
            if let Some(value) = economics.storage_days {
                target.storage_days = value;
            }
            if let Some(value) = economics.expected_price_recovery_pct {
                target.expected_price_recovery_pct = value;
            }
            if let Some(value) = economics.drying_cost_per_unit {
                target.drying_cost_per_unit = value;
            }
            if let Some(value) = economics.price_basis {
                target.price_basis = Some(value);
            }
            if let Some(table) = economics.dry_yield_ratio {
                merge_commodity_table(&mut target.dry_yield_ratio, table);
            }
            if let Some(table) = economics.dried_market_price {
                merge_commodity_table(&mut target.dried_market_price, table);
            }
        }
    }

    fn apply_env_overrides(
        &mut self,
        read_env: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = read_env("HARVEST_ADVISOR_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("HARVEST_ADVISOR_LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }
        if let Some(value) = read_env("HARVEST_ADVISOR_TRAILING_WINDOW") {
            self.engine.trailing_window = parse_env("HARVEST_ADVISOR_TRAILING_WINDOW", &value)?;
        }
        if let Some(value) = read_env("HARVEST_ADVISOR_REFERENCE_QUANTITY") {
            self.engine.economics.reference_quantity =
                parse_env("HARVEST_ADVISOR_REFERENCE_QUANTITY", &value)?;
        }
        if let Some(value) = read_env("HARVEST_ADVISOR_STORAGE_DAYS") {
            self.engine.economics.storage_days =
                parse_env("HARVEST_ADVISOR_STORAGE_DAYS", &value)?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(trailing_window) = overrides.trailing_window {
            self.engine.trailing_window = trailing_window;
        }
        if let Some(reference_quantity) = overrides.reference_quantity {
            self.engine.economics.reference_quantity = reference_quantity;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation("logging.level must not be empty".to_string()));
        }
        self.logging.filter()?;
        self.engine
            .validate()
            .map_err(|error| ConfigError::Validation(error.to_string()))
    }
}

impl LoggingConfig {
    /// Level or `tracing` filter directives, e.g. `info` or `harvest_advisor=debug`.
    pub fn filter(&self) -> Result<EnvFilter, ConfigError> {
        EnvFilter::try_new(self.level.trim()).map_err(|error| {
            ConfigError::Validation(format!("invalid logging.level `{}`: {error}", self.level))
        })
    }
}

/// Patch entries replace any existing key naming the same commodity.
fn merge_commodity_table<V>(target: &mut BTreeMap<String, V>, patch: BTreeMap<String, V>) {
    for (commodity, value) in patch {
        target.retain(|existing, _| !same_commodity(existing, &commodity));
        target.insert(commodity.trim().to_owned(), value);
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    logging: Option<LoggingPatch>,
    analysis: Option<AnalysisPatch>,
    classification: Option<ClassificationPatch>,
    economics: Option<EconomicsPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisPatch {
    trailing_window: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ClassificationPatch {
    perishability: Option<BTreeMap<String, PerishabilityClass>>,
    default_class: Option<DefaultClass>,
    monsoon_months: Option<BTreeSet<u32>>,
}

/// `default_class = "none"` turns unknown commodities into errors.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DefaultClass {
    High,
    Medium,
    Low,
    None,
}

impl DefaultClass {
    fn into_class(self) -> Option<PerishabilityClass> {
        match self {
            Self::High => Some(PerishabilityClass::High),
            Self::Medium => Some(PerishabilityClass::Medium),
            Self::Low => Some(PerishabilityClass::Low),
            Self::None => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct EconomicsPatch {
    reference_quantity: Option<f64>,
    cold_storage_cost_per_day_per_unit: Option<f64>,
    storage_days: Option<u32>,
    expected_price_recovery_pct: Option<f64>,
    drying_cost_per_unit: Option<f64>,
    price_basis: Option<f64>,
    dry_yield_ratio: Option<BTreeMap<String, f64>>,
    dried_market_price: Option<BTreeMap<String, f64>>,
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }
    if let Some(path) = read_env("HARVEST_ADVISOR_CONFIG").map(PathBuf::from) {
        return path.exists().then_some(path);
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.exists().then_some(default)
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    parse_patch(path, &raw)
}

fn parse_patch(path: &Path, raw: &str) -> Result<ConfigPatch, ConfigError> {
    toml::from_str(raw).map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    fn load_from(file: &tempfile::NamedTempFile) -> Result<AppConfig, ConfigError> {
        AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
    }

    #[test]
    fn file_patch_merges_commodity_tables() {
        let file = write_config(
            r#"
            [logging]
            format = "json"

            [classification]
            default_class = "none"

            [classification.perishability]
            Okra = "high"

            [economics]
            storage_days = 21

            [economics.dry_yield_ratio]
            Okra = 0.1
            "#,
        );

        let config = load_from(&file).expect("config loads");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.engine.classification.default_class, None);
        assert_eq!(
            config.engine.classification.perishability.get("Okra"),
            Some(&PerishabilityClass::High)
        );
        assert!(config.engine.classification.perishability.contains_key("Tomato"));
        assert_eq!(config.engine.economics.storage_days, 21);
        assert_eq!(config.engine.economics.dry_yield_ratio.get("Okra"), Some(&0.1));
        assert!(config.engine.economics.dry_yield_ratio.contains_key("Onion"));
    }

    #[test]
    fn explicit_overrides_win_over_file() {
        let file = write_config("[analysis]\ntrailing_window = 3\n");
        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides {
                trailing_window: Some(9),
                ..ConfigOverrides::default()
            },
        })
        .expect("config loads");
        assert_eq!(config.engine.trailing_window, 9);
    }

    #[test]
    fn invalid_values_fail_validation() {
        let file = write_config("[economics]\nreference_quantity = 0.0\n");
        assert!(matches!(load_from(&file), Err(ConfigError::Validation(_))));

        let file = write_config("[classification]\nmonsoon_months = [6, 13]\n");
        assert!(matches!(load_from(&file), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let file = write_config("[economics\nstorage_days = 3");
        assert!(matches!(load_from(&file), Err(ConfigError::ParseFile { .. })));
    }

    #[test]
    fn missing_required_file_is_reported() {
        let result = AppConfig::load(LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/harvest-advisor.toml")),
            require_file: true,
            overrides: ConfigOverrides::default(),
        });
        assert!(matches!(result, Err(ConfigError::MissingConfigFile(_))));
    }

    #[test]
    fn demo_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/harvest-advisor.toml");
        let config = AppConfig::load(LoadOptions {
            config_path: Some(path),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect("demo config loads");
        assert_eq!(config.engine.economics.price_basis, Some(100.0));
        assert_eq!(
            config.engine.classification.perishability_of("brinjal").ok(),
            Some(PerishabilityClass::High)
        );
    }

    #[test]
    fn overrides_replace_defaults_regardless_of_case() {
        let file = write_config(
            r#"
            [classification.perishability]
            tomato = "low"

            [economics.dry_yield_ratio]
            TOMATO = 0.5

            [economics.dried_market_price]
            " onion " = 250.0
            "#,
        );

        let config = load_from(&file).expect("config loads");
        let classification = &config.engine.classification;
        let economics = &config.engine.economics;
        assert_eq!(classification.perishability_of("Tomato").ok(), Some(PerishabilityClass::Low));
        assert_eq!(economics.dry_yield_for("Tomato").ok(), Some(0.5));
        assert_eq!(economics.dried_price_for("Onion").ok(), Some(250.0));
        assert!(!classification.perishability.contains_key("Tomato"));
        assert_eq!(
            economics.dried_market_price.keys().filter(|k| same_commodity(k, "onion")).count(),
            1
        );
    }

    #[test]
    fn env_overrides_apply_to_config() {
        let vars: BTreeMap<&str, &str> = [
            ("HARVEST_ADVISOR_LOG_LEVEL", "debug"),
            ("HARVEST_ADVISOR_LOG_FORMAT", "Pretty"),
            ("HARVEST_ADVISOR_TRAILING_WINDOW", "3"),
            ("HARVEST_ADVISOR_REFERENCE_QUANTITY", "250"),
            ("HARVEST_ADVISOR_STORAGE_DAYS", " 21 "),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env_overrides(|key| vars.get(key).map(|value| value.to_string()))
            .expect("env overrides apply");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.engine.trailing_window, 3);
        assert_eq!(config.engine.economics.reference_quantity, 250.0);
        assert_eq!(config.engine.economics.storage_days, 21);
    }

    #[test]
    fn bad_env_override_is_rejected_with_its_key() {
        let mut config = AppConfig::default();
        let result = config.apply_env_overrides(|key| {
            (key == "HARVEST_ADVISOR_STORAGE_DAYS").then(|| "two weeks".to_string())
        });
        match result {
            Err(ConfigError::InvalidEnvOverride { key, value }) => {
                assert_eq!(key, "HARVEST_ADVISOR_STORAGE_DAYS");
                assert_eq!(value, "two weeks");
            }
            other => panic!("expected InvalidEnvOverride, got {other:?}"),
        }
        assert_eq!(config.engine.economics.storage_days, 14);

        let mut config = AppConfig::default();
        let result = config.apply_env_overrides(|key| {
            (key == "HARVEST_ADVISOR_LOG_FORMAT").then(|| "xml".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn log_level_accepts_levels_and_directives() {
        let mut logging = AppConfig::default().logging;
        assert!(logging.filter().is_ok());

        logging.level = "warn,harvest_advisor=debug".to_string();
        assert!(logging.filter().is_ok());

        logging.level = "harvest_advisor=loud".to_string();
        assert!(matches!(logging.filter(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn invalid_log_level_fails_load() {
        let file = write_config("[logging]\nlevel = \"harvest_advisor=loud\"\n");
        assert!(matches!(load_from(&file), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn log_format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormat>().ok(), Some(LogFormat::Json));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn env_values_parse_or_report_key() {
        assert_eq!(parse_env::<usize>("KEY", " 4 ").ok(), Some(4));
        assert!(matches!(
            parse_env::<usize>("KEY", "four"),
            Err(ConfigError::InvalidEnvOverride { .. })
        ));
    }
}
