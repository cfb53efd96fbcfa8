use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data: DataConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
}

/// File locations for the declarative tables and the flat stores.
#[derive(Clone, Debug)]
pub struct DataConfig {
    pub rules_file: Option<PathBuf>,
    pub profiles_file: Option<PathBuf>,
    pub input_csv: PathBuf,
    pub output_csv: PathBuf,
    pub audit_log: PathBuf,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
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
    pub rules_file: Option<PathBuf>,
    pub profiles_file: Option<PathBuf>,
    pub input_csv: Option<PathBuf>,
    pub output_csv: Option<PathBuf>,
    pub audit_log: Option<PathBuf>,
    pub llm_enabled: Option<bool>,
    pub log_level: Option<String>,
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
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                rules_file: None,
                profiles_file: None,
                input_csv: PathBuf::from("leads.csv"),
                output_csv: PathBuf::from("classified_leads_output.csv"),
                audit_log: PathBuf::from("interaction_audit.json"),
            },
            llm: LlmConfig {
                enabled: false,
                base_url: "http://localhost:11434".to_string(),
                model: "llama3.1".to_string(),
                api_key: None,
                timeout_secs: 30,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
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
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("leadgate.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(data) = patch.data {
            if let Some(rules_file) = data.rules_file {
                self.data.rules_file = Some(rules_file);
            }
            if let Some(profiles_file) = data.profiles_file {
                self.data.profiles_file = Some(profiles_file);
            }
            if let Some(input_csv) = data.input_csv {
                self.data.input_csv = input_csv;
            }
            if let Some(output_csv) = data.output_csv {
                self.data.output_csv = output_csv;
            }
            if let Some(audit_log) = data.audit_log {
                self.data.audit_log = audit_log;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(enabled) = llm.enabled {
                self.llm.enabled = enabled;
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(api_key_value) = llm.api_key {
                self.llm.api_key = Some(api_key_value.into());
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("LEADGATE_DATA_RULES_FILE") {
            self.data.rules_file = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("LEADGATE_DATA_PROFILES_FILE") {
            self.data.profiles_file = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("LEADGATE_DATA_INPUT_CSV") {
            self.data.input_csv = PathBuf::from(value);
        }
        if let Some(value) = read_env("LEADGATE_DATA_OUTPUT_CSV") {
            self.data.output_csv = PathBuf::from(value);
        }
        if let Some(value) = read_env("LEADGATE_DATA_AUDIT_LOG") {
            self.data.audit_log = PathBuf::from(value);
        }

        if let Some(value) = read_env("LEADGATE_LLM_ENABLED") {
            self.llm.enabled = parse_bool("LEADGATE_LLM_ENABLED", &value)?;
        }
        if let Some(value) = read_env("LEADGATE_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("LEADGATE_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("LEADGATE_LLM_API_KEY") {
            self.llm.api_key = Some(value.into());
        }
        if let Some(value) = read_env("LEADGATE_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("LEADGATE_LLM_TIMEOUT_SECS", &value)?;
        }

        let log_level =
            read_env("LEADGATE_LOGGING_LEVEL").or_else(|| read_env("LEADGATE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("LEADGATE_LOGGING_FORMAT").or_else(|| read_env("LEADGATE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(rules_file) = overrides.rules_file {
            self.data.rules_file = Some(rules_file);
        }
        if let Some(profiles_file) = overrides.profiles_file {
            self.data.profiles_file = Some(profiles_file);
        }
        if let Some(input_csv) = overrides.input_csv {
            self.data.input_csv = input_csv;
        }
        if let Some(output_csv) = overrides.output_csv {
            self.data.output_csv = output_csv;
        }
        if let Some(audit_log) = overrides.audit_log {
            self.data.audit_log = audit_log;
        }
        if let Some(llm_enabled) = overrides.llm_enabled {
            self.llm.enabled = llm_enabled;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_data(&self.data)?;
        validate_llm(&self.llm)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("leadgate.toml"), PathBuf::from("config/leadgate.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_data(data: &DataConfig) -> Result<(), ConfigError> {
    for (field, path) in [
        ("data.input_csv", &data.input_csv),
        ("data.output_csv", &data.output_csv),
        ("data.audit_log", &data.audit_log),
    ] {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!("{field} must not be empty")));
        }
    }

    if data.input_csv == data.output_csv {
        return Err(ConfigError::Validation(
            "data.input_csv and data.output_csv must be different files".to_string(),
        ));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if llm.enabled {
        let base_url = llm.base_url.trim();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "llm.base_url must start with http:// or https:// when llm.enabled is true"
                    .to_string(),
            ));
        }
        if llm.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "llm.model is required when llm.enabled is true".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    data: Option<DataPatch>,
    llm: Option<LlmPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DataPatch {
    rules_file: Option<PathBuf>,
    profiles_file: Option<PathBuf>,
    input_csv: Option<PathBuf>,
    output_csv: Option<PathBuf>,
    audit_log: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    enabled: Option<bool>,
    base_url: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
