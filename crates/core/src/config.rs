use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::currency::provider::DEFAULT_EXCHANGE_RATE_API_URL;
use crate::currency::CurrencyTable;
use crate::pricing::rates::RateTables;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub pricing: PricingConfig,
    pub currency: CurrencyConfig,
    pub export: ExportConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Default)]
pub struct PricingConfig {
    /// Replaces the built-in rate tables wholesale when set.
    pub rates_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct CurrencyConfig {
    pub default_code: String,
    pub refresh_on_startup: bool,
    pub api_base_url: String,
    pub api_key: Option<SecretString>,
    pub refresh_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub template_dir: Option<PathBuf>,
    pub company_name: String,
    pub wkhtmltopdf_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
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
    pub rates_path: Option<PathBuf>,
    pub default_currency: Option<String>,
    pub refresh_on_startup: Option<bool>,
    pub currency_api_key: Option<String>,
    pub template_dir: Option<PathBuf>,
    pub wkhtmltopdf_path: Option<PathBuf>,
    pub server_port: Option<u16>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
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
            pricing: PricingConfig::default(),
            currency: CurrencyConfig {
                default_code: "USD".to_string(),
                refresh_on_startup: false,
                api_base_url: DEFAULT_EXCHANGE_RATE_API_URL.to_string(),
                api_key: None,
                refresh_timeout_secs: 10,
            },
            export: ExportConfig {
                template_dir: None,
                company_name: "Picaquote".to_string(),
                wkhtmltopdf_path: None,
            },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8080 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
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

impl CurrencyConfig {
    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|key| !key.expose_secret().trim().is_empty())
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
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("picaquote.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Rate tables for this configuration: the configured file, or the built-in defaults.
    pub fn load_rate_tables(&self) -> Result<RateTables, ConfigError> {
        match &self.pricing.rates_path {
            Some(path) => RateTables::from_toml_file(path),
            None => Ok(RateTables::default()),
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(pricing) = patch.pricing {
            if let Some(rates_path) = pricing.rates_path {
                self.pricing.rates_path = Some(rates_path);
            }
        }

        if let Some(currency) = patch.currency {
            if let Some(default_code) = currency.default_code {
                self.currency.default_code = default_code;
            }
            if let Some(refresh_on_startup) = currency.refresh_on_startup {
                self.currency.refresh_on_startup = refresh_on_startup;
            }
            if let Some(api_base_url) = currency.api_base_url {
                self.currency.api_base_url = api_base_url;
            }
            if let Some(currency_api_key_value) = currency.api_key {
                self.currency.api_key = Some(secret_value(currency_api_key_value));
            }
            if let Some(refresh_timeout_secs) = currency.refresh_timeout_secs {
                self.currency.refresh_timeout_secs = refresh_timeout_secs;
            }
        }

        if let Some(export) = patch.export {
            if let Some(template_dir) = export.template_dir {
                self.export.template_dir = Some(template_dir);
            }
            if let Some(company_name) = export.company_name {
                self.export.company_name = company_name;
            }
            if let Some(wkhtmltopdf_path) = export.wkhtmltopdf_path {
                self.export.wkhtmltopdf_path = Some(wkhtmltopdf_path);
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
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
        if let Some(value) = read_env("PICAQUOTE_PRICING_RATES_PATH") {
            self.pricing.rates_path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("PICAQUOTE_CURRENCY_DEFAULT_CODE") {
            self.currency.default_code = value;
        }
        if let Some(value) = read_env("PICAQUOTE_CURRENCY_REFRESH_ON_STARTUP") {
            self.currency.refresh_on_startup =
                parse_bool("PICAQUOTE_CURRENCY_REFRESH_ON_STARTUP", &value)?;
        }
        if let Some(value) = read_env("PICAQUOTE_CURRENCY_API_BASE_URL") {
            self.currency.api_base_url = value;
        }
        if let Some(value) = read_env("PICAQUOTE_CURRENCY_API_KEY") {
            self.currency.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("PICAQUOTE_CURRENCY_REFRESH_TIMEOUT_SECS") {
            self.currency.refresh_timeout_secs =
                parse_u64("PICAQUOTE_CURRENCY_REFRESH_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PICAQUOTE_EXPORT_TEMPLATE_DIR") {
            self.export.template_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("PICAQUOTE_EXPORT_COMPANY_NAME") {
            self.export.company_name = value;
        }
        if let Some(value) = read_env("PICAQUOTE_EXPORT_WKHTMLTOPDF_PATH") {
            self.export.wkhtmltopdf_path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("PICAQUOTE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("PICAQUOTE_SERVER_PORT") {
            self.server.port = parse_u16("PICAQUOTE_SERVER_PORT", &value)?;
        }

        let log_level =
            read_env("PICAQUOTE_LOGGING_LEVEL").or_else(|| read_env("PICAQUOTE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PICAQUOTE_LOGGING_FORMAT").or_else(|| read_env("PICAQUOTE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(rates_path) = overrides.rates_path {
            self.pricing.rates_path = Some(rates_path);
        }
        if let Some(default_currency) = overrides.default_currency {
            self.currency.default_code = default_currency;
        }
        if let Some(refresh_on_startup) = overrides.refresh_on_startup {
            self.currency.refresh_on_startup = refresh_on_startup;
        }
        if let Some(currency_api_key) = overrides.currency_api_key {
            self.currency.api_key = Some(secret_value(currency_api_key));
        }
        if let Some(template_dir) = overrides.template_dir {
            self.export.template_dir = Some(template_dir);
        }
        if let Some(wkhtmltopdf_path) = overrides.wkhtmltopdf_path {
            self.export.wkhtmltopdf_path = Some(wkhtmltopdf_path);
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_currency(&self.currency)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("picaquote.toml"), PathBuf::from("config/picaquote.toml")]
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

fn validate_currency(currency: &CurrencyConfig) -> Result<(), ConfigError> {
    if currency.refresh_on_startup && !currency.has_api_key() {
        return Err(ConfigError::Validation(
            "currency.api_key is required when currency.refresh_on_startup is true. Get a key from https://www.exchangerate-api.com".to_string(),
        ));
    }

    let base_url = currency.api_base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "currency.api_base_url must start with http:// or https://".to_string(),
        ));
    }

    if currency.refresh_timeout_secs == 0 || currency.refresh_timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "currency.refresh_timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if !CurrencyTable::default().contains(&currency.default_code) {
        return Err(ConfigError::Validation(format!(
            "currency.default_code `{}` is not a configured currency",
            currency.default_code
        )));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
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

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
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
    pricing: Option<PricingPatch>,
    currency: Option<CurrencyPatch>,
    export: Option<ExportPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    rates_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct CurrencyPatch {
    default_code: Option<String>,
    refresh_on_startup: Option<bool>,
    api_base_url: Option<String>,
    api_key: Option<String>,
    refresh_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ExportPatch {
    template_dir: Option<PathBuf>,
    company_name: Option<String>,
    wkhtmltopdf_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal_macros::dec;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_validate_without_any_file() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.currency.default_code == "USD", "default currency should be USD")?;
        ensure(!config.currency.refresh_on_startup, "refresh should be off by default")?;
        ensure(config.currency.refresh_timeout_secs == 10, "default refresh timeout is 10s")?;
        ensure(config.server.port == 8080, "default port should be 8080")?;
        ensure(config.pricing.rates_path.is_none(), "no rates file by default")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_PICAQUOTE_RATE_KEY", "key-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("picaquote.toml");
            fs::write(
                &path,
                r#"
[currency]
refresh_on_startup = true
api_key = "${TEST_PICAQUOTE_RATE_KEY}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            let key = config.currency.api_key.as_ref().map(|key| key.expose_secret().to_string());
            ensure(
                key.as_deref() == Some("key-from-env"),
                "api key should be loaded from environment",
            )?;
            ensure(config.currency.refresh_on_startup, "refresh flag should come from file")
        })();

        clear_vars(&["TEST_PICAQUOTE_RATE_KEY"]);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&["TEST_PICAQUOTE_UNSET"]);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("picaquote.toml");
        fs::write(&path, "[export]\ncompany_name = \"${TEST_PICAQUOTE_UNSET}\"\n")
            .map_err(|err| err.to_string())?;

        let result = AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() });
        ensure(
            matches!(
                result,
                Err(ConfigError::MissingEnvInterpolation { ref var }) if var == "TEST_PICAQUOTE_UNSET"
            ),
            "missing variable should be named in the error",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PICAQUOTE_LOG_LEVEL", "warn");
        env::set_var("PICAQUOTE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["PICAQUOTE_LOG_LEVEL", "PICAQUOTE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PICAQUOTE_CURRENCY_DEFAULT_CODE", "AED");
        env::set_var("PICAQUOTE_SERVER_PORT", "9090");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("picaquote.toml");
            fs::write(
                &path,
                r#"
[currency]
default_code = "SAR"

[export]
company_name = "From File"

[server]
port = 7070

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    server_port: Some(6060),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.server.port == 6060, "override port should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.currency.default_code == "AED",
                "env currency should win over file and defaults",
            )?;
            ensure(config.export.company_name == "From File", "file value should win over default")
        })();

        clear_vars(&["PICAQUOTE_CURRENCY_DEFAULT_CODE", "PICAQUOTE_SERVER_PORT"]);
        result
    }

    #[test]
    fn invalid_env_override_names_the_variable() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PICAQUOTE_SERVER_PORT", "eighty");
        let result = AppConfig::load(LoadOptions::default());
        clear_vars(&["PICAQUOTE_SERVER_PORT"]);

        ensure(
            matches!(
                result,
                Err(ConfigError::InvalidEnvOverride { ref key, .. }) if key == "PICAQUOTE_SERVER_PORT"
            ),
            "invalid port should be reported with its variable",
        )
    }

    #[test]
    fn refresh_without_api_key_fails_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PICAQUOTE_CURRENCY_REFRESH_ON_STARTUP", "true");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("currency.api_key")
            );
            ensure(has_message, "validation failure should mention currency.api_key")
        })();

        clear_vars(&["PICAQUOTE_CURRENCY_REFRESH_ON_STARTUP"]);
        result
    }

    #[test]
    fn unknown_default_currency_fails_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                default_currency: Some("XYZ".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::Validation(ref message)) if message.contains("XYZ")),
            "unknown currency should be rejected",
        )
    }

    #[test]
    fn non_http_base_url_fails_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PICAQUOTE_CURRENCY_API_BASE_URL", "ftp://rates.example");
        let result = AppConfig::load(LoadOptions::default());
        clear_vars(&["PICAQUOTE_CURRENCY_API_BASE_URL"]);

        ensure(
            matches!(
                result,
                Err(ConfigError::Validation(ref message)) if message.contains("api_base_url")
            ),
            "base url scheme should be validated",
        )
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("absent.toml");

        let result = AppConfig::load(LoadOptions {
            config_path: Some(path.clone()),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(ref missing)) if *missing == path),
            "missing required file should be reported",
        )
    }

    #[test]
    fn rates_path_replaces_default_tables() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let rates_path = dir.path().join("rates.toml");
        fs::write(
            &rates_path,
            r#"
[energy]
"Warehouse" = 0.5

[supportPlans]
"8x5" = 0.1
"#,
        )
        .map_err(|err| err.to_string())?;

        let config = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides { rates_path: Some(rates_path), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;
        let rates = config.load_rate_tables().map_err(|err| err.to_string())?;

        ensure(rates.energy_rate("Warehouse") == dec!(0.5), "file energy rate should be used")?;
        ensure(rates.security_rate("Warehouse").is_zero(), "tables are replaced wholesale")
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PICAQUOTE_CURRENCY_API_KEY", "rate-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("rate-secret-value"), "debug output should not contain api key")?;
            ensure(config.currency.has_api_key(), "api key should be loaded")?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            Ok(())
        })();

        clear_vars(&["PICAQUOTE_CURRENCY_API_KEY"]);
        result
    }
}
