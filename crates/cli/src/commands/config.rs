use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use picaquote_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run(options: &LoadOptions) -> String {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "pricing.rates_path",
        &display_path(config.pricing.rates_path.as_deref()),
        source("pricing.rates_path", &["PICAQUOTE_PRICING_RATES_PATH"]),
    ));

    lines.push(render_line(
        "currency.default_code",
        &config.currency.default_code,
        source("currency.default_code", &["PICAQUOTE_CURRENCY_DEFAULT_CODE"]),
    ));
    lines.push(render_line(
        "currency.refresh_on_startup",
        &config.currency.refresh_on_startup.to_string(),
        source("currency.refresh_on_startup", &["PICAQUOTE_CURRENCY_REFRESH_ON_STARTUP"]),
    ));
    lines.push(render_line(
        "currency.api_base_url",
        &config.currency.api_base_url,
        source("currency.api_base_url", &["PICAQUOTE_CURRENCY_API_BASE_URL"]),
    ));
    let api_key = if config.currency.has_api_key() { "<redacted>" } else { "<unset>" };
    lines.push(render_line(
        "currency.api_key",
        api_key,
        source("currency.api_key", &["PICAQUOTE_CURRENCY_API_KEY"]),
    ));
    lines.push(render_line(
        "currency.refresh_timeout_secs",
        &config.currency.refresh_timeout_secs.to_string(),
        source("currency.refresh_timeout_secs", &["PICAQUOTE_CURRENCY_REFRESH_TIMEOUT_SECS"]),
    ));

    lines.push(render_line(
        "export.template_dir",
        &display_path(config.export.template_dir.as_deref()),
        source("export.template_dir", &["PICAQUOTE_EXPORT_TEMPLATE_DIR"]),
    ));
    lines.push(render_line(
        "export.company_name",
        &config.export.company_name,
        source("export.company_name", &["PICAQUOTE_EXPORT_COMPANY_NAME"]),
    ));
    lines.push(render_line(
        "export.wkhtmltopdf_path",
        &display_path(config.export.wkhtmltopdf_path.as_deref()),
        source("export.wkhtmltopdf_path", &["PICAQUOTE_EXPORT_WKHTMLTOPDF_PATH"]),
    ));

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        source("server.bind_address", &["PICAQUOTE_SERVER_BIND_ADDRESS"]),
    ));
    lines.push(render_line(
        "server.port",
        &config.server.port.to_string(),
        source("server.port", &["PICAQUOTE_SERVER_PORT"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["PICAQUOTE_LOGGING_LEVEL", "PICAQUOTE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["PICAQUOTE_LOGGING_FORMAT", "PICAQUOTE_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("picaquote.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/picaquote.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|path| path.display().to_string()).unwrap_or_else(|| "<unset>".to_string())
}
