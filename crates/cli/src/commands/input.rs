use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use picaquote_core::QuoteDocument;

/// Reads a quote document, as TOML for `.toml` files and JSON otherwise.
pub fn load_quote(path: &Path) -> Result<QuoteDocument> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read quote file `{}`", path.display()))?;

    let is_toml = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&raw)
            .with_context(|| format!("could not parse quote file `{}` as TOML", path.display()))
    } else {
        serde_json::from_str(&raw)
            .with_context(|| format!("could not parse quote file `{}` as JSON", path.display()))
    }
}
