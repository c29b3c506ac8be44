use anyhow::{Context, Result};
use http::HeaderName;
use serde::Deserialize;
use std::path::Path;

use crate::constants::{LAST_MODIFIED, RAVEN_LAST_MODIFIED};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub dates: DatesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetadataConfig {
    /// Filtered from user-visible metadata on top of the built-in set.
    #[serde(default)]
    pub extra_ignored_headers: Vec<String>,
    #[serde(default = "default_parse_structured")]
    pub parse_structured_header_values: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            extra_ignored_headers: Vec::new(),
            parse_structured_header_values: true,
        }
    }
}

fn default_parse_structured() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatesConfig {
    #[serde(default = "default_store_last_modified")]
    pub store_last_modified: String,
}

impl Default for DatesConfig {
    fn default() -> Self {
        Self {
            store_last_modified: default_store_last_modified(),
        }
    }
}

fn default_store_last_modified() -> String {
    RAVEN_LAST_MODIFIED.to_string()
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).with_context(|| "Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let store = &self.dates.store_last_modified;
        check_header_name("dates.store_last_modified", store)?;
        if store.eq_ignore_ascii_case(LAST_MODIFIED) {
            anyhow::bail!(
                "dates.store_last_modified must differ from the standard '{}' header",
                LAST_MODIFIED
            );
        }

        for (i, name) in self.metadata.extra_ignored_headers.iter().enumerate() {
            check_header_name(&format!("metadata.extra_ignored_headers[{}]", i), name)?;
        }

        Ok(())
    }
}

/// Names are matched verbatim against header names, so padding or
/// characters outside the header token set could never match.
fn check_header_name(field: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("{} must not be empty", field);
    }
    if name.trim() != name {
        anyhow::bail!("{} has surrounding whitespace: '{}'", field, name);
    }
    HeaderName::from_bytes(name.as_bytes())
        .with_context(|| format!("{} is not a valid header name: '{}'", field, name))?;
    Ok(())
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    Config::from_toml_str(&content)
}
