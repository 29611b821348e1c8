//! Layer configuration from `dex.toml` and the environment.
use std::env;
use std::path::{Path, PathBuf};

use dex_content::ConfigLoader;
use serde::{Deserialize, Serialize};

use crate::error::{DexError, Result};

/// Settings of one [`Dex`](crate::Dex) instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DexConfig {
    /// Root of the static documents (`species/`, `spawn_pool_world/`).
    pub data_dir: Option<PathBuf>,
    /// Locale used for tag display names when a query names none.
    pub locale: String,
    /// Start every background build as soon as the layer is created.
    pub background: bool,
    pub session_id: Option<String>,
}

impl Default for DexConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            locale: "en_us".to_string(),
            background: true,
            session_id: None,
        }
    }
}

impl DexConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `DEX_DATA_DIR` - Static document root (default: none)
    /// - `DEX_LOCALE` - Default locale (default: `en_us`)
    /// - `DEX_BACKGROUND` - Warm up in the background on start (default: true)
    /// - `DEX_SESSION_ID` - Session identifier used in log spans (optional)
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Loads `path` if it exists, then applies environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            ConfigLoader::load::<Self>(path).map_err(|e| DexError::Config(format!("{e:#}")))?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        Ok(config.with_overrides(|key| env::var(key).ok()))
    }

    /// Applies overrides read through `lookup`; unset or unparsable values
    /// keep the current setting.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup("DEX_DATA_DIR").filter(|d| !d.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(locale) = lookup("DEX_LOCALE").filter(|l| !l.trim().is_empty()) {
            self.locale = locale.trim().to_ascii_lowercase();
        }
        if let Some(background) = read_env::<bool>(&lookup, "DEX_BACKGROUND") {
            self.background = background;
        }
        if let Some(session) = lookup("DEX_SESSION_ID") {
            self.session_id = Some(session);
        }
        self
    }
}

fn read_env<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let config = DexConfig::default().with_overrides(vars(&[
            ("DEX_DATA_DIR", "/srv/dex"),
            ("DEX_LOCALE", "DE_de"),
            ("DEX_BACKGROUND", "false"),
        ]));
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/dex")));
        assert_eq!(config.locale, "de_de");
        assert!(!config.background);
        assert_eq!(config.session_id, None);
    }

    #[test]
    fn unparsable_values_are_ignored() {
        let config = DexConfig::default().with_overrides(vars(&[("DEX_BACKGROUND", "maybe")]));
        assert!(config.background);
    }

    #[test]
    fn toml_file_with_partial_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dex.toml");
        std::fs::write(&path, "data_dir = \"/opt/dex\"\nbackground = false\n").unwrap();

        let config: DexConfig = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/opt/dex")));
        assert_eq!(config.locale, "en_us");
        assert!(!config.background);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dex.toml");
        std::fs::write(&path, "background = \"sometimes\"").unwrap();
        assert!(matches!(DexConfig::load(&path), Err(DexError::Config(_))));
    }
}
