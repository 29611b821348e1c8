//! TOML configuration loader.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::loaders::{LoadResult, read_file};

/// Loader for configuration structures stored as TOML.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a configuration value from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file
    pub fn load<T: DeserializeOwned>(path: &Path) -> LoadResult<T> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML {}: {}", path.display(), e))
    }

    /// Parse a configuration value from TOML text.
    pub fn parse<T: DeserializeOwned>(content: &str) -> LoadResult<T> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("{}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        data_dir: String,
        #[serde(default)]
        locale: Option<String>,
    }

    #[test]
    fn parses_toml() {
        let sample: Sample = ConfigLoader::parse("data_dir = \"/tmp/dex\"").unwrap();
        assert_eq!(
            sample,
            Sample {
                data_dir: "/tmp/dex".into(),
                locale: None
            }
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let result: LoadResult<Sample> = ConfigLoader::load(Path::new("/nonexistent/dex.toml"));
        assert!(result.is_err());
    }
}
