use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DataConfig {
    /// Serialized boundaries file, optionally gzip-compressed (`.gz`)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LogConfig {
    /// Default tracing filter when `RUST_LOG` is not set
    pub level: Option<String>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[data]\npath = \"/srv/boundaries360x180.ser\"\n\n[log]\nlevel = \"debug\"").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.data.path, Some(PathBuf::from("/srv/boundaries360x180.ser")));
        assert_eq!(config.log.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_sections_are_optional() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[log]\nlevel = \"warn\"").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert!(config.data.path.is_none());
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(Config::load_from_file("/nonexistent/query.toml").is_err());
    }
}
