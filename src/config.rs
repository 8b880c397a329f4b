use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ConvertError, Result};

/// Company name stamped into SVCURRENTCOMPANY when no configuration is given.
pub const DEFAULT_COMPANY: &str = "Techsolvo";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Company name written into the envelope's SVCURRENTCOMPANY element.
    #[serde(default = "default_company")]
    pub company: String,
    /// Directory generated XML artifacts are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Upper bound on the input file read, in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_seconds: u64,
}

fn default_company() -> String {
    DEFAULT_COMPANY.to_string()
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_read_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            company: default_company(),
            output_dir: default_output_dir(),
            read_timeout_seconds: default_read_timeout(),
        }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory, falling back to
    /// defaults when the file is absent. `TALLY_COMPANY` overrides the
    /// company name either way.
    pub fn load() -> Result<Self> {
        let path = Path::new("config.toml");
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default().with_env_overrides())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            ConvertError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(company) = std::env::var("TALLY_COMPANY") {
            if !company.trim().is_empty() {
                self.company = company;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_fields_are_omitted() {
        let config: Config = toml::from_str("company = \"Acme Traders\"").unwrap();
        assert_eq!(config.company, "Acme Traders");
        assert_eq!(config.output_dir, "output");
        assert_eq!(config.read_timeout_seconds, 30);
    }

    #[test]
    fn load_from_reads_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "company = \"Acme\"\noutput_dir = \"out\"\nread_timeout_seconds = 5\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.company, "Acme");
        assert_eq!(config.output_dir, "out");
        assert_eq!(config.read_timeout_seconds, 5);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = Config::load_from(Path::new("definitely-not-here.toml")).unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
    }
}
