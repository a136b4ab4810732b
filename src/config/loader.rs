//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading credit tables
//! from a configuration directory.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{CreditTables, TablesOverride};

/// The file read from a configuration directory.
pub const TABLES_FILE: &str = "credit_tables.yaml";

/// Loads and provides access to the credit tables.
///
/// # Directory Structure
///
/// ```text
/// config/
/// └── credit_tables.yaml   # Overrides on top of the statutory tables
/// ```
///
/// # Example
///
/// ```no_run
/// use tax_credit_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// let rate = loader.tables().insurance_rate(2023).unwrap();
/// println!("Employer rate: {}", rate.rate);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    tables: CreditTables,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if `credit_tables.yaml` is missing or is not valid
    /// YAML for [`TablesOverride`].
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let tables_path = path.as_ref().join(TABLES_FILE);
        let overrides = Self::load_yaml::<TablesOverride>(&tables_path)?;
        debug!(path = %tables_path.display(), "Loaded credit table overrides");

        Ok(Self {
            tables: overrides.apply(CreditTables::statutory()),
        })
    }

    /// Uses the statutory tables with no overrides.
    pub fn statutory() -> Self {
        Self {
            tables: CreditTables::statutory().clone(),
        }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded tables.
    pub fn tables(&self) -> &CreditTables {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn config_path() -> &'static str {
        "./config"
    }

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("tax-credit-engine-{}", name));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_shipped_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.tables().youth_age_limit, 29);
        assert_eq!(
            loader.tables().insurance_rate(2023).unwrap().rate,
            Decimal::new(10_980, 5)
        );
    }

    #[test]
    fn test_shipped_configuration_matches_statutory_tables() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(loader.tables(), ConfigLoader::statutory().tables());
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains(TABLES_FILE));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_load_invalid_yaml_returns_parse_error() {
        let dir = temp_dir("invalid-yaml");
        fs::write(dir.join(TABLES_FILE), "youth_age_limit: [not a number").unwrap();

        match ConfigLoader::load(&dir) {
            Err(EngineError::ConfigParseError { path, .. }) => {
                assert!(path.contains(TABLES_FILE));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_override_keeps_statutory_values() {
        let dir = temp_dir("partial-override");
        fs::write(dir.join(TABLES_FILE), "youth_age_limit: 34\n").unwrap();

        let loader = ConfigLoader::load(&dir).unwrap();
        assert_eq!(loader.tables().youth_age_limit, 34);
        assert_eq!(
            loader.tables().income_salary_cap,
            Decimal::new(70_000_000, 0)
        );
    }
}
