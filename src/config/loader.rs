//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configurations from YAML files.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::calculation::PayrollVariable;
use crate::error::{EngineError, EngineResult};

use super::types::{
    JurisdictionMetadata, PayrollConfig, PayrollPolicy, RateTable, VariablesConfig,
};

/// Loads and provides access to payroll configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides methods to query rate tables, policy and variables.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/fr_2024/
/// ├── jurisdiction.yaml   # Jurisdiction metadata
/// ├── policy.yaml         # Expected hours, minimum wage, overtime cap
/// ├── variables.yaml      # Optional payroll variables
/// └── rates/
///     └── 2024-01-01.yaml # Rates effective from this date
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/fr_2024").unwrap();
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let table = loader.rate_table_for(date).unwrap();
/// println!("Withholding rate: {}", table.withholding_rate);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML (`ConfigParseError`)
    /// - A rate or policy value is out of range (`InvalidRateTable`)
    /// - A payroll variable is malformed (`InvalidVariable`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<JurisdictionMetadata>(&path.join("jurisdiction.yaml"))?;

        let policy = Self::load_yaml::<PayrollPolicy>(&path.join("policy.yaml"))?;
        policy.validate()?;

        let rate_tables = Self::load_rate_tables(&path.join("rates"))?;

        // variables.yaml is optional
        let variables_path = path.join("variables.yaml");
        let variables = if variables_path.exists() {
            let variables = Self::load_yaml::<VariablesConfig>(&variables_path)?.variables;
            for variable in &variables {
                variable.validate()?;
            }
            variables
        } else {
            Vec::new()
        };

        let config = PayrollConfig::new(metadata, rate_tables, policy, variables);

        debug!(
            jurisdiction = %config.jurisdiction().code,
            rate_tables = config.rate_tables().len(),
            latest_effective_date = ?config.rate_tables().last().map(|t| t.effective_date),
            variables = config.variables().len(),
            "Loaded payroll configuration"
        );

        Ok(Self { config })
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

    /// Loads and validates all rate tables from the rates directory.
    fn load_rate_tables(rates_dir: &Path) -> EngineResult<Vec<RateTable>> {
        let rates_dir_str = rates_dir.display().to_string();

        let entries = fs::read_dir(rates_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut tables = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let table = Self::load_yaml::<RateTable>(&path)?;
                table.validate()?;
                tables.push(table);
            }
        }

        if tables.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(tables)
    }

    /// Returns the underlying payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the jurisdiction metadata.
    pub fn jurisdiction(&self) -> &JurisdictionMetadata {
        self.config.jurisdiction()
    }

    /// Returns the payroll policy.
    pub fn policy(&self) -> &PayrollPolicy {
        self.config.policy()
    }

    /// Returns the configured payroll variables.
    pub fn variables(&self) -> &[PayrollVariable] {
        self.config.variables()
    }

    /// Gets the rate table effective on a given date.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payroll_engine::config::ConfigLoader;
    /// use chrono::NaiveDate;
    ///
    /// let loader = ConfigLoader::load("./config/fr_2024")?;
    /// let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
    /// let table = loader.rate_table_for(date)?;
    /// println!("Pension ceiling: {}", table.pension_ceiling);
    /// # Ok::<(), payroll_engine::error::EngineError>(())
    /// ```
    pub fn rate_table_for(&self, date: NaiveDate) -> EngineResult<&RateTable> {
        self.config.rate_table_for(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::{CalculationMethod, VariableKind};
    use crate::test_fixtures::{dec, reference_policy, reference_rate_table};
    use tempfile::TempDir;

    fn config_path() -> &'static str {
        "./config/fr_2024"
    }

    /// A config directory with jurisdiction and policy copied in and an
    /// empty `rates/`. Removed when the returned guard drops.
    fn scratch_dir() -> TempDir {
        let scratch = tempfile::tempdir().unwrap();
        let dir = scratch.path();
        fs::create_dir_all(dir.join("rates")).unwrap();
        fs::copy(
            Path::new(config_path()).join("jurisdiction.yaml"),
            dir.join("jurisdiction.yaml"),
        )
        .unwrap();
        fs::copy(
            Path::new(config_path()).join("policy.yaml"),
            dir.join("policy.yaml"),
        )
        .unwrap();
        scratch
    }

    fn copy_reference_rates(dir: &Path) {
        fs::copy(
            Path::new(config_path()).join("rates").join("2024-01-01.yaml"),
            dir.join("rates").join("2024-01-01.yaml"),
        )
        .unwrap();
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.jurisdiction().code, "FR");
        assert_eq!(loader.jurisdiction().reference_year, 2024);
    }

    #[test]
    fn test_loaded_rate_table_matches_reference() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();

        let table = loader.rate_table_for(date).unwrap();
        assert_eq!(table, &reference_rate_table());
    }

    #[test]
    fn test_loaded_policy_matches_reference() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(loader.policy(), &reference_policy());
    }

    #[test]
    fn test_loaded_variables_keep_file_order() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let names: Vec<&str> = loader.variables().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "prime_anciennete",
                "indemnite_repas",
                "prime_performance",
                "titres_restaurant"
            ]
        );

        let last = &loader.variables()[3];
        assert_eq!(last.kind, VariableKind::Deduction);
        assert_eq!(
            last.method,
            CalculationMethod::Fixed {
                amount: dec("60.00")
            }
        );
    }

    #[test]
    fn test_rate_table_not_found_before_effective_date() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        match loader.rate_table_for(date) {
            Err(EngineError::RateTableNotFound { date: d }) => assert_eq!(d, date),
            other => panic!("Expected RateTableNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("jurisdiction.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_without_rate_files_returns_error() {
        let scratch = scratch_dir();

        match ConfigLoader::load(scratch.path()) {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("no rate files found"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_negative_rate() {
        let scratch = scratch_dir();
        let dir = scratch.path();
        let yaml = fs::read_to_string(
            Path::new(config_path()).join("rates").join("2024-01-01.yaml"),
        )
        .unwrap()
        .replace("withholding_rate: \"0.075\"", "withholding_rate: \"-0.075\"");
        fs::write(dir.join("rates").join("2024-01-01.yaml"), yaml).unwrap();

        match ConfigLoader::load(dir) {
            Err(EngineError::InvalidRateTable { field, .. }) => {
                assert_eq!(field, "withholding_rate");
            }
            other => panic!("Expected InvalidRateTable error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_reports_parse_error_with_path() {
        let scratch = scratch_dir();
        let dir = scratch.path();
        fs::write(dir.join("rates").join("2024-01-01.yaml"), "effective_date: [").unwrap();

        match ConfigLoader::load(dir) {
            Err(EngineError::ConfigParseError { path, .. }) => {
                assert!(path.contains("2024-01-01.yaml"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_malformed_variable() {
        let scratch = scratch_dir();
        let dir = scratch.path();
        copy_reference_rates(dir);
        fs::write(
            dir.join("variables.yaml"),
            "variables:\n  - name: \"prime_gap\"\n    kind: bonus\n    method:\n      type: progressive\n      brackets:\n        - { from: \"0\", to: \"1000\", rate: \"0\" }\n        - { from: \"1500\", rate: \"0.02\" }\n",
        )
        .unwrap();

        match ConfigLoader::load(dir) {
            Err(EngineError::InvalidVariable { name, .. }) => assert_eq!(name, "prime_gap"),
            other => panic!("Expected InvalidVariable error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_unparseable_formula() {
        let scratch = scratch_dir();
        let dir = scratch.path();
        copy_reference_rates(dir);
        let nested = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        fs::write(
            dir.join("variables.yaml"),
            format!(
                "variables:\n  - name: \"prime_nested\"\n    kind: bonus\n    method:\n      type: formula\n      expression: \"{}\"\n",
                nested
            ),
        )
        .unwrap();

        match ConfigLoader::load(dir) {
            Err(EngineError::InvalidVariable { name, message }) => {
                assert_eq!(name, "prime_nested");
                assert!(message.contains("nests deeper"));
            }
            other => panic!("Expected InvalidVariable error, got {:?}", other),
        }
    }
}
