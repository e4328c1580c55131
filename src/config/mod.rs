//! Configuration loading and management for the Payroll Engine.
//!
//! This module provides functionality to load payroll configurations from YAML
//! files, including jurisdiction metadata, versioned rate tables, the payroll
//! policy and configured payroll variables.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/fr_2024").unwrap();
//! println!("Loaded jurisdiction: {}", config.jurisdiction().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EmployeeRates, EmployerRates, JurisdictionMetadata, PayrollConfig, PayrollPolicy, RateTable,
    VariablesConfig,
};
