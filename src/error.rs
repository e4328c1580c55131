//! Error types for the Payroll Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading rate tables,
//! computing payroll and driving a payroll run.

use chrono::NaiveDate;
use thiserror::Error;

use crate::workflow::RunState;

/// The main error type for the Payroll Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::InvalidInput {
///     field: "base_salary".to_string(),
///     message: "must not be negative (got -1)".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Invalid input field 'base_salary': must not be negative (got -1)"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A rate table or policy value is outside its allowed range.
    #[error("Invalid rate table field '{field}': {message}")]
    InvalidRateTable {
        /// The offending field.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// No rate table is effective on the given date.
    #[error("No rate table effective on {date}")]
    RateTableNotFound {
        /// The date for which a rate table was requested.
        date: NaiveDate,
    },

    /// A payroll input violated a precondition of the calculator.
    #[error("Invalid input field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A payroll variable could not be evaluated.
    #[error("Invalid payroll variable '{name}': {message}")]
    InvalidVariable {
        /// The name of the variable.
        name: String,
        /// A description of the evaluation failure.
        message: String,
    },

    /// A payroll run action is not allowed from the run's current state.
    #[error("Cannot {action} a payroll run in state {from}: {reason}")]
    InvalidTransition {
        /// The state the run was in.
        from: RunState,
        /// The attempted action.
        action: String,
        /// Why the action was rejected.
        reason: String,
    },

    /// Validation found blocking problems, so the run cannot advance.
    #[error("Payroll run blocked: {errors} error finding(s), {failures} calculation failure(s)")]
    ValidationBlocked {
        /// Number of error-severity findings.
        errors: usize,
        /// Number of employees whose calculation failed.
        failures: usize,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/policy.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/policy.yaml"
        );
    }

    #[test]
    fn test_invalid_input_displays_field_and_message() {
        let error = EngineError::InvalidInput {
            field: "expected_monthly_hours".to_string(),
            message: "must be greater than zero".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid input field 'expected_monthly_hours': must be greater than zero"
        );
    }

    #[test]
    fn test_rate_table_not_found_displays_date() {
        let error = EngineError::RateTableNotFound {
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        };
        assert_eq!(error.to_string(), "No rate table effective on 2020-01-01");
    }

    #[test]
    fn test_invalid_transition_displays_state_and_action() {
        let error = EngineError::InvalidTransition {
            from: RunState::Finalized,
            action: "calculate".to_string(),
            reason: "run is finalized".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Cannot calculate a payroll run in state FINALIZED: run is finalized"
        );
    }

    #[test]
    fn test_validation_blocked_displays_counts() {
        let error = EngineError::ValidationBlocked {
            errors: 2,
            failures: 1,
        };
        assert_eq!(
            error.to_string(),
            "Payroll run blocked: 2 error finding(s), 1 calculation failure(s)"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_invalid_variable() -> EngineResult<()> {
            Err(EngineError::InvalidVariable {
                name: "meal_voucher".to_string(),
                message: "negative amount".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_invalid_variable()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
