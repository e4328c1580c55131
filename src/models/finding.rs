//! Validation findings produced by batch validation.
//!
//! A [`ValidationFinding`] is a data value, not an error: it flags a business
//! rule concern about one computed result without halting computation.

use serde::{Deserialize, Serialize};

/// How serious a finding is.
///
/// `Error` findings block finalization of a payroll run; `Warning` findings
/// are advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks finalization.
    Error,
    /// Informational.
    Warning,
}

impl Severity {
    /// Returns true if findings of this severity block finalization.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Error)
    }
}

/// The business rule a finding was raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    /// Net salary is below zero.
    NegativeNetPay,
    /// Net salary is below the configured minimum wage.
    BelowMinimumWage,
    /// Overtime hours exceed the legal cap.
    OvertimeCapExceeded,
}

impl FindingCategory {
    /// A stable code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NegativeNetPay => "NEGATIVE_NET_PAY",
            Self::BelowMinimumWage => "BELOW_MINIMUM_WAGE",
            Self::OvertimeCapExceeded => "OVERTIME_CAP_EXCEEDED",
        }
    }
}

/// A business-rule finding about one employee's computed result.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{FindingCategory, Severity, ValidationFinding};
///
/// let finding = ValidationFinding {
///     index: 0,
///     employee_id: "emp_001".to_string(),
///     severity: Severity::Error,
///     category: FindingCategory::NegativeNetPay,
///     message: "Net salary is negative: -50".to_string(),
/// };
/// assert!(finding.is_blocking());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
    /// Position of the employee in the validated batch.
    pub index: usize,
    /// The employee the finding is about.
    pub employee_id: String,
    /// Severity of the finding.
    pub severity: Severity,
    /// The rule that raised it.
    pub category: FindingCategory,
    /// Human-readable description.
    pub message: String,
}

impl ValidationFinding {
    /// Returns true if this finding blocks finalization.
    pub fn is_blocking(&self) -> bool {
        self.severity.is_blocking()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_error_severity_blocks() {
        assert!(Severity::Error.is_blocking());
        assert!(!Severity::Warning.is_blocking());
    }

    #[test]
    fn test_severity_serialization() {
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), "\"error\"");
        assert_eq!(
            serde_json::to_string(&Severity::Warning).unwrap(),
            "\"warning\""
        );
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(
            serde_json::to_string(&FindingCategory::BelowMinimumWage).unwrap(),
            "\"below_minimum_wage\""
        );
        let category: FindingCategory =
            serde_json::from_str("\"overtime_cap_exceeded\"").unwrap();
        assert_eq!(category, FindingCategory::OvertimeCapExceeded);
    }

    #[test]
    fn test_category_codes() {
        assert_eq!(FindingCategory::NegativeNetPay.code(), "NEGATIVE_NET_PAY");
        assert_eq!(FindingCategory::BelowMinimumWage.code(), "BELOW_MINIMUM_WAGE");
        assert_eq!(
            FindingCategory::OvertimeCapExceeded.code(),
            "OVERTIME_CAP_EXCEEDED"
        );
    }
}
