//! Payroll input model and related types.
//!
//! This module defines the per-employee, per-period [`PayrollInput`] record
//! that the upstream data provider assembles from employee master data,
//! attendance aggregates and leave records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::checked;
use crate::error::{EngineError, EngineResult};

/// A labelled monetary amount, used for bonuses and deductions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedAmount {
    /// Label shown on the payslip (e.g., "Prime de transport").
    pub label: String,
    /// The amount, which must not be negative.
    pub amount: Decimal,
}

impl NamedAmount {
    /// Creates a new named amount.
    pub fn new(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// Represents one employee's payroll data for one period.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{NamedAmount, PayrollInput};
/// use rust_decimal::Decimal;
///
/// let input = PayrollInput::new("emp_001", Decimal::new(3000, 0), Decimal::new(15167, 2))
///     .with_bonus(NamedAmount::new("Prime", Decimal::new(150, 0)));
///
/// assert_eq!(input.bonus_total(), Decimal::new(150, 0));
/// assert!(input.deductions.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollInput {
    /// Identifier of the employee this input belongs to.
    pub employee_id: String,
    /// Contractual monthly gross salary.
    pub base_salary: Decimal,
    /// Hours actually worked in the period.
    pub worked_hours: Decimal,
    /// Hours worked beyond contractual hours.
    #[serde(default)]
    pub overtime_hours: Decimal,
    /// Bonuses added to gross, in payslip order.
    #[serde(default)]
    pub bonuses: Vec<NamedAmount>,
    /// Deductions subtracted from net, in payslip order.
    #[serde(default)]
    pub deductions: Vec<NamedAmount>,
}

impl PayrollInput {
    /// Creates an input with no overtime, bonuses or deductions.
    pub fn new(employee_id: impl Into<String>, base_salary: Decimal, worked_hours: Decimal) -> Self {
        Self {
            employee_id: employee_id.into(),
            base_salary,
            worked_hours,
            overtime_hours: Decimal::ZERO,
            bonuses: Vec::new(),
            deductions: Vec::new(),
        }
    }

    /// Sets the overtime hours.
    pub fn with_overtime(mut self, overtime_hours: Decimal) -> Self {
        self.overtime_hours = overtime_hours;
        self
    }

    /// Appends a bonus.
    pub fn with_bonus(mut self, bonus: NamedAmount) -> Self {
        self.bonuses.push(bonus);
        self
    }

    /// Appends a deduction.
    pub fn with_deduction(mut self, deduction: NamedAmount) -> Self {
        self.deductions.push(deduction);
        self
    }

    /// Sum of all bonus amounts.
    ///
    /// Inputs that pass [`PayrollInput::validate`] always have a representable total.
    pub fn bonus_total(&self) -> Decimal {
        self.bonuses.iter().map(|b| b.amount).sum()
    }

    /// Sum of all deduction amounts.
    ///
    /// Inputs that pass [`PayrollInput::validate`] always have a representable total.
    pub fn deduction_total(&self) -> Decimal {
        self.deductions.iter().map(|d| d.amount).sum()
    }

    /// Checks the calculator preconditions.
    ///
    /// Returns `InvalidInput` naming the first offending field: a negative
    /// amount or hour count, a non-positive `expected_monthly_hours`, or a
    /// bonus or deduction list whose total leaves the decimal range.
    pub fn validate(&self, expected_monthly_hours: Decimal) -> EngineResult<()> {
        if expected_monthly_hours <= Decimal::ZERO {
            return Err(EngineError::InvalidInput {
                field: "expected_monthly_hours".to_string(),
                message: format!(
                    "must be greater than zero (got {})",
                    expected_monthly_hours
                ),
            });
        }

        ensure_non_negative("base_salary", self.base_salary)?;
        ensure_non_negative("worked_hours", self.worked_hours)?;
        ensure_non_negative("overtime_hours", self.overtime_hours)?;

        for (i, bonus) in self.bonuses.iter().enumerate() {
            ensure_non_negative(&format!("bonuses[{}].amount", i), bonus.amount)?;
        }
        for (i, deduction) in self.deductions.iter().enumerate() {
            ensure_non_negative(&format!("deductions[{}].amount", i), deduction.amount)?;
        }

        ensure_total_in_range("bonuses", self.bonuses.iter().map(|b| b.amount))?;
        ensure_total_in_range("deductions", self.deductions.iter().map(|d| d.amount))?;

        Ok(())
    }
}

fn ensure_non_negative(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::InvalidInput {
            field: field.to_string(),
            message: format!("must not be negative (got {})", value),
        });
    }
    Ok(())
}

fn ensure_total_in_range(field: &str, amounts: impl Iterator<Item = Decimal>) -> EngineResult<()> {
    checked::sum(amounts, field).map_err(|_| EngineError::InvalidInput {
        field: field.to_string(),
        message: "total is outside the decimal range".to_string(),
    })?;
    Ok(())
}
