//! Calculation logic for the Payroll Engine.
//!
//! This module contains the gross-to-net computation and its building blocks:
//! hourly rate and proration, tiered overtime, employee and employer social
//! contributions with the pension ceiling, taxable salary and flat income tax
//! withholding. It also provides parallel batch computation, batch validation
//! and the configurable payroll variables evaluated before a run.
//!
//! Nothing in this module rounds. Presentation rounding is applied by
//! [`PayrollResult::rounded`](crate::models::PayrollResult::rounded).

mod batch;
pub(crate) mod checked;
mod contributions;
mod formula;
mod gross_salary;
mod income_tax;
mod payroll;
mod validation;
mod variables;

pub use batch::compute_batch;
pub use contributions::{
    EmployeeContributionsResult, EmployerContributionsResult, calculate_employee_contributions,
    calculate_employer_contributions,
};
pub use formula::{FormulaError, MAX_NESTING_DEPTH, check_formula, evaluate_formula};
pub use gross_salary::{
    GrossSalaryResult, OVERTIME_TIER_1_MULTIPLIER, OVERTIME_TIER_1_THRESHOLD,
    OVERTIME_TIER_2_MULTIPLIER, OvertimePayResult, calculate_gross_salary, calculate_overtime_pay,
};
pub use income_tax::{IncomeTaxResult, calculate_income_tax};
pub use payroll::compute_for_employee;
pub use validation::{has_blocking_findings, validate_batch};
pub use variables::{
    CalculationMethod, PayrollVariable, PercentageBase, ProgressiveBracket, VariableContext,
    VariableKind, apply_variables, evaluate_variable,
};
