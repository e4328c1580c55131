//! Core data models for the Payroll Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod finding;
mod pay_period;
mod payroll_input;
mod payroll_result;

pub use finding::{FindingCategory, Severity, ValidationFinding};
pub use pay_period::PayPeriod;
pub use payroll_input::{NamedAmount, PayrollInput};
pub use payroll_result::{
    AuditStep, EmployeeContributions, EmployerContributions, PRESENTATION_DECIMAL_PLACES,
    PayrollResult,
};
