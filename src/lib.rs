//! Payroll Calculation Engine
//!
//! This crate converts one employee's period inputs (base salary, worked and
//! overtime hours, bonuses, deductions) into a full gross-to-net breakdown with
//! employer cost, following the French social-contribution and flat
//! withholding approximation for a configured reference year.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_fixtures;
