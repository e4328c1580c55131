//! Parallel payroll computation over many employees.

use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::RateTable;
use crate::error::EngineResult;
use crate::models::{PayrollInput, PayrollResult};

use super::payroll::compute_for_employee;

/// Computes payroll for every input independently.
///
/// The returned vector has the same length and order as `inputs`. One
/// employee's invalid data yields an error at its own index without
/// affecting any other entry. Work is spread across the rayon thread pool;
/// since each computation is pure, the results do not depend on scheduling.
pub fn compute_batch(
    inputs: &[PayrollInput],
    expected_monthly_hours: Decimal,
    rate_table: &RateTable,
) -> Vec<EngineResult<PayrollResult>> {
    let results: Vec<EngineResult<PayrollResult>> = inputs
        .par_iter()
        .map(|input| compute_for_employee(input, expected_monthly_hours, rate_table))
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        for (input, result) in inputs.iter().zip(&results) {
            if let Err(e) = result {
                warn!(employee_id = %input.employee_id, error = %e, "Payroll computation failed");
            }
        }
    }

    info!(
        employees = inputs.len(),
        succeeded = inputs.len() - failed,
        failed,
        "Computed payroll batch"
    );

    results
}
