//! Batch validation of computed payroll results.
//!
//! Findings are data, not errors. Only a mismatched pairing of results and
//! inputs is reported as an [`EngineError`].

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{FindingCategory, PayrollInput, PayrollResult, Severity, ValidationFinding};

/// Validates computed results against business rules.
///
/// `results[i]` must be the result computed from `inputs[i]`. Each pair is
/// checked in order for negative net pay (error), net pay below the minimum
/// wage (warning) and overtime above the legal cap (warning). Findings are
/// returned in input order, and in that check order within one employee.
///
/// # Errors
///
/// Returns `CalculationError` if `results` and `inputs` differ in length.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{compute_for_employee, validate_batch};
/// use payroll_engine::models::{PayrollInput, Severity};
/// # use payroll_engine::config::*;
/// # use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// # let rate_table = RateTable {
/// #     effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
/// #     employee: EmployeeRates {
/// #         general_social_levy: Decimal::new(97, 3),
/// #         unemployment_insurance: Decimal::new(24, 3),
/// #         base_pension: Decimal::new(69, 3),
/// #         complementary_pension: Decimal::new(401, 4),
/// #         disability_death_insurance: Decimal::new(75, 4),
/// #         health_plan_flat_fee: Decimal::from(35),
/// #     },
/// #     employer: EmployerRates {
/// #         statutory_levies: Decimal::new(25, 2),
/// #         unemployment_insurance: Decimal::new(405, 4),
/// #         pension: Decimal::new(601, 4),
/// #         training_levy: Decimal::new(55, 4),
/// #         transport_levy: Decimal::new(175, 4),
/// #         local_economic_contribution: Decimal::new(5, 3),
/// #     },
/// #     pension_ceiling: Decimal::from(3864),
/// #     deductible_fraction: Decimal::new(25, 3),
/// #     withholding_rate: Decimal::new(75, 3),
/// # };
///
/// let hours = Decimal::new(15167, 2);
/// let inputs = vec![PayrollInput::new("emp_001", Decimal::from(1200), hours)];
/// let results = vec![compute_for_employee(&inputs[0], hours, &rate_table)?];
///
/// let findings = validate_batch(&results, &inputs, Decimal::new(139869, 2), Decimal::from(48))?;
/// assert_eq!(findings.len(), 1);
/// assert_eq!(findings[0].severity, Severity::Warning);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn validate_batch(
    results: &[PayrollResult],
    inputs: &[PayrollInput],
    minimum_wage: Decimal,
    overtime_legal_cap: Decimal,
) -> EngineResult<Vec<ValidationFinding>> {
    if results.len() != inputs.len() {
        return Err(EngineError::CalculationError {
            message: format!(
                "cannot validate {} result(s) against {} input(s)",
                results.len(),
                inputs.len()
            ),
        });
    }

    let mut findings = Vec::new();

    for (index, (result, input)) in results.iter().zip(inputs).enumerate() {
        let net = result.net_salary;

        if net < Decimal::ZERO {
            findings.push(ValidationFinding {
                index,
                employee_id: result.employee_id.clone(),
                severity: Severity::Error,
                category: FindingCategory::NegativeNetPay,
                message: format!("Net salary is negative: {}", net.normalize()),
            });
        } else if net < minimum_wage {
            findings.push(ValidationFinding {
                index,
                employee_id: result.employee_id.clone(),
                severity: Severity::Warning,
                category: FindingCategory::BelowMinimumWage,
                message: format!(
                    "Net salary {} is below the minimum wage of {}",
                    net.normalize(),
                    minimum_wage.normalize()
                ),
            });
        }

        if input.overtime_hours > overtime_legal_cap {
            findings.push(ValidationFinding {
                index,
                employee_id: result.employee_id.clone(),
                severity: Severity::Warning,
                category: FindingCategory::OvertimeCapExceeded,
                message: format!(
                    "Overtime of {}h exceeds the legal cap of {}h",
                    input.overtime_hours.normalize(),
                    overtime_legal_cap.normalize()
                ),
            });
        }
    }

    for finding in &findings {
        debug!(
            index = finding.index,
            employee_id = %finding.employee_id,
            code = finding.category.code(),
            severity = ?finding.severity,
            "{}",
            finding.message
        );
    }

    let blocking = findings.iter().filter(|f| f.is_blocking()).count();
    if blocking > 0 {
        warn!(
            employees = results.len(),
            findings = findings.len(),
            blocking,
            "Validation raised blocking findings"
        );
    }

    Ok(findings)
}

/// Returns true if any finding has `Error` severity.
pub fn has_blocking_findings(findings: &[ValidationFinding]) -> bool {
    findings.iter().any(ValidationFinding::is_blocking)
}
