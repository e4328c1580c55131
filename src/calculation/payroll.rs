//! Gross-to-net payroll computation for one employee.
//!
//! This module ties together gross salary, social contributions, income tax
//! and deductions into a complete [`PayrollResult`].

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::RateTable;
use crate::error::EngineResult;
use crate::models::{AuditStep, PayrollInput, PayrollResult};

use super::checked;
use super::contributions::{calculate_employee_contributions, calculate_employer_contributions};
use super::gross_salary::calculate_gross_salary;
use super::income_tax::calculate_income_tax;

/// Computes one employee's full gross-to-net breakdown and employer cost.
///
/// The computation is pure: it reads only its arguments, performs no I/O and
/// applies no rounding. Calling it twice with the same arguments yields an
/// identical result, audit trace included.
///
/// # Errors
///
/// Returns `InvalidInput` naming the offending field if `expected_monthly_hours`
/// is not positive or any amount or hour count is negative, and
/// `CalculationError` if an intermediate amount leaves the decimal range.
/// No partial result is produced.
///
/// # Example
///
/// ```no_run
/// use payroll_engine::calculation::compute_for_employee;
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::PayrollInput;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/fr_2024")?;
/// let table = loader.rate_table_for(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())?;
/// let input = PayrollInput::new("emp_001", Decimal::from(3000), Decimal::new(15167, 2));
///
/// let result = compute_for_employee(&input, loader.policy().expected_monthly_hours, table)?;
/// assert_eq!(result.gross_salary, Decimal::from(3000));
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn compute_for_employee(
    input: &PayrollInput,
    expected_monthly_hours: Decimal,
    rate_table: &RateTable,
) -> EngineResult<PayrollResult> {
    let mut audit_trace: Vec<AuditStep> = Vec::new();
    let mut step_number: u32 = 1;

    // Steps 1-5: hourly rate, proration, overtime tiers, bonuses
    let gross = calculate_gross_salary(input, expected_monthly_hours, step_number)?;
    step_number += gross.audit_steps.len() as u32;
    audit_trace.extend(gross.audit_steps.iter().cloned());
    let gross_salary = gross.gross_salary;

    // Step 6: employee contributions with capped pension base
    let employee = calculate_employee_contributions(
        gross_salary,
        &rate_table.employee,
        rate_table.pension_ceiling,
        step_number,
    )?;
    audit_trace.push(employee.audit_step);
    step_number += 1;
    let social_contributions = employee.contributions;

    // Steps 7-8: taxable salary and flat withholding
    let tax = calculate_income_tax(
        gross_salary,
        social_contributions.general_social_levy,
        rate_table.deductible_fraction,
        rate_table.withholding_rate,
        step_number,
    )?;
    step_number += tax.audit_steps.len() as u32;
    audit_trace.extend(tax.audit_steps);

    // Steps 9-10: deductions and net
    let deduction_total = input.deduction_total();
    let withheld = checked::sum(
        [social_contributions.total, tax.income_tax, deduction_total],
        "amount withheld from gross",
    )?;
    let net_salary = checked::sub(gross_salary, withheld, "net salary")?;

    audit_trace.push(AuditStep {
        step_number,
        rule_id: "net_salary".to_string(),
        rule_name: "Net Salary".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.normalize().to_string(),
            "employee_contributions": social_contributions.total.normalize().to_string(),
            "income_tax": tax.income_tax.normalize().to_string(),
            "deduction_total": deduction_total.normalize().to_string(),
            "deduction_count": input.deductions.len()
        }),
        output: serde_json::json!({
            "net_salary": net_salary.normalize().to_string()
        }),
        reasoning: format!(
            "Net = €{} gross − €{} contributions − €{} tax − €{} deductions = €{}",
            gross_salary.normalize(),
            social_contributions.total.normalize(),
            tax.income_tax.normalize(),
            deduction_total.normalize(),
            net_salary.normalize()
        ),
    });
    step_number += 1;

    // Steps 11-12: employer side
    let employer =
        calculate_employer_contributions(gross_salary, &rate_table.employer, step_number)?;
    audit_trace.push(employer.audit_step);
    let employer_contributions = employer.contributions;
    let total_employer_cost = checked::add(
        gross_salary,
        employer_contributions.total,
        "total employer cost",
    )?;

    debug!(
        employee_id = %input.employee_id,
        gross_salary = %gross_salary,
        net_salary = %net_salary,
        total_employer_cost = %total_employer_cost,
        "Computed payroll"
    );

    Ok(PayrollResult {
        employee_id: input.employee_id.clone(),
        hourly_rate: gross.hourly_rate,
        prorated_base: gross.prorated_base,
        overtime_pay: gross.overtime.amount,
        bonus_total: gross.bonus_total,
        gross_salary,
        social_contributions,
        taxable_salary: tax.taxable_salary,
        income_tax: tax.income_tax,
        deduction_total,
        net_salary,
        employer_contributions,
        total_employer_cost,
        audit_trace,
    })
}
