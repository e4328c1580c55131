//! Taxable salary and income tax withholding.
//!
//! Withholding is a single flat rate applied to taxable salary; there are no
//! progressive brackets or household adjustments.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::AuditStep;

use super::checked;

/// The result of the taxable salary and withholding calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeTaxResult {
    /// Gross minus the deductible portion of the general social levy.
    pub taxable_salary: Decimal,
    /// Income tax withheld.
    pub income_tax: Decimal,
    /// Audit steps: taxable salary, then income tax.
    pub audit_steps: Vec<AuditStep>,
}

/// Calculates taxable salary and flat-rate income tax.
///
/// `taxable_salary = gross_salary − general_social_levy × deductible_fraction`
/// and `income_tax = taxable_salary × withholding_rate`. Returns
/// `CalculationError` if a result leaves the decimal range.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_income_tax;
/// use rust_decimal::Decimal;
///
/// let result = calculate_income_tax(
///     Decimal::from(3000),
///     Decimal::from(291),
///     Decimal::new(25, 3),
///     Decimal::new(75, 3),
///     1,
/// )?;
/// assert_eq!(result.taxable_salary, Decimal::new(2992725, 3));
/// assert_eq!(result.income_tax, Decimal::new(224454375, 6));
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn calculate_income_tax(
    gross_salary: Decimal,
    general_social_levy: Decimal,
    deductible_fraction: Decimal,
    withholding_rate: Decimal,
    step_number_start: u32,
) -> EngineResult<IncomeTaxResult> {
    let deductible_levy =
        checked::mul(general_social_levy, deductible_fraction, "deductible levy")?;
    let taxable_salary = checked::sub(gross_salary, deductible_levy, "taxable salary")?;
    let income_tax = checked::mul(taxable_salary, withholding_rate, "income tax")?;
    let withholding_percent =
        checked::mul(withholding_rate, Decimal::ONE_HUNDRED, "withholding percentage")?;

    let taxable_step = AuditStep {
        step_number: step_number_start,
        rule_id: "taxable_salary".to_string(),
        rule_name: "Taxable Salary".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.normalize().to_string(),
            "general_social_levy": general_social_levy.normalize().to_string(),
            "deductible_fraction": deductible_fraction.normalize().to_string()
        }),
        output: serde_json::json!({
            "deductible_levy": deductible_levy.normalize().to_string(),
            "taxable_salary": taxable_salary.normalize().to_string()
        }),
        reasoning: format!(
            "Taxable = €{} gross − €{} deductible levy = €{}",
            gross_salary.normalize(),
            deductible_levy.normalize(),
            taxable_salary.normalize()
        ),
    };

    let tax_step = AuditStep {
        step_number: step_number_start + 1,
        rule_id: "income_tax".to_string(),
        rule_name: "Income Tax Withholding".to_string(),
        input: serde_json::json!({
            "taxable_salary": taxable_salary.normalize().to_string(),
            "withholding_rate": withholding_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "income_tax": income_tax.normalize().to_string()
        }),
        reasoning: format!(
            "Flat withholding at {}%: €{} × {} = €{}",
            withholding_percent.normalize(),
            taxable_salary.normalize(),
            withholding_rate.normalize(),
            income_tax.normalize()
        ),
    };

    Ok(IncomeTaxResult {
        taxable_salary,
        income_tax,
        audit_steps: vec![taxable_step, tax_step],
    })
}
