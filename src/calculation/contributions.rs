//! Social contribution calculation functionality.
//!
//! This module applies the employee-side and employer-side rate tables to
//! gross salary. Every contribution is a fixed fraction of gross except the
//! base pension, whose base is capped at the pension ceiling, and the health
//! plan, which is a flat monthly fee.

use rust_decimal::Decimal;

use crate::config::{EmployeeRates, EmployerRates};
use crate::error::EngineResult;
use crate::models::{AuditStep, EmployeeContributions, EmployerContributions};

use super::checked;

/// The result of employee contribution calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeContributionsResult {
    /// The contribution breakdown.
    pub contributions: EmployeeContributions,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// Calculates employee-side social contributions.
///
/// The base pension rate applies to `min(gross_salary, pension_ceiling)`;
/// all other rates apply to the full gross salary. Returns
/// `CalculationError` if a contribution leaves the decimal range.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_employee_contributions;
/// use payroll_engine::config::EmployeeRates;
/// use rust_decimal::Decimal;
///
/// let rates = EmployeeRates {
///     general_social_levy: Decimal::new(97, 3),
///     unemployment_insurance: Decimal::ZERO,
///     base_pension: Decimal::new(69, 3),
///     complementary_pension: Decimal::ZERO,
///     disability_death_insurance: Decimal::ZERO,
///     health_plan_flat_fee: Decimal::ZERO,
/// };
///
/// let result = calculate_employee_contributions(
///     Decimal::from(5000),
///     &rates,
///     Decimal::from(4000),
///     1,
/// )?;
/// // Pension is capped: 4000 × 0.069
/// assert_eq!(result.contributions.base_pension, Decimal::from(276));
/// assert_eq!(result.contributions.general_social_levy, Decimal::from(485));
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn calculate_employee_contributions(
    gross_salary: Decimal,
    rates: &EmployeeRates,
    pension_ceiling: Decimal,
    step_number: u32,
) -> EngineResult<EmployeeContributionsResult> {
    let pension_base = gross_salary.min(pension_ceiling);

    let contributions = EmployeeContributions::new(
        checked::mul(gross_salary, rates.general_social_levy, "general social levy")?,
        checked::mul(gross_salary, rates.unemployment_insurance, "unemployment insurance")?,
        checked::mul(pension_base, rates.base_pension, "base pension")?,
        checked::mul(gross_salary, rates.complementary_pension, "complementary pension")?,
        checked::mul(
            gross_salary,
            rates.disability_death_insurance,
            "disability and death insurance",
        )?,
        rates.health_plan_flat_fee,
    )?;

    let capped = pension_base < gross_salary;
    let audit_step = AuditStep {
        step_number,
        rule_id: "employee_contributions".to_string(),
        rule_name: "Employee Social Contributions".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.normalize().to_string(),
            "pension_ceiling": pension_ceiling.normalize().to_string(),
            "pension_base": pension_base.normalize().to_string()
        }),
        output: serde_json::json!({
            "general_social_levy": contributions.general_social_levy.normalize().to_string(),
            "unemployment_insurance": contributions.unemployment_insurance.normalize().to_string(),
            "base_pension": contributions.base_pension.normalize().to_string(),
            "complementary_pension": contributions.complementary_pension.normalize().to_string(),
            "disability_death_insurance": contributions.disability_death_insurance.normalize().to_string(),
            "health_plan": contributions.health_plan.normalize().to_string(),
            "total": contributions.total.normalize().to_string()
        }),
        reasoning: if capped {
            format!(
                "Employee contributions on gross €{}, base pension capped at ceiling €{}: total €{}",
                gross_salary.normalize(),
                pension_ceiling.normalize(),
                contributions.total.normalize()
            )
        } else {
            format!(
                "Employee contributions on gross €{}: total €{}",
                gross_salary.normalize(),
                contributions.total.normalize()
            )
        },
    };

    Ok(EmployeeContributionsResult {
        contributions,
        audit_step,
    })
}

/// The result of employer contribution calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployerContributionsResult {
    /// The contribution breakdown.
    pub contributions: EmployerContributions,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// Calculates employer-side contributions as fractions of gross, with no ceiling.
pub fn calculate_employer_contributions(
    gross_salary: Decimal,
    rates: &EmployerRates,
    step_number: u32,
) -> EngineResult<EmployerContributionsResult> {
    let contributions = EmployerContributions::new(
        checked::mul(gross_salary, rates.statutory_levies, "employer statutory levies")?,
        checked::mul(gross_salary, rates.unemployment_insurance, "employer unemployment insurance")?,
        checked::mul(gross_salary, rates.pension, "employer pension")?,
        checked::mul(gross_salary, rates.training_levy, "training levy")?,
        checked::mul(gross_salary, rates.transport_levy, "transport levy")?,
        checked::mul(
            gross_salary,
            rates.local_economic_contribution,
            "local economic contribution",
        )?,
    )?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "employer_contributions".to_string(),
        rule_name: "Employer Contributions".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.normalize().to_string()
        }),
        output: serde_json::json!({
            "statutory_levies": contributions.statutory_levies.normalize().to_string(),
            "unemployment_insurance": contributions.unemployment_insurance.normalize().to_string(),
            "pension": contributions.pension.normalize().to_string(),
            "training_levy": contributions.training_levy.normalize().to_string(),
            "transport_levy": contributions.transport_levy.normalize().to_string(),
            "local_economic_contribution": contributions.local_economic_contribution.normalize().to_string(),
            "total": contributions.total.normalize().to_string()
        }),
        reasoning: format!(
            "Employer contributions on gross €{}: total €{}",
            gross_salary.normalize(),
            contributions.total.normalize()
        ),
    };

    Ok(EmployerContributionsResult {
        contributions,
        audit_step,
    })
}
