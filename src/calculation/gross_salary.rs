//! Gross salary calculation functionality.
//!
//! This module computes the hourly rate, the base salary prorated by worked
//! hours, tiered overtime pay and the bonus sum that together make up gross.
//!
//! ## Overtime Rate Structure
//!
//! **Overtime is calculated in two tiers:**
//! - First 8 hours: 125% of the hourly rate
//! - After 8 hours: 150% of the hourly rate

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AuditStep, PayrollInput};

use super::checked;

/// The number of overtime hours paid at the tier 1 rate.
pub const OVERTIME_TIER_1_THRESHOLD: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Multiplier applied to the hourly rate for tier 1 overtime (125%).
pub const OVERTIME_TIER_1_MULTIPLIER: Decimal = Decimal::from_parts(125, 0, 0, false, 2);

/// Multiplier applied to the hourly rate for tier 2 overtime (150%).
pub const OVERTIME_TIER_2_MULTIPLIER: Decimal = Decimal::from_parts(150, 0, 0, false, 2);

/// The result of overtime pay calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OvertimePayResult {
    /// Hours paid at the tier 1 rate.
    pub tier_1_hours: Decimal,
    /// Hours paid at the tier 2 rate.
    pub tier_2_hours: Decimal,
    /// Total overtime pay across both tiers.
    pub amount: Decimal,
    /// Audit steps recording each tier (0, 1 or 2 steps).
    pub audit_steps: Vec<AuditStep>,
}

/// Calculates overtime pay at tiered rates.
///
/// - **Tier 1 (first 8 hours):** `hourly_rate × 1.25`
/// - **Tier 2 (beyond 8 hours):** `hourly_rate × 1.50`
///
/// Returns `CalculationError` if an amount leaves the decimal range.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_overtime_pay;
/// use rust_decimal::Decimal;
///
/// let result = calculate_overtime_pay(Decimal::from(9), Decimal::from(10), 1)?;
///
/// assert_eq!(result.tier_1_hours, Decimal::from(8));
/// assert_eq!(result.tier_2_hours, Decimal::from(1));
/// assert_eq!(result.amount, Decimal::from(115));
/// assert_eq!(result.audit_steps.len(), 2);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn calculate_overtime_pay(
    overtime_hours: Decimal,
    hourly_rate: Decimal,
    step_number_start: u32,
) -> EngineResult<OvertimePayResult> {
    let mut audit_steps = Vec::new();
    let mut step_number = step_number_start;

    if overtime_hours <= Decimal::ZERO {
        return Ok(OvertimePayResult {
            tier_1_hours: Decimal::ZERO,
            tier_2_hours: Decimal::ZERO,
            amount: Decimal::ZERO,
            audit_steps,
        });
    }

    let tier_1_hours = overtime_hours.min(OVERTIME_TIER_1_THRESHOLD);
    let tier_2_hours = checked::sub(overtime_hours, OVERTIME_TIER_1_THRESHOLD, "tier 2 hours")?
        .max(Decimal::ZERO);

    let tier_1_rate = checked::mul(hourly_rate, OVERTIME_TIER_1_MULTIPLIER, "tier 1 rate")?;
    let tier_1_amount = checked::mul(tier_1_hours, tier_1_rate, "tier 1 overtime pay")?;

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "overtime_tier_1".to_string(),
        rule_name: "Overtime Tier 1".to_string(),
        input: serde_json::json!({
            "hours": tier_1_hours.normalize().to_string(),
            "hourly_rate": hourly_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "multiplier": OVERTIME_TIER_1_MULTIPLIER.normalize().to_string(),
            "rate": tier_1_rate.normalize().to_string(),
            "amount": tier_1_amount.normalize().to_string()
        }),
        reasoning: format!(
            "First {} overtime hours at 125%: {} hours × €{} = €{}",
            OVERTIME_TIER_1_THRESHOLD,
            tier_1_hours.normalize(),
            tier_1_rate.normalize(),
            tier_1_amount.normalize()
        ),
    });
    step_number += 1;

    let mut amount = tier_1_amount;

    if tier_2_hours > Decimal::ZERO {
        let tier_2_rate = checked::mul(hourly_rate, OVERTIME_TIER_2_MULTIPLIER, "tier 2 rate")?;
        let tier_2_amount = checked::mul(tier_2_hours, tier_2_rate, "tier 2 overtime pay")?;

        audit_steps.push(AuditStep {
            step_number,
            rule_id: "overtime_tier_2".to_string(),
            rule_name: "Overtime Tier 2".to_string(),
            input: serde_json::json!({
                "hours": tier_2_hours.normalize().to_string(),
                "hourly_rate": hourly_rate.normalize().to_string()
            }),
            output: serde_json::json!({
                "multiplier": OVERTIME_TIER_2_MULTIPLIER.normalize().to_string(),
                "rate": tier_2_rate.normalize().to_string(),
                "amount": tier_2_amount.normalize().to_string()
            }),
            reasoning: format!(
                "Overtime beyond {} hours at 150%: {} hours × €{} = €{}",
                OVERTIME_TIER_1_THRESHOLD,
                tier_2_hours.normalize(),
                tier_2_rate.normalize(),
                tier_2_amount.normalize()
            ),
        });

        amount = checked::add(amount, tier_2_amount, "overtime pay")?;
    }

    Ok(OvertimePayResult {
        tier_1_hours,
        tier_2_hours,
        amount,
        audit_steps,
    })
}

/// The result of gross salary calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrossSalaryResult {
    /// Base salary divided by expected monthly hours.
    pub hourly_rate: Decimal,
    /// Base salary prorated by worked hours.
    pub prorated_base: Decimal,
    /// Tiered overtime pay.
    pub overtime: OvertimePayResult,
    /// Sum of all bonuses.
    pub bonus_total: Decimal,
    /// Prorated base + overtime + bonuses.
    pub gross_salary: Decimal,
    /// Audit steps: proration, overtime tiers, gross total.
    pub audit_steps: Vec<AuditStep>,
}

/// Calculates gross salary for one employee.
///
/// `prorated_base = (worked_hours / expected_monthly_hours) × base_salary`, so
/// a full month worked pays exactly the base salary and a partial month is
/// paid pro rata without a separate branch.
///
/// Returns `InvalidInput` if the input violates a calculator precondition,
/// or `CalculationError` if an amount leaves the decimal range.
pub fn calculate_gross_salary(
    input: &PayrollInput,
    expected_monthly_hours: Decimal,
    step_number_start: u32,
) -> EngineResult<GrossSalaryResult> {
    input.validate(expected_monthly_hours)?;

    let mut audit_steps = Vec::new();
    let mut step_number = step_number_start;

    let hourly_rate = checked::div(input.base_salary, expected_monthly_hours, "hourly rate")?;
    let worked_fraction =
        checked::div(input.worked_hours, expected_monthly_hours, "worked hours fraction")?;
    let prorated_base = checked::mul(worked_fraction, input.base_salary, "prorated base")?;

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "prorated_base".to_string(),
        rule_name: "Prorated Base Salary".to_string(),
        input: serde_json::json!({
            "base_salary": input.base_salary.normalize().to_string(),
            "worked_hours": input.worked_hours.normalize().to_string(),
            "expected_monthly_hours": expected_monthly_hours.normalize().to_string()
        }),
        output: serde_json::json!({
            "hourly_rate": hourly_rate.normalize().to_string(),
            "prorated_base": prorated_base.normalize().to_string()
        }),
        reasoning: format!(
            "{} of {} expected hours worked: base €{} prorated to €{}",
            input.worked_hours.normalize(),
            expected_monthly_hours.normalize(),
            input.base_salary.normalize(),
            prorated_base.normalize()
        ),
    });
    step_number += 1;

    let overtime = calculate_overtime_pay(input.overtime_hours, hourly_rate, step_number)?;
    step_number += overtime.audit_steps.len() as u32;
    audit_steps.extend(overtime.audit_steps.iter().cloned());

    let bonus_total = input.bonus_total();
    let gross_salary = checked::sum([prorated_base, overtime.amount, bonus_total], "gross salary")?;

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "gross_salary".to_string(),
        rule_name: "Gross Salary".to_string(),
        input: serde_json::json!({
            "prorated_base": prorated_base.normalize().to_string(),
            "overtime_pay": overtime.amount.normalize().to_string(),
            "bonus_total": bonus_total.normalize().to_string(),
            "bonus_count": input.bonuses.len()
        }),
        output: serde_json::json!({
            "gross_salary": gross_salary.normalize().to_string()
        }),
        reasoning: format!(
            "Gross = €{} base + €{} overtime + €{} bonuses = €{}",
            prorated_base.normalize(),
            overtime.amount.normalize(),
            bonus_total.normalize(),
            gross_salary.normalize()
        ),
    });

    Ok(GrossSalaryResult {
        hourly_rate,
        prorated_base,
        overtime,
        bonus_total,
        gross_salary,
        audit_steps,
    })
}
