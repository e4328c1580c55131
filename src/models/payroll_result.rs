//! Payroll result models for the Payroll Engine.
//!
//! This module contains the [`PayrollResult`] type and its associated structures
//! that capture all outputs from a gross-to-net calculation, including the
//! employee and employer contribution breakdowns and the audit trace.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::calculation::checked;
use crate::error::EngineResult;

/// Number of decimal places used when presenting monetary amounts.
pub const PRESENTATION_DECIMAL_PLACES: u32 = 2;

fn present(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(
        PRESENTATION_DECIMAL_PLACES,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

/// Employee-side social contributions withheld from gross salary.
///
/// # Example
///
/// ```
/// use payroll_engine::models::EmployeeContributions;
/// use rust_decimal::Decimal;
///
/// let contributions = EmployeeContributions::new(
///     Decimal::new(291, 0),
///     Decimal::ZERO,
///     Decimal::new(207, 0),
///     Decimal::new(12030, 2),
///     Decimal::ZERO,
///     Decimal::new(35, 0),
/// )?;
/// assert_eq!(contributions.total, Decimal::new(65330, 2));
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeContributions {
    /// General social levy (CSG/CRDS).
    pub general_social_levy: Decimal,
    /// Employee unemployment insurance.
    pub unemployment_insurance: Decimal,
    /// Base pension, capped at the pension ceiling.
    pub base_pension: Decimal,
    /// Complementary pension.
    pub complementary_pension: Decimal,
    /// Disability and death insurance.
    pub disability_death_insurance: Decimal,
    /// Mandatory health plan flat fee.
    pub health_plan: Decimal,
    /// Sum of all employee contributions.
    pub total: Decimal,
}

impl EmployeeContributions {
    /// Builds the breakdown and computes its total.
    ///
    /// Fails with `CalculationError` if the total leaves the decimal range.
    pub fn new(
        general_social_levy: Decimal,
        unemployment_insurance: Decimal,
        base_pension: Decimal,
        complementary_pension: Decimal,
        disability_death_insurance: Decimal,
        health_plan: Decimal,
    ) -> EngineResult<Self> {
        let total = checked::sum(
            [
                general_social_levy,
                unemployment_insurance,
                base_pension,
                complementary_pension,
                disability_death_insurance,
                health_plan,
            ],
            "employee contributions total",
        )?;
        Ok(Self {
            general_social_levy,
            unemployment_insurance,
            base_pension,
            complementary_pension,
            disability_death_insurance,
            health_plan,
            total,
        })
    }

    fn rounded(&self) -> Self {
        Self {
            general_social_levy: present(self.general_social_levy),
            unemployment_insurance: present(self.unemployment_insurance),
            base_pension: present(self.base_pension),
            complementary_pension: present(self.complementary_pension),
            disability_death_insurance: present(self.disability_death_insurance),
            health_plan: present(self.health_plan),
            total: present(self.total),
        }
    }
}

/// Employer-side contributions paid on top of gross salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerContributions {
    /// Statutory employer levies (health, family, old-age).
    pub statutory_levies: Decimal,
    /// Employer unemployment insurance share.
    pub unemployment_insurance: Decimal,
    /// Employer pension share.
    pub pension: Decimal,
    /// Professional training levy.
    pub training_levy: Decimal,
    /// Transport (mobility) levy.
    pub transport_levy: Decimal,
    /// Local economic contribution.
    pub local_economic_contribution: Decimal,
    /// Sum of all employer contributions.
    pub total: Decimal,
}

impl EmployerContributions {
    /// Builds the breakdown and computes its total.
    ///
    /// Fails with `CalculationError` if the total leaves the decimal range.
    pub fn new(
        statutory_levies: Decimal,
        unemployment_insurance: Decimal,
        pension: Decimal,
        training_levy: Decimal,
        transport_levy: Decimal,
        local_economic_contribution: Decimal,
    ) -> EngineResult<Self> {
        let total = checked::sum(
            [
                statutory_levies,
                unemployment_insurance,
                pension,
                training_levy,
                transport_levy,
                local_economic_contribution,
            ],
            "employer contributions total",
        )?;
        Ok(Self {
            statutory_levies,
            unemployment_insurance,
            pension,
            training_levy,
            transport_levy,
            local_economic_contribution,
            total,
        })
    }

    fn rounded(&self) -> Self {
        Self {
            statutory_levies: present(self.statutory_levies),
            unemployment_insurance: present(self.unemployment_insurance),
            pension: present(self.pension),
            training_levy: present(self.training_levy),
            transport_levy: present(self.transport_levy),
            local_economic_contribution: present(self.local_economic_contribution),
            total: present(self.total),
        }
    }
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The complete result of one employee's payroll calculation.
///
/// Amounts are kept at full precision; call [`PayrollResult::rounded`] to get
/// the presentation copy with cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollResult {
    /// The ID of the employee the calculation is for.
    pub employee_id: String,
    /// Base salary divided by expected monthly hours.
    pub hourly_rate: Decimal,
    /// Base salary prorated by worked hours.
    pub prorated_base: Decimal,
    /// Pay for both overtime tiers.
    pub overtime_pay: Decimal,
    /// Sum of all bonuses.
    pub bonus_total: Decimal,
    /// Prorated base + overtime pay + bonuses.
    pub gross_salary: Decimal,
    /// Employee-side contribution breakdown.
    pub social_contributions: EmployeeContributions,
    /// Gross minus the deductible portion of the general social levy.
    pub taxable_salary: Decimal,
    /// Income tax withheld at source.
    pub income_tax: Decimal,
    /// Sum of all deductions.
    pub deduction_total: Decimal,
    /// Net salary paid to the employee. May be negative.
    pub net_salary: Decimal,
    /// Employer-side contribution breakdown.
    pub employer_contributions: EmployerContributions,
    /// Gross + employer contributions.
    pub total_employer_cost: Decimal,
    /// Ordered record of every rule applied.
    pub audit_trace: Vec<AuditStep>,
}

impl PayrollResult {
    /// Returns a copy with every monetary amount rounded to cents
    /// (half away from zero), for display and documents.
    pub fn rounded(&self) -> Self {
        Self {
            employee_id: self.employee_id.clone(),
            hourly_rate: present(self.hourly_rate),
            prorated_base: present(self.prorated_base),
            overtime_pay: present(self.overtime_pay),
            bonus_total: present(self.bonus_total),
            gross_salary: present(self.gross_salary),
            social_contributions: self.social_contributions.rounded(),
            taxable_salary: present(self.taxable_salary),
            income_tax: present(self.income_tax),
            deduction_total: present(self.deduction_total),
            net_salary: present(self.net_salary),
            employer_contributions: self.employer_contributions.rounded(),
            total_employer_cost: present(self.total_employer_cost),
            audit_trace: self.audit_trace.clone(),
        }
    }

    /// Returns true if the net salary is negative.
    pub fn has_negative_net(&self) -> bool {
        self.net_salary < Decimal::ZERO
    }
}
