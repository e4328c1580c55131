//! Configuration types for payroll calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::PayrollVariable;
use crate::error::{EngineError, EngineResult};

/// Metadata about the jurisdiction the rates apply to.
#[derive(Debug, Clone, Deserialize)]
pub struct JurisdictionMetadata {
    /// Short jurisdiction code (e.g., "FR").
    pub code: String,
    /// The human-readable name of the scheme.
    pub name: String,
    /// The version of the configuration.
    pub version: String,
    /// The reference year of the statutory rates.
    pub reference_year: i32,
    /// Optional URL to the official rate documentation.
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Employee-side contribution rates.
///
/// Every rate is a fraction of gross salary, except `base_pension` which is
/// applied to gross capped at the pension ceiling, and `health_plan_flat_fee`
/// which is a fixed monthly amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRates {
    /// General social levy rate.
    pub general_social_levy: Decimal,
    /// Unemployment insurance rate.
    pub unemployment_insurance: Decimal,
    /// Base pension rate, applied up to the pension ceiling.
    pub base_pension: Decimal,
    /// Complementary pension rate.
    pub complementary_pension: Decimal,
    /// Disability and death insurance rate.
    pub disability_death_insurance: Decimal,
    /// Mandatory health plan monthly fee.
    pub health_plan_flat_fee: Decimal,
}

/// Employer-side contribution rates, all fractions of gross salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerRates {
    /// Statutory employer levies rate.
    pub statutory_levies: Decimal,
    /// Employer unemployment insurance rate.
    pub unemployment_insurance: Decimal,
    /// Employer pension rate.
    pub pension: Decimal,
    /// Training levy rate.
    pub training_levy: Decimal,
    /// Transport levy rate.
    pub transport_levy: Decimal,
    /// Local economic contribution rate.
    pub local_economic_contribution: Decimal,
}

/// A versioned statutory rate table, effective from a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    /// The date from which this table applies.
    pub effective_date: NaiveDate,
    /// Employee-side rates.
    pub employee: EmployeeRates,
    /// Employer-side rates.
    pub employer: EmployerRates,
    /// Monthly ceiling for the base pension contribution.
    pub pension_ceiling: Decimal,
    /// Fraction of the general social levy deducted from taxable salary.
    pub deductible_fraction: Decimal,
    /// Flat income tax withholding rate.
    pub withholding_rate: Decimal,
}

impl RateTable {
    /// Checks that every rate is a fraction in `[0, 1]` and every amount is
    /// non-negative.
    pub fn validate(&self) -> EngineResult<()> {
        let employee = &self.employee;
        let employer = &self.employer;
        let fractions = [
            ("employee.general_social_levy", employee.general_social_levy),
            ("employee.unemployment_insurance", employee.unemployment_insurance),
            ("employee.base_pension", employee.base_pension),
            ("employee.complementary_pension", employee.complementary_pension),
            (
                "employee.disability_death_insurance",
                employee.disability_death_insurance,
            ),
            ("employer.statutory_levies", employer.statutory_levies),
            ("employer.unemployment_insurance", employer.unemployment_insurance),
            ("employer.pension", employer.pension),
            ("employer.training_levy", employer.training_levy),
            ("employer.transport_levy", employer.transport_levy),
            (
                "employer.local_economic_contribution",
                employer.local_economic_contribution,
            ),
            ("deductible_fraction", self.deductible_fraction),
            ("withholding_rate", self.withholding_rate),
        ];

        for (field, rate) in fractions {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(EngineError::InvalidRateTable {
                    field: field.to_string(),
                    message: format!("rate must be between 0 and 1 (got {})", rate),
                });
            }
        }

        if employee.health_plan_flat_fee < Decimal::ZERO {
            return Err(EngineError::InvalidRateTable {
                field: "employee.health_plan_flat_fee".to_string(),
                message: format!(
                    "must not be negative (got {})",
                    employee.health_plan_flat_fee
                ),
            });
        }

        if self.pension_ceiling <= Decimal::ZERO {
            return Err(EngineError::InvalidRateTable {
                field: "pension_ceiling".to_string(),
                message: format!("must be greater than zero (got {})", self.pension_ceiling),
            });
        }

        Ok(())
    }
}

/// Business policy used by validation and the payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPolicy {
    /// Contractual hours in a full month (e.g., 151.67).
    pub expected_monthly_hours: Decimal,
    /// Net monthly minimum wage; lower net pay raises a warning.
    pub minimum_wage: Decimal,
    /// Overtime hours above which a warning is raised.
    pub overtime_legal_cap: Decimal,
}

impl PayrollPolicy {
    /// Checks that expected hours are positive and thresholds non-negative.
    pub fn validate(&self) -> EngineResult<()> {
        if self.expected_monthly_hours <= Decimal::ZERO {
            return Err(EngineError::InvalidRateTable {
                field: "expected_monthly_hours".to_string(),
                message: format!(
                    "must be greater than zero (got {})",
                    self.expected_monthly_hours
                ),
            });
        }
        if self.minimum_wage < Decimal::ZERO {
            return Err(EngineError::InvalidRateTable {
                field: "minimum_wage".to_string(),
                message: format!("must not be negative (got {})", self.minimum_wage),
            });
        }
        if self.overtime_legal_cap < Decimal::ZERO {
            return Err(EngineError::InvalidRateTable {
                field: "overtime_legal_cap".to_string(),
                message: format!("must not be negative (got {})", self.overtime_legal_cap),
            });
        }
        Ok(())
    }
}

/// Payroll variables configuration file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariablesConfig {
    /// Configured variables, in evaluation order.
    #[serde(default)]
    pub variables: Vec<PayrollVariable>,
}

/// The complete payroll configuration loaded from YAML files.
///
/// This struct aggregates all configuration loaded from the various
/// YAML files in a jurisdiction configuration directory.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    /// Jurisdiction metadata.
    metadata: JurisdictionMetadata,
    /// Rate tables by effective date (sorted oldest first).
    rate_tables: Vec<RateTable>,
    /// Validation and proration policy.
    policy: PayrollPolicy,
    /// Configured payroll variables.
    variables: Vec<PayrollVariable>,
}

impl PayrollConfig {
    /// Creates a new PayrollConfig from its component parts.
    pub fn new(
        metadata: JurisdictionMetadata,
        rate_tables: Vec<RateTable>,
        policy: PayrollPolicy,
        variables: Vec<PayrollVariable>,
    ) -> Self {
        let mut sorted_tables = rate_tables;
        sorted_tables.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self {
            metadata,
            rate_tables: sorted_tables,
            policy,
            variables,
        }
    }

    /// Returns the jurisdiction metadata.
    pub fn jurisdiction(&self) -> &JurisdictionMetadata {
        &self.metadata
    }

    /// Returns all rate tables, oldest first.
    pub fn rate_tables(&self) -> &[RateTable] {
        &self.rate_tables
    }

    /// Returns the payroll policy.
    pub fn policy(&self) -> &PayrollPolicy {
        &self.policy
    }

    /// Returns the configured payroll variables.
    pub fn variables(&self) -> &[PayrollVariable] {
        &self.variables
    }

    /// Finds the most recent rate table effective on or before `date`.
    pub fn rate_table_for(&self, date: NaiveDate) -> EngineResult<&RateTable> {
        self.rate_tables
            .iter()
            .rfind(|table| table.effective_date <= date)
            .ok_or(EngineError::RateTableNotFound { date })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{dec, reference_policy, reference_rate_table};

    fn create_config(tables: Vec<RateTable>) -> PayrollConfig {
        PayrollConfig::new(
            JurisdictionMetadata {
                code: "FR".to_string(),
                name: "Régime général".to_string(),
                version: "2024".to_string(),
                reference_year: 2024,
                source_url: None,
            },
            tables,
            reference_policy(),
            vec![],
        )
    }

    #[test]
    fn test_reference_rate_table_is_valid() {
        assert!(reference_rate_table().validate().is_ok());
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        let mut table = reference_rate_table();
        table.employer.training_levy = dec("-0.01");

        match table.validate() {
            Err(EngineError::InvalidRateTable { field, .. }) => {
                assert_eq!(field, "employer.training_levy")
            }
            other => panic!("Expected InvalidRateTable, got {:?}", other),
        }
    }

    #[test]
    fn test_rate_above_one_is_rejected() {
        let mut table = reference_rate_table();
        table.withholding_rate = dec("1.5");
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_zero_pension_ceiling_is_rejected() {
        let mut table = reference_rate_table();
        table.pension_ceiling = Decimal::ZERO;

        match table.validate() {
            Err(EngineError::InvalidRateTable { field, .. }) => {
                assert_eq!(field, "pension_ceiling")
            }
            other => panic!("Expected InvalidRateTable, got {:?}", other),
        }
    }

    #[test]
    fn test_policy_rejects_zero_expected_hours() {
        let mut policy = reference_policy();
        policy.expected_monthly_hours = Decimal::ZERO;
        assert!(policy.validate().is_err());
        assert!(reference_policy().validate().is_ok());
    }

    #[test]
    fn test_rate_tables_are_sorted_oldest_first() {
        let mut newer = reference_rate_table();
        newer.effective_date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let older = reference_rate_table();

        let config = create_config(vec![newer, older]);
        let dates: Vec<NaiveDate> = config
            .rate_tables()
            .iter()
            .map(|t| t.effective_date)
            .collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
            ]
        );
    }

    #[test]
    fn test_rate_table_for_picks_most_recent_effective() {
        let mut newer = reference_rate_table();
        newer.effective_date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        newer.withholding_rate = dec("0.08");
        let config = create_config(vec![reference_rate_table(), newer]);

        let mid_2024 = config
            .rate_table_for(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
            .unwrap();
        assert_eq!(mid_2024.withholding_rate, dec("0.075"));

        let in_2025 = config
            .rate_table_for(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
            .unwrap();
        assert_eq!(in_2025.withholding_rate, dec("0.08"));
    }

    #[test]
    fn test_rate_table_for_date_before_any_table() {
        let config = create_config(vec![reference_rate_table()]);
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        match config.rate_table_for(date) {
            Err(EngineError::RateTableNotFound { date: d }) => assert_eq!(d, date),
            other => panic!("Expected RateTableNotFound, got {:?}", other),
        }
    }
}
