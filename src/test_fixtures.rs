//! Shared fixtures for unit tests.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::config::{EmployeeRates, EmployerRates, PayrollPolicy, RateTable};

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Mirrors `config/fr_2024/rates/2024-01-01.yaml`.
pub fn reference_rate_table() -> RateTable {
    RateTable {
        effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        employee: EmployeeRates {
            general_social_levy: dec("0.097"),
            unemployment_insurance: dec("0.024"),
            base_pension: dec("0.069"),
            complementary_pension: dec("0.0401"),
            disability_death_insurance: dec("0.0075"),
            health_plan_flat_fee: dec("35"),
        },
        employer: EmployerRates {
            statutory_levies: dec("0.25"),
            unemployment_insurance: dec("0.0405"),
            pension: dec("0.0601"),
            training_levy: dec("0.0055"),
            transport_levy: dec("0.0175"),
            local_economic_contribution: dec("0.005"),
        },
        pension_ceiling: dec("3864"),
        deductible_fraction: dec("0.025"),
        withholding_rate: dec("0.075"),
    }
}

/// Mirrors `config/fr_2024/policy.yaml`.
pub fn reference_policy() -> PayrollPolicy {
    PayrollPolicy {
        expected_monthly_hours: dec("151.67"),
        minimum_wage: dec("1398.69"),
        overtime_legal_cap: dec("48"),
    }
}
