//! Pay period model.
//!
//! This module contains the [`PayPeriod`] type that defines which month a
//! payroll run covers and which rate table applies to it.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Represents a pay period with its inclusive date range.
///
/// Payroll is computed monthly, so most periods are built with
/// [`PayPeriod::month`]. The start date selects the effective rate table.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod::month(2024, 2).unwrap();
///
/// assert_eq!(period.end_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// assert_eq!(period.label(), "2024-02");
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
}

impl PayPeriod {
    /// Builds the pay period covering a whole calendar month.
    ///
    /// Returns `InvalidInput` when `month` is not in `1..=12` or the year is
    /// outside the supported calendar range.
    pub fn month(year: i32, month: u32) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidInput {
            field: "period".to_string(),
            message: format!("{}-{} is not a valid calendar month", year, month),
        };

        let start_date = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let end_date = start_date
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(invalid)?;

        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Checks if a given date falls within this pay period.
    ///
    /// The check is inclusive of both start and end dates.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if the period covers exactly one calendar month.
    pub fn is_calendar_month(&self) -> bool {
        self.start_date.day() == 1
            && self
                .start_date
                .checked_add_months(Months::new(1))
                .and_then(|next| next.pred_opt())
                == Some(self.end_date)
    }

    /// Human-readable label: `YYYY-MM` for calendar months, otherwise the
    /// inclusive date range.
    pub fn label(&self) -> String {
        if self.is_calendar_month() {
            format!("{}-{:02}", self.start_date.year(), self.start_date.month())
        } else {
            format!("{}..{}", self.start_date, self.end_date)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_builds_full_calendar_month() {
        let period = PayPeriod::month(2024, 3).unwrap();
        assert_eq!(period.start_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(period.end_date, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    }

    #[test]
    fn test_month_handles_leap_february() {
        let period = PayPeriod::month(2024, 2).unwrap();
        assert_eq!(period.end_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let period = PayPeriod::month(2023, 2).unwrap();
        assert_eq!(period.end_date, NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
    }

    #[test]
    fn test_month_handles_december() {
        let period = PayPeriod::month(2024, 12).unwrap();
        assert_eq!(period.end_date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn test_month_rejects_invalid_month() {
        match PayPeriod::month(2024, 13) {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "period"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
        assert!(PayPeriod::month(2024, 0).is_err());
    }

    #[test]
    fn test_contains_date_is_inclusive() {
        let period = PayPeriod::month(2024, 5).unwrap();
        assert!(period.contains_date(period.start_date));
        assert!(period.contains_date(period.end_date));
        assert!(!period.contains_date(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()));
        assert!(!period.contains_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
    }

    #[test]
    fn test_label_for_calendar_month() {
        assert_eq!(PayPeriod::month(2024, 7).unwrap().label(), "2024-07");
    }

    #[test]
    fn test_label_for_custom_range() {
        let period = PayPeriod {
            start_date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 8, 14).unwrap(),
        };
        assert!(!period.is_calendar_month());
        assert_eq!(period.label(), "2024-07-15..2024-08-14");
    }

    #[test]
    fn test_deserialize_pay_period() {
        let json = r#"{
            "start_date": "2024-01-01",
            "end_date": "2024-01-31"
        }"#;
        let period: PayPeriod = serde_json::from_str(json).unwrap();
        assert_eq!(period, PayPeriod::month(2024, 1).unwrap());
    }
}
