//! Overflow-checked decimal arithmetic for the calculators.
//!
//! Every operation names the quantity it produces, so an out-of-range
//! result surfaces as a `CalculationError` for that employee instead of a
//! panic that would take down the whole batch.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

fn out_of_range(what: &str) -> EngineError {
    EngineError::CalculationError {
        message: format!("{} is outside the decimal range", what),
    }
}

pub(crate) fn add(lhs: Decimal, rhs: Decimal, what: &str) -> EngineResult<Decimal> {
    lhs.checked_add(rhs).ok_or_else(|| out_of_range(what))
}

pub(crate) fn sub(lhs: Decimal, rhs: Decimal, what: &str) -> EngineResult<Decimal> {
    lhs.checked_sub(rhs).ok_or_else(|| out_of_range(what))
}

pub(crate) fn mul(lhs: Decimal, rhs: Decimal, what: &str) -> EngineResult<Decimal> {
    lhs.checked_mul(rhs).ok_or_else(|| out_of_range(what))
}

/// Division; a zero divisor is reported the same way as an overflow.
pub(crate) fn div(lhs: Decimal, rhs: Decimal, what: &str) -> EngineResult<Decimal> {
    lhs.checked_div(rhs).ok_or_else(|| out_of_range(what))
}

pub(crate) fn sum<I>(values: I, what: &str) -> EngineResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| add(acc, value, what))
}
