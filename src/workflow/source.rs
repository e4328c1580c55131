//! Upstream payroll data providers.

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::models::{PayPeriod, PayrollInput};

/// Supplies the payroll inputs for a period.
///
/// Implementations assemble [`PayrollInput`] records from employee master
/// data, attendance aggregates and leave records. The engine only reads
/// through this trait and never writes back.
pub trait PayrollInputSource {
    /// Returns every employee's input for `period`, in payslip order.
    fn load_inputs(&self, period: &PayPeriod) -> EngineResult<Vec<PayrollInput>>;
}

/// An in-memory data source keyed by pay period.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{PayPeriod, PayrollInput};
/// use payroll_engine::workflow::{InMemoryInputSource, PayrollInputSource};
/// use rust_decimal::Decimal;
///
/// let period = PayPeriod::month(2024, 3)?;
/// let source = InMemoryInputSource::new().with_period(
///     period.clone(),
///     vec![PayrollInput::new("emp_001", Decimal::from(3000), Decimal::new(15167, 2))],
/// );
///
/// assert_eq!(source.load_inputs(&period)?.len(), 1);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryInputSource {
    periods: HashMap<PayPeriod, Vec<PayrollInput>>,
}

impl InMemoryInputSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the inputs for a period, replacing any previous ones.
    pub fn with_period(mut self, period: PayPeriod, inputs: Vec<PayrollInput>) -> Self {
        self.insert(period, inputs);
        self
    }

    /// Stores the inputs for a period, replacing any previous ones.
    pub fn insert(&mut self, period: PayPeriod, inputs: Vec<PayrollInput>) {
        self.periods.insert(period, inputs);
    }
}

impl PayrollInputSource for InMemoryInputSource {
    fn load_inputs(&self, period: &PayPeriod) -> EngineResult<Vec<PayrollInput>> {
        self.periods
            .get(period)
            .cloned()
            .ok_or_else(|| EngineError::InvalidInput {
                field: "period".to_string(),
                message: format!("no payroll data for period {}", period.label()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::dec;

    #[test]
    fn test_returns_inputs_for_known_period() {
        let period = PayPeriod::month(2024, 3).unwrap();
        let source = InMemoryInputSource::new().with_period(
            period.clone(),
            vec![
                PayrollInput::new("emp_001", dec("3000"), dec("151.67")),
                PayrollInput::new("emp_002", dec("2200"), dec("151.67")),
            ],
        );

        let inputs = source.load_inputs(&period).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].employee_id, "emp_001");
    }

    #[test]
    fn test_unknown_period_is_an_error() {
        let source = InMemoryInputSource::new();
        let period = PayPeriod::month(2024, 4).unwrap();

        match source.load_inputs(&period) {
            Err(EngineError::InvalidInput { field, message }) => {
                assert_eq!(field, "period");
                assert!(message.contains("2024-04"));
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_insert_replaces_previous_inputs() {
        let period = PayPeriod::month(2024, 3).unwrap();
        let mut source = InMemoryInputSource::new();
        source.insert(
            period.clone(),
            vec![PayrollInput::new("emp_001", dec("3000"), dec("151.67"))],
        );
        source.insert(period.clone(), Vec::new());

        assert!(source.load_inputs(&period).unwrap().is_empty());
    }
}
