//! Configurable payroll variables.
//!
//! A [`PayrollVariable`] is a named bonus or deduction whose amount is
//! derived from an employee's input at calculation time, for example a
//! seniority bonus of 3% of base salary or a meal allowance computed from
//! worked hours. Variables are evaluated against a [`VariableContext`] and
//! appended to a copy of the [`PayrollInput`] before the gross-to-net run.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{NamedAmount, PayrollInput};

use super::checked;
use super::formula::{check_formula, evaluate_formula};

/// Whether a variable adds to gross or is withheld from net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// Appended to the input's bonuses.
    Bonus,
    /// Appended to the input's deductions.
    Deduction,
}

/// The amount a percentage variable is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentageBase {
    /// The contractual monthly salary.
    BaseSalary,
    /// The base salary prorated by worked hours.
    ProratedBase,
}

/// One marginal bracket of a progressive variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressiveBracket {
    /// Lower bound of the bracket.
    pub from: Decimal,
    /// Upper bound, or `None` for the open top bracket.
    pub to: Option<Decimal>,
    /// Rate applied to the part of the base inside the bracket.
    pub rate: Decimal,
}

/// How a variable's amount is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalculationMethod {
    /// A fixed amount.
    Fixed {
        /// The amount.
        amount: Decimal,
    },
    /// A fraction of base or prorated salary.
    Percentage {
        /// The fraction (0.03 = 3%).
        rate: Decimal,
        /// What the fraction applies to.
        base: PercentageBase,
    },
    /// An arithmetic expression over the context values.
    Formula {
        /// The expression, e.g. `min(worked_hours / 7, 22) * 5.5`.
        expression: String,
    },
    /// A marginal bracket sum over base salary.
    Progressive {
        /// Brackets sorted by `from`, each starting where the previous ends.
        brackets: Vec<ProgressiveBracket>,
    },
}

/// A named bonus or deduction with its calculation method.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{
///     CalculationMethod, PayrollVariable, PercentageBase, VariableContext, VariableKind,
///     evaluate_variable,
/// };
/// use payroll_engine::models::PayrollInput;
/// use rust_decimal::Decimal;
///
/// let seniority = PayrollVariable {
///     name: "prime_anciennete".to_string(),
///     kind: VariableKind::Bonus,
///     method: CalculationMethod::Percentage {
///         rate: Decimal::new(3, 2),
///         base: PercentageBase::BaseSalary,
///     },
/// };
///
/// let input = PayrollInput::new("emp_001", Decimal::from(3000), Decimal::new(15167, 2));
/// let context = VariableContext::from_input(&input, Decimal::new(15167, 2))?;
/// assert_eq!(evaluate_variable(&seniority, &context)?, Decimal::from(90));
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollVariable {
    /// Name, also used as the payslip label.
    pub name: String,
    /// Bonus or deduction.
    pub kind: VariableKind,
    /// How the amount is computed.
    pub method: CalculationMethod,
}

impl PayrollVariable {
    /// Checks the parts of the method that do not depend on an employee.
    ///
    /// Fixed amounts and rates must not be negative, formulas must parse,
    /// and progressive brackets must be non-empty, start at zero and be
    /// contiguous with only the last one open-ended.
    pub fn validate(&self) -> EngineResult<()> {
        match &self.method {
            CalculationMethod::Fixed { amount } => {
                if *amount < Decimal::ZERO {
                    return Err(self.invalid(format!("fixed amount {} is negative", amount)));
                }
            }
            CalculationMethod::Percentage { rate, .. } => {
                if *rate < Decimal::ZERO {
                    return Err(self.invalid(format!("rate {} is negative", rate)));
                }
            }
            CalculationMethod::Formula { expression } => {
                if expression.trim().is_empty() {
                    return Err(self.invalid("formula is empty".to_string()));
                }
                check_formula(expression).map_err(|e| self.invalid(e.to_string()))?;
            }
            CalculationMethod::Progressive { brackets } => self.validate_brackets(brackets)?,
        }
        Ok(())
    }

    fn validate_brackets(&self, brackets: &[ProgressiveBracket]) -> EngineResult<()> {
        let Some(first) = brackets.first() else {
            return Err(self.invalid("progressive method has no brackets".to_string()));
        };
        if !first.from.is_zero() {
            return Err(self.invalid(format!(
                "first bracket must start at 0 (starts at {})",
                first.from
            )));
        }

        let last = brackets.len() - 1;
        for (i, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO {
                return Err(self.invalid(format!("bracket {} has a negative rate", i)));
            }
            match bracket.to {
                Some(to) if to <= bracket.from => {
                    return Err(self.invalid(format!(
                        "bracket {} is empty ({} to {})",
                        i, bracket.from, to
                    )));
                }
                Some(to) => {
                    if let Some(next) = brackets.get(i + 1)
                        && next.from != to
                    {
                        return Err(self.invalid(format!(
                            "bracket {} starts at {} but bracket {} ends at {}",
                            i + 1,
                            next.from,
                            i,
                            to
                        )));
                    }
                }
                None if i != last => {
                    return Err(self.invalid(format!(
                        "only the last bracket may be open-ended (bracket {})",
                        i
                    )));
                }
                None => {}
            }
        }
        Ok(())
    }

    fn invalid(&self, message: String) -> EngineError {
        EngineError::InvalidVariable {
            name: self.name.clone(),
            message,
        }
    }
}

/// The per-employee values a variable can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableContext {
    /// Contractual monthly salary.
    pub base_salary: Decimal,
    /// Hours worked in the period.
    pub worked_hours: Decimal,
    /// Overtime hours in the period.
    pub overtime_hours: Decimal,
    /// `base_salary / expected_hours`.
    pub hourly_rate: Decimal,
    /// Contractual monthly hours.
    pub expected_hours: Decimal,
    /// Base salary prorated by worked hours.
    pub prorated_base: Decimal,
}

impl VariableContext {
    /// Builds the context for one employee.
    ///
    /// Fails with `InvalidInput` under the same preconditions as the
    /// payroll computation itself, and with `CalculationError` if a derived
    /// value leaves the decimal range.
    pub fn from_input(input: &PayrollInput, expected_monthly_hours: Decimal) -> EngineResult<Self> {
        input.validate(expected_monthly_hours)?;
        let worked_fraction =
            checked::div(input.worked_hours, expected_monthly_hours, "worked hours fraction")?;
        Ok(Self {
            base_salary: input.base_salary,
            worked_hours: input.worked_hours,
            overtime_hours: input.overtime_hours,
            hourly_rate: checked::div(input.base_salary, expected_monthly_hours, "hourly rate")?,
            expected_hours: expected_monthly_hours,
            prorated_base: checked::mul(worked_fraction, input.base_salary, "prorated base")?,
        })
    }

    fn lookup(&self, identifier: &str) -> Option<Decimal> {
        match identifier {
            "base_salary" => Some(self.base_salary),
            "worked_hours" => Some(self.worked_hours),
            "overtime_hours" => Some(self.overtime_hours),
            "hourly_rate" => Some(self.hourly_rate),
            "expected_hours" => Some(self.expected_hours),
            "prorated_base" => Some(self.prorated_base),
            _ => None,
        }
    }
}

/// Evaluates one variable for one employee.
///
/// # Errors
///
/// Returns `InvalidVariable` for malformed brackets, formula errors
/// (syntax, unknown identifier, division by zero), an amount outside the
/// decimal range or a negative result.
pub fn evaluate_variable(
    variable: &PayrollVariable,
    context: &VariableContext,
) -> EngineResult<Decimal> {
    variable.validate()?;

    let amount = match &variable.method {
        CalculationMethod::Fixed { amount } => *amount,
        CalculationMethod::Percentage { rate, base } => {
            let base = match base {
                PercentageBase::BaseSalary => context.base_salary,
                PercentageBase::ProratedBase => context.prorated_base,
            };
            checked::mul(*rate, base, "percentage amount")
                .map_err(|e| variable.invalid(e.to_string()))?
        }
        CalculationMethod::Formula { expression } => {
            evaluate_formula(expression, |name| context.lookup(name))
                .map_err(|e| variable.invalid(e.to_string()))?
        }
        CalculationMethod::Progressive { brackets } => {
            progressive_amount(brackets, context.base_salary)
                .map_err(|e| variable.invalid(e.to_string()))?
        }
    };

    if amount < Decimal::ZERO {
        return Err(variable.invalid(format!("evaluated to a negative amount ({})", amount)));
    }

    Ok(amount)
}

fn progressive_amount(brackets: &[ProgressiveBracket], base: Decimal) -> EngineResult<Decimal> {
    brackets.iter().try_fold(Decimal::ZERO, |total, bracket| {
        let upper = bracket.to.map_or(base, |to| to.min(base));
        let portion = checked::sub(upper, bracket.from, "bracket portion")?.max(Decimal::ZERO);
        let amount = checked::mul(portion, bracket.rate, "bracket amount")?;
        checked::add(total, amount, "progressive amount")
    })
}

/// Returns a copy of `input` with every variable evaluated and appended.
///
/// Bonuses and deductions are appended in variable order, labelled with the
/// variable name. All variables see the original input, so one variable's
/// amount never feeds another.
pub fn apply_variables(
    input: &PayrollInput,
    variables: &[PayrollVariable],
    expected_monthly_hours: Decimal,
) -> EngineResult<PayrollInput> {
    let context = VariableContext::from_input(input, expected_monthly_hours)?;
    let mut applied = input.clone();

    for variable in variables {
        let amount = evaluate_variable(variable, &context)?;
        let line = NamedAmount::new(variable.name.clone(), amount);
        match variable.kind {
            VariableKind::Bonus => applied.bonuses.push(line),
            VariableKind::Deduction => applied.deductions.push(line),
        }
    }

    debug!(
        employee_id = %input.employee_id,
        variables = variables.len(),
        bonuses = applied.bonuses.len(),
        deductions = applied.deductions.len(),
        "Applied payroll variables"
    );

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::dec;

    fn context() -> VariableContext {
        let input = PayrollInput::new("emp_001", dec("3000"), dec("140")).with_overtime(dec("6"));
        VariableContext::from_input(&input, dec("151.67")).unwrap()
    }

    fn variable(kind: VariableKind, method: CalculationMethod) -> PayrollVariable {
        PayrollVariable {
            name: "test_variable".to_string(),
            kind,
            method,
        }
    }

    fn performance_brackets() -> Vec<ProgressiveBracket> {
        vec![
            ProgressiveBracket { from: dec("0"), to: Some(dec("2000")), rate: dec("0") },
            ProgressiveBracket { from: dec("2000"), to: Some(dec("4000")), rate: dec("0.02") },
            ProgressiveBracket { from: dec("4000"), to: None, rate: dec("0.04") },
        ]
    }

    #[test]
    fn test_fixed_amount() {
        let v = variable(VariableKind::Deduction, CalculationMethod::Fixed { amount: dec("60") });
        assert_eq!(evaluate_variable(&v, &context()).unwrap(), dec("60"));
    }

    #[test]
    fn test_percentage_of_base_and_prorated_base() {
        let ctx = context();
        let on_base = variable(
            VariableKind::Bonus,
            CalculationMethod::Percentage { rate: dec("0.03"), base: PercentageBase::BaseSalary },
        );
        let on_prorated = variable(
            VariableKind::Bonus,
            CalculationMethod::Percentage { rate: dec("0.03"), base: PercentageBase::ProratedBase },
        );

        assert_eq!(evaluate_variable(&on_base, &ctx).unwrap(), dec("90"));
        assert_eq!(
            evaluate_variable(&on_prorated, &ctx).unwrap(),
            dec("0.03") * ctx.prorated_base
        );
    }

    #[test]
    fn test_formula_reads_context() {
        let v = variable(
            VariableKind::Bonus,
            CalculationMethod::Formula {
                expression: "min(worked_hours / 7, 22) * 5.5 + overtime_hours".to_string(),
            },
        );
        // 140 / 7 = 20 meals, plus 6
        assert_eq!(evaluate_variable(&v, &context()).unwrap(), dec("116"));
    }

    #[test]
    fn test_formula_errors_become_invalid_variable() {
        let v = variable(
            VariableKind::Bonus,
            CalculationMethod::Formula { expression: "seniority_years * 10".to_string() },
        );
        match evaluate_variable(&v, &context()) {
            Err(EngineError::InvalidVariable { name, message }) => {
                assert_eq!(name, "test_variable");
                assert!(message.contains("seniority_years"));
            }
            other => panic!("Expected InvalidVariable, got {:?}", other),
        }
    }

    #[test]
    fn test_formula_division_by_zero() {
        let v = variable(
            VariableKind::Bonus,
            CalculationMethod::Formula { expression: "base_salary / 0".to_string() },
        );
        assert!(matches!(
            evaluate_variable(&v, &context()),
            Err(EngineError::InvalidVariable { ref message, .. }) if message.contains("division by zero")
        ));
    }

    #[test]
    fn test_negative_result_is_rejected() {
        let v = variable(
            VariableKind::Bonus,
            CalculationMethod::Formula { expression: "worked_hours - 200".to_string() },
        );
        assert!(matches!(
            evaluate_variable(&v, &context()),
            Err(EngineError::InvalidVariable { .. })
        ));
    }

    #[test]
    fn test_progressive_marginal_sum() {
        let v = variable(
            VariableKind::Bonus,
            CalculationMethod::Progressive { brackets: performance_brackets() },
        );

        // 0 on the first 2000, 2% of the next 1000
        assert_eq!(evaluate_variable(&v, &context()).unwrap(), dec("20"));

        let high = PayrollInput::new("emp_002", dec("5000"), dec("151.67"));
        let high_ctx = VariableContext::from_input(&high, dec("151.67")).unwrap();
        // 2% of 2000 + 4% of 1000
        assert_eq!(evaluate_variable(&v, &high_ctx).unwrap(), dec("80"));
    }

    #[test]
    fn test_progressive_below_first_threshold_is_zero() {
        let v = variable(
            VariableKind::Bonus,
            CalculationMethod::Progressive { brackets: performance_brackets() },
        );
        let low = PayrollInput::new("emp_003", dec("1500"), dec("151.67"));
        let ctx = VariableContext::from_input(&low, dec("151.67")).unwrap();
        assert_eq!(evaluate_variable(&v, &ctx).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_malformed_brackets_are_rejected() {
        let mut gap = performance_brackets();
        gap[1].from = dec("2500");
        let mut open_middle = performance_brackets();
        open_middle[0].to = None;
        let mut offset_start = performance_brackets();
        offset_start[0].from = dec("100");

        for brackets in [gap, open_middle, offset_start, Vec::new()] {
            let v = variable(VariableKind::Bonus, CalculationMethod::Progressive { brackets });
            assert!(matches!(v.validate(), Err(EngineError::InvalidVariable { .. })));
        }
    }

    #[test]
    fn test_apply_variables_appends_in_order() {
        let input = PayrollInput::new("emp_001", dec("3000"), dec("151.67"))
            .with_bonus(NamedAmount::new("Prime existante", dec("100")));
        let variables = vec![
            PayrollVariable {
                name: "prime_anciennete".to_string(),
                kind: VariableKind::Bonus,
                method: CalculationMethod::Percentage {
                    rate: dec("0.03"),
                    base: PercentageBase::BaseSalary,
                },
            },
            PayrollVariable {
                name: "titres_restaurant".to_string(),
                kind: VariableKind::Deduction,
                method: CalculationMethod::Fixed { amount: dec("60") },
            },
            PayrollVariable {
                name: "prime_objectifs".to_string(),
                kind: VariableKind::Bonus,
                method: CalculationMethod::Fixed { amount: dec("250") },
            },
        ];

        let applied = apply_variables(&input, &variables, dec("151.67")).unwrap();

        let bonus_labels: Vec<&str> = applied.bonuses.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(bonus_labels, vec!["Prime existante", "prime_anciennete", "prime_objectifs"]);
        assert_eq!(applied.bonus_total(), dec("440"));
        assert_eq!(applied.deduction_total(), dec("60"));
        // the original is untouched
        assert_eq!(input.bonuses.len(), 1);
        assert!(input.deductions.is_empty());
    }

    #[test]
    fn test_apply_variables_rejects_invalid_input() {
        let input = PayrollInput::new("emp_001", dec("3000"), dec("151.67"));
        assert!(matches!(
            apply_variables(&input, &[], Decimal::ZERO),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_method_deserializes_from_tagged_yaml() {
        let yaml = r#"
name: "prime_performance"
kind: bonus
method:
  type: progressive
  brackets:
    - { from: "0", to: "2000", rate: "0" }
    - { from: "2000", rate: "0.02" }
"#;
        let v: PayrollVariable = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(v.kind, VariableKind::Bonus);
        match v.method {
            CalculationMethod::Progressive { brackets } => {
                assert_eq!(brackets.len(), 2);
                assert_eq!(brackets[1].to, None);
                assert_eq!(brackets[1].rate, dec("0.02"));
            }
            other => panic!("Expected progressive method, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_amounts_become_invalid_variable() {
        let percentage = variable(
            VariableKind::Bonus,
            CalculationMethod::Percentage { rate: Decimal::MAX, base: PercentageBase::BaseSalary },
        );
        let progressive = variable(
            VariableKind::Bonus,
            CalculationMethod::Progressive {
                brackets: vec![ProgressiveBracket { from: dec("0"), to: None, rate: Decimal::MAX }],
            },
        );

        for v in [percentage, progressive] {
            match evaluate_variable(&v, &context()) {
                Err(EngineError::InvalidVariable { message, .. }) => {
                    assert!(message.contains("outside the decimal range"))
                }
                other => panic!("Expected InvalidVariable, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_validate_rejects_unparseable_formula() {
        let v = variable(
            VariableKind::Bonus,
            CalculationMethod::Formula { expression: "min(worked_hours, ".to_string() },
        );
        assert!(matches!(v.validate(), Err(EngineError::InvalidVariable { .. })));

        // identifiers are resolved per employee, so an unknown name still validates
        let v = variable(
            VariableKind::Bonus,
            CalculationMethod::Formula { expression: "seniority_years * 10".to_string() },
        );
        assert!(v.validate().is_ok());
    }
}
