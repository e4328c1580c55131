//! # Payroll Run State Machine
//!
//! Sequences one period's payroll through its stages:
//!
//! ```text
//! PERIOD_SELECTED ──load_data──▶ DATA_LOADED ──calculate──▶ CALCULATED
//!                                                              │
//!                     FINALIZED ◀──finalize── VALIDATED ◀──validate
//! ```
//!
//! `load_data` is accepted from every non-final state and discards later
//! stage data, so a run can always be restarted before it is finalized.
//! `calculate` may be repeated while the run is calculated. `validate` only
//! advances when there are no error findings and no calculation failures.
//! `FINALIZED` is terminal.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    PayrollVariable, apply_variables, compute_batch, has_blocking_findings, validate_batch,
};
use crate::config::{ConfigLoader, RateTable};
use crate::error::{EngineError, EngineResult};
use crate::models::{PayPeriod, PayrollInput, PayrollResult, ValidationFinding};

use super::source::PayrollInputSource;

/// Stages of a payroll run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// A period has been chosen; no data yet.
    PeriodSelected,
    /// Inputs have been loaded from the data source.
    DataLoaded,
    /// Results have been computed.
    Calculated,
    /// Validation passed with no blocking findings.
    Validated,
    /// The run is closed. Terminal state.
    Finalized,
}

impl RunState {
    /// Whether this is a terminal state (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized)
    }

    /// The canonical string name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PeriodSelected => "PERIOD_SELECTED",
            Self::DataLoaded => "DATA_LOADED",
            Self::Calculated => "CALCULATED",
            Self::Validated => "VALIDATED",
            Self::Finalized => "FINALIZED",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An employee whose result could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationFailure {
    /// Position of the employee in the run's inputs.
    pub index: usize,
    /// The employee.
    pub employee_id: String,
    /// The error message.
    pub message: String,
}

/// One period's payroll run.
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::{PayPeriod, PayrollInput};
/// use payroll_engine::workflow::{InMemoryInputSource, PayrollRun, RunState};
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/fr_2024")?;
/// let period = PayPeriod::month(2024, 3)?;
/// let source = InMemoryInputSource::new().with_period(
///     period.clone(),
///     vec![PayrollInput::new("emp_001", Decimal::from(3000), Decimal::new(15167, 2))],
/// );
///
/// let mut run = PayrollRun::new(period);
/// run.load_data(&source)?;
/// run.calculate_with(&loader)?;
/// run.validate_with(&loader)?;
/// run.finalize()?;
/// assert_eq!(run.state(), RunState::Finalized);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct PayrollRun {
    id: Uuid,
    period: PayPeriod,
    state: RunState,
    inputs: Vec<PayrollInput>,
    results: Vec<PayrollResult>,
    #[serde(skip)]
    result_indices: Vec<usize>,
    failures: Vec<CalculationFailure>,
    findings: Vec<ValidationFinding>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    finalized_at: Option<DateTime<Utc>>,
}

impl PayrollRun {
    /// Starts a run for `period`.
    pub fn new(period: PayPeriod) -> Self {
        let now = Utc::now();
        let run = Self {
            id: Uuid::new_v4(),
            period,
            state: RunState::PeriodSelected,
            inputs: Vec::new(),
            results: Vec::new(),
            result_indices: Vec::new(),
            failures: Vec::new(),
            findings: Vec::new(),
            created_at: now,
            updated_at: now,
            finalized_at: None,
        };
        info!(run_id = %run.id, period = %run.period.label(), "Payroll run created");
        run
    }

    /// Unique run identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The period being paid.
    pub fn period(&self) -> &PayPeriod {
        &self.period
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Loaded inputs, in source order.
    pub fn inputs(&self) -> &[PayrollInput] {
        &self.inputs
    }

    /// Computed results, in input order, skipping failed employees.
    pub fn results(&self) -> &[PayrollResult] {
        &self.results
    }

    /// Employees whose computation failed, in input order.
    pub fn failures(&self) -> &[CalculationFailure] {
        &self.failures
    }

    /// Findings from the last validation, indexed by input position.
    pub fn findings(&self) -> &[ValidationFinding] {
        &self.findings
    }

    /// When the run was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the run last changed state.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// When the run was finalized, if it has been.
    pub fn finalized_at(&self) -> Option<DateTime<Utc>> {
        self.finalized_at
    }

    /// Loads the period's inputs, discarding any results and findings.
    pub fn load_data(&mut self, source: &dyn PayrollInputSource) -> EngineResult<()> {
        if self.state.is_terminal() {
            return Err(self.invalid_transition("load data for", "run is finalized"));
        }

        let inputs = source.load_inputs(&self.period)?;
        self.inputs = inputs;
        self.clear_calculation();
        self.transition(RunState::DataLoaded);
        Ok(())
    }

    /// Computes every loaded input with `rate_table`.
    ///
    /// Per-employee errors are recorded in [`failures`](Self::failures) and
    /// do not stop the other employees.
    pub fn calculate(
        &mut self,
        rate_table: &RateTable,
        expected_monthly_hours: Decimal,
    ) -> EngineResult<()> {
        self.calculate_inner(rate_table, expected_monthly_hours, &[])
    }

    /// Computes every loaded input using the configuration's rate table for
    /// the period start, its expected hours and its payroll variables.
    pub fn calculate_with(&mut self, loader: &ConfigLoader) -> EngineResult<()> {
        self.ensure_calculable()?;
        let rate_table = loader.rate_table_for(self.period.start_date)?;
        self.calculate_inner(
            rate_table,
            loader.policy().expected_monthly_hours,
            loader.variables(),
        )
    }

    fn ensure_calculable(&self) -> EngineResult<()> {
        match self.state {
            RunState::DataLoaded | RunState::Calculated => Ok(()),
            RunState::PeriodSelected => {
                Err(self.invalid_transition("calculate", "data must be loaded first"))
            }
            RunState::Validated => Err(self.invalid_transition(
                "calculate",
                "results are validated; reload data to recalculate",
            )),
            RunState::Finalized => Err(self.invalid_transition("calculate", "run is finalized")),
        }
    }

    fn calculate_inner(
        &mut self,
        rate_table: &RateTable,
        expected_monthly_hours: Decimal,
        variables: &[PayrollVariable],
    ) -> EngineResult<()> {
        self.ensure_calculable()?;

        let mut failures = Vec::new();
        let mut prepared = Vec::with_capacity(self.inputs.len());
        let mut prepared_indices = Vec::with_capacity(self.inputs.len());

        for (index, input) in self.inputs.iter().enumerate() {
            match apply_variables(input, variables, expected_monthly_hours) {
                Ok(applied) => {
                    prepared.push(applied);
                    prepared_indices.push(index);
                }
                Err(e) => failures.push(CalculationFailure {
                    index,
                    employee_id: input.employee_id.clone(),
                    message: e.to_string(),
                }),
            }
        }

        let mut results = Vec::with_capacity(prepared.len());
        let mut result_indices = Vec::with_capacity(prepared.len());
        let outcomes = compute_batch(&prepared, expected_monthly_hours, rate_table);

        for ((index, input), outcome) in prepared_indices.into_iter().zip(&prepared).zip(outcomes) {
            match outcome {
                Ok(result) => {
                    results.push(result);
                    result_indices.push(index);
                }
                Err(e) => failures.push(CalculationFailure {
                    index,
                    employee_id: input.employee_id.clone(),
                    message: e.to_string(),
                }),
            }
        }
        failures.sort_by_key(|f| f.index);

        if !failures.is_empty() {
            warn!(
                run_id = %self.id,
                failures = failures.len(),
                "Some employees could not be calculated"
            );
        }

        self.results = results;
        self.result_indices = result_indices;
        self.failures = failures;
        self.findings.clear();
        self.transition(RunState::Calculated);
        Ok(())
    }

    /// Validates the computed results.
    ///
    /// Findings are recorded in every case. The run moves to `VALIDATED`
    /// only if there is no error finding and no calculation failure;
    /// otherwise it stays `CALCULATED` and `ValidationBlocked` is returned.
    pub fn validate(&mut self, minimum_wage: Decimal, overtime_legal_cap: Decimal) -> EngineResult<()> {
        if self.state != RunState::Calculated {
            return Err(self.invalid_transition("validate", "results must be calculated first"));
        }

        let paired_inputs: Vec<PayrollInput> = self
            .result_indices
            .iter()
            .map(|&i| self.inputs[i].clone())
            .collect();
        let mut findings =
            validate_batch(&self.results, &paired_inputs, minimum_wage, overtime_legal_cap)?;
        for finding in &mut findings {
            finding.index = self.result_indices[finding.index];
        }

        let errors = findings.iter().filter(|f| f.is_blocking()).count();
        let blocked = has_blocking_findings(&findings) || !self.failures.is_empty();
        self.findings = findings;
        self.updated_at = Utc::now();

        if blocked {
            warn!(
                run_id = %self.id,
                errors,
                failures = self.failures.len(),
                "Payroll run validation blocked"
            );
            return Err(EngineError::ValidationBlocked {
                errors,
                failures: self.failures.len(),
            });
        }

        self.transition(RunState::Validated);
        Ok(())
    }

    /// Validates with the configured minimum wage and overtime cap.
    pub fn validate_with(&mut self, loader: &ConfigLoader) -> EngineResult<()> {
        let policy = loader.policy();
        self.validate(policy.minimum_wage, policy.overtime_legal_cap)
    }

    /// Closes the run.
    pub fn finalize(&mut self) -> EngineResult<()> {
        if self.state != RunState::Validated {
            return Err(self.invalid_transition("finalize", "run must be validated first"));
        }

        self.transition(RunState::Finalized);
        self.finalized_at = Some(self.updated_at);
        Ok(())
    }

    fn clear_calculation(&mut self) {
        self.results.clear();
        self.result_indices.clear();
        self.failures.clear();
        self.findings.clear();
    }

    fn transition(&mut self, to: RunState) {
        info!(
            run_id = %self.id,
            from = %self.state,
            to = %to,
            employees = self.inputs.len(),
            "Payroll run transition"
        );
        self.state = to;
        self.updated_at = Utc::now();
    }

    fn invalid_transition(&self, action: &str, reason: &str) -> EngineError {
        EngineError::InvalidTransition {
            from: self.state,
            action: action.to_string(),
            reason: reason.to_string(),
        }
    }
}
