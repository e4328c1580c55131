//! Payroll run workflow.
//!
//! A [`PayrollRun`] sequences one period through period selection, data
//! loading, calculation, validation and finalization, with guarded
//! transitions between them. Inputs come from any [`PayrollInputSource`].

mod run;
mod source;

pub use run::{CalculationFailure, PayrollRun, RunState};
pub use source::{InMemoryInputSource, PayrollInputSource};
