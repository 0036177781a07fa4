//! Scenario runner for the presence sensor core.
//!
//! Replays a YAML scenario of data-point reports and settings changes against
//! an in-memory device and reports what each step did.

pub mod error;
pub mod run;
pub mod scenario;

pub use error::RunnerError;
pub use run::{run_scenario, ScenarioReport, StepReport};
pub use scenario::{DataPointStep, Scenario, Step};
