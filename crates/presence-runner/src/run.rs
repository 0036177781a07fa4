//! Scenario execution against an in-memory device.

use presence_sensor::{DeviceSnapshot, MemoryDevice, PresenceSensor, SensorStats};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::RunnerError;
use crate::scenario::{decode_hex, settings_change, Scenario, Step};

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub kind: &'static str,
    pub ok: bool,
    pub detail: String,
}

/// Result of a whole scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub stats: SensorStats,
    pub device: DeviceSnapshot,
    pub steps: Vec<StepReport>,
}

impl ScenarioReport {
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| !s.ok)
    }
}

fn build_device(scenario: &Scenario) -> MemoryDevice {
    let mut device = MemoryDevice::new(scenario.name.clone());
    for capability in &scenario.fail_capabilities {
        device.fail_capability(capability.clone());
    }
    for &dp in &scenario.fail_data_points {
        device.fail_data_point(dp);
    }
    device
}

/// Run every step in order.
///
/// Dispatch and settings failures are recorded in the step report and the
/// run continues. Malformed step content (bad hex, unknown type names)
/// aborts the run.
pub async fn run_scenario(scenario: &Scenario) -> Result<ScenarioReport, RunnerError> {
    info!(
        "running scenario '{}' ({} steps)",
        scenario.name,
        scenario.steps.len()
    );
    let mut sensor = PresenceSensor::new(scenario.sensor_config(), build_device(scenario));
    let mut steps = Vec::with_capacity(scenario.steps.len());

    for (index, step) in scenario.steps.iter().enumerate() {
        let (ok, detail) = match step {
            Step::Frame { record } => {
                let frame = decode_hex(index, record)?;
                match sensor.process_frame(&frame).await {
                    Ok(outcome) => (outcome.is_applied(), outcome.to_string()),
                    Err(err) => (false, format!("malformed record: {}", err)),
                }
            }
            Step::DataPoint { data_point } => {
                let record = data_point.to_record(index)?;
                let outcome = sensor.process_response(&record).await;
                (outcome.is_applied(), outcome.to_string())
            }
            Step::Settings { settings } => {
                let report = sensor.on_settings(&settings_change(settings)).await;
                let mut problems: Vec<String> = report
                    .failed
                    .iter()
                    .map(|(key, err)| format!("{}: {}", key, err))
                    .collect();
                problems.extend(report.rejected.iter().map(ToString::to_string));
                let detail = if problems.is_empty() {
                    format!("{} writes", report.written.len())
                } else {
                    format!("{} writes, failed: {}", report.written.len(), problems.join("; "))
                };
                (report.is_complete(), detail)
            }
        };
        if !ok {
            warn!("step {} ({}): {}", index, step.kind(), detail);
        }
        steps.push(StepReport {
            index,
            kind: step.kind(),
            ok,
            detail,
        });
    }

    let stats = sensor.stats();
    info!(
        "scenario '{}' done: {} records, {} applied, {} settings writes",
        scenario.name, stats.records_dispatched, stats.applied, stats.settings_writes
    );
    Ok(ScenarioReport {
        name: scenario.name.clone(),
        stats,
        device: sensor.into_device().snapshot(),
        steps,
    })
}
