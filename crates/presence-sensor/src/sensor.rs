//! The presence sensor device object.

use presence_metrics::MetricLabels;
use presence_tuya::{DataPointRecord, ProtocolError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::device::DeviceState;
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::settings::{SettingsChange, SettingsEncoder, SettingsReport};

/// Default model string reported in metric labels.
pub const DEFAULT_MODEL: &str = "ZY-M100";

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Identity of one sensor instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorConfig {
    pub name: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl SensorConfig {
    pub fn new(name: impl Into<String>) -> Self {
        SensorConfig {
            name: name.into(),
            model: default_model(),
        }
    }

    pub fn labels(&self) -> MetricLabels {
        MetricLabels::new(self.name.clone(), self.model.clone())
    }
}

/// Running counters for one sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SensorStats {
    /// Records handed to the dispatcher, whatever their outcome.
    pub records_dispatched: u64,
    pub applied: u64,
    pub unknown_data_points: u64,
    pub decode_failures: u64,
    pub action_failures: u64,
    /// Data-point writes accepted by the transport.
    pub settings_writes: u64,
}

impl SensorStats {
    fn record(&mut self, outcome: &DispatchOutcome) {
        self.records_dispatched += 1;
        match outcome {
            DispatchOutcome::Applied { .. } => self.applied += 1,
            DispatchOutcome::UnknownDataPoint { .. } => self.unknown_data_points += 1,
            DispatchOutcome::DecodeFailed { .. } => self.decode_failures += 1,
            DispatchOutcome::ActionFailed { .. } => self.action_failures += 1,
        }
    }
}

/// A ZY-M100 sensor bound to its device-state collaborator.
pub struct PresenceSensor<D: DeviceState> {
    config: SensorConfig,
    device: D,
    dispatcher: Dispatcher,
    settings: SettingsEncoder,
    stats: SensorStats,
}

impl<D: DeviceState> PresenceSensor<D> {
    pub fn new(config: SensorConfig, device: D) -> Self {
        let labels = config.labels();
        info!("{}: sensor initialized (model {})", config.name, config.model);
        PresenceSensor {
            dispatcher: Dispatcher::new(labels.clone()),
            settings: SettingsEncoder::new(labels),
            config,
            device,
            stats: SensorStats::default(),
        }
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Handle one inbound data-point report. Never fails.
    pub async fn process_response(&mut self, record: &DataPointRecord) -> DispatchOutcome {
        let outcome = self.dispatcher.dispatch(record, &mut self.device).await;
        self.stats.record(&outcome);
        outcome
    }

    /// Parse one encoded record, then handle it.
    ///
    /// Only framing errors are returned; everything after parsing is reported
    /// through the outcome.
    pub async fn process_frame(&mut self, frame: &[u8]) -> Result<DispatchOutcome, ProtocolError> {
        let record = DataPointRecord::parse(frame)?;
        Ok(self.process_response(&record).await)
    }

    /// Handle a batch of reports, in order.
    pub async fn process_batch<'a, I>(&mut self, records: I) -> Vec<DispatchOutcome>
    where
        I: IntoIterator<Item = &'a DataPointRecord>,
    {
        let mut outcomes = Vec::new();
        for record in records {
            outcomes.push(self.process_response(record).await);
        }
        outcomes
    }

    /// Handle a settings-change event. Never fails; per-key problems are in
    /// the report.
    pub async fn on_settings(&mut self, change: &SettingsChange) -> SettingsReport {
        let report = self.settings.apply(change, &mut self.device).await;
        self.stats.settings_writes += report.written.len() as u64;
        debug!(
            "{}: settings applied ({} written, {} failed, {} rejected)",
            self.config.name,
            report.written.len(),
            report.failed.len(),
            report.rejected.len()
        );
        report
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }

    pub fn stats(&self) -> SensorStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::CAP_MEASURE_DISTANCE;
    use crate::memory::MemoryDevice;
    use presence_tuya::DataType;

    fn sensor() -> PresenceSensor<MemoryDevice> {
        PresenceSensor::new(SensorConfig::new("hallway"), MemoryDevice::new("hallway"))
    }

    #[test]
    fn test_config_default_model() {
        let config: SensorConfig = serde_json::from_str(r#"{"name":"hallway"}"#).unwrap();
        assert_eq!(config, SensorConfig::new("hallway"));
        assert_eq!(config.model, "ZY-M100");
    }

    #[tokio::test]
    async fn test_stats_count_outcomes() {
        let mut sensor = sensor();
        let records = [
            DataPointRecord::new(9, DataType::Value, vec![0, 0, 0, 0x7D]),
            DataPointRecord::new(42, DataType::Value, vec![0, 0, 0, 1]),
            DataPointRecord::new(104, DataType::Value, Vec::new()),
        ];
        let outcomes = sensor.process_batch(&records).await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(
            sensor.stats(),
            SensorStats {
                records_dispatched: 3,
                applied: 1,
                unknown_data_points: 1,
                decode_failures: 1,
                action_failures: 0,
                settings_writes: 0,
            }
        );
        assert_eq!(sensor.device().numeric(CAP_MEASURE_DISTANCE), Some(125.0));
    }

    #[tokio::test]
    async fn test_process_frame() {
        let mut sensor = sensor();
        let outcome = sensor
            .process_frame(&[0x09, 0x02, 0x00, 0x02, 0x01, 0x00])
            .await
            .unwrap();
        assert!(outcome.is_applied());
        assert_eq!(sensor.device().numeric(CAP_MEASURE_DISTANCE), Some(256.0));

        assert!(sensor.process_frame(&[0x09, 0x02]).await.is_err());
        assert_eq!(sensor.stats().records_dispatched, 1);
    }

    #[tokio::test]
    async fn test_settings_counted() {
        let mut sensor = sensor();
        let change = SettingsChange::from_pairs([("detection_delay", 7.0)]);
        let report = sensor.on_settings(&change).await;
        assert_eq!(report.written.len(), 1);
        assert_eq!(sensor.stats().settings_writes, 1);
        assert_eq!(sensor.into_device().snapshot().writes, vec![(101, 70)]);
    }
}
