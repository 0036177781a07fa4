//! In-memory device state.
//!
//! Stands in for the host's capability store and the Tuya transport: state
//! updates land in maps, outbound writes are recorded in order. Individual
//! capabilities or data points can be set to fail, to exercise the error
//! paths of the dispatcher and settings encoder.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use presence_tuya::{DataPoint, DataPointWrite, DecodedValue};
use serde::Serialize;
use tracing::debug;

use crate::device::DeviceState;
use crate::error::DeviceError;

/// Serializable view of a [`MemoryDevice`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    pub name: String,
    pub numeric: BTreeMap<String, f64>,
    pub boolean: BTreeMap<String, bool>,
    pub status: BTreeMap<String, String>,
    /// Outbound writes as `(dp, value)`, oldest first.
    pub writes: Vec<(u8, u32)>,
}

impl DeviceSnapshot {
    /// True when no state was set and nothing was written.
    pub fn is_pristine(&self) -> bool {
        self.numeric.is_empty()
            && self.boolean.is_empty()
            && self.status.is_empty()
            && self.writes.is_empty()
    }
}

/// Device state held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDevice {
    name: String,
    numeric: BTreeMap<String, f64>,
    boolean: BTreeMap<String, bool>,
    status: BTreeMap<String, String>,
    writes: Vec<DataPointWrite>,
    observations: u32,
    failing_observations: bool,
    failing_capabilities: BTreeSet<String>,
    failing_data_points: BTreeSet<u8>,
}

impl MemoryDevice {
    pub fn new(name: impl Into<String>) -> Self {
        MemoryDevice {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Make every update of `capability` fail.
    pub fn fail_capability(&mut self, capability: impl Into<String>) {
        self.failing_capabilities.insert(capability.into());
    }

    /// Make every observation fail.
    pub fn fail_observations(&mut self) {
        self.failing_observations = true;
    }

    /// Make every write to data point `dp` fail.
    pub fn fail_data_point(&mut self, dp: u8) {
        self.failing_data_points.insert(dp);
    }

    pub fn numeric(&self, capability: &str) -> Option<f64> {
        self.numeric.get(capability).copied()
    }

    pub fn boolean(&self, capability: &str) -> Option<bool> {
        self.boolean.get(capability).copied()
    }

    pub fn status(&self, field: &str) -> Option<&str> {
        self.status.get(field).map(String::as_str)
    }

    /// Outbound writes, oldest first.
    pub fn writes(&self) -> &[DataPointWrite] {
        &self.writes
    }

    /// Number of values observed without a state change.
    pub fn observations(&self) -> u32 {
        self.observations
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            name: self.name.clone(),
            numeric: self.numeric.clone(),
            boolean: self.boolean.clone(),
            status: self.status.clone(),
            writes: self.writes.iter().map(|w| (w.id, w.value)).collect(),
        }
    }

    fn check(&self, capability: &str) -> Result<(), DeviceError> {
        if self.failing_capabilities.contains(capability) {
            return Err(DeviceError::Rejected {
                capability: capability.to_string(),
                reason: "store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DeviceState for MemoryDevice {
    fn name(&self) -> &str {
        &self.name
    }

    async fn set_numeric_state(&mut self, capability: &str, value: f64) -> Result<(), DeviceError> {
        self.check(capability)?;
        self.numeric.insert(capability.to_string(), value);
        Ok(())
    }

    async fn set_boolean_state(&mut self, capability: &str, value: bool) -> Result<(), DeviceError> {
        self.check(capability)?;
        self.boolean.insert(capability.to_string(), value);
        Ok(())
    }

    async fn set_status_text(&mut self, field: &str, text: &str) -> Result<(), DeviceError> {
        self.check(field)?;
        self.status.insert(field.to_string(), text.to_string());
        Ok(())
    }

    async fn write_data32(&mut self, dp: u8, value: u32) -> Result<(), DeviceError> {
        if self.failing_data_points.contains(&dp) {
            return Err(DeviceError::WriteFailed {
                dp,
                reason: "transport closed".to_string(),
            });
        }
        self.writes.push(DataPointWrite::new(dp, value));
        Ok(())
    }

    async fn observe(&mut self, dp: DataPoint, value: &DecodedValue) -> Result<(), DeviceError> {
        if self.failing_observations {
            return Err(DeviceError::Rejected {
                capability: dp.name().to_string(),
                reason: "observer unavailable".to_string(),
            });
        }
        debug!("{}: {} reported {}", self.name, dp, value);
        self.observations += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_capability() {
        let mut device = MemoryDevice::new("test");
        device.fail_capability("alarm_motion");
        assert!(device.set_boolean_state("alarm_motion", true).await.is_err());
        assert!(device.set_numeric_state("measure_luminance", 1.0).await.is_ok());
        assert_eq!(device.boolean("alarm_motion"), None);
    }

    #[tokio::test]
    async fn test_failing_data_point() {
        let mut device = MemoryDevice::new("test");
        device.fail_data_point(2);
        assert_eq!(
            device.write_data32(2, 5).await,
            Err(DeviceError::WriteFailed {
                dp: 2,
                reason: "transport closed".to_string()
            })
        );
        device.write_data32(3, 5).await.unwrap();
        assert_eq!(device.snapshot().writes, vec![(3, 5)]);
    }

    #[test]
    fn test_snapshot_serializes() {
        let device = MemoryDevice::new("hallway");
        let json = serde_json::to_value(device.snapshot()).unwrap();
        assert_eq!(json["name"], "hallway");
        assert!(json["writes"].as_array().unwrap().is_empty());
    }
}
