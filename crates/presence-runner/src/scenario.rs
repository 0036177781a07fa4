//! Scenario file format.
//!
//! ```yaml
//! name: hallway
//! model: ZY-M100            # optional
//! fail_capabilities: [measure_luminance]
//! fail_data_points: [4]
//! steps:
//!   - record: "01 04 0001 01"
//!   - data_point: { id: 104, type: value, data: "0000012c" }
//!   - settings: { detection_delay: 7, far_detection: 450 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use presence_sensor::{SensorConfig, SettingsChange, DEFAULT_MODEL};
use presence_tuya::{DataPointRecord, DataType};
use serde::{Deserialize, Serialize};

use crate::error::RunnerError;

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// A replayable sequence of reports and settings changes for one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Capabilities and status fields whose updates the device rejects.
    #[serde(default)]
    pub fail_capabilities: Vec<String>,
    /// Data points whose writes the transport rejects.
    #[serde(default)]
    pub fail_data_points: Vec<u8>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Load a scenario from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RunnerError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, RunnerError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn sensor_config(&self) -> SensorConfig {
        SensorConfig {
            name: self.name.clone(),
            model: self.model.clone(),
        }
    }
}

/// One scenario step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// A complete record in its byte layout, hex encoded.
    Frame { record: String },
    /// A record given field by field.
    DataPoint { data_point: DataPointStep },
    /// A settings change; every listed key counts as changed.
    Settings { settings: BTreeMap<String, f64> },
}

impl Step {
    pub fn kind(&self) -> &'static str {
        match self {
            Step::Frame { .. } => "record",
            Step::DataPoint { .. } => "data_point",
            Step::Settings { .. } => "settings",
        }
    }
}

/// Field-by-field form of a data-point record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPointStep {
    pub id: u8,
    /// Type name (`raw`, `bool`, `value`, `string`, `enum`, `bitmap`).
    #[serde(rename = "type")]
    pub data_type: String,
    /// Payload, hex encoded.
    #[serde(default)]
    pub data: String,
}

impl DataPointStep {
    pub fn to_record(&self, step: usize) -> Result<DataPointRecord, RunnerError> {
        let data_type = DataType::from_name(&self.data_type).ok_or_else(|| RunnerError::UnknownDataType {
            step,
            name: self.data_type.clone(),
        })?;
        Ok(DataPointRecord::new(self.id, data_type, decode_hex(step, &self.data)?))
    }
}

/// Settings change for a settings step, keys in ascending order.
pub fn settings_change(settings: &BTreeMap<String, f64>) -> SettingsChange {
    SettingsChange::from_pairs(settings.iter().map(|(key, value)| (key.clone(), *value)))
}

/// Decode hex, ignoring whitespace.
pub fn decode_hex(step: usize, text: &str) -> Result<Vec<u8>, RunnerError> {
    let compact: String = text.split_whitespace().collect();
    hex::decode(compact).map_err(|source| RunnerError::Hex { step, source })
}
