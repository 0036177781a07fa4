//! Encoding of changed settings into data-point writes.
//!
//! Each user-facing setting maps to one data point and a transform from the
//! user-facing unit to the wire value. A changed key without an encoder means
//! the settings schema and this table have drifted; it is reported loudly and
//! skipped, and the other keys of the change are still written.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use presence_metrics::{metric_defs, metrics, MetricLabels};
use presence_tuya::{DataPoint, DataPointWrite};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::device::DeviceState;
use crate::error::{DeviceError, SettingsError};

/// Settings the sensor exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Sensitivity,
    NearDetection,
    FarDetection,
    DetectionDelay,
    DetectionClearDelay,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::Sensitivity,
        SettingKey::NearDetection,
        SettingKey::FarDetection,
        SettingKey::DetectionDelay,
        SettingKey::DetectionClearDelay,
    ];

    /// Key as it appears in the settings surface.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Sensitivity => "sensitivity",
            SettingKey::NearDetection => "near_detection",
            SettingKey::FarDetection => "far_detection",
            SettingKey::DetectionDelay => "detection_delay",
            SettingKey::DetectionClearDelay => "detection_clear_delay",
        }
    }

    /// Target data point.
    pub const fn data_point(&self) -> DataPoint {
        match self {
            SettingKey::Sensitivity => DataPoint::Sensitivity,
            SettingKey::NearDetection => DataPoint::NearDetection,
            SettingKey::FarDetection => DataPoint::FarDetection,
            SettingKey::DetectionDelay => DataPoint::DetectionDelay,
            SettingKey::DetectionClearDelay => DataPoint::DetectionClearDelay,
        }
    }

    /// Transform from the user-facing value to the wire value.
    pub const fn transform(&self) -> Transform {
        match self {
            SettingKey::Sensitivity
            | SettingKey::NearDetection
            | SettingKey::FarDetection
            | SettingKey::DetectionClearDelay => Transform::Identity,
            // The sensor counts the detection delay in tenths.
            SettingKey::DetectionDelay => Transform::ScaleClamp {
                factor: 10,
                min: 0,
                max: 100,
            },
        }
    }

    /// Encode a new value for this setting.
    pub fn encode(&self, value: f64) -> Result<DataPointWrite, SettingsError> {
        let wire = self
            .transform()
            .apply(value)
            .ok_or_else(|| SettingsError::ValueOutOfRange {
                key: self.as_str().to_string(),
                value,
            })?;
        Ok(DataPointWrite::new(self.data_point().id(), wire))
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| SettingsError::UnmappedSettingKey(s.to_string()))
    }
}

/// Conversion from a user-facing value to a 32-bit wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Sent unchanged (rounded to an integer).
    Identity,
    /// Multiplied by `factor`, then saturated into `[min, max]`.
    ScaleClamp { factor: u32, min: u32, max: u32 },
}

impl Transform {
    /// Apply the transform. `None` when the result has no 32-bit encoding.
    pub fn apply(&self, value: f64) -> Option<u32> {
        if !value.is_finite() {
            return None;
        }
        match *self {
            Transform::Identity => {
                let rounded = value.round();
                if (0.0..=f64::from(u32::MAX)).contains(&rounded) {
                    Some(rounded as u32)
                } else {
                    None
                }
            }
            Transform::ScaleClamp { factor, min, max } => {
                let scaled = (value * f64::from(factor)).round();
                Some(scaled.clamp(f64::from(min), f64::from(max)) as u32)
            }
        }
    }
}

/// A settings-change event from the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsChange {
    /// Keys whose value changed, in the order they are applied.
    pub changed_keys: Vec<String>,
    /// Complete new settings, keyed by setting name.
    pub new_settings: HashMap<String, f64>,
}

impl SettingsChange {
    /// A change where every given key is changed.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut change = SettingsChange::default();
        for (key, value) in pairs {
            let key = key.into();
            change.changed_keys.push(key.clone());
            change.new_settings.insert(key, value);
        }
        change
    }
}

/// Result of applying a settings change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsReport {
    /// Writes accepted by the transport.
    pub written: Vec<DataPointWrite>,
    /// Writes the transport refused.
    pub failed: Vec<(SettingKey, DeviceError)>,
    /// Changed keys that could not be encoded; nothing was sent for them.
    pub rejected: Vec<SettingsError>,
}

impl SettingsReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.rejected.is_empty()
    }
}

/// Applies settings changes for one device.
#[derive(Debug, Clone)]
pub struct SettingsEncoder {
    labels: MetricLabels,
}

impl SettingsEncoder {
    pub fn new(labels: MetricLabels) -> Self {
        SettingsEncoder { labels }
    }

    fn resolve(name: &str, change: &SettingsChange) -> Result<(SettingKey, DataPointWrite), SettingsError> {
        let key: SettingKey = name.parse()?;
        let value = *change
            .new_settings
            .get(name)
            .ok_or_else(|| SettingsError::MissingValue(name.to_string()))?;
        Ok((key, key.encode(value)?))
    }

    /// Write every changed setting, in order.
    ///
    /// Each key is handled on its own: a key that cannot be encoded or whose
    /// write is refused is logged and recorded in the report, and the
    /// remaining keys are still written. A key listed more than once is
    /// written once.
    pub async fn apply<D>(&self, change: &SettingsChange, device: &mut D) -> SettingsReport
    where
        D: DeviceState + ?Sized,
    {
        let mut report = SettingsReport::default();
        let mut seen = HashSet::new();

        for name in &change.changed_keys {
            if !seen.insert(name.as_str()) {
                continue;
            }
            let (key, write) = match Self::resolve(name, change) {
                Ok(resolved) => resolved,
                Err(err) => {
                    if let SettingsError::UnmappedSettingKey(_) = err {
                        error!("{}: settings schema drift: {}", device.name(), err);
                        metrics::counter!(metric_defs::SETTINGS_UNMAPPED.name, &self.labels.to_labels())
                            .increment(1);
                    } else {
                        warn!("{}: skipping setting: {}", device.name(), err);
                    }
                    report.rejected.push(err);
                    continue;
                }
            };

            debug!(
                "{}: {} -> dp {} = {}",
                device.name(),
                key,
                write.id,
                write.value
            );
            match device.write_data32(write.id, write.value).await {
                Ok(()) => {
                    metrics::counter!(
                        metric_defs::SETTINGS_WRITES.name,
                        &self.labels.with_dp(key.data_point().name())
                    )
                    .increment(1);
                    report.written.push(write);
                }
                Err(err) => {
                    warn!("{}: write for setting {} failed: {}", device.name(), key, err);
                    report.failed.push((key, err));
                }
            }
        }
        metrics::histogram!(metric_defs::SETTINGS_BATCH_SIZE.name, &self.labels.to_labels())
            .record(report.written.len() as f64);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDevice;

    fn encoder() -> SettingsEncoder {
        SettingsEncoder::new(MetricLabels::new("test", "ZY-M100"))
    }

    #[test]
    fn test_key_names_round_trip() {
        for key in SettingKey::ALL {
            assert_eq!(key.as_str().parse::<SettingKey>(), Ok(key));
        }
        assert_eq!(
            "led_mode".parse::<SettingKey>(),
            Err(SettingsError::UnmappedSettingKey("led_mode".to_string()))
        );
    }

    #[test]
    fn test_detection_delay_scales_and_clamps() {
        let key = SettingKey::DetectionDelay;
        assert_eq!(key.encode(7.0), Ok(DataPointWrite::new(101, 70)));
        assert_eq!(key.encode(15.0), Ok(DataPointWrite::new(101, 100)));
        assert_eq!(key.encode(-5.0), Ok(DataPointWrite::new(101, 0)));
        assert_eq!(key.encode(1.5), Ok(DataPointWrite::new(101, 15)));
    }

    #[test]
    fn test_identity_settings() {
        assert_eq!(SettingKey::Sensitivity.encode(7.0), Ok(DataPointWrite::new(2, 7)));
        assert_eq!(SettingKey::NearDetection.encode(0.0), Ok(DataPointWrite::new(3, 0)));
        assert_eq!(SettingKey::FarDetection.encode(600.0), Ok(DataPointWrite::new(4, 600)));
        assert_eq!(
            SettingKey::DetectionClearDelay.encode(30.0),
            Ok(DataPointWrite::new(102, 30))
        );
    }

    #[test]
    fn test_identity_rejects_unrepresentable() {
        assert!(matches!(
            SettingKey::Sensitivity.encode(-1.0),
            Err(SettingsError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            SettingKey::Sensitivity.encode(f64::NAN),
            Err(SettingsError::ValueOutOfRange { .. })
        ));
        assert_eq!(Transform::Identity.apply(5e10), None);
    }

    #[tokio::test]
    async fn test_apply_writes_in_order() {
        let mut device = MemoryDevice::new("test");
        let change = SettingsChange::from_pairs([("sensitivity", 6.0), ("detection_delay", 2.0)]);
        let report = encoder().apply(&change, &mut device).await;
        assert!(report.is_complete());
        assert_eq!(device.snapshot().writes, vec![(2, 6), (101, 20)]);
    }

    #[tokio::test]
    async fn test_unmapped_key_does_not_block_other_keys() {
        let mut device = MemoryDevice::new("test");
        let change = SettingsChange::from_pairs([
            ("far_detection", 450.0),
            ("led_mode", 1.0),
            ("detection_delay", 7.0),
        ]);
        let report = encoder().apply(&change, &mut device).await;
        assert_eq!(
            report.rejected,
            vec![SettingsError::UnmappedSettingKey("led_mode".to_string())]
        );
        assert!(!report.is_complete());
        assert_eq!(device.snapshot().writes, vec![(4, 450), (101, 70)]);
    }

    #[tokio::test]
    async fn test_missing_value_is_skipped() {
        let mut device = MemoryDevice::new("test");
        let mut change = SettingsChange::from_pairs([("sensitivity", 3.0)]);
        change.changed_keys.insert(0, "far_detection".to_string());
        let report = encoder().apply(&change, &mut device).await;
        assert_eq!(
            report.rejected,
            vec![SettingsError::MissingValue("far_detection".to_string())]
        );
        assert_eq!(device.snapshot().writes, vec![(2, 3)]);
    }

    #[tokio::test]
    async fn test_repeated_key_is_written_once() {
        let mut device = MemoryDevice::new("test");
        let change = SettingsChange::from_pairs([
            ("detection_delay", 7.0),
            ("sensitivity", 5.0),
            ("detection_delay", 7.0),
        ]);
        let report = encoder().apply(&change, &mut device).await;
        assert!(report.is_complete());
        assert_eq!(device.snapshot().writes, vec![(101, 70), (2, 5)]);
    }

    #[tokio::test]
    async fn test_refused_write_does_not_stop_others() {
        let mut device = MemoryDevice::new("test");
        device.fail_data_point(3);
        let change = SettingsChange::from_pairs([
            ("near_detection", 50.0),
            ("far_detection", 400.0),
        ]);
        let report = encoder().apply(&change, &mut device).await;
        assert_eq!(report.written, vec![DataPointWrite::new(4, 400)]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, SettingKey::NearDetection);
    }
}
