//! Routing of inbound data-point records to update actions.
//!
//! A record is looked up, decoded and handed to its action. Whatever happens,
//! the dispatcher returns an outcome instead of an error: an unknown
//! identifier, a malformed payload or a failed action affects that record
//! only.

use presence_metrics::{metric_defs, metrics, MetricLabels};
use presence_tuya::{DataPoint, DataPointRecord, DecodedValue, ProtocolError};
use tracing::{trace, warn};

use crate::actions::ActionTable;
use crate::device::DeviceState;
use crate::error::ActionError;

/// What happened to one record.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The action ran and succeeded.
    Applied {
        dp: DataPoint,
        value: DecodedValue,
    },
    /// The identifier is not in the action table. No state was touched.
    UnknownDataPoint { id: u8 },
    /// The payload does not decode for its type tag. No state was touched.
    DecodeFailed { id: u8, error: ProtocolError },
    /// The action returned an error.
    ActionFailed {
        dp: DataPoint,
        value: DecodedValue,
        error: ActionError,
    },
}

impl DispatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DispatchOutcome::Applied { .. })
    }
}

impl std::fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchOutcome::Applied { dp, value } => write!(f, "applied {} = {}", dp, value),
            DispatchOutcome::UnknownDataPoint { id } => write!(f, "unknown data point {}", id),
            DispatchOutcome::DecodeFailed { id, error } => {
                write!(f, "decode failed for data point {}: {}", id, error)
            }
            DispatchOutcome::ActionFailed { dp, error, .. } => {
                write!(f, "action failed for {}: {}", dp, error)
            }
        }
    }
}

/// Dispatches records for one device.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: &'static ActionTable,
    labels: MetricLabels,
}

impl Dispatcher {
    /// Create a dispatcher over the global action table.
    pub fn new(labels: MetricLabels) -> Self {
        Dispatcher {
            table: ActionTable::global(),
            labels,
        }
    }

    /// Dispatch one record against `device`.
    pub async fn dispatch<D>(&self, record: &DataPointRecord, device: &mut D) -> DispatchOutcome
    where
        D: DeviceState + ?Sized,
    {
        let Some((dp, action)) = self.table.lookup(record.id) else {
            warn!("{}: unhandled data point {}", device.name(), record.id);
            metrics::counter!(
                metric_defs::DP_UNKNOWN.name,
                &self.labels.with_dp(record.id.to_string())
            )
            .increment(1);
            return DispatchOutcome::UnknownDataPoint { id: record.id };
        };

        metrics::counter!(metric_defs::DP_RECEIVED.name, &self.labels.with_dp(dp.name()))
            .increment(1);

        let value = match record.decode() {
            Ok(value) => value,
            Err(error) => {
                warn!(
                    "{}: cannot decode {} payload for {}: {}",
                    device.name(),
                    record.data_type,
                    dp,
                    error
                );
                metrics::counter!(
                    metric_defs::DP_DECODE_FAILED.name,
                    &self.labels.with_dp(dp.name())
                )
                .increment(1);
                return DispatchOutcome::DecodeFailed {
                    id: record.id,
                    error,
                };
            }
        };

        trace!("{}: processing {} = {}", device.name(), dp, value);

        match action.apply(dp, device, &value).await {
            Ok(()) => {
                self.record_reading(dp, &value);
                DispatchOutcome::Applied { dp, value }
            }
            Err(error) => {
                warn!(
                    "{}: action failed for data point {} (value {}): {}",
                    device.name(),
                    dp,
                    value,
                    error
                );
                metrics::counter!(metric_defs::ACTION_FAILED.name, &self.labels.with_dp(dp.name()))
                    .increment(1);
                DispatchOutcome::ActionFailed { dp, value, error }
            }
        }
    }

    fn record_reading(&self, dp: DataPoint, value: &DecodedValue) {
        let labels = self.labels.to_labels();
        match dp {
            DataPoint::Presence => {
                let occupied =
                    matches!(value, DecodedValue::Bool(true)) || value.as_number() == Some(1);
                metrics::gauge!(metric_defs::OCCUPANCY.name, &labels)
                    .set(if occupied { 1.0 } else { 0.0 });
            }
            DataPoint::Luminance | DataPoint::Distance => {
                let Some(n) = value.as_number() else {
                    return;
                };
                let name = if dp == DataPoint::Luminance {
                    metric_defs::LUMINANCE.name
                } else {
                    metric_defs::DISTANCE.name
                };
                metrics::gauge!(name, &labels).set(f64::from(n));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{CAP_ALARM_MOTION, CAP_MEASURE_LUMINANCE};
    use crate::error::DeviceError;
    use crate::memory::MemoryDevice;
    use presence_tuya::DataType;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(MetricLabels::new("test", "ZY-M100"))
    }

    #[tokio::test]
    async fn test_presence_bool_record() {
        let mut device = MemoryDevice::new("test");
        let d = dispatcher();

        let on = DataPointRecord::new(1, DataType::Bool, vec![1]);
        assert_eq!(
            d.dispatch(&on, &mut device).await,
            DispatchOutcome::Applied {
                dp: DataPoint::Presence,
                value: DecodedValue::Bool(true)
            }
        );
        assert_eq!(device.boolean(CAP_ALARM_MOTION), Some(true));

        let off = DataPointRecord::new(1, DataType::Bool, vec![0]);
        assert!(d.dispatch(&off, &mut device).await.is_applied());
        assert_eq!(device.boolean(CAP_ALARM_MOTION), Some(false));
    }

    #[tokio::test]
    async fn test_unknown_identifier() {
        let mut device = MemoryDevice::new("test");
        let d = dispatcher();
        for id in [0u8, 5, 7, 8, 10, 100, 105, 200] {
            let record = DataPointRecord::new(id, DataType::Value, vec![0, 0, 0, 1]);
            assert_eq!(
                d.dispatch(&record, &mut device).await,
                DispatchOutcome::UnknownDataPoint { id }
            );
        }
        assert!(device.snapshot().is_pristine());
        assert_eq!(device.observations(), 0);
    }

    #[tokio::test]
    async fn test_decode_failure_touches_nothing() {
        let mut device = MemoryDevice::new("test");
        let record = DataPointRecord::new(1, DataType::Enum, Vec::new());
        assert_eq!(
            dispatcher().dispatch(&record, &mut device).await,
            DispatchOutcome::DecodeFailed {
                id: 1,
                error: ProtocolError::EmptyPayload(DataType::Enum)
            }
        );
        assert!(device.snapshot().is_pristine());
    }

    #[tokio::test]
    async fn test_action_failure_is_contained() {
        let mut device = MemoryDevice::new("test");
        device.fail_capability(CAP_MEASURE_LUMINANCE);
        let record = DataPointRecord::new(104, DataType::Value, vec![0x01, 0x2C]);
        let outcome = dispatcher().dispatch(&record, &mut device).await;
        assert_eq!(
            outcome,
            DispatchOutcome::ActionFailed {
                dp: DataPoint::Luminance,
                value: DecodedValue::Integer(300),
                error: ActionError::Device(DeviceError::Rejected {
                    capability: CAP_MEASURE_LUMINANCE.to_string(),
                    reason: "store unavailable".to_string(),
                }),
            }
        );
    }

    #[tokio::test]
    async fn test_luminance_bool_record_is_refused() {
        let mut device = MemoryDevice::new("test");
        let record = DataPointRecord::new(104, DataType::Bool, vec![1]);
        assert_eq!(
            dispatcher().dispatch(&record, &mut device).await,
            DispatchOutcome::ActionFailed {
                dp: DataPoint::Luminance,
                value: DecodedValue::Bool(true),
                error: ActionError::UnexpectedValue {
                    dp: DataPoint::Luminance,
                    value: DecodedValue::Bool(true),
                },
            }
        );
        assert_eq!(device.numeric(CAP_MEASURE_LUMINANCE), None);
    }

    #[tokio::test]
    async fn test_echo_applies_when_observer_fails() {
        let mut device = MemoryDevice::new("test");
        device.fail_observations();
        let record = DataPointRecord::new(2, DataType::Value, vec![0, 0, 0, 7]);
        assert_eq!(
            dispatcher().dispatch(&record, &mut device).await,
            DispatchOutcome::Applied {
                dp: DataPoint::Sensitivity,
                value: DecodedValue::Integer(7)
            }
        );
        assert!(device.snapshot().is_pristine());
    }

    #[tokio::test]
    async fn test_undocumented_data_point_is_harmless() {
        let mut device = MemoryDevice::new("test");
        let record = DataPointRecord::new(103, DataType::String, b" ".to_vec());
        assert_eq!(
            dispatcher().dispatch(&record, &mut device).await,
            DispatchOutcome::Applied {
                dp: DataPoint::Undocumented103,
                value: DecodedValue::String(" ".to_string())
            }
        );
        assert!(device.snapshot().is_pristine());
    }
}
