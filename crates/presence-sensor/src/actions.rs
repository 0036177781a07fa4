//! Update actions and the data point → action table.
//!
//! Every registered [`DataPoint`] maps to exactly one [`Action`]. The mapping
//! is an exhaustive `match`, so adding a data point without deciding its
//! action does not compile.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use presence_tuya::{DataPoint, DecodedValue, SelfCheckStatus};
use tracing::{debug, trace};

use crate::device::{
    DeviceState, CAP_ALARM_MOTION, CAP_MEASURE_DISTANCE, CAP_MEASURE_LUMINANCE, STATUS_SELF_CHECK,
};
use crate::error::{ActionError, ActionResult};

/// The update applied for one data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Raise `alarm_motion` exactly when the value equals 1 (boolean true
    /// counts as 1).
    OccupancyAlarm,
    /// Echo of device-held configuration; observed, no state change. A failed
    /// observation is logged and the action still succeeds.
    ConfigEcho,
    /// Store the value in `measure_luminance`.
    Illuminance,
    /// Store the value in `measure_distance`.
    Distance,
    /// Resolve the self-check code and write its label to the status field.
    SelfCheck,
    /// Meaning unknown; traced only.
    Ignore,
}

impl Action {
    /// The action bound to a data point.
    pub const fn for_data_point(dp: DataPoint) -> Self {
        match dp {
            DataPoint::Presence => Action::OccupancyAlarm,
            DataPoint::Sensitivity
            | DataPoint::NearDetection
            | DataPoint::FarDetection
            | DataPoint::DetectionDelay
            | DataPoint::DetectionClearDelay => Action::ConfigEcho,
            DataPoint::Luminance => Action::Illuminance,
            DataPoint::Distance => Action::Distance,
            DataPoint::SelfCheck => Action::SelfCheck,
            DataPoint::Undocumented103 => Action::Ignore,
        }
    }

    /// Apply the action for `dp` to the device.
    pub async fn apply<D>(self, dp: DataPoint, device: &mut D, value: &DecodedValue) -> ActionResult<()>
    where
        D: DeviceState + ?Sized,
    {
        match self {
            Action::OccupancyAlarm => {
                let present = match value {
                    DecodedValue::Bool(b) => *b,
                    _ => expect_number(dp, value)? == 1,
                };
                debug!("{}: presence {} -> {}", device.name(), value, present);
                device.set_boolean_state(CAP_ALARM_MOTION, present).await?;
            }
            Action::ConfigEcho => {
                if let Err(err) = device.observe(dp, value).await {
                    debug!("{}: could not observe {} = {}: {}", device.name(), dp, value, err);
                }
            }
            Action::Illuminance => {
                let lux = expect_number(dp, value)?;
                device
                    .set_numeric_state(CAP_MEASURE_LUMINANCE, f64::from(lux))
                    .await?;
            }
            Action::Distance => {
                let distance = expect_number(dp, value)?;
                device
                    .set_numeric_state(CAP_MEASURE_DISTANCE, f64::from(distance))
                    .await?;
            }
            Action::SelfCheck => {
                let code = match value {
                    DecodedValue::Enum(code) => u32::from(*code),
                    DecodedValue::Integer(code) => *code,
                    _ => return Err(unexpected(dp, value)),
                };
                let status = SelfCheckStatus::from_code(code);
                debug!("{}: self-check {}", device.name(), status);
                device
                    .set_status_text(STATUS_SELF_CHECK, status.label())
                    .await?;
            }
            Action::Ignore => {
                trace!("{}: ignoring {} value {}", device.name(), dp, value);
            }
        }
        Ok(())
    }
}

/// Value, bitmap or enum payloads; a boolean is not a number here.
fn expect_number(dp: DataPoint, value: &DecodedValue) -> ActionResult<u32> {
    value.as_number().ok_or_else(|| unexpected(dp, value))
}

fn unexpected(dp: DataPoint, value: &DecodedValue) -> ActionError {
    ActionError::UnexpectedValue {
        dp,
        value: value.clone(),
    }
}

/// Immutable mapping from wire identifier to data point and action.
#[derive(Debug, Clone)]
pub struct ActionTable {
    entries: BTreeMap<u8, (DataPoint, Action)>,
}

impl ActionTable {
    /// Build the table covering every registered data point.
    pub fn standard() -> Self {
        let entries = DataPoint::ALL
            .iter()
            .map(|&dp| (dp.id(), (dp, Action::for_data_point(dp))))
            .collect();
        ActionTable { entries }
    }

    /// The process-wide table, built on first use.
    pub fn global() -> &'static ActionTable {
        static TABLE: OnceLock<ActionTable> = OnceLock::new();
        TABLE.get_or_init(ActionTable::standard)
    }

    /// Look up an identifier. `None` means the data point is unknown.
    pub fn lookup(&self, id: u8) -> Option<(DataPoint, Action)> {
        self.entries.get(&id).copied()
    }

    /// Registered identifiers, ascending.
    pub fn ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::standard()
    }
}
