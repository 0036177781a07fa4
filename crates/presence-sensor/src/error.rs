//! Error types for the sensor core.

use presence_tuya::{DataPoint, DecodedValue};
use thiserror::Error;

/// Failures reported by the device-state collaborator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeviceError {
    /// The state store refused a capability or status update.
    #[error("capability '{capability}' rejected update: {reason}")]
    Rejected {
        /// Capability or status field name.
        capability: String,
        /// Reason given by the store.
        reason: String,
    },

    /// The transport did not accept an outbound write.
    #[error("write to data point {dp} failed: {reason}")]
    WriteFailed {
        /// Target data-point identifier.
        dp: u8,
        /// Reason given by the transport.
        reason: String,
    },
}

/// Failures raised by an update action.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActionError {
    /// The collaborator failed the mutation.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// The decoded value has a shape the action cannot use.
    #[error("unexpected {} value {value} for {dp}", .value.data_type())]
    UnexpectedValue {
        /// Data point being handled.
        dp: DataPoint,
        /// Value that was received.
        value: DecodedValue,
    },
}

/// Failures while encoding a settings change.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SettingsError {
    /// A changed key has no encoder; the settings schema and the encoder
    /// table have drifted apart.
    #[error("no encoder for setting '{0}'")]
    UnmappedSettingKey(String),

    /// A changed key has no entry in the new settings.
    #[error("setting '{0}' changed but has no new value")]
    MissingValue(String),

    /// The value cannot be represented on the wire.
    #[error("setting '{key}' value {value} is not representable as a 32-bit write")]
    ValueOutOfRange {
        /// Setting key.
        key: String,
        /// Offending value.
        value: f64,
    },
}

/// Result type alias for action execution.
pub type ActionResult<T> = Result<T, ActionError>;
