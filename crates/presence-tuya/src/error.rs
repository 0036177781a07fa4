//! Protocol error types.

use thiserror::Error;

use crate::types::DataType;

/// Errors that can occur when working with Tuya data-point records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Record is too short to be valid.
    #[error("record too short: expected at least {expected} bytes, got {actual}")]
    RecordTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Record carries bytes past its declared payload.
    #[error("trailing bytes after record: expected {expected} bytes, got {actual}")]
    TrailingBytes {
        /// Length implied by the header.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Payload does not fit the 16-bit length field.
    #[error("payload too long: maximum {max} bytes, got {actual}")]
    PayloadTooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length.
        actual: usize,
    },

    /// Unknown type tag.
    #[error("unknown data type: 0x{0:02X}")]
    UnknownDataType(u8),

    /// A payload that must hold at least one byte was empty.
    #[error("empty payload for {0} data point")]
    EmptyPayload(DataType),
}
