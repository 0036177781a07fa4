//! Protocol constants
//!
//! These constants define the data-point identifiers, type tags and
//! self-check codes used by the ZY-M100 over the Tuya-specific cluster.

// ============================================================================
// Data-Point Identifiers (device → host reports, host → device writes)
// ============================================================================

/// Presence state (enum: 0 = none, 1 = presence).
pub const DP_PRESENCE: u8 = 1;
/// Detection sensitivity (value).
pub const DP_SENSITIVITY: u8 = 2;
/// Near detection boundary (value).
pub const DP_NEAR_DETECTION: u8 = 3;
/// Far detection boundary (value).
pub const DP_FAR_DETECTION: u8 = 4;
/// Onboard self-check result (enum).
pub const DP_SELF_CHECK: u8 = 6;
/// Distance to the detected target (value).
pub const DP_DISTANCE: u8 = 9;
/// Presence detection delay, in tenths of a second (value).
pub const DP_DETECTION_DELAY: u8 = 101;
/// Presence clear delay (value).
pub const DP_DETECTION_CLEAR_DELAY: u8 = 102;
/// Undocumented; the sensor always reports a single-space string here.
pub const DP_UNDOCUMENTED_103: u8 = 103;
/// Illuminance (value).
pub const DP_LUMINANCE: u8 = 104;

// ============================================================================
// Data Types (type tag byte)
// ============================================================================

/// Raw bytes.
pub const DATA_TYPE_RAW: u8 = 0;
/// Boolean, one byte (0/1).
pub const DATA_TYPE_BOOL: u8 = 1;
/// Unsigned integer, big-endian, up to 4 bytes.
pub const DATA_TYPE_VALUE: u8 = 2;
/// String, one byte per character.
pub const DATA_TYPE_STRING: u8 = 3;
/// Enumeration, one byte (0-255).
pub const DATA_TYPE_ENUM: u8 = 4;
/// Bitmap, 1, 2 or 4 bytes, big-endian.
pub const DATA_TYPE_BITMAP: u8 = 5;

// ============================================================================
// Self-Check Codes (DP_SELF_CHECK)
// ============================================================================

/// Self-check in progress.
pub const SELF_CHECK_CHECKING: u8 = 0;
/// Self-check passed.
pub const SELF_CHECK_SUCCESS: u8 = 1;
/// Self-check failed.
pub const SELF_CHECK_FAILURE: u8 = 2;
/// Other status.
pub const SELF_CHECK_OTHERS: u8 = 3;
/// Common fault.
pub const SELF_CHECK_COMMON_FAULT: u8 = 4;
/// Radar fault.
pub const SELF_CHECK_RADAR_FAULT: u8 = 5;

// ============================================================================
// Sizes
// ============================================================================

/// Size of a record header: dp (1) + type (1) + length (2).
pub const RECORD_HEADER_SIZE: usize = 4;
/// Payload size of an outbound 32-bit write.
pub const DATA32_SIZE: usize = 4;
/// Largest payload a record can describe with its 16-bit length field.
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;
