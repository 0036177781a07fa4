//! The device-state collaborator surface.
//!
//! The core never caches device state; every effect goes through this trait.
//! Methods take `&mut self`: the device is a single-writer resource and one
//! dispatch runs to completion before the next begins.

use async_trait::async_trait;
use presence_tuya::{DataPoint, DecodedValue};
use tracing::debug;

use crate::error::DeviceError;

/// Boolean capability raised while someone is present.
pub const CAP_ALARM_MOTION: &str = "alarm_motion";
/// Numeric capability holding the measured illuminance.
pub const CAP_MEASURE_LUMINANCE: &str = "measure_luminance";
/// Numeric capability holding the distance to the detected target.
pub const CAP_MEASURE_DISTANCE: &str = "measure_distance";
/// User-visible status field holding the self-check label.
pub const STATUS_SELF_CHECK: &str = "self_check";

/// State store and transport the update actions and setting encoders act on.
#[async_trait]
pub trait DeviceState: Send {
    /// Device name, used in log lines.
    fn name(&self) -> &str;

    /// Set a numeric capability.
    async fn set_numeric_state(&mut self, capability: &str, value: f64) -> Result<(), DeviceError>;

    /// Set a boolean capability.
    async fn set_boolean_state(&mut self, capability: &str, value: bool) -> Result<(), DeviceError>;

    /// Set a user-visible status text field.
    async fn set_status_text(&mut self, field: &str, text: &str) -> Result<(), DeviceError>;

    /// Send a 32-bit value write to a data point.
    async fn write_data32(&mut self, dp: u8, value: u32) -> Result<(), DeviceError>;

    /// Record a reported value that changes no state.
    async fn observe(&mut self, dp: DataPoint, value: &DecodedValue) -> Result<(), DeviceError> {
        debug!("{}: {} reported {}", self.name(), dp, value);
        Ok(())
    }
}
