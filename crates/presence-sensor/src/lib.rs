//! ZY-M100 presence sensor core.
//!
//! Routes decoded Tuya data points to update actions against an external
//! device-state collaborator, and encodes changed settings back into
//! data-point writes.
//!
//! - [`ActionTable`] / [`Action`] - the data point → update action mapping
//! - [`Dispatcher`] - decodes one record and runs its action in isolation
//! - [`SettingsEncoder`] - settings change → `write_data32` calls
//! - [`PresenceSensor`] - the device object tying the above together
//! - [`DeviceState`] - the collaborator surface the core mutates

pub mod actions;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod memory;
pub mod sensor;
pub mod settings;

pub use actions::{Action, ActionTable};
pub use device::*;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::*;
pub use memory::{DeviceSnapshot, MemoryDevice};
pub use sensor::{PresenceSensor, SensorConfig, SensorStats, DEFAULT_MODEL};
pub use settings::{SettingKey, SettingsChange, SettingsEncoder, SettingsReport, Transform};
