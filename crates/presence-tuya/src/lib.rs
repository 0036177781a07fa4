//! Tuya Data-Point Protocol
//!
//! This crate provides types and utilities for the Tuya-specific cluster
//! extension used by the ZY-M100 radar presence sensor. The sensor reports its
//! state as data points (DPs), each a small record carrying an identifier, a
//! type tag and a payload.
//!
//! # Protocol Overview
//!
//! Every data point travels as one record:
//!
//! - **Inbound** (device → host): a DP record whose type tag says how the
//!   payload bytes are interpreted (raw, boolean, value, string, enum, bitmap)
//! - **Outbound** (host → device): configuration writes, always sent as a
//!   `value` record with a 4-byte big-endian payload
//!
//! # Example
//!
//! ```rust,ignore
//! use presence_tuya::{DataPointRecord, DataPointWrite, DecodedValue};
//!
//! // Decode a reported data point
//! let record = DataPointRecord::parse(&received)?;
//! let value = record.decode()?;
//!
//! // Build a write
//! let frame = DataPointWrite::new(101, 70).encode();
//! ```

mod constants;
mod error;
mod record;
mod types;
mod value;

pub use constants::*;
pub use error::*;
pub use record::*;
pub use types::*;
pub use value::*;
