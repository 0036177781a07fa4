//! Data-point record layout.
//!
//! Each data point in a Tuya cluster report or write is laid out as:
//!
//! ```text
//! +------+------+--------+--------+-------------------+
//! | dp   | type | len_hi | len_lo | data[0..len]      |
//! +------+------+--------+--------+-------------------+
//! ```
//!
//! The length is big-endian. Sequence numbers and the surrounding cluster
//! command are handled by the transport, not here.

use bytes::{Buf, BufMut};

use crate::constants::*;
use crate::error::ProtocolError;
use crate::types::{DataPoint, DataType};
use crate::value::{decode_value, DecodedValue};

/// A single data point as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPointRecord {
    /// Data-point identifier.
    pub id: u8,
    /// How to interpret the payload.
    pub data_type: DataType,
    /// Payload bytes.
    pub payload: Vec<u8>,
}

impl DataPointRecord {
    /// Create a record.
    pub fn new(id: u8, data_type: DataType, payload: Vec<u8>) -> Self {
        DataPointRecord {
            id,
            data_type,
            payload,
        }
    }

    /// The registered data point for this record's identifier, if any.
    pub fn data_point(&self) -> Option<DataPoint> {
        DataPoint::from_id(self.id)
    }

    /// Decode the payload according to the record's type tag.
    pub fn decode(&self) -> Result<DecodedValue, ProtocolError> {
        decode_value(self.data_type, &self.payload)
    }

    /// Parse exactly one record from `data`.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < RECORD_HEADER_SIZE {
            return Err(ProtocolError::RecordTooShort {
                expected: RECORD_HEADER_SIZE,
                actual: data.len(),
            });
        }

        let mut buf = data;
        let id = buf.get_u8();
        let data_type = DataType::try_from(buf.get_u8())?;
        let len = buf.get_u16() as usize;

        let expected = RECORD_HEADER_SIZE + len;
        if data.len() < expected {
            return Err(ProtocolError::RecordTooShort {
                expected,
                actual: data.len(),
            });
        }
        if data.len() > expected {
            return Err(ProtocolError::TrailingBytes {
                expected,
                actual: data.len(),
            });
        }

        log::trace!("parsed record dp={} type={} len={}", id, data_type, len);

        Ok(DataPointRecord {
            id,
            data_type,
            payload: buf[..len].to_vec(),
        })
    }

    /// Encode the record to its byte layout.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let len = u16::try_from(self.payload.len()).map_err(|_| ProtocolError::PayloadTooLong {
            max: MAX_PAYLOAD_SIZE,
            actual: self.payload.len(),
        })?;
        let mut buf = Vec::with_capacity(RECORD_HEADER_SIZE + self.payload.len());
        buf.put_u8(self.id);
        buf.put_u8(self.data_type.into());
        buf.put_u16(len);
        buf.extend_from_slice(&self.payload);
        Ok(buf)
    }
}

/// An outbound 32-bit configuration write.
///
/// Always sent as a `value` record with a 4-byte big-endian payload,
/// whatever the natural width of the setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataPointWrite {
    /// Target data-point identifier.
    pub id: u8,
    /// Wire value.
    pub value: u32,
}

impl DataPointWrite {
    /// Create a write.
    pub fn new(id: u8, value: u32) -> Self {
        DataPointWrite { id, value }
    }

    /// The write as a typed record.
    pub fn to_record(&self) -> DataPointRecord {
        DataPointRecord::new(self.id, DataType::Value, self.value.to_be_bytes().to_vec())
    }

    /// Encode to the record byte layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(RECORD_HEADER_SIZE + DATA32_SIZE);
        buf.put_u8(self.id);
        buf.put_u8(DATA_TYPE_VALUE);
        buf.put_u16(DATA32_SIZE as u16);
        buf.put_u32(self.value);
        buf
    }
}
