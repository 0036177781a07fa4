//! Typed decoding of data-point payloads.
//!
//! The payload of a data point is interpreted solely from its type tag:
//!
//! | Tag | Type   | Decoded as                                   |
//! |-----|--------|----------------------------------------------|
//! | 0   | raw    | bytes, unchanged                             |
//! | 1   | bool   | `payload[0] == 1`                            |
//! | 2   | value  | big-endian unsigned integer                  |
//! | 3   | string | one character per byte                       |
//! | 4   | enum   | `payload[0]`                                 |
//! | 5   | bitmap | big-endian unsigned integer, bits untouched  |

use crate::error::ProtocolError;
use crate::types::DataType;

/// A data-point payload decoded according to its type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    /// Raw payload bytes.
    Raw(Vec<u8>),
    /// Boolean state.
    Bool(bool),
    /// Unsigned integer.
    Integer(u32),
    /// Text, one character per payload byte.
    String(String),
    /// Enumeration code.
    Enum(u8),
    /// Bit flags.
    Bitmap(u32),
}

impl DecodedValue {
    /// The type tag this value was decoded from.
    pub fn data_type(&self) -> DataType {
        match self {
            DecodedValue::Raw(_) => DataType::Raw,
            DecodedValue::Bool(_) => DataType::Bool,
            DecodedValue::Integer(_) => DataType::Value,
            DecodedValue::String(_) => DataType::String,
            DecodedValue::Enum(_) => DataType::Enum,
            DecodedValue::Bitmap(_) => DataType::Bitmap,
        }
    }

    /// Numeric view of a value, bitmap or enum.
    ///
    /// Booleans, raw bytes and strings have no numeric view.
    pub fn as_number(&self) -> Option<u32> {
        match self {
            DecodedValue::Integer(n) | DecodedValue::Bitmap(n) => Some(*n),
            DecodedValue::Enum(code) => Some(u32::from(*code)),
            DecodedValue::Bool(_) | DecodedValue::Raw(_) | DecodedValue::String(_) => None,
        }
    }
}

impl std::fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodedValue::Raw(bytes) => {
                f.write_str("raw[")?;
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                f.write_str("]")
            }
            DecodedValue::Bool(b) => write!(f, "{}", b),
            DecodedValue::Integer(n) => write!(f, "{}", n),
            DecodedValue::String(s) => write!(f, "{:?}", s),
            DecodedValue::Enum(code) => write!(f, "enum({})", code),
            DecodedValue::Bitmap(bits) => write!(f, "0b{:b}", bits),
        }
    }
}

/// Decode a payload according to its type tag.
///
/// Numeric types accumulate big-endian into a `u32`. Payloads longer than four
/// bytes keep accumulating and the high bytes shift out, so only the last four
/// bytes survive; the sensor never sends more than four.
///
/// # Errors
///
/// Returns [`ProtocolError::EmptyPayload`] when a bool, value, enum or bitmap
/// payload has no bytes.
pub fn decode_value(data_type: DataType, payload: &[u8]) -> Result<DecodedValue, ProtocolError> {
    match data_type {
        DataType::Raw => Ok(DecodedValue::Raw(payload.to_vec())),
        DataType::Bool => {
            let first = first_byte(data_type, payload)?;
            Ok(DecodedValue::Bool(first == 1))
        }
        DataType::Value => {
            first_byte(data_type, payload)?;
            Ok(DecodedValue::Integer(accumulate_be(payload)))
        }
        DataType::String => Ok(DecodedValue::String(
            payload.iter().map(|&b| char::from(b)).collect(),
        )),
        DataType::Enum => Ok(DecodedValue::Enum(first_byte(data_type, payload)?)),
        DataType::Bitmap => {
            first_byte(data_type, payload)?;
            Ok(DecodedValue::Bitmap(accumulate_be(payload)))
        }
    }
}

/// Decode a payload from its raw type-tag byte.
pub fn decode_tagged(tag: u8, payload: &[u8]) -> Result<DecodedValue, ProtocolError> {
    decode_value(DataType::try_from(tag)?, payload)
}

fn first_byte(data_type: DataType, payload: &[u8]) -> Result<u8, ProtocolError> {
    payload
        .first()
        .copied()
        .ok_or(ProtocolError::EmptyPayload(data_type))
}

fn accumulate_be(payload: &[u8]) -> u32 {
    payload
        .iter()
        .fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_bool() {
        assert_eq!(
            decode_value(DataType::Bool, &[1]),
            Ok(DecodedValue::Bool(true))
        );
        for b in (0u8..=255).filter(|b| *b != 1) {
            assert_eq!(
                decode_value(DataType::Bool, &[b]),
                Ok(DecodedValue::Bool(false)),
                "byte {b}"
            );
        }
    }

    #[test]
    fn test_decode_integer_big_endian() {
        assert_eq!(
            decode_value(DataType::Value, &[0x01, 0x2C]),
            Ok(DecodedValue::Integer(300))
        );
        assert_eq!(
            decode_value(DataType::Value, &[0x00, 0x00, 0x01, 0x2C]),
            Ok(DecodedValue::Integer(300))
        );
        assert_eq!(
            decode_value(DataType::Value, &[0x7F]),
            Ok(DecodedValue::Integer(127))
        );
        assert_eq!(
            decode_value(DataType::Value, &[0xFF, 0xFF, 0xFF, 0xFF]),
            Ok(DecodedValue::Integer(u32::MAX))
        );
    }

    #[test]
    fn test_decode_integer_longer_than_four_bytes_keeps_low_bytes() {
        assert_eq!(
            decode_value(DataType::Value, &[0xAA, 0x01, 0x02, 0x03, 0x04]),
            Ok(DecodedValue::Integer(0x0102_0304))
        );
    }

    #[test]
    fn test_decode_bitmap_matches_integer_assembly() {
        assert_eq!(
            decode_value(DataType::Bitmap, &[0x80, 0x01]),
            Ok(DecodedValue::Bitmap(0x8001))
        );
    }

    #[test]
    fn test_decode_string() {
        assert_eq!(
            decode_value(DataType::String, &[72, 73]),
            Ok(DecodedValue::String("HI".to_string()))
        );
        assert_eq!(
            decode_value(DataType::String, b" "),
            Ok(DecodedValue::String(" ".to_string()))
        );
        // No encoding validation: high bytes map to Latin-1 characters.
        assert_eq!(
            decode_value(DataType::String, &[0xE9]),
            Ok(DecodedValue::String("é".to_string()))
        );
    }

    #[test]
    fn test_decode_enum_uses_first_byte() {
        assert_eq!(decode_value(DataType::Enum, &[0]), Ok(DecodedValue::Enum(0)));
        assert_eq!(decode_value(DataType::Enum, &[5]), Ok(DecodedValue::Enum(5)));
        assert_eq!(
            decode_value(DataType::Enum, &[2, 9]),
            Ok(DecodedValue::Enum(2))
        );
    }

    #[test]
    fn test_decode_raw_passthrough() {
        let payload = [0xDE, 0xAD, 0xBE, 0xEF];
        assert_eq!(
            decode_value(DataType::Raw, &payload),
            Ok(DecodedValue::Raw(payload.to_vec()))
        );
        assert_eq!(
            decode_value(DataType::Raw, &[]),
            Ok(DecodedValue::Raw(Vec::new()))
        );
    }

    #[test]
    fn test_decode_empty_payload_is_an_error() {
        for data_type in [
            DataType::Bool,
            DataType::Value,
            DataType::Enum,
            DataType::Bitmap,
        ] {
            assert_eq!(
                decode_value(data_type, &[]),
                Err(ProtocolError::EmptyPayload(data_type))
            );
        }
        assert_eq!(
            decode_value(DataType::String, &[]),
            Ok(DecodedValue::String(String::new()))
        );
    }

    #[test]
    fn test_decode_tagged_rejects_unknown_tag() {
        assert_eq!(
            decode_tagged(9, &[1]),
            Err(ProtocolError::UnknownDataType(9))
        );
        assert_eq!(decode_tagged(1, &[1]), Ok(DecodedValue::Bool(true)));
    }

    #[test]
    fn test_as_number() {
        assert_eq!(DecodedValue::Bool(true).as_number(), None);
        assert_eq!(DecodedValue::Enum(4).as_number(), Some(4));
        assert_eq!(DecodedValue::Bitmap(0x8001).as_number(), Some(0x8001));
        assert_eq!(DecodedValue::Integer(300).as_number(), Some(300));
        assert_eq!(DecodedValue::String(" ".into()).as_number(), None);
        assert_eq!(DecodedValue::Raw(vec![1]).as_number(), None);
    }
}
