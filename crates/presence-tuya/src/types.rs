//! Common types used in the protocol.

use crate::constants::*;
use crate::error::ProtocolError;

/// How the payload bytes of a data point are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Raw bytes, passed through untouched.
    Raw,
    /// Single byte, 1 = true.
    Bool,
    /// Big-endian unsigned integer.
    Value,
    /// One byte per character.
    String,
    /// Single byte code.
    Enum,
    /// Big-endian unsigned integer holding bit flags.
    Bitmap,
}

impl DataType {
    /// Returns the type as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DataType::Raw => "raw",
            DataType::Bool => "bool",
            DataType::Value => "value",
            DataType::String => "string",
            DataType::Enum => "enum",
            DataType::Bitmap => "bitmap",
        }
    }

    /// Parse the lowercase name used in configuration files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "raw" => Some(DataType::Raw),
            "bool" | "boolean" => Some(DataType::Bool),
            "value" | "integer" => Some(DataType::Value),
            "string" => Some(DataType::String),
            "enum" | "enumeration" => Some(DataType::Enum),
            "bitmap" => Some(DataType::Bitmap),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for DataType {
    type Error = ProtocolError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            DATA_TYPE_RAW => Ok(DataType::Raw),
            DATA_TYPE_BOOL => Ok(DataType::Bool),
            DATA_TYPE_VALUE => Ok(DataType::Value),
            DATA_TYPE_STRING => Ok(DataType::String),
            DATA_TYPE_ENUM => Ok(DataType::Enum),
            DATA_TYPE_BITMAP => Ok(DataType::Bitmap),
            _ => Err(ProtocolError::UnknownDataType(tag)),
        }
    }
}

impl From<DataType> for u8 {
    fn from(data_type: DataType) -> Self {
        match data_type {
            DataType::Raw => DATA_TYPE_RAW,
            DataType::Bool => DATA_TYPE_BOOL,
            DataType::Value => DATA_TYPE_VALUE,
            DataType::String => DATA_TYPE_STRING,
            DataType::Enum => DATA_TYPE_ENUM,
            DataType::Bitmap => DATA_TYPE_BITMAP,
        }
    }
}

/// Data points known to be reported or accepted by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataPoint {
    Presence,
    Sensitivity,
    NearDetection,
    FarDetection,
    SelfCheck,
    Distance,
    DetectionDelay,
    DetectionClearDelay,
    /// Always carries a single space; meaning unknown.
    Undocumented103,
    Luminance,
}

impl DataPoint {
    /// Every registered data point, in identifier order.
    pub const ALL: [DataPoint; 10] = [
        DataPoint::Presence,
        DataPoint::Sensitivity,
        DataPoint::NearDetection,
        DataPoint::FarDetection,
        DataPoint::SelfCheck,
        DataPoint::Distance,
        DataPoint::DetectionDelay,
        DataPoint::DetectionClearDelay,
        DataPoint::Undocumented103,
        DataPoint::Luminance,
    ];

    /// Wire identifier.
    pub const fn id(&self) -> u8 {
        match self {
            DataPoint::Presence => DP_PRESENCE,
            DataPoint::Sensitivity => DP_SENSITIVITY,
            DataPoint::NearDetection => DP_NEAR_DETECTION,
            DataPoint::FarDetection => DP_FAR_DETECTION,
            DataPoint::SelfCheck => DP_SELF_CHECK,
            DataPoint::Distance => DP_DISTANCE,
            DataPoint::DetectionDelay => DP_DETECTION_DELAY,
            DataPoint::DetectionClearDelay => DP_DETECTION_CLEAR_DELAY,
            DataPoint::Undocumented103 => DP_UNDOCUMENTED_103,
            DataPoint::Luminance => DP_LUMINANCE,
        }
    }

    /// Semantic name, as used in logs and metric labels.
    pub const fn name(&self) -> &'static str {
        match self {
            DataPoint::Presence => "presence",
            DataPoint::Sensitivity => "sensitivity",
            DataPoint::NearDetection => "near_detection",
            DataPoint::FarDetection => "far_detection",
            DataPoint::SelfCheck => "self_check",
            DataPoint::Distance => "distance",
            DataPoint::DetectionDelay => "detection_delay",
            DataPoint::DetectionClearDelay => "detection_clear_delay",
            DataPoint::Undocumented103 => "undocumented_103",
            DataPoint::Luminance => "luminance",
        }
    }

    /// Look up a data point by wire identifier.
    ///
    /// Returns `None` for identifiers the sensor is not known to use.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            DP_PRESENCE => Some(DataPoint::Presence),
            DP_SENSITIVITY => Some(DataPoint::Sensitivity),
            DP_NEAR_DETECTION => Some(DataPoint::NearDetection),
            DP_FAR_DETECTION => Some(DataPoint::FarDetection),
            DP_SELF_CHECK => Some(DataPoint::SelfCheck),
            DP_DISTANCE => Some(DataPoint::Distance),
            DP_DETECTION_DELAY => Some(DataPoint::DetectionDelay),
            DP_DETECTION_CLEAR_DELAY => Some(DataPoint::DetectionClearDelay),
            DP_UNDOCUMENTED_103 => Some(DataPoint::Undocumented103),
            DP_LUMINANCE => Some(DataPoint::Luminance),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}

/// Result of the sensor's onboard health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfCheckStatus {
    Checking,
    CheckSuccess,
    CheckFailure,
    Others,
    CommonFault,
    RadarFault,
    /// Code outside the documented range.
    Unknown(u32),
}

impl SelfCheckStatus {
    /// Label shown to the user for an unrecognised code.
    pub const UNKNOWN_LABEL: &'static str = "unknown";

    /// Resolve a reported code.
    pub fn from_code(code: u32) -> Self {
        match u8::try_from(code) {
            Ok(SELF_CHECK_CHECKING) => SelfCheckStatus::Checking,
            Ok(SELF_CHECK_SUCCESS) => SelfCheckStatus::CheckSuccess,
            Ok(SELF_CHECK_FAILURE) => SelfCheckStatus::CheckFailure,
            Ok(SELF_CHECK_OTHERS) => SelfCheckStatus::Others,
            Ok(SELF_CHECK_COMMON_FAULT) => SelfCheckStatus::CommonFault,
            Ok(SELF_CHECK_RADAR_FAULT) => SelfCheckStatus::RadarFault,
            _ => SelfCheckStatus::Unknown(code),
        }
    }

    /// Human-readable status label.
    pub const fn label(&self) -> &'static str {
        match self {
            SelfCheckStatus::Checking => "checking",
            SelfCheckStatus::CheckSuccess => "check_success",
            SelfCheckStatus::CheckFailure => "check_failure",
            SelfCheckStatus::Others => "others",
            SelfCheckStatus::CommonFault => "common_fault",
            SelfCheckStatus::RadarFault => "radar_fault",
            SelfCheckStatus::Unknown(_) => Self::UNKNOWN_LABEL,
        }
    }
}

impl std::fmt::Display for SelfCheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelfCheckStatus::Unknown(code) => write!(f, "{} ({})", self.label(), code),
            _ => f.write_str(self.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_tags() {
        for tag in 0u8..=5 {
            let data_type = DataType::try_from(tag).expect("known tag");
            assert_eq!(u8::from(data_type), tag);
        }
        assert_eq!(
            DataType::try_from(6),
            Err(ProtocolError::UnknownDataType(6))
        );
    }

    #[test]
    fn test_data_type_names() {
        assert_eq!(DataType::from_name("bool"), Some(DataType::Bool));
        assert_eq!(DataType::from_name("integer"), Some(DataType::Value));
        assert_eq!(DataType::from_name("enumeration"), Some(DataType::Enum));
        assert_eq!(DataType::from_name("float"), None);
    }

    #[test]
    fn test_registry_ids() {
        let ids: Vec<u8> = DataPoint::ALL.iter().map(|dp| dp.id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 6, 9, 101, 102, 103, 104]);
        for dp in DataPoint::ALL {
            assert_eq!(DataPoint::from_id(dp.id()), Some(dp));
        }
    }

    #[test]
    fn test_registry_unknown_ids() {
        for id in [0u8, 5, 7, 8, 10, 100, 105, 255] {
            assert_eq!(DataPoint::from_id(id), None, "id {id}");
        }
    }

    #[test]
    fn test_self_check_labels() {
        let labels: Vec<&str> = (0u32..=5)
            .map(|code| SelfCheckStatus::from_code(code).label())
            .collect();
        assert_eq!(
            labels,
            vec![
                "checking",
                "check_success",
                "check_failure",
                "others",
                "common_fault",
                "radar_fault"
            ]
        );
    }

    #[test]
    fn test_self_check_unknown() {
        let status = SelfCheckStatus::from_code(6);
        assert_eq!(status, SelfCheckStatus::Unknown(6));
        assert_eq!(status.label(), "unknown");

        // Larger than a byte must not alias a documented code.
        assert_eq!(
            SelfCheckStatus::from_code(0x101),
            SelfCheckStatus::Unknown(0x101)
        );
    }
}
