use crate::store::Check;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Still image captured by a device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Photo {
    pub id: String,
    pub file_type: String,
    pub width: i64,
    pub height: i64,
    /// Bytes
    pub size: i64,
    pub device_time: i64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

crate::entity! {
    impl Entity for Photo {
        name: "photo",
        bucket: Photos,
        fields {
            file_type: String as "FileType" => Check::MaxLength(100),
            width: i64 as "Width",
            height: i64 as "Height",
            size: i64 as "Size",
            device_time: i64 as "DeviceTime",
        }
        stamps(created, updated)
    }
}
