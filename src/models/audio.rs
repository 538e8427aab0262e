use crate::store::Check;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Audio {
    pub id: String,
    pub file_type: String,
    pub length: i64,
    pub size: i64,
    pub device_time: i64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

crate::entity! {
    impl Entity for Audio {
        name: "audio",
        bucket: Audios,
        fields {
            file_type: String as "FileType" => Check::MaxLength(100),
            length: i64 as "Length",
            size: i64 as "Size",
            device_time: i64 as "DeviceTime",
        }
        stamps(created, updated)
    }
}
