/// Registered capture device
use crate::store::Check;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    pub id: String,
    pub key: String,
    pub name: String,
    pub secret: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

crate::entity! {
    impl Entity for Device {
        name: "device",
        bucket: Devices,
        fields {
            key: String as "Key" => Check::MaxLength(100),
            name: String as "Name" => Check::MaxLength(100),
            secret: String as "Secret" => Check::MaxLength(100),
        }
        stamps(created, updated)
    }
}
