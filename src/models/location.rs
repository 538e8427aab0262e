/// Position report sent by a device
///
/// Append-only: a location is never edited after it is recorded, so it has
/// no `updated` stamp.
use crate::store::Check;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub id: String,
    pub device_index: i64,
    pub device: String,
    pub latitude: i64,
    pub longitude: i64,
    pub accuracy: i64,
    pub altitude: i64,
    pub speed: i64,
    pub battery: i64,
    /// Device clock, milliseconds since the epoch
    pub device_time: i64,
    pub bearing_to: i64,
    pub wifi: String,
    pub created: DateTime<Utc>,
}

crate::entity! {
    impl Entity for Location {
        name: "location",
        bucket: Locations,
        fields {
            device_index: i64 as "DeviceIndex",
            device: String as "Device",
            latitude: i64 as "Latitude",
            longitude: i64 as "Longitude",
            accuracy: i64 as "Accuracy",
            altitude: i64 as "Altitude",
            speed: i64 as "Speed",
            battery: i64 as "Battery",
            device_time: i64 as "DeviceTime",
            bearing_to: i64 as "BearingTo",
            wifi: String as "Wifi" => Check::MaxLength(2083),
        }
        stamps(created)
    }
}
