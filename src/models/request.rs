/// Inbound device request, kept as an audit trail
use crate::store::Check;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    pub id: String,
    #[serde(alias = "fromdevice")]
    pub from_device: String,
    pub data: String,
    pub ip: String,
    pub created: DateTime<Utc>,
}

crate::entity! {
    impl Entity for Request {
        name: "request",
        bucket: Requests,
        fields {
            from_device: String as "FromDevice" => Check::MaxLength(200),
            data: String as "Data" => Check::MaxLength(2083),
            ip: String as "IP" => Check::MaxLength(200),
        }
        stamps(created)
    }
}
