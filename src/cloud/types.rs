//! Wire types of the Tapo cloud API.

use serde::{Deserialize, Deserializer, Serialize};

/// Response envelope shared by every cloud endpoint.
///
/// `error_code == 0` means success and `result` is populated; any other
/// code comes with an optional human-readable `msg`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub error_code: i64,
    pub msg: Option<String>,
    pub result: Option<T>,
}

/// `result` of `/api/v2/account/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResult {
    pub token: String,
}

/// `result` of `/api/v2/device/list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListResult {
    #[serde(default)]
    pub device_list: Vec<Device>,
}

/// A device registered to the account, as returned by the server.
///
/// Known fields are typed; anything else the server sends is kept in
/// `extra` untouched. A known field that is missing, `null` or of an
/// unexpected type reads as empty (or `0` for `status`) so one odd record
/// never sinks the whole list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default, deserialize_with = "lenient_string")]
    pub device_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub device_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub device_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub model: String,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Device {
    pub fn connection(&self) -> DeviceStatus {
        DeviceStatus::from_code(self.status)
    }

    pub fn is_online(&self) -> bool {
        self.connection() == DeviceStatus::Online
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_status<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_i64().unwrap_or_default(),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

/// Reachability of a device as reported by the cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Online,
    Offline,
}

impl DeviceStatus {
    /// `1` is online; every other code is offline.
    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            Self::Online
        } else {
            Self::Offline
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
