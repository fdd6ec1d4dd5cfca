use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::API_BASE_URL;

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A home registered on the account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub address_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub energy_cost_configured: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub postal_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub country_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub temperature_format: String,
    #[serde(deserialize_with = "null_as_default")]
    pub time_format: String,
    #[serde(deserialize_with = "null_as_default")]
    pub gateway_count: i64,
    pub created_utc: Option<DateTime<Utc>>,
}

impl Location {
    /// Path of this location below the API root.
    pub fn path(&self) -> String {
        format!("/Locations/{}", self.id)
    }

    /// Canonical URL on the production API.
    pub fn url(&self) -> String {
        format!("{}{}", API_BASE_URL, self.path())
    }
}

/// A thermostat, switch, meter or other appliance attached to a location.
///
/// Several fields change type between device categories and are kept as raw
/// JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Device {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    pub asset_id: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub identifier: String,
    #[serde(deserialize_with = "null_as_default")]
    pub gateway_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub gateway_external_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub device_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub group_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    pub icon: Value,
    pub load_connected: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub model_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location_id: i64,
    pub parameters: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub external_group: String,
    #[serde(deserialize_with = "null_as_default")]
    pub provider: i64,
    pub provider_data: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub disconnected: bool,
    /// Comma-separated attribute names.
    #[serde(deserialize_with = "null_as_default")]
    pub supported_attributes: String,
    #[serde(deserialize_with = "null_as_default")]
    pub settable_attributes: String,
    #[serde(deserialize_with = "null_as_default")]
    pub supported_parameters: String,
}

impl Device {
    /// Path below the API root, nested under the owning location.
    pub fn path(&self) -> String {
        let location = Location {
            id: self.location_id,
            ..Location::default()
        };
        format!("{}/Devices/{}", location.path(), self.id)
    }

    pub fn url(&self) -> String {
        format!("{}{}", API_BASE_URL, self.path())
    }

    pub fn supported_attributes(&self) -> Vec<&str> {
        split_list(&self.supported_attributes)
    }

    pub fn settable_attributes(&self) -> Vec<&str> {
        split_list(&self.settable_attributes)
    }
}

fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Connectivity and firmware report of a location's gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Gateway {
    #[serde(deserialize_with = "null_as_default")]
    pub online_status: String,
    pub last_status_time_utc: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub zig_bee_pairing_activated: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub dsn: String,
    #[serde(deserialize_with = "null_as_default")]
    pub installation_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sep_mac: String,
    #[serde(deserialize_with = "null_as_default")]
    pub firmware_version: String,
    pub local_ip: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub zig_bee_channel: i64,
}

impl Gateway {
    pub fn is_online(&self) -> bool {
        self.online_status.eq_ignore_ascii_case("online")
    }
}

/// Latest reading of one device attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attribute {
    #[serde(deserialize_with = "null_as_default")]
    pub device_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub location_id: i64,
    #[serde(rename = "timeStampUTC")]
    pub time_stamp_utc: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub attribute: String,
    pub value: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub value_type: String,
}

impl Attribute {
    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_f64()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}
