//! Canonical device record and its JSON wire form.
//!
//! [`Device`] is what the rest of the workspace works with; [`WireDevice`] is
//! the shape the devices API reads and writes (`PK`/`SK` keys, price in minor
//! units, `last_used` as epoch milliseconds).

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Freezer,
    Cycler,
    Shaker,
    Pipette,
    Centrifuge,
}

impl DeviceType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Freezer => "freezer",
            DeviceType::Cycler => "cycler",
            DeviceType::Shaker => "shaker",
            DeviceType::Pipette => "pipette",
            DeviceType::Centrifuge => "centrifuge",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "freezer" => Ok(DeviceType::Freezer),
            "cycler" => Ok(DeviceType::Cycler),
            "shaker" => Ok(DeviceType::Shaker),
            "pipette" => Ok(DeviceType::Pipette),
            "centrifuge" => Ok(DeviceType::Centrifuge),
            _ => Err(CoreError::InvalidDeviceType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceHealth {
    Good,
    Mediocre,
    Ok,
    Bad,
    Broken,
}

impl DeviceHealth {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceHealth::Good => "good",
            DeviceHealth::Mediocre => "mediocre",
            DeviceHealth::Ok => "ok",
            DeviceHealth::Bad => "bad",
            DeviceHealth::Broken => "broken",
        }
    }
}

impl std::fmt::Display for DeviceHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceHealth {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(DeviceHealth::Good),
            "mediocre" => Ok(DeviceHealth::Mediocre),
            "ok" => Ok(DeviceHealth::Ok),
            "bad" => Ok(DeviceHealth::Bad),
            "broken" => Ok(DeviceHealth::Broken),
            _ => Err(CoreError::InvalidDeviceHealth(s.to_string())),
        }
    }
}

/// The (partition, sort) key pair a device is stored under.
///
/// Both halves are guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceKeys {
    primary_key: String,
    secondary_key: String,
}

impl DeviceKeys {
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyKey`] if either key is empty or whitespace.
    pub fn new(
        primary_key: impl Into<String>,
        secondary_key: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let primary_key = primary_key.into();
        let secondary_key = secondary_key.into();
        if primary_key.trim().is_empty() {
            return Err(CoreError::EmptyKey("primary key"));
        }
        if secondary_key.trim().is_empty() {
            return Err(CoreError::EmptyKey("secondary key"));
        }
        Ok(Self {
            primary_key,
            secondary_key,
        })
    }

    #[must_use]
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    #[must_use]
    pub fn secondary_key(&self) -> &str {
        &self.secondary_key
    }
}

impl std::fmt::Display for DeviceKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.primary_key, self.secondary_key)
    }
}

/// A validated device record.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub keys: DeviceKeys,
    /// Absent only when the secondary key was supplied explicitly.
    pub id: Option<i64>,
    /// Absent only when the primary key was supplied explicitly.
    pub device_type: Option<DeviceType>,
    pub location: Option<String>,
    pub health: Option<DeviceHealth>,
    /// Price in major currency units (e.g. `12.99`).
    pub price: Decimal,
    /// Hex color, e.g. `"#ff8800"`.
    pub color: Option<String>,
    pub last_used: DateTime<Utc>,
}

impl Device {
    #[must_use]
    pub fn primary_key(&self) -> &str {
        self.keys.primary_key()
    }

    #[must_use]
    pub fn secondary_key(&self) -> &str {
        self.keys.secondary_key()
    }

    /// Converts a price given in minor units (cents) into major units.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPrice`] if the amount is negative or not a
    /// whole number of minor units (`1098.5` is most likely a major-unit price
    /// typed by mistake).
    pub fn price_from_minor_units(minor: Decimal) -> Result<Decimal, CoreError> {
        if minor.is_sign_negative() && !minor.is_zero() {
            return Err(CoreError::InvalidPrice(format!(
                "{minor} must not be negative"
            )));
        }
        if !minor.fract().is_zero() {
            return Err(CoreError::InvalidPrice(format!(
                "{minor} is not a whole number of minor units"
            )));
        }
        Ok(minor / Decimal::ONE_HUNDRED)
    }

    /// Price in minor units as sent on the wire.
    #[must_use]
    pub fn price_minor_units(&self) -> i64 {
        (self.price * Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .unwrap_or(i64::MAX)
    }

    #[must_use]
    pub fn to_wire(&self) -> WireDevice {
        WireDevice {
            primary_key: self.primary_key().to_string(),
            secondary_key: self.secondary_key().to_string(),
            id: self.id,
            device_type: self.device_type.map(|t| t.as_str().to_string()),
            location: self.location.clone(),
            device_health: self.health.map(|h| h.as_str().to_string()),
            price: Some(serde_json::Number::from(self.price_minor_units())),
            color: self.color.clone(),
            last_used: Some(WireTimestamp::Millis(self.last_used.timestamp_millis())),
        }
    }

    /// Builds a [`Device`] from a record returned by the devices API.
    ///
    /// A missing `last_used` falls back to `fallback_now`.
    ///
    /// # Errors
    ///
    /// Returns a [`CoreError`] if the keys are empty, an enumeration value is
    /// unknown, the price is negative, or the timestamp is unparseable.
    pub fn from_wire(wire: WireDevice, fallback_now: DateTime<Utc>) -> Result<Self, CoreError> {
        let keys = DeviceKeys::new(wire.primary_key, wire.secondary_key)?;
        let device_type = wire
            .device_type
            .as_deref()
            .map(DeviceType::from_str)
            .transpose()?;
        let health = wire
            .device_health
            .as_deref()
            .map(DeviceHealth::from_str)
            .transpose()?;

        let minor = match wire.price {
            None => Decimal::ZERO,
            Some(n) => decimal_from_number(&n)
                .ok_or_else(|| CoreError::InvalidPrice(n.to_string()))?,
        };
        let price = Self::price_from_minor_units(minor)?;

        let last_used = match wire.last_used {
            None => fallback_now,
            Some(WireTimestamp::Millis(ms)) => timestamp_from_millis(ms)
                .ok_or_else(|| CoreError::InvalidTimestamp(ms.to_string()))?,
            Some(WireTimestamp::Text(text)) => {
                parse_timestamp_text(&text).ok_or(CoreError::InvalidTimestamp(text))?
            }
        };

        Ok(Self {
            keys,
            id: wire.id,
            device_type,
            location: wire.location,
            health,
            price,
            color: wire.color,
            last_used,
        })
    }
}

/// The JSON shape the devices API accepts and returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireDevice {
    #[serde(rename = "PK", deserialize_with = "string_or_number")]
    pub primary_key: String,
    #[serde(rename = "SK", deserialize_with = "string_or_number")]
    pub secondary_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_health: Option<String>,
    /// Minor currency units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<serde_json::Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<WireTimestamp>,
}

/// `last_used` is written as epoch milliseconds but may come back as an ISO string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    Millis(i64),
    Text(String),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Key {
        Text(String),
        Number(serde_json::Number),
    }

    match Key::deserialize(deserializer) {
        Ok(Key::Text(s)) => Ok(s),
        Ok(Key::Number(n)) => Ok(n.to_string()),
        Err(_) => Err(serde::de::Error::custom("PK/SK must be a string or number")),
    }
}

fn decimal_from_number(n: &serde_json::Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    n.as_f64().and_then(|f| Decimal::try_from(f).ok())
}

/// Converts epoch milliseconds into a UTC timestamp.
#[must_use]
pub fn timestamp_from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

/// Parses a textual timestamp.
///
/// Accepts integer epoch milliseconds, RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS`
/// (read as UTC), or a bare `YYYY-MM-DD` date (midnight UTC).
#[must_use]
pub fn parse_timestamp_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(ms) = text.parse::<i64>() {
        return timestamp_from_millis(ms);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[path = "devices_test.rs"]
mod tests;
