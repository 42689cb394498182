//! Normalization from an untrusted [`RawRecord`] into a canonical [`Device`].
//!
//! Field names follow the devices API (`PK`, `SK`, `device_health`,
//! `last_used`); `health` and `lastUsed` are accepted as aliases. Prices in
//! the file are minor currency units, the same as on the wire.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use invdb_core::{
    parse_timestamp_text, timestamp_from_millis, Device, DeviceHealth, DeviceKeys, DeviceType,
};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::ValidationError;
use crate::types::RawRecord;

/// Normalizes one raw record.
///
/// The primary key is the explicit `PK` field when present and non-empty,
/// otherwise `type`; the secondary key is `SK`, otherwise `id`. A missing
/// `last_used` defaults to `now`.
///
/// # Errors
///
/// Returns [`ValidationError`] if a key cannot be derived, an enumeration
/// value is unknown, a number cannot be coerced, or `last_used` is present
/// but not a valid date.
pub fn normalize(raw: &RawRecord, now: DateTime<Utc>) -> Result<Device, ValidationError> {
    let id = parse_id(raw.get("id"))?;
    let device_type = parse_enum::<DeviceType>(raw.get("type"), "type")?;

    let primary_key = key_override(raw.get("PK"))
        .or_else(|| device_type.map(|t| t.as_str().to_string()))
        .ok_or(ValidationError::MissingField("PK or type"))?;
    let secondary_key = key_override(raw.get("SK"))
        .or_else(|| id.map(|id| id.to_string()))
        .ok_or(ValidationError::MissingField("SK or id"))?;
    let keys = DeviceKeys::new(primary_key, secondary_key)?;

    let health_value = raw.get("device_health").or_else(|| raw.get("health"));
    let health = parse_enum::<DeviceHealth>(health_value, "device_health")?;

    let location = optional_string(raw.get("location"), "location")?;

    let color = optional_string(raw.get("color"), "color")?;
    if let Some(c) = &color {
        if !is_hex_color(c) {
            return Err(ValidationError::InvalidField {
                field: "color",
                reason: format!("\"{c}\" is not a hex color"),
            });
        }
    }

    let price = Device::price_from_minor_units(parse_price(raw.get("price"))?)?;

    let last_used_value = raw.get("last_used").or_else(|| raw.get("lastUsed"));
    let last_used = parse_last_used(last_used_value)?.unwrap_or(now);

    Ok(Device {
        keys,
        id,
        device_type,
        location,
        health,
        price,
        color,
        last_used,
    })
}

/// An explicit key override; empty strings do not count.
fn key_override(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_id(value: Option<&Value>) -> Result<Option<i64>, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidField { field: "id", reason };
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            match n.as_f64() {
                #[allow(clippy::cast_possible_truncation)]
                Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Ok(Some(f as i64)),
                _ => Err(invalid(format!("{n} is not an integer"))),
            }
        }
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(format!("\"{s}\" is not an integer"))),
        Some(other) => Err(invalid(format!("unexpected value {other}"))),
    }
}

fn parse_enum<T>(
    value: Option<&Value>,
    field: &'static str,
) -> Result<Option<T>, ValidationError>
where
    T: FromStr<Err = invdb_core::CoreError>,
{
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.parse::<T>()?)),
        Some(other) => Err(ValidationError::InvalidField {
            field,
            reason: format!("expected a string, got {other}"),
        }),
    }
}

fn optional_string(
    value: Option<&Value>,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(other) => Err(ValidationError::InvalidField {
            field,
            reason: format!("expected a string, got {other}"),
        }),
    }
}

/// `#rgb`, `#rrggbb`, or `#rrggbbaa`.
fn is_hex_color(s: &str) -> bool {
    s.strip_prefix('#').is_some_and(|hex| {
        matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
    })
}

/// Price in minor units. Absent means zero.
fn parse_price(value: Option<&Value>) -> Result<Decimal, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidField {
        field: "price",
        reason,
    };
    match value {
        None | Some(Value::Null) => Ok(Decimal::ZERO),
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .map_err(|_| invalid(format!("{n} is not a number"))),
        Some(Value::String(s)) => Decimal::from_str(s.trim())
            .map_err(|_| invalid(format!("\"{s}\" is not a number"))),
        Some(other) => Err(invalid(format!("unexpected value {other}"))),
    }
}

/// `Ok(None)` when the field is absent or blank, so the caller can default it.
fn parse_last_used(value: Option<&Value>) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let invalid = |shown: String| ValidationError::InvalidField {
        field: "last_used",
        reason: format!("{shown} is not a valid date"),
    };
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => parse_timestamp_text(s)
            .map(Some)
            .ok_or_else(|| invalid(format!("\"{s}\""))),
        Some(Value::Number(n)) => {
            #[allow(clippy::cast_possible_truncation)]
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64));
            millis
                .and_then(timestamp_from_millis)
                .map(Some)
                .ok_or_else(|| invalid(n.to_string()))
        }
        Some(other) => Err(invalid(other.to_string())),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
