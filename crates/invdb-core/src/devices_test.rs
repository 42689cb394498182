use chrono::TimeZone;
use serde_json::json;

use super::*;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

#[test]
fn device_type_parses_case_insensitively() {
    assert_eq!("Freezer".parse::<DeviceType>().unwrap(), DeviceType::Freezer);
    assert_eq!(
        " centrifuge ".parse::<DeviceType>().unwrap(),
        DeviceType::Centrifuge
    );
}

#[test]
fn device_type_rejects_unknown_value() {
    let err = "toaster".parse::<DeviceType>().unwrap_err();
    assert_eq!(err, CoreError::InvalidDeviceType("toaster".to_string()));
}

#[test]
fn device_health_round_trips_through_display() {
    for health in [
        DeviceHealth::Good,
        DeviceHealth::Mediocre,
        DeviceHealth::Ok,
        DeviceHealth::Bad,
        DeviceHealth::Broken,
    ] {
        assert_eq!(health.to_string().parse::<DeviceHealth>().unwrap(), health);
    }
}

#[test]
fn keys_reject_empty_primary_key() {
    assert_eq!(
        DeviceKeys::new("", "1").unwrap_err(),
        CoreError::EmptyKey("primary key")
    );
}

#[test]
fn keys_reject_whitespace_secondary_key() {
    assert_eq!(
        DeviceKeys::new("freezer", "  ").unwrap_err(),
        CoreError::EmptyKey("secondary key")
    );
}

#[test]
fn price_from_minor_units_divides_by_hundred() {
    let price = Device::price_from_minor_units(Decimal::from(1299)).unwrap();
    assert_eq!(price, Decimal::new(1299, 2));
}

#[test]
fn price_from_minor_units_rejects_negative() {
    assert!(matches!(
        Device::price_from_minor_units(Decimal::from(-1)),
        Err(CoreError::InvalidPrice(_))
    ));
}

#[test]
fn price_from_minor_units_rejects_fractional_cents() {
    let err = Device::price_from_minor_units(Decimal::new(10985, 1)).unwrap_err();
    assert_eq!(
        err,
        CoreError::InvalidPrice("1098.5 is not a whole number of minor units".to_string())
    );
}

#[test]
fn price_from_minor_units_accepts_integral_decimals() {
    let price = Device::price_from_minor_units(Decimal::new(10980, 1)).unwrap();
    assert_eq!(price, Decimal::new(1098, 2));
}

#[test]
fn wire_key_of_wrong_shape_has_a_readable_error() {
    let err = serde_json::from_str::<WireDevice>(r#"{"PK": "freezer", "SK": {"id": 1}}"#)
        .unwrap_err();
    assert!(
        err.to_string().contains("PK/SK must be a string or number"),
        "got {err}"
    );
}

#[test]
fn to_wire_encodes_price_in_minor_units_and_millis() {
    let device = Device {
        keys: DeviceKeys::new("freezer", "7").unwrap(),
        id: Some(7),
        device_type: Some(DeviceType::Freezer),
        location: Some("Lab 2".to_string()),
        health: Some(DeviceHealth::Good),
        price: Decimal::new(1299, 2),
        color: Some("#ff8800".to_string()),
        last_used: fixed_now(),
    };

    let value = serde_json::to_value(device.to_wire()).unwrap();
    assert_eq!(
        value,
        json!({
            "PK": "freezer",
            "SK": "7",
            "id": 7,
            "type": "freezer",
            "location": "Lab 2",
            "device_health": "good",
            "price": 1299,
            "color": "#ff8800",
            "last_used": fixed_now().timestamp_millis(),
        })
    );
}

#[test]
fn to_wire_omits_absent_optional_fields() {
    let device = Device {
        keys: DeviceKeys::new("custom-pk", "custom-sk").unwrap(),
        id: None,
        device_type: None,
        location: None,
        health: None,
        price: Decimal::ZERO,
        color: None,
        last_used: fixed_now(),
    };

    let value = serde_json::to_value(device.to_wire()).unwrap();
    let obj = value.as_object().unwrap();
    assert!(!obj.contains_key("id"));
    assert!(!obj.contains_key("type"));
    assert!(!obj.contains_key("device_health"));
    assert_eq!(obj["price"], json!(0));
}

#[test]
fn from_wire_accepts_numeric_sort_key_and_iso_timestamp() {
    let wire: WireDevice = serde_json::from_value(json!({
        "PK": "shaker",
        "SK": 42,
        "id": 42,
        "type": "shaker",
        "device_health": "ok",
        "price": 500,
        "last_used": "2024-01-15T08:30:00.000Z",
        "createdAt": 1_700_000_000_000_i64
    }))
    .unwrap();

    let device = Device::from_wire(wire, fixed_now()).unwrap();
    assert_eq!(device.secondary_key(), "42");
    assert_eq!(device.device_type, Some(DeviceType::Shaker));
    assert_eq!(device.health, Some(DeviceHealth::Ok));
    assert_eq!(device.price, Decimal::new(5, 0));
    assert_eq!(
        device.last_used,
        Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap()
    );
}

#[test]
fn from_wire_defaults_missing_last_used_to_fallback() {
    let wire: WireDevice = serde_json::from_value(json!({"PK": "cycler", "SK": "1"})).unwrap();
    let device = Device::from_wire(wire, fixed_now()).unwrap();
    assert_eq!(device.last_used, fixed_now());
    assert_eq!(device.price, Decimal::ZERO);
}

#[test]
fn from_wire_rejects_unknown_health() {
    let wire: WireDevice =
        serde_json::from_value(json!({"PK": "cycler", "SK": "1", "device_health": "meh"}))
            .unwrap();
    assert!(matches!(
        Device::from_wire(wire, fixed_now()),
        Err(CoreError::InvalidDeviceHealth(_))
    ));
}

#[test]
fn parse_timestamp_text_accepts_supported_formats() {
    let midnight = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
    assert_eq!(parse_timestamp_text("2023-06-01"), Some(midnight));
    assert_eq!(parse_timestamp_text("2023-06-01T00:00:00"), Some(midnight));
    assert_eq!(parse_timestamp_text("2023-06-01T02:00:00+02:00"), Some(midnight));
    assert_eq!(
        parse_timestamp_text(&midnight.timestamp_millis().to_string()),
        Some(midnight)
    );
}

#[test]
fn parse_timestamp_text_rejects_garbage() {
    assert_eq!(parse_timestamp_text("yesterday"), None);
    assert_eq!(parse_timestamp_text("2023-13-45"), None);
    assert_eq!(parse_timestamp_text(""), None);
}
