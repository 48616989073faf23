// Conversions between browser/JS values and the core types

use fused_location_core::{
    clamp_unsigned_long, Coordinates, HostError, LocationError, Position, PositionOptions,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};

/// Argument of `clearWatch`
#[derive(Debug, Clone, Deserialize)]
pub struct ClearWatchOptions {
    pub id: String,
}

/// Copy a browser position fix field by field.
pub fn position_from_js(position: &web_sys::Position) -> Position {
    let coords = position.coords();
    Position {
        coords: Coordinates {
            latitude: coords.latitude(),
            longitude: coords.longitude(),
            accuracy: coords.accuracy(),
            altitude: coords.altitude(),
            altitude_accuracy: coords.altitude_accuracy(),
            speed: coords.speed(),
            heading: coords.heading(),
        },
        timestamp: position.timestamp(),
    }
}

pub fn host_error_from_js(error: &web_sys::PositionError) -> HostError {
    HostError::new(error.code(), error.message())
}

/// Best-effort message for a thrown JS value
pub fn describe_js_error(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Serialize to a plain JS object; `None` becomes `null`.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

/// Read caller options with the browser's own conversions: numbers are
/// `[Clamp] unsigned long`, `enableHighAccuracy` is JS truthiness.
/// `undefined`/`null` mean "no options"; other non-objects carry no keys.
pub fn options_from_js(value: JsValue) -> Result<Option<PositionOptions>, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    if !value.is_object() {
        return Ok(Some(PositionOptions::default()));
    }
    Ok(Some(PositionOptions {
        enable_high_accuracy: member(&value, "enableHighAccuracy")?
            .map(|v| v.is_truthy()),
        timeout: member(&value, "timeout")?.map(number_member).transpose()?,
        maximum_age: member(&value, "maximumAge")?
            .map(number_member)
            .transpose()?,
    }))
}

/// A dictionary member; `undefined` counts as absent.
fn member(target: &JsValue, key: &str) -> Result<Option<JsValue>, JsValue> {
    let value = js_sys::Reflect::get(target, &JsValue::from_str(key))?;
    Ok((!value.is_undefined()).then_some(value))
}

/// `Number(value)` followed by the `[Clamp]` conversion.
fn number_member(value: JsValue) -> Result<u32, JsValue> {
    if value.is_symbol() || value.is_bigint() {
        return Err(js_sys::TypeError::new("Cannot convert option to a number").into());
    }
    let number = value.as_f64().unwrap_or_else(|| value.unchecked_into_f64());
    Ok(clamp_unsigned_long(number))
}

/// Arguments of one watch callback: `(position, null)` or `(null, error)`.
/// A position that cannot be serialized is reported as an error instead.
pub fn watch_args(
    position: Option<Position>,
    error: Option<LocationError>,
) -> (JsValue, JsValue) {
    if let Some(error) = error {
        return (JsValue::NULL, error_to_js(error));
    }
    match position.as_ref().map(to_js) {
        Some(Ok(value)) => (value, JsValue::NULL),
        Some(Err(e)) => {
            let message = describe_js_error(&e);
            tracing::warn!("watch position could not be serialized: {}", message);
            (JsValue::NULL, js_sys::Error::new(&message).into())
        }
        None => (JsValue::NULL, JsValue::NULL),
    }
}

pub fn clear_watch_options_from_js(value: JsValue) -> Result<ClearWatchOptions, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(JsValue::from)
}

/// Host failures become `{code, message}` objects; everything else a JS
/// `Error` carrying the message.
pub fn error_to_js(error: LocationError) -> JsValue {
    match error {
        LocationError::Host(host) => match to_js(&host) {
            Ok(value) => value,
            Err(_) => js_sys::Error::new(&host.message).into(),
        },
        other => js_sys::Error::new(&other.to_string()).into(),
    }
}
