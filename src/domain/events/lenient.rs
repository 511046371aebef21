//! Lenient field deserializers.
//!
//! Used via `#[serde(default, deserialize_with = "...")]` so that a field
//! with an unexpected JSON type decodes as `None` rather than failing the
//! whole event.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads a JSON value as a number the way a keyboard page would send it.
///
/// Numeric strings are parsed, booleans map to 1/0.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Truncates toward zero, saturating at the i64 bounds. NaN reads as absent.
pub(crate) fn as_int(value: &Value) -> Option<i64> {
    as_number(value).filter(|f| !f.is_nan()).map(|f| f.trunc() as i64)
}

pub(crate) fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(as_number))
}

pub(crate) fn int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(as_int))
}

pub(crate) fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Any JSON value; `null` reads as absent.
pub(crate) fn any<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.filter(|v| !v.is_null()))
}

/// Array of numbers. Non-numeric entries read as 0 so positions are kept.
pub(crate) fn number_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
    Ok(array(d)?
        .iter()
        .map(|v| as_number(v).unwrap_or(0.0))
        .collect())
}

/// Array of ints. Non-numeric entries read as 0 so positions are kept.
pub(crate) fn int_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<i64>, D::Error> {
    Ok(array(d)?.iter().map(|v| as_int(v).unwrap_or(0)).collect())
}

/// Array of raw JSON values.
pub(crate) fn value_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Value>, D::Error> {
    array(d)
}

/// Array of structs. Entries that are not objects fall back to `T::default()`.
pub(crate) fn struct_list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(array(d)?
        .into_iter()
        .map(|v| match v {
            Value::Object(_) => serde_json::from_value(v).unwrap_or_default(),
            _ => T::default(),
        })
        .collect())
}

fn array<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Value>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    })
}
