//! `serde_json` shortcuts returning [`crate::error::Result`].

use crate::error::{KeystoneError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

pub fn to_string_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_str<T: DeserializeOwned>(json: &str) -> Result<T> {
    Ok(serde_json::from_str(json)?)
}

pub fn from_slice<T: DeserializeOwned>(json: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(json)?)
}

pub fn from_reader<T: DeserializeOwned, R: Read>(reader: R) -> Result<T> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn from_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    from_reader(BufReader::new(File::open(path)?))
}

/// Write `value` to `path`, replacing the file.
pub fn to_file<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Re-shape `value` into another type through its JSON form.
pub fn convert<T: Serialize + ?Sized, U: DeserializeOwned>(value: &T) -> Result<U> {
    Ok(serde_json::from_value(serde_json::to_value(value)?)?)
}

/// Parse a JSON object.
pub fn from_map(json: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(json)? {
        Value::Object(map) => Ok(map),
        other => Err(KeystoneError::NotAnObject(kind_of(&other).to_string())),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn field(json: &str, key: &str) -> Result<Option<Value>> {
    Ok(from_map(json)?.remove(key).filter(|v| !v.is_null()))
}

/// Strings come back unquoted; any other value as its JSON text.
pub fn get_as_string(json: &str, key: &str) -> Result<Option<String>> {
    Ok(field(json, key)?.map(|value| match value {
        Value::String(s) => s,
        other => other.to_string(),
    }))
}

pub fn get_as_i64(json: &str, key: &str) -> Result<Option<i64>> {
    get_as(json, key)
}

pub fn get_as_f64(json: &str, key: &str) -> Result<Option<f64>> {
    get_as(json, key)
}

pub fn get_as_bool(json: &str, key: &str) -> Result<Option<bool>> {
    get_as(json, key)
}

pub fn get_as_object(json: &str, key: &str) -> Result<Option<Map<String, Value>>> {
    get_as(json, key)
}

pub fn get_as_list<T: DeserializeOwned>(json: &str, key: &str) -> Result<Option<Vec<T>>> {
    get_as(json, key)
}

/// Deserialize the member `key`; `None` when it is missing or null.
pub fn get_as<T: DeserializeOwned>(json: &str, key: &str) -> Result<Option<T>> {
    field(json, key)?
        .map(serde_json::from_value)
        .transpose()
        .map_err(KeystoneError::from)
}

/// Set `key` to `value`, overwriting any existing member.
pub fn add<T: Serialize + ?Sized>(json: &str, key: &str, value: &T) -> Result<String> {
    let mut map = from_map(json)?;
    map.insert(key.to_string(), serde_json::to_value(value)?);
    to_string(&map)
}

/// Replace `key` only when it already exists.
pub fn update<T: Serialize + ?Sized>(json: &str, key: &str, value: &T) -> Result<String> {
    let mut map = from_map(json)?;
    if let Some(slot) = map.get_mut(key) {
        *slot = serde_json::to_value(value)?;
    }
    to_string(&map)
}

pub fn remove(json: &str, key: &str) -> Result<String> {
    let mut map = from_map(json)?;
    map.remove(key);
    to_string(&map)
}

/// Pretty-print a JSON document.
pub fn format(json: &str) -> Result<String> {
    to_string_pretty(&serde_json::from_str::<Value>(json)?)
}

pub fn is_json(text: &str) -> bool {
    serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok()
}
