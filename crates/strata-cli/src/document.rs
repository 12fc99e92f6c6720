//! Conversion between JSON documents and stored values.
//!
//! Objects become maps keyed by strings, or structs when they carry an
//! `"@struct"` name. `{"@ref": "<hex>"}` is a reference. Arrays become sets,
//! so element order and duplicates are not preserved. `null` has no value
//! counterpart and is rejected.

use std::path::Path;

use anyhow::{anyhow, bail, Context};
use serde_json::{Map as JsonMap, Number, Value as Json};
use strata_store::ObjectStore;
use strata_types::ObjectId;
use strata_value::{Map, Set, Struct, Value};

pub const STRUCT_KEY: &str = "@struct";
pub const REF_KEY: &str = "@ref";

/// Read a JSON file into `store`.
pub fn load(store: &dyn ObjectStore, path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let json: Json =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    from_json(store, &json).with_context(|| format!("loading {}", path.display()))
}

pub fn from_json(store: &dyn ObjectStore, json: &Json) -> anyhow::Result<Value> {
    convert_in(store, json, "$")
}

fn convert_in(store: &dyn ObjectStore, json: &Json, at: &str) -> anyhow::Result<Value> {
    Ok(match json {
        Json::Null => bail!("null is not supported (at {at})"),
        Json::Bool(b) => Value::from(*b),
        Json::Number(n) => {
            Value::from(n.as_f64().ok_or_else(|| anyhow!("number out of range (at {at})"))?)
        }
        Json::String(s) => Value::from(s.as_str()),
        Json::Array(items) => {
            let values = items
                .iter()
                .enumerate()
                .map(|(i, item)| convert_in(store, item, &format!("{at}[{i}]")))
                .collect::<anyhow::Result<Vec<_>>>()?;
            Set::from_values(store, values)?.into()
        }
        Json::Object(fields) => convert_object(store, fields, at)?,
    })
}

fn convert_object(store: &dyn ObjectStore, fields: &JsonMap<String, Json>, at: &str) -> anyhow::Result<Value> {
    if let Some(hex) = fields.get(REF_KEY) {
        let hex = hex
            .as_str()
            .ok_or_else(|| anyhow!("{REF_KEY} must be a string (at {at})"))?;
        if fields.len() != 1 {
            bail!("{REF_KEY} objects take no other keys (at {at})");
        }
        return Ok(Value::Ref(ObjectId::from_hex(hex)?));
    }

    let mut converted = Vec::with_capacity(fields.len());
    for (name, field) in fields {
        if name == STRUCT_KEY {
            continue;
        }
        converted.push((name.clone(), convert_in(store, field, &format!("{at}.{name}"))?));
    }

    match fields.get(STRUCT_KEY) {
        Some(Json::String(name)) => Ok(Struct::new(name.as_str(), converted).into()),
        Some(_) => bail!("{STRUCT_KEY} must be a string (at {at})"),
        None => Ok(Map::from_entries(
            store,
            converted.into_iter().map(|(k, v)| (Value::from(k), v)),
        )?
        .into()),
    }
}

/// Render a stored value as JSON.
pub fn to_json(store: &dyn ObjectStore, value: &Value) -> anyhow::Result<Json> {
    Ok(match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::Float(x) => Number::from_f64(x.get())
            .map(Json::Number)
            .ok_or_else(|| anyhow!("{} has no JSON representation", x.get()))?,
        Value::String(s) => Json::String(s.clone()),
        Value::Ref(id) => {
            let mut object = JsonMap::new();
            object.insert(REF_KEY.into(), Json::String(id.to_hex()));
            Json::Object(object)
        }
        Value::Map(m) => {
            let mut object = JsonMap::new();
            for entry in m.iter(store) {
                let (k, v) = entry?;
                let name = match k.as_str() {
                    Some(s) => s.to_string(),
                    None => k.to_string(),
                };
                object.insert(name, to_json(store, &v)?);
            }
            Json::Object(object)
        }
        Value::Set(s) => Json::Array(
            s.iter(store)
                .map(|element| to_json(store, &element?))
                .collect::<anyhow::Result<Vec<_>>>()?,
        ),
        Value::Struct(s) => {
            let mut object = JsonMap::new();
            object.insert(STRUCT_KEY.into(), Json::String(s.name().to_string()));
            for (name, field) in s.fields() {
                object.insert(name.clone(), to_json(store, field)?);
            }
            Json::Object(object)
        }
    })
}
