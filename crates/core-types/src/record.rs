use crate::error::CoreError;
use crate::value::Value;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashSet};

/// One row of a dashboard dataset: a company, a research report, a news item.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: String,
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter, mostly useful for assembling fixtures in code.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Converts one JSON object. The value under `id_field` becomes the record id
    /// and stays available as an ordinary field.
    pub fn from_json(id_field: &str, json: &JsonValue) -> Result<Self, CoreError> {
        let JsonValue::Object(object) = json else {
            return Err(CoreError::InvalidInput(
                "record".to_string(),
                format!("expected a JSON object, found {}", json_kind(json)),
            ));
        };

        let id = match object.get(id_field) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Number(n)) => n.to_string(),
            Some(JsonValue::Null) | None => {
                return Err(CoreError::InvalidInput(
                    id_field.to_string(),
                    "record is missing its identifier".to_string(),
                ));
            }
            Some(other) => {
                return Err(CoreError::InvalidInput(
                    id_field.to_string(),
                    format!("identifier must be text or a number, found {}", json_kind(other)),
                ));
            }
        };

        let fields = object
            .iter()
            .map(|(name, value)| Ok((name.clone(), Value::from_json(name, value)?)))
            .collect::<Result<BTreeMap<_, _>, CoreError>>()?;

        Ok(Self { id, fields })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the field value, treating an explicit `Null` the same as an absent field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|value| !value.is_null())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn to_json(&self) -> JsonValue {
        let object: Map<String, JsonValue> = self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        JsonValue::Object(object)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter())
    }
}

fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// A named, validated record collection.
///
/// Construction is the only place malformed input is rejected; once a `Dataset`
/// exists every record has a unique identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    id_field: String,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(
        name: impl Into<String>,
        id_field: impl Into<String>,
        records: Vec<Record>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id()) {
                return Err(CoreError::DuplicateId {
                    dataset: name,
                    id: record.id().to_string(),
                });
            }
        }
        Ok(Self {
            name,
            id_field: id_field.into(),
            records,
        })
    }

    pub fn from_json(name: &str, id_field: &str, json: &JsonValue) -> Result<Self, CoreError> {
        let JsonValue::Array(items) = json else {
            return Err(CoreError::InvalidInput(
                name.to_string(),
                format!("expected a JSON array of records, found {}", json_kind(json)),
            ));
        };
        let records = items
            .iter()
            .map(|item| Record::from_json(id_field, item))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(name, id_field, records)
    }

    pub fn from_json_str(name: &str, id_field: &str, text: &str) -> Result<Self, CoreError> {
        let json: JsonValue = serde_json::from_str(text)
            .map_err(|e| CoreError::InvalidInput(name.to_string(), e.to_string()))?;
        Self::from_json(name, id_field, &json)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}
