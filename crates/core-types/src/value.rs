use crate::error::CoreError;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// A single field value of a dashboard record.
///
/// Records come from loosely shaped fixtures (companies, reports, news), so the
/// value model is dynamic. Numbers are kept as `Decimal` so that comparing prices
/// and counts never goes through binary floating point.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Decimal),
    Text(String),
    /// Tag-like multi-valued fields. Searched and filtered element by element.
    List(Vec<Value>),
}

impl Value {
    /// Converts a JSON fixture value. `field` names the offending field in errors.
    pub fn from_json(field: &str, json: &JsonValue) -> Result<Self, CoreError> {
        match json {
            JsonValue::Null => Ok(Value::Null),
            JsonValue::Bool(b) => Ok(Value::Bool(*b)),
            JsonValue::Number(n) => parse_decimal(field, &n.to_string()).map(Value::Number),
            JsonValue::String(s) => Ok(Value::Text(s.clone())),
            JsonValue::Array(items) => items
                .iter()
                .map(|item| Value::from_json(field, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            JsonValue::Object(_) => Err(CoreError::InvalidInput(
                field.to_string(),
                "nested objects are not supported".to_string(),
            )),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(d) => {
                let rendered = d.normalize().to_string();
                match rendered.parse::<serde_json::Number>() {
                    Ok(n) => JsonValue::Number(n),
                    Err(_) => JsonValue::String(rendered),
                }
            }
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The string form used for searching, exact matching and mixed-type ordering.
    ///
    /// `Null` has no string form. Lists render as their elements joined by `", "`.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Null => None,
            Value::Bool(true) => Some(Cow::Borrowed("true")),
            Value::Bool(false) => Some(Cow::Borrowed("false")),
            Value::Number(d) => Some(Cow::Owned(d.normalize().to_string())),
            Value::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Value::List(items) => Some(Cow::Owned(
                items.iter().filter_map(Value::as_text).join(", "),
            )),
        }
    }

    /// Returns true if any scalar inside this value satisfies `pred`.
    ///
    /// Lists are visited element-wise; `Null` never matches.
    pub fn any_text(&self, pred: &mut dyn FnMut(&str) -> bool) -> bool {
        match self {
            Value::List(items) => items.iter().any(|item| item.any_text(pred)),
            other => other.as_text().is_some_and(|text| pred(&text)),
        }
    }
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, CoreError> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| {
            CoreError::InvalidInput(field.to_string(), format!("number {raw} is out of range: {e}"))
        })
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => f.write_str(&text),
            None => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Decimal::from(value))
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Number(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn converts_fixture_json() {
        assert_eq!(Value::from_json("price", &json!(10.5)).unwrap(), Value::Number(dec!(10.5)));
        assert_eq!(Value::from_json("flag", &json!(true)).unwrap(), Value::Bool(true));
        assert_eq!(
            Value::from_json("tags", &json!(["财报", "业绩"])).unwrap(),
            Value::from(vec!["财报", "业绩"])
        );
        assert!(Value::from_json("x", &json!(null)).unwrap().is_null());
    }

    #[test]
    fn rejects_nested_objects() {
        let err = Value::from_json("meta", &json!({"a": 1})).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(field, _) if field == "meta"));
    }

    #[test]
    fn text_forms() {
        assert_eq!(Value::Number(dec!(10.00)).as_text().unwrap(), "10");
        assert_eq!(Value::from(vec!["a", "b"]).as_text().unwrap(), "a, b");
        assert_eq!(Value::Null.as_text(), None);
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn any_text_visits_list_elements() {
        let tags = Value::from(vec!["科技行业", "半导体"]);
        assert!(tags.any_text(&mut |t| t == "半导体"));
        assert!(!tags.any_text(&mut |t| t == "科技"));
        assert!(!Value::Null.any_text(&mut |_| true));
    }

    #[test]
    fn numbers_round_trip_to_json() {
        assert_eq!(Value::Number(dec!(3562)).to_json(), json!(3562));
        assert_eq!(Value::Number(dec!(-2.50)).to_json(), json!(-2.5));
    }
}
