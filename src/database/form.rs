use std::collections::HashMap;

use serde_json::Value;

use super::error::ValidationError;

pub type FormData = HashMap<String, Value>;

const REQUIRED: &str = "This field is required.";

/// Typed access to a decoded JSON body, failing with field-level errors.
pub struct Form {
    inner: HashMap<String, Value>,
}

impl Form {
    pub fn from_data(data: FormData) -> Self {
        Self { inner: data }
    }

    /// Accepts only a JSON object; anything else is a non-field error.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(map) => Ok(Self::from_data(map.into_iter().collect())),
            _ => Err(ValidationError::field(
                "non_field_errors",
                "Invalid data. Expected a dictionary.",
            )),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.get(key).is_some_and(|value| !value.is_null())
    }

    pub fn get_str(&self, key: &str) -> Result<String, ValidationError> {
        match self.inner.get(key) {
            Some(Value::String(v)) => Ok(v.to_owned()),
            Some(Value::Null) | None => Err(ValidationError::field(key, REQUIRED)),
            Some(_) => Err(ValidationError::field(key, "Not a valid string.")),
        }
    }

    pub fn get_optional_str(&self, key: &str) -> Result<Option<String>, ValidationError> {
        if !self.contains(key) {
            return Ok(None);
        }
        self.get_str(key).map(Some)
    }

    pub fn get_number(&self, key: &str) -> Result<i64, ValidationError> {
        match self.inner.get(key) {
            Some(value) if !value.is_null() => {
                parse_integer(value).ok_or_else(|| ValidationError::field(key, "A valid integer is required."))
            }
            _ => Err(ValidationError::field(key, REQUIRED)),
        }
    }

    pub fn get_list(&self, key: &str) -> Result<Vec<Value>, ValidationError> {
        match self.inner.get(key) {
            Some(Value::Array(values)) => Ok(values.to_owned()),
            Some(Value::Null) | None => Err(ValidationError::field(key, REQUIRED)),
            Some(_) => Err(ValidationError::field(
                key,
                "Expected a list of items.",
            )),
        }
    }
}

/// Integers may arrive as JSON numbers or as numeric strings.
pub fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
