//! Submitted form values.

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use warden_core::{AppError, AppResult};
use warden_domain::parse_datetime;

/// Raw values posted by a create or edit form, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSubmission {
    values: Map<String, Value>,
}

impl FormSubmission {
    /// Wraps submitted values.
    #[must_use]
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Wraps a JSON body, which must be an object.
    pub fn from_json(value: Value) -> AppResult<Self> {
        match value {
            Value::Object(values) => Ok(Self::new(values)),
            other => Err(AppError::Validation(format!(
                "form submission must be a JSON object, got '{other}'"
            ))),
        }
    }

    /// Returns the raw value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Returns whether the field was posted at all.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Returns the field as text. Numbers and booleans are rendered, null and
    /// composite values yield `None`.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<String> {
        match self.values.get(field)? {
            Value::String(value) => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            Value::Bool(value) => Some(value.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Returns the field as text with blanks folded to the empty string.
    #[must_use]
    pub fn text_or_empty(&self, field: &str) -> String {
        self.text(field).unwrap_or_default()
    }

    /// Returns whether the field is missing, null, whitespace, or an empty list.
    #[must_use]
    pub fn is_blank(&self, field: &str) -> bool {
        match self.values.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::String(value)) => value.trim().is_empty(),
            Some(Value::Array(values)) => values.is_empty(),
            Some(_) => false,
        }
    }

    /// Parses the field as a timestamp. Blank fields yield `None`.
    pub fn datetime(&self, field: &str) -> AppResult<Option<NaiveDateTime>> {
        if self.is_blank(field) {
            return Ok(None);
        }

        match self.text(field) {
            Some(value) => parse_datetime(&value).map(Some),
            None => Err(AppError::Validation(format!(
                "field '{field}' must be a date time string"
            ))),
        }
    }

    /// Parses the field as a single id. Blank fields yield `None`.
    pub fn id(&self, field: &str) -> AppResult<Option<i64>> {
        let ids = self.ids(field)?;
        match ids.as_slice() {
            [] => Ok(None),
            [id] => Ok(Some(*id)),
            _ => Err(AppError::Validation(format!(
                "field '{field}' accepts a single value"
            ))),
        }
    }

    /// Parses the field as a list of ids. Accepts a number, a comma separated
    /// string, or an array of numbers and numeric strings.
    pub fn ids(&self, field: &str) -> AppResult<Vec<i64>> {
        let invalid =
            || AppError::Validation(format!("field '{field}' must contain numeric ids"));

        match self.values.get(field) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Number(value)) => value.as_i64().map(|id| vec![id]).ok_or_else(invalid),
            Some(Value::String(value)) => value
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| part.parse::<i64>().map_err(|_| invalid()))
                .collect(),
            Some(Value::Array(values)) => values
                .iter()
                .map(|value| match value {
                    Value::Number(number) => number.as_i64().ok_or_else(invalid),
                    Value::String(text) => text.trim().parse::<i64>().map_err(|_| invalid()),
                    _ => Err(invalid()),
                })
                .collect(),
            Some(_) => Err(invalid()),
        }
    }
}
