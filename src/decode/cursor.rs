use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::error::DecodeError;

/// A borrowed JSON node together with the path it was reached by.
///
/// Every accessor fails with a [`DecodeError`] whose context is that path, so
/// a failure deep inside a project list points at the exact field.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> Cursor<'a> {
    pub fn root(value: &'a Value) -> Self {
        Self {
            value,
            path: "$".to_string(),
        }
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn error(&self, cause: impl Into<String>) -> DecodeError {
        DecodeError::new(self.path.clone(), cause)
    }

    /// A required member. Absent and `null` are both missing.
    pub fn field(&self, key: &str) -> Result<Cursor<'a>, DecodeError> {
        self.opt_field(key)
            .ok_or_else(|| DecodeError::missing(format!("{}.{}", self.path, key)))
    }

    /// A required member that may also travel under an abbreviated `alias`.
    pub fn field_or(&self, key: &str, alias: &str) -> Result<Cursor<'a>, DecodeError> {
        self.opt_field(key)
            .or_else(|| self.opt_field(alias))
            .ok_or_else(|| DecodeError::missing(format!("{}.{}", self.path, key)))
    }

    /// An optional member; `None` when absent or `null`.
    pub fn opt_field(&self, key: &str) -> Option<Cursor<'a>> {
        match self.value.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(Cursor {
                value,
                path: format!("{}.{}", self.path, key),
            }),
        }
    }

    pub fn elements(&self) -> Result<Vec<Cursor<'a>>, DecodeError> {
        let items = self
            .value
            .as_array()
            .ok_or_else(|| self.error(format!("expected an array, found {}", kind_of(self.value))))?;
        Ok(items
            .iter()
            .enumerate()
            .map(|(i, value)| Cursor {
                value,
                path: format!("{}[{}]", self.path, i),
            })
            .collect())
    }

    pub fn as_i64(&self) -> Result<i64, DecodeError> {
        self.value
            .as_i64()
            .ok_or_else(|| self.error(format!("expected an integer, found {}", kind_of(self.value))))
    }

    pub fn as_i32(&self) -> Result<i32, DecodeError> {
        let n = self.as_i64()?;
        i32::try_from(n).map_err(|_| self.error(format!("integer {} is out of range", n)))
    }

    pub fn as_f64(&self) -> Result<f64, DecodeError> {
        self.value
            .as_f64()
            .ok_or_else(|| self.error(format!("expected a number, found {}", kind_of(self.value))))
    }

    pub fn as_bool(&self) -> Result<bool, DecodeError> {
        self.value
            .as_bool()
            .ok_or_else(|| self.error(format!("expected a boolean, found {}", kind_of(self.value))))
    }

    pub fn as_str(&self) -> Result<&'a str, DecodeError> {
        self.value
            .as_str()
            .ok_or_else(|| self.error(format!("expected a string, found {}", kind_of(self.value))))
    }

    pub fn as_uuid(&self) -> Result<Uuid, DecodeError> {
        let text = self.as_str()?;
        Uuid::parse_str(text).map_err(|e| self.error(format!("malformed UUID {:?}: {}", text, e)))
    }

    pub fn as_datetime(&self) -> Result<DateTime<Utc>, DecodeError> {
        let text = self.as_str()?;
        DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| self.error(format!("malformed timestamp {:?}: {}", text, e)))
    }

    /// The integer this node stands for, if it is an integral number or a
    /// string holding an integer. `1.0` counts; `1.5` does not.
    pub fn int_convertible(&self) -> Option<i64> {
        match self.value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
