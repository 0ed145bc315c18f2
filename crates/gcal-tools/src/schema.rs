//! Declarative input schemas.
//!
//! Each capability declares its fields once; the same declaration renders the
//! JSON Schema advertised by `tools/list` and validates incoming arguments
//! before a handler runs.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::error::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    /// Inclusive bounds.
    Integer { min: i64, max: i64 },
    /// ISO-8601 instant, normalized to RFC 3339 UTC.
    DateTime,
    /// List of email addresses.
    EmailList,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldDefault {
    Value(Value),
    /// Current instant at dispatch time.
    Now,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: FieldType,
    pub required: bool,
    pub default: Option<FieldDefault>,
}

impl FieldSpec {
    pub fn required(name: &'static str, kind: FieldType, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &'static str, kind: FieldType, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            default: None,
        }
    }

    pub fn with_default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    fn to_json(&self) -> Value {
        let mut property = match self.kind {
            FieldType::String => json!({"type": "string"}),
            FieldType::Integer { min, max } => {
                json!({"type": "integer", "minimum": min, "maximum": max})
            }
            FieldType::DateTime => json!({"type": "string", "format": "date-time"}),
            FieldType::EmailList => json!({
                "type": "array",
                "items": {"type": "string", "format": "email"}
            }),
        };

        if let Value::Object(map) = &mut property {
            map.insert("description".into(), Value::from(self.description));
            if let Some(FieldDefault::Value(default)) = &self.default {
                map.insert("default".into(), default.clone());
            }
        }
        property
    }

    /// Check one present value and return its normalized form.
    fn check(&self, value: Value) -> Result<Value, ToolError> {
        match self.kind {
            FieldType::String => match value {
                Value::String(s) if self.required && s.trim().is_empty() => Err(
                    ToolError::invalid(format!("Missing required argument: {}", self.name)),
                ),
                Value::String(s) => Ok(Value::String(s)),
                other => Err(self.mismatch("a string", &other)),
            },
            FieldType::Integer { min, max } => {
                let number = match &value {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                };
                match number {
                    Some(n) if (min..=max).contains(&n) => Ok(Value::from(n)),
                    _ => Err(self.mismatch(
                        &format!("an integer between {} and {}", min, max),
                        &value,
                    )),
                }
            }
            FieldType::DateTime => {
                let instant = value.as_str().and_then(parse_instant).ok_or_else(|| {
                    self.mismatch("an ISO-8601 date-time such as 2024-01-01T10:00:00Z", &value)
                })?;
                Ok(Value::String(format_instant(instant)))
            }
            FieldType::EmailList => {
                let items = match value {
                    Value::Array(items) => items,
                    other => return Err(self.mismatch("an array of email addresses", &other)),
                };
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) if is_plausible_email(&s) => {
                            Ok(Value::String(s.trim().to_string()))
                        }
                        other => Err(self.mismatch("an array of email addresses", &other)),
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
        }
    }

    fn mismatch(&self, expected: &str, got: &Value) -> ToolError {
        ToolError::invalid(format!(
            "Invalid argument '{}': expected {}, got {}",
            self.name, expected, got
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSchema {
    fields: Vec<FieldSpec>,
    /// `(earlier, later)` date-time pairs; when both are present `later` must
    /// be strictly after `earlier`.
    ordered: Vec<(&'static str, &'static str)>,
}

impl InputSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            ordered: Vec::new(),
        }
    }

    pub fn with_ordering(mut self, earlier: &'static str, later: &'static str) -> Self {
        self.ordered.push((earlier, later));
        self
    }

    /// Schema with no declared fields.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// JSON Schema object as advertised in `tools/list`.
    pub fn to_json(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| (field.name.to_string(), field.to_json()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Validate raw arguments and fill defaults.
    ///
    /// `null` or absent arguments count as an empty object. Explicit `null`
    /// field values count as absent. Undeclared fields are dropped. Declared
    /// orderings between date-time fields are checked after defaults apply.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] naming the first offending field.
    pub fn normalize(&self, raw: Value, now: DateTime<Utc>) -> Result<Arguments, ToolError> {
        let mut input = match raw {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(ToolError::invalid(format!(
                    "Arguments must be a JSON object, got {}",
                    other
                )))
            }
        };

        let mut values = Map::new();
        for field in &self.fields {
            match input.remove(field.name) {
                Some(Value::Null) | None => {
                    if let Some(default) = &field.default {
                        let value = match default {
                            FieldDefault::Value(v) => v.clone(),
                            FieldDefault::Now => Value::String(format_instant(now)),
                        };
                        values.insert(field.name.to_string(), value);
                    } else if field.required {
                        return Err(ToolError::invalid(format!(
                            "Missing required argument: {}",
                            field.name
                        )));
                    }
                }
                Some(value) => {
                    values.insert(field.name.to_string(), field.check(value)?);
                }
            }
        }

        for (earlier, later) in &self.ordered {
            let instant_of = |name: &str| {
                values
                    .get(name)
                    .and_then(Value::as_str)
                    .and_then(parse_instant)
            };
            if let (Some(start), Some(end)) = (instant_of(earlier), instant_of(later)) {
                if end <= start {
                    return Err(ToolError::invalid(format!(
                        "{} must be after {}",
                        later, earlier
                    )));
                }
            }
        }

        if !input.is_empty() {
            let ignored: Vec<&String> = input.keys().collect();
            tracing::debug!(?ignored, "Ignoring undeclared arguments");
        }

        Ok(Arguments(values))
    }
}

/// Validated, defaulted arguments for one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Deserialize into a handler's typed argument struct.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] when the shape does not fit `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ToolError> {
        serde_json::from_value(Value::Object(self.0))
            .map_err(|e| ToolError::invalid(format!("Invalid arguments: {}", e)))
    }
}

/// Parse an ISO-8601 instant.
///
/// Accepts RFC 3339 with any offset. Values without an offset
/// (`2024-01-01T10:00:00`, `2024-01-01T10:00`, `2024-01-01`) are taken as UTC.
pub fn parse_instant(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Some(instant.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub(crate) fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn is_plausible_email(s: &str) -> bool {
    let s = s.trim();
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !s.contains(' '),
        None => false,
    }
}
