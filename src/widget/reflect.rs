//! Mapping between JSON property values and the attributes that back them.

use serde_json::Value;

/// What writing a property does to its attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reflection {
	Remove,
	Set(String),
}

/// `false` and `null` remove the attribute, `true` sets it empty, strings are stored verbatim
/// and anything else as JSON text.
#[must_use]
pub fn to_attribute(value: &Value) -> Reflection {
	match value {
		Value::Null | Value::Bool(false) => Reflection::Remove,
		Value::Bool(true) => Reflection::Set(String::new()),
		Value::String(string) => Reflection::Set(string.clone()),
		other => Reflection::Set(other.to_string()),
	}
}

/// Inverse of [`to_attribute`], as far as that goes: an empty attribute reads as `true`, a missing one as `false`,
/// and text that isn't valid JSON as a string.
#[must_use]
pub fn from_attribute(attribute: Option<&str>) -> Value {
	match attribute {
		None => Value::Bool(false),
		Some("") => Value::Bool(true),
		Some(text) => serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned())),
	}
}

/// JavaScript truthiness.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0 && !n.is_nan()),
		Value::String(string) => !string.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}

/// Renders a value the way template interpolation would, except that `null` renders empty.
#[must_use]
pub fn display(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(string) => string.clone(),
		other => other.to_string(),
	}
}
