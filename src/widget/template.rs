//! Markup string builders for component templates.

use super::reflect::is_truthy;
use serde_json::Value;

/// Builds an attribute list for interpolation into a start tag.
///
/// Falsy values are left out, `true` becomes a bare attribute name, strings are quoted
/// and anything else is quoted JSON.
///
/// ```
/// use block_dom::widget::attributes;
/// use serde_json::json;
///
/// assert_eq!(
/// 	attributes(&[("name", json!("fio")), ("error", json!(true)), ("value", json!(false)), ("data", json!({"a": "b"}))]),
/// 	r#"name="fio" error data="{&quot;a&quot;:&quot;b&quot;}""#,
/// );
/// ```
#[must_use]
pub fn attributes(attributes: &[(&str, Value)]) -> String {
	attributes
		.iter()
		.filter(|(_, value)| is_truthy(value))
		.map(|(name, value)| match value {
			Value::Bool(_) => (*name).to_owned(),
			Value::String(string) => format!(r#"{}="{}""#, name, escape_attribute(string)),
			other => format!(r#"{}="{}""#, name, escape_attribute(&other.to_string())),
		})
		.collect::<Vec<_>>()
		.join(" ")
}

#[must_use]
pub fn escape_attribute(value: &str) -> String {
	value.replace('&', "&amp;").replace('"', "&quot;")
}

#[must_use]
pub fn escape_text(value: &str) -> String {
	value.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
