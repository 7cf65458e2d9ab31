use super::{
	attributes,
	reflect::{self, display, is_truthy, Reflection},
	Blocks, Component, Properties,
};
use crate::{host::Host, keycode};
use core::any::Any;
use serde_json::{json, Value};

/// `b-input-text`: a text input with a bottom border, an optional label and an error state.
///
/// The widget's `value` attribute mirrors what was typed, so it's only present while the input isn't empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct Input;

impl Input {
	pub const TAG: &'static str = "b-input-text";

	/// Handles a key release in the inner `input` (`target`).
	///
	/// Anything but Enter clears `error` and copies the input's current value into the `value` attribute.
	pub fn handle_key_up<H: Host>(blocks: &mut Blocks<H>, host: &mut H, element: &H::Node, target: &H::Node, key_code: u32) {
		if keycode::name(key_code) == Some("enter") {
			return;
		}
		blocks.set_attribute(host, element, "error", None);
		let value = host.value(target);
		blocks.set_attribute(host, element, "value", Some(&value).filter(|value| !value.is_empty()).map(String::as_str));
	}
}

impl Component for Input {
	fn tag_name(&self) -> &'static str {
		Self::TAG
	}

	fn reflected_properties(&self) -> Vec<(&'static str, Value)> {
		vec![
			("label", json!(false)),
			("value", json!(false)),
			("type", json!("text")),
			("placeholder", json!(false)),
			("error", json!(false)),
			("name", json!(false)),
		]
	}

	fn template(&self, properties: &Properties) -> String {
		let property = |name: &str| properties.get(name).cloned().unwrap_or(Value::Null);
		let label = property("label");
		let label = if is_truthy(&label) { format!("<b-input-text--label>{}</b-input-text--label>", super::escape_text(&display(&label))) } else { String::new() };
		let input_attributes = attributes(&[("value", property("value")), ("type", property("type")), ("placeholder", property("placeholder")), ("name", property("name"))]);

		format!(
			"
	<input {} />

	<b-input-text--border></b-input-text--border>

	{}
",
			input_attributes, label
		)
	}

	fn reflect_property(&self, name: &str, value: &Value) -> Reflection {
		match name {
			"value" if is_truthy(value) => Reflection::Set(display(value)),
			"value" => Reflection::Remove,
			_ => reflect::to_attribute(value),
		}
	}

	fn read_property(&self, name: &str, attribute: Option<&str>) -> Value {
		match name {
			"value" => attribute.filter(|value| !value.is_empty()).map_or(Value::Bool(false), |value| Value::String(value.to_owned())),
			_ => reflect::from_attribute(attribute),
		}
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}
