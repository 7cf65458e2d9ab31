use super::{attributes, reflect::is_truthy, Component, Properties};
use core::any::Any;
use serde_json::{json, Value};

/// `b-button`: a `button`, or a link if `href` is set, around its content.
#[derive(Debug, Clone, Copy, Default)]
pub struct Button;

impl Button {
	pub const TAG: &'static str = "b-button";
}

impl Component for Button {
	fn tag_name(&self) -> &'static str {
		Self::TAG
	}

	fn reflected_properties(&self) -> Vec<(&'static str, Value)> {
		vec![("color", json!("primary")), ("type", json!("submit")), ("disabled", json!(false)), ("href", json!(false))]
	}

	fn template(&self, properties: &Properties) -> String {
		let href = properties.get("href").cloned().unwrap_or(Value::Null);
		let (tag, button_attributes) = if is_truthy(&href) {
			("a", attributes(&[("href", href)]))
		} else {
			("button", attributes(&[("type", properties.get("type").cloned().unwrap_or(Value::Null))]))
		};

		format!(
			"
	<{tag} {attributes}>
		<slot></slot>
	</{tag}>
",
			tag = tag,
			attributes = button_attributes
		)
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}
