use super::{Blocks, Component, Config, Properties};
use crate::{
	host::{BoolProperty, Host},
	query, Error,
};
use core::any::Any;
use serde_json::{json, Value};

const TEMPLATE: &str = "
	<form>
		<slot></slot>
	</form>
";

/// `b-form`: a `form` around its content that submits by navigating to `action` with the form data as query.
#[derive(Debug, Clone)]
pub struct Form {
	action: String,
}

impl Form {
	pub const TAG: &'static str = "b-form";

	#[must_use]
	pub fn new(config: &Config) -> Self {
		Self { action: config.location_path.clone() }
	}

	/// Serializes the form and returns the URL to navigate to.
	///
	/// A plain `b-form` accepts any data. [`ContactForm`](`super::ContactForm`) validates before saving.
	///
	/// # Errors
	///
	/// Iff `element` isn't a mounted widget.
	pub fn submit<H: Host>(blocks: &Blocks<H>, host: &H, element: &H::Node) -> Result<String, Error> {
		let data = serialize(host, element);
		Self::save(blocks, host, element, &data)
	}

	/// # Errors
	///
	/// Iff `element` isn't a mounted widget.
	pub fn save<H: Host>(blocks: &Blocks<H>, host: &H, element: &H::Node, data: &Properties) -> Result<String, Error> {
		let action = blocks.property(host, element, "action")?;
		Ok(format!("{}?{}", super::reflect::display(&action), query::stringify(data)))
	}
}

impl Component for Form {
	fn tag_name(&self) -> &'static str {
		Self::TAG
	}

	fn reflected_properties(&self) -> Vec<(&'static str, Value)> {
		vec![("action", json!(self.action))]
	}

	fn template(&self, _properties: &Properties) -> String {
		TEMPLATE.to_owned()
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}

/// Collects the values of named `input` and `textarea` descendants of `root`.
///
/// Radio groups yield the first checked value or `false`, checkboxes their checked state,
/// and everything else its current value.
pub fn serialize<H: Host>(host: &H, root: &H::Node) -> Properties {
	let mut data = Properties::new();
	host.find_descendant(root, &mut |host, node| {
		if !(host.is_element_named(node, "input") || host.is_element_named(node, "textarea")) {
			return false;
		}
		let name = match host.get_attribute_ns(node, None, "name") {
			Some(name) => name.into_owned(),
			None => return false,
		};
		let kind = if host.is_element_named(node, "textarea") {
			"textarea".to_owned()
		} else {
			host.get_attribute_ns(node, None, "type").map_or_else(|| "text".to_owned(), |kind| kind.to_ascii_lowercase())
		};

		match kind.as_str() {
			"radio" => {
				if matches!(data.get(&name), None | Some(Value::Bool(false))) {
					let value = if host.bool_property(node, BoolProperty::Checked) { Value::String(host.value(node)) } else { Value::Bool(false) };
					data.insert(name, value);
				}
			}
			"checkbox" => {
				data.insert(name, Value::Bool(host.bool_property(node, BoolProperty::Checked)));
			}
			_ => {
				data.insert(name, Value::String(host.value(node)));
			}
		}
		false
	});
	data
}
