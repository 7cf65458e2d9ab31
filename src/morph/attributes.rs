use crate::{
	host::{BoolProperty, Host, NodeKind},
	redact,
};
use tracing::{trace, trace_span};

/// Makes `live`'s attributes equal to `target`'s.
///
/// Additions and updates come first (last attribute to first), then removals.
pub fn sync_attributes<H: Host>(host: &mut H, live: &H::Node, target: &H::Node) {
	let span = trace_span!("sync_attributes", ?live);
	let _enter = span.enter();

	for attribute in host.attributes(target).into_iter().rev() {
		let namespace = attribute.namespace.as_deref();
		let unchanged = host.get_attribute_ns(live, namespace, &attribute.name).map_or(false, |current| current == attribute.value);
		if !unchanged {
			trace!(name = %attribute.name, value = %redact(&attribute.value), "Setting attribute.");
			host.set_attribute_ns(live, namespace, &attribute.name, &attribute.value);
		}
	}

	for attribute in host.attributes(live).into_iter().rev() {
		let namespace = attribute.namespace.as_deref();
		if !host.has_attribute_ns(target, namespace, &attribute.name) {
			trace!(name = %attribute.name, "Removing attribute.");
			host.remove_attribute_ns(live, namespace, &attribute.name);
		}
	}
}

/// Form controls whose live state isn't fully described by their attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialElement {
	Option,
	Input,
	TextArea,
	Select,
}

impl SpecialElement {
	#[must_use]
	pub fn for_tag(name: &str) -> Option<Self> {
		match name.to_ascii_uppercase().as_str() {
			"OPTION" => Some(Self::Option),
			"INPUT" => Some(Self::Input),
			"TEXTAREA" => Some(Self::TextArea),
			"SELECT" => Some(Self::Select),
			_ => None,
		}
	}

	pub fn for_node<H: Host>(host: &H, node: &H::Node) -> Option<Self> {
		if host.kind(node) == NodeKind::Element {
			Self::for_tag(&host.node_name(node))
		} else {
			None
		}
	}

	/// Whether the engine leaves this element's children to [`SpecialElement::sync`].
	#[must_use]
	pub fn skips_children(self) -> bool {
		self == Self::TextArea
	}

	/// Brings `live`'s properties in line with `target`. Runs after the children were morphed.
	pub fn sync<H: Host>(self, host: &mut H, live: &H::Node, target: &H::Node) {
		let span = trace_span!("SpecialElement::sync", element = ?self);
		let _enter = span.enter();

		match self {
			Self::Option => sync_bool_property(host, live, target, BoolProperty::Selected),
			Self::Input => {
				sync_bool_property(host, live, target, BoolProperty::Checked);
				sync_bool_property(host, live, target, BoolProperty::Disabled);
				let value = host.value(target);
				if host.value(live) != value {
					host.set_value(live, &value);
				}
				if !host.has_attribute_ns(target, None, "value") {
					host.remove_attribute_ns(live, None, "value");
				}
			}
			Self::TextArea => {
				let value = host.value(target);
				if host.value(live) != value {
					host.set_value(live, &value);
				}
				if let Some(first_child) = host.first_child(live) {
					let old = host.node_value(&first_child).map(|old| old.into_owned()).unwrap_or_default();
					let placeholder = host.get_attribute_ns(live, None, "placeholder").map(|p| p.into_owned()).unwrap_or_default();
					if old == value || (value.is_empty() && old == placeholder) {
						return;
					}
					host.set_node_value(&first_child, &value);
				}
			}
			Self::Select => {
				if host.has_attribute_ns(target, None, "multiple") {
					return;
				}
				let index = host
					.child_nodes(target)
					.iter()
					.filter(|child| host.is_element_named(child, "option"))
					.position(|option| host.has_attribute_ns(option, None, "selected"))
					.unwrap_or(0);
				host.set_selected_index(live, i32::try_from(index).unwrap_or(i32::MAX));
			}
		}
	}
}

/// Copies a boolean property from `target` and reflects it into `live`'s attribute.
fn sync_bool_property<H: Host>(host: &mut H, live: &H::Node, target: &H::Node, property: BoolProperty) {
	let value = host.bool_property(target, property);
	if host.bool_property(live, property) != value {
		host.set_bool_property(live, property, value);
		if value {
			host.set_attribute_ns(live, None, property.attribute_name(), "");
		} else {
			host.remove_attribute_ns(live, None, property.attribute_name());
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::Document;

	#[test]
	fn additions_updates_and_removals() {
		let mut document = Document::new();
		let live = document.create_element("div");
		document.set_attribute(live, "class", "x");
		document.set_attribute(live, "title", "gone");
		let target = document.create_element("div");
		document.set_attribute(target, "class", "y");
		document.set_attribute(target, "lang", "en");

		sync_attributes(&mut document, &live, &target);
		assert_eq!(document.attribute(live, "class"), Some("y"));
		assert_eq!(document.attribute(live, "lang"), Some("en"));
		assert_eq!(document.attribute(live, "title"), None);
	}

	#[test]
	fn namespaced_attributes_are_addressed_by_local_name() {
		let mut document = Document::new();
		let body = document.body();
		document.set_inner_html(body, r##"<svg><use xlink:href="#a"/></svg><svg><use xlink:href="#b"/></svg>"##).unwrap();
		let svgs = document.element_children(body);
		let live = document.first_element_child(svgs[0]).unwrap();
		let target = document.first_element_child(svgs[1]).unwrap();

		sync_attributes(&mut document, &live, &target);
		assert_eq!(document.get_attribute_ns(&live, Some(crate::host::NS_XLINK), "href").as_deref(), Some("#b"));
	}

	#[test]
	fn select_index_counts_options_only() {
		let mut document = Document::new();
		let body = document.body();
		document.set_inner_html(body, r#"<select><option>a</option><option>b</option></select><select><!--x--><option>a</option><option selected>b</option></select>"#).unwrap();
		let selects = document.element_children(body);
		SpecialElement::Select.sync(&mut document, &selects[0], &selects[1]);
		assert_eq!(document.selected_index(selects[0]), 1);
	}

	#[test]
	fn textarea_keeps_placeholder_text() {
		let mut document = Document::new();
		let body = document.body();
		document.set_inner_html(body, r#"<textarea placeholder="hint">hint</textarea><textarea></textarea>"#).unwrap();
		let areas = document.element_children(body);
		SpecialElement::TextArea.sync(&mut document, &areas[0], &areas[1]);
		assert_eq!(document.text_content(areas[0]), "hint");
		assert_eq!(document.value(&areas[0]), "");
	}
}
