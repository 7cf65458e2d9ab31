//! [`Host`] implementation on top of the browser DOM.
//!
//! DOM exceptions during mutations are logged with [`error!`] and otherwise ignored,
//! so a misbehaving page can't abort a morph half-way through an update.

use crate::{
	host::{Attribute, BoolProperty, Host, NodeKind, NS_XHTML, NS_XLINK, NS_XML},
	Error,
};
use std::borrow::Cow;
use tracing::{error, instrument, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlInputElement, HtmlOptionElement, HtmlSelectElement, HtmlTemplateElement, HtmlTextAreaElement, Node};

/// Renders a thrown [`JsValue`] for logs and [`Error::Host`].
fn describe(value: &JsValue) -> String {
	match value.dyn_ref::<js_sys::Error>() {
		Some(error) => String::from(error.message()),
		None => format!("{:?}", value),
	}
}

fn log_failure(operation: &str, result: Result<(), JsValue>) {
	if let Err(value) = result {
		error!("DOM operation `{}` failed: {}", operation, describe(&value));
	}
}

/// The browser [***Document***](https://developer.mozilla.org/en-US/docs/Web/API/Document) as [`Host`].
#[derive(Debug, Clone)]
pub struct WebHost {
	document: web_sys::Document,
}

impl WebHost {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self { document }
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}

	#[must_use]
	pub fn body(&self) -> Option<Node> {
		self.document.body().map(Into::into)
	}

	#[must_use]
	pub fn head(&self) -> Option<Node> {
		self.document.head().map(Into::into)
	}

	fn create_template(&self) -> Result<HtmlTemplateElement, Error> {
		self.document
			.create_element("template")
			.map_err(|value| Error::Host(describe(&value)))?
			.dyn_into::<HtmlTemplateElement>()
			.map_err(|element| Error::Host(format!("Expected `HtmlTemplateElement` but found {:?}", element)))
	}
}

fn qualified_name(namespace: Option<&str>, name: &str) -> String {
	match namespace {
		Some(NS_XLINK) => format!("xlink:{}", name),
		Some(NS_XML) => format!("xml:{}", name),
		_ => name.to_owned(),
	}
}

impl Host for WebHost {
	type Node = Node;

	fn kind(&self, node: &Node) -> NodeKind {
		match node.node_type() {
			Node::ELEMENT_NODE => NodeKind::Element,
			Node::TEXT_NODE | Node::CDATA_SECTION_NODE => NodeKind::Text,
			Node::DOCUMENT_NODE => NodeKind::Document,
			Node::DOCUMENT_FRAGMENT_NODE => NodeKind::DocumentFragment,
			Node::COMMENT_NODE => NodeKind::Comment,
			other => {
				warn!("Unexpected node type {}. Treating it as comment.", other);
				NodeKind::Comment
			}
		}
	}

	fn node_name(&self, node: &Node) -> Cow<'_, str> {
		Cow::Owned(node.node_name())
	}

	fn namespace_uri(&self, node: &Node) -> Option<Cow<'_, str>> {
		node.dyn_ref::<Element>().and_then(Element::namespace_uri).map(Cow::Owned)
	}

	fn is_same_node(&self, a: &Node, b: &Node) -> bool {
		a.is_same_node(Some(b))
	}

	fn parent_node(&self, node: &Node) -> Option<Node> {
		node.parent_node()
	}

	fn first_child(&self, node: &Node) -> Option<Node> {
		node.first_child()
	}

	fn next_sibling(&self, node: &Node) -> Option<Node> {
		node.next_sibling()
	}

	fn node_value(&self, node: &Node) -> Option<Cow<'_, str>> {
		match self.kind(node) {
			NodeKind::Text | NodeKind::Comment => node.node_value().map(Cow::Owned),
			_ => None,
		}
	}

	fn set_node_value(&mut self, node: &Node, value: &str) {
		node.set_node_value(Some(value));
	}

	fn attributes(&self, node: &Node) -> Vec<Attribute> {
		let element = match node.dyn_ref::<Element>() {
			Some(element) => element,
			None => return Vec::new(),
		};
		let attributes = element.attributes();
		(0..attributes.length())
			.filter_map(|i| attributes.item(i))
			.map(|attribute| Attribute { namespace: attribute.namespace_uri(), name: attribute.local_name(), value: attribute.value() })
			.collect()
	}

	fn get_attribute_ns(&self, node: &Node, namespace: Option<&str>, name: &str) -> Option<Cow<'_, str>> {
		let element = node.dyn_ref::<Element>()?;
		match namespace {
			Some(_) => element.get_attribute_ns(namespace, name),
			None => element.get_attribute(name),
		}
		.map(Cow::Owned)
	}

	fn set_attribute_ns(&mut self, node: &Node, namespace: Option<&str>, name: &str, value: &str) {
		match node.dyn_ref::<Element>() {
			Some(element) if namespace.is_some() => log_failure("setAttributeNS", element.set_attribute_ns(namespace, &qualified_name(namespace, name), value)),
			Some(element) => log_failure("setAttribute", element.set_attribute(name, value)),
			None => error!("Expected element to set attribute {:?} on but found {:?}", name, node),
		}
	}

	fn remove_attribute_ns(&mut self, node: &Node, namespace: Option<&str>, name: &str) {
		match node.dyn_ref::<Element>() {
			Some(element) if namespace.is_some() => log_failure("removeAttributeNS", element.remove_attribute_ns(namespace, name)),
			Some(element) => log_failure("removeAttribute", element.remove_attribute(name)),
			None => error!("Expected element to remove attribute {:?} from but found {:?}", name, node),
		}
	}

	fn bool_property(&self, node: &Node, property: BoolProperty) -> bool {
		match property {
			BoolProperty::Checked => node.dyn_ref::<HtmlInputElement>().map_or(false, HtmlInputElement::checked),
			BoolProperty::Selected => node.dyn_ref::<HtmlOptionElement>().map_or(false, HtmlOptionElement::selected),
			BoolProperty::Disabled => match node.dyn_ref::<HtmlInputElement>() {
				Some(input) => input.disabled(),
				None => node.dyn_ref::<Element>().map_or(false, |element| element.has_attribute("disabled")),
			},
		}
	}

	fn set_bool_property(&mut self, node: &Node, property: BoolProperty, value: bool) {
		match property {
			BoolProperty::Checked => match node.dyn_ref::<HtmlInputElement>() {
				Some(input) => input.set_checked(value),
				None => warn!("Expected `HtmlInputElement` but found {:?}", node),
			},
			BoolProperty::Selected => match node.dyn_ref::<HtmlOptionElement>() {
				Some(option) => option.set_selected(value),
				None => warn!("Expected `HtmlOptionElement` but found {:?}", node),
			},
			BoolProperty::Disabled => match node.dyn_ref::<HtmlInputElement>() {
				Some(input) => input.set_disabled(value),
				None if value => self.set_attribute_ns(node, None, "disabled", ""),
				None => self.remove_attribute_ns(node, None, "disabled"),
			},
		}
	}

	fn value(&self, node: &Node) -> String {
		if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
			input.value()
		} else if let Some(text_area) = node.dyn_ref::<HtmlTextAreaElement>() {
			text_area.value()
		} else if let Some(option) = node.dyn_ref::<HtmlOptionElement>() {
			option.value()
		} else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
			select.value()
		} else {
			node.dyn_ref::<Element>().and_then(|element| element.get_attribute("value")).unwrap_or_default()
		}
	}

	fn set_value(&mut self, node: &Node, value: &str) {
		if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
			input.set_value(value);
		} else if let Some(text_area) = node.dyn_ref::<HtmlTextAreaElement>() {
			text_area.set_value(value);
		} else if let Some(option) = node.dyn_ref::<HtmlOptionElement>() {
			option.set_value(value);
		} else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
			select.set_value(value);
		} else {
			self.set_attribute_ns(node, None, "value", value);
		}
	}

	fn set_selected_index(&mut self, node: &Node, index: i32) {
		match node.dyn_ref::<HtmlSelectElement>() {
			Some(select) => select.set_selected_index(index),
			None => warn!("Expected `HtmlSelectElement` but found {:?}", node),
		}
	}

	/// HTML elements go through `createElement` with the lower-cased name, since `createElementNS` would keep
	/// an upper-case `nodeName` as the local name. Only foreign elements are created with their namespace.
	#[instrument(skip(self))]
	fn create_element_ns(&mut self, name: &str, namespace: Option<&str>) -> Node {
		let created = match namespace {
			None | Some(NS_XHTML) => self.document.create_element(&name.to_ascii_lowercase()),
			Some(namespace) => self.document.create_element_ns(Some(namespace), name),
		};
		match created {
			Ok(element) => element.into(),
			Err(value) => {
				error!("Failed to create <{}>: {}. Substituting a comment.", name, describe(&value));
				self.document.create_comment(name).into()
			}
		}
	}

	fn append_child(&mut self, parent: &Node, child: &Node) {
		log_failure("appendChild", parent.append_child(child).map(drop));
	}

	fn insert_before(&mut self, parent: &Node, child: &Node, reference: Option<&Node>) {
		log_failure("insertBefore", parent.insert_before(child, reference).map(drop));
	}

	fn remove_child(&mut self, parent: &Node, child: &Node) {
		log_failure("removeChild", parent.remove_child(child).map(drop));
	}

	fn replace_child(&mut self, parent: &Node, new_child: &Node, old_child: &Node) {
		log_failure("replaceChild", parent.replace_child(new_child, old_child).map(drop));
	}

	#[instrument(skip(self, markup), fields(markup.len = markup.len()))]
	fn parse_fragment(&mut self, markup: &str) -> Result<Node, Error> {
		let template = self.create_template()?;
		template.set_inner_html(markup);
		Ok(template.content().into())
	}

	#[instrument(skip(self, markup), fields(markup.len = markup.len()))]
	fn parse_document(&mut self, markup: &str) -> Result<Node, Error> {
		let html = self.document.create_element("html").map_err(|value| Error::Host(describe(&value)))?;
		html.set_inner_html(markup);
		Ok(html.into())
	}

	fn inner_html(&self, node: &Node) -> String {
		match node.dyn_ref::<Element>() {
			Some(element) => element.inner_html(),
			None => node.text_content().unwrap_or_default(),
		}
	}
}
