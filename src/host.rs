//! The tree/document capability the morph engine and the widget runtime call into.
//!
//! A [`Host`] owns the actual nodes. The engine only ever holds cheap [`Host::Node`] handles
//! and asks the host to inspect or mutate them, which lets the same algorithm run against
//! the arena-backed [`memory::Document`](`crate::memory::Document`) natively and against the
//! browser DOM through [`web::WebHost`](`crate::web::WebHost`).

use crate::Error;
use core::fmt::Debug;
use std::borrow::Cow;

pub const NS_XHTML: &str = "http://www.w3.org/1999/xhtml";
pub const NS_SVG: &str = "http://www.w3.org/2000/svg";
pub const NS_XLINK: &str = "http://www.w3.org/1999/xlink";
pub const NS_XML: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Element,
	Text,
	Comment,
	DocumentFragment,
	Document,
}

/// A snapshot of one attribute. Namespaced attributes are addressed by their local name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	pub namespace: Option<String>,
	pub name: String,
	pub value: String,
}

/// Boolean element state that lives outside the attribute table once the user (or script) touched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolProperty {
	Checked,
	Disabled,
	Selected,
}
impl BoolProperty {
	/// The content attribute reflecting this property.
	#[must_use]
	pub fn attribute_name(self) -> &'static str {
		match self {
			BoolProperty::Checked => "checked",
			BoolProperty::Disabled => "disabled",
			BoolProperty::Selected => "selected",
		}
	}
}

/// Tree/document operations.
///
/// Element names follow the browser's `nodeName` convention: HTML elements report upper-case
/// names, foreign (SVG, MathML) elements keep their case. Attribute accessors take an optional
/// namespace and a local name.
///
/// Mutations are infallible from the caller's point of view. Hosts that can fail (the browser DOM
/// throws on hierarchy violations) log the failure and leave the tree as it was.
pub trait Host {
	type Node: Clone + Debug;

	fn kind(&self, node: &Self::Node) -> NodeKind;
	fn node_name(&self, node: &Self::Node) -> Cow<'_, str>;
	fn namespace_uri(&self, node: &Self::Node) -> Option<Cow<'_, str>>;
	fn is_same_node(&self, a: &Self::Node, b: &Self::Node) -> bool;

	/// Whether `node` was built programmatically rather than parsed or created by the document,
	/// in which case its tag name hasn't been normalized yet.
	fn is_virtual(&self, _node: &Self::Node) -> bool {
		false
	}

	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;
	fn first_child(&self, node: &Self::Node) -> Option<Self::Node>;
	fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

	/// Character data of text and comment nodes, [`None`] for everything else.
	fn node_value(&self, node: &Self::Node) -> Option<Cow<'_, str>>;
	fn set_node_value(&mut self, node: &Self::Node, value: &str);

	/// All attributes of an element, in document order. Empty for non-elements.
	fn attributes(&self, node: &Self::Node) -> Vec<Attribute>;
	fn get_attribute_ns(&self, node: &Self::Node, namespace: Option<&str>, name: &str) -> Option<Cow<'_, str>>;
	fn has_attribute_ns(&self, node: &Self::Node, namespace: Option<&str>, name: &str) -> bool {
		self.get_attribute_ns(node, namespace, name).is_some()
	}
	fn set_attribute_ns(&mut self, node: &Self::Node, namespace: Option<&str>, name: &str, value: &str);
	fn remove_attribute_ns(&mut self, node: &Self::Node, namespace: Option<&str>, name: &str);

	fn bool_property(&self, node: &Self::Node, property: BoolProperty) -> bool;
	fn set_bool_property(&mut self, node: &Self::Node, property: BoolProperty, value: bool);
	/// The `value` property of form controls. Falls back to the `value` attribute (or `""`) elsewhere.
	fn value(&self, node: &Self::Node) -> String;
	fn set_value(&mut self, node: &Self::Node, value: &str);
	fn set_selected_index(&mut self, node: &Self::Node, index: i32);

	fn create_element_ns(&mut self, name: &str, namespace: Option<&str>) -> Self::Node;
	fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);
	/// Moves `child` in front of `reference`, or to the end if `reference` is [`None`].
	fn insert_before(&mut self, parent: &Self::Node, child: &Self::Node, reference: Option<&Self::Node>);
	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);
	fn replace_child(&mut self, parent: &Self::Node, new_child: &Self::Node, old_child: &Self::Node);

	/// Turns a (possibly virtual) detached node into one that may enter the live document.
	fn materialize(&mut self, node: &Self::Node) -> Self::Node {
		node.clone()
	}

	/// Hands a detached tree that nothing refers to anymore back to the host.
	///
	/// Hosts with their own garbage collection can ignore this, which is what the default does.
	/// Handles into a released tree must not be used for anything but identity comparisons afterwards.
	fn release(&mut self, _node: &Self::Node) {}

	/// Parses `markup` into a detached ***DocumentFragment***.
	///
	/// # Errors
	///
	/// Iff the markup can't be parsed.
	fn parse_fragment(&mut self, markup: &str) -> Result<Self::Node, Error>;

	/// Parses `markup` as the content of a detached `html` element and returns that element.
	///
	/// # Errors
	///
	/// Iff the markup can't be parsed.
	fn parse_document(&mut self, markup: &str) -> Result<Self::Node, Error>;

	/// Serializes the children of `node`.
	fn inner_html(&self, node: &Self::Node) -> String;

	/// Collects the direct children of `node`.
	fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node> {
		let mut children = Vec::new();
		let mut current = self.first_child(node);
		while let Some(child) = current {
			current = self.next_sibling(&child);
			children.push(child);
		}
		children
	}

	/// Whether `node` is an element whose name equals `name`, ignoring ASCII case.
	fn is_element_named(&self, node: &Self::Node, name: &str) -> bool {
		self.kind(node) == NodeKind::Element && self.node_name(node).eq_ignore_ascii_case(name)
	}

	/// Finds the first descendant of `root` (in pre-order, excluding `root`) that satisfies `predicate`.
	fn find_descendant(&self, root: &Self::Node, predicate: &mut dyn FnMut(&Self, &Self::Node) -> bool) -> Option<Self::Node> {
		let mut current = self.first_child(root);
		while let Some(node) = current {
			if predicate(self, &node) {
				return Some(node);
			}
			if let Some(found) = self.find_descendant(&node, predicate) {
				return Some(found);
			}
			current = self.next_sibling(&node);
		}
		None
	}

	/// Removes all children of `node`.
	fn clear_children(&mut self, node: &Self::Node) {
		while let Some(child) = self.first_child(node) {
			self.remove_child(node, &child);
		}
	}
}
