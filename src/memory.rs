//! An arena-backed, in-memory document.
//!
//! Removing a node only detaches it, so [`NodeId`]s stay valid and can be compared for identity after a morph.
//! Detached trees nobody needs anymore (like parsed morph targets) are handed back through [`Host::release`],
//! which puts their slots on a free list. Every slot carries a generation, so a [`NodeId`] kept past its
//! release reads as an empty, detached fragment instead of aliasing whatever reuses the slot.

use crate::{
	host::{Attribute, BoolProperty, Host, NodeKind, NS_XHTML},
	markup, Error,
};
use std::borrow::Cow;
use tracing::{error, trace};

/// Handle of a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
	index: usize,
	generation: u32,
}

#[derive(Debug, Clone)]
enum Data {
	Element(Element),
	Text(String),
	Comment(String),
	Fragment,
	Document,
}

#[derive(Debug, Clone)]
struct Element {
	name: String,
	namespace: Option<String>,
	attributes: Vec<Attribute>,
	is_virtual: bool,
	// Form control state, [`None`] until touched.
	value: Option<String>,
	checked: Option<bool>,
	selected: Option<bool>,
	selected_index: Option<i32>,
}
impl Element {
	fn is_html(&self) -> bool {
		self.namespace.as_deref().map_or(true, |namespace| namespace == NS_XHTML)
	}

	fn position(&self, namespace: Option<&str>, name: &str) -> Option<usize> {
		let html_plain = namespace.is_none() && self.is_html();
		self.attributes.iter().position(|attribute| {
			attribute.namespace.as_deref() == namespace && if html_plain { attribute.name.eq_ignore_ascii_case(name) } else { attribute.name == name }
		})
	}

	fn attribute(&self, namespace: Option<&str>, name: &str) -> Option<&str> {
		self.position(namespace, name).map(|i| self.attributes[i].value.as_str())
	}
}

#[derive(Debug, Clone)]
struct Slot {
	generation: u32,
	data: Data,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

static RELEASED: Data = Data::Fragment;

/// Counts of mutations applied to nodes connected to the document.
///
/// Building and editing detached trees (like parsed morph targets) isn't counted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Mutations {
	pub attributes: usize,
	pub children: usize,
	pub values: usize,
	pub properties: usize,
}
impl Mutations {
	#[must_use]
	pub fn total(&self) -> usize {
		self.attributes + self.children + self.values + self.properties
	}
}

#[derive(Debug, Clone)]
pub struct Document {
	slots: Vec<Slot>,
	free: Vec<usize>,
	root: NodeId,
	html: NodeId,
	head: NodeId,
	body: NodeId,
	mutations: Mutations,
}
impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}
impl Document {
	/// Creates a document containing an empty `html` element with `head` and `body`.
	#[must_use]
	pub fn new() -> Self {
		let root = NodeId { index: 0, generation: 0 };
		let mut document = Self {
			slots: vec![Slot { generation: 0, data: Data::Document, parent: None, children: Vec::new() }],
			free: Vec::new(),
			root,
			html: root,
			head: root,
			body: root,
			mutations: Mutations::default(),
		};
		document.html = document.create_element("html");
		document.head = document.create_element("head");
		document.body = document.create_element("body");
		document.attach(document.root, document.html);
		document.attach(document.html, document.head);
		document.attach(document.html, document.body);
		document.mutations = Mutations::default();
		document
	}

	#[must_use]
	pub fn document_node(&self) -> NodeId {
		self.root
	}
	#[must_use]
	pub fn document_element(&self) -> NodeId {
		self.html
	}
	#[must_use]
	pub fn head(&self) -> NodeId {
		self.head
	}
	#[must_use]
	pub fn body(&self) -> NodeId {
		self.body
	}

	/// Number of node slots in use, released ones excluded.
	#[must_use]
	pub fn allocated(&self) -> usize {
		self.slots.len() - self.free.len()
	}

	fn push(&mut self, data: Data) -> NodeId {
		match self.free.pop() {
			Some(index) => {
				let slot = &mut self.slots[index];
				slot.data = data;
				NodeId { index, generation: slot.generation }
			}
			None => {
				let index = self.slots.len();
				self.slots.push(Slot { generation: 0, data, parent: None, children: Vec::new() });
				NodeId { index, generation: 0 }
			}
		}
	}

	fn slot(&self, node: NodeId) -> Option<&Slot> {
		self.slots.get(node.index).filter(|slot| slot.generation == node.generation)
	}

	fn slot_mut(&mut self, node: NodeId) -> Option<&mut Slot> {
		self.slots.get_mut(node.index).filter(|slot| slot.generation == node.generation)
	}

	fn data(&self, node: NodeId) -> &Data {
		self.slot(node).map_or(&RELEASED, |slot| &slot.data)
	}

	/// Frees `node` and everything below it. Its slots may be handed out again right away.
	fn free_subtree(&mut self, node: NodeId) {
		let mut stack = vec![node];
		while let Some(node) = stack.pop() {
			let slot = match self.slot_mut(node) {
				Some(slot) => slot,
				None => continue,
			};
			stack.append(&mut slot.children);
			slot.generation = slot.generation.wrapping_add(1);
			slot.data = Data::Fragment;
			slot.parent = None;
			self.free.push(node.index);
		}
	}

	pub(crate) fn new_element(&mut self, name: &str, namespace: Option<&str>, is_virtual: bool) -> NodeId {
		let html = namespace.map_or(true, |namespace| namespace == NS_XHTML);
		self.push(Data::Element(Element {
			name: if html && !is_virtual { name.to_ascii_uppercase() } else { name.to_owned() },
			namespace: Some(namespace.unwrap_or(NS_XHTML).to_owned()),
			attributes: Vec::new(),
			is_virtual,
			value: None,
			checked: None,
			selected: None,
			selected_index: None,
		}))
	}

	/// Creates a detached HTML element.
	pub fn create_element(&mut self, name: &str) -> NodeId {
		self.new_element(name, None, false)
	}

	/// Creates a detached, *virtual* HTML element that keeps `name` as written until it's materialized.
	pub fn build_element(&mut self, name: &str) -> NodeId {
		self.new_element(name, None, true)
	}

	pub fn create_text(&mut self, data: &str) -> NodeId {
		self.push(Data::Text(data.to_owned()))
	}

	pub fn create_comment(&mut self, data: &str) -> NodeId {
		self.push(Data::Comment(data.to_owned()))
	}

	pub fn create_fragment(&mut self) -> NodeId {
		self.push(Data::Fragment)
	}

	fn element(&self, node: NodeId) -> Option<&Element> {
		match self.data(node) {
			Data::Element(element) => Some(element),
			_ => None,
		}
	}

	fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
		match self.slot_mut(node).map(|slot| &mut slot.data) {
			Some(Data::Element(element)) => Some(element),
			_ => None,
		}
	}

	pub(crate) fn kind_of(&self, node: NodeId) -> NodeKind {
		match self.data(node) {
			Data::Element(_) => NodeKind::Element,
			Data::Text(_) => NodeKind::Text,
			Data::Comment(_) => NodeKind::Comment,
			Data::Fragment => NodeKind::DocumentFragment,
			Data::Document => NodeKind::Document,
		}
	}

	pub(crate) fn name_of(&self, node: NodeId) -> &str {
		match self.data(node) {
			Data::Element(element) => &element.name,
			Data::Text(_) => "#text",
			Data::Comment(_) => "#comment",
			Data::Fragment => "#document-fragment",
			Data::Document => "#document",
		}
	}

	pub(crate) fn namespace_of(&self, node: NodeId) -> Option<&str> {
		self.element(node).and_then(|element| element.namespace.as_deref())
	}

	pub(crate) fn data_of(&self, node: NodeId) -> Option<&str> {
		match self.data(node) {
			Data::Text(data) | Data::Comment(data) => Some(data),
			_ => None,
		}
	}

	pub(crate) fn attribute_list(&self, node: NodeId) -> &[Attribute] {
		self.element(node).map_or(&[], |element| &element.attributes)
	}

	/// Adds an attribute while building a detached tree.
	pub(crate) fn push_attribute(&mut self, node: NodeId, attribute: Attribute) {
		if let Some(element) = self.element_mut(node) {
			element.attributes.push(attribute);
		}
	}

	#[must_use]
	pub fn children(&self, node: NodeId) -> &[NodeId] {
		self.slot(node).map_or(&[][..], |slot| slot.children.as_slice())
	}

	#[must_use]
	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.slot(node).and_then(|slot| slot.parent)
	}

	/// The element children of `node`, skipping text and comments.
	#[must_use]
	pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
		self.children(node).iter().copied().filter(|&child| self.kind_of(child) == NodeKind::Element).collect()
	}

	#[must_use]
	pub fn first_element_child(&self, node: NodeId) -> Option<NodeId> {
		self.children(node).iter().copied().find(|&child| self.kind_of(child) == NodeKind::Element)
	}

	/// Whether `node` is `ancestor` or one of its descendants.
	#[must_use]
	pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
		let mut current = Some(node);
		while let Some(candidate) = current {
			if candidate == ancestor {
				return true;
			}
			current = self.parent(candidate);
		}
		false
	}

	#[must_use]
	pub fn is_connected(&self, node: NodeId) -> bool {
		self.contains(self.root, node)
	}

	/// Plain (non-namespaced) attribute lookup.
	#[must_use]
	pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
		self.element(node).and_then(|element| element.attribute(None, name))
	}

	pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
		self.set_attribute_ns(&node, None, name, value);
	}

	pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
		self.remove_attribute_ns(&node, None, name);
	}

	/// Concatenated text of all descendant text nodes.
	#[must_use]
	pub fn text_content(&self, node: NodeId) -> String {
		match self.data(node) {
			Data::Text(data) | Data::Comment(data) => data.clone(),
			_ => {
				let mut text = String::new();
				for &child in self.children(node) {
					if self.kind_of(child) != NodeKind::Comment {
						text.push_str(&self.text_content(child));
					}
				}
				text
			}
		}
	}

	/// Replaces the children of `node` with the parsed `markup`.
	///
	/// # Errors
	///
	/// Iff `markup` is malformed, in which case `node` is left as it was.
	pub fn set_inner_html(&mut self, node: NodeId, markup: &str) -> Result<(), Error> {
		let fragment = self.create_fragment();
		if let Err(error) = markup::parse_into(self, fragment, markup) {
			self.free_subtree(fragment);
			return Err(error);
		}
		self.clear_children(&node);
		for child in self.children(fragment).to_vec() {
			self.attach(node, child);
		}
		self.free_subtree(fragment);
		Ok(())
	}

	#[must_use]
	pub fn outer_html(&self, node: NodeId) -> String {
		let mut out = String::new();
		markup::serialize_node(self, node, &mut out);
		out
	}

	/// Finds the element with the given `id` attribute among the document's descendants.
	#[must_use]
	pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
		self.find_descendant(&self.root, &mut |document, node| document.attribute(*node, "id") == Some(id))
	}

	/// Finds the first descendant element of `root` whose name matches `name`, ignoring ASCII case,
	/// and that carries every attribute in `attributes` with the given value.
	#[must_use]
	pub fn query(&self, root: NodeId, name: &str, attributes: &[(&str, &str)]) -> Option<NodeId> {
		self.find_descendant(&root, &mut |document, node| {
			document.is_element_named(node, name) && attributes.iter().all(|&(attribute, value)| document.attribute(*node, attribute) == Some(value))
		})
	}

	/// The effective selected index of a `select` element.
	#[must_use]
	pub fn selected_index(&self, node: NodeId) -> i32 {
		let options: Vec<NodeId> = self.children(node).iter().copied().filter(|&child| self.is_element_named(&child, "option")).collect();
		if let Some(index) = self.element(node).and_then(|element| element.selected_index) {
			return index;
		}
		options
			.iter()
			.position(|&option| self.bool_property(&option, BoolProperty::Selected))
			.map_or(if options.is_empty() { -1 } else { 0 }, |index| i32::try_from(index).unwrap_or(i32::MAX))
	}

	#[must_use]
	pub fn mutations(&self) -> Mutations {
		self.mutations
	}

	pub fn reset_mutations(&mut self) {
		self.mutations = Mutations::default();
	}

	fn count(&mut self, node: NodeId, field: fn(&mut Mutations) -> &mut usize) {
		if self.is_connected(node) {
			*field(&mut self.mutations) += 1;
		}
	}

	fn detach(&mut self, child: NodeId) {
		if let Some(parent) = self.slot_mut(child).and_then(|slot| slot.parent.take()) {
			self.count(parent, |m| &mut m.children);
			if let Some(slot) = self.slot_mut(parent) {
				slot.children.retain(|&c| c != child);
			}
		}
	}

	/// Appends without hierarchy checks. Used while building trees.
	pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
		self.insert_at(parent, child, None);
	}

	fn insert_at(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
		if self.slot(parent).is_none() || self.slot(child).is_none() {
			return error!("Can't insert {:?} into {:?}: released node.", child, parent);
		}
		self.detach(child);
		if let Some(slot) = self.slot_mut(parent) {
			let index = reference.and_then(|reference| slot.children.iter().position(|&c| c == reference)).unwrap_or(slot.children.len());
			slot.children.insert(index, child);
		}
		if let Some(slot) = self.slot_mut(child) {
			slot.parent = Some(parent);
		}
		self.count(parent, |m| &mut m.children);
	}

	fn checked_insert(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
		if self.contains(child, parent) {
			return error!("Refusing to insert {:?} into its own descendant {:?}.", child, parent);
		}
		if let Some(reference) = reference {
			if self.parent(reference) != Some(parent) {
				return error!("Reference node {:?} is not a child of {:?}.", reference, parent);
			}
		}
		if reference == Some(child) {
			// Inserting a node before itself leaves it where it is.
			return;
		}
		if self.kind_of(child) == NodeKind::DocumentFragment {
			for grandchild in self.children(child).to_vec() {
				self.insert_at(parent, grandchild, reference);
			}
		} else {
			self.insert_at(parent, child, reference);
		}
	}

	fn set_virtual_recursive(&mut self, node: NodeId) {
		if let Some(element) = self.element_mut(node) {
			if element.is_virtual {
				element.is_virtual = false;
				if element.is_html() {
					element.name = element.name.to_ascii_uppercase();
				}
			}
		}
		for child in self.children(node).to_vec() {
			self.set_virtual_recursive(child);
		}
	}

	fn option_children(&self, node: NodeId) -> Vec<NodeId> {
		self.children(node).iter().copied().filter(|&child| self.is_element_named(&child, "option")).collect()
	}
}

impl Host for Document {
	type Node = NodeId;

	fn kind(&self, node: &NodeId) -> NodeKind {
		self.kind_of(*node)
	}

	fn node_name(&self, node: &NodeId) -> Cow<'_, str> {
		Cow::Borrowed(self.name_of(*node))
	}

	fn namespace_uri(&self, node: &NodeId) -> Option<Cow<'_, str>> {
		self.namespace_of(*node).map(Cow::Borrowed)
	}

	fn is_same_node(&self, a: &NodeId, b: &NodeId) -> bool {
		a == b
	}

	fn is_virtual(&self, node: &NodeId) -> bool {
		self.element(*node).map_or(false, |element| element.is_virtual)
	}

	fn parent_node(&self, node: &NodeId) -> Option<NodeId> {
		self.parent(*node)
	}

	fn first_child(&self, node: &NodeId) -> Option<NodeId> {
		self.children(*node).first().copied()
	}

	fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
		let parent = self.parent(*node)?;
		let siblings = self.children(parent);
		let index = siblings.iter().position(|c| c == node)?;
		siblings.get(index + 1).copied()
	}

	fn node_value(&self, node: &NodeId) -> Option<Cow<'_, str>> {
		self.data_of(*node).map(Cow::Borrowed)
	}

	fn set_node_value(&mut self, node: &NodeId, value: &str) {
		match self.slot_mut(*node).map(|slot| &mut slot.data) {
			Some(Data::Text(data) | Data::Comment(data)) => {
				*data = value.to_owned();
			}
			_ => return trace!("Ignoring node value on {:?}.", node),
		}
		self.count(*node, |m| &mut m.values);
	}

	fn attributes(&self, node: &NodeId) -> Vec<Attribute> {
		self.attribute_list(*node).to_vec()
	}

	fn get_attribute_ns(&self, node: &NodeId, namespace: Option<&str>, name: &str) -> Option<Cow<'_, str>> {
		self.element(*node).and_then(|element| element.attribute(namespace, name)).map(Cow::Borrowed)
	}

	fn set_attribute_ns(&mut self, node: &NodeId, namespace: Option<&str>, name: &str, value: &str) {
		let element = match self.element_mut(*node) {
			Some(element) => element,
			None => return error!("Tried to set attribute {:?} on non-element {:?}.", name, node),
		};
		match element.position(namespace, name) {
			Some(i) => element.attributes[i].value = value.to_owned(),
			None => {
				let name = if namespace.is_none() && element.is_html() { name.to_ascii_lowercase() } else { name.to_owned() };
				element.attributes.push(Attribute { namespace: namespace.map(str::to_owned), name, value: value.to_owned() });
			}
		}
		self.count(*node, |m| &mut m.attributes);
	}

	fn remove_attribute_ns(&mut self, node: &NodeId, namespace: Option<&str>, name: &str) {
		let removed = self.element_mut(*node).map_or(false, |element| match element.position(namespace, name) {
			Some(i) => {
				element.attributes.remove(i);
				true
			}
			None => false,
		});
		if removed {
			self.count(*node, |m| &mut m.attributes);
		}
	}

	fn bool_property(&self, node: &NodeId, property: BoolProperty) -> bool {
		let element = match self.element(*node) {
			Some(element) => element,
			None => return false,
		};
		let dirty = match property {
			BoolProperty::Checked => element.checked,
			BoolProperty::Selected => element.selected,
			BoolProperty::Disabled => None,
		};
		dirty.unwrap_or_else(|| element.attribute(None, property.attribute_name()).is_some())
	}

	fn set_bool_property(&mut self, node: &NodeId, property: BoolProperty, value: bool) {
		match property {
			BoolProperty::Disabled => {
				if value {
					self.set_attribute_ns(node, None, "disabled", "");
				} else {
					self.remove_attribute_ns(node, None, "disabled");
				}
			}
			BoolProperty::Checked | BoolProperty::Selected => {
				if let Some(element) = self.element_mut(*node) {
					if property == BoolProperty::Checked {
						element.checked = Some(value);
					} else {
						element.selected = Some(value);
					}
					self.count(*node, |m| &mut m.properties);
				}
			}
		}
	}

	fn value(&self, node: &NodeId) -> String {
		let element = match self.element(*node) {
			Some(element) => element,
			None => return String::new(),
		};
		if let Some(value) = &element.value {
			return value.clone();
		}
		match element.name.to_ascii_uppercase().as_str() {
			"TEXTAREA" => self.text_content(*node),
			"OPTION" => element.attribute(None, "value").map_or_else(|| self.text_content(*node), str::to_owned),
			_ => element.attribute(None, "value").unwrap_or_default().to_owned(),
		}
	}

	fn set_value(&mut self, node: &NodeId, value: &str) {
		if let Some(element) = self.element_mut(*node) {
			element.value = Some(value.to_owned());
			self.count(*node, |m| &mut m.properties);
		}
	}

	fn set_selected_index(&mut self, node: &NodeId, index: i32) {
		let options = self.option_children(*node);
		let in_range = usize::try_from(index).map_or(false, |index| index < options.len());
		if self.element(*node).is_none() || self.selected_index(*node) == if in_range { index } else { -1 } {
			return;
		}
		for (i, &option) in options.iter().enumerate() {
			if let Some(element) = self.element_mut(option) {
				element.selected = Some(in_range && usize::try_from(index).map_or(false, |index| index == i));
			}
		}
		if let Some(element) = self.element_mut(*node) {
			element.selected_index = Some(if in_range { index } else { -1 });
			self.count(*node, |m| &mut m.properties);
		}
	}

	fn create_element_ns(&mut self, name: &str, namespace: Option<&str>) -> NodeId {
		self.new_element(name, namespace, false)
	}

	fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
		self.checked_insert(*parent, *child, None);
	}

	fn insert_before(&mut self, parent: &NodeId, child: &NodeId, reference: Option<&NodeId>) {
		self.checked_insert(*parent, *child, reference.copied());
	}

	fn remove_child(&mut self, parent: &NodeId, child: &NodeId) {
		if self.parent(*child) != Some(*parent) {
			return error!("{:?} is not a child of {:?}.", child, parent);
		}
		self.detach(*child);
	}

	fn replace_child(&mut self, parent: &NodeId, new_child: &NodeId, old_child: &NodeId) {
		if self.parent(*old_child) != Some(*parent) {
			return error!("{:?} is not a child of {:?}.", old_child, parent);
		}
		if new_child == old_child {
			return;
		}
		self.checked_insert(*parent, *new_child, Some(*old_child));
		if self.parent(*new_child) == Some(*parent) || self.kind_of(*new_child) == NodeKind::DocumentFragment {
			self.detach(*old_child);
		}
	}

	fn materialize(&mut self, node: &NodeId) -> NodeId {
		self.set_virtual_recursive(*node);
		*node
	}

	fn parse_fragment(&mut self, markup: &str) -> Result<NodeId, Error> {
		let fragment = self.create_fragment();
		if let Err(error) = markup::parse_into(self, fragment, markup) {
			self.free_subtree(fragment);
			return Err(error);
		}
		Ok(fragment)
	}

	fn parse_document(&mut self, markup: &str) -> Result<NodeId, Error> {
		let fragment = self.parse_fragment(markup)?;
		let html = self.create_element("html");

		// An explicit `<html>` wrapper contributes its attributes and children.
		let significant: Vec<NodeId> = self
			.children(fragment)
			.iter()
			.copied()
			.filter(|&child| self.data_of(child).map_or(true, |data| self.kind_of(child) == NodeKind::Comment || !data.trim().is_empty()))
			.collect();
		let source = match significant.as_slice() {
			&[only] if self.is_element_named(&only, "html") => {
				for attribute in self.attribute_list(only).to_vec() {
					self.push_attribute(html, attribute);
				}
				only
			}
			_ => fragment,
		};
		for child in self.children(source).to_vec() {
			self.attach(html, child);
		}
		self.free_subtree(fragment);
		Ok(html)
	}

	/// Frees `node`'s tree if it's detached. The document's own structure is never released.
	fn release(&mut self, node: &NodeId) {
		if self.slot(*node).is_none() {
			return;
		}
		if self.parent(*node).is_some() || [self.root, self.html, self.head, self.body].contains(node) {
			return trace!(?node, "Not releasing a node that's still in use.");
		}
		self.free_subtree(*node);
	}

	fn inner_html(&self, node: &NodeId) -> String {
		let mut out = String::new();
		markup::serialize_children(self, *node, &mut out);
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parsed_html_names_are_upper_case_and_svg_keeps_case() {
		let mut document = Document::new();
		let body = document.body();
		document.set_inner_html(body, r#"<div><svg viewBox="0 0 1 1"><linearGradient/></svg></div>"#).unwrap();
		let div = document.first_element_child(body).unwrap();
		assert_eq!(document.node_name(&div), "DIV");
		let svg = document.first_element_child(div).unwrap();
		assert_eq!(document.node_name(&svg), "svg");
		assert_eq!(document.node_name(&document.first_element_child(svg).unwrap()), "linearGradient");
	}

	#[test]
	fn serializes_back() {
		let mut document = Document::new();
		let body = document.body();
		let markup = r#"<p class="a&amp;b">x &lt; y<br><!--c--></p><input value="v">"#;
		document.set_inner_html(body, markup).unwrap();
		assert_eq!(document.inner_html(&body), markup);
	}

	#[test]
	fn input_value_property_shadows_attribute() {
		let mut document = Document::new();
		let input = document.create_element("input");
		document.set_attribute(input, "value", "initial");
		assert_eq!(document.value(&input), "initial");
		document.set_value(&input, "typed");
		document.set_attribute(input, "value", "changed");
		assert_eq!(document.value(&input), "typed");
	}

	#[test]
	fn mutations_on_detached_nodes_are_not_counted() {
		let mut document = Document::new();
		let div = document.create_element("div");
		document.set_attribute(div, "class", "x");
		assert_eq!(document.mutations().total(), 0);
		let body = document.body();
		document.append_child(&body, &div);
		document.set_attribute(div, "class", "y");
		assert_eq!(document.mutations(), Mutations { attributes: 1, children: 1, values: 0, properties: 0 });
	}

	#[test]
	fn refuses_cycles() {
		let mut document = Document::new();
		let outer = document.create_element("div");
		let inner = document.create_element("div");
		document.append_child(&outer, &inner);
		document.append_child(&inner, &outer);
		assert_eq!(document.parent(outer), None);
	}

	#[test]
	fn released_slots_are_reused_and_old_handles_go_stale() {
		let mut document = Document::new();
		let allocated = document.allocated();
		let div = document.create_element("div");
		document.set_inner_html(div, "<p>a</p>").unwrap();
		let paragraph = document.children(div)[0];
		assert_eq!(document.allocated(), allocated + 3);
		let slots = document.slots.len();

		document.release(&div);
		assert_eq!(document.allocated(), allocated);
		assert_eq!(document.kind(&paragraph), NodeKind::DocumentFragment);
		assert_eq!(document.parent(paragraph), None);
		assert!(document.children(div).is_empty());

		let span = document.create_element("span");
		assert_eq!(document.slots.len(), slots);
		assert_ne!(span, div);
		assert_ne!(span, paragraph);
		assert_eq!(document.node_name(&span), "SPAN");
		assert_eq!(document.node_name(&div), "#document-fragment");
	}

	#[test]
	fn attached_nodes_are_not_released() {
		let mut document = Document::new();
		let body = document.body();
		document.set_inner_html(body, "<p>a</p>").unwrap();
		let paragraph = document.children(body)[0];

		document.release(&paragraph);
		document.release(&body);
		document.release(&document.document_node());

		assert!(document.is_connected(paragraph));
		assert_eq!(document.inner_html(&body), "<p>a</p>");
	}

	#[test]
	fn failed_parses_leave_nothing_behind() {
		let mut document = Document::new();
		let allocated = document.allocated();
		assert!(document.parse_fragment("<p class=\"x").is_err());
		assert_eq!(document.allocated(), allocated);
	}

	#[test]
	fn materialize_normalizes_virtual_names() {
		let mut document = Document::new();
		let virtual_element = document.build_element("span");
		assert!(document.is_virtual(&virtual_element));
		assert_eq!(document.node_name(&virtual_element), "span");
		document.materialize(&virtual_element);
		assert!(!document.is_virtual(&virtual_element));
		assert_eq!(document.node_name(&virtual_element), "SPAN");
	}
}
