//! In-place reconciliation of a live tree against a target tree.
//!
//! [`morph`] walks both trees in lockstep and patches the live one with as few mutations as it can find cheaply:
//! compatible nodes are updated where they are, keyed elements are matched by key wherever they live under the root,
//! and only what can't be matched is discarded or added.
//!
//! ```
//! use block_dom::{memory::Document, morph::{morph, MorphOptions, Target}};
//!
//! let mut document = Document::new();
//! let list = document.create_element("ul");
//! document.set_inner_html(list, r#"<li id="a">A</li><li id="b">B</li>"#).unwrap();
//! let b = document.children(list)[1];
//!
//! morph(&mut document, &list, Target::Markup(r#"<ul><li id="b">B!</li><li id="a">A</li></ul>"#), MorphOptions::new()).unwrap();
//! assert_eq!(document.children(list)[0], b);
//! assert_eq!(document.inner_html(&list), r#"<li id="b">B!</li><li id="a">A</li>"#);
//! # use block_dom::host::Host;
//! ```

mod attributes;
mod compare;
mod index;
mod options;

pub use attributes::{sync_attributes, SpecialElement};
pub use compare::same_kind;
pub use index::KeyedIndex;
pub use options::{AttributeKey, Flow, IdKey, KeyExtractor, MorphHooks, MorphOptions, NoHooks, NodeAdded};

use crate::{
	host::{Host, NodeKind},
	redact, Error,
};
use tracing::{instrument, trace, trace_span, warn};

/// What to morph the live tree into.
#[derive(Debug, Clone)]
pub enum Target<'a, N> {
	/// Parsed through the host first. Surrounding whitespace is ignored.
	Markup(&'a str),
	/// A detached node. A ***DocumentFragment*** stands for its first element child.
	Node(N),
}

/// Morphs `live` into `target` and returns the resulting root.
///
/// The result is `live` itself unless the roots were incompatible (and `children_only` is off),
/// in which case a new node took `live`'s place in its parent.
///
/// A markup target is parsed into a scratch tree that's [released](`Host::release`) once the morph is done.
/// Live nodes that were discarded are not released, since the caller may still hold them.
///
/// # Errors
///
/// Iff `target` is markup that fails to parse, or that contains no nodes at all.
/// The live tree is untouched in that case.
#[instrument(skip(host, target, options), fields(children_only = options.children_only))]
pub fn morph<H: Host, O: MorphHooks<H>, K: KeyExtractor<H>>(host: &mut H, live: &H::Node, target: Target<'_, H::Node>, options: MorphOptions<O, K>) -> Result<H::Node, Error> {
	let live = match host.kind(live) {
		NodeKind::Document => host.child_nodes(live).into_iter().find(|child| host.kind(child) == NodeKind::Element).unwrap_or_else(|| live.clone()),
		_ => live.clone(),
	};
	let (scratch, target) = match target {
		Target::Markup(markup) => {
			let (scratch, target) = parse_target(host, &live, markup)?;
			(Some(scratch), target)
		}
		Target::Node(node) if host.kind(&node) == NodeKind::DocumentFragment => {
			(None, host.child_nodes(&node).into_iter().find(|child| host.kind(child) == NodeKind::Element).ok_or(Error::EmptyMarkup)?)
		}
		Target::Node(node) => (None, node),
	};

	let MorphOptions { children_only, hooks, key } = options;
	let index = KeyedIndex::build(&*host, &live, &key);
	trace!("Indexed {} keyed node(s).", index.len());
	let morphed = {
		let mut morpher = Morpher { host: &mut *host, hooks, keys: key, index, scratch: scratch.is_some() };
		morpher.morph_root(&live, &target, children_only)
	};
	if let Some(scratch) = scratch {
		host.release(&scratch);
	}
	Ok(morphed)
}

/// Returns the detached container of the parsed tree along with the target root.
fn parse_target<H: Host>(host: &mut H, live: &H::Node, markup: &str) -> Result<(H::Node, H::Node), Error> {
	if host.is_element_named(live, "html") {
		let html = host.parse_document(markup)?;
		return Ok((html.clone(), html));
	}
	let fragment = host.parse_fragment(markup.trim())?;
	match host.first_child(&fragment) {
		Some(target) => Ok((fragment, target)),
		None => {
			host.release(&fragment);
			Err(Error::EmptyMarkup)
		}
	}
}

struct Morpher<'a, H: Host, O, K> {
	host: &'a mut H,
	hooks: O,
	keys: K,
	index: KeyedIndex<H::Node>,
	/// Whether target nodes belong to a parsed tree that's released afterwards.
	scratch: bool,
}

impl<'a, H: Host, O: MorphHooks<H>, K: KeyExtractor<H>> Morpher<'a, H, O, K> {
	fn key(&self, node: &H::Node) -> Option<String> {
		self.keys.key(&*self.host, node).filter(|key| !key.is_empty())
	}

	fn same_kind(&self, live: &H::Node, target: &H::Node) -> bool {
		same_kind(&*self.host, live, target)
	}

	fn morph_root(&mut self, from: &H::Node, to: &H::Node, children_only: bool) -> H::Node {
		let mut morphed = from.clone();
		let mut became_target = false;

		if !children_only {
			let from_kind = self.host.kind(from);
			let to_kind = self.host.kind(to);
			match from_kind {
				NodeKind::Element if to_kind == NodeKind::Element => {
					if !self.same_kind(from, to) {
						trace!("Incompatible root elements. Recreating the root.");
						self.hooks.after_node_discarded(self.host, from);
						let name = self.host.node_name(to).into_owned();
						let namespace = self.host.namespace_uri(to).map(|namespace| namespace.into_owned());
						let element = self.host.create_element_ns(&name, namespace.as_deref());
						while let Some(child) = self.host.first_child(from) {
							self.host.append_child(&element, &child);
						}
						morphed = element;
					}
				}
				NodeKind::Text | NodeKind::Comment if to_kind == from_kind => {
					let value = self.host.node_value(to).map(|value| value.into_owned()).unwrap_or_default();
					if self.host.node_value(from).map_or(true, |current| current != value) {
						trace!(value = %redact(&value), "Patching root character data.");
						self.host.set_node_value(from, &value);
					}
					return from.clone();
				}
				NodeKind::Element | NodeKind::Text | NodeKind::Comment => {
					morphed = to.clone();
					became_target = true;
				}
				NodeKind::DocumentFragment | NodeKind::Document => (),
			}
		}

		if became_target {
			self.hooks.after_node_discarded(self.host, from);
		} else {
			if self.host.is_same_node(to, &morphed) {
				return morphed;
			}
			self.morph_element(&morphed, to, children_only);

			let leftovers = self.index.finish();
			if !leftovers.is_empty() {
				trace!("Discarding {} unmatched keyed node(s).", leftovers.len());
			}
			for node in leftovers {
				let parent = self.host.parent_node(&node);
				self.remove_node(&node, parent.as_ref(), false);
			}
		}

		if !children_only && !self.host.is_same_node(&morphed, from) {
			if let Some(parent) = self.host.parent_node(from) {
				morphed = self.host.materialize(&morphed);
				self.host.replace_child(&parent, &morphed, from);
			}
		}
		morphed
	}

	fn morph_element(&mut self, live: &H::Node, target: &H::Node, children_only: bool) {
		let span = trace_span!("morph_element", ?live);
		let _enter = span.enter();

		for key in [self.key(target), self.key(live)].into_iter().flatten() {
			self.index.take(&key);
		}
		if self.host.is_same_node(live, target) {
			return;
		}

		if !children_only {
			if self.hooks.before_element_updated(self.host, live, target) == Flow::Skip {
				return trace!("Element update skipped by hook.");
			}
			sync_attributes(self.host, live, target);
			self.hooks.after_element_updated(self.host, live);
			if self.hooks.before_children_updated(self.host, live, target) == Flow::Skip {
				return trace!("Children update skipped by hook.");
			}
		}

		let special = SpecialElement::for_node(&*self.host, live);
		if !special.map_or(false, SpecialElement::skips_children) {
			self.morph_children(live, target);
		}
		if let Some(special) = special {
			special.sync(self.host, live, target);
		}
	}

	fn morph_children(&mut self, from_parent: &H::Node, to_parent: &H::Node) {
		let mut to_child = self.host.first_child(to_parent);
		let mut from_child = self.host.first_child(from_parent);

		'targets: while let Some(to_node) = to_child {
			let to_next = self.host.next_sibling(&to_node);
			let to_key = self.key(&to_node);

			while let Some(mut from_node) = from_child.clone() {
				let from_next = self.host.next_sibling(&from_node);
				if self.host.is_same_node(&to_node, &from_node) {
					to_child = to_next;
					from_child = from_next;
					continue 'targets;
				}

				let mut from_key = self.key(&from_node);
				let kind = self.host.kind(&from_node);
				let mut compatible = false;
				if kind == self.host.kind(&to_node) {
					match kind {
						NodeKind::Element => {
							let mut mismatch = false;
							if let Some(to_key) = &to_key {
								if from_key.as_ref() != Some(to_key) {
									match self.index.get(to_key).cloned() {
										Some(matching) if from_next.as_ref().map_or(false, |next| self.host.is_same_node(next, &matching)) => {
											// Exactly one node is in the way. It's discarded below, then the match comes up next.
											mismatch = true;
										}
										Some(matching) => {
											trace!(key = %to_key, "Relocating keyed element.");
											self.host.insert_before(from_parent, &matching, Some(&from_node));
											match from_key {
												Some(from_key) => self.index.defer(from_key),
												None => self.remove_node(&from_node, Some(from_parent), true),
											}
											from_node = matching;
											from_key = self.key(&from_node);
										}
										None => mismatch = true,
									}
								}
							} else if from_key.is_some() {
								mismatch = true;
							}

							compatible = !mismatch && self.same_kind(&from_node, &to_node);
							if compatible {
								self.morph_element(&from_node, &to_node, false);
							}
						}
						NodeKind::Text | NodeKind::Comment => {
							compatible = true;
							let value = self.host.node_value(&to_node).map(|value| value.into_owned()).unwrap_or_default();
							if self.host.node_value(&from_node).map_or(true, |current| current != value) {
								trace!(value = %redact(&value), "Patching character data.");
								self.host.set_node_value(&from_node, &value);
							}
						}
						NodeKind::DocumentFragment | NodeKind::Document => warn!("Expected element or character data among children but found {:?}.", kind),
					}
				}

				if compatible {
					to_child = to_next;
					from_child = from_next;
					continue 'targets;
				}

				match from_key {
					Some(from_key) => self.index.defer(from_key),
					None => self.remove_node(&from_node, Some(from_parent), true),
				}
				from_child = from_next;
			}

			// Live children are exhausted.
			let matching = to_key.as_ref().and_then(|key| self.index.get(key).cloned()).filter(|matching| self.same_kind(matching, &to_node));
			if let Some(matching) = matching {
				trace!("Moving keyed element from elsewhere in the tree.");
				self.host.append_child(from_parent, &matching);
				self.morph_element(&matching, &to_node, false);
			} else {
				match self.hooks.before_node_added(self.host, &to_node) {
					NodeAdded::Skip => trace!("Node addition skipped by hook."),
					NodeAdded::Continue => self.add_node(from_parent, &to_node),
					NodeAdded::Replace(replacement) => self.add_node(from_parent, &replacement),
				}
			}
			to_child = to_next;
		}

		// Surplus live children.
		while let Some(from_node) = from_child {
			from_child = self.host.next_sibling(&from_node);
			match self.key(&from_node) {
				Some(from_key) => self.index.defer(from_key),
				None => self.remove_node(&from_node, Some(from_parent), true),
			}
		}
	}

	fn add_node(&mut self, parent: &H::Node, node: &H::Node) {
		let node = self.host.materialize(node);
		self.host.append_child(parent, &node);
		self.handle_node_added(&node);
	}

	/// Notifies about `node` and its descendants, letting keyed descendants steal their unmatched live counterparts.
	fn handle_node_added(&mut self, node: &H::Node) {
		self.hooks.after_node_added(self.host, node);

		let mut current = self.host.first_child(node);
		while let Some(child) = current {
			current = self.host.next_sibling(&child);
			let unmatched = self.key(&child).and_then(|key| self.index.get(&key).cloned()).filter(|unmatched| self.same_kind(unmatched, &child));
			match unmatched {
				Some(unmatched) => {
					self.host.replace_child(node, &unmatched, &child);
					self.morph_element(&unmatched, &child, false);
					if self.scratch {
						self.host.release(&child);
					}
				}
				None => self.handle_node_added(&child),
			}
		}
	}

	fn remove_node(&mut self, node: &H::Node, parent: Option<&H::Node>, skip_keyed: bool) {
		if self.hooks.before_node_discarded(self.host, node) == Flow::Skip {
			return trace!(?node, "Node discard vetoed by hook.");
		}
		if let Some(parent) = parent {
			self.host.remove_child(parent, node);
		}
		self.hooks.after_node_discarded(self.host, node);
		self.walk_discarded_children(node, skip_keyed);
	}

	fn walk_discarded_children(&mut self, node: &H::Node, skip_keyed: bool) {
		if self.host.kind(node) != NodeKind::Element {
			return;
		}
		let mut current = self.host.first_child(node);
		while let Some(child) = current {
			match self.key(&child).filter(|_| skip_keyed) {
				Some(key) => self.index.defer(key),
				None => {
					self.hooks.after_node_discarded(self.host, &child);
					self.walk_discarded_children(&child, skip_keyed);
				}
			}
			current = self.host.next_sibling(&child);
		}
	}
}
