use crate::host::{Host, NodeKind};

/// Whether the engine should proceed past a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
	Continue,
	Skip,
}

/// Outcome of [`MorphHooks::before_node_added`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeAdded<N> {
	/// Add the target node as is.
	Continue,
	/// Drop the target node. Nothing is added in its place.
	Skip,
	/// Add this node instead.
	Replace(N),
}

/// Observation and veto points of a morph.
///
/// Every method defaults to doing nothing (and continuing).
/// Hooks only get shared access to the host, so they can't re-enter the tree they are called from.
/// Collect whatever should happen in response and apply it once [`morph`](`super::morph`) returns.
///
/// There is no isolation: a panicking hook leaves the live tree partially patched.
#[allow(unused_variables)]
pub trait MorphHooks<H: Host> {
	fn before_node_added(&mut self, host: &H, node: &H::Node) -> NodeAdded<H::Node> {
		NodeAdded::Continue
	}

	/// Called once for each added node, including the descendants of added nodes.
	fn after_node_added(&mut self, host: &H, node: &H::Node) {}

	/// Called before a matched element pair is patched. [`Flow::Skip`] leaves `live` untouched.
	fn before_element_updated(&mut self, host: &H, live: &H::Node, target: &H::Node) -> Flow {
		Flow::Continue
	}

	/// Called for every matched element once its attributes were synchronized, whether or not anything changed.
	/// An identical morph reports each matched element here, so this is no change signal.
	fn after_element_updated(&mut self, host: &H, live: &H::Node) {}

	/// [`Flow::Skip`] keeps `node` in the live tree.
	fn before_node_discarded(&mut self, host: &H, node: &H::Node) -> Flow {
		Flow::Continue
	}

	/// Called for each discarded node, then for its descendants. Keyed descendants are reported only if
	/// they aren't matched elsewhere by the end of the morph.
	fn after_node_discarded(&mut self, host: &H, node: &H::Node) {}

	/// Called after `live`'s attributes were synchronized. [`Flow::Skip`] leaves its children (and form state) alone.
	fn before_children_updated(&mut self, host: &H, live: &H::Node, target: &H::Node) -> Flow {
		Flow::Continue
	}
}

impl<H: Host, T: MorphHooks<H> + ?Sized> MorphHooks<H> for &mut T {
	fn before_node_added(&mut self, host: &H, node: &H::Node) -> NodeAdded<H::Node> {
		(**self).before_node_added(host, node)
	}
	fn after_node_added(&mut self, host: &H, node: &H::Node) {
		(**self).after_node_added(host, node);
	}
	fn before_element_updated(&mut self, host: &H, live: &H::Node, target: &H::Node) -> Flow {
		(**self).before_element_updated(host, live, target)
	}
	fn after_element_updated(&mut self, host: &H, live: &H::Node) {
		(**self).after_element_updated(host, live);
	}
	fn before_node_discarded(&mut self, host: &H, node: &H::Node) -> Flow {
		(**self).before_node_discarded(host, node)
	}
	fn after_node_discarded(&mut self, host: &H, node: &H::Node) {
		(**self).after_node_discarded(host, node);
	}
	fn before_children_updated(&mut self, host: &H, live: &H::Node, target: &H::Node) -> Flow {
		(**self).before_children_updated(host, live, target)
	}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoHooks;
impl<H: Host> MorphHooks<H> for NoHooks {}

/// Extracts the matching key of a node. [`None`] and `""` both mean "unkeyed".
pub trait KeyExtractor<H: Host> {
	fn key(&self, host: &H, node: &H::Node) -> Option<String>;
}

impl<H: Host, F: Fn(&H, &H::Node) -> Option<String>> KeyExtractor<H> for F {
	fn key(&self, host: &H, node: &H::Node) -> Option<String> {
		self(host, node)
	}
}

/// Keys elements by their `id` attribute.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IdKey;
impl<H: Host> KeyExtractor<H> for IdKey {
	fn key(&self, host: &H, node: &H::Node) -> Option<String> {
		attribute_key(host, node, "id")
	}
}

/// Keys elements by an arbitrary attribute, like `data-key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeKey(pub String);
impl<H: Host> KeyExtractor<H> for AttributeKey {
	fn key(&self, host: &H, node: &H::Node) -> Option<String> {
		attribute_key(host, node, &self.0)
	}
}

fn attribute_key<H: Host>(host: &H, node: &H::Node, name: &str) -> Option<String> {
	if host.kind(node) != NodeKind::Element {
		return None;
	}
	host.get_attribute_ns(node, None, name).filter(|key| !key.is_empty()).map(|key| key.into_owned())
}

/// Configuration of a single [`morph`](`super::morph`) call.
#[derive(Debug, Clone)]
pub struct MorphOptions<O = NoHooks, K = IdKey> {
	/// Only reconcile the children of the live root, never the root itself.
	pub children_only: bool,
	pub hooks: O,
	pub key: K,
}

impl Default for MorphOptions {
	fn default() -> Self {
		Self::new()
	}
}

impl MorphOptions {
	#[must_use]
	pub fn new() -> Self {
		Self { children_only: false, hooks: NoHooks, key: IdKey }
	}
}

impl<O, K> MorphOptions<O, K> {
	#[must_use]
	pub fn children_only(self, children_only: bool) -> Self {
		Self { children_only, ..self }
	}

	#[must_use]
	pub fn hooks<O2>(self, hooks: O2) -> MorphOptions<O2, K> {
		MorphOptions { children_only: self.children_only, hooks, key: self.key }
	}

	#[must_use]
	pub fn key<K2>(self, key: K2) -> MorphOptions<O, K2> {
		MorphOptions { children_only: self.children_only, hooks: self.hooks, key }
	}
}
