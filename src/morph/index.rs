use super::options::KeyExtractor;
use crate::host::{Host, NodeKind};
use hashbrown::HashMap;
use tracing::debug;

/// Keyed live nodes that haven't been matched yet, plus the keys of nodes whose removal was deferred.
///
/// Lives for exactly one [`morph`](`super::morph`) call.
#[derive(Debug)]
pub struct KeyedIndex<N> {
	lookup: HashMap<String, N>,
	removals: Vec<String>,
}

impl<N: Clone> KeyedIndex<N> {
	/// Indexes the descendants of `root` in pre-order. `root` itself isn't indexed.
	pub fn build<H: Host<Node = N>, K: KeyExtractor<H>>(host: &H, root: &N, keys: &K) -> Self {
		let mut index = Self { lookup: HashMap::new(), removals: Vec::new() };
		index.walk(host, root, keys);
		index
	}

	fn walk<H: Host<Node = N>, K: KeyExtractor<H>>(&mut self, host: &H, node: &N, keys: &K) {
		if !matches!(host.kind(node), NodeKind::Element | NodeKind::DocumentFragment | NodeKind::Document) {
			return;
		}
		let mut current = host.first_child(node);
		while let Some(child) = current {
			if let Some(key) = keys.key(host, &child) {
				if self.lookup.insert(key.clone(), child.clone()).is_some() {
					debug!(key = %key, "Duplicate key. The last one wins.");
				}
			}
			self.walk(host, &child, keys);
			current = host.next_sibling(&child);
		}
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&N> {
		self.lookup.get(key)
	}

	pub fn take(&mut self, key: &str) -> Option<N> {
		self.lookup.remove(key)
	}

	/// Marks the node with `key` for removal unless it's matched before [`KeyedIndex::finish`].
	pub fn defer(&mut self, key: String) {
		self.removals.push(key);
	}

	/// Drains the deferred keys, yielding the nodes that are still unmatched.
	pub fn finish(&mut self) -> Vec<N> {
		let removals = std::mem::take(&mut self.removals);
		removals.iter().filter_map(|key| self.lookup.remove(key)).collect()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.lookup.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.lookup.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{memory::Document, morph::IdKey};

	#[test]
	fn indexes_descendants_but_not_the_root() {
		let mut document = Document::new();
		let root = document.create_element("ul");
		document.set_attribute(root, "id", "root");
		document.set_inner_html(root, r#"<li id="a"><span id="b"></span></li><li id=""></li><li id="a"></li>"#).unwrap();

		let mut index = KeyedIndex::build(&document, &root, &IdKey);
		assert_eq!(index.len(), 2);
		assert!(index.get("root").is_none());
		let last = document.children(root)[2];
		assert_eq!(index.get("a"), Some(&last));

		index.defer("b".to_owned());
		index.defer("a".to_owned());
		assert_eq!(index.take("a"), Some(last));
		assert_eq!(index.finish().len(), 1);
		assert!(index.is_empty());
	}
}
