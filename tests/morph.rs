use block_dom::{
	host::Host,
	memory::{Document, NodeId},
	morph::{morph, AttributeKey, Flow, MorphHooks, MorphOptions, NodeAdded, Target},
	Error,
};
use tracing_subscriber::EnvFilter;

fn init() {
	let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_test_writer().try_init();
}

/// A connected `div` under `body` with `markup` as content.
fn mount(document: &mut Document, markup: &str) -> NodeId {
	let body = document.body();
	document.set_inner_html(body, &format!("<div>{}</div>", markup)).unwrap();
	let root = document.first_element_child(body).unwrap();
	document.reset_mutations();
	root
}

#[derive(Default)]
struct Recorder {
	added: Vec<String>,
	discarded: Vec<String>,
	updated: Vec<String>,
}

fn describe(document: &Document, node: &NodeId) -> String {
	document.attribute(*node, "id").map_or_else(|| document.node_name(node).into_owned(), str::to_owned)
}

impl MorphHooks<Document> for Recorder {
	fn after_node_added(&mut self, host: &Document, node: &NodeId) {
		self.added.push(describe(host, node));
	}

	fn after_node_discarded(&mut self, host: &Document, node: &NodeId) {
		self.discarded.push(describe(host, node));
	}

	fn after_element_updated(&mut self, host: &Document, live: &NodeId) {
		self.updated.push(describe(host, live));
	}
}

#[test]
fn identical_markup_makes_no_mutations() {
	init();
	let markup = r#"<ul class="list"><li id="a">A</li><li>B</li></ul><input type="checkbox" checked=""><textarea>text</textarea><select><option>1</option><option selected="">2</option></select><!--note-->"#;
	let mut document = Document::new();
	let root = mount(&mut document, markup);

	let mut recorder = Recorder::default();

	let result = morph(&mut document, &root, Target::Markup(&format!("<div>{}</div>", markup)), MorphOptions::new().hooks(&mut recorder)).unwrap();

	assert_eq!(result, root);
	assert_eq!(document.mutations().total(), 0);
	assert_eq!(document.inner_html(&root), markup);
	assert!(recorder.added.is_empty());
	assert!(recorder.discarded.is_empty());
	// Matched elements are reported even though nothing changed.
	assert_eq!(recorder.updated, ["DIV", "UL", "a", "LI", "INPUT", "TEXTAREA", "SELECT", "OPTION", "OPTION"]);
}

#[test]
fn repeated_markup_morphs_release_their_targets() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, "<p>a</p>");
	let allocated = document.allocated();

	for _ in 0..1000 {
		morph(&mut document, &root, Target::Markup("<div><p>a</p></div>"), MorphOptions::new()).unwrap();
	}

	assert_eq!(document.allocated(), allocated);
}

#[test]
fn keyed_reorder_keeps_identity() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, r#"<p id="a">A</p><p id="b">B</p><p id="c">C</p>"#);
	let before = document.children(root).to_vec();

	morph(&mut document, &root, Target::Markup(r#"<div><p id="c">C</p><p id="a">A</p><p id="b">B</p></div>"#), MorphOptions::new()).unwrap();

	assert_eq!(document.children(root), &[before[2], before[0], before[1]]);
	assert_eq!(document.inner_html(&root), r#"<p id="c">C</p><p id="a">A</p><p id="b">B</p>"#);
	assert_eq!(document.mutations().values, 0);
}

#[test]
fn keyed_removal_discards_only_the_missing_element() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, r#"<p id="a">A</p><p id="b">B</p><p id="c">C</p>"#);
	let before = document.children(root).to_vec();
	let mut recorder = Recorder::default();

	morph(&mut document, &root, Target::Markup(r#"<div><p id="a">A</p><p id="c">C</p></div>"#), MorphOptions::new().hooks(&mut recorder)).unwrap();

	assert_eq!(document.children(root), &[before[0], before[2]]);
	assert_eq!(recorder.discarded, ["b", "#text"]);
	assert_eq!(recorder.updated, ["DIV", "a", "c"]);
	assert!(recorder.added.is_empty());
	assert!(document.parent(before[1]).is_none());
}

#[test]
fn keyed_element_moves_across_parents() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, r#"<section><p id="x">X</p></section><aside></aside>"#);
	let x = document.get_element_by_id("x").unwrap();

	morph(&mut document, &root, Target::Markup(r#"<div><section></section><aside><p id="x">X!</p></aside></div>"#), MorphOptions::new()).unwrap();

	let aside = document.children(root)[1];
	assert_eq!(document.children(aside), &[x]);
	assert_eq!(document.text_content(x), "X!");
}

#[test]
fn custom_key_attribute() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, r#"<p data-key="1">one</p><p data-key="2">two</p>"#);
	let before = document.children(root).to_vec();

	morph(
		&mut document,
		&root,
		Target::Markup(r#"<div><p data-key="2">two</p><p data-key="1">one</p></div>"#),
		MorphOptions::new().key(AttributeKey("data-key".to_owned())),
	)
	.unwrap();

	assert_eq!(document.children(root), &[before[1], before[0]]);
}

#[test]
fn attributes_are_added_updated_and_removed() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, r#"<a href="/old" title="gone" class="x">link</a>"#);
	let link = document.children(root)[0];

	morph(&mut document, &root, Target::Markup(r#"<div><a href="/new" class="x" rel="next">link</a></div>"#), MorphOptions::new()).unwrap();

	assert_eq!(document.children(root), &[link]);
	assert_eq!(document.attribute(link, "href"), Some("/new"));
	assert_eq!(document.attribute(link, "rel"), Some("next"));
	assert_eq!(document.attribute(link, "title"), None);
	assert_eq!(document.mutations().attributes, 3);
}

#[test]
fn attributes_missing_from_the_target_are_removed() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, r#"<div class="x" value="1"></div>"#);
	let inner = document.children(root)[0];

	morph(&mut document, &root, Target::Markup(r#"<div><div class="y"></div></div>"#), MorphOptions::new()).unwrap();

	assert_eq!(document.attributes(&inner), vec![block_dom::host::Attribute { namespace: None, name: "class".to_owned(), value: "y".to_owned() }]);
}

#[test]
fn input_value_follows_the_target() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, r#"<input value="initial">"#);
	let input = document.children(root)[0];
	document.set_value(&input, "typed");

	morph(&mut document, &root, Target::Markup(r#"<div><input value="initial"></div>"#), MorphOptions::new()).unwrap();
	assert_eq!(document.value(&input), "initial");

	morph(&mut document, &root, Target::Markup("<div><input></div>"), MorphOptions::new()).unwrap();
	assert_eq!(document.value(&input), "");
	assert_eq!(document.attribute(input, "value"), None);
}

#[test]
fn checkbox_state_follows_the_target() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, r#"<input type="checkbox">"#);
	let input = document.children(root)[0];

	morph(&mut document, &root, Target::Markup(r#"<div><input type="checkbox" checked></div>"#), MorphOptions::new()).unwrap();

	assert!(document.bool_property(&input, block_dom::host::BoolProperty::Checked));
	assert_eq!(document.attribute(input, "checked"), Some(""));
}

#[test]
fn select_follows_the_selected_option() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, "<select><option>a</option><option selected>b</option></select>");
	let select = document.children(root)[0];
	assert_eq!(document.selected_index(select), 1);

	morph(&mut document, &root, Target::Markup("<div><select><option>a</option><option>b</option></select></div>"), MorphOptions::new()).unwrap();

	assert_eq!(document.selected_index(select), 0);
}

#[test]
fn text_and_element_mismatches_are_replaced() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, "<b>bold</b>text<i>italic</i>");
	let mut recorder = Recorder::default();

	morph(&mut document, &root, Target::Markup("<div>text<b>bold</b><em>new</em></div>"), MorphOptions::new().hooks(&mut recorder)).unwrap();

	assert_eq!(document.inner_html(&root), "text<b>bold</b><em>new</em>");
	assert!(recorder.added.contains(&"EM".to_owned()));
	assert!(recorder.discarded.contains(&"I".to_owned()));
}

#[test]
fn incompatible_root_is_replaced_in_its_parent() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, "<p>content</p>");
	let body = document.body();
	let paragraph = document.children(root)[0];

	let result = morph(&mut document, &root, Target::Markup(r#"<section class="new"><p>content</p></section>"#), MorphOptions::new()).unwrap();

	assert_ne!(result, root);
	assert_eq!(document.children(body), &[result]);
	assert_eq!(document.node_name(&result), "SECTION");
	assert_eq!(document.attribute(result, "class"), Some("new"));
	assert_eq!(document.children(result), &[paragraph]);
}

#[test]
fn children_only_leaves_the_root_alone() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, "<p>old</p>");
	document.set_attribute(root, "class", "keep");

	let result = morph(&mut document, &root, Target::Markup("<span><p>new</p></span>"), MorphOptions::new().children_only(true)).unwrap();

	assert_eq!(result, root);
	assert_eq!(document.node_name(&root), "DIV");
	assert_eq!(document.attribute(root, "class"), Some("keep"));
	assert_eq!(document.inner_html(&root), "<p>new</p>");
}

#[test]
fn hooks_can_veto_updates_additions_and_discards() {
	init();

	struct Frozen;
	impl MorphHooks<Document> for Frozen {
		fn before_element_updated(&mut self, host: &Document, live: &NodeId, _target: &NodeId) -> Flow {
			if host.attribute(*live, "data-frozen").is_some() {
				Flow::Skip
			} else {
				Flow::Continue
			}
		}

		fn before_node_added(&mut self, host: &Document, node: &NodeId) -> NodeAdded<NodeId> {
			if host.is_element_named(node, "script") {
				NodeAdded::Skip
			} else {
				NodeAdded::Continue
			}
		}

		fn before_node_discarded(&mut self, host: &Document, node: &NodeId) -> Flow {
			if host.attribute(*node, "data-sticky").is_some() {
				Flow::Skip
			} else {
				Flow::Continue
			}
		}
	}

	let mut document = Document::new();
	let root = mount(&mut document, r#"<p data-frozen="">frozen</p><b data-sticky="">sticky</b>"#);

	morph(&mut document, &root, Target::Markup("<div><p>thawed</p><script>alert(1)</script></div>"), MorphOptions::new().hooks(Frozen)).unwrap();

	assert_eq!(document.inner_html(&root), r#"<p data-frozen="">frozen</p><b data-sticky="">sticky</b>"#);
}

#[test]
fn node_target_is_consumed() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, "<p>a</p>");
	let target = document.create_element("div");
	document.set_inner_html(target, "<p>b</p><p>c</p>").unwrap();

	morph(&mut document, &root, Target::Node(target), MorphOptions::new()).unwrap();

	assert_eq!(document.inner_html(&root), "<p>b</p><p>c</p>");
}

#[test]
fn bad_markup_leaves_the_tree_untouched() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, "<p>a</p>");

	assert!(matches!(morph(&mut document, &root, Target::Markup("   "), MorphOptions::new()), Err(Error::EmptyMarkup)));
	assert!(matches!(morph(&mut document, &root, Target::Markup("<div><p class=\"x</div>"), MorphOptions::new()), Err(Error::Parse { .. })));
	assert_eq!(document.inner_html(&root), "<p>a</p>");
	assert_eq!(document.mutations().total(), 0);
}

#[test]
fn hooks_can_substitute_added_nodes() {
	init();

	struct Substitute {
		replacement: NodeId,
	}
	impl MorphHooks<Document> for Substitute {
		fn before_node_added(&mut self, host: &Document, node: &NodeId) -> NodeAdded<NodeId> {
			if host.is_element_named(node, "b") {
				NodeAdded::Replace(self.replacement)
			} else {
				NodeAdded::Continue
			}
		}
	}

	let mut document = Document::new();
	let root = mount(&mut document, "<p>a</p>");
	let strong = document.create_element("strong");
	document.set_inner_html(strong, "instead").unwrap();

	morph(&mut document, &root, Target::Markup("<div><p>a</p><b>bold</b><i>italic</i></div>"), MorphOptions::new().hooks(Substitute { replacement: strong })).unwrap();

	assert_eq!(document.children(root)[1], strong);
	assert_eq!(document.inner_html(&root), "<p>a</p><strong>instead</strong><i>italic</i>");
}

#[test]
fn added_subtrees_take_over_unmatched_keyed_elements() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, r#"<p id="x">X</p>"#);
	let x = document.get_element_by_id("x").unwrap();
	let mut recorder = Recorder::default();

	morph(&mut document, &root, Target::Markup(r#"<div><section><p id="x">X!</p></section></div>"#), MorphOptions::new().hooks(&mut recorder)).unwrap();

	let section = document.children(root)[0];
	assert_eq!(document.children(root), &[section]);
	assert_eq!(document.children(section), &[x]);
	assert_eq!(document.text_content(x), "X!");
	assert_eq!(recorder.added, ["SECTION"]);
	assert!(recorder.discarded.is_empty());
}

#[test]
fn textarea_value_follows_the_target() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, "<textarea>old</textarea>");
	let textarea = document.children(root)[0];
	let text = document.children(textarea)[0];
	document.set_value(&textarea, "typed");
	let mut recorder = Recorder::default();

	morph(&mut document, &root, Target::Markup("<div><textarea>new</textarea></div>"), MorphOptions::new().hooks(&mut recorder)).unwrap();

	assert_eq!(document.value(&textarea), "new");
	assert_eq!(document.children(textarea), &[text]);
	assert_eq!(document.inner_html(&textarea), "new");
	assert!(recorder.added.is_empty());
	assert!(recorder.discarded.is_empty());
}

#[test]
fn relocated_keyed_element_of_another_kind_is_replaced() {
	init();
	let mut document = Document::new();
	let root = mount(&mut document, r#"<p id="a">A</p><i>gap</i><span id="b">B</span>"#);
	let span = document.get_element_by_id("b").unwrap();
	let mut recorder = Recorder::default();

	morph(&mut document, &root, Target::Markup(r#"<div><div id="b">B</div></div>"#), MorphOptions::new().hooks(&mut recorder)).unwrap();

	assert_eq!(document.inner_html(&root), r#"<div id="b">B</div>"#);
	assert_ne!(document.children(root)[0], span);
	assert_eq!(document.parent(span), None);
	assert_eq!(recorder.added, ["b", "#text"]);
	assert_eq!(recorder.discarded, ["I", "#text", "a", "#text", "b", "#text"]);
}
