//! Custom-element widgets rendered through [`morph`](`crate::morph::morph`).
//!
//! A widget is a [`Component`] mounted on a host element. Its state lives entirely in that element's
//! attributes (see [`reflect`]), and it renders by morphing its children into `template`'s output.
//! Widgets nested in a template are upgraded automatically, and their content is handed to them instead of
//! being morphed by the outer widget.
//!
//! Re-renders caused by attribute changes are queued and run by [`Blocks::flush`].
//! There's at most one queued render per widget.
//!
//! Widgets whose elements a render discards are unmounted along with it, and their queued renders are dropped.

mod button;
mod contact_form;
mod form;
mod input;
pub mod reflect;
mod template;
pub mod validators;

pub use button::Button;
pub use contact_form::{ContactForm, SaveRequest, Validation};
pub use form::{serialize, Form};
pub use input::Input;
pub use template::{attributes, escape_attribute, escape_text};

use crate::{
	host::{Host, NodeKind},
	morph::{morph, Flow, MorphHooks, MorphOptions, Target},
	Error,
};
use core::{any::Any, fmt::Debug};
use hashbrown::HashMap;
use reflect::Reflection;
use serde_json::Value;
use std::collections::VecDeque;
use tracing::{debug, instrument, trace, trace_span};

/// Reflected property values by name, in declaration order.
pub type Properties = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	/// Default `action` of forms.
	pub location_path: String,
}
impl Default for Config {
	fn default() -> Self {
		Self { location_path: "/".to_owned() }
	}
}

pub trait Component: Any + Debug {
	fn tag_name(&self) -> &'static str;

	/// Names and default values of the properties backed by attributes.
	fn reflected_properties(&self) -> Vec<(&'static str, Value)>;

	/// The markup of this widget's children.
	fn template(&self, properties: &Properties) -> String;

	/// Called once, after the first render.
	fn rendered(&mut self) {}

	/// Custom property setter. Defaults to [`reflect::to_attribute`].
	fn reflect_property(&self, _name: &str, value: &Value) -> Reflection {
		reflect::to_attribute(value)
	}

	/// Custom property getter. Defaults to [`reflect::from_attribute`].
	fn read_property(&self, _name: &str, attribute: Option<&str>) -> Value {
		reflect::from_attribute(attribute)
	}

	fn as_any(&self) -> &dyn Any;
	fn as_any_mut(&mut self) -> &mut dyn Any;
}

type Factory = Box<dyn Fn(&Config) -> Box<dyn Component>>;

#[derive(Debug)]
struct Mounted<N> {
	element: N,
	component: Box<dyn Component>,
	content: String,
	connected: bool,
}

/// Widget registry and runtime.
pub struct Blocks<H: Host> {
	config: Config,
	registry: HashMap<String, Factory>,
	mounted: Vec<Mounted<H::Node>>,
	pending: VecDeque<H::Node>,
}

impl<H: Host> Debug for Blocks<H> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Blocks")
			.field("config", &self.config)
			.field("registry", &self.registry.keys().collect::<Vec<_>>())
			.field("mounted", &self.mounted)
			.field("pending", &self.pending)
			.finish()
	}
}

impl<H: Host> Default for Blocks<H> {
	fn default() -> Self {
		Self::new(Config::default())
	}
}

impl<H: Host> Blocks<H> {
	#[must_use]
	pub fn new(config: Config) -> Self {
		Self { config, registry: HashMap::new(), mounted: Vec::new(), pending: VecDeque::new() }
	}

	/// A runtime with `b-form`, `b-input-text`, `b-button` and `my-form` defined.
	#[must_use]
	pub fn with_builtins(config: Config) -> Self {
		let mut blocks = Self::new(config);
		blocks.insert(Form::TAG, |config| Box::new(Form::new(config)));
		blocks.insert(Input::TAG, |_| Box::new(Input));
		blocks.insert(Button::TAG, |_| Box::new(Button));
		blocks.insert(ContactForm::TAG, |config| Box::new(ContactForm::new(config)));
		blocks
	}

	#[must_use]
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Registers a widget factory for `tag`.
	///
	/// # Errors
	///
	/// Iff `tag` is already defined.
	pub fn define(&mut self, tag: &str, factory: impl Fn(&Config) -> Box<dyn Component> + 'static) -> Result<(), Error> {
		if self.is_defined(tag) {
			return Err(Error::AlreadyDefined(tag.to_ascii_lowercase()));
		}
		self.insert(tag, factory);
		Ok(())
	}

	fn insert(&mut self, tag: &str, factory: impl Fn(&Config) -> Box<dyn Component> + 'static) {
		self.registry.insert(tag.to_ascii_lowercase(), Box::new(factory));
	}

	#[must_use]
	pub fn is_defined(&self, tag: &str) -> bool {
		self.registry.contains_key(&tag.to_ascii_lowercase())
	}

	fn position(&self, host: &H, element: &H::Node) -> Option<usize> {
		self.mounted.iter().position(|mounted| host.is_same_node(&mounted.element, element))
	}

	#[must_use]
	pub fn is_mounted(&self, host: &H, element: &H::Node) -> bool {
		self.position(host, element).is_some()
	}

	/// Number of mounted widgets.
	#[must_use]
	pub fn mounted(&self) -> usize {
		self.mounted.len()
	}

	/// Unmounts the widget on `element` and every widget mounted below it, dropping their queued renders.
	///
	/// Returns how many widgets were unmounted.
	pub fn unmount(&mut self, host: &H, element: &H::Node) -> usize {
		let before = self.mounted.len();
		self.mounted.retain(|mounted| !is_inclusive_descendant(host, &mounted.element, element));
		self.pending.retain(|pending| !is_inclusive_descendant(host, pending, element));
		let unmounted = before - self.mounted.len();
		if unmounted > 0 {
			debug!(unmounted, "Unmounted widget(s).");
		}
		unmounted
	}

	/// The component mounted on `element`, if it has type `T`.
	#[must_use]
	pub fn component<T: Component>(&self, host: &H, element: &H::Node) -> Option<&T> {
		self.position(host, element).and_then(|i| self.mounted[i].component.as_any().downcast_ref())
	}

	pub fn component_mut<T: Component>(&mut self, host: &H, element: &H::Node) -> Option<&mut T> {
		let i = self.position(host, element)?;
		self.mounted[i].component.as_any_mut().downcast_mut()
	}

	/// Mounts the widget defined for `element`'s tag, if any.
	///
	/// Missing reflected attributes are set to their defaults. The element's current children become the widget's
	/// content, are replaced by the first render and then projected into its `slot`, if there is one.
	///
	/// Returns whether a widget was mounted.
	///
	/// # Errors
	///
	/// Iff rendering fails.
	#[instrument(skip(self, host))]
	pub fn upgrade(&mut self, host: &mut H, element: &H::Node) -> Result<bool, Error> {
		if host.kind(element) != NodeKind::Element || self.is_mounted(host, element) {
			return Ok(false);
		}
		let tag = host.node_name(element).to_ascii_lowercase();
		let component = match self.registry.get(&tag) {
			Some(factory) => factory(&self.config),
			None => return Ok(false),
		};

		for (name, default) in component.reflected_properties() {
			if !host.has_attribute_ns(element, None, name) {
				apply_reflection(host, element, name, component.reflect_property(name, &default));
			}
		}

		let content = host.inner_html(element);
		host.clear_children(element);
		self.mounted.push(Mounted { element: element.clone(), component, content, connected: false });
		self.render_now(host, self.mounted.len() - 1)?;
		let index = self.position(host, element).ok_or(Error::NotMounted)?;

		if let Some(slot) = find_slot(host, element) {
			let content = self.mounted[index].content.clone();
			replace_children(host, &slot, &content)?;
		}
		self.mounted[index].component.rendered();
		self.mounted[index].connected = true;
		debug!(tag = %tag, "Mounted widget.");

		self.upgrade_tree(host, element)?;
		Ok(true)
	}

	/// Upgrades every defined, unmounted element below `root`.
	///
	/// # Errors
	///
	/// Iff rendering one of them fails.
	pub fn upgrade_tree(&mut self, host: &mut H, root: &H::Node) -> Result<usize, Error> {
		let mut upgraded = 0;
		let mut current = host.first_child(root);
		while let Some(node) = current {
			if host.kind(&node) == NodeKind::Element && !self.is_mounted(host, &node) && self.is_defined(&host.node_name(&node)) {
				self.upgrade(host, &node)?;
				upgraded += 1;
			} else {
				upgraded += self.upgrade_tree(host, &node)?;
			}
			current = host.next_sibling(&node);
		}
		Ok(upgraded)
	}

	fn read_properties(&self, host: &H, index: usize) -> Properties {
		let Mounted { element, component, .. } = &self.mounted[index];
		component
			.reflected_properties()
			.into_iter()
			.map(|(name, _)| {
				let attribute = host.get_attribute_ns(element, None, name);
				(name.to_owned(), component.read_property(name, attribute.as_deref()))
			})
			.collect()
	}

	/// Reads a reflected property.
	///
	/// # Errors
	///
	/// Iff `element` isn't a mounted widget.
	pub fn property(&self, host: &H, element: &H::Node, name: &str) -> Result<Value, Error> {
		let index = self.position(host, element).ok_or(Error::NotMounted)?;
		let attribute = host.get_attribute_ns(element, None, name);
		Ok(self.mounted[index].component.read_property(name, attribute.as_deref()))
	}

	/// Reads all reflected properties.
	///
	/// # Errors
	///
	/// Iff `element` isn't a mounted widget.
	pub fn properties(&self, host: &H, element: &H::Node) -> Result<Properties, Error> {
		let index = self.position(host, element).ok_or(Error::NotMounted)?;
		Ok(self.read_properties(host, index))
	}

	/// Writes a property through the widget's reflection and queues a render if the attribute changed.
	///
	/// # Errors
	///
	/// Iff `element` isn't a mounted widget.
	pub fn set_property(&mut self, host: &mut H, element: &H::Node, name: &str, value: Value) -> Result<(), Error> {
		let index = self.position(host, element).ok_or(Error::NotMounted)?;
		let reflection = self.mounted[index].component.reflect_property(name, &value);
		let old = host.get_attribute_ns(element, None, name).map(|old| old.into_owned());
		apply_reflection(host, element, name, reflection);
		let new = host.get_attribute_ns(element, None, name).map(|new| new.into_owned());
		self.attribute_changed(host, element, name, old.as_deref(), new.as_deref());
		Ok(())
	}

	/// Sets (or with [`None`] removes) an attribute, notifying the widget mounted on `element`, if any.
	pub fn set_attribute(&mut self, host: &mut H, element: &H::Node, name: &str, value: Option<&str>) {
		let old = host.get_attribute_ns(element, None, name).map(|old| old.into_owned());
		match value {
			Some(value) => host.set_attribute_ns(element, None, name, value),
			None => host.remove_attribute_ns(element, None, name),
		}
		self.attribute_changed(host, element, name, old.as_deref(), value);
	}

	/// Queues a render if `name` is one of the widget's reflected properties and its attribute value changed.
	pub fn attribute_changed(&mut self, host: &H, element: &H::Node, name: &str, old: Option<&str>, new: Option<&str>) {
		let index = match self.position(host, element) {
			Some(index) => index,
			None => return,
		};
		let observed = self.mounted[index].component.reflected_properties().iter().any(|(property, _)| property.eq_ignore_ascii_case(name));
		if observed && old != new {
			self.schedule(host, element);
		}
	}

	/// Queues a render of a connected widget, replacing a render that's already queued for it.
	pub fn schedule(&mut self, host: &H, element: &H::Node) {
		if !self.position(host, element).map_or(false, |i| self.mounted[i].connected) {
			return;
		}
		self.pending.retain(|pending| !host.is_same_node(pending, element));
		self.pending.push_back(element.clone());
		trace!(pending = self.pending.len(), "Scheduled render.");
	}

	#[must_use]
	pub fn pending(&self) -> usize {
		self.pending.len()
	}

	/// Runs queued renders until none are left, including ones queued by those renders.
	///
	/// Returns the number of renders.
	///
	/// # Errors
	///
	/// Iff a render fails. The failed render is queued again in front of the ones still waiting,
	/// so a later flush retries it.
	#[instrument(skip(self, host))]
	pub fn flush(&mut self, host: &mut H) -> Result<usize, Error> {
		let mut renders = 0;
		while let Some(element) = self.pending.pop_front() {
			if !self.is_mounted(host, &element) {
				trace!(?element, "Dropping render of an unmounted widget.");
				continue;
			}
			if let Err(error) = self.render(host, &element) {
				self.pending.push_front(element);
				return Err(error);
			}
			renders += 1;
		}
		Ok(renders)
	}

	/// Renders a mounted widget right away.
	///
	/// # Errors
	///
	/// Iff `element` isn't a mounted widget, or its template can't be parsed.
	pub fn render(&mut self, host: &mut H, element: &H::Node) -> Result<(), Error> {
		let index = self.position(host, element).ok_or(Error::NotMounted)?;
		self.render_now(host, index)?;
		self.upgrade_tree(host, element)?;
		Ok(())
	}

	fn render_now(&mut self, host: &mut H, index: usize) -> Result<(), Error> {
		let element = self.mounted[index].element.clone();
		let properties = self.read_properties(host, index);
		let component = &self.mounted[index].component;
		let span = trace_span!("render", tag = component.tag_name());
		let _enter = span.enter();

		let markup = format!("<div>{}</div>", component.template(&properties));
		self.morph_children(host, &element, &markup)
	}

	fn morph_children(&mut self, host: &mut H, element: &H::Node, markup: &str) -> Result<(), Error> {
		let mut hooks = WidgetHooks {
			widgets: self.mounted.iter().map(|mounted| (mounted.element.clone(), mounted.component.tag_name())).collect(),
			content_updates: Vec::new(),
			changed: Vec::new(),
			discarded: Vec::new(),
		};
		morph(host, element, Target::Markup(markup), MorphOptions::new().children_only(true).hooks(&mut hooks))?;

		// Only the roots of discarded subtrees are detached.
		for node in &hooks.discarded {
			if host.parent_node(node).is_none() {
				self.unmount(host, node);
			}
		}
		for node in &hooks.discarded {
			if host.parent_node(node).is_none() {
				host.release(node);
			}
		}

		for (widget, content) in hooks.content_updates {
			self.set_content(host, &widget, content)?;
		}
		for widget in hooks.changed {
			self.schedule(host, &widget);
		}
		Ok(())
	}

	#[must_use]
	pub fn content(&self, host: &H, element: &H::Node) -> Option<&str> {
		self.position(host, element).map(|i| self.mounted[i].content.as_str())
	}

	/// Replaces a widget's content, morphing its `slot` if it's connected and the content changed.
	///
	/// # Errors
	///
	/// Iff `element` isn't a mounted widget, or `content` can't be parsed.
	pub fn set_content(&mut self, host: &mut H, element: &H::Node, content: String) -> Result<(), Error> {
		let index = self.position(host, element).ok_or(Error::NotMounted)?;
		let old = std::mem::replace(&mut self.mounted[index].content, content);
		if !self.mounted[index].connected || old == self.mounted[index].content {
			return Ok(());
		}
		let slot = match find_slot(host, element) {
			Some(slot) => slot,
			None => return Ok(()),
		};
		let markup = format!("<div>{}</div>", self.mounted[index].content);
		self.morph_children(host, &slot, &markup)?;
		self.upgrade_tree(host, &slot)?;
		Ok(())
	}
}

fn apply_reflection<H: Host>(host: &mut H, element: &H::Node, name: &str, reflection: Reflection) {
	match reflection {
		Reflection::Remove => host.remove_attribute_ns(element, None, name),
		Reflection::Set(value) => host.set_attribute_ns(element, None, name, &value),
	}
}

fn find_slot<H: Host>(host: &H, element: &H::Node) -> Option<H::Node> {
	host.find_descendant(element, &mut |host, node| host.is_element_named(node, "slot"))
}

fn replace_children<H: Host>(host: &mut H, parent: &H::Node, markup: &str) -> Result<(), Error> {
	let fragment = host.parse_fragment(markup)?;
	host.clear_children(parent);
	while let Some(child) = host.first_child(&fragment) {
		host.append_child(parent, &child);
	}
	host.release(&fragment);
	Ok(())
}

/// Whether `node` is `ancestor` or below it.
fn is_inclusive_descendant<H: Host>(host: &H, node: &H::Node, ancestor: &H::Node) -> bool {
	let mut current = Some(node.clone());
	while let Some(candidate) = current {
		if host.is_same_node(&candidate, ancestor) {
			return true;
		}
		current = host.parent_node(&candidate);
	}
	false
}

/// Delegates mounted widgets' content to them and notes which ones need a render.
struct WidgetHooks<N> {
	widgets: Vec<(N, &'static str)>,
	content_updates: Vec<(N, String)>,
	changed: Vec<N>,
	/// Every discarded node, in discard order.
	discarded: Vec<N>,
}

impl<N> WidgetHooks<N> {
	fn tag_of<H: Host<Node = N>>(&self, host: &H, node: &N) -> Option<&'static str> {
		self.widgets.iter().find(|(widget, _)| host.is_same_node(widget, node)).map(|&(_, tag)| tag)
	}
}

fn attribute_set<H: Host>(host: &H, node: &H::Node) -> Vec<(Option<String>, String, String)> {
	let mut attributes: Vec<_> = host.attributes(node).into_iter().map(|a| (a.namespace, a.name.to_ascii_lowercase(), a.value)).collect();
	attributes.sort();
	attributes
}

impl<H: Host> MorphHooks<H> for WidgetHooks<H::Node> {
	fn before_element_updated(&mut self, host: &H, live: &H::Node, target: &H::Node) -> Flow {
		if self.tag_of(host, live).is_some() && attribute_set(host, live) != attribute_set(host, target) {
			self.changed.push(live.clone());
		}
		Flow::Continue
	}

	fn before_children_updated(&mut self, host: &H, live: &H::Node, target: &H::Node) -> Flow {
		if let Some(tag) = self.tag_of(host, live) {
			if host.node_name(target).eq_ignore_ascii_case(tag) {
				self.content_updates.push((live.clone(), host.inner_html(target)));
				return Flow::Skip;
			}
		}
		if host.is_element_named(live, "slot") && host.is_element_named(target, "slot") {
			return Flow::Skip;
		}
		Flow::Continue
	}

	fn after_node_discarded(&mut self, _host: &H, node: &H::Node) {
		self.discarded.push(node.clone());
	}
}
