//! Style sheet injection into the document head.

use crate::{host::Host, Error};
use hashbrown::HashSet;
use tracing::{debug, instrument};

/// Appends each style sheet to the document head at most once.
#[derive(Debug, Default, Clone)]
pub struct StyleSheets {
	appended: HashSet<String>,
}

impl StyleSheets {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses `markup`, and appends the first `style` element in it to `head` unless a sheet with the same key was appended before.
	///
	/// The key is the `style` element's `id` if it has a non-empty one, otherwise `id`.
	/// Returns whether the sheet was appended.
	///
	/// # Errors
	///
	/// Iff `markup` can't be parsed.
	#[instrument(skip(self, host, head, markup))]
	pub fn append<H: Host>(&mut self, host: &mut H, head: &H::Node, markup: &str, id: &str) -> Result<bool, Error> {
		let container = host.parse_fragment(markup)?;
		let style = match host.find_descendant(&container, &mut |host, node| host.is_element_named(node, "style")) {
			Some(style) => style,
			None => {
				debug!("No style element in style sheet markup.");
				return Ok(false);
			}
		};

		let key = host.get_attribute_ns(&style, None, "id").filter(|own| !own.is_empty()).map_or_else(|| id.to_owned(), |own| own.into_owned());
		if self.appended.contains(&key) {
			return Ok(false);
		}

		host.append_child(head, &style);
		self.appended.insert(key);
		Ok(true)
	}

	/// Appends the theme, the layout reset and the built-in widgets' styles.
	///
	/// # Errors
	///
	/// Iff any of them can't be parsed.
	pub fn install_builtins<H: Host>(&mut self, host: &mut H, head: &H::Node) -> Result<(), Error> {
		for (markup, id) in [THEME, INITIAL, INPUT_TEXT, BUTTON] {
			self.append(host, head, markup, id)?;
		}
		Ok(())
	}

	#[must_use]
	pub fn contains(&self, id: &str) -> bool {
		self.appended.contains(id)
	}
}

/// Theme variables and typography.
pub const THEME: (&str, &str) = (r#"<style>:root{--b-primary-color: #1E88E5;--b-accent-color: #00C853;--b-lightGrey-color: #757575;--b-focus-color: #F9A825;--b-danger-color: #F44336;--b-font-family: Roboto, Tahoma, sans-serif;--b-font-display-4: normal 300 114px var(--b-font-family);--b-font-display-3: normal 400 56px var(--b-font-family);--b-font-display-2: normal 400 45px var(--b-font-family);--b-font-display-1: normal 400 34px var(--b-font-family);--b-font-headline: normal 400 24px var(--b-font-family);--b-font-title: normal 500 20px var(--b-font-family);--b-font-subheading: normal 400 16px var(--b-font-family);--b-font-body-2: normal 500 14px var(--b-font-family);--b-font-body-1: normal 400 14px var(--b-font-family);--b-font-caption: normal 400 12px var(--b-font-family);--b-shadow-1: 0 1px 4px rgba(0,0,0,0.12), 0 1px 3px rgba(0,0,0,0.24);--b-shadow-2: 0 2px 6px rgba(0,0,0,0.16), 0 2px 6px rgba(0,0,0,0.23);--b-shadow-3: 0 10px 20px rgba(0,0,0,0.19), 0 6px 6px rgba(0,0,0,0.23);--b-shadow-4: 0 14px 28px rgba(0,0,0,0.25), 0 10px 10px rgba(0,0,0,0.22);--b-shadow-5: 0 19px 38px rgba(0,0,0,0.30), 0 15px 12px rgba(0,0,0,0.22)}body{font-family:var(--b-font-family)}h1{font:var(--b-font-display-4)}h2{font:var(--b-font-display-3)}h3{font:var(--b-font-display-2)}h4{font:var(--b-font-display-1)}h5{font:var(--b-font-headline)}h6{font:var(--b-font-title)}a{color:var(--b-primary-color)}caption{font:var(--b-font-caption)}</style>"#, "block-dom/theme.css");

/// Resets the built-in widgets to block layout.
pub const INITIAL: (&str, &str) = (r#"<style>b-actionButton,b-button,b-dialog,b-form,b-icon,b-input-checkbox,b-input-radio,b-input-switch,b-input-text,b-progress-circular,b-progress-linear,b-table,b-tabs,b-textarea,b-toolbar{all:initial;display:block}</style>"#, "block-dom/initial.css");

/// `b-input-text`.
pub const INPUT_TEXT: (&str, &str) = (r#"<style>b-input-text,b-input-text>input{box-sizing:border-box;font-family:var(--b-font-family);position:relative}b-input-text{min-height:72px;padding-top:20px;padding-bottom:20px;text-align:left;vertical-align:middle;display:inline-block}b-input-text>input{width:100%;font-size:16px;outline:0;background:0 0;display:block;border:0;z-index:2;resize:none;padding:8px 0;transition:background-color .2s}b-input-text>input::placeholder{color:rgba(0,0,0,.38)}b-input-text--label{transform:translate3d(0,26px,0);font-size:16px;color:rgba(0,0,0,.38);transition:font-size .2s,transform .2s,color .2s;position:absolute;z-index:1;left:0;top:4px}b-input-text--border{height:2px;width:100%;display:block;box-sizing:border-box;border-bottom:1px solid rgba(0,0,0,.12);transition:border-color .2s}b-input-text>input:focus~b-input-text--label{font-size:12px;transform:translate3d(0,0,0);color:var(--b-primary-color)}b-input-text>input:focus~b-input-text--border{border-bottom:2px solid var(--b-primary-color)}b-input-text[value] b-input-text--label{font-size:12px;transform:translate3d(0,0,0);color:rgba(0,0,0,.54)}b-input-text[error]>input~b-input-text--label{font-size:12px;transform:translate3d(0,0,0);color:var(--b-danger-color)}b-input-text[error]>input~b-input-text--border{border-bottom:2px solid var(--b-danger-color)}b-input-text[error]::after{content:attr(error);font-size:12px;color:var(--b-danger-color)}</style>"#, "block-dom/b-input-text.css");

/// `b-button`.
pub const BUTTON: (&str, &str) = (r#"<style>@keyframes progress-bar-stripes{0%{background-position:40px 0}to{background-position:0 0}}b-button,b-button a,b-button button{position:relative;vertical-align:middle}b-button{font-weight:500;line-height:35px;display:inline-block;height:36px;color:#fff}b-button::before{content:"";position:absolute;top:0;left:0;width:100%;height:100%;background-color:var(--b-primary-color);transition:opacity .2s,box-shadow .2s;border-radius:2px;box-shadow:var(--b-shadow-1)}b-button:hover::before{box-shadow:var(--b-shadow-2)}b-button a,b-button button{color:inherit;display:block;text-transform:uppercase;background:0 0;text-align:center;padding:0 16px;height:100%;cursor:pointer;font-size:14px;user-select:none;border:0;outline:0;font-family:var(--b-font-family);min-width:64px;box-sizing:content-box}b-button input{display:none}b-button[flat][color=accent]{color:var(--b-accent-color)}b-button[flat][color=warning]{color:var(--b-focus-color)}b-button[flat][color=danger]{color:var(--b-danger-color)}b-button[color=accent]::before{background-color:var(--b-accent-color)}b-button[color=warning]::before{background-color:var(--b-focus-color)}b-button[color=danger]::before{background-color:var(--b-danger-color)}b-button[color=white],b-button[flat]{color:var(--b-primary-color)}b-button[color=white]::before{background-color:#fff}b-button[flat]::before{opacity:0;box-shadow:none}b-button[flat]:hover::before{opacity:.12}b-button[disabled]{opacity:.4;pointer-events:none}</style>"#, "block-dom/b-button.css");
