//! A DOM morpher that patches live element trees in place, and a small custom-element widget library on top of it.
//!
//! The core is [`morph::morph`], which works against any [`Host`](`host::Host`) tree.
//! Two hosts are included: the in-memory [`memory::Document`] and, with the `web` feature, [`web::WebHost`] over `web-sys`.

#![doc(html_root_url = "https://docs.rs/block-dom/0.0.1")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod error;
pub mod host;
pub mod keycode;
mod markup;
pub mod memory;
pub mod morph;
pub mod query;
pub mod styles;
pub mod widget;

#[cfg(feature = "web")]
pub mod web;

pub use error::Error;

#[cfg(feature = "dangerous-logging")]
pub(crate) fn redact(value: &str) -> &str {
	value
}

#[cfg(not(feature = "dangerous-logging"))]
pub(crate) fn redact(_value: &str) -> &str {
	"[redacted]"
}
