//! Markup tokenizer, tree builder and serializer for the in-memory [`Document`].
//!
//! This is deliberately a small subset of the HTML parsing algorithm: void elements, raw text
//! and escapable raw text elements, SVG foreign content, a handful of implied end tags, and
//! character references. Anything else is built as written.

use crate::{
	host::{Attribute, NodeKind, NS_SVG, NS_XLINK, NS_XML},
	memory::{Document, NodeId},
	Error,
};
use tracing::{instrument, trace, warn};

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
	Text(String),
	Comment(String),
	StartTag { name: String, attributes: Vec<(String, String)>, self_closing: bool },
	EndTag(String),
}

pub(crate) fn is_void_element(name: &str) -> bool {
	matches!(
		name.to_ascii_lowercase().as_str(),
		"area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta" | "param" | "source" | "track" | "wbr"
	)
}

/// Elements whose content is taken verbatim up to the matching end tag.
/// `true` means character references are still decoded (escapable raw text).
fn raw_text_kind(name: &str) -> Option<bool> {
	match name.to_ascii_lowercase().as_str() {
		"script" | "style" => Some(false),
		"textarea" | "title" => Some(true),
		_ => None,
	}
}

fn is_name_byte(byte: u8) -> bool {
	byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':' | b'.')
}

fn parse_error(offset: usize, message: &str) -> Error {
	Error::Parse { offset, message: message.to_owned() }
}

/// Splits `input` into tokens.
///
/// # Errors
///
/// On unterminated tags, attribute values and comments.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, Error> {
	let bytes = input.as_bytes();
	let mut tokens = Vec::new();
	let mut i = 0;
	// Slices are only ever cut at ASCII structural bytes, so they stay on UTF-8 boundaries.
	while i < bytes.len() {
		if bytes[i] != b'<' {
			let start = i;
			while i < bytes.len() && bytes[i] != b'<' {
				i += 1;
			}
			tokens.push(Token::Text(decode_entities(&input[start..i])));
			continue;
		}

		if input[i..].starts_with(COMMENT_START) {
			let body = i + COMMENT_START.len();
			let end = input[body..].find(COMMENT_END).ok_or_else(|| parse_error(i, "unterminated comment"))?;
			tokens.push(Token::Comment(input[body..body + end].to_owned()));
			i = body + end + COMMENT_END.len();
			continue;
		}

		if bytes.get(i + 1) == Some(&b'!') || bytes.get(i + 1) == Some(&b'?') {
			// Doctype or processing instruction. Neither has a place in fragments.
			let end = input[i..].find('>').ok_or_else(|| parse_error(i, "unterminated declaration"))?;
			trace!("Skipping declaration.");
			i += end + 1;
			continue;
		}

		if bytes.get(i + 1) == Some(&b'/') {
			let start = i + 2;
			let mut j = start;
			while j < bytes.len() && is_name_byte(bytes[j]) {
				j += 1;
			}
			let name = input[start..j].to_owned();
			let end = input[j..].find('>').ok_or_else(|| parse_error(i, "unterminated end tag"))?;
			i = j + end + 1;
			if name.is_empty() {
				warn!("Ignoring nameless end tag.");
			} else {
				tokens.push(Token::EndTag(name));
			}
			continue;
		}

		let start = i + 1;
		let mut j = start;
		while j < bytes.len() && is_name_byte(bytes[j]) {
			j += 1;
		}
		if j == start {
			// A lone `<` is text.
			tokens.push(Token::Text("<".to_owned()));
			i += 1;
			continue;
		}
		let name = input[start..j].to_owned();

		let mut attributes = Vec::new();
		let mut self_closing = false;
		let mut k = j;
		loop {
			while k < bytes.len() && bytes[k].is_ascii_whitespace() {
				k += 1;
			}
			match bytes.get(k) {
				None => return Err(parse_error(i, "unterminated start tag")),
				Some(b'>') => {
					k += 1;
					break;
				}
				Some(b'/') => {
					if bytes.get(k + 1) == Some(&b'>') {
						self_closing = true;
						k += 2;
						break;
					}
					k += 1;
					continue;
				}
				Some(_) => (),
			}

			let name_start = k;
			while k < bytes.len() && !bytes[k].is_ascii_whitespace() && !matches!(bytes[k], b'=' | b'>' | b'/' | b'"' | b'\'') {
				k += 1;
			}
			if name_start == k {
				// Stray quote.
				k += 1;
				continue;
			}
			let attribute_name = input[name_start..k].to_ascii_lowercase();

			while k < bytes.len() && bytes[k].is_ascii_whitespace() {
				k += 1;
			}
			let mut value = String::new();
			if bytes.get(k) == Some(&b'=') {
				k += 1;
				while k < bytes.len() && bytes[k].is_ascii_whitespace() {
					k += 1;
				}
				match bytes.get(k) {
					Some(&quote @ (b'"' | b'\'')) => {
						let value_start = k + 1;
						let end = input[value_start..]
							.find(quote as char)
							.ok_or_else(|| parse_error(k, "unterminated attribute value"))?;
						value = decode_entities(&input[value_start..value_start + end]);
						k = value_start + end + 1;
					}
					Some(_) => {
						let value_start = k;
						while k < bytes.len() && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
							k += 1;
						}
						value = decode_entities(&input[value_start..k]);
					}
					None => return Err(parse_error(i, "unterminated start tag")),
				}
			}

			// Duplicate attributes are dropped, as in the browser.
			if !attributes.iter().any(|(existing, _)| existing == &attribute_name) {
				attributes.push((attribute_name, value));
			}
		}
		i = k;

		let raw = if self_closing { None } else { raw_text_kind(&name) };
		tokens.push(Token::StartTag { name: name.clone(), attributes, self_closing });

		if let Some(escapable) = raw {
			let close = format!("</{}", name.to_ascii_lowercase());
			let end = find_ignore_ascii_case(&input[i..], &close).map_or(bytes.len(), |end| i + end);
			let text = &input[i..end];
			if !text.is_empty() {
				tokens.push(Token::Text(if escapable { decode_entities(text) } else { text.to_owned() }));
			}
			i = end;
		}
	}
	Ok(tokens)
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
	let haystack = haystack.as_bytes();
	let needle = needle.as_bytes();
	if haystack.len() < needle.len() {
		return None;
	}
	(0..=haystack.len() - needle.len()).find(|&start| haystack[start..start + needle.len()].eq_ignore_ascii_case(needle))
}

/// Decodes the common named character references and all numeric ones.
pub(crate) fn decode_entities(text: &str) -> String {
	if !text.contains('&') {
		return text.to_owned();
	}

	let mut decoded = String::with_capacity(text.len());
	let mut rest = text;
	while let Some(amp) = rest.find('&') {
		decoded.push_str(&rest[..amp]);
		rest = &rest[amp..];
		let semicolon = match rest.find(';') {
			Some(semicolon) if semicolon <= 10 => semicolon,
			_ => {
				decoded.push('&');
				rest = &rest[1..];
				continue;
			}
		};
		let reference = &rest[1..semicolon];
		let character = match reference {
			"amp" => Some('&'),
			"lt" => Some('<'),
			"gt" => Some('>'),
			"quot" => Some('"'),
			"apos" => Some('\''),
			"nbsp" => Some('\u{a0}'),
			_ => reference.strip_prefix('#').and_then(|number| {
				let code = match number.strip_prefix('x').or_else(|| number.strip_prefix('X')) {
					Some(hex) => u32::from_str_radix(hex, 16).ok(),
					None => number.parse().ok(),
				};
				code.and_then(char::from_u32)
			}),
		};
		match character {
			Some(character) => {
				decoded.push(character);
				rest = &rest[semicolon + 1..];
			}
			None => {
				decoded.push('&');
				rest = &rest[1..];
			}
		}
	}
	decoded.push_str(rest);
	decoded
}

/// Elements implicitly closed by a following sibling start tag of the same name.
fn closes_same_name(name: &str) -> bool {
	matches!(name.to_ascii_lowercase().as_str(), "p" | "li" | "option" | "dt" | "dd" | "tr" | "td" | "th")
}

fn split_attribute_name(name: &str) -> (Option<&'static str>, &str) {
	match name.split_once(':') {
		Some(("xlink", local)) => (Some(NS_XLINK), local),
		Some(("xml", local)) => (Some(NS_XML), local),
		_ => (None, name),
	}
}

/// Parses `markup` and appends the resulting nodes to `parent`.
///
/// # Errors
///
/// Iff tokenizing fails. `parent` is left untouched in that case.
#[instrument(skip(document, markup), fields(markup.len = markup.len()))]
pub(crate) fn parse_into(document: &mut Document, parent: NodeId, markup: &str) -> Result<(), Error> {
	let tokens = tokenize(markup)?;

	let parent_is_svg = document.namespace_of(parent) == Some(NS_SVG);
	let mut stack: Vec<(NodeId, bool)> = vec![(parent, parent_is_svg)];
	for token in tokens {
		let (top, in_svg) = stack.last().copied().unwrap_or((parent, parent_is_svg));
		match token {
			Token::Text(text) => {
				if !text.is_empty() {
					let text = document.create_text(&text);
					document.attach(top, text);
				}
			}
			Token::Comment(comment) => {
				let comment = document.create_comment(&comment);
				document.attach(top, comment);
			}
			Token::StartTag { name, attributes, self_closing } => {
				let svg = in_svg || name.eq_ignore_ascii_case("svg");
				if !svg && closes_same_name(&name) && stack.len() > 1 && document.name_of(top).eq_ignore_ascii_case(&name) {
					stack.pop();
				}
				let (top, _) = stack.last().copied().unwrap_or((parent, parent_is_svg));

				let element = if svg {
					document.new_element(&name, Some(NS_SVG), false)
				} else {
					document.new_element(&name, None, false)
				};
				for (attribute_name, value) in attributes {
					let (namespace, local) = split_attribute_name(&attribute_name);
					document.push_attribute(element, Attribute { namespace: namespace.map(str::to_owned), name: local.to_owned(), value });
				}
				document.attach(top, element);

				let is_void = if svg { self_closing } else { self_closing || is_void_element(&name) };
				if !is_void {
					let children_svg = svg && !name.eq_ignore_ascii_case("foreignObject");
					stack.push((element, children_svg));
				}
			}
			Token::EndTag(name) => {
				// Never pop the parent itself.
				match stack.iter().skip(1).rposition(|&(node, _)| document.name_of(node).eq_ignore_ascii_case(&name)) {
					Some(position) => stack.truncate(position + 1),
					None => trace!(name = %name, "Ignoring unmatched end tag."),
				}
			}
		}
	}
	Ok(())
}

fn escape_text(text: &str, out: &mut String) {
	for character in text.chars() {
		match character {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'\u{a0}' => out.push_str("&nbsp;"),
			_ => out.push(character),
		}
	}
}

fn escape_attribute(value: &str, out: &mut String) {
	for character in value.chars() {
		match character {
			'&' => out.push_str("&amp;"),
			'"' => out.push_str("&quot;"),
			'\u{a0}' => out.push_str("&nbsp;"),
			_ => out.push(character),
		}
	}
}

pub(crate) fn serialize_children(document: &Document, node: NodeId, out: &mut String) {
	let raw = document.kind_of(node) == NodeKind::Element && matches!(raw_text_kind(document.name_of(node)), Some(false));
	for &child in document.children(node) {
		if raw && document.kind_of(child) == NodeKind::Text {
			out.push_str(document.data_of(child).unwrap_or_default());
		} else {
			serialize_node(document, child, out);
		}
	}
}

pub(crate) fn serialize_node(document: &Document, node: NodeId, out: &mut String) {
	match document.kind_of(node) {
		NodeKind::Text => escape_text(document.data_of(node).unwrap_or_default(), out),
		NodeKind::Comment => {
			out.push_str(COMMENT_START);
			out.push_str(document.data_of(node).unwrap_or_default());
			out.push_str(COMMENT_END);
		}
		NodeKind::DocumentFragment | NodeKind::Document => serialize_children(document, node, out),
		NodeKind::Element => {
			let html = document.namespace_of(node) != Some(NS_SVG);
			let name = if html { document.name_of(node).to_ascii_lowercase() } else { document.name_of(node).to_owned() };
			out.push('<');
			out.push_str(&name);
			for Attribute { namespace, name, value } in document.attribute_list(node) {
				out.push(' ');
				match namespace.as_deref() {
					Some(NS_XLINK) => out.push_str("xlink:"),
					Some(NS_XML) => out.push_str("xml:"),
					_ => (),
				}
				out.push_str(name);
				out.push_str("=\"");
				escape_attribute(value, out);
				out.push('"');
			}
			if html && is_void_element(&name) {
				out.push('>');
				return;
			}
			if !html && document.children(node).is_empty() {
				out.push_str("/>");
				return;
			}
			out.push('>');
			serialize_children(document, node, out);
			out.push_str("</");
			out.push_str(&name);
			out.push('>');
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tokenizes_attributes_in_all_quoting_styles() {
		let tokens = tokenize(r#"<input name='fio' value="a &amp; b" disabled type=text/>"#).unwrap();
		assert_eq!(
			tokens,
			vec![Token::StartTag {
				name: "input".to_owned(),
				attributes: vec![
					("name".to_owned(), "fio".to_owned()),
					("value".to_owned(), "a & b".to_owned()),
					("disabled".to_owned(), String::new()),
					("type".to_owned(), "text/".to_owned()),
				],
				self_closing: false,
			}]
		);
	}

	#[test]
	fn textarea_content_is_not_markup() {
		let tokens = tokenize("<textarea><b>x</b> &lt;</textarea>").unwrap();
		assert_eq!(tokens[1], Token::Text("<b>x</b> <".to_owned()));
		assert_eq!(tokens[2], Token::EndTag("textarea".to_owned()));
	}

	#[test]
	fn unterminated_constructs_are_errors() {
		assert!(matches!(tokenize("<div class=\"x>"), Err(Error::Parse { .. })));
		assert!(matches!(tokenize("<div"), Err(Error::Parse { .. })));
		assert!(matches!(tokenize("<!-- nope"), Err(Error::Parse { .. })));
	}

	#[test]
	fn lone_angle_bracket_is_text() {
		assert_eq!(tokenize("a < b").unwrap(), vec![Token::Text("a ".to_owned()), Token::Text("<".to_owned()), Token::Text(" b".to_owned())]);
	}

	#[test]
	fn numeric_references() {
		assert_eq!(decode_entities("&#1060;&#x418;&unknown; & done"), "ФИ&unknown; & done");
	}
}
