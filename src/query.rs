//! Query string encoding and decoding.
//!
//! Keys are sorted on both ends. Encoding is strict by default: everything but ASCII alphanumerics and `-_.~` is
//! percent-encoded.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde_json::{Map, Value};
use std::{collections::BTreeMap, sync::OnceLock};
use tracing::error;

const STRICT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');
const URI_COMPONENT: &AsciiSet = &STRICT.remove(b'!').remove(b'*').remove(b'\'').remove(b'(').remove(b')');

/// How array values are written and read.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ArrayFormat {
	/// `a=1&a=2`
	#[default]
	None,
	/// `a[]=1&a[]=2`
	Bracket,
	/// `a[0]=1&a[1]=2`
	Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringifyOptions {
	pub encode: bool,
	/// Also encode `!'()*`.
	pub strict: bool,
	pub array_format: ArrayFormat,
}
impl Default for StringifyOptions {
	fn default() -> Self {
		Self { encode: true, strict: true, array_format: ArrayFormat::None }
	}
}

fn encode(text: &str, options: &StringifyOptions) -> String {
	match (options.encode, options.strict) {
		(false, _) => text.to_owned(),
		(true, true) => utf8_percent_encode(text, STRICT).to_string(),
		(true, false) => utf8_percent_encode(text, URI_COMPONENT).to_string(),
	}
}

fn scalar(value: &Value) -> String {
	match value {
		Value::String(string) => string.clone(),
		other => other.to_string(),
	}
}

/// [`stringify_with`] using the default options.
#[must_use]
pub fn stringify(object: &Map<String, Value>) -> String {
	stringify_with(object, &StringifyOptions::default())
}

/// Encodes `object` as a query string, without leading `?`.
///
/// `null` values produce a bare key. Arrays are written according to [`StringifyOptions::array_format`],
/// with `null` items as bare keys.
///
/// ```
/// use block_dom::query::stringify;
/// use serde_json::json;
///
/// let object = json!({"b": "a b", "a": ["x", "y"], "c": null, "d": true});
/// assert_eq!(stringify(object.as_object().unwrap()), "a=x&a=y&b=a%20b&c&d=true");
/// ```
#[must_use]
pub fn stringify_with(object: &Map<String, Value>, options: &StringifyOptions) -> String {
	let mut keys: Vec<&String> = object.keys().collect();
	keys.sort();

	keys.into_iter()
		.map(|key| match &object[key.as_str()] {
			Value::Null => encode(key, options),
			Value::Array(items) => items
				.iter()
				.enumerate()
				.map(|(index, item)| match (options.array_format, item) {
					(ArrayFormat::Index, Value::Null) => format!("{}[{}]", encode(key, options), index),
					(ArrayFormat::Index, item) => format!("{}[{}]={}", encode(key, options), encode(&index.to_string(), options), encode(&scalar(item), options)),
					(ArrayFormat::Bracket, Value::Null) | (ArrayFormat::None, Value::Null) => encode(key, options),
					(ArrayFormat::Bracket, item) => format!("{}[]={}", encode(key, options), encode(&scalar(item), options)),
					(ArrayFormat::None, item) => format!("{}={}", encode(key, options), encode(&scalar(item), options)),
				})
				.collect::<Vec<_>>()
				.join("&"),
			value => format!("{}={}", encode(key, options), encode(&scalar(value), options)),
		})
		.filter(|part| !part.is_empty())
		.collect::<Vec<_>>()
		.join("&")
}

fn decode(text: &str) -> String {
	percent_decode_str(text).decode_utf8_lossy().into_owned()
}

enum Accumulated {
	Single(Value),
	List(Vec<Value>),
	Indexed(Vec<(String, Value)>),
}

impl Accumulated {
	fn concat(self, value: Value) -> Self {
		match self {
			Self::Single(first) => Self::List(vec![first, value]),
			Self::List(mut list) => {
				list.push(value);
				Self::List(list)
			}
			Self::Indexed(_) => Self::Single(value),
		}
	}
}

fn index_suffix() -> Option<&'static Regex> {
	static SUFFIX: OnceLock<Option<Regex>> = OnceLock::new();
	SUFFIX.get_or_init(|| Regex::new(r"\[(\d*)\]$").map_err(|error| error!("Invalid index pattern: {}", error)).ok()).as_ref()
}

/// [`parse_with`] using [`ArrayFormat::None`].
#[must_use]
pub fn parse(query: &str) -> Map<String, Value> {
	parse_with(query, ArrayFormat::None)
}

/// Decodes a query string. A leading `?`, `#` or `&` is ignored, `+` decodes to a space and keys without `=` get `null`.
///
/// ```
/// use block_dom::query::{parse_with, ArrayFormat};
/// use serde_json::json;
///
/// assert_eq!(
/// 	serde_json::Value::Object(parse_with("?b[1]=y&b[0]=x&a=1+2&c", ArrayFormat::Index)),
/// 	json!({"a": "1 2", "b": ["x", "y"], "c": null}),
/// );
/// ```
#[must_use]
pub fn parse_with(query: &str, array_format: ArrayFormat) -> Map<String, Value> {
	let query = query.trim();
	let query = query.strip_prefix(&['?', '#', '&'][..]).unwrap_or(query);

	let mut accumulator: BTreeMap<String, Accumulated> = BTreeMap::new();
	if !query.is_empty() {
		for parameter in query.split('&') {
			let parameter = parameter.replace('+', " ");
			let (key, value) = match parameter.split_once('=') {
				Some((key, value)) => (decode(key), Value::String(decode(value))),
				None => (decode(&parameter), Value::Null),
			};
			accumulate(&mut accumulator, key, value, array_format);
		}
	}

	accumulator
		.into_iter()
		.map(|(key, accumulated)| {
			let value = match accumulated {
				Accumulated::Single(value) => value,
				Accumulated::List(list) => Value::Array(list),
				Accumulated::Indexed(mut entries) => {
					entries.sort_by(|(a, _), (b, _)| {
						let (a, b) = (a.parse::<f64>().unwrap_or(0.0), b.parse::<f64>().unwrap_or(0.0));
						a.total_cmp(&b)
					});
					Value::Array(entries.into_iter().map(|(_, value)| value).collect())
				}
			};
			(key, value)
		})
		.collect()
}

fn accumulate(accumulator: &mut BTreeMap<String, Accumulated>, key: String, value: Value, array_format: ArrayFormat) {
	match array_format {
		ArrayFormat::None => {
			let next = match accumulator.remove(&key) {
				Some(existing) => existing.concat(value),
				None => Accumulated::Single(value),
			};
			accumulator.insert(key, next);
		}
		ArrayFormat::Bracket => match key.strip_suffix("[]") {
			None => {
				accumulator.insert(key, Accumulated::Single(value));
			}
			Some(stripped) => {
				let next = match accumulator.remove(stripped) {
					Some(existing) => existing.concat(value),
					None => Accumulated::List(vec![value]),
				};
				accumulator.insert(stripped.to_owned(), next);
			}
		},
		ArrayFormat::Index => {
			let split = index_suffix().and_then(|suffix| suffix.captures(&key)).and_then(|captures| {
				let (whole, index) = (captures.get(0)?, captures.get(1)?);
				Some((key[..whole.start()].to_owned(), index.as_str().to_owned()))
			});
			let (stripped, index) = match split {
				Some(split) => split,
				None => {
					accumulator.insert(key, Accumulated::Single(value));
					return;
				}
			};
			match accumulator.entry(stripped).or_insert_with(|| Accumulated::Indexed(Vec::new())) {
				Accumulated::Indexed(entries) => match entries.iter_mut().find(|(existing, _)| *existing == index) {
					Some((_, existing)) => *existing = value,
					None => entries.push((index, value)),
				},
				// Indexing into a scalar is a no-op.
				Accumulated::Single(_) | Accumulated::List(_) => (),
			}
		}
	}
}

/// The part of `url` after the first `?`, or `""`.
#[must_use]
pub fn extract(url: &str) -> &str {
	url.split('?').nth(1).unwrap_or("")
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn object(value: Value) -> Map<String, Value> {
		match value {
			Value::Object(object) => object,
			_ => unreachable!(),
		}
	}

	#[test]
	fn strict_encoding() {
		assert_eq!(stringify(&object(json!({"foo": "bar!'()*"}))), "foo=bar%21%27%28%29%2A");
		let loose = StringifyOptions { strict: false, ..StringifyOptions::default() };
		assert_eq!(stringify_with(&object(json!({"foo": "bar!'()*"})), &loose), "foo=bar!'()*");
		let raw = StringifyOptions { encode: false, ..StringifyOptions::default() };
		assert_eq!(stringify_with(&object(json!({"a b": "c d"})), &raw), "a b=c d");
	}

	#[test]
	fn array_formats() {
		let data = object(json!({"a": ["x", null, "y"]}));
		assert_eq!(stringify(&data), "a=x&a&a=y");
		let bracket = StringifyOptions { array_format: ArrayFormat::Bracket, ..StringifyOptions::default() };
		assert_eq!(stringify_with(&data, &bracket), "a[]=x&a&a[]=y");
		let index = StringifyOptions { array_format: ArrayFormat::Index, ..StringifyOptions::default() };
		assert_eq!(stringify_with(&data, &index), "a[0]=x&a[1]&a[2]=y");
	}

	#[test]
	fn form_data() {
		let data = object(json!({"fio": "Ivan Ivanovich Ivanov", "email": "test@yandex.ru", "agree": true}));
		assert_eq!(stringify(&data), "agree=true&email=test%40yandex.ru&fio=Ivan%20Ivanovich%20Ivanov");
	}

	#[test]
	fn parses() {
		assert_eq!(Value::Object(parse("?foo=bar&foo=baz&x")), json!({"foo": ["bar", "baz"], "x": null}));
		assert_eq!(Value::Object(parse("#a=%F0%9F%A6%80")), json!({"a": "🦀"}));
		assert_eq!(Value::Object(parse_with("a[]=1&a[]=2&b=3", ArrayFormat::Bracket)), json!({"a": ["1", "2"], "b": "3"}));
		assert!(parse("  ").is_empty());
		assert_eq!(Value::Object(parse("a=b=c")), json!({"a": "b=c"}));
	}

	#[test]
	fn extracts() {
		assert_eq!(extract("https://example.com/?a=1"), "a=1");
		assert_eq!(extract("https://example.com/"), "");
	}
}
