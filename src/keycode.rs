//! Key names and legacy `keyCode` values.

use hashbrown::HashMap;
use std::sync::OnceLock;

const NAMED: &[(&str, u32)] = &[
	("backspace", 8),
	("tab", 9),
	("enter", 13),
	("shift", 16),
	("ctrl", 17),
	("alt", 18),
	("pause/break", 19),
	("caps lock", 20),
	("esc", 27),
	("space", 32),
	("page up", 33),
	("page down", 34),
	("end", 35),
	("home", 36),
	("left", 37),
	("up", 38),
	("right", 39),
	("down", 40),
	("insert", 45),
	("delete", 46),
	("command", 91),
	("left command", 91),
	("right command", 93),
	("numpad *", 106),
	("numpad +", 107),
	("numpad -", 109),
	("numpad .", 110),
	("numpad /", 111),
	("num lock", 144),
	("scroll lock", 145),
	("my computer", 182),
	("my calculator", 183),
	(";", 186),
	("=", 187),
	(",", 188),
	("-", 189),
	(".", 190),
	("/", 191),
	("`", 192),
	("[", 219),
	("\\", 220),
	("]", 221),
	("'", 222),
];

/// Alternative names. These are never returned by [`name`].
pub const ALIASES: &[(&str, u32)] = &[
	("windows", 91),
	("⇧", 16),
	("⌥", 18),
	("⌃", 17),
	("⌘", 91),
	("ctl", 17),
	("control", 17),
	("option", 18),
	("pause", 19),
	("break", 19),
	("caps", 20),
	("return", 13),
	("escape", 27),
	("spc", 32),
	("pgup", 33),
	("pgdn", 34),
	("ins", 45),
	("del", 46),
	("cmd", 91),
];

struct Tables {
	codes: HashMap<String, u32>,
	aliases: HashMap<&'static str, u32>,
	names: HashMap<u32, String>,
}

fn tables() -> &'static Tables {
	static TABLES: OnceLock<Tables> = OnceLock::new();
	TABLES.get_or_init(|| {
		// Digits come first so that later entries win in the reverse mapping.
		let entries: Vec<(String, u32)> = (0..10)
			.map(|digit| (digit.to_string(), 48 + digit))
			.chain(NAMED.iter().map(|&(name, code)| (name.to_owned(), code)))
			.chain((b'a'..=b'z').map(|letter| ((letter as char).to_string(), u32::from(letter) - 32)))
			.chain((1..13).map(|index| (format!("f{}", index), index + 111)))
			.chain((0..10).map(|index| (format!("numpad {}", index), index + 96)))
			.collect();

		let mut names = HashMap::new();
		for (name, code) in &entries {
			names.insert(*code, name.clone());
		}
		Tables { codes: entries.into_iter().collect(), aliases: ALIASES.iter().copied().collect(), names }
	})
}

/// Looks up the code of a key name or alias, case-insensitively.
///
/// Any other single character maps to its code point.
///
/// ```
/// use block_dom::keycode::code;
///
/// assert_eq!(code("Enter"), Some(13));
/// assert_eq!(code("return"), Some(13));
/// assert_eq!(code("A"), Some(65));
/// assert_eq!(code("~"), Some(126));
/// assert_eq!(code("no such key"), None);
/// ```
#[must_use]
pub fn code(name: &str) -> Option<u32> {
	let tables = tables();
	let lowercase = name.to_lowercase();
	if let Some(&code) = tables.codes.get(&lowercase).or_else(|| tables.aliases.get(lowercase.as_str())) {
		return Some(code);
	}

	let mut chars = name.chars();
	match (chars.next(), chars.next()) {
		(Some(single), None) => Some(u32::from(single)),
		_ => None,
	}
}

/// The canonical name of a key code.
#[must_use]
pub fn name(code: u32) -> Option<&'static str> {
	tables().names.get(&code).map(String::as_str)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn names() {
		assert_eq!(name(13), Some("enter"));
		assert_eq!(name(91), Some("left command"));
		assert_eq!(name(48), Some("0"));
		assert_eq!(name(65), Some("a"));
		assert_eq!(name(112), Some("f1"));
		assert_eq!(name(96), Some("numpad 0"));
		assert_eq!(name(1), None);
	}

	#[test]
	fn codes() {
		assert_eq!(code("f12"), Some(123));
		assert_eq!(code("Numpad 9"), Some(105));
		assert_eq!(code("⌘"), Some(91));
		assert_eq!(code("7"), Some(55));
		assert_eq!(code(""), None);
	}
}
