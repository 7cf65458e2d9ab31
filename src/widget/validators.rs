//! Field validators of the contact form.

use regex::Regex;
use std::sync::OnceLock;
use tracing::error;

pub const VALID_EMAIL_DOMAINS: [&str; 6] = ["ya.ru", "yandex.ru", "yandex.ua", "yandex.by", "yandex.kz", "yandex.com"];

const PHONE_PATTERN: &str = r"^[+]([7])[(]([0-9])([0-9])([0-9])[)]([0-9])([0-9])([0-9])-([0-9])([0-9])-([0-9])([0-9])$";

/// Upper bound (inclusive) of the digit sum of a valid phone number.
pub const MAX_PHONE_DIGIT_SUM: u32 = 30;

pub type Validator = fn(&str) -> bool;

/// Looks up the validator for a form field.
#[must_use]
pub fn for_field(name: &str) -> Option<Validator> {
	match name {
		"fio" => Some(fio),
		"email" => Some(email),
		"phone" => Some(phone),
		_ => None,
	}
}

/// Exactly three space-separated parts.
#[must_use]
pub fn fio(value: &str) -> bool {
	value.split(' ').count() == 3
}

/// Exactly one `@`, followed by one of [`VALID_EMAIL_DOMAINS`].
#[must_use]
pub fn email(value: &str) -> bool {
	match value.split('@').collect::<Vec<_>>().as_slice() {
		[_, domain] => VALID_EMAIL_DOMAINS.contains(domain),
		_ => false,
	}
}

/// `+7(ddd)ddd-dd-dd` whose digits, the leading 7 included, sum to at most [`MAX_PHONE_DIGIT_SUM`].
#[must_use]
pub fn phone(value: &str) -> bool {
	static MASK: OnceLock<Option<Regex>> = OnceLock::new();
	let mask = MASK.get_or_init(|| Regex::new(PHONE_PATTERN).map_err(|error| error!("Invalid phone pattern: {}", error)).ok());
	let captures = match mask.as_ref().and_then(|mask| mask.captures(value)) {
		Some(captures) => captures,
		None => return false,
	};
	let sum: u32 = captures.iter().skip(1).flatten().filter_map(|digit| digit.as_str().parse::<u32>().ok()).sum();
	sum <= MAX_PHONE_DIGIT_SUM
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fio_needs_three_parts() {
		assert!(!fio("Ivan"));
		assert!(!fio("Ivan Ivanovich"));
		assert!(fio("Ivan Ivanovich Ivanov"));
		assert!(!fio("Ivan  Ivanovich Ivanov"));
	}

	#[test]
	fn email_domains() {
		assert!(email("user@yandex.ru"));
		assert!(email("test@ya.ru"));
		assert!(!email("user@gmail.com"));
		assert!(!email("user@@yandex.ru"));
		assert!(!email("test"));
	}

	#[test]
	fn phone_digit_sum_boundary() {
		// 7 + 1+1+1 + 5+5+5 + 1+1 + 1+1 = 29
		assert!(phone("+7(111)555-11-11"));
		assert!(phone("+7(111)555-11-12"));
		assert!(!phone("+7(111)555-11-13"));
		assert!(!phone("+7(999)999-99-99"));
		assert!(!phone("12345678901"));
		assert!(!phone("test"));
	}
}
