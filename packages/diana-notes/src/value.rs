//! Lenient readers for loosely typed stored documents.

use serde_json::{Map, Value};

pub type DocumentData = Map<String, Value>;

/// Best-effort conversion of stored timestamp fields to integers.
///
/// Anything that is not a number, a boolean or a numeric string coerces to `0`.
pub fn coerce_int(value: Option<&Value>) -> i64 {
	match value {
		Some(Value::Bool(flag)) => i64::from(*flag),
		Some(Value::Number(number)) => number
			.as_i64()
			.or_else(|| number.as_f64().filter(|raw| raw.is_finite()).map(|raw| raw as i64))
			.unwrap_or(0),
		Some(Value::String(raw)) => parse_numeric(raw).unwrap_or(0),
		_ => 0,
	}
}

/// Reads a scalar field as trimmed text. Missing, null and nested values read as empty.
pub fn string_field(data: &DocumentData, key: &str) -> String {
	scalar_text(data.get(key)).trim().to_string()
}

/// Like [`string_field`] but maps blank values to `None`.
pub fn optional_string_field(data: &DocumentData, key: &str) -> Option<String> {
	let value = string_field(data, key);

	if value.is_empty() { None } else { Some(value) }
}

/// Reads a list field. Non-list values read as empty; scalar items are stringified.
pub fn string_sequence(value: Option<&Value>) -> Vec<String> {
	match value {
		Some(Value::Array(items)) => items.iter().map(|item| scalar_text(Some(item))).collect(),
		_ => Vec::new(),
	}
}

/// Trims, drops blanks and removes duplicates while keeping first-seen order.
pub fn sanitize_strings<I, S>(values: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut seen: Vec<String> = Vec::new();

	for value in values {
		let trimmed = value.as_ref().trim();

		if !trimmed.is_empty() && !seen.iter().any(|existing| existing == trimmed) {
			seen.push(trimmed.to_string());
		}
	}

	seen
}

pub(crate) fn as_object(value: Option<&Value>) -> Option<&DocumentData> {
	value.and_then(Value::as_object)
}

fn scalar_text(value: Option<&Value>) -> String {
	match value {
		Some(Value::String(raw)) => raw.clone(),
		Some(Value::Number(number)) => number.to_string(),
		Some(Value::Bool(flag)) => flag.to_string(),
		_ => String::new(),
	}
}

fn parse_numeric(raw: &str) -> Option<i64> {
	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return None;
	}

	trimmed.parse::<i64>().ok().or_else(|| {
		trimmed.parse::<f64>().ok().filter(|parsed| parsed.is_finite()).map(|parsed| parsed as i64)
	})
}
