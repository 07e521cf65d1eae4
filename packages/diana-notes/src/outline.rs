//! Codec between JSON section trees and [`ThoughtOutlineSection`]s.

use serde_json::{Value, json};

use crate::thought::ThoughtOutlineSection;

/// Parses a section list. Entries without a title and non-object entries are dropped.
pub fn parse_sections(value: Option<&Value>) -> Vec<ThoughtOutlineSection> {
	let Some(entries) = value.and_then(Value::as_array) else {
		return Vec::new();
	};

	entries
		.iter()
		.filter_map(|entry| {
			let section = parse_section(entry);

			if section.is_none() {
				tracing::debug!(entry = %entry, "Dropping malformed outline section.");
			}

			section
		})
		.collect()
}

pub fn section_to_value(section: &ThoughtOutlineSection) -> Value {
	json!({
		"title": section.title,
		"level": section.level,
		"anchor": section.anchor,
		"children": sections_to_value(&section.children),
	})
}

pub fn sections_to_value(sections: &[ThoughtOutlineSection]) -> Value {
	Value::Array(sections.iter().map(section_to_value).collect())
}

/// Slug of `title`, or a stable `section-{hex}` id when the slug is empty.
pub fn default_anchor(title: &str) -> String {
	let kept: String = title
		.to_lowercase()
		.chars()
		.filter(|ch| ch.is_alphanumeric() || ch.is_whitespace())
		.collect();
	let slug: String =
		kept.trim().chars().map(|ch| if ch.is_whitespace() { '-' } else { ch }).collect();

	if !slug.is_empty() {
		return slug;
	}

	let digest = blake3::hash(title.as_bytes());
	let bytes = digest.as_bytes();

	format!("section-{:x}", u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn parse_section(entry: &Value) -> Option<ThoughtOutlineSection> {
	let entry = entry.as_object()?;
	let title = entry.get("title").and_then(Value::as_str).map(str::trim).unwrap_or_default();

	if title.is_empty() {
		return None;
	}

	let anchor = match entry.get("anchor").and_then(Value::as_str).map(str::trim) {
		Some(anchor) if !anchor.is_empty() => anchor.to_string(),
		_ => default_anchor(title),
	};

	Some(ThoughtOutlineSection {
		title: title.to_string(),
		level: parse_level(entry.get("level")),
		anchor,
		children: parse_sections(entry.get("children")),
	})
}

fn parse_level(value: Option<&Value>) -> u32 {
	let raw = match value {
		Some(Value::Number(number)) =>
			number.as_i64().or_else(|| number.as_f64().map(|level| level as i64)),
		Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
		_ => None,
	};

	raw.unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn anchors_slug_titles() {
		assert_eq!(default_anchor("Next Steps!"), "next-steps");
		assert_eq!(default_anchor("  Città  vecchia "), "città--vecchia");
	}

	#[test]
	fn symbol_titles_get_stable_hash_anchor() {
		let first = default_anchor("!!!");

		assert!(first.starts_with("section-"));
		assert_eq!(first, default_anchor("!!!"));
		assert_ne!(first, default_anchor("???"));
	}

	#[test]
	fn levels_default_and_clamp() {
		let sections = parse_sections(Some(&json!([
			{ "title": "A" },
			{ "title": "B", "level": "3" },
			{ "title": "C", "level": 0 },
			{ "title": "D", "level": "deep" },
		])));
		let levels: Vec<u32> = sections.iter().map(|section| section.level).collect();

		assert_eq!(levels, vec![1, 3, 1, 1]);
	}

	#[test]
	fn malformed_entries_are_dropped() {
		let sections = parse_sections(Some(&json!([
			"heading",
			{ "title": "  " },
			{ "title": "Kept", "anchor": "custom", "children": [{ "level": 2 }, { "title": "Child", "level": 2 }] },
		])));

		assert_eq!(sections.len(), 1);
		assert_eq!(sections[0].anchor, "custom");
		assert_eq!(sections[0].children.len(), 1);
		assert_eq!(sections[0].children[0].anchor, "child");
	}

	#[test]
	fn render_then_parse_is_identity() {
		let sections = parse_sections(Some(&json!([
			{ "title": "Plans", "level": 1, "children": [{ "title": "Trips", "level": 2 }] },
			{ "title": "???", "level": 4 },
		])));
		let rendered = sections_to_value(&sections);

		assert_eq!(parse_sections(Some(&rendered)), sections);
	}

	#[test]
	fn non_list_values_parse_empty() {
		assert!(parse_sections(Some(&json!({ "title": "A" }))).is_empty());
		assert!(parse_sections(None).is_empty());
	}
}
