//! Parsing of generation payloads and merging into the current state.

use std::collections::HashMap;

use serde_json::Value;

use crate::catalog::TagCatalogSnapshot;
use diana_notes::{
	Appointment, Thought, ThoughtDocument, ThoughtOutline, TodoItem, outline,
	value::{self, DocumentData},
};

/// Todo entries of a payload. Entries without text are skipped.
pub fn parse_todo_entries(payload: &DocumentData, snapshot: &TagCatalogSnapshot) -> Vec<TodoItem> {
	entries(payload, "items")
		.filter_map(|entry| {
			let text = value::string_field(entry, "text");

			if text.is_empty() {
				return None;
			}

			Some(TodoItem {
				text,
				status: value::string_field(entry, "status"),
				tag_ids: snapshot.sanitize_tag_ids(&value::string_sequence(entry.get("tags"))),
				tag_labels: Vec::new(),
				due_date: value::string_field(entry, "due_date"),
				event_date: value::string_field(entry, "event_date"),
				note_id: value::string_field(entry, "id"),
				created_at: 0,
			})
		})
		.collect()
}

/// Merges `incoming` into `existing` by identity key.
///
/// Matching items are overwritten in place, new keys are appended and absent items are kept.
/// An overwritten item keeps its `created_at` when the incoming item has none.
pub fn merge_todos(existing: &[TodoItem], incoming: Vec<TodoItem>) -> Vec<TodoItem> {
	let mut merged: Vec<TodoItem> = Vec::with_capacity(existing.len() + incoming.len());
	let mut positions: HashMap<String, usize> = HashMap::new();

	for item in existing.iter().cloned().chain(incoming) {
		let key = item.identity_key().to_string();

		match positions.get(&key) {
			Some(&index) => {
				let created_at =
					if item.created_at == 0 { merged[index].created_at } else { item.created_at };

				merged[index] = TodoItem { created_at, ..item };
			},
			None => {
				positions.insert(key, merged.len());
				merged.push(item);
			},
		}
	}

	merged
}

/// New flat text and items of an appointments payload. A missing `updated` keeps `current`.
pub fn parse_appointments(payload: &DocumentData, current: &str) -> (String, Vec<Appointment>) {
	let updated = match payload.get("updated") {
		Some(Value::String(text)) => text.clone(),
		None | Some(Value::Null) => current.to_string(),
		Some(other) => other.to_string(),
	};
	let items = entries(payload, "items")
		.filter_map(|entry| {
			let text = value::string_field(entry, "text");

			if text.is_empty() {
				return None;
			}

			Some(Appointment {
				text,
				datetime: value::string_field(entry, "datetime"),
				location: value::string_field(entry, "location"),
				created_at: 0,
			})
		})
		.collect();

	(updated, items)
}

/// Rebuilt thought document and items of a thoughts payload.
pub fn parse_thoughts(
	payload: &DocumentData,
	current: &str,
	snapshot: &TagCatalogSnapshot,
) -> (ThoughtDocument, Vec<Thought>) {
	let markdown = match payload.get("updated_markdown") {
		Some(Value::String(markdown)) => markdown.clone(),
		None | Some(Value::Null) => current.to_string(),
		Some(other) => other.to_string(),
	};
	let sections = outline::parse_sections(payload.get("sections"));
	let items = entries(payload, "items")
		.filter_map(|entry| {
			let text = value::string_field(entry, "text");

			if text.is_empty() {
				return None;
			}

			Some(Thought {
				text,
				tag_ids: snapshot.sanitize_tag_ids(&value::string_sequence(entry.get("tags"))),
				..Default::default()
			})
		})
		.collect();

	(ThoughtDocument { markdown_body: markdown, outline: ThoughtOutline { sections } }, items)
}

fn entries<'a>(
	payload: &'a DocumentData,
	key: &str,
) -> impl Iterator<Item = &'a DocumentData> + use<'a> {
	payload
		.get(key)
		.and_then(Value::as_array)
		.map(Vec::as_slice)
		.unwrap_or_default()
		.iter()
		.filter_map(|entry| {
			let object = entry.as_object();

			if object.is_none() {
				tracing::debug!(entry = %entry, "Skipping malformed response entry.");
			}

			object
		})
}
