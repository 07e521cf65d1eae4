//! Compact JSON snapshots of the current state, given to the model as continuity context.

use serde_json::{Map, Value, json};

use diana_notes::{Appointment, Thought, ThoughtDocument, TodoItem, outline};

pub fn todo_prior(items: &[TodoItem]) -> Value {
	let items: Vec<Value> = items
		.iter()
		.map(|item| {
			json!({
				"text": item.text,
				"status": item.status,
				"tags": item.tag_ids,
				"due_date": non_empty(&item.due_date),
				"event_date": non_empty(&item.event_date),
				"id": non_empty(&item.note_id),
			})
		})
		.collect();

	json!({ "items": items })
}

pub fn appointment_prior(updated: &str, items: &[Appointment]) -> Value {
	let items: Vec<Value> = items
		.iter()
		.map(|item| json!({ "text": item.text, "datetime": item.datetime, "location": item.location }))
		.collect();

	json!({ "updated": updated, "items": items })
}

/// Thoughts snapshot. `sections` is present only with a document; `items` is always present.
pub fn thought_prior(thoughts: &str, document: Option<&ThoughtDocument>, items: &[Thought]) -> Value {
	let mut payload = Map::new();
	let body = document.map(|document| document.markdown_body.as_str()).unwrap_or(thoughts);

	payload.insert("markdown_body".to_string(), Value::String(body.to_string()));

	if let Some(document) = document {
		payload.insert("sections".to_string(), outline::sections_to_value(&document.outline.sections));
	}

	let items = items.iter().map(|item| json!({ "text": item.text, "tags": item.tag_ids })).collect();

	payload.insert("items".to_string(), Value::Array(items));

	Value::Object(payload)
}

fn non_empty(value: &str) -> Option<&str> {
	if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn todo_prior_nulls_blank_fields() {
		let items = vec![TodoItem {
			text: "Buy milk".to_string(),
			status: "pending".to_string(),
			tag_ids: vec!["home".to_string()],
			due_date: "2024-10-02".to_string(),
			..Default::default()
		}];

		assert_eq!(
			todo_prior(&items),
			json!({
				"items": [{
					"text": "Buy milk",
					"status": "pending",
					"tags": ["home"],
					"due_date": "2024-10-02",
					"event_date": null,
					"id": null,
				}],
			})
		);
	}

	#[test]
	fn thought_prior_is_minimal_without_document_or_items() {
		assert_eq!(
			thought_prior("Existing notes", None, &[]),
			json!({ "markdown_body": "Existing notes", "items": [] })
		);
	}

	#[test]
	fn thought_prior_prefers_the_document_body() {
		let document = ThoughtDocument::new("# Doc");
		let items = vec![Thought { text: "Idea".to_string(), ..Default::default() }];
		let prior = thought_prior("stale", Some(&document), &items);

		assert_eq!(prior["markdown_body"], "# Doc");
		assert_eq!(prior["sections"], json!([]));
		assert_eq!(prior["items"], json!([{ "text": "Idea", "tags": [] }]));
	}

	#[test]
	fn appointment_prior_carries_flat_text() {
		let items = vec![Appointment { text: "Dentist".to_string(), ..Default::default() }];

		assert_eq!(
			appointment_prior("Dentist", &items),
			json!({ "updated": "Dentist", "items": [{ "text": "Dentist", "datetime": "", "location": "" }] })
		);
	}
}
