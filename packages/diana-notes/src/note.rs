use serde::Serialize;
use serde_json::{Value, json};

use crate::{
	Result,
	session::{self, AspectSelection},
	tags::{self, TagMappingContext},
	thought::ThoughtDocument,
	value::{self, DocumentData},
};

/// Stored discriminant of a note document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
	Todo,
	Memo,
	Event,
	Free,
}
impl NoteKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Todo => "todo",
			Self::Memo => "memo",
			Self::Event => "event",
			Self::Free => "free",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_lowercase().as_str() {
			"todo" => Some(Self::Todo),
			"memo" => Some(Self::Memo),
			"event" => Some(Self::Event),
			"free" => Some(Self::Free),
			_ => None,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TodoItem {
	pub text: String,
	pub status: String,
	pub tag_ids: Vec<String>,
	pub tag_labels: Vec<String>,
	pub due_date: String,
	pub event_date: String,
	pub note_id: String,
	pub created_at: i64,
}
impl TodoItem {
	/// Merge identity: the stored id when present, the text otherwise.
	pub fn identity_key(&self) -> &str {
		if self.note_id.is_empty() { &self.text } else { &self.note_id }
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Thought {
	pub text: String,
	pub tag_ids: Vec<String>,
	pub tag_labels: Vec<String>,
	pub section_anchor: Option<String>,
	pub section_title: Option<String>,
	pub created_at: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Appointment {
	pub text: String,
	pub datetime: String,
	pub location: String,
	pub created_at: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FreeNote {
	pub text: String,
	pub tag_ids: Vec<String>,
	pub tag_labels: Vec<String>,
	pub created_at: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructuredNote {
	Todo(TodoItem),
	Memo(Thought),
	Event(Appointment),
	Free(FreeNote),
}
impl StructuredNote {
	pub fn kind(&self) -> NoteKind {
		match self {
			Self::Todo(_) => NoteKind::Todo,
			Self::Memo(_) => NoteKind::Memo,
			Self::Event(_) => NoteKind::Event,
			Self::Free(_) => NoteKind::Free,
		}
	}

	pub fn text(&self) -> &str {
		match self {
			Self::Todo(item) => &item.text,
			Self::Memo(item) => &item.text,
			Self::Event(item) => &item.text,
			Self::Free(item) => &item.text,
		}
	}

	pub fn created_at(&self) -> i64 {
		match self {
			Self::Todo(item) => item.created_at,
			Self::Memo(item) => item.created_at,
			Self::Event(item) => item.created_at,
			Self::Free(item) => item.created_at,
		}
	}

	/// Parses a stored note document.
	///
	/// Returns `Ok(None)` for unknown types and notes without text. Legacy free-text `tags`
	/// are migrated through `context`. A todo's identity is the document id.
	pub fn from_document(
		doc_id: &str,
		data: &DocumentData,
		context: &TagMappingContext,
	) -> Result<Option<Self>> {
		let id = session::document_id(doc_id, data)?;
		let Some(kind) = data.get("type").and_then(Value::as_str).and_then(NoteKind::parse) else {
			return Ok(None);
		};
		let text = match data.get("text") {
			Some(Value::String(text)) if !text.trim().is_empty() => text.trim().to_string(),
			_ => return Ok(None),
		};
		let created_at = value::coerce_int(data.get("createdAt"));
		let (tag_ids, tag_labels) = tags::resolve_tag_data(
			&value::string_sequence(data.get("tagIds")),
			&value::string_sequence(data.get("tagLabels")),
			&value::string_sequence(data.get("tags")),
			context,
		);
		let note = match kind {
			NoteKind::Todo => Self::Todo(TodoItem {
				text,
				status: value::string_field(data, "status"),
				tag_ids,
				tag_labels,
				due_date: value::string_field(data, "dueDate"),
				event_date: value::string_field(data, "eventDate"),
				note_id: id,
				created_at,
			}),
			NoteKind::Memo => Self::Memo(Thought {
				text,
				tag_ids,
				tag_labels,
				section_anchor: value::optional_string_field(data, "sectionAnchor"),
				section_title: value::optional_string_field(data, "sectionTitle"),
				created_at,
			}),
			NoteKind::Event => Self::Event(Appointment {
				text,
				datetime: value::string_field(data, "datetime"),
				location: value::string_field(data, "location"),
				created_at,
			}),
			NoteKind::Free => Self::Free(FreeNote { text, tag_ids, tag_labels, created_at }),
		};

		Ok(Some(note))
	}

	/// Renders the stored document form with camelCase fields.
	pub fn to_document(&self) -> DocumentData {
		let value = match self {
			Self::Todo(item) => {
				let mut payload = json!({
					"type": NoteKind::Todo.as_str(),
					"text": item.text,
					"status": item.status,
					"tagIds": item.tag_ids,
					"tagLabels": item.tag_labels,
					"dueDate": item.due_date,
					"eventDate": item.event_date,
					"createdAt": item.created_at,
				});

				if !item.note_id.is_empty() {
					payload["id"] = Value::String(item.note_id.clone());
				}

				payload
			},
			Self::Memo(item) => json!({
				"type": NoteKind::Memo.as_str(),
				"text": item.text,
				"tagIds": item.tag_ids,
				"tagLabels": item.tag_labels,
				"sectionAnchor": item.section_anchor,
				"sectionTitle": item.section_title,
				"createdAt": item.created_at,
			}),
			Self::Event(item) => json!({
				"type": NoteKind::Event.as_str(),
				"text": item.text,
				"datetime": item.datetime,
				"location": item.location,
				"createdAt": item.created_at,
			}),
			Self::Free(item) => json!({
				"type": NoteKind::Free.as_str(),
				"text": item.text,
				"tagIds": item.tag_ids,
				"tagLabels": item.tag_labels,
				"createdAt": item.created_at,
			}),
		};

		match value {
			Value::Object(map) => map,
			_ => DocumentData::new(),
		}
	}
}

/// Current structured state of a session, grouped per aspect.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MemoSummary {
	pub todo: String,
	pub appointments: String,
	pub thoughts: String,
	pub todo_items: Vec<TodoItem>,
	pub appointment_items: Vec<Appointment>,
	pub thought_items: Vec<Thought>,
	pub thought_document: Option<ThoughtDocument>,
}
impl MemoSummary {
	/// Groups parsed notes and derives the flat text of each aspect.
	///
	/// Free notes are not part of any aspect and are dropped. The thoughts text mirrors the
	/// document body when a document exists.
	pub fn from_notes<I>(notes: I, thought_document: Option<ThoughtDocument>) -> Self
	where
		I: IntoIterator<Item = StructuredNote>,
	{
		let mut summary = Self { thought_document, ..Default::default() };

		for note in notes {
			match note {
				StructuredNote::Todo(item) => summary.todo_items.push(item),
				StructuredNote::Event(item) => summary.appointment_items.push(item),
				StructuredNote::Memo(item) => summary.thought_items.push(item),
				StructuredNote::Free(_) => {},
			}
		}

		summary.todo = join_texts(summary.todo_items.iter().map(|item| item.text.as_str()));
		summary.appointments =
			join_texts(summary.appointment_items.iter().map(|item| item.text.as_str()));
		summary.thoughts = match &summary.thought_document {
			Some(document) => document.markdown_body.clone(),
			None => join_texts(summary.thought_items.iter().map(|item| item.text.as_str())),
		};

		summary
	}
}

/// Newline-joins the non-empty texts.
pub fn join_texts<'a, I>(texts: I) -> String
where
	I: IntoIterator<Item = &'a str>,
{
	texts.into_iter().filter(|text| !text.is_empty()).collect::<Vec<_>>().join("\n")
}

/// Flattens the selected aspects of a summary back into notes, todos first.
pub fn summary_to_notes(summary: &MemoSummary, selection: AspectSelection) -> Vec<StructuredNote> {
	let mut notes = Vec::new();

	if selection.todos {
		notes.extend(summary.todo_items.iter().cloned().map(StructuredNote::Todo));
	}
	if selection.appointments {
		notes.extend(summary.appointment_items.iter().cloned().map(StructuredNote::Event));
	}
	if selection.thoughts {
		notes.extend(summary.thought_items.iter().cloned().map(StructuredNote::Memo));
	}

	notes
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{NotesTagCatalog, NotesTagDefinition};

	fn map(value: Value) -> DocumentData {
		value.as_object().cloned().unwrap_or_default()
	}

	fn context() -> TagMappingContext {
		let catalog = NotesTagCatalog::new(
			[json!({ "id": "work", "labels": { "default": "Work" } })]
				.iter()
				.filter_map(Value::as_object)
				.filter_map(NotesTagDefinition::from_map)
				.collect(),
		);

		TagMappingContext::new(Some(&catalog), "en")
	}

	#[test]
	fn todo_identity_is_document_id() {
		let data = map(json!({ "type": "TODO", "text": " Buy milk ", "dueDate": " 2024-10-01 " }));
		let note = StructuredNote::from_document("doc-1", &data, &context())
			.expect("Parse should succeed.")
			.expect("Note should be present.");
		let StructuredNote::Todo(item) = note else {
			panic!("Expected a todo.");
		};

		assert_eq!(item.text, "Buy milk");
		assert_eq!(item.note_id, "doc-1");
		assert_eq!(item.due_date, "2024-10-01");
		assert_eq!(item.identity_key(), "doc-1");
	}

	#[test]
	fn iso_created_at_coerces_to_zero() {
		let data = map(json!({ "type": "event", "text": "Dentist", "createdAt": "2024-10-01T12:00:00Z" }));
		let note = StructuredNote::from_document("doc-2", &data, &context())
			.expect("Parse should succeed.")
			.expect("Note should be present.");

		assert_eq!(note.kind(), NoteKind::Event);
		assert_eq!(note.created_at(), 0);
	}

	#[test]
	fn unknown_types_and_blank_texts_are_skipped() {
		let context = context();

		for data in [
			json!({ "type": "sketch", "text": "Doodle" }),
			json!({ "type": "todo", "text": "   " }),
			json!({ "type": "todo", "text": 42 }),
		] {
			let parsed = StructuredNote::from_document("doc", &map(data), &context)
				.expect("Parse should succeed.");

			assert_eq!(parsed, None);
		}
	}

	#[test]
	fn legacy_tags_migrate_on_parse() {
		let data = map(json!({ "type": "memo", "text": "Plan", "tags": ["work", "Urgent"], "sectionAnchor": " " }));
		let note = StructuredNote::from_document("doc", &data, &context())
			.expect("Parse should succeed.")
			.expect("Note should be present.");
		let StructuredNote::Memo(thought) = note else {
			panic!("Expected a thought.");
		};

		assert_eq!(thought.tag_ids, vec!["work"]);
		assert_eq!(thought.tag_labels, vec!["Urgent"]);
		assert_eq!(thought.section_anchor, None);
	}

	#[test]
	fn documents_round_trip() {
		let context = context();
		let note = StructuredNote::Todo(TodoItem {
			text: "Call Ana".to_string(),
			status: "pending".to_string(),
			tag_ids: vec!["work".to_string()],
			note_id: "abc".to_string(),
			created_at: 17,
			..Default::default()
		});
		let parsed = StructuredNote::from_document("abc", &note.to_document(), &context)
			.expect("Parse should succeed.");

		assert_eq!(parsed, Some(note));
	}

	#[test]
	fn summary_derives_flat_texts() {
		let document = ThoughtDocument::new("# Body");
		let notes = vec![
			StructuredNote::Todo(TodoItem { text: "A".to_string(), ..Default::default() }),
			StructuredNote::Todo(TodoItem { text: "B".to_string(), ..Default::default() }),
			StructuredNote::Memo(Thought { text: "idea".to_string(), ..Default::default() }),
			StructuredNote::Free(FreeNote { text: "loose".to_string(), ..Default::default() }),
		];
		let summary = MemoSummary::from_notes(notes.clone(), None);

		assert_eq!(summary.todo, "A\nB");
		assert_eq!(summary.thoughts, "idea");

		let with_document = MemoSummary::from_notes(notes, Some(document));

		assert_eq!(with_document.thoughts, "# Body");
	}

	#[test]
	fn summary_to_notes_honors_selection() {
		let summary = MemoSummary {
			todo_items: vec![TodoItem { text: "A".to_string(), ..Default::default() }],
			appointment_items: vec![Appointment { text: "B".to_string(), ..Default::default() }],
			..Default::default()
		};
		let selection = AspectSelection { appointments: false, ..Default::default() };
		let notes = summary_to_notes(&summary, selection);

		assert_eq!(notes.len(), 1);
		assert_eq!(notes[0].kind(), NoteKind::Todo);
	}
}
