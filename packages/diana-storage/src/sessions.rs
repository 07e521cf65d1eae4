//! Session repository over a [`DocumentStore`].

use serde_json::Value;
use time::OffsetDateTime;

use crate::{DocumentStore, Error, Result};
use diana_notes::{
	AspectSelection, DocumentData, MemoSummary, NotesTagCatalog, Session, StructuredNote,
	TagMappingContext, ThoughtDocument, TodoChangeSet, session, thought::THOUGHT_DOCUMENT_ID,
};

pub const SESSIONS_COLLECTION: &str = "sessions";
pub const NOTES_COLLECTION: &str = "notes";
pub const CHANGE_SETS_COLLECTION: &str = "todo_change_sets";

/// A session with its stored notes grouped into a summary.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedSession {
	pub session: Session,
	pub summary: MemoSummary,
	pub catalog: Option<NotesTagCatalog>,
	/// `settings.locale`, when set.
	pub locale: Option<String>,
}
impl LoadedSession {
	pub fn locale_or<'a>(&'a self, fallback: &'a str) -> &'a str {
		self.locale.as_deref().unwrap_or(fallback)
	}
}

/// Paging for [`list_sessions`]. A zero `page_size` returns every session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionQuery {
	pub session_id: Option<String>,
	pub page: usize,
	pub page_size: usize,
	pub limit: Option<usize>,
}

pub fn session_path(session_id: &str) -> String {
	format!("{SESSIONS_COLLECTION}/{}", session_id.trim())
}

pub fn notes_path(session_id: &str) -> String {
	format!("{}/{NOTES_COLLECTION}", session_path(session_id))
}

pub fn change_sets_path(session_id: &str) -> String {
	format!("{}/{CHANGE_SETS_COLLECTION}", session_path(session_id))
}

pub fn load_session<S>(store: &S, session_id: &str) -> Result<LoadedSession>
where
	S: DocumentStore + ?Sized,
{
	let path = session_path(session_id);
	let data = store.get(&path)?.ok_or_else(|| Error::NotFound { path: path.clone() })?;
	let session = session::parse_remote_session(session_id, &data)?.ok_or_else(|| {
		Error::InvalidDocument { path: path.clone(), message: "Session name is blank.".to_string() }
	})?;
	let settings = data.get("settings").and_then(Value::as_object);
	let locale = settings
		.and_then(|settings| settings.get("locale"))
		.and_then(Value::as_str)
		.map(str::trim)
		.filter(|locale| !locale.is_empty())
		.map(str::to_string);
	let catalog = settings
		.and_then(|settings| settings.get("tagCatalog"))
		.and_then(Value::as_object)
		.map(|raw| NotesTagCatalog::from_map(Some(raw)))
		.filter(|catalog| !catalog.is_empty());
	let context =
		TagMappingContext::new(catalog.as_ref(), locale.as_deref().unwrap_or_default());
	let mut notes = Vec::new();
	let mut thought_document = None;

	for document in store.list(&notes_path(session_id))? {
		if document.id == THOUGHT_DOCUMENT_ID {
			thought_document = ThoughtDocument::from_document(&document.data);

			continue;
		}

		match StructuredNote::from_document(&document.id, &document.data, &context)? {
			Some(note) => notes.push(note),
			None => tracing::debug!(note_id = %document.id, "Skipping unusable note."),
		}
	}

	notes.sort_by_key(StructuredNote::created_at);

	tracing::info!(
		session_id = %session.id,
		notes = notes.len(),
		has_thought_document = thought_document.is_some(),
		"Loaded session."
	);

	Ok(LoadedSession {
		summary: MemoSummary::from_notes(notes, thought_document),
		session,
		catalog,
		locale,
	})
}

/// Persists the selected aspects of `summary` and returns it with generated todo ids filled in.
///
/// Todos with an id overwrite their note; other todos, appointments and thought items are
/// added as new notes. The thought document is written when thoughts are selected.
pub fn write_summary<S>(
	store: &S,
	session_id: &str,
	summary: &MemoSummary,
	selection: AspectSelection,
) -> Result<MemoSummary>
where
	S: DocumentStore + ?Sized,
{
	let collection = notes_path(session_id);
	let now = now_millis();
	let mut written = summary.clone();

	if selection.todos {
		for item in &mut written.todo_items {
			if item.created_at == 0 {
				item.created_at = now;
			}

			let document = StructuredNote::Todo(item.clone()).to_document();
			let note_id = item.note_id.trim();

			if note_id.is_empty() {
				item.note_id = store.add(&collection, &document)?;
			} else {
				store.set(&format!("{collection}/{note_id}"), &document)?;
			}
		}
	}
	if selection.appointments {
		for item in &mut written.appointment_items {
			if item.created_at == 0 {
				item.created_at = now;
			}

			store.add(&collection, &StructuredNote::Event(item.clone()).to_document())?;
		}
	}
	if selection.thoughts {
		for item in &mut written.thought_items {
			if item.created_at == 0 {
				item.created_at = now;
			}

			store.add(&collection, &StructuredNote::Memo(item.clone()).to_document())?;
		}

		if let Some(document) = &written.thought_document {
			store.set(&format!("{collection}/{THOUGHT_DOCUMENT_ID}"), &document.to_document())?;
		}
	}

	tracing::info!(
		session_id = session_id.trim(),
		todos = selection.todos,
		appointments = selection.appointments,
		thoughts = selection.thoughts,
		"Saved summary."
	);

	Ok(written)
}

pub fn record_change_set<S>(store: &S, change_set: &TodoChangeSet) -> Result<()>
where
	S: DocumentStore + ?Sized,
{
	let path =
		format!("{}/{}", change_sets_path(&change_set.session_id), change_set.change_set_id.trim());

	store.set(&path, &change_set.to_document())?;

	tracing::info!(
		session_id = %change_set.session_id,
		change_set_id = %change_set.change_set_id,
		actions = change_set.actions.len(),
		"Recorded todo change set."
	);

	Ok(())
}

/// Sessions ordered by name, or the single session named by `query.session_id`.
pub fn list_sessions<S>(store: &S, query: &SessionQuery) -> Result<Vec<Session>>
where
	S: DocumentStore + ?Sized,
{
	let mut sessions = Vec::new();

	if let Some(session_id) = query.session_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
	{
		if let Some(data) = store.get(&session_path(session_id))?
			&& let Some(session) = session::parse_remote_session(session_id, &data)?
		{
			sessions.push(session);
		}

		return Ok(sessions);
	}

	for document in store.list(SESSIONS_COLLECTION)? {
		if let Some(session) = session::parse_remote_session(&document.id, &document.data)? {
			sessions.push(session);
		}
	}

	sessions.sort_by(|left, right| {
		(left.name.to_lowercase(), &left.id).cmp(&(right.name.to_lowercase(), &right.id))
	});

	let paged: Vec<Session> = if query.page_size == 0 {
		sessions
	} else {
		let offset = query.page.saturating_mul(query.page_size);

		sessions.into_iter().skip(offset).take(query.page_size).collect()
	};

	Ok(match query.limit {
		Some(limit) => paged.into_iter().take(limit).collect(),
		None => paged,
	})
}

/// Change sets of a session, newest first.
pub fn list_change_sets<S>(
	store: &S,
	session_id: &str,
	limit: Option<usize>,
) -> Result<Vec<TodoChangeSet>>
where
	S: DocumentStore + ?Sized,
{
	let mut change_sets = Vec::new();

	for document in store.list(&change_sets_path(session_id))? {
		if let Some(change_set) = TodoChangeSet::from_document(&document.id, &document.data)? {
			change_sets.push(change_set);
		}
	}

	change_sets.sort_by(|left, right| {
		right
			.timestamp
			.cmp(&left.timestamp)
			.then_with(|| left.change_set_id.cmp(&right.change_set_id))
	});

	if let Some(limit) = limit {
		change_sets.truncate(limit);
	}

	Ok(change_sets)
}

/// Creates or replaces a session document.
pub fn save_session<S>(store: &S, session: &Session, extra_settings: &DocumentData) -> Result<()>
where
	S: DocumentStore + ?Sized,
{
	let mut data = session.to_map();

	if let Some(Value::Object(settings)) = data.get_mut("settings") {
		for (key, value) in extra_settings {
			settings.insert(key.clone(), value.clone());
		}
	}

	store.set(&session_path(&session.id), &data)
}

pub fn now_millis() -> i64 {
	let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;

	i64::try_from(nanos).unwrap_or(i64::MAX)
}
