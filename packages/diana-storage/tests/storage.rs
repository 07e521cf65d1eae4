use serde_json::{Value, json};

use diana_notes::{
	AspectSelection, DocumentData, MemoSummary, Session, SessionSettings, Thought,
	ThoughtDocument, TodoAction, TodoChangeSet, TodoOp, thought::THOUGHT_DOCUMENT_ID,
};
use diana_storage::{
	DocumentStore, Error, FsStore, MemoryStore,
	sessions::{self, SessionQuery},
};
use diana_testkit::{TestDirectory, simple_catalog, todo};

fn map(value: Value) -> DocumentData {
	value.as_object().cloned().unwrap_or_default()
}

fn seed_session(store: &dyn DocumentStore, id: &str, name: &str) {
	store
		.set(
			&sessions::session_path(id),
			&map(json!({
				"name": name,
				"settings": {
					"processTodos": true,
					"saveAppointments": "no",
					"locale": "it",
					"tagCatalog": simple_catalog(&[("work", "Work"), ("home", "Home")]).to_map(),
				},
			})),
		)
		.expect("Failed to seed session.");
}

#[test]
fn fs_store_round_trips_documents() {
	let directory = TestDirectory::new("diana_fs_store").expect("Failed to create directory.");
	let store = FsStore::new(directory.path());
	let data = map(json!({ "name": "Inbox" }));

	store.set("sessions/a", &data).expect("Failed to write document.");

	let id = store.add("sessions/a/notes", &map(json!({ "text": "x" }))).expect("Failed to add.");

	assert_eq!(store.get("sessions/a").expect("Failed to read document."), Some(data));
	assert_eq!(store.get("sessions/missing").expect("Failed to read document."), None);
	assert_eq!(
		store.list("sessions").expect("Failed to list.").iter().map(|doc| doc.id.as_str()).collect::<Vec<_>>(),
		vec!["a"]
	);
	assert_eq!(store.list("sessions/a/notes").expect("Failed to list.")[0].id, id);
	assert!(store.list("sessions/b/notes").expect("Failed to list.").is_empty());
	assert!(directory.path().join("sessions").join("a.json").is_file());
}

#[test]
fn fs_store_rejects_escaping_paths() {
	let directory = TestDirectory::new("diana_fs_paths").expect("Failed to create directory.");
	let store = FsStore::new(directory.path());

	assert!(matches!(store.get("sessions/../x"), Err(Error::InvalidPath { .. })));
	assert!(matches!(store.list("sessions/a"), Err(Error::InvalidPath { .. })));
	assert!(matches!(store.set("sessions", &DocumentData::new()), Err(Error::InvalidPath { .. })));
}

#[test]
fn fs_store_reports_corrupt_documents() {
	let directory = TestDirectory::new("diana_fs_corrupt").expect("Failed to create directory.");

	directory.write_file("sessions/a.json", "{ not json").expect("Failed to write file.");

	let store = FsStore::new(directory.path());

	assert!(matches!(store.get("sessions/a"), Err(Error::Decode { .. })));
}

#[test]
fn loads_sessions_with_locale_catalog_and_legacy_tags() {
	let store = MemoryStore::new();
	let notes = sessions::notes_path("s1");

	seed_session(&store, "s1", "Inbox");
	store
		.set(
			&format!("{notes}/n1"),
			&map(json!({ "type": "todo", "text": "Call Ana", "tags": ["WORK", "Errands"], "createdAt": 5 })),
		)
		.expect("Failed to seed note.");
	store
		.set(
			&format!("{notes}/n2"),
			&map(json!({ "type": "event", "text": "Dentist", "createdAt": "2024-10-01T09:00:00Z" })),
		)
		.expect("Failed to seed note.");
	store
		.set(&format!("{notes}/n3"), &map(json!({ "type": "memo", "text": "  " })))
		.expect("Failed to seed note.");
	store
		.set(&format!("{notes}/{THOUGHT_DOCUMENT_ID}"), &ThoughtDocument::new("# Ideas").to_document())
		.expect("Failed to seed document.");

	let loaded = sessions::load_session(&store, "s1").expect("Failed to load session.");

	assert_eq!(loaded.locale.as_deref(), Some("it"));
	assert_eq!(loaded.session.name, "Inbox");
	assert!(!loaded.session.settings.process_appointments);
	assert_eq!(loaded.catalog.as_ref().map(|catalog| catalog.tags.len()), Some(2));
	assert_eq!(loaded.summary.todo_items[0].note_id, "n1");
	assert_eq!(loaded.summary.todo_items[0].tag_ids, vec!["work"]);
	assert_eq!(loaded.summary.todo_items[0].tag_labels, vec!["Errands"]);
	assert_eq!(loaded.summary.appointment_items[0].created_at, 0);
	assert_eq!(loaded.summary.appointments, "Dentist");
	assert_eq!(loaded.summary.thoughts, "# Ideas");
	assert!(loaded.summary.thought_items.is_empty());
}

#[test]
fn missing_and_unnamed_sessions_fail_to_load() {
	let store = MemoryStore::new();

	store.set("sessions/blank", &map(json!({ "name": " " }))).expect("Failed to seed session.");

	assert!(matches!(sessions::load_session(&store, "nope"), Err(Error::NotFound { .. })));
	assert!(matches!(sessions::load_session(&store, "blank"), Err(Error::InvalidDocument { .. })));
}

#[test]
fn write_summary_assigns_ids_and_round_trips() {
	let store = MemoryStore::new();

	seed_session(&store, "s1", "Inbox");

	let mut existing = todo("Call Ana", "n1");

	existing.created_at = 7;

	let summary = MemoSummary {
		todo_items: vec![existing, todo("Pay rent", "")],
		thought_items: vec![Thought { text: "Idea".to_string(), ..Default::default() }],
		thought_document: Some(ThoughtDocument::new("# Ideas")),
		..Default::default()
	};
	let selection = AspectSelection { appointments: false, ..Default::default() };
	let written =
		sessions::write_summary(&store, "s1", &summary, selection).expect("Failed to write summary.");

	assert_eq!(written.todo_items[0].note_id, "n1");
	assert_eq!(written.todo_items[0].created_at, 7);
	assert!(!written.todo_items[1].note_id.is_empty());
	assert!(written.todo_items[1].created_at > 0);

	let loaded = sessions::load_session(&store, "s1").expect("Failed to load session.");
	let mut ids: Vec<String> = loaded.summary.todo_items.iter().map(|item| item.note_id.clone()).collect();
	let mut expected = vec!["n1".to_string(), written.todo_items[1].note_id.clone()];

	ids.sort();
	expected.sort();

	assert_eq!(ids, expected);
	assert_eq!(loaded.summary.thought_items.len(), 1);
	assert_eq!(loaded.summary.thoughts, "# Ideas");
}

#[test]
fn unselected_aspects_are_not_written() {
	let store = MemoryStore::new();
	let summary = MemoSummary { todo_items: vec![todo("Pay rent", "")], ..Default::default() };

	sessions::write_summary(&store, "s1", &summary, AspectSelection::none())
		.expect("Failed to write summary.");

	assert!(store.is_empty());
}

#[test]
fn sessions_are_listed_by_name_with_paging() {
	let store = MemoryStore::new();

	seed_session(&store, "c", "charlie");
	seed_session(&store, "a", "Bravo");
	seed_session(&store, "b", "alpha");
	store.set("sessions/d", &map(json!({ "name": "" }))).expect("Failed to seed session.");

	let names = |query: SessionQuery| -> Vec<String> {
		sessions::list_sessions(&store, &query)
			.expect("Failed to list sessions.")
			.into_iter()
			.map(|session| session.name)
			.collect()
	};

	assert_eq!(names(SessionQuery::default()), vec!["alpha", "Bravo", "charlie"]);
	assert_eq!(names(SessionQuery { page: 1, page_size: 2, ..Default::default() }), vec!["charlie"]);
	assert_eq!(names(SessionQuery { limit: Some(1), ..Default::default() }), vec!["alpha"]);
	assert_eq!(names(SessionQuery { session_id: Some("a".to_string()), ..Default::default() }), vec!["Bravo"]);
	assert!(names(SessionQuery { session_id: Some("zz".to_string()), ..Default::default() }).is_empty());
}

#[test]
fn change_sets_are_listed_newest_first() {
	let store = MemoryStore::new();

	for (id, timestamp) in [("old", 10), ("new", 30), ("mid", 20)] {
		let change_set = TodoChangeSet {
			change_set_id: id.to_string(),
			session_id: "s1".to_string(),
			memo_id: "memo".to_string(),
			timestamp,
			model: "m".to_string(),
			prompt_version: "v".to_string(),
			actions: vec![TodoAction { op: TodoOp::Add, before: None, after: Some(todo("A", "")) }],
			change_type: "apply".to_string(),
		};

		sessions::record_change_set(&store, &change_set).expect("Failed to record change set.");
	}

	store
		.set("sessions/s1/todo_change_sets/empty", &map(json!({ "actions": [] })))
		.expect("Failed to seed change set.");

	let listed = sessions::list_change_sets(&store, "s1", Some(2)).expect("Failed to list.");

	assert_eq!(
		listed.iter().map(|change_set| change_set.change_set_id.as_str()).collect::<Vec<_>>(),
		vec!["new", "mid"]
	);
}

#[test]
fn saved_sessions_keep_extra_settings() {
	let store = MemoryStore::new();
	let session = Session {
		id: "s1".to_string(),
		name: "Inbox".to_string(),
		settings: SessionSettings { process_thoughts: false, ..Default::default() },
	};

	sessions::save_session(&store, &session, &map(json!({ "locale": "fr" })))
		.expect("Failed to save session.");

	let loaded = sessions::load_session(&store, "s1").expect("Failed to load session.");

	assert_eq!(loaded.locale_or("en"), "fr");
	assert!(!loaded.session.settings.process_thoughts);
	assert!(loaded.catalog.is_none());
}
