//! Todo diffs and the change sets recorded from them.

use std::{
	collections::{HashMap, HashSet},
	sync::LazyLock,
};

use regex::Regex;
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
	Result,
	note::TodoItem,
	session,
	value::{self, DocumentData},
};

pub const APPLY_CHANGE_TYPE: &str = "apply";

static WHITESPACE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\s+").expect("Whitespace pattern must compile."));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoOp {
	Add,
	Update,
	Delete,
}
impl TodoOp {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Add => "add",
			Self::Update => "update",
			Self::Delete => "delete",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_lowercase().as_str() {
			"add" => Some(Self::Add),
			"update" => Some(Self::Update),
			"delete" => Some(Self::Delete),
			_ => None,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TodoAction {
	pub op: TodoOp,
	pub before: Option<TodoItem>,
	pub after: Option<TodoItem>,
}
impl TodoAction {
	/// The action that undoes this one.
	pub fn invert(&self) -> Self {
		match self.op {
			TodoOp::Add if self.after.is_some() =>
				Self { op: TodoOp::Delete, before: self.after.clone(), after: None },
			TodoOp::Delete if self.before.is_some() =>
				Self { op: TodoOp::Add, before: None, after: self.before.clone() },
			TodoOp::Update =>
				Self { op: TodoOp::Update, before: self.after.clone(), after: self.before.clone() },
			_ => self.clone(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TodoChangeSet {
	pub change_set_id: String,
	pub session_id: String,
	pub memo_id: String,
	pub timestamp: i64,
	pub model: String,
	pub prompt_version: String,
	pub actions: Vec<TodoAction>,
	pub change_type: String,
}
impl TodoChangeSet {
	/// Parses a stored change set. Change sets without a usable action read as absent.
	pub fn from_document(doc_id: &str, data: &DocumentData) -> Result<Option<Self>> {
		let change_set_id = session::document_id(doc_id, data)?;
		let actions: Vec<TodoAction> = data
			.get("actions")
			.and_then(Value::as_array)
			.map(|entries| entries.iter().filter_map(parse_action).collect())
			.unwrap_or_default();

		if actions.is_empty() {
			return Ok(None);
		}

		let change_type = value::optional_string_field(data, "type")
			.unwrap_or_else(|| APPLY_CHANGE_TYPE.to_string());

		Ok(Some(Self {
			change_set_id,
			session_id: value::string_field(data, "sessionId"),
			memo_id: value::string_field(data, "memoId"),
			timestamp: value::coerce_int(data.get("timestamp")),
			model: value::string_field(data, "model"),
			prompt_version: value::string_field(data, "promptVersion"),
			actions,
			change_type,
		}))
	}

	pub fn to_document(&self) -> DocumentData {
		let actions: Vec<Value> = self
			.actions
			.iter()
			.map(|action| {
				json!({
					"op": action.op.as_str(),
					"before": action.before.as_ref().map(todo_to_value),
					"after": action.after.as_ref().map(todo_to_value),
				})
			})
			.collect();
		let mut map = DocumentData::new();

		map.insert("changeSetId".to_string(), Value::String(self.change_set_id.clone()));
		map.insert("sessionId".to_string(), Value::String(self.session_id.clone()));
		map.insert("memoId".to_string(), Value::String(self.memo_id.clone()));
		map.insert("timestamp".to_string(), Value::from(self.timestamp));
		map.insert("model".to_string(), Value::String(self.model.clone()));
		map.insert("promptVersion".to_string(), Value::String(self.prompt_version.clone()));
		map.insert("type".to_string(), Value::String(self.change_type.clone()));
		map.insert("actions".to_string(), Value::Array(actions));

		map
	}
}

/// Computes the actions that turn `before` into `after`.
///
/// Items are matched by [`stable_key`]; the first item per key wins on both sides.
pub fn diff(before: &[TodoItem], after: &[TodoItem]) -> Vec<TodoAction> {
	let before_by_key = keyed(before);
	let after_by_key = keyed(after);
	let mut actions = Vec::new();

	for (key, item) in first_per_key(after) {
		match before_by_key.get(&key) {
			None => actions.push(TodoAction { op: TodoOp::Add, before: None, after: Some(item.clone()) }),
			Some(prior) if !same_content(prior, item) => actions.push(TodoAction {
				op: TodoOp::Update,
				before: Some((*prior).clone()),
				after: Some(item.clone()),
			}),
			Some(_) => {},
		}
	}
	for (key, item) in first_per_key(before) {
		if !after_by_key.contains_key(&key) {
			actions.push(TodoAction { op: TodoOp::Delete, before: Some(item.clone()), after: None });
		}
	}

	actions
}

/// Trimmed note id, or the case- and whitespace-normalized text when the id is blank.
pub fn stable_key(item: &TodoItem) -> String {
	let id = item.note_id.trim();

	if !id.is_empty() {
		return id.to_string();
	}

	let text = item.text.trim().to_lowercase();

	WHITESPACE.replace_all(&text, " ").into_owned()
}

/// Whether two todos carry the same content. `created_at` is bookkeeping and not compared.
pub fn same_content(left: &TodoItem, right: &TodoItem) -> bool {
	TodoItem { created_at: 0, ..left.clone() } == TodoItem { created_at: 0, ..right.clone() }
}

fn keyed(items: &[TodoItem]) -> HashMap<String, &TodoItem> {
	let mut keyed = HashMap::new();

	for item in items {
		keyed.entry(stable_key(item)).or_insert(item);
	}

	keyed
}

fn first_per_key(items: &[TodoItem]) -> Vec<(String, &TodoItem)> {
	let mut seen = HashSet::new();
	let mut ordered = Vec::new();

	for item in items {
		let key = stable_key(item);

		if seen.insert(key.clone()) {
			ordered.push((key, item));
		}
	}

	ordered
}

fn parse_action(entry: &Value) -> Option<TodoAction> {
	let entry = entry.as_object()?;
	let op = entry.get("op").and_then(Value::as_str).and_then(TodoOp::parse)?;

	Some(TodoAction {
		op,
		before: value::as_object(entry.get("before")).and_then(parse_todo),
		after: value::as_object(entry.get("after")).and_then(parse_todo),
	})
}

fn parse_todo(data: &DocumentData) -> Option<TodoItem> {
	let text = value::string_field(data, "text");

	if text.is_empty() {
		return None;
	}

	Some(TodoItem {
		text,
		status: value::string_field(data, "status"),
		tag_ids: value::string_sequence(data.get("tagIds")),
		tag_labels: value::string_sequence(data.get("tagLabels")),
		due_date: value::string_field(data, "dueDate"),
		event_date: value::string_field(data, "eventDate"),
		note_id: value::string_field(data, "id"),
		created_at: 0,
	})
}

fn todo_to_value(item: &TodoItem) -> Value {
	json!({
		"text": item.text,
		"status": item.status,
		"tagIds": item.tag_ids,
		"tagLabels": item.tag_labels,
		"dueDate": item.due_date,
		"eventDate": item.event_date,
		"id": item.note_id,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn todo(text: &str, id: &str) -> TodoItem {
		TodoItem { text: text.to_string(), note_id: id.to_string(), ..Default::default() }
	}

	#[test]
	fn stable_key_normalizes_text() {
		assert_eq!(stable_key(&todo("  Buy\t\tMILK  now ", "")), "buy milk now");
		assert_eq!(stable_key(&todo("Buy milk", " n1 ")), "n1");
	}

	#[test]
	fn diff_reports_add_update_delete() {
		let before = vec![todo("Buy milk", ""), todo("Call Ana", "n1"), todo("Old task", "")];
		let mut updated = todo("Call Ana tomorrow", "n1");

		updated.status = "done".to_string();

		let after = vec![todo("buy  MILK", ""), updated.clone(), todo("New task", "")];
		let actions = diff(&before, &after);
		let ops: Vec<TodoOp> = actions.iter().map(|action| action.op).collect();

		assert_eq!(ops, vec![TodoOp::Update, TodoOp::Update, TodoOp::Add, TodoOp::Delete]);
		assert_eq!(actions[1].after.as_ref(), Some(&updated));
		assert_eq!(actions[3].before.as_ref().map(|item| item.text.as_str()), Some("Old task"));
	}

	#[test]
	fn identical_lists_have_no_actions() {
		let items = vec![todo("A", ""), todo("B", "id")];

		assert!(diff(&items, &items).is_empty());
		assert!(diff(&[], &[]).is_empty());
	}

	#[test]
	fn timestamps_alone_are_not_updates() {
		let before = vec![todo("Call Ana", "n1")];
		let after = vec![TodoItem { created_at: 1_700_000_000_000, ..todo("Call Ana", "n1") }];

		assert!(diff(&before, &after).is_empty());

		let edited = vec![TodoItem { status: "done".to_string(), ..after[0].clone() }];

		assert_eq!(diff(&before, &edited)[0].op, TodoOp::Update);
	}

	#[test]
	fn duplicate_keys_report_once() {
		let after = vec![todo("Same", ""), todo("same ", "")];

		assert_eq!(diff(&[], &after).len(), 1);
	}

	#[test]
	fn inverted_actions_undo() {
		let add = TodoAction { op: TodoOp::Add, before: None, after: Some(todo("A", "")) };
		let inverted = add.invert();

		assert_eq!(inverted.op, TodoOp::Delete);
		assert_eq!(inverted.before, add.after);
		assert_eq!(inverted.invert(), add);
	}

	#[test]
	fn change_sets_round_trip() {
		let change_set = TodoChangeSet {
			change_set_id: "cs-1".to_string(),
			session_id: "s-1".to_string(),
			memo_id: "m-1".to_string(),
			timestamp: 1_700_000_000_000,
			model: "mistralai/mistral-nemo".to_string(),
			prompt_version: "abc123".to_string(),
			actions: diff(&[], &[todo("A", "n1")]),
			change_type: APPLY_CHANGE_TYPE.to_string(),
		};
		let parsed = TodoChangeSet::from_document("cs-1", &change_set.to_document())
			.expect("Parse should succeed.");

		assert_eq!(parsed, Some(change_set));
	}

	#[test]
	fn change_sets_without_valid_actions_are_dropped() {
		let data = json!({ "actions": [{ "op": "" }, { "op": "rename" }, "add"] })
			.as_object()
			.cloned()
			.unwrap_or_default();

		assert_eq!(TodoChangeSet::from_document("cs", &data).expect("Parse should succeed."), None);
	}
}
