use serde::Serialize;
use serde_json::{Value, json};

use crate::{
	Error, Result,
	value::{self, DocumentData},
};

/// Which aspects a processing cycle should touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AspectSelection {
	pub todos: bool,
	pub appointments: bool,
	pub thoughts: bool,
}
impl AspectSelection {
	pub fn none() -> Self {
		Self { todos: false, appointments: false, thoughts: false }
	}

	pub fn is_empty(&self) -> bool {
		!(self.todos || self.appointments || self.thoughts)
	}
}
impl Default for AspectSelection {
	fn default() -> Self {
		Self { todos: true, appointments: true, thoughts: true }
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionSettings {
	pub process_todos: bool,
	pub process_appointments: bool,
	pub process_thoughts: bool,
	pub model: String,
}
impl SessionSettings {
	/// Reads stored settings, accepting the legacy `save*` keys when `process*` is absent.
	pub fn from_remote(data: Option<&DocumentData>) -> Self {
		let Some(data) = data else {
			return Self::default();
		};
		let flag = |key: &str, legacy: &str| {
			parse_flag(data.get(key).or_else(|| data.get(legacy)), true)
		};

		Self {
			process_todos: flag("processTodos", "saveTodos"),
			process_appointments: flag("processAppointments", "saveAppointments"),
			process_thoughts: flag("processThoughts", "saveThoughts"),
			model: value::string_field(data, "model"),
		}
	}

	pub fn to_map(&self) -> DocumentData {
		let mut map = DocumentData::new();

		map.insert("processTodos".to_string(), Value::Bool(self.process_todos));
		map.insert("processAppointments".to_string(), Value::Bool(self.process_appointments));
		map.insert("processThoughts".to_string(), Value::Bool(self.process_thoughts));
		map.insert("model".to_string(), Value::String(self.model.clone()));

		map
	}

	pub fn selection(&self) -> AspectSelection {
		AspectSelection {
			todos: self.process_todos,
			appointments: self.process_appointments,
			thoughts: self.process_thoughts,
		}
	}
}
impl Default for SessionSettings {
	fn default() -> Self {
		Self {
			process_todos: true,
			process_appointments: true,
			process_thoughts: true,
			model: String::new(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Session {
	pub id: String,
	pub name: String,
	pub settings: SessionSettings,
}
impl Session {
	pub fn to_map(&self) -> DocumentData {
		let mut map = DocumentData::new();

		map.insert("name".to_string(), Value::String(self.name.clone()));
		map.insert("settings".to_string(), json!(self.settings.to_map()));

		map
	}
}

/// Parses a session document. Sessions without a usable name are skipped.
pub fn parse_remote_session(doc_id: &str, data: &DocumentData) -> Result<Option<Session>> {
	let id = document_id(doc_id, data)?;
	let name = value::string_field(data, "name");

	if name.is_empty() {
		return Ok(None);
	}

	let settings = SessionSettings::from_remote(value::as_object(data.get("settings")));

	Ok(Some(Session { id, name, settings }))
}

/// Resolves a document identifier, falling back to an embedded `id` field.
pub fn document_id(doc_id: &str, data: &DocumentData) -> Result<String> {
	let trimmed = doc_id.trim();

	if !trimmed.is_empty() {
		return Ok(trimmed.to_string());
	}

	value::optional_string_field(data, "id").ok_or(Error::MissingIdentifier)
}

fn parse_flag(value: Option<&Value>, default: bool) -> bool {
	match value {
		Some(Value::Bool(flag)) => *flag,
		Some(Value::Number(number)) => number
			.as_i64()
			.map(|raw| raw != 0)
			.or_else(|| number.as_f64().map(|raw| raw.trunc() != 0.0))
			.unwrap_or(default),
		Some(Value::String(raw)) => match raw.trim().to_lowercase().as_str() {
			"true" | "1" | "yes" => true,
			"false" | "0" | "no" => false,
			_ => default,
		},
		_ => default,
	}
}
