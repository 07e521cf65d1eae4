//! Tag catalog model and the legacy free-text tag migration.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::value::{self, DocumentData};

/// Storage key used for labels that are not bound to a locale.
pub const DEFAULT_LABEL_KEY: &str = "default";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LocalizedLabel {
	pub locale_tag: Option<String>,
	pub value: String,
}
impl LocalizedLabel {
	pub fn new(locale_tag: Option<&str>, value: impl Into<String>) -> Self {
		let locale_tag = locale_tag.map(normalize_locale_tag).filter(|tag| !tag.is_empty());

		Self { locale_tag, value: value.into() }
	}

	pub fn default_label(value: impl Into<String>) -> Self {
		Self { locale_tag: None, value: value.into() }
	}

	pub fn is_default(&self) -> bool {
		self.locale_tag.is_none()
	}

	pub fn storage_key(&self) -> &str {
		self.locale_tag.as_deref().unwrap_or(DEFAULT_LABEL_KEY)
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NotesTagDefinition {
	pub id: String,
	pub labels: Vec<LocalizedLabel>,
	pub color: Option<String>,
}
impl NotesTagDefinition {
	/// Picks the label for `locale`: exact tag, then language subtag, then the default label,
	/// then the first label.
	pub fn label_for_locale(&self, locale: &str) -> Option<&str> {
		let first = self.labels.first()?;
		let locale = normalize_locale_tag(locale);
		let language = locale.split('-').next().unwrap_or_default();
		let tagged = |wanted: &str| {
			self.labels
				.iter()
				.find(|label| label.locale_tag.as_deref() == Some(wanted))
				.map(|label| label.value.as_str())
		};
		let default = self.labels.iter().find(|label| label.is_default());

		tagged(&locale)
			.or_else(|| tagged(language))
			.or_else(|| default.map(|label| label.value.as_str()))
			.or(Some(first.value.as_str()))
	}

	/// Label shown to the user, falling back to the id when nothing else is available.
	pub fn display_label(&self, locale: &str) -> &str {
		self.label_for_locale(locale).unwrap_or(&self.id)
	}

	/// Parses one catalog entry. Entries with a blank id are rejected.
	pub fn from_map(data: &DocumentData) -> Option<Self> {
		let id = value::string_field(data, "id");

		if id.is_empty() {
			return None;
		}

		let mut labels = Vec::new();

		if let Some(raw_labels) = value::as_object(data.get("labels")) {
			for (key, raw) in raw_labels {
				let Value::String(text) = raw else {
					continue;
				};
				let key = key.trim();
				let locale_tag = if key.eq_ignore_ascii_case(DEFAULT_LABEL_KEY) { None } else { Some(key) };

				labels.push(LocalizedLabel::new(locale_tag, text.clone()));
			}
		}
		if labels.is_empty() {
			labels.push(LocalizedLabel::default_label(id.clone()));
		}

		let color = data.get("color").and_then(Value::as_str).map(str::to_string);

		Some(Self { id, labels, color })
	}

	pub fn to_map(&self) -> DocumentData {
		let mut labels = DocumentData::new();

		for label in &self.labels {
			labels
				.entry(label.storage_key().to_string())
				.or_insert_with(|| Value::String(label.value.clone()));
		}

		let mut map = DocumentData::new();

		map.insert("id".to_string(), Value::String(self.id.clone()));
		map.insert("labels".to_string(), Value::Object(labels));

		if let Some(color) = &self.color {
			map.insert("color".to_string(), Value::String(color.clone()));
		}

		map
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NotesTagCatalog {
	pub tags: Vec<NotesTagDefinition>,
}
impl NotesTagCatalog {
	pub fn new(tags: Vec<NotesTagDefinition>) -> Self {
		Self { tags }
	}

	pub fn from_map(data: Option<&DocumentData>) -> Self {
		let tags = data
			.and_then(|data| data.get("tags"))
			.and_then(Value::as_array)
			.map(|entries| {
				entries
					.iter()
					.filter_map(Value::as_object)
					.filter_map(NotesTagDefinition::from_map)
					.collect()
			})
			.unwrap_or_default();

		Self { tags }
	}

	pub fn to_map(&self) -> DocumentData {
		let tags = self.tags.iter().map(|tag| Value::Object(tag.to_map())).collect();
		let mut map = DocumentData::new();

		map.insert("tags".to_string(), Value::Array(tags));

		map
	}

	pub fn is_empty(&self) -> bool {
		self.tags.is_empty()
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagMigrationResult {
	pub tag_ids: Vec<String>,
	pub unresolved_labels: Vec<String>,
}

/// Resolves free-text tags against one catalog for one locale.
///
/// Lookups are immutable once built and the first registration of a key wins, so ids are
/// always preferred over labels and the locale-preferred label over other labels.
#[derive(Clone, Debug, Default)]
pub struct TagMappingContext {
	locale: String,
	canonical_ids: HashSet<String>,
	id_lookup: HashMap<String, String>,
	label_lookup: HashMap<String, String>,
	display_labels: HashMap<String, String>,
}
impl TagMappingContext {
	pub fn new(catalog: Option<&NotesTagCatalog>, locale: &str) -> Self {
		let mut context = Self { locale: locale.trim().to_string(), ..Default::default() };

		for definition in catalog.map(|catalog| catalog.tags.as_slice()).unwrap_or_default() {
			let tag_id = definition.id.trim();

			if tag_id.is_empty() {
				continue;
			}

			context.canonical_ids.insert(tag_id.to_string());
			context.id_lookup.entry(tag_id.to_lowercase()).or_insert_with(|| tag_id.to_string());

			if let Some(preferred) = definition.label_for_locale(&context.locale) {
				context
					.display_labels
					.entry(tag_id.to_string())
					.or_insert_with(|| preferred.to_string());
				context.register_label(preferred, tag_id);
			}
			for label in &definition.labels {
				context.register_label(&label.value, tag_id);
			}
		}

		context
	}

	pub fn locale(&self) -> &str {
		&self.locale
	}

	/// Localized label of a canonical id, if the catalog knows it.
	pub fn display_label(&self, tag_id: &str) -> Option<&str> {
		self.display_labels.get(tag_id).map(String::as_str)
	}

	pub fn resolve(&self, raw: &str) -> Option<&str> {
		let trimmed = raw.trim();

		if trimmed.is_empty() {
			return None;
		}
		if let Some(id) = self.canonical_ids.get(trimmed) {
			return Some(id.as_str());
		}

		let lower = trimmed.to_lowercase();

		self.id_lookup.get(&lower).or_else(|| self.label_lookup.get(&lower)).map(String::as_str)
	}

	pub fn map_legacy<S>(&self, legacy: &[S]) -> TagMigrationResult
	where
		S: AsRef<str>,
	{
		let mut result = TagMigrationResult::default();

		for raw in legacy {
			match self.resolve(raw.as_ref()) {
				Some(id) => push_unique(&mut result.tag_ids, id),
				None => push_unique(&mut result.unresolved_labels, raw.as_ref().trim()),
			}
		}

		result
	}

	fn register_label(&mut self, label: &str, tag_id: &str) {
		let normalized = label.trim().to_lowercase();

		if !normalized.is_empty() {
			self.label_lookup.entry(normalized).or_insert_with(|| tag_id.to_string());
		}
	}
}

/// Combines explicit tag data with migrated legacy tags. Returns `(tag_ids, tag_labels)`.
pub fn resolve_tag_data<A, B, C>(
	explicit_ids: &[A],
	explicit_labels: &[B],
	legacy: &[C],
	context: &TagMappingContext,
) -> (Vec<String>, Vec<String>)
where
	A: AsRef<str>,
	B: AsRef<str>,
	C: AsRef<str>,
{
	let mut ids = value::sanitize_strings(explicit_ids);
	let mut labels = value::sanitize_strings(explicit_labels);
	let legacy = value::sanitize_strings(legacy);

	if legacy.is_empty() {
		return (ids, labels);
	}

	let migrated = context.map_legacy(&legacy);

	for id in &migrated.tag_ids {
		push_unique(&mut ids, id);
	}
	for label in &migrated.unresolved_labels {
		push_unique(&mut labels, label);
	}

	(ids, labels)
}

pub fn normalize_locale_tag(tag: &str) -> String {
	tag.trim().replace('_', "-").to_lowercase()
}

fn push_unique(values: &mut Vec<String>, candidate: &str) {
	if !candidate.is_empty() && !values.iter().any(|existing| existing == candidate) {
		values.push(candidate.to_string());
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn definition(value: Value) -> NotesTagDefinition {
		let map = value.as_object().cloned().unwrap_or_default();

		NotesTagDefinition::from_map(&map).expect("Definition should parse.")
	}

	#[test]
	fn label_chain_prefers_exact_then_language_then_default() {
		let tag = definition(json!({
			"id": "work",
			"labels": { "default": "Work", "it": "Lavoro", "fr-CA": "Travail" },
		}));

		assert_eq!(tag.label_for_locale("fr_CA"), Some("Travail"));
		assert_eq!(tag.label_for_locale("it-IT"), Some("Lavoro"));
		assert_eq!(tag.label_for_locale("de"), Some("Work"));
	}

	#[test]
	fn label_chain_falls_back_to_first_label() {
		let tag = NotesTagDefinition {
			id: "home".to_string(),
			labels: vec![LocalizedLabel::new(Some("it"), "Casa"), LocalizedLabel::new(Some("fr"), "Maison")],
			color: None,
		};

		assert_eq!(tag.label_for_locale("en"), Some("Casa"));
		assert_eq!(NotesTagDefinition { labels: Vec::new(), ..tag.clone() }.display_label("en"), "home");
	}

	#[test]
	fn entries_without_labels_get_a_default_label() {
		let tag = definition(json!({ "id": " errands ", "labels": { "en": 3 }, "color": "#ff0000" }));

		assert_eq!(tag.id, "errands");
		assert_eq!(tag.labels, vec![LocalizedLabel::default_label("errands")]);
		assert_eq!(tag.color.as_deref(), Some("#ff0000"));
	}

	#[test]
	fn catalog_skips_blank_ids() {
		let data = json!({ "tags": [{ "id": "" }, "bogus", { "id": "work" }] });
		let catalog = NotesTagCatalog::from_map(data.as_object());

		assert_eq!(catalog.tags.len(), 1);
		assert_eq!(catalog.tags[0].id, "work");
	}

	#[test]
	fn resolution_prefers_ids_over_labels() {
		let catalog = NotesTagCatalog::new(vec![
			definition(json!({ "id": "Alpha", "labels": { "default": "beta" } })),
			definition(json!({ "id": "beta", "labels": { "default": "Gamma" } })),
		]);
		let context = TagMappingContext::new(Some(&catalog), "en");

		assert_eq!(context.resolve("alpha"), Some("Alpha"));
		assert_eq!(context.resolve("BETA"), Some("beta"));
		assert_eq!(context.resolve("gamma"), Some("beta"));
		assert_eq!(context.resolve("   "), None);
		assert_eq!(context.display_label("Alpha"), Some("beta"));
	}

	#[test]
	fn legacy_migration_dedupes_and_keeps_unknown_labels() {
		let catalog = NotesTagCatalog::new(vec![definition(
			json!({ "id": "work", "labels": { "en": "Work", "it": "Lavoro" } }),
		)]);
		let context = TagMappingContext::new(Some(&catalog), "it");
		let result = context.map_legacy(&["lavoro", "WORK", "  ", "garden", "garden "]);

		assert_eq!(result.tag_ids, vec!["work"]);
		assert_eq!(result.unresolved_labels, vec!["garden"]);
	}

	#[test]
	fn resolve_tag_data_appends_migrated_values() {
		let catalog = NotesTagCatalog::new(vec![definition(json!({ "id": "work" }))]);
		let context = TagMappingContext::new(Some(&catalog), "en");
		let (ids, labels) =
			resolve_tag_data(&["home", " home"], &["Chores"], &["work", "chores", "Misc"], &context);

		assert_eq!(ids, vec!["home", "work"]);
		assert_eq!(labels, vec!["Chores", "chores", "Misc"]);
	}

	#[test]
	fn empty_context_resolves_nothing() {
		let context = TagMappingContext::new(None, "en");
		let result = context.map_legacy(&["work"]);

		assert!(result.tag_ids.is_empty());
		assert_eq!(result.unresolved_labels, vec!["work"]);
	}
}
