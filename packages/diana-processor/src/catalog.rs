use std::collections::HashSet;

use serde::Serialize;

use diana_notes::NotesTagCatalog;

/// Prompt text used when the session has no tags.
pub const NO_TAGS_PROMPT: &str = "- (no tags available)";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagDescriptor {
	pub id: String,
	pub label: String,
}

/// Locale-bound projection of a tag catalog used for prompting and sanitization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagCatalogSnapshot {
	descriptors: Vec<TagDescriptor>,
	approved_ids: HashSet<String>,
	prompt_text: String,
	primary_tag_id: Option<String>,
}
impl TagCatalogSnapshot {
	pub fn from_catalog(catalog: Option<&NotesTagCatalog>, locale: &str) -> Self {
		let mut descriptors: Vec<TagDescriptor> = Vec::new();

		for definition in catalog.map(|catalog| catalog.tags.as_slice()).unwrap_or_default() {
			let id = definition.id.trim();

			if id.is_empty() || descriptors.iter().any(|descriptor| descriptor.id == id) {
				continue;
			}

			let label = definition.label_for_locale(locale).unwrap_or(id).to_string();

			descriptors.push(TagDescriptor { id: id.to_string(), label });
		}

		descriptors.sort_by(|left, right| {
			(left.label.to_lowercase(), left.id.to_lowercase())
				.cmp(&(right.label.to_lowercase(), right.id.to_lowercase()))
		});

		let approved_ids = descriptors.iter().map(|descriptor| descriptor.id.clone()).collect();
		let prompt_text = if descriptors.is_empty() {
			NO_TAGS_PROMPT.to_string()
		} else {
			descriptors
				.iter()
				.map(|descriptor| format!("- {}: {}", descriptor.id, descriptor.label))
				.collect::<Vec<_>>()
				.join("\n")
		};
		let primary_tag_id = descriptors.first().map(|descriptor| descriptor.id.clone());

		Self { descriptors, approved_ids, prompt_text, primary_tag_id }
	}

	pub fn descriptors(&self) -> &[TagDescriptor] {
		&self.descriptors
	}

	/// Catalog ids in prompt order.
	pub fn sorted_ids(&self) -> Vec<String> {
		self.descriptors.iter().map(|descriptor| descriptor.id.clone()).collect()
	}

	pub fn prompt_text(&self) -> &str {
		&self.prompt_text
	}

	pub fn primary_tag_id(&self) -> Option<&str> {
		self.primary_tag_id.as_deref()
	}

	pub fn is_approved(&self, tag_id: &str) -> bool {
		self.approved_ids.is_empty() || self.approved_ids.contains(tag_id)
	}

	/// Trims, drops blanks and unknown ids, dedupes, and falls back to the primary tag.
	///
	/// Unknown ids are only dropped when the catalog is non-empty. The result is stable under
	/// repeated application.
	pub fn sanitize_tag_ids<S>(&self, ids: &[S]) -> Vec<String>
	where
		S: AsRef<str>,
	{
		let mut sanitized: Vec<String> = Vec::new();

		for raw in ids {
			let trimmed = raw.as_ref().trim();

			if trimmed.is_empty() || !self.is_approved(trimmed) {
				continue;
			}
			if !sanitized.iter().any(|existing| existing == trimmed) {
				sanitized.push(trimmed.to_string());
			}
		}

		if sanitized.is_empty()
			&& let Some(primary) = &self.primary_tag_id
		{
			sanitized.push(primary.clone());
		}

		sanitized
	}
}
impl Default for TagCatalogSnapshot {
	fn default() -> Self {
		Self::from_catalog(None, "")
	}
}

#[cfg(test)]
mod tests {
	use diana_notes::{LocalizedLabel, NotesTagDefinition};

	use super::*;

	fn tag(id: &str, labels: &[(&str, &str)]) -> NotesTagDefinition {
		NotesTagDefinition {
			id: id.to_string(),
			labels: labels
				.iter()
				.map(|(locale, value)| {
					let locale = if locale.is_empty() { None } else { Some(*locale) };

					LocalizedLabel::new(locale, *value)
				})
				.collect(),
			color: None,
		}
	}

	fn catalog() -> NotesTagCatalog {
		NotesTagCatalog::new(vec![
			tag("work", &[("", "Work"), ("it", "Lavoro")]),
			tag("home", &[("", "Home"), ("it", "Casa")]),
			tag("work", &[("", "Duplicate")]),
			tag("  ", &[("", "Blank")]),
		])
	}

	#[test]
	fn sorts_by_localized_label() {
		let snapshot = TagCatalogSnapshot::from_catalog(Some(&catalog()), "it");

		assert_eq!(snapshot.sorted_ids(), vec!["home", "work"]);
		assert_eq!(snapshot.prompt_text(), "- home: Casa\n- work: Lavoro");
		assert_eq!(snapshot.primary_tag_id(), Some("home"));

		let english = TagCatalogSnapshot::from_catalog(Some(&catalog()), "en");

		assert_eq!(english.prompt_text(), "- home: Home\n- work: Work");
	}

	#[test]
	fn empty_catalog_has_placeholder_prompt() {
		let snapshot = TagCatalogSnapshot::from_catalog(Some(&NotesTagCatalog::default()), "en");

		assert!(snapshot.descriptors().is_empty());
		assert_eq!(snapshot.prompt_text(), NO_TAGS_PROMPT);
		assert_eq!(snapshot.primary_tag_id(), None);
	}

	#[test]
	fn sanitize_filters_and_falls_back() {
		let snapshot = TagCatalogSnapshot::from_catalog(Some(&catalog()), "en");

		assert_eq!(snapshot.sanitize_tag_ids(&[" work ", "garden", "work"]), vec!["work"]);
		assert_eq!(snapshot.sanitize_tag_ids(&["garden", " "]), vec!["home"]);
		assert_eq!(snapshot.sanitize_tag_ids::<&str>(&[]), vec!["home"]);
	}

	#[test]
	fn sanitize_keeps_everything_without_a_catalog() {
		let snapshot = TagCatalogSnapshot::default();

		assert_eq!(snapshot.sanitize_tag_ids(&["b", " a ", "b", ""]), vec!["b", "a"]);
		assert!(snapshot.sanitize_tag_ids::<&str>(&[]).is_empty());
	}

	#[test]
	fn sanitize_is_idempotent() {
		let inputs: [&[&str]; 4] = [&[], &["garden"], &[" work", "home ", "work"], &["", "x", "home"]];

		for snapshot in [TagCatalogSnapshot::from_catalog(Some(&catalog()), "en"), TagCatalogSnapshot::default()] {
			for input in inputs {
				let once = snapshot.sanitize_tag_ids(input);

				assert_eq!(snapshot.sanitize_tag_ids(&once), once);
			}
		}
	}
}
