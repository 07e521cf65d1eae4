use serde::Serialize;
use serde_json::Value;

use crate::{outline, value::DocumentData};

/// Reserved note id holding the thought document.
pub const THOUGHT_DOCUMENT_ID: &str = "__thought_document__";
pub const THOUGHT_DOCUMENT_TYPE: &str = "thought_document";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ThoughtOutlineSection {
	pub title: String,
	pub level: u32,
	pub anchor: String,
	pub children: Vec<ThoughtOutlineSection>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ThoughtOutline {
	pub sections: Vec<ThoughtOutlineSection>,
}

/// Long-lived markdown document of a session plus its heading outline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ThoughtDocument {
	pub markdown_body: String,
	pub outline: ThoughtOutline,
}
impl ThoughtDocument {
	pub fn new(markdown_body: impl Into<String>) -> Self {
		Self { markdown_body: markdown_body.into(), outline: ThoughtOutline::default() }
	}

	/// Parses the stored document. Wrong types and blank bodies read as absent.
	pub fn from_document(data: &DocumentData) -> Option<Self> {
		if data.get("type").and_then(Value::as_str).map(str::trim) != Some(THOUGHT_DOCUMENT_TYPE) {
			return None;
		}

		let markdown = data.get("markdown").and_then(Value::as_str)?;

		if markdown.trim().is_empty() {
			return None;
		}

		Some(Self {
			markdown_body: markdown.to_string(),
			outline: ThoughtOutline { sections: outline::parse_sections(data.get("outline")) },
		})
	}

	pub fn to_document(&self) -> DocumentData {
		let mut map = DocumentData::new();

		map.insert("type".to_string(), Value::String(THOUGHT_DOCUMENT_TYPE.to_string()));
		map.insert("markdown".to_string(), Value::String(self.markdown_body.clone()));
		map.insert("outline".to_string(), outline::sections_to_value(&self.outline.sections));

		map
	}
}
