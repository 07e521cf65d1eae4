pub mod fs;
pub mod memory;
pub mod sessions;

mod error;

pub use error::{Error, Result};
pub use fs::FsStore;
pub use memory::MemoryStore;

use diana_notes::DocumentData;

/// A stored document and its id within its collection.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
	pub id: String,
	pub data: DocumentData,
}

/// Key-value document store addressed by slash-separated paths.
///
/// Collection paths have an odd number of segments (`sessions`, `sessions/a/notes`) and
/// document paths an even number (`sessions/a`).
pub trait DocumentStore
where
	Self: Send + Sync,
{
	fn get(&self, path: &str) -> Result<Option<DocumentData>>;

	/// Documents of a collection ordered by id. A missing collection is empty.
	fn list(&self, collection: &str) -> Result<Vec<Document>>;

	fn set(&self, path: &str, data: &DocumentData) -> Result<()>;

	/// Stores `data` under a generated id and returns that id.
	fn add(&self, collection: &str, data: &DocumentData) -> Result<String>;
}

pub(crate) fn document_segments(path: &str) -> Result<Vec<&str>> {
	let segments = segments(path)?;

	if segments.len() % 2 != 0 {
		return Err(invalid_path(path, "Document paths need an even number of segments."));
	}

	Ok(segments)
}

pub(crate) fn collection_segments(path: &str) -> Result<Vec<&str>> {
	let segments = segments(path)?;

	if segments.len() % 2 == 0 {
		return Err(invalid_path(path, "Collection paths need an odd number of segments."));
	}

	Ok(segments)
}

pub(crate) fn generated_id() -> String {
	uuid::Uuid::new_v4().simple().to_string()
}

fn segments(path: &str) -> Result<Vec<&str>> {
	let segments: Vec<&str> = path.trim().trim_matches('/').split('/').collect();

	for segment in &segments {
		if segment.is_empty() || *segment == "." || *segment == ".." {
			return Err(invalid_path(path, "Segments must be non-empty names."));
		}
		if segment.contains(['\\', ':']) || segment.trim() != *segment {
			return Err(invalid_path(path, "Segments must not contain separators or padding."));
		}
	}

	Ok(segments)
}

fn invalid_path(path: &str, message: &str) -> Error {
	Error::InvalidPath { path: path.to_string(), message: message.to_string() }
}
