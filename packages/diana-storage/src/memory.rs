//! In-process store used by tests and dry runs.

use std::{
	collections::BTreeMap,
	sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
	Document, DocumentStore, Result, collection_segments, document_segments, generated_id,
};
use diana_notes::DocumentData;

type Collections = BTreeMap<String, BTreeMap<String, DocumentData>>;

#[derive(Debug, Default)]
pub struct MemoryStore {
	collections: Mutex<Collections>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of documents across all collections.
	pub fn len(&self) -> usize {
		self.lock().values().map(BTreeMap::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn lock(&self) -> MutexGuard<'_, Collections> {
		self.collections.lock().unwrap_or_else(PoisonError::into_inner)
	}
}
impl DocumentStore for MemoryStore {
	fn get(&self, path: &str) -> Result<Option<DocumentData>> {
		let (collection, id) = split_document(path)?;

		Ok(self.lock().get(&collection).and_then(|documents| documents.get(&id)).cloned())
	}

	fn list(&self, collection: &str) -> Result<Vec<Document>> {
		let collection = collection_segments(collection)?.join("/");
		let documents = self
			.lock()
			.get(&collection)
			.map(|documents| {
				documents
					.iter()
					.map(|(id, data)| Document { id: id.clone(), data: data.clone() })
					.collect()
			})
			.unwrap_or_default();

		Ok(documents)
	}

	fn set(&self, path: &str, data: &DocumentData) -> Result<()> {
		let (collection, id) = split_document(path)?;

		self.lock().entry(collection).or_default().insert(id, data.clone());

		Ok(())
	}

	fn add(&self, collection: &str, data: &DocumentData) -> Result<String> {
		let collection = collection_segments(collection)?.join("/");
		let id = generated_id();

		self.lock().entry(collection).or_default().insert(id.clone(), data.clone());

		Ok(id)
	}
}

fn split_document(path: &str) -> Result<(String, String)> {
	let mut segments = document_segments(path)?;
	let id = segments.pop().unwrap_or_default().to_string();

	Ok((segments.join("/"), id))
}
