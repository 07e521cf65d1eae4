//! Filesystem store: each document is `{root}/{collection...}/{id}.json`.

use std::{
	fs, io,
	path::{Path, PathBuf},
};

use serde_json::Value;

use crate::{
	Document, DocumentStore, Error, Result, collection_segments, document_segments, generated_id,
};
use diana_notes::DocumentData;

const EXTENSION: &str = "json";

#[derive(Clone, Debug)]
pub struct FsStore {
	root: PathBuf,
}
impl FsStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn document_file(&self, path: &str) -> Result<PathBuf> {
		let segments = document_segments(path)?;
		let (id, parents) = segments.split_last().ok_or_else(|| Error::InvalidPath {
			path: path.to_string(),
			message: "Document paths need an id.".to_string(),
		})?;
		let mut file = parents.iter().fold(self.root.clone(), |file, segment| file.join(segment));

		file.push(format!("{id}.{EXTENSION}"));

		Ok(file)
	}

	fn write(&self, file: &Path, data: &DocumentData) -> Result<()> {
		let io_error = |source| Error::Io { path: file.to_path_buf(), source };

		if let Some(parent) = file.parent() {
			fs::create_dir_all(parent).map_err(io_error)?;
		}

		let encoded = serde_json::to_vec_pretty(data)?;
		let staging = file.with_extension(format!("{EXTENSION}.tmp"));

		fs::write(&staging, encoded).map_err(io_error)?;
		fs::rename(&staging, file).map_err(io_error)?;

		Ok(())
	}
}
impl DocumentStore for FsStore {
	fn get(&self, path: &str) -> Result<Option<DocumentData>> {
		let file = self.document_file(path)?;

		read_document(&file)
	}

	fn list(&self, collection: &str) -> Result<Vec<Document>> {
		let directory = collection_segments(collection)?
			.iter()
			.fold(self.root.clone(), |directory, segment| directory.join(segment));
		let entries = match fs::read_dir(&directory) {
			Ok(entries) => entries,
			Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(source) => return Err(Error::Io { path: directory, source }),
		};
		let mut documents = Vec::new();

		for entry in entries {
			let file = entry.map_err(|source| Error::Io { path: directory.clone(), source })?.path();

			if !file.is_file() || file.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
				continue;
			}

			let Some(id) = file.file_stem().and_then(|stem| stem.to_str()).map(str::to_string) else {
				continue;
			};

			if let Some(data) = read_document(&file)? {
				documents.push(Document { id, data });
			}
		}

		documents.sort_by(|left, right| left.id.cmp(&right.id));

		Ok(documents)
	}

	fn set(&self, path: &str, data: &DocumentData) -> Result<()> {
		let file = self.document_file(path)?;

		self.write(&file, data)
	}

	fn add(&self, collection: &str, data: &DocumentData) -> Result<String> {
		let id = generated_id();

		self.set(&format!("{}/{id}", collection.trim().trim_matches('/')), data)?;

		Ok(id)
	}
}

fn read_document(file: &Path) -> Result<Option<DocumentData>> {
	let raw = match fs::read(file) {
		Ok(raw) => raw,
		Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
		Err(source) => return Err(Error::Io { path: file.to_path_buf(), source }),
	};

	match serde_json::from_slice(&raw) {
		Ok(Value::Object(data)) => Ok(Some(data)),
		Ok(_) => {
			tracing::warn!(path = %file.display(), "Skipping non-object document.");

			Ok(None)
		},
		Err(source) => Err(Error::Decode { path: file.to_path_buf(), source }),
	}
}
