//! Logical-path access to the bundled generation resources.

use std::{
	fs,
	path::{Path, PathBuf},
};

use serde_json::Value;

use crate::{Error, Result};

const RESOURCE_PREFIX: &str = "llm";

/// Directory holding the `llm/` resource tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRoot {
	root: PathBuf,
}
impl ResourceRoot {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Maps a logical path such as `llm/prompts/en/todo.txt` onto the filesystem.
	pub fn resolve(&self, logical: &str) -> Result<PathBuf> {
		let relative = normalize_path(logical)?;
		let mut target = self.root.join(RESOURCE_PREFIX);

		for segment in relative.split('/') {
			target.push(segment);
		}

		Ok(target)
	}

	pub fn load(&self, logical: &str) -> Result<String> {
		let path = self.resolve(logical)?;

		fs::read_to_string(&path).map_err(|source| Error::ReadResource { path, source })
	}

	pub fn load_json(&self, logical: &str) -> Result<Value> {
		let raw = self.load(logical)?;

		serde_json::from_str(&raw)
			.map_err(|source| Error::ParseResource { path: logical.to_string(), source })
	}
}

/// Normalizes a logical resource path to a `/`-separated path below `llm/`.
///
/// A leading `/` and the `llm/` prefix are optional and backslashes are accepted as separators.
/// Empty paths and `..` segments are rejected.
pub fn normalize_path(logical: &str) -> Result<String> {
	let invalid = || Error::InvalidResourcePath { path: logical.to_string() };
	let unified = logical.trim().replace('\\', "/");
	let stripped = unified.trim_start_matches('/');
	let stripped = stripped
		.strip_prefix(RESOURCE_PREFIX)
		.and_then(|rest| rest.strip_prefix('/'))
		.unwrap_or(stripped);
	let mut segments = Vec::new();

	for segment in stripped.split('/') {
		match segment {
			"" | "." => continue,
			".." => return Err(invalid()),
			_ => segments.push(segment),
		}
	}

	if segments.is_empty() {
		return Err(invalid());
	}

	Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalizes_prefixes_and_separators() {
		for raw in ["llm/prompts/en/todo.txt", "/llm/prompts/en/todo.txt", "prompts\\en\\todo.txt"] {
			assert_eq!(normalize_path(raw).expect("Path should be valid."), "prompts/en/todo.txt");
		}
	}

	#[test]
	fn rejects_empty_and_parent_paths() {
		for raw in ["", "   ", "/", "llm/", "llm/../secrets.txt", "prompts/..\\..\\etc"] {
			assert!(
				matches!(normalize_path(raw), Err(Error::InvalidResourcePath { .. })),
				"{raw:?} should be rejected."
			);
		}
	}

	#[test]
	fn resolves_below_the_llm_directory() {
		let root = ResourceRoot::new("/srv/resources");
		let path = root.resolve("schema/todo.json").expect("Path should be valid.");

		assert_eq!(path, Path::new("/srv/resources/llm/schema/todo.json"));
	}
}
