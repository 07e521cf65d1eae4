mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	path::{Component, Path, PathBuf},
};

use uuid::Uuid;

use diana_notes::{LocalizedLabel, NotesTagCatalog, NotesTagDefinition, TodoItem};

/// Scratch directory removed when dropped.
pub struct TestDirectory {
	path: PathBuf,
	cleaned: bool,
}
impl TestDirectory {
	pub fn new(prefix: &str) -> Result<Self> {
		let path = env::temp_dir().join(format!("{prefix}_{}", Uuid::new_v4().simple()));

		fs::create_dir_all(&path)?;

		Ok(Self { path, cleaned: false })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Writes `contents` to `relative`, creating parent directories.
	pub fn write_file(&self, relative: &str, contents: &str) -> Result<PathBuf> {
		let target = self.child(relative)?;

		if let Some(parent) = target.parent() {
			fs::create_dir_all(parent)?;
		}

		fs::write(&target, contents)?;

		Ok(target)
	}

	pub fn remove_file(&self, relative: &str) -> Result<()> {
		fs::remove_file(self.child(relative)?)?;

		Ok(())
	}

	pub fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner()
	}

	fn child(&self, relative: &str) -> Result<PathBuf> {
		let relative = Path::new(relative);

		if relative.components().any(|component| !matches!(component, Component::Normal(_))) {
			return Err(Error::Message(format!(
				"Test paths must be relative without parent segments: {}.",
				relative.display()
			)));
		}

		Ok(self.path.join(relative))
	}

	fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		fs::remove_dir_all(&self.path)?;

		self.cleaned = true;

		Ok(())
	}
}
impl Drop for TestDirectory {
	fn drop(&mut self) {
		if let Err(err) = self.cleanup_inner() {
			eprintln!("Test directory cleanup failed: {err}.");
		}
	}
}

/// Writable copy of the bundled `resources/` tree.
pub struct TestResources {
	directory: TestDirectory,
}
impl TestResources {
	pub fn copy_bundled() -> Result<Self> {
		let directory = TestDirectory::new("diana_resources")?;

		copy_tree(&bundled_resource_root(), directory.path())?;

		Ok(Self { directory })
	}

	/// Root to hand to the processor; it contains the `llm/` tree.
	pub fn root(&self) -> &Path {
		self.directory.path()
	}

	pub fn write_file(&self, relative: &str, contents: &str) -> Result<PathBuf> {
		self.directory.write_file(relative, contents)
	}

	pub fn remove_file(&self, relative: &str) -> Result<()> {
		self.directory.remove_file(relative)
	}
}

/// The `resources/` directory shipped with the workspace.
pub fn bundled_resource_root() -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..").join("resources")
}

/// Tag definition with `(locale, label)` pairs; an empty locale marks the default label.
pub fn tag(id: &str, labels: &[(&str, &str)]) -> NotesTagDefinition {
	let labels = labels
		.iter()
		.map(|(locale, value)| {
			let locale = if locale.is_empty() { None } else { Some(*locale) };

			LocalizedLabel::new(locale, *value)
		})
		.collect();

	NotesTagDefinition { id: id.to_string(), labels, color: None }
}

/// Catalog with one default-labelled tag per `(id, label)` pair.
pub fn simple_catalog(tags: &[(&str, &str)]) -> NotesTagCatalog {
	NotesTagCatalog::new(tags.iter().map(|(id, label)| tag(id, &[("", *label)])).collect())
}

pub fn todo(text: &str, note_id: &str) -> TodoItem {
	TodoItem {
		text: text.to_string(),
		status: "not_started".to_string(),
		note_id: note_id.to_string(),
		..Default::default()
	}
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
	fs::create_dir_all(to)?;

	for entry in fs::read_dir(from)? {
		let entry = entry?;
		let target = to.join(entry.file_name());

		if entry.file_type()?.is_dir() {
			copy_tree(&entry.path(), &target)?;
		} else {
			fs::copy(entry.path(), target)?;
		}
	}

	Ok(())
}
