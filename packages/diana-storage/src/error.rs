pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid document path {path:?}. {message}")]
	InvalidPath { path: String, message: String },
	#[error("Document {path:?} was not found.")]
	NotFound { path: String },
	#[error("Document {path:?} is invalid. {message}")]
	InvalidDocument { path: String, message: String },
	#[error("Failed to access store file at {path:?}.")]
	Io { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to decode store file at {path:?}.")]
	Decode { path: std::path::PathBuf, source: serde_json::Error },
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	Notes(#[from] diana_notes::Error),
}
