use std::path::PathBuf;

use crate::aspect::Aspect;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("A generation API key is required.")]
	MissingApiKey,
	#[error("No pending request for aspect {aspect}.")]
	NoPendingRequest { aspect: Aspect },
	#[error("Invalid {aspect} response: {message}")]
	InvalidResponse { aspect: Aspect, message: String },
	#[error("Invalid {aspect} schema: {message}")]
	InvalidSchema { aspect: Aspect, message: String },
	#[error("Invalid resource path {path:?}.")]
	InvalidResourcePath { path: String },
	#[error("Failed to read resource at {path:?}.")]
	ReadResource { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse resource {path}.")]
	ParseResource { path: String, source: serde_json::Error },
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
}
