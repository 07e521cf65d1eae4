use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub provider: ProviderConfig,
	pub resources: Resources,
	#[serde(default)]
	pub processing: Processing,
	pub storage: Storage,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// May be blank; the CLI flag and the environment are consulted first.
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	/// Optional. Overrides the built-in default model when no session model is set.
	pub model: Option<String>,
	pub temperature: Option<f32>,
	pub timeout_ms: u64,
	#[serde(default = "default_max_attempts")]
	pub max_attempts: u32,
	#[serde(default = "default_backoff_ms")]
	pub backoff_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}
impl ProviderConfig {
	pub fn endpoint(&self) -> String {
		format!("{}{}", self.api_base, self.path)
	}
}

#[derive(Debug, Deserialize)]
pub struct Resources {
	/// Directory that contains the `llm/` resource tree.
	pub root: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Processing {
	pub locale: String,
	pub log_capacity: usize,
}
impl Default for Processing {
	fn default() -> Self {
		Self { locale: "en".to_string(), log_capacity: 100 }
	}
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	/// Directory backing the JSON document store.
	pub root: PathBuf,
}

fn default_max_attempts() -> u32 {
	3
}

fn default_backoff_ms() -> u64 {
	1_000
}
