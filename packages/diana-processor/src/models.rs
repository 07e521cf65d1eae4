use serde_json::Value;

use crate::resources::ResourceRoot;

pub const DEFAULT_MODEL: &str = "mistralai/mistral-nemo";
pub const MODELS_RESOURCE: &str = "llm/models.json";

/// Model ids listed in `llm/models.json`, in file order without duplicates.
///
/// A missing or malformed file yields an empty list, which disables model validation.
pub fn available_model_ids(resources: &ResourceRoot) -> Vec<String> {
	let parsed = match resources.load_json(MODELS_RESOURCE) {
		Ok(parsed) => parsed,
		Err(err) => {
			tracing::debug!(error = %err, "Model catalog is unavailable.");

			return Vec::new();
		},
	};
	let mut ids: Vec<String> = Vec::new();

	for entry in parsed.as_array().map(Vec::as_slice).unwrap_or_default() {
		let Some(id) = entry.get("id").and_then(Value::as_str).map(str::trim) else {
			continue;
		};

		if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
			ids.push(id.to_string());
		}
	}

	ids
}

/// Picks the model to use for `candidate`.
///
/// Order: the candidate when available, then [`DEFAULT_MODEL`] when available, then the first
/// available model. Without a catalog the candidate is accepted as is.
pub fn normalize_model(candidate: &str, available: &[String]) -> String {
	let candidate = candidate.trim();

	if available.is_empty() {
		return if candidate.is_empty() { DEFAULT_MODEL.to_string() } else { candidate.to_string() };
	}
	if available.iter().any(|id| id == candidate) {
		return candidate.to_string();
	}

	let fallback = if available.iter().any(|id| id == DEFAULT_MODEL) {
		DEFAULT_MODEL.to_string()
	} else {
		available[0].clone()
	};

	if !candidate.is_empty() {
		tracing::warn!(requested = candidate, model = %fallback, "Requested model is unavailable.");
	}

	fallback
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ids(values: &[&str]) -> Vec<String> {
		values.iter().map(|value| value.to_string()).collect()
	}

	#[test]
	fn accepts_available_candidates() {
		assert_eq!(normalize_model("openai/gpt-4o-mini", &ids(&["openai/gpt-4o-mini", DEFAULT_MODEL])), "openai/gpt-4o-mini");
	}

	#[test]
	fn falls_back_to_default_then_first() {
		assert_eq!(normalize_model("unknown", &ids(&["a", DEFAULT_MODEL])), DEFAULT_MODEL);
		assert_eq!(normalize_model("unknown", &ids(&["a", "b"])), "a");
	}

	#[test]
	fn accepts_anything_without_a_catalog() {
		assert_eq!(normalize_model(" custom/model ", &[]), "custom/model");
		assert_eq!(normalize_model("", &[]), DEFAULT_MODEL);
	}
}
