//! Chat-completion exchange with the generation service.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};
use diana_config::ProviderConfig;

/// Posts `body` to the configured endpoint and returns the decoded response.
///
/// Transport failures, non-2xx statuses and undecodable bodies are retried up to
/// `max_attempts` times with exponential backoff.
pub async fn complete(cfg: &ProviderConfig, api_key: &str, body: &Value) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let headers = crate::auth_headers(api_key, &cfg.default_headers)?;
	let url = cfg.endpoint();
	let body = with_temperature(body, cfg.temperature);
	let attempts = cfg.max_attempts.max(1);
	let mut attempt = 0;

	loop {
		let result = send(&client, &url, headers.clone(), &body).await;

		match result {
			Ok(json) => return Ok(json),
			Err(err) if attempt + 1 < attempts => {
				let delay = backoff_delay(cfg.backoff_ms, attempt);

				tracing::warn!(
					error = %err,
					attempt = attempt + 1,
					delay_ms = delay.as_millis() as u64,
					"Generation request failed. Retrying."
				);
				tokio::time::sleep(delay).await;

				attempt += 1;
			},
			Err(err) => return Err(err),
		}
	}
}

/// Sends `body` and extracts the structured JSON object the model produced.
pub async fn generate(cfg: &ProviderConfig, api_key: &str, body: &Value) -> Result<Value> {
	let response = complete(cfg, api_key, body).await?;

	extract_structured_json(&response)
}

/// Pulls the first JSON object out of `choices[0].message.content`.
///
/// The content may be a string or a list of parts with `text` fields, which are concatenated.
/// Prose or code fences around the object are ignored.
pub fn extract_structured_json(response: &Value) -> Result<Value> {
	let choice = response
		.get("choices")
		.and_then(Value::as_array)
		.and_then(|choices| choices.first())
		.ok_or_else(|| invalid_response("Generation response is missing choices."))?;
	let text = match choice.get("message").and_then(|message| message.get("content")) {
		Some(Value::String(text)) => text.clone(),
		Some(Value::Array(parts)) => parts
			.iter()
			.filter_map(|part| part.get("text").and_then(Value::as_str))
			.collect::<String>(),
		_ => return Err(invalid_response("Generation response is missing content.")),
	};

	first_json_object(&text)
		.ok_or_else(|| invalid_response("Generation content did not include a JSON object."))
}

/// Delay before retry number `attempt + 1`: `backoff_ms * 2^attempt`.
pub fn backoff_delay(backoff_ms: u64, attempt: u32) -> Duration {
	Duration::from_millis(backoff_ms.saturating_mul(2_u64.saturating_pow(attempt)))
}

async fn send(
	client: &Client,
	url: &str,
	headers: reqwest::header::HeaderMap,
	body: &Value,
) -> Result<Value> {
	let res = client.post(url).headers(headers).json(body).send().await?;
	let bytes = res.error_for_status()?.bytes().await?;

	Ok(serde_json::from_slice(&bytes)?)
}

fn with_temperature(body: &Value, temperature: Option<f32>) -> Value {
	let mut body = body.clone();

	if let (Some(temperature), Some(map)) = (temperature, body.as_object_mut()) {
		map.entry("temperature").or_insert_with(|| Value::from(f64::from(temperature)));
	}

	body
}

fn first_json_object(text: &str) -> Option<Value> {
	let mut search_from = 0;

	while let Some(offset) = text[search_from..].find('{') {
		let start = search_from + offset;

		if let Some(end) = balanced_end(&text[start..])
			&& let Ok(value @ Value::Object(_)) = serde_json::from_str(&text[start..start + end])
		{
			return Some(value);
		}

		search_from = start + 1;
	}

	None
}

/// Byte length of the balanced `{...}` prefix of `text`, skipping braces inside strings.
fn balanced_end(text: &str) -> Option<usize> {
	let mut depth = 0_usize;
	let mut in_string = false;
	let mut escaped = false;

	for (index, ch) in text.char_indices() {
		if in_string {
			match ch {
				_ if escaped => escaped = false,
				'\\' => escaped = true,
				'"' => in_string = false,
				_ => {},
			}

			continue;
		}

		match ch {
			'"' => in_string = true,
			'{' => depth += 1,
			'}' => {
				depth = depth.checked_sub(1)?;

				if depth == 0 {
					return Some(index + 1);
				}
			},
			_ => {},
		}
	}

	None
}

fn invalid_response(message: &str) -> Error {
	Error::InvalidResponse { message: message.to_string() }
}
