//! Schema-constrained generation requests.

use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result, aspect::Aspect, prompts::Prompts, resources::ResourceRoot};

const TAG_ITEMS_PATH: [&str; 6] = ["properties", "items", "items", "properties", "tags", "items"];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatMessage {
	pub role: String,
	pub content: String,
}
impl ChatMessage {
	pub fn system(content: impl Into<String>) -> Self {
		Self { role: "system".to_string(), content: content.into() }
	}

	pub fn user(content: impl Into<String>) -> Self {
		Self { role: "user".to_string(), content: content.into() }
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResponseFormat {
	#[serde(rename = "type")]
	pub kind: String,
	pub json_schema: Value,
}

/// Request body sent to the generation service for one aspect.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationRequest {
	pub model: String,
	pub messages: Vec<ChatMessage>,
	pub response_format: ResponseFormat,
}
impl GenerationRequest {
	pub fn to_value(&self) -> Result<Value> {
		Ok(serde_json::to_value(self)?)
	}

	pub fn schema(&self) -> &Value {
		&self.response_format.json_schema
	}
}

/// Immutable schema templates loaded once per processor.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaTemplates {
	base: Value,
	todo: Value,
	appointment: Value,
	thought: Value,
}
impl SchemaTemplates {
	/// Loads the aspect schemas. An aspect whose schema file is missing uses the base schema.
	pub fn load(resources: &ResourceRoot) -> Result<Self> {
		let base = resources.load_json("llm/schema/base.json")?;
		let load_or_base = |name: &str| -> Result<Value> {
			let logical = format!("llm/schema/{name}.json");

			if resources.resolve(&logical)?.is_file() {
				resources.load_json(&logical)
			} else {
				tracing::warn!(schema = %logical, "Aspect schema is missing. Using the base schema.");

				Ok(base.clone())
			}
		};

		let templates = Self {
			todo: load_or_base("todo")?,
			appointment: load_or_base("appointment")?,
			thought: load_or_base("thought")?,
			base,
		};

		for aspect in Aspect::ALL {
			validate_schema(aspect, templates.template(aspect))?;
		}

		Ok(templates)
	}

	pub fn base(&self) -> &Value {
		&self.base
	}

	pub fn template(&self, aspect: Aspect) -> &Value {
		match aspect {
			Aspect::Todo => &self.todo,
			Aspect::Appointments => &self.appointment,
			Aspect::Thoughts => &self.thought,
		}
	}
}

/// Checks that `schema` asks for the fields the merger of `aspect` reads.
pub fn validate_schema(aspect: Aspect, schema: &Value) -> Result<()> {
	let inner = match schema.get("schema") {
		Some(inner @ Value::Object(_)) => inner,
		_ => schema,
	};
	let required: Vec<&str> = inner
		.get("required")
		.and_then(Value::as_array)
		.map(|fields| fields.iter().filter_map(Value::as_str).collect())
		.unwrap_or_default();
	let expected: &[(&str, &str)] = match aspect {
		Aspect::Todo => &[("items", "array")],
		Aspect::Appointments => &[("updated", "string")],
		Aspect::Thoughts => &[("updated_markdown", "string"), ("sections", "array")],
	};

	for (field, kind) in expected {
		let actual = inner
			.get("properties")
			.and_then(|properties| properties.get(*field))
			.and_then(|property| property.get("type"))
			.and_then(Value::as_str);

		if actual != Some(*kind) {
			return Err(Error::InvalidSchema {
				aspect,
				message: format!("Property {field} must be of type {kind}."),
			});
		}
		if !required.contains(field) {
			return Err(Error::InvalidSchema {
				aspect,
				message: format!("Property {field} must be required."),
			});
		}
	}

	Ok(())
}

/// Values substituted into the prompt templates.
#[derive(Clone, Copy, Debug)]
pub struct PromptInputs<'a> {
	pub prior: &'a str,
	pub memo: &'a str,
	pub today: &'a str,
	pub tag_catalog: &'a str,
}

pub fn build_request(
	aspect: Aspect,
	model: &str,
	prompts: &Prompts,
	schemas: &SchemaTemplates,
	sorted_tag_ids: &[String],
	inputs: PromptInputs<'_>,
) -> GenerationRequest {
	let template = schemas.template(aspect);
	let schema = if aspect.is_tagged() {
		with_tag_enumeration(template, sorted_tag_ids)
	} else {
		template.clone()
	};
	let aspect_text = prompts.aspect_text(aspect);
	let system = prompts.system_template.replace("{aspect}", aspect_text);
	let user = prompts
		.user_template
		.replace("{aspect}", aspect_text)
		.replace("{prior}", inputs.prior)
		.replace("{memo}", inputs.memo)
		.replace("{today}", inputs.today)
		.replace("{tag_catalog}", inputs.tag_catalog);

	GenerationRequest {
		model: model.to_string(),
		messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
		response_format: ResponseFormat { kind: "json_schema".to_string(), json_schema: schema },
	}
}

/// Returns a copy of `schema` whose item tags are restricted to `tag_ids`.
///
/// The tag node is looked up below a top-level `schema` wrapper when present. Its `pattern` is
/// removed and `enum` is set to `tag_ids`, or removed when `tag_ids` is empty. A schema without
/// the tag node is returned unchanged.
pub fn with_tag_enumeration(schema: &Value, tag_ids: &[String]) -> Value {
	let mut patched = schema.clone();
	let root = if patched.get("schema").is_some_and(Value::is_object) {
		patched.get_mut("schema")
	} else {
		Some(&mut patched)
	};
	let node = TAG_ITEMS_PATH
		.iter()
		.fold(root, |cursor, segment| cursor.and_then(|node| node.get_mut(*segment)))
		.and_then(Value::as_object_mut);

	if let Some(node) = node {
		node.remove("pattern");

		if tag_ids.is_empty() {
			node.remove("enum");
		} else {
			node.insert(
				"enum".to_string(),
				Value::Array(tag_ids.iter().cloned().map(Value::String).collect()),
			);
		}
	}

	patched
}
