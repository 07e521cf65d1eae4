use crate::{Result, aspect::Aspect, resources::ResourceRoot};

/// Languages with a bundled prompt set.
pub const PROMPT_LANGUAGES: [&str; 3] = ["en", "it", "fr"];
pub const FALLBACK_PROMPT_LANGUAGE: &str = "en";

/// Prompt set of a locale.
///
/// The language comes from [`prompt_language`], which only knows the bundled languages. Tag
/// labels use the independent chain in `NotesTagDefinition::label_for_locale`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompts {
	pub language: &'static str,
	pub todo: String,
	pub appointments: String,
	pub thoughts: String,
	pub system_template: String,
	pub user_template: String,
}
impl Prompts {
	pub fn for_locale(resources: &ResourceRoot, locale: &str) -> Result<Self> {
		let language = prompt_language(locale);
		let load = |name: &str| -> Result<String> {
			Ok(resources.load(&format!("llm/prompts/{language}/{name}.txt"))?.trim().to_string())
		};

		Ok(Self {
			language,
			todo: load("todo")?,
			appointments: load("appointments")?,
			thoughts: load("thoughts")?,
			system_template: load("system")?,
			user_template: load("user")?,
		})
	}

	/// Instruction text substituted for `{aspect}`.
	pub fn aspect_text(&self, aspect: Aspect) -> &str {
		match aspect {
			Aspect::Todo => &self.todo,
			Aspect::Appointments => &self.appointments,
			Aspect::Thoughts => &self.thoughts,
		}
	}

	/// Short digest identifying this exact prompt set.
	pub fn version(&self) -> String {
		let mut hasher = blake3::Hasher::new();

		for part in [
			self.language,
			self.todo.as_str(),
			self.appointments.as_str(),
			self.thoughts.as_str(),
			self.system_template.as_str(),
			self.user_template.as_str(),
		] {
			hasher.update(part.as_bytes());
			hasher.update(&[0]);
		}

		hasher.finalize().to_hex().as_str()[..12].to_string()
	}
}

/// Bundled prompt language for `locale`: its language subtag when bundled, else English.
pub fn prompt_language(locale: &str) -> &'static str {
	let language = locale.trim().replace('_', "-").to_lowercase();
	let language = language.split('-').next().unwrap_or_default();

	PROMPT_LANGUAGES
		.into_iter()
		.find(|candidate| *candidate == language)
		.unwrap_or(FALLBACK_PROMPT_LANGUAGE)
}
