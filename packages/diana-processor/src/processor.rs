use std::collections::BTreeMap;

use serde_json::Value;
use time::{Date, OffsetDateTime};

use crate::{
	Error, Result,
	aspect::Aspect,
	catalog::TagCatalogSnapshot,
	logger::LlmLogger,
	merge, models, prior,
	prompts::Prompts,
	request::{self, GenerationRequest, PromptInputs, SchemaTemplates},
	resources::ResourceRoot,
};
use diana_notes::{
	AspectSelection, MemoSummary, NotesTagCatalog, Thought, TodoItem, note, value::DocumentData,
};

pub struct ProcessorArgs<'a> {
	pub api_key: &'a str,
	pub locale: &'a str,
	pub resources: ResourceRoot,
	pub catalog: Option<&'a NotesTagCatalog>,
	pub log_capacity: usize,
}

/// Orchestrates one or more processing cycles over a session's structured state.
///
/// A cycle is `prepare_requests`, an external exchange per aspect, then `ingest_response` per
/// aspect. Each aspect keeps at most one pending request; preparing it again replaces it.
pub struct MemoProcessor {
	api_key: String,
	locale: String,
	prompts: Prompts,
	schemas: SchemaTemplates,
	snapshot: TagCatalogSnapshot,
	available_models: Vec<String>,
	model: String,
	state: MemoSummary,
	pending: BTreeMap<Aspect, String>,
	logger: LlmLogger,
}
impl MemoProcessor {
	pub fn new(args: ProcessorArgs<'_>) -> Result<Self> {
		let prompts = Prompts::for_locale(&args.resources, args.locale)?;
		let schemas = SchemaTemplates::load(&args.resources)?;
		let available_models = models::available_model_ids(&args.resources);
		let model = models::normalize_model(models::DEFAULT_MODEL, &available_models);

		Ok(Self {
			api_key: args.api_key.trim().to_string(),
			locale: args.locale.trim().to_string(),
			prompts,
			schemas,
			snapshot: TagCatalogSnapshot::from_catalog(args.catalog, args.locale),
			available_models,
			model,
			state: MemoSummary::default(),
			pending: BTreeMap::new(),
			logger: LlmLogger::new(args.log_capacity),
		})
	}

	pub fn locale(&self) -> &str {
		&self.locale
	}

	pub fn model(&self) -> &str {
		&self.model
	}

	pub fn available_models(&self) -> &[String] {
		&self.available_models
	}

	/// Selects the model for later requests, substituting an available one when needed.
	pub fn set_model(&mut self, candidate: &str) -> &str {
		self.model = models::normalize_model(candidate, &self.available_models);

		&self.model
	}

	pub fn prompts(&self) -> &Prompts {
		&self.prompts
	}

	pub fn tag_snapshot(&self) -> &TagCatalogSnapshot {
		&self.snapshot
	}

	pub fn logger(&self) -> &LlmLogger {
		&self.logger
	}

	/// Rebuilds the catalog snapshot and re-sanitizes tagged items against it.
	pub fn update_tag_catalog(&mut self, catalog: Option<&NotesTagCatalog>) {
		self.snapshot = TagCatalogSnapshot::from_catalog(catalog, &self.locale);
		self.state.todo_items = self.sanitize_todo_items(&self.state.todo_items);
		self.state.thought_items = self.sanitize_thought_items(&self.state.thought_items);
	}

	/// Replaces the current state. The thoughts text mirrors the document body when present.
	pub fn initialize(&mut self, summary: MemoSummary) {
		let thoughts = match &summary.thought_document {
			Some(document) => document.markdown_body.clone(),
			None => summary.thoughts.clone(),
		};

		self.state = MemoSummary {
			todo_items: self.sanitize_todo_items(&summary.todo_items),
			thought_items: self.sanitize_thought_items(&summary.thought_items),
			thoughts,
			..summary
		};
	}

	pub fn prepare_requests(
		&mut self,
		memo: &str,
		selection: AspectSelection,
	) -> Result<BTreeMap<Aspect, GenerationRequest>> {
		self.prepare_requests_on(memo, selection, OffsetDateTime::now_utc().date())
	}

	/// Builds one request per selected aspect and records it as pending.
	///
	/// Fails with [`Error::MissingApiKey`] before touching any state when no key is set.
	pub fn prepare_requests_on(
		&mut self,
		memo: &str,
		selection: AspectSelection,
		today: Date,
	) -> Result<BTreeMap<Aspect, GenerationRequest>> {
		if self.api_key.is_empty() {
			return Err(Error::MissingApiKey);
		}

		let today = today.to_string();
		let selected = [
			(Aspect::Todo, selection.todos),
			(Aspect::Appointments, selection.appointments),
			(Aspect::Thoughts, selection.thoughts),
		];
		let mut requests = BTreeMap::new();

		for (aspect, enabled) in selected {
			if !enabled {
				continue;
			}

			let prior = serde_json::to_string(&self.prior(aspect))?;
			let request = request::build_request(
				aspect,
				&self.model,
				&self.prompts,
				&self.schemas,
				&self.snapshot.sorted_ids(),
				PromptInputs {
					prior: &prior,
					memo,
					today: &today,
					tag_catalog: self.snapshot.prompt_text(),
				},
			);

			self.pending.insert(aspect, serde_json::to_string(&request)?);

			tracing::debug!(aspect = %aspect, model = %self.model, "Prepared generation request.");

			requests.insert(aspect, request);
		}

		Ok(requests)
	}

	/// Applies the model's JSON payload for `aspect` and returns the aspect's new flat text.
	///
	/// The pending request is consumed and the exchange logged even when the payload is
	/// rejected. A rejected payload leaves every aspect's state untouched.
	pub fn ingest_response(&mut self, aspect: Aspect, body: &str) -> Result<String> {
		let request = self.pending.remove(&aspect).ok_or(Error::NoPendingRequest { aspect })?;

		self.logger.log(&request, body);

		let parsed: Value = serde_json::from_str(body)
			.map_err(|err| Error::InvalidResponse { aspect, message: err.to_string() })?;
		let Value::Object(payload) = parsed else {
			return Err(Error::InvalidResponse {
				aspect,
				message: "Response payload must be a JSON object.".to_string(),
			});
		};
		let updated = match aspect {
			Aspect::Todo => self.apply_todos(&payload),
			Aspect::Appointments => self.apply_appointments(&payload),
			Aspect::Thoughts => self.apply_thoughts(&payload),
		};

		tracing::info!(aspect = %aspect, "Applied generation response.");

		Ok(updated)
	}

	/// Aspects with a prepared request that has not been ingested yet.
	pub fn pending_aspects(&self) -> Vec<Aspect> {
		self.pending.keys().copied().collect()
	}

	pub fn summary(&self) -> MemoSummary {
		self.state.clone()
	}

	fn prior(&mut self, aspect: Aspect) -> Value {
		match aspect {
			Aspect::Todo => {
				self.state.todo_items = self.sanitize_todo_items(&self.state.todo_items);

				prior::todo_prior(&self.state.todo_items)
			},
			Aspect::Appointments =>
				prior::appointment_prior(&self.state.appointments, &self.state.appointment_items),
			Aspect::Thoughts => {
				self.state.thought_items = self.sanitize_thought_items(&self.state.thought_items);

				prior::thought_prior(
					&self.state.thoughts,
					self.state.thought_document.as_ref(),
					&self.state.thought_items,
				)
			},
		}
	}

	fn apply_todos(&mut self, payload: &DocumentData) -> String {
		let incoming = merge::parse_todo_entries(payload, &self.snapshot);
		let merged = merge::merge_todos(&self.state.todo_items, incoming);

		self.state.todo_items = self.sanitize_todo_items(&merged);
		self.state.todo = note::join_texts(self.state.todo_items.iter().map(|item| item.text.as_str()));

		self.state.todo.clone()
	}

	fn apply_appointments(&mut self, payload: &DocumentData) -> String {
		let (updated, items) = merge::parse_appointments(payload, &self.state.appointments);

		self.state.appointments = updated;
		self.state.appointment_items = items;

		self.state.appointments.clone()
	}

	fn apply_thoughts(&mut self, payload: &DocumentData) -> String {
		let (document, items) = merge::parse_thoughts(payload, &self.state.thoughts, &self.snapshot);

		self.state.thoughts = document.markdown_body.clone();
		self.state.thought_document = Some(document);
		self.state.thought_items = self.sanitize_thought_items(&items);

		self.state.thoughts.clone()
	}

	fn sanitize_todo_items(&self, items: &[TodoItem]) -> Vec<TodoItem> {
		items
			.iter()
			.map(|item| TodoItem {
				text: item.text.trim().to_string(),
				status: item.status.trim().to_string(),
				tag_ids: self.snapshot.sanitize_tag_ids(&item.tag_ids),
				tag_labels: item.tag_labels.clone(),
				due_date: item.due_date.trim().to_string(),
				event_date: item.event_date.trim().to_string(),
				note_id: item.note_id.clone(),
				created_at: item.created_at,
			})
			.collect()
	}

	fn sanitize_thought_items(&self, items: &[Thought]) -> Vec<Thought> {
		items
			.iter()
			.map(|item| Thought {
				text: item.text.trim().to_string(),
				tag_ids: self.snapshot.sanitize_tag_ids(&item.tag_ids),
				..item.clone()
			})
			.collect()
	}
}
