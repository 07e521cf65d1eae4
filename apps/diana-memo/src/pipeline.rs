//! One memo processing cycle: load, generate per aspect, merge, and optionally persist.

use color_eyre::{
	Result,
	eyre::{WrapErr, eyre},
};
use serde::Serialize;

use crate::provider::GenerationProvider;
use diana_config::Config;
use diana_notes::{
	AspectSelection, MemoSummary, TodoChangeSet,
	change_set::{self, APPLY_CHANGE_TYPE},
};
use diana_processor::{MemoProcessor, ProcessorArgs, ResourceRoot};
use diana_storage::{DocumentStore, sessions};

/// Collaborators shared by every cycle.
pub struct Pipeline<'a> {
	pub config: &'a Config,
	pub store: &'a dyn DocumentStore,
	pub provider: &'a dyn GenerationProvider,
	pub api_key: &'a str,
}

/// One memo and its per-run overrides. `None` aspects follow the session settings.
#[derive(Clone, Debug, Default)]
pub struct MemoRequest {
	pub session_id: String,
	pub memo: String,
	pub todos: Option<bool>,
	pub appointments: Option<bool>,
	pub thoughts: Option<bool>,
	pub model: Option<String>,
	pub update: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProcessOutcome {
	pub summary: MemoSummary,
	pub selection: AspectSelection,
	pub model: String,
	pub saved: bool,
	pub change_set: Option<TodoChangeSet>,
	pub logs: Vec<String>,
}

pub async fn process_memo(pipeline: &Pipeline<'_>, request: &MemoRequest) -> Result<ProcessOutcome> {
	let memo = request.memo.trim();

	if memo.is_empty() {
		return Err(eyre!("Memo text is empty."));
	}

	let loaded = sessions::load_session(pipeline.store, &request.session_id)?;
	let settings = &loaded.session.settings;
	let selection = AspectSelection {
		todos: request.todos.unwrap_or(settings.process_todos),
		appointments: request.appointments.unwrap_or(settings.process_appointments),
		thoughts: request.thoughts.unwrap_or(settings.process_thoughts),
	};
	let locale = loaded.locale_or(&pipeline.config.processing.locale);
	let mut processor = MemoProcessor::new(ProcessorArgs {
		api_key: pipeline.api_key,
		locale,
		resources: ResourceRoot::new(&pipeline.config.resources.root),
		catalog: loaded.catalog.as_ref(),
		log_capacity: pipeline.config.processing.log_capacity,
	})?;
	let model_override = [
		request.model.as_deref(),
		Some(settings.model.as_str()),
		pipeline.config.provider.model.as_deref(),
	]
	.into_iter()
	.flatten()
	.map(str::trim)
	.find(|model| !model.is_empty());

	if let Some(model) = model_override {
		processor.set_model(model);
	}
	if selection.is_empty() {
		tracing::warn!(session_id = %loaded.session.id, "No aspect is selected for processing.");
	}

	processor.initialize(loaded.summary.clone());

	let baseline = processor.summary().todo_items;

	let requests = processor.prepare_requests(memo, selection)?;

	for (aspect, generation) in requests {
		let body = generation.to_value()?;
		let payload = pipeline
			.provider
			.generate(&pipeline.config.provider, pipeline.api_key, &body)
			.await
			.wrap_err_with(|| format!("Generation failed for the {aspect} aspect."))?;

		processor.ingest_response(aspect, &payload.to_string())?;

		tracing::info!(session_id = %loaded.session.id, aspect = %aspect, "Processed aspect.");
	}

	let mut summary = processor.summary();
	let mut change_set = None;

	if request.update {
		summary = sessions::write_summary(pipeline.store, &loaded.session.id, &summary, selection)?;

		if selection.todos {
			let actions = change_set::diff(&baseline, &summary.todo_items);

			if !actions.is_empty() {
				let recorded = TodoChangeSet {
					change_set_id: uuid::Uuid::new_v4().simple().to_string(),
					session_id: loaded.session.id.clone(),
					memo_id: uuid::Uuid::new_v4().simple().to_string(),
					timestamp: sessions::now_millis(),
					model: processor.model().to_string(),
					prompt_version: processor.prompts().version(),
					actions,
					change_type: APPLY_CHANGE_TYPE.to_string(),
				};

				sessions::record_change_set(pipeline.store, &recorded)?;

				change_set = Some(recorded);
			}
		}
	}

	Ok(ProcessOutcome {
		summary,
		selection,
		model: processor.model().to_string(),
		saved: request.update,
		change_set,
		logs: processor.logger().entries().map(str::to_string).collect(),
	})
}
