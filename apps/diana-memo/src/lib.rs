pub mod pipeline;
pub mod provider;

use std::{
	fs, io,
	path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use color_eyre::{
	Result,
	eyre::{WrapErr, eyre},
};
use tracing_subscriber::EnvFilter;

use crate::{
	pipeline::{MemoRequest, Pipeline},
	provider::DefaultProvider,
};
use diana_storage::{
	FsStore,
	sessions::{self, SessionQuery},
};

#[derive(Debug, Parser)]
#[command(
	version = diana_cli::VERSION,
	rename_all = "kebab",
	styles = diana_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Process a memo into the session's todos, appointments and thoughts.
	Process(ProcessArgs),
	/// List stored sessions.
	Sessions(SessionsArgs),
	/// List recorded todo change sets of a session, newest first.
	ChangeSets(ChangeSetsArgs),
}

#[derive(Debug, clap::Args)]
pub struct ProcessArgs {
	pub session_id: String,
	/// Memo text. Read from stdin when neither --memo nor --memo-file is given.
	#[arg(long, conflicts_with = "memo_file")]
	pub memo: Option<String>,
	#[arg(long, value_name = "FILE")]
	pub memo_file: Option<PathBuf>,
	#[arg(long, overrides_with = "no_todos")]
	pub todos: bool,
	#[arg(long, overrides_with = "todos")]
	pub no_todos: bool,
	#[arg(long, overrides_with = "no_appointments")]
	pub appointments: bool,
	#[arg(long, overrides_with = "appointments")]
	pub no_appointments: bool,
	#[arg(long, overrides_with = "no_thoughts")]
	pub thoughts: bool,
	#[arg(long, overrides_with = "thoughts")]
	pub no_thoughts: bool,
	/// Overrides the session model.
	#[arg(long)]
	pub model: Option<String>,
	/// Falls back to OPENROUTER_API_KEY, then provider.api_key.
	#[arg(long)]
	pub api_key: Option<String>,
	/// Persist the updated summary.
	#[arg(long, conflicts_with = "dry_run")]
	pub update: bool,
	#[arg(long)]
	pub dry_run: bool,
	/// Print the captured generation exchanges.
	#[arg(long)]
	pub show_logs: bool,
}
impl ProcessArgs {
	fn selection_flag(enabled: bool, disabled: bool) -> Option<bool> {
		match (enabled, disabled) {
			(true, _) => Some(true),
			(_, true) => Some(false),
			_ => None,
		}
	}
}

#[derive(Debug, clap::Args)]
pub struct SessionsArgs {
	/// Show a single session.
	#[arg(long)]
	pub session: Option<String>,
	#[arg(long, default_value_t = 0)]
	pub page: usize,
	/// Zero lists every session.
	#[arg(long, default_value_t = 0)]
	pub page_size: usize,
	#[arg(long)]
	pub limit: Option<usize>,
}

#[derive(Debug, clap::Args)]
pub struct ChangeSetsArgs {
	pub session_id: String,
	#[arg(long)]
	pub limit: Option<usize>,
}

pub async fn run(args: Args) -> Result<()> {
	let config = diana_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

	let store = FsStore::new(&config.storage.root);

	match args.command {
		Command::Process(process) => {
			let memo = read_memo(process.memo.as_deref(), process.memo_file.as_deref())?;
			let api_key =
				diana_cli::resolve_api_key(process.api_key.as_deref(), &config.provider.api_key)
					.ok_or_else(|| {
						eyre!(
							"A generation API key is required. Pass --api-key or set {}.",
							diana_cli::API_KEY_ENV
						)
					})?;
			let pipeline = Pipeline {
				config: &config,
				store: &store,
				provider: &DefaultProvider,
				api_key: &api_key,
			};
			let request = MemoRequest {
				session_id: process.session_id.clone(),
				memo,
				todos: ProcessArgs::selection_flag(process.todos, process.no_todos),
				appointments: ProcessArgs::selection_flag(
					process.appointments,
					process.no_appointments,
				),
				thoughts: ProcessArgs::selection_flag(process.thoughts, process.no_thoughts),
				model: process.model.clone(),
				update: process.update && !process.dry_run,
			};
			let outcome = pipeline::process_memo(&pipeline, &request).await?;

			println!("{}", serde_json::to_string_pretty(&outcome.summary)?);

			if process.show_logs {
				println!("\n=== Generation Logs ===");

				for entry in &outcome.logs {
					println!("{entry}");
				}
			}

			if outcome.saved {
				println!("\nSummary saved.");
			} else {
				println!("\nDry run complete. No changes written.");
			}
		},
		Command::Sessions(list) => {
			let query = SessionQuery {
				session_id: list.session,
				page: list.page,
				page_size: list.page_size,
				limit: list.limit,
			};

			let listed = sessions::list_sessions(&store, &query)?;

			println!("{}", serde_json::to_string_pretty(&listed)?);
		},
		Command::ChangeSets(list) => {
			let change_sets = sessions::list_change_sets(&store, &list.session_id, list.limit)?;

			println!("{}", serde_json::to_string_pretty(&change_sets)?);
		},
	}

	Ok(())
}

/// Memo text from `--memo-file`, `--memo` or stdin, trimmed and non-empty.
pub fn read_memo(memo: Option<&str>, memo_file: Option<&Path>) -> Result<String> {
	let text = match (memo_file, memo) {
		(Some(path), _) => {
			if !path.is_file() {
				return Err(eyre!("Memo file not found at {}.", path.display()));
			}

			fs::read_to_string(path)
				.wrap_err_with(|| format!("Failed to read memo file at {}.", path.display()))?
		},
		(None, Some(memo)) => memo.to_string(),
		(None, None) =>
			io::read_to_string(io::stdin()).wrap_err("Failed to read memo from stdin.")?,
	};
	let memo = text.trim();

	if memo.is_empty() {
		return Err(eyre!("Memo text is empty."));
	}

	Ok(memo.to_string())
}
