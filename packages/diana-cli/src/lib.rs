use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
		.error(AnsiColor::Red.on_default() | Effects::BOLD)
}

/// Environment variable consulted for the generation service key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Picks the first non-blank key from the explicit flag, the environment and the config file.
pub fn resolve_api_key(explicit: Option<&str>, configured: &str) -> Option<String> {
	let from_env = std::env::var(API_KEY_ENV).ok();

	pick_api_key(explicit, from_env.as_deref(), configured)
}

fn pick_api_key(explicit: Option<&str>, from_env: Option<&str>, configured: &str) -> Option<String> {
	[explicit, from_env, Some(configured)]
		.into_iter()
		.flatten()
		.map(str::trim)
		.find(|key| !key.is_empty())
		.map(ToString::to_string)
}
