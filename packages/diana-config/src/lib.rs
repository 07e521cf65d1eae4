mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Processing, ProviderConfig, Resources, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	for (label, value) in [
		("provider.provider_id", &cfg.provider.provider_id),
		("provider.api_base", &cfg.provider.api_base),
		("provider.path", &cfg.provider.path),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if !cfg.provider.api_base.starts_with("http://") && !cfg.provider.api_base.starts_with("https://")
	{
		return Err(Error::Validation {
			message: "provider.api_base must start with http:// or https://.".to_string(),
		});
	}
	if !cfg.provider.path.starts_with('/') {
		return Err(Error::Validation {
			message: "provider.path must start with a slash.".to_string(),
		});
	}
	if cfg.provider.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "provider.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.provider.max_attempts == 0 {
		return Err(Error::Validation {
			message: "provider.max_attempts must be greater than zero.".to_string(),
		});
	}

	if let Some(temperature) = cfg.provider.temperature {
		if !temperature.is_finite() {
			return Err(Error::Validation {
				message: "provider.temperature must be a finite number.".to_string(),
			});
		}
		if !(0.0..=2.0).contains(&temperature) {
			return Err(Error::Validation {
				message: "provider.temperature must be in the range 0.0-2.0.".to_string(),
			});
		}
	}

	for (key, value) in &cfg.provider.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("provider.default_headers.{key} must be a string."),
			});
		}
	}

	if cfg.resources.root.as_os_str().is_empty() {
		return Err(Error::Validation {
			message: "resources.root must be non-empty.".to_string(),
		});
	}
	if cfg.storage.root.as_os_str().is_empty() {
		return Err(Error::Validation { message: "storage.root must be non-empty.".to_string() });
	}
	if cfg.processing.locale.trim().is_empty() {
		return Err(Error::Validation {
			message: "processing.locale must be non-empty.".to_string(),
		});
	}
	if cfg.processing.log_capacity == 0 {
		return Err(Error::Validation {
			message: "processing.log_capacity must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.provider.model.as_deref().map(|model| model.trim().is_empty()).unwrap_or(false) {
		cfg.provider.model = None;
	}

	let api_base = cfg.provider.api_base.trim().trim_end_matches('/').to_string();

	cfg.provider.api_base = api_base;
	cfg.provider.api_key = cfg.provider.api_key.trim().to_string();
	cfg.processing.locale = cfg.processing.locale.trim().replace('_', "-");
}
