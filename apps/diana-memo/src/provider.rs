use std::{future::Future, pin::Pin};

use serde_json::Value;

use diana_config::ProviderConfig;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Performs one structured generation exchange and returns the model's JSON object.
pub trait GenerationProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		api_key: &'a str,
		body: &'a Value,
	) -> BoxFuture<'a, diana_providers::Result<Value>>;
}

/// Calls the configured chat-completion endpoint.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultProvider;
impl GenerationProvider for DefaultProvider {
	fn generate<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		api_key: &'a str,
		body: &'a Value,
	) -> BoxFuture<'a, diana_providers::Result<Value>> {
		Box::pin(diana_providers::generation::generate(cfg, api_key, body))
	}
}
