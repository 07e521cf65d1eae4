pub mod aspect;
pub mod catalog;
pub mod logger;
pub mod merge;
pub mod models;
pub mod prior;
pub mod processor;
pub mod prompts;
pub mod request;
pub mod resources;

mod error;

pub use aspect::Aspect;
pub use catalog::{TagCatalogSnapshot, TagDescriptor};
pub use error::{Error, Result};
pub use logger::LlmLogger;
pub use models::DEFAULT_MODEL;
pub use processor::{MemoProcessor, ProcessorArgs};
pub use prompts::Prompts;
pub use request::{ChatMessage, GenerationRequest, ResponseFormat};
pub use resources::ResourceRoot;
