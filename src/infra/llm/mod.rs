mod ollama;
mod openai_compatible;
mod provider;
mod provider_factory;
mod response_parsing;
mod transport;

pub use ollama::OllamaProvider;
pub use openai_compatible::{OpenAiCompatibleProvider, build_chat_completions_url};
pub use provider::LlmProvider;
pub use provider_factory::{create_provider, create_provider_for, resolve_provider_kind};
