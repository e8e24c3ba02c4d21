mod app_config;
mod capture_region;
mod errors;
mod generation_contract;
mod provider_config;

pub use app_config::{
    AppConfig, DEFAULT_BRIEF_SYSTEM_PROMPT, DEFAULT_LLM_TIMEOUT_SECS, OcrSettings, ThresholdMode,
};
pub use capture_region::{CaptureRegion, ParseRegionError};
pub use errors::{CaptureError, ConfigError, LlmError, LlmErrorCategory, OcrError};
pub use generation_contract::GenerationRequest;
pub use provider_config::{
    ApiKey, DEFAULT_DEEPSEEK_BASE_URL, DEFAULT_DEEPSEEK_MODEL, DEFAULT_OLLAMA_BASE_URL,
    DEFAULT_OLLAMA_MODEL, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL, DEFAULT_QIANWEN_BASE_URL,
    DEFAULT_QIANWEN_MODEL, ProviderConfig, ProviderKind, ProviderSettings,
};
