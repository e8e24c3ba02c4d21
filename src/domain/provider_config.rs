use std::fmt;

use serde::{Serialize, Serializer};

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5-coder:7b";
pub const DEFAULT_QIANWEN_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const DEFAULT_QIANWEN_MODEL: &str = "qwen-flash";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_DEEPSEEK_MODEL: &str = "deepseek-chat";

/// Backends the factory knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Ollama,
    Qianwen,
    OpenAi,
    DeepSeek,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Ollama,
        ProviderKind::Qianwen,
        ProviderKind::OpenAi,
        ProviderKind::DeepSeek,
    ];

    /// Parses a provider identifier or one of its short aliases (`qw`, `oa`, `ds`).
    /// Matching ignores case and surrounding whitespace.
    pub fn parse(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "qianwen" | "qw" => Some(Self::Qianwen),
            "openai" | "oa" => Some(Self::OpenAi),
            "deepseek" | "ds" => Some(Self::DeepSeek),
            _ => None,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Qianwen => "qianwen",
            Self::OpenAi => "openai",
            Self::DeepSeek => "deepseek",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Ollama => "Ollama",
            Self::Qianwen => "Qianwen",
            Self::OpenAi => "OpenAI",
            Self::DeepSeek => "DeepSeek",
        }
    }

    pub fn is_chat_completion(self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Secret credential. Never printed through `Debug` or serialization.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for blank input so an empty env var counts as "not configured".
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl Serialize for ApiKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("<redacted>")
    }
}

/// Connection settings for one backend as they appear in the app configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: Option<ApiKey>,
    pub model: String,
}

impl ProviderSettings {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            model: model.into(),
        }
    }

    pub fn defaults_for(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::Ollama => Self::new(DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL),
            ProviderKind::Qianwen => Self::new(DEFAULT_QIANWEN_BASE_URL, DEFAULT_QIANWEN_MODEL),
            ProviderKind::OpenAi => Self::new(DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL),
            ProviderKind::DeepSeek => Self::new(DEFAULT_DEEPSEEK_BASE_URL, DEFAULT_DEEPSEEK_MODEL),
        }
    }
}

/// The resolved, immutable connection parameters of the active provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    pub endpoint_url: String,
    pub api_key: Option<ApiKey>,
    pub model_name: String,
}

impl ProviderConfig {
    pub fn from_settings(provider: ProviderKind, settings: &ProviderSettings) -> Self {
        Self {
            provider,
            endpoint_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            model_name: settings.model.clone(),
        }
    }
}
