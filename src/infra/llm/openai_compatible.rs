use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::{
    ApiKey, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL, GenerationRequest, LlmError,
    ProviderConfig, ProviderKind,
};

use super::LlmProvider;
use super::response_parsing::{extract_chat_text, log_snippet};
use super::transport::{build_client, map_transport_error, read_success_body};

const CHAT_COMPLETIONS_PATH: &str = "chat/completions";
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 1000;

/// Chat-completion adapter for OpenAI and API-compatible vendors (Qianwen, DeepSeek).
pub struct OpenAiCompatibleProvider {
    kind: ProviderKind,
    api_key: Option<ApiKey>,
    api_base_url: String,
    model: String,
    timeout: Duration,
    client: Client,
}

impl OpenAiCompatibleProvider {
    pub fn from_provider_config(
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Self::with_config(
            config.provider,
            config.api_key.clone(),
            config.endpoint_url.clone(),
            config.model_name.clone(),
            timeout,
        )
    }

    /// A missing key is accepted here; calls then answer with a "not configured" message.
    pub fn with_config(
        kind: ProviderKind,
        api_key: Option<ApiKey>,
        api_base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        if !kind.is_chat_completion() {
            return Err(LlmError::validation(format!(
                "provider '{kind}' does not speak the chat completions API"
            )));
        }

        let api_base_url = api_base_url.into();
        let api_base_url = if api_base_url.trim().is_empty() {
            DEFAULT_OPENAI_BASE_URL.to_string()
        } else {
            api_base_url.trim().to_string()
        };

        let model = model.into();
        let model = if model.trim().is_empty() {
            DEFAULT_OPENAI_MODEL.to_string()
        } else {
            model.trim().to_string()
        };

        let client = build_client(kind.display_name(), timeout)?;

        Ok(Self {
            kind,
            api_key,
            api_base_url,
            model,
            timeout,
            client,
        })
    }

    pub fn endpoint_url(&self) -> String {
        build_chat_completions_url(&self.api_base_url)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request_payload<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> ChatCompletionsPayload<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system_prompt) = request.system_prompt.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system_prompt,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatCompletionsPayload {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }

    fn map_success_body(&self, body: &str) -> Result<String, LlmError> {
        let display_name = self.kind.display_name();
        let Ok(decoded) = serde_json::from_str::<Value>(body) else {
            return raw_body_or_error(display_name, body);
        };

        match extract_chat_text(&decoded) {
            Some(text) => Ok(text),
            None => raw_body_or_error(display_name, body),
        }
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn provider_id(&self) -> &str {
        self.kind.id()
    }

    fn try_generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let display_name = self.kind.display_name();
        let Some(api_key) = self.api_key.as_ref() else {
            return Err(LlmError::not_configured(display_name));
        };
        request.validate()?;

        let url = self.endpoint_url();
        let payload = self.build_request_payload(request);
        let started = Instant::now();
        debug!(
            provider = self.provider_id(),
            %url,
            model = %self.model,
            "sending chat completions request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose())
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .map_err(|err| map_transport_error(err, display_name, &url, self.timeout))?;
        let body = read_success_body(response, display_name, &url, self.timeout)?;

        info!(
            provider = self.provider_id(),
            latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "chat completions request completed"
        );
        self.map_success_body(&body)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionsPayload<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

fn raw_body_or_error(display_name: &str, body: &str) -> Result<String, LlmError> {
    if body.trim().is_empty() {
        return Err(LlmError::invalid_response(format!(
            "{display_name} response did not include any content"
        )));
    }
    debug!(
        provider = display_name,
        body = %log_snippet(body),
        "unrecognized chat completions shape; returning raw body"
    );
    Ok(body.to_string())
}

/// Derives the chat completions URL from a configured base.
///
/// A base that already ends in a version segment (`/v1`, `/v4`, ...) or contains `/v1/`
/// only gets `/chat/completions` appended; a base that already points at the endpoint is
/// used as is; anything else gets `/v1/chat/completions`.
pub fn build_chat_completions_url(api_base_url: &str) -> String {
    let base = api_base_url.trim().trim_end_matches('/');

    if base.ends_with(CHAT_COMPLETIONS_PATH) {
        return base.to_string();
    }
    if ends_with_version_segment(base) || base.contains("/v1/") {
        format!("{base}/{CHAT_COMPLETIONS_PATH}")
    } else {
        format!("{base}/v1/{CHAT_COMPLETIONS_PATH}")
    }
}

fn ends_with_version_segment(base: &str) -> bool {
    let Some((_, last_segment)) = base.rsplit_once('/') else {
        return false;
    };
    let Some(digits) = last_segment.strip_prefix('v') else {
        return false;
    };
    !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit())
}
