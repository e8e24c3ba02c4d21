//! Local-generation adapter for an Ollama-style `POST /api/generate` endpoint.

use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::{
    DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL, GenerationRequest, LlmError, ProviderKind,
};

use super::LlmProvider;
use super::response_parsing::{extract_generate_text, log_snippet};
use super::transport::{build_client, map_transport_error, read_success_body};

const GENERATE_PATH: &str = "/api/generate";

pub struct OllamaProvider {
    display_name: &'static str,
    base_url: String,
    model: String,
    timeout: Duration,
    client: Client,
}

impl OllamaProvider {
    /// Blank `base_url` or `model` fall back to the local defaults.
    pub fn with_config(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let display_name = ProviderKind::Ollama.display_name();
        let base_url = non_blank_or(base_url.into(), DEFAULT_OLLAMA_BASE_URL);
        let model = non_blank_or(model.into(), DEFAULT_OLLAMA_MODEL);
        let client = build_client(display_name, timeout)?;

        Ok(Self {
            display_name,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            timeout,
            client,
        })
    }

    pub fn endpoint_url(&self) -> String {
        format!("{}{GENERATE_PATH}", self.base_url)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request_payload<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> GeneratePayload<'a> {
        GeneratePayload {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            system: request.system_prompt.as_deref(),
        }
    }
}

impl LlmProvider for OllamaProvider {
    fn provider_id(&self) -> &str {
        ProviderKind::Ollama.id()
    }

    fn try_generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        request.validate()?;

        let url = self.endpoint_url();
        let payload = self.build_request_payload(request);
        let started = Instant::now();
        debug!(
            provider = self.provider_id(),
            %url,
            model = %self.model,
            "sending generate request"
        );

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .map_err(|err| map_transport_error(err, self.display_name, &url, self.timeout))?;
        let body = read_success_body(response, self.display_name, &url, self.timeout)?;

        info!(
            provider = self.provider_id(),
            latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "generate request completed"
        );
        map_success_body(&body)
    }
}

#[derive(Debug, Serialize)]
struct GeneratePayload<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

fn map_success_body(body: &str) -> Result<String, LlmError> {
    let decoded: Value = serde_json::from_str(body).map_err(|err| {
        LlmError::invalid_response(format!(
            "Ollama response is not JSON ({err}): {}",
            log_snippet(body)
        ))
    })?;

    // Unknown but valid JSON is handed back untouched so the user still sees something.
    Ok(extract_generate_text(&decoded).unwrap_or_else(|| body.to_string()))
}

fn non_blank_or(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.trim().to_string()
    }
}
