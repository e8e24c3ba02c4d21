use super::LlmError;

/// One prompt sent to a provider. Built per invocation and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
        }
    }

    /// Blank system prompts are dropped so providers never send an empty instruction.
    pub fn with_system_prompt(mut self, system_prompt: Option<&str>) -> Self {
        self.system_prompt = system_prompt
            .filter(|text| !text.trim().is_empty())
            .map(str::to_owned);
        self
    }

    pub fn validate(&self) -> Result<(), LlmError> {
        if self.prompt.trim().is_empty() {
            return Err(LlmError::validation("prompt must not be empty"));
        }
        Ok(())
    }
}
