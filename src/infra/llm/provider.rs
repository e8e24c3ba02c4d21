use tracing::warn;

use crate::domain::{GenerationRequest, LlmError};

pub trait LlmProvider: Send + Sync {
    fn provider_id(&self) -> &str;

    /// Performs one generation call and reports failures as typed errors.
    fn try_generate(&self, request: &GenerationRequest) -> Result<String, LlmError>;

    /// Performs one generation call and always yields text: on failure the
    /// diagnostic message is returned in place of a reply.
    fn generate_response(&self, prompt: &str, system_prompt: Option<&str>) -> String {
        let request = GenerationRequest::new(prompt).with_system_prompt(system_prompt);
        match self.try_generate(&request) {
            Ok(text) => text,
            Err(error) => {
                warn!(
                    provider = self.provider_id(),
                    category = ?error.category(),
                    error = %error,
                    "generation failed; returning diagnostic text"
                );
                error.user_message()
            }
        }
    }
}
