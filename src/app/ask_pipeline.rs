use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{CaptureError, CaptureRegion, DEFAULT_BRIEF_SYSTEM_PROMPT, OcrError};
use crate::infra::capture::RegionCapturer;
use crate::infra::llm::LlmProvider;
use crate::infra::ocr::TextRecognizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AskRequest {
    /// Region to capture; `None` captures the whole source.
    pub region: Option<CaptureRegion>,
    /// Ask the model for a short answer without explanation.
    pub brief: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// OCR found nothing legible, so no model call was made.
    NoText,
    Answered {
        recognized_text: String,
        reply: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AskError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Recognition(#[from] OcrError),
}

/// Capture -> recognize -> ask, one blocking run per call.
#[derive(Clone)]
pub struct AskPipeline {
    capturer: Arc<dyn RegionCapturer>,
    recognizer: Arc<dyn TextRecognizer>,
    provider: Arc<dyn LlmProvider>,
    brief_system_prompt: String,
}

impl AskPipeline {
    pub fn new(
        capturer: Arc<dyn RegionCapturer>,
        recognizer: Arc<dyn TextRecognizer>,
        provider: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            capturer,
            recognizer,
            provider,
            brief_system_prompt: DEFAULT_BRIEF_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_brief_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.brief_system_prompt = prompt.into();
        self
    }

    pub fn provider_id(&self) -> &str {
        self.provider.provider_id()
    }

    pub fn system_prompt_for(&self, brief: bool) -> Option<&str> {
        brief.then_some(self.brief_system_prompt.as_str())
    }

    pub fn run(&self, request: &AskRequest) -> Result<AskOutcome, AskError> {
        let started = Instant::now();
        let image = self.capturer.capture(request.region.as_ref())?;
        let recognized_text = self.recognizer.recognize(&image)?;

        if recognized_text.trim().is_empty() {
            info!(
                region = ?request.region.map(|region| region.to_string()),
                "no text recognized; skipping AI call"
            );
            return Ok(AskOutcome::NoText);
        }
        debug!(chars = recognized_text.chars().count(), brief = request.brief, "recognized text");

        let reply = self.ask_text(&recognized_text, self.system_prompt_for(request.brief));
        info!(
            provider = self.provider_id(),
            latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "ask completed"
        );
        Ok(AskOutcome::Answered {
            recognized_text,
            reply,
        })
    }

    /// Sends `text` straight to the provider. Failures come back as readable text.
    pub fn ask_text(&self, text: &str, system_prompt: Option<&str>) -> String {
        self.provider.generate_response(text, system_prompt)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use image::{DynamicImage, RgbImage};

    use super::{AskError, AskOutcome, AskPipeline, AskRequest};
    use crate::domain::{CaptureError, CaptureRegion, GenerationRequest, LlmError, OcrError};
    use crate::infra::capture::RegionCapturer;
    use crate::infra::llm::LlmProvider;
    use crate::infra::ocr::TextRecognizer;

    struct FixedCapturer {
        seen_regions: Mutex<Vec<Option<CaptureRegion>>>,
        fail: bool,
    }

    impl RegionCapturer for FixedCapturer {
        fn capture(&self, region: Option<&CaptureRegion>) -> Result<DynamicImage, CaptureError> {
            self.seen_regions
                .lock()
                .expect("region log lock poisoned")
                .push(region.copied());
            if self.fail {
                return Err(CaptureError::Backend {
                    message: "display unavailable".to_string(),
                });
            }
            Ok(DynamicImage::ImageRgb8(RgbImage::new(4, 4)))
        }
    }

    struct FixedRecognizer(Result<String, OcrError>);

    impl TextRecognizer for FixedRecognizer {
        fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct RecordingProvider {
        calls: Mutex<Vec<GenerationRequest>>,
    }

    impl LlmProvider for RecordingProvider {
        fn provider_id(&self) -> &str {
            "recording"
        }

        fn try_generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
            request.validate()?;
            self.calls
                .lock()
                .expect("call log lock poisoned")
                .push(request.clone());
            Ok(format!("answer to: {}", request.prompt))
        }
    }

    fn pipeline(
        capture_fails: bool,
        recognized: Result<String, OcrError>,
    ) -> (AskPipeline, Arc<FixedCapturer>, Arc<RecordingProvider>) {
        let capturer = Arc::new(FixedCapturer {
            seen_regions: Mutex::new(Vec::new()),
            fail: capture_fails,
        });
        let provider = Arc::new(RecordingProvider::default());
        let pipeline = AskPipeline::new(
            capturer.clone(),
            Arc::new(FixedRecognizer(recognized)),
            provider.clone(),
        );
        (pipeline, capturer, provider)
    }

    #[test]
    fn run_sends_recognized_text_to_provider() {
        let (pipeline, capturer, provider) = pipeline(false, Ok("What is 2+2?".to_string()));
        let region = CaptureRegion::from_corners(0, 0, 100, 50).expect("valid region");

        let outcome = pipeline
            .run(&AskRequest {
                region: Some(region),
                brief: false,
            })
            .expect("run should succeed");

        assert_eq!(
            outcome,
            AskOutcome::Answered {
                recognized_text: "What is 2+2?".to_string(),
                reply: "answer to: What is 2+2?".to_string(),
            }
        );
        assert_eq!(
            *capturer.seen_regions.lock().expect("lock"),
            vec![Some(region)]
        );
        let calls = provider.calls.lock().expect("lock");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system_prompt, None);
    }

    #[test]
    fn brief_mode_sends_configured_system_prompt() {
        let (pipeline, _, provider) = pipeline(false, Ok("capital of France?".to_string()));
        let pipeline = pipeline.with_brief_system_prompt("one word only");

        pipeline
            .run(&AskRequest {
                region: None,
                brief: true,
            })
            .expect("run should succeed");

        let calls = provider.calls.lock().expect("lock");
        assert_eq!(calls[0].system_prompt.as_deref(), Some("one word only"));
    }

    #[test]
    fn default_brief_prompt_asks_for_quick_answer() {
        let (pipeline, _, _) = pipeline(false, Ok(String::new()));

        assert_eq!(
            pipeline.system_prompt_for(true),
            Some("Answer the following question quickly without any explanation.")
        );
        assert_eq!(pipeline.system_prompt_for(false), None);
    }

    #[test]
    fn blank_recognition_skips_provider_call() {
        let (pipeline, _, provider) = pipeline(false, Ok("  \n".to_string()));

        let outcome = pipeline
            .run(&AskRequest::default())
            .expect("run should succeed");

        assert_eq!(outcome, AskOutcome::NoText);
        assert!(provider.calls.lock().expect("lock").is_empty());
    }

    #[test]
    fn capture_and_recognition_failures_are_typed() {
        let (failing_capture, _, _) = pipeline(true, Ok("unused".to_string()));
        assert!(matches!(
            failing_capture.run(&AskRequest::default()),
            Err(AskError::Capture(CaptureError::Backend { .. }))
        ));

        let (failing_ocr, _, provider) = pipeline(
            false,
            Err(OcrError::EngineNotFound {
                command: "tesseract".to_string(),
            }),
        );
        assert!(matches!(
            failing_ocr.run(&AskRequest::default()),
            Err(AskError::Recognition(OcrError::EngineNotFound { .. }))
        ));
        assert!(provider.calls.lock().expect("lock").is_empty());
    }

    #[test]
    fn ask_text_reports_provider_errors_as_text() {
        let (pipeline, _, _) = pipeline(false, Ok(String::new()));

        assert_eq!(
            pipeline.ask_text("   ", None),
            "Invalid request: prompt must not be empty"
        );
    }
}
