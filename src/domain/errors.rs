use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorCategory {
    UserActionRequired,
    TemporaryFailure,
    InternalFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("validation failed: {message}")]
    Validation { message: String },
    #[error("{provider} API key is not configured")]
    NotConfigured { provider: String },
    #[error("could not connect to {provider} at {url}")]
    Connection { provider: String, url: String },
    #[error("{provider} request timed out after {timeout_secs}s")]
    Timeout { provider: String, timeout_secs: u64 },
    #[error("{provider} returned HTTP {status}")]
    HttpStatus {
        provider: String,
        status: u16,
        body: String,
    },
    #[error("provider returned an invalid response: {message}")]
    InvalidResponse { message: String },
    #[error("provider transport failed: {message}")]
    Transport { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl LlmError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_configured(provider: impl Into<String>) -> Self {
        Self::NotConfigured {
            provider: provider.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn category(&self) -> LlmErrorCategory {
        match self {
            Self::Validation { .. } | Self::NotConfigured { .. } => {
                LlmErrorCategory::UserActionRequired
            }
            Self::Connection { .. }
            | Self::Timeout { .. }
            | Self::HttpStatus { .. }
            | Self::Transport { .. } => LlmErrorCategory::TemporaryFailure,
            Self::InvalidResponse { .. } | Self::Internal { .. } => {
                LlmErrorCategory::InternalFailure
            }
        }
    }

    /// Text shown in place of a model reply when a call fails.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } => format!("Invalid request: {message}"),
            Self::NotConfigured { provider } => format!("{provider} API key is not configured"),
            Self::Connection { provider, url } => format!(
                "Could not connect to the {provider} service at {url}. Make sure it is running and reachable."
            ),
            Self::Timeout {
                provider,
                timeout_secs,
            } => format!("{provider} did not respond within {timeout_secs} seconds"),
            Self::HttpStatus {
                provider,
                status,
                body,
            } => format!("{provider} API call failed: {status} - {body}"),
            Self::InvalidResponse { message } => {
                format!("AI call error: unreadable response: {message}")
            }
            Self::Transport { message } => format!("AI call error: {message}"),
            Self::Internal { message } => format!("AI call error (internal): {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("capture region must have a non-zero area")]
    EmptyRegion,
    #[error("capture region {region} lies outside the {width}x{height} source")]
    OutOfBounds {
        region: String,
        width: u32,
        height: u32,
    },
    #[error("failed to load capture source {path}: {message}")]
    Source { path: String, message: String },
    #[error("screen capture failed: {message}")]
    Backend { message: String },
    #[error("screen capture is unavailable: {message}")]
    Unavailable { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OcrError {
    #[error("OCR engine '{command}' was not found; install tesseract or set SCREENASK_TESSERACT_PATH")]
    EngineNotFound { command: String },
    #[error("OCR engine exited with {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },
    #[error("OCR image could not be prepared: {message}")]
    Image { message: String },
    #[error("OCR engine could not be run: {message}")]
    Io { message: String },
}
