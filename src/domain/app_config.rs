use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use super::{CaptureRegion, ConfigError, ProviderConfig, ProviderKind, ProviderSettings};

pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_BRIEF_SYSTEM_PROMPT: &str =
    "Answer the following question quickly without any explanation.";
pub const DEFAULT_TESSERACT_COMMAND: &str = "tesseract";
pub const DEFAULT_OCR_LANGUAGES: &str = "chi_sim+eng";
pub const DEFAULT_OCR_TARGET_WIDTH: u32 = 1200;
pub const DEFAULT_ADAPTIVE_BLOCK_RADIUS: u32 = 7;

/// Binarization applied as the last thresholding step of OCR preprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    Adaptive { block_radius: u32 },
    Otsu,
    None,
}

impl FromStr for ThresholdMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "adaptive" => Ok(Self::Adaptive {
                block_radius: DEFAULT_ADAPTIVE_BLOCK_RADIUS,
            }),
            "otsu" => Ok(Self::Otsu),
            "none" | "off" => Ok(Self::None),
            other => Err(ConfigError::invalid(format!(
                "threshold mode must be one of: adaptive,otsu,none (got '{other}')"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OcrSettings {
    pub tesseract_command: String,
    pub languages: String,
    pub oem: u8,
    pub psm: u8,
    pub preprocess: bool,
    pub target_width: u32,
    pub denoise: bool,
    pub equalize: bool,
    pub threshold: ThresholdMode,
    pub open_noise: bool,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            tesseract_command: DEFAULT_TESSERACT_COMMAND.to_string(),
            languages: DEFAULT_OCR_LANGUAGES.to_string(),
            oem: 1,
            psm: 6,
            preprocess: true,
            target_width: DEFAULT_OCR_TARGET_WIDTH,
            denoise: true,
            equalize: true,
            threshold: ThresholdMode::Adaptive {
                block_radius: DEFAULT_ADAPTIVE_BLOCK_RADIUS,
            },
            open_noise: true,
        }
    }
}

/// Process-wide settings, built once at startup and then only read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub ai_provider: String,
    pub ollama: ProviderSettings,
    pub qianwen: ProviderSettings,
    pub openai: ProviderSettings,
    pub deepseek: ProviderSettings,
    pub llm_timeout_secs: u64,
    pub ocr: OcrSettings,
    pub default_region: Option<CaptureRegion>,
    pub debug: bool,
    pub brief_system_prompt: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ai_provider: ProviderKind::Ollama.id().to_string(),
            ollama: ProviderSettings::defaults_for(ProviderKind::Ollama),
            qianwen: ProviderSettings::defaults_for(ProviderKind::Qianwen),
            openai: ProviderSettings::defaults_for(ProviderKind::OpenAi),
            deepseek: ProviderSettings::defaults_for(ProviderKind::DeepSeek),
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            ocr: OcrSettings::default(),
            default_region: None,
            debug: false,
            brief_system_prompt: DEFAULT_BRIEF_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl AppConfig {
    pub fn settings_for(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::Ollama => &self.ollama,
            ProviderKind::Qianwen => &self.qianwen,
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::DeepSeek => &self.deepseek,
        }
    }

    pub fn settings_for_mut(&mut self, kind: ProviderKind) -> &mut ProviderSettings {
        match kind {
            ProviderKind::Ollama => &mut self.ollama,
            ProviderKind::Qianwen => &mut self.qianwen,
            ProviderKind::OpenAi => &mut self.openai,
            ProviderKind::DeepSeek => &mut self.deepseek,
        }
    }

    /// Resolved parameters for `kind`, independent of the configured `ai_provider`.
    pub fn provider_config(&self, kind: ProviderKind) -> ProviderConfig {
        ProviderConfig::from_settings(kind, self.settings_for(kind))
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ThresholdMode};
    use crate::domain::{DEFAULT_OLLAMA_BASE_URL, ProviderKind};

    #[test]
    fn default_config_targets_local_ollama_with_fixed_timeout() {
        let config = AppConfig::default();

        assert_eq!(config.ai_provider, "ollama");
        assert_eq!(config.llm_timeout_secs, 120);

        let provider = config.provider_config(ProviderKind::Ollama);
        assert_eq!(provider.endpoint_url, DEFAULT_OLLAMA_BASE_URL);
        assert_eq!(provider.api_key, None);
    }

    #[test]
    fn default_chat_providers_have_no_credentials() {
        let config = AppConfig::default();
        for kind in [
            ProviderKind::Qianwen,
            ProviderKind::OpenAi,
            ProviderKind::DeepSeek,
        ] {
            assert!(config.settings_for(kind).api_key.is_none());
        }
    }

    #[test]
    fn threshold_mode_parses_known_values() {
        assert_eq!("otsu".parse::<ThresholdMode>(), Ok(ThresholdMode::Otsu));
        assert_eq!("NONE".parse::<ThresholdMode>(), Ok(ThresholdMode::None));
        assert!(matches!(
            "adaptive".parse::<ThresholdMode>(),
            Ok(ThresholdMode::Adaptive { block_radius: 7 })
        ));
        assert!("gaussian".parse::<ThresholdMode>().is_err());
    }
}
