//! Builds [`AppConfig`] from `SCREENASK_*` environment variables.

use crate::domain::{ApiKey, AppConfig, CaptureRegion, ConfigError, ProviderKind, ThresholdMode};

use super::env::{parse_bool, parse_number, parse_timeout_seconds, read_env_var};

pub const AI_PROVIDER_ENV: &str = "SCREENASK_AI_PROVIDER";
pub const LLM_TIMEOUT_ENV: &str = "SCREENASK_LLM_TIMEOUT_SECS";
pub const TESSERACT_PATH_ENV: &str = "SCREENASK_TESSERACT_PATH";
pub const OCR_LANGUAGES_ENV: &str = "SCREENASK_OCR_LANGUAGES";
pub const OCR_OEM_ENV: &str = "SCREENASK_OCR_OEM";
pub const OCR_PSM_ENV: &str = "SCREENASK_OCR_PSM";
pub const OCR_PREPROCESS_ENV: &str = "SCREENASK_OCR_PREPROCESS";
pub const OCR_TARGET_WIDTH_ENV: &str = "SCREENASK_OCR_TARGET_WIDTH";
pub const OCR_THRESHOLD_ENV: &str = "SCREENASK_OCR_THRESHOLD";
pub const REGION_ENV: &str = "SCREENASK_REGION";
pub const DEBUG_ENV: &str = "SCREENASK_DEBUG";
pub const BRIEF_SYSTEM_PROMPT_ENV: &str = "SCREENASK_BRIEF_SYSTEM_PROMPT";

/// Environment variable names for one backend. Key lookups try `api_key` first,
/// then each name in `api_key_fallbacks`.
struct ProviderEnvVars {
    kind: ProviderKind,
    base_url: &'static str,
    model: &'static str,
    api_key: Option<&'static str>,
    api_key_fallbacks: &'static [&'static str],
}

const PROVIDER_ENV_VARS: [ProviderEnvVars; 4] = [
    ProviderEnvVars {
        kind: ProviderKind::Ollama,
        base_url: "SCREENASK_OLLAMA_BASE_URL",
        model: "SCREENASK_OLLAMA_MODEL",
        api_key: None,
        api_key_fallbacks: &[],
    },
    ProviderEnvVars {
        kind: ProviderKind::Qianwen,
        base_url: "SCREENASK_QIANWEN_API_URL",
        model: "SCREENASK_QIANWEN_MODEL",
        api_key: Some("SCREENASK_QIANWEN_API_KEY"),
        api_key_fallbacks: &["DASHSCOPE_API_KEY"],
    },
    ProviderEnvVars {
        kind: ProviderKind::OpenAi,
        base_url: "SCREENASK_OPENAI_BASE_URL",
        model: "SCREENASK_OPENAI_MODEL",
        api_key: Some("SCREENASK_OPENAI_API_KEY"),
        api_key_fallbacks: &["OPENAI_API_KEY"],
    },
    ProviderEnvVars {
        kind: ProviderKind::DeepSeek,
        base_url: "SCREENASK_DEEPSEEK_API_URL",
        model: "SCREENASK_DEEPSEEK_MODEL",
        api_key: Some("SCREENASK_DEEPSEEK_API_KEY"),
        api_key_fallbacks: &["DEEPSEEK_API_KEY"],
    },
];

/// Loads configuration from the process environment.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    load_app_config_with(read_env_var)
}

/// Loads configuration through `lookup`, which must return `Ok(None)` for unset variables.
/// Blank values are treated as unset.
pub fn load_app_config_with<F>(raw_lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<Option<String>, ConfigError>,
{
    let lookup = |name: &str| -> Result<Option<String>, ConfigError> {
        Ok(raw_lookup(name)?.filter(|value| !value.trim().is_empty()))
    };
    let mut config = AppConfig::default();

    if let Some(provider) = lookup(AI_PROVIDER_ENV)? {
        config.ai_provider = provider.trim().to_string();
    }

    for vars in &PROVIDER_ENV_VARS {
        let settings = config.settings_for_mut(vars.kind);
        if let Some(base_url) = lookup(vars.base_url)? {
            settings.base_url = base_url.trim().to_string();
        }
        if let Some(model) = lookup(vars.model)? {
            settings.model = model.trim().to_string();
        }
        let key_names = vars.api_key.into_iter().chain(vars.api_key_fallbacks.iter().copied());
        for name in key_names {
            if let Some(key) = lookup(name)?.and_then(ApiKey::new) {
                settings.api_key = Some(key);
                break;
            }
        }
    }

    if let Some(value) = lookup(LLM_TIMEOUT_ENV)? {
        config.llm_timeout_secs = parse_timeout_seconds(LLM_TIMEOUT_ENV, &value)?.as_secs();
    }

    let ocr = &mut config.ocr;
    if let Some(command) = lookup(TESSERACT_PATH_ENV)? {
        ocr.tesseract_command = command.trim().to_string();
    }
    if let Some(languages) = lookup(OCR_LANGUAGES_ENV)? {
        ocr.languages = languages.trim().to_string();
    }
    if let Some(value) = lookup(OCR_OEM_ENV)? {
        ocr.oem = parse_number(OCR_OEM_ENV, &value)?;
    }
    if let Some(value) = lookup(OCR_PSM_ENV)? {
        ocr.psm = parse_number(OCR_PSM_ENV, &value)?;
    }
    if let Some(value) = lookup(OCR_PREPROCESS_ENV)? {
        ocr.preprocess = parse_bool(OCR_PREPROCESS_ENV, &value)?;
    }
    if let Some(value) = lookup(OCR_TARGET_WIDTH_ENV)? {
        ocr.target_width = parse_number(OCR_TARGET_WIDTH_ENV, &value)?;
    }
    if let Some(value) = lookup(OCR_THRESHOLD_ENV)? {
        ocr.threshold = value
            .parse::<ThresholdMode>()
            .map_err(|err| ConfigError::invalid(format!("{OCR_THRESHOLD_ENV}: {err}")))?;
    }

    if let Some(value) = lookup(REGION_ENV)? {
        let region = value
            .parse::<CaptureRegion>()
            .map_err(|err| ConfigError::invalid(format!("{REGION_ENV}: {err}")))?;
        config.default_region = Some(region);
    }
    if let Some(value) = lookup(DEBUG_ENV)? {
        config.debug = parse_bool(DEBUG_ENV, &value)?;
    }
    if let Some(prompt) = lookup(BRIEF_SYSTEM_PROMPT_ENV)? {
        config.brief_system_prompt = prompt.trim().to_string();
    }

    Ok(config)
}
