use std::io::{ErrorKind, Write};
use std::process::Command;
use std::time::Instant;

use image::{DynamicImage, ImageFormat};
use tracing::{debug, info};

use crate::domain::{OcrError, OcrSettings};

use super::{TextRecognizer, preprocess};

const STDERR_SNIPPET_CHARS: usize = 512;

/// Recognizes text by shelling out to the `tesseract` command line tool.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    settings: OcrSettings,
}

impl TesseractEngine {
    pub fn new(settings: OcrSettings) -> Self {
        Self { settings }
    }

    fn prepare(&self, image: &DynamicImage) -> DynamicImage {
        if self.settings.preprocess {
            DynamicImage::ImageLuma8(preprocess(image, &self.settings))
        } else {
            image.clone()
        }
    }
}

impl TextRecognizer for TesseractEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let prepared = self.prepare(image);

        let mut input = tempfile::Builder::new()
            .prefix("screenask-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|err| OcrError::Io {
                message: format!("could not create temporary image: {err}"),
            })?;
        prepared
            .write_to(input.as_file_mut(), ImageFormat::Png)
            .map_err(|err| OcrError::Image {
                message: err.to_string(),
            })?;
        input.as_file_mut().flush().map_err(|err| OcrError::Io {
            message: err.to_string(),
        })?;

        let command = &self.settings.tesseract_command;
        let input_path = input.path().to_string_lossy().into_owned();
        let args = tesseract_args(&input_path, &self.settings);
        let started = Instant::now();
        debug!(%command, ?args, "running tesseract");

        let output = Command::new(command).args(&args).output().map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                OcrError::EngineNotFound {
                    command: command.clone(),
                }
            } else {
                OcrError::Io {
                    message: err.to_string(),
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::EngineFailed {
                status: output.status.to_string(),
                stderr: stderr.trim().chars().take(STDERR_SNIPPET_CHARS).collect(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!(
            chars = text.chars().count(),
            latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "tesseract finished"
        );
        Ok(text)
    }
}

/// Command line passed to tesseract for `input_path`, printing the result to stdout.
pub fn tesseract_args(input_path: &str, settings: &OcrSettings) -> Vec<String> {
    vec![
        input_path.to_string(),
        "stdout".to_string(),
        "-l".to_string(),
        settings.languages.clone(),
        "--oem".to_string(),
        settings.oem.to_string(),
        "--psm".to_string(),
        settings.psm.to_string(),
    ]
}
