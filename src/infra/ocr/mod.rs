//! Text recognition over captured images.

mod preprocess;
mod tesseract;

use image::DynamicImage;

use crate::domain::OcrError;

pub use preprocess::preprocess;
pub use tesseract::{TesseractEngine, tesseract_args};

/// Turns an image into text. Implementations return trimmed output; an empty string
/// means nothing legible was found.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}
