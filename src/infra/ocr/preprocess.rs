use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use imageproc::contrast::{
    ThresholdType, adaptive_threshold, equalize_histogram, otsu_level, threshold,
};
use imageproc::distance_transform::Norm;
use imageproc::filter::median_filter;
use imageproc::morphology::open;

use crate::domain::{OcrSettings, ThresholdMode};

/// Prepares a capture for Tesseract: grayscale, upscale, denoise, equalize, binarize, open.
///
/// Each step after the grayscale conversion is controlled by `settings`.
pub fn preprocess(image: &DynamicImage, settings: &OcrSettings) -> GrayImage {
    let mut gray = upscale_to_width(image.to_luma8(), settings.target_width);

    if settings.denoise {
        gray = median_filter(&gray, 1, 1);
    }
    if settings.equalize {
        gray = equalize_histogram(&gray);
    }

    gray = match settings.threshold {
        ThresholdMode::Adaptive { block_radius } => adaptive_threshold(&gray, block_radius),
        ThresholdMode::Otsu => threshold(&gray, otsu_level(&gray), ThresholdType::Binary),
        ThresholdMode::None => gray,
    };

    if settings.open_noise {
        gray = open(&gray, Norm::LInf, 1);
    }
    gray
}

fn upscale_to_width(gray: GrayImage, target_width: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || width >= target_width {
        return gray;
    }

    let scale = f64::from(target_width) / f64::from(width);
    let scaled_height = (f64::from(height) * scale).round().max(1.0) as u32;
    imageops::resize(&gray, target_width, scaled_height, FilterType::CatmullRom)
}
