use std::path::PathBuf;

use image::DynamicImage;
use tracing::debug;

use crate::domain::{CaptureError, CaptureRegion};

use super::{RegionCapturer, crop_to_region};

/// Reads a screenshot from disk on every capture.
#[derive(Debug, Clone)]
pub struct ImageFileCapturer {
    path: PathBuf,
}

impl ImageFileCapturer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RegionCapturer for ImageFileCapturer {
    fn capture(&self, region: Option<&CaptureRegion>) -> Result<DynamicImage, CaptureError> {
        let image = image::open(&self.path).map_err(|err| CaptureError::Source {
            path: self.path.display().to_string(),
            message: err.to_string(),
        })?;
        debug!(
            path = %self.path.display(),
            width = image.width(),
            height = image.height(),
            region = ?region.map(ToString::to_string),
            "loaded capture source"
        );

        match region {
            Some(region) => crop_to_region(&image, 0, 0, region),
            None => Ok(image),
        }
    }
}
