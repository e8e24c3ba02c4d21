//! Sources of pixels for the ask pipeline.

mod image_file;
#[cfg(feature = "screen-capture")]
mod screen;

use std::sync::Arc;

use image::DynamicImage;

use crate::domain::{CaptureError, CaptureRegion};

pub use image_file::ImageFileCapturer;
#[cfg(feature = "screen-capture")]
pub use screen::ScreenCapturer;

/// Grabs the pixels inside a region. `None` means the whole source.
pub trait RegionCapturer: Send + Sync {
    fn capture(&self, region: Option<&CaptureRegion>) -> Result<DynamicImage, CaptureError>;
}

/// Live screen capturer when built with `screen-capture`, otherwise one that always
/// reports [`CaptureError::Unavailable`].
pub fn screen_capturer() -> Arc<dyn RegionCapturer> {
    #[cfg(feature = "screen-capture")]
    {
        Arc::new(ScreenCapturer::new())
    }
    #[cfg(not(feature = "screen-capture"))]
    {
        Arc::new(NoScreenCapturer)
    }
}

#[cfg(not(feature = "screen-capture"))]
struct NoScreenCapturer;

#[cfg(not(feature = "screen-capture"))]
impl RegionCapturer for NoScreenCapturer {
    fn capture(&self, _region: Option<&CaptureRegion>) -> Result<DynamicImage, CaptureError> {
        Err(CaptureError::Unavailable {
            message: "built without the `screen-capture` feature; pass --image instead"
                .to_string(),
        })
    }
}

/// Crops `image`, whose top-left corner sits at (`origin_x`, `origin_y`), to `region`.
/// Parts of the region outside the image are dropped.
pub(crate) fn crop_to_region(
    image: &DynamicImage,
    origin_x: i32,
    origin_y: i32,
    region: &CaptureRegion,
) -> Result<DynamicImage, CaptureError> {
    let (x, y, width, height) = region
        .clamp_to(origin_x, origin_y, image.width(), image.height())
        .ok_or_else(|| CaptureError::OutOfBounds {
            region: region.to_string(),
            width: image.width(),
            height: image.height(),
        })?;
    Ok(image.crop_imm(x, y, width, height))
}
