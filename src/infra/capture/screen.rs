use image::DynamicImage;
use tracing::debug;
use xcap::Monitor;

use crate::domain::{CaptureError, CaptureRegion};

use super::{RegionCapturer, crop_to_region};

/// Captures live screen contents through `xcap`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenCapturer;

impl ScreenCapturer {
    pub fn new() -> Self {
        Self
    }
}

impl RegionCapturer for ScreenCapturer {
    fn capture(&self, region: Option<&CaptureRegion>) -> Result<DynamicImage, CaptureError> {
        let monitor = match region {
            Some(region) => Monitor::from_point(region.left(), region.top()).map_err(backend)?,
            None => primary_monitor()?,
        };
        let origin_x = monitor.x().map_err(backend)?;
        let origin_y = monitor.y().map_err(backend)?;
        let image = DynamicImage::ImageRgba8(monitor.capture_image().map_err(backend)?);
        debug!(
            origin_x,
            origin_y,
            width = image.width(),
            height = image.height(),
            "captured monitor"
        );

        match region {
            Some(region) => crop_to_region(&image, origin_x, origin_y, region),
            None => Ok(image),
        }
    }
}

fn primary_monitor() -> Result<Monitor, CaptureError> {
    let monitors = Monitor::all().map_err(backend)?;
    let primary = monitors
        .iter()
        .position(|monitor| monitor.is_primary().unwrap_or(false))
        .unwrap_or(0);
    monitors
        .into_iter()
        .nth(primary)
        .ok_or_else(|| CaptureError::Unavailable {
            message: "no monitors detected".to_string(),
        })
}

fn backend(err: xcap::XCapError) -> CaptureError {
    CaptureError::Backend {
        message: err.to_string(),
    }
}
