use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::CaptureError;

/// Rectangle in absolute screen (or source image) coordinates.
///
/// Always normalized: `x1 <= x2` and `y1 <= y2`. The right and bottom edges are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaptureRegion {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl CaptureRegion {
    /// Builds a region from two opposite corners given in any order.
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Result<Self, CaptureError> {
        let region = Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        };
        if region.width() == 0 || region.height() == 0 {
            return Err(CaptureError::EmptyRegion);
        }
        Ok(region)
    }

    pub fn left(&self) -> i32 {
        self.x1
    }

    pub fn top(&self) -> i32 {
        self.y1
    }

    pub fn right(&self) -> i32 {
        self.x2
    }

    pub fn bottom(&self) -> i32 {
        self.y2
    }

    pub fn width(&self) -> u32 {
        self.x1.abs_diff(self.x2)
    }

    pub fn height(&self) -> u32 {
        self.y1.abs_diff(self.y2)
    }

    /// Intersects the region with a `width` x `height` source whose top-left corner sits at
    /// (`origin_x`, `origin_y`). Returns `(x, y, w, h)` relative to that source.
    pub fn clamp_to(
        &self,
        origin_x: i32,
        origin_y: i32,
        width: u32,
        height: u32,
    ) -> Option<(u32, u32, u32, u32)> {
        let source_right = i64::from(origin_x) + i64::from(width);
        let source_bottom = i64::from(origin_y) + i64::from(height);

        let left = i64::from(self.x1).max(i64::from(origin_x));
        let top = i64::from(self.y1).max(i64::from(origin_y));
        let right = i64::from(self.x2).min(source_right);
        let bottom = i64::from(self.y2).min(source_bottom);
        if left >= right || top >= bottom {
            return None;
        }

        let x = u32::try_from(left - i64::from(origin_x)).ok()?;
        let y = u32::try_from(top - i64::from(origin_y)).ok()?;
        let w = u32::try_from(right - left).ok()?;
        let h = u32::try_from(bottom - top).ok()?;
        Some((x, y, w, h))
    }
}

impl fmt::Display for CaptureRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x1, self.y1, self.x2, self.y2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseRegionError {
    #[error("region must be four comma-separated integers x1,y1,x2,y2 (got '{0}')")]
    Format(String),
    #[error(transparent)]
    Region(#[from] CaptureError),
}

impl FromStr for CaptureRegion {
    type Err = ParseRegionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let coords = value
            .split(',')
            .map(|part| part.trim().parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseRegionError::Format(value.to_string()))?;

        let [x1, y1, x2, y2] = coords[..] else {
            return Err(ParseRegionError::Format(value.to_string()));
        };

        Ok(Self::from_corners(x1, y1, x2, y2)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{CaptureRegion, ParseRegionError};
    use crate::domain::CaptureError;

    #[test]
    fn from_corners_normalizes_corner_order() {
        let region = CaptureRegion::from_corners(300, 200, 100, 50).expect("region should build");

        assert_eq!(region.left(), 100);
        assert_eq!(region.top(), 50);
        assert_eq!(region.right(), 300);
        assert_eq!(region.bottom(), 200);
        assert_eq!(region.width(), 200);
        assert_eq!(region.height(), 150);
    }

    #[test]
    fn from_corners_rejects_zero_area() {
        let error = CaptureRegion::from_corners(10, 10, 10, 80).expect_err("zero width");
        assert_eq!(error, CaptureError::EmptyRegion);
    }

    #[test]
    fn parse_accepts_whitespace_and_reports_bad_input() {
        let region: CaptureRegion = " 10, 20 ,110,220".parse().expect("region should parse");
        assert_eq!(region.to_string(), "10,20,110,220");

        let error = "10,20,30".parse::<CaptureRegion>().expect_err("three values");
        assert!(matches!(error, ParseRegionError::Format(_)));

        let error = "a,b,c,d".parse::<CaptureRegion>().expect_err("not numbers");
        assert!(matches!(error, ParseRegionError::Format(_)));
    }

    #[test]
    fn clamp_to_intersects_with_source_bounds() {
        let region = CaptureRegion::from_corners(-20, 10, 50, 500).expect("region should build");

        assert_eq!(region.clamp_to(0, 0, 100, 100), Some((0, 10, 50, 90)));
        assert_eq!(region.clamp_to(1920, 0, 1280, 1024), None);
    }

    #[test]
    fn clamp_to_translates_into_monitor_coordinates() {
        let region =
            CaptureRegion::from_corners(2000, 100, 2100, 160).expect("region should build");

        assert_eq!(region.clamp_to(1920, 0, 1280, 1024), Some((80, 100, 100, 60)));
    }
}
