//! Infinite scroll trigger.

use feed_fetch::PageCursor;
use serde::{Deserialize, Serialize};

/// Where the viewport is relative to the content.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollPosition {
    /// Offset of the viewport top from the content top.
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub content_height: f64,
}

impl ScrollPosition {
    pub fn new(scroll_top: f64, viewport_height: f64, content_height: f64) -> Self {
        Self {
            scroll_top,
            viewport_height,
            content_height,
        }
    }

    /// Distance from the viewport bottom to the content end, never negative.
    pub fn distance_to_end(&self) -> f64 {
        (self.content_height - (self.scroll_top + self.viewport_height)).max(0.0)
    }
}

/// Decides when scrolling should request the next page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTrigger {
    threshold_px: f64,
}

impl ScrollTrigger {
    pub fn new(threshold_px: f64) -> Self {
        Self {
            threshold_px: threshold_px.max(0.0),
        }
    }

    pub fn threshold_px(&self) -> f64 {
        self.threshold_px
    }

    /// True when the content end is within the threshold, more pages may
    /// exist, and no fetch is in flight.
    pub fn should_fetch(&self, position: &ScrollPosition, cursor: &PageCursor) -> bool {
        cursor.has_more && !cursor.is_fetching && position.distance_to_end() <= self.threshold_px
    }
}

impl Default for ScrollTrigger {
    fn default() -> Self {
        Self::new(300.0)
    }
}
