//! Reveal window arithmetic.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Batch sizes and cadence of a progressive reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Items exposed immediately.
    pub initial_batch: usize,
    /// Items added per tick.
    pub subsequent_batch: usize,
    /// Time between ticks.
    #[serde(rename = "interval_ms", with = "feed_model::millis")]
    pub interval: Duration,
}

impl RevealConfig {
    /// Batches used by the product grid: 8 up front, then 4 per tick.
    pub fn product_grid() -> Self {
        Self {
            initial_batch: 8,
            subsequent_batch: 4,
            ..Self::default()
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            initial_batch: 12,
            subsequent_batch: 8,
            interval: Duration::from_millis(100),
        }
    }
}

/// How many items of a list are exposed.
///
/// Invariant: `revealed <= total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RevealWindow {
    /// Items currently exposed.
    pub revealed: usize,
    /// Items available.
    pub total: usize,
}

impl RevealWindow {
    /// Window over `total` items with the initial batch exposed.
    pub fn new(initial_batch: usize, total: usize) -> Self {
        Self {
            revealed: initial_batch.min(total),
            total,
        }
    }

    /// Expose `step` more items, clamped to the total. Returns whether the count changed.
    pub fn advance(&mut self, step: usize) -> bool {
        let next = self.revealed.saturating_add(step.max(1)).min(self.total);
        let changed = next != self.revealed;
        self.revealed = next;
        changed
    }

    /// Check if every item is exposed.
    pub fn is_complete(&self) -> bool {
        self.revealed >= self.total
    }

    /// Items not yet exposed.
    pub fn remaining(&self) -> usize {
        self.total - self.revealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_batch_is_clamped() {
        assert_eq!(RevealWindow::new(12, 5).revealed, 5);
        assert_eq!(RevealWindow::new(12, 30).revealed, 12);
        assert!(RevealWindow::new(12, 0).is_complete());
    }

    #[test]
    fn test_advance_clamps_to_total() {
        let mut window = RevealWindow::new(12, 30);
        assert!(window.advance(8));
        assert_eq!(window.revealed, 20);
        assert!(window.advance(8));
        assert!(window.advance(8));
        assert_eq!(window.revealed, 30);
        assert!(window.is_complete());
        assert!(!window.advance(8));
        assert_eq!(window.remaining(), 0);
    }

    #[test]
    fn test_zero_step_still_progresses() {
        let mut window = RevealWindow::new(0, 2);
        assert!(window.advance(0));
        assert_eq!(window.revealed, 1);
    }

    #[test]
    fn test_config_from_json() {
        let config: RevealConfig =
            serde_json::from_str(r#"{"initial_batch": 4, "interval_ms": 250}"#).unwrap();
        assert_eq!(config.initial_batch, 4);
        assert_eq!(config.subsequent_batch, 8);
        assert_eq!(config.interval, Duration::from_millis(250));
    }
}
