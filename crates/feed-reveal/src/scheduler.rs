//! Timed reveal scheduler.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{RevealConfig, RevealWindow};

/// Grows a [`RevealWindow`] on a fixed cadence until the list is exposed.
///
/// The scheduler owns a single pending tick task. Arming a new one always
/// cancels the previous one first, and dropping the scheduler cancels it,
/// so ticks never compound or outlive their owner.
///
/// `set_total` spawns onto the current Tokio runtime.
#[derive(Debug)]
pub struct RevealScheduler {
    config: RevealConfig,
    window: Arc<watch::Sender<RevealWindow>>,
    pending: Option<JoinHandle<()>>,
}

impl RevealScheduler {
    /// Create a scheduler over an empty list.
    pub fn new(config: RevealConfig) -> Self {
        let (window, _) = watch::channel(RevealWindow::default());
        Self {
            config,
            window: Arc::new(window),
            pending: None,
        }
    }

    /// Tell the scheduler how many items are available.
    ///
    /// A changed total restarts the reveal at `min(initial_batch, total)`.
    /// An unchanged total leaves the window and any pending tick alone.
    pub fn set_total(&mut self, total: usize) {
        if self.window.borrow().total == total {
            return;
        }

        self.cancel();
        let window = RevealWindow::new(self.config.initial_batch, total);
        self.window.send_replace(window);
        tracing::trace!(total, revealed = window.revealed, "reveal restarted");

        if !window.is_complete() {
            self.arm();
        }
    }

    fn arm(&mut self) {
        let window = Arc::clone(&self.window);
        let step = self.config.subsequent_batch;
        let interval = self.config.interval;

        self.pending = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let mut complete = false;
                window.send_if_modified(|w| {
                    let changed = w.advance(step);
                    complete = w.is_complete();
                    changed
                });
                if complete {
                    break;
                }
            }
        }));
    }

    /// Cancel the pending tick, freezing the window where it is.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    /// Items currently exposed.
    pub fn revealed(&self) -> usize {
        self.window.borrow().revealed
    }

    /// Current window.
    pub fn window(&self) -> RevealWindow {
        *self.window.borrow()
    }

    /// Receive every change of the window.
    pub fn subscribe(&self) -> watch::Receiver<RevealWindow> {
        self.window.subscribe()
    }

    /// Check if a tick is scheduled.
    pub fn is_ticking(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.is_finished())
    }

    /// Batch configuration.
    pub fn config(&self) -> &RevealConfig {
        &self.config
    }
}

impl Default for RevealScheduler {
    fn default() -> Self {
        Self::new(RevealConfig::default())
    }
}

impl Drop for RevealScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    #[tokio::test(start_paused = true)]
    async fn test_reveals_in_batches_until_complete() {
        let mut scheduler = RevealScheduler::default();
        scheduler.set_total(30);
        assert_eq!(scheduler.revealed(), 12);
        assert!(scheduler.is_ticking());

        let mut rx = scheduler.subscribe();
        let mut seen = vec![scheduler.revealed()];
        while !rx.borrow().is_complete() {
            rx.changed().await.unwrap();
            seen.push(rx.borrow().revealed);
        }
        assert_eq!(seen, vec![12, 20, 28, 30]);

        tokio::time::sleep(TICK * 3).await;
        assert_eq!(scheduler.revealed(), 30);
        assert!(!scheduler.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_small_list_needs_no_ticks() {
        let mut scheduler = RevealScheduler::default();
        scheduler.set_total(5);
        assert_eq!(scheduler.revealed(), 5);
        assert!(!scheduler.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_change_restarts_from_initial_batch() {
        let mut scheduler = RevealScheduler::default();
        scheduler.set_total(40);
        let mut rx = scheduler.subscribe();
        rx.changed().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(scheduler.revealed(), 28);

        scheduler.set_total(39);
        assert_eq!(scheduler.revealed(), 12);
        assert_eq!(scheduler.window().total, 39);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_total_keeps_progress() {
        let mut scheduler = RevealScheduler::default();
        scheduler.set_total(40);
        let mut rx = scheduler.subscribe();
        rx.changed().await.unwrap();

        scheduler.set_total(40);
        assert_eq!(scheduler.revealed(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearming_does_not_compound_ticks() {
        let mut scheduler = RevealScheduler::default();
        scheduler.set_total(100);
        scheduler.set_total(200);

        tokio::time::sleep(TICK + Duration::from_millis(10)).await;
        assert_eq!(scheduler.revealed(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_tick() {
        let mut scheduler = RevealScheduler::default();
        scheduler.set_total(100);
        let rx = scheduler.subscribe();
        drop(scheduler);

        tokio::time::sleep(TICK * 5).await;
        assert_eq!(rx.borrow().revealed, 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_freezes_window() {
        let mut scheduler = RevealScheduler::new(RevealConfig::product_grid());
        scheduler.set_total(20);
        assert_eq!(scheduler.revealed(), 8);

        scheduler.cancel();
        tokio::time::sleep(TICK * 5).await;
        assert_eq!(scheduler.revealed(), 8);
        assert!(!scheduler.is_ticking());
    }
}
