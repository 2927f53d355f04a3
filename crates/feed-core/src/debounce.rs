//! Search input debouncing.

use std::time::Duration;

use tokio::sync::mpsc;

/// Coalesces raw search input into settled terms.
///
/// A value is emitted once no newer value arrived for the quiet period. A
/// settled value equal to the last emitted one is not emitted again. When
/// the debouncer is dropped, a pending value still waits out its quiet
/// period before it is emitted.
#[derive(Debug)]
pub struct SearchDebouncer {
    input: mpsc::UnboundedSender<String>,
}

impl SearchDebouncer {
    /// Start a debouncer. Settled terms arrive on the returned receiver.
    pub fn spawn(quiet: Duration) -> (Self, mpsc::Receiver<String>) {
        let (input, raw) = mpsc::unbounded_channel();
        let (settled, output) = mpsc::channel(16);
        tokio::spawn(run(raw, settled, quiet));
        (Self { input }, output)
    }

    /// Feed one raw input value. Returns `false` once the output side is gone.
    pub fn push(&self, value: impl Into<String>) -> bool {
        self.input.send(value.into()).is_ok()
    }
}

async fn run(
    mut raw: mpsc::UnboundedReceiver<String>,
    settled: mpsc::Sender<String>,
    quiet: Duration,
) {
    let mut pending: Option<String> = None;
    let mut last: Option<String> = None;

    loop {
        let received = if pending.is_some() {
            tokio::select! {
                value = raw.recv() => value,
                _ = tokio::time::sleep(quiet) => {
                    if let Some(value) = pending.take() {
                        if !emit(&settled, &mut last, value).await {
                            return;
                        }
                    }
                    continue;
                }
            }
        } else {
            raw.recv().await
        };

        match received {
            Some(value) => pending = Some(value),
            None => break,
        }
    }

    if let Some(value) = pending {
        tokio::time::sleep(quiet).await;
        emit(&settled, &mut last, value).await;
    }
}

async fn emit(settled: &mpsc::Sender<String>, last: &mut Option<String>, value: String) -> bool {
    if last.as_deref() == Some(value.as_str()) {
        tracing::trace!(%value, "search term unchanged");
        return true;
    }
    tracing::debug!(%value, "search term settled");
    *last = Some(value.clone());
    settled.send(value).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(500);

    async fn nothing_within(rx: &mut mpsc::Receiver<String>, wait: Duration) -> bool {
        tokio::time::timeout(wait, rx.recv()).await.is_err()
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_emit_last_value_once() {
        let (debouncer, mut rx) = SearchDebouncer::spawn(QUIET);
        for value in ["s", "sh", "sho", "shoes"] {
            debouncer.push(value);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        assert_eq!(rx.recv().await.as_deref(), Some("shoes"));
        assert!(nothing_within(&mut rx, QUIET * 4).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_value_waits_for_quiet_period() {
        let (debouncer, mut rx) = SearchDebouncer::spawn(QUIET);
        debouncer.push("lamp");

        assert!(nothing_within(&mut rx, Duration::from_millis(400)).await);
        assert_eq!(rx.recv().await.as_deref(), Some("lamp"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_value_is_not_reemitted() {
        let (debouncer, mut rx) = SearchDebouncer::spawn(QUIET);
        debouncer.push("lamp");
        assert_eq!(rx.recv().await.as_deref(), Some("lamp"));

        debouncer.push("lam");
        debouncer.push("lamp");
        assert!(nothing_within(&mut rx, QUIET * 3).await);

        debouncer.push("desk");
        assert_eq!(rx.recv().await.as_deref(), Some("desk"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_value_flushed_on_drop() {
        let (debouncer, mut rx) = SearchDebouncer::spawn(QUIET);
        debouncer.push("chair");
        drop(debouncer);

        assert_eq!(rx.recv().await.as_deref(), Some("chair"));
        assert_eq!(rx.recv().await, None);
    }
}
