//! Trailing-edge debounce of event bursts
//!
//! Editors and file watchers report one save as several events. The
//! debouncer waits for a quiet period after the last event of a burst and
//! then reports the whole burst once.

use std::time::Duration;
use tokio::sync::mpsc;

/// Coalesces bursts of events from a channel
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    quiet: Duration,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period
    pub fn new(quiet: Duration) -> Self {
        Self { quiet }
    }

    /// Quiet period
    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Wait for the next burst and return how many events it held.
    ///
    /// Returns `None` once the channel is closed and drained. A burst still
    /// pending when the channel closes is reported immediately.
    pub async fn next_burst<T>(&self, rx: &mut mpsc::Receiver<T>) -> Option<usize> {
        rx.recv().await?;
        let mut count = 1;
        loop {
            match tokio::time::timeout(self.quiet, rx.recv()).await {
                Ok(Some(_)) => count += 1,
                Ok(None) | Err(_) => return Some(count),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Instant};

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_coalesced() {
        let (tx, mut rx) = mpsc::channel(16);
        let debouncer = Debouncer::new(Duration::from_millis(300));

        tokio::spawn(async move {
            for _ in 0..3 {
                tx.send(()).await.unwrap();
                sleep(Duration::from_millis(100)).await;
            }
            sleep(Duration::from_secs(2)).await;
            tx.send(()).await.unwrap();
        });

        let start = Instant::now();
        assert_eq!(debouncer.next_burst(&mut rx).await, Some(3));
        assert!(start.elapsed() >= Duration::from_millis(500));

        assert_eq!(debouncer.next_burst(&mut rx).await, Some(1));
        assert_eq!(debouncer.next_burst(&mut rx).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_spaced_beyond_quiet_period() {
        let (tx, mut rx) = mpsc::channel(16);
        let debouncer = Debouncer::new(Duration::from_millis(300));

        tokio::spawn(async move {
            tx.send(1).await.unwrap();
            sleep(Duration::from_millis(400)).await;
            tx.send(2).await.unwrap();
        });

        assert_eq!(debouncer.next_burst(&mut rx).await, Some(1));
        assert_eq!(debouncer.next_burst(&mut rx).await, Some(1));
        assert_eq!(debouncer.next_burst(&mut rx).await, None);
    }

    #[tokio::test]
    async fn test_closed_channel() {
        let (tx, mut rx) = mpsc::channel::<()>(1);
        drop(tx);
        assert_eq!(Debouncer::new(Duration::from_millis(10)).next_burst(&mut rx).await, None);
    }
}
