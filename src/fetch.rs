// Background fetches with request tokens
// Every fetch carries a monotonically increasing token; only the response
// matching the latest issued token surfaces, so a superseded request can
// never overwrite newer state (latest-requested-wins, not latest-resolved)

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

/// Identifier for one issued request.
pub type Token = u64;

/// Runs fetch jobs on background threads and hands back only the result of
/// the most recently issued one.
///
/// The event loop calls `poll` every tick; stale results are drained and
/// dropped silently. One fetcher per concern (listing, batch, analytics), so
/// views never share fetch state.
pub struct Fetcher<T> {
    tx: Sender<(Token, T)>,
    rx: Receiver<(Token, T)>,
    next_token: Token,
    latest_issued: Token,
    pending: bool,
}

impl<T: Send + 'static> Fetcher<T> {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Fetcher {
            tx,
            rx,
            next_token: 0,
            latest_issued: 0,
            pending: false,
        }
    }

    /// True while the latest issued request has not resolved. The UI keeps
    /// the triggering control disabled while this holds.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Issue a new request. Any earlier in-flight request is superseded: it
    /// keeps running, but its result will be discarded on arrival.
    pub fn spawn<F>(&mut self, job: F) -> Token
    where
        F: FnOnce() -> T + Send + 'static,
    {
        self.next_token += 1;
        let token = self.next_token;
        self.latest_issued = token;
        self.pending = true;

        let tx = self.tx.clone();
        thread::spawn(move || {
            // Receiver dropped means the app is shutting down; nothing to do
            let _ = tx.send((token, job()));
        });

        token
    }

    /// Drain finished jobs. Returns the value of the latest issued request
    /// if it has resolved, dropping anything stale.
    pub fn poll(&mut self) -> Option<T> {
        let mut latest = None;
        while let Ok((token, value)) = self.rx.try_recv() {
            if token == self.latest_issued {
                latest = Some(value);
            }
        }

        if latest.is_some() {
            self.pending = false;
        }
        latest
    }
}

impl<T: Send + 'static> Default for Fetcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    /// Poll until a result arrives or the deadline passes
    fn poll_until(fetcher: &mut Fetcher<u32>, deadline: Duration) -> Option<u32> {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if let Some(value) = fetcher.poll() {
                return Some(value);
            }
            thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn test_single_fetch_resolves() {
        let mut fetcher = Fetcher::new();
        fetcher.spawn(|| 42);

        assert!(fetcher.is_pending());
        assert_eq!(poll_until(&mut fetcher, Duration::from_secs(2)), Some(42));
        assert!(!fetcher.is_pending());
    }

    #[test]
    fn test_stale_result_is_dropped() {
        let mut fetcher = Fetcher::new();

        // Slow first request, fast second one
        fetcher.spawn(|| {
            thread::sleep(Duration::from_millis(100));
            1
        });
        fetcher.spawn(|| 2);

        assert_eq!(poll_until(&mut fetcher, Duration::from_secs(2)), Some(2));

        // When the slow request finally lands it must not surface
        thread::sleep(Duration::from_millis(200));
        assert_eq!(fetcher.poll(), None);
    }

    #[test]
    fn test_pending_until_latest_resolves() {
        let mut fetcher = Fetcher::new();
        fetcher.spawn(|| 1);

        // Supersede immediately with a slower request
        fetcher.spawn(|| {
            thread::sleep(Duration::from_millis(300));
            2
        });

        // The first result may arrive, but it is stale: still pending
        thread::sleep(Duration::from_millis(30));
        assert_eq!(fetcher.poll(), None);
        assert!(fetcher.is_pending());

        assert_eq!(poll_until(&mut fetcher, Duration::from_secs(2)), Some(2));
        assert!(!fetcher.is_pending());
    }

    #[test]
    fn test_tokens_increase_monotonically() {
        let mut fetcher = Fetcher::new();
        let first = fetcher.spawn(|| 1);
        let second = fetcher.spawn(|| 2);

        assert!(second > first);
    }
}
