//! Turn cancellation

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Shared cancel flag for a turn and the provider calls it makes
///
/// Clones observe the same flag. Once set it never resets.
#[derive(Clone)]
pub struct CancellationToken {
    flag: Arc<watch::Sender<bool>>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self { flag: Arc::new(flag) }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.flag.borrow()
    }

    pub fn cancel(&self) {
        self.flag.send_replace(true);
    }

    /// Resolves once `cancel` has been called on any clone
    pub async fn cancelled(&self) {
        let mut rx = self.flag.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Drive `fut` unless the token fires first, in which case `fut` is dropped
    pub async fn run_until_cancelled<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            output = fut => Some(output),
        }
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CancellationToken").field(&self.is_cancelled()).finish()
    }
}
