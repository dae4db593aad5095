//! Cooperative cancellation for long scans.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// One-shot stop request, checked between rows.
///
/// Observation consumes the request: after an in-flight pass reacts to a
/// stop, the token reads as not cancelled again, so a single request never
/// stops more than one pass.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the in-flight pass to stop between rows.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether a stop request is pending. Does not consume it.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Atomically observe and clear a pending request.
    pub(crate) fn observe(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_is_one_shot() {
        let token = CancelToken::new();
        assert!(!token.observe());
        token.cancel();
        assert!(token.is_cancelled());
        assert!(token.observe());
        assert!(!token.is_cancelled());
        assert!(!token.observe());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let token = CancelToken::new();
        let handle = token.clone();
        handle.cancel();
        assert!(token.observe());
    }
}
