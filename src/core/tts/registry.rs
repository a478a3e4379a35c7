//! Registry of in-flight synthesis sessions.
//!
//! The synthesizer owns the registry; each session only holds a
//! [`SessionGuard`] that removes its entry when the session is dropped. Shutdown
//! cancels every registered session through its [`CancellationToken`].

use std::sync::Arc;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Clone, Default)]
pub(crate) struct SessionRegistry {
    sessions: Arc<DashMap<String, CancellationToken>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session under `session_id`.
    ///
    /// The returned token is cancelled by [`SessionRegistry::cancel_all`]; the
    /// guard deregisters the session on drop.
    pub fn register(&self, session_id: &str) -> (SessionGuard, CancellationToken) {
        let token = CancellationToken::new();
        self.sessions.insert(session_id.to_string(), token.clone());

        let guard = SessionGuard {
            session_id: session_id.to_string(),
            sessions: Arc::clone(&self.sessions),
        };
        (guard, token)
    }

    /// Cancel every registered session, returning how many were signalled.
    pub fn cancel_all(&self) -> usize {
        // Collect first so no shard lock is held while sessions deregister.
        let tokens: Vec<CancellationToken> = self
            .sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        for token in &tokens {
            token.cancel();
        }
        tokens.len()
    }

    pub fn clear(&self) {
        self.sessions.clear();
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

}

/// Deregisters a session when dropped
pub(crate) struct SessionGuard {
    session_id: String,
    sessions: Arc<DashMap<String, CancellationToken>>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.sessions.remove(&self.session_id).is_some() {
            debug!(session_id = %self.session_id, "Session deregistered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_deregisters_on_drop() {
        let registry = SessionRegistry::new();
        let (guard, _token) = registry.register("a");
        let (_other, _token) = registry.register("b");

        assert_eq!(registry.len(), 2);
        assert!(registry.sessions.contains_key("a"));
        assert_eq!(guard.session_id, "a");

        drop(guard);
        assert_eq!(registry.len(), 1);
        assert!(!registry.sessions.contains_key("a"));
        assert!(registry.sessions.contains_key("b"));
    }

    #[test]
    fn test_cancel_all_signals_every_session() {
        let registry = SessionRegistry::new();
        let (_g1, t1) = registry.register("a");
        let (_g2, t2) = registry.register("b");

        assert_eq!(registry.cancel_all(), 2);
        assert!(t1.is_cancelled());
        assert!(t2.is_cancelled());
        // Cancelling does not deregister
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_guard_after_clear_is_harmless() {
        let registry = SessionRegistry::new();
        let (guard, _token) = registry.register("a");

        registry.clear();
        assert_eq!(registry.len(), 0);
        drop(guard);
        assert_eq!(registry.len(), 0);
    }
}
