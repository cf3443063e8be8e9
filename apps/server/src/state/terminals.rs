//! In-process terminal sessions.
//!
//! One [`TerminalSession`] per (outlet, user). The lock is only held for the
//! synchronous cart operation itself, never across a database call; handlers
//! fetch first, then enter the registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use stockhub_core::cart::TerminalSession;

type TerminalKey = (String, String);

#[derive(Debug, Clone, Default)]
pub struct TerminalRegistry {
    sessions: Arc<Mutex<HashMap<TerminalKey, TerminalSession>>>,
}

impl TerminalRegistry {
    pub fn new() -> Self {
        TerminalRegistry::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TerminalKey, TerminalSession>> {
        // A panic mid-operation leaves at worst one stale cart behind.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `f` against the session for `(outlet_id, user_id)`, creating an
    /// idle one on first use.
    pub fn with_session<F, R>(&self, outlet_id: &str, user_id: &str, f: F) -> R
    where
        F: FnOnce(&mut TerminalSession) -> R,
    {
        let mut sessions = self.lock();
        let session = sessions
            .entry((outlet_id.to_string(), user_id.to_string()))
            .or_insert_with(|| TerminalSession::new(outlet_id, user_id));
        f(session)
    }

    /// Drops every session of the given outlets. Used after a ledger reset.
    pub fn forget_outlets(&self, outlet_ids: &[String]) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|(outlet, _), _| !outlet_ids.contains(outlet));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockhub_core::cart::SessionState;

    #[test]
    fn test_sessions_keyed_by_outlet_and_user() {
        let registry = TerminalRegistry::new();

        registry.with_session("outlet-1", "user-1", |s| assert_eq!(s.outlet_id(), "outlet-1"));
        registry.with_session("outlet-1", "user-2", |_| ());
        registry.with_session("outlet-2", "user-1", |_| ());
        registry.with_session("outlet-1", "user-1", |_| ());

        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_forget_outlets() {
        let registry = TerminalRegistry::new();
        registry.with_session("outlet-1", "user-1", |_| ());
        registry.with_session("outlet-2", "user-1", |_| ());

        assert_eq!(registry.forget_outlets(&["outlet-1".to_string()]), 1);
        assert_eq!(registry.len(), 1);
        registry.with_session("outlet-2", "user-1", |s| assert_eq!(s.state(), SessionState::Idle));
    }
}
