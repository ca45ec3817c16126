use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::state::{RequestKind, SessionState};

/// Locks the session state. A panic in another holder leaves the state usable.
pub(crate) fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks a request as in flight and shows the busy indicator for as long as it lives.
///
/// Dropping the guard releases both, whichever way the handler exits, including
/// when its future is dropped mid-request. A finished chat turn also hands focus
/// back to the input.
pub(crate) struct RequestGuard {
    state: Arc<Mutex<SessionState>>,
    kind: RequestKind,
}

impl RequestGuard {
    /// Claims the session. `locked` must be the caller's lock on `state`.
    ///
    /// Returns the kind already in flight if the session is taken.
    pub(crate) fn begin(
        state: &Arc<Mutex<SessionState>>,
        locked: &mut SessionState,
        kind: RequestKind,
    ) -> Result<Self, RequestKind> {
        if let Some(current) = locked.in_flight {
            return Err(current);
        }
        locked.in_flight = Some(kind);
        locked.busy = true;
        debug!("{kind} started");
        Ok(Self {
            state: Arc::clone(state),
            kind,
        })
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        state.in_flight = None;
        state.busy = false;
        if self.kind == RequestKind::ChatTurn {
            state.input.focused = true;
        }
        debug!("{} finished", self.kind);
    }
}
