//! Session state and its single guarded mutator.
//!
//! Every write names the generation it was started under. A write whose
//! generation is no longer current is dropped, so a slow resolution for a
//! previous address can never overwrite the session of the current one.

use alloy::primitives::Address;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::watch;

use crate::access::{Resolution, Role};
use crate::observability::metrics;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No wallet connected.
    #[default]
    Idle,
    /// Resolution in flight for `address`.
    Resolving,
    /// Role and count resolved for `address`.
    Ready,
    /// Resolution failed; count stays unset.
    Error,
}

/// Who is connected and what they hold.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub address: Option<Address>,
    pub role: Option<Role>,
    /// `None` until resolved for `address`; `Some(0)` means resolved with no attestations.
    pub attestation_count: Option<u64>,
    pub display_name: Option<String>,
    pub status: SessionStatus,
    generation: u64,
}

impl Session {
    /// Token identifying the address transition this state belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The coordinator that owned the session has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("wallet session used after its coordinator stopped")]
pub struct SessionClosed;

/// Write side of the session. Owned by the coordinator.
///
/// Address transitions and commit-then-announce sequences hold `gate`, so a
/// commit's announcement always runs while its generation is still current.
#[derive(Debug, Clone)]
pub(crate) struct SessionStore {
    tx: Arc<watch::Sender<Session>>,
    gate: Arc<Mutex<()>>,
}

impl SessionStore {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(Session::default());
        Self {
            tx: Arc::new(tx),
            gate: Arc::new(Mutex::new(())),
        }
    }

    pub(crate) fn handle(&self) -> SessionHandle {
        SessionHandle {
            rx: self.tx.subscribe(),
        }
    }

    pub(crate) fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start tracking `address`, superseding any earlier generation.
    pub(crate) fn begin(&self, address: Address) -> u64 {
        let _gate = self.lock();
        let mut generation = 0;
        self.tx.send_modify(|session| {
            generation = session.generation + 1;
            *session = Session {
                address: Some(address),
                status: SessionStatus::Resolving,
                generation,
                ..Session::default()
            };
        });
        generation
    }

    /// Forget the connected account.
    pub(crate) fn clear(&self) -> u64 {
        let _gate = self.lock();
        let mut generation = 0;
        self.tx.send_modify(|session| {
            generation = session.generation + 1;
            *session = Session {
                generation,
                ..Session::default()
            };
        });
        generation
    }

    /// Commit a successful resolution and run `announce` on the committed
    /// state. Returns `false`, without announcing, if `generation` is stale.
    pub(crate) fn commit_resolution(
        &self,
        generation: u64,
        resolution: Resolution,
        announce: impl FnOnce(&Session),
    ) -> bool {
        self.commit(
            generation,
            |session| {
                session.role = Some(resolution.role);
                session.attestation_count = Some(resolution.attestation_count);
                session.status = SessionStatus::Ready;
            },
            announce,
        )
    }

    /// Record a failed resolution, then run `announce`. Returns `false` if
    /// `generation` is stale.
    pub(crate) fn commit_failure(&self, generation: u64, announce: impl FnOnce(&Session)) -> bool {
        self.commit(
            generation,
            |session| {
                session.role = None;
                session.attestation_count = None;
                session.status = SessionStatus::Error;
            },
            announce,
        )
    }

    /// Set the display name unless one is already present for this generation.
    pub(crate) fn commit_name(&self, generation: u64, name: String) -> bool {
        self.commit(
            generation,
            |session| {
                if session.display_name.is_none() {
                    session.display_name = Some(name);
                }
            },
            |_| {},
        )
    }

    fn commit(
        &self,
        generation: u64,
        apply: impl FnOnce(&mut Session),
        announce: impl FnOnce(&Session),
    ) -> bool {
        let _gate = self.lock();
        let committed = self.tx.send_if_modified(|session| {
            if session.generation != generation {
                return false;
            }
            apply(session);
            true
        });
        if !committed {
            metrics::record_stale_discard();
            tracing::debug!(generation, "Discarded result for superseded session");
            return false;
        }
        // the watch lock is released here; sinks may read the session
        announce(&self.snapshot());
        true
    }
}

/// Read-only view of the session, shared with the rest of the application.
///
/// Valid only while the coordinator that produced it is running.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<Session>,
}

impl SessionHandle {
    /// Current session state.
    ///
    /// # Panics
    /// If the owning coordinator has stopped. Use [`SessionHandle::try_snapshot`]
    /// where that is an expected condition.
    pub fn snapshot(&self) -> Session {
        match self.try_snapshot() {
            Ok(session) => session,
            Err(closed) => panic!("{}", closed),
        }
    }

    /// Current session state, or [`SessionClosed`] once the coordinator is gone.
    pub fn try_snapshot(&self) -> Result<Session, SessionClosed> {
        self.rx.has_changed().map_err(|_| SessionClosed)?;
        Ok(self.rx.borrow().clone())
    }

    /// Wait for the next committed change.
    ///
    /// Fails once the coordinator owning the session is gone.
    pub async fn changed(&mut self) -> Result<Session, SessionClosed> {
        self.rx.changed().await.map_err(|_| SessionClosed)?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Wait until the session satisfies `predicate`.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&Session) -> bool,
    ) -> Result<Session, SessionClosed> {
        let session = self.rx.wait_for(predicate).await.map_err(|_| SessionClosed)?;
        Ok(session.clone())
    }
}
