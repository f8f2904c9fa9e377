//! Wallet session coordinator.
//!
//! Consumes wallet account events and keeps exactly one resolution live per
//! address transition. A newer transition aborts the older resolution task,
//! and the generation guard in [`SessionStore`] drops anything that still
//! slips through. Notifications are emitted under that guard, so none is
//! sent for an address the session has already left.

use alloy::primitives::Address;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::access::AttestationRoleResolver;
use crate::identity::IdentityResolver;
use crate::lifecycle::Shutdown;
use crate::session::notify::{ellipsed, Notification, NotificationSink};
use crate::session::state::{SessionHandle, SessionStore};

/// Account change reported by the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletEvent {
    /// An account is connected, or the connected account switched.
    Connected(Address),
    Disconnected,
}

/// Everything a resolution task needs.
struct Pipeline {
    resolver: AttestationRoleResolver,
    identity: Arc<dyn IdentityResolver>,
    notifier: Arc<dyn NotificationSink>,
    store: SessionStore,
    /// Last successfully resolved display name.
    name_cache: Mutex<Option<(Address, String)>>,
}

impl Pipeline {
    fn cached_name(&self, address: Address) -> Option<String> {
        let cache = self.name_cache.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .as_ref()
            .filter(|(cached, _)| *cached == address)
            .map(|(_, name)| name.clone())
    }

    fn remember_name(&self, address: Address, name: String) {
        let mut cache = self.name_cache.lock().unwrap_or_else(|e| e.into_inner());
        *cache = Some((address, name));
    }

    async fn display_name(&self, address: Address, generation: u64) -> Option<String> {
        let name = match self.cached_name(address) {
            Some(name) => Some(name),
            None => self.identity.lookup(address).await,
        };
        if let Some(name) = &name {
            if self.store.commit_name(generation, name.clone()) {
                self.remember_name(address, name.clone());
            }
        }
        name
    }

    async fn run(self: Arc<Self>, address: Address, generation: u64) {
        let (name, result) = tokio::join!(
            self.display_name(address, generation),
            self.resolver.resolve(address)
        );

        match result {
            Ok(resolution) => {
                let shown = name.unwrap_or_else(|| ellipsed(address));
                self.store.commit_resolution(generation, resolution, |session| {
                    tracing::info!(
                        address = %address,
                        generation = session.generation(),
                        role = %resolution.role,
                        count = resolution.attestation_count,
                        "Session ready"
                    );
                    self.notifier.notify_success(Notification::new(
                        "Account Changed",
                        format!("Connected to your account {}", shown),
                    ));
                });
            }
            Err(e) => {
                self.store.commit_failure(generation, |_| {
                    self.notifier
                        .notify_error(Notification::new(e.title(), e.to_string()));
                });
            }
        }
    }
}

/// Owns the session and reacts to wallet events.
pub struct WalletSessionCoordinator {
    pipeline: Arc<Pipeline>,
    in_flight: Option<JoinHandle<()>>,
}

impl WalletSessionCoordinator {
    pub fn new(
        resolver: AttestationRoleResolver,
        identity: Arc<dyn IdentityResolver>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline {
                resolver,
                identity,
                notifier,
                store: SessionStore::new(),
                name_cache: Mutex::new(None),
            }),
            in_flight: None,
        }
    }

    /// Subscribe to wallet events and start the coordinating task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> CoordinatorHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let shutdown = Shutdown::new();
        let session = self.pipeline.store.handle();
        let task = tokio::spawn(self.run(events_rx, shutdown.subscribe()));

        tracing::info!("Wallet session coordinator started");
        CoordinatorHandle {
            session,
            events: events_tx,
            shutdown,
            task,
        }
    }

    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<WalletEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                event = events.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
            }
        }
        self.cancel_in_flight();
        tracing::info!("Wallet session coordinator stopped");
    }

    fn handle(&mut self, event: WalletEvent) {
        let pipeline = self.pipeline.clone();
        let store = &pipeline.store;
        let current = store.snapshot().address;

        match event {
            WalletEvent::Connected(address) => {
                if current == Some(address) {
                    tracing::debug!(address = %address, "Account unchanged, keeping session");
                    return;
                }
                self.cancel_in_flight();
                let generation = store.begin(address);
                tracing::info!(address = %address, generation, "Account changed, resolving");
                self.in_flight = Some(tokio::spawn(pipeline.clone().run(address, generation)));
            }
            WalletEvent::Disconnected => {
                if current.is_none() {
                    return;
                }
                self.cancel_in_flight();
                store.clear();
                tracing::info!("Wallet disconnected, session cleared");
            }
        }
    }

    fn cancel_in_flight(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}

/// Running coordinator: session view, event input and teardown.
pub struct CoordinatorHandle {
    session: SessionHandle,
    events: mpsc::UnboundedSender<WalletEvent>,
    shutdown: Shutdown,
    task: JoinHandle<()>,
}

impl CoordinatorHandle {
    /// Read-only session view.
    pub fn session(&self) -> SessionHandle {
        self.session.clone()
    }

    /// Deliver a wallet event. Returns `false` once the coordinator has stopped.
    pub fn send(&self, event: WalletEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Stop the coordinator and wait for its task to finish.
    pub async fn shutdown(self) {
        self.shutdown.trigger();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Wallet session coordinator task failed");
        }
    }
}
