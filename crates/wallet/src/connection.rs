//! Wallet connection management.
//!
//! Turns a resolved provider into an active [`WalletSession`] or a
//! classified failure. Wallets reject concurrent account prompts, so
//! concurrent `connect` calls are coalesced into a single shared in-flight
//! future; every waiter observes the same outcome from one underlying
//! `eth_requestAccounts` request.

use crate::{
    error::WalletError,
    provider::{ProviderEvent, ProviderHandle, ProviderRequest, parse_chain_id, resolve_provider},
    types::WalletSession,
};
use alloy_primitives::Address;
use futures::{FutureExt, future::Shared};
use parking_lot::{Mutex, RwLock};
use std::{future::Future, pin::Pin, sync::Arc};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::trace;

type ConnectFuture =
    Shared<Pin<Box<dyn Future<Output = Result<WalletSession, WalletError>> + Send>>>;

/// Manages the lifecycle of the wallet session.
pub struct ConnectionManager {
    /// Candidate providers supplied by the host environment.
    providers: Vec<Arc<dyn ProviderHandle>>,
    /// Brand label preferred when several wallets are injected.
    preferred: String,
    /// The provider backing the current session.
    active: Arc<Mutex<Option<Arc<dyn ProviderHandle>>>>,
    /// The current session, if any.
    session: Arc<RwLock<Option<WalletSession>>>,
    /// In-flight connection attempt shared by concurrent callers.
    inflight: Arc<Mutex<Option<ConnectFuture>>>,
    /// Background task applying provider events to the session.
    listener: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ConnectionManager {
    pub fn new(providers: Vec<Arc<dyn ProviderHandle>>, preferred: impl Into<String>) -> Self {
        Self {
            providers,
            preferred: preferred.into(),
            active: Arc::new(Mutex::new(None)),
            session: Arc::new(RwLock::new(None)),
            inflight: Arc::new(Mutex::new(None)),
            listener: Arc::new(Mutex::new(None)),
        }
    }

    /// The current session, if one is established.
    pub fn session(&self) -> Option<WalletSession> {
        *self.session.read()
    }

    pub fn is_connected(&self) -> bool {
        self.session.read().is_some()
    }

    /// The provider backing the current session.
    pub fn active_provider(&self) -> Option<Arc<dyn ProviderHandle>> {
        self.active.lock().clone()
    }

    /// The current session together with its provider, or
    /// [`WalletError::ProviderNotFound`] when nothing is connected.
    pub(crate) fn require_session(
        &self,
    ) -> Result<(WalletSession, Arc<dyn ProviderHandle>), WalletError> {
        let session = self.session().ok_or(WalletError::ProviderNotFound)?;
        let provider = self.active_provider().ok_or(WalletError::ProviderNotFound)?;
        Ok((session, provider))
    }

    /// Establish a wallet session.
    ///
    /// Returns the existing session if one is active. Otherwise resolves a
    /// provider, issues `eth_requestAccounts`, reads the chain id, and
    /// subscribes to account/chain change events. While an attempt is
    /// pending, further calls await the same outcome instead of issuing a
    /// duplicate prompt.
    pub async fn connect(&self) -> Result<WalletSession, WalletError> {
        if let Some(session) = self.session() {
            return Ok(session);
        }

        let fut = {
            let mut inflight = self.inflight.lock();
            match inflight.as_ref() {
                Some(fut) => fut.clone(),
                None => {
                    let slot = self.inflight.clone();
                    let attempt = Self::establish(
                        self.providers.clone(),
                        self.preferred.clone(),
                        self.active.clone(),
                        self.session.clone(),
                        self.listener.clone(),
                    );
                    // The attempt clears its own slot on completion; the
                    // slot only ever holds the currently running attempt,
                    // and a stale waiter cannot drop a newer one.
                    let fut = async move {
                        let outcome = attempt.await;
                        slot.lock().take();
                        outcome
                    }
                    .boxed()
                    .shared();
                    *inflight = Some(fut.clone());
                    fut
                }
            }
        };

        fut.await
    }

    /// Tear down the session and stop listening for provider events.
    pub fn disconnect(&self) {
        trace!(target: "wallet::connection", "disconnecting session");
        *self.session.write() = None;
        self.active.lock().take();
        if let Some(task) = self.listener.lock().take() {
            task.abort();
        }
    }

    async fn establish(
        providers: Vec<Arc<dyn ProviderHandle>>,
        preferred: String,
        active: Arc<Mutex<Option<Arc<dyn ProviderHandle>>>>,
        session: Arc<RwLock<Option<WalletSession>>>,
        listener: Arc<Mutex<Option<JoinHandle<()>>>>,
    ) -> Result<WalletSession, WalletError> {
        let Some(provider) = resolve_provider(&providers, &preferred) else {
            return Err(WalletError::ProviderNotFound);
        };
        trace!(target: "wallet::connection", wallet = ?provider.label(), "requesting accounts");

        let accounts = provider
            .request(ProviderRequest::RequestAccounts)
            .await
            .map_err(WalletError::connection)?;
        let accounts: Vec<Address> = serde_json::from_value(accounts)
            .map_err(|e| WalletError::ConnectionFailed(format!("malformed account list: {e}")))?;
        let Some(address) = accounts.first().copied() else {
            return Err(WalletError::ConnectionFailed("wallet exposed no accounts".into()));
        };

        let chain_id = provider
            .request(ProviderRequest::ChainId)
            .await
            .map_err(WalletError::connection)
            .and_then(|value| {
                parse_chain_id(&value)
                    .ok_or_else(|| WalletError::ConnectionFailed("malformed chain id".into()))
            })?;

        let established = WalletSession { address, chain_id };
        *session.write() = Some(established);
        *active.lock() = Some(provider.clone());

        let events = provider.subscribe();
        let task =
            tokio::spawn(Self::listen(events, session.clone(), active.clone(), listener.clone()));
        if let Some(previous) = listener.lock().replace(task) {
            previous.abort();
        }

        trace!(target: "wallet::connection", %address, chain_id, "session established");
        Ok(established)
    }

    /// Apply provider events to the session until the provider goes away.
    ///
    /// An empty account list tears the manager down into the same state as
    /// [`Self::disconnect`]: no session, no active provider, no listener.
    async fn listen(
        mut events: broadcast::Receiver<ProviderEvent>,
        session: Arc<RwLock<Option<WalletSession>>>,
        active: Arc<Mutex<Option<Arc<dyn ProviderHandle>>>>,
        listener: Arc<Mutex<Option<JoinHandle<()>>>>,
    ) {
        loop {
            match events.recv().await {
                Ok(ProviderEvent::AccountsChanged(accounts)) => match accounts.first() {
                    None => {
                        trace!(target: "wallet::connection", "accounts cleared, tearing down session");
                        *session.write() = None;
                        active.lock().take();
                        listener.lock().take();
                        break;
                    }
                    Some(address) => {
                        if let Some(session) = session.write().as_mut() {
                            session.address = *address;
                        }
                    }
                },
                Ok(ProviderEvent::ChainChanged(chain_id)) => {
                    if let Some(session) = session.write().as_mut() {
                        session.chain_id = chain_id;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}
