//! One user's claim session: debounced lookups driven by keystrokes, the
//! claim button state machine and the notifications shown to the user.
//!
//! State lives behind a mutex that is never held across an await. Every
//! keystroke bumps a generation counter so results of superseded lookups are
//! discarded.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};

use chrono::Utc;
use serde::Serialize;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, warn};

use crate::{
    client::VestingClient,
    debounce::Debouncer,
    lookup::{ClaimSummary, LookupOutcome, ResolvedClaim},
    solana::Ledger,
    wallet::Wallet,
};

/// Injected platform capabilities; either may be absent.
pub struct Capabilities<L> {
    pub client: Option<Arc<VestingClient<L>>>,
    pub wallet: Option<Wallet>,
}

impl<L> Clone for Capabilities<L> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            wallet: self.wallet.clone(),
        }
    }
}

impl<L> Capabilities<L> {
    fn ready(&self) -> Option<(Arc<VestingClient<L>>, Wallet)> {
        Some((self.client.clone()?, self.wallet.clone()?))
    }
}

/// Admits one claim submission at a time across every surface sharing it.
/// All claims sign with the same wallet.
#[derive(Debug, Clone, Default)]
pub struct ClaimGate(Arc<AtomicBool>);

impl ClaimGate {
    pub fn try_acquire(&self) -> Option<ClaimPermit> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(ClaimPermit(self.0.clone()))
    }

    pub fn is_held(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Held for the duration of a submission; dropping it reopens the gate.
#[derive(Debug)]
pub struct ClaimPermit(Arc<AtomicBool>);

impl Drop for ClaimPermit {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisabledReason {
    WalletDisconnected,
    AwaitingLookup,
    NoRecordFound,
    NothingToClaim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ClaimButton {
    Disabled(DisabledReason),
    Enabled,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    NotFound { query: String },
    LookupFailed { message: String },
    ClaimSucceeded { signature: String, explorer_url: String },
    ClaimFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub query: String,
    pub button: ClaimButton,
    pub claim: Option<ClaimSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    State(SessionView),
    Notification(Notification),
}

#[derive(Debug, Default)]
enum Lookup {
    #[default]
    Idle,
    Pending,
    Missing,
    Resolved(ResolvedClaim),
}

#[derive(Debug, Default)]
struct SessionState {
    generation: u64,
    query: String,
    lookup: Lookup,
    submitting: bool,
}

impl SessionState {
    fn button(&self, connected: bool) -> ClaimButton {
        if self.submitting {
            return ClaimButton::Submitting;
        }
        if !connected {
            return ClaimButton::Disabled(DisabledReason::WalletDisconnected);
        }
        match &self.lookup {
            Lookup::Idle | Lookup::Missing => ClaimButton::Disabled(DisabledReason::NoRecordFound),
            Lookup::Pending => ClaimButton::Disabled(DisabledReason::AwaitingLookup),
            Lookup::Resolved(claim) if claim.claimable() == 0 => {
                ClaimButton::Disabled(DisabledReason::NothingToClaim)
            }
            Lookup::Resolved(_) => ClaimButton::Enabled,
        }
    }
}

struct Shared<L> {
    caps: Capabilities<L>,
    gate: ClaimGate,
    state: Mutex<SessionState>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl<L> Shared<L> {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        // A poisoned lock only means a panic elsewhere; the state is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn view_of(&self, state: &SessionState) -> SessionView {
        let claim = match &state.lookup {
            Lookup::Resolved(claim) => Some(claim.summary(Utc::now())),
            _ => None,
        };
        SessionView {
            query: state.query.clone(),
            button: state.button(self.caps.ready().is_some()),
            claim,
        }
    }

    fn emit(&self, event: SessionEvent) {
        // The receiver is gone once the connection closes.
        let _ = self.events.send(event);
    }

    fn publish(&self, view: SessionView, notification: Option<Notification>) {
        self.emit(SessionEvent::State(view));
        if let Some(notification) = notification {
            self.emit(SessionEvent::Notification(notification));
        }
    }
}

pub struct ClaimSession<L> {
    shared: Arc<Shared<L>>,
    debouncer: Debouncer,
}

impl<L: Ledger> ClaimSession<L> {
    pub fn new(
        caps: Capabilities<L>,
        gate: ClaimGate,
        debounce: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let session = Self {
            shared: Arc::new(Shared {
                caps,
                gate,
                state: Mutex::new(SessionState::default()),
                events,
            }),
            debouncer: Debouncer::new(debounce),
        };
        (session, rx)
    }

    pub fn view(&self) -> SessionView {
        let state = self.shared.state();
        self.shared.view_of(&state)
    }

    /// Record a keystroke. The lookup runs once input has been quiet for the
    /// debounce delay.
    pub fn input(&mut self, text: impl Into<String>) {
        let text = text.into();
        let (generation, view) = {
            let mut state = self.shared.state();
            state.generation += 1;
            state.query = text.clone();
            state.lookup = if text.trim().is_empty() {
                Lookup::Idle
            } else {
                Lookup::Pending
            };
            (state.generation, self.shared.view_of(&state))
        };
        self.shared.publish(view, None);

        if text.trim().is_empty() {
            self.debouncer.cancel();
            return;
        }
        let shared = self.shared.clone();
        self.debouncer.schedule(resolve(shared, generation, text));
    }

    /// Submit a claim for the resolved company. Returns the submission task,
    /// or `None` when the button is not enabled or another claim sharing the
    /// gate is in flight.
    pub fn claim(&self) -> Option<JoinHandle<()>> {
        let (client, wallet) = self.shared.caps.ready()?;
        let (company_name, permit, view) = {
            let mut state = self.shared.state();
            if state.button(true) != ClaimButton::Enabled {
                debug!(button = ?state.button(true), "claim ignored");
                return None;
            }
            let Lookup::Resolved(claim) = &state.lookup else {
                return None;
            };
            let company_name = claim.company_name.clone();
            let Some(permit) = self.shared.gate.try_acquire() else {
                debug!(company = %company_name, "claim ignored, another claim is in flight");
                return None;
            };
            state.submitting = true;
            (company_name, permit, self.shared.view_of(&state))
        };
        self.shared.publish(view, None);

        let shared = self.shared.clone();
        Some(tokio::spawn(async move {
            let result = client.submit_claim(&wallet, &company_name).await;
            drop(permit);

            let (notification, refresh) = match result {
                Ok(signature) => {
                    let signature = signature.to_string();
                    let explorer_url = client.settings().explorer_tx_url(&signature);
                    (
                        Notification::ClaimSucceeded {
                            signature,
                            explorer_url,
                        },
                        true,
                    )
                }
                Err(err) => {
                    error!(company = %company_name, %err, "❌ claim failed");
                    (
                        Notification::ClaimFailed {
                            message: err.to_string(),
                        },
                        false,
                    )
                }
            };

            let (view, refresh) = {
                let mut state = shared.state();
                state.submitting = false;
                // A cleared input has nothing to refresh.
                let refresh = (refresh && !state.query.trim().is_empty())
                    .then(|| (state.generation, state.query.clone()));
                (shared.view_of(&state), refresh)
            };
            shared.publish(view, Some(notification));

            if let Some((generation, query)) = refresh {
                resolve(shared, generation, query).await;
            }
        }))
    }
}

async fn resolve<L: Ledger>(shared: Arc<Shared<L>>, generation: u64, query: String) {
    let Some((client, wallet)) = shared.caps.ready() else {
        debug!("lookup skipped, wallet or connection unavailable");
        return;
    };

    let outcome = client.lookup(&wallet.address(), &query).await;

    let (view, notification) = {
        let mut state = shared.state();
        if state.generation != generation {
            debug!(query = %query, "dropping stale lookup result");
            return;
        }
        let notification = match outcome {
            Ok(LookupOutcome::Found(claim)) => {
                state.lookup = Lookup::Resolved(claim);
                None
            }
            Ok(LookupOutcome::NotFound) => {
                state.lookup = Lookup::Missing;
                Some(Notification::NotFound { query })
            }
            Err(err) => {
                warn!(query = %query, %err, "lookup failed");
                state.lookup = Lookup::Missing;
                Some(Notification::LookupFailed {
                    message: err.to_string(),
                })
            }
        };
        (shared.view_of(&state), notification)
    };
    shared.publish(view, notification);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_admits_one_permit_until_dropped() {
        let gate = ClaimGate::default();
        let shared = gate.clone();

        let permit = gate.try_acquire().expect("gate starts open");
        assert!(shared.is_held());
        assert!(shared.try_acquire().is_none());

        drop(permit);
        assert!(!gate.is_held());
        assert!(shared.try_acquire().is_some());
    }
}
