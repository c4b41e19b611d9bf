//! Commit-Reveal Adapter
//!
//! Transport-agnostic protocol state machine. Each tick moves
//! `Uncommitted -> Committed -> Revealed`; the pending store holds the
//! `Committed` state. Transports only move bytes in and out of
//! [`CommitRevealAdapter::handle_json`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::game::action::Action;
use crate::game::bot::{Bot, BotError};
use crate::game::observation::Observation;
use crate::network::protocol::{
    BotRequest, BotResponse, CommitResponse, ProtocolError, RevealResponse,
};
use crate::proof::commitment::{commit_hash, generate_nonce};
use crate::proof::pending::{PendingEntry, PendingStore, Tick};

/// What to do with a reveal for a tick that has no pending commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealPolicy {
    /// Answer with no actions and an empty nonce.
    #[default]
    Lenient,
    /// Answer with an `unknown_tick` error.
    Strict,
}

/// Adapter configuration.
#[derive(Debug, Clone, Default)]
pub struct AdapterConfig {
    /// Handling of reveals without a commitment.
    pub reveal_policy: RevealPolicy,
}

/// Drives the commit/reveal protocol for one bot process.
pub struct CommitRevealAdapter {
    bot: Arc<dyn Bot>,
    store: Arc<PendingStore>,
    config: AdapterConfig,
}

impl CommitRevealAdapter {
    /// Create an adapter around a bot and a shared store.
    pub fn new(bot: Arc<dyn Bot>, store: Arc<PendingStore>, config: AdapterConfig) -> Self {
        Self { bot, store, config }
    }

    /// Create an adapter with a private store and default configuration.
    pub fn with_bot(bot: Arc<dyn Bot>) -> Self {
        Self::new(bot, Arc::new(PendingStore::new()), AdapterConfig::default())
    }

    /// The store backing this adapter.
    pub fn store(&self) -> &Arc<PendingStore> {
        &self.store
    }

    /// Name of the bot being driven.
    pub fn bot_name(&self) -> &str {
        self.bot.name()
    }

    /// Commit phase: decide, draw a nonce, record, and disclose only the digest.
    ///
    /// A failing bot leaves the store untouched.
    pub fn commit(&self, tick: Tick, observation: &Observation) -> Result<CommitResponse, ProtocolError> {
        let actions = self
            .decide(observation)
            .map_err(|source| ProtocolError::BotFailed { tick, source })?;

        let nonce = generate_nonce();
        let commit = commit_hash(&actions, &nonce)
            .map_err(|e| ProtocolError::Internal(e.to_string()))?;

        let kinds: Vec<&str> = actions.iter().map(Action::kind).collect();
        debug!(tick, actions = ?kinds, "committed");
        self.store.put(tick, actions, nonce);

        Ok(CommitResponse { tick, commit })
    }

    /// Reveal phase: hand back the actions and nonce behind the commitment.
    pub fn reveal(&self, tick: Tick) -> Result<RevealResponse, ProtocolError> {
        let entry = match self.store.take(tick) {
            Some(entry) => entry,
            None => match self.config.reveal_policy {
                RevealPolicy::Lenient => {
                    debug!(tick, "reveal without commitment, answering empty");
                    PendingEntry::empty(tick)
                }
                RevealPolicy::Strict => {
                    warn!(tick, "reveal without commitment rejected");
                    return Err(ProtocolError::UnknownTick(tick));
                }
            },
        };

        debug!(tick, count = entry.actions.len(), "revealed");
        Ok(RevealResponse { tick, actions: entry.actions, nonce: entry.nonce })
    }

    /// Dispatch a parsed request.
    pub fn handle(&self, request: BotRequest) -> Result<BotResponse, ProtocolError> {
        match request {
            BotRequest::Commit(req) => self.commit(req.tick, &req.observation).map(BotResponse::Commit),
            BotRequest::Reveal(req) => self.reveal(req.tick).map(BotResponse::Reveal),
        }
    }

    /// Parse and dispatch one JSON message; errors become error responses.
    pub fn handle_json(&self, text: &str) -> BotResponse {
        match BotRequest::from_json(text).and_then(|request| self.handle(request)) {
            Ok(response) => response,
            Err(err) => {
                match &err {
                    ProtocolError::BotFailed { .. } | ProtocolError::Internal(_) => {
                        warn!(error = %err, "request failed")
                    }
                    _ => debug!(error = %err, "request rejected"),
                }
                BotResponse::Error(err.to_response())
            }
        }
    }

    /// Run the bot, turning panics into errors.
    fn decide(&self, observation: &Observation) -> Result<Vec<Action>, BotError> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.bot.decide(observation))) {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(BotError::Panicked(message))
            }
        }
    }
}

impl std::fmt::Debug for CommitRevealAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitRevealAdapter")
            .field("bot", &self.bot.name())
            .field("pending", &self.store.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Log the adapter setup once at startup.
pub fn log_startup(adapter: &CommitRevealAdapter, transport: &str) {
    info!(
        bot = adapter.bot_name(),
        transport,
        reveal_policy = ?adapter.config.reveal_policy,
        "bot adapter ready"
    );
}

// =============================================================================
// TESTS
// =============================================================================
