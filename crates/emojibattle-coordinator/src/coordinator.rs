//! The match coordinator: the concurrency boundary of the engine.
//!
//! ## Serialization
//!
//! Every resident match has a [`MatchSlot`] holding its authoritative
//! [`Match`] behind an async mutex (the serialization unit) and the latest
//! published [`MatchSnapshot`] behind a `watch` channel. Mutations hold the
//! unit; reads only borrow the published snapshot and never wait on writers.
//! Slots live in a concurrent map, so different matches never contend. A
//! match leaves the map once it is complete or abandoned; the store remains
//! its source of truth.
//!
//! ## Mutation protocol
//!
//! ```text
//! ledger hit? ──yes──▶ replay stored outcome
//!     │ no
//!     ▼
//! lock unit ─▶ ledger hit? ──yes──▶ replay (lost a same-key race)
//!     │ no
//!     ▼
//! apply to working copy ─▶ CAS-append event ─▶ swap state ─▶ publish ─▶ ledger
//! ```
//!
//! A domain rejection never touches the match. It is ledgered only after
//! the store head confirms the rejection was computed on current state;
//! otherwise the trail is reloaded and the command re-applied. A store
//! failure discards the working copy and is not ledgered, so a retry with the
//! same key evaluates afresh. A lost compare-and-swap reloads the trail from
//! the store and tries again.

use std::sync::Arc;

use dashmap::DashMap;
use emojibattle_engine::{Command, Match, RuleSet};
use emojibattle_types::{
    EngineConfig, Event, IdempotencyKey, MatchError, MatchId, MatchSnapshot, OperationKind,
    OperationReceipt, PlayerId, RequestId, Result, StoreError, Symbol, constants,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};

use crate::error_journal::{ErrorJournal, ErrorRecord};
use crate::idempotency::{IdempotencyLedger, LedgerEntry, LedgerKey};
use crate::store::EventStore;

/// Request to take the second seat of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub request_id: RequestId,
    pub match_id: MatchId,
    pub player: PlayerId,
    pub idempotency_key: IdempotencyKey,
}

/// Request to submit a symbol for the current round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickRequest {
    pub request_id: RequestId,
    pub match_id: MatchId,
    pub player: PlayerId,
    pub symbol: Symbol,
    pub idempotency_key: IdempotencyKey,
    /// Optional guard: reject with `Conflict` unless this is the current round.
    #[serde(default)]
    pub round: Option<u32>,
}

/// Request to cancel a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbandonRequest {
    pub request_id: RequestId,
    pub match_id: MatchId,
    pub player: PlayerId,
    pub idempotency_key: IdempotencyKey,
}

/// Per-match serialization unit and published view.
struct MatchSlot {
    unit: Mutex<Match>,
    published: watch::Sender<Arc<MatchSnapshot>>,
}

impl MatchSlot {
    fn new(state: Match) -> Self {
        let (published, _) = watch::channel(Arc::new(state.snapshot()));
        Self {
            unit: Mutex::new(state),
            published,
        }
    }

    fn publish(&self, snapshot: MatchSnapshot) {
        self.published.send_replace(Arc::new(snapshot));
    }
}

/// Serializes and deduplicates all operations on matches.
///
/// Collaborators are injected: the rule set, the event store, and the
/// configuration. Nothing is read from ambient process state.
pub struct MatchCoordinator {
    rules: Arc<RuleSet>,
    store: Arc<dyn EventStore>,
    config: EngineConfig,
    matches: DashMap<MatchId, Arc<MatchSlot>>,
    ledger: IdempotencyLedger,
    errors: ErrorJournal,
}

impl MatchCoordinator {
    /// # Errors
    /// [`MatchError::Configuration`] if `config` does not validate.
    pub fn new(
        rules: Arc<RuleSet>,
        store: Arc<dyn EventStore>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            symbols = rules.symbols().len(),
            best_of = config.best_of,
            "Match coordinator ready"
        );
        Ok(Self {
            ledger: IdempotencyLedger::new(config.ledger_capacity),
            errors: ErrorJournal::new(config.error_journal_capacity),
            rules,
            store,
            config,
            matches: DashMap::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    #[must_use]
    pub fn ledger(&self) -> &IdempotencyLedger {
        &self.ledger
    }

    /// Number of unfinished matches held in memory.
    #[must_use]
    pub fn resident_matches(&self) -> usize {
        self.matches.len()
    }

    /// Up to `limit` most recent rejected requests, newest first.
    #[must_use]
    pub fn recent_errors(&self, limit: usize) -> Vec<ErrorRecord> {
        self.errors.recent(limit)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Create a match with `player` in the first seat.
    ///
    /// Not idempotent: every call creates a distinct match.
    pub async fn create_match(
        &self,
        request_id: &RequestId,
        player: PlayerId,
    ) -> Result<MatchSnapshot> {
        let result = self.create_inner(request_id, player).await;
        if let Err(err) = &result {
            self.journal(request_id, None, Some(OperationKind::Create), err);
        }
        result
    }

    async fn create_inner(&self, request_id: &RequestId, player: PlayerId) -> Result<MatchSnapshot> {
        let (state, transition) = Match::create(player)?;
        let event = transition.to_event(&state, None, request_id.clone());
        self.append(&event).await?;

        let snapshot = state.snapshot();
        let match_id = state.id();
        self.matches.insert(match_id, Arc::new(MatchSlot::new(state)));
        tracing::info!(
            request_id = %request_id,
            match_id = %match_id,
            player = %snapshot.players[0],
            "Match created"
        );
        Ok(snapshot)
    }

    /// Take the second seat.
    pub async fn join_match(&self, request: JoinRequest) -> Result<OperationReceipt> {
        let command = Command::Join {
            player: request.player,
        };
        self.mutate(
            &request.request_id,
            request.match_id,
            request.idempotency_key,
            command,
        )
        .await
    }

    /// Submit a pick; resolves the round when it is the second pick.
    pub async fn submit_pick(&self, request: PickRequest) -> Result<OperationReceipt> {
        let command = Command::Pick {
            player: request.player,
            symbol: request.symbol,
            round: request.round,
        };
        self.mutate(
            &request.request_id,
            request.match_id,
            request.idempotency_key,
            command,
        )
        .await
    }

    /// Cancel a match on behalf of a seated player.
    pub async fn abandon_match(&self, request: AbandonRequest) -> Result<OperationReceipt> {
        let command = Command::Abandon {
            player: request.player,
        };
        self.mutate(
            &request.request_id,
            request.match_id,
            request.idempotency_key,
            command,
        )
        .await
    }

    /// Latest published snapshot. Never waits for an in-flight mutation.
    pub async fn get_match_state(
        &self,
        request_id: &RequestId,
        match_id: MatchId,
    ) -> Result<MatchSnapshot> {
        match self.slot(match_id).await {
            Ok(slot) => Ok(slot.published.borrow().as_ref().clone()),
            Err(err) => {
                self.journal(request_id, Some(match_id), None, &err);
                Err(err)
            }
        }
    }

    /// Subscribe to every snapshot published for a match from now on.
    pub async fn subscribe(&self, match_id: MatchId) -> Result<watch::Receiver<Arc<MatchSnapshot>>> {
        Ok(self.slot(match_id).await?.published.subscribe())
    }

    // -----------------------------------------------------------------------
    // Mutation pipeline
    // -----------------------------------------------------------------------

    async fn mutate(
        &self,
        request_id: &RequestId,
        match_id: MatchId,
        idempotency_key: IdempotencyKey,
        command: Command,
    ) -> Result<OperationReceipt> {
        let operation = command.kind();
        let result = self
            .mutate_inner(request_id, match_id, idempotency_key, &command)
            .await;
        if let Err(err) = &result {
            self.journal(request_id, Some(match_id), Some(operation), err);
        }
        result
    }

    async fn mutate_inner(
        &self,
        request_id: &RequestId,
        match_id: MatchId,
        idempotency_key: IdempotencyKey,
        command: &Command,
    ) -> Result<OperationReceipt> {
        if idempotency_key.is_blank() {
            return Err(MatchError::invalid_input("idempotency key must not be empty"));
        }
        if command.player().is_blank() {
            return Err(MatchError::invalid_input("player id must not be empty"));
        }

        let key = LedgerKey::new(
            match_id,
            command.player().clone(),
            command.kind(),
            idempotency_key,
        );
        if let Some(entry) = self.replay(&key, request_id) {
            return entry;
        }

        let slot = self.slot(match_id).await?;
        let mut state = slot.unit.lock().await;

        // A same-key request may have finished while we waited on the unit.
        if let Some(entry) = self.replay(&key, request_id) {
            return entry;
        }

        let outcome = self
            .apply_locked(&slot, &mut state, command, &key, request_id)
            .await;
        match &outcome {
            Ok(receipt) => {
                self.ledger.record(key, Ok(receipt.clone()));
            }
            Err(err) if err.is_ledgered() => {
                self.ledger.record(key, Err(err.clone()));
            }
            Err(_) => {}
        }
        if let Ok(receipt) = &outcome {
            if receipt.snapshot.is_terminal() {
                // Terminal matches accept no more transitions; reads reload them.
                self.matches
                    .remove_if(&match_id, |_, resident| Arc::ptr_eq(resident, &slot));
                tracing::info!(
                    request_id = %request_id,
                    match_id = %match_id,
                    status = %receipt.snapshot.status,
                    winner = ?receipt.snapshot.winner,
                    "Match finished"
                );
            }
        }
        drop(state);
        outcome
    }

    fn replay(&self, key: &LedgerKey, request_id: &RequestId) -> Option<LedgerEntry> {
        let entry = self.ledger.lookup(key)?;
        tracing::debug!(
            request_id = %request_id,
            match_id = %key.match_id,
            player = %key.player,
            operation = %key.operation,
            key = %key.key,
            "Idempotent replay"
        );
        Some(entry)
    }

    /// Apply `command` while holding the unit. `state` is only replaced once
    /// the event is durably appended, and a rejection is only returned once
    /// the store confirms `state` is current.
    async fn apply_locked(
        &self,
        slot: &MatchSlot,
        state: &mut Match,
        command: &Command,
        key: &LedgerKey,
        request_id: &RequestId,
    ) -> Result<OperationReceipt> {
        let mut attempts = 0;
        loop {
            let mut working = state.clone();
            let transition = match working.apply(command, &self.rules, &self.config) {
                Ok(transition) => transition,
                Err(err) => {
                    let head = self.head(key.match_id).await?;
                    if head == state.version() {
                        return Err(err);
                    }
                    if attempts >= self.config.cas_retry_limit {
                        return Err(MatchError::unavailable(format!(
                            "match {} kept moving while re-checking a rejection",
                            key.match_id
                        )));
                    }
                    attempts += 1;
                    tracing::warn!(
                        request_id = %request_id,
                        match_id = %key.match_id,
                        local_version = state.version(),
                        store_version = head,
                        attempt = attempts,
                        "Rejection against stale state, reloading from store"
                    );
                    if let Some(entry) = self.reload(slot, state, key, request_id).await? {
                        return entry;
                    }
                    continue;
                }
            };
            let event = transition.to_event(&working, Some(key.key.clone()), request_id.clone());

            match self.append(&event).await {
                Ok(()) => {
                    let receipt = transition.receipt(&working);
                    *state = working;
                    slot.publish(receipt.snapshot.clone());
                    tracing::info!(
                        request_id = %request_id,
                        match_id = %key.match_id,
                        player = %key.player,
                        event = %event.kind(),
                        version = event.sequence,
                        status = %event.status_after,
                        "Transition accepted"
                    );
                    return Ok(receipt);
                }
                Err(StoreError::VersionConflict { actual, .. })
                    if attempts < self.config.cas_retry_limit =>
                {
                    attempts += 1;
                    tracing::warn!(
                        request_id = %request_id,
                        match_id = %key.match_id,
                        local_version = state.version(),
                        store_version = actual,
                        attempt = attempts,
                        "Stale match state, reloading from store"
                    );
                    if let Some(entry) = self.reload(slot, state, key, request_id).await? {
                        return entry;
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        request_id = %request_id,
                        match_id = %key.match_id,
                        error = %err,
                        "Event append failed, transition discarded"
                    );
                    return Err(err.into());
                }
            }
        }
    }

    /// Replace `state` with the stored trail and republish. Returns the
    /// ledgered outcome if the reload shows `key` was already applied.
    async fn reload(
        &self,
        slot: &MatchSlot,
        state: &mut Match,
        key: &LedgerKey,
        request_id: &RequestId,
    ) -> Result<Option<LedgerEntry>> {
        *state = self.restore(key.match_id).await?;
        slot.publish(state.snapshot());
        Ok(self.replay(key, request_id))
    }

    /// Latest stored sequence, bounded like an append.
    async fn head(&self, match_id: MatchId) -> Result<u64> {
        tokio::time::timeout(self.config.append_timeout, self.store.head(&match_id))
            .await
            .map_err(|_| MatchError::unavailable(format!("reading head of {match_id} timed out")))?
            .map_err(MatchError::from)
    }

    /// Append with the configured upper bound on latency.
    async fn append(&self, event: &Event) -> std::result::Result<(), StoreError> {
        match tokio::time::timeout(self.config.append_timeout, self.store.append(event)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Unavailable(format!(
                "append of {} #{} timed out after {:?}",
                event.match_id, event.sequence, self.config.append_timeout
            ))),
        }
    }

    /// The resident slot for a match, loading it from the store if needed.
    ///
    /// Finished matches are loaded but not kept resident.
    async fn slot(&self, match_id: MatchId) -> Result<Arc<MatchSlot>> {
        if let Some(slot) = self.matches.get(&match_id).map(|s| Arc::clone(s.value())) {
            return Ok(slot);
        }

        let state = self.restore(match_id).await?;
        let terminal = state.status().is_terminal();
        let slot = Arc::new(MatchSlot::new(state));
        if terminal {
            return Ok(slot);
        }
        // Another task may have loaded the same match meanwhile; keep the first.
        Ok(Arc::clone(self.matches.entry(match_id).or_insert(slot).value()))
    }

    /// Rebuild a match from the store, re-ledgering every keyed transition.
    async fn restore(&self, match_id: MatchId) -> Result<Match> {
        let events = tokio::time::timeout(self.config.append_timeout, self.store.load(&match_id))
            .await
            .map_err(|_| MatchError::unavailable(format!("loading {match_id} timed out")))??;
        if events.is_empty() {
            return Err(MatchError::NotFound(match_id));
        }

        let mut restored = 0usize;
        let state = Match::replay_with(&events, &self.rules, &self.config, |event, receipt| {
            let Some(idempotency_key) = &event.idempotency_key else {
                return;
            };
            let Some(command) = Command::from_payload(&event.payload) else {
                return;
            };
            let key = LedgerKey::new(
                match_id,
                command.player().clone(),
                command.kind(),
                idempotency_key.clone(),
            );
            if self.ledger.record(key, Ok(receipt)) {
                restored += 1;
            }
        })?;

        tracing::debug!(
            match_id = %match_id,
            version = state.version(),
            events = events.len(),
            ledger_restored = restored,
            "Match loaded from store"
        );
        Ok(state)
    }

    fn journal(
        &self,
        request_id: &RequestId,
        match_id: Option<MatchId>,
        operation: Option<OperationKind>,
        err: &MatchError,
    ) {
        if err.is_retryable() {
            tracing::warn!(request_id = %request_id, match_id = ?match_id, error = %err, "Request failed");
        } else {
            tracing::debug!(request_id = %request_id, match_id = ?match_id, error = %err, "Request rejected");
        }
        self.errors.record(request_id, match_id, operation, err);
    }
}
