//! The match state machine.
//!
//! A [`Match`] owns one match's roster, current round, pending picks,
//! round history, and winner. Every accepted command bumps `version` by
//! exactly one and yields a [`Transition`] from which the caller builds the
//! single [`Event`] for that mutation. Rejected commands return an error and
//! leave the match untouched: all checks run before the first write.

use chrono::Utc;
use emojibattle_types::{
    EngineConfig, Event, EventPayload, IdempotencyKey, MatchError, MatchId, MatchSnapshot,
    MatchStatus, OperationKind, OperationReceipt, Outcome, PlayerId, PlayerPick, RequestId,
    Result, RoundRecord, Symbol, constants,
};

use crate::RuleSet;

/// A mutating request against an existing match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Join {
        player: PlayerId,
    },
    Pick {
        player: PlayerId,
        symbol: Symbol,
        /// Round the caller believes is current. `None` means "whatever is current".
        round: Option<u32>,
    },
    Abandon {
        player: PlayerId,
    },
}

impl Command {
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Join { .. } => OperationKind::Join,
            Self::Pick { .. } => OperationKind::Pick,
            Self::Abandon { .. } => OperationKind::Abandon,
        }
    }

    #[must_use]
    pub fn player(&self) -> &PlayerId {
        match self {
            Self::Join { player } | Self::Pick { player, .. } | Self::Abandon { player } => player,
        }
    }

    /// The command that reproduces a recorded transition, if it is not a creation.
    #[must_use]
    pub fn from_payload(payload: &EventPayload) -> Option<Self> {
        match payload {
            EventPayload::MatchCreated { .. } => None,
            EventPayload::PlayerJoined { player } => Some(Self::Join {
                player: player.clone(),
            }),
            EventPayload::PickSubmitted {
                player,
                round,
                symbol,
                ..
            } => Some(Self::Pick {
                player: player.clone(),
                symbol: symbol.clone(),
                round: Some(*round),
            }),
            EventPayload::MatchAbandoned { player } => Some(Self::Abandon {
                player: player.clone(),
            }),
        }
    }
}

/// What an accepted command changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub payload: EventPayload,
    /// Set when the command resolved a round.
    pub resolved_round: Option<RoundRecord>,
}

impl Transition {
    /// Build the event recording this transition on `state` (already applied).
    #[must_use]
    pub fn to_event(
        &self,
        state: &Match,
        idempotency_key: Option<IdempotencyKey>,
        request_id: RequestId,
    ) -> Event {
        Event {
            match_id: state.id,
            sequence: state.version,
            payload: self.payload.clone(),
            status_after: state.status,
            idempotency_key,
            request_id,
            recorded_at: Utc::now(),
        }
    }

    /// The response handed back (and ledgered) for this transition.
    #[must_use]
    pub fn receipt(&self, state: &Match) -> OperationReceipt {
        OperationReceipt {
            snapshot: state.snapshot(),
            resolved_round: self.resolved_round.clone(),
        }
    }
}

/// One match's full state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    id: MatchId,
    status: MatchStatus,
    /// Seated players in slot order.
    players: Vec<PlayerId>,
    current_round: u32,
    /// Picks recorded for `current_round`, in arrival order.
    pending: Vec<PlayerPick>,
    rounds: Vec<RoundRecord>,
    winner: Option<PlayerId>,
    version: u64,
}

impl Match {
    /// Allocate a new match with `player` in slot 0.
    ///
    /// # Errors
    /// [`MatchError::InvalidInput`] if `player` is blank.
    pub fn create(player: PlayerId) -> Result<(Self, Transition)> {
        Self::create_with_id(MatchId::new(), player)
    }

    /// Like [`Match::create`] with a caller-chosen id (replay).
    pub fn create_with_id(id: MatchId, player: PlayerId) -> Result<(Self, Transition)> {
        ensure_player(&player)?;
        let state = Self {
            id,
            status: MatchStatus::AwaitingSecondPlayer,
            players: vec![player.clone()],
            current_round: 1,
            pending: Vec::new(),
            rounds: Vec::new(),
            winner: None,
            version: 1,
        };
        let transition = Transition {
            payload: EventPayload::MatchCreated { player },
            resolved_round: None,
        };
        Ok((state, transition))
    }

    #[must_use]
    pub fn id(&self) -> MatchId {
        self.id
    }

    #[must_use]
    pub fn status(&self) -> MatchStatus {
        self.status
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    #[must_use]
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    #[must_use]
    pub fn winner(&self) -> Option<&PlayerId> {
        self.winner.as_ref()
    }

    fn slot_of(&self, player: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p == player)
    }

    /// Apply any mutating command.
    pub fn apply(
        &mut self,
        command: &Command,
        rules: &RuleSet,
        config: &EngineConfig,
    ) -> Result<Transition> {
        match command {
            Command::Join { player } => self.join(player),
            Command::Pick {
                player,
                symbol,
                round,
            } => self.submit_pick(player, symbol, *round, rules, config),
            Command::Abandon { player } => self.abandon(player),
        }
    }

    /// Seat `player` in slot 1 and start the match.
    ///
    /// # Errors
    /// - `InvalidInput` if `player` is blank
    /// - `InvalidState` if the match is terminal or already full
    /// - `Conflict` if `player` already occupies slot 0
    pub fn join(&mut self, player: &PlayerId) -> Result<Transition> {
        ensure_player(player)?;
        if self.status.is_terminal() {
            return Err(MatchError::invalid_state(self.status, "match is over"));
        }
        if self.status != MatchStatus::AwaitingSecondPlayer
            || self.players.len() >= constants::MAX_PLAYERS
        {
            return Err(MatchError::invalid_state(self.status, "match already has two players"));
        }
        if self.slot_of(player).is_some() {
            return Err(MatchError::conflict(format!(
                "player {player} already occupies this match"
            )));
        }

        self.players.push(player.clone());
        self.status = MatchStatus::InProgress;
        self.version += 1;
        Ok(Transition {
            payload: EventPayload::PlayerJoined {
                player: player.clone(),
            },
            resolved_round: None,
        })
    }

    /// Record a pick and, if it is the second of the round, resolve the round.
    ///
    /// # Errors
    /// - `InvalidInput` if `player` is blank or `symbol` is not in the rule set
    /// - `InvalidState` unless the match is in progress
    /// - `Forbidden` if `player` is not seated
    /// - `Conflict` if `player` already picked this round, or `round` is stale
    pub fn submit_pick(
        &mut self,
        player: &PlayerId,
        symbol: &Symbol,
        round: Option<u32>,
        rules: &RuleSet,
        config: &EngineConfig,
    ) -> Result<Transition> {
        ensure_player(player)?;
        if self.status != MatchStatus::InProgress {
            return Err(MatchError::invalid_state(self.status, "match is not accepting picks"));
        }
        if !rules.contains(symbol) {
            return Err(MatchError::invalid_input(format!("unknown symbol {symbol:?}")));
        }
        let slot = self
            .slot_of(player)
            .ok_or_else(|| MatchError::forbidden(format!("player {player} is not seated")))?;
        if let Some(round) = round {
            if round != self.current_round {
                return Err(MatchError::conflict(format!(
                    "round {round} is not the current round {}",
                    self.current_round
                )));
            }
        }
        if self.pending.iter().any(|p| &p.player == player) {
            return Err(MatchError::conflict(format!(
                "player {player} already picked in round {}",
                self.current_round
            )));
        }

        let pick = PlayerPick {
            player: player.clone(),
            symbol: symbol.clone(),
        };
        let resolution = match self.pending.first() {
            Some(other) if slot == 0 => Some(self.resolve_round(pick.clone(), other.clone(), rules)?),
            Some(other) => Some(self.resolve_round(other.clone(), pick.clone(), rules)?),
            None => None,
        };

        let picked_round = self.current_round;
        self.version += 1;
        match &resolution {
            Some(record) => {
                self.pending.clear();
                self.rounds.push(record.clone());
                self.status = MatchStatus::RoundResolved;
                tracing::debug!(
                    match_id = %self.id,
                    round = record.round,
                    outcome = %record.outcome,
                    winner = ?record.winner,
                    "Round resolved"
                );
                self.advance(config);
            }
            None => self.pending.push(pick),
        }

        Ok(Transition {
            payload: EventPayload::PickSubmitted {
                player: player.clone(),
                round: picked_round,
                symbol: symbol.clone(),
                resolution: resolution.clone(),
            },
            resolved_round: resolution,
        })
    }

    /// Cancel the match on behalf of a seated player.
    ///
    /// # Errors
    /// - `InvalidInput` if `player` is blank
    /// - `InvalidState` if the match is already terminal
    /// - `Forbidden` if `player` is not seated
    pub fn abandon(&mut self, player: &PlayerId) -> Result<Transition> {
        ensure_player(player)?;
        if self.status.is_terminal() {
            return Err(MatchError::invalid_state(self.status, "match is over"));
        }
        if self.slot_of(player).is_none() {
            return Err(MatchError::forbidden(format!("player {player} is not seated")));
        }

        self.pending.clear();
        self.status = MatchStatus::Abandoned;
        self.version += 1;
        tracing::debug!(match_id = %self.id, player = %player, "Match abandoned");
        Ok(Transition {
            payload: EventPayload::MatchAbandoned {
                player: player.clone(),
            },
            resolved_round: None,
        })
    }

    fn resolve_round(
        &self,
        first: PlayerPick,
        second: PlayerPick,
        rules: &RuleSet,
    ) -> Result<RoundRecord> {
        let outcome = rules.resolve(&first.symbol, &second.symbol)?;
        let winner = match outcome {
            Outcome::WinA => Some(first.player.clone()),
            Outcome::WinB => Some(second.player.clone()),
            Outcome::Draw => None,
        };
        Ok(RoundRecord {
            round: self.current_round,
            first,
            second,
            outcome,
            winner,
        })
    }

    /// Leave `RoundResolved`: complete the match or open the next round.
    fn advance(&mut self, config: &EngineConfig) {
        let wins: Vec<usize> = self
            .players
            .iter()
            .map(|p| self.rounds.iter().filter(|r| r.winner.as_ref() == Some(p)).count())
            .collect();
        let needed = config.wins_needed() as usize;
        let played = self.rounds.len();

        let decided = if let Some(slot) = wins.iter().position(|&w| w >= needed) {
            Some(Some(slot))
        } else if played >= config.best_of as usize {
            // Rounds exhausted without a majority: more round wins takes it.
            Some(match wins[0].cmp(&wins[1]) {
                std::cmp::Ordering::Greater => Some(0),
                std::cmp::Ordering::Less => Some(1),
                std::cmp::Ordering::Equal => None,
            })
        } else {
            None
        };

        match decided {
            Some(slot) => {
                self.status = MatchStatus::Complete;
                self.winner = slot.map(|s| self.players[s].clone());
                tracing::debug!(
                    match_id = %self.id,
                    winner = ?self.winner,
                    rounds = played,
                    "Match complete"
                );
            }
            None => {
                self.current_round += 1;
                self.status = MatchStatus::InProgress;
            }
        }
    }

    /// Read-only view. Pending symbols stay hidden.
    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            match_id: self.id,
            status: self.status,
            players: self.players.clone(),
            current_round: self.current_round,
            picked_this_round: self.pending.iter().map(|p| p.player.clone()).collect(),
            rounds: self.rounds.clone(),
            winner: self.winner.clone(),
            version: self.version,
        }
    }

    /// Rebuild a match from its ordered event trail.
    pub fn replay(events: &[Event], rules: &RuleSet, config: &EngineConfig) -> Result<Self> {
        Self::replay_with(events, rules, config, |_, _| {})
    }

    /// Rebuild a match, reporting each replayed transition's receipt.
    ///
    /// # Errors
    /// [`MatchError::Unavailable`] if the trail is empty, does not start with
    /// a creation, has a sequence gap or foreign event, or disagrees with what
    /// `rules` computes.
    pub fn replay_with(
        events: &[Event],
        rules: &RuleSet,
        config: &EngineConfig,
        mut on_event: impl FnMut(&Event, OperationReceipt),
    ) -> Result<Self> {
        let corrupt = |id: MatchId, reason: String| {
            MatchError::unavailable(format!("event trail for {id} is corrupt: {reason}"))
        };

        let Some((first, rest)) = events.split_first() else {
            return Err(MatchError::unavailable("cannot replay an empty event trail"));
        };
        let EventPayload::MatchCreated { player } = &first.payload else {
            return Err(corrupt(first.match_id, format!("starts with {}", first.kind())));
        };
        if first.sequence != 1 {
            return Err(corrupt(first.match_id, format!("starts at sequence {}", first.sequence)));
        }
        let (mut state, transition) = Self::create_with_id(first.match_id, player.clone())
            .map_err(|e| corrupt(first.match_id, e.to_string()))?;
        on_event(first, transition.receipt(&state));

        for event in rest {
            if event.match_id != state.id {
                return Err(corrupt(state.id, format!("contains event of {}", event.match_id)));
            }
            if event.sequence != state.version + 1 {
                return Err(corrupt(
                    state.id,
                    format!("expected sequence {}, found {}", state.version + 1, event.sequence),
                ));
            }
            let command = Command::from_payload(&event.payload)
                .ok_or_else(|| corrupt(state.id, format!("repeated creation at {}", event.sequence)))?;
            let transition = state
                .apply(&command, rules, config)
                .map_err(|e| corrupt(state.id, e.to_string()))?;
            if transition.payload != event.payload || state.status != event.status_after {
                return Err(corrupt(
                    state.id,
                    format!("sequence {} does not reproduce under the active rules", event.sequence),
                ));
            }
            on_event(event, transition.receipt(&state));
        }

        tracing::debug!(match_id = %state.id, version = state.version, "Match replayed");
        Ok(state)
    }
}

fn ensure_player(player: &PlayerId) -> Result<()> {
    if player.is_blank() {
        return Err(MatchError::invalid_input("player id must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    fn s(s: &str) -> Symbol {
        Symbol::new(s)
    }

    fn started() -> Match {
        let (mut m, _) = Match::create(p("p1")).unwrap();
        m.join(&p("p2")).unwrap();
        m
    }

    fn play_round(m: &mut Match, a: &str, b: &str) -> Transition {
        let rules = RuleSet::classic();
        let cfg = EngineConfig::default();
        m.submit_pick(&p("p1"), &s(a), None, &rules, &cfg).unwrap();
        m.submit_pick(&p("p2"), &s(b), None, &rules, &cfg).unwrap()
    }

    #[test]
    fn create_seats_first_player() {
        let (m, t) = Match::create(p("p1")).unwrap();
        assert_eq!(m.status(), MatchStatus::AwaitingSecondPlayer);
        assert_eq!(m.players(), &[p("p1")]);
        assert_eq!(m.current_round(), 1);
        assert_eq!(m.version(), 1);
        assert_eq!(t.payload, EventPayload::MatchCreated { player: p("p1") });
    }

    #[test]
    fn create_rejects_blank_player() {
        let err = Match::create(p("")).unwrap_err();
        assert!(matches!(err, MatchError::InvalidInput { .. }));
    }

    #[test]
    fn join_starts_match() {
        let m = started();
        assert_eq!(m.status(), MatchStatus::InProgress);
        assert_eq!(m.players(), &[p("p1"), p("p2")]);
        assert_eq!(m.version(), 2);
    }

    #[test]
    fn join_by_occupant_conflicts() {
        let (mut m, _) = Match::create(p("p1")).unwrap();
        let err = m.join(&p("p1")).unwrap_err();
        assert!(matches!(err, MatchError::Conflict { .. }));
        assert_eq!(m.version(), 1);
    }

    #[test]
    fn third_player_gets_invalid_state() {
        let mut m = started();
        let err = m.join(&p("p3")).unwrap_err();
        assert!(matches!(
            err,
            MatchError::InvalidState { status: MatchStatus::InProgress, .. }
        ));
        assert_eq!(m.version(), 2);
    }

    #[test]
    fn pick_before_opponent_joins_is_invalid_state() {
        let (mut m, _) = Match::create(p("p1")).unwrap();
        let err = m
            .submit_pick(&p("p1"), &s("rock"), None, &RuleSet::classic(), &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, MatchError::InvalidState { .. }));
    }

    #[test]
    fn unknown_symbol_changes_nothing() {
        let mut m = started();
        let before = m.clone();
        let err = m
            .submit_pick(&p("p1"), &s("dynamite"), None, &RuleSet::classic(), &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, MatchError::InvalidInput { .. }));
        assert_eq!(m, before);
    }

    #[test]
    fn unseated_player_forbidden() {
        let mut m = started();
        let err = m
            .submit_pick(&p("p3"), &s("rock"), None, &RuleSet::classic(), &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, MatchError::Forbidden { .. }));
    }

    #[test]
    fn duplicate_pick_conflicts() {
        let mut m = started();
        let rules = RuleSet::classic();
        let cfg = EngineConfig::default();
        m.submit_pick(&p("p1"), &s("rock"), None, &rules, &cfg).unwrap();
        let err = m.submit_pick(&p("p1"), &s("paper"), None, &rules, &cfg).unwrap_err();
        assert!(matches!(err, MatchError::Conflict { .. }));
        assert_eq!(m.version(), 3);
        assert_eq!(m.snapshot().picked_this_round, vec![p("p1")]);
    }

    #[test]
    fn stale_round_conflicts() {
        let mut m = started();
        play_round(&mut m, "rock", "rock");
        let err = m
            .submit_pick(&p("p1"), &s("rock"), Some(1), &RuleSet::classic(), &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, MatchError::Conflict { .. }));
    }

    #[test]
    fn draw_advances_round_without_winner() {
        let mut m = started();
        let t = play_round(&mut m, "rock", "rock");
        let record = t.resolved_round.unwrap();
        assert_eq!(record.outcome, Outcome::Draw);
        assert_eq!(record.winner, None);
        assert_eq!(m.current_round(), 2);
        assert_eq!(m.status(), MatchStatus::InProgress);
        assert_eq!(m.winner(), None);
    }

    #[test]
    fn slot_order_holds_when_second_player_picks_first() {
        let mut m = started();
        let rules = RuleSet::classic();
        let cfg = EngineConfig::default();
        m.submit_pick(&p("p2"), &s("scissors"), None, &rules, &cfg).unwrap();
        let t = m.submit_pick(&p("p1"), &s("rock"), None, &rules, &cfg).unwrap();
        let record = t.resolved_round.unwrap();
        assert_eq!(record.first.player, p("p1"));
        assert_eq!(record.outcome, Outcome::WinA);
        assert_eq!(record.winner, Some(p("p1")));
    }

    #[test]
    fn best_of_three_scenario() {
        let mut m = started();
        play_round(&mut m, "rock", "scissors");
        play_round(&mut m, "rock", "paper");
        assert_eq!(m.status(), MatchStatus::InProgress);
        play_round(&mut m, "paper", "rock");

        let snap = m.snapshot();
        assert_eq!(snap.status, MatchStatus::Complete);
        assert_eq!(snap.winner, Some(p("p1")));
        assert_eq!(snap.rounds.len(), 3);
        assert_eq!(snap.version, 8);
    }

    #[test]
    fn two_straight_wins_end_early() {
        let mut m = started();
        play_round(&mut m, "scissors", "rock");
        play_round(&mut m, "paper", "scissors");
        assert_eq!(m.status(), MatchStatus::Complete);
        assert_eq!(m.winner(), Some(&p("p2")));
    }

    #[test]
    fn all_draws_complete_without_winner() {
        let mut m = started();
        for _ in 0..3 {
            play_round(&mut m, "paper", "paper");
        }
        assert_eq!(m.status(), MatchStatus::Complete);
        assert_eq!(m.winner(), None);
    }

    #[test]
    fn exhausted_rounds_go_to_the_leader() {
        let mut m = started();
        play_round(&mut m, "rock", "rock");
        play_round(&mut m, "rock", "rock");
        play_round(&mut m, "paper", "rock");
        assert_eq!(m.status(), MatchStatus::Complete);
        assert_eq!(m.winner(), Some(&p("p1")));
    }

    #[test]
    fn complete_match_rejects_everything() {
        let mut m = started();
        play_round(&mut m, "rock", "scissors");
        play_round(&mut m, "rock", "scissors");
        let rules = RuleSet::classic();
        let cfg = EngineConfig::default();
        assert!(matches!(
            m.submit_pick(&p("p1"), &s("rock"), None, &rules, &cfg),
            Err(MatchError::InvalidState { status: MatchStatus::Complete, .. })
        ));
        assert!(matches!(m.join(&p("p3")), Err(MatchError::InvalidState { .. })));
        assert!(matches!(m.abandon(&p("p1")), Err(MatchError::InvalidState { .. })));
    }

    #[test]
    fn abandon_requires_seat() {
        let mut m = started();
        assert!(matches!(m.abandon(&p("p3")), Err(MatchError::Forbidden { .. })));
        m.abandon(&p("p2")).unwrap();
        assert_eq!(m.status(), MatchStatus::Abandoned);
        assert_eq!(m.winner(), None);
        assert_eq!(m.version(), 3);
    }

    #[test]
    fn configured_best_of_five() {
        let cfg = EngineConfig {
            best_of: 5,
            ..EngineConfig::default()
        };
        let rules = RuleSet::classic();
        let mut m = started();
        for _ in 0..2 {
            m.submit_pick(&p("p1"), &s("rock"), None, &rules, &cfg).unwrap();
            m.submit_pick(&p("p2"), &s("scissors"), None, &rules, &cfg).unwrap();
        }
        assert_eq!(m.status(), MatchStatus::InProgress);
        m.submit_pick(&p("p1"), &s("rock"), None, &rules, &cfg).unwrap();
        m.submit_pick(&p("p2"), &s("scissors"), None, &rules, &cfg).unwrap();
        assert_eq!(m.status(), MatchStatus::Complete);
    }

    fn trail(m: &mut Match, commands: &[Command]) -> Vec<Event> {
        let rules = RuleSet::classic();
        let cfg = EngineConfig::default();
        let mut events = Vec::new();
        for (i, command) in commands.iter().enumerate() {
            let t = m.apply(command, &rules, &cfg).unwrap();
            let key = IdempotencyKey::new(format!("k{i}"));
            events.push(t.to_event(m, Some(key), RequestId::new(format!("r{i}"))));
        }
        events
    }

    #[test]
    fn replay_reproduces_live_state() {
        let (mut live, created) = Match::create(p("p1")).unwrap();
        let mut events = vec![created.to_event(&live, None, RequestId::new("r"))];
        events.extend(trail(
            &mut live,
            &[
                Command::Join { player: p("p2") },
                Command::Pick { player: p("p1"), symbol: s("rock"), round: None },
                Command::Pick { player: p("p2"), symbol: s("paper"), round: None },
                Command::Pick { player: p("p2"), symbol: s("rock"), round: None },
            ],
        ));

        let mut receipts = 0;
        let replayed = Match::replay_with(
            &events,
            &RuleSet::classic(),
            &EngineConfig::default(),
            |_, _| receipts += 1,
        )
        .unwrap();
        assert_eq!(replayed, live);
        assert_eq!(receipts, events.len());
    }

    #[test]
    fn replay_rejects_gaps() {
        let (mut live, created) = Match::create(p("p1")).unwrap();
        let mut events = vec![created.to_event(&live, None, RequestId::new("r"))];
        events.extend(trail(
            &mut live,
            &[
                Command::Join { player: p("p2") },
                Command::Pick { player: p("p1"), symbol: s("rock"), round: None },
            ],
        ));
        events.remove(1);
        let err = Match::replay(&events, &RuleSet::classic(), &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, MatchError::Unavailable { .. }));
    }

    #[test]
    fn replay_rejects_divergent_rules() {
        let (mut live, created) = Match::create(p("p1")).unwrap();
        let mut events = vec![created.to_event(&live, None, RequestId::new("r"))];
        events.extend(trail(
            &mut live,
            &[
                Command::Join { player: p("p2") },
                Command::Pick { player: p("p1"), symbol: s("rock"), round: None },
                Command::Pick { player: p("p2"), symbol: s("scissors"), round: None },
            ],
        ));
        if let EventPayload::PickSubmitted { resolution: Some(r), .. } = &mut events[3].payload {
            r.outcome = Outcome::WinB;
        }
        let err = Match::replay(&events, &RuleSet::classic(), &EngineConfig::default()).unwrap_err();
        assert!(format!("{err}").contains("does not reproduce"), "{err}");
    }

    #[test]
    fn replay_of_empty_trail_fails() {
        assert!(Match::replay(&[], &RuleSet::classic(), &EngineConfig::default()).is_err());
    }
}
