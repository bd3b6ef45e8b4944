//! The table hub: a single-writer actor owning one game.
//!
//! All mutation is serialized through one inbox. Every broadcast produced
//! by one input is enqueued to every session before the next input is
//! processed; per-session queues are bounded and a stalled consumer is
//! disconnected rather than ever blocking the hub.

use log::{debug, error, info, warn};
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc;

use super::config::TableConfig;
use super::messages::{HubMessage, SessionId};
use crate::game::engine::{Game, GameError, Stage};
use crate::game::entities::{ActionKind, Card, Chips, HIDDEN_CARD, PlayerId};
use crate::game::view::{PlayerInfo, project_for};
use crate::net::errors;
use crate::net::messages::{ClientMessage, ServerMessage, now_ms, parse_client_message};

/// Consecutive dropped frames before a slow consumer is cut loose.
const MAX_LAG: u32 = 32;

/// Hub inbox depth.
const INBOX_CAPACITY: usize = 256;

/// Advertised turn clock when enforcement is disabled.
const DEFAULT_TURN_SECS: u64 = 30;

/// Cloneable sender half for a running [`TableHub`].
#[derive(Clone)]
pub struct HubHandle {
    sender: mpsc::Sender<HubMessage>,
}

impl HubHandle {
    /// Send a message to the table; fails only once the hub is gone.
    pub async fn send(&self, message: HubMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "table is closed".to_string())
    }
}

struct SessionEntry {
    outbound: mpsc::Sender<String>,
    player_id: Option<PlayerId>,
    /// Consecutive full-queue drops.
    lag: u32,
}

/// Single-writer actor owning one table's game state.
pub struct TableHub {
    config: TableConfig,
    game: Game,
    inbox: mpsc::Receiver<HubMessage>,
    /// For scheduling delayed self-messages (action timeouts).
    self_sender: mpsc::Sender<HubMessage>,
    sessions: HashMap<SessionId, SessionEntry>,
    /// Seats that must ready up before the next hand.
    required_ready: HashSet<PlayerId>,
    ready: HashSet<PlayerId>,
    /// Bumped per turn prompt so stale timeout timers are discarded.
    turn_serial: u64,
    /// Baseline for the chip-conservation check, refreshed whenever the
    /// seat set changes.
    expected_chips: Chips,
    /// Set on invariant violation; all further game input is refused.
    halted: bool,
    /// Sessions discovered dead while broadcasting, drained after each
    /// message.
    dead_sessions: Vec<SessionId>,
}

impl TableHub {
    #[must_use]
    pub fn new(config: TableConfig) -> (Self, HubHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let game = Game::new(config.rules());
        let hub = Self {
            config,
            game,
            inbox,
            self_sender: sender.clone(),
            sessions: HashMap::new(),
            required_ready: HashSet::new(),
            ready: HashSet::new(),
            turn_serial: 0,
            expected_chips: 0,
            halted: false,
            dead_sessions: Vec::new(),
        };
        (hub, HubHandle { sender })
    }

    /// Create the hub and run it on a fresh task, returning the handle.
    #[must_use]
    pub fn spawn(config: TableConfig) -> HubHandle {
        let (hub, handle) = Self::new(config);
        tokio::spawn(hub.run());
        handle
    }

    /// Actor loop: one ordered queue, one message at a time.
    pub async fn run(mut self) {
        info!("table '{}' starting", self.config.name);
        while let Some(message) = self.inbox.recv().await {
            if matches!(message, HubMessage::Shutdown) {
                break;
            }
            self.handle_message(message);
            self.reap_dead_sessions();
        }
        // Dropping the sessions map closes every outbound queue; writers
        // drain and exit, then readers observe close.
        info!("table '{}' closed", self.config.name);
    }

    fn handle_message(&mut self, message: HubMessage) {
        match message {
            HubMessage::Connect { session, outbound } => {
                debug!("session {session} connected");
                self.sessions.insert(
                    session,
                    SessionEntry { outbound, player_id: None, lag: 0 },
                );
            }
            HubMessage::Disconnect { session } => self.handle_disconnect(session),
            HubMessage::Inbound { session, frame } => self.handle_frame(session, &frame),
            HubMessage::ActionTimeout { player_id, turn_serial } => {
                self.handle_action_timeout(player_id, turn_serial);
            }
            HubMessage::Shutdown => {}
        }
    }

    // === Frame dispatch ===

    fn handle_frame(&mut self, session: SessionId, frame: &str) {
        if !self.sessions.contains_key(&session) {
            return;
        }
        let message = match parse_client_message(frame) {
            Ok(message) => message,
            Err(err) => {
                warn!("session {session}: bad frame: {err}");
                let code = errors::code_for_protocol(&err);
                self.unicast(session, &ServerMessage::error(code, err.to_string()));
                return;
            }
        };

        match message {
            ClientMessage::Ping { .. } => {
                self.unicast(session, &ServerMessage::pong());
            }
            ClientMessage::Chat { content, .. } => self.handle_chat(session, content),
            _ if self.halted => {
                self.unicast(
                    session,
                    &ServerMessage::error(errors::TABLE_HALTED, "table halted"),
                );
            }
            ClientMessage::Join { player_name, seat, .. } => {
                self.handle_join(session, player_name, seat);
            }
            ClientMessage::Leave { .. } => self.handle_leave(session),
            ClientMessage::PlayerAction { action, amount, .. } => {
                self.handle_action(session, action, amount);
            }
            ClientMessage::ReadyForNext { .. } => self.handle_ready(session),
        }
    }

    fn handle_join(&mut self, session: SessionId, player_name: String, seat: i64) {
        if self
            .sessions
            .get(&session)
            .is_some_and(|s| s.player_id.is_some())
        {
            self.unicast(
                session,
                &ServerMessage::error(errors::SEAT_OCCUPIED, "already seated"),
            );
            return;
        }

        let mut name = player_name.trim().to_string();
        if name.is_empty() {
            name = "anonymous".to_string();
        }
        name.truncate(32);
        let requested = if seat < 0 { None } else { Some(seat as usize) };

        let (player_id, seat_idx, info) = match self.game.add_player(&name, requested) {
            Ok(player) => (
                player.id,
                player.seat,
                PlayerInfo {
                    id: player.id,
                    name: player.name.clone(),
                    seat: player.seat,
                    chips: player.chips,
                    current_bet: 0,
                    status: player.status,
                    is_dealer: player.is_dealer,
                    hole_cards: [HIDDEN_CARD; 2],
                    is_self: false,
                },
            ),
            Err(err) => {
                self.unicast(
                    session,
                    &ServerMessage::error(errors::code_for(&err), err.to_string()),
                );
                return;
            }
        };

        if let Some(entry) = self.sessions.get_mut(&session) {
            entry.player_id = Some(player_id);
        }
        self.expected_chips = self.game.chip_total();

        self.unicast(
            session,
            &ServerMessage::JoinAck {
                timestamp: now_ms(),
                success: true,
                player_id: Some(player_id),
                seat: Some(seat_idx),
                message: format!("welcome, {name}"),
                game_state: Some(project_for(&self.game, Some(player_id))),
            },
        );
        self.broadcast_except(
            session,
            &ServerMessage::PlayerJoined { timestamp: now_ms(), player: info },
        );
        self.broadcast_state();

        // First hand starts itself once enough stacks are seated; after
        // that the ready barrier gates every deal.
        if self.game.stage() == Stage::Waiting
            && self.game.seats_with_chips() >= self.config.min_players
        {
            self.start_hand();
        }
    }

    fn handle_leave(&mut self, session: SessionId) {
        let Some(player_id) = self.session_player(session) else {
            self.unicast(
                session,
                &ServerMessage::error(errors::LEAVE_FAILED, "not seated"),
            );
            return;
        };
        if let Some(entry) = self.sessions.get_mut(&session) {
            entry.player_id = None;
        }
        self.detach_player(player_id);
    }

    /// Common leave/disconnect path: fold if needed, announce, keep the
    /// barrier and the conservation baseline honest.
    fn detach_player(&mut self, player_id: PlayerId) {
        let name = self
            .game
            .player_by_id(player_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();

        match self.game.remove_player(player_id) {
            Ok(folded) => {
                info!("{name} left the table (folded={folded})");
                self.broadcast(&ServerMessage::PlayerLeft {
                    timestamp: now_ms(),
                    player_id,
                    player_name: name,
                });
                self.expected_chips = self.game.chip_total();
                // A leaver never blocks the next hand.
                self.required_ready.remove(&player_id);
                self.ready.remove(&player_id);
                if folded {
                    self.after_game_advance();
                } else {
                    self.broadcast_state();
                    self.check_ready_barrier();
                }
            }
            Err(err) => {
                debug!("detach of unknown player: {err}");
            }
        }
    }

    fn handle_action(&mut self, session: SessionId, action: ActionKind, amount: Chips) {
        let Some(player_id) = self.session_player(session) else {
            self.unicast(
                session,
                &ServerMessage::error(errors::ILLEGAL_ACTION, "join a seat first"),
            );
            return;
        };

        match self.game.apply_player_action(player_id, action, amount) {
            Ok(outcome) => {
                let name = self
                    .game
                    .player_by_id(player_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                self.broadcast(&ServerMessage::PlayerActed {
                    timestamp: now_ms(),
                    player_id,
                    player_name: name,
                    action: outcome.action,
                    amount: outcome.paid,
                    total_bet: outcome.street_total,
                });
                self.after_game_advance();
            }
            Err(GameError::Deck(err)) => {
                // Exhausting the deck mid-hand is impossible by design.
                self.halt(&format!("deck invariant violated: {err}"));
            }
            Err(err) => {
                let code = errors::code_for(&err);
                self.unicast(session, &ServerMessage::error(code, err.to_string()));
                // Re-prompt if it is still this seat's turn.
                if self.game.stage().is_betting()
                    && self.game.current_actor_id() == Some(player_id)
                {
                    self.send_turn_prompt(false);
                }
            }
        }
    }

    fn handle_ready(&mut self, session: SessionId) {
        let Some(player_id) = self.session_player(session) else {
            self.unicast(
                session,
                &ServerMessage::error(errors::ILLEGAL_ACTION, "join a seat first"),
            );
            return;
        };
        if self.game.stage().is_betting() {
            self.unicast(
                session,
                &ServerMessage::error(errors::NOT_SETTLEMENT_STAGE, "hand in progress"),
            );
            return;
        }

        self.ready.insert(player_id);
        let name = self
            .game
            .player_by_id(player_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let ready_players: Vec<String> = self
            .game
            .players()
            .iter()
            .filter(|p| self.ready.contains(&p.id))
            .map(|p| p.name.clone())
            .collect();
        let all_ready = self.barrier_cleared();
        self.broadcast(&ServerMessage::PlayerReady {
            timestamp: now_ms(),
            player_id,
            player_name: name,
            ready_players,
            total_players: self.required_ready.len().max(1),
            all_ready,
        });
        self.check_ready_barrier();
    }

    fn handle_chat(&mut self, session: SessionId, content: String) {
        let Some(player_id) = self.session_player(session) else {
            self.unicast(
                session,
                &ServerMessage::error(errors::ILLEGAL_ACTION, "join a seat first"),
            );
            return;
        };
        let name = self
            .game
            .player_by_id(player_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        self.broadcast(&ServerMessage::Chat {
            timestamp: now_ms(),
            player_id: Some(player_id),
            player_name: name,
            content,
            is_system: false,
        });
    }

    fn handle_disconnect(&mut self, session: SessionId) {
        let Some(entry) = self.sessions.remove(&session) else {
            return;
        };
        debug!("session {session} disconnected");
        if let Some(player_id) = entry.player_id {
            self.detach_player(player_id);
        }
    }

    fn handle_action_timeout(&mut self, player_id: PlayerId, turn_serial: u64) {
        if self.halted || turn_serial != self.turn_serial {
            return;
        }
        if !self.game.stage().is_betting() || self.game.current_actor_id() != Some(player_id) {
            return;
        }
        let (name, street_bet) = self
            .game
            .player_by_id(player_id)
            .map(|p| (p.name.clone(), p.round_bet))
            .unwrap_or_default();
        warn!("{name} timed out, folding");
        match self.game.force_fold(player_id) {
            Ok(()) => {
                self.broadcast(&ServerMessage::PlayerActed {
                    timestamp: now_ms(),
                    player_id,
                    player_name: name,
                    action: ActionKind::Fold,
                    amount: 0,
                    total_bet: street_bet,
                });
                self.after_game_advance();
            }
            Err(GameError::Deck(err)) => self.halt(&format!("deck invariant violated: {err}")),
            Err(err) => debug!("timeout fold rejected: {err}"),
        }
    }

    // === Hand flow ===

    fn start_hand(&mut self) {
        let seed: u64 = rand::random();
        match self.game.start_hand(seed) {
            Ok(()) => {
                info!(
                    "table '{}': hand {} dealt ({} seats)",
                    self.config.name,
                    self.game.hand_no(),
                    self.game.players().len()
                );
                self.expected_chips = self.game.chip_total();
                self.broadcast_state();
                self.after_game_advance();
            }
            Err(err) => {
                // Not enough stacks; the engine fell back to Waiting.
                debug!("hand not started: {err}");
                self.broadcast_state();
            }
        }
    }

    /// After any engine mutation: verify conservation, broadcast the new
    /// state, and either finish the hand or prompt the next actor.
    fn after_game_advance(&mut self) {
        if self.game.chip_total() != self.expected_chips {
            self.halt(&format!(
                "chip conservation violated: have {}, expected {}",
                self.game.chip_total(),
                self.expected_chips
            ));
            return;
        }

        self.broadcast_state();

        if self.game.stage() == Stage::Showdown {
            self.finish_hand();
        } else if self.game.stage().is_betting() {
            self.send_turn_prompt(true);
        }
    }

    fn finish_hand(&mut self) {
        let Some(result) = self.game.last_showdown() else {
            return;
        };
        let mut community: [Card; 5] = [HIDDEN_CARD; 5];
        for (slot, card) in community.iter_mut().zip(self.game.community()) {
            if let Some(card) = card {
                *slot = *card;
            }
        }
        let message = ServerMessage::showdown(result, community);
        let participants: Vec<PlayerId> = result.seats.iter().map(|s| s.player_id).collect();

        self.ready.clear();
        self.turn_serial += 1; // kill any outstanding action clock

        self.broadcast(&message);
        self.game.end_hand();

        // The barrier for the next hand: everyone who played this one,
        // still has chips, and is still seated after leavers detached.
        // Late joiners are exempt.
        self.required_ready = self
            .game
            .players()
            .iter()
            .filter(|p| p.chips > 0 && participants.contains(&p.id))
            .map(|p| p.id)
            .collect();
        self.expected_chips = self.game.chip_total();
        self.broadcast_state();
        info!(
            "table '{}': hand {} complete, waiting for {} ready",
            self.config.name,
            self.game.hand_no(),
            self.required_ready.len()
        );
    }

    fn barrier_cleared(&self) -> bool {
        self.required_ready.iter().all(|id| self.ready.contains(id))
    }

    fn check_ready_barrier(&mut self) {
        if self.game.stage() != Stage::Ended || !self.barrier_cleared() {
            return;
        }
        if self.game.seats_with_chips() < self.config.min_players.max(2) {
            return;
        }
        self.required_ready.clear();
        self.ready.clear();
        self.start_hand();
    }

    /// Prompt the current actor and arm the action clock.
    fn send_turn_prompt(&mut self, new_turn: bool) {
        let Some(player_id) = self.game.current_actor_id() else {
            return;
        };
        if new_turn {
            self.turn_serial += 1;
        }
        let timeout = if self.config.action_timeout_secs > 0 {
            self.config.action_timeout_secs
        } else {
            DEFAULT_TURN_SECS
        };
        let prompt = ServerMessage::YourTurn {
            timestamp: now_ms(),
            player_id,
            min_action: self.game.call_amount(player_id),
            max_action: self.game.max_raise(player_id),
            current_bet: self.game.round().current_bet,
            time_left: timeout,
        };
        self.unicast_player(player_id, &prompt);

        if new_turn && self.config.action_timeout_secs > 0 {
            let sender = self.self_sender.clone();
            let turn_serial = self.turn_serial;
            let secs = self.config.action_timeout_secs;
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_secs(secs)).await;
                let _ = sender
                    .send(HubMessage::ActionTimeout { player_id, turn_serial })
                    .await;
            });
        }
    }

    fn halt(&mut self, reason: &str) {
        error!("table '{}' HALTED: {reason}", self.config.name);
        self.halted = true;
        self.broadcast(&ServerMessage::error(errors::TABLE_HALTED, "table halted"));
    }

    // === Fan-out ===

    fn session_player(&self, session: SessionId) -> Option<PlayerId> {
        self.sessions.get(&session).and_then(|s| s.player_id)
    }

    fn serialize(message: &ServerMessage) -> Option<String> {
        match serde_json::to_string(message) {
            Ok(json) => Some(json),
            Err(err) => {
                error!("failed to serialize outbound message: {err}");
                None
            }
        }
    }

    fn unicast(&mut self, session: SessionId, message: &ServerMessage) {
        if let Some(json) = Self::serialize(message) {
            self.push(session, json);
        }
    }

    fn unicast_player(&mut self, player_id: PlayerId, message: &ServerMessage) {
        let target = self
            .sessions
            .iter()
            .find(|(_, entry)| entry.player_id == Some(player_id))
            .map(|(id, _)| *id);
        if let Some(session) = target {
            self.unicast(session, message);
        }
    }

    /// Same payload to every session.
    fn broadcast(&mut self, message: &ServerMessage) {
        let Some(json) = Self::serialize(message) else {
            return;
        };
        let targets: Vec<SessionId> = self.sessions.keys().copied().collect();
        for session in targets {
            self.push(session, json.clone());
        }
    }

    fn broadcast_except(&mut self, skip: SessionId, message: &ServerMessage) {
        let Some(json) = Self::serialize(message) else {
            return;
        };
        let targets: Vec<SessionId> =
            self.sessions.keys().copied().filter(|s| *s != skip).collect();
        for session in targets {
            self.push(session, json.clone());
        }
    }

    /// Per-recipient snapshots: every session gets the table as it is
    /// allowed to see it.
    fn broadcast_state(&mut self) {
        let targets: Vec<(SessionId, Option<PlayerId>)> = self
            .sessions
            .iter()
            .map(|(id, entry)| (*id, entry.player_id))
            .collect();
        for (session, player_id) in targets {
            let message = ServerMessage::GameState {
                timestamp: now_ms(),
                view: project_for(&self.game, player_id),
            };
            self.unicast(session, &message);
        }
    }

    /// Enqueue without ever blocking the hub. Queue-full drops count
    /// toward a lag threshold; a closed or hopelessly lagged session is
    /// marked dead and reaped after the current message.
    fn push(&mut self, session: SessionId, json: String) {
        let Some(entry) = self.sessions.get_mut(&session) else {
            return;
        };
        match entry.outbound.try_send(json) {
            Ok(()) => entry.lag = 0,
            Err(mpsc::error::TrySendError::Full(_)) => {
                entry.lag += 1;
                if entry.lag > MAX_LAG {
                    warn!("session {session} lagging, disconnecting");
                    self.dead_sessions.push(session);
                } else {
                    debug!("session {session} queue full, dropping frame");
                }
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.dead_sessions.push(session);
            }
        }
    }

    fn reap_dead_sessions(&mut self) {
        while let Some(session) = self.dead_sessions.pop() {
            self.handle_disconnect(session);
        }
    }
}
