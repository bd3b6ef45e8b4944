//! The hand state machine: deal, blinds, betting streets, all-in
//! fast-forward, and showdown settlement for one table.
//!
//! The engine is purely synchronous and single-owner; the table hub is the
//! only writer. Every mutation either completes or returns a typed
//! `GameError` with state untouched, and chip conservation holds across
//! every applied action.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use super::betting::{self, BetError, BettingRound, SidePot, build_pots};
use super::entities::{
    ActionKind, Card, Chips, Deck, DeckError, Player, PlayerId, PlayerStatus, SeatIndex,
};
use super::evaluator::{self, HandValue};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Waiting,
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
    Ended,
}

impl Stage {
    /// A street where player actions are accepted.
    #[must_use]
    pub fn is_betting(&self) -> bool {
        matches!(self, Self::PreFlop | Self::Flop | Self::Turn | Self::River)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::PreFlop => "pre-flop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
            Self::Ended => "ended",
        };
        write!(f, "{repr}")
    }
}

/// Why the engine rejected an operation. The hub maps these onto the wire
/// protocol's numeric codes.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum GameError {
    #[error("table is full")]
    TableFull,
    #[error("invalid seat number")]
    InvalidSeat,
    #[error("seat is already occupied")]
    SeatOccupied,
    #[error("player not found")]
    PlayerNotFound,
    #[error("hand already in progress")]
    HandInProgress,
    #[error("need at least {needed} players with chips")]
    NotEnoughPlayers { needed: usize },
    #[error("not your turn")]
    NotYourTurn,
    #[error("not in a betting stage")]
    NotBettingStage,
    #[error(transparent)]
    Bet(#[from] BetError),
    #[error(transparent)]
    Deck(#[from] DeckError),
}

/// Fixed-for-the-table game parameters (the engine's slice of the table
/// configuration).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameRules {
    pub min_players: usize,
    pub max_players: usize,
    pub small_blind: Chips,
    pub big_blind: Chips,
    /// 0 disables the ante.
    pub ante: Chips,
    pub starting_chips: Chips,
}

impl GameRules {
    /// Clamp player bounds to the table limits ([2, 9] seats).
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.max_players = self.max_players.clamp(2, 9);
        self.min_players = self.min_players.clamp(2, self.max_players);
        self
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 9,
            small_blind: 10,
            big_blind: 20,
            ante: 0,
            starting_chips: 1000,
        }
    }
}

/// Per-seat line in the settlement record.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SeatResult {
    pub player_id: PlayerId,
    pub name: String,
    pub seat: SeatIndex,
    pub hole_cards: [Card; 2],
    /// Evaluated strength; None for folded seats and uncontested wins.
    pub hand: Option<HandValue>,
    pub won: Chips,
    pub chips_after: Chips,
    pub folded: bool,
    pub winner: bool,
}

/// Settlement record for the hand that just finished.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ShowdownResult {
    pub seats: Vec<SeatResult>,
    pub total_pot: Chips,
    /// Everyone but one seat folded; the pot moved without evaluation.
    pub early_end: bool,
    pub pots: Vec<SidePot>,
}

/// What an applied action did, for the hub's broadcast.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ActionOutcome {
    /// As applied; short calls and exact-stack raises come back as AllIn.
    pub action: ActionKind,
    pub paid: Chips,
    /// The actor's street commitment after the action.
    pub street_total: Chips,
    /// The hand has been settled; the hub should broadcast showdown
    /// details and open the ready barrier.
    pub hand_complete: bool,
}

/// One table's authoritative game state. Seats persist across hands; all
/// per-hand state is rebuilt by `start_hand` and frozen by `end_hand`.
#[derive(Debug)]
pub struct Game {
    rules: GameRules,
    stage: Stage,
    /// Seats, always sorted by seat index; clockwise order is vec order.
    players: Vec<Player>,
    deck: Option<Deck>,
    round: BettingRound,
    community: [Option<Card>; 5],
    pot_total: Chips,
    side_pots: Vec<SidePot>,
    current_actor: Option<SeatIndex>,
    small_blind_seat: Option<SeatIndex>,
    big_blind_seat: Option<SeatIndex>,
    last_showdown: Option<ShowdownResult>,
    /// Seats queued for removal; purged between hands.
    to_remove: BTreeSet<PlayerId>,
    hand_no: u64,
}

impl Game {
    #[must_use]
    pub fn new(rules: GameRules) -> Self {
        let rules = rules.clamped();
        let big_blind = rules.big_blind;
        Self {
            rules,
            stage: Stage::Waiting,
            players: Vec::new(),
            deck: None,
            round: BettingRound::new(big_blind),
            community: [None; 5],
            pot_total: 0,
            side_pots: Vec::new(),
            current_actor: None,
            small_blind_seat: None,
            big_blind_seat: None,
            last_showdown: None,
            to_remove: BTreeSet::new(),
            hand_no: 0,
        }
    }

    // === Seat management ===

    /// Seat a new player with the table's standard starting stack.
    /// `requested_seat` of None means any open seat. A player joining
    /// mid-hand stays `Seated` and is dealt into the next hand.
    pub fn add_player(
        &mut self,
        name: &str,
        requested_seat: Option<SeatIndex>,
    ) -> Result<&Player, GameError> {
        self.add_player_with_stack(name, requested_seat, self.rules.starting_chips)
    }

    /// Seat a new player with an explicit buy-in.
    pub fn add_player_with_stack(
        &mut self,
        name: &str,
        requested_seat: Option<SeatIndex>,
        chips: Chips,
    ) -> Result<&Player, GameError> {
        if self.players.len() >= self.rules.max_players {
            return Err(GameError::TableFull);
        }
        let seat = match requested_seat {
            Some(seat) => {
                if seat >= self.rules.max_players {
                    return Err(GameError::InvalidSeat);
                }
                if self.players.iter().any(|p| p.seat == seat) {
                    return Err(GameError::SeatOccupied);
                }
                seat
            }
            None => (0..self.rules.max_players)
                .find(|s| !self.players.iter().any(|p| p.seat == *s))
                .ok_or(GameError::TableFull)?,
        };

        let player = Player::new(name.to_string(), seat, chips);
        info!(
            "seat {}: {} joined with {} chips",
            seat, player.name, player.chips
        );
        let pos = self
            .players
            .iter()
            .position(|p| p.seat > seat)
            .unwrap_or(self.players.len());
        self.players.insert(pos, player);
        Ok(&self.players[pos])
    }

    /// Remove a player. A seat that was dealt into the current hand folds
    /// (if it could still act) and stays on the books until the hand
    /// ends, so its committed chips keep partitioning into the pots; any
    /// other seat leaves at once. Returns true if the departure folded a
    /// live hand, in which case the caller must let the hand progress.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<bool, GameError> {
        let idx = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or(GameError::PlayerNotFound)?;

        let in_current_hand = !matches!(self.stage, Stage::Waiting | Stage::Ended)
            && matches!(
                self.players[idx].status,
                PlayerStatus::InHand | PlayerStatus::AllIn | PlayerStatus::Folded
            );
        if in_current_hand {
            let seat = self.players[idx].seat;
            let folded = self.players[idx].is_in_hand();
            if folded {
                self.players[idx].status = PlayerStatus::Folded;
                info!("seat {seat}: {} folded on leave", self.players[idx].name);
            }
            self.to_remove.insert(id);
            if folded && self.stage.is_betting() {
                self.progress_after_fold(seat)?;
            }
            Ok(folded)
        } else {
            let player = self.players.remove(idx);
            info!("seat {}: {} left the table", player.seat, player.name);
            Ok(false)
        }
    }

    fn purge_removals(&mut self) {
        if self.to_remove.is_empty() {
            return;
        }
        let gone = std::mem::take(&mut self.to_remove);
        self.players.retain(|p| !gone.contains(&p.id));
    }

    // === Hand lifecycle ===

    /// Start a new hand with a deck shuffled from `seed`.
    pub fn start_hand(&mut self, seed: u64) -> Result<(), GameError> {
        self.start_hand_with_deck(Deck::shuffled(seed))
    }

    /// Start a new hand with an explicit deck (tests stack this).
    pub fn start_hand_with_deck(&mut self, deck: Deck) -> Result<(), GameError> {
        if !matches!(self.stage, Stage::Waiting | Stage::Ended) {
            return Err(GameError::HandInProgress);
        }
        self.purge_removals();

        for player in &mut self.players {
            player.reset_for_hand();
        }
        let in_hand = self.count(|p| p.is_in_hand());
        if in_hand < self.rules.min_players.max(2) {
            self.stage = Stage::Waiting;
            return Err(GameError::NotEnoughPlayers {
                needed: self.rules.min_players.max(2),
            });
        }

        self.hand_no += 1;
        self.stage = Stage::PreFlop;
        self.community = [None; 5];
        self.pot_total = 0;
        self.side_pots.clear();
        self.last_showdown = None;
        self.round = BettingRound::new(self.rules.big_blind);
        self.deck = Some(deck);

        self.rotate_dealer();
        self.post_antes();
        self.post_blinds();
        self.deal_hole_cards()?;

        debug!(
            "hand {} started, button seat {:?}, pot {}",
            self.hand_no,
            self.dealer_seat(),
            self.pot_total
        );

        // First to act pre-flop sits after the big blind; heads-up this
        // walks back around to the button.
        let bb = self.big_blind_seat.unwrap_or_else(|| self.players[0].seat);
        self.current_actor = self.next_in_hand_after(bb);
        if self.current_actor.is_none() {
            // Blinds and antes put every seat all-in; nothing to bet.
            self.fast_forward_to_showdown()?;
        }
        Ok(())
    }

    /// Freeze the finished hand: Showdown -> Ended, detach leavers.
    pub fn end_hand(&mut self) {
        if self.stage == Stage::Showdown {
            self.stage = Stage::Ended;
        }
        self.current_actor = None;
        self.purge_removals();
    }

    // === Actions ===

    /// Validate and apply one player action, then advance the machine
    /// (turn rotation, street advance, early finish, settlement). On
    /// error, state is untouched.
    pub fn apply_player_action(
        &mut self,
        player_id: PlayerId,
        kind: ActionKind,
        amount: Chips,
    ) -> Result<ActionOutcome, GameError> {
        if !self.stage.is_betting() {
            return Err(GameError::NotBettingStage);
        }
        let idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound)?;
        let seat = self.players[idx].seat;
        if self.current_actor != Some(seat) || !self.players[idx].is_in_hand() {
            return Err(GameError::NotYourTurn);
        }

        let outcome = betting::apply_action(&mut self.players[idx], &mut self.round, kind, amount)?;
        self.pot_total += outcome.paid;
        debug!(
            "seat {seat}: {} {} (paid {}, pot {})",
            self.players[idx].name, outcome.action, outcome.paid, self.pot_total
        );

        if outcome.raised {
            for player in &mut self.players {
                if player.seat != seat && player.is_in_hand() {
                    player.has_acted = false;
                }
            }
        }

        let street_total = self.players[idx].round_bet;
        self.progress(seat)?;

        Ok(ActionOutcome {
            action: outcome.action,
            paid: outcome.paid,
            street_total,
            hand_complete: self.stage == Stage::Showdown,
        })
    }

    /// Fold a seat that is not necessarily the current actor (leave or
    /// action-timeout synthesis), then advance the machine.
    pub fn force_fold(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        if !self.stage.is_betting() {
            return Err(GameError::NotBettingStage);
        }
        let idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound)?;
        if !self.players[idx].is_in_hand() {
            return Err(GameError::NotYourTurn);
        }
        let seat = self.players[idx].seat;
        self.players[idx].status = PlayerStatus::Folded;
        info!("seat {seat}: {} folded (forced)", self.players[idx].name);
        self.progress_after_fold(seat)
    }

    // === Progression ===

    fn progress_after_fold(&mut self, seat: SeatIndex) -> Result<(), GameError> {
        self.round.log.push(betting::LoggedAction {
            seat,
            action: ActionKind::Fold,
            amount: self.seat_ref(seat).map_or(0, |p| p.round_bet),
        });
        self.progress(seat)
    }

    fn progress(&mut self, actor_seat: SeatIndex) -> Result<(), GameError> {
        // Early finish: everyone else folded.
        if self.count(|p| p.is_live()) <= 1 {
            self.deal_remaining_community()?;
            self.stage = Stage::Showdown;
            self.settle(true);
            return Ok(());
        }

        if self.round_complete() {
            self.advance_street()
        } else {
            if self.current_actor == Some(actor_seat) {
                self.current_actor = self.next_in_hand_after(actor_seat);
            }
            Ok(())
        }
    }

    /// The street is over when every seat still able to act has acted at
    /// the current bet level.
    fn round_complete(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.is_in_hand())
            .all(|p| p.has_acted && p.round_bet == self.round.current_bet)
    }

    fn advance_street(&mut self) -> Result<(), GameError> {
        if self.players.iter().any(|p| p.status == PlayerStatus::AllIn) {
            self.side_pots = build_pots(&self.players);
        }
        for player in &mut self.players {
            player.round_bet = 0;
            player.has_acted = false;
            player.acted_this_round = false;
        }
        self.round.reset_street();

        // With at most one seat able to act there is no more betting:
        // run the board out and settle.
        if self.count(|p| p.is_in_hand()) <= 1 {
            return self.fast_forward_to_showdown();
        }

        match self.stage {
            Stage::PreFlop => {
                self.deal_community(0, 3)?;
                self.stage = Stage::Flop;
            }
            Stage::Flop => {
                self.deal_community(3, 1)?;
                self.stage = Stage::Turn;
            }
            Stage::Turn => {
                self.deal_community(4, 1)?;
                self.stage = Stage::River;
            }
            Stage::River => {
                self.stage = Stage::Showdown;
                self.settle(false);
                return Ok(());
            }
            _ => {}
        }

        let dealer = self.dealer_seat().unwrap_or(0);
        self.current_actor = self.next_in_hand_after(dealer);
        debug!(
            "street advanced to {}, first to act seat {:?}",
            self.stage, self.current_actor
        );
        Ok(())
    }

    fn fast_forward_to_showdown(&mut self) -> Result<(), GameError> {
        debug!("no further betting possible, running out the board");
        self.deal_remaining_community()?;
        if self.players.iter().any(|p| p.status == PlayerStatus::AllIn) {
            self.side_pots = build_pots(&self.players);
        }
        self.stage = Stage::Showdown;
        self.settle(false);
        Ok(())
    }

    fn deal_community(&mut self, start: usize, n: usize) -> Result<(), GameError> {
        let deck = self.deck.as_mut().ok_or(DeckError::Exhausted)?;
        deck.burn(1)?;
        for slot in start..start + n {
            self.community[slot] = Some(deck.deal()?);
        }
        Ok(())
    }

    fn deal_remaining_community(&mut self) -> Result<(), GameError> {
        match self.stage {
            Stage::PreFlop => {
                self.deal_community(0, 3)?;
                self.deal_community(3, 1)?;
                self.deal_community(4, 1)
            }
            Stage::Flop => {
                self.deal_community(3, 1)?;
                self.deal_community(4, 1)
            }
            Stage::Turn => self.deal_community(4, 1),
            _ => Ok(()),
        }
    }

    // === Hand start helpers ===

    fn rotate_dealer(&mut self) {
        let current = self.players.iter().position(|p| p.is_dealer);
        for player in &mut self.players {
            player.is_dealer = false;
        }
        let n = self.players.len();
        let start = current.map_or(0, |i| i + 1);
        for offset in 0..n {
            let idx = (start + offset) % n;
            if self.players[idx].is_in_hand() {
                self.players[idx].is_dealer = true;
                return;
            }
        }
    }

    fn post_antes(&mut self) {
        if self.rules.ante == 0 {
            return;
        }
        let ante = self.rules.ante;
        for player in &mut self.players {
            if player.is_in_hand() {
                let paid = player.commit_ante(ante);
                self.pot_total += paid;
            }
        }
    }

    fn post_blinds(&mut self) {
        let dealer = self.dealer_seat().unwrap_or(0);
        let dealt = self.count(|p| p.is_live());

        // Heads-up: the button posts the small blind.
        let sb = if dealt == 2 {
            Some(dealer)
        } else {
            self.next_live_after(dealer)
        };
        let bb = sb.and_then(|sb| self.next_live_after(sb));

        if let Some(seat) = sb {
            let amount = self.rules.small_blind;
            if let Some(idx) = self.players.iter().position(|p| p.seat == seat) {
                let paid = self.round.post_blind(&mut self.players[idx], amount);
                self.pot_total += paid;
                debug!("seat {seat}: small blind {paid}");
            }
        }
        if let Some(seat) = bb {
            let amount = self.rules.big_blind;
            if let Some(idx) = self.players.iter().position(|p| p.seat == seat) {
                let paid = self.round.post_blind(&mut self.players[idx], amount);
                self.pot_total += paid;
                debug!("seat {seat}: big blind {paid}");
            }
        }
        self.small_blind_seat = sb;
        self.big_blind_seat = bb;
    }

    fn deal_hole_cards(&mut self) -> Result<(), GameError> {
        let deck = self.deck.as_mut().ok_or(DeckError::Exhausted)?;
        deck.burn(1)?;
        for player in &mut self.players {
            if player.is_live() {
                let cards = deck.deal_n(2)?;
                player.hole_cards = [cards[0], cards[1]];
            }
        }
        Ok(())
    }

    // === Settlement ===

    fn settle(&mut self, early_end: bool) {
        let total_pot = self.pot_total;
        let chips_before: Vec<(SeatIndex, Chips)> =
            self.players.iter().map(|p| (p.seat, p.chips)).collect();

        // Pots are re-derived from hand-cumulative contributions at
        // settlement so the last street's bets are always included.
        let pots = if self.players.iter().any(|p| p.status == PlayerStatus::AllIn) {
            build_pots(&self.players)
        } else {
            vec![SidePot {
                amount: self.pot_total,
                eligible: self
                    .players
                    .iter()
                    .filter(|p| p.is_live())
                    .map(|p| p.seat)
                    .collect(),
            }]
        };
        self.side_pots.clear();

        let qualified: Vec<(SeatIndex, HandValue)> = if early_end {
            Vec::new()
        } else {
            let board: Vec<Card> = self.community.iter().flatten().copied().collect();
            self.players
                .iter()
                .filter(|p| p.is_live())
                .map(|p| {
                    let mut cards = p.hole_cards.to_vec();
                    cards.extend(board.iter().copied());
                    (p.seat, evaluator::evaluate(&cards))
                })
                .collect()
        };

        for pot in &pots {
            if early_end {
                // Sole survivor takes every pot uncontested.
                if let Some(idx) = self.players.iter().position(|p| p.is_live()) {
                    self.players[idx].chips += pot.amount;
                }
                continue;
            }

            let mut contenders: Vec<&(SeatIndex, HandValue)> = qualified
                .iter()
                .filter(|(seat, _)| pot.eligible.contains(seat))
                .collect();
            if contenders.is_empty() {
                // Everyone eligible folded; the chips go to the seats
                // that reached showdown rather than vanishing.
                contenders = qualified.iter().collect();
            }
            let Some(best) = contenders.iter().map(|(_, v)| v).max().cloned() else {
                continue;
            };
            let mut winners: Vec<SeatIndex> = contenders
                .iter()
                .filter(|(_, v)| *v == best)
                .map(|(seat, _)| *seat)
                .collect();
            self.sort_by_button_distance(&mut winners);

            let share = pot.amount / winners.len() as Chips;
            let mut remainder = pot.amount % winners.len() as Chips;
            for seat in winners {
                let extra = if remainder > 0 {
                    remainder -= 1;
                    1
                } else {
                    0
                };
                if let Some(player) = self.seat_mut(seat) {
                    player.chips += share + extra;
                }
            }
        }

        self.pot_total = 0;

        let seats = self
            .players
            .iter()
            .filter(|p| p.is_live() || p.status == PlayerStatus::Folded)
            .map(|p| {
                let before = chips_before
                    .iter()
                    .find(|(seat, _)| *seat == p.seat)
                    .map_or(0, |(_, chips)| *chips);
                let hand = qualified
                    .iter()
                    .find(|(seat, _)| *seat == p.seat)
                    .map(|(_, v)| v.clone());
                SeatResult {
                    player_id: p.id,
                    name: p.name.clone(),
                    seat: p.seat,
                    hole_cards: p.hole_cards,
                    hand,
                    won: p.chips.saturating_sub(before),
                    chips_after: p.chips,
                    folded: p.status == PlayerStatus::Folded,
                    winner: p.chips > before,
                }
            })
            .collect();

        info!(
            "hand {} settled: pot {total_pot}, early_end={early_end}",
            self.hand_no
        );
        self.last_showdown = Some(ShowdownResult {
            seats,
            total_pot,
            early_end,
            pots,
        });
        self.current_actor = None;
    }

    /// Order seats by clockwise distance from the button, nearest first.
    /// The odd chip in a split goes to the front of this order.
    fn sort_by_button_distance(&self, seats: &mut [SeatIndex]) {
        let button = self.dealer_seat().unwrap_or(0);
        let n = self.rules.max_players;
        seats.sort_by_key(|&seat| (seat + n - button - 1) % n);
    }

    // === Queries ===

    fn count(&self, pred: impl Fn(&Player) -> bool) -> usize {
        self.players.iter().filter(|p| pred(p)).count()
    }

    fn seat_ref(&self, seat: SeatIndex) -> Option<&Player> {
        self.players.iter().find(|p| p.seat == seat)
    }

    fn seat_mut(&mut self, seat: SeatIndex) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.seat == seat)
    }

    /// Next seat clockwise after `seat` that can still act.
    fn next_in_hand_after(&self, seat: SeatIndex) -> Option<SeatIndex> {
        self.next_matching(seat, |p| p.is_in_hand())
    }

    /// Next seat clockwise after `seat` still contesting the pot.
    fn next_live_after(&self, seat: SeatIndex) -> Option<SeatIndex> {
        self.next_matching(seat, |p| p.is_live())
    }

    fn next_matching(
        &self,
        seat: SeatIndex,
        pred: impl Fn(&Player) -> bool,
    ) -> Option<SeatIndex> {
        let n = self.players.len();
        if n == 0 {
            return None;
        }
        // Position of the first seat strictly after `seat` (players are
        // sorted by seat index).
        let start = self
            .players
            .iter()
            .position(|p| p.seat > seat)
            .unwrap_or(0);
        for offset in 0..n {
            let player = &self.players[(start + offset) % n];
            if player.seat != seat && pred(player) {
                return Some(player.seat);
            }
        }
        None
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn player_by_id(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn dealer_seat(&self) -> Option<SeatIndex> {
        self.players.iter().find(|p| p.is_dealer).map(|p| p.seat)
    }

    #[must_use]
    pub fn current_actor(&self) -> Option<SeatIndex> {
        self.current_actor
    }

    #[must_use]
    pub fn current_actor_id(&self) -> Option<PlayerId> {
        self.current_actor
            .and_then(|seat| self.seat_ref(seat))
            .map(|p| p.id)
    }

    #[must_use]
    pub fn community(&self) -> &[Option<Card>; 5] {
        &self.community
    }

    #[must_use]
    pub fn pot_total(&self) -> Chips {
        self.pot_total
    }

    #[must_use]
    pub fn side_pots(&self) -> &[SidePot] {
        &self.side_pots
    }

    #[must_use]
    pub fn round(&self) -> &BettingRound {
        &self.round
    }

    #[must_use]
    pub fn last_showdown(&self) -> Option<&ShowdownResult> {
        self.last_showdown.as_ref()
    }

    #[must_use]
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    #[must_use]
    pub fn hand_no(&self) -> u64 {
        self.hand_no
    }

    /// Seats with chips left (the set that must ready-up between hands).
    #[must_use]
    pub fn seats_with_chips(&self) -> usize {
        self.count(|p| p.chips > 0)
    }

    /// All chips on the table: stacks plus everything committed to the
    /// current hand. Constant across any single applied action.
    #[must_use]
    pub fn chip_total(&self) -> Chips {
        self.players.iter().map(|p| p.chips).sum::<Chips>() + self.pot_total
    }

    /// Amount the given seat must add to call.
    #[must_use]
    pub fn call_amount(&self, id: PlayerId) -> Chips {
        self.player_by_id(id)
            .map_or(0, |p| self.round.current_bet.saturating_sub(p.round_bet))
    }

    /// Largest total the given seat can push this street.
    #[must_use]
    pub fn max_raise(&self, id: PlayerId) -> Chips {
        self.player_by_id(id).map_or(0, |p| p.round_bet + p.chips)
    }

    /// Smallest legal raise-to total.
    #[must_use]
    pub fn min_raise(&self) -> Chips {
        self.round.current_bet + self.round.min_raise_increment
    }
}
