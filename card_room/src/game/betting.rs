//! Per-street betting book: action validation and execution, plus the
//! side-pot partition used at street boundaries and settlement.
//!
//! The book never looks at turn order; the state machine owns that. It
//! answers one question (is this action legal, and what does it do to the
//! actor and the bet level) and reports whether the action reopened the
//! street so the caller can clear other seats' `has_acted`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{ActionKind, Chips, Player, PlayerStatus, SeatIndex};

/// Why an action was rejected. The hub translates these into protocol
/// error codes; game state is untouched whenever one is returned.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum BetError {
    #[error("cannot check, {to_call} to call")]
    CannotCheck { to_call: Chips },
    #[error("minimum raise is to {min_to}")]
    RaiseTooSmall { min_to: Chips },
    #[error("not enough chips for that raise")]
    InsufficientChips,
    #[error("betting is not reopened, call or fold")]
    BettingNotReopened,
}

/// One entry in the hand's append-only action trace.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LoggedAction {
    pub seat: SeatIndex,
    pub action: ActionKind,
    pub amount: Chips,
}

/// Book state for the street in progress.
#[derive(Clone, Debug)]
pub struct BettingRound {
    /// Highest per-player street commitment.
    pub current_bet: Chips,
    /// Size of the last full raise; a raise must reach
    /// `current_bet + min_raise_increment`. Starts at the big blind.
    pub min_raise_increment: Chips,
    big_blind: Chips,
    /// False after an underfull all-in until a full raise lands. While
    /// false, seats that already acted this street may only call or fold.
    pub bet_is_live: bool,
    /// Hand-scoped action trace.
    pub log: Vec<LoggedAction>,
}

impl BettingRound {
    #[must_use]
    pub fn new(big_blind: Chips) -> Self {
        Self {
            current_bet: 0,
            min_raise_increment: big_blind,
            big_blind,
            bet_is_live: true,
            log: Vec::new(),
        }
    }

    /// Reset for a new street. The action log carries across the hand.
    pub fn reset_street(&mut self) {
        self.current_bet = 0;
        self.min_raise_increment = self.big_blind;
        self.bet_is_live = true;
    }

    /// Post a forced bet (blind). Forced bets raise the bet level but do
    /// not count as the seat having acted.
    pub fn post_blind(&mut self, player: &mut Player, amount: Chips) -> Chips {
        let paid = player.commit(amount);
        if player.round_bet > self.current_bet {
            self.current_bet = player.round_bet;
        }
        paid
    }
}

/// What a successfully applied action did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BetOutcome {
    /// The action as applied; short calls and exact-stack raises come back
    /// coerced to `AllIn`.
    pub action: ActionKind,
    pub paid: Chips,
    /// The bet level rose: the caller must clear every other in-hand
    /// seat's `has_acted` so they respond to the new level. Whether they
    /// may re-raise is a separate question answered by `bet_is_live`.
    pub raised: bool,
}

/// Validate and apply one action for the current actor. On `Err`, neither
/// the player nor the book has changed.
pub fn apply_action(
    player: &mut Player,
    round: &mut BettingRound,
    kind: ActionKind,
    amount: Chips,
) -> Result<BetOutcome, BetError> {
    let outcome = match kind {
        ActionKind::Fold => {
            player.status = PlayerStatus::Folded;
            player.acted_this_round = true;
            BetOutcome { action: ActionKind::Fold, paid: 0, raised: false }
        }
        ActionKind::Check => {
            let to_call = round.current_bet.saturating_sub(player.round_bet);
            if to_call > 0 {
                return Err(BetError::CannotCheck { to_call });
            }
            player.has_acted = true;
            player.acted_this_round = true;
            BetOutcome { action: ActionKind::Check, paid: 0, raised: false }
        }
        ActionKind::Call => {
            let to_call = round.current_bet.saturating_sub(player.round_bet);
            let paid = player.commit(to_call);
            player.has_acted = true;
            player.acted_this_round = true;
            let action = if player.status == PlayerStatus::AllIn {
                ActionKind::AllIn
            } else {
                ActionKind::Call
            };
            BetOutcome { action, paid, raised: false }
        }
        ActionKind::Raise => {
            let delta = amount.saturating_sub(player.round_bet);
            if delta > player.chips {
                return Err(BetError::InsufficientChips);
            }
            if delta == player.chips {
                // Exact-stack raise request becomes a shove.
                return apply_action(player, round, ActionKind::AllIn, 0);
            }
            if player.acted_this_round && !round.bet_is_live {
                return Err(BetError::BettingNotReopened);
            }
            let min_to = round.current_bet + round.min_raise_increment;
            if amount < min_to {
                return Err(BetError::RaiseTooSmall { min_to });
            }
            let paid = player.commit(delta);
            round.min_raise_increment = amount - round.current_bet;
            round.current_bet = amount;
            round.bet_is_live = true;
            player.has_acted = true;
            player.acted_this_round = true;
            BetOutcome { action: ActionKind::Raise, paid, raised: true }
        }
        ActionKind::AllIn => {
            let to_call = round.current_bet.saturating_sub(player.round_bet);
            if player.acted_this_round && !round.bet_is_live && player.chips > to_call {
                // A shove past the call amount is a raise, and the street
                // is not reopened for this seat.
                return Err(BetError::BettingNotReopened);
            }
            let paid = player.commit(player.chips);
            player.has_acted = true;
            player.acted_this_round = true;
            let mut raised = false;
            if player.round_bet > round.current_bet {
                let raise_delta = player.round_bet - round.current_bet;
                round.current_bet = player.round_bet;
                raised = true;
                if raise_delta >= round.min_raise_increment {
                    round.min_raise_increment = raise_delta;
                    round.bet_is_live = true;
                } else {
                    // Underfull all-in: the bet level moves but the street
                    // does not reopen for seats that already acted.
                    round.bet_is_live = false;
                }
            }
            BetOutcome { action: ActionKind::AllIn, paid, raised }
        }
    };

    round.log.push(LoggedAction {
        seat: player.seat,
        action: outcome.action,
        amount: player.round_bet,
    });
    Ok(outcome)
}

/// A pot a subset of seats can win.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SidePot {
    pub amount: Chips,
    /// Seats eligible to win this pot, in seat order.
    pub eligible: Vec<SeatIndex>,
}

/// Partition the hand's cumulative contributions into level pots.
///
/// Levels are the distinct totals of live (non-folded) seats, ascending.
/// Every chip contributed, folded seats' included, lands in the pot for
/// its level; eligibility at each level is restricted to live seats that
/// matched it. Folded contributions above the top live level spill into
/// the last pot so nothing is ever lost.
#[must_use]
pub fn build_pots(players: &[Player]) -> Vec<SidePot> {
    let contributors: Vec<(&Player, Chips)> = players
        .iter()
        .filter(|p| p.total_bet > 0)
        .map(|p| (p, p.total_bet))
        .collect();

    let mut levels: Vec<Chips> = contributors
        .iter()
        .filter(|(p, _)| p.is_live())
        .map(|(_, total)| *total)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    if levels.is_empty() {
        // Only folded seats contributed; a single pot with no restriction.
        let amount = contributors.iter().map(|(_, t)| *t).sum();
        return vec![SidePot { amount, eligible: Vec::new() }];
    }

    let mut pots = Vec::with_capacity(levels.len());
    let mut prev = 0;
    for &level in &levels {
        let mut amount = 0;
        let mut eligible = Vec::new();
        for &(player, total) in &contributors {
            amount += total.min(level) - total.min(prev);
            if player.is_live() && total >= level {
                eligible.push(player.seat);
            }
        }
        pots.push(SidePot { amount, eligible });
        prev = level;
    }

    // Folded chips beyond the largest live commitment.
    let residue: Chips = contributors
        .iter()
        .map(|&(_, total)| total.saturating_sub(prev))
        .sum();
    if residue > 0 {
        if let Some(last) = pots.last_mut() {
            last.amount += residue;
        }
    }

    pots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Player;

    fn seated(seat: SeatIndex, chips: Chips) -> Player {
        let mut player = Player::new(format!("p{seat}"), seat, chips);
        player.status = PlayerStatus::InHand;
        player
    }

    // === Action validation ===

    #[test]
    fn test_check_rejected_when_facing_a_bet() {
        let mut round = BettingRound::new(20);
        round.current_bet = 50;
        let mut player = seated(0, 1000);
        let err = apply_action(&mut player, &mut round, ActionKind::Check, 0).unwrap_err();
        assert_eq!(err, BetError::CannotCheck { to_call: 50 });
        assert_eq!(player.chips, 1000);
        assert!(!player.has_acted);
    }

    #[test]
    fn test_check_legal_when_matched() {
        let mut round = BettingRound::new(20);
        round.current_bet = 50;
        let mut player = seated(0, 1000);
        player.round_bet = 50;
        let outcome = apply_action(&mut player, &mut round, ActionKind::Check, 0).unwrap();
        assert_eq!(outcome.action, ActionKind::Check);
        assert!(player.has_acted);
    }

    #[test]
    fn test_call_pays_the_difference() {
        let mut round = BettingRound::new(20);
        round.current_bet = 100;
        let mut player = seated(0, 1000);
        player.round_bet = 20;
        let outcome = apply_action(&mut player, &mut round, ActionKind::Call, 0).unwrap();
        assert_eq!(outcome.paid, 80);
        assert_eq!(player.round_bet, 100);
        assert_eq!(player.chips, 920);
        assert_eq!(player.status, PlayerStatus::InHand);
    }

    #[test]
    fn test_short_call_coerced_to_all_in() {
        let mut round = BettingRound::new(20);
        round.current_bet = 500;
        let mut player = seated(0, 120);
        let outcome = apply_action(&mut player, &mut round, ActionKind::Call, 0).unwrap();
        assert_eq!(outcome.action, ActionKind::AllIn);
        assert_eq!(outcome.paid, 120);
        assert_eq!(player.status, PlayerStatus::AllIn);
        // A short call never moves the bet level.
        assert_eq!(round.current_bet, 500);
    }

    #[test]
    fn test_raise_below_minimum_rejected() {
        let mut round = BettingRound::new(20);
        round.current_bet = 100;
        round.min_raise_increment = 80;
        let mut player = seated(0, 1000);
        let err = apply_action(&mut player, &mut round, ActionKind::Raise, 150).unwrap_err();
        assert_eq!(err, BetError::RaiseTooSmall { min_to: 180 });
    }

    #[test]
    fn test_raise_updates_bet_and_increment() {
        let mut round = BettingRound::new(20);
        round.current_bet = 100;
        round.min_raise_increment = 80;
        let mut player = seated(0, 1000);
        player.round_bet = 20;
        let outcome = apply_action(&mut player, &mut round, ActionKind::Raise, 250).unwrap();
        assert!(outcome.raised);
        assert_eq!(outcome.paid, 230);
        assert_eq!(round.current_bet, 250);
        assert_eq!(round.min_raise_increment, 150);
        assert!(round.bet_is_live);
    }

    #[test]
    fn test_exact_stack_raise_becomes_all_in() {
        let mut round = BettingRound::new(20);
        round.current_bet = 100;
        let mut player = seated(0, 150);
        let outcome = apply_action(&mut player, &mut round, ActionKind::Raise, 150).unwrap();
        assert_eq!(outcome.action, ActionKind::AllIn);
        assert_eq!(player.status, PlayerStatus::AllIn);
        assert_eq!(round.current_bet, 150);
    }

    #[test]
    fn test_full_raise_all_in_reopens() {
        let mut round = BettingRound::new(20);
        round.current_bet = 100;
        round.min_raise_increment = 80;
        let mut player = seated(0, 300);
        let outcome = apply_action(&mut player, &mut round, ActionKind::AllIn, 0).unwrap();
        assert!(outcome.raised);
        assert!(round.bet_is_live);
        assert_eq!(round.current_bet, 300);
        assert_eq!(round.min_raise_increment, 200);
        assert!(round.bet_is_live);
    }

    #[test]
    fn test_underfull_all_in_moves_bet_without_reopening() {
        let mut round = BettingRound::new(20);
        round.current_bet = 250;
        round.min_raise_increment = 150;
        let mut player = seated(0, 320);
        let outcome = apply_action(&mut player, &mut round, ActionKind::AllIn, 0).unwrap();
        // The bet level moved, so others respond, but it is not live.
        assert!(outcome.raised);
        assert_eq!(round.current_bet, 320);
        // Increment untouched by the 70-chip underfull shove.
        assert_eq!(round.min_raise_increment, 150);
        assert!(!round.bet_is_live);
    }

    #[test]
    fn test_prior_actor_cannot_raise_after_underfull_all_in() {
        let mut round = BettingRound::new(20);
        round.current_bet = 320;
        round.min_raise_increment = 150;
        round.bet_is_live = false;
        let mut player = seated(0, 2000);
        player.round_bet = 100;
        player.acted_this_round = true;
        let err = apply_action(&mut player, &mut round, ActionKind::Raise, 500).unwrap_err();
        assert_eq!(err, BetError::BettingNotReopened);
        // Shoving past the call amount is a raise too.
        let err = apply_action(&mut player, &mut round, ActionKind::AllIn, 0).unwrap_err();
        assert_eq!(err, BetError::BettingNotReopened);
        // Calling is still open.
        let outcome = apply_action(&mut player, &mut round, ActionKind::Call, 0).unwrap();
        assert_eq!(outcome.paid, 220);
    }

    #[test]
    fn test_fresh_actor_may_raise_into_dead_bet() {
        let mut round = BettingRound::new(20);
        round.current_bet = 320;
        round.min_raise_increment = 150;
        round.bet_is_live = false;
        let mut player = seated(0, 2000);
        let outcome = apply_action(&mut player, &mut round, ActionKind::Raise, 470).unwrap();
        assert!(outcome.raised);
        assert!(round.bet_is_live);
    }

    #[test]
    fn test_blinds_do_not_count_as_acting() {
        let mut round = BettingRound::new(20);
        let mut player = seated(0, 1000);
        round.post_blind(&mut player, 20);
        assert_eq!(round.current_bet, 20);
        assert_eq!(player.round_bet, 20);
        assert!(!player.has_acted);
        assert!(!player.acted_this_round);
    }

    #[test]
    fn test_log_records_running_totals() {
        let mut round = BettingRound::new(20);
        let mut player = seated(3, 1000);
        apply_action(&mut player, &mut round, ActionKind::Raise, 60).unwrap();
        assert_eq!(
            round.log,
            vec![LoggedAction { seat: 3, action: ActionKind::Raise, amount: 60 }]
        );
    }

    // === Side pots ===

    fn contributor(seat: SeatIndex, total: Chips, status: PlayerStatus) -> Player {
        let mut player = Player::new(format!("p{seat}"), seat, 0);
        player.total_bet = total;
        player.status = status;
        player
    }

    #[test]
    fn test_single_all_in_splits_two_pots() {
        let players = vec![
            contributor(0, 100, PlayerStatus::AllIn),
            contributor(1, 500, PlayerStatus::AllIn),
            contributor(2, 500, PlayerStatus::InHand),
        ];
        let pots = build_pots(&players);
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].amount, 300);
        assert_eq!(pots[0].eligible, vec![0, 1, 2]);
        assert_eq!(pots[1].amount, 800);
        assert_eq!(pots[1].eligible, vec![1, 2]);
    }

    #[test]
    fn test_folded_chips_stay_in_without_eligibility() {
        let players = vec![
            contributor(0, 60, PlayerStatus::Folded),
            contributor(1, 200, PlayerStatus::AllIn),
            contributor(2, 200, PlayerStatus::InHand),
        ];
        let pots = build_pots(&players);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 460);
        assert_eq!(pots[0].eligible, vec![1, 2]);
    }

    #[test]
    fn test_folded_overage_spills_into_last_pot() {
        // Seat 2 folded after committing more than anyone live matched.
        let players = vec![
            contributor(0, 100, PlayerStatus::AllIn),
            contributor(1, 300, PlayerStatus::InHand),
            contributor(2, 400, PlayerStatus::Folded),
        ];
        let pots = build_pots(&players);
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].amount, 300);
        assert_eq!(pots[0].eligible, vec![0, 1]);
        // 200 from each of seats 1,2 above level 100, plus seat 2's
        // extra 100 over the top live level.
        assert_eq!(pots[1].amount, 500);
        assert_eq!(pots[1].eligible, vec![1]);
        let total: Chips = pots.iter().map(|p| p.amount).sum();
        assert_eq!(total, 800);
    }

    #[test]
    fn test_three_level_partition() {
        let players = vec![
            contributor(0, 50, PlayerStatus::AllIn),
            contributor(1, 150, PlayerStatus::AllIn),
            contributor(2, 400, PlayerStatus::AllIn),
            contributor(3, 400, PlayerStatus::InHand),
        ];
        let pots = build_pots(&players);
        assert_eq!(pots.len(), 3);
        assert_eq!(pots[0].amount, 200); // 50 x 4
        assert_eq!(pots[1].amount, 300); // 100 x 3
        assert_eq!(pots[2].amount, 500); // 250 x 2
        assert_eq!(pots[2].eligible, vec![2, 3]);
    }

    #[test]
    fn test_equal_totals_make_one_pot() {
        let players = vec![
            contributor(0, 20, PlayerStatus::InHand),
            contributor(1, 20, PlayerStatus::InHand),
            contributor(2, 20, PlayerStatus::AllIn),
        ];
        let pots = build_pots(&players);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 60);
        assert_eq!(pots[0].eligible, vec![0, 1, 2]);
    }
}
