//! Core game logic: cards, hand evaluation, betting, and the hand state
//! machine, plus the per-recipient snapshot projection.

pub mod betting;
pub mod engine;
pub mod entities;
pub mod evaluator;
pub mod view;

pub use betting::{BetError, BettingRound, SidePot};
pub use engine::{ActionOutcome, Game, GameError, GameRules, SeatResult, ShowdownResult, Stage};
pub use entities::{ActionKind, Card, Chips, Deck, Player, PlayerId, PlayerStatus, SeatIndex};
pub use evaluator::{HandCategory, HandValue, evaluate};
pub use view::{GameStateView, PlayerInfo, project_for};
