//! Invariants that must hold after every applied event, exercised over
//! whole multi-hand sessions.

use card_room::game::engine::{Game, GameError, GameRules, Stage};
use card_room::game::entities::{
    ACE, ActionKind, Card, Chips, Deck, KING, PlayerStatus, Suit,
};

fn assert_invariants(game: &Game, bank: Chips) {
    // Chip conservation across stacks and the pot.
    assert_eq!(game.chip_total(), bank, "chip conservation violated");

    // At most one actor, and that seat can actually act.
    if let Some(seat) = game.current_actor() {
        let actor = game.players().iter().find(|p| p.seat == seat).unwrap();
        assert_eq!(actor.status, PlayerStatus::InHand);
    }

    // Acted at the current level means matched (all-in seats are exempt
    // by status).
    for player in game.players() {
        if player.is_in_hand() && player.has_acted {
            assert_eq!(
                player.round_bet,
                game.round().current_bet,
                "seat {} marked acted below the bet level",
                player.seat
            );
        }
        // Committed amounts can never exceed what the seat brought.
        assert!(player.round_bet <= player.total_bet);
    }

    // Community slots fill strictly in order.
    let mut seen_empty = false;
    for slot in game.community() {
        if slot.is_none() {
            seen_empty = true;
        } else {
            assert!(!seen_empty, "community slot filled after a gap");
        }
    }
}

/// Deterministic policy: raise when the seat has not yet acted this
/// street and can afford it, otherwise call or check.
fn pick_action(game: &Game, step: usize) -> (ActionKind, Chips) {
    let seat = game.current_actor().unwrap();
    let player = game.players().iter().find(|p| p.seat == seat).unwrap();
    let to_call = game.round().current_bet - player.round_bet;

    if step % 5 == 0 && !player.acted_this_round && player.chips > to_call + 40 {
        (ActionKind::Raise, game.min_raise())
    } else if step % 11 == 0 {
        (ActionKind::Fold, 0)
    } else if to_call == 0 {
        (ActionKind::Check, 0)
    } else {
        (ActionKind::Call, 0)
    }
}

#[test]
fn test_invariants_hold_across_many_hands() {
    let mut game = Game::new(GameRules::default());
    for i in 0..4 {
        game.add_player(&format!("p{i}"), None).unwrap();
    }
    let bank = 4000;

    let mut step = 0;
    for seed in 0..12u64 {
        if game.seats_with_chips() < 2 {
            break;
        }
        match game.start_hand(seed) {
            Ok(()) => {}
            Err(GameError::NotEnoughPlayers { .. }) => break,
            Err(err) => panic!("start failed: {err}"),
        }
        assert_invariants(&game, bank);

        let mut actions = 0;
        while game.stage().is_betting() {
            actions += 1;
            assert!(actions < 200, "hand did not terminate");
            step += 1;
            let actor = game.current_actor_id().unwrap();
            let (kind, amount) = pick_action(&game, step);
            match game.apply_player_action(actor, kind, amount) {
                Ok(_) => {}
                // The policy may pick an illegal raise (not reopened);
                // rejection must leave everything intact, then call.
                Err(GameError::Bet(_)) => {
                    assert_invariants(&game, bank);
                    game.apply_player_action(actor, ActionKind::Call, 0).unwrap();
                }
                Err(err) => panic!("action failed: {err}"),
            }
            assert_invariants(&game, bank);
        }

        assert_eq!(game.stage(), Stage::Showdown);
        let result = game.last_showdown().unwrap();
        let paid_out: Chips = result.seats.iter().map(|s| s.won).sum();
        assert_eq!(paid_out, result.total_pot, "settlement must pay the whole pot");
        game.end_hand();
        assert_invariants(&game, bank);
    }
}

#[test]
fn test_busted_seat_sits_out_and_table_waits() {
    // Both all-in pre-flop; aces hold against kings on a dry board.
    let stacked = [
        Card(5, Suit::Club), // burn
        Card(ACE, Suit::Spade),
        Card(ACE, Suit::Heart),
        Card(KING, Suit::Spade),
        Card(KING, Suit::Heart),
        Card(5, Suit::Diamond), // burn
        Card(2, Suit::Club),
        Card(7, Suit::Diamond),
        Card(9, Suit::Heart),
        Card(5, Suit::Heart), // burn
        Card(3, Suit::Spade),
        Card(5, Suit::Spade), // burn
        Card(4, Suit::Diamond),
    ];
    let mut game = Game::new(GameRules::default());
    let a = game.add_player("a", None).unwrap().id;
    let b = game.add_player("b", None).unwrap().id;
    game.start_hand_with_deck(Deck::stacked(&stacked)).unwrap();

    game.apply_player_action(a, ActionKind::AllIn, 0).unwrap();
    game.apply_player_action(b, ActionKind::AllIn, 0).unwrap();

    assert_eq!(game.stage(), Stage::Showdown);
    assert_eq!(game.player_by_id(a).unwrap().chips, 2000);
    assert_eq!(game.player_by_id(b).unwrap().chips, 0);
    game.end_hand();

    // One stack left: the next hand cannot start and the table waits.
    assert_eq!(game.seats_with_chips(), 1);
    assert_eq!(
        game.start_hand(2).unwrap_err(),
        GameError::NotEnoughPlayers { needed: 2 }
    );
    assert_eq!(game.stage(), Stage::Waiting);
    assert_eq!(
        game.player_by_id(b).unwrap().status,
        PlayerStatus::BustedOut
    );
}

#[test]
fn test_big_blind_gets_the_option() {
    let mut game = Game::new(GameRules::default());
    let a = game.add_player("a", None).unwrap().id;
    let b = game.add_player("b", None).unwrap().id;
    let c = game.add_player("c", None).unwrap().id;
    game.start_hand(31).unwrap();

    // Everyone limps to the big blind; the street must not close until
    // the big blind has spoken.
    game.apply_player_action(a, ActionKind::Call, 0).unwrap();
    game.apply_player_action(b, ActionKind::Call, 0).unwrap();
    assert_eq!(game.stage(), Stage::PreFlop);
    assert_eq!(game.current_actor_id(), Some(c));

    // The option is a real one: the big blind may raise.
    game.apply_player_action(c, ActionKind::Raise, 60).unwrap();
    assert_eq!(game.round().current_bet, 60);
    assert_eq!(game.current_actor_id(), Some(a));
    game.apply_player_action(a, ActionKind::Call, 0).unwrap();
    game.apply_player_action(b, ActionKind::Call, 0).unwrap();
    assert_eq!(game.stage(), Stage::Flop);
    assert_eq!(game.pot_total(), 180);
}
