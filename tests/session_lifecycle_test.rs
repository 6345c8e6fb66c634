//! End-to-end session lifecycle through `SessionManager`
//! Randomness is pinned with `ScriptedRandom` so every outcome is exact

use gamehall::config::JackpotConfig;
use gamehall::games::{
    GameCatalog, GameType, InMemoryWallet, JackpotAccumulator, PlayerAction, RoundDetail,
    SessionManager, SessionStatus, SettlementGateway,
};
use gamehall::{ErrorKind, GameError};
use serde_json::json;
use std::sync::Arc;

mod common;
use common::ScriptedRandom;

const OPENING: u64 = 1_000_000;

struct Harness {
    manager: Arc<SessionManager>,
    rng: ScriptedRandom,
    wallet: Arc<InMemoryWallet>,
}

fn harness() -> Harness {
    let rng = ScriptedRandom::new(2024);
    let wallet = Arc::new(InMemoryWallet::new(OPENING));
    let manager = SessionManager::new(
        GameCatalog::standard(),
        Arc::new(JackpotAccumulator::new(&JackpotConfig::default())),
        wallet.clone(),
        Arc::new(rng.clone()),
        200,
    );
    Harness {
        manager: Arc::new(manager),
        rng,
        wallet,
    }
}

/// Shuffle draws that leave a 12-cell treasure grid in table order:
/// coins 0..=5, bombs 6..=8, doubles 9..=10, triple 11
fn identity_treasure_shuffle(rng: &ScriptedRandom) {
    rng.push_integers(&(1..=11).rev().collect::<Vec<u32>>());
}

fn reveal(index: usize) -> PlayerAction {
    PlayerAction::new("reveal", json!({ "index": index }))
}

#[tokio::test]
async fn test_dice_seven_pays_five_times() {
    let h = harness();
    let started = h
        .manager
        .start("alice", GameType::Dice, 1_000, None)
        .await
        .unwrap();

    h.rng.push_integers(&[3, 4]);
    let outcome = h
        .manager
        .action(
            "alice",
            GameType::Dice,
            &started.session_id,
            PlayerAction::new("roll", json!({ "betType": "seven" })),
        )
        .await
        .unwrap();

    assert_eq!(outcome.status, SessionStatus::Completed);
    let result = outcome.terminal_result.unwrap();
    assert!(result.won);
    assert_eq!(result.payout, 5_000);
    match result.detail {
        RoundDetail::Dice { dice, sum, .. } => {
            assert_eq!(dice, [3, 4]);
            assert_eq!(sum, 7);
        }
        other => panic!("unexpected detail {:?}", other),
    }
    assert_eq!(h.wallet.balance("alice").await.unwrap(), OPENING + 4_000);
}

#[tokio::test]
async fn test_treasure_coin_double_cashout() {
    let h = harness();
    identity_treasure_shuffle(&h.rng);
    let started = h
        .manager
        .start("alice", GameType::Treasure, 10_000, None)
        .await
        .unwrap();
    let id = started.session_id.as_str();

    let coin = h
        .manager
        .action("alice", GameType::Treasure, id, reveal(0))
        .await
        .unwrap();
    assert!(coin.cashout_eligible);
    assert!(matches!(coin.detail, RoundDetail::Treasure { pot: 5_000, .. }));

    let double = h
        .manager
        .action("alice", GameType::Treasure, id, reveal(9))
        .await
        .unwrap();
    assert!(matches!(double.detail, RoundDetail::Treasure { pot: 10_000, .. }));

    let cashout = h
        .manager
        .cashout("alice", GameType::Treasure, id)
        .await
        .unwrap();
    assert_eq!(cashout.settlement_amount, 10_000);

    let snapshot = h.manager.session("alice", id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Completed);
    assert_eq!(h.wallet.balance("alice").await.unwrap(), OPENING);
}

/// Shuffle draws that deal 2, 3, 4 of clubs in that order
fn ascending_clubs_shuffle(rng: &ScriptedRandom) {
    rng.push_integers(&[0, 1, 2]);
    rng.push_integers(&(1..=48).rev().collect::<Vec<u32>>());
}

#[tokio::test]
async fn test_card_flip_two_wins_then_cashout() {
    let h = harness();
    ascending_clubs_shuffle(&h.rng);
    let started = h
        .manager
        .start("alice", GameType::CardFlip, 1_000, None)
        .await
        .unwrap();
    let id = started.session_id.as_str();

    for streak in 1..=2 {
        let step = h
            .manager
            .action(
                "alice",
                GameType::CardFlip,
                id,
                PlayerAction::new("guess", json!({ "guess": "higher" })),
            )
            .await
            .unwrap();
        assert_eq!(step.status, SessionStatus::Active);
        assert!(step.cashout_eligible);
        assert!(matches!(step.detail, RoundDetail::CardFlip { correct: true, streak: s, .. } if s == streak));
    }

    let cashout = h
        .manager
        .cashout("alice", GameType::CardFlip, id)
        .await
        .unwrap();
    // floor(1000 x 1.5 x 1.75)
    assert_eq!(cashout.settlement_amount, 2_625);
    assert_eq!(h.wallet.balance("alice").await.unwrap(), OPENING + 1_625);

    let snapshot = h.manager.session("alice", id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Completed);
    assert!(!snapshot.cashout_eligible);
    let wire = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(wire["cashoutEligible"], false);
    assert!(wire["state"].get("cashoutEligible").is_none());
}

#[tokio::test]
async fn test_revealing_twice_is_a_conflict() {
    let h = harness();
    identity_treasure_shuffle(&h.rng);
    let started = h
        .manager
        .start("alice", GameType::Treasure, 1_000, None)
        .await
        .unwrap();
    let id = started.session_id.as_str();

    h.manager
        .action("alice", GameType::Treasure, id, reveal(2))
        .await
        .unwrap();
    let err = h
        .manager
        .action("alice", GameType::Treasure, id, reveal(2))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StateConflict);

    // Pot unchanged by the rejected reveal
    let cashout = h
        .manager
        .cashout("alice", GameType::Treasure, id)
        .await
        .unwrap();
    assert_eq!(cashout.settlement_amount, 500);
}

#[tokio::test]
async fn test_bet_bounds_for_every_game() {
    let h = harness();
    for game in h.manager.list_games() {
        assert!(h
            .manager
            .start("alice", game.game_type, game.min_bet, None)
            .await
            .is_ok());
        assert!(h
            .manager
            .start("alice", game.game_type, game.max_bet, None)
            .await
            .is_ok());

        for bet in [game.min_bet - 1, game.max_bet + 1] {
            let err = h
                .manager
                .start("alice", game.game_type, bet, None)
                .await
                .unwrap_err();
            assert!(matches!(err, GameError::InvalidBet { .. }));
        }
    }
}

#[tokio::test]
async fn test_cashout_before_any_win_is_rejected() {
    let h = harness();
    for game in GameType::ALL.iter().filter(|g| g.is_push_your_luck()) {
        let started = h.manager.start("alice", *game, 1_000, None).await.unwrap();
        let err = h
            .manager
            .cashout("alice", *game, &started.session_id)
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::NotCashoutEligible(_)), "{}", game);

        let snapshot = h.manager.session("alice", &started.session_id).await.unwrap();
        assert_eq!(snapshot.status, SessionStatus::Active);
    }
}

#[tokio::test]
async fn test_racing_cashouts_settle_once() {
    let h = harness();
    identity_treasure_shuffle(&h.rng);
    let started = h
        .manager
        .start("alice", GameType::Treasure, 2_000, None)
        .await
        .unwrap();
    h.manager
        .action("alice", GameType::Treasure, &started.session_id, reveal(11))
        .await
        .unwrap();

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let manager = h.manager.clone();
            let id = started.session_id.clone();
            tokio::spawn(async move { manager.cashout("alice", GameType::Treasure, &id).await })
        })
        .collect();

    let mut paid = Vec::new();
    let mut conflicts = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(outcome) => paid.push(outcome.settlement_amount),
            Err(GameError::SessionAlreadyCompleted(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }
    assert_eq!(paid, vec![6_000]);
    assert_eq!(conflicts, 3);
    assert_eq!(h.wallet.balance("alice").await.unwrap(), OPENING + 4_000);
}

#[tokio::test]
async fn test_concurrent_jackpots_share_one_pool() {
    let h = harness();

    // A losing spin feeds 2% of 50 000 into the pool
    let feeder = h
        .manager
        .start("carol", GameType::Slots, 50_000, None)
        .await
        .unwrap();
    h.rng.push_integers(&[1, 2, 3]);
    h.manager
        .action(
            "carol",
            GameType::Slots,
            &feeder.session_id,
            PlayerAction::new("spin", json!(null)),
        )
        .await
        .unwrap();
    assert_eq!(h.manager.jackpot(GameType::Slots).unwrap().amount, 11_000);

    let mut ids = Vec::new();
    for player in ["alice", "bob"] {
        let started = h
            .manager
            .start(player, GameType::Slots, 100, None)
            .await
            .unwrap();
        ids.push((player, started.session_id));
    }

    // Sevens on all six reels
    h.rng.push_integers(&[5; 6]);
    let tasks: Vec<_> = ids
        .into_iter()
        .map(|(player, id)| {
            let manager = h.manager.clone();
            tokio::spawn(async move {
                manager
                    .action(
                        player,
                        GameType::Slots,
                        &id,
                        PlayerAction::new("spin", json!(null)),
                    )
                    .await
            })
        })
        .collect();

    let mut payouts = Vec::new();
    for task in tasks {
        let outcome = task.await.unwrap().unwrap();
        payouts.push(outcome.terminal_result.unwrap().payout);
    }
    payouts.sort_unstable();

    assert_eq!(payouts, vec![10_000, 11_000]);
    let pool = h.manager.jackpot(GameType::Slots).unwrap();
    assert_eq!(pool.amount, 10_000);
    assert!(pool.last_winner.is_some());
}

#[tokio::test]
async fn test_history_lists_completed_sessions_newest_first() {
    let h = harness();
    for roll in [[1, 1], [6, 5]] {
        let started = h
            .manager
            .start("alice", GameType::Dice, 100, None)
            .await
            .unwrap();
        h.rng.push_integers(&roll);
        h.manager
            .action(
                "alice",
                GameType::Dice,
                &started.session_id,
                PlayerAction::new("roll", json!({ "betType": "high" })),
            )
            .await
            .unwrap();
    }

    let history = h.manager.history("alice", GameType::Dice, 0, 10);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].outcome, "won");
    assert_eq!(history[0].payout, 200);
    assert_eq!(history[1].outcome, "lost");
    assert!(h.manager.history("alice", GameType::Wheel, 0, 10).is_empty());
}
