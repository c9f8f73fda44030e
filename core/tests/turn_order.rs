use game_core::{keys, Game, GameConfig};

mod common;

use common::{record_changes, two_player_game};

/// 2인 게임에서 N 번 턴을 넘기면 턴 번호는 1 + N/2 가 된다.
#[test]
fn turn_number_grows_once_per_full_cycle() {
    for n in 0..12u32 {
        let mut game = two_player_game(1);
        for _ in 0..n {
            game.advance_turn();
        }
        assert_eq!(game.turn_number(), 1 + n / 2, "after {} advances", n);
    }
}

#[test]
fn current_player_cycles_through_all_players() {
    let mut game = Game::new(GameConfig {
        player_names: vec!["a".into(), "b".into(), "c".into()],
        ..GameConfig::default()
    })
    .unwrap();
    let players = game.players().to_vec();

    let mut seen = Vec::new();
    for _ in 0..6 {
        game.advance_turn();
        seen.push(game.current_player().unwrap());
    }

    let expected: Vec<_> = players.iter().chain(players.iter()).copied().collect();
    assert_eq!(seen, expected);
    // 마지막 플레이어 차례가 될 때마다 1 씩
    assert_eq!(game.turn_number(), 3);
}

#[test]
fn advance_after_game_over_is_not_blocked() {
    let mut game = two_player_game(0);
    game.advance_turn();
    game.game_over();

    game.advance_turn();
    assert!(game.is_game_over());
    assert_eq!(game.current_player(), Some(game.last_player()));
}

#[test]
fn turn_state_is_reported_on_the_root() {
    let mut game = two_player_game(0);
    let log = record_changes(&mut game);

    game.advance_turn();
    game.advance_turn();

    let root_keys = common::keys_for(&log, game.root());
    assert_eq!(
        root_keys,
        vec![keys::CURRENT_PLAYER, keys::CURRENT_PLAYER, keys::TURN_NUMBER]
    );
}
