use game_core::ZonePosition;

mod common;

use common::two_player_game;

fn draws(seed: u64) -> Vec<u32> {
    let mut game = two_player_game(seed);
    (0..32).map(|_| game.random_int(100).unwrap()).collect()
}

#[test]
fn same_seed_reproduces_random_draws() {
    assert_eq!(draws(42), draws(42));
    assert_ne!(draws(42), draws(43));
}

#[test]
fn same_seed_reproduces_shuffles() {
    let shuffled = |seed: u64| {
        let mut game = two_player_game(seed);
        let deck = game.create_zone(Some(game.first_player()), "Deck").unwrap();
        for _ in 0..20 {
            game.create_card(deck, ZonePosition::Bottom).unwrap();
        }
        game.shuffle_zone(deck).unwrap();
        game.zone_cards(deck).unwrap()
    };

    assert_eq!(shuffled(7), shuffled(7));
}
