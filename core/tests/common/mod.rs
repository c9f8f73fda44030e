#![allow(dead_code)]

use std::sync::Arc;

use game_core::{Game, GameConfig, StateChange};
use parking_lot::Mutex;

/// 고정 시드의 2인 게임.
pub fn two_player_game(seed: u64) -> Game {
    Game::new(GameConfig {
        seed,
        ..GameConfig::default()
    })
    .expect("default config has players")
}

/// 리스너로 나간 상태 변경을 모두 모은다.
pub fn record_changes(game: &mut Game) -> Arc<Mutex<Vec<StateChange>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    game.set_listener(move |change: &StateChange| sink.lock().push(change.clone()));
    log
}

pub fn keys_for(log: &Mutex<Vec<StateChange>>, entity: game_core::EntityId) -> Vec<String> {
    log.lock()
        .iter()
        .filter(|c| c.entity == entity)
        .map(|c| c.key.clone())
        .collect()
}
