use serde::{Deserialize, Serialize};

use crate::ecs::EntityId;

/// 외부로 보이는 상태 변경 한 건.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub entity: EntityId,
    pub key: String,
    pub value: serde_json::Value,
}

/// 엔진 밖과의 유일한 동기화 지점. 구현은 빠르게 반환해야 한다 (큐에 넣기만 할 것).
pub trait StateChangeListener: Send {
    fn on_change(&mut self, change: &StateChange);
}

impl<F> StateChangeListener for F
where
    F: FnMut(&StateChange) + Send,
{
    fn on_change(&mut self, change: &StateChange) {
        self(change)
    }
}

/// 엔진이 직접 보고하는 키. 자원은 자원 이름, 속성은 속성 키를 그대로 쓴다.
pub mod keys {
    pub const TURN_NUMBER: &str = "turnNumber";
    pub const CURRENT_PLAYER: &str = "currentPlayer";
    pub const GAME_OVER: &str = "gameOver";
    pub const ZONE: &str = "zone";
    pub const CARDS: &str = "cards";
    pub const REMOVED: &str = "removed";
}
