//! 룰 컨텐츠가 게임에 연결되는 지점.

use crate::{error::GameResult, game::Game};

/// 한 게임 타입의 규칙 묶음.
///
/// `setup` 은 플레이어가 배정된 직후, 첫 턴 전에 한 번 호출된다. 이 안에서 구역과
/// 카드를 만들고 이벤트 핸들러, 모디파이어, 액션을 등록한다.
pub trait RulePack: Send + Sync {
    fn name(&self) -> &str;

    fn player_names(&self) -> Vec<String> {
        vec!["Player1".to_string(), "Player2".to_string()]
    }

    fn setup(&self, game: &mut Game) -> GameResult<()>;
}
