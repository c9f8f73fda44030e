use std::{collections::HashMap, sync::Arc};

use game_core::{Game, GameResult, RulePack, UsableAction};
use tracing::info;

pub const DEFAULT_GAME_TYPE: &str = "default";
pub const END_TURN: &str = "End Turn";
pub const LAYOUT_ZONES: [&str; 3] = ["Deck", "Hand", "Battlefield"];

/// 게임 타입 이름 → 룰 팩. 서버 시작 시 한 번 구성한다.
#[derive(Clone, Default)]
pub struct GameTypeRegistry {
    packs: HashMap<String, Arc<dyn RulePack>>,
}

impl GameTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `"default"` 레이아웃이 등록된 레지스트리.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DefaultLayout));
        registry
    }

    pub fn register(&mut self, pack: Arc<dyn RulePack>) {
        info!("Game type registered: {}", pack.name());
        self.packs.insert(pack.name().to_string(), pack);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn RulePack>> {
        self.packs.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.packs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// 플레이어마다 Deck/Hand/Battlefield 구역과 "End Turn" 액션만 만드는 기본 레이아웃.
pub struct DefaultLayout;

impl RulePack for DefaultLayout {
    fn name(&self) -> &str {
        DEFAULT_GAME_TYPE
    }

    fn setup(&self, game: &mut Game) -> GameResult<()> {
        let players = game.players().to_vec();
        for player in players {
            for zone in LAYOUT_ZONES {
                game.create_zone(Some(player), zone)?;
            }
            let end_turn = UsableAction::new(END_TURN, |game, _| {
                game.advance_turn();
                Ok(())
            })
            .allowed_if(|game, ctx| {
                ctx.entity == ctx.performer && game.current_player() == Some(ctx.performer)
            });
            game.add_action(player, end_turn)?;
        }
        Ok(())
    }
}
