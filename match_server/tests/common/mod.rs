#![allow(dead_code)]

use std::sync::Arc;

use game_core::{ContentError, Game, GameResult, RulePack, UsableAction};
use match_server::{
    env::{EngineSettings, MatchmakingSettings},
    game::GameTypeRegistry,
    matchmaker::Matchmaker,
    metrics::MetricsCtx,
    protocol::ServerMessage,
    Client,
};
use tokio::sync::mpsc::{self, UnboundedReceiver};

pub const CONCEDE: &str = "Concede";

/// 기본 레이아웃 위에 아무 때나 쓸 수 있는 "Concede" 를 더한 테스트용 팩.
pub struct ConcedePack;

impl RulePack for ConcedePack {
    fn name(&self) -> &str {
        "concede"
    }

    fn setup(&self, game: &mut Game) -> GameResult<()> {
        for player in game.players().to_vec() {
            let concede = UsableAction::new(CONCEDE, |game, _| {
                game.game_over();
                Ok(())
            })
            .allowed_if(|_, ctx| ctx.entity == ctx.performer);
            game.add_action(player, concede)?;
        }
        Ok(())
    }
}

pub const SURRENDER: &str = "Surrender";

/// 게임을 끝낸 뒤 실패를 돌려주는 "Surrender" 를 가진 팩.
pub struct SurrenderPack;

impl RulePack for SurrenderPack {
    fn name(&self) -> &str {
        "surrender"
    }

    fn setup(&self, game: &mut Game) -> GameResult<()> {
        for player in game.players().to_vec() {
            let surrender = UsableAction::new(SURRENDER, |game, _| {
                game.game_over();
                Err(ContentError::new("surrender has no aftermath"))
            })
            .allowed_if(|_, ctx| ctx.entity == ctx.performer);
            game.add_action(player, surrender)?;
        }
        Ok(())
    }
}

/// setup 이 항상 실패하는 팩.
pub struct BrokenPack;

impl RulePack for BrokenPack {
    fn name(&self) -> &str {
        "broken"
    }

    fn setup(&self, game: &mut Game) -> GameResult<()> {
        let root = game.root();
        game.create_zone(Some(root), "Nowhere")?;
        Ok(())
    }
}

pub fn matchmaker() -> Arc<Matchmaker> {
    let mut game_types = GameTypeRegistry::with_defaults();
    game_types.register(Arc::new(ConcedePack));
    game_types.register(Arc::new(BrokenPack));
    game_types.register(Arc::new(SurrenderPack));
    Arc::new(Matchmaker::new(
        MatchmakingSettings::default(),
        EngineSettings {
            seed: Some(7),
            ..EngineSettings::default()
        },
        game_types,
        Arc::new(MetricsCtx::new()),
    ))
}

/// mpsc 로 받는 가짜 연결.
pub struct TestClient {
    pub client: Arc<Client>,
    pub rx: UnboundedReceiver<ServerMessage>,
}

impl TestClient {
    pub fn connect(matchmaker: &Matchmaker) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = matchmaker.connect(Box::new(tx));
        Self { client, rx }
    }

    pub fn id(&self) -> u64 {
        self.client.id()
    }

    /// 지금까지 받은 메시지를 모두 꺼낸다.
    pub fn drain(&mut self) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            out.push(msg);
        }
        out
    }
}

pub fn new_game_id(messages: &[ServerMessage]) -> Option<u64> {
    messages.iter().find_map(|m| match m {
        ServerMessage::NewGame { game_id, .. } => Some(*game_id),
        _ => None,
    })
}

pub fn error_codes(messages: &[ServerMessage]) -> Vec<match_server::protocol::ErrorCode> {
    messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::Error { code, .. } => Some(*code),
            _ => None,
        })
        .collect()
}
