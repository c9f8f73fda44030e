use std::sync::Arc;

use game_core::{EntityId, Game, GameConfig, GameError, RulePack, StateChange};
use parking_lot::RwLock;
use tracing::info;

use crate::{
    client::{Client, ClientId},
    env::EngineSettings,
    error::{ServerError, ServerResult},
    game::GameId,
    protocol::ServerMessage,
};

type Audience = Arc<RwLock<Vec<Arc<Client>>>>;

/// 서버에서 돌아가는 게임 한 판.
///
/// 엔진의 상태 변경은 리스너를 통해 `update` 메시지로 모든 참가자에게 나간다.
/// 이 구조체에 대한 모든 접근은 바깥의 게임별 락 안에서 일어난다.
pub struct ServerGame {
    id: GameId,
    game_type: String,
    pack: Arc<dyn RulePack>,
    game: Game,
    players: Vec<(Arc<Client>, EntityId)>,
    audience: Audience,
    started: bool,
}

impl ServerGame {
    pub fn new(
        id: GameId,
        game_type: &str,
        pack: Arc<dyn RulePack>,
        engine: &EngineSettings,
    ) -> ServerResult<Self> {
        let seed = match engine.seed {
            Some(seed) => seed.wrapping_add(id),
            None => rand::random(),
        };
        let mut game = Game::new(GameConfig {
            player_names: pack.player_names(),
            seed,
            max_chained_events: engine.max_chained_events,
        })?;

        let audience: Audience = Arc::default();
        let listeners = audience.clone();
        game.set_listener(move |change: &StateChange| {
            let msg = ServerMessage::Update {
                game_id: id,
                id: change.entity,
                key: change.key.clone(),
                value: change.value.clone(),
            };
            for client in listeners.read().iter() {
                client.send(msg.clone());
            }
        });

        Ok(Self {
            id,
            game_type: game_type.to_string(),
            pack,
            game,
            players: Vec::new(),
            audience,
            started: false,
        })
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn game_type(&self) -> &str {
        &self.game_type
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_game_over(&self) -> bool {
        self.game.is_game_over()
    }

    pub fn clients(&self) -> Vec<Arc<Client>> {
        self.players.iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn player_for(&self, client: ClientId) -> Option<EntityId> {
        self.players
            .iter()
            .find(|(c, _)| c.id() == client)
            .map(|(_, player)| *player)
    }

    pub fn broadcast(&self, msg: ServerMessage) {
        for (client, _) in &self.players {
            client.send(msg.clone());
        }
    }

    /// 세션 시작 순서.
    ///
    /// 1. 연결을 플레이어 엔티티에 순서대로 묶는다.
    /// 2. 각자에게 `NewGame`.
    /// 3. 룰 팩 setup (변경은 `update` 로 흘러나간다).
    /// 4. 첫 턴.
    /// 5. 각자에게 사용 가능한 액션.
    pub fn start(&mut self, clients: Vec<Arc<Client>>) -> ServerResult<()> {
        let expected = self.game.players().len();
        if clients.len() != expected {
            return Err(ServerError::PlayerCount {
                game: self.id,
                expected,
                actual: clients.len(),
            });
        }

        self.players = clients
            .iter()
            .cloned()
            .zip(self.game.players().iter().copied())
            .collect();
        *self.audience.write() = clients;

        for (index, (client, _)) in self.players.iter().enumerate() {
            client.send(ServerMessage::NewGame {
                game_id: self.id,
                player_index: index,
            });
        }

        self.pack.setup(&mut self.game).map_err(ServerError::Setup)?;
        self.game.advance_turn();
        self.started = true;

        info!(
            "Game {} ({}) started with clients {:?}",
            self.id,
            self.game_type,
            self.player_ids()
        );
        self.send_usable_actions();
        Ok(())
    }

    /// 참가자의 액션을 엔진에 넘긴다. 검증을 통과했으면 모두에게 새 액션 목록을 보낸다.
    pub fn handle_move(
        &mut self,
        client: ClientId,
        entity: EntityId,
        action: &str,
        targets: Vec<EntityId>,
    ) -> ServerResult<()> {
        let performer = self.participant(client)?;
        let result = self.game.perform_action(performer, entity, action, targets);
        // 컨텐츠 안에서 실패했다면 이미 상태가 바뀌었을 수 있다
        if matches!(result, Ok(()) | Err(GameError::Content(_))) {
            self.send_usable_actions();
        }
        result.map_err(ServerError::from)
    }

    pub fn targets_for(
        &self,
        client: ClientId,
        entity: EntityId,
        action: &str,
    ) -> ServerResult<ServerMessage> {
        let performer = self.participant(client)?;
        let set = self.game.available_targets(performer, entity, action)?;
        Ok(ServerMessage::AvailableTargets {
            game_id: self.id,
            id: entity,
            action: action.to_string(),
            targets: set.targets,
            min: set.min,
            max: set.max,
        })
    }

    fn participant(&self, client: ClientId) -> ServerResult<EntityId> {
        self.player_for(client).ok_or(ServerError::NotAParticipant {
            client,
            game: self.id,
        })
    }

    fn player_ids(&self) -> Vec<ClientId> {
        self.players.iter().map(|(c, _)| c.id()).collect()
    }

    fn send_usable_actions(&self) {
        for (client, player) in &self.players {
            client.send(ServerMessage::UsableActions {
                game_id: self.id,
                actions: self.game.usable_actions(*player),
            });
        }
    }
}

impl std::fmt::Debug for ServerGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerGame")
            .field("id", &self.id)
            .field("game_type", &self.game_type)
            .field("players", &self.player_ids())
            .field("started", &self.started)
            .finish()
    }
}
