//! 연결 레지스트리, 초대 테이블, 빠른 매칭 슬롯, 진행 중인 게임 테이블.
//!
//! 모든 연산은 `&self` 로 동작하며 여러 세션 액터에서 동시에 호출된다. 게임별
//! 직렬화는 게임마다 따로 있는 락이 담당한다.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::{
    client::{Client, ClientId, ClientIo},
    env::{EngineSettings, MatchmakingSettings},
    error::ServerError,
    game::{GameId, GameTypeRegistry, ServerGame},
    metrics::MetricsCtx,
    protocol::{ClientMessage, ServerMessage},
};

pub mod handlers;
pub mod invite;
pub mod quick_match;

pub use invite::{Invite, InviteId};
pub use quick_match::{QuickMatch, QuickMatchSlot};

pub struct Matchmaker {
    settings: MatchmakingSettings,
    engine: EngineSettings,
    game_types: GameTypeRegistry,
    metrics: Arc<MetricsCtx>,

    clients: RwLock<HashMap<ClientId, Arc<Client>>>,
    games: RwLock<HashMap<GameId, Arc<Mutex<ServerGame>>>>,
    invites: Mutex<HashMap<InviteId, Invite>>,
    quick_match: QuickMatchSlot,

    next_client_id: AtomicU64,
    next_game_id: AtomicU64,
    next_invite_id: AtomicU64,
}

impl Matchmaker {
    pub fn new(
        settings: MatchmakingSettings,
        engine: EngineSettings,
        game_types: GameTypeRegistry,
        metrics: Arc<MetricsCtx>,
    ) -> Self {
        let quick_match = QuickMatchSlot::new(metrics.clone());
        Self {
            settings,
            engine,
            game_types,
            metrics,
            clients: RwLock::new(HashMap::new()),
            games: RwLock::new(HashMap::new()),
            invites: Mutex::new(HashMap::new()),
            quick_match,
            next_client_id: AtomicU64::new(1),
            next_game_id: AtomicU64::new(1),
            next_invite_id: AtomicU64::new(1),
        }
    }

    pub fn settings(&self) -> &MatchmakingSettings {
        &self.settings
    }

    /// 새 연결을 등록한다. ID 는 1 부터.
    pub fn connect(&self, io: Box<dyn ClientIo>) -> Arc<Client> {
        let id = self.next_client_id.fetch_add(1, Ordering::Relaxed);
        let client = Arc::new(Client::new(id, io));
        self.clients.write().insert(id, client.clone());
        self.metrics.client_connected();
        info!("Client {} connected", id);
        client
    }

    /// 연결을 지운다. 빠른 매칭 슬롯을 비우고, 관련된 대기 초대를 정리한다.
    /// 참가자가 모두 나간 게임은 테이블에서 내린다.
    pub fn disconnect(&self, client_id: ClientId) {
        if self.clients.write().remove(&client_id).is_some() {
            self.metrics.client_disconnected();
        }
        self.quick_match.remove(client_id);

        let dropped: Vec<Invite> = {
            let mut invites = self.invites.lock();
            let ids: Vec<InviteId> = invites
                .values()
                .filter(|i| i.host.id() == client_id || i.invitee.id() == client_id)
                .map(|i| i.id)
                .collect();
            let dropped = ids.iter().filter_map(|id| invites.remove(id)).collect();
            self.metrics.set_pending_invites(invites.len());
            dropped
        };
        for invite in dropped {
            // 초대받은 쪽이 나갔으면 호스트에게 거절로 알린다
            if invite.host.id() != client_id {
                invite.host.send(invite.declined_message());
            }
            info!("Invite {} dropped: client {} disconnected", invite.id, client_id);
        }

        self.abandon_games(client_id);
        info!("Client {} disconnected", client_id);
    }

    /// `client_id` 가 참가한 게임 중 연결된 참가자가 하나도 남지 않은 것을 내린다.
    fn abandon_games(&self, client_id: ClientId) {
        let games: Vec<Arc<Mutex<ServerGame>>> = self.games.read().values().cloned().collect();
        for shared in games {
            let game = shared.lock();
            if game.player_for(client_id).is_none() {
                continue;
            }
            let connected = {
                let clients = self.clients.read();
                game.clients().iter().any(|c| clients.contains_key(&c.id()))
            };
            if connected {
                continue;
            }
            if self.games.write().remove(&game.id()).is_some() {
                self.metrics.game_finished();
                info!("Game {} abandoned: every participant disconnected", game.id());
            }
        }
    }

    pub fn client(&self, id: ClientId) -> Option<Arc<Client>> {
        self.clients.read().get(&id).cloned()
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    pub fn game(&self, id: GameId) -> Option<Arc<Mutex<ServerGame>>> {
        self.games.read().get(&id).cloned()
    }

    pub fn running_game_ids(&self) -> Vec<GameId> {
        let mut ids: Vec<GameId> = self.games.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn running_games(&self) -> usize {
        self.games.read().len()
    }

    pub fn pending_invites(&self) -> usize {
        self.invites.lock().len()
    }

    pub fn quick_match_waiting(&self) -> Option<ClientId> {
        self.quick_match.waiting()
    }

    /// 클라이언트 메시지 하나를 해당 연산으로 보낸다.
    pub fn handle_message(&self, client: &Arc<Client>, msg: ClientMessage) {
        match msg {
            ClientMessage::Login { username } => self.login(client, &username),
            ClientMessage::StartGame {
                opponent,
                game_type,
            } => {
                let opponent = opponent.and_then(|id| ClientId::try_from(id).ok());
                self.start_game(client, opponent, game_type.as_deref());
            }
            ClientMessage::InviteResponse {
                invite_id,
                accepted,
            } => self.invite_response(client, invite_id, accepted),
            ClientMessage::UseAbility {
                game_id,
                id,
                action,
                targets,
            } => self.use_ability(client, game_id, id, &action, targets),
            ClientMessage::RequestTargets {
                game_id,
                id,
                action,
            } => self.request_targets(client, game_id, id, &action),
        }
    }

    /// 로그인 요청 처리. 예약된 접두사로 시작하는 이름은 거부한다.
    pub fn login(&self, client: &Arc<Client>, username: &str) {
        info!("Login request: {} for client {}", username, client.id());
        let prefix = self.settings.reserved_name_prefix.as_str();
        if !prefix.is_empty() && username.starts_with(prefix) {
            warn!("Client {} rejected: reserved name '{}'", client.id(), username);
            self.metrics.message_rejected("reserved_name");
            client.send(ServerMessage::Welcome {
                user_id: 0,
                ok: false,
            });
            return;
        }

        client.set_name(username);
        client.send(ServerMessage::Welcome {
            user_id: client.id(),
            ok: true,
        });
    }

    fn reject(&self, client: &Client, error: ServerError) {
        warn!("Rejected message from client {}: {}", client.id(), error);
        self.metrics.message_rejected(error.reason());
        client.send(ServerMessage::from(&error));
    }

    fn allocate_game_id(&self) -> GameId {
        self.next_game_id.fetch_add(1, Ordering::Relaxed)
    }

    fn allocate_invite_id(&self) -> InviteId {
        self.next_invite_id.fetch_add(1, Ordering::Relaxed)
    }
}
