use std::sync::Arc;

use game_core::EntityId;
use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::{
    client::{Client, ClientId},
    error::{ServerError, ServerResult},
    game::{GameId, ServerGame},
    matchmaker::{Invite, InviteId, Matchmaker, QuickMatch},
    protocol::ServerMessage,
};

impl Matchmaker {
    /// 게임 요청. 상대가 없으면 빠른 매칭, 있으면 초대.
    pub fn start_game(
        &self,
        client: &Arc<Client>,
        opponent: Option<ClientId>,
        game_type: Option<&str>,
    ) {
        let game_type = game_type.unwrap_or(&self.settings.default_game_type);
        if self.game_types.get(game_type).is_none() {
            self.reject(client, ServerError::UnknownGameType(game_type.to_string()));
            return;
        }

        match opponent {
            None => self.quick_match(client, game_type),
            Some(target) => self.invite(client, target, game_type),
        }
    }

    fn quick_match(&self, client: &Arc<Client>, game_type: &str) {
        match self.quick_match.offer(client) {
            QuickMatch::Waiting => {
                info!("Client {} waits for a quick match", client.id());
                client.send(ServerMessage::Wait);
            }
            QuickMatch::Paired(opponent) => {
                info!(
                    "Quick match: client {} paired with client {}",
                    client.id(),
                    opponent.id()
                );
                match self.create_game(game_type) {
                    Ok(game) => self.launch(game, vec![client.clone(), opponent]),
                    Err(e) => {
                        opponent.send(ServerMessage::from(&e));
                        self.reject(client, e);
                    }
                }
            }
        }
    }

    fn invite(&self, client: &Arc<Client>, target: ClientId, game_type: &str) {
        let Some(invitee) = self.client(target).filter(|t| t.id() != client.id()) else {
            warn!(
                "Invite from client {} sent to unknown or self target {}",
                client.id(),
                target
            );
            self.metrics.message_rejected("unknown_invite_target");
            client.send(ServerMessage::InviteResponse {
                invite_id: 0,
                accepted: false,
            });
            return;
        };

        let game = match self.create_game(game_type) {
            Ok(game) => game,
            Err(e) => {
                self.reject(client, e);
                return;
            }
        };

        let invite = Invite::new(self.allocate_invite_id(), client.clone(), invitee, game);
        let request = invite.request_message();
        let invitee = invite.invitee.clone();
        info!(
            "Invite {} created: client {} -> client {}",
            invite.id,
            client.id(),
            invitee.id()
        );
        {
            let mut invites = self.invites.lock();
            invites.insert(invite.id, invite);
            self.metrics.set_pending_invites(invites.len());
        }

        client.send(ServerMessage::Wait);
        invitee.send(request);
    }

    /// 초대 응답. 수락하면 게임이 시작되고, 거절하면 호스트에게 알린다.
    pub fn invite_response(&self, client: &Arc<Client>, invite_id: InviteId, accepted: bool) {
        let invite = {
            let mut invites = self.invites.lock();
            match invites.get(&invite_id) {
                None => {
                    warn!("No such invite: {}", invite_id);
                    self.metrics.message_rejected("unknown_invite");
                    return;
                }
                Some(invite) if invite.invitee.id() != client.id() => {
                    warn!(
                        "Client {} answered invite {} addressed to client {}",
                        client.id(),
                        invite_id,
                        invite.invitee.id()
                    );
                    self.metrics.message_rejected("not_invitee");
                    return;
                }
                Some(_) => {}
            }
            let invite = invites.remove(&invite_id);
            self.metrics.set_pending_invites(invites.len());
            invite
        };
        let Some(invite) = invite else {
            return;
        };

        if accepted {
            info!("Invite {} accepted by client {}", invite_id, client.id());
            let (game, clients) = invite.into_parts();
            self.launch(game, clients);
        } else {
            info!("Invite {} declined by client {}", invite_id, client.id());
            invite.host.send(invite.declined_message());
        }
    }

    /// 진행 중인 게임에 액션을 보낸다.
    pub fn use_ability(
        &self,
        client: &Arc<Client>,
        game_id: GameId,
        entity: EntityId,
        action: &str,
        targets: Vec<EntityId>,
    ) {
        let Some(shared) = self.game(game_id) else {
            self.reject(client, ServerError::GameNotFound(game_id));
            return;
        };

        let mut game = shared.lock();
        if let Err(e) = game.handle_move(client.id(), entity, action, targets) {
            self.reject(client, e);
        }
        // 실패한 액션도 게임을 끝냈을 수 있다
        if game.is_game_over() {
            self.finish(&game);
        }
    }

    pub fn request_targets(
        &self,
        client: &Arc<Client>,
        game_id: GameId,
        entity: EntityId,
        action: &str,
    ) {
        let Some(shared) = self.game(game_id) else {
            self.reject(client, ServerError::GameNotFound(game_id));
            return;
        };

        let result = shared.lock().targets_for(client.id(), entity, action);
        match result {
            Ok(msg) => client.send(msg),
            Err(e) => self.reject(client, e),
        }
    }

    fn create_game(&self, game_type: &str) -> ServerResult<ServerGame> {
        let pack = self
            .game_types
            .get(game_type)
            .ok_or_else(|| ServerError::UnknownGameType(game_type.to_string()))?;
        ServerGame::new(self.allocate_game_id(), game_type, pack, &self.engine)
    }

    /// 게임을 잠근 상태로 테이블에 올린 뒤 시작한다.
    ///
    /// 테이블에서 게임을 찾은 다른 요청은 시작이 끝날 때까지 락에서 기다린다.
    fn launch(&self, game: ServerGame, clients: Vec<Arc<Client>>) {
        let game_id = game.id();
        let shared = Arc::new(Mutex::new(game));
        let mut guard = shared.lock();
        self.games.write().insert(game_id, shared.clone());
        self.metrics.game_started();

        if let Err(e) = guard.start(clients.clone()) {
            error!("Game {} failed to start: {}", game_id, e);
            self.games.write().remove(&game_id);
            self.metrics.game_finished();
            let msg = ServerMessage::from(&e);
            for client in &clients {
                client.send(msg.clone());
            }
            return;
        }

        if guard.is_game_over() {
            self.finish(&guard);
        }
    }

    /// 끝난 게임을 테이블에서 내리고 참가자에게 알린다. 게임 락을 쥔 채 호출한다.
    fn finish(&self, game: &ServerGame) {
        if self.games.write().remove(&game.id()).is_some() {
            self.metrics.game_finished();
        }
        info!("Game {} is over", game.id());
        game.broadcast(ServerMessage::GameOver { game_id: game.id() });
    }
}
