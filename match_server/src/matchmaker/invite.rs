use std::sync::Arc;

use crate::{client::Client, game::ServerGame, protocol::ServerMessage};

pub type InviteId = u64;

/// 두 클라이언트와 아직 시작하지 않은 게임의 묶음.
pub struct Invite {
    pub id: InviteId,
    pub host: Arc<Client>,
    pub invitee: Arc<Client>,
    pub game: ServerGame,
}

impl Invite {
    pub fn new(id: InviteId, host: Arc<Client>, invitee: Arc<Client>, game: ServerGame) -> Self {
        Self {
            id,
            host,
            invitee,
            game,
        }
    }

    pub fn request_message(&self) -> ServerMessage {
        ServerMessage::InviteRequest {
            invite_id: self.id,
            from: self.host.display_name(),
            from_id: self.host.id(),
            game_type: self.game.game_type().to_string(),
        }
    }

    pub fn declined_message(&self) -> ServerMessage {
        ServerMessage::InviteResponse {
            invite_id: self.id,
            accepted: false,
        }
    }

    /// 호스트 먼저, 그다음 초대받은 쪽.
    pub fn into_parts(self) -> (ServerGame, Vec<Arc<Client>>) {
        (self.game, vec![self.host, self.invitee])
    }
}

impl std::fmt::Debug for Invite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invite")
            .field("id", &self.id)
            .field("host", &self.host.id())
            .field("invitee", &self.invitee.id())
            .field("game", &self.game.id())
            .finish()
    }
}
