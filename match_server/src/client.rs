use actix::Recipient;
use parking_lot::RwLock;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::protocol::ServerMessage;

pub type ClientId = u64;

/// 클라이언트로 나가는 메시지 통로. 호출은 절대 블로킹하지 않는다.
pub trait ClientIo: Send + Sync {
    fn send(&self, msg: ServerMessage);
}

impl ClientIo for Recipient<ServerMessage> {
    fn send(&self, msg: ServerMessage) {
        self.do_send(msg);
    }
}

impl ClientIo for UnboundedSender<ServerMessage> {
    fn send(&self, msg: ServerMessage) {
        if UnboundedSender::send(self, msg).is_err() {
            debug!("Dropping outbound message: receiver closed");
        }
    }
}

/// 연결 하나.
pub struct Client {
    id: ClientId,
    name: RwLock<Option<String>>,
    io: Box<dyn ClientIo>,
}

impl Client {
    pub fn new(id: ClientId, io: Box<dyn ClientIo>) -> Self {
        Self {
            id,
            name: RwLock::new(None),
            io,
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn name(&self) -> Option<String> {
        self.name.read().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = Some(name.into());
    }

    /// 로그인 전이면 `client-<id>`.
    pub fn display_name(&self) -> String {
        self.name().unwrap_or_else(|| format!("client-{}", self.id))
    }

    pub fn send(&self, msg: ServerMessage) {
        self.io.send(msg);
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("name", &*self.name.read())
            .finish()
    }
}
