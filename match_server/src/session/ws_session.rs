use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use actix::{Actor, ActorContext, AsyncContext, Handler, StreamHandler};
use actix_web_actors::ws;
use tracing::{info, warn};

use crate::{
    client::Client,
    error::ServerError,
    matchmaker::Matchmaker,
    metrics::MetricsCtx,
    protocol::{decode_client_message, ServerMessage},
};

type Ctx = ws::WebsocketContext<Session>;

/// 웹소켓 연결 하나를 맡는 액터.
///
/// 텍스트 프레임을 해석해 `Matchmaker` 로 넘기고, 돌아오는 `ServerMessage` 를 JSON
/// 텍스트로 써 준다.
pub struct Session {
    client: Option<Arc<Client>>,
    matchmaker: Arc<Matchmaker>,
    metrics: Arc<MetricsCtx>,
    hb: Instant,
    heartbeat_interval: Duration,
    client_timeout: Duration,
}

impl Session {
    pub fn new(
        matchmaker: Arc<Matchmaker>,
        metrics: Arc<MetricsCtx>,
        heartbeat_interval: Duration,
        client_timeout: Duration,
    ) -> Self {
        Self {
            client: None,
            matchmaker,
            metrics,
            hb: Instant::now(),
            heartbeat_interval,
            client_timeout,
        }
    }

    fn hb(&self, ctx: &mut Ctx) {
        ctx.run_interval(self.heartbeat_interval, |act, ctx| {
            if Instant::now().duration_since(act.hb) > act.client_timeout {
                info!("Websocket Client heartbeat failed, disconnecting!");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn send_json(ctx: &mut Ctx, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(text) => ctx.text(text),
            Err(e) => warn!("Failed to serialize ServerMessage for client: {}", e),
        }
    }

    fn handle_text(&mut self, text: &str, ctx: &mut Ctx) {
        let Some(client) = self.client.clone() else {
            warn!("Text frame on a session without a registered client");
            return;
        };

        match decode_client_message(text) {
            Ok(msg) => self.matchmaker.handle_message(&client, msg),
            Err(e) => {
                let error = ServerError::from(e);
                warn!("Failed to parse message from client {}: {}", client.id(), error);
                self.metrics.message_rejected(error.reason());
                Self::send_json(ctx, &ServerMessage::from(&error));
            }
        }
    }
}

impl Actor for Session {
    type Context = Ctx;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.hb(ctx);
        let recipient = ctx.address().recipient::<ServerMessage>();
        let client = self.matchmaker.connect(Box::new(recipient));
        info!("Session started for client {}", client.id());
        self.client = Some(client);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(client) = self.client.take() {
            info!("Session stopped for client {}", client.id());
            self.matchmaker.disconnect(client.id());
        }
    }
}

impl Handler<ServerMessage> for Session {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, ctx: &mut Self::Context) {
        Self::send_json(ctx, &msg);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for Session {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.hb = Instant::now();
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            _ => ctx.stop(),
        }
    }
}
