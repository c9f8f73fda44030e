use std::{sync::Arc, time::Duration};

use actix::System;
use actix_web::{get, web, App, Error, HttpRequest, HttpResponse, HttpServer};
use actix_web_actors::ws;
use match_server::{
    env::Settings, error::ServerError, game::GameTypeRegistry, matchmaker::Matchmaker,
    metrics::MetricsCtx, session::Session, AppState, LoggerManager,
};
use prometheus::{Encoder, TextEncoder};
use tracing::{error, info};

#[get("/ws/")]
async fn game_ws_route(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session = Session::new(
        state.matchmaker.clone(),
        state.metrics.clone(),
        Duration::from_secs(state.settings.matchmaking.heartbeat_interval_seconds),
        Duration::from_secs(state.settings.matchmaking.heartbeat_timeout),
    );

    ws::start(session, &req, stream)
}

async fn metrics_route(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Some(expected_token) = &state.settings.server.metrics_auth_token {
        let provided_token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "));

        if provided_token != Some(expected_token.as_str()) {
            return HttpResponse::Unauthorized().body("Unauthorized: Invalid or missing token");
        }
    }

    let metric_families = state.metrics_registry.gather();
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(format!("Metrics encode error: {}", e));
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

async fn health_route() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

#[actix_web::main]
async fn main() -> Result<(), ServerError> {
    // 1. 환경변수 로드
    dotenv::dotenv().ok();

    // 2. 설정 파일 로드
    let settings = Settings::new()?;

    // 3. 로거 초기화
    let logger_manager = Arc::new(LoggerManager::setup(&settings));
    info!("Logger initialized");

    // 4. Metrics 초기화
    let metrics = Arc::new(MetricsCtx::new());
    let metrics_registry = prometheus::Registry::new();
    ::metrics::register_custom_metrics(&metrics_registry)?;
    info!("Metrics initialized and registered");

    // 5. 게임 타입과 Matchmaker 구성
    let game_types = GameTypeRegistry::with_defaults();
    info!("Game types available: {:?}", game_types.names());
    let matchmaker = Arc::new(Matchmaker::new(
        settings.matchmaking.clone(),
        settings.engine.clone(),
        game_types,
        metrics.clone(),
    ));

    // 6. AppState 구성
    let app_state = AppState {
        settings: settings.clone(),
        matchmaker,
        logger_manager,
        metrics,
        metrics_registry,
    };

    // 7. HTTP 서버 시작
    let bind_address = format!("{}:{}", settings.server.bind_address, settings.server.port);
    info!("Starting HTTP server on {}", bind_address);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .service(game_ws_route)
            .route("/metrics", web::get().to(metrics_route))
            .route("/health", web::get().to(health_route))
    })
    .bind(&bind_address)?
    .run();

    info!("Match Server is running on {}", bind_address);

    // 8. 종료 신호 대기
    tokio::select! {
        res = &mut server => {
            error!("Server exited unexpectedly");
            return res.map_err(ServerError::from);
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C received. Initiating graceful shutdown...");
            System::current().stop();
        },
    }

    server.await?;
    info!("System has shut down gracefully");

    Ok(())
}
