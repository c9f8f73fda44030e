use lazy_static::lazy_static;
use prometheus::{opts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    // Opts 만 만들어 두고, 등록은 서버가 넘겨주는 레지스트리에 직접 한다.

    /// Currently connected websocket clients.
    pub static ref CONNECTED_CLIENTS: IntGauge =
        IntGauge::with_opts(opts!("connected_clients", "Number of connected clients")).unwrap();

    /// Games currently in the running table.
    pub static ref RUNNING_GAMES: IntGauge =
        IntGauge::with_opts(opts!("running_games", "Number of running games")).unwrap();

    /// Invites waiting for an answer.
    pub static ref PENDING_INVITES: IntGauge =
        IntGauge::with_opts(opts!("pending_invites", "Number of pending game invites")).unwrap();

    /// 1 while a client occupies the quick-match slot.
    pub static ref QUICK_MATCH_WAITING: IntGauge =
        IntGauge::with_opts(opts!("quick_match_waiting", "Clients waiting in the quick-match slot")).unwrap();

    pub static ref GAMES_STARTED_TOTAL: IntCounter =
        IntCounter::with_opts(opts!("games_started_total", "Total number of games started")).unwrap();

    /// Inbound messages dropped or answered with an error, by reason.
    pub static ref REJECTED_MESSAGES_TOTAL: IntCounterVec =
        IntCounterVec::new(
            Opts::new("rejected_messages_total", "Total rejected client messages by reason"),
            &["reason"],
        )
        .unwrap();
}

/// Registers every custom metric with the given registry.
///
/// # Arguments
///
/// * `registry` - The registry served on `/metrics`.
pub fn register_custom_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(CONNECTED_CLIENTS.clone()))?;
    registry.register(Box::new(RUNNING_GAMES.clone()))?;
    registry.register(Box::new(PENDING_INVITES.clone()))?;
    registry.register(Box::new(QUICK_MATCH_WAITING.clone()))?;
    registry.register(Box::new(GAMES_STARTED_TOTAL.clone()))?;
    registry.register(Box::new(REJECTED_MESSAGES_TOTAL.clone()))?;
    Ok(())
}
