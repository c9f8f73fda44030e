/// 전역 메트릭 갱신을 한곳에 모은다.
#[derive(Debug, Default)]
pub struct MetricsCtx;

impl MetricsCtx {
    pub fn new() -> Self {
        Self
    }

    pub fn client_connected(&self) {
        ::metrics::CONNECTED_CLIENTS.inc();
    }

    pub fn client_disconnected(&self) {
        ::metrics::CONNECTED_CLIENTS.dec();
    }

    pub fn game_started(&self) {
        ::metrics::GAMES_STARTED_TOTAL.inc();
        ::metrics::RUNNING_GAMES.inc();
    }

    pub fn game_finished(&self) {
        ::metrics::RUNNING_GAMES.dec();
    }

    pub fn set_pending_invites(&self, count: usize) {
        ::metrics::PENDING_INVITES.set(count as i64);
    }

    pub fn set_quick_match_waiting(&self, waiting: bool) {
        ::metrics::QUICK_MATCH_WAITING.set(i64::from(waiting));
    }

    pub fn message_rejected(&self, reason: &str) {
        ::metrics::REJECTED_MESSAGES_TOTAL
            .with_label_values(&[reason])
            .inc();
    }
}
