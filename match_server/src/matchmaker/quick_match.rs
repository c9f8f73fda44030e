use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    client::{Client, ClientId},
    metrics::MetricsCtx,
};

/// 빠른 매칭 요청의 결과.
#[derive(Debug)]
pub enum QuickMatch {
    /// 슬롯에 들어갔거나 이미 들어가 있다.
    Waiting,
    /// 기다리던 상대를 꺼냈다.
    Paired(Arc<Client>),
}

/// 상대를 기다리는 클라이언트 하나를 담는 슬롯.
///
/// 검사와 교체, 대기 게이지 갱신은 항상 한 번의 락 안에서 일어난다.
pub struct QuickMatchSlot {
    slot: Mutex<Option<Arc<Client>>>,
    metrics: Arc<MetricsCtx>,
}

impl QuickMatchSlot {
    pub fn new(metrics: Arc<MetricsCtx>) -> Self {
        Self {
            slot: Mutex::new(None),
            metrics,
        }
    }

    pub fn offer(&self, client: &Arc<Client>) -> QuickMatch {
        let mut slot = self.slot.lock();
        let outcome = match slot.take() {
            None => {
                *slot = Some(client.clone());
                QuickMatch::Waiting
            }
            Some(waiting) if waiting.id() == client.id() => {
                *slot = Some(waiting);
                QuickMatch::Waiting
            }
            Some(waiting) => QuickMatch::Paired(waiting),
        };
        self.metrics.set_quick_match_waiting(slot.is_some());
        outcome
    }

    /// 슬롯에 `id` 가 있으면 비운다.
    pub fn remove(&self, id: ClientId) -> bool {
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|c| c.id() == id) {
            *slot = None;
            self.metrics.set_quick_match_waiting(false);
            true
        } else {
            false
        }
    }

    pub fn waiting(&self) -> Option<ClientId> {
        self.slot.lock().as_ref().map(|c| c.id())
    }
}
