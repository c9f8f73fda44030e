use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use tracing::{debug, error};

use crate::events::{EventHandler, EventName, GameEvent};

pub const DEFAULT_MAX_CHAINED_EVENTS: usize = 10_000;

/// 핸들러 목록과 대기열.
///
/// 디스패치 중에 발생한 이벤트는 바로 실행하지 않고 큐 뒤에 붙는다. 가장 바깥의
/// `Game::raise` 가 큐를 비울 때까지 하나씩 꺼내 처리하며, 한 번 비우는 동안
/// 처리할 수 있는 이벤트 수는 `max_chained_events` 로 제한된다.
pub struct EventBus {
    handlers: HashMap<EventName, Vec<Arc<dyn EventHandler>>>,
    queue: VecDeque<GameEvent>,
    draining: bool,
    processed: usize,
    max_chained_events: usize,
}

impl EventBus {
    pub fn new(max_chained_events: usize) -> Self {
        Self {
            handlers: HashMap::new(),
            queue: VecDeque::new(),
            draining: false,
            processed: 0,
            max_chained_events: max_chained_events.max(1),
        }
    }

    pub fn register(&mut self, name: EventName, handler: Arc<dyn EventHandler>) {
        debug!("Handler registered for event '{}'", name);
        self.handlers.entry(name).or_default().push(handler);
    }

    pub fn handler_count(&self, name: &EventName) -> usize {
        self.handlers.get(name).map_or(0, Vec::len)
    }

    pub fn max_chained_events(&self) -> usize {
        self.max_chained_events
    }

    pub fn is_draining(&self) -> bool {
        self.draining
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn enqueue(&mut self, event: GameEvent) {
        self.queue.push_back(event);
    }

    /// 드레인을 시작한다. 이미 드레인 중이면 `false`.
    pub(crate) fn begin_drain(&mut self) -> bool {
        if self.draining {
            return false;
        }
        self.draining = true;
        self.processed = 0;
        true
    }

    pub(crate) fn end_drain(&mut self) {
        self.draining = false;
        self.processed = 0;
    }

    /// 다음 이벤트와 그 시점의 핸들러 목록 스냅샷을 꺼낸다.
    ///
    /// 한도에 도달하면 남은 이벤트를 버리고 `None` 을 돌려준다.
    pub(crate) fn next_dispatch(&mut self) -> Option<(GameEvent, Vec<Arc<dyn EventHandler>>)> {
        if self.processed >= self.max_chained_events && !self.queue.is_empty() {
            let dropped = self.queue.len();
            self.queue.clear();
            error!(
                "Event chain exceeded {} events, dropping {} queued event(s)",
                self.max_chained_events, dropped
            );
            return None;
        }

        let event = self.queue.pop_front()?;
        self.processed += 1;
        let handlers = self.handlers.get(&event.name).cloned().unwrap_or_default();
        Some((event, handlers))
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHAINED_EVENTS)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("events", &self.handlers.keys().collect::<Vec<_>>())
            .field("queued", &self.queue.len())
            .field("draining", &self.draining)
            .field("max_chained_events", &self.max_chained_events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ContentError, events::TURN_START, game::Game};

    fn noop(_: &mut Game, _: &GameEvent) -> Result<(), ContentError> {
        Ok(())
    }

    #[test]
    fn nested_begin_drain_is_refused() {
        let mut bus = EventBus::default();
        assert!(bus.begin_drain());
        assert!(!bus.begin_drain());
        bus.end_drain();
        assert!(bus.begin_drain());
    }

    #[test]
    fn drain_stops_at_cap_and_drops_the_rest() {
        let mut bus = EventBus::new(2);
        for _ in 0..5 {
            bus.enqueue(GameEvent::new("ping"));
        }

        assert!(bus.begin_drain());
        assert!(bus.next_dispatch().is_some());
        assert!(bus.next_dispatch().is_some());
        assert!(bus.next_dispatch().is_none());
        assert_eq!(bus.pending(), 0);
        bus.end_drain();
    }

    #[test]
    fn handler_list_is_snapshotted() {
        let mut bus = EventBus::default();
        bus.register(TURN_START, Arc::new(noop));
        bus.enqueue(GameEvent::new(TURN_START));

        assert!(bus.begin_drain());
        let (event, handlers) = bus.next_dispatch().unwrap();
        bus.register(TURN_START, Arc::new(noop));

        assert_eq!(event.name, TURN_START);
        assert_eq!(handlers.len(), 1);
        assert_eq!(bus.handler_count(&TURN_START), 2);
    }
}
