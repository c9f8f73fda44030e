//! 이름 기반 이벤트 버스. 컨텐츠가 핸들러를 등록하고, 게임 로직이 전이 시점마다 이벤트를 발생시킨다.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::{ecs::EntityId, error::ContentError, game::Game};

pub mod bus;

pub use bus::EventBus;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventName(Cow<'static, str>);

impl EventName {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for EventName {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

pub const TURN_START: EventName = EventName::from_static("turnStart");
pub const TURN_END: EventName = EventName::from_static("turnEnd");

#[derive(Clone, Debug, PartialEq)]
pub struct GameEvent {
    pub name: EventName,
    pub source: Option<EntityId>,
    pub data: serde_json::Value,
}

impl GameEvent {
    pub fn new(name: impl Into<EventName>) -> Self {
        Self {
            name: name.into(),
            source: None,
            data: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn from_entity(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// 이벤트 핸들러. 항상 소유 게임 인스턴스를 명시적으로 받는다.
pub trait EventHandler: Send + Sync {
    fn handle(&self, game: &mut Game, event: &GameEvent) -> Result<(), ContentError>;
}

impl<F> EventHandler for F
where
    F: Fn(&mut Game, &GameEvent) -> Result<(), ContentError> + Send + Sync,
{
    fn handle(&self, game: &mut Game, event: &GameEvent) -> Result<(), ContentError> {
        self(game, event)
    }
}
