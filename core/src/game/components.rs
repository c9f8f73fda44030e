use std::{
    collections::{BTreeMap, VecDeque},
    sync::Arc,
};

use bevy_ecs::component::Component;

use crate::{ecs::EntityId, game::action::UsableAction};

/// 참가자 한 명. `next` 를 따라가면 모든 플레이어가 하나의 순환을 이룬다.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct PlayerComponent {
    pub name: String,
    pub index: usize,
    pub next: EntityId,
}

/// 카드가 순서대로 놓이는 구역. 앞쪽이 top 이다.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ZoneComponent {
    pub owner: Option<EntityId>,
    pub name: String,
    pub cards: VecDeque<EntityId>,
}

impl ZoneComponent {
    pub fn new(owner: Option<EntityId>, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
            cards: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn top(&self) -> Option<EntityId> {
        self.cards.front().copied()
    }

    pub fn contains(&self, card: EntityId) -> bool {
        self.cards.contains(&card)
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardComponent {
    pub zone: EntityId,
}

/// 컨텐츠가 자유롭게 쓰는 키/값 테이블.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    values: BTreeMap<String, serde_json::Value>,
}

impl Attributes {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.values.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// 엔티티에 등록된 사용 가능한 액션. 등록 순서를 유지하며 이름은 유일하다.
#[derive(Component, Default)]
pub struct ActionsComponent {
    actions: Vec<Arc<UsableAction>>,
}

impl ActionsComponent {
    /// 같은 이름이 있으면 교체한다.
    pub fn add(&mut self, action: UsableAction) {
        let action = Arc::new(action);
        match self.actions.iter_mut().find(|a| a.name() == action.name()) {
            Some(slot) => *slot = action,
            None => self.actions.push(action),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<UsableAction>> {
        self.actions.iter().find(|a| a.name() == name).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<UsableAction>> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl std::fmt::Debug for ActionsComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.actions.iter().map(|a| a.name()))
            .finish()
    }
}
