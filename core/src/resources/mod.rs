//! 엔티티가 가진 수치형 자원과, 그 값을 계산하는 모디파이어 체인.

use std::{borrow::Cow, collections::BTreeMap};

use bevy_ecs::component::Component;
use serde::{Deserialize, Serialize};

pub mod modifier;
pub mod modifier_component;

pub use modifier::{EntityModifier, FnModifier, ModifierSwitch};
pub use modifier_component::ResourceModifierComponent;

/// 이름으로 구분되는 자원 종류 (체력, 마나 등).
///
/// 컨텐츠가 임의의 이름을 정의할 수 있으므로 열거형이 아니라 이름 래퍼다.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EcsResource(Cow<'static, str>);

impl EcsResource {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EcsResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const HEALTH: EcsResource = EcsResource::from_static("HEALTH");
pub const MAX_HEALTH: EcsResource = EcsResource::from_static("MAX_HEALTH");
pub const MANA: EcsResource = EcsResource::from_static("MANA");
pub const ATTACK: EcsResource = EcsResource::from_static("ATTACK");
pub const ATTACK_AVAILABLE: EcsResource = EcsResource::from_static("ATTACK_AVAILABLE");

/// 엔티티별 자원의 기본값. 실제 값은 모디파이어를 거쳐 계산된다.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMap {
    base: BTreeMap<EcsResource, i32>,
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(&self, resource: &EcsResource) -> Option<i32> {
        self.base.get(resource).copied()
    }

    pub fn set_base(&mut self, resource: EcsResource, value: i32) {
        self.base.insert(resource, value);
    }

    pub fn contains(&self, resource: &EcsResource) -> bool {
        self.base.contains_key(resource)
    }

    pub fn resources(&self) -> impl Iterator<Item = &EcsResource> {
        self.base.keys()
    }
}
