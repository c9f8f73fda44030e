use std::collections::BTreeMap;

use bevy_ecs::component::Component;
use tracing::warn;

use crate::{
    ecs::EntityView,
    resources::{EcsResource, EntityModifier},
};

/// 자원 이름별 모디파이어 체인.
///
/// 보통 게임 루트 엔티티에 하나 붙어 있고, 같은 자원을 가진 모든 엔티티에 적용된다.
/// 모디파이어는 제거하지 않는다. 끄려면 활성 플래그를 내린다.
#[derive(Component, Default)]
pub struct ResourceModifierComponent {
    strategies: BTreeMap<EcsResource, Vec<Box<dyn EntityModifier>>>,
}

impl ResourceModifierComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// 체인 끝에 추가한 뒤 곧바로 우선순위로 (안정) 정렬한다.
    /// 같은 모디파이어를 두 번 넣으면 두 번 적용된다.
    pub fn add_modifier(&mut self, resource: EcsResource, modifier: Box<dyn EntityModifier>) {
        let list = self.strategies.entry(resource).or_default();
        list.push(modifier);
        list.sort_by_key(|m| m.priority());
    }

    pub fn modified_resources(&self) -> impl Iterator<Item = &EcsResource> {
        self.strategies.keys()
    }

    pub fn modified_resources_count(&self) -> usize {
        self.strategies.len()
    }

    pub fn modifier_count(&self, resource: &EcsResource) -> usize {
        self.strategies.get(resource).map_or(0, Vec::len)
    }

    pub fn get_resource(&self, entity: EntityView<'_>, resource: &EcsResource, actual: i32) -> i32 {
        let Some(modifiers) = self.strategies.get(resource) else {
            return actual;
        };

        let mut value = actual;
        for modifier in modifiers {
            if !modifier.is_active() || !modifier.applies_to(entity) {
                continue;
            }
            match modifier.modify(entity, resource, value) {
                Ok(next) => value = next,
                Err(e) => warn!(
                    "Modifier (priority {}) for {} on {} failed, skipping: {}",
                    modifier.priority(),
                    resource,
                    entity.id(),
                    e
                ),
            }
        }
        value
    }
}

impl std::fmt::Debug for ResourceModifierComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.strategies.iter().map(|(k, v)| (k.name(), v.len())))
            .finish()
    }
}
