use std::collections::BTreeMap;

use bevy_ecs::{
    component::{Component, Mutable},
    entity::Entity,
    world::{EntityRef, Mut, World},
};
use tracing::debug;

use crate::{
    ecs::entity::{EntityId, Identity},
    error::GameError,
};

/// ID 할당과 컴포넌트 부착을 전담하는 레지스트리.
///
/// 컴포넌트 저장은 bevy `World` 에 맡기고, 외부로 노출되는 `EntityId` 와 bevy
/// `Entity` 사이의 매핑만 여기서 관리한다. ID 는 0 부터 단조 증가한다.
pub struct EntityRegistry {
    world: World,
    next_id: u32,
    index: BTreeMap<EntityId, Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            next_id: 0,
            index: BTreeMap::new(),
        }
    }

    /// 새 엔티티를 만들고 ID 를 돌려준다. 삭제된 ID 는 다시 나오지 않는다.
    pub fn create(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        let entity = self.world.spawn(Identity(id)).id();
        self.index.insert(id, entity);
        debug!("Entity created: {} -> {:?}", id, entity);
        id
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// 살아있는 엔티티 ID 를 생성 순서대로 순회한다.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.index.keys().copied()
    }

    pub fn view(&self, id: EntityId) -> Option<EntityView<'_>> {
        let entity = *self.index.get(&id)?;
        self.world.get_entity(entity).ok().map(EntityView)
    }

    pub fn component<T: Component>(&self, id: EntityId) -> Option<&T> {
        let entity = *self.index.get(&id)?;
        self.world.get::<T>(entity)
    }

    pub fn component_mut<T: Component<Mutability = Mutable>>(
        &mut self,
        id: EntityId,
    ) -> Option<Mut<'_, T>> {
        let entity = *self.index.get(&id)?;
        self.world.get_mut::<T>(entity)
    }

    pub fn has<T: Component>(&self, id: EntityId) -> bool {
        self.component::<T>(id).is_some()
    }

    /// 컴포넌트를 붙인다. 같은 타입이 이미 있으면 교체된다.
    pub fn insert<T: Component>(&mut self, id: EntityId, component: T) -> Result<(), GameError> {
        let entity = *self.index.get(&id).ok_or(GameError::EntityNotFound(id))?;
        let mut entity_mut = self
            .world
            .get_entity_mut(entity)
            .map_err(|_| GameError::EntityNotFound(id))?;
        entity_mut.insert(component);
        Ok(())
    }

    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> Option<T> {
        let entity = *self.index.get(&id)?;
        let mut entity_mut = self.world.get_entity_mut(entity).ok()?;
        entity_mut.take::<T>()
    }

    /// 엔티티를 제거한다. ID 는 반환되지 않으며 재사용되지도 않는다.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        match self.index.remove(&id) {
            Some(entity) => self.world.despawn(entity),
            None => false,
        }
    }

    /// 조건을 만족하는 엔티티 ID 를 생성 순서대로 모은다.
    pub fn find(&self, mut predicate: impl FnMut(EntityView<'_>) -> bool) -> Vec<EntityId> {
        self.index
            .keys()
            .filter(|id| self.view(**id).is_some_and(&mut predicate))
            .copied()
            .collect()
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// 엔티티 하나에 대한 읽기 전용 뷰. 모디파이어 조건식과 액션 필터가 받는 타입이다.
#[derive(Clone, Copy)]
pub struct EntityView<'w>(EntityRef<'w>);

impl<'w> EntityView<'w> {
    pub fn id(&self) -> EntityId {
        match self.0.get::<Identity>() {
            Some(identity) => identity.0,
            None => unreachable!("every registry entity carries an Identity component"),
        }
    }

    pub fn get<T: Component>(&self) -> Option<&'w T> {
        self.0.get::<T>()
    }

    pub fn has<T: Component>(&self) -> bool {
        self.0.contains::<T>()
    }
}

impl std::fmt::Debug for EntityView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EntityView").field(&self.id()).finish()
    }
}
