use bevy_ecs::component::Component;
use serde::{Deserialize, Serialize};

/// 게임 인스턴스 안에서 유일한 엔티티 식별자.
///
/// bevy 의 `Entity` 는 인덱스를 재활용하지만 `EntityId` 는 한 게임 동안 절대
/// 재사용되지 않는다. 외부(네트워크, 컨텐츠)에는 항상 이 값만 노출한다.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl EntityId {
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// 모든 엔티티에 붙는 식별 컴포넌트. 컴포넌트 뷰에서 자기 ID 를 되찾을 때 쓴다.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity(pub EntityId);
