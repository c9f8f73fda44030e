use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{ecs::EntityView, error::ContentError, resources::EcsResource};

/// 자원 값을 변형하는 규칙.
///
/// 우선순위가 낮은 것부터 적용되고, 같은 우선순위는 먼저 등록된 것이 먼저다.
/// 비활성이거나 대상 엔티티에 해당하지 않으면 건너뛴다.
pub trait EntityModifier: Send + Sync {
    fn priority(&self) -> i32;

    fn is_active(&self) -> bool {
        true
    }

    fn applies_to(&self, _entity: EntityView<'_>) -> bool {
        true
    }

    fn modify(
        &self,
        entity: EntityView<'_>,
        resource: &EcsResource,
        value: i32,
    ) -> Result<i32, ContentError>;
}

/// 모디파이어의 활성 플래그. 등록한 쪽이 복제해 두었다가
/// [`Game::set_modifier_active`](crate::Game::set_modifier_active) 로 끄고 켠다.
#[derive(Clone, Debug)]
pub struct ModifierSwitch(Arc<AtomicBool>);

impl ModifierSwitch {
    pub fn new(active: bool) -> Self {
        Self(Arc::new(AtomicBool::new(active)))
    }

    pub fn is_on(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn set(&self, active: bool) {
        self.0.store(active, Ordering::Release);
    }
}

impl Default for ModifierSwitch {
    fn default() -> Self {
        Self::new(true)
    }
}

type ApplyFn = dyn Fn(EntityView<'_>, i32) -> Result<i32, ContentError> + Send + Sync;
type AppliesFn = dyn Fn(EntityView<'_>) -> bool + Send + Sync;

/// 클로저로 구성하는 모디파이어. 컨텐츠 팩이 주로 쓰는 형태다.
pub struct FnModifier {
    priority: i32,
    switch: ModifierSwitch,
    applies: Option<Box<AppliesFn>>,
    apply: Box<ApplyFn>,
}

impl FnModifier {
    pub fn new<F>(priority: i32, apply: F) -> Self
    where
        F: Fn(EntityView<'_>, i32) -> Result<i32, ContentError> + Send + Sync + 'static,
    {
        Self {
            priority,
            switch: ModifierSwitch::default(),
            applies: None,
            apply: Box::new(apply),
        }
    }

    /// 고정 값 증감 (예: +2 공격력)
    pub fn flat(priority: i32, delta: i32) -> Self {
        Self::new(priority, move |_, value| Ok(value.saturating_add(delta)))
    }

    /// 퍼센트 증감 (예: +50 → 1.5배). 소수점 이하는 버린다.
    pub fn percent(priority: i32, percent: i32) -> Self {
        Self::new(priority, move |_, value| {
            let delta = i64::from(value) * i64::from(percent) / 100;
            let result = i64::from(value) + delta;
            Ok(result.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
        })
    }

    #[must_use]
    pub fn applies_to<P>(mut self, predicate: P) -> Self
    where
        P: Fn(EntityView<'_>) -> bool + Send + Sync + 'static,
    {
        self.applies = Some(Box::new(predicate));
        self
    }

    #[must_use]
    pub fn with_switch(mut self, switch: ModifierSwitch) -> Self {
        self.switch = switch;
        self
    }

    pub fn switch(&self) -> ModifierSwitch {
        self.switch.clone()
    }
}

impl EntityModifier for FnModifier {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn is_active(&self) -> bool {
        self.switch.is_on()
    }

    fn applies_to(&self, entity: EntityView<'_>) -> bool {
        self.applies.as_ref().map_or(true, |predicate| predicate(entity))
    }

    fn modify(
        &self,
        entity: EntityView<'_>,
        _resource: &EcsResource,
        value: i32,
    ) -> Result<i32, ContentError> {
        (self.apply)(entity, value)
    }
}

impl std::fmt::Debug for FnModifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnModifier")
            .field("priority", &self.priority)
            .field("active", &self.switch.is_on())
            .field("conditional", &self.applies.is_some())
            .finish()
    }
}
