//! 엔티티에 붙는 사용 가능한 액션과, 그 대상 규칙.

use std::{collections::BTreeSet, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    ecs::EntityId,
    error::{ContentError, GameError, GameResult},
    game::{components::ActionsComponent, Game},
};

/// 액션을 쓰려는 주체와 액션이 달린 엔티티.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionContext {
    pub entity: EntityId,
    pub performer: EntityId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionInvocation {
    pub entity: EntityId,
    pub performer: EntityId,
    pub action: String,
    pub targets: Vec<EntityId>,
}

type AllowFn = dyn Fn(&Game, &ActionContext) -> bool + Send + Sync;
type PerformFn = dyn Fn(&mut Game, &ActionInvocation) -> Result<(), ContentError> + Send + Sync;
type TargetFilterFn = dyn Fn(&Game, &ActionContext, EntityId) -> bool + Send + Sync;

/// 대상 개수 범위와 대상 필터.
#[derive(Clone)]
pub struct TargetRule {
    pub min: usize,
    pub max: usize,
    filter: Arc<TargetFilterFn>,
}

impl TargetRule {
    pub fn new<F>(min: usize, max: usize, filter: F) -> Self
    where
        F: Fn(&Game, &ActionContext, EntityId) -> bool + Send + Sync + 'static,
    {
        debug_assert!(min <= max, "target rule min must not exceed max");
        Self {
            min,
            max,
            filter: Arc::new(filter),
        }
    }

    pub fn single<F>(filter: F) -> Self
    where
        F: Fn(&Game, &ActionContext, EntityId) -> bool + Send + Sync + 'static,
    {
        Self::new(1, 1, filter)
    }

    pub fn accepts(&self, game: &Game, ctx: &ActionContext, candidate: EntityId) -> bool {
        (self.filter)(game, ctx, candidate)
    }
}

impl std::fmt::Debug for TargetRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetRule")
            .field("min", &self.min)
            .field("max", &self.max)
            .finish()
    }
}

/// 사용 가능한 액션.
///
/// 허용 조건을 지정하지 않으면 "수행자의 턴인가" 만 본다.
pub struct UsableAction {
    name: String,
    allowed: Option<Arc<AllowFn>>,
    targets: Option<TargetRule>,
    perform: Arc<PerformFn>,
}

impl UsableAction {
    pub fn new<F>(name: impl Into<String>, perform: F) -> Self
    where
        F: Fn(&mut Game, &ActionInvocation) -> Result<(), ContentError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            allowed: None,
            targets: None,
            perform: Arc::new(perform),
        }
    }

    #[must_use]
    pub fn allowed_if<F>(mut self, allowed: F) -> Self
    where
        F: Fn(&Game, &ActionContext) -> bool + Send + Sync + 'static,
    {
        self.allowed = Some(Arc::new(allowed));
        self
    }

    #[must_use]
    pub fn with_targets(mut self, rule: TargetRule) -> Self {
        self.targets = Some(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_rule(&self) -> Option<&TargetRule> {
        self.targets.as_ref()
    }

    pub fn is_allowed(&self, game: &Game, ctx: &ActionContext) -> bool {
        match &self.allowed {
            Some(allowed) => allowed(game, ctx),
            None => game.current_player() == Some(ctx.performer),
        }
    }
}

impl std::fmt::Debug for UsableAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsableAction")
            .field("name", &self.name)
            .field("targets", &self.targets)
            .finish()
    }
}

/// 클라이언트에 보내는 액션 요약.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInfo {
    pub entity: EntityId,
    pub action: String,
    pub targeted: bool,
}

/// 대상 후보 조회 결과.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSet {
    pub targets: Vec<EntityId>,
    pub min: usize,
    pub max: usize,
}

impl Game {
    pub fn add_action(&mut self, entity: EntityId, action: UsableAction) -> GameResult<()> {
        if !self.registry.contains(entity) {
            return Err(GameError::EntityNotFound(entity));
        }
        debug!("Action '{}' registered on {}", action.name(), entity);
        match self.registry.component_mut::<ActionsComponent>(entity) {
            Some(mut actions) => actions.add(action),
            None => {
                let mut actions = ActionsComponent::default();
                actions.add(action);
                self.registry.insert(entity, actions)?;
            }
        }
        Ok(())
    }

    pub fn action(&self, entity: EntityId, name: &str) -> GameResult<Arc<UsableAction>> {
        if !self.registry.contains(entity) {
            return Err(GameError::EntityNotFound(entity));
        }
        self.registry
            .component::<ActionsComponent>(entity)
            .and_then(|actions| actions.get(name))
            .ok_or_else(|| GameError::ActionNotFound {
                entity,
                action: name.to_string(),
            })
    }

    /// 액션을 가질 수 있는 엔티티: 플레이어, 그리고 구역 안의 카드.
    fn action_holders(&self) -> Vec<EntityId> {
        let mut holders = self.players.clone();
        for zone in &self.zones {
            if let Some(component) = self.zone(*zone) {
                holders.extend(component.cards.iter().copied());
            }
        }
        holders
    }

    /// 플레이어와 구역 안 카드에 등록된 모든 액션.
    pub fn all_actions(&self) -> Vec<ActionInfo> {
        self.action_holders()
            .into_iter()
            .flat_map(move |entity| {
                self.registry
                    .component::<ActionsComponent>(entity)
                    .into_iter()
                    .flat_map(|actions| actions.iter())
                    .map(move |action| ActionInfo {
                        entity,
                        action: action.name().to_string(),
                        targeted: action.target_rule().is_some(),
                    })
            })
            .collect()
    }

    /// `performer` 가 지금 쓸 수 있는 액션.
    pub fn usable_actions(&self, performer: EntityId) -> Vec<ActionInfo> {
        self.all_actions()
            .into_iter()
            .filter(|info| {
                let ctx = ActionContext {
                    entity: info.entity,
                    performer,
                };
                self.action(info.entity, &info.action)
                    .is_ok_and(|action| action.is_allowed(self, &ctx))
            })
            .collect()
    }

    pub fn available_targets(
        &self,
        performer: EntityId,
        entity: EntityId,
        name: &str,
    ) -> GameResult<TargetSet> {
        let action = self.action(entity, name)?;
        let Some(rule) = action.target_rule() else {
            return Ok(TargetSet {
                targets: Vec::new(),
                min: 0,
                max: 0,
            });
        };
        let ctx = ActionContext { entity, performer };
        let targets = self
            .action_holders()
            .into_iter()
            .filter(|candidate| rule.accepts(self, &ctx, *candidate))
            .collect();
        Ok(TargetSet {
            targets,
            min: rule.min,
            max: rule.max,
        })
    }

    /// 검사를 모두 통과했을 때만 액션을 수행한다. 실패하면 상태는 그대로다.
    pub fn perform_action(
        &mut self,
        performer: EntityId,
        entity: EntityId,
        name: &str,
        targets: Vec<EntityId>,
    ) -> GameResult<()> {
        if self.player_component(performer).is_none() {
            return Err(GameError::NotAPlayer(performer));
        }
        let action = self.action(entity, name)?;
        let ctx = ActionContext { entity, performer };
        if !action.is_allowed(self, &ctx) {
            return Err(GameError::ActionNotAllowed {
                entity,
                action: name.to_string(),
                performer,
            });
        }
        self.check_targets(&action, &ctx, &targets)?;

        info!(
            "{} performs '{}' on {} with {} target(s)",
            performer,
            name,
            entity,
            targets.len()
        );
        let invocation = ActionInvocation {
            entity,
            performer,
            action: name.to_string(),
            targets,
        };
        let result = (action.perform)(self, &invocation);
        self.sync_resources();
        result.map_err(GameError::from)
    }

    fn check_targets(
        &self,
        action: &UsableAction,
        ctx: &ActionContext,
        targets: &[EntityId],
    ) -> GameResult<()> {
        let Some(rule) = action.target_rule() else {
            if targets.is_empty() {
                return Ok(());
            }
            return Err(GameError::InvalidTargets {
                reason: format!("'{}' takes no targets", action.name()),
            });
        };

        if targets.len() < rule.min || targets.len() > rule.max {
            return Err(GameError::InvalidTargets {
                reason: format!(
                    "expected {}..={} targets, got {}",
                    rule.min,
                    rule.max,
                    targets.len()
                ),
            });
        }

        let unique: BTreeSet<_> = targets.iter().collect();
        if unique.len() != targets.len() {
            return Err(GameError::InvalidTargets {
                reason: "duplicate target".to_string(),
            });
        }

        let holders = self.action_holders();
        for target in targets {
            if !holders.contains(target) || !rule.accepts(self, ctx, *target) {
                return Err(GameError::InvalidTargets {
                    reason: format!("{} is not a valid target", target),
                });
            }
        }
        Ok(())
    }
}
