//! 게임 루트 애그리거트와 턴 진행.

use std::{collections::BTreeMap, sync::Arc};

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::{
    ecs::{EntityId, EntityRegistry},
    error::{ContentError, GameError, GameResult},
    events::{
        bus::DEFAULT_MAX_CHAINED_EVENTS, EventBus, EventHandler, EventName, GameEvent, TURN_END,
        TURN_START,
    },
    resources::{
        EcsResource, EntityModifier, ModifierSwitch, ResourceMap, ResourceModifierComponent,
    },
};

pub mod action;
pub mod components;
pub mod listener;
pub mod zone;

use components::{Attributes, PlayerComponent};
pub use listener::{StateChange, StateChangeListener};

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub player_names: Vec<String>,
    pub seed: u64,
    pub max_chained_events: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_names: vec!["Player1".to_string(), "Player2".to_string()],
            seed: 0,
            max_chained_events: DEFAULT_MAX_CHAINED_EVENTS,
        }
    }
}

/// 한 판의 게임 상태 전체.
///
/// 루트 엔티티(ID 0)가 게임 자신을 나타내고, 모디파이어 체인과 턴 관련 상태 보고는
/// 루트에 붙는다. 외부에 보이는 상태가 바뀔 때마다 리스너로 `StateChange` 가 나간다.
pub struct Game {
    registry: EntityRegistry,
    root: EntityId,
    zones: Vec<EntityId>,
    players: Vec<EntityId>,
    bus: EventBus,
    rng: StdRng,
    turn_number: u32,
    current_player: Option<EntityId>,
    game_over: bool,
    listener: Option<Box<dyn StateChangeListener>>,
    /// 모디파이어가 걸린 자원의 마지막 보고 값.
    reported: BTreeMap<(EntityId, EcsResource), i32>,
}

impl Game {
    pub fn new(config: GameConfig) -> GameResult<Self> {
        if config.player_names.is_empty() {
            return Err(GameError::NoPlayers);
        }

        let mut registry = EntityRegistry::new();
        let root = registry.create();
        registry.insert(root, ResourceModifierComponent::new())?;

        let players: Vec<EntityId> = config.player_names.iter().map(|_| registry.create()).collect();
        for (index, (id, name)) in players.iter().zip(&config.player_names).enumerate() {
            let next = players[(index + 1) % players.len()];
            registry.insert(
                *id,
                PlayerComponent {
                    name: name.clone(),
                    index,
                    next,
                },
            )?;
        }

        info!(
            "Game created with {} player(s), seed {}",
            players.len(),
            config.seed
        );

        Ok(Self {
            registry,
            root,
            zones: Vec::new(),
            players,
            bus: EventBus::new(config.max_chained_events),
            rng: StdRng::seed_from_u64(config.seed),
            turn_number: 1,
            current_player: None,
            game_over: false,
            listener: None,
            reported: BTreeMap::new(),
        })
    }

    pub fn set_listener(&mut self, listener: impl StateChangeListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub(crate) fn notify(&mut self, entity: EntityId, key: &str, value: serde_json::Value) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_change(&StateChange {
                entity,
                key: key.to_string(),
                value,
            });
        }
    }

    pub fn root(&self) -> EntityId {
        self.root
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// 컨텐츠 전용 컴포넌트를 붙일 때 쓴다. 여기서의 변경은 바로 보고되지 않고,
    /// 모디파이어 계산 값만 다음 [`Game::sync_resources`] 때 다시 보고된다.
    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    // ---- players ----

    pub fn players(&self) -> &[EntityId] {
        &self.players
    }

    pub fn first_player(&self) -> EntityId {
        self.players[0]
    }

    pub fn last_player(&self) -> EntityId {
        self.players[self.players.len() - 1]
    }

    pub fn player(&self, index: usize) -> Option<EntityId> {
        self.players.get(index).copied()
    }

    pub fn player_component(&self, player: EntityId) -> Option<&PlayerComponent> {
        self.registry.component::<PlayerComponent>(player)
    }

    pub fn next_player(&self, player: EntityId) -> GameResult<EntityId> {
        self.player_component(player)
            .map(|p| p.next)
            .ok_or(GameError::NotAPlayer(player))
    }

    pub fn current_player(&self) -> Option<EntityId> {
        self.current_player
    }

    pub fn set_current_player(&mut self, player: EntityId) -> GameResult<()> {
        if self.player_component(player).is_none() {
            return Err(GameError::NotAPlayer(player));
        }
        self.current_player = Some(player);
        self.notify(self.root, listener::keys::CURRENT_PLAYER, json!(player));
        Ok(())
    }

    // ---- turns ----

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// 턴을 넘긴다.
    ///
    /// 현재 플레이어의 `TURN_END`, 다음 플레이어로 전환, `TURN_START` 순서로 진행한다.
    /// 새 현재 플레이어가 턴 순서상 마지막이면 턴 번호가 1 오른다.
    pub fn advance_turn(&mut self) {
        if let Some(current) = self.current_player {
            self.raise(GameEvent::new(TURN_END).from_entity(current));
        }

        let next = match self.current_player {
            Some(current) => self.next_player(current).unwrap_or_else(|_| self.first_player()),
            None => self.first_player(),
        };
        self.current_player = Some(next);
        self.notify(self.root, listener::keys::CURRENT_PLAYER, json!(next));
        debug!("Turn passes to {}", next);

        self.raise(GameEvent::new(TURN_START).from_entity(next));

        if next == self.last_player() {
            self.turn_number += 1;
            self.notify(self.root, listener::keys::TURN_NUMBER, json!(self.turn_number));
        }
    }

    /// 게임을 끝난 상태로 표시한다. 이후의 `advance_turn` 을 막지는 않는다.
    pub fn game_over(&mut self) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        info!("Game over at turn {}", self.turn_number);
        self.notify(self.root, listener::keys::GAME_OVER, json!(true));
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    // ---- randomness ----

    /// `0..bound` 범위의 난수.
    pub fn random_int(&mut self, bound: u32) -> GameResult<u32> {
        if bound == 0 {
            return Err(GameError::InvalidArgument(
                "random bound must be positive".to_string(),
            ));
        }
        Ok(self.rng.gen_range(0..bound))
    }

    // ---- events ----

    pub fn on<F>(&mut self, name: impl Into<EventName>, handler: F)
    where
        F: Fn(&mut Game, &GameEvent) -> Result<(), ContentError> + Send + Sync + 'static,
    {
        self.bus.register(name.into(), Arc::new(handler));
    }

    pub fn on_shared(&mut self, name: impl Into<EventName>, handler: Arc<dyn EventHandler>) {
        self.bus.register(name.into(), handler);
    }

    /// 이벤트를 발생시킨다.
    ///
    /// 다른 이벤트를 처리하는 도중이면 큐에 넣고 바로 돌아온다. 가장 바깥 호출이 큐를
    /// 끝까지 비운다.
    pub fn raise(&mut self, event: GameEvent) {
        self.bus.enqueue(event);
        if !self.bus.begin_drain() {
            return;
        }

        while let Some((event, handlers)) = self.bus.next_dispatch() {
            for handler in handlers {
                if let Err(e) = handler.handle(self, &event) {
                    warn!("Handler for '{}' failed, skipping: {}", event.name, e);
                }
            }
        }
        self.bus.end_drain();
        self.sync_resources();
    }

    // ---- resources ----

    /// 모디파이어를 거친 자원 값. 기본값이 없으면 0 에서 시작한다.
    pub fn resource(&self, entity: EntityId, resource: &EcsResource) -> GameResult<i32> {
        let view = self
            .registry
            .view(entity)
            .ok_or(GameError::EntityNotFound(entity))?;
        let base = view
            .get::<ResourceMap>()
            .and_then(|map| map.base(resource))
            .unwrap_or(0);
        Ok(match self.registry.component::<ResourceModifierComponent>(self.root) {
            Some(modifiers) => modifiers.get_resource(view, resource, base),
            None => base,
        })
    }

    pub fn base_resource(&self, entity: EntityId, resource: &EcsResource) -> Option<i32> {
        self.registry
            .component::<ResourceMap>(entity)
            .and_then(|map| map.base(resource))
    }

    pub fn set_resource(
        &mut self,
        entity: EntityId,
        resource: EcsResource,
        value: i32,
    ) -> GameResult<()> {
        if !self.registry.contains(entity) {
            return Err(GameError::EntityNotFound(entity));
        }
        match self.registry.component_mut::<ResourceMap>(entity) {
            Some(mut map) => map.set_base(resource.clone(), value),
            None => {
                let mut map = ResourceMap::new();
                map.set_base(resource.clone(), value);
                self.registry.insert(entity, map)?;
            }
        }
        self.report_resource(entity, &resource);
        self.sync_resources();
        Ok(())
    }

    pub fn change_resource(
        &mut self,
        entity: EntityId,
        resource: EcsResource,
        delta: i32,
    ) -> GameResult<()> {
        let base = self.base_resource(entity, &resource).unwrap_or(0);
        self.set_resource(entity, resource, base.saturating_add(delta))
    }

    /// 모디파이어를 등록하고, 그 자원을 가진 모든 엔티티의 계산 값을 다시 보고한다.
    pub fn add_modifier(
        &mut self,
        resource: EcsResource,
        modifier: impl EntityModifier + 'static,
    ) -> GameResult<()> {
        let root = self.root;
        self.registry
            .component_mut::<ResourceModifierComponent>(root)
            .ok_or(GameError::EntityNotFound(root))?
            .add_modifier(resource.clone(), Box::new(modifier));
        self.refresh_resource(&resource);
        Ok(())
    }

    pub fn set_modifier_active(
        &mut self,
        switch: &ModifierSwitch,
        resource: &EcsResource,
        active: bool,
    ) {
        if switch.is_on() == active {
            return;
        }
        switch.set(active);
        self.refresh_resource(resource);
    }

    pub fn modifiers(&self) -> Option<&ResourceModifierComponent> {
        self.registry.component::<ResourceModifierComponent>(self.root)
    }

    /// 기본값을 가진 모든 엔티티에 대해 계산 값을 다시 보고한다.
    pub fn refresh_resource(&mut self, resource: &EcsResource) {
        for entity in self.resource_holders(resource) {
            self.report_resource(entity, resource);
        }
    }

    /// 모디파이어가 걸린 자원을 모두 다시 계산해서, 마지막 보고와 달라진 값만 보고한다.
    ///
    /// 조건식이나 모디파이어가 읽는 상태가 바뀐 뒤에 불린다. `registry_mut` 으로 직접
    /// 고친 경우에는 컨텐츠가 직접 호출한다. 액션과 이벤트 처리 뒤에는 자동으로 돈다.
    pub fn sync_resources(&mut self) {
        let resources: Vec<EcsResource> = match self.modifiers() {
            Some(modifiers) => modifiers.modified_resources().cloned().collect(),
            None => return,
        };

        let mut changed = Vec::new();
        for resource in resources {
            for entity in self.resource_holders(&resource) {
                let Ok(value) = self.resource(entity, &resource) else {
                    continue;
                };
                let key = (entity, resource.clone());
                if self.reported.get(&key) != Some(&value) {
                    changed.push((key, value));
                }
            }
        }

        for ((entity, resource), value) in changed {
            self.notify(entity, resource.name(), json!(value));
            self.reported.insert((entity, resource), value);
        }
    }

    fn resource_holders(&self, resource: &EcsResource) -> Vec<EntityId> {
        self.registry
            .find(|view| view.get::<ResourceMap>().is_some_and(|m| m.contains(resource)))
    }

    fn report_resource(&mut self, entity: EntityId, resource: &EcsResource) {
        if let Ok(value) = self.resource(entity, resource) {
            self.reported.insert((entity, resource.clone()), value);
            self.notify(entity, resource.name(), json!(value));
        }
    }

    pub(crate) fn forget_resources(&mut self, entity: EntityId) {
        self.reported.retain(|(holder, _), _| *holder != entity);
    }

    // ---- attributes ----

    pub fn attribute(&self, entity: EntityId, key: &str) -> Option<&serde_json::Value> {
        self.registry
            .component::<Attributes>(entity)
            .and_then(|attrs| attrs.get(key))
    }

    pub fn set_attribute(
        &mut self,
        entity: EntityId,
        key: &str,
        value: impl Into<serde_json::Value>,
    ) -> GameResult<()> {
        if !self.registry.contains(entity) {
            return Err(GameError::EntityNotFound(entity));
        }
        let value = value.into();
        match self.registry.component_mut::<Attributes>(entity) {
            Some(mut attrs) => attrs.set(key, value.clone()),
            None => {
                let mut attrs = Attributes::default();
                attrs.set(key, value.clone());
                self.registry.insert(entity, attrs)?;
            }
        }
        self.notify(entity, key, value);
        self.sync_resources();
        Ok(())
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("entities", &self.registry.len())
            .field("players", &self.players)
            .field("zones", &self.zones)
            .field("turn_number", &self.turn_number)
            .field("current_player", &self.current_player)
            .field("game_over", &self.game_over)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{FnModifier, HEALTH};
    use parking_lot::Mutex;

    fn game() -> Game {
        Game::new(GameConfig::default()).unwrap()
    }

    fn recording(game: &mut Game) -> Arc<Mutex<Vec<StateChange>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        game.set_listener(move |change: &StateChange| sink.lock().push(change.clone()));
        log
    }

    #[test]
    fn ids_follow_creation_order() {
        let game = game();
        assert_eq!(game.root(), EntityId(0));
        assert_eq!(game.players(), &[EntityId(1), EntityId(2)]);
        assert_eq!(game.next_player(EntityId(2)), Ok(EntityId(1)));
        assert_eq!(game.player_component(EntityId(1)).unwrap().name, "Player1");
    }

    #[test]
    fn empty_player_list_is_rejected() {
        let config = GameConfig {
            player_names: Vec::new(),
            ..GameConfig::default()
        };
        assert!(matches!(Game::new(config), Err(GameError::NoPlayers)));
    }

    #[test]
    fn first_advance_starts_with_first_player() {
        let mut game = game();
        assert_eq!(game.current_player(), None);
        assert_eq!(game.turn_number(), 1);

        game.advance_turn();
        assert_eq!(game.current_player(), Some(game.first_player()));
        assert_eq!(game.turn_number(), 1);

        game.advance_turn();
        assert_eq!(game.current_player(), Some(game.last_player()));
        assert_eq!(game.turn_number(), 2);
    }

    #[test]
    fn turn_events_carry_player_source() {
        let mut game = game();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for name in [TURN_START, TURN_END] {
            let seen = seen.clone();
            game.on(name, move |_: &mut Game, event: &GameEvent| {
                seen.lock().push((event.name.clone(), event.source));
                Ok(())
            });
        }

        game.advance_turn();
        game.advance_turn();

        let p1 = Some(game.first_player());
        let p2 = Some(game.last_player());
        assert_eq!(
            *seen.lock(),
            vec![(TURN_START, p1), (TURN_END, p1), (TURN_START, p2)]
        );
    }

    #[test]
    fn random_int_rejects_zero_bound() {
        let mut game = game();
        assert!(matches!(game.random_int(0), Err(GameError::InvalidArgument(_))));
        assert!(game.random_int(6).unwrap() < 6);
    }

    #[test]
    fn game_over_is_reported_once() {
        let mut game = game();
        let log = recording(&mut game);

        game.game_over();
        game.game_over();
        assert!(game.is_game_over());

        let changes = log.lock();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].key, listener::keys::GAME_OVER);
    }

    #[test]
    fn resource_changes_report_computed_value() {
        let mut game = game();
        let player = game.first_player();
        let log = recording(&mut game);

        game.set_resource(player, HEALTH, 10).unwrap();
        let modifier = FnModifier::flat(0, 5);
        let switch = modifier.switch();
        game.add_modifier(HEALTH, modifier).unwrap();
        assert_eq!(game.resource(player, &HEALTH), Ok(15));
        assert_eq!(game.base_resource(player, &HEALTH), Some(10));

        game.set_modifier_active(&switch, &HEALTH, false);
        assert_eq!(game.resource(player, &HEALTH), Ok(10));

        let values: Vec<_> = log.lock().iter().map(|c| c.value.clone()).collect();
        assert_eq!(values, vec![json!(10), json!(15), json!(10)]);
    }

    #[test]
    fn percent_modifier_saturates_instead_of_wrapping() {
        let mut game = game();
        let (p1, p2) = (game.first_player(), game.last_player());
        game.set_resource(p1, HEALTH, 1_000_000_000).unwrap();
        game.set_resource(p2, HEALTH, -1_000_000_000).unwrap();
        game.add_modifier(HEALTH, FnModifier::percent(0, 1000)).unwrap();

        assert_eq!(game.resource(p1, &HEALTH), Ok(i32::MAX));
        assert_eq!(game.resource(p2, &HEALTH), Ok(i32::MIN));
    }

    #[test]
    fn attributes_are_reported() {
        let mut game = game();
        let player = game.first_player();
        let log = recording(&mut game);

        game.set_attribute(player, "deckName", "starter").unwrap();
        assert_eq!(game.attribute(player, "deckName"), Some(&json!("starter")));
        assert_eq!(log.lock()[0].key, "deckName");
        assert!(game.set_attribute(EntityId(99), "x", 1).is_err());
    }
}
