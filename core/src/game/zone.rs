use rand::seq::SliceRandom;
use serde_json::json;
use tracing::debug;

use crate::{
    ecs::EntityId,
    error::{GameError, GameResult},
    game::{
        components::{CardComponent, ZoneComponent},
        listener::keys,
        Game,
    },
};

/// 카드를 구역의 어디에 넣을지.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZonePosition {
    Top,
    Bottom,
}

impl Game {
    pub fn zones(&self) -> &[EntityId] {
        &self.zones
    }

    pub fn zone(&self, zone: EntityId) -> Option<&ZoneComponent> {
        self.registry.component::<ZoneComponent>(zone)
    }

    /// `owner` 가 `None` 이면 공용 구역이다.
    pub fn create_zone(
        &mut self,
        owner: Option<EntityId>,
        name: impl Into<String>,
    ) -> GameResult<EntityId> {
        if let Some(owner) = owner {
            if self.player_component(owner).is_none() {
                return Err(GameError::NotAPlayer(owner));
            }
        }
        let name = name.into();
        let id = self.registry.create();
        debug!("Zone '{}' created: {} (owner {:?})", name, id, owner);
        self.registry.insert(id, ZoneComponent::new(owner, name))?;
        self.zones.push(id);
        Ok(id)
    }

    pub fn find_zone(&self, owner: Option<EntityId>, name: &str) -> Option<EntityId> {
        self.zones.iter().copied().find(|id| {
            self.zone(*id)
                .is_some_and(|zone| zone.owner == owner && zone.name == name)
        })
    }

    pub fn zone_cards(&self, zone: EntityId) -> GameResult<Vec<EntityId>> {
        self.zone(zone)
            .map(|z| z.cards.iter().copied().collect())
            .ok_or(GameError::NotAZone(zone))
    }

    pub fn card_zone(&self, card: EntityId) -> Option<EntityId> {
        self.registry.component::<CardComponent>(card).map(|c| c.zone)
    }

    pub fn create_card(&mut self, zone: EntityId, position: ZonePosition) -> GameResult<EntityId> {
        if self.zone(zone).is_none() {
            return Err(GameError::NotAZone(zone));
        }
        let card = self.registry.create();
        self.registry.insert(card, CardComponent { zone })?;
        self.place(card, zone, position)?;
        self.sync_resources();
        Ok(card)
    }

    pub fn move_card(
        &mut self,
        card: EntityId,
        zone: EntityId,
        position: ZonePosition,
    ) -> GameResult<()> {
        if self.zone(zone).is_none() {
            return Err(GameError::NotAZone(zone));
        }
        let from = self
            .card_zone(card)
            .ok_or(GameError::InvalidArgument(format!("{} is not a card", card)))?;

        self.detach(card, from)?;
        if let Some(mut component) = self.registry.component_mut::<CardComponent>(card) {
            component.zone = zone;
        }
        self.place(card, zone, position)?;
        debug!("{} moved from {} to {}", card, from, zone);
        self.sync_resources();
        Ok(())
    }

    /// 카드를 구역에서 빼고 엔티티를 제거한다.
    pub fn remove_card(&mut self, card: EntityId) -> GameResult<()> {
        let from = self
            .card_zone(card)
            .ok_or(GameError::InvalidArgument(format!("{} is not a card", card)))?;
        self.detach(card, from)?;
        self.registry.destroy(card);
        self.forget_resources(card);
        self.notify(card, keys::REMOVED, json!(true));
        self.sync_resources();
        Ok(())
    }

    pub fn shuffle_zone(&mut self, zone: EntityId) -> GameResult<()> {
        {
            let mut component = self
                .registry
                .component_mut::<ZoneComponent>(zone)
                .ok_or(GameError::NotAZone(zone))?;
            component.cards.make_contiguous().shuffle(&mut self.rng);
        }
        self.notify_zone_cards(zone);
        self.sync_resources();
        Ok(())
    }

    fn place(&mut self, card: EntityId, zone: EntityId, position: ZonePosition) -> GameResult<()> {
        {
            let mut component = self
                .registry
                .component_mut::<ZoneComponent>(zone)
                .ok_or(GameError::NotAZone(zone))?;
            match position {
                ZonePosition::Top => component.cards.push_front(card),
                ZonePosition::Bottom => component.cards.push_back(card),
            }
        }
        self.notify(card, keys::ZONE, json!(zone));
        self.notify_zone_cards(zone);
        Ok(())
    }

    fn detach(&mut self, card: EntityId, zone: EntityId) -> GameResult<()> {
        {
            let mut component = self
                .registry
                .component_mut::<ZoneComponent>(zone)
                .ok_or(GameError::NotAZone(zone))?;
            component.cards.retain(|c| *c != card);
        }
        self.notify_zone_cards(zone);
        Ok(())
    }

    fn notify_zone_cards(&mut self, zone: EntityId) {
        if let Ok(cards) = self.zone_cards(zone) {
            self.notify(zone, keys::CARDS, json!(cards));
        }
    }
}
