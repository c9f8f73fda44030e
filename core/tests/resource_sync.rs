mod common;

use common::{record_changes, two_player_game};
use game_core::{
    game::components::{Attributes, CardComponent},
    resources::{ResourceMap, ATTACK, HEALTH, MANA},
    ContentError, EcsResource, EntityId, FnModifier, Game, GameEvent, StateChange, ZonePosition,
};
use parking_lot::Mutex;
use serde_json::{json, Value};

fn last_reported(
    log: &Mutex<Vec<StateChange>>,
    entity: EntityId,
    resource: &EcsResource,
) -> Option<Value> {
    log.lock()
        .iter()
        .rev()
        .find(|c| c.entity == entity && c.key == resource.name())
        .map(|c| c.value.clone())
}

fn reports_of(log: &Mutex<Vec<StateChange>>, entity: EntityId, resource: &EcsResource) -> usize {
    log.lock()
        .iter()
        .filter(|c| c.entity == entity && c.key == resource.name())
        .count()
}

fn buffed() -> FnModifier {
    FnModifier::flat(0, 5).applies_to(|view| {
        view.get::<Attributes>()
            .and_then(|attrs| attrs.get("buffed"))
            .is_some_and(|v| v == &json!(true))
    })
}

#[test]
fn attribute_gated_modifier_reports_when_condition_flips() {
    let mut game = two_player_game(1);
    let player = game.first_player();
    let log = record_changes(&mut game);

    game.set_resource(player, HEALTH, 10).unwrap();
    game.add_modifier(HEALTH, buffed()).unwrap();
    assert_eq!(last_reported(&log, player, &HEALTH), Some(json!(10)));

    game.set_attribute(player, "buffed", true).unwrap();
    assert_eq!(game.resource(player, &HEALTH), Ok(15));
    assert_eq!(last_reported(&log, player, &HEALTH), Some(json!(15)));

    game.set_attribute(player, "buffed", false).unwrap();
    assert_eq!(game.resource(player, &HEALTH), Ok(10));
    assert_eq!(last_reported(&log, player, &HEALTH), Some(json!(10)));
}

#[test]
fn modifier_reading_another_resource_follows_its_base() {
    let mut game = two_player_game(1);
    let player = game.first_player();
    let log = record_changes(&mut game);

    game.set_resource(player, ATTACK, 1).unwrap();
    game.add_modifier(
        ATTACK,
        FnModifier::new(0, |view, value| {
            let mana = view
                .get::<ResourceMap>()
                .and_then(|map| map.base(&MANA))
                .unwrap_or(0);
            Ok(value + mana)
        }),
    )
    .unwrap();

    game.set_resource(player, MANA, 3).unwrap();
    assert_eq!(game.resource(player, &ATTACK), Ok(4));
    assert_eq!(last_reported(&log, player, &ATTACK), Some(json!(4)));
}

#[test]
fn zone_gated_modifier_reports_on_card_moves() {
    let mut game = two_player_game(1);
    let owner = game.first_player();
    let deck = game.create_zone(Some(owner), "Deck").unwrap();
    let battlefield = game.create_zone(Some(owner), "Battlefield").unwrap();
    let card = game.create_card(deck, ZonePosition::Top).unwrap();
    let log = record_changes(&mut game);

    game.set_resource(card, ATTACK, 1).unwrap();
    game.add_modifier(
        ATTACK,
        FnModifier::flat(0, 2).applies_to(move |view| {
            view.get::<CardComponent>()
                .is_some_and(|c| c.zone == battlefield)
        }),
    )
    .unwrap();
    assert_eq!(last_reported(&log, card, &ATTACK), Some(json!(1)));

    game.move_card(card, battlefield, ZonePosition::Top).unwrap();
    assert_eq!(last_reported(&log, card, &ATTACK), Some(json!(3)));

    game.move_card(card, deck, ZonePosition::Bottom).unwrap();
    assert_eq!(last_reported(&log, card, &ATTACK), Some(json!(1)));
}

#[test]
fn switch_toggle_through_game_is_reported() {
    let mut game = two_player_game(1);
    let player = game.first_player();
    let log = record_changes(&mut game);

    game.set_resource(player, HEALTH, 10).unwrap();
    let modifier = FnModifier::flat(0, 5);
    let switch = modifier.switch();
    game.add_modifier(HEALTH, modifier).unwrap();
    assert_eq!(last_reported(&log, player, &HEALTH), Some(json!(15)));

    game.set_modifier_active(&switch, &HEALTH, false);
    assert_eq!(game.resource(player, &HEALTH), Ok(10));
    assert_eq!(last_reported(&log, player, &HEALTH), Some(json!(10)));
}

#[test]
fn unaffected_values_are_not_reported_again() {
    let mut game = two_player_game(1);
    let player = game.first_player();
    let log = record_changes(&mut game);

    game.set_resource(player, HEALTH, 10).unwrap();
    game.add_modifier(HEALTH, buffed()).unwrap();
    let before = reports_of(&log, player, &HEALTH);

    game.set_attribute(player, "deckName", "starter").unwrap();
    game.set_resource(player, MANA, 2).unwrap();
    assert_eq!(reports_of(&log, player, &HEALTH), before);
}

#[test]
fn direct_registry_edits_in_handlers_sync_after_the_event() {
    let mut game = two_player_game(1);
    let player = game.first_player();
    let log = record_changes(&mut game);

    game.set_resource(player, HEALTH, 10).unwrap();
    game.add_modifier(HEALTH, buffed()).unwrap();
    game.on("bless", move |g: &mut Game, _: &GameEvent| {
        let mut attrs = Attributes::default();
        attrs.set("buffed", json!(true));
        g.registry_mut()
            .insert(player, attrs)
            .map_err(|e| ContentError::new(e.to_string()))
    });

    game.raise(GameEvent::new("bless"));
    assert_eq!(last_reported(&log, player, &HEALTH), Some(json!(15)));
}
