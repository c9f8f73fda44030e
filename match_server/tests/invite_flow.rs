use match_server::protocol::ServerMessage;

mod common;

use common::{matchmaker, new_game_id, TestClient};

fn invite_id(messages: &[ServerMessage]) -> u64 {
    messages
        .iter()
        .find_map(|m| match m {
            ServerMessage::InviteRequest { invite_id, .. } => Some(*invite_id),
            _ => None,
        })
        .expect("invite request delivered")
}

#[test]
fn declined_invite_leaves_nothing_behind() {
    let mm = matchmaker();
    let mut host = TestClient::connect(&mm);
    let mut guest = TestClient::connect(&mm);
    mm.login(&host.client, "alice");
    host.drain();

    mm.start_game(&host.client, Some(guest.id()), None);
    assert_eq!(host.drain(), vec![ServerMessage::Wait]);
    let guest_msgs = guest.drain();
    assert_eq!(
        guest_msgs,
        vec![ServerMessage::InviteRequest {
            invite_id: 1,
            from: "alice".to_string(),
            from_id: host.id(),
            game_type: "default".to_string(),
        }]
    );
    assert_eq!(mm.pending_invites(), 1);

    mm.invite_response(&guest.client, invite_id(&guest_msgs), false);

    assert_eq!(mm.running_games(), 0);
    assert_eq!(mm.pending_invites(), 0);
    assert_eq!(
        host.drain(),
        vec![ServerMessage::InviteResponse {
            invite_id: 1,
            accepted: false
        }]
    );
}

#[test]
fn accepted_invite_starts_the_game() {
    let mm = matchmaker();
    let mut host = TestClient::connect(&mm);
    let mut guest = TestClient::connect(&mm);

    mm.start_game(&host.client, Some(guest.id()), Some("default"));
    let id = invite_id(&guest.drain());
    mm.invite_response(&guest.client, id, true);

    assert_eq!(mm.running_games(), 1);
    assert_eq!(mm.pending_invites(), 0);

    let host_msgs = host.drain();
    let guest_msgs = guest.drain();
    assert!(host_msgs.contains(&ServerMessage::NewGame {
        game_id: 1,
        player_index: 0
    }));
    assert_eq!(new_game_id(&guest_msgs), Some(1));
    assert!(host_msgs
        .iter()
        .any(|m| matches!(m, ServerMessage::Update { .. })));
    assert!(guest_msgs
        .iter()
        .any(|m| matches!(m, ServerMessage::UsableActions { .. })));
}

#[test]
fn invite_to_unknown_or_self_is_refused() {
    let mm = matchmaker();
    let mut host = TestClient::connect(&mm);
    let refused = ServerMessage::InviteResponse {
        invite_id: 0,
        accepted: false,
    };

    mm.start_game(&host.client, Some(99), None);
    assert_eq!(host.drain(), vec![refused.clone()]);

    mm.start_game(&host.client, Some(host.id()), None);
    assert_eq!(host.drain(), vec![refused]);
    assert_eq!(mm.pending_invites(), 0);
}

#[test]
fn only_the_invitee_can_answer() {
    let mm = matchmaker();
    let host = TestClient::connect(&mm);
    let mut guest = TestClient::connect(&mm);
    let stranger = TestClient::connect(&mm);

    mm.start_game(&host.client, Some(guest.id()), None);
    let id = invite_id(&guest.drain());

    mm.invite_response(&stranger.client, id, true);
    assert_eq!(mm.pending_invites(), 1);
    assert_eq!(mm.running_games(), 0);

    mm.invite_response(&host.client, 42, true);
    assert_eq!(mm.pending_invites(), 1);
}

#[test]
fn invitee_disconnect_declines_for_them() {
    let mm = matchmaker();
    let mut host = TestClient::connect(&mm);
    let mut guest = TestClient::connect(&mm);

    mm.start_game(&host.client, Some(guest.id()), None);
    let id = invite_id(&guest.drain());
    host.drain();

    mm.disconnect(guest.id());
    assert_eq!(mm.pending_invites(), 0);
    assert_eq!(
        host.drain(),
        vec![ServerMessage::InviteResponse {
            invite_id: id,
            accepted: false
        }]
    );
}
