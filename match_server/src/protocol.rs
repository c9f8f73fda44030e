use actix::prelude::*;
use game_core::{ActionInfo, EntityId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{game::GameId, matchmaker::InviteId, ClientId};

// --- Client to Server Messages ---

#[derive(Serialize, Deserialize, Message, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
#[serde(tag = "command")]
pub enum ClientMessage {
    /// 이름을 등록합니다.
    #[serde(rename = "login")]
    Login { username: String },

    /// 게임을 요청합니다. `opponent` 가 없거나 음수면 빠른 매칭입니다.
    #[serde(rename = "startgame", rename_all = "camelCase")]
    StartGame {
        #[serde(default)]
        opponent: Option<i64>,
        #[serde(default)]
        game_type: Option<String>,
    },

    /// 받은 초대에 응답합니다.
    #[serde(rename = "inviteResponse", rename_all = "camelCase")]
    InviteResponse { invite_id: InviteId, accepted: bool },

    /// 진행 중인 게임에서 액션을 사용합니다.
    #[serde(rename = "use", rename_all = "camelCase")]
    UseAbility {
        game_id: GameId,
        id: EntityId,
        action: String,
        #[serde(default)]
        targets: Vec<EntityId>,
    },

    /// 액션의 대상 후보를 요청합니다.
    #[serde(rename = "requestTargets", rename_all = "camelCase")]
    RequestTargets {
        game_id: GameId,
        id: EntityId,
        action: String,
    },
}

impl ClientMessage {
    pub const COMMANDS: [&'static str; 5] =
        ["login", "startgame", "inviteResponse", "use", "requestTargets"];
}

// --- Server to Client Messages ---

#[derive(Serialize, Deserialize, Message, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
#[serde(tag = "command")]
pub enum ServerMessage {
    /// 로그인 결과. 거부되면 `user_id` 는 0 입니다.
    #[serde(rename = "loginresponse", rename_all = "camelCase")]
    Welcome { user_id: ClientId, ok: bool },

    /// 상대를 기다리는 중입니다.
    #[serde(rename = "wait")]
    Wait,

    /// 다른 클라이언트가 보낸 초대입니다.
    #[serde(rename = "inviteRequest", rename_all = "camelCase")]
    InviteRequest {
        invite_id: InviteId,
        from: String,
        from_id: ClientId,
        game_type: String,
    },

    /// 초대가 거절되었거나 대상이 없습니다.
    #[serde(rename = "inviteResponse", rename_all = "camelCase")]
    InviteResponse { invite_id: InviteId, accepted: bool },

    #[serde(rename = "newgame", rename_all = "camelCase")]
    NewGame { game_id: GameId, player_index: usize },

    /// 엔진 상태 변경 한 건.
    #[serde(rename = "update", rename_all = "camelCase")]
    Update {
        game_id: GameId,
        id: EntityId,
        key: String,
        value: serde_json::Value,
    },

    #[serde(rename = "targets", rename_all = "camelCase")]
    AvailableTargets {
        game_id: GameId,
        id: EntityId,
        action: String,
        targets: Vec<EntityId>,
        min: usize,
        max: usize,
    },

    /// 지금 쓸 수 있는 액션 목록 (이전 목록을 대체).
    #[serde(rename = "useable", rename_all = "camelCase")]
    UsableActions {
        game_id: GameId,
        actions: Vec<ActionInfo>,
    },

    #[serde(rename = "gameover", rename_all = "camelCase")]
    GameOver { game_id: GameId },

    /// 에러가 발생했음을 알립니다.
    #[serde(rename = "error")]
    Error { code: ErrorCode, message: String },
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    GameNotFound,
    NotAParticipant,
    UnknownGameType,
    SetupFailed,
    EntityNotFound,
    ActionNotFound,
    ActionNotAllowed,
    InvalidTargets,
    ContentError,
    UnknownCommand,
    InvalidMessageFormat,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::GameNotFound => "game_not_found",
            ErrorCode::NotAParticipant => "not_a_participant",
            ErrorCode::UnknownGameType => "unknown_game_type",
            ErrorCode::SetupFailed => "setup_failed",
            ErrorCode::EntityNotFound => "entity_not_found",
            ErrorCode::ActionNotFound => "action_not_found",
            ErrorCode::ActionNotAllowed => "action_not_allowed",
            ErrorCode::InvalidTargets => "invalid_targets",
            ErrorCode::ContentError => "content_error",
            ErrorCode::UnknownCommand => "unknown_command",
            ErrorCode::InvalidMessageFormat => "invalid_message_format",
            ErrorCode::InternalError => "internal_error",
        }
    }
}

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Message has no command tag")]
    MissingCommand,

    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// 텍스트 프레임 하나를 클라이언트 메시지로 해석한다.
///
/// 태그가 알려진 명령이 아니면 `UnknownCommand`, 필드가 맞지 않으면 `Malformed`.
pub fn decode_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let command = value
        .get("command")
        .and_then(serde_json::Value::as_str)
        .ok_or(ProtocolError::MissingCommand)?;

    if !ClientMessage::COMMANDS.contains(&command) {
        return Err(ProtocolError::UnknownCommand(command.to_string()));
    }
    Ok(serde_json::from_value(value)?)
}
