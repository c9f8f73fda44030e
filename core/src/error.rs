use thiserror::Error;

use crate::ecs::EntityId;

/// 룰 컨텐츠(이벤트 핸들러, 모디파이어, 액션)가 보고하는 실패.
///
/// 엔진은 이 에러를 호출 단위에서 잡아 로그로 남기고, 해당 호출은 아무 효과도
/// 없었던 것으로 처리한다.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ContentError {
    pub message: String,
}

impl ContentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("{0} is not a zone")]
    NotAZone(EntityId),

    #[error("{0} is not a player")]
    NotAPlayer(EntityId),

    #[error("Action '{action}' not found on {entity}")]
    ActionNotFound { entity: EntityId, action: String },

    #[error("Action '{action}' on {entity} is not allowed for {performer}")]
    ActionNotAllowed {
        entity: EntityId,
        action: String,
        performer: EntityId,
    },

    #[error("Invalid targets: {reason}")]
    InvalidTargets { reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("A game needs at least one player")]
    NoPlayers,

    #[error("Content error: {0}")]
    Content(#[from] ContentError),
}

pub type GameResult<T> = Result<T, GameError>;
