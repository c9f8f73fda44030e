use game_core::GameError;
use thiserror::Error;

use crate::{
    game::GameId,
    protocol::{ErrorCode, ProtocolError, ServerMessage},
    ClientId,
};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Game {0} not found")]
    GameNotFound(GameId),

    #[error("Client {client} is not a participant of game {game}")]
    NotAParticipant { client: ClientId, game: GameId },

    #[error("Unknown game type: {0}")]
    UnknownGameType(String),

    #[error("Game {game} expects {expected} players, got {actual}")]
    PlayerCount {
        game: GameId,
        expected: usize,
        actual: usize,
    },

    #[error("Game setup failed: {0}")]
    Setup(GameError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Metrics registration failed: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ServerError::GameNotFound(_) => ErrorCode::GameNotFound,
            ServerError::NotAParticipant { .. } => ErrorCode::NotAParticipant,
            ServerError::UnknownGameType(_) => ErrorCode::UnknownGameType,
            ServerError::Setup(_) | ServerError::PlayerCount { .. } => ErrorCode::SetupFailed,
            ServerError::Game(e) => match e {
                GameError::EntityNotFound(_) | GameError::NotAZone(_) | GameError::NotAPlayer(_) => {
                    ErrorCode::EntityNotFound
                }
                GameError::ActionNotFound { .. } => ErrorCode::ActionNotFound,
                GameError::ActionNotAllowed { .. } => ErrorCode::ActionNotAllowed,
                GameError::InvalidTargets { .. } => ErrorCode::InvalidTargets,
                GameError::Content(_) => ErrorCode::ContentError,
                GameError::InvalidArgument(_) | GameError::NoPlayers => ErrorCode::InternalError,
            },
            ServerError::Protocol(ProtocolError::UnknownCommand(_)) => ErrorCode::UnknownCommand,
            ServerError::Protocol(_) => ErrorCode::InvalidMessageFormat,
            ServerError::Config(_) | ServerError::Metrics(_) | ServerError::Io(_) => {
                ErrorCode::InternalError
            }
        }
    }

    /// 메트릭 라벨로 쓰는 짧은 이름.
    pub fn reason(&self) -> &'static str {
        self.code().as_str()
    }
}

/// Convert ServerError to the ServerMessage sent back to the client
impl From<&ServerError> for ServerMessage {
    fn from(error: &ServerError) -> Self {
        ServerMessage::Error {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

impl From<ServerError> for ServerMessage {
    fn from(error: ServerError) -> Self {
        ServerMessage::from(&error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::EntityId;

    #[test]
    fn game_errors_map_to_specific_codes() {
        let err = ServerError::from(GameError::ActionNotAllowed {
            entity: EntityId(1),
            action: "End Turn".to_string(),
            performer: EntityId(2),
        });
        match ServerMessage::from(&err) {
            ServerMessage::Error { code, message } => {
                assert_eq!(code, ErrorCode::ActionNotAllowed);
                assert!(message.contains("End Turn"));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn unknown_game_is_game_not_found() {
        assert_eq!(ServerError::GameNotFound(9).code(), ErrorCode::GameNotFound);
        assert_eq!(ServerError::GameNotFound(9).reason(), "game_not_found");
    }
}
