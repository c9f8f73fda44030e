pub mod game_types;
pub mod server_game;

pub use game_types::{DefaultLayout, GameTypeRegistry};
pub use server_game::ServerGame;

pub type GameId = u64;
