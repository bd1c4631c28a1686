mod boards;
mod error;
mod game;
mod game_data;
mod gamestate;
mod invitation;
mod r#move;
mod player;
mod user;

pub use boards::{evaluate, Board, InvalidMove};
pub use error::GameError;
pub use game::Game;
pub use game_data::GameData;
pub use gamestate::GameStatus;
pub use invitation::Invitation;
pub use player::Player;
pub use r#move::{Coordinates, Move, MoveDraft};
pub use user::UserId;
