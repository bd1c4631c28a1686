use crate::{Board, Game, Move};
use serde::{Deserialize, Serialize};

/// A game together with every move recorded for it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GameData {
    pub game: Game,
    pub moves: Vec<Move>,
}

impl GameData {
    pub fn board(&self) -> Board {
        Board::from(self)
    }
}
