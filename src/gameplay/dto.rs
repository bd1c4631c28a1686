use serde::{Deserialize, Serialize};

use crate::{Board, Coordinates, Game, Move, Player, UserId};

/// Body of a move submission. Coordinates are signed so that negative input
/// is reported as out of bounds instead of failing to parse.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MoveRequest {
    pub x: i64,
    pub y: i64,
    #[serde(default)]
    pub comment: String,
}

impl MoveRequest {
    pub fn new(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            comment: String::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct InvitationRequest {
    pub to_user: UserId,
    #[serde(default)]
    pub message: String,
}

/// A game as seen by one of its players.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GameView {
    pub game: Game,
    /// `board[y][x]`
    pub board: Vec<Vec<Option<Move>>>,
    pub move_count: usize,
    pub your_player: Option<Player>,
    pub your_turn: bool,
    /// Free cells as `(x, y)`; only filled in when it is the viewer's turn.
    pub available_cells: Vec<Coordinates>,
}

impl GameView {
    pub fn for_user(game: Game, board: &Board, user: &UserId) -> Self {
        let your_turn = game.is_users_turn(user);
        let available_cells = if your_turn {
            board.available_cells()
        } else {
            vec![]
        };
        Self {
            your_player: game.player_of(user),
            your_turn,
            available_cells,
            board: board.rows(),
            move_count: board.move_count(),
            game,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct GameLists {
    pub active: Vec<Game>,
    pub finished: Vec<Game>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct QuitOutcome {
    pub game: Game,
    pub second_player_wins: bool,
}
