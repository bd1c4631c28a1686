use crate::InvalidMove;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    InvalidMove(InvalidMove),
    InvalidInput(String),
    GameFinished,
    NotFound,
    Forbidden,
    Storage(String),
}

impl GameError {
    /// Short machine readable name used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            GameError::InvalidMove(InvalidMove::OutOfBounds) => "out_of_bounds",
            GameError::InvalidMove(InvalidMove::OccupiedCell) => "occupied_cell",
            GameError::InvalidInput(_) => "invalid_input",
            GameError::GameFinished => "game_finished",
            GameError::NotFound => "not_found",
            GameError::Forbidden => "forbidden",
            GameError::Storage(_) => "storage",
        }
    }
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::InvalidMove(InvalidMove::OutOfBounds) => write!(f, "Invalid coordinates"),
            GameError::InvalidMove(InvalidMove::OccupiedCell) => write!(f, "Square is not empty"),
            GameError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            GameError::GameFinished => write!(f, "The game is already finished"),
            GameError::NotFound => write!(f, "Not found"),
            GameError::Forbidden => write!(f, "Not allowed for this user"),
            GameError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for GameError {}

impl From<InvalidMove> for GameError {
    fn from(err: InvalidMove) -> Self {
        GameError::InvalidMove(err)
    }
}
