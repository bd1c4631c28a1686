use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Player;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    FirstToMove,
    SecondToMove,
    FirstWins,
    SecondWins,
    Draw,
}

impl GameStatus {
    /// Terminal states accept neither moves nor quits.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GameStatus::FirstWins | GameStatus::SecondWins | GameStatus::Draw
        )
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn player_to_move(&self) -> Option<Player> {
        match self {
            GameStatus::FirstToMove => Some(Player::First),
            GameStatus::SecondToMove => Some(Player::Second),
            _ => None,
        }
    }

    pub fn won_by(player: Player) -> Self {
        match player {
            Player::First => GameStatus::FirstWins,
            Player::Second => GameStatus::SecondWins,
        }
    }
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            GameStatus::FirstToMove => "First Player To Move",
            GameStatus::SecondToMove => "Second Player To Move",
            GameStatus::FirstWins => "First Player Wins",
            GameStatus::SecondWins => "Second Player Wins",
            GameStatus::Draw => "Draw",
        };
        write!(f, "{}", label)
    }
}
