use std::fmt::Display;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{evaluate, Board, GameError, GameStatus, Move, MoveDraft, Player, UserId};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Game {
    pub id: Uuid,
    pub first_player: UserId,
    pub second_player: UserId,
    pub start_time: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub status: GameStatus,
}

impl Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} vs. {}", self.first_player, self.second_player)
    }
}

impl Game {
    pub fn new(first_player: UserId, second_player: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_player,
            second_player,
            start_time: now,
            last_active: now,
            status: GameStatus::default(),
        }
    }

    pub fn player_of(&self, user: &UserId) -> Option<Player> {
        if *user == self.first_player {
            Some(Player::First)
        } else if *user == self.second_player {
            Some(Player::Second)
        } else {
            None
        }
    }

    pub fn is_participant(&self, user: &UserId) -> bool {
        self.player_of(user).is_some()
    }

    pub fn is_users_turn(&self, user: &UserId) -> bool {
        (*user == self.first_player && self.status == GameStatus::FirstToMove)
            || (*user == self.second_player && self.status == GameStatus::SecondToMove)
    }

    /// Hands out a move for the player on turn.
    pub fn start_move(&self) -> Result<MoveDraft, GameError> {
        let player = self
            .status
            .player_to_move()
            .ok_or(GameError::GameFinished)?;
        Ok(MoveDraft {
            game_id: self.id,
            player,
        })
    }

    /// Derives the status after `last_move`. `board` must already contain it.
    pub fn apply_move(&mut self, board: &Board, last_move: &Move) {
        self.status = evaluate(board, last_move, board.move_count(), self.status);
        self.last_active = Utc::now();
        if self.status.is_terminal() {
            info!("Game {} ({}) finished: {}", self.id, self, self.status);
        }
    }

    /// Ends the game in favour of the second player, whoever quits.
    ///
    /// Returns whether the game now reads as won by the second player.
    pub fn quit(&mut self) -> Result<bool, GameError> {
        if self.status.is_terminal() {
            return Err(GameError::GameFinished);
        }
        self.status = GameStatus::SecondWins;
        self.last_active = Utc::now();
        info!("Game {} ({}) quit: {}", self.id, self, self.status);
        Ok(self.status == GameStatus::SecondWins)
    }
}
