use crate::Player;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// (x, y): column first, then row.
pub type Coordinates = (usize, usize);

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub id: Uuid,
    pub game_id: Uuid,
    pub x: usize,
    pub y: usize,
    pub comment: String,
    pub player: Player,
}

impl Move {
    pub const MAX_COMMENT_LENGTH: usize = 300;

    pub fn new(game_id: Uuid, coordinates: Coordinates, player: Player) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_id,
            x: coordinates.0,
            y: coordinates.1,
            comment: String::new(),
            player,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn coordinates(&self) -> Coordinates {
        (self.x, self.y)
    }

    /// Two moves belong to the same line owner if the same player made them.
    ///
    /// Coordinates and comment are ignored; this is not record equality.
    pub fn same_owner(&self, other: &Move) -> bool {
        self.player == other.player
    }
}

/// A move that has been granted to the player on turn but not placed yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveDraft {
    pub game_id: Uuid,
    pub player: Player,
}

impl MoveDraft {
    pub fn place(self, coordinates: Coordinates, comment: impl Into<String>) -> Move {
        Move::new(self.game_id, coordinates, self.player).with_comment(comment)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn same_owner_ignores_position_and_comment() {
        let game_id = Uuid::new_v4();
        let a = Move::new(game_id, (0, 0), Player::First).with_comment("hello");
        let b = Move::new(game_id, (2, 1), Player::First);
        let c = Move::new(game_id, (0, 0), Player::Second).with_comment("hello");

        assert!(a.same_owner(&b));
        assert!(!a.same_owner(&c));
        assert_ne!(a, b, "same owner must not imply record equality");
    }

    #[test]
    fn draft_carries_the_acting_player() {
        let draft = MoveDraft {
            game_id: Uuid::new_v4(),
            player: Player::Second,
        };
        let placed = draft.place((1, 2), "center bottom");

        assert_eq!(placed.game_id, draft.game_id);
        assert_eq!(placed.player, Player::Second);
        assert_eq!(placed.coordinates(), (1, 2));
        assert_eq!(placed.comment, "center bottom");
    }
}
