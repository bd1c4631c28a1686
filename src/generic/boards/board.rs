use itertools::Itertools;
use log::warn;
use ndarray::Array2;

use crate::{Coordinates, GameData, Move};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidMove {
    OutOfBounds,
    OccupiedCell,
}

/// Dense view of a game's recorded moves, indexed `[(y, x)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub data: Array2<Option<Move>>,
    pub moves: Vec<Move>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&GameData> for Board {
    fn from(game_data: &GameData) -> Self {
        Board::materialize(&game_data.moves)
    }
}

impl Board {
    pub const SIZE: usize = 3;

    pub fn new() -> Self {
        Self {
            data: Array2::from_elem((Self::SIZE, Self::SIZE), None),
            moves: Vec::new(),
        }
    }

    /// Builds the board from an unordered collection of moves.
    ///
    /// If two moves claim the same cell the later one wins.
    pub fn materialize<'a>(moves: impl IntoIterator<Item = &'a Move>) -> Self {
        let mut board = Board::new();
        for m in moves {
            board.render_move(m.clone());
        }
        board
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Move> {
        self.data.get((y, x)).and_then(Option::as_ref)
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.data.iter().filter(|cell| cell.is_some()).count()
    }

    /// Cells that [`Board::validate_move`] accepts, in row-major order.
    pub fn available_cells(&self) -> Vec<Coordinates> {
        (0..Self::SIZE as i64)
            .cartesian_product(0..Self::SIZE as i64)
            .filter_map(|(y, x)| self.validate_move(x, y).ok())
            .collect()
    }

    pub fn rows(&self) -> Vec<Vec<Option<Move>>> {
        self.data.rows().into_iter().map(|row| row.to_vec()).collect()
    }

    /// Checks a requested cell without touching the grid for out-of-range input.
    pub fn validate_move(&self, x: i64, y: i64) -> Result<Coordinates, InvalidMove> {
        let in_bounds = |v: i64| usize::try_from(v).ok().filter(|v| *v < Self::SIZE);
        let (Some(x), Some(y)) = (in_bounds(x), in_bounds(y)) else {
            return Err(InvalidMove::OutOfBounds);
        };
        if self.data[(y, x)].is_some() {
            return Err(InvalidMove::OccupiedCell);
        }
        Ok((x, y))
    }

    pub fn render_move(&mut self, m: Move) {
        match self.data.get_mut((m.y, m.x)) {
            Some(cell) => {
                *cell = Some(m.clone());
                self.moves.push(m);
            }
            None => warn!("Ignoring stored move {} outside the board at {:?}", m.id, m.coordinates()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Player;
    use uuid::Uuid;

    fn all_cells() -> Vec<Coordinates> {
        (0..Board::SIZE)
            .cartesian_product(0..Board::SIZE)
            .map(|(y, x)| (x, y))
            .collect()
    }

    fn alternating_moves(game_id: Uuid, cells: &[Coordinates]) -> Vec<Move> {
        cells
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                let player = if index % 2 == 0 {
                    Player::First
                } else {
                    Player::Second
                };
                Move::new(game_id, *cell, player)
            })
            .collect()
    }

    #[test]
    fn materialize_counts_cells() {
        let game_id = Uuid::new_v4();
        let cells = all_cells();
        for k in 0..Board::SIZE * Board::SIZE {
            let mut moves = alternating_moves(game_id, &cells[..k]);
            moves.reverse();
            let board = Board::materialize(&moves);
            assert_eq!(board.occupied_count(), k, "k = {}", k);
            assert_eq!(
                board.available_cells().len(),
                Board::SIZE * Board::SIZE - k,
                "k = {}",
                k
            );
        }
    }

    #[test]
    fn materialize_is_order_independent() {
        let game_id = Uuid::new_v4();
        let moves = alternating_moves(game_id, &[(0, 0), (2, 1), (1, 2), (2, 2)]);
        let mut reversed = moves.clone();
        reversed.reverse();

        assert_eq!(
            Board::materialize(&moves).data,
            Board::materialize(&reversed).data
        );
    }

    #[test]
    fn materialize_indexes_by_row_then_column() {
        let game_id = Uuid::new_v4();
        let m = Move::new(game_id, (2, 0), Player::First);
        let board = Board::materialize([&m]);

        assert_eq!(board.data[(0, 2)], Some(m.clone()));
        assert_eq!(board.get(2, 0), Some(&m));
        assert_eq!(board.get(0, 2), None);
    }

    #[test]
    fn materialize_later_move_wins_a_shared_cell() {
        let game_id = Uuid::new_v4();
        let earlier = Move::new(game_id, (1, 1), Player::First);
        let later = Move::new(game_id, (1, 1), Player::Second);
        let board = Board::materialize([&earlier, &later]);

        assert_eq!(board.get(1, 1), Some(&later));
        assert_eq!(board.occupied_count(), 1);
    }

    #[test]
    fn validate_move() {
        let game_id = Uuid::new_v4();
        let board = Board::materialize(&[Move::new(game_id, (0, 0), Player::First)]);

        let tests = vec![
            ((3, 0), Err(InvalidMove::OutOfBounds)),
            ((0, 3), Err(InvalidMove::OutOfBounds)),
            ((-1, 1), Err(InvalidMove::OutOfBounds)),
            ((1, -1), Err(InvalidMove::OutOfBounds)),
            ((i64::MAX, 0), Err(InvalidMove::OutOfBounds)),
            ((0, 0), Err(InvalidMove::OccupiedCell)),
            ((1, 0), Ok((1, 0))),
            ((2, 2), Ok((2, 2))),
        ];

        for ((x, y), expected) in tests {
            assert_eq!(
                board.validate_move(x, y),
                expected,
                "Test failed for ({}, {})",
                x,
                y
            );
        }
    }

    #[test]
    fn validate_move_full_board_rejects_everything_in_bounds() {
        let game_id = Uuid::new_v4();
        let board = Board::materialize(&alternating_moves(game_id, &all_cells()));

        for (x, y) in all_cells() {
            assert_eq!(
                board.validate_move(x as i64, y as i64),
                Err(InvalidMove::OccupiedCell)
            );
        }
        assert!(board.available_cells().is_empty());
    }

    #[test]
    fn available_cells_are_the_valid_moves() {
        let game_id = Uuid::new_v4();
        let moves = alternating_moves(game_id, &[(1, 1), (0, 2), (2, 0)]);
        let board = Board::materialize(&moves);

        let available = board.available_cells();
        assert_eq!(available.len(), 6);
        for (x, y) in all_cells() {
            let valid = board.validate_move(x as i64, y as i64);
            assert_eq!(available.contains(&(x, y)), valid.is_ok(), "({}, {})", x, y);
        }
        assert_eq!(available[0], (0, 0));
        assert!(!available.contains(&(0, 2)));
    }

    #[test]
    fn stored_move_outside_the_board_is_skipped() {
        let game_id = Uuid::new_v4();
        let stray = Move::new(game_id, (5, 5), Player::First);
        let board = Board::materialize([&stray]);

        assert_eq!(board.occupied_count(), 0);
        assert_eq!(board.move_count(), 0);
    }

    #[test]
    fn rows_follow_the_grid() {
        let game_id = Uuid::new_v4();
        let m = Move::new(game_id, (1, 2), Player::Second);
        let rows = Board::materialize([&m]).rows();

        assert_eq!(rows.len(), Board::SIZE);
        assert_eq!(rows[2][1], Some(m));
        assert!(rows[0].iter().all(Option::is_none));
    }
}
