use crate::{Board, GameStatus, Move};
use ndarray::{s, ArrayView1};

/// Derives the status that follows `last_move`.
///
/// Only the lines through the last move are inspected: its row, its column,
/// and a diagonal only when the move actually lies on it. `total_move_count`
/// must already include `last_move`.
///
/// ```
/// use tictactoe_server::{evaluate, Board, GameStatus, Move, Player};
/// use uuid::Uuid;
///
/// let game = Uuid::new_v4();
/// let moves = vec![
///     Move::new(game, (0, 0), Player::First),
///     Move::new(game, (0, 1), Player::Second),
///     Move::new(game, (1, 0), Player::First),
///     Move::new(game, (1, 1), Player::Second),
///     Move::new(game, (2, 0), Player::First),
/// ];
/// let board = Board::materialize(&moves);
///
/// assert_eq!(
///     evaluate(&board, &moves[4], moves.len(), GameStatus::FirstToMove),
///     GameStatus::FirstWins
/// );
/// ```
pub fn evaluate(
    board: &Board,
    last_move: &Move,
    total_move_count: usize,
    current: GameStatus,
) -> GameStatus {
    let (x, y) = last_move.coordinates();
    let matrix = &board.data;
    let last_index = Board::SIZE - 1;
    // reversing the rows turns the anti-diagonal into the main diagonal
    let reversed = matrix.slice(s![..;-1, ..]);

    let mut lines: Vec<ArrayView1<Option<Move>>> = Vec::new();
    if x <= last_index && y <= last_index {
        lines.push(matrix.row(y));
        lines.push(matrix.column(x));
        if x == y {
            lines.push(matrix.diag());
        }
        if x + y == last_index {
            lines.push(reversed.diag());
        }
    }

    if lines.into_iter().any(is_completed) {
        return GameStatus::won_by(last_move.player);
    }
    if total_move_count >= Board::SIZE * Board::SIZE {
        return GameStatus::Draw;
    }
    match current {
        GameStatus::FirstToMove => GameStatus::SecondToMove,
        _ => GameStatus::FirstToMove,
    }
}

/// A line is completed when every cell is taken by the same player.
fn is_completed(line: ArrayView1<Option<Move>>) -> bool {
    let Some(Some(owner)) = line.get(0) else {
        return false;
    };
    line.iter()
        .all(|cell| cell.as_ref().is_some_and(|m| m.same_owner(owner)))
}
