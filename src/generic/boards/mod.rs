mod board;
mod matrix_checker;

pub use board::{Board, InvalidMove};
pub use matrix_checker::evaluate;
