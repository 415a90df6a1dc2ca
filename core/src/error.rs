use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Mine count must leave at least one cell free")]
    TooManyMines,
    #[error("Board side length must be at least 1")]
    EmptyBoard,
    #[error("Mine mask and placement order disagree")]
    LayoutMismatch,
}

pub type Result<T> = core::result::Result<T, GameError>;
