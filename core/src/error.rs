use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Unknown difficulty `{0}`, expected beginner, intermediate, or advanced")]
    UnknownDifficulty(String),
}

pub type Result<T> = core::result::Result<T, GameError>;
