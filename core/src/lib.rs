use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use error::*;
pub use types::*;

mod board;
mod cell;
mod error;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub cols: Coord,
    pub rows: Coord,
    pub mines: CellCount,
}

impl GameConfig {
    pub(crate) const fn new_unchecked(cols: Coord, rows: Coord, mines: CellCount) -> Self {
        Self { cols, rows, mines }
    }

    /// Clamps the shape to at least 1x1 and the mine count to the grid size.
    /// A mine count of zero is legal and produces a board won by the first
    /// reveal.
    pub fn new(cols: Coord, rows: Coord, mines: CellCount) -> Self {
        let cols = cols.clamp(1, Coord::MAX);
        let rows = rows.clamp(1, Coord::MAX);
        let mines = mines.min(mult(cols, rows));
        Self::new_unchecked(cols, rows, mines)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.cols, self.rows)
    }
}

/// The three fixed presets offered by the frontend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    pub const fn config(self) -> GameConfig {
        match self {
            Self::Beginner => GameConfig::new_unchecked(10, 8, 10),
            Self::Intermediate => GameConfig::new_unchecked(18, 14, 40),
            Self::Advanced => GameConfig::new_unchecked(24, 20, 99),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" | "beg" => Ok(Self::Beginner),
            "intermediate" | "int" => Ok(Self::Intermediate),
            "advanced" | "adv" => Ok(Self::Advanced),
            _ => Err(GameError::UnknownDifficulty(s.to_owned())),
        }
    }
}
