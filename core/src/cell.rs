use serde::{Deserialize, Serialize};

/// State of a single grid cell.
///
/// `adjacent` is only meaningful for non-mine cells; mine cells keep 0 by
/// convention and nothing downstream reads it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_mine: bool,
    pub is_revealed: bool,
    pub is_flagged: bool,
    pub adjacent: u8,
}

impl Cell {
    pub const fn is_hidden(self) -> bool {
        !self.is_revealed
    }

    /// A safe cell still waiting to be revealed, the hint candidate set.
    pub const fn is_hidden_safe(self) -> bool {
        !self.is_revealed && !self.is_mine
    }
}
