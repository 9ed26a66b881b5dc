use core::iter::once;
use core::ops::BitOr;
use std::collections::VecDeque;

use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;

use crate::{
    Cell, CellCount, Coord, Coord2, GameConfig, GameError, NeighborIter, NeighborIterExt, Result,
    ToGridIndex,
};

/// Outcome of flagging a cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

/// Outcome of revealing a cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}

/// Used to merge outcomes when chording over several neighbors
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            // a detonation dominates
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            // then win
            (Won, _) => Won,
            (_, Won) => Won,
            // then any reveal
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Minesweeper board state and rules.
///
/// Mine placement is deferred until the first `reveal` call, which seeds the
/// forbidden set so the first click is always safe. Once either `game_over`
/// or `win` is set the board is frozen; a new game replaces the Board
/// wholesale.
#[derive(Clone, Debug)]
pub struct Board {
    config: GameConfig,
    cells: Array2<Cell>,
    mines_placed: bool,
    mine_count: CellCount,
    revealed_count: CellCount,
    game_over: bool,
    win: bool,
    rng: SmallRng,
}

impl Board {
    /// Fresh board seeded from OS entropy.
    pub fn new(config: GameConfig) -> Self {
        Self::from_rng(config, SmallRng::from_os_rng())
    }

    /// Fresh board with a reproducible mine layout and hint sequence.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::from_rng(config, SmallRng::seed_from_u64(seed))
    }

    fn from_rng(config: GameConfig, rng: SmallRng) -> Self {
        let shape = (usize::from(config.rows), usize::from(config.cols));
        Self {
            config,
            cells: Array2::default(shape),
            mines_placed: false,
            mine_count: 0,
            revealed_count: 0,
            game_over: false,
            win: false,
            rng,
        }
    }

    /// Board with an explicit mine layout, placement already done. The first
    /// reveal gets no safe-seed guarantee. Mainly useful for tests and
    /// scripted scenarios.
    pub fn with_mines(cols: Coord, rows: Coord, mines: &[Coord2]) -> Result<Self> {
        let config = GameConfig::new(cols, rows, 0);
        let mut board = Self::with_seed(config, 0);

        for &coords in mines {
            if !board.is_inbounds(coords.0, coords.1) {
                return Err(GameError::InvalidCoords);
            }
            board.cells[coords.to_grid_index()].is_mine = true;
        }

        // duplicates in `mines` collapse, so count what actually landed
        board.mine_count = board
            .cells
            .iter()
            .filter(|cell| cell.is_mine)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX);
        board.config.mines = board.mine_count;
        board.compute_adjacency();
        board.mines_placed = true;
        Ok(board)
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub const fn cols(&self) -> Coord {
        self.config.cols
    }

    pub const fn rows(&self) -> Coord {
        self.config.rows
    }

    /// Requested mine count; placement may have degraded below this on tiny
    /// boards.
    pub const fn num_mines(&self) -> CellCount {
        self.config.mines
    }

    pub const fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub const fn game_over(&self) -> bool {
        self.game_over
    }

    pub const fn win(&self) -> bool {
        self.win
    }

    /// Whether the board is frozen: the game was lost or won.
    pub const fn is_finished(&self) -> bool {
        self.game_over || self.win
    }

    /// Row-major flat index, no bounds check.
    pub fn index(&self, col: Coord, row: Coord) -> usize {
        usize::from(row) * usize::from(self.config.cols) + usize::from(col)
    }

    pub const fn is_inbounds(&self, col: Coord, row: Coord) -> bool {
        col < self.config.cols && row < self.config.rows
    }

    /// The up-to-8 in-bounds neighbors in fixed compass order.
    pub fn neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }

    pub fn cell(&self, coords: Coord2) -> Option<Cell> {
        self.is_inbounds(coords.0, coords.1)
            .then(|| self.cells[coords.to_grid_index()])
    }

    /// How many mines have not been flagged yet; negative when over-flagged.
    /// Display clamping is the frontend's job.
    pub fn mines_left(&self) -> isize {
        (self.config.mines as isize) - (self.flagged_count() as isize)
    }

    /// Count of flagged cells, a full scan on every call.
    pub fn flagged_count(&self) -> CellCount {
        self.cells
            .iter()
            .filter(|cell| cell.is_flagged)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX)
    }

    /// One uniformly random unrevealed non-mine cell, if any remain. Reads
    /// board state only; advances the RNG but reveals and flags nothing.
    /// Before the first reveal every cell qualifies, since no mines exist yet.
    pub fn get_safe_cell(&mut self) -> Option<Coord2> {
        let candidates: Vec<Coord2> = self
            .iter_coords()
            .filter(|&coords| self.cells[coords.to_grid_index()].is_hidden_safe())
            .collect();
        candidates.choose(&mut self.rng).copied()
    }

    /// Reveal a cell, placing mines first if this is the opening move.
    pub fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        use RevealOutcome::*;

        if !self.is_inbounds(coords.0, coords.1) || self.is_finished() {
            return NoChange;
        }
        if self.cells[coords.to_grid_index()].is_flagged {
            return NoChange;
        }

        if !self.mines_placed {
            self.place_mines(coords);
        }

        if self.cells[coords.to_grid_index()].is_mine {
            self.cells[coords.to_grid_index()].is_revealed = true;
            self.game_over = true;
            log::debug!("mine hit at {:?}", coords);
            self.reveal_all_mines();
            return HitMine;
        }

        let newly_revealed = self.flood_reveal(coords);
        if newly_revealed == 0 {
            return NoChange;
        }

        if self.revealed_count == self.config.total_cells() - self.mine_count {
            self.win = true;
            log::debug!("board cleared, {} cells revealed", self.revealed_count);
            self.complete_safe_cells();
            Won
        } else {
            Revealed
        }
    }

    /// Chorded open: if the flagged-neighbor count of a revealed numbered
    /// cell matches its number, reveal all remaining neighbors. Wrong flags
    /// make this detonate, as in standard play.
    pub fn auto_reveal(&mut self, coords: Coord2) -> RevealOutcome {
        use RevealOutcome::*;

        if !self.is_inbounds(coords.0, coords.1) || self.is_finished() {
            return NoChange;
        }

        let cell = self.cells[coords.to_grid_index()];
        if !cell.is_revealed || cell.adjacent == 0 {
            return NoChange;
        }
        if self.count_flagged_neighbors(coords) != cell.adjacent {
            return NoChange;
        }

        self.neighbors(coords)
            .map(|neighbor_coords| self.reveal(neighbor_coords))
            .reduce(BitOr::bitor)
            .unwrap_or(NoChange)
    }

    /// Flip the flag on a hidden cell.
    pub fn toggle_flag(&mut self, coords: Coord2) -> FlagOutcome {
        use FlagOutcome::*;

        if !self.is_inbounds(coords.0, coords.1) || self.is_finished() {
            return NoChange;
        }

        let cell = &mut self.cells[coords.to_grid_index()];
        if cell.is_revealed {
            return NoChange;
        }
        cell.is_flagged = !cell.is_flagged;
        Changed
    }

    /// One-shot lazy placement triggered by the first reveal. The seed cell
    /// and its in-bounds neighbors never receive a mine; when the remaining
    /// pool is smaller than the request the count degrades instead of
    /// failing.
    fn place_mines(&mut self, safe: Coord2) {
        let forbidden: Vec<Coord2> = once(safe).chain(self.neighbors(safe)).collect();
        let pool: Vec<Coord2> = self
            .iter_coords()
            .filter(|coords| !forbidden.contains(coords))
            .collect();

        let requested = usize::from(self.config.mines);
        let placing = requested.min(pool.len());
        if placing < requested {
            log::warn!(
                "only room for {} of {} requested mines after excluding the safe seed",
                placing,
                requested
            );
        }

        for pick in rand::seq::index::sample(&mut self.rng, pool.len(), placing) {
            self.cells[pool[pick].to_grid_index()].is_mine = true;
        }
        self.mine_count = placing.try_into().unwrap_or(CellCount::MAX);
        self.compute_adjacency();
        self.mines_placed = true;
        log::debug!("placed {} mines, safe seed {:?}", self.mine_count, safe);
    }

    /// Computed once at placement and never again; mine cells keep 0.
    fn compute_adjacency(&mut self) {
        for coords in self.iter_coords().collect::<Vec<_>>() {
            if self.cells[coords.to_grid_index()].is_mine {
                continue;
            }
            let count = self
                .neighbors(coords)
                .filter(|&pos| self.cells[pos.to_grid_index()].is_mine)
                .count()
                .try_into()
                .expect("at most 8 neighbors");
            self.cells[coords.to_grid_index()].adjacent = count;
        }
    }

    /// Iterative flood-fill from a safe seed. Flagged cells act as barriers
    /// and mines are never entered. Returns the number of newly revealed
    /// cells.
    fn flood_reveal(&mut self, seed: Coord2) -> CellCount {
        let mut newly_revealed = 0;
        let mut to_visit = VecDeque::from([seed]);

        while let Some(visit_coords) = to_visit.pop_front() {
            let cell = self.cells[visit_coords.to_grid_index()];
            if cell.is_revealed || cell.is_flagged || cell.is_mine {
                continue;
            }

            self.cells[visit_coords.to_grid_index()].is_revealed = true;
            self.revealed_count += 1;
            newly_revealed += 1;

            if cell.adjacent == 0 {
                to_visit.extend(
                    self.neighbors(visit_coords)
                        .filter(|&pos| self.cells[pos.to_grid_index()].is_hidden_safe()),
                );
            }
        }

        newly_revealed
    }

    /// End-of-game display: show where every mine was.
    fn reveal_all_mines(&mut self) {
        for cell in self.cells.iter_mut() {
            if cell.is_mine {
                cell.is_revealed = true;
            }
        }
    }

    /// Consistency pass after a win. By the win condition there is nothing
    /// left to reveal; `revealed_count` stays untouched.
    fn complete_safe_cells(&mut self) {
        for cell in self.cells.iter_mut() {
            if !cell.is_mine && !cell.is_revealed {
                cell.is_revealed = true;
            }
        }
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.neighbors(coords)
            .filter(|&pos| self.cells[pos.to_grid_index()].is_flagged)
            .count()
            .try_into()
            .expect("at most 8 neighbors")
    }

    fn iter_coords(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (cols, rows) = (self.config.cols, self.config.rows);
        (0..rows).flat_map(move |row| (0..cols).map(move |col| (col, row)))
    }
}
