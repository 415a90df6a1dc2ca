#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use catalog::*;
pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use types::*;

mod catalog;
mod cell;
mod engine;
mod error;
mod generator;
mod types;

/// Which tally ends the round with a win.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum WinCondition {
    /// Win once every non-mine cell is revealed. The only reachable
    /// condition, and the default.
    #[default]
    AllSafeRevealed,
    /// Legacy check carried over from the dense board variant: win once the
    /// count of mines ever revealed equals the mine count. Revealing a mine
    /// loses the round in the same call, so for any positive mine count this
    /// cannot fire; it exists behind this flag for migration parity only.
    AllMinesRevealed,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord,
    pub mines: CellCount,
    pub win_condition: WinCondition,
}

impl Default for GameConfig {
    /// The classic five-by-five board with a single mine.
    fn default() -> Self {
        Self {
            size: 5,
            mines: 1,
            win_condition: WinCondition::default(),
        }
    }
}

impl GameConfig {
    /// Validates the size/mine combination instead of clamping it: a bad
    /// combination is a configuration error the caller must see.
    pub fn new(size: Coord, mines: CellCount) -> Result<Self> {
        Self {
            size,
            mines,
            win_condition: WinCondition::default(),
        }
        .validated()
    }

    pub fn with_win_condition(mut self, win_condition: WinCondition) -> Self {
        self.win_condition = win_condition;
        self
    }

    pub fn validated(self) -> Result<Self> {
        if self.size == 0 {
            return Err(GameError::EmptyBoard);
        }
        if self.mines >= self.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(self)
    }

    pub const fn total_cells(&self) -> CellCount {
        square(self.size)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }
}

/// Mine placement for one round: the mask of mined cells plus the order in
/// which they were placed, which pairs each mine with a catalog kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    placements: Vec<Coord2>,
}

impl MineLayout {
    /// Builds a layout with mines at exactly the given coordinates, in the
    /// given placement order. Duplicate coordinates collapse to one mine.
    pub fn from_mine_coords(size: Coord, mine_coords: &[Coord2]) -> Result<Self> {
        if size == 0 {
            return Err(GameError::EmptyBoard);
        }

        let mut mine_mask: Array2<bool> = Array2::default([size.into(), size.into()]);
        let mut placements = Vec::with_capacity(mine_coords.len());
        for &coords in mine_coords {
            if coords.0 >= size || coords.1 >= size {
                return Err(GameError::InvalidCoords);
            }
            if !mine_mask[coords.to_nd_index()] {
                mine_mask[coords.to_nd_index()] = true;
                placements.push(coords);
            }
        }

        let layout = Self {
            mine_mask,
            placements,
        };
        if layout.mine_count() >= layout.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(layout)
    }

    pub(crate) fn from_parts(mine_mask: Array2<bool>, placements: Vec<Coord2>) -> Self {
        Self {
            mine_mask,
            placements,
        }
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size && coords.1 < size {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coord {
        self.mine_mask.dim().0.try_into().unwrap_or(Coord::MAX)
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len().try_into().unwrap_or(CellCount::MAX)
    }

    pub fn mine_count(&self) -> CellCount {
        self.placements.len() as CellCount
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count()
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self.mine_mask[coords.to_nd_index()]
    }

    /// A layout is coherent when its placement list and mine mask agree;
    /// layouts built here always are, but one restored from serialized state
    /// may not be.
    pub fn is_coherent(&self) -> bool {
        let masked = self.mine_mask.iter().filter(|&&mine| mine).count();
        masked == self.placements.len()
            && self.placements.iter().all(|&coords| {
                self.validate_coords(coords)
                    .map(|coords| self.mine_mask[coords.to_nd_index()])
                    .unwrap_or(false)
            })
    }

    /// Mines in placement order, paired with their kind ids.
    pub fn placements(&self) -> impl Iterator<Item = (KindId, Coord2)> + '_ {
        self.placements
            .iter()
            .enumerate()
            .map(|(slot, &coords)| (slot as KindId, coords))
    }

    /// Kind id of the mine at `coords`, if one is there.
    pub fn kind_at(&self, coords: Coord2) -> Option<KindId> {
        self.placements()
            .find(|&(_, mine)| mine == coords)
            .map(|(slot, _)| slot)
    }
}

/// Result of a flag toggle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Result of a reveal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    /// The reveal had no effect: terminal phase, or the cell was already
    /// revealed or flagged.
    Ignored,
    /// A safe cell was revealed and the round continues.
    Revealed,
    /// A mine was revealed and the round is lost. Carries the kind id of the
    /// triggering mine.
    HitMine(KindId),
    /// The reveal completed the win condition.
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Ignored)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::HitMine(_) | Self::Won)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_full_board_and_zero_size() {
        assert_eq!(GameConfig::new(5, 25), Err(GameError::TooManyMines));
        assert_eq!(GameConfig::new(0, 0), Err(GameError::EmptyBoard));
    }

    #[test]
    fn default_config_is_the_classic_board() {
        let config = GameConfig::default().validated().unwrap();

        assert_eq!(config.size, 5);
        assert_eq!(config.mines, 1);
    }

    #[test]
    fn config_accepts_all_but_one_cell_mined() {
        let config = GameConfig::new(5, 24).unwrap();

        assert_eq!(config.total_cells(), 25);
        assert_eq!(config.safe_cells(), 1);
        assert_eq!(config.win_condition, WinCondition::AllSafeRevealed);
    }

    #[test]
    fn layout_records_placement_order() {
        let layout = MineLayout::from_mine_coords(3, &[(2, 0), (0, 1)]).unwrap();

        assert_eq!(layout.mine_count(), 2);
        assert_eq!(layout.kind_at((2, 0)), Some(0));
        assert_eq!(layout.kind_at((0, 1)), Some(1));
        assert_eq!(layout.kind_at((1, 1)), None);
    }

    #[test]
    fn layout_rejects_out_of_range_mines() {
        assert_eq!(
            MineLayout::from_mine_coords(3, &[(3, 0)]),
            Err(GameError::InvalidCoords)
        );
    }
}
