use core::num::Saturating;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Coarse game lifecycle stage.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    NotStarted,
    InProgress,
    Won,
    Lost,
}

impl GamePhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// The board-state machine: one instance per round, owned by whatever drives
/// it. All operations are synchronous and run to completion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardEngine {
    layout: MineLayout,
    catalog: MineCatalog,
    win_condition: WinCondition,
    board: Array2<CellState>,
    phase: GamePhase,
    score: Saturating<CellCount>,
    revealed_count: Saturating<CellCount>,
    mines_found: Saturating<CellCount>,
    flagged_count: Saturating<CellCount>,
    triggered_mine: Option<Coord2>,
}

impl BoardEngine {
    /// Builds an engine over a freshly generated layout.
    pub fn new<G: LayoutGenerator>(
        config: GameConfig,
        catalog: MineCatalog,
        generator: G,
    ) -> Result<Self> {
        let config = config.validated()?;
        let layout = generator.generate(&config);
        Self::with_layout(layout, catalog, config.win_condition)
    }

    /// Builds an engine over a pre-built layout; tests pin exact mine
    /// positions through this.
    pub fn with_layout(
        layout: MineLayout,
        catalog: MineCatalog,
        win_condition: WinCondition,
    ) -> Result<Self> {
        if !layout.is_coherent() {
            return Err(GameError::LayoutMismatch);
        }
        if layout.mine_count() >= layout.total_cells() {
            return Err(GameError::TooManyMines);
        }
        if usize::from(layout.mine_count()) > catalog.len() && layout.mine_count() > 0 {
            log::warn!(
                "catalog has {} kinds for {} mines, kind pairing will wrap",
                catalog.len(),
                layout.mine_count()
            );
        }

        let side = usize::from(layout.size());
        Ok(Self {
            board: Array2::default([side, side]),
            layout,
            catalog,
            win_condition,
            phase: GamePhase::default(),
            score: Saturating(0),
            revealed_count: Saturating(0),
            mines_found: Saturating(0),
            flagged_count: Saturating(0),
            triggered_mine: None,
        })
    }

    /// Rebuilds the board for a new round: fresh layout, every cell hidden
    /// and unflagged, counters zeroed. Rejects an invalid size/mine
    /// combination without touching the current round.
    pub fn reset<G: LayoutGenerator>(&mut self, config: GameConfig, generator: G) -> Result<()> {
        let config = config.validated()?;

        self.layout = generator.generate(&config);
        let side = usize::from(config.size);
        self.board = Array2::default([side, side]);
        self.win_condition = config.win_condition;
        self.phase = GamePhase::NotStarted;
        self.score = Saturating(0);
        self.revealed_count = Saturating(0);
        self.mines_found = Saturating(0);
        self.flagged_count = Saturating(0);
        self.triggered_mine = None;
        Ok(())
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn size(&self) -> Coord {
        self.layout.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.layout.mine_count()
    }

    /// Count of successfully revealed non-mine cells; drops back to zero
    /// when a mine ends the round.
    pub fn score(&self) -> CellCount {
        self.score.0
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count.0
    }

    pub fn mines_left(&self) -> i32 {
        i32::from(self.layout.mine_count()) - i32::from(self.flagged_count.0)
    }

    pub fn win_condition(&self) -> WinCondition {
        self.win_condition
    }

    pub fn catalog(&self) -> &MineCatalog {
        &self.catalog
    }

    pub fn cell_at(&self, coords: Coord2) -> CellState {
        self.board[coords.to_nd_index()]
    }

    pub fn has_mine_at(&self, coords: Coord2) -> bool {
        self.layout.contains_mine(coords)
    }

    /// Kind id of the mine at `coords`, if one is there.
    pub fn kind_at(&self, coords: Coord2) -> Option<KindId> {
        self.layout.kind_at(coords)
    }

    /// Catalog entry backing a kind id.
    pub fn kind_details(&self, id: KindId) -> Option<&MineKind> {
        self.catalog.get(id)
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn triggered_kind(&self) -> Option<KindId> {
        self.triggered_mine
            .and_then(|coords| self.layout.kind_at(coords))
    }

    /// Uncovers a cell and applies its game-state effect. Calls on a
    /// finished round, a flagged cell, or an already revealed cell are
    /// ignored and do not start the game.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.layout.validate_coords(coords)?;

        if self.phase.is_terminal() || !matches!(self.cell_at(coords), CellState::Hidden) {
            return Ok(RevealOutcome::Ignored);
        }

        self.mark_started();

        if self.layout.contains_mine(coords) {
            Ok(self.explode(coords))
        } else {
            Ok(self.reveal_safe(coords))
        }
    }

    /// Flips the flag on an unrevealed cell. No-op on a revealed cell or
    /// once the round is over.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use CellState::*;
        use MarkOutcome::*;

        let coords = self.layout.validate_coords(coords)?;

        if self.phase.is_terminal() {
            return Ok(NoChange);
        }

        Ok(match self.board[coords.to_nd_index()] {
            Hidden => {
                self.board[coords.to_nd_index()] = Flagged;
                self.flagged_count += 1;
                Changed
            }
            Flagged => {
                self.board[coords.to_nd_index()] = Hidden;
                self.flagged_count -= 1;
                Changed
            }
            Revealed => NoChange,
        })
    }

    fn explode(&mut self, coords: Coord2) -> RevealOutcome {
        self.triggered_mine = Some(coords);
        let mut kind: KindId = 0;

        // Game over shows the whole board: every mine flips open, not just
        // the one that was clicked.
        for (slot, mine) in self.layout.placements() {
            if mine == coords {
                kind = slot;
            }
            if !self.board[mine.to_nd_index()].is_revealed() {
                self.board[mine.to_nd_index()] = CellState::Revealed;
                self.mines_found += 1;
            }
        }

        self.score = Saturating(0);
        self.phase = GamePhase::Lost;
        RevealOutcome::HitMine(kind)
    }

    fn reveal_safe(&mut self, coords: Coord2) -> RevealOutcome {
        self.board[coords.to_nd_index()] = CellState::Revealed;
        self.score += 1;
        self.revealed_count += 1;

        if self.win_reached() {
            self.phase = GamePhase::Won;
            self.triggered_mine = None;
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    fn win_reached(&self) -> bool {
        match self.win_condition {
            WinCondition::AllSafeRevealed => {
                self.revealed_count == Saturating(self.layout.safe_cell_count())
            }
            // Only evaluated after a safe reveal, while mine reveals end the
            // round immediately, so this cannot hold while mines remain.
            WinCondition::AllMinesRevealed => {
                self.layout.mine_count() > 0
                    && self.mines_found == Saturating(self.layout.mine_count())
            }
        }
    }

    fn mark_started(&mut self) {
        if matches!(self.phase, GamePhase::NotStarted) {
            self.phase = GamePhase::InProgress;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn layout(size: Coord, mines: &[Coord2]) -> MineLayout {
        MineLayout::from_mine_coords(size, mines).unwrap()
    }

    fn catalog(len: usize) -> MineCatalog {
        use alloc::format;
        MineCatalog::new(
            (0..len)
                .map(|n| MineKind::new(format!("Kind {n}"), format!("color-{n}"), format!("vid-{n}")))
                .collect(),
        )
    }

    fn engine(size: Coord, mines: &[Coord2]) -> BoardEngine {
        BoardEngine::with_layout(
            layout(size, mines),
            catalog(mines.len().max(1)),
            WinCondition::AllSafeRevealed,
        )
        .unwrap()
    }

    fn safe_cells(engine: &BoardEngine) -> Vec<Coord2> {
        let size = engine.size();
        (0..size)
            .flat_map(|row| (0..size).map(move |col| (row, col)))
            .filter(|&coords| !engine.has_mine_at(coords))
            .collect()
    }

    #[test]
    fn fresh_engine_starts_clean() {
        let engine = engine(5, &[(2, 2)]);

        assert_eq!(engine.phase(), GamePhase::NotStarted);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.revealed_count(), 0);
        assert_eq!(engine.total_mines(), 1);
        for row in 0..5 {
            for col in 0..5 {
                assert_eq!(engine.cell_at((row, col)), CellState::Hidden);
            }
        }
    }

    #[test]
    fn first_reveal_starts_the_round() {
        let mut engine = engine(5, &[(2, 2)]);

        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::Revealed);
        assert_eq!(engine.phase(), GamePhase::InProgress);
        assert_eq!(engine.score(), 1);
        assert_eq!(engine.revealed_count(), 1);
    }

    #[test]
    fn revealing_the_same_cell_twice_is_ignored() {
        let mut engine = engine(5, &[(2, 2)]);

        engine.reveal((0, 0)).unwrap();
        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::Ignored);
        assert_eq!(engine.score(), 1);
        assert_eq!(engine.revealed_count(), 1);
    }

    #[test]
    fn ignored_reveal_does_not_start_the_round() {
        let mut engine = engine(5, &[(2, 2)]);

        engine.toggle_flag((0, 0)).unwrap();
        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::Ignored);
        assert_eq!(engine.phase(), GamePhase::NotStarted);
    }

    #[test]
    fn hitting_a_mine_loses_and_opens_every_mine() {
        let mines = [(0, 0), (3, 4), (4, 4)];
        let mut engine = engine(5, &mines);

        engine.reveal((1, 1)).unwrap();
        engine.reveal((2, 2)).unwrap();
        assert_eq!(engine.score(), 2);

        assert_eq!(engine.reveal((3, 4)).unwrap(), RevealOutcome::HitMine(1));
        assert_eq!(engine.phase(), GamePhase::Lost);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.triggered_mine(), Some((3, 4)));
        assert_eq!(engine.triggered_kind(), Some(1));
        for coords in mines {
            assert_eq!(engine.cell_at(coords), CellState::Revealed);
        }
    }

    #[test]
    fn reveal_after_the_round_ends_is_ignored() {
        let mut engine = engine(5, &[(2, 2)]);

        engine.reveal((2, 2)).unwrap();
        assert_eq!(engine.phase(), GamePhase::Lost);
        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::Ignored);
        assert_eq!(engine.cell_at((0, 0)), CellState::Hidden);
    }

    #[test]
    fn revealing_all_safe_cells_wins_exactly_once() {
        let mut engine = engine(4, &[(0, 0), (1, 2)]);
        let safe = safe_cells(&engine);

        let mut wins = 0;
        for (i, &coords) in safe.iter().enumerate() {
            match engine.reveal(coords).unwrap() {
                RevealOutcome::Won => {
                    wins += 1;
                    assert_eq!(i, safe.len() - 1);
                }
                RevealOutcome::Revealed => {}
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(engine.phase(), GamePhase::Won);
        assert_eq!(engine.score(), safe.len() as CellCount);
        assert_eq!(engine.triggered_mine(), None);
    }

    #[test]
    fn win_order_does_not_matter() {
        let mut engine = engine(3, &[(1, 1)]);
        let mut safe = safe_cells(&engine);
        safe.reverse();

        let (last, rest) = safe.split_last().unwrap();
        for &coords in rest {
            assert_eq!(engine.reveal(coords).unwrap(), RevealOutcome::Revealed);
        }
        assert_eq!(engine.reveal(*last).unwrap(), RevealOutcome::Won);
    }

    #[test]
    fn flag_toggles_and_blocks_reveal() {
        let mut engine = engine(5, &[(2, 2)]);

        assert_eq!(engine.toggle_flag((1, 1)).unwrap(), MarkOutcome::Changed);
        assert_eq!(engine.cell_at((1, 1)), CellState::Flagged);
        assert_eq!(engine.mines_left(), 0);

        assert_eq!(engine.reveal((1, 1)).unwrap(), RevealOutcome::Ignored);

        assert_eq!(engine.toggle_flag((1, 1)).unwrap(), MarkOutcome::Changed);
        assert_eq!(engine.cell_at((1, 1)), CellState::Hidden);
        assert_eq!(engine.mines_left(), 1);
    }

    #[test]
    fn flagging_a_revealed_cell_is_a_no_op() {
        let mut engine = engine(5, &[(2, 2)]);

        engine.reveal((0, 0)).unwrap();
        assert_eq!(engine.toggle_flag((0, 0)).unwrap(), MarkOutcome::NoChange);
        assert_eq!(engine.cell_at((0, 0)), CellState::Revealed);
    }

    #[test]
    fn flagging_after_the_round_ends_is_a_no_op() {
        let mut engine = engine(5, &[(2, 2)]);

        engine.reveal((2, 2)).unwrap();
        assert_eq!(engine.toggle_flag((0, 0)).unwrap(), MarkOutcome::NoChange);
        assert_eq!(engine.cell_at((0, 0)), CellState::Hidden);
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let mut engine = engine(5, &[(2, 2)]);

        assert_eq!(engine.reveal((5, 0)), Err(GameError::InvalidCoords));
        assert_eq!(engine.toggle_flag((0, 5)), Err(GameError::InvalidCoords));
        assert_eq!(engine.phase(), GamePhase::NotStarted);
    }

    #[test]
    fn scenario_single_mine_at_center() {
        let mut engine = engine(5, &[(2, 2)]);

        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::Revealed);
        assert_eq!(engine.score(), 1);

        assert_eq!(engine.reveal((2, 2)).unwrap(), RevealOutcome::HitMine(0));
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.cell_at((2, 2)), CellState::Revealed);
        assert_eq!(engine.phase(), GamePhase::Lost);
    }

    #[test]
    fn scenario_all_but_one_cell_mined_wins_on_first_reveal() {
        let mines: Vec<Coord2> = (0..5)
            .flat_map(|row| (0..5).map(move |col| (row, col)))
            .filter(|&coords| coords != (4, 4))
            .collect();
        let mut engine = engine(5, &mines);

        assert_eq!(engine.total_mines(), 24);
        assert_eq!(engine.reveal((4, 4)).unwrap(), RevealOutcome::Won);
        assert_eq!(engine.revealed_count(), 1);
        assert_eq!(engine.phase(), GamePhase::Won);
    }

    #[test]
    fn dense_win_check_cannot_fire_while_mines_remain() {
        let mut engine = BoardEngine::with_layout(
            layout(3, &[(0, 0), (2, 2)]),
            catalog(2),
            WinCondition::AllMinesRevealed,
        )
        .unwrap();

        // Revealing every safe cell does not win under the legacy check.
        for coords in safe_cells(&engine) {
            assert_eq!(engine.reveal(coords).unwrap(), RevealOutcome::Revealed);
        }
        assert_eq!(engine.phase(), GamePhase::InProgress);

        // And touching a mine loses before the check can ever hold.
        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::HitMine(0));
        assert_eq!(engine.phase(), GamePhase::Lost);
    }

    #[test]
    fn reset_starts_a_fresh_round() {
        let mut engine = engine(5, &[(2, 2)]);
        engine.reveal((0, 0)).unwrap();
        engine.reveal((2, 2)).unwrap();

        engine
            .reset(
                GameConfig::new(5, 11).unwrap(),
                RandomLayoutGenerator::new(9),
            )
            .unwrap();

        assert_eq!(engine.phase(), GamePhase::NotStarted);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.revealed_count(), 0);
        assert_eq!(engine.total_mines(), 11);
        assert_eq!(engine.triggered_mine(), None);
        for row in 0..5 {
            for col in 0..5 {
                assert_eq!(engine.cell_at((row, col)), CellState::Hidden);
            }
        }
    }

    #[test]
    fn reset_rejects_bad_config_without_touching_state() {
        let mut engine = engine(5, &[(2, 2)]);
        engine.reveal((0, 0)).unwrap();

        let bad = GameConfig {
            size: 5,
            mines: 25,
            win_condition: WinCondition::AllSafeRevealed,
        };
        assert_eq!(
            engine.reset(bad, RandomLayoutGenerator::new(9)),
            Err(GameError::TooManyMines)
        );

        assert_eq!(engine.phase(), GamePhase::InProgress);
        assert_eq!(engine.score(), 1);
        assert_eq!(engine.total_mines(), 1);
    }

    #[test]
    fn kind_pairing_wraps_when_catalog_is_short() {
        let mines = [(0, 0), (0, 1), (0, 2)];
        let engine = BoardEngine::with_layout(
            layout(5, &mines),
            catalog(2),
            WinCondition::AllSafeRevealed,
        )
        .unwrap();

        let third = engine.kind_at((0, 2)).unwrap();
        assert_eq!(third, 2);
        assert_eq!(
            engine.kind_details(third).map(|kind| kind.label.as_str()),
            Some("Kind 0")
        );
    }

    #[test]
    fn tampered_layout_is_rejected() {
        let mut encoded = serde_json::to_value(layout(3, &[(0, 0)])).unwrap();
        encoded["placements"] = serde_json::json!([[0, 0], [2, 2]]);
        let tampered: MineLayout = serde_json::from_value(encoded).unwrap();

        assert_eq!(
            BoardEngine::with_layout(tampered, catalog(1), WinCondition::AllSafeRevealed),
            Err(GameError::LayoutMismatch)
        );
    }

    #[test]
    fn engine_state_survives_serialization() {
        let mut engine = engine(5, &[(2, 2), (0, 4)]);
        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((2, 2)).unwrap();

        let encoded = serde_json::to_string(&engine).unwrap();
        let restored: BoardEngine = serde_json::from_str(&encoded).unwrap();

        assert_eq!(restored, engine);
    }
}
