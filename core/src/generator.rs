use alloc::vec::Vec;
use ndarray::Array2;

use crate::*;

/// Builds the mine layout for a fresh round.
pub trait LayoutGenerator {
    fn generate(self, config: &GameConfig) -> MineLayout;
}

/// Seeded uniform placement: samples `mines` distinct cells over the
/// flattened board, so generation cost stays bounded even when the board is
/// almost full (rejection sampling is not).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomLayoutGenerator {
    seed: u64,
}

impl RandomLayoutGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl LayoutGenerator for RandomLayoutGenerator {
    fn generate(self, config: &GameConfig) -> MineLayout {
        use rand::prelude::*;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let total = usize::from(config.size) * usize::from(config.size);
        let requested = usize::from(config.mines).min(total);
        if requested < usize::from(config.mines) {
            log::warn!(
                "requested {} mines but the board only fits {}",
                config.mines,
                total
            );
        }

        let mut mine_mask: Array2<bool> =
            Array2::default([config.size.into(), config.size.into()]);
        let mut placements = Vec::with_capacity(requested);

        for index in rand::seq::index::sample(&mut rng, total, requested) {
            let coords = from_flat_index(index, config.size);
            mine_mask[coords.to_nd_index()] = true;
            placements.push(coords);
        }

        log::debug!(
            "placed {} mines on a {size}x{size} board, seed {seed}",
            placements.len(),
            size = config.size,
            seed = self.seed
        );
        MineLayout::from_parts(mine_mask, placements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(seed: u64, size: Coord, mines: CellCount) -> MineLayout {
        RandomLayoutGenerator::new(seed).generate(&GameConfig::new(size, mines).unwrap())
    }

    #[test]
    fn places_exactly_the_requested_number_of_mines() {
        for mines in [0, 1, 11, 24] {
            let layout = generate(7, 5, mines);

            assert_eq!(layout.mine_count(), mines);
            let masked = (0..5)
                .flat_map(|row| (0..5).map(move |col| (row, col)))
                .filter(|&coords| layout.contains_mine(coords))
                .count();
            assert_eq!(masked, usize::from(mines));
        }
    }

    #[test]
    fn same_seed_reproduces_the_layout() {
        let a = generate(42, 5, 11);
        let b = generate(42, 5, 11);

        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_vary_the_layout() {
        let layouts: Vec<_> = (0..16).map(|seed| generate(seed, 5, 11)).collect();

        assert!(layouts.windows(2).any(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn kind_ids_follow_placement_order() {
        let layout = generate(3, 5, 11);

        for (expected, (slot, coords)) in layout.placements().enumerate() {
            assert_eq!(usize::from(slot), expected);
            assert_eq!(layout.kind_at(coords), Some(slot));
        }
    }
}
