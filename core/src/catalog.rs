use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::CellCount;

/// Placement slot of a mine: the `n`-th mine placed has kind id `n`.
pub type KindId = CellCount;

/// Cosmetic category paired with a mine: a display label, a color tag for
/// the presentation layer, and the opaque external content id it shows when
/// this mine ends the round. Carries no gameplay weight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineKind {
    pub label: String,
    pub color: String,
    pub content_id: String,
}

impl MineKind {
    pub fn new(
        label: impl Into<String>,
        color: impl Into<String>,
        content_id: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
            content_id: content_id.into(),
        }
    }
}

/// Ordered mine kinds, supplied by the embedder. The mine placed `n`-th is
/// paired with entry `n % len`, so the pairing stays total when a board
/// carries more mines than the catalog has entries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MineCatalog {
    kinds: Vec<MineKind>,
}

impl MineCatalog {
    pub fn new(kinds: Vec<MineKind>) -> Self {
        Self { kinds }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Kind paired with the given placement slot, or `None` on an empty
    /// catalog.
    pub fn get(&self, id: KindId) -> Option<&MineKind> {
        if self.kinds.is_empty() {
            return None;
        }
        self.kinds.get(usize::from(id) % self.kinds.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = &MineKind> {
        self.kinds.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn catalog() -> MineCatalog {
        MineCatalog::new(vec![
            MineKind::new("Red", "red", "vid-0"),
            MineKind::new("Blue", "blue", "vid-1"),
        ])
    }

    #[test]
    fn kind_lookup_wraps_past_the_catalog_end() {
        let catalog = catalog();

        assert_eq!(catalog.get(0).map(|kind| kind.color.as_str()), Some("red"));
        assert_eq!(catalog.get(1).map(|kind| kind.color.as_str()), Some("blue"));
        assert_eq!(catalog.get(2).map(|kind| kind.color.as_str()), Some("red"));
    }

    #[test]
    fn empty_catalog_has_no_kinds() {
        let catalog = MineCatalog::default();

        assert!(catalog.is_empty());
        assert_eq!(catalog.get(0), None);
    }
}
