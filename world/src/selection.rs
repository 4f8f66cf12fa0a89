//! Single-owner tower selection.

use critter_defence_core::TowerId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Selection {
    selected: Option<TowerId>,
}

impl Selection {
    pub(crate) const fn current(&self) -> Option<TowerId> {
        self.selected
    }

    /// Selects the tower, returning `false` when it already was selected.
    pub(crate) fn select(&mut self, tower: TowerId) -> bool {
        self.selected.replace(tower) != Some(tower)
    }

    /// Clears the selection, returning whether anything was selected.
    pub(crate) fn clear(&mut self) -> bool {
        self.selected.take().is_some()
    }

    /// Clears the selection only if it points at the provided tower.
    pub(crate) fn forget(&mut self, tower: TowerId) -> bool {
        if self.selected == Some(tower) {
            self.selected = None;
            return true;
        }
        false
    }
}
