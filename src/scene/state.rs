//! Which model each slot holds, and which slot is on screen.
//!
//! [`TransitionState`] is the only owner of the slot assignment. Its single
//! mutator, [`TransitionState::select_model`], runs once per selection change
//! and either flips the shown slot (the model is already resident) or writes the
//! model into the hidden slot first (a hot-swap). The shown and hidden slots are
//! always complements of each other.

use log::debug;

use crate::catalog::check_index;
use crate::error::{Error, Result};

/// One of the two render channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotId {
    First,
    Second,
}

impl SlotId {
    /// Both slots in render order.
    pub const ALL: [SlotId; 2] = [SlotId::First, SlotId::Second];

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(SlotId::First),
            1 => Some(SlotId::Second),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            SlotId::First => 0,
            SlotId::Second => 1,
        }
    }

    /// The complementary slot.
    pub fn other(self) -> Self {
        match self {
            SlotId::First => SlotId::Second,
            SlotId::Second => SlotId::First,
        }
    }

    /// Position of this slot on the blend coefficient axis (0.0 or 1.0).
    pub fn coefficient(self) -> f32 {
        self.index() as f32
    }
}

/// Outcome of a selection request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The requested model was already shown; nothing changed.
    Unchanged,
    /// The requested model was resident in the hidden slot, which is now shown.
    Switched { shown: SlotId },
    /// The requested model replaced `replaced` in the hidden slot, which is now shown.
    HotSwapped { shown: SlotId, replaced: usize },
}

impl Selection {
    /// The newly shown slot, if the selection changed anything.
    pub fn shown(self) -> Option<SlotId> {
        match self {
            Selection::Unchanged => None,
            Selection::Switched { shown } | Selection::HotSwapped { shown, .. } => Some(shown),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionState {
    assignment: [usize; 2],
    hidden: SlotId,
    catalog_len: usize,
}

impl TransitionState {
    /// Start with `initial` shown in the first slot.
    ///
    /// The second slot gets a different model so the resident check stays
    /// meaningful: index 1 when `initial` is not 1, otherwise the next index.
    /// Only a single-model catalog leaves both slots holding the same model.
    pub fn new(initial: usize, catalog_len: usize) -> Result<Self> {
        if catalog_len == 0 {
            return Err(Error::EmptyCatalog);
        }
        check_index(initial, catalog_len)?;

        Ok(Self {
            assignment: [initial, companion(initial, catalog_len)],
            hidden: SlotId::Second,
            catalog_len,
        })
    }

    /// Route `requested` to a slot and make that slot the shown one.
    ///
    /// Out-of-range indices are rejected before any state changes.
    pub fn select_model(&mut self, requested: usize) -> Result<Selection> {
        check_index(requested, self.catalog_len)?;

        if self.shown_model() == requested {
            return Ok(Selection::Unchanged);
        }

        let mut replaced = None;
        if !self.assignment.contains(&requested) {
            let hidden = self.hidden.index();
            replaced = Some(self.assignment[hidden]);
            self.assignment[hidden] = requested;
        }

        // position 0 wins when both slots hold the request
        let shown = if self.assignment[0] == requested {
            SlotId::First
        } else {
            SlotId::Second
        };
        self.hidden = shown.other();

        let selection = match replaced {
            Some(replaced) => Selection::HotSwapped { shown, replaced },
            None => Selection::Switched { shown },
        };
        debug!(
            "select model {requested}: {selection:?}, slots now {:?}",
            self.assignment
        );
        Ok(selection)
    }

    /// Model index per slot, `[first, second]`.
    pub fn assignment(&self) -> [usize; 2] {
        self.assignment
    }

    pub fn model_in(&self, slot: SlotId) -> usize {
        self.assignment[slot.index()]
    }

    pub fn shown(&self) -> SlotId {
        self.hidden.other()
    }

    pub fn hidden(&self) -> SlotId {
        self.hidden
    }

    pub fn shown_model(&self) -> usize {
        self.model_in(self.shown())
    }

    pub fn catalog_len(&self) -> usize {
        self.catalog_len
    }
}

fn companion(initial: usize, catalog_len: usize) -> usize {
    if catalog_len < 2 {
        initial
    } else if initial != 1 {
        1
    } else {
        (initial + 1) % catalog_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_slots_hold_distinct_models() {
        assert_eq!(TransitionState::new(0, 3).unwrap().assignment(), [0, 1]);
        assert_eq!(TransitionState::new(1, 3).unwrap().assignment(), [1, 2]);
        assert_eq!(TransitionState::new(2, 3).unwrap().assignment(), [2, 1]);
        assert_eq!(TransitionState::new(1, 2).unwrap().assignment(), [1, 0]);
    }

    #[test]
    fn single_model_catalog_duplicates_only_model() {
        let mut state = TransitionState::new(0, 1).unwrap();
        assert_eq!(state.assignment(), [0, 0]);
        assert_eq!(state.shown(), SlotId::First);
        assert_eq!(state.select_model(0).unwrap(), Selection::Unchanged);
    }

    #[test]
    fn first_slot_starts_shown() {
        let state = TransitionState::new(2, 3).unwrap();
        assert_eq!(state.shown(), SlotId::First);
        assert_eq!(state.hidden(), SlotId::Second);
        assert_eq!(state.shown_model(), 2);
    }

    #[test]
    fn resident_model_flips_without_reassignment() {
        let mut state = TransitionState::new(0, 3).unwrap();
        let before = state.assignment();

        let selection = state.select_model(1).unwrap();

        assert_eq!(selection, Selection::Switched { shown: SlotId::Second });
        assert_eq!(state.assignment(), before);
        assert_eq!(state.hidden(), SlotId::First);
    }

    #[test]
    fn absent_model_replaces_hidden_slot() {
        let mut state = TransitionState::new(0, 3).unwrap();

        let selection = state.select_model(2).unwrap();

        assert_eq!(
            selection,
            Selection::HotSwapped {
                shown: SlotId::Second,
                replaced: 1
            }
        );
        assert_eq!(state.assignment(), [0, 2]);
        assert_eq!(state.shown_model(), 2);
    }

    #[test]
    fn repeated_selection_is_idempotent() {
        let mut state = TransitionState::new(0, 3).unwrap();
        state.select_model(2).unwrap();
        let settled = state.clone();

        assert_eq!(state.select_model(2).unwrap(), Selection::Unchanged);
        assert_eq!(state, settled);
    }

    #[test]
    fn invalid_index_leaves_state_untouched() {
        let mut state = TransitionState::new(0, 3).unwrap();
        let before = state.clone();

        let err = state.select_model(3).unwrap_err();

        assert!(matches!(err, Error::InvalidModelIndex { index: 3, len: 3 }));
        assert_eq!(state, before);
    }

    #[test]
    fn invalid_initial_model_is_rejected() {
        assert!(matches!(
            TransitionState::new(5, 3),
            Err(Error::InvalidModelIndex { index: 5, len: 3 })
        ));
        assert!(matches!(TransitionState::new(0, 0), Err(Error::EmptyCatalog)));
    }

    #[test]
    fn slot_ids_are_complements() {
        for slot in SlotId::ALL {
            assert_ne!(slot, slot.other());
            assert_eq!(slot.index() + slot.other().index(), 1);
            assert_eq!(SlotId::from_index(slot.index()), Some(slot));
        }
        assert_eq!(SlotId::from_index(2), None);
    }
}
