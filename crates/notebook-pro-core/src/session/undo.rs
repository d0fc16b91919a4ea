/// Undo/redo providers, tried in order until one can take the step.
use crate::history::{self, HistoryStore};
use crate::surface::EditableSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoDirection {
    Undo,
    Redo,
}

/// Which provider handled an undo or redo step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// A snapshot from the document's history was restored.
    History,
    /// The surface's own undo stack took the step.
    Native,
    /// Nothing to undo or redo.
    Nothing,
}

impl UndoOutcome {
    pub fn applied(&self) -> bool {
        !matches!(self, Self::Nothing)
    }
}

pub trait UndoProvider<S: EditableSurface + ?Sized> {
    /// Takes one step in `direction`. Returns false, leaving the surface
    /// untouched, if this provider has nothing to step to.
    fn step(&mut self, surface: &mut S, direction: UndoDirection) -> bool;

    /// The outcome reported when this provider handles a step.
    fn outcome(&self) -> UndoOutcome;
}

/// Steps through the snapshot history.
pub struct SnapshotHistory<'a> {
    store: &'a mut HistoryStore,
}

impl<'a> SnapshotHistory<'a> {
    pub fn new(store: &'a mut HistoryStore) -> Self {
        Self { store }
    }
}

impl<S: EditableSurface + ?Sized> UndoProvider<S> for SnapshotHistory<'_> {
    fn step(&mut self, surface: &mut S, direction: UndoDirection) -> bool {
        let snapshot = match direction {
            UndoDirection::Undo => self.store.undo(),
            UndoDirection::Redo => self.store.redo(),
        };
        match snapshot {
            Some(snapshot) => {
                history::restore(surface, snapshot);
                true
            }
            None => false,
        }
    }

    fn outcome(&self) -> UndoOutcome {
        UndoOutcome::History
    }
}

/// Delegates to the surface's native undo stack.
pub struct NativeUndo;

impl<S: EditableSurface + ?Sized> UndoProvider<S> for NativeUndo {
    fn step(&mut self, surface: &mut S, direction: UndoDirection) -> bool {
        match direction {
            UndoDirection::Undo => surface.native_undo(),
            UndoDirection::Redo => surface.native_redo(),
        }
    }

    fn outcome(&self) -> UndoOutcome {
        UndoOutcome::Native
    }
}

/// Offers the step to each provider in turn; the first that takes it wins.
pub fn run_chain<S: EditableSurface + ?Sized>(
    providers: &mut [&mut dyn UndoProvider<S>],
    surface: &mut S,
    direction: UndoDirection,
) -> UndoOutcome {
    for provider in providers.iter_mut() {
        if provider.step(surface, direction) {
            return provider.outcome();
        }
    }
    UndoOutcome::Nothing
}
