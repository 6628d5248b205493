//! Occurrence navigation
//!
//! A small per-buffer state machine behind "go to next/previous usage".
//! The identity being explored, not the live cursor, decides when the
//! occurrence list is rebuilt, so stepping stays stable while the cursor
//! jumps around between occurrences.
//!
//! @module analysis/navigate

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::index::AnalysisSnapshot;
use super::resolve::{identity, occurrences, EntityId, Occurrences, Thingy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Back,
}

/// An occurrence list and the cursor into it
#[derive(Debug, Clone, PartialEq)]
pub struct Exploration {
    occurrences: Occurrences,
    index: usize,
}

impl Exploration {
    pub fn id(&self) -> &EntityId {
        &self.occurrences.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn occurrences(&self) -> &Occurrences {
        &self.occurrences
    }

    pub fn current(&self) -> Option<&Thingy> {
        self.occurrences.items.get(self.index)
    }

    pub fn len(&self) -> usize {
        self.occurrences.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.items.is_empty()
    }

    /// Move one step, clamping at both ends. Returns false on a no-op.
    fn step(&mut self, direction: Direction) -> bool {
        match direction {
            Direction::Forward if self.index + 1 < self.len() => {
                self.index += 1;
                true
            }
            Direction::Back if self.index > 0 => {
                self.index -= 1;
                true
            }
            _ => false,
        }
    }
}

/// Navigation state attached to one buffer
#[derive(Debug, Clone, Default, PartialEq)]
pub enum NavigationState {
    #[default]
    Idle,
    Exploring(Exploration),
}

impl NavigationState {
    pub fn explored_id(&self) -> Option<&EntityId> {
        match self {
            NavigationState::Idle => None,
            NavigationState::Exploring(exploration) => Some(exploration.id()),
        }
    }

    pub fn exploration(&self) -> Option<&Exploration> {
        match self {
            NavigationState::Idle => None,
            NavigationState::Exploring(exploration) => Some(exploration),
        }
    }

    pub fn current(&self) -> Option<&Thingy> {
        self.exploration().and_then(Exploration::current)
    }

    /// Explore `thingy`.
    ///
    /// The occurrence list is rebuilt only when the identity changes; returns
    /// true when it was. Either way the index lands on `thingy` itself, and
    /// when `thingy` is not in the list the previous index is kept, clamped
    /// to the list length.
    pub fn explore(&mut self, snapshot: &AnalysisSnapshot, thingy: &Thingy) -> bool {
        let id = identity(snapshot, thingy);
        if let NavigationState::Exploring(exploration) = &mut *self {
            if exploration.id() == &id {
                if let Some(index) = exploration.occurrences.position_of(thingy) {
                    exploration.index = index;
                }
                return false;
            }
        }

        let previous = self.exploration().map(Exploration::index).unwrap_or(0);
        let occurrences = occurrences(snapshot, thingy);
        let last = occurrences.items.len().saturating_sub(1);
        let index = occurrences
            .position_of(thingy)
            .unwrap_or_else(|| previous.min(last));

        debug!(%id, occurrences = occurrences.items.len(), index, "Exploring");

        *self = NavigationState::Exploring(Exploration { occurrences, index });
        true
    }

    /// Step through the explored occurrences.
    ///
    /// Returns the occurrence landed on, or `None` when idle or clamped at
    /// either end of the list.
    pub fn step(&mut self, direction: Direction) -> Option<&Thingy> {
        let NavigationState::Exploring(exploration) = self else {
            return None;
        };
        if exploration.step(direction) {
            exploration.current()
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        *self = NavigationState::Idle;
    }
}
