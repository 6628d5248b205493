//! Analysis Store - per-buffer snapshots and navigation state
//!
//! Entries are created and destroyed only through `open` and `close`.
//! Snapshots are shared as `Arc`s: replacing one swaps the pointer under
//! the write lock, so a reader either sees the old snapshot or the new one,
//! never a half-built index.
//!
//! @module analysis/store

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::index::AnalysisSnapshot;
use super::navigate::NavigationState;

/// Opaque editor buffer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BufferId(pub u64);

impl std::fmt::Display for BufferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "buffer#{}", self.0)
    }
}

#[derive(Debug, Default)]
struct BufferState {
    snapshot: Arc<AnalysisSnapshot>,
    navigation: NavigationState,
}

/// Process-wide table of open buffers
#[derive(Debug, Default)]
pub struct AnalysisStore {
    buffers: RwLock<HashMap<BufferId, BufferState>>,
}

impl AnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a buffer with an empty snapshot. Returns false if already open.
    pub fn open(&self, buffer: BufferId) -> bool {
        let mut buffers = self.buffers.write();
        if buffers.contains_key(&buffer) {
            return false;
        }
        buffers.insert(buffer, BufferState::default());
        debug!(%buffer, "Opened buffer");
        true
    }

    /// Drop a buffer's snapshot and navigation state together
    pub fn close(&self, buffer: BufferId) -> bool {
        let removed = self.buffers.write().remove(&buffer).is_some();
        if removed {
            debug!(%buffer, "Closed buffer");
        }
        removed
    }

    pub fn is_open(&self, buffer: BufferId) -> bool {
        self.buffers.read().contains_key(&buffer)
    }

    pub fn len(&self) -> usize {
        self.buffers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.read().is_empty()
    }

    /// Current snapshot of an open buffer
    pub fn snapshot(&self, buffer: BufferId) -> Option<Arc<AnalysisSnapshot>> {
        self.buffers
            .read()
            .get(&buffer)
            .map(|state| Arc::clone(&state.snapshot))
    }

    /// Swap in a freshly built snapshot.
    ///
    /// Navigation state is left alone. Returns false, discarding the
    /// snapshot, if the buffer was closed while it was being built.
    pub fn replace(&self, buffer: BufferId, snapshot: AnalysisSnapshot) -> bool {
        let snapshot = Arc::new(snapshot);
        let mut buffers = self.buffers.write();
        match buffers.get_mut(&buffer) {
            Some(state) => {
                state.snapshot = snapshot;
                info!(
                    %buffer,
                    errors = state.snapshot.error_count(),
                    warnings = state.snapshot.warning_count(),
                    "Replaced analysis snapshot"
                );
                true
            }
            None => {
                debug!(%buffer, "Discarding snapshot for closed buffer");
                false
            }
        }
    }

    /// Run `f` against a buffer's snapshot and its mutable navigation state
    pub fn with_navigation<R>(
        &self,
        buffer: BufferId,
        f: impl FnOnce(&AnalysisSnapshot, &mut NavigationState) -> R,
    ) -> Option<R> {
        let mut buffers = self.buffers.write();
        let state = buffers.get_mut(&buffer)?;
        let snapshot = Arc::clone(&state.snapshot);
        Some(f(&snapshot, &mut state.navigation))
    }

    pub fn navigation(&self, buffer: BufferId) -> Option<NavigationState> {
        self.buffers
            .read()
            .get(&buffer)
            .map(|state| state.navigation.clone())
    }
}
