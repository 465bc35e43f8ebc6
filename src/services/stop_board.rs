//! Shared stop list guarded by a generation id.
//!
//! Each segmentation run installs its stops under a fresh generation.
//! Resolution and refinement tasks write back by index together with the
//! generation they were started for; a write for any other generation is
//! dropped, so a slow task from an old run can never touch a newer list.

use crate::models::StopPoint;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct BoardState {
    generation: u64,
    stops: Vec<StopPoint>,
}

#[derive(Default)]
pub struct StopBoard {
    current: AtomicU64,
    state: RwLock<BoardState>,
}

impl StopBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stop list and returns its generation
    pub async fn begin(&self, stops: Vec<StopPoint>) -> u64 {
        let mut state = self.state.write().await;
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        state.generation = generation;
        state.stops = stops;
        debug!(generation, stops = state.stops.len(), "Installed stop list");
        generation
    }

    pub fn current_generation(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }

    /// Applies `f` to stop `index` if `generation` is still current.
    /// Returns whether the write happened.
    pub async fn update<F>(&self, generation: u64, index: usize, f: F) -> bool
    where
        F: FnOnce(&mut StopPoint),
    {
        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(
                generation,
                current = state.generation,
                index,
                "Dropping stale stop update"
            );
            return false;
        }

        match state.stops.get_mut(index) {
            Some(stop) => {
                f(stop);
                true
            }
            None => false,
        }
    }

    pub async fn snapshot(&self) -> (u64, Vec<StopPoint>) {
        let state = self.state.read().await;
        (state.generation, state.stops.clone())
    }
}
