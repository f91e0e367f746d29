//! Simulation clock. Owns the tick counter.

use crate::types::{RunId, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id:       RunId,
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            current_tick: 0,
        }
    }

    /// Advance one tick. Returns the new tick number.
    /// Called exactly once per tick, before any per-tick logic runs.
    pub fn advance(&mut self) -> Tick {
        self.current_tick += 1;
        self.current_tick
    }
}
