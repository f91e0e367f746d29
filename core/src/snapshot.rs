//! Read-only observation of the simulation for consumers (renderers,
//! the runner's IPC loop). Built on demand; the engine keeps no history.

use crate::{
    entity::{Player, Resource},
    types::{RunId, Tick},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub run_id:    RunId,
    pub tick:      Tick,
    pub players:   [Player; 2],
    pub resources: Vec<Resource>,
}

impl SimSnapshot {
    pub fn total_wealth(&self) -> f64 {
        self.players.iter().map(|p| p.wealth).sum()
    }
}
