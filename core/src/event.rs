//! Everything that happens during a tick, in the order it happened.
//!
//! RULE: Events are returned to the caller for live consumption.
//! The engine does not persist them.

use crate::{
    entity::{Bias, PlayerName},
    types::{NodeId, ResourceId, RunId, Tick},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveMode {
    /// One hop along the shortest path toward a target.
    Path,
    /// One hop to a random neighbour; nothing to chase.
    RandomWalk,
    /// Stop-to-stop jump on the transit network.
    Teleport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    RunInitialized {
        run_id: RunId,
        seed:   u64,
        start_a: NodeId,
        start_b: NodeId,
    },
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
    },

    // ── Spawn events ───────────────────────────────
    ResourceSpawned {
        tick:        Tick,
        resource_id: ResourceId,
        node:        NodeId,
        value:       f64,
        bias:        Bias,
    },

    // ── Movement events ────────────────────────────
    PlayerMoved {
        tick:   Tick,
        player: PlayerName,
        from:   NodeId,
        to:     NodeId,
        mode:   MoveMode,
    },
    /// Had a target but no way to step toward it.
    PlayerStalled {
        tick:   Tick,
        player: PlayerName,
        target: NodeId,
    },
    /// Held still by a policy hook.
    PlayerIdle {
        tick:   Tick,
        player: PlayerName,
    },

    // ── Consumption events ─────────────────────────
    ResourceConsumed {
        tick:        Tick,
        player:      PlayerName,
        resource_id: ResourceId,
        node:        NodeId,
        value:       f64,
        wealth:      f64,
    },
}

impl SimEvent {
    /// Stable string name for each variant, for logs and tooling.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimEvent::RunInitialized { .. }   => "run_initialized",
            SimEvent::TickStarted { .. }      => "tick_started",
            SimEvent::TickCompleted { .. }    => "tick_completed",
            SimEvent::ResourceSpawned { .. }  => "resource_spawned",
            SimEvent::PlayerMoved { .. }      => "player_moved",
            SimEvent::PlayerStalled { .. }    => "player_stalled",
            SimEvent::PlayerIdle { .. }       => "player_idle",
            SimEvent::ResourceConsumed { .. } => "resource_consumed",
        }
    }
}
