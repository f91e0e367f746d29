//! Subsystem trait.
//!
//! RULE: Every per-tick system implements SimSubsystem.
//! The engine calls update() on each registered subsystem
//! in registration order, every tick.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    config::SimConfig,
    entity::EntityModel,
    error::SimResult,
    event::SimEvent,
    graph::SpatialGraph,
    policy::{PolicyHooks, PolicyParameters},
    rng::SubsystemRng,
    types::Tick,
};

/// Everything a subsystem may see during one tick.
/// Only `entities` is writable.
pub struct TickContext<'a> {
    pub tick:      Tick,
    pub graph:     &'a SpatialGraph,
    pub policy:    &'a PolicyParameters,
    pub hooks:     &'a dyn PolicyHooks,
    pub config:    &'a SimConfig,
    pub entities:  &'a mut EntityModel,
}

/// The contract every subsystem must fulfill.
pub trait SimSubsystem: Send {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Called once per tick by the engine with this subsystem's
    /// deterministic RNG for the tick. Returns the new events.
    fn update(
        &mut self,
        ctx: &mut TickContext<'_>,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>>;
}
