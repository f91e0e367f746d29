//! The simulation engine: one owned aggregate, one tick at a time.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   0. Clock advances by exactly one.
//!   1. Spawn subsystem        (at most one resource)
//!   2. Movement subsystem     (player A, then player B)
//!   3. Consumption subsystem  (player A, then player B)
//!
//! RULES:
//!   - Subsystems execute in registration order, every tick.
//!   - All randomness flows through the RngBank.
//!   - The graph, transit stops, policy and config are read-only
//!     once the engine is built.
//!   - Per-tick anomalies (no path, no resources, no candidates) never
//!     fail a tick. Only construction can fail.

use crate::{
    clock::SimClock,
    config::SimConfig,
    consumption_subsystem::ConsumptionSubsystem,
    entity::{Bias, EntityModel, Player, PlayerName, Resource},
    error::{SimError, SimResult},
    event::{MoveMode, SimEvent},
    graph::SpatialGraph,
    movement_subsystem::MovementSubsystem,
    policy::{PolicyHooks, PolicyParameters, Unrestricted},
    rng::{RngBank, SubsystemSlot},
    snapshot::SimSnapshot,
    spawn_subsystem::SpawnSubsystem,
    subsystem::{SimSubsystem, TickContext},
    types::{NodeId, ResourceId, RunId, Tick},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Running totals, derived from the events each tick emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub spawned:   u64,
    pub consumed:  u64,
    pub teleports: u64,
    pub stalls:    u64,
}

impl RunStats {
    fn record(&mut self, event: &SimEvent) {
        match event {
            SimEvent::ResourceSpawned { .. } => self.spawned += 1,
            SimEvent::ResourceConsumed { .. } => self.consumed += 1,
            SimEvent::PlayerMoved { mode: MoveMode::Teleport, .. } => self.teleports += 1,
            SimEvent::PlayerStalled { .. } => self.stalls += 1,
            _ => {}
        }
    }
}

pub struct SimEngine {
    pub run_id:   RunId,
    clock:        SimClock,
    rng_bank:     RngBank,
    seed:         u64,
    subsystems:   Vec<(SubsystemSlot, Box<dyn SimSubsystem>)>,
    graph:        Arc<SpatialGraph>,
    policy:       PolicyParameters,
    hooks:        Box<dyn PolicyHooks>,
    config:       SimConfig,
    entities:     EntityModel,
    stats:        RunStats,
}

impl SimEngine {
    /// Validate inputs and place both players. No subsystems registered.
    pub fn new(
        run_id: RunId,
        seed: u64,
        graph: Arc<SpatialGraph>,
        policy: PolicyParameters,
        config: SimConfig,
    ) -> SimResult<Self> {
        config.validate()?;
        if graph.is_empty() {
            return Err(SimError::EmptyWorld);
        }

        let rng_bank = RngBank::new(seed);
        let mut placement = rng_bank.for_subsystem_at_tick(SubsystemSlot::Placement, 0);
        let mut entities = EntityModel::populate(&graph, &mut placement)?;
        for name in PlayerName::ALL {
            entities.player_mut(name).vision = policy.vision(name);
        }

        log::info!(
            "run {run_id}: seed={seed} nodes={} stops={} A@{} B@{}",
            graph.node_count(),
            graph.transit_stops().len(),
            entities.player(PlayerName::A).node,
            entities.player(PlayerName::B).node,
        );

        Ok(Self {
            clock: SimClock::new(run_id.clone()),
            rng_bank,
            seed,
            subsystems: Vec::new(),
            graph,
            policy,
            hooks: Box::new(Unrestricted),
            config,
            entities,
            stats: RunStats::default(),
            run_id,
        })
    }

    /// Build a fully wired engine with all subsystems registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(
        run_id: RunId,
        seed: u64,
        graph: Arc<SpatialGraph>,
        policy: PolicyParameters,
        config: SimConfig,
    ) -> SimResult<Self> {
        let mut engine = SimEngine::new(run_id, seed, graph, policy, config)?;

        // Execution order is fixed. Never reorder.
        engine.register(SubsystemSlot::Spawn, Box::new(SpawnSubsystem::new()));
        engine.register(SubsystemSlot::Movement, Box::new(MovementSubsystem::new()));
        engine.register(SubsystemSlot::Consumption, Box::new(ConsumptionSubsystem::new()));
        Ok(engine)
    }

    /// Replace the default (unrestricted) movement gates.
    pub fn with_hooks(mut self, hooks: Box<dyn PolicyHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Register a subsystem. Call in the documented execution order.
    pub fn register(&mut self, slot: SubsystemSlot, subsystem: Box<dyn SimSubsystem>) {
        self.subsystems.push((slot, subsystem));
    }

    // ── Scenario setup (before the first tick only) ────────────

    /// Move a player to `node` before the run starts.
    pub fn place_player(&mut self, name: PlayerName, node: NodeId) -> SimResult<()> {
        self.ensure_not_started()?;
        if !self.graph.contains(node) {
            return Err(SimError::UnknownNode { node });
        }
        self.entities.player_mut(name).node = node;
        Ok(())
    }

    /// Drop a resource on `node` before the run starts.
    pub fn seed_resource(&mut self, node: NodeId, value: f64, bias: Bias) -> SimResult<ResourceId> {
        self.ensure_not_started()?;
        if !self.graph.contains(node) {
            return Err(SimError::UnknownNode { node });
        }
        Ok(self.entities.spawn_resource(node, value, bias).id)
    }

    fn ensure_not_started(&self) -> SimResult<()> {
        match self.clock.current_tick {
            0 => Ok(()),
            tick => Err(SimError::RunAlreadyStarted { tick }),
        }
    }

    // ── Tick loop ──────────────────────────────────────────────

    /// Advance one tick. This is the core simulation step.
    pub fn step(&mut self) -> SimResult<Vec<SimEvent>> {
        let mut tick_events = Vec::new();
        if self.clock.current_tick == 0 {
            tick_events.push(SimEvent::RunInitialized {
                run_id:  self.run_id.clone(),
                seed:    self.seed,
                start_a: self.entities.player(PlayerName::A).node,
                start_b: self.entities.player(PlayerName::B).node,
            });
        }

        let current_tick = self.clock.advance();
        tick_events.push(SimEvent::TickStarted { tick: current_tick });

        for (slot, subsystem) in &mut self.subsystems {
            let mut rng = self.rng_bank.for_subsystem_at_tick(*slot, current_tick);
            let mut ctx = TickContext {
                tick:      current_tick,
                graph:     &self.graph,
                policy:    &self.policy,
                hooks:     self.hooks.as_ref(),
                config:    &self.config,
                entities:  &mut self.entities,
            };
            let new_events = subsystem.update(&mut ctx, &mut rng)?;
            tick_events.extend(new_events);
        }

        tick_events.push(SimEvent::TickCompleted { tick: current_tick });
        for event in &tick_events {
            log::trace!("tick={current_tick} event: {}", event.type_name());
            self.stats.record(event);
        }

        if current_tick.is_multiple_of(self.config.snapshot_interval) {
            log::debug!(
                "tick={current_tick} snapshot: A@{} w={} B@{} w={} live={}",
                self.entities.player(PlayerName::A).node,
                self.entities.player(PlayerName::A).wealth,
                self.entities.player(PlayerName::B).node,
                self.entities.player(PlayerName::B).wealth,
                self.entities.resources().len(),
            );
        }

        Ok(tick_events)
    }

    /// Run n ticks in a loop, returning every event in order.
    /// Used for testing and fast-forward.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<Vec<SimEvent>> {
        let mut all = Vec::new();
        for _ in 0..n {
            all.extend(self.step()?);
        }
        Ok(all)
    }

    // ── Read-only observation ──────────────────────────────────

    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            run_id:    self.run_id.clone(),
            tick:      self.clock.current_tick,
            players:   self.entities.players().clone(),
            resources: self.entities.resources().to_vec(),
        }
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn player(&self, name: PlayerName) -> &Player {
        self.entities.player(name)
    }

    pub fn resources(&self) -> &[Resource] {
        self.entities.resources()
    }

    pub fn graph(&self) -> &SpatialGraph {
        &self.graph
    }

    pub fn policy(&self) -> &PolicyParameters {
        &self.policy
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }
}
