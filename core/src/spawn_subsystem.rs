use crate::{
    entity::{Bias, PlayerName},
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    subsystem::{SimSubsystem, TickContext},
    types::NodeId,
};

/// At most one resource per tick.
///
/// Placement order is a tie-break: A's bias is tried first, B's only if
/// A's produced no node, and a uniform draw over the whole graph last.
#[derive(Debug, Default)]
pub struct SpawnSubsystem;

impl SpawnSubsystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// A node near `player`, if its bias trial fires.
    /// A weight that is absent or zero draws nothing.
    fn biased_node(
        ctx: &TickContext<'_>,
        player: PlayerName,
        rng: &mut SubsystemRng,
    ) -> Option<NodeId> {
        let weight = ctx.policy.spawn_bias(player).filter(|w| *w > 0.0)?;
        if !rng.chance(weight) {
            return None;
        }
        let center = ctx.entities.player(player).node;
        let candidates = ctx.graph.nodes_within_radius(center, ctx.config.spawn_bias_radius);
        rng.pick(&candidates).copied()
    }

    fn draw_value(ctx: &TickContext<'_>, rng: &mut SubsystemRng) -> f64 {
        match ctx.config.resource_values.as_slice() {
            [single] => *single,
            values => rng.pick(values).copied().unwrap_or(1.0),
        }
    }
}

impl SimSubsystem for SpawnSubsystem {
    fn name(&self) -> &'static str { "spawn" }

    fn update(
        &mut self,
        ctx: &mut TickContext<'_>,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        if !rng.chance(ctx.config.spawn_prob) {
            return Ok(vec![]);
        }

        let mut placed = Self::biased_node(ctx, PlayerName::A, rng)
            .map(|node| (node, Bias::Toward(PlayerName::A)));
        if placed.is_none() {
            placed = Self::biased_node(ctx, PlayerName::B, rng)
                .map(|node| (node, Bias::Toward(PlayerName::B)));
        }
        let (node, bias) = match placed {
            Some(p) => p,
            None => match rng.pick(ctx.graph.nodes()) {
                Some(&node) => (node, Bias::Neutral),
                None => return Ok(vec![]),
            },
        };

        let value = Self::draw_value(ctx, rng);
        let resource = ctx.entities.spawn_resource(node, value, bias);

        log::debug!(
            "tick={} spawn: resource {} at {} value={} bias={:?}",
            ctx.tick, resource.id, resource.node, resource.value, resource.bias
        );

        Ok(vec![SimEvent::ResourceSpawned {
            tick:        ctx.tick,
            resource_id: resource.id,
            node:        resource.node,
            value:       resource.value,
            bias:        resource.bias,
        }])
    }
}
