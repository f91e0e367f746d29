use crate::{
    entity::PlayerName,
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    subsystem::{SimSubsystem, TickContext},
};

/// Each player, A first, takes at most one resource per tick: the
/// earliest-spawned live resource on the node they occupy.
#[derive(Debug, Default)]
pub struct ConsumptionSubsystem;

impl ConsumptionSubsystem {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimSubsystem for ConsumptionSubsystem {
    fn name(&self) -> &'static str { "consumption" }

    fn update(
        &mut self,
        ctx: &mut TickContext<'_>,
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let mut events = Vec::new();
        for name in PlayerName::ALL {
            let node = ctx.entities.player(name).node;
            let Some(id) = ctx.entities.resource_at(node).map(|r| r.id) else {
                continue;
            };
            let Some(resource) = ctx.entities.remove_resource(id) else {
                continue;
            };

            let player = ctx.entities.player_mut(name);
            player.wealth += resource.value;

            log::debug!(
                "tick={} consume: {name} took resource {} at {node} (+{}, wealth={})",
                ctx.tick, resource.id, resource.value, player.wealth
            );

            events.push(SimEvent::ResourceConsumed {
                tick:        ctx.tick,
                player:      name,
                resource_id: resource.id,
                node,
                value:       resource.value,
                wealth:      player.wealth,
            });
        }
        Ok(events)
    }
}
