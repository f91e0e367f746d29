//! Movement and transit policy.
//!
//! RULE: This is the only writer of `Player::node`.
//!
//! Per player per tick (A first, then B):
//!   1. Find the nearest visible resource from where the player stands.
//!   2. With teleport access:
//!      a. standing on any stop and some resource exists anywhere:
//!         jump to the stop closest to any resource, then re-aim at the
//!         nearest visible resource from there;
//!      b. otherwise head for the nearest stop when walking to it plus
//!         the resource-proximal stop's gap beats the direct distance
//!         (infinite when no resource is visible).
//!   3. No target yet: aim at the resource from step 1.
//!   4. Still nothing: one hop to a random neighbour.
//!   5. Else one hop along the weighted shortest path. No path: stay put.

use crate::{
    entity::{Player, PlayerName, Resource},
    error::SimResult,
    event::{MoveMode, SimEvent},
    graph::SpatialGraph,
    rng::SubsystemRng,
    subsystem::{SimSubsystem, TickContext},
    types::NodeId,
};

/// Nearest resource `player` can see and is allowed to chase.
/// Ties keep the earliest resource in insertion order.
pub fn nearest_visible_resource(
    graph: &SpatialGraph,
    player: &Player,
    resources: &[Resource],
) -> Option<(NodeId, f64)> {
    let mut best: Option<(NodeId, f64)> = None;
    for r in resources.iter().filter(|r| r.bias.visible_to(player.name)) {
        let d = graph.distance(player.node, r.node);
        if !player.vision.covers(d) {
            continue;
        }
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((r.node, d));
        }
    }
    best
}

/// The transit stop closest to any live resource, whoever may see it.
/// Scans every (stop, resource) pair; stops in ascending id order.
pub fn stop_closest_to_any_resource(
    graph: &SpatialGraph,
    resources: &[Resource],
) -> Option<(NodeId, f64)> {
    let mut best: Option<(NodeId, f64)> = None;
    for &stop in graph.transit_stops() {
        for r in resources {
            let d = graph.distance(stop, r.node);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((stop, d));
            }
        }
    }
    best
}

/// Outcome of the transit rules for one player.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TransitDecision {
    /// Stop jumped to, if the player teleported.
    teleported_to: Option<NodeId>,
    target:        Option<NodeId>,
}

#[derive(Debug, Default)]
pub struct MovementSubsystem;

impl MovementSubsystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn transit(ctx: &TickContext<'_>, player: &Player, direct: Option<(NodeId, f64)>) -> TransitDecision {
        let mut decision = TransitDecision { teleported_to: None, target: None };
        if !ctx.policy.teleport_access(player.name) {
            return decision;
        }

        let resources = ctx.entities.resources();
        let nearest = ctx.graph.nearest_stop(player.node);
        let proximal = stop_closest_to_any_resource(ctx.graph, resources);

        if ctx.graph.is_transit_stop(player.node) {
            if let Some((dest, _)) = proximal {
                if ctx.hooks.can_enter(player.name, dest) {
                    let relocated = Player { node: dest, ..player.clone() };
                    decision.teleported_to = Some(dest);
                    decision.target = nearest_visible_resource(ctx.graph, &relocated, resources)
                        .map(|(node, _)| node);
                }
            }
            return decision;
        }

        // Nothing visible counts as infinitely far, so any live resource
        // makes the stop route cheaper.
        let direct_dist = direct.map_or(f64::INFINITY, |(_, d)| d);
        if let (Some((stop, stop_dist)), Some((_, gap))) = (nearest, proximal) {
            if direct_dist > stop_dist + gap {
                decision.target = Some(stop);
            }
        }
        decision
    }

    fn step_player(
        &self,
        ctx: &mut TickContext<'_>,
        name: PlayerName,
        rng: &mut SubsystemRng,
    ) -> Vec<SimEvent> {
        let tick = ctx.tick;
        if !ctx.hooks.is_active(name, tick) {
            return vec![SimEvent::PlayerIdle { tick, player: name }];
        }

        let player = ctx.entities.player(name).clone();
        let direct = nearest_visible_resource(ctx.graph, &player, ctx.entities.resources());
        let decision = Self::transit(ctx, &player, direct);

        let mut events = Vec::new();
        let mut here = player.node;

        if let Some(stop) = decision.teleported_to {
            if stop != here {
                events.push(SimEvent::PlayerMoved {
                    tick,
                    player: name,
                    from: here,
                    to: stop,
                    mode: MoveMode::Teleport,
                });
            }
            here = stop;
        }

        let target = decision.target.or(direct.map(|(node, _)| node));

        match target {
            None => {
                let neighbors = ctx.graph.neighbors(here);
                if let Some(&next) = rng.pick(&neighbors) {
                    if ctx.hooks.can_enter(name, next) {
                        events.push(SimEvent::PlayerMoved {
                            tick,
                            player: name,
                            from: here,
                            to: next,
                            mode: MoveMode::RandomWalk,
                        });
                        here = next;
                    }
                }
            }
            Some(goal) if goal == here => {}
            Some(goal) => match ctx.graph.shortest_path_next_hop(here, goal) {
                Some(next) if ctx.hooks.can_enter(name, next) => {
                    events.push(SimEvent::PlayerMoved {
                        tick,
                        player: name,
                        from: here,
                        to: next,
                        mode: MoveMode::Path,
                    });
                    here = next;
                }
                _ => {
                    log::debug!("tick={tick} movement: {name} cannot step from {here} toward {goal}");
                    events.push(SimEvent::PlayerStalled { tick, player: name, target: goal });
                }
            },
        }

        ctx.entities.player_mut(name).node = here;
        events
    }
}

impl SimSubsystem for MovementSubsystem {
    fn name(&self) -> &'static str { "movement" }

    fn update(
        &mut self,
        ctx: &mut TickContext<'_>,
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let mut events = Vec::new();
        for name in PlayerName::ALL {
            events.extend(self.step_player(ctx, name, rng));
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Bias, Vision};

    fn strip() -> SpatialGraph {
        let mut g = SpatialGraph::new();
        for i in 0..5 {
            g.add_node(NodeId(i), i as f64 * 10.0, 0.0).unwrap();
        }
        for i in 0..4 {
            g.add_edge(NodeId(i), NodeId(i + 1), 10.0).unwrap();
        }
        g
    }

    fn resource(id: u64, node: u64, bias: Bias) -> Resource {
        Resource { id, node: NodeId(node), value: 1.0, bias }
    }

    fn player(name: PlayerName, node: u64, vision: Vision) -> Player {
        Player { name, node: NodeId(node), wealth: 0.0, vision }
    }

    #[test]
    fn nearest_skips_resources_biased_to_the_other_player() {
        let g = strip();
        let rs = vec![
            resource(0, 1, Bias::Toward(PlayerName::B)),
            resource(1, 3, Bias::Neutral),
        ];
        let a = player(PlayerName::A, 0, Vision::Unbounded);
        assert_eq!(nearest_visible_resource(&g, &a, &rs), Some((NodeId(3), 30.0)));
        let b = player(PlayerName::B, 0, Vision::Unbounded);
        assert_eq!(nearest_visible_resource(&g, &b, &rs), Some((NodeId(1), 10.0)));
    }

    #[test]
    fn nearest_ties_keep_insertion_order() {
        let g = strip();
        let rs = vec![resource(0, 3, Bias::Neutral), resource(1, 1, Bias::Neutral)];
        let p = player(PlayerName::A, 2, Vision::Unbounded);
        assert_eq!(nearest_visible_resource(&g, &p, &rs), Some((NodeId(3), 10.0)));
    }

    #[test]
    fn vision_radius_is_inclusive() {
        let g = strip();
        let rs = vec![resource(0, 2, Bias::Neutral)];
        let exact = player(PlayerName::A, 0, Vision::Radius(20.0));
        assert!(nearest_visible_resource(&g, &exact, &rs).is_some());
        let short = player(PlayerName::A, 0, Vision::Radius(19.999));
        assert!(nearest_visible_resource(&g, &short, &rs).is_none());
    }

    #[test]
    fn proximal_stop_scans_all_resources_regardless_of_bias() {
        let g = strip().with_transit_stops([NodeId(0), NodeId(4)]).unwrap();
        let rs = vec![resource(0, 3, Bias::Toward(PlayerName::B))];
        assert_eq!(stop_closest_to_any_resource(&g, &rs), Some((NodeId(4), 10.0)));
        assert_eq!(stop_closest_to_any_resource(&g, &[]), None);
    }
}
