//! Properties that hold over every tick of a realistic run.

use faithsim_core::{
    config::SimConfig,
    engine::SimEngine,
    entity::PlayerName,
    event::SimEvent,
    graph::SpatialGraph,
    policy::PolicyParameters,
    types::NodeId,
};
use std::collections::HashSet;
use std::sync::Arc;

fn busy_engine(seed: u64) -> SimEngine {
    let graph = SpatialGraph::grid(15, 15, 50.0)
        .and_then(|g| g.with_transit_stops([NodeId(0), NodeId(112), NodeId(224)]))
        .unwrap();
    let policy = PolicyParameters::from_json(
        r#"{
            "teleport_access": {"A": true, "B": true},
            "spawn_bias": {"A": 0.3, "B": 0.3},
            "vision_radius": {"A": 300}
        }"#,
    )
    .unwrap();
    let config = SimConfig { spawn_prob: 0.6, ..SimConfig::default() };
    SimEngine::build(format!("inv-{seed}"), seed, Arc::new(graph), policy, config).unwrap()
}

#[test]
fn clock_advances_by_exactly_one_per_step() {
    let mut engine = busy_engine(1);
    assert_eq!(engine.current_tick(), 0);
    for expected in 1..=200 {
        let events = engine.step().unwrap();
        assert_eq!(engine.current_tick(), expected);
        let started: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SimEvent::TickStarted { tick } => Some(*tick),
                _ => None,
            })
            .collect();
        assert_eq!(started, vec![expected]);
        assert!(matches!(events.last(), Some(SimEvent::TickCompleted { tick }) if *tick == expected));
    }
}

#[test]
fn run_initialized_is_emitted_once_before_the_first_tick() {
    let mut engine = busy_engine(2);
    let events = engine.run_ticks(20).unwrap();
    let inits = events
        .iter()
        .filter(|e| matches!(e, SimEvent::RunInitialized { .. }))
        .count();
    assert_eq!(inits, 1);
    assert!(matches!(events.first(), Some(SimEvent::RunInitialized { seed: 2, .. })));
}

#[test]
fn resource_ids_strictly_increase_and_are_never_reused() {
    let mut engine = busy_engine(3);
    let events = engine.run_ticks(500).unwrap();

    let ids: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::ResourceSpawned { resource_id, .. } => Some(*resource_id),
            _ => None,
        })
        .collect();
    assert!(ids.len() > 100, "expected plenty of spawns, got {}", ids.len());
    assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids not strictly increasing");

    let live: HashSet<u64> = engine.resources().iter().map(|r| r.id).collect();
    assert_eq!(live.len(), engine.resources().len(), "duplicate live ids");
}

#[test]
fn wealth_only_grows_by_consumed_value_on_the_players_node() {
    let mut engine = busy_engine(4);
    let mut last = [0.0_f64; 2];

    for _ in 0..400 {
        let before = engine.snapshot();
        let events = engine.step().unwrap();

        for (i, name) in PlayerName::ALL.into_iter().enumerate() {
            let now = engine.player(name).wealth;
            assert!(now >= last[i], "{name}'s wealth decreased");

            let credited: f64 = events
                .iter()
                .filter_map(|e| match e {
                    SimEvent::ResourceConsumed { player, node, value, resource_id, .. }
                        if *player == name =>
                    {
                        assert_eq!(*node, engine.player(name).node);
                        let existed = before.resources.iter().any(|r| {
                            r.id == *resource_id && r.node == *node && r.value == *value
                        }) || events.iter().any(|s| matches!(s,
                            SimEvent::ResourceSpawned { resource_id: sid, node: sn, .. }
                                if sid == resource_id && sn == node));
                        assert!(existed, "consumed resource {resource_id} did not exist there");
                        Some(*value)
                    }
                    _ => None,
                })
                .sum();
            assert_eq!(now - last[i], credited, "{name}'s wealth changed without consumption");
            last[i] = now;
        }
    }
    assert!(last.iter().sum::<f64>() > 0.0, "nobody collected anything in 400 ticks");
}

#[test]
fn consumed_resources_leave_the_live_set() {
    let mut engine = busy_engine(5);
    for _ in 0..300 {
        let events = engine.step().unwrap();
        for e in &events {
            if let SimEvent::ResourceConsumed { resource_id, .. } = e {
                assert!(engine.resources().iter().all(|r| r.id != *resource_id));
            }
        }
    }
    let stats = engine.stats();
    assert_eq!(stats.spawned - stats.consumed, engine.resources().len() as u64);
}

#[test]
fn players_only_ever_stand_on_graph_nodes() {
    let mut engine = busy_engine(6);
    for _ in 0..300 {
        engine.step().unwrap();
        for name in PlayerName::ALL {
            assert!(engine.graph().contains(engine.player(name).node));
        }
    }
}
