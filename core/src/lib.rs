//! Two players race over a spatial network for randomly spawning
//! resources, under constraints set by a policy parameter object.
//!
//! The engine consumes an already-built weighted graph with its transit
//! stops and an already-resolved `PolicyParameters`; it produces events
//! and read-only snapshots each tick.

pub mod clock;
pub mod config;
pub mod consumption_subsystem;
pub mod engine;
pub mod entity;
pub mod error;
pub mod event;
pub mod graph;
pub mod movement_subsystem;
pub mod policy;
pub mod provider;
pub mod rng;
pub mod snapshot;
pub mod spatial;
pub mod spawn_subsystem;
pub mod subsystem;
pub mod types;
