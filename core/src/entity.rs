//! Players, resources, and the live entity set.
//!
//! RULE: Only the movement system writes `Player::node`.
//! Only the consumption system writes `Player::wealth` and removes
//! resources. Only the spawn system adds resources.

use crate::{
    error::{SimError, SimResult},
    graph::SpatialGraph,
    rng::SubsystemRng,
    types::{NodeId, ResourceId},
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlayerName {
    A,
    B,
}

impl PlayerName {
    /// Fixed move/consume order within a tick.
    pub const ALL: [PlayerName; 2] = [PlayerName::A, PlayerName::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerName::A => "A",
            PlayerName::B => "B",
        }
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which player may perceive and chase a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    Neutral,
    Toward(PlayerName),
}

impl Bias {
    pub fn visible_to(&self, player: PlayerName) -> bool {
        match self {
            Bias::Neutral => true,
            Bias::Toward(owner) => *owner == player,
        }
    }
}

/// How far a player can perceive resources.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vision {
    #[default]
    Unbounded,
    Radius(f64),
}

impl Vision {
    /// Inclusive: a resource at exactly the radius is seen.
    /// `Radius(0.0)` sees only the player's own node; it is not unbounded.
    pub fn covers(&self, distance: f64) -> bool {
        match self {
            Vision::Unbounded => true,
            Vision::Radius(r) => distance <= *r,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name:   PlayerName,
    pub node:   NodeId,
    pub wealth: f64,
    pub vision: Vision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id:    ResourceId,
    pub node:  NodeId,
    pub value: f64,
    pub bias:  Bias,
}

/// Both players plus the live resource set, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityModel {
    players:          [Player; 2],
    resources:        Vec<Resource>,
    next_resource_id: ResourceId,
}

impl EntityModel {
    pub fn new(player_a: Player, player_b: Player) -> Self {
        Self {
            players:          [player_a, player_b],
            resources:        Vec::new(),
            next_resource_id: 0,
        }
    }

    /// Place both players on uniformly random nodes.
    pub fn populate(graph: &SpatialGraph, rng: &mut SubsystemRng) -> SimResult<Self> {
        let a = Self::create_player(PlayerName::A, graph, rng)?;
        let b = Self::create_player(PlayerName::B, graph, rng)?;
        Ok(Self::new(a, b))
    }

    pub fn create_player(
        name: PlayerName,
        graph: &SpatialGraph,
        rng: &mut SubsystemRng,
    ) -> SimResult<Player> {
        let node = *rng.pick(graph.nodes()).ok_or(SimError::EmptyWorld)?;
        Ok(Player {
            name,
            node,
            wealth: 0.0,
            vision: Vision::Unbounded,
        })
    }

    pub fn player(&self, name: PlayerName) -> &Player {
        &self.players[Self::slot(name)]
    }

    pub fn player_mut(&mut self, name: PlayerName) -> &mut Player {
        &mut self.players[Self::slot(name)]
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// The id the next spawned resource will receive.
    pub fn next_resource_id(&self) -> ResourceId {
        self.next_resource_id
    }

    pub fn spawn_resource(&mut self, node: NodeId, value: f64, bias: Bias) -> &Resource {
        let id = self.next_resource_id;
        self.next_resource_id += 1;
        self.resources.push(Resource { id, node, value, bias });
        &self.resources[self.resources.len() - 1]
    }

    pub fn remove_resource(&mut self, id: ResourceId) -> Option<Resource> {
        let pos = self.resources.iter().position(|r| r.id == id)?;
        Some(self.resources.remove(pos))
    }

    /// First live resource (insertion order) sitting on `node`.
    pub fn resource_at(&self, node: NodeId) -> Option<&Resource> {
        self.resources.iter().find(|r| r.node == node)
    }

    fn slot(name: PlayerName) -> usize {
        match name {
            PlayerName::A => 0,
            PlayerName::B => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, SubsystemSlot};

    fn player(name: PlayerName, node: u64) -> Player {
        Player {
            name,
            node: NodeId(node),
            wealth: 0.0,
            vision: Vision::Unbounded,
        }
    }

    #[test]
    fn resource_ids_are_never_reused() {
        let mut m = EntityModel::new(player(PlayerName::A, 0), player(PlayerName::B, 1));
        let first = m.spawn_resource(NodeId(3), 1.0, Bias::Neutral).id;
        assert!(m.remove_resource(first).is_some());
        let second = m.spawn_resource(NodeId(3), 1.0, Bias::Neutral).id;
        assert!(second > first);
        assert!(m.remove_resource(first).is_none());
    }

    #[test]
    fn resource_at_returns_first_in_insertion_order() {
        let mut m = EntityModel::new(player(PlayerName::A, 0), player(PlayerName::B, 1));
        m.spawn_resource(NodeId(5), 1.0, Bias::Neutral);
        m.spawn_resource(NodeId(5), 2.0, Bias::Toward(PlayerName::B));
        assert_eq!(m.resource_at(NodeId(5)).map(|r| r.id), Some(0));
    }

    #[test]
    fn bias_visibility() {
        assert!(Bias::Neutral.visible_to(PlayerName::A));
        assert!(Bias::Toward(PlayerName::B).visible_to(PlayerName::B));
        assert!(!Bias::Toward(PlayerName::B).visible_to(PlayerName::A));
    }

    #[test]
    fn zero_radius_sees_only_its_own_node() {
        assert!(Vision::Radius(0.0).covers(0.0));
        assert!(!Vision::Radius(0.0).covers(1e-9));
    }

    #[test]
    fn create_player_on_empty_world_fails() {
        let graph = SpatialGraph::new();
        let mut rng = RngBank::new(1).for_subsystem_at_tick(SubsystemSlot::Placement, 0);
        assert!(matches!(
            EntityModel::create_player(PlayerName::A, &graph, &mut rng),
            Err(SimError::EmptyWorld)
        ));
    }
}
