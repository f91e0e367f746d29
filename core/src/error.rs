use crate::types::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("World has no nodes: cannot place players")]
    EmptyWorld,

    #[error("Unknown node {node}")]
    UnknownNode { node: NodeId },

    #[error("Node {node} added twice")]
    DuplicateNode { node: NodeId },

    #[error("Transit stop {node} is not a graph node")]
    UnknownTransitStop { node: NodeId },

    #[error("Invalid edge {from} -> {to}: {reason}")]
    InvalidEdge {
        from: NodeId,
        to: NodeId,
        reason: String,
    },

    #[error("Run already started at tick {tick}: scenario setup is closed")]
    RunAlreadyStarted { tick: u64 },

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
