//! Error types shared by the solver core and the I/O layer.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the TSP core.
#[derive(Debug, Error)]
pub enum TspError {
    /// The graph has no nodes, so there is nothing to tour.
    #[error("graph has no nodes")]
    EmptyGraph,

    /// The instance is larger than the configured capacity bound.
    #[error("instance has {nodes} nodes, exceeding the capacity bound of {capacity}")]
    CapacityExceeded { nodes: usize, capacity: usize },

    /// The tour buffer does not match the graph it is evaluated against.
    #[error("tour has {tour_len} entries but the graph has {num_nodes} nodes")]
    TourSizeMismatch { tour_len: usize, num_nodes: usize },

    /// The tour is not a permutation of `0..num_nodes`.
    #[error("tour is not a permutation of 0..{num_nodes}")]
    NotAPermutation { num_nodes: usize },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
