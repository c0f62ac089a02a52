//! Core database trait for diagram data storage
//!
//! This trait defines the interface exporters read from. The finished class
//! model is flattened into nodes and edges that carry only display data.

use anyhow::Result;

/// Core trait for diagram databases
///
/// The associated types let each database define its own node and edge
/// structures with type-specific metadata.
pub trait Database {
    /// The node data type for this database
    type Node: Clone;

    /// The edge data type for this database
    type Edge: Clone;

    /// Add a node to the database
    fn add_node(&mut self, node: Self::Node) -> Result<()>;

    /// Add an edge to the database
    fn add_edge(&mut self, edge: Self::Edge) -> Result<()>;

    /// Get a node by ID
    fn get_node(&self, id: &str) -> Option<&Self::Node>;

    /// Iterate over all nodes
    fn nodes(&self) -> impl Iterator<Item = &Self::Node>;

    /// Iterate over all edges
    fn edges(&self) -> impl Iterator<Item = &Self::Edge>;

    /// Clear all data from the database
    fn clear(&mut self);

    /// Get the number of nodes
    fn node_count(&self) -> usize;

    /// Get the number of edges
    fn edge_count(&self) -> usize;
}
