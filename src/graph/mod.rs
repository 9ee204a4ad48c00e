//! Core graph data structures

mod memory;
mod node;
mod relationship;

#[cfg(test)]
mod tests;

pub use memory::MemoryGraph;
pub use node::{CreateNodeInput, Node, NodeId, Properties, PropertyValue, UpdateNodeInput};
pub use relationship::{
    CreateRelationshipInput, Relationship, RelationshipId, UpdateRelationshipInput,
};
