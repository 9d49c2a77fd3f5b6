//! Typed result tree and its accessor layer.

pub mod node;
pub mod tree;

pub use node::OutputNode;
pub use tree::build_tree;
