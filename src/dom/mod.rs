//! Immutable arena DOM shared by every extraction pass.

mod arena;
mod serialize;
mod tree_sink;

pub use arena::{
    Ancestors, ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute, ChildrenIter,
    Descendants,
};
pub use serialize::{outer_html, outer_html_pruned};
pub use tree_sink::{ArenaSink, parse_html};
