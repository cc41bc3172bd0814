mod ids;
mod topology;
pub mod generate;

pub use ids::{natural_cmp, LinkId, NodeId};
pub use topology::{Limits, Link, Node, NodeKind, Position, Removed, Topology};
pub use generate::{Generator, Layout};
