pub mod network;
pub mod utils;

pub use network::{Generator, Layout, Limits, Link, LinkId, Node, NodeId, NodeKind, Position, Removed, Topology};
pub use utils::config::Config;
pub use utils::error::{Error, FileError, Result};
pub use utils::file::{load, save, Format};

pub const MAX_NODES: usize = 4096;
pub const MAX_LINKS: usize = 16384;
