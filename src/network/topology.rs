use std::fmt;

use chrono::{DateTime, Utc};
use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ids::{lowest_free, LinkId, NodeId};
use crate::utils::error::{Error, Result};
use crate::{MAX_LINKS, MAX_NODES};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Host,
    Switch,
}

/// Canvas coordinates. Non-finite values are stored as `0.0`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Position {
    x: f64,
    y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    label: String,
    position: Position,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    id: LinkId,
    ends: (NodeId, NodeId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_nodes: usize,
    pub max_links: usize,
}

/// What `remove_node` took out of the topology.
#[derive(Clone, Debug, PartialEq)]
pub struct Removed {
    pub node: Node,
    pub links: Vec<Link>,
}

#[derive(Clone, Debug, Default)]
pub struct Topology {
    nodes: HashMap<NodeId, Node>,
    links: HashMap<LinkId, Link>,
    pairs: HashMap<(NodeId, NodeId), LinkId>,
    name: Option<String>,
    created: Option<DateTime<Utc>>,
    limits: Limits,
    revision: u64,
}


impl NodeKind {
    pub fn prefix(self) -> &'static str {
        match self {
            NodeKind::Host   => "h",
            NodeKind::Switch => "s",
        }
    }
    /// Mininet naming convention: `h*` are hosts, `s*` are switches.
    pub fn infer(id: &str) -> Option<Self> {
        match id.chars().next() {
            Some('h') => Some(NodeKind::Host),
            Some('s') => Some(NodeKind::Switch),
            _         => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Host   => f.write_str("host"),
            NodeKind::Switch => f.write_str("switch"),
        }
    }
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        Position { x: finite(x), y: finite(y) }
    }
    pub fn x(&self) -> f64 {
        self.x
    }
    pub fn y(&self) -> f64 {
        self.y
    }
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind, label: String, position: Position) -> Self {
        Node { id, kind, label, position }
    }
    pub fn id(&self) -> &NodeId {
        &self.id
    }
    pub fn kind(&self) -> NodeKind {
        self.kind
    }
    pub fn label(&self) -> &str {
        &self.label
    }
    pub fn position(&self) -> Position {
        self.position
    }
}

impl Link {
    pub(crate) fn new(id: LinkId, a: NodeId, b: NodeId) -> Self {
        Link { id, ends: (a, b) }
    }
    pub fn id(&self) -> &LinkId {
        &self.id
    }
    pub fn a(&self) -> &NodeId {
        &self.ends.0
    }
    pub fn b(&self) -> &NodeId {
        &self.ends.1
    }
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.ends.0 == node || &self.ends.1 == node
    }
    /// The far end as seen from `node`, if the link touches it.
    pub fn other(&self, node: &NodeId) -> Option<&NodeId> {
        match (&self.ends.0 == node, &self.ends.1 == node) {
            (true, _) => Some(&self.ends.1),
            (_, true) => Some(&self.ends.0),
            _         => None,
        }
    }
    fn pair(&self) -> (NodeId, NodeId) {
        unordered(&self.ends.0, &self.ends.1)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits { max_nodes: MAX_NODES, max_links: MAX_LINKS }
    }
}

/// Structural equality: nodes, links and metadata. Limits and the
/// revision counter are bookkeeping.
impl PartialEq for Topology {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
            && self.links == other.links
            && self.name == other.name
            && self.created == other.created
    }
}

impl Topology {
    pub fn new() -> Self {
        Self { ..Default::default() }
    }
    pub fn with_limits(limits: Limits) -> Self {
        Self { limits, ..Default::default() }
    }
    /// A fresh topology stamped with a name and the current time.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            created: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }
    pub fn limits(&self) -> Limits {
        self.limits
    }
    /// Bumped by every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
    pub fn link_count(&self) -> usize {
        self.links.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }
    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links.get(id)
    }
    pub fn nodes(&self) -> impl Iterator<Item=&Node> + '_ {
        self.nodes.values()
            .sorted_by(|n1, n2| n1.id.cmp(&n2.id))
    }
    pub fn links(&self) -> impl Iterator<Item=&Link> + '_ {
        self.links.values()
            .sorted_by(|l1, l2| l1.id.cmp(&l2.id))
    }
    pub fn hosts(&self) -> impl Iterator<Item=&Node> + '_ {
        self.nodes().filter(|n| n.kind == NodeKind::Host)
    }
    pub fn switches(&self) -> impl Iterator<Item=&Node> + '_ {
        self.nodes().filter(|n| n.kind == NodeKind::Switch)
    }
    /// Nodes without any link, in natural id order.
    pub fn isolated(&self) -> impl Iterator<Item=&Node> + '_ {
        let linked = self.links.values()
            .flat_map(|link| vec![link.a(), link.b()])
            .collect::<HashSet<_>>();
        self.nodes().filter(move |node| !linked.contains(&node.id))
    }
    pub fn link_between(&self, a: &NodeId, b: &NodeId) -> Option<&Link> {
        self.pairs.get(&unordered(a, b))
            .and_then(|id| self.links.get(id))
    }
    pub fn links_of<'a>(&'a self, node: &'a NodeId) -> impl Iterator<Item=&'a Link> + 'a {
        self.links().filter(move |link| link.touches(node))
    }
    pub fn neighbors<'a>(&'a self, node: &'a NodeId) -> impl Iterator<Item=&'a NodeId> + 'a {
        self.links_of(node)
            .filter_map(move |link| link.other(node))
            .sorted()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
        self.touch();
    }
    pub fn set_created(&mut self, created: Option<DateTime<Utc>>) {
        self.created = created;
        self.touch();
    }

    pub fn add_node(&mut self, kind: NodeKind, label: Option<String>,
                    position: Option<Position>) -> Result<NodeId> {
        self.ensure_node_room()?;
        let id = NodeId::from(self.fresh_node_name(kind));
        let label = label.unwrap_or_else(|| id.to_string());
        let node = Node::new(id.clone(), kind, label, position.unwrap_or_default());
        self.nodes.insert(id.clone(), node);
        self.touch();
        debug!(node = %id, %kind, "added node");
        Ok(id)
    }
    pub fn remove_node(&mut self, id: &NodeId) -> Result<Removed> {
        let node = self.nodes.remove(id)
            .ok_or_else(|| Error::NotFound("node", id.to_string()))?;
        let doomed = self.links.values()
            .filter(|link| link.touches(id))
            .map(|link| link.id.clone())
            .collect::<Vec<_>>();
        let links = doomed.iter()
            .filter_map(|link| self.detach_link(link))
            .sorted_by(|l1, l2| l1.id.cmp(&l2.id))
            .collect::<Vec<_>>();
        self.touch();
        debug!(node = %id, cascaded = links.len(), "removed node");
        Ok(Removed { node, links })
    }
    pub fn rename_node(&mut self, id: &NodeId, label: impl Into<String>) -> Result<()> {
        let node = self.nodes.get_mut(id)
            .ok_or_else(|| Error::NotFound("node", id.to_string()))?;
        node.label = label.into();
        self.touch();
        Ok(())
    }
    pub fn move_node(&mut self, id: &NodeId, position: Position) -> Result<()> {
        let node = self.nodes.get_mut(id)
            .ok_or_else(|| Error::NotFound("node", id.to_string()))?;
        node.position = position;
        self.touch();
        Ok(())
    }
    pub fn add_link(&mut self, a: &NodeId, b: &NodeId) -> Result<LinkId> {
        let id = LinkId::from(lowest_free("l", |name| self.links.contains_key(name)));
        self.insert_link(Link::new(id.clone(), a.clone(), b.clone()))?;
        Ok(id)
    }
    pub fn remove_link(&mut self, id: &LinkId) -> Result<Link> {
        let link = self.detach_link(id)
            .ok_or_else(|| Error::NotFound("link", id.to_string()))?;
        self.touch();
        debug!(link = %id, "removed link");
        Ok(link)
    }
    /// Drops every node and link, keeping metadata and limits.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
        self.pairs.clear();
        self.touch();
    }
    /// Repositions every node in natural id order. `place` receives the
    /// node's rank and the node count.
    pub(crate) fn arrange(&mut self, mut place: impl FnMut(usize, usize) -> Position) {
        let count = self.nodes.len();
        let ordered = self.nodes.values_mut()
            .sorted_by(|n1, n2| n1.id.cmp(&n2.id));
        for (rank, node) in ordered.enumerate() {
            node.position = place(rank, count);
        }
        self.touch();
    }

    /// Inserts a node under a caller-chosen id; used by the decoders.
    pub(crate) fn insert_node(&mut self, node: Node) -> Result<()> {
        if node.id.as_str().is_empty() {
            return Err(Error::malformed("node id must not be empty"));
        }
        if self.nodes.contains_key(&node.id) {
            return Err(Error::DuplicateId("node", node.id.to_string()));
        }
        self.ensure_node_room()?;
        self.nodes.insert(node.id.clone(), node);
        self.touch();
        Ok(())
    }
    pub(crate) fn insert_link(&mut self, link: Link) -> Result<()> {
        if link.id.as_str().is_empty() {
            return Err(Error::malformed("link id must not be empty"));
        }
        if self.links.contains_key(&link.id) {
            return Err(Error::DuplicateId("link", link.id.to_string()));
        }
        for end in [link.a(), link.b()].iter() {
            if !self.nodes.contains_key(*end) {
                return Err(Error::NotFound("node", end.to_string()));
            }
        }
        if link.a() == link.b() {
            return Err(Error::SelfLoop(link.a().to_string()));
        }
        let pair = link.pair();
        if let Some(existing) = self.pairs.get(&pair) {
            return Err(Error::DuplicateLink(
                link.a().to_string(), link.b().to_string(), existing.to_string()));
        }
        if self.links.len() >= self.limits.max_links {
            return Err(Error::CapacityExceeded("link", self.limits.max_links));
        }
        debug!(link = %link.id, a = %link.a(), b = %link.b(), "added link");
        self.pairs.insert(pair, link.id.clone());
        self.links.insert(link.id.clone(), link);
        self.touch();
        Ok(())
    }

    fn detach_link(&mut self, id: &LinkId) -> Option<Link> {
        let link = self.links.remove(id)?;
        self.pairs.remove(&link.pair());
        Some(link)
    }
    fn ensure_node_room(&self) -> Result<()> {
        if self.nodes.len() >= self.limits.max_nodes {
            Err(Error::CapacityExceeded("node", self.limits.max_nodes))
        } else {
            Ok(())
        }
    }
    /// Lowest `h<n>`/`s<n>` that is neither a node id nor a label.
    fn fresh_node_name(&self, kind: NodeKind) -> String {
        let labels = self.nodes.values()
            .map(|node| node.label.as_str())
            .collect::<HashSet<_>>();
        lowest_free(kind.prefix(), |name| {
            self.nodes.contains_key(name) || labels.contains(name)
        })
    }
    fn touch(&mut self) {
        self.revision += 1;
    }
}

fn unordered(a: &NodeId, b: &NodeId) -> (NodeId, NodeId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}
