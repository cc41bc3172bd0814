use std::convert::TryFrom;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::network::generate::ring_layout;
use crate::network::{Layout, Limits, Link, Node, NodeId, NodeKind, Position, Topology};
use crate::utils::error::{Error, Result};


/// On-disk shape of a topology, shared by the JSON and YAML codecs.
#[derive(Serialize, Deserialize, Debug)]
pub(crate) struct TopologyDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created: Option<DateTime<Utc>>,
    nodes: Vec<NodeDoc>,
    links: Vec<LinkDoc>,
}

#[derive(Serialize, Deserialize, Debug)]
struct NodeDoc {
    id: String,
    kind: NodeKind,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

#[derive(Serialize, Deserialize, Debug)]
struct LinkDoc {
    id: String,
    a: String,
    b: String,
}


impl TopologyDoc {
    pub(crate) fn capture(topo: &Topology) -> Self {
        let nodes = topo.nodes()
            .map(|node| NodeDoc {
                id: node.id().to_string(),
                kind: node.kind(),
                label: Some(node.label().to_owned()),
                x: node.position().x(),
                y: node.position().y(),
            })
            .collect();
        let links = topo.links()
            .map(|link| LinkDoc {
                id: link.id().to_string(),
                a: link.a().to_string(),
                b: link.b().to_string(),
            })
            .collect();
        TopologyDoc {
            name: topo.name().map(str::to_owned),
            created: topo.created(),
            nodes,
            links,
        }
    }
    /// Builds a topology from the document, stopping at the first
    /// structural error. Nothing escapes unless every check passes.
    pub(crate) fn build(self, limits: Limits) -> Result<Topology> {
        let mut topo = Topology::with_limits(limits);
        topo.set_name(self.name);
        topo.set_created(self.created);
        for NodeDoc { id, kind, label, x, y } in self.nodes {
            let label = label.unwrap_or_else(|| id.clone());
            topo.insert_node(Node::new(id.into(), kind, label, Position::new(x, y)))?;
        }
        for doc in self.links {
            if doc.id.is_empty() {
                return Err(Error::malformed("link id must not be empty"));
            }
            if topo.link(&doc.id).is_some() {
                return Err(Error::DuplicateId("link", doc.id));
            }
            if let Some(end) = [&doc.a, &doc.b].iter().find(|end| !topo.contains_node(end)) {
                return Err(Error::DanglingReference(doc.id.clone(), end.to_string()));
            }
            topo.insert_link(Link::new(doc.id.into(), doc.a.into(), doc.b.into()))?;
        }
        Ok(topo)
    }
}

/// Pretty-printed canonical document, nodes and links in natural id order.
pub fn write_topology(topo: &Topology) -> Result<String> {
    let mut text = serde_json::to_string_pretty(&TopologyDoc::capture(topo))
        .map_err(Error::malformed)?;
    text.push('\n');
    Ok(text)
}

pub fn read_topology(text: &str, limits: Limits) -> Result<Topology> {
    let doc: TopologyDoc = serde_json::from_str(text)
        .map_err(Error::malformed)?;
    doc.build(limits)
}

/// The original editor's save format: one sorted `[a, b]` pair per line.
/// Isolated nodes have no representation and are left out. Every linked
/// node's id prefix must match its kind, since that is all a reader has.
pub fn write_link_list(topo: &Topology) -> Result<String> {
    let unreadable = topo.links()
        .flat_map(|link| vec![link.a(), link.b()])
        .unique()
        .sorted()
        .filter_map(|id| topo.node(id.as_str()))
        .find(|node| NodeKind::infer(node.id().as_str()) != Some(node.kind()));
    if let Some(node) = unreadable {
        return Err(Error::malformed(format!(
            "{} `{}` would not read back from a link list", node.kind(), node.id())));
    }
    let lines = topo.links()
        .map(|link| if link.a() <= link.b() {
            (link.a(), link.b())
        } else {
            (link.b(), link.a())
        })
        .sorted()
        .map(|(a, b)| format!("   [{}, {}]", quote(a), quote(b)))
        .join(",\n");
    if lines.is_empty() {
        Ok("[\n]\n".to_owned())
    } else {
        Ok(format!("[\n{}\n]\n", lines))
    }
}

/// Reads a link list, inferring each node's kind from its id prefix and
/// placing the nodes on the layout ring.
pub fn read_link_list(text: &str, limits: Limits, layout: &Layout) -> Result<Topology> {
    let pairs: Vec<Vec<String>> = serde_json::from_str(text)
        .map_err(Error::malformed)?;
    let mut ends = Vec::with_capacity(pairs.len());
    for (nth, pair) in pairs.into_iter().enumerate() {
        match <[String; 2]>::try_from(pair) {
            Ok([a, b]) => ends.push((NodeId::from(a), NodeId::from(b))),
            Err(pair) => return Err(Error::malformed(format!(
                "connection #{} has {} ends instead of 2", nth + 1, pair.len()))),
        }
    }
    let mut topo = Topology::with_limits(limits);
    let ids = ends.iter()
        .flat_map(|(a, b)| vec![a, b])
        .unique()
        .sorted()
        .cloned()
        .collect::<Vec<_>>();
    for id in ids {
        let kind = NodeKind::infer(id.as_str()).ok_or_else(|| Error::malformed(format!(
            "cannot tell whether `{}` is a host or a switch", id)))?;
        let label = id.to_string();
        topo.insert_node(Node::new(id, kind, label, Position::default()))?;
    }
    for (a, b) in ends.iter() {
        topo.add_link(a, b)?;
    }
    ring_layout(&mut topo, layout);
    Ok(topo)
}

fn quote(id: &NodeId) -> String {
    serde_json::Value::from(id.as_str()).to_string()
}

impl Topology {
    /// See [`write_topology`].
    pub fn to_json(&self) -> Result<String> {
        write_topology(self)
    }
    /// See [`read_topology`]; uses the default limits.
    pub fn from_json(text: &str) -> Result<Self> {
        read_topology(text, Limits::default())
    }
}
