use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Limits, NodeId, NodeKind, Position, Topology};
use crate::utils::error::{Error, Result};

/// Circle on which nodes without coordinates are placed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

/// Builds the ready-made topologies offered by the editor's menu.
#[derive(Clone, Debug, Default)]
pub struct Generator {
    limits: Limits,
    layout: Layout,
}


impl Default for Layout {
    fn default() -> Self {
        Layout { center_x: 2500.0, center_y: 2500.0, radius: 500.0 }
    }
}

impl Generator {
    pub fn new(limits: Limits, layout: Layout) -> Self {
        Generator { limits, layout }
    }
    /// Every host hangs off `s1`; extra switches form a chain behind it.
    pub fn flat(&self, hosts: usize, switches: usize) -> Result<Topology> {
        if switches == 0 {
            return Err(Error::malformed("a flat topology needs at least one switch"));
        }
        let mut topo = Topology::with_limits(self.limits);
        let switches = add_many(&mut topo, NodeKind::Switch, switches)?;
        let hosts = add_many(&mut topo, NodeKind::Host, hosts)?;
        for host in hosts.iter() {
            topo.add_link(host, &switches[0])?;
        }
        for ends in switches.windows(2) {
            topo.add_link(&ends[0], &ends[1])?;
        }
        ring_layout(&mut topo, &self.layout);
        info!(hosts = hosts.len(), switches = switches.len(), "generated flat topology");
        Ok(topo)
    }
    /// One access switch per subnet, all joined by a central switch.
    pub fn subnets(&self, subnets: usize, hosts_per_subnet: usize) -> Result<Topology> {
        if subnets == 0 {
            return Err(Error::malformed("a subnet topology needs at least one subnet"));
        }
        let mut topo = Topology::with_limits(self.limits);
        let access = add_many(&mut topo, NodeKind::Switch, subnets)?;
        let central = topo.add_node(NodeKind::Switch, None, None)?;
        for switch in access.iter() {
            let hosts = add_many(&mut topo, NodeKind::Host, hosts_per_subnet)?;
            for host in hosts.iter() {
                topo.add_link(host, switch)?;
            }
        }
        for switch in access.iter() {
            topo.add_link(switch, &central)?;
        }
        ring_layout(&mut topo, &self.layout);
        info!(subnets, hosts_per_subnet, "generated subnet topology");
        Ok(topo)
    }
}

/// Spreads the nodes evenly over the layout circle in natural id order.
pub fn ring_layout(topo: &mut Topology, layout: &Layout) {
    topo.arrange(|rank, count| if count == 1 {
        Position::new(layout.center_x, layout.center_y)
    } else {
        let angle = rank as f64 * 2.0 * PI / count as f64;
        Position::new(layout.center_x + layout.radius * angle.cos(),
                      layout.center_y + layout.radius * angle.sin())
    });
}

fn add_many(topo: &mut Topology, kind: NodeKind, count: usize) -> Result<Vec<NodeId>> {
    (0..count)
        .map(|_| topo.add_node(kind, None, None))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(iter: impl Iterator<Item=String>) -> Vec<String> {
        iter.collect()
    }

    #[test]
    fn it_generates_flat() {
        let topo = Generator::default().flat(4, 1).unwrap();
        assert_eq!(topo.node_count(), 5);
        assert_eq!(topo.link_count(), 4);
        let s1 = NodeId::from("s1");
        let around = ids(topo.neighbors(&s1).map(|id| id.to_string()));
        assert_eq!(around, vec!["h1", "h2", "h3", "h4"]);
    }

    #[test]
    fn it_chains_extra_switches() {
        let topo = Generator::default().flat(2, 3).unwrap();
        assert_eq!(topo.link_count(), 4);
        assert!(topo.link_between(&"s1".into(), &"s2".into()).is_some());
        assert!(topo.link_between(&"s2".into(), &"s3".into()).is_some());
        assert!(topo.link_between(&"s1".into(), &"s3".into()).is_none());
    }

    #[test]
    fn it_generates_subnets() {
        let topo = Generator::default().subnets(2, 2).unwrap();
        assert_eq!(topo.node_count(), 7);
        assert_eq!(topo.link_count(), 6);
        let s1 = ids(topo.neighbors(&"s1".into()).map(|id| id.to_string()));
        let s2 = ids(topo.neighbors(&"s2".into()).map(|id| id.to_string()));
        let s3 = ids(topo.neighbors(&"s3".into()).map(|id| id.to_string()));
        assert_eq!(s1, vec!["h1", "h2", "s3"]);
        assert_eq!(s2, vec!["h3", "h4", "s3"]);
        assert_eq!(s3, vec!["s1", "s2"]);
    }

    #[test]
    fn it_rejects_degenerate_requests() {
        let gen = Generator::default();
        assert!(matches!(gen.flat(3, 0), Err(Error::MalformedSchema(_))));
        assert!(matches!(gen.subnets(0, 3), Err(Error::MalformedSchema(_))));
        let tight = Generator::new(Limits { max_nodes: 4, max_links: 100 }, Layout::default());
        assert_eq!(tight.flat(4, 1).unwrap_err(), Error::CapacityExceeded("node", 4));
    }

    #[test]
    fn it_places_nodes_on_a_ring() {
        let layout = Layout { center_x: 0.0, center_y: 0.0, radius: 10.0 };
        let topo = Generator::new(Limits::default(), layout).flat(3, 1).unwrap();
        for node in topo.nodes() {
            let pos = node.position();
            let dist = (pos.x() * pos.x() + pos.y() * pos.y()).sqrt();
            assert!((dist - 10.0).abs() < 1e-9);
        }
        let h1 = topo.node("h1").unwrap().position();
        assert_eq!((h1.x(), h1.y()), (10.0, 0.0));
    }

    #[test]
    fn it_centers_a_lone_node() {
        let mut topo = Topology::new();
        topo.add_node(NodeKind::Switch, None, None).unwrap();
        ring_layout(&mut topo, &Layout::default());
        assert_eq!(topo.node("s1").unwrap().position(), Position::new(2500.0, 2500.0));
    }

    #[test]
    fn it_lays_out_in_one_revision() {
        let layout = Layout { center_x: 0.0, center_y: 0.0, radius: 1.0 };
        let mut topo = Topology::new();
        for _ in 0..11 {
            topo.add_node(NodeKind::Host, None, None).unwrap();
        }
        let before = topo.revision();
        ring_layout(&mut topo, &layout);
        assert_eq!(topo.revision(), before + 1);
        // h2 comes right after h1 on the ring, h10 and h11 close it
        let h2 = topo.node("h2").unwrap().position();
        let h11 = topo.node("h11").unwrap().position();
        assert!(h2.y() > 0.0);
        assert!(h11.y() < 0.0);
    }
}
