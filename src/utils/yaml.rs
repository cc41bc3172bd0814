use std::fs;
use std::path::Path;

use super::config::Config;
use super::error::{Error, FileError, Result};
use super::json::TopologyDoc;
use crate::network::{Limits, Topology};


pub fn write_topology(topo: &Topology) -> Result<String> {
    serde_yaml::to_string(&TopologyDoc::capture(topo))
        .map_err(Error::malformed)
}

pub fn read_topology(text: &str, limits: Limits) -> Result<Topology> {
    let doc: TopologyDoc = serde_yaml::from_str(text)
        .map_err(Error::malformed)?;
    doc.build(limits)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<Config, FileError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|source| FileError::io(path, source))?;
    serde_yaml::from_str(&text)
        .map_err(|source| FileError::Config { path: path.to_owned(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{NodeKind, Position};

    #[test]
    fn it_round_trips_through_yaml() {
        let mut topo = Topology::named("yaml lab");
        let s1 = topo.add_node(NodeKind::Switch, None, Some(Position::new(0.5, -1.0))).unwrap();
        let h1 = topo.add_node(NodeKind::Host, Some("db".into()), None).unwrap();
        topo.add_link(&h1, &s1).unwrap();
        let text = write_topology(&topo).unwrap();
        let back = read_topology(&text, Limits::default()).unwrap();
        assert_eq!(back, topo);
        assert_eq!(back.to_json().unwrap(), topo.to_json().unwrap());
    }

    #[test]
    fn it_reads_handwritten_yaml() {
        let text = "
nodes:
  - { id: s1, kind: switch }
  - { id: h1, kind: host, x: 10, y: 20 }
links:
  - { id: l1, a: h1, b: s1 }
";
        let topo = read_topology(text, Limits::default()).unwrap();
        assert_eq!(topo.node("h1").unwrap().position(), Position::new(10.0, 20.0));
        assert_eq!(topo.link_count(), 1);
    }

    #[test]
    fn it_applies_the_same_rules_as_json() {
        let text = "
nodes:
  - { id: s1, kind: switch }
links:
  - { id: l1, a: s1, b: h4 }
";
        assert_eq!(read_topology(text, Limits::default()),
                   Err(Error::DanglingReference("l1".into(), "h4".into())));
        assert!(matches!(read_topology("nodes: 3", Limits::default()),
                         Err(Error::MalformedSchema(_))));
    }

    #[test]
    fn it_loads_the_default_config() {
        let config = load_config("data/config/default.yaml").unwrap();
        assert_eq!(config, Config::default());
    }
}
