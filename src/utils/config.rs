use argh::FromArgs;
use serde::{Deserialize, Serialize};

use super::file::Format;
use crate::network::{Layout, Limits};
use crate::{MAX_LINKS, MAX_NODES};

/// Build, check and convert network topologies for the Mininet emulator
#[derive(FromArgs, Debug)]
pub struct Arguments {
    /// path to configuration file
    #[argh(option, short = 'c')]
    pub config: Option<String>,
    /// override the maximum number of nodes in a topology
    #[argh(option)]
    pub max_nodes: Option<usize>,
    /// override the maximum number of links in a topology
    #[argh(option)]
    pub max_links: Option<usize>,
    /// log every change made to the topology
    #[argh(switch, short = 'v')]
    pub verbose: bool,
    #[argh(subcommand)]
    pub command: Command,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
pub enum Command {
    Check(CheckArgs),
    Convert(ConvertArgs),
    Generate(GenerateArgs),
}

/// Validate a topology file and print a summary
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "check")]
pub struct CheckArgs {
    /// topology file to check
    #[argh(positional)]
    pub input: String,
    /// input format: json, yaml or links
    #[argh(option)]
    pub format: Option<Format>,
}

/// Rewrite a topology file in another format
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "convert")]
pub struct ConvertArgs {
    /// topology file to read
    #[argh(positional)]
    pub input: String,
    /// topology file to write
    #[argh(positional)]
    pub output: String,
    /// input format: json, yaml or links
    #[argh(option)]
    pub from: Option<Format>,
    /// output format: json, yaml or links
    #[argh(option)]
    pub to: Option<Format>,
}

/// Generate a ready-made topology
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "generate")]
pub struct GenerateArgs {
    #[argh(subcommand)]
    pub shape: Shape,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
pub enum Shape {
    Flat(FlatArgs),
    Subnet(SubnetArgs),
}

/// Hosts attached to a single switch
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "flat")]
pub struct FlatArgs {
    /// number of hosts
    #[argh(option, default = "4")]
    pub hosts: usize,
    /// number of switches
    #[argh(option, default = "1")]
    pub switches: usize,
    /// topology name stored in the document
    #[argh(option)]
    pub name: Option<String>,
    /// output file
    #[argh(option, short = 'o')]
    pub output: String,
    /// output format: json, yaml or links
    #[argh(option)]
    pub format: Option<Format>,
}

/// Subnets of hosts joined by a central switch
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "subnet")]
pub struct SubnetArgs {
    /// number of subnets
    #[argh(option, default = "2")]
    pub subnets: usize,
    /// number of hosts in each subnet
    #[argh(option, default = "2")]
    pub hosts_per_subnet: usize,
    /// topology name stored in the document
    #[argh(option)]
    pub name: Option<String>,
    /// output file
    #[argh(option, short = 'o')]
    pub output: String,
    /// output format: json, yaml or links
    #[argh(option)]
    pub format: Option<Format>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub limits: Limits,
    pub layout: Layout,
}

impl Config {
    pub fn override_from_args(&mut self, args: &Arguments) {
        if let Some(max_nodes) = args.max_nodes {
            self.limits.max_nodes = num::clamp(max_nodes, 1, MAX_NODES);
        }
        if let Some(max_links) = args.max_links {
            self.limits.max_links = num::clamp(max_links, 1, MAX_LINKS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Arguments {
        Arguments::from_args(&["netsketch"], args).unwrap()
    }

    #[test]
    fn it_parses_subcommands() {
        let args = parse(&["-v", "generate", "subnet", "--hosts-per-subnet", "3", "-o", "lab.yaml"]);
        assert!(args.verbose);
        match args.command {
            Command::Generate(GenerateArgs { shape: Shape::Subnet(sub) }) => {
                assert_eq!(sub.subnets, 2);
                assert_eq!(sub.hosts_per_subnet, 3);
                assert_eq!(sub.output, "lab.yaml");
            }
            other => panic!("unexpected {:?}", other),
        }
        let args = parse(&["convert", "a.json", "b.links", "--to", "links"]);
        match args.command {
            Command::Convert(conv) => assert_eq!(conv.to, Some(Format::Links)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn it_overrides_limits_within_bounds() {
        let mut config = Config::default();
        let args = parse(&["--max-nodes", "0", "--max-links", "99999999", "check", "x.json"]);
        config.override_from_args(&args);
        assert_eq!(config.limits.max_nodes, 1);
        assert_eq!(config.limits.max_links, MAX_LINKS);
    }

    #[test]
    fn it_fills_missing_config_fields() {
        let config: Config = serde_yaml::from_str("limits:\n  max_nodes: 12\n").unwrap();
        assert_eq!(config.limits.max_nodes, 12);
        assert_eq!(config.limits.max_links, MAX_LINKS);
        assert_eq!(config.layout, Layout::default());
    }
}
