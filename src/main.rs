use std::process;

use chrono::Utc;
use itertools::Itertools;
use netsketch::utils::config::{Arguments, Command, Config, Shape};
use netsketch::utils::yaml;
use netsketch::{load, save, FileError, Format, Generator, Topology};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let args: Arguments = argh::from_env();
    init_tracing(args.verbose);

    let result = load_config(&args)
        .and_then(|config| run(args.command, &config));
    if let Err(err) = result {
        error!("{}", err);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("netsketch={}", level))))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(args: &Arguments) -> Result<Config, FileError> {
    let mut config = match &args.config {
        Some(path) => yaml::load_config(path)?,
        None       => Config::default(),
    };
    config.override_from_args(args);
    info!(max_nodes = config.limits.max_nodes, max_links = config.limits.max_links,
          "configured limits");
    Ok(config)
}

fn run(command: Command, config: &Config) -> Result<(), FileError> {
    match command {
        Command::Check(check) => {
            let topo = load(&check.input, check.format, config)?;
            print!("{}", summarize(&topo));
        }
        Command::Convert(conv) => {
            let topo = load(&conv.input, conv.from, config)?;
            store(&conv.output, &topo, conv.to)?;
        }
        Command::Generate(gen) => {
            let generator = Generator::new(config.limits, config.layout.clone());
            let (mut topo, name, output, format) = match gen.shape {
                Shape::Flat(flat) => (generator.flat(flat.hosts, flat.switches)?,
                                      flat.name, flat.output, flat.format),
                Shape::Subnet(sub) => (generator.subnets(sub.subnets, sub.hosts_per_subnet)?,
                                       sub.name, sub.output, sub.format),
            };
            if name.is_some() {
                topo.set_name(name);
                topo.set_created(Some(Utc::now()));
            }
            store(&output, &topo, format)?;
        }
    }
    Ok(())
}

fn store(path: &str, topo: &Topology, format: Option<Format>) -> Result<(), FileError> {
    let lossy = format == Some(Format::Links)
        || (format.is_none() && Format::from_path(path.as_ref()) == Some(Format::Links));
    let isolated = topo.isolated().count();
    if lossy && isolated > 0 {
        warn!(isolated, "link lists cannot hold unconnected nodes, dropping them");
    }
    save(path, topo, format)
}

fn summarize(topo: &Topology) -> String {
    let isolated = topo.isolated()
        .map(|node| node.id())
        .join(", ");
    let mut lines = vec![
        format!("topology {}", topo.name().unwrap_or("(unnamed)")),
        format!("- nodes: {} ({} hosts, {} switches)",
                topo.node_count(), topo.hosts().count(), topo.switches().count()),
        format!("- links: {}", topo.link_count()),
    ];
    if !isolated.is_empty() {
        lines.push(format!("- isolated: {}", isolated));
    }
    lines.join("\n") + "\n"
}
