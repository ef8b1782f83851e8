//! Runs one single-decision Paxos simulation and reports what every node decided.

use std::process;

use clap::{App, Arg, ArgMatches};
use log::{error, warn};

use paxos_sim::{Cluster, Error, SimulationConfig};

fn build_config(matches: &ArgMatches) -> paxos_sim::Result<SimulationConfig> {
    let mut config = match matches.value_of("config") {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default()
    };

    if let Some(v) = matches.value_of("nodes") {
        config.nodes = parse_arg("nodes", v)?;
    }
    if let Some(v) = matches.value_of("drop") {
        config.drop_chance = parse_arg("drop", v)?;
    }
    if let Some(v) = matches.value_of("reorder") {
        config.reorder_chance = parse_arg("reorder", v)?;
    }
    if let Some(v) = matches.value_of("seed") {
        config.seed = Some(parse_arg("seed", v)?);
    }

    config.validate()?;
    Ok(config)
}

fn parse_arg<T: std::str::FromStr>(name: &str, v: &str) -> paxos_sim::Result<T> {
    v.parse().map_err(|_| Error::Config(format!("invalid value '{}' for --{}", v, name)))
}

fn run(matches: &ArgMatches) -> paxos_sim::Result<()> {
    let config = build_config(matches)?;
    let mut cluster: Cluster<String> = Cluster::from_config(&config)?;

    let values: Vec<String> = match matches.values_of("VALUES") {
        Some(vs) => vs.map(|s| s.to_string()).collect(),
        None => vec!["foo".to_string()]
    };

    for v in values {
        cluster.write(v)?;
    }

    // Competing proposers can keep each other busy forever. Report whatever was decided anyway
    let delivered = match cluster.process_queue() {
        Ok(n) => n,
        Err(Error::DeliveryLimit { delivered, pending }) => {
            warn!("Stopped after {} deliveries with {} messages still queued", delivered, pending);
            delivered
        },
        Err(e) => return Err(e)
    };

    for node in cluster.nodes() {
        let log: Vec<&str> = node.read().iter().map(|c| c.value.as_str()).collect();
        println!("{} ({}) at {}: {:?}", node.id(), node.role(), node.highest_seen(), log);
    }

    let mut consensus: Vec<(Option<String>, usize)> = cluster.get_consensus().into_iter().collect();
    consensus.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    println!("Consensus:");
    for (value, count) in consensus {
        match value {
            Some(v) => println!("  {:?}: {}", v, count),
            None => println!("  <none>: {}", count)
        }
    }

    let stats = cluster.network().stats();
    println!("Network: {} sent, {} dropped, {} delivered, {} shuffles ({} in final flush)",
        stats.sent, stats.dropped, stats.delivered, stats.shuffles, delivered);

    Ok(())
}

fn main() {
    let matches = App::new("paxos-sim")
        .about("Single-decision Paxos over a simulated unreliable network")
        .arg(Arg::with_name("config")
            .short("c")
            .long("config")
            .value_name("FILE")
            .help("TOML simulation configuration")
            .takes_value(true))
        .arg(Arg::with_name("nodes")
            .short("n")
            .long("nodes")
            .value_name("N")
            .help("Number of nodes in the cluster")
            .takes_value(true))
        .arg(Arg::with_name("drop")
            .long("drop")
            .value_name("CHANCE")
            .help("Chance out of 10 that a message is lost")
            .takes_value(true))
        .arg(Arg::with_name("reorder")
            .long("reorder")
            .value_name("CHANCE")
            .help("Chance out of 10 that a send leaves the queue alone")
            .takes_value(true))
        .arg(Arg::with_name("seed")
            .short("s")
            .long("seed")
            .value_name("SEED")
            .help("Seed for every random decision")
            .takes_value(true))
        .arg(Arg::with_name("v")
            .short("v")
            .multiple(true)
            .help("Log verbosity, repeat for more"))
        .arg(Arg::with_name("VALUES")
            .help("Values to write, one write each")
            .multiple(true))
        .get_matches();

    let level = match matches.occurrences_of("v") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace"
    };
    env_logger::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&matches) {
        error!("{}", e);
        process::exit(1);
    }
}
