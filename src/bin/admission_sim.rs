use clap::Parser;
use std::fs;
use std::path::PathBuf;
use vcdn_embed_rs::admission::{AdmissionDriver, Decision, EmbeddingSearch, SearchStrategy, SlaOrder};
use vcdn_embed_rs::heuristic::HopClusterer;
use vcdn_embed_rs::service::{TopologyBuilder, TopologyMode};
use vcdn_embed_rs::sla::ScenarioSpec;
use vcdn_embed_rs::solver::{GreedySolver, SolverExchange};

#[derive(Debug, Parser)]
#[command(
    name = "admission-sim",
    about = "Run SLA admission over a scenario.json substrate"
)]
struct Args {
    /// Path to scenario.json
    #[arg(long)]
    scenario: PathBuf,

    /// Output timeline JSON file
    #[arg(long)]
    out_json: Option<PathBuf>,

    /// Write solver exchange files for the last accepted service into this directory
    #[arg(long)]
    exchange_dir: Option<PathBuf>,

    /// Process pending SLAs in arrival order instead of popping from the end
    #[arg(long)]
    fifo: bool,

    /// Override SLA order: lifo, fifo or bandwidth_desc (wins over --fifo)
    #[arg(long)]
    order: Option<String>,

    /// Override topology mode: heuristic or full
    #[arg(long)]
    topology: Option<String>,

    /// Override search strategy: relax or exhaustive
    #[arg(long)]
    strategy: Option<String>,

    /// Override rejected threshold (0 disables)
    #[arg(long)]
    rejected_threshold: Option<usize>,

    /// Override iteration threshold (0 disables)
    #[arg(long)]
    iteration_threshold: Option<usize>,

    /// Disable logging
    #[arg(long)]
    quiet: bool,
}

fn parse_strategy(raw: Option<String>, defaults: SearchStrategy) -> SearchStrategy {
    match raw.as_deref() {
        Some("relax") => SearchStrategy::Relax,
        Some("exhaustive") => SearchStrategy::Exhaustive,
        _ => defaults,
    }
}

fn parse_order(raw: Option<String>, defaults: SlaOrder) -> SlaOrder {
    match raw.as_deref() {
        Some("lifo") => SlaOrder::Lifo,
        Some("fifo") => SlaOrder::Fifo,
        Some("bandwidth_desc") => SlaOrder::BandwidthDesc,
        _ => defaults,
    }
}

fn parse_mode(raw: Option<String>, defaults: TopologyMode) -> TopologyMode {
    match raw.as_deref() {
        Some("heuristic") => TopologyMode::Heuristic,
        Some("full") => TopologyMode::Full,
        _ => defaults,
    }
}

fn main() {
    let args = Args::parse();

    let filter = if args.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let spec = ScenarioSpec::load(&args.scenario).expect("load scenario.json");
    let mut scenario = spec.into_scenario().expect("build scenario");

    let mut config = scenario.admission.clone();
    if args.fifo {
        config.order = SlaOrder::Fifo;
    }
    config.order = parse_order(args.order, config.order);
    config.strategy = parse_strategy(args.strategy, config.strategy);
    if let Some(n) = args.rejected_threshold {
        config.rejected_threshold = n;
    }
    if let Some(n) = args.iteration_threshold {
        config.iteration_threshold = n;
    }

    scenario.topology.mode = parse_mode(args.topology, scenario.topology.mode);

    let clusterer = HopClusterer;
    let capacity = scenario.topology.gateway_capacity();
    let solver = GreedySolver;
    let builder = TopologyBuilder::new(scenario.topology, &clusterer, &capacity);
    let search = EmbeddingSearch::new(builder, &solver, &config);
    let driver = AdmissionDriver::new(config, search);

    let slas = std::mem::take(&mut scenario.slas);
    let report = driver
        .run(slas, &mut scenario.substrate)
        .expect("run admission");

    println!("trace {}", report.trace());
    println!(
        "summary accepted={} rejected={} rate={:.6}",
        report.accepted,
        report.rejected,
        report.acceptance_rate()
    );

    if let Some(dir) = args.exchange_dir {
        let last = report
            .timeline
            .iter()
            .rev()
            .find(|item| item.decision == Decision::Accepted)
            .and_then(|item| item.service.as_ref());
        match last {
            Some(service) => {
                SolverExchange::new(service, &scenario.substrate)
                    .write_to(&dir)
                    .expect("write exchange files");
                eprintln!("wrote exchange files to {}", dir.display());
            }
            None => eprintln!("no accepted service, exchange files not written"),
        }
    }

    if let Some(path) = args.out_json {
        let json = serde_json::to_string_pretty(&report).expect("serialize report");
        fs::write(&path, json).expect("write timeline json");
        eprintln!("wrote timeline to {}", path.display());
    }
}
