use std::path::PathBuf;
use anyhow::{bail, Context};
use clap::Parser;
use encoder::{render_model, Naming, PathFinder, Solution};
use log::info;
use logging::{raise_error, Level, Logger};
use network::TunnelNetwork;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Tunnel network in DOT format
    graph: PathBuf,

    /// Only check paths of exactly this length
    #[arg(short, long, allow_negative_numbers = true)]
    length: Option<i64>,

    /// Search every length up to this one (default: number of nodes - 1)
    #[arg(short, long)]
    max_length: Option<usize>,

    /// Print the formula handed to the solver
    #[arg(short = 'F', long)]
    print_formula: bool,

    /// Print the satisfying assignment position by position
    #[arg(short = 'M', long)]
    print_model: bool,

    /// Prefix for every variable name of the reduction
    #[arg(short, long)]
    namespace: Option<String>,

    /// Print progress messages
    #[arg(short, long)]
    debug: bool,

    /// Lowest level printed with --debug, from 1 (everything) to 5 (fatal errors only)
    #[arg(long, default_value_t = 1)]
    debug_level: i32,
}

impl Args {
    fn validate(&self) -> anyhow::Result<Level> {
        if self.length.is_some() && self.max_length.is_some() {
            bail!("--length and --max-length can not be used together");
        }
        match Level::from_i32(self.debug_level) {
            Some(level) => Ok(level),
            None => bail!("the debug level must be between 1 and 5, got {}", self.debug_level),
        }
    }
}

fn print_solution(network: &TunnelNetwork, solution: &Solution, finder: &PathFinder, print_model: bool) {
    println!(
        "There is a simple valid path of length {} from {} to {}:",
        solution.length,
        network.node_name(network.source()),
        network.node_name(network.destination())
    );
    for (pos, step) in solution.path.iter().enumerate() {
        println!("  {:>3}: {}", pos, step.display_with(network));
    }
    if print_model {
        print!("{}", render_model(&solution.model, finder.naming(), network, solution.length));
    }
}

// The whole context chain on one line, outermost first.
fn failure_message(err: &anyhow::Error) -> String {
    format!("{err:#}")
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let result = args
        .validate()
        .and_then(|level| run(&args, &Logger::new(args.debug, level)));
    if let Err(err) = result {
        raise_error(&failure_message(&err), Level::Fatal);
    }
}

fn run(args: &Args, logger: &Logger) -> anyhow::Result<()> {
    let network = parser::parse_network_file(&args.graph)
        .with_context(|| format!("failed to load the network from {}", args.graph.display()))?;
    logger.info(&format!(
        "loaded {} nodes and {} edges, source {}, destination {}",
        network.num_nodes(),
        network.num_edges(),
        network.node_name(network.source()),
        network.node_name(network.destination())
    ));

    let mut cfg = z3::Config::new();
    cfg.set_model_generation(true);
    let ctx = z3::Context::new(&cfg);
    let naming = match &args.namespace {
        Some(namespace) => Naming::with_namespace(&ctx, namespace.as_str()),
        None => Naming::new(&ctx),
    };
    let finder = PathFinder::with_naming(naming, &network);

    let (solution, checked) = match args.length {
        Some(length) => {
            let solution = finder
                .find(length)
                .with_context(|| format!("failed to check length {length}"))?;
            (solution, format!("of length {length}"))
        }
        None => {
            let max_length = args.max_length.unwrap_or(network.num_nodes() - 1);
            info!("searching lengths 0 to {}", max_length);
            let solution = finder.search(max_length).context("failed to search for a path")?;
            (solution, format!("of length at most {max_length}"))
        }
    };

    if args.print_formula {
        let printed = solution
            .as_ref()
            .map(|solution| i64::try_from(solution.length))
            .transpose()?
            .or(args.length);
        match printed {
            Some(length) => println!("{}", finder.formula(length)?),
            None => logger.warn("no path was found, so there is no formula to print"),
        }
    }

    match solution {
        Some(solution) => {
            print_solution(&network, &solution, &finder, args.print_model);
            logger.completed("search");
        }
        None => println!(
            "There is no simple valid path {} from {} to {}.",
            checked,
            network.node_name(network.source()),
            network.node_name(network.destination())
        ),
    }
    Ok(())
}
