//! Voter-model simulator CLI
//!
//! Runs opinion-dynamics simulations on generated graphs.
//!
//! # Example
//!
//! ```bash
//! # 200 synchronous rounds of the simple majority rule on a 10x10 torus
//! voter-sim --graph torus:10x10 --rounds 200 --seed 7
//!
//! # Asynchronous single-neighbor updates until convergence, as JSON
//! voter-sim --graph erdos-renyi:100:0.05 --voting single_neighbor \
//!     --clock exponential --until-converged --rounds 100000 --json
//!
//! # Convergence statistics over 50 seeds
//! voter-sim --graph complete:30 --init all_rand --until-converged --trials 50
//! ```

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voter_core::{Handicaps, VotingRule};
use voter_simulation::{ClockModel, InitStrategy, ModelConfig};
use voter_simulator::{run_trials, GraphSpec, Simulator, SimulatorConfig};
use voter_types::{BeliefId, Graph};

/// Voter-model simulator
///
/// Single-threaded and reproducible: the same seed always produces the same
/// run.
#[derive(Parser, Debug)]
#[command(name = "voter-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Graph to generate (complete:N, cycle:N, torus:RxC, erdos-renyi:N:P)
    #[arg(short = 'g', long, default_value = "complete:20")]
    graph: GraphSpec,

    /// Voting rule (simple, probability, weighted_prob, single_neighbor)
    #[arg(long, default_value = "simple")]
    voting: VotingRule,

    /// Clock model (discrete, exponential)
    #[arg(long, default_value = "discrete")]
    clock: ClockModel,

    /// Initialization strategy (rand_pair, all_rand, all_rand_two[:K], all_rand_n, all_unique)
    #[arg(long, default_value = "rand_pair")]
    init: InitStrategy,

    /// Probability of adopting a majority outcome (0.0-1.0)
    #[arg(long, default_value = "1.0")]
    accept: f64,

    /// Handicap multiplier for a belief, as ID=MULT. Repeatable.
    #[arg(long, value_parser = parse_handicap)]
    handicap: Vec<(BeliefId, f64)>,

    /// Number of rounds, or the round limit with --until-converged
    #[arg(short = 'r', long, default_value = "100")]
    rounds: u64,

    /// Stop as soon as the convergence target is reached
    #[arg(long)]
    until_converged: bool,

    /// Random seed for the graph and the run
    #[arg(long)]
    seed: Option<u64>,

    /// Repeat the run with consecutive seeds and summarize convergence times
    #[arg(long, default_value = "1")]
    trials: u64,

    /// Print the report as JSON instead of a text summary
    #[arg(long)]
    json: bool,
}

fn parse_handicap(s: &str) -> Result<(BeliefId, f64), String> {
    let (id, multiplier) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid handicap (expected ID=MULT): {s}"))?;
    let id: u32 = id
        .trim()
        .parse()
        .map_err(|_| format!("Invalid handicap belief id: {id}"))?;
    let multiplier: f64 = multiplier
        .trim()
        .parse()
        .map_err(|_| format!("Invalid handicap multiplier: {multiplier}"))?;
    Ok((BeliefId(id), multiplier))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so JSON output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or(ModelConfig::default().seed);

    let mut model = ModelConfig::new(args.voting, args.clock)
        .with_acceptance_probability(args.accept)
        .with_seed(seed);
    if !args.handicap.is_empty() {
        model = model.with_handicaps(args.handicap.into_iter().collect::<Handicaps>());
    }

    let mut config = SimulatorConfig::new(model).with_init(args.init);
    config = if args.until_converged {
        config.until_converged(args.rounds)
    } else {
        config.with_rounds(args.rounds)
    };

    let graph = args.graph.build(seed)?;

    info!(
        graph = %args.graph,
        nodes = graph.num_nodes(),
        edges = graph.num_edges(),
        voting = %args.voting,
        clock = %args.clock,
        init = %args.init,
        seed,
        "Starting simulation"
    );

    if args.trials > 1 {
        let summary = run_trials(&graph, &config, args.trials)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            summary.print();
        }
        return Ok(());
    }

    let report = Simulator::new(&graph, config)?.run()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_handicap() {
        assert_eq!(parse_handicap("2=0.5"), Ok((BeliefId(2), 0.5)));
        assert_eq!(parse_handicap(" 1 = 3 "), Ok((BeliefId(1), 3.0)));
        assert!(parse_handicap("2").is_err());
        assert!(parse_handicap("x=1").is_err());
        assert!(parse_handicap("1=y").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "voter-sim",
            "--graph",
            "cycle:8",
            "--voting",
            "weighted_prob",
            "--clock",
            "exponential",
            "--init",
            "all_rand_two:3",
            "--handicap",
            "1=0.5",
            "--handicap",
            "2=2",
            "--until-converged",
        ])
        .unwrap();

        assert_eq!(args.graph, GraphSpec::Cycle(8));
        assert_eq!(args.voting, VotingRule::WeightedProbability);
        assert_eq!(args.clock, ClockModel::Exponential);
        assert_eq!(args.init, InitStrategy::split(3));
        assert_eq!(args.handicap, vec![(BeliefId(1), 0.5), (BeliefId(2), 2.0)]);
        assert!(args.until_converged);
        assert_eq!(args.rounds, 100);
    }

    #[test]
    fn test_args_reject_unknown_rule() {
        assert!(Args::try_parse_from(["voter-sim", "--voting", "plurality"]).is_err());
    }
}
