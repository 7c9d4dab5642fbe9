use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use itertools::Itertools;
use log::{error, info};
use pairing_rust::{ClosureStrategy, ColumnOrder, DumpFile, FrameClusters, Pairing, PairingError};
use rayon::ThreadPoolBuilder;
use std::path::PathBuf;

/// Find connected clusters of atoms in a .dump file
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Dump file
    dump_file: PathBuf,

    /// Pairing cutoff distance
    #[arg(short, long)]
    cutoff: f64,

    /// Timesteps to analyze, every snapshot when omitted
    #[arg(short, long)]
    timestep: Vec<u64>,

    /// Transitive closure method
    #[arg(short, long, value_enum, default_value_t = Strategy::Components)]
    strategy: Strategy,

    /// Cluster column order
    #[arg(short, long, value_enum, default_value_t = Order::RowContent)]
    order: Order,

    /// Number of threads to run in parallel
    #[arg(short = 'j', long, default_value_t = 2)]
    threads: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    Components,
    Squaring,
}

impl From<Strategy> for ClosureStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Components => ClosureStrategy::Components,
            Strategy::Squaring => ClosureStrategy::Squaring,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Order {
    RowContent,
    FirstOccurrence,
}

impl From<Order> for ColumnOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::RowContent => ColumnOrder::RowContent,
            Order::FirstOccurrence => ColumnOrder::FirstOccurrence,
        }
    }
}

fn format_table(results: &[Result<FrameClusters, PairingError>]) -> String {
    let rows = results
        .iter()
        .filter_map(|result| match result {
            Ok(clusters) => Some(format!("{}\t{}", clusters.step, clusters.summary)),
            Err(err) => {
                error!("{err}");
                None
            }
        })
        .join("\n");
    format!("# timestep clusters sizes\n{rows}")
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let pairing = Pairing::new(cli.cutoff)?
        .with_strategy(cli.strategy.into())
        .with_order(cli.order.into());
    let dump = DumpFile::read(&cli.dump_file, &cli.timestep)?;
    let frames = dump.get_frames().context(format!(
        "Failed to extract coordinates: {}",
        cli.dump_file.to_string_lossy()
    ))?;
    info!("Loaded {} frames", frames.len());
    let tp = ThreadPoolBuilder::new().num_threads(cli.threads).build()?;
    let results = tp.install(|| pairing.analyze_frames(&frames));
    println!("{}", format_table(&results));
    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        bail!("{failed} of {} frames failed", results.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairing_rust::Frame;

    #[test]
    fn test_format_table() {
        let pairing = Pairing::new(1.0).unwrap();
        let frames = vec![
            Frame::from_coordinates(0, [[0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [4.0, 0.0, 0.0]]),
            Frame::from_coordinates(50, [[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]]),
        ];
        let mut results = pairing.analyze_frames(&frames);
        results.push(Err(PairingError::NegativeCutoff(-1.0)));
        assert_eq!(
            format_table(&results),
            "# timestep clusters sizes\n0\t2\t1 2\n50\t1\t2"
        );
    }

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::parse_from([
            "clusters",
            "dump.final",
            "--cutoff",
            "3.0",
            "-t",
            "0",
            "-t",
            "100",
            "--strategy",
            "squaring",
            "--order",
            "first-occurrence",
        ]);
        assert_eq!(cli.timestep, vec![0, 100]);
        assert_eq!(ClosureStrategy::from(cli.strategy), ClosureStrategy::Squaring);
        assert_eq!(ColumnOrder::from(cli.order), ColumnOrder::FirstOccurrence);
        assert_eq!(cli.threads, 2);
    }
}
