//! The `kopt` binary: wires the CLI surface onto the driver, mirroring
//! the original's `main()` — read the graph, load the decomposition
//! library, run either a single-pass local search per `k` in
//! `[min_k, max_k]` or the iterated global search, and write the
//! resulting tour(s) in TSPLIB format to stdout.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::process::ExitCode;

use clap::Parser;

use kopt::cli::Cli;
use kopt::config::{Algorithm, Config};
use kopt::decomposition_library::DecompositionLibrary;
use kopt::driver;
use kopt::error::{KoptError, Result};
use kopt::graph::Graph;
use kopt::logging;

fn read_graph(cli: &Cli) -> Result<Graph> {
    match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| KoptError::input(format!("failed to open '{}': {}", path.display(), e)))?;
            Graph::read_tsplib(BufReader::new(file))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(KoptError::Io)?;
            Graph::read_tsplib(buf.as_bytes())
        }
    }
}

fn read_library(cli: &Cli) -> Result<DecompositionLibrary> {
    let mut library = DecompositionLibrary::new();
    for k in 2..=7 {
        let path = cli.library.join(k.to_string());
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(_) => continue,
        };
        let partial = DecompositionLibrary::read(BufReader::new(file))?;
        library = merge_libraries(library, partial);
    }
    Ok(library)
}

fn merge_libraries(
    mut into: DecompositionLibrary,
    from: DecompositionLibrary,
) -> DecompositionLibrary {
    for (graph, decomposition) in from.into_entries() {
        into.insert(graph, decomposition);
    }
    into
}

/// Writes one or more tours as a single TSPLIB tour file, mirroring the
/// original's `WriteTours`: one `TOUR_SECTION`, each tour's 1-based
/// cities followed by `-1`, then a single trailing `EOF`.
fn write_tours(mut out: impl Write, tours: &[Vec<usize>]) -> Result<()> {
    writeln!(out, "TYPE : TOUR")?;
    writeln!(out, "TOUR_SECTION")?;
    for tour in tours {
        for city in tour {
            write!(out, "{} ", city + 1)?;
        }
        writeln!(out, "-1")?;
    }
    writeln!(out, "EOF")?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let algorithm = cli.algorithm()?;
    let initial_cycle = cli.initial_cycle()?;
    let (min_k, max_k) = cli.k_range()?;

    let mut graph = read_graph(&cli)?;
    let library = read_library(&cli)?;
    let mut config = Config::new(cli.seed, algorithm, initial_cycle);
    config.shuffle_signatures = cli.shuffle_signatures;
    config.deadline_secs = cli.deadline;
    config.deadline_step_secs = cli.deadline_step;

    if cli.iterate {
        {
            let stdout = io::stdout();
            let mut log = driver::EventLog::new(stdout.lock())?;
            driver::run_global(&mut graph, &library, &mut config, Some(&mut log))?;
        }
        let tour: Vec<usize> = (0..graph.n()).map(|i| graph.cycle_node(i.into())).collect();
        write_tours(io::stdout(), &[tour])?;
    } else {
        let mut tours = Vec::new();
        for k in min_k..=max_k {
            let permutation = driver::local(k, &graph, &library, algorithm)?;
            tours.push(permutation.as_slice().to_vec());
        }
        write_tours(io::stdout(), &tours)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "kopt failed");
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
