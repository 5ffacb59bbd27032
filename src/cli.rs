//! Command-line surface, one `clap` field per `gflags` flag the original
//! `main.cpp` declared (`--seed`, `--input`, `--library`, `--algorithm`,
//! `--initial_cycle`, `--k`/`--min_k`/`--max_k`, `--iterate`, `--deadline`,
//! `--deadline_step`, `--shuffle_signatures`).

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Algorithm, InitialCycle};
use crate::error::{KoptError, Result};

#[derive(Parser, Debug)]
#[command(name = "kopt", about = "k-opt local search for the Euclidean TSP")]
pub struct Cli {
    /// Seed for the random engine.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Input file to read (reads stdin if empty).
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Directory containing decomposition-library files named `2`..`7`.
    #[arg(long, default_value = "data/decomposition")]
    pub library: PathBuf,

    /// The algorithm to use: clever, deberg, naive, hardcoded, combined, experimental.
    #[arg(long)]
    pub algorithm: String,

    /// The initial cycle to use: identity, shuffle, or walk.
    #[arg(long = "initial_cycle", default_value = "identity")]
    pub initial_cycle: String,

    /// The k in k-opt (number of edges in the signature); shorthand for
    /// `--min_k k --max_k k`.
    #[arg(long, default_value_t = 0)]
    pub k: usize,

    /// The minimum value of k for a single-pass local search.
    #[arg(long = "min_k", default_value_t = 0)]
    pub min_k: usize,

    /// The maximum value of k for a single-pass local search.
    #[arg(long = "max_k", default_value_t = 0)]
    pub max_k: usize,

    /// Run the iterated global search instead of a single-pass local search.
    #[arg(long, default_value_t = false)]
    pub iterate: bool,

    /// Maximum running time in seconds for the iterated search.
    #[arg(long, default_value_t = 0)]
    pub deadline: u64,

    /// Deadline extension in seconds applied after each improving move.
    #[arg(long = "deadline_step", default_value_t = 0)]
    pub deadline_step: u64,

    /// Shuffle signatures with equal cost, using the seeded RNG.
    #[arg(long = "shuffle_signatures", default_value_t = false)]
    pub shuffle_signatures: bool,
}

impl Cli {
    pub fn algorithm(&self) -> Result<Algorithm> {
        Algorithm::parse(&self.algorithm)
            .ok_or_else(|| KoptError::input(format!("invalid --algorithm '{}'", self.algorithm)))
    }

    pub fn initial_cycle(&self) -> Result<InitialCycle> {
        InitialCycle::parse(&self.initial_cycle).ok_or_else(|| {
            KoptError::input(format!("invalid --initial_cycle '{}'", self.initial_cycle))
        })
    }

    /// Resolves the `--k`/`--min_k`/`--max_k` triple into the `[min, max]`
    /// range a single-pass local search should cover, rejecting anything
    /// outside `[2, 7]` unless `--iterate` is set (the iterated search
    /// ignores the k range and ranks every k from 4 to 7 itself).
    pub fn k_range(&self) -> Result<(usize, usize)> {
        let (min_k, max_k) = if self.k != 0 {
            (self.k, self.k)
        } else {
            (self.min_k, self.max_k)
        };
        if !self.iterate && !(2 <= min_k && min_k <= max_k && max_k <= 7) {
            return Err(KoptError::input("the value of k must be in range [2, 7]"));
        }
        Ok((min_k, max_k))
    }
}
