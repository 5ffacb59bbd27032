//! The iterated k-opt search loop: prepares a cost-sorted list of candidate
//! signatures and repeatedly applies whichever one improves the tour most,
//! restarting from the cheapest candidate after every improving move.
//!
//! Grounded on `main.cpp`'s `Algo` hierarchy (`FuncAlgo`/`NaiveAlgo`/
//! `CleverAlgo`/`DeBergAlgo`), `PrepareSignatures`, `ChooseAlgo`,
//! `GenerateWalk`, `SetInitialCycle`, and `GenericGlobal`, plus
//! `clever_kopt.cpp`'s single-pass `Local`/`Kopt`.

use std::io::Write;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::config::{Algorithm, Config, InitialCycle};
use crate::de_berg::{de_berg_exponent, single_de_berg};
use crate::decomposition::{ComplexityVisitor, Decomposition, TreeWidthVisitor};
use crate::decomposition_library::DecompositionLibrary;
use crate::dependence_graph::DependenceGraph;
use crate::dynamic;
use crate::error::{KoptError, Result};
use crate::gain::GainFunc;
use crate::graph::{Graph, Weight};
use crate::identifier::SigEdge;
use crate::kmove::Kmove;
use crate::matching::{Matching, MatchingId};
use crate::naive::{experimental_3opt, naive_2opt_base, naive_3opt_base, naive_single};
use crate::permutation::Permutation;
use crate::retrieve::retrieve_permutation;

/// The ordering key the original calls `Cost()`: `(exponent, kind rank,
/// complexity estimate)`. Lower sorts first, so cheaper signatures are
/// always tried before expensive ones.
pub type Cost = (u64, u8, u128);

/// One candidate k-move signature, ready to be evaluated against a
/// [`Graph`] and, if improving, applied to it.
pub trait Algo {
    fn run(&self, graph: &Graph) -> Result<Kmove>;
    fn k(&self) -> usize;
    fn cost(&self) -> Cost;
    fn kind(&self) -> &'static str;
    fn matching_id(&self) -> &str;

    /// Evaluates this signature and, if it improves the tour, applies the
    /// move in place and returns it.
    fn improve(&self, graph: &mut Graph) -> Result<Option<Kmove>> {
        let kmove = self.run(graph)?;
        if !kmove.is_improving() {
            return Ok(None);
        }
        let matching = Matching::from_id(&kmove.matching_id)
            .ok_or_else(|| KoptError::invariant("bad matching id in kmove"))?;
        let delta = retrieve_permutation(graph.n(), &matching, &kmove.embedding)?;
        graph.permutate(&delta);
        Ok(Some(kmove))
    }
}

type HardcodedFn = fn(&Graph) -> Kmove;

/// A hand-rolled baseline (the 2-opt/3-opt closed-form bases), wrapped so
/// it can sit in the same candidate list as the general signatures.
pub struct FuncAlgo {
    f: HardcodedFn,
    kind: &'static str,
    k: usize,
    sig: MatchingId,
}

impl FuncAlgo {
    pub fn new(f: HardcodedFn, kind: &'static str, k: usize, sig: MatchingId) -> Self {
        FuncAlgo { f, kind, k, sig }
    }
}

impl Algo for FuncAlgo {
    fn run(&self, graph: &Graph) -> Result<Kmove> {
        Ok((self.f)(graph))
    }
    fn k(&self) -> usize {
        self.k
    }
    fn cost(&self) -> Cost {
        (self.k as u64, 0, 0)
    }
    fn kind(&self) -> &'static str {
        self.kind
    }
    fn matching_id(&self) -> &str {
        &self.sig
    }
}

/// A single matching, searched by brute-force enumeration of every
/// monotone embedding. Used for `--algorithm naive` and as the tree-DP/de
/// Berg correctness oracle.
pub struct NaiveAlgo {
    matching_id: MatchingId,
    k: usize,
}

impl NaiveAlgo {
    pub fn new(matching_id: MatchingId) -> Self {
        let k = matching_id.len() + 1;
        NaiveAlgo { matching_id, k }
    }
}

impl Algo for NaiveAlgo {
    fn run(&self, graph: &Graph) -> Result<Kmove> {
        let matching = Matching::from_id(&self.matching_id)
            .ok_or_else(|| KoptError::invariant("bad matching id"))?;
        Ok(naive_single(&matching, graph))
    }
    fn k(&self) -> usize {
        self.k
    }
    fn cost(&self) -> Cost {
        (self.k as u64, 3, 0)
    }
    fn kind(&self) -> &'static str {
        "naive"
    }
    fn matching_id(&self) -> &str {
        &self.matching_id
    }
}

/// A single matching, searched by the tree-DP engine over a precomputed
/// decomposition.
pub struct CleverAlgo {
    matching_id: MatchingId,
    decomposition: Decomposition,
    k: usize,
    tree_width: usize,
    constant: u128,
}

impl CleverAlgo {
    pub fn new(matching_id: MatchingId, decomposition: Decomposition, n: usize) -> Result<Self> {
        let k = matching_id.len() + 1;
        let tree_width = TreeWidthVisitor::width(&decomposition);
        let constant = ComplexityVisitor::estimate(&decomposition, n)?;
        Ok(CleverAlgo {
            matching_id,
            decomposition,
            k,
            tree_width,
            constant,
        })
    }
}

impl Algo for CleverAlgo {
    fn run(&self, graph: &Graph) -> Result<Kmove> {
        let matching = Matching::from_id(&self.matching_id)
            .ok_or_else(|| KoptError::invariant("bad matching id"))?;
        let gain_func = GainFunc::new(graph, &matching);
        let result = dynamic::run(&self.decomposition, graph.n(), gain_func);
        let gain = result.best_gain();
        if gain <= 0 {
            return Ok(Kmove::none());
        }
        let embedding = dynamic::retrieve_embedding(&result, graph.n());
        Ok(Kmove {
            gain,
            matching_id: self.matching_id.clone(),
            embedding,
        })
    }
    fn k(&self) -> usize {
        self.k
    }
    fn cost(&self) -> Cost {
        ((self.tree_width + 1) as u64, 2, self.constant)
    }
    fn kind(&self) -> &'static str {
        "clever"
    }
    fn matching_id(&self) -> &str {
        &self.matching_id
    }
}

/// A single matching, searched by the chain-interval de Berg engine.
pub struct DeBergAlgo {
    matching_id: MatchingId,
    k: usize,
    exponent: usize,
}

impl DeBergAlgo {
    pub fn new(matching_id: MatchingId) -> Result<Self> {
        let k = matching_id.len() + 1;
        let exponent = de_berg_exponent(&matching_id)?;
        Ok(DeBergAlgo {
            matching_id,
            k,
            exponent,
        })
    }
}

impl Algo for DeBergAlgo {
    fn run(&self, graph: &Graph) -> Result<Kmove> {
        single_de_berg(&self.matching_id, graph)
    }
    fn k(&self) -> usize {
        self.k
    }
    fn cost(&self) -> Cost {
        (self.exponent as u64, 1, 0)
    }
    fn kind(&self) -> &'static str {
        "deberg"
    }
    fn matching_id(&self) -> &str {
        &self.matching_id
    }
}

fn slot_edges(k: usize) -> Vec<SigEdge> {
    (0..k).map(SigEdge).collect()
}

/// Builds the [`Algo`] `--algorithm` selects for a single matching,
/// looking up its decomposition in `library` when needed.
///
/// Grounded on `ChooseAlgo` in `main.cpp`.
pub fn choose_algo(
    n: usize,
    matching: &Matching,
    library: &DecompositionLibrary,
    algorithm: Algorithm,
) -> Result<Box<dyn Algo>> {
    let id = matching.id();
    match algorithm {
        Algorithm::Naive => Ok(Box::new(NaiveAlgo::new(id))),
        Algorithm::Clever => {
            let dg = DependenceGraph::from_matching(matching);
            let decomposition = library.get(&dg, &slot_edges(matching.k()));
            Ok(Box::new(CleverAlgo::new(id, decomposition, n)?))
        }
        Algorithm::DeBerg => Ok(Box::new(DeBergAlgo::new(id)?)),
        Algorithm::Combined => {
            let dg = DependenceGraph::from_matching(matching);
            let decomposition = library.get(&dg, &slot_edges(matching.k()));
            let clever = CleverAlgo::new(id.clone(), decomposition, n)?;
            let deberg = DeBergAlgo::new(id)?;
            if clever.cost() < deberg.cost() {
                Ok(Box::new(clever))
            } else {
                Ok(Box::new(deberg))
            }
        }
        Algorithm::Hardcoded | Algorithm::Experimental => Err(KoptError::invariant(
            "choose_algo only supports algorithms that generalize across every matching",
        )),
    }
}

/// The full candidate list: hardcoded 2-opt/3-opt bases first, then every
/// irreducible matching on `k = 4..=7` wrapped by `--algorithm`'s engine,
/// sorted cheapest-first, with an optional shuffle of equal-cost runs.
///
/// Grounded on `PrepareSignatures` in `main.cpp`.
pub fn prepare_signatures(
    n: usize,
    library: &DecompositionLibrary,
    config: &mut Config,
) -> Result<Vec<Box<dyn Algo>>> {
    let mut signatures: Vec<Box<dyn Algo>> = Vec::new();
    signatures.push(Box::new(FuncAlgo::new(
        naive_2opt_base,
        "hardcoded",
        2,
        "#2".to_string(),
    )));
    signatures.push(Box::new(FuncAlgo::new(
        naive_3opt_base,
        "hardcoded",
        3,
        "#3".to_string(),
    )));
    for k in 4..=7 {
        let mut matching = Matching::new(k);
        while matching.next_irreducible() {
            signatures.push(choose_algo(n, &matching, library, config.algorithm)?);
        }
    }
    signatures[2..].sort_by_key(|algo| algo.cost());
    if config.shuffle_signatures {
        shuffle_equal_cost_runs(&mut signatures[2..], &mut config.rng);
    }
    Ok(signatures)
}

/// Shuffles each maximal run of equal-cost signatures in place, keeping
/// cheaper runs strictly before more expensive ones.
fn shuffle_equal_cost_runs(signatures: &mut [Box<dyn Algo>], rng: &mut impl Rng) {
    use rand::seq::SliceRandom;
    let mut start = 0;
    while start < signatures.len() {
        let mut end = start + 1;
        while end < signatures.len() && signatures[end].cost() == signatures[start].cost() {
            end += 1;
        }
        signatures[start..end].shuffle(rng);
        start = end;
    }
}

/// Greedy nearest-neighbour walk: starts from a random city and always
/// steps to a uniformly random choice among the 5 nearest unvisited
/// cities, producing a reasonable (if not optimal) initial cycle.
///
/// Grounded on `GenerateWalk` in `main.cpp`.
pub fn generate_walk(graph: &mut Graph, rng: &mut impl Rng) -> Result<()> {
    let n = graph.n();
    let mut visited = vec![false; n];
    let mut at = rng.gen_range(0..n);
    visited[at] = true;
    let mut cycle = Vec::with_capacity(n);
    cycle.push(at);
    while cycle.len() < n {
        let mut candidates: Vec<(Weight, usize)> = (0..n)
            .filter(|&i| !visited[i])
            .map(|i| (graph.d(at, i), i))
            .collect();
        candidates.sort_by_key(|&(dist, _)| dist);
        let pick = rng.gen_range(0..candidates.len().min(5));
        at = candidates[pick].1;
        visited[at] = true;
        cycle.push(at);
    }
    graph.set_permutation(Permutation::new(cycle)?);
    Ok(())
}

/// Applies `--initial-cycle`'s choice to `graph` before a search begins.
pub fn set_initial_cycle(graph: &mut Graph, config: &mut Config) -> Result<()> {
    match config.initial_cycle {
        InitialCycle::Identity => Ok(()),
        InitialCycle::Shuffle => {
            graph.set_permutation(Permutation::random(graph.n(), &mut config.rng));
            Ok(())
        }
        InitialCycle::Walk => generate_walk(graph, &mut config.rng),
    }
}

/// Writes one CSV row per improving move: `time,weight,k,method,exponent,
/// signature`, mirroring `main.cpp`'s `PrintHeader`/`PrintStep`.
pub struct EventLog<W: Write> {
    writer: csv::Writer<W>,
    start: Instant,
}

impl<W: Write> EventLog<W> {
    pub fn new(writer: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        writer.write_record(["time", "weight", "k", "method", "exponent", "signature"])?;
        Ok(EventLog {
            writer,
            start: Instant::now(),
        })
    }

    pub fn record(&mut self, weight: Weight, algo: &dyn Algo) -> Result<()> {
        let elapsed = self.start.elapsed().as_secs_f64();
        self.writer.write_record([
            elapsed.to_string(),
            weight.to_string(),
            algo.k().to_string(),
            algo.kind().to_string(),
            algo.cost().0.to_string(),
            algo.matching_id().to_string(),
        ])?;
        self.writer.flush()?;
        tracing::info!(
            weight,
            k = algo.k(),
            method = algo.kind(),
            signature = algo.matching_id(),
            "improving move applied"
        );
        Ok(())
    }
}

/// The iterated global search: sets the initial cycle, prepares the
/// candidate list, and repeatedly applies the first improving signature
/// found, restarting from the top of the list every time, until either no
/// signature improves or the deadline elapses.
///
/// Grounded on `GenericGlobal` in `main.cpp`.
pub fn run_global<W: Write>(
    graph: &mut Graph,
    library: &DecompositionLibrary,
    config: &mut Config,
    mut log: Option<&mut EventLog<W>>,
) -> Result<()> {
    set_initial_cycle(graph, config)?;
    let signatures = prepare_signatures(graph.n(), library, config)?;
    let start = Instant::now();
    let mut deadline = Duration::from_secs(if config.deadline_secs > 0 {
        config.deadline_secs
    } else {
        config.deadline_step_secs
    });
    let mut idx = 0;
    while idx < signatures.len() {
        if deadline.as_secs() > 0 && start.elapsed() >= deadline {
            break;
        }
        if signatures[idx].improve(graph)?.is_some() {
            if let Some(log) = log.as_deref_mut() {
                log.record(graph.cycle_weight(), signatures[idx].as_ref())?;
            }
            if config.deadline_step_secs > 0 {
                let extended = start.elapsed() + Duration::from_secs(config.deadline_step_secs);
                deadline = deadline.max(extended);
            }
            idx = 0;
        } else {
            idx += 1;
        }
    }
    Ok(())
}

/// A single non-iterated pass for one fixed `k`: the best move `--
/// algorithm` finds among every matching on `k` removed edges, applied on
/// top of `graph`'s current tour (without mutating `graph`).
///
/// Grounded on `Local` in `main.cpp` and `LocalClever`/`LocalNaive` in
/// `clever_kopt.cpp`.
pub fn local(
    k: usize,
    graph: &Graph,
    library: &DecompositionLibrary,
    algorithm: Algorithm,
) -> Result<Permutation> {
    let kmove = match algorithm {
        Algorithm::Hardcoded => match k {
            2 => naive_2opt_base(graph),
            3 => naive_3opt_base(graph),
            _ => return Err(KoptError::input(format!("no hardcoded algorithm for k = {}", k))),
        },
        Algorithm::Experimental => {
            if k == 3 {
                experimental_3opt(graph)?
            } else {
                return Err(KoptError::input(format!(
                    "no experimental algorithm for k = {}",
                    k
                )));
            }
        }
        _ => best_signature_for_k(k, graph, library, algorithm)?,
    };
    if !kmove.is_improving() {
        return Ok(graph.permutation().clone());
    }
    let matching = Matching::from_id(&kmove.matching_id)
        .ok_or_else(|| KoptError::invariant("bad matching id in kmove"))?;
    let delta = retrieve_permutation(graph.n(), &matching, &kmove.embedding)?;
    Ok(graph.permutation().compose(&delta))
}

fn best_signature_for_k(
    k: usize,
    graph: &Graph,
    library: &DecompositionLibrary,
    algorithm: Algorithm,
) -> Result<Kmove> {
    let mut best = Kmove::none();
    let mut matching = Matching::new(k);
    while matching.next_irreducible() {
        let algo = choose_algo(graph.n(), &matching, library, algorithm)?;
        let candidate = algo.run(graph)?;
        if candidate.gain > best.gain {
            best = candidate;
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Point;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn crossed_square() -> Graph {
        Graph::new(vec![
            Point { x: 0.0, y: 0.0 },
            Point { x: 10.0, y: 10.0 },
            Point { x: 0.0, y: 10.0 },
            Point { x: 10.0, y: 0.0 },
        ])
    }

    #[test]
    fn local_two_opt_hardcoded_fixes_the_crossed_square() {
        let graph = crossed_square();
        let library = DecompositionLibrary::new();
        let permutation = local(2, &graph, &library, Algorithm::Hardcoded).unwrap();
        let mut fixed = graph.clone();
        fixed.set_permutation(permutation);
        assert!(fixed.cycle_weight() < graph.cycle_weight());
    }

    #[test]
    fn generate_walk_visits_every_city_once() {
        let mut graph = crossed_square();
        let mut rng = StdRng::seed_from_u64(7);
        generate_walk(&mut graph, &mut rng).unwrap();
        let mut seen: Vec<usize> = (0..graph.n()).map(|i| graph.cycle_node(crate::identifier::CycleNode(i))).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn prepare_signatures_sorts_by_cost_after_the_hardcoded_pair() {
        let graph = crossed_square();
        let library = DecompositionLibrary::new();
        let mut config = Config::new(1, Algorithm::DeBerg, InitialCycle::Identity);
        let signatures = prepare_signatures(graph.n(), &library, &mut config).unwrap();
        assert_eq!(signatures[0].matching_id(), "#2");
        assert_eq!(signatures[1].matching_id(), "#3");
        for pair in signatures[2..].windows(2) {
            assert!(pair[0].cost() <= pair[1].cost());
        }
    }

    #[test]
    fn event_log_writes_a_header_and_one_row_per_record() {
        let mut buf = Vec::new();
        {
            let mut log = EventLog::new(&mut buf).unwrap();
            let algo = FuncAlgo::new(naive_2opt_base, "hardcoded", 2, "a".to_string());
            log.record(42, &algo).unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("time,weight,k,method,exponent,signature"));
    }

    fn slot_edges(k: usize) -> Vec<SigEdge> {
        (0..k).map(SigEdge).collect()
    }

    /// Scenario-adjacent: the combined algorithm (min of the tree-DP and de
    /// Berg cost estimates) must never find a worse gain than the naive
    /// brute-force oracle on the same signature.
    #[test]
    fn combined_never_picks_a_worse_signature_than_either_engine_alone() {
        let n = 7;
        let graph = random_graph(n, 99);
        let k = 4;
        let mut matching = Matching::new(k);
        while matching.next_irreducible() {
            let dg = DependenceGraph::from_matching(&matching);
            let mut library = DecompositionLibrary::new();
            let decomposition = library.get(&dg, &slot_edges(k));
            library.insert(dg, decomposition);

            let combined = choose_algo(n, &matching, &library, Algorithm::Combined).unwrap();
            let naive = choose_algo(n, &matching, &library, Algorithm::Naive).unwrap();

            let combined_move = combined.run(&graph).unwrap();
            let naive_move = naive.run(&graph).unwrap();
            assert_eq!(combined_move.gain, naive_move.gain, "matching={}", matching.id());
        }
    }

    fn random_graph(n: usize, seed: u64) -> Graph {
        let mut rng = StdRng::seed_from_u64(seed);
        let points = (0..n)
            .map(|_| Point {
                x: rng.gen_range(0.0..500.0),
                y: rng.gen_range(0.0..500.0),
            })
            .collect();
        Graph::new(points)
    }

    /// Scenario 1: identity cycle on a unit square is already 2-opt optimal.
    #[test]
    fn unit_square_identity_is_already_optimal() {
        let graph = Graph::new(vec![
            Point { x: 0.0, y: 0.0 },
            Point { x: 0.0, y: 1.0 },
            Point { x: 1.0, y: 1.0 },
            Point { x: 1.0, y: 0.0 },
        ]);
        assert_eq!(graph.cycle_weight(), 4);
        let library = DecompositionLibrary::new();
        let permutation = local(2, &graph, &library, Algorithm::Hardcoded).unwrap();
        assert_eq!(permutation, *graph.permutation());
    }

    /// Scenario 2: the crossed square's identity cycle (weight 6 after
    /// rounding) is fixed to weight 4 by a single 2-opt pass.
    #[test]
    fn crossed_square_is_fixed_by_a_single_two_opt_pass() {
        let graph = crossed_square();
        assert_eq!(graph.cycle_weight(), 6);
        let library = DecompositionLibrary::new();
        let permutation = local(2, &graph, &library, Algorithm::Hardcoded).unwrap();
        let mut fixed = graph.clone();
        fixed.set_permutation(permutation);
        assert_eq!(fixed.cycle_weight(), 4);
    }

    /// Scenario 3: a regular pentagon's identity tour, which visits the
    /// vertices in order, is already optimal — any rotation reaches the
    /// same weight.
    #[test]
    fn regular_pentagon_identity_tour_is_optimal() {
        let graph = Graph::new(vec![
            Point { x: 100.0, y: 0.0 },
            Point { x: 31.0, y: 95.0 },
            Point { x: -81.0, y: 59.0 },
            Point { x: -81.0, y: -59.0 },
            Point { x: 31.0, y: -95.0 },
        ]);
        let expected: i64 = 5 * graph.d(0, 1);
        assert_eq!(graph.cycle_weight(), expected);

        let library = DecompositionLibrary::new();
        for k in 4..=5 {
            let permutation = local(k, &graph, &library, Algorithm::Clever).unwrap();
            assert_eq!(permutation, *graph.permutation(), "k = {}", k);
        }
    }

    fn convex_octagon() -> Graph {
        let n = 8;
        let points = (0..n)
            .map(|i| {
                let theta = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
                Point {
                    x: 100.0 * theta.cos(),
                    y: 100.0 * theta.sin(),
                }
            })
            .collect();
        Graph::new(points)
    }

    /// Scenario 4: from a shuffled start, the iterated clever search
    /// converges to the convex-hull tour (the perimeter, which is also the
    /// global optimum for points already in convex position).
    #[test]
    fn iterated_clever_search_converges_to_the_convex_hull_tour() {
        let hull = convex_octagon();
        let perimeter = hull.cycle_weight();

        let mut graph = hull.clone();
        let library = DecompositionLibrary::new();
        let mut config = Config::new(1, Algorithm::Clever, InitialCycle::Shuffle);
        run_global::<std::io::Sink>(&mut graph, &library, &mut config, None).unwrap();

        assert_eq!(graph.cycle_weight(), perimeter);
    }

    /// Scenario 5: clever and de Berg must agree on the weight reached
    /// after one full sweep of k = 4..=5 on a random instance, regardless
    /// of which permutation each engine prefers along the way.
    #[test]
    fn clever_and_de_berg_reach_equal_weight_on_a_random_instance() {
        let library = DecompositionLibrary::new();

        let mut clever_graph = random_graph(10, 2024);
        let mut deberg_graph = clever_graph.clone();

        for k in 4..=5 {
            let permutation = local(k, &clever_graph, &library, Algorithm::Clever).unwrap();
            clever_graph.set_permutation(permutation);
        }
        for k in 4..=5 {
            let permutation = local(k, &deberg_graph, &library, Algorithm::DeBerg).unwrap();
            deberg_graph.set_permutation(permutation);
        }

        assert_eq!(clever_graph.cycle_weight(), deberg_graph.cycle_weight());
    }

    /// Scenario 6: the iterated driver never makes the tour worse than the
    /// identity start, and its logged events strictly decrease in weight.
    #[test]
    fn iterated_search_is_monotone_and_never_worsens_the_identity_tour() {
        let graph = random_graph(13, 4242);
        let identity_weight = graph.cycle_weight();

        let mut working = graph.clone();
        let library = DecompositionLibrary::new();
        let mut config = Config::new(4242, Algorithm::Clever, InitialCycle::Identity);
        let mut log = Vec::new();
        {
            let mut event_log = EventLog::new(&mut log).unwrap();
            run_global(&mut working, &library, &mut config, Some(&mut event_log)).unwrap();
        }

        assert!(working.cycle_weight() <= identity_weight);

        let text = String::from_utf8(log).unwrap();
        let mut weights = Vec::new();
        for line in text.lines().skip(1) {
            let weight: i64 = line.split(',').nth(1).unwrap().parse().unwrap();
            weights.push(weight);
        }
        for pair in weights.windows(2) {
            assert!(pair[1] < pair[0], "event log weights must strictly decrease: {:?}", weights);
        }
    }

    /// Idempotence: once `run_global` converges, a second pass over the
    /// same cycle finds nothing further to improve and leaves the
    /// permutation untouched.
    #[test]
    fn a_converged_cycle_is_idempotent_under_a_further_pass() {
        let mut graph = random_graph(9, 77);
        let library = DecompositionLibrary::new();
        let mut config = Config::new(77, Algorithm::Clever, InitialCycle::Identity);
        run_global::<std::io::Sink>(&mut graph, &library, &mut config, None).unwrap();

        let converged = graph.permutation().clone();
        let weight_before = graph.cycle_weight();

        let mut config2 = Config::new(77, Algorithm::Clever, InitialCycle::Identity);
        let mut log = Vec::new();
        {
            let mut event_log = EventLog::new(&mut log).unwrap();
            run_global(&mut graph, &library, &mut config2, Some(&mut event_log)).unwrap();
        }

        assert_eq!(graph.cycle_weight(), weight_before);
        assert_eq!(*graph.permutation(), converged);
        let text = String::from_utf8(log).unwrap();
        assert_eq!(text.lines().count(), 1, "no improvement rows should be logged");
    }
}
