//! The "de Berg" embedding engine: an alternative to the tree-DP engine in
//! `crate::dynamic` that exploits a signature's chain structure directly
//! instead of going through a general tree decomposition. Faster for
//! signatures whose dependence graph reduces to long chains (the common
//! case for k-opt matchings with few "crossing" reconnections), since each
//! chain resolves with a single linear-time interval DP rather than a
//! generic bag-indexed table.
//!
//! Grounded on `de_berg.h`/`de_berg.cpp` of the original k-opt engine.

use crate::embedding::SlowEmbedding;
use crate::error::Result;
use crate::graph::{Graph, Weight};
use crate::identifier::{CycleEdge, SigEdge, SigNode};
use crate::kmove::Kmove;
use crate::matching::{Matching, MatchingId};

/// A monotone subset of `{0, ..., n}` with a fixed sentinel `n` appended:
/// the positions assigned to a signature's independently-searched
/// ("dependent") removed-edge slots, plus the cycle's wraparound point.
#[derive(Clone, Debug)]
struct FastSubset {
    k: usize,
    v: Vec<i64>,
}

impl FastSubset {
    fn new(k: usize, n: i64) -> Self {
        let mut v: Vec<i64> = (0..k as i64).collect();
        v.push(n);
        FastSubset { k, v }
    }

    fn next(&mut self) -> bool {
        let mut i = 0;
        while i < self.k && self.v[i] + 1 == self.v[i + 1] {
            self.v[i] = i as i64;
            i += 1;
        }
        if i < self.k {
            self.v[i] += 1;
            true
        } else {
            false
        }
    }

    fn get(&self, idx: usize) -> i64 {
        self.v[idx]
    }

    /// Maps a signature-node id (or the `<0`/`>=2k` out-of-range
    /// sentinels) to a concrete cycle position.
    fn map_node(&self, x: i64) -> i64 {
        if x < 0 {
            0
        } else if x < 2 * self.k as i64 {
            self.v[(x / 2) as usize] + x % 2
        } else {
            self.v[self.k]
        }
    }
}

fn cyclic_node(graph: &Graph, pos: i64) -> usize {
    let n = graph.n() as i64;
    let p = if pos == n { 0 } else { pos };
    graph.cycle_node(crate::identifier::CycleNode(p as usize))
}

fn cyclic_dist(graph: &Graph, a: i64, b: i64) -> Weight {
    graph.d(cyclic_node(graph, a), cyclic_node(graph, b))
}

/// One candidate position for a chain-internal ("reduced") removed-edge
/// slot: `x`/`y` are the already-fixed reduced-coordinate neighbors it
/// would connect to if placed at cycle position `i`.
#[derive(Clone, Debug, Default)]
struct ChainEdge {
    i: i64,
    x: i64,
    y: i64,
}

impl ChainEdge {
    fn gain(&self, graph: &Graph, at: Option<i64>) -> Weight {
        let i = at.unwrap_or(self.i);
        cyclic_dist(graph, i, i + 1) - cyclic_dist(graph, i, self.x) - cyclic_dist(graph, i + 1, self.y)
    }
}

/// Dense scratch space for the per-chain interval DP, reused across every
/// chain and every outer subset considered by [`DeBergSignature::embed`].
struct DynamicTable {
    best_idx: Vec<usize>,
    gain: Vec<Weight>,
    ydim: usize,
}

impl DynamicTable {
    fn new(xdim: usize, ydim: usize) -> Self {
        DynamicTable {
            best_idx: vec![0; xdim * ydim.max(1)],
            gain: vec![0; ydim.max(1)],
            ydim: ydim.max(1),
        }
    }

    fn gain(&self, y: usize) -> Weight {
        self.gain[y]
    }

    fn set_gain(&mut self, y: usize, v: Weight) {
        self.gain[y] = v;
    }

    fn best_idx(&self, x: usize, y: usize) -> usize {
        self.best_idx[x * self.ydim + y]
    }

    fn set_best_idx(&mut self, x: usize, y: usize, v: usize) {
        self.best_idx[x * self.ydim + y] = v;
    }
}

/// One chain: a contiguous run of reduced-coordinate positions `[begin,
/// end)` that `edges.len()` slots must be assigned distinct, increasing
/// positions within, maximizing total gain.
#[derive(Clone, Debug, Default)]
struct Dynamic {
    begin: i64,
    end: i64,
    edges: Vec<ChainEdge>,
}

impl Dynamic {
    fn feasible(&self) -> bool {
        self.edges.len() as i64 <= self.end - self.begin
    }

    /// The classic "assign items to increasing slots" interval DP: for
    /// every candidate cycle position `i` in the chain's range and every
    /// edge index `j` it could be assigned to, tracks the best total gain
    /// of assigning edges `0..=j` to positions `<=i`, then walks the table
    /// backwards to recover the assignment.
    fn run(&mut self, graph: &Graph, table: &mut DynamicTable) {
        let n = (self.end - self.begin) as usize;
        let m = self.edges.len();
        for i in 0..n {
            let jmax = i.min(m - 1);
            for j in (0..=jmax).rev() {
                if i > j {
                    let prev = table.best_idx(i - 1, j);
                    table.set_best_idx(i, j, prev);
                }
                let base = if j > 0 { table.gain(j - 1) } else { 0 };
                let pos = self.begin + i as i64;
                let gain = base + self.edges[j].gain(graph, Some(pos));
                if i == j || gain > table.gain(j) {
                    table.set_gain(j, gain);
                    table.set_best_idx(i, j, i);
                }
            }
        }
        let mut i = n;
        for j in (0..m).rev() {
            i = table.best_idx(i - 1, j);
            self.edges[j].i = self.begin + i as i64;
        }
    }
}

/// One chain's fixed description (`unmapped`, built once from the
/// signature) alongside its current mapping (`mapped`) into concrete
/// cycle positions for whichever outer subset is being tried.
#[derive(Clone, Debug, Default)]
struct DynamicData {
    unmapped: Dynamic,
    mapped: Dynamic,
}

impl DynamicData {
    fn map(&mut self, subset: &FastSubset) {
        self.mapped.begin = subset.map_node(self.unmapped.begin);
        self.mapped.end = subset.map_node(self.unmapped.end);
        self.mapped.edges = self
            .unmapped
            .edges
            .iter()
            .map(|e| ChainEdge {
                i: 0,
                x: subset.map_node(e.x),
                y: subset.map_node(e.y),
            })
            .collect();
    }
}

/// Reduces a signature's `2k` endpoints into "dependent" slots (searched
/// directly, or resolved by a chain's interval DP) and the coordinate
/// space those dependent slots are renumbered into.
///
/// Grounded on `ReducedIndex` in `de_berg.cpp`: walking the matching's
/// permutation from each slot's right endpoint identifies maximal
/// alternating chains; every other slot along a chain can be dropped from
/// the combinatorial search and recovered later by the chain's own DP.
struct ReducedIndex {
    k: usize,
    l: usize,
    idx: Vec<i64>,
}

impl ReducedIndex {
    fn new(sig: &[usize]) -> Self {
        let k = sig.len() / 2;
        let mut visited = vec![false; k];
        let mut reduce = vec![false; k];
        for i in 0..k {
            let mut ep = 2 * i;
            let mut step = 0usize;
            while !visited[ep / 2] {
                visited[ep / 2] = true;
                reduce[ep / 2] = step % 2 == 1;
                ep = sig[ep ^ 1];
                step += 1;
            }
        }
        let mut idx = vec![-1i64; k];
        let mut l = 0usize;
        for i in 0..k {
            if !reduce[i] {
                idx[i] = l as i64;
                l += 1;
            }
        }
        ReducedIndex { k, l, idx }
    }

    fn dep(&self, edge: usize) -> bool {
        edge >= self.k || self.idx[edge] >= 0
    }

    fn call(&self, ep: i64) -> i64 {
        if ep < 0 {
            -1
        } else if ep < 2 * self.k as i64 {
            2 * self.idx[(ep / 2) as usize] + ep % 2
        } else {
            2 * self.l as i64
        }
    }
}

/// A matching, pre-processed for the de Berg engine: which of its `k`
/// removed-edge slots are searched directly (`del`), which pairs of
/// reduced coordinates are connected regardless of the search (`add`),
/// and the per-chain interval DPs (`dyn_chains`) that resolve everything
/// else.
pub struct DeBergSignature {
    matching: Matching,
    k: usize,
    del: Vec<usize>,
    add: Vec<(i64, i64)>,
    dyn_chains: Vec<DynamicData>,
}

impl DeBergSignature {
    pub fn new(matching: Matching) -> Self {
        let k = matching.domain().size() / 2;
        let sig: Vec<usize> = (0..2 * k).map(|i| matching.call(SigNode(i)).0).collect();
        let idx = ReducedIndex::new(&sig);

        let mut del = Vec::new();
        for i in 0..k {
            if idx.dep(i) {
                del.push(i);
            }
        }

        let mut add = Vec::new();
        for i in 0..2 * k {
            let j = sig[i];
            if i < j && idx.dep(i / 2) && idx.dep(j / 2) {
                add.push((idx.call(i as i64), idx.call(j as i64)));
            }
        }

        let mut dyn_chains = Vec::new();
        let mut i = 0usize;
        while i < k {
            if !idx.dep(i) {
                let begin = idx.call(2 * i as i64 - 1);
                let mut edges = Vec::new();
                loop {
                    edges.push(ChainEdge {
                        i: i as i64,
                        x: idx.call(sig[2 * i] as i64),
                        y: idx.call(sig[2 * i + 1] as i64),
                    });
                    i += 1;
                    if idx.dep(i) {
                        break;
                    }
                }
                let end = idx.call(2 * i as i64);
                dyn_chains.push(DynamicData {
                    unmapped: Dynamic { begin, end, edges },
                    mapped: Dynamic::default(),
                });
            }
            i += 1;
        }

        DeBergSignature {
            matching,
            k,
            del,
            add,
            dyn_chains,
        }
    }

    pub fn matching(&self) -> &Matching {
        &self.matching
    }

    /// A rough proxy for how expensive this signature is to evaluate: the
    /// number of directly-searched slots (the `O(n^del)` brute-force
    /// factor), used to order candidate signatures cheapest-first.
    pub fn del_len(&self) -> usize {
        self.del.len()
    }

    fn dyn_size(&self) -> usize {
        self.dyn_chains
            .iter()
            .map(|d| d.unmapped.edges.len())
            .max()
            .unwrap_or(0)
    }

    fn gain(&self, graph: &Graph, subset: &FastSubset, chains: &[DynamicData]) -> Weight {
        let mut gain = 0;
        for i in 0..self.del.len() {
            let pos = subset.get(i);
            gain += cyclic_dist(graph, pos, pos + 1);
        }
        for &(x, y) in &self.add {
            gain -= cyclic_dist(graph, subset.map_node(x), subset.map_node(y));
        }
        for chain in chains {
            for edge in &chain.mapped.edges {
                gain += edge.gain(graph, None);
            }
        }
        gain
    }

    fn retrieve_result(&self, subset: &FastSubset, chains: &[DynamicData]) -> Vec<i64> {
        let mut result = vec![0i64; self.k];
        for (i, &d) in self.del.iter().enumerate() {
            result[d] = subset.get(i);
        }
        for chain in chains {
            for (unmapped_edge, mapped_edge) in chain.unmapped.edges.iter().zip(chain.mapped.edges.iter()) {
                result[unmapped_edge.i as usize] = mapped_edge.i;
            }
        }
        result
    }

    /// Searches every feasible assignment of the `del` slots, running
    /// each chain's interval DP to fill in the rest, and returns the best
    /// total gain found together with the cycle position chosen for every
    /// one of the `k` removed-edge slots (empty if nothing improves).
    pub fn embed(&self, graph: &Graph) -> (Weight, Vec<i64>) {
        let n = graph.n() as i64;
        let mut best_gain: Weight = 0;
        let mut best_result = Vec::new();
        let mut table = DynamicTable::new(graph.n(), self.dyn_size());
        let mut subset = FastSubset::new(self.del.len(), n);
        let mut chains: Vec<DynamicData> = self.dyn_chains.clone();
        loop {
            let mut feasible = true;
            for chain in chains.iter_mut() {
                chain.map(&subset);
                feasible &= chain.mapped.feasible();
            }
            if feasible {
                for chain in chains.iter_mut() {
                    chain.mapped.run(graph, &mut table);
                }
                let gain = self.gain(graph, &subset, &chains);
                if gain > best_gain {
                    best_gain = gain;
                    best_result = self.retrieve_result(&subset, &chains);
                }
            }
            if !subset.next() {
                break;
            }
        }
        (best_gain, best_result)
    }
}

/// The exponent of a single matching under the de Berg engine: the number
/// of directly-searched slots plus one, mirroring `del.size() + 1` in the
/// original (the `+1` accounts for the cycle's own rotational degree of
/// freedom the outer driver search already fixes).
pub fn de_berg_exponent(matching_id: &MatchingId) -> Result<usize> {
    let matching = Matching::from_id(matching_id)
        .ok_or_else(|| crate::error::KoptError::input("bad matching id"))?;
    Ok(DeBergSignature::new(matching).del_len() + 1)
}

/// Evaluates a single matching against the current tour, returning the
/// best improving move found (or [`Kmove::none`] if none improves).
pub fn single_de_berg(matching_id: &MatchingId, graph: &Graph) -> Result<Kmove> {
    let matching = Matching::from_id(matching_id)
        .ok_or_else(|| crate::error::KoptError::input("bad matching id"))?;
    let sig = DeBergSignature::new(matching);
    let (gain, positions) = sig.embed(graph);
    if gain <= 0 {
        return Ok(Kmove::none());
    }
    let mut embedding = SlowEmbedding::new();
    for (i, &pos) in positions.iter().enumerate() {
        embedding.set(SigEdge(i), CycleEdge(pos as usize));
    }
    Ok(Kmove {
        gain,
        matching_id: matching_id.clone(),
        embedding,
    })
}

/// Every irreducible matching on `min_k..=max_k` removed edges,
/// pre-processed into a [`DeBergSignature`] and sorted cheapest-first.
pub fn generate_de_berg_signatures(min_k: usize, max_k: usize) -> Vec<DeBergSignature> {
    let mut result = Vec::new();
    for k in min_k..=max_k {
        let mut matching = Matching::new(k);
        while matching.next_irreducible() {
            result.push(DeBergSignature::new(matching.clone()));
        }
    }
    result.sort_by_key(DeBergSignature::del_len);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Point;

    fn square() -> Graph {
        Graph::new(vec![
            Point { x: 0.0, y: 0.0 },
            Point { x: 0.0, y: 10.0 },
            Point { x: 10.0, y: 10.0 },
            Point { x: 10.0, y: 0.0 },
        ])
    }

    fn crossed_square() -> Graph {
        // Identity tour visits the points out of convex-hull order, so a
        // 2-opt move should improve it.
        Graph::new(vec![
            Point { x: 0.0, y: 0.0 },
            Point { x: 10.0, y: 10.0 },
            Point { x: 0.0, y: 10.0 },
            Point { x: 10.0, y: 0.0 },
        ])
    }

    #[test]
    fn two_opt_does_not_improve_a_convex_square() {
        let graph = square();
        let sig = DeBergSignature::new(Matching::from_id("a").unwrap());
        let (gain, _) = sig.embed(&graph);
        assert_eq!(gain, 0);
    }

    #[test]
    fn two_opt_improves_a_crossed_square() {
        let graph = crossed_square();
        let sig = DeBergSignature::new(Matching::from_id("a").unwrap());
        let (gain, positions) = sig.embed(&graph);
        assert!(gain > 0);
        assert_eq!(positions.len(), 2);
    }

    #[test]
    fn single_de_berg_reports_no_move_on_already_optimal_tour() {
        let graph = square();
        let kmove = single_de_berg(&"a".to_string(), &graph).unwrap();
        assert!(!kmove.is_improving());
    }

    #[test]
    fn single_de_berg_finds_the_improving_two_opt_move() {
        let graph = crossed_square();
        let kmove = single_de_berg(&"a".to_string(), &graph).unwrap();
        assert!(kmove.is_improving());
    }

    #[test]
    fn generated_signatures_are_sorted_cheapest_first() {
        let sigs = generate_de_berg_signatures(2, 3);
        assert!(!sigs.is_empty());
        for pair in sigs.windows(2) {
            assert!(pair[0].del_len() <= pair[1].del_len());
        }
    }

    fn random_graph(n: usize, seed: u64) -> Graph {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(seed);
        let points = (0..n)
            .map(|_| Point {
                x: rng.gen_range(0.0..100.0),
                y: rng.gen_range(0.0..100.0),
            })
            .collect();
        Graph::new(points)
    }

    /// The de Berg engine must agree with the brute-force oracle on every
    /// irreducible matching, for every k the CLI exposes, on small random
    /// instances.
    #[test]
    fn de_berg_agrees_with_naive_on_every_irreducible_matching() {
        use crate::config::Algorithm;
        use crate::decomposition_library::DecompositionLibrary;
        use crate::driver::choose_algo;

        for n in [6usize, 9] {
            let graph = random_graph(n, n as u64 * 17 + 3);
            for k in 4..=5 {
                let mut matching = Matching::new(k);
                while matching.next_irreducible() {
                    let library = DecompositionLibrary::new();
                    let naive = choose_algo(n, &matching, &library, Algorithm::Naive).unwrap();
                    let deberg = choose_algo(n, &matching, &library, Algorithm::DeBerg).unwrap();

                    let naive_move = naive.run(&graph).unwrap();
                    let deberg_move = deberg.run(&graph).unwrap();
                    assert_eq!(
                        naive_move.gain, deberg_move.gain,
                        "n={} k={} matching={} naive/deberg gain mismatch",
                        n, k, matching.id()
                    );
                }
            }
        }
    }
}
