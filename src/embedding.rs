//! An embedding maps each signature edge in a bag to a concrete cycle
//! edge. Two representations are used, matching what each consumer needs:
//! a dense, rank-indexed [`Embedding`] for the tree-DP table (small,
//! `Copy`-cheap, supports `O(1)` "next" enumeration), and a sparse
//! [`SlowEmbedding`] for top-down solution retrieval, where strict
//! monotonicity of values can't be assumed mid-walk.

use crate::identifier::{CycleEdge, SigEdge};
use crate::monotone::{Binom, Subset};
use crate::set::Set;

/// Minimal capability both embedding representations share: the set of
/// signature edges they cover, and the concrete cycle edge each maps to.
pub trait EmbeddingInterface {
    fn domain(&self) -> Set<SigEdge>;
    fn map_edge(&self, edge: SigEdge) -> CycleEdge;
}

/// A dense embedding of a `k`-edge domain into `{0, ..., n-1}`, represented
/// as a monotone subset: the domain's edges, taken in ascending order,
/// map to the subset's values in the same order. This is the
/// representation the DP table in `crate::dynamic` is indexed by.
#[derive(Clone)]
pub struct Embedding<'a> {
    domain: Set<SigEdge>,
    sorted_domain: Vec<SigEdge>,
    subset: Subset<'a>,
}

impl<'a> Embedding<'a> {
    /// The lexicographically smallest embedding of `domain` into `{0, ...,
    /// n-1}`.
    pub fn new(binom: &'a Binom, domain: Set<SigEdge>, n: usize) -> Self {
        let sorted_domain: Vec<SigEdge> = domain.iter().collect();
        let subset = Subset::new(binom, sorted_domain.len(), n);
        Embedding {
            domain,
            sorted_domain,
            subset,
        }
    }

    /// The number of distinct embeddings of a `domain_size`-edge domain
    /// into `{0, ..., codomain-1}` — the length of the DP table this
    /// embedding indexes into.
    pub fn id_size(binom: &Binom, domain_size: usize, codomain: usize) -> u64 {
        binom.get(codomain, domain_size)
    }

    pub fn id(&self) -> u64 {
        self.subset.index()
    }

    /// The rank this embedding would have if `edge` were removed from its
    /// domain — the index into the child DP table at an Introduce or
    /// Forget node.
    pub fn restricted_id(&self, edge: SigEdge) -> u64 {
        let pos = self
            .sorted_domain
            .iter()
            .position(|&e| e == edge)
            .expect("edge not in embedding domain");
        self.subset.index_without(pos)
    }

    pub fn next(&mut self) -> bool {
        self.subset.next()
    }

    pub fn values(&self) -> &[usize] {
        self.subset.values()
    }
}

impl<'a> EmbeddingInterface for Embedding<'a> {
    fn domain(&self) -> Set<SigEdge> {
        self.domain
    }

    fn map_edge(&self, edge: SigEdge) -> CycleEdge {
        let pos = self
            .sorted_domain
            .iter()
            .position(|&e| e == edge)
            .expect("edge not in embedding domain");
        CycleEdge(self.subset.get(pos))
    }
}

/// A sparse embedding built incrementally during top-down retrieval, where
/// entries are added and removed one at a time rather than enumerated in
/// bulk.
#[derive(Clone, Debug, Default)]
pub struct SlowEmbedding {
    values: Vec<(SigEdge, CycleEdge)>,
}

impl SlowEmbedding {
    pub fn new() -> Self {
        SlowEmbedding { values: Vec::new() }
    }

    pub fn from_fast(embedding: &Embedding<'_>) -> Self {
        let mut values: Vec<(SigEdge, CycleEdge)> = embedding
            .sorted_domain
            .iter()
            .map(|&edge| (edge, embedding.map_edge(edge)))
            .collect();
        values.sort_by_key(|(edge, _)| edge.0);
        SlowEmbedding { values }
    }

    pub fn set(&mut self, edge: SigEdge, value: CycleEdge) {
        match self.values.binary_search_by_key(&edge.0, |(e, _)| e.0) {
            Ok(pos) => self.values[pos].1 = value,
            Err(pos) => self.values.insert(pos, (edge, value)),
        }
    }

    pub fn remove(&mut self, edge: SigEdge) {
        if let Ok(pos) = self.values.binary_search_by_key(&edge.0, |(e, _)| e.0) {
            self.values.remove(pos);
        }
    }

    pub fn get(&self, edge: SigEdge) -> Option<CycleEdge> {
        self.values
            .binary_search_by_key(&edge.0, |(e, _)| e.0)
            .ok()
            .map(|pos| self.values[pos].1)
    }

    /// All concrete values currently assigned, sorted by cycle position;
    /// used by retrieval to find the gap a forgotten edge must be placed
    /// into.
    pub fn sorted_values(&self) -> Vec<CycleEdge> {
        let mut v: Vec<CycleEdge> = self.values.iter().map(|(_, c)| *c).collect();
        v.sort_by_key(|c| c.0);
        v
    }

    /// The inclusive range of cycle positions `edge` (not yet in this
    /// embedding's domain) may take without breaking monotonicity: one past
    /// the value of the nearest already-assigned edge below it in
    /// signature-edge order, up to one before the nearest above (or the
    /// ends of `[0, n)` if there is no such neighbor).
    pub fn gap_for(&self, edge: SigEdge, n: usize) -> (usize, usize) {
        match self.values.binary_search_by_key(&edge.0, |(e, _)| e.0) {
            Ok(_) => panic!("edge already in embedding domain"),
            Err(pos) => {
                let lowest = if pos > 0 { self.values[pos - 1].1 .0 + 1 } else { 0 };
                let highest = if pos < self.values.len() {
                    self.values[pos].1 .0 - 1
                } else {
                    n - 1
                };
                (lowest, highest)
            }
        }
    }
}

impl EmbeddingInterface for SlowEmbedding {
    fn domain(&self) -> Set<SigEdge> {
        Set::from_iter(self.values.iter().map(|(e, _)| *e))
    }

    fn map_edge(&self, edge: SigEdge) -> CycleEdge {
        self.get(edge).expect("edge not in embedding domain")
    }
}
