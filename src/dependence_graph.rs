//! The dependence graph of a matching: a small graph over the `k` removed-
//! edge slots recording which slots are linked by a new connection that
//! "jumps" more than one slot. Adjacent slots (difference of 1) are always
//! implicitly chained by the cycle itself, so only the longer jumps need
//! to be tracked; these are exactly the extra edges a tree decomposition
//! of the signature needs beyond the trivial path `0 - 1 - ... - (k-1)`.
//!
//! Two matchings that induce the same dependence graph can share a single
//! precomputed tree decomposition, which is why [`DependenceGraph`]
//! implements `Ord`: it is the lookup key into a
//! [`crate::decomposition_library::DecompositionLibrary`].

use std::cmp::Ordering;
use std::io::{BufRead, Write};

use crate::error::{KoptError, Result};
use crate::matching::Matching;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DependenceGraph {
    node_count: usize,
    edges: Vec<(usize, usize)>,
}

impl DependenceGraph {
    pub fn new(node_count: usize, mut edges: Vec<(usize, usize)>) -> Self {
        edges.sort_unstable();
        edges.dedup();
        DependenceGraph { node_count, edges }
    }

    pub fn from_matching(matching: &Matching) -> Self {
        let mut edges: Vec<(usize, usize)> = matching
            .slot_pairs()
            .into_iter()
            .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
            .filter(|&(a, b)| b - a >= 2)
            .collect();
        edges.sort_unstable();
        edges.dedup();
        DependenceGraph {
            node_count: matching.k(),
            edges,
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// The tie-breaking key used to sort/binary-search a decomposition
    /// library: node count first, then edge count, then the edges
    /// themselves lexicographically.
    fn tie(&self) -> (usize, usize, &[(usize, usize)]) {
        (self.node_count, self.edges.len(), &self.edges)
    }

    /// Writes `node_count edge_count` then one `a b` pair per line, 1-based
    /// as spec.md §6 mandates for the decomposition-library file format.
    pub fn write(&self, mut writer: impl Write) -> Result<()> {
        writeln!(writer, "{} {}", self.node_count, self.edges.len())?;
        for &(a, b) in &self.edges {
            writeln!(writer, "{} {}", a + 1, b + 1)?;
        }
        Ok(())
    }

    pub fn read(mut reader: impl BufRead) -> Result<Self> {
        let mut header = String::new();
        reader.read_line(&mut header)?;
        let mut fields = header.trim().split_whitespace();
        let node_count: usize = fields
            .next()
            .ok_or_else(|| KoptError::library_corrupt("missing node count"))?
            .parse()
            .map_err(|_| KoptError::library_corrupt("bad node count"))?;
        let edge_count: usize = fields
            .next()
            .ok_or_else(|| KoptError::library_corrupt("missing edge count"))?
            .parse()
            .map_err(|_| KoptError::library_corrupt("bad edge count"))?;
        let mut edges = Vec::with_capacity(edge_count);
        for _ in 0..edge_count {
            let mut line = String::new();
            reader.read_line(&mut line)?;
            let mut fields = line.trim().split_whitespace();
            let a: usize = fields
                .next()
                .ok_or_else(|| KoptError::library_corrupt("missing edge endpoint"))?
                .parse()
                .map_err(|_| KoptError::library_corrupt("bad edge endpoint"))?;
            let b: usize = fields
                .next()
                .ok_or_else(|| KoptError::library_corrupt("missing edge endpoint"))?
                .parse()
                .map_err(|_| KoptError::library_corrupt("bad edge endpoint"))?;
            if a == 0 || b == 0 {
                return Err(KoptError::library_corrupt("edge endpoint must be 1-based"));
            }
            edges.push((a - 1, b - 1));
        }
        Ok(DependenceGraph::new(node_count, edges))
    }
}

impl Ord for DependenceGraph {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tie().cmp(&other.tie())
    }
}

impl PartialOrd for DependenceGraph {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_opt_has_no_extra_edges() {
        let mut m = Matching::new(2);
        assert!(m.next_irreducible());
        let dg = DependenceGraph::from_matching(&m);
        assert_eq!(dg.node_count(), 2);
        assert!(dg.edges().is_empty());
    }

    #[test]
    fn write_then_read_round_trips() {
        let dg = DependenceGraph::new(5, vec![(0, 2), (1, 3)]);
        let mut buf = Vec::new();
        dg.write(&mut buf).unwrap();
        let read_back = DependenceGraph::read(buf.as_slice()).unwrap();
        assert_eq!(dg, read_back);
    }

    #[test]
    fn ordering_compares_node_count_then_edges() {
        let a = DependenceGraph::new(3, vec![]);
        let b = DependenceGraph::new(4, vec![]);
        assert!(a < b);
        let c = DependenceGraph::new(3, vec![(0, 2)]);
        assert!(a < c);
    }
}
