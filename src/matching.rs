//! A `Matching` is the abstract pattern of a k-opt move: which of the `2k`
//! endpoints exposed by the `k` removed cycle edges get reconnected to
//! which other endpoints. It is represented, following the source
//! algorithm, as a permutation-with-orientation of the `k-1` "inner"
//! cycle fragments between consecutive removed edges; the two outer
//! fragments (before the first and after the last removed edge) are fixed,
//! which is why a matching of `k` edges needs only `k-1` permutation
//! entries.

use crate::identifier::SigNode;
use crate::set::Set;

use std::fmt;

/// A compact, printable encoding of a [`Matching`]: one character per
/// inner fragment, uppercase for "kept its orientation", lowercase for
/// "reversed", with the letter itself giving the fragment's new position.
pub type MatchingId = String;

fn frag_front(idx: usize, rev: bool) -> usize {
    2 * idx + 1 + rev as usize
}

fn frag_back(idx: usize, rev: bool) -> usize {
    2 * idx + 2 - rev as usize
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matching {
    k: usize,
    per: Vec<usize>,
    rev: Vec<bool>,
    matching: Vec<usize>,
}

impl Matching {
    /// The lexicographically smallest matching on `k` edges: every inner
    /// fragment keeps its position and orientation, i.e. no actual change
    /// (always reducible).
    pub fn new(k: usize) -> Self {
        let per: Vec<usize> = (0..k.saturating_sub(1)).collect();
        let rev = vec![false; k.saturating_sub(1)];
        let mut m = Matching {
            k,
            per,
            rev,
            matching: Vec::new(),
        };
        m.update_matching();
        m
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let k = id.len() + 1;
        let mut per = Vec::with_capacity(k - 1);
        let mut rev = Vec::with_capacity(k - 1);
        for c in id.chars() {
            let is_rev = c.is_ascii_lowercase();
            let base = if is_rev { b'a' } else { b'A' };
            let idx = (c as u8).checked_sub(base)? as usize;
            if idx >= k - 1 {
                return None;
            }
            per.push(idx);
            rev.push(is_rev);
        }
        let mut m = Matching {
            k,
            per,
            rev,
            matching: Vec::new(),
        };
        m.update_matching();
        Some(m)
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn id(&self) -> MatchingId {
        self.per
            .iter()
            .zip(self.rev.iter())
            .map(|(&idx, &rev)| {
                let base = if rev { b'a' } else { b'A' };
                (base + idx as u8) as char
            })
            .collect()
    }

    /// All `2k` signature nodes that this matching maps.
    pub fn domain(&self) -> Set<SigNode> {
        Set::full(2 * self.k)
    }

    pub fn call(&self, node: SigNode) -> SigNode {
        SigNode(self.matching[node.0])
    }

    /// True if some removed edge is reconnected exactly as it was, making
    /// the move a no-op.
    pub fn reducible(&self) -> bool {
        (0..self.k).any(|i| self.matching[2 * i] == 2 * i + 1)
    }

    /// The `k` new connections this matching makes, expressed as the pair
    /// of removed-edge slots (`0..k`) each connection spans. Feeds
    /// [`crate::dependence_graph::DependenceGraph::from_matching`].
    pub fn slot_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::with_capacity(self.k);
        for x in 0..2 * self.k {
            let y = self.matching[x];
            if y > x {
                pairs.push((x / 2, y / 2));
            }
        }
        pairs
    }

    fn update_matching(&mut self) {
        let k = self.k;
        if k == 0 {
            self.matching = Vec::new();
            return;
        }
        let mut edges = vec![(0usize, 0usize); k];
        edges[0].0 = 0;
        edges[k - 1].1 = 2 * k - 1;
        for i in 1..k {
            edges[i].0 = frag_back(self.per[i - 1], self.rev[i - 1]);
        }
        for i in 0..k - 1 {
            edges[i].1 = frag_front(self.per[i], self.rev[i]);
        }
        let mut matching = vec![0usize; 2 * k];
        for &(x, y) in &edges {
            matching[x] = y;
            matching[y] = x;
        }
        self.matching = matching;
    }

    /// Advances to the next `(permutation, orientation)` pair in the
    /// combined enumeration order, treating orientation as a `k-1`-bit
    /// counter that carries into a standard next-permutation step.
    /// Returns `false` once every matching on `k` edges has been visited.
    pub fn next(&mut self) -> bool {
        let k = self.k;
        if k < 2 {
            return false;
        }
        let mut i = k as isize - 2;
        loop {
            if i < 0 {
                break;
            }
            let idx = i as usize;
            self.rev[idx] = !self.rev[idx];
            if self.rev[idx] {
                break;
            } else if idx + 1 < k - 1 && self.per[idx] < self.per[idx + 1] {
                let mut low = k - 2;
                while self.per[idx] >= self.per[low] {
                    low -= 1;
                }
                self.per.swap(idx, low);
                break;
            }
            i -= 1;
        }
        let from = (i + 1).max(0) as usize;
        self.per[from..k - 1].reverse();
        self.update_matching();
        i >= 0
    }

    pub fn next_irreducible(&mut self) -> bool {
        while self.next() {
            if !self.reducible() {
                return true;
            }
        }
        false
    }
}

impl fmt::Display for Matching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smallest_matching_is_reducible() {
        let m = Matching::new(3);
        assert!(m.reducible());
        assert_eq!(m.id(), "AB");
    }

    #[test]
    fn id_round_trips() {
        let mut m = Matching::new(4);
        for _ in 0..5 {
            m.next();
        }
        let id = m.id();
        let parsed = Matching::from_id(&id).unwrap();
        assert_eq!(parsed, m);
    }

    #[test]
    fn enumerates_expected_count_for_k3() {
        // k=3: 2 inner fragments, 2! permutations * 2^2 orientations = 8.
        let mut m = Matching::new(3);
        let mut count = 1;
        while m.next() {
            count += 1;
        }
        assert_eq!(count, 8);
    }

    #[test]
    fn next_irreducible_skips_noop_matchings() {
        let mut m = Matching::new(3);
        let mut count = 0;
        // 2-opt (k=2) is the smallest k with an irreducible matching; for
        // k=3 there should still be some irreducible ones.
        while m.next_irreducible() {
            count += 1;
            assert!(!m.reducible());
        }
        assert!(count > 0);
    }

    #[test]
    fn two_opt_has_exactly_one_irreducible_matching() {
        let mut m = Matching::new(2);
        assert_eq!(m.id(), "A");
        assert!(m.reducible());
        assert!(m.next_irreducible());
        assert_eq!(m.id(), "a");
        assert!(!m.reducible());
        assert!(!m.next_irreducible());
    }

    fn count_irreducible(k: usize) -> usize {
        let mut m = Matching::new(k);
        let mut count = 0;
        while m.next_irreducible() {
            count += 1;
        }
        count
    }

    #[test]
    fn irreducible_counts_match_reference_values() {
        let reference = [(2, 1), (3, 4), (4, 23), (5, 177)];
        for (k, expected) in reference {
            assert_eq!(count_irreducible(k), expected, "k = {}", k);
        }
    }

    #[test]
    fn canonical_id_round_trips_across_every_matching_of_k5() {
        let mut m = Matching::new(5);
        loop {
            let id = m.id();
            let parsed = Matching::from_id(&id).expect("id must parse");
            assert_eq!(parsed, m, "round trip failed for id {:?}", id);
            if !m.next() {
                break;
            }
        }
    }

    #[test]
    fn from_id_rejects_malformed_ids() {
        assert!(Matching::from_id("!!").is_none());
        assert!(Matching::from_id("ZZZZZZZZZZ").is_none());
    }
}
