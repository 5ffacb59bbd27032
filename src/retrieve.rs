//! Turning an embedding into a concrete new tour, and canonicalizing a
//! tour for output/equality comparison.
//!
//! Grounded on `retrieve_solution.h`/`.cpp`: starting from signature node
//! `0`, alternately step along one new edge the matching makes and along
//! whatever stretch of the original cycle survives unchanged between two
//! reconnected slots.

use std::io::Write;

use crate::embedding::EmbeddingInterface;
use crate::error::Result;
use crate::gain::map_node;
use crate::identifier::{CycleNode, SigNode};
use crate::matching::Matching;
use crate::permutation::Permutation;

/// Walks a matching and its embedding into the sequence of cycle nodes
/// (expressed in terms of the *current* working permutation's positions)
/// the new tour visits, in order.
pub fn retrieve_solution(
    graph_size: usize,
    matching: &Matching,
    embedding: &impl EmbeddingInterface,
) -> Vec<CycleNode> {
    let mut result = Vec::with_capacity(graph_size);
    let mut mod_pos = SigNode(0);
    loop {
        result.push(map_node(graph_size, embedding, mod_pos));
        mod_pos = matching.call(mod_pos);
        let step: i64 = if mod_pos.is_left() { -1 } else { 1 };
        let mut cycle_pos = map_node(graph_size, embedding, mod_pos);
        mod_pos = mod_pos.step(step, matching.domain().size());
        let cycle_target = map_node(graph_size, embedding, mod_pos);
        while cycle_pos != cycle_target {
            result.push(cycle_pos);
            cycle_pos = cycle_pos.step(step, graph_size);
        }
        if mod_pos == SigNode(0) {
            break;
        }
    }
    result
}

/// Same as [`retrieve_solution`], but packaged as a [`Permutation`] ready
/// to be composed onto a [`crate::graph::Graph`] via
/// [`crate::graph::Graph::permutate`].
pub fn retrieve_permutation(
    graph_size: usize,
    matching: &Matching,
    embedding: &impl EmbeddingInterface,
) -> Result<Permutation> {
    let nodes = retrieve_solution(graph_size, matching, embedding);
    Permutation::new(nodes.into_iter().map(|c| c.0).collect())
}

/// The canonical cyclic order of a tour: start at city `0` and walk in
/// whichever direction visits the smaller-indexed neighbor first. Two
/// permutations describe the same tour exactly when their canonical
/// orders match, regardless of the rotation/reflection either happens to
/// be stored in.
pub fn canonical_order(permutation: &Permutation) -> Vec<usize> {
    let values = permutation.as_slice();
    let n = values.len() as i64;
    let get = |idx: i64| -> usize {
        let i = ((idx % n) + n) % n;
        values[i as usize]
    };
    let mut at: i64 = 0;
    while get(at) != 0 {
        at += 1;
    }
    let step: i64 = if get(at + 1) < get(at - 1) { 1 } else { -1 };
    let mut out = Vec::with_capacity(n as usize);
    let mut cur = at;
    for _ in 0..n {
        out.push(get(cur));
        cur += step;
    }
    out
}

/// Writes a tour's canonical order as a single space-separated line.
pub fn write_canonical(permutation: &Permutation, mut writer: impl Write) -> Result<()> {
    let order = canonical_order(permutation);
    let n = order.len();
    for (i, city) in order.iter().enumerate() {
        write!(writer, "{}", city)?;
        if i + 1 < n {
            write!(writer, " ")?;
        }
    }
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::SlowEmbedding;
    use crate::identifier::{CycleEdge, SigEdge};

    #[test]
    fn two_opt_retrieval_reverses_a_segment() {
        // Removing edges (0,1) and (2,3) of a 4-cycle and reconnecting
        // crosswise (the only irreducible 2-opt matching) reverses the
        // segment between them.
        let mut matching = Matching::new(2);
        assert!(matching.next_irreducible());
        let mut embedding = SlowEmbedding::new();
        embedding.set(SigEdge(0), CycleEdge(0));
        embedding.set(SigEdge(1), CycleEdge(2));
        let solution = retrieve_solution(4, &matching, &embedding);
        assert_eq!(solution.len(), 4);
        let perm = retrieve_permutation(4, &matching, &embedding).unwrap();
        assert_eq!(perm.n(), 4);
    }

    #[test]
    fn canonical_order_ignores_rotation() {
        let a = Permutation::new(vec![0, 1, 2, 3]).unwrap();
        let b = Permutation::new(vec![2, 3, 0, 1]).unwrap();
        assert_eq!(canonical_order(&a), canonical_order(&b));
    }

    #[test]
    fn canonical_order_ignores_reflection() {
        let a = Permutation::new(vec![0, 1, 2, 3]).unwrap();
        let b = Permutation::new(vec![0, 3, 2, 1]).unwrap();
        assert_eq!(canonical_order(&a), canonical_order(&b));
    }
}
