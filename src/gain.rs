//! The gain function: how much shorter the tour gets from reconnecting one
//! more removed-edge slot according to the matching, given an embedding
//! that places every already-reconnected slot at a concrete cycle edge.
//!
//! Both tree-DP recurrences (`crate::dynamic`) call into this: Introduce
//! adds the gain of bringing one new slot into the bag, Join adds the
//! gain of the new edges that cross between the two subtrees being
//! merged.

use crate::embedding::EmbeddingInterface;
use crate::graph::{Graph, Weight};
use crate::identifier::SigEdge;
use crate::matching::Matching;

#[derive(Clone, Copy)]
pub struct GainFunc<'g> {
    graph: &'g Graph,
    matching: &'g Matching,
}

impl<'g> GainFunc<'g> {
    pub fn new(graph: &'g Graph, matching: &'g Matching) -> Self {
        GainFunc { graph, matching }
    }

    /// The weight of the original cycle edge this slot currently maps to.
    fn removed_weight(&self, embedding: &impl EmbeddingInterface, edge: SigEdge) -> Weight {
        self.graph.cycle_edge_weight(embedding.map_edge(edge))
    }

    /// The weight of the new edge between `x` and its matched partner,
    /// counted only if the partner's slot is already present in
    /// `embedding`'s domain (otherwise it will be counted later, when that
    /// slot is introduced or when the two subtrees holding them are
    /// joined). `ordered` additionally requires the partner's slot index
    /// to be less than `x`'s, which is how Join avoids counting the same
    /// cross-subtree edge from both sides.
    fn added_weight(
        &self,
        embedding: &impl EmbeddingInterface,
        x: crate::identifier::SigNode,
        ordered: bool,
    ) -> Weight {
        let y = self.matching.call(x);
        let y_edge = y.edge();
        if ordered && y_edge.0 >= x.edge().0 {
            return 0;
        }
        if !embedding.domain().contains(y_edge) {
            return 0;
        }
        let cx = map_node(self.graph.n(), embedding, x);
        let cy = map_node(self.graph.n(), embedding, y);
        self.graph
            .d(self.graph.cycle_node(cx), self.graph.cycle_node(cy))
    }

    /// Gain contributed by introducing `edge` into the bag: the weight of
    /// the original edge removed at this slot, minus the weight of any
    /// new edge this slot's two endpoints complete against already-seen
    /// slots.
    pub fn introduce(&self, embedding: &impl EmbeddingInterface, edge: SigEdge) -> Weight {
        let mut gain = self.removed_weight(embedding, edge);
        gain -= self.added_weight(embedding, edge.node(true), false);
        gain -= self.added_weight(embedding, edge.node(false), false);
        gain
    }

    /// The total gain of fully reconnecting every slot in `embedding`'s
    /// domain: the weight of every removed cycle edge, minus every new
    /// edge the matching makes between two slots both present in the
    /// domain (each counted once). Doubles as the correction subtracted at
    /// a Join node, since both subtrees independently introduce every bag
    /// edge and so each contribute its removed weight once; subtracting
    /// this cancels the duplicate down to a single count.
    pub fn join(&self, embedding: &impl EmbeddingInterface) -> Weight {
        let mut gain = 0;
        for slot in embedding.domain().iter() {
            gain += self.removed_weight(embedding, slot);
            gain -= self.added_weight(embedding, slot.node(true), true);
            gain -= self.added_weight(embedding, slot.node(false), true);
        }
        gain
    }
}

/// Maps a signature node (one specific endpoint of a removed-edge slot) to
/// the concrete cycle node it currently sits at, given an embedding of the
/// slot it belongs to. Shared with `crate::retrieve`, which walks
/// signature nodes directly rather than whole edges.
pub(crate) fn map_node(
    n: usize,
    embedding: &impl EmbeddingInterface,
    node: crate::identifier::SigNode,
) -> crate::identifier::CycleNode {
    let cycle_edge = embedding.map_edge(node.edge());
    if node.is_left() {
        cycle_edge.left(n)
    } else {
        cycle_edge.right(n)
    }
}
