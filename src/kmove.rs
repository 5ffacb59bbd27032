//! A `k`-move: one candidate reconnection found by an embedding engine,
//! ready to be retrieved into a concrete permutation and applied to a
//! [`crate::graph::Graph`] if its gain turns out to be positive.

use crate::embedding::SlowEmbedding;
use crate::graph::Weight;
use crate::matching::MatchingId;

#[derive(Clone, Debug)]
pub struct Kmove {
    pub gain: Weight,
    pub matching_id: MatchingId,
    pub embedding: SlowEmbedding,
}

impl Kmove {
    /// The move the driver reports when nothing in a signature's search
    /// space improves on the current tour.
    pub fn none() -> Self {
        Kmove {
            gain: 0,
            matching_id: String::new(),
            embedding: SlowEmbedding::new(),
        }
    }

    pub fn is_improving(&self) -> bool {
        self.gain > 0
    }
}

impl Default for Kmove {
    fn default() -> Self {
        Kmove::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_move_is_not_improving() {
        assert!(!Kmove::none().is_improving());
    }
}
