//! Small typed wrappers around plain integers, so a cycle position can't be
//! mixed up with a signature position at compile time. All of them are
//! zero-based in storage; I/O code is responsible for the 1-based TSPLIB
//! convention.

use std::fmt;

/// Common behavior shared by every typed identifier in this crate.
pub trait TypedId: Copy + Eq + Ord + fmt::Debug {
    fn new(value: usize) -> Self;
    fn value(self) -> usize;

    /// Advances by `count` modulo `n`, wrapping around.
    fn step(self, count: i64, n: usize) -> Self {
        let n = n as i64;
        let v = self.value() as i64;
        let stepped = ((v + count) % n + n) % n;
        Self::new(stepped as usize)
    }
}

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $name(pub usize);

        impl TypedId for $name {
            fn new(value: usize) -> Self {
                $name(value)
            }
            fn value(self) -> usize {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                $name(v)
            }
        }
    };
}

typed_id!(CycleNode);
typed_id!(CycleEdge);
typed_id!(SigNode);
typed_id!(SigEdge);

impl CycleEdge {
    /// The node the edge leaves from, i.e. edge `e` connects node `e` to
    /// node `e + 1` (mod the cycle length).
    pub fn left(self, n: usize) -> CycleNode {
        CycleNode(self.0)
    }

    pub fn right(self, n: usize) -> CycleNode {
        CycleNode((self.0 + 1) % n)
    }
}

impl SigEdge {
    /// A signature edge is one of the `k` removed cycle-edge slots; it
    /// owns two signature nodes (the `2k` endpoints the matching permutes),
    /// `2*i` ("left") and `2*i+1` ("right").
    pub fn node(self, left: bool) -> SigNode {
        SigNode(self.0 * 2 + if left { 0 } else { 1 })
    }
}

impl SigNode {
    /// The signature edge (removed-edge slot) this endpoint belongs to.
    pub fn edge(self) -> SigEdge {
        SigEdge(self.0 / 2)
    }

    pub fn is_left(self) -> bool {
        self.0 % 2 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_wraps_around() {
        let n = CycleNode(0);
        assert_eq!(n.step(-1, 5), CycleNode(4));
        assert_eq!(n.step(7, 5), CycleNode(2));
    }

    #[test]
    fn cycle_edge_endpoints_wrap() {
        let e = CycleEdge(4);
        assert_eq!(e.left(5), CycleNode(4));
        assert_eq!(e.right(5), CycleNode(0));
    }

    #[test]
    fn sig_edge_owns_two_sig_nodes() {
        assert_eq!(SigEdge(3).node(true), SigNode(6));
        assert_eq!(SigEdge(3).node(false), SigNode(7));
        assert_eq!(SigNode(7).edge(), SigEdge(3));
        assert!(SigNode(6).is_left());
        assert!(!SigNode(7).is_left());
    }
}
