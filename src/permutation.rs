//! A validated bijection on `{0, ..., n-1}`, used both as the driver's
//! working cycle representation and as a small test/benchmark utility.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{KoptError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permutation {
    values: Vec<usize>,
}

impl Permutation {
    /// The identity permutation on `n` elements.
    pub fn identity(n: usize) -> Self {
        Permutation {
            values: (0..n).collect(),
        }
    }

    /// Wraps `values` as a permutation, checking it really is one.
    pub fn new(values: Vec<usize>) -> Result<Self> {
        let n = values.len();
        let mut seen = vec![false; n];
        for &v in &values {
            if v >= n || seen[v] {
                return Err(KoptError::input(format!(
                    "{:?} is not a permutation of 0..{}",
                    values, n
                )));
            }
            seen[v] = true;
        }
        Ok(Permutation { values })
    }

    pub fn n(&self) -> usize {
        self.values.len()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.values
    }

    pub fn get(&self, i: usize) -> usize {
        self.values[i]
    }

    pub fn random(n: usize, rng: &mut impl Rng) -> Self {
        let mut values: Vec<usize> = (0..n).collect();
        values.shuffle(rng);
        Permutation { values }
    }

    /// `self` composed with `inner`: `(self . inner)(i) = self(inner(i))`.
    pub fn compose(&self, inner: &Permutation) -> Self {
        debug_assert_eq!(self.n(), inner.n());
        Permutation {
            values: inner.values.iter().map(|&i| self.values[i]).collect(),
        }
    }

    pub fn inverse(&self) -> Self {
        let mut inv = vec![0; self.n()];
        for (i, &v) in self.values.iter().enumerate() {
            inv[v] = i;
        }
        Permutation { values: inv }
    }

    /// Number of positions `i` where `self(i) != i` and `self(i) != i+1`
    /// (mod n) — i.e. positions that are not just a cyclic shift of their
    /// neighbor. Used by tests to sanity-check that a k-move actually
    /// changed the tour.
    pub fn changes(&self, other: &Permutation) -> usize {
        debug_assert_eq!(self.n(), other.n());
        self.values
            .iter()
            .zip(other.values.iter())
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Lexicographically next permutation of the full sequence, in the
    /// `std::next_permutation` sense. Used by small brute-force tests only.
    pub fn next(&mut self) -> bool {
        let v = &mut self.values;
        let n = v.len();
        if n < 2 {
            return false;
        }
        let mut i = n - 1;
        while i > 0 && v[i - 1] >= v[i] {
            i -= 1;
        }
        if i == 0 {
            return false;
        }
        let mut j = n - 1;
        while v[j] <= v[i - 1] {
            j -= 1;
        }
        v.swap(i - 1, j);
        v[i..].reverse();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn identity_composes_to_itself() {
        let id = Permutation::identity(5);
        assert_eq!(id.compose(&id), id);
    }

    #[test]
    fn inverse_undoes_composition() {
        let mut rng = StdRng::seed_from_u64(42);
        let p = Permutation::random(6, &mut rng);
        let composed = p.inverse().compose(&p);
        assert_eq!(composed, Permutation::identity(6));
    }

    #[test]
    fn rejects_non_permutations() {
        assert!(Permutation::new(vec![0, 0, 1]).is_err());
        assert!(Permutation::new(vec![0, 1, 3]).is_err());
    }

    #[test]
    fn next_enumerates_in_lexicographic_order() {
        let mut p = Permutation::new(vec![0, 1, 2]).unwrap();
        let mut all = vec![p.as_slice().to_vec()];
        while p.next() {
            all.push(p.as_slice().to_vec());
        }
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], vec![0, 1, 2]);
        assert_eq!(all[5], vec![2, 1, 0]);
    }
}
