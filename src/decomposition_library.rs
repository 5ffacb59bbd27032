//! A precomputed library mapping a signature's [`DependenceGraph`] to a
//! nice [`Decomposition`] of low width, loaded once at startup and then
//! looked up by binary search for every signature the driver considers.
//!
//! Building a good decomposition from scratch is expensive and not
//! something this crate attempts at runtime; instead the library is
//! loaded from a file shipped alongside the binary. When a dependence
//! graph has no library entry (e.g. a hand-constructed test graph, or a
//! `k` the shipped library wasn't built for), [`DecompositionLibrary::get`]
//! falls back to [`Decomposition::path`], which is always correct but
//! never better than linear tree width.

use std::io::BufRead;

use crate::decomposition::Decomposition;
use crate::dependence_graph::DependenceGraph;
use crate::error::{KoptError, Result};
use crate::identifier::SigEdge;

pub struct DecompositionLibrary {
    entries: Vec<(DependenceGraph, Decomposition)>,
}

impl DecompositionLibrary {
    pub fn new() -> Self {
        DecompositionLibrary {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, graph: DependenceGraph, decomposition: Decomposition) {
        let pos = self.entries.partition_point(|(g, _)| g < &graph);
        self.entries.insert(pos, (graph, decomposition));
    }

    /// Looks up the decomposition for `graph`, binary searching the
    /// sorted library and falling back to a trivial path decomposition
    /// over `edges` if no entry matches.
    pub fn get(&self, graph: &DependenceGraph, edges: &[SigEdge]) -> Decomposition {
        match self.entries.binary_search_by(|(g, _)| g.cmp(graph)) {
            Ok(idx) => self.entries[idx].1.clone(),
            Err(_) => Decomposition::path(edges),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Consumes the library, handing back its entries so they can be
    /// merged into another one (used when loading one file per `k`).
    pub fn into_entries(self) -> Vec<(DependenceGraph, Decomposition)> {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads a library file per spec.md §6: a leading line holding the
    /// number of entries, then for each entry a dependence graph
    /// (`node_count edge_count` header, then `edge_count` 1-based `a b`
    /// pair lines) followed by a line holding the matching prefix-notation
    /// [`Decomposition`].
    pub fn read(reader: impl BufRead) -> Result<Self> {
        let mut library = DecompositionLibrary::new();
        let mut lines = reader.lines();
        let count_line = lines
            .next()
            .ok_or_else(|| KoptError::library_corrupt("missing entry count"))??;
        let count: usize = count_line
            .trim()
            .parse()
            .map_err(|_| KoptError::library_corrupt("bad entry count"))?;
        for _ in 0..count {
            let header = lines
                .next()
                .ok_or_else(|| KoptError::library_corrupt("truncated library"))??;
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
                let line = lines
                    .next()
                    .ok_or_else(|| KoptError::library_corrupt("truncated edge list"))??;
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
            let dg = DependenceGraph::new(node_count, edges);
            let decomp_line = lines
                .next()
                .ok_or_else(|| KoptError::library_corrupt("missing decomposition body"))??;
            let decomposition = Decomposition::read(decomp_line.as_bytes())?;
            library.insert(dg, decomposition);
        }
        Ok(library)
    }
}

impl Default for DecompositionLibrary {
    fn default() -> Self {
        Self::new()
    }
}
