//! The Euclidean TSP instance: a point set with an integer distance oracle,
//! plus the TSPLIB I/O this crate's CLI reads and writes.

use std::io::{BufRead, Write};

use crate::error::{KoptError, Result};
use crate::identifier::{CycleEdge, CycleNode};
use crate::permutation::Permutation;

pub type Weight = i64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A symmetric Euclidean TSP instance together with the tour currently
/// being searched over (tracked as the active [`Permutation`]).
#[derive(Clone, Debug)]
pub struct Graph {
    points: Vec<Point>,
    permutation: Permutation,
}

impl Graph {
    pub fn new(points: Vec<Point>) -> Self {
        let n = points.len();
        Graph {
            points,
            permutation: Permutation::identity(n),
        }
    }

    pub fn n(&self) -> usize {
        self.points.len()
    }

    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    pub fn set_permutation(&mut self, permutation: Permutation) {
        debug_assert_eq!(permutation.n(), self.n());
        self.permutation = permutation;
    }

    /// Applies `extra` on top of the current working permutation: `extra`
    /// maps new cycle positions to *current* cycle positions, which this
    /// then translates through the existing permutation to absolute point
    /// indices.
    pub fn permutate(&mut self, extra: &Permutation) {
        self.permutation = self.permutation.compose(extra);
    }

    pub fn reset_permutation(&mut self) {
        self.permutation = Permutation::identity(self.n());
    }

    /// TSPLIB-mandated rounding: cast, not round, after adding 0.5.
    fn dist(a: Point, b: Point) -> Weight {
        let dx = a.x - b.x;
        let dy = a.y - b.y;
        ((dx * dx + dy * dy).sqrt() + 0.5) as Weight
    }

    /// The weight of the edge between two absolute point indices.
    pub fn d(&self, x: usize, y: usize) -> Weight {
        debug_assert_ne!(x, y);
        Self::dist(self.points[x], self.points[y])
    }

    /// The weight of the `i`-th edge of the current tour (between cycle
    /// positions `i` and `i+1 mod n`).
    pub fn cycle_edge_weight(&self, edge: CycleEdge) -> Weight {
        let n = self.n();
        let u = self.permutation.get(edge.left(n).0);
        let v = self.permutation.get(edge.right(n).0);
        self.d(u, v)
    }

    pub fn cycle_node(&self, node: CycleNode) -> usize {
        self.permutation.get(node.0)
    }

    /// Total weight of the current tour.
    pub fn cycle_weight(&self) -> Weight {
        let n = self.n();
        (0..n).map(|i| self.cycle_edge_weight(CycleEdge(i))).sum()
    }

    /// Parses a TSPLIB file, reading only the `NODE_COORD_SECTION` up to
    /// the `EOF` marker (or end of input) and ignoring header fields, as
    /// the original implementation does.
    pub fn read_tsplib(reader: impl BufRead) -> Result<Graph> {
        let mut points = Vec::new();
        let mut in_section = false;
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "NODE_COORD_SECTION" {
                in_section = true;
                continue;
            }
            if line == "EOF" {
                break;
            }
            if !in_section {
                continue;
            }
            let mut fields = line.split_whitespace();
            let _index = fields.next();
            let x: f64 = fields
                .next()
                .ok_or_else(|| KoptError::input("missing x coordinate"))?
                .parse()
                .map_err(|_| KoptError::input("bad x coordinate"))?;
            let y: f64 = fields
                .next()
                .ok_or_else(|| KoptError::input("missing y coordinate"))?
                .parse()
                .map_err(|_| KoptError::input("bad y coordinate"))?;
            points.push(Point { x, y });
        }
        if points.is_empty() {
            return Err(KoptError::input("no NODE_COORD_SECTION found"));
        }
        Ok(Graph::new(points))
    }

    /// Writes the instance back out in TSPLIB `NODE_COORD_SECTION` format.
    pub fn write_graph(&self, mut writer: impl Write, name: &str) -> Result<()> {
        writeln!(writer, "NAME: {}", name)?;
        writeln!(writer, "TYPE: TSP")?;
        writeln!(writer, "DIMENSION: {}", self.n())?;
        writeln!(writer, "EDGE_WEIGHT_TYPE: EUC_2D")?;
        writeln!(writer, "NODE_COORD_SECTION")?;
        for (i, p) in self.points.iter().enumerate() {
            writeln!(writer, "{} {} {}", i + 1, p.x, p.y)?;
        }
        writeln!(writer, "EOF")?;
        Ok(())
    }

    /// Writes the current tour in TSPLIB tour-file format: a
    /// `TOUR_SECTION` of 1-based node indices terminated by `-1`.
    pub fn write_tour(&self, mut writer: impl Write, name: &str) -> Result<()> {
        writeln!(writer, "NAME: {}", name)?;
        writeln!(writer, "TYPE: TOUR")?;
        writeln!(writer, "DIMENSION: {}", self.n())?;
        writeln!(writer, "TOUR_SECTION")?;
        for i in 0..self.n() {
            writeln!(writer, "{}", self.permutation.get(i) + 1)?;
        }
        writeln!(writer, "-1")?;
        writeln!(writer, "EOF")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Graph {
        Graph::new(vec![
            Point { x: 0.0, y: 0.0 },
            Point { x: 0.0, y: 10.0 },
            Point { x: 10.0, y: 10.0 },
            Point { x: 10.0, y: 0.0 },
        ])
    }

    #[test]
    fn identity_tour_weight_is_perimeter() {
        let g = square();
        assert_eq!(g.cycle_weight(), 40);
    }

    #[test]
    fn reads_node_coord_section() {
        let tsplib = "NAME: sq\nTYPE: TSP\nDIMENSION: 4\nNODE_COORD_SECTION\n1 0 0\n2 0 10\n3 10 10\n4 10 0\nEOF\n";
        let g = Graph::read_tsplib(tsplib.as_bytes()).unwrap();
        assert_eq!(g.n(), 4);
        assert_eq!(g.cycle_weight(), 40);
    }

    #[test]
    fn round_trips_through_write_and_read() {
        let g = square();
        let mut buf = Vec::new();
        g.write_graph(&mut buf, "sq").unwrap();
        let g2 = Graph::read_tsplib(buf.as_slice()).unwrap();
        assert_eq!(g2.n(), g.n());
        assert_eq!(g2.cycle_weight(), g.cycle_weight());
    }
}
