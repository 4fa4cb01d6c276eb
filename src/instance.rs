//! Module for parsing and representing Euclidean TSP instances.
//!
//! An instance file is a plain list of `<id> <x> <y>` records, one node per
//! line, with no header and no explicit node count. Loading is lenient: it
//! stops at the first record that does not parse and keeps everything read
//! before it.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use log::{error, warn};
use serde::{Deserialize, Serialize};

use crate::error::TspError;

/// Represents a node of the instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Label read from the file. Display only, never used as an index.
    pub id: i64,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Node {
    pub fn new(id: i64, x: f64, y: f64) -> Self {
        Node { id, x, y }
    }
}

/// Euclidean distance between two nodes.
///
/// A negative (or NaN) squared distance is clamped to zero and reported
/// instead of being fed to `sqrt`.
#[inline]
pub fn euclidean_distance(a: &Node, b: &Node) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let squared = dx * dx + dy * dy;

    if !(squared >= 0.0) {
        warn!(
            "Negative value under sqrt for nodes {} and {}, clamping distance to 0",
            a.id, b.id
        );
        return 0.0;
    }

    squared.sqrt()
}

/// A loaded instance. Positions in `nodes` are the indices tours refer to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    /// Name of the instance (file stem when loaded from disk)
    pub name: String,
    /// Nodes in file order
    pub nodes: Vec<Node>,
}

impl Graph {
    pub fn new(name: impl Into<String>, nodes: Vec<Node>) -> Self {
        Graph {
            name: name.into(),
            nodes,
        }
    }

    /// Builds an unnamed graph from bare coordinates, labelling nodes `0..n`.
    pub fn from_coordinates(coords: &[(f64, f64)]) -> Self {
        let nodes = coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Node::new(i as i64, x, y))
            .collect();
        Graph::new("unnamed", nodes)
    }

    /// Load an instance from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TspError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::from_reader(name, file)
    }

    /// Read node records until the first line that is not exactly
    /// `<integer> <float> <float>`. Blank lines are skipped.
    pub fn from_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self, TspError> {
        let reader = BufReader::new(reader);
        let mut nodes = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_record(line) {
                Some(node) => nodes.push(node),
                None => break,
            }
        }

        Ok(Graph::new(name, nodes))
    }

    /// Parse an instance held in memory.
    pub fn parse(name: impl Into<String>, contents: &str) -> Self {
        let nodes = contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map_while(parse_record)
            .collect();
        Graph::new(name, nodes)
    }

    /// Number of nodes in the graph
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Distance between the nodes at positions `i` and `j`.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        euclidean_distance(&self.nodes[i], &self.nodes[j])
    }

    /// Length of the closed tour, including the edge from the last position
    /// back to the first.
    ///
    /// An empty graph has no tour; the condition is logged and `0.0` returned.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        let n = self.num_nodes();
        if n == 0 {
            error!("Cannot calculate tour length: graph has zero nodes");
            return 0.0;
        }

        (0..n)
            .map(|i| self.distance(tour[i], tour[(i + 1) % n]))
            .sum()
    }

    /// Display labels of a tour, in visiting order.
    pub fn tour_ids(&self, tour: &[usize]) -> Vec<i64> {
        tour.iter().map(|&i| self.nodes[i].id).collect()
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let n = self.num_nodes();

        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for node in &self.nodes {
            min_x = min_x.min(node.x);
            max_x = max_x.max(node.x);
            min_y = min_y.min(node.y);
            max_y = max_y.max(node.y);
        }

        let mut total = 0.0;
        let mut count = 0usize;
        let mut max_distance: f64 = 0.0;
        for i in 0..n {
            for j in i + 1..n {
                let d = self.distance(i, j);
                total += d;
                count += 1;
                max_distance = max_distance.max(d);
            }
        }
        let avg_distance = if count > 0 { total / count as f64 } else { 0.0 };

        InstanceStatistics {
            name: self.name.clone(),
            num_nodes: n,
            min_x: if n > 0 { min_x } else { 0.0 },
            max_x: if n > 0 { max_x } else { 0.0 },
            min_y: if n > 0 { min_y } else { 0.0 },
            max_y: if n > 0 { max_y } else { 0.0 },
            avg_distance,
            max_distance,
        }
    }
}

fn parse_record(line: &str) -> Option<Node> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 3 {
        return None;
    }
    let id: i64 = parts[0].parse().ok()?;
    let x: f64 = parts[1].parse().ok()?;
    let y: f64 = parts[2].parse().ok()?;
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(Node::new(id, x, y))
}

/// Helper function to load every parsable instance in a directory.
///
/// Files that cannot be read or yield no nodes are skipped. The result is
/// sorted by node count.
pub fn load_instances_from_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<(std::path::PathBuf, Graph)>, TspError> {
    let mut instances = Vec::new();

    for entry in std::fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match Graph::from_file(&path) {
            Ok(graph) if !graph.is_empty() => instances.push((path, graph)),
            Ok(_) => warn!("Skipping {:?}: no node records", path),
            Err(e) => warn!("Skipping {:?}: {}", path, e),
        }
    }

    instances.sort_by_key(|(_, g)| g.num_nodes());
    Ok(instances)
}

/// Statistics about an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub num_nodes: usize,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub avg_distance: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Nodes: {}", self.num_nodes)?;
        writeln!(f, "  X range: [{:.2}, {:.2}]", self.min_x, self.max_x)?;
        writeln!(f, "  Y range: [{:.2}, {:.2}]", self.min_y, self.max_y)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Graph {
        Graph::from_coordinates(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)])
    }

    #[test]
    fn test_distance_calculation() {
        let a = Node::new(1, 0.0, 0.0);
        let b = Node::new(2, 3.0, 4.0);
        assert!((euclidean_distance(&a, &b) - 5.0).abs() < 1e-10);
        assert!((euclidean_distance(&b, &a) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_degenerate_distance_is_clamped() {
        let a = Node::new(1, f64::NAN, 0.0);
        let b = Node::new(2, 1.0, 1.0);
        assert_eq!(euclidean_distance(&a, &b), 0.0);
    }

    #[test]
    fn test_tour_length_includes_wrap_edge() {
        let graph = square();
        assert!((graph.tour_length(&[0, 1, 2, 3]) - 4.0).abs() < 1e-12);
        // crossing tour: 1 + sqrt2 + 1 + sqrt2
        let crossed = graph.tour_length(&[0, 2, 1, 3]);
        assert!((crossed - (2.0 + 2.0 * 2f64.sqrt())).abs() < 1e-12);

        let line = Graph::from_coordinates(&[(0.0, 0.0), (3.0, 0.0)]);
        assert!((line.tour_length(&[0, 1]) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_singleton_and_empty_lengths() {
        let single = Graph::from_coordinates(&[(5.0, 5.0)]);
        assert_eq!(single.tour_length(&[0]), 0.0);

        let empty = Graph::default();
        assert_eq!(empty.tour_length(&[]), 0.0);
    }

    #[test]
    fn test_parse_stops_at_first_bad_record() {
        let text = "1 0.0 0.0\n2 1.5 2.5\n\n3 4 5\nEOF\n4 9.0 9.0\n";
        let graph = Graph::parse("partial", text);
        assert_eq!(graph.num_nodes(), 3);
        assert_eq!(graph.nodes[1], Node::new(2, 1.5, 2.5));
        assert_eq!(graph.nodes[2].id, 3);
    }

    #[test]
    fn test_parse_rejects_extra_fields() {
        let graph = Graph::parse("extra", "1 0 0\n2 1 1 7\n3 2 2\n");
        assert_eq!(graph.num_nodes(), 1);
    }

    #[test]
    fn test_from_reader_matches_parse() {
        let text = "10 0 0\n20 0 1\n30 1 1\n40 1 0\n";
        let graph = Graph::from_reader("square", text.as_bytes()).unwrap();
        assert_eq!(graph.num_nodes(), 4);
        assert_eq!(graph.tour_ids(&[2, 0]), vec![30, 10]);
    }

    #[test]
    fn test_statistics() {
        let stats = square().statistics();
        assert_eq!(stats.num_nodes, 4);
        assert!((stats.max_distance - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats.max_x, 1.0);
    }
}
