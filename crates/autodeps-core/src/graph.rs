//! # Dependency Graph
//!
//! A directed acyclic graph over string-labelled vertices.
//!
//! An edge `u -> v` means "v depends on u": `u` must be available before `v`.
//! Edges that would close a cycle are rejected on insertion, so a `Dag` is
//! acyclic at every point of its life.
//!
//! Vertices are numbered in insertion order. Adjacency lists keep edge
//! insertion order and the label index is a `BTreeMap`, so every query and
//! the topological sort are deterministic.

use crate::CycleError;
use std::collections::{BTreeMap, BTreeSet};

/// Internal vertex handle; the insertion index of the vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct VertexId(usize);

/// A single vertex with its adjacency in both directions.
#[derive(Debug, Clone)]
struct Vertex {
    label: String,
    /// Vertices that depend on this one (outgoing edges).
    dependents: Vec<VertexId>,
    /// Vertices this one depends on (incoming edges, the reverse index).
    dependencies: Vec<VertexId>,
}

/// The dependency graph.
#[derive(Debug, Clone, Default)]
pub struct Dag {
    /// Vertex storage, indexed by `VertexId`.
    vertices: Vec<Vertex>,
    /// Label -> VertexId
    index: BTreeMap<String, VertexId>,
    edge_count: usize,
}

impl Dag {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex. Adding an existing label is a no-op.
    pub fn add_vertex(&mut self, label: &str) {
        self.vertex_id(label);
    }

    /// Get or create the vertex for `label`.
    fn vertex_id(&mut self, label: &str) -> VertexId {
        if let Some(&id) = self.index.get(label) {
            return id;
        }
        let id = VertexId(self.vertices.len());
        self.vertices.push(Vertex {
            label: label.to_string(),
            dependents: Vec::new(),
            dependencies: Vec::new(),
        });
        self.index.insert(label.to_string(), id);
        id
    }

    /// Add the edge `from -> to` ("`to` depends on `from`").
    ///
    /// Missing endpoints are added as vertices. Inserting an existing edge is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CycleError` if `to` already reaches `from`, including the
    /// self-edge `from == to`. The graph is left unchanged in that case, apart
    /// from the endpoint vertices.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<(), CycleError> {
        let source = self.vertex_id(from);
        let target = self.vertex_id(to);

        if self.vertices[source.0].dependents.contains(&target) {
            return Ok(());
        }

        if let Some(path) = self.find_path(target, source) {
            let mut cycle = Vec::with_capacity(path.len() + 1);
            cycle.push(from.to_string());
            cycle.extend(path.into_iter().map(|id| self.vertices[id.0].label.clone()));
            return Err(CycleError {
                from: from.to_string(),
                to: to.to_string(),
                cycle,
            });
        }

        self.vertices[source.0].dependents.push(target);
        self.vertices[target.0].dependencies.push(source);
        self.edge_count = self.edge_count.saturating_add(1);
        Ok(())
    }

    /// Depth-first search for a path `start ->* goal` along outgoing edges.
    ///
    /// Returns the vertices of the path, `start` and `goal` included.
    fn find_path(&self, start: VertexId, goal: VertexId) -> Option<Vec<VertexId>> {
        if start == goal {
            return Some(vec![start]);
        }

        let mut visited = BTreeSet::new();
        let mut parent: BTreeMap<VertexId, VertexId> = BTreeMap::new();
        let mut stack = vec![start];
        visited.insert(start);

        while let Some(current) = stack.pop() {
            for &next in &self.vertices[current.0].dependents {
                if !visited.insert(next) {
                    continue;
                }
                parent.insert(next, current);
                if next == goal {
                    let mut path = vec![goal];
                    let mut cursor = goal;
                    while let Some(&prev) = parent.get(&cursor) {
                        path.push(prev);
                        cursor = prev;
                    }
                    path.reverse();
                    return Some(path);
                }
                stack.push(next);
            }
        }

        None
    }

    /// Labels of the vertices that depend on `label` (outgoing edges),
    /// in edge insertion order. Empty if the vertex is absent.
    #[must_use]
    pub fn dependents(&self, label: &str) -> Vec<&str> {
        self.index
            .get(label)
            .map(|id| self.labels(&self.vertices[id.0].dependents))
            .unwrap_or_default()
    }

    /// Labels of the vertices `label` depends on (incoming edges),
    /// in edge insertion order. Empty if the vertex is absent.
    #[must_use]
    pub fn dependencies(&self, label: &str) -> Vec<&str> {
        self.index
            .get(label)
            .map(|id| self.labels(&self.vertices[id.0].dependencies))
            .unwrap_or_default()
    }

    fn labels(&self, ids: &[VertexId]) -> Vec<&str> {
        ids.iter()
            .map(|id| self.vertices[id.0].label.as_str())
            .collect()
    }

    /// Sort the vertices so that for every edge `u -> v`, `u` comes first.
    ///
    /// Kahn's algorithm. Among vertices whose dependencies are all emitted,
    /// the one inserted first is emitted first.
    ///
    /// # Errors
    ///
    /// Returns `CycleError` if some vertices can never be emitted. `add_edge`
    /// rejects every cycle-forming edge, so this only guards the invariant.
    pub fn topological_sort(&self) -> Result<Vec<String>, CycleError> {
        let mut pending: Vec<usize> = self
            .vertices
            .iter()
            .map(|vertex| vertex.dependencies.len())
            .collect();

        let mut ready: BTreeSet<VertexId> = pending
            .iter()
            .enumerate()
            .filter(|(_, count)| **count == 0)
            .map(|(i, _)| VertexId(i))
            .collect();

        let mut order = Vec::with_capacity(self.vertices.len());

        while let Some(current) = ready.pop_first() {
            order.push(self.vertices[current.0].label.clone());
            for &next in &self.vertices[current.0].dependents {
                let count = &mut pending[next.0];
                *count = count.saturating_sub(1);
                if *count == 0 {
                    ready.insert(next);
                }
            }
        }

        if order.len() < self.vertices.len() {
            let stuck: Vec<String> = pending
                .iter()
                .enumerate()
                .filter(|(_, count)| **count > 0)
                .map(|(i, _)| self.vertices[i].label.clone())
                .collect();
            let from = stuck.first().cloned().unwrap_or_default();
            let to = stuck.last().cloned().unwrap_or_default();
            return Err(CycleError {
                from,
                to,
                cycle: stuck,
            });
        }

        Ok(order)
    }

    /// Check if a vertex with this label exists.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Check if the edge `from -> to` exists.
    #[must_use]
    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(source), Some(target)) => self.vertices[source.0].dependents.contains(target),
            _ => false,
        }
    }

    /// Total number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Vertex labels in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &str> {
        self.vertices.iter().map(|vertex| vertex.label.as_str())
    }

    /// All edges `(from, to)`, grouped by source in vertex insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.vertices.iter().flat_map(move |vertex| {
            vertex
                .dependents
                .iter()
                .map(move |id| (vertex.label.as_str(), self.vertices[id.0].label.as_str()))
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
