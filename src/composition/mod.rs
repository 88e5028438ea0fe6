//! Composition graph: strong containment vs weak reference per field
//!
//! A narrower view than the full type graph, derived from fields only. The
//! graph-based inference phase and the anomaly checks both run on it.

pub mod builder;

use im::{HashMap, HashSet, Vector};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use builder::build;

/// Strength of a field relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    /// The source owns the target
    Composition,
    /// The source points at the target through an identifier wrapper
    ReferenceById,
    /// The source holds the target directly without owning it
    DirectReference,
}

/// How many targets a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cardinality {
    One,
    Many,
}

/// Per-type view used by graph inference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionNode {
    pub name: String,
    pub simple_name: String,
    pub has_identity: bool,
    pub is_id_wrapper: bool,
    pub is_record: bool,
}

/// A single field relationship between two types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositionEdge {
    pub source: String,
    pub target: String,
    pub field: String,
    pub relation: RelationType,
    pub cardinality: Cardinality,
}

impl CompositionEdge {
    pub fn is_composition(&self) -> bool {
        self.relation == RelationType::Composition
    }
}

/// Counts summarizing a composition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionStats {
    pub nodes: usize,
    pub edges: usize,
    pub composition_edges: usize,
    pub reference_by_id_edges: usize,
    pub direct_reference_edges: usize,
    pub roots: usize,
}

impl fmt::Display for CompositionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompositionGraph: {} nodes, {} edges ({} composition, {} ref-by-id, {} direct-ref), {} roots",
            self.nodes,
            self.edges,
            self.composition_edges,
            self.reference_by_id_edges,
            self.direct_reference_edges,
            self.roots
        )
    }
}

/// The composition graph with its query caches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionGraph {
    nodes: HashMap<String, CompositionNode>,
    /// Node names ascending
    order: Vector<String>,
    edges: Vector<CompositionEdge>,
    outgoing: HashMap<String, Vector<CompositionEdge>>,
    incoming: HashMap<String, Vector<CompositionEdge>>,
    /// target -> sources that compose it
    composed_by: HashMap<String, HashSet<String>>,
    /// source -> targets it composes
    composes: HashMap<String, HashSet<String>>,
    /// target -> sources referencing it by id
    referenced_by_id: HashMap<String, HashSet<String>>,
}

impl CompositionGraph {
    pub(crate) fn new(nodes: Vec<CompositionNode>, edges: Vec<CompositionEdge>) -> Self {
        let mut graph = CompositionGraph {
            nodes: HashMap::new(),
            order: Vector::new(),
            edges: Vector::new(),
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
            composed_by: HashMap::new(),
            composes: HashMap::new(),
            referenced_by_id: HashMap::new(),
        };
        for node in nodes {
            graph.order.push_back(node.name.clone());
            graph.nodes.insert(node.name.clone(), node);
        }
        for edge in edges {
            graph
                .outgoing
                .entry(edge.source.clone())
                .or_default()
                .push_back(edge.clone());
            graph
                .incoming
                .entry(edge.target.clone())
                .or_default()
                .push_back(edge.clone());
            match edge.relation {
                RelationType::Composition => {
                    graph
                        .composed_by
                        .entry(edge.target.clone())
                        .or_default()
                        .insert(edge.source.clone());
                    graph
                        .composes
                        .entry(edge.source.clone())
                        .or_default()
                        .insert(edge.target.clone());
                }
                RelationType::ReferenceById => {
                    graph
                        .referenced_by_id
                        .entry(edge.target.clone())
                        .or_default()
                        .insert(edge.source.clone());
                }
                RelationType::DirectReference => {}
            }
            graph.edges.push_back(edge);
        }
        graph
    }

    pub fn node(&self, name: &str) -> Option<&CompositionNode> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Node names, ascending
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Nodes, ascending by name
    pub fn nodes(&self) -> impl Iterator<Item = &CompositionNode> {
        self.order.iter().filter_map(|name| self.nodes.get(name))
    }

    /// Edges in deterministic build order
    pub fn edges(&self) -> impl Iterator<Item = &CompositionEdge> {
        self.edges.iter()
    }

    pub fn outgoing(&self, name: &str) -> Vec<&CompositionEdge> {
        self.outgoing
            .get(name)
            .map(|v| v.iter().collect())
            .unwrap_or_default()
    }

    pub fn incoming(&self, name: &str) -> Vec<&CompositionEdge> {
        self.incoming
            .get(name)
            .map(|v| v.iter().collect())
            .unwrap_or_default()
    }

    /// Types composing the given one, ascending
    pub fn composers_of(&self, name: &str) -> Vec<String> {
        sorted(self.composed_by.get(name))
    }

    /// Types the given one composes, ascending
    pub fn composed_types_of(&self, name: &str) -> Vec<String> {
        sorted(self.composes.get(name))
    }

    /// Types referencing the given one through its id wrapper, ascending
    pub fn referencers_by_id(&self, name: &str) -> Vec<String> {
        sorted(self.referenced_by_id.get(name))
    }

    pub fn is_composed(&self, name: &str) -> bool {
        self.composed_by
            .get(name)
            .map(|s| !s.is_empty())
            .unwrap_or(false)
    }

    /// A root is a known node nothing composes
    pub fn is_composition_root(&self, name: &str) -> bool {
        self.contains(name) && !self.is_composed(name)
    }

    /// All composition roots, ascending
    pub fn roots(&self) -> Vec<String> {
        self.node_names()
            .filter(|n| self.is_composition_root(n))
            .map(str::to_string)
            .collect()
    }

    /// The aggregate boundary of a type: itself plus everything reachable
    /// through composition edges. Cycle-safe; result is ascending.
    pub fn transitive_composed_types(&self, name: &str) -> Vec<String> {
        let mut visited: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
        if !self.contains(name) {
            return Vec::new();
        }
        let mut stack = vec![name.to_string()];
        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for target in self.composed_types_of(&current) {
                if !visited.contains(&target) {
                    stack.push(target);
                }
            }
        }
        visited.into_iter().collect()
    }

    /// GraphViz rendering of the whole graph
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph composition {\n");
        out.push_str("  rankdir=LR;\n");
        out.push_str("  node [shape=box, style=filled];\n");
        for node in self.nodes() {
            let color = if node.is_id_wrapper {
                "lightblue"
            } else if node.has_identity {
                "lightgreen"
            } else {
                "lightyellow"
            };
            let shape = if node.is_record { "component" } else { "box" };
            out.push_str(&format!(
                "  \"{}\" [fillcolor={}, shape={}];\n",
                node.simple_name, color, shape
            ));
        }
        for edge in self.edges() {
            let style = match edge.relation {
                RelationType::Composition => "style=solid",
                RelationType::ReferenceById => "style=dashed",
                RelationType::DirectReference => "style=dotted, color=red",
            };
            let label = match edge.cardinality {
                Cardinality::One => edge.field.clone(),
                Cardinality::Many => format!("{}[]", edge.field),
            };
            out.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\", {}];\n",
                crate::core::types::simple_name(&edge.source),
                crate::core::types::simple_name(&edge.target),
                label,
                style
            ));
        }
        out.push_str("}\n");
        out
    }

    pub fn stats(&self) -> CompositionStats {
        let composition_edges = self.edges.iter().filter(|e| e.is_composition()).count();
        let reference_by_id_edges = self
            .edges
            .iter()
            .filter(|e| e.relation == RelationType::ReferenceById)
            .count();
        let direct_reference_edges = self
            .edges
            .iter()
            .filter(|e| e.relation == RelationType::DirectReference)
            .count();
        CompositionStats {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
            composition_edges,
            reference_by_id_edges,
            direct_reference_edges,
            roots: self.roots().len(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

fn sorted(set: Option<&HashSet<String>>) -> Vec<String> {
    let mut v: Vec<String> = set
        .map(|s| s.iter().cloned().collect())
        .unwrap_or_default();
    v.sort();
    v
}
