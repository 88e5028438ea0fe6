//! Indexed structural graph over the semantic model
//!
//! Nodes live in an arena keyed by qualified name; traversal always goes
//! through the arena lookup rather than through owning references, so cycles
//! and diamonds in the analyzed model need no special handling.

use crate::core::errors::Result;
use crate::graph::edge::{DerivationRule, Edge, EdgeKind, EdgeProof};
use crate::graph::types::{SemanticModel, TypeNode, TypeRef};
use im::{HashMap, Vector};
use serde::{Deserialize, Serialize};

type EdgeKey = (String, String, EdgeKind, Option<String>);

/// Read-only structural view the classifiers query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeGraph {
    nodes: HashMap<String, TypeNode>,
    /// Qualified names ascending; fixes iteration order
    order: Vector<String>,
    edges: Vector<Edge>,
    outgoing: HashMap<String, Vector<Edge>>,
    incoming: HashMap<String, Vector<Edge>>,
}

impl TypeGraph {
    /// Build the graph from a model: raw edges first, then derived ones.
    ///
    /// The edge set is independent of input iteration order because the model
    /// iterates ascending by name and every edge is keyed for deduplication.
    pub fn build(model: &SemanticModel) -> Result<TypeGraph> {
        let mut graph = TypeGraph {
            nodes: HashMap::new(),
            order: Vector::new(),
            edges: Vector::new(),
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
        };

        for node in model.types() {
            graph.nodes.insert(node.qualified_name.clone(), node.clone());
            graph.order.push_back(node.qualified_name.clone());
        }

        let mut seen: std::collections::HashSet<EdgeKey> = std::collections::HashSet::new();
        for node in model.types() {
            for edge in raw_edges(node, model) {
                graph.insert_deduped(edge, &mut seen)?;
            }
        }
        for node in model.types() {
            for edge in derived_edges(node, model) {
                graph.insert_deduped(edge, &mut seen)?;
            }
        }

        log::debug!(
            "type graph built: {} nodes, {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );
        Ok(graph)
    }

    /// Insert a single edge, enforcing the proof invariant
    pub fn insert(&mut self, edge: Edge) -> Result<()> {
        edge.validate()?;
        self.outgoing
            .entry(edge.from.clone())
            .or_default()
            .push_back(edge.clone());
        self.incoming
            .entry(edge.to.clone())
            .or_default()
            .push_back(edge.clone());
        self.edges.push_back(edge);
        Ok(())
    }

    fn insert_deduped(
        &mut self,
        edge: Edge,
        seen: &mut std::collections::HashSet<EdgeKey>,
    ) -> Result<()> {
        let key = (
            edge.from.clone(),
            edge.to.clone(),
            edge.kind,
            edge.proof.as_ref().map(|p| p.source_ref.clone()),
        );
        if seen.insert(key) {
            self.insert(edge)?;
        }
        Ok(())
    }

    pub fn node(&self, qualified_name: &str) -> Option<&TypeNode> {
        self.nodes.get(qualified_name)
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.nodes.contains_key(qualified_name)
    }

    /// Qualified names, ascending
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Nodes, ascending by qualified name
    pub fn nodes(&self) -> impl Iterator<Item = &TypeNode> {
        self.order.iter().filter_map(|name| self.nodes.get(name))
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn edges_from(&self, qualified_name: &str) -> Vec<&Edge> {
        self.outgoing
            .get(qualified_name)
            .map(|v| v.iter().collect())
            .unwrap_or_default()
    }

    pub fn edges_into(&self, qualified_name: &str) -> Vec<&Edge> {
        self.incoming
            .get(qualified_name)
            .map(|v| v.iter().collect())
            .unwrap_or_default()
    }

    pub fn edges_from_kind(&self, qualified_name: &str, kind: EdgeKind) -> Vec<&Edge> {
        self.edges_from(qualified_name)
            .into_iter()
            .filter(|e| e.kind == kind)
            .collect()
    }

    pub fn edges_into_kind(&self, qualified_name: &str, kind: EdgeKind) -> Vec<&Edge> {
        self.edges_into(qualified_name)
            .into_iter()
            .filter(|e| e.kind == kind)
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Directly observed relations of one node
fn raw_edges(node: &TypeNode, model: &SemanticModel) -> Vec<Edge> {
    let mut edges = Vec::new();
    let from = &node.qualified_name;

    if let Some(supertype) = &node.supertype {
        if model.contains(&supertype.raw) {
            edges.push(Edge::raw(from, &supertype.raw, EdgeKind::Extends));
        }
    }
    for iface in &node.interfaces {
        if model.contains(&iface.raw) {
            edges.push(Edge::raw(from, &iface.raw, EdgeKind::Implements));
        }
    }
    for field in node.instance_fields() {
        if model.contains(&field.ty.raw) {
            edges.push(Edge::raw(from, &field.ty.raw, EdgeKind::FieldType));
        }
    }
    for annotation in &node.annotations {
        if model.contains(&annotation.name) {
            edges.push(Edge::raw(from, &annotation.name, EdgeKind::AnnotatedBy));
        }
    }
    if let Some(enclosing) = &node.enclosing_type {
        if model.contains(enclosing) {
            edges.push(Edge::raw(enclosing, from, EdgeKind::Declares));
        }
    }

    edges
}

/// Computed relations of one node, each carrying its proof
fn derived_edges(node: &TypeNode, model: &SemanticModel) -> Vec<Edge> {
    let mut edges = Vec::new();
    let from = &node.qualified_name;

    // Signature usage is only observed on interfaces; concrete classes reach
    // their collaborators through fields instead.
    if node.is_interface() {
        for method in &node.methods {
            let mut mentioned = Vec::new();
            for param in &method.params {
                collect_signature_types(&param.ty, &mut mentioned);
            }
            if let Some(ret) = &method.return_type {
                collect_signature_types(ret, &mut mentioned);
            }
            for target in mentioned {
                if model.contains(&target) {
                    edges.push(Edge::derived(
                        from,
                        &target,
                        EdgeKind::UsesInSignature,
                        EdgeProof::method(&method.name, DerivationRule::SignatureUsage),
                    ));
                }
            }
        }
    }

    for field in node.instance_fields() {
        if field.ty.unwrap_element().is_none() {
            continue;
        }
        let rule = if field.ty.is_optional() {
            DerivationRule::OptionalUnwrap
        } else {
            DerivationRule::CollectionUnwrap
        };
        let element = field.ty.innermost();
        if model.contains(&element.raw) {
            edges.push(Edge::derived(
                from,
                &element.raw,
                EdgeKind::UsesAsCollectionElement,
                EdgeProof::field(&field.name, rule),
            ));
        }
    }

    edges
}

/// Collect every raw name mentioned in a signature reference, unwrapping
/// generics along the way
fn collect_signature_types(ty: &TypeRef, out: &mut Vec<String>) {
    out.push(ty.raw.clone());
    for arg in &ty.type_args {
        collect_signature_types(arg, out);
    }
}
