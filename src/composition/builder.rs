//! Derives the composition graph from model fields

use crate::composition::{
    Cardinality, CompositionEdge, CompositionGraph, CompositionNode, RelationType,
};
use crate::graph::types::{SemanticModel, TypeRef};
use std::collections::BTreeSet;

/// Build the composition graph over all domain-candidate types.
///
/// `known_aggregates` carries the types earlier phases already classified as
/// aggregate roots: a field targeting one of them is a reference into a
/// foreign boundary, not a composition. Targets that wrap an identifier are
/// references by id. Everything else a field holds is composed.
pub fn build(model: &SemanticModel, known_aggregates: &BTreeSet<String>) -> CompositionGraph {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for node in model.types().filter(|t| t.form.is_domain_candidate()) {
        nodes.push(CompositionNode {
            name: node.qualified_name.clone(),
            simple_name: node.simple_name.clone(),
            has_identity: node.has_identity_field(),
            is_id_wrapper: node.is_id_wrapper(),
            is_record: node.is_record(),
        });
    }

    for node in model.types().filter(|t| t.form.is_domain_candidate()) {
        for field in node.instance_fields() {
            let (target, cardinality) = resolve_target(&field.ty);
            let Some(target_node) = model.get(&target) else {
                continue;
            };
            if !target_node.form.is_domain_candidate() {
                continue;
            }
            let relation = if target_node.is_id_wrapper() {
                RelationType::ReferenceById
            } else if known_aggregates.contains(&target) {
                RelationType::DirectReference
            } else {
                RelationType::Composition
            };
            edges.push(CompositionEdge {
                source: node.qualified_name.clone(),
                target,
                field: field.name.clone(),
                relation,
                cardinality,
            });
        }
    }

    log::debug!(
        "composition graph built: {} nodes, {} edges",
        nodes.len(),
        edges.len()
    );
    CompositionGraph::new(nodes, edges)
}

/// Unwrap collection, optional and array layers down to the held type
fn resolve_target(ty: &TypeRef) -> (String, Cardinality) {
    let mut cardinality = Cardinality::One;
    let mut current = ty.clone();
    loop {
        if current.is_array() || current.is_collection() {
            cardinality = Cardinality::Many;
        }
        match current.unwrap_element() {
            Some(inner) => current = inner,
            None => break,
        }
    }
    (current.raw, cardinality)
}
