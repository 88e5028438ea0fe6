//! Architectural anomaly checks over the composition graph and the final
//! classification map
//!
//! Five independent checks run in a fixed order and their results are
//! concatenated, so anomaly output depends only on the inputs.

use std::collections::{BTreeMap, BTreeSet};

use crate::analysis::cycles::{detect_cycles, CycleConfig};
use crate::composition::{CompositionEdge, CompositionGraph, RelationType};
use crate::core::{
    simple_name, Anomaly, AnomalyKind, Classification, ClassificationStrategy, DomainKind,
};

/// Runs every anomaly check.
///
/// Order is fixed: direct aggregate references, composition cycles, shared
/// entities, aggregates without repository, value objects with identity.
pub fn detect(
    graph: &CompositionGraph,
    classifications: &BTreeMap<String, Classification>,
    cycles: &CycleConfig,
) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();
    anomalies.extend(direct_aggregate_references(graph, classifications));
    anomalies.extend(composition_cycles(graph, cycles));
    anomalies.extend(shared_entities(graph, classifications));
    anomalies.extend(aggregates_without_repositories(classifications));
    anomalies.extend(value_objects_with_identity(graph, classifications));
    anomalies
}

fn aggregate_roots(classifications: &BTreeMap<String, Classification>) -> BTreeSet<&str> {
    classifications
        .iter()
        .filter(|(_, c)| c.kind == DomainKind::AggregateRoot)
        .map(|(name, _)| name.as_str())
        .collect()
}

/// An aggregate root holding another aggregate root by value instead of by id
fn direct_aggregate_references(
    graph: &CompositionGraph,
    classifications: &BTreeMap<String, Classification>,
) -> Vec<Anomaly> {
    let roots = aggregate_roots(classifications);

    let mut anomalies = Vec::new();
    for edge in graph.edges() {
        if edge.relation != RelationType::DirectReference {
            continue;
        }
        if roots.contains(edge.source.as_str()) && roots.contains(edge.target.as_str()) {
            let message = format!(
                "Aggregate root '{}' directly references aggregate root '{}' via field '{}'. \
                 Use ID reference instead for proper aggregate isolation.",
                simple_name(&edge.source),
                simple_name(&edge.target),
                edge.field,
            );
            anomalies.push(Anomaly::warning(
                AnomalyKind::DirectAggregateReference,
                edge.source.clone(),
                message,
                vec![edge.target.clone()],
            ));
        }
    }
    anomalies
}

/// Cycles among composition edges only; reference edges cannot form one
fn composition_cycles(graph: &CompositionGraph, config: &CycleConfig) -> Vec<Anomaly> {
    let composition_edges: Vec<CompositionEdge> = graph
        .edges()
        .filter(|e| e.is_composition())
        .cloned()
        .collect();

    let nodes: Vec<String> = composition_edges
        .iter()
        .flat_map(|e| [e.source.clone(), e.target.clone()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let found = detect_cycles(
        &nodes,
        &composition_edges,
        |e| e.source.as_str(),
        |e| e.target.as_str(),
        config,
    );

    let mut anomalies = Vec::new();
    for cycle in found {
        let Some(first) = cycle.edges.first() else {
            continue;
        };
        let description = cycle
            .edges
            .iter()
            .map(|e| format!("{}.{}", simple_name(&e.source), e.field))
            .collect::<Vec<_>>()
            .join(" -> ");
        let message = format!(
            "Composition cycle detected: {description}. \
             Cycles can cause serialization issues and indicate modeling problems.",
        );
        anomalies.push(Anomaly::error(
            AnomalyKind::CompositionCycle,
            first.source.clone(),
            message,
            cycle.sorted_members(),
        ));
    }
    anomalies
}

/// An entity composed by more than one owner
fn shared_entities(
    graph: &CompositionGraph,
    classifications: &BTreeMap<String, Classification>,
) -> Vec<Anomaly> {
    let mut composers_by_entity: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for edge in graph.edges() {
        if !edge.is_composition() {
            continue;
        }
        let target_is_entity = classifications
            .get(&edge.target)
            .is_some_and(|c| c.kind == DomainKind::Entity);
        if target_is_entity {
            composers_by_entity
                .entry(edge.target.as_str())
                .or_default()
                .insert(edge.source.as_str());
        }
    }

    let mut anomalies = Vec::new();
    for (entity, composers) in composers_by_entity {
        if composers.len() < 2 {
            continue;
        }
        let listed = composers
            .iter()
            .map(|c| simple_name(c))
            .collect::<Vec<_>>()
            .join(", ");
        let message = format!(
            "Entity '{}' is composed by multiple aggregates: {}. \
             An entity should belong to exactly one aggregate.",
            simple_name(entity),
            listed,
        );
        anomalies.push(Anomaly::error(
            AnomalyKind::SharedEntity,
            entity,
            message,
            composers.into_iter().map(String::from).collect(),
        ));
    }
    anomalies
}

/// An aggregate root that no repository interface manages
fn aggregates_without_repositories(
    classifications: &BTreeMap<String, Classification>,
) -> Vec<Anomaly> {
    classifications
        .iter()
        .filter(|(_, c)| {
            c.kind == DomainKind::AggregateRoot && c.strategy != ClassificationStrategy::Repository
        })
        .map(|(name, _)| {
            let message = format!(
                "Aggregate root '{}' has no corresponding repository. \
                 Consider creating a repository or reviewing the classification.",
                simple_name(name),
            );
            Anomaly::warning(
                AnomalyKind::AggregateWithoutRepository,
                name.clone(),
                message,
                Vec::new(),
            )
        })
        .collect()
}

/// A value object whose node structurally carries identity
fn value_objects_with_identity(
    graph: &CompositionGraph,
    classifications: &BTreeMap<String, Classification>,
) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();
    for (name, classification) in classifications {
        if classification.kind != DomainKind::ValueObject {
            continue;
        }
        let Some(node) = graph.node(name) else {
            continue;
        };
        if node.has_identity && !node.is_id_wrapper {
            let message = format!(
                "Value object '{}' has an identity field. \
                 Value objects should not have identity - consider reclassifying as ENTITY.",
                simple_name(name),
            );
            anomalies.push(Anomaly::warning(
                AnomalyKind::ValueObjectWithIdentity,
                name.clone(),
                message,
                Vec::new(),
            ));
        }
    }
    anomalies
}
