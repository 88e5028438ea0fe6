//! Domain-role classification
//!
//! A fixed sequence of phases walks the semantic model. Each phase claims
//! only types no earlier phase has touched, so the first rule to fire on a
//! type decides it. The residual phase is total: every model type ends up
//! with exactly one classification, even if that classification is
//! UNCLASSIFIED.

pub mod criteria;
pub mod discriminators;

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;

use crate::analysis;
use crate::composition::{self, CompositionGraph};
use crate::config::AnalysisConfig;
use crate::core::{
    CertaintyLevel, Classification, ClassificationResult, ClassificationStrategy, DomainKind,
    Evidence, EvidenceKind,
};
use crate::criteria::{CompatibilityTable, Contribution, CriteriaEngine, Decision};
use crate::graph::{SemanticModel, TypeGraph, TypeNode};

use self::criteria::{configured_criteria, marker_criteria};
use self::discriminators::discover_repository_bindings;

/// Output of the domain pipeline: one classification per model type plus
/// the composition graph the inference phases ran on.
#[derive(Debug, Clone)]
pub struct DomainAnalysis {
    pub result: ClassificationResult,
    pub composition: CompositionGraph,
}

/// Classifies every type in the model.
///
/// Phase order is fixed: explicit markers, repository bindings, immutable
/// products, id wrappers, composition inference, residual marking, anomaly
/// detection. A type keeps the first classification it receives.
pub fn classify(
    model: &SemanticModel,
    graph: &TypeGraph,
    config: &AnalysisConfig,
) -> DomainAnalysis {
    let mut classifications: BTreeMap<String, Classification> = BTreeMap::new();

    let conflicted = classify_explicit(model, graph, config, &mut classifications);
    classify_repository_backed(model, &mut classifications);
    classify_immutable_products(model, &mut classifications);
    classify_id_wrappers(model, &mut classifications);

    // Roots known before inference starts: annotated, configured, or
    // repository-backed aggregates. Field references to these become
    // direct-reference edges instead of composition.
    let known_aggregates: BTreeSet<String> = classifications
        .iter()
        .filter(|(_, c)| c.kind == DomainKind::AggregateRoot)
        .map(|(name, _)| name.clone())
        .collect();
    let composition = composition::build(model, &known_aggregates);

    classify_from_composition(&composition, &mut classifications);
    classify_residual(model, &conflicted, &mut classifications);

    let anomalies = analysis::detect_anomalies(&composition, &classifications, &config.cycles);
    log::debug!(
        "classified {} types, {} anomalies",
        classifications.len(),
        anomalies.len()
    );

    DomainAnalysis {
        result: ClassificationResult::new(classifications, anomalies),
        composition,
    }
}

/// Explicit markers and configured kinds.
///
/// Incompatible markers on one type claim nothing; the type stays open for
/// the structural phases, and the conflicting kinds are remembered so the
/// residual phase can name them.
fn classify_explicit(
    model: &SemanticModel,
    graph: &TypeGraph,
    config: &AnalysisConfig,
    classifications: &mut BTreeMap<String, Classification>,
) -> BTreeMap<String, Vec<DomainKind>> {
    let mut rules = marker_criteria();
    rules.extend(configured_criteria(&config.explicit_kinds));
    let engine = CriteriaEngine::new(
        rules,
        CompatibilityTable::none().with_pair(DomainKind::AggregateRoot, DomainKind::Entity),
    );

    let nodes: Vec<&TypeNode> = model.types().collect();
    let mut evaluated: Vec<(String, Vec<Contribution<DomainKind>>)> = if config.parallel {
        nodes
            .par_iter()
            .map(|node| (node.qualified_name.clone(), engine.evaluate(node, graph)))
            .collect()
    } else {
        nodes
            .iter()
            .map(|node| (node.qualified_name.clone(), engine.evaluate(node, graph)))
            .collect()
    };
    evaluated.sort_by(|a, b| a.0.cmp(&b.0));

    let mut conflicted = BTreeMap::new();
    for (name, contributions) in evaluated {
        let kinds: BTreeSet<DomainKind> = contributions.iter().map(|c| c.kind).collect();
        match engine.resolve(contributions) {
            Decision::Classified {
                kind,
                justification,
                evidence,
                ..
            } => {
                classifications.insert(
                    name.clone(),
                    Classification::new(
                        &name,
                        kind,
                        CertaintyLevel::Explicit,
                        ClassificationStrategy::Annotation,
                        justification,
                        evidence,
                    ),
                );
            }
            Decision::Conflicted { .. } => {
                conflicted.insert(name, kinds.into_iter().collect());
            }
            Decision::Unmatched => {}
        }
    }
    log::debug!(
        "explicit phase claimed {} types, {} conflicted",
        classifications.len(),
        conflicted.len()
    );
    conflicted
}

/// Aggregate roots discovered through repository interfaces.
fn classify_repository_backed(
    model: &SemanticModel,
    classifications: &mut BTreeMap<String, Classification>,
) {
    let mut claimed = 0usize;
    for binding in discover_repository_bindings(model) {
        if classifications.contains_key(&binding.managed_type) {
            continue;
        }
        let classification = Classification::new(
            &binding.managed_type,
            DomainKind::AggregateRoot,
            CertaintyLevel::CertainByStructure,
            ClassificationStrategy::Repository,
            binding.reasoning,
            binding.evidence,
        );
        classifications.insert(binding.managed_type, classification);
        claimed += 1;
    }
    log::debug!("repository phase claimed {claimed} aggregate roots");
}

/// Immutable product types without identity are value objects.
fn classify_immutable_products(
    model: &SemanticModel,
    classifications: &mut BTreeMap<String, Classification>,
) {
    for node in domain_candidates(model) {
        if classifications.contains_key(&node.qualified_name) {
            continue;
        }
        if !node.is_immutable_product() || node.has_identity_field() || node.has_id_suffix() {
            continue;
        }
        let (shape, reasoning) = if node.is_record() {
            (
                "Type is a record",
                format!(
                    "Record '{}' without identity is classified as VALUE_OBJECT",
                    node.simple_name
                ),
            )
        } else {
            (
                "All fields are final",
                format!(
                    "Immutable type '{}' without identity is classified as VALUE_OBJECT",
                    node.simple_name
                ),
            )
        };
        let evidence = vec![
            Evidence::new(EvidenceKind::Structure, shape),
            Evidence::new(EvidenceKind::Structure, "Type has no identity field"),
        ];
        classifications.insert(
            node.qualified_name.clone(),
            Classification::new(
                &node.qualified_name,
                DomainKind::ValueObject,
                CertaintyLevel::CertainByStructure,
                ClassificationStrategy::Record,
                reasoning,
                evidence,
            ),
        );
    }
}

/// Single-field wrappers named `*Id` are identifiers.
fn classify_id_wrappers(
    model: &SemanticModel,
    classifications: &mut BTreeMap<String, Classification>,
) {
    for node in domain_candidates(model) {
        if classifications.contains_key(&node.qualified_name) {
            continue;
        }
        if !node.is_id_wrapper() {
            continue;
        }
        let reasoning = format!(
            "Type '{}' is an ID wrapper (single field with Id naming)",
            node.simple_name
        );
        let evidence = vec![
            Evidence::new(EvidenceKind::Naming, "Type name ends with 'Id' or 'ID'"),
            Evidence::new(EvidenceKind::Structure, "Type has exactly one field"),
        ];
        classifications.insert(
            node.qualified_name.clone(),
            Classification::new(
                &node.qualified_name,
                DomainKind::Identifier,
                CertaintyLevel::CertainByStructure,
                ClassificationStrategy::Record,
                reasoning,
                evidence,
            ),
        );
    }
}

/// Inference over the composition graph.
///
/// Roots claim first so a root with identity lands AGGREGATE_ROOT before
/// the composed pass considers anything it contains.
fn classify_from_composition(
    graph: &CompositionGraph,
    classifications: &mut BTreeMap<String, Classification>,
) {
    for name in graph.roots() {
        if classifications.contains_key(&name) {
            continue;
        }
        let Some(node) = graph.node(&name) else {
            continue;
        };
        if !node.has_identity || node.is_id_wrapper {
            continue;
        }
        let reasoning = format!(
            "Type '{}' is a composition root with identity, inferred as AGGREGATE_ROOT",
            node.simple_name
        );
        let evidence = vec![
            Evidence::new(
                EvidenceKind::Relationship,
                "Type is not composed by any other type",
            ),
            Evidence::new(EvidenceKind::Structure, "Type has an identity field"),
        ];
        classifications.insert(
            name.clone(),
            Classification::new(
                &name,
                DomainKind::AggregateRoot,
                CertaintyLevel::Inferred,
                ClassificationStrategy::Composition,
                reasoning,
                evidence,
            ),
        );
    }

    for node in graph.nodes() {
        if classifications.contains_key(&node.name) {
            continue;
        }
        let composers = graph.composers_of(&node.name);
        if composers.is_empty() {
            continue;
        }
        let (kind, reasoning, identity) = if node.has_identity && !node.is_id_wrapper {
            (
                DomainKind::Entity,
                format!(
                    "Type '{}' has identity and is composed by other types, classified as ENTITY",
                    node.simple_name
                ),
                Evidence::new(EvidenceKind::Structure, "Type has an identity field"),
            )
        } else if !node.has_identity {
            (
                DomainKind::ValueObject,
                format!(
                    "Type '{}' has no identity and is composed by other types, classified as VALUE_OBJECT",
                    node.simple_name
                ),
                Evidence::new(EvidenceKind::Structure, "Type has no identity field"),
            )
        } else {
            continue;
        };
        let evidence = vec![
            Evidence::with_related(
                EvidenceKind::Relationship,
                "Type is composed by other types",
                composers,
            ),
            identity,
        ];
        classifications.insert(
            node.name.clone(),
            Classification::new(
                &node.name,
                kind,
                CertaintyLevel::Inferred,
                ClassificationStrategy::Composition,
                reasoning,
                evidence,
            ),
        );
    }
}

/// The residual pass. Marks whatever is left, so the result covers the
/// whole model.
fn classify_residual(
    model: &SemanticModel,
    conflicted: &BTreeMap<String, Vec<DomainKind>>,
    classifications: &mut BTreeMap<String, Classification>,
) {
    for node in model.types() {
        if classifications.contains_key(&node.qualified_name) {
            continue;
        }
        let reasoning = match conflicted.get(&node.qualified_name) {
            Some(kinds) => {
                let listed: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
                format!(
                    "Type '{}' carries conflicting explicit markers: {}",
                    node.simple_name,
                    listed.join(", ")
                )
            }
            None => format!(
                "Type '{}' could not be classified by any deterministic rule",
                node.simple_name
            ),
        };
        classifications.insert(
            node.qualified_name.clone(),
            Classification::unclassified(&node.qualified_name, reasoning),
        );
    }
}

fn domain_candidates(model: &SemanticModel) -> impl Iterator<Item = &TypeNode> {
    model.types().filter(|t| t.form.is_domain_candidate())
}
