//! Port classification over the interfaces of the semantic model
//!
//! Interfaces run through the shared criteria engine with the port criterion
//! set. Direction follows from the winning kind. A refinement pass corrects
//! heuristic kinds against method-signature shape; explicit markers are
//! final.

pub mod criteria;
pub mod methods;

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{
    ClassificationResult, ConfidenceLevel, Evidence, EvidenceKind, PortDirection, PortKind,
};
use crate::criteria::{CompatibilityTable, Conflict, CriteriaEngine, Decision};
use crate::graph::{SemanticModel, TypeGraph, TypeNode};

pub use methods::{managed_types, method_kinds, primary_managed_type, PortMethodKind};

/// Outcome category for one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationStatus {
    Classified,
    Conflict,
    Unclassified,
}

/// Full port verdict for one interface, including the method-level facts the
/// decision was based on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortClassification {
    pub type_name: String,
    pub status: ClassificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PortKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<PortDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<ConfidenceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criterion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    pub justification: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<Evidence>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<Conflict>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub method_kinds: Vec<(String, PortMethodKind)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_managed_type: Option<String>,
}

impl PortClassification {
    fn shell(type_name: &str, status: ClassificationStatus, justification: impl Into<String>) -> Self {
        Self {
            type_name: type_name.to_string(),
            status,
            kind: None,
            direction: None,
            confidence: None,
            criterion: None,
            priority: None,
            justification: justification.into(),
            evidence: Vec::new(),
            conflicts: Vec::new(),
            method_kinds: Vec::new(),
            managed_types: Vec::new(),
            primary_managed_type: None,
        }
    }

    pub fn is_classified(&self) -> bool {
        self.status == ClassificationStatus::Classified
    }
}

/// Classifies interfaces into port kinds with the default criterion set.
///
/// Ports never share kinds, so the compatibility table stays empty and every
/// equal-priority disagreement is a conflict.
pub struct PortClassifier {
    engine: CriteriaEngine<PortKind>,
}

impl PortClassifier {
    pub fn new() -> Self {
        Self {
            engine: CriteriaEngine::new(criteria::default_criteria(), CompatibilityTable::none()),
        }
    }

    /// Classifies one type. Non-interfaces are rejected up front.
    pub fn classify(
        &self,
        node: &TypeNode,
        graph: &TypeGraph,
        model: &SemanticModel,
        domain: &ClassificationResult,
    ) -> PortClassification {
        if !node.is_interface() {
            return PortClassification::shell(
                &node.qualified_name,
                ClassificationStatus::Unclassified,
                "Type is not an interface",
            );
        }

        let method_kinds = methods::method_kinds(node);
        let managed = methods::managed_types(node, model);
        let primary = methods::primary_managed_type(&managed, domain);

        let mut classification = match self.engine.decide(node, graph) {
            Decision::Unmatched => {
                let mut shell = PortClassification::shell(
                    &node.qualified_name,
                    ClassificationStatus::Unclassified,
                    "No criterion matched",
                );
                shell.criterion = Some("no-matching-criterion".to_string());
                shell
            }
            Decision::Conflicted { conflicts } => {
                let mut shell = PortClassification::shell(
                    &node.qualified_name,
                    ClassificationStatus::Conflict,
                    "Conflicting criteria matched at the same priority",
                );
                shell.conflicts = conflicts;
                shell
            }
            Decision::Classified {
                kind,
                confidence,
                criterion,
                priority,
                justification,
                mut evidence,
                conflicts,
            } => {
                let direction = kind.default_direction();
                let kind = refine_kind(kind, direction, priority, node, &mut evidence);
                let mut shell = PortClassification::shell(
                    &node.qualified_name,
                    ClassificationStatus::Classified,
                    justification,
                );
                shell.kind = Some(kind);
                shell.direction = Some(direction);
                shell.confidence = Some(confidence);
                shell.criterion = Some(criterion);
                shell.priority = Some(priority);
                shell.evidence = evidence;
                shell.conflicts = conflicts;
                shell
            }
        };

        classification.method_kinds = method_kinds;
        classification.managed_types = managed;
        classification.primary_managed_type = primary;
        classification
    }

    /// Classifies every interface in the model, ascending by qualified name.
    pub fn classify_all(
        &self,
        model: &SemanticModel,
        graph: &TypeGraph,
        domain: &ClassificationResult,
        parallel: bool,
    ) -> BTreeMap<String, PortClassification> {
        let interfaces: Vec<&TypeNode> = model.interfaces().collect();
        let classified: BTreeMap<String, PortClassification> = if parallel {
            interfaces
                .par_iter()
                .map(|node| {
                    (
                        node.qualified_name.clone(),
                        self.classify(node, graph, model, domain),
                    )
                })
                .collect()
        } else {
            interfaces
                .iter()
                .map(|node| {
                    (
                        node.qualified_name.clone(),
                        self.classify(node, graph, model, domain),
                    )
                })
                .collect()
        };
        log::debug!(
            "port classification: {} of {} interfaces classified",
            classified.values().filter(|p| p.is_classified()).count(),
            classified.len()
        );
        classified
    }
}

impl Default for PortClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Corrects a heuristic kind against the port's method shape.
///
/// Only driven ports decided below explicit priority are eligible; the
/// direction is already settled and never changes here.
fn refine_kind(
    kind: PortKind,
    direction: PortDirection,
    priority: u32,
    node: &TypeNode,
    evidence: &mut Vec<Evidence>,
) -> PortKind {
    if priority >= criteria::EXPLICIT_PRIORITY || direction != PortDirection::Driven {
        return kind;
    }
    let publisher = methods::looks_like_publisher(node);
    let crud = methods::has_crud_methods(node);
    match kind {
        PortKind::Gateway if publisher => {
            evidence.push(Evidence::new(
                EvidenceKind::Structure,
                "Has publish-verb methods",
            ));
            PortKind::EventPublisher
        }
        PortKind::Gateway if crud => {
            evidence.push(Evidence::new(
                EvidenceKind::Structure,
                "Methods follow CRUD naming",
            ));
            PortKind::Repository
        }
        PortKind::Repository if publisher && !crud => {
            evidence.push(Evidence::new(
                EvidenceKind::Structure,
                "Has publish-verb methods and no CRUD methods",
            ));
            PortKind::EventPublisher
        }
        other => other,
    }
}
