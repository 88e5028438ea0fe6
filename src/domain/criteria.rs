//! Explicit-marker criteria evaluated in the first domain phase

use std::collections::{BTreeMap, BTreeSet};

use crate::core::{ConfidenceLevel, DomainKind, Evidence, EvidenceKind};
use crate::criteria::{Criterion, MatchResult};
use crate::graph::{TypeGraph, TypeNode};

/// Explicit markers and configured kinds outrank every structural rule.
pub const MARKER_PRIORITY: u32 = 100;

/// Matches a marker annotation by simple name.
pub struct MarkerCriterion {
    name: &'static str,
    annotation: &'static str,
    target: DomainKind,
}

impl MarkerCriterion {
    pub fn aggregate_root() -> Self {
        Self {
            name: "explicit-aggregate-root-marker",
            annotation: "AggregateRoot",
            target: DomainKind::AggregateRoot,
        }
    }

    pub fn entity() -> Self {
        Self {
            name: "explicit-entity-marker",
            annotation: "Entity",
            target: DomainKind::Entity,
        }
    }

    pub fn value_object() -> Self {
        Self {
            name: "explicit-value-object-marker",
            annotation: "ValueObject",
            target: DomainKind::ValueObject,
        }
    }

    pub fn identifier() -> Self {
        Self {
            name: "explicit-identifier-marker",
            annotation: "Identifier",
            target: DomainKind::Identifier,
        }
    }
}

impl Criterion<DomainKind> for MarkerCriterion {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> u32 {
        MARKER_PRIORITY
    }

    fn target(&self) -> DomainKind {
        self.target
    }

    fn evaluate(&self, node: &TypeNode, _graph: &TypeGraph) -> MatchResult {
        if node.has_annotation(self.annotation) {
            MatchResult::with_evidence(
                ConfidenceLevel::Explicit,
                format!("Has @{}", self.annotation),
                vec![Evidence::new(
                    EvidenceKind::Annotation,
                    format!("Annotated with @{}", self.annotation),
                )],
            )
        } else {
            MatchResult::NoMatch
        }
    }
}

/// Matches qualified names the configuration forces to a kind.
pub struct ConfiguredKindCriterion {
    name: &'static str,
    target: DomainKind,
    types: BTreeSet<String>,
}

impl ConfiguredKindCriterion {
    pub fn new(target: DomainKind, types: BTreeSet<String>) -> Self {
        let name = match target {
            DomainKind::AggregateRoot => "configured-aggregate-root",
            DomainKind::Entity => "configured-entity",
            DomainKind::ValueObject => "configured-value-object",
            DomainKind::Identifier => "configured-identifier",
            DomainKind::Unclassified => "configured-unclassified",
        };
        Self {
            name,
            target,
            types,
        }
    }
}

impl Criterion<DomainKind> for ConfiguredKindCriterion {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> u32 {
        MARKER_PRIORITY
    }

    fn target(&self) -> DomainKind {
        self.target
    }

    fn evaluate(&self, node: &TypeNode, _graph: &TypeGraph) -> MatchResult {
        if self.types.contains(&node.qualified_name) {
            MatchResult::with_evidence(
                ConfidenceLevel::Explicit,
                format!("Explicitly configured as {}", self.target),
                vec![Evidence::new(
                    EvidenceKind::Structure,
                    format!("explicit: {}", self.target),
                )],
            )
        } else {
            MatchResult::NoMatch
        }
    }
}

/// The four marker criteria.
pub fn marker_criteria() -> Vec<Box<dyn Criterion<DomainKind>>> {
    vec![
        Box::new(MarkerCriterion::aggregate_root()),
        Box::new(MarkerCriterion::entity()),
        Box::new(MarkerCriterion::value_object()),
        Box::new(MarkerCriterion::identifier()),
    ]
}

/// One criterion per kind that appears in the configured overrides.
pub fn configured_criteria(
    explicit_kinds: &BTreeMap<String, DomainKind>,
) -> Vec<Box<dyn Criterion<DomainKind>>> {
    let mut by_kind: BTreeMap<DomainKind, BTreeSet<String>> = BTreeMap::new();
    for (name, kind) in explicit_kinds {
        by_kind.entry(*kind).or_default().insert(name.clone());
    }
    by_kind
        .into_iter()
        .map(|(kind, types)| {
            Box::new(ConfiguredKindCriterion::new(kind, types)) as Box<dyn Criterion<DomainKind>>
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{SemanticModelBuilder, TypeNodeBuilder};

    fn graph_for(node: TypeNode) -> (TypeGraph, String) {
        let name = node.qualified_name.clone();
        let model = SemanticModelBuilder::new().with(node).build().unwrap();
        (TypeGraph::build(&model).unwrap(), name)
    }

    #[test]
    fn marker_matches_by_simple_annotation_name() {
        let (graph, name) = graph_for(
            TypeNodeBuilder::class("shop.Order")
                .annotated("ddd.AggregateRoot")
                .build(),
        );
        let node = graph.node(&name).unwrap();

        let criterion = MarkerCriterion::aggregate_root();
        let result = criterion.evaluate(node, &graph);
        match result {
            MatchResult::Match {
                confidence,
                justification,
                evidence,
            } => {
                assert_eq!(confidence, ConfidenceLevel::Explicit);
                assert_eq!(justification, "Has @AggregateRoot");
                assert_eq!(evidence.len(), 1);
                assert_eq!(evidence[0].kind, EvidenceKind::Annotation);
                assert_eq!(evidence[0].description, "Annotated with @AggregateRoot");
            }
            MatchResult::NoMatch => panic!("expected a match"),
        }

        assert!(!MarkerCriterion::entity().evaluate(node, &graph).is_match());
    }

    #[test]
    fn configured_criterion_matches_listed_names_only() {
        let (graph, name) = graph_for(TypeNodeBuilder::class("shop.Order").build());
        let node = graph.node(&name).unwrap();

        let mut kinds = BTreeMap::new();
        kinds.insert("shop.Order".to_string(), DomainKind::Entity);
        let criteria = configured_criteria(&kinds);
        assert_eq!(criteria.len(), 1);
        assert_eq!(criteria[0].name(), "configured-entity");
        assert_eq!(criteria[0].priority(), MARKER_PRIORITY);

        let result = criteria[0].evaluate(node, &graph);
        match result {
            MatchResult::Match { justification, .. } => {
                assert_eq!(justification, "Explicitly configured as ENTITY");
            }
            MatchResult::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn configured_criteria_group_names_by_kind() {
        let mut kinds = BTreeMap::new();
        kinds.insert("a.One".to_string(), DomainKind::ValueObject);
        kinds.insert("a.Two".to_string(), DomainKind::ValueObject);
        kinds.insert("a.Three".to_string(), DomainKind::AggregateRoot);

        let criteria = configured_criteria(&kinds);
        let names: Vec<&str> = criteria.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["configured-aggregate-root", "configured-value-object"]);
    }
}
