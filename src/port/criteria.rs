//! Default port-classification criteria
//!
//! Registration order mirrors priority: explicit markers, naming suffixes,
//! CQRS patterns, dependency injection, signature shape, package location.
//! Each criterion declares the kind it targets; direction follows from the
//! kind once a winner is picked.

use std::collections::BTreeSet;

use crate::core::{ConfidenceLevel, Evidence, EvidenceKind, PortKind};
use crate::criteria::{Criterion, MatchResult};
use crate::graph::{EdgeKind, TypeGraph, TypeNode};

use super::methods;

/// Explicit markers outrank every heuristic; the refiner never touches them.
pub const EXPLICIT_PRIORITY: u32 = 100;
const NAMING_PRIORITY: u32 = 80;
const PATTERN_PRIORITY: u32 = 75;
const SIGNATURE_PRIORITY: u32 = 70;
const PACKAGE_PRIORITY: u32 = 60;

/// Marker annotation, or a marker interface the port extends.
struct ExplicitMarker {
    name: &'static str,
    markers: &'static [&'static str],
    target: PortKind,
}

impl Criterion<PortKind> for ExplicitMarker {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> u32 {
        EXPLICIT_PRIORITY
    }

    fn target(&self) -> PortKind {
        self.target
    }

    fn evaluate(&self, node: &TypeNode, _graph: &TypeGraph) -> MatchResult {
        for marker in self.markers {
            if node.has_annotation(marker) {
                return MatchResult::with_evidence(
                    ConfidenceLevel::Explicit,
                    format!("Has @{marker}"),
                    vec![Evidence::new(
                        EvidenceKind::Annotation,
                        format!("Annotated with @{marker}"),
                    )],
                );
            }
            if node.interfaces.iter().any(|i| i.simple_name() == *marker) {
                return MatchResult::with_evidence(
                    ConfidenceLevel::Explicit,
                    format!("Extends {marker}"),
                    vec![Evidence::new(
                        EvidenceKind::Structure,
                        format!("Extends port marker interface '{marker}'"),
                    )],
                );
            }
        }
        MatchResult::NoMatch
    }
}

/// Simple-name suffix heuristic shared by the naming and CQRS criteria.
struct SuffixCriterion {
    name: &'static str,
    suffixes: &'static [&'static str],
    target: PortKind,
    priority: u32,
    confidence: ConfidenceLevel,
}

impl Criterion<PortKind> for SuffixCriterion {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn target(&self) -> PortKind {
        self.target
    }

    fn evaluate(&self, node: &TypeNode, _graph: &TypeGraph) -> MatchResult {
        let Some(suffix) = self
            .suffixes
            .iter()
            .copied()
            .find(|s| node.simple_name.ends_with(s))
        else {
            return MatchResult::NoMatch;
        };
        MatchResult::with_evidence(
            self.confidence,
            format!("Name ends with '{suffix}'"),
            vec![Evidence::new(
                EvidenceKind::Naming,
                format!("Type name ends with '{suffix}'"),
            )],
        )
    }
}

/// Interfaces held as fields by other types are driven dependencies.
struct InjectedAsDependency;

impl Criterion<PortKind> for InjectedAsDependency {
    fn name(&self) -> &str {
        "injected-as-dependency"
    }

    fn priority(&self) -> u32 {
        PATTERN_PRIORITY
    }

    fn target(&self) -> PortKind {
        PortKind::Gateway
    }

    fn evaluate(&self, node: &TypeNode, graph: &TypeGraph) -> MatchResult {
        let injectors: BTreeSet<String> = graph
            .edges_into_kind(&node.qualified_name, EdgeKind::FieldType)
            .iter()
            .map(|e| e.from.clone())
            .collect();
        if injectors.is_empty() {
            return MatchResult::NoMatch;
        }
        MatchResult::with_evidence(
            ConfidenceLevel::Medium,
            "Injected as a dependency by other types",
            vec![Evidence::with_related(
                EvidenceKind::Relationship,
                "Used as a field type by other types",
                injectors.into_iter().collect(),
            )],
        )
    }
}

/// CRUD-shaped signatures over in-scope domain types.
struct SignatureCrud;

impl Criterion<PortKind> for SignatureCrud {
    fn name(&self) -> &str {
        "signature-crud"
    }

    fn priority(&self) -> u32 {
        SIGNATURE_PRIORITY
    }

    fn target(&self) -> PortKind {
        PortKind::Repository
    }

    fn evaluate(&self, node: &TypeNode, graph: &TypeGraph) -> MatchResult {
        if !methods::crud_majority(node) {
            return MatchResult::NoMatch;
        }
        let touched: Vec<String> = methods::signature_types(node)
            .into_iter()
            .filter(|name| graph.contains(name))
            .collect();
        if touched.is_empty() {
            return MatchResult::NoMatch;
        }
        MatchResult::with_evidence(
            ConfidenceLevel::Medium,
            "Methods follow CRUD naming over domain types",
            vec![
                Evidence::new(
                    EvidenceKind::Structure,
                    format!(
                        "{} of {} methods are CRUD-named",
                        methods::crud_method_count(node),
                        node.methods.len()
                    ),
                ),
                Evidence::with_related(
                    EvidenceKind::Structure,
                    "Signatures reference in-scope domain types",
                    touched,
                ),
            ],
        )
    }
}

/// Consecutive package segments such as `ports.in` / `ports.out`.
struct PackageSegments {
    name: &'static str,
    head: &'static str,
    tail: &'static str,
    target: PortKind,
}

impl Criterion<PortKind> for PackageSegments {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> u32 {
        PACKAGE_PRIORITY
    }

    fn target(&self) -> PortKind {
        self.target
    }

    fn evaluate(&self, node: &TypeNode, _graph: &TypeGraph) -> MatchResult {
        let segments: Vec<&str> = node.package.split('.').collect();
        let hit = segments
            .windows(2)
            .any(|w| w[0] == self.head && w[1] == self.tail);
        if !hit {
            return MatchResult::NoMatch;
        }
        MatchResult::with_evidence(
            ConfidenceLevel::Low,
            format!("Declared in a '{}.{}' package", self.head, self.tail),
            vec![Evidence::new(
                EvidenceKind::Naming,
                format!(
                    "Package '{}' contains segments '{}.{}'",
                    node.package, self.head, self.tail
                ),
            )],
        )
    }
}

pub fn default_criteria() -> Vec<Box<dyn Criterion<PortKind>>> {
    vec![
        Box::new(ExplicitMarker {
            name: "explicit-repository-marker",
            markers: &["Repository"],
            target: PortKind::Repository,
        }),
        Box::new(ExplicitMarker {
            name: "explicit-driving-port-marker",
            markers: &["PrimaryPort", "UseCase", "DrivingPort"],
            target: PortKind::UseCase,
        }),
        Box::new(ExplicitMarker {
            name: "explicit-driven-port-marker",
            markers: &["SecondaryPort", "DrivenPort"],
            target: PortKind::Gateway,
        }),
        Box::new(SuffixCriterion {
            name: "naming-repository",
            suffixes: &["Repository"],
            target: PortKind::Repository,
            priority: NAMING_PRIORITY,
            confidence: ConfidenceLevel::High,
        }),
        Box::new(SuffixCriterion {
            name: "naming-use-case",
            suffixes: &["UseCase", "UseCases"],
            target: PortKind::UseCase,
            priority: NAMING_PRIORITY,
            confidence: ConfidenceLevel::High,
        }),
        Box::new(SuffixCriterion {
            name: "naming-gateway",
            suffixes: &["Gateway", "Client", "Publisher"],
            target: PortKind::Gateway,
            priority: NAMING_PRIORITY,
            confidence: ConfidenceLevel::High,
        }),
        Box::new(SuffixCriterion {
            name: "command-pattern",
            suffixes: &["Command", "CommandHandler"],
            target: PortKind::UseCase,
            priority: PATTERN_PRIORITY,
            confidence: ConfidenceLevel::Medium,
        }),
        Box::new(SuffixCriterion {
            name: "query-pattern",
            suffixes: &["Query", "QueryHandler"],
            target: PortKind::UseCase,
            priority: PATTERN_PRIORITY,
            confidence: ConfidenceLevel::Medium,
        }),
        Box::new(InjectedAsDependency),
        Box::new(SignatureCrud),
        Box::new(PackageSegments {
            name: "package-driving",
            head: "ports",
            tail: "in",
            target: PortKind::UseCase,
        }),
        Box::new(PackageSegments {
            name: "package-driven",
            head: "ports",
            tail: "out",
            target: PortKind::Gateway,
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{SemanticModelBuilder, TypeNodeBuilder};
    use crate::graph::{SemanticModel, TypeRef};

    fn graph_for(model: &SemanticModel) -> TypeGraph {
        TypeGraph::build(model).unwrap()
    }

    fn evaluate_named(name: &str, node: &TypeNode, graph: &TypeGraph) -> MatchResult {
        default_criteria()
            .into_iter()
            .find(|c| c.name() == name)
            .unwrap()
            .evaluate(node, graph)
    }

    #[test]
    fn explicit_marker_matches_annotation_and_extension() {
        let model = SemanticModelBuilder::new()
            .with(
                TypeNodeBuilder::interface("shop.Orders")
                    .annotated("org.jmolecules.ddd.annotation.Repository")
                    .build(),
            )
            .with(
                TypeNodeBuilder::interface("shop.PlaceOrder")
                    .implements("org.jmolecules.architecture.hexagonal.PrimaryPort")
                    .build(),
            )
            .build()
            .unwrap();
        let graph = graph_for(&model);

        let annotated = model.get("shop.Orders").unwrap();
        match evaluate_named("explicit-repository-marker", annotated, &graph) {
            MatchResult::Match {
                confidence,
                justification,
                evidence,
            } => {
                assert_eq!(confidence, ConfidenceLevel::Explicit);
                assert_eq!(justification, "Has @Repository");
                assert_eq!(evidence[0].description, "Annotated with @Repository");
            }
            MatchResult::NoMatch => panic!("expected a match"),
        }

        let extending = model.get("shop.PlaceOrder").unwrap();
        match evaluate_named("explicit-driving-port-marker", extending, &graph) {
            MatchResult::Match { justification, .. } => {
                assert_eq!(justification, "Extends PrimaryPort");
            }
            MatchResult::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn naming_suffixes_match_by_simple_name() {
        let model = SemanticModelBuilder::new()
            .with(TypeNodeBuilder::interface("shop.OrderRepository").build())
            .with(TypeNodeBuilder::interface("shop.PlaceOrderUseCase").build())
            .with(TypeNodeBuilder::interface("shop.PaymentClient").build())
            .build()
            .unwrap();
        let graph = graph_for(&model);

        assert!(evaluate_named(
            "naming-repository",
            model.get("shop.OrderRepository").unwrap(),
            &graph
        )
        .is_match());
        assert!(evaluate_named(
            "naming-use-case",
            model.get("shop.PlaceOrderUseCase").unwrap(),
            &graph
        )
        .is_match());
        assert!(evaluate_named(
            "naming-gateway",
            model.get("shop.PaymentClient").unwrap(),
            &graph
        )
        .is_match());
        assert!(!evaluate_named(
            "naming-gateway",
            model.get("shop.OrderRepository").unwrap(),
            &graph
        )
        .is_match());
    }

    #[test]
    fn cqrs_patterns_target_use_cases() {
        let model = SemanticModelBuilder::new()
            .with(TypeNodeBuilder::interface("shop.PlaceOrderCommandHandler").build())
            .with(TypeNodeBuilder::interface("shop.OrderHistoryQuery").build())
            .build()
            .unwrap();
        let graph = graph_for(&model);

        match evaluate_named(
            "command-pattern",
            model.get("shop.PlaceOrderCommandHandler").unwrap(),
            &graph,
        ) {
            MatchResult::Match { justification, .. } => {
                assert_eq!(justification, "Name ends with 'CommandHandler'");
            }
            MatchResult::NoMatch => panic!("expected a match"),
        }
        assert!(evaluate_named(
            "query-pattern",
            model.get("shop.OrderHistoryQuery").unwrap(),
            &graph
        )
        .is_match());
    }

    #[test]
    fn injection_detected_through_field_edges() {
        let model = SemanticModelBuilder::new()
            .with(
                TypeNodeBuilder::class("shop.OrderService")
                    .field("notifier", TypeRef::named("shop.Notifier"))
                    .build(),
            )
            .with(
                TypeNodeBuilder::interface("shop.Notifier")
                    .method("alert", vec![TypeRef::named("java.lang.String")], None)
                    .build(),
            )
            .build()
            .unwrap();
        let graph = graph_for(&model);

        match evaluate_named(
            "injected-as-dependency",
            model.get("shop.Notifier").unwrap(),
            &graph,
        ) {
            MatchResult::Match { evidence, .. } => {
                assert_eq!(
                    evidence[0].related_types,
                    vec!["shop.OrderService".to_string()]
                );
            }
            MatchResult::NoMatch => panic!("expected a match"),
        }

        assert!(!evaluate_named(
            "injected-as-dependency",
            model.get("shop.OrderService").unwrap(),
            &graph
        )
        .is_match());
    }

    #[test]
    fn signature_crud_needs_majority_and_scope() {
        let model = SemanticModelBuilder::new()
            .with(TypeNodeBuilder::class("shop.Order").build())
            .with(
                TypeNodeBuilder::interface("shop.Orders")
                    .method("save", vec![TypeRef::named("shop.Order")], None)
                    .method(
                        "findById",
                        vec![TypeRef::named("java.util.UUID")],
                        Some(TypeRef::optional(TypeRef::named("shop.Order"))),
                    )
                    .method("validate", vec![], None)
                    .build(),
            )
            .with(
                TypeNodeBuilder::interface("shop.Clock")
                    .method("get", vec![], Some(TypeRef::named("java.time.Instant")))
                    .build(),
            )
            .build()
            .unwrap();
        let graph = graph_for(&model);

        match evaluate_named("signature-crud", model.get("shop.Orders").unwrap(), &graph) {
            MatchResult::Match { evidence, .. } => {
                assert_eq!(evidence[0].description, "2 of 3 methods are CRUD-named");
                assert_eq!(evidence[1].related_types, vec!["shop.Order".to_string()]);
            }
            MatchResult::NoMatch => panic!("expected a match"),
        }

        // CRUD-named but touching nothing in scope.
        assert!(
            !evaluate_named("signature-crud", model.get("shop.Clock").unwrap(), &graph).is_match()
        );
    }

    #[test]
    fn package_segments_require_adjacency() {
        let model = SemanticModelBuilder::new()
            .with(TypeNodeBuilder::interface("shop.ports.in.PlaceOrder").build())
            .with(TypeNodeBuilder::interface("shop.ports.out.LoadOrders").build())
            .with(TypeNodeBuilder::interface("shop.ports.domain.in.Stray").build())
            .build()
            .unwrap();
        let graph = graph_for(&model);

        assert!(evaluate_named(
            "package-driving",
            model.get("shop.ports.in.PlaceOrder").unwrap(),
            &graph
        )
        .is_match());
        assert!(evaluate_named(
            "package-driven",
            model.get("shop.ports.out.LoadOrders").unwrap(),
            &graph
        )
        .is_match());
        assert!(!evaluate_named(
            "package-driving",
            model.get("shop.ports.domain.in.Stray").unwrap(),
            &graph
        )
        .is_match());
    }

    #[test]
    fn default_set_is_complete_and_ordered() {
        let criteria = default_criteria();
        let names: Vec<&str> = criteria.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "explicit-repository-marker",
                "explicit-driving-port-marker",
                "explicit-driven-port-marker",
                "naming-repository",
                "naming-use-case",
                "naming-gateway",
                "command-pattern",
                "query-pattern",
                "injected-as-dependency",
                "signature-crud",
                "package-driving",
                "package-driven",
            ]
        );
    }
}
