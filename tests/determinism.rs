//! Property-based tests for classification determinism
//!
//! These verify invariants that should hold for all inputs:
//! - Running the pipeline twice yields byte-identical serialized results
//! - Input declaration order never influences the result
//! - Every in-scope type receives exactly one classification
//! - Parallel and sequential evaluation agree
//! - Criterion registration order never influences a decision

use archmap::builders::{SemanticModelBuilder, TypeNodeBuilder};
use archmap::config::AnalysisConfig;
use archmap::core::{ConfidenceLevel, DomainKind};
use archmap::criteria::{CompatibilityTable, Criterion, CriteriaEngine, Decision, MatchResult};
use archmap::engine::analyze;
use archmap::graph::{SemanticModel, TypeGraph, TypeNode, TypeRef};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct TypeSpec {
    form: u8,
    with_identity: bool,
    refs: Vec<usize>,
    marker: Option<u8>,
}

fn type_spec() -> impl Strategy<Value = TypeSpec> {
    (
        0u8..3,
        any::<bool>(),
        proptest::collection::vec(0usize..12, 0..3),
        proptest::option::of(0u8..3),
    )
        .prop_map(|(form, with_identity, refs, marker)| TypeSpec {
            form,
            with_identity,
            refs,
            marker,
        })
}

fn model_specs() -> impl Strategy<Value = Vec<TypeSpec>> {
    proptest::collection::vec(type_spec(), 1..10)
}

/// Materialize spec slots into concrete nodes with stable names.
fn build_nodes(specs: &[TypeSpec]) -> Vec<TypeNode> {
    let n = specs.len();
    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let name = format!("gen.T{i}");
            let mut node = match spec.form {
                0 => TypeNodeBuilder::class(&name),
                1 => TypeNodeBuilder::record(&name),
                _ => TypeNodeBuilder::interface(&name),
            };
            if spec.with_identity && spec.form != 2 {
                node = node.field("id", TypeRef::named("java.util.UUID"));
            }
            for (j, target) in spec.refs.iter().enumerate() {
                let target = format!("gen.T{}", target % n);
                node = node.field(&format!("f{j}"), TypeRef::named(&target));
            }
            if let Some(m) = spec.marker {
                let marker = ["ddd.AggregateRoot", "ddd.Entity", "ddd.ValueObject"][m as usize];
                node = node.annotated(marker);
            }
            node.build()
        })
        .collect()
}

fn model_from(nodes: Vec<TypeNode>) -> SemanticModel {
    let mut builder = SemanticModelBuilder::new();
    for node in nodes {
        builder.push(node);
    }
    builder.build().unwrap()
}

proptest! {
    /// Two runs over the same model serialize to the same bytes.
    #[test]
    fn prop_double_run_is_byte_identical(specs in model_specs()) {
        let model = model_from(build_nodes(&specs));
        let config = AnalysisConfig::default();

        let first = serde_json::to_string(&analyze(&model, &config).unwrap()).unwrap();
        let second = serde_json::to_string(&analyze(&model, &config).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Reversing input declaration order changes nothing.
    #[test]
    fn prop_input_order_is_irrelevant(specs in model_specs()) {
        let nodes = build_nodes(&specs);
        let mut reversed = nodes.clone();
        reversed.reverse();
        let config = AnalysisConfig::default();

        let forward = serde_json::to_string(&analyze(&model_from(nodes), &config).unwrap()).unwrap();
        let backward =
            serde_json::to_string(&analyze(&model_from(reversed), &config).unwrap()).unwrap();
        prop_assert_eq!(forward, backward);
    }

    /// Every type in scope ends with exactly one classification.
    #[test]
    fn prop_classification_is_total(specs in model_specs()) {
        let model = model_from(build_nodes(&specs));
        let report = analyze(&model, &AnalysisConfig::default()).unwrap();

        prop_assert_eq!(report.result.len(), model.len());
        for name in model.names() {
            prop_assert!(report.result.get(name).is_some(), "missing {}", name);
        }
    }

    /// A rayon fan-out must merge back to the sequential result.
    #[test]
    fn prop_parallel_matches_sequential(specs in model_specs()) {
        let model = model_from(build_nodes(&specs));
        let sequential = analyze(&model, &AnalysisConfig::default()).unwrap();
        let parallel = analyze(
            &model,
            &AnalysisConfig {
                parallel: true,
                ..AnalysisConfig::default()
            },
        )
        .unwrap();
        prop_assert_eq!(sequential, parallel);
    }
}

/// A criterion that always matches with a fixed target and strength.
struct Always {
    name: &'static str,
    priority: u32,
    target: DomainKind,
    confidence: ConfidenceLevel,
}

impl Criterion<DomainKind> for Always {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn target(&self) -> DomainKind {
        self.target
    }

    fn evaluate(&self, _node: &TypeNode, _graph: &TypeGraph) -> MatchResult {
        MatchResult::matched(self.confidence, format!("{} matched", self.name))
    }
}

fn decide_with(criteria: Vec<Box<dyn Criterion<DomainKind>>>) -> Decision<DomainKind> {
    let model = model_from(vec![TypeNodeBuilder::class("gen.Solo").build()]);
    let graph = TypeGraph::build(&model).unwrap();
    let engine = CriteriaEngine::new(criteria, CompatibilityTable::none());
    engine.decide(model.get("gen.Solo").unwrap(), &graph)
}

fn winning_criterion(decision: Decision<DomainKind>) -> String {
    match decision {
        Decision::Classified { criterion, .. } => criterion,
        other => panic!("expected a classification, got {other:?}"),
    }
}

#[test]
fn registration_order_never_changes_the_winner() {
    let make = |first: &'static str, second: &'static str| {
        vec![
            Box::new(Always {
                name: first,
                priority: 80,
                target: DomainKind::Entity,
                confidence: ConfidenceLevel::High,
            }) as Box<dyn Criterion<DomainKind>>,
            Box::new(Always {
                name: second,
                priority: 80,
                target: DomainKind::Entity,
                confidence: ConfidenceLevel::High,
            }),
        ]
    };

    let forward = winning_criterion(decide_with(make("alpha", "beta")));
    let backward = winning_criterion(decide_with(make("beta", "alpha")));
    assert_eq!(forward, "alpha");
    assert_eq!(backward, "alpha");
}

#[test]
fn priority_dominates_confidence() {
    let decision = decide_with(vec![
        Box::new(Always {
            name: "weak-but-high-priority",
            priority: 90,
            target: DomainKind::AggregateRoot,
            confidence: ConfidenceLevel::Low,
        }),
        Box::new(Always {
            name: "explicit-but-low-priority",
            priority: 60,
            target: DomainKind::ValueObject,
            confidence: ConfidenceLevel::Explicit,
        }),
    ]);
    match decision {
        Decision::Classified { kind, criterion, .. } => {
            assert_eq!(kind, DomainKind::AggregateRoot);
            assert_eq!(criterion, "weak-but-high-priority");
        }
        other => panic!("expected a classification, got {other:?}"),
    }
}
