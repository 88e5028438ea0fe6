//! Confidence-weighted criteria matching shared by the domain and port
//! classifiers
//!
//! A classifier registers criteria over its kind type `K`, evaluates all of
//! them against a type, and resolves the winner through one total order:
//! priority descending, confidence descending, criterion name ascending.
//! That order is the only tie-break; nothing hash-ordered or time-based may
//! influence a decision.

use std::collections::BTreeSet;
use std::fmt::Display;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{ConfidenceLevel, Evidence};
use crate::graph::{TypeGraph, TypeNode};

/// Outcome of evaluating one criterion against one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    NoMatch,
    Match {
        confidence: ConfidenceLevel,
        justification: String,
        evidence: Vec<Evidence>,
    },
}

impl MatchResult {
    pub fn matched(confidence: ConfidenceLevel, justification: impl Into<String>) -> Self {
        MatchResult::Match {
            confidence,
            justification: justification.into(),
            evidence: Vec::new(),
        }
    }

    pub fn with_evidence(
        confidence: ConfidenceLevel,
        justification: impl Into<String>,
        evidence: Vec<Evidence>,
    ) -> Self {
        MatchResult::Match {
            confidence,
            justification: justification.into(),
            evidence,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Match { .. })
    }
}

/// One classification rule targeting a kind of `K`.
///
/// Criteria must be pure: `evaluate` may read the type and the graph but
/// never mutate shared state, so the same inputs always produce the same
/// match.
pub trait Criterion<K>: Send + Sync {
    fn name(&self) -> &str;
    fn priority(&self) -> u32;
    fn target(&self) -> K;
    fn evaluate(&self, node: &TypeNode, graph: &TypeGraph) -> MatchResult;
}

/// A successful criterion evaluation, ready for tie-breaking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution<K> {
    pub kind: K,
    pub criterion: String,
    pub priority: u32,
    pub confidence: ConfidenceLevel,
    pub justification: String,
    pub evidence: Vec<Evidence>,
}

/// How serious a competing match is.
///
/// `Error` marks kinds the compatibility table does not allow together;
/// whether it blocks classification depends on the competing priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictSeverity {
    Warning,
    Error,
}

/// A losing match whose target kind differs from the winner's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub competing_kind: String,
    pub competing_criterion: String,
    pub competing_confidence: ConfidenceLevel,
    pub competing_priority: u32,
    pub severity: ConflictSeverity,
    pub note: String,
}

/// Closed table of kind pairs allowed to match the same type at the same
/// priority.
///
/// Empty by default: every pair of distinct kinds conflicts unless declared
/// otherwise.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityTable<K> {
    pairs: BTreeSet<(K, K)>,
}

impl<K: Copy + Ord> CompatibilityTable<K> {
    pub fn none() -> Self {
        Self {
            pairs: BTreeSet::new(),
        }
    }

    /// Declares `a` and `b` compatible in both directions.
    pub fn with_pair(mut self, a: K, b: K) -> Self {
        self.pairs.insert((a, b));
        self.pairs.insert((b, a));
        self
    }

    pub fn compatible(&self, a: K, b: K) -> bool {
        a == b || self.pairs.contains(&(a, b))
    }
}

/// Decision for one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<K> {
    Classified {
        kind: K,
        confidence: ConfidenceLevel,
        criterion: String,
        priority: u32,
        justification: String,
        evidence: Vec<Evidence>,
        conflicts: Vec<Conflict>,
    },
    /// Equal-priority matches on incompatible kinds; no winner
    Conflicted { conflicts: Vec<Conflict> },
    Unmatched,
}

impl<K> Decision<K> {
    pub fn is_classified(&self) -> bool {
        matches!(self, Decision::Classified { .. })
    }
}

/// Evaluates a fixed criterion set and resolves each type to a [`Decision`].
pub struct CriteriaEngine<K> {
    criteria: Vec<Box<dyn Criterion<K>>>,
    compatibility: CompatibilityTable<K>,
}

impl<K: Copy + Ord + Display> CriteriaEngine<K> {
    pub fn new(criteria: Vec<Box<dyn Criterion<K>>>, compatibility: CompatibilityTable<K>) -> Self {
        Self {
            criteria,
            compatibility,
        }
    }

    /// All matching contributions for one type, sorted by the tie-break
    /// order.
    pub fn evaluate(&self, node: &TypeNode, graph: &TypeGraph) -> Vec<Contribution<K>> {
        let mut contributions: Vec<Contribution<K>> = self
            .criteria
            .iter()
            .filter_map(|criterion| match criterion.evaluate(node, graph) {
                MatchResult::NoMatch => None,
                MatchResult::Match {
                    confidence,
                    justification,
                    evidence,
                } => Some(Contribution {
                    kind: criterion.target(),
                    criterion: criterion.name().to_string(),
                    priority: criterion.priority(),
                    confidence,
                    justification,
                    evidence,
                }),
            })
            .collect();
        sort_contributions(&mut contributions);
        contributions
    }

    /// Resolves one type.
    pub fn decide(&self, node: &TypeNode, graph: &TypeGraph) -> Decision<K> {
        self.resolve(self.evaluate(node, graph))
    }

    /// Resolves every node, optionally fanning evaluation out across a
    /// thread pool. Results come back sorted by qualified name either way.
    pub fn decide_all<'a, I>(&self, nodes: I, graph: &TypeGraph, parallel: bool) -> Vec<(String, Decision<K>)>
    where
        I: IntoIterator<Item = &'a TypeNode>,
        K: Send + Sync,
    {
        let nodes: Vec<&TypeNode> = nodes.into_iter().collect();
        let mut decisions: Vec<(String, Decision<K>)> = if parallel {
            nodes
                .par_iter()
                .map(|node| (node.qualified_name.clone(), self.decide(node, graph)))
                .collect()
        } else {
            nodes
                .iter()
                .map(|node| (node.qualified_name.clone(), self.decide(node, graph)))
                .collect()
        };
        decisions.sort_by(|a, b| a.0.cmp(&b.0));
        decisions
    }

    /// Applies the decision rules to already-sorted contributions.
    ///
    /// The head is the winner. Every other contribution with a different
    /// kind becomes a conflict; the decision degrades to `Conflicted` only
    /// when such a conflict sits at the winner's own priority and the two
    /// kinds are not declared compatible. Priority is the intended
    /// resolution mechanism, so lower-priority disagreement never blocks.
    pub fn resolve(&self, contributions: Vec<Contribution<K>>) -> Decision<K> {
        let mut remaining = contributions.into_iter();
        let Some(winner) = remaining.next() else {
            return Decision::Unmatched;
        };
        let rest: Vec<Contribution<K>> = remaining.collect();

        let conflicts: Vec<Conflict> = rest
            .iter()
            .filter(|c| c.kind != winner.kind)
            .map(|c| {
                let severity = if self.compatibility.compatible(winner.kind, c.kind) {
                    ConflictSeverity::Warning
                } else {
                    ConflictSeverity::Error
                };
                Conflict {
                    competing_kind: c.kind.to_string(),
                    competing_criterion: c.criterion.clone(),
                    competing_confidence: c.confidence,
                    competing_priority: c.priority,
                    severity,
                    note: format!("Also matched with {}", c.justification),
                }
            })
            .collect();

        let blocked = rest.iter().any(|c| {
            c.kind != winner.kind
                && c.priority == winner.priority
                && !self.compatibility.compatible(winner.kind, c.kind)
        });
        if blocked {
            return Decision::Conflicted { conflicts };
        }

        Decision::Classified {
            kind: winner.kind,
            confidence: winner.confidence,
            criterion: winner.criterion,
            priority: winner.priority,
            justification: winner.justification,
            evidence: winner.evidence,
            conflicts,
        }
    }
}

/// Priority descending, confidence descending, name ascending
/// (case-sensitive).
fn sort_contributions<K>(contributions: &mut [Contribution<K>]) {
    contributions.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.confidence.cmp(&a.confidence))
            .then_with(|| a.criterion.cmp(&b.criterion))
    });
}
