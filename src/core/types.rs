//! Shared classification vocabulary used across the crate

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ranked strength of a single criterion match.
///
/// Used purely for deterministic ranking, never as a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
    Explicit,
}

impl ConfidenceLevel {
    /// Numeric score backing the ranking
    pub fn score(&self) -> u8 {
        match self {
            ConfidenceLevel::Low => 40,
            ConfidenceLevel::Medium => 60,
            ConfidenceLevel::High => 80,
            ConfidenceLevel::Explicit => 100,
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfidenceLevel::Low => "LOW",
            ConfidenceLevel::Medium => "MEDIUM",
            ConfidenceLevel::High => "HIGH",
            ConfidenceLevel::Explicit => "EXPLICIT",
        };
        write!(f, "{s}")
    }
}

/// How settled a final classification is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertaintyLevel {
    None,
    Uncertain,
    Inferred,
    CertainByStructure,
    Explicit,
}

impl CertaintyLevel {
    /// Strong enough that downstream generators can rely on it
    pub fn is_reliable(&self) -> bool {
        matches!(
            self,
            CertaintyLevel::CertainByStructure | CertaintyLevel::Explicit
        )
    }

    /// Weak enough that a human should review it
    pub fn needs_review(&self) -> bool {
        matches!(self, CertaintyLevel::Inferred | CertaintyLevel::Uncertain)
    }
}

impl fmt::Display for CertaintyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CertaintyLevel::None => "NONE",
            CertaintyLevel::Uncertain => "UNCERTAIN",
            CertaintyLevel::Inferred => "INFERRED",
            CertaintyLevel::CertainByStructure => "CERTAIN_BY_STRUCTURE",
            CertaintyLevel::Explicit => "EXPLICIT",
        };
        write!(f, "{s}")
    }
}

/// Architectural role of a domain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainKind {
    AggregateRoot,
    Entity,
    ValueObject,
    Identifier,
    Unclassified,
}

impl DomainKind {
    pub fn is_classified(&self) -> bool {
        !matches!(self, DomainKind::Unclassified)
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DomainKind::AggregateRoot => "AGGREGATE_ROOT",
            DomainKind::Entity => "ENTITY",
            DomainKind::ValueObject => "VALUE_OBJECT",
            DomainKind::Identifier => "IDENTIFIER",
            DomainKind::Unclassified => "UNCLASSIFIED",
        };
        write!(f, "{s}")
    }
}

/// Architectural role of a port interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortKind {
    Repository,
    UseCase,
    Gateway,
    EventPublisher,
}

impl PortKind {
    /// Direction implied by the kind when no explicit marker says otherwise
    pub fn default_direction(&self) -> PortDirection {
        match self {
            PortKind::UseCase => PortDirection::Driving,
            PortKind::Repository | PortKind::Gateway | PortKind::EventPublisher => {
                PortDirection::Driven
            }
        }
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortKind::Repository => "REPOSITORY",
            PortKind::UseCase => "USE_CASE",
            PortKind::Gateway => "GATEWAY",
            PortKind::EventPublisher => "EVENT_PUBLISHER",
        };
        write!(f, "{s}")
    }
}

/// Which side of the domain boundary a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortDirection {
    /// Called by the outside world to drive the domain
    Driving,
    /// Called by the domain to reach the outside world
    Driven,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortDirection::Driving => "DRIVING",
            PortDirection::Driven => "DRIVEN",
        };
        write!(f, "{s}")
    }
}

/// Which rule family produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationStrategy {
    Annotation,
    Repository,
    Record,
    Composition,
    Unclassified,
}

impl fmt::Display for ClassificationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClassificationStrategy::Annotation => "ANNOTATION",
            ClassificationStrategy::Repository => "REPOSITORY",
            ClassificationStrategy::Record => "RECORD",
            ClassificationStrategy::Composition => "COMPOSITION",
            ClassificationStrategy::Unclassified => "UNCLASSIFIED",
        };
        write!(f, "{s}")
    }
}

/// Where a piece of evidence was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceKind {
    Annotation,
    Naming,
    Structure,
    Relationship,
    Package,
}

/// A single observed fact supporting a classification decision.
///
/// Evidence is explanatory payload only. No control flow depends on its
/// content beyond what confidence already encodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub kind: EvidenceKind,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_types: Vec<String>,
}

impl Evidence {
    pub fn new(kind: EvidenceKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            related_types: Vec::new(),
        }
    }

    pub fn with_related(
        kind: EvidenceKind,
        description: impl Into<String>,
        related_types: Vec<String>,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            related_types,
        }
    }
}

/// Final decision for one domain type.
///
/// Created exactly once per type by whichever phase first claims it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub type_name: String,
    pub kind: DomainKind,
    pub certainty: CertaintyLevel,
    pub strategy: ClassificationStrategy,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<Evidence>,
}

impl Classification {
    pub fn new(
        type_name: impl Into<String>,
        kind: DomainKind,
        certainty: CertaintyLevel,
        strategy: ClassificationStrategy,
        reasoning: impl Into<String>,
        evidence: Vec<Evidence>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            kind,
            certainty,
            strategy,
            reasoning: reasoning.into(),
            evidence,
        }
    }

    /// Residual marking for a type no rule claimed
    pub fn unclassified(type_name: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            kind: DomainKind::Unclassified,
            certainty: CertaintyLevel::None,
            strategy: ClassificationStrategy::Unclassified,
            reasoning: reasoning.into(),
            evidence: Vec::new(),
        }
    }

    pub fn simple_name(&self) -> &str {
        simple_name(&self.type_name)
    }
}

/// Severity of a detected anomaly.
///
/// `Critical` and `Blocker` block downstream generation by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,
    Major,
    Critical,
    Blocker,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Critical | Severity::Blocker)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "INFO",
            Severity::Major => "MAJOR",
            Severity::Critical => "CRITICAL",
            Severity::Blocker => "BLOCKER",
        };
        write!(f, "{s}")
    }
}

/// Category of architectural rule violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyKind {
    DirectAggregateReference,
    CompositionCycle,
    SharedEntity,
    AggregateWithoutRepository,
    ValueObjectWithIdentity,
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnomalyKind::DirectAggregateReference => "DIRECT_AGGREGATE_REFERENCE",
            AnomalyKind::CompositionCycle => "COMPOSITION_CYCLE",
            AnomalyKind::SharedEntity => "SHARED_ENTITY",
            AnomalyKind::AggregateWithoutRepository => "AGGREGATE_WITHOUT_REPOSITORY",
            AnomalyKind::ValueObjectWithIdentity => "VALUE_OBJECT_WITH_IDENTITY",
        };
        write!(f, "{s}")
    }
}

/// A detected violation of aggregate design rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub affected_type: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_types: Vec<String>,
}

impl Anomaly {
    /// A `Major` anomaly that warns without blocking generation
    pub fn warning(
        kind: AnomalyKind,
        affected_type: impl Into<String>,
        message: impl Into<String>,
        related_types: Vec<String>,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Major,
            affected_type: affected_type.into(),
            message: message.into(),
            related_types,
        }
    }

    /// A `Critical` anomaly that blocks generation
    pub fn error(
        kind: AnomalyKind,
        affected_type: impl Into<String>,
        message: impl Into<String>,
        related_types: Vec<String>,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Critical,
            affected_type: affected_type.into(),
            message: message.into(),
            related_types,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

/// Immutable aggregate of one full analysis run.
///
/// Queryable but never mutated after construction. Map keys are qualified
/// type names, so iteration and serialization order are defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub classifications: BTreeMap<String, Classification>,
    pub anomalies: Vec<Anomaly>,
}

impl ClassificationResult {
    pub fn new(classifications: BTreeMap<String, Classification>, anomalies: Vec<Anomaly>) -> Self {
        Self {
            classifications,
            anomalies,
        }
    }

    pub fn get(&self, type_name: &str) -> Option<&Classification> {
        self.classifications.get(type_name)
    }

    /// Kind assigned to a type, `Unclassified` when the type is unknown
    pub fn kind_of(&self, type_name: &str) -> DomainKind {
        self.get(type_name)
            .map(|c| c.kind)
            .unwrap_or(DomainKind::Unclassified)
    }

    /// All classifications of a given kind, ascending by type name
    pub fn of_kind(&self, kind: DomainKind) -> Vec<&Classification> {
        self.classifications
            .values()
            .filter(|c| c.kind == kind)
            .collect()
    }

    /// Anomalies that block downstream generation
    pub fn error_anomalies(&self) -> Vec<&Anomaly> {
        self.anomalies.iter().filter(|a| a.is_error()).collect()
    }

    /// Anomalies that warn without blocking
    pub fn warning_anomalies(&self) -> Vec<&Anomaly> {
        self.anomalies.iter().filter(|a| !a.is_error()).collect()
    }

    pub fn has_blocking_anomalies(&self) -> bool {
        self.anomalies.iter().any(|a| a.is_error())
    }

    pub fn len(&self) -> usize {
        self.classifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifications.is_empty()
    }
}

/// Strip the package prefix from a qualified type name
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}
