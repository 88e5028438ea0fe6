// Export modules for library usage
pub mod analysis;
pub mod builders;
pub mod composition;
pub mod config;
pub mod core;
pub mod criteria;
pub mod domain;
pub mod engine;
pub mod graph;
pub mod port;
pub mod report;

// Re-export commonly used types
pub use crate::core::{
    simple_name, Anomaly, AnomalyKind, CertaintyLevel, Classification, ClassificationResult,
    ClassificationStrategy, ConfidenceLevel, DomainKind, Error, Evidence, EvidenceKind,
    PortDirection, PortKind, Result, Severity,
};

pub use crate::graph::{
    AnnotationRef, FieldDecl, MethodDecl, Modifier, ParamDecl, SemanticModel, SourceLocation,
    TypeForm, TypeGraph, TypeNode, TypeRef,
};

pub use crate::analysis::{detect_anomalies, detect_cycles, Cycle, CycleConfig};

pub use crate::builders::{SemanticModelBuilder, TypeNodeBuilder};

pub use crate::composition::{
    Cardinality, CompositionEdge, CompositionGraph, CompositionNode, CompositionStats,
    RelationType,
};

pub use crate::config::AnalysisConfig;

pub use crate::criteria::{
    CompatibilityTable, Conflict, ConflictSeverity, Contribution, CriteriaEngine, Criterion,
    Decision, MatchResult,
};

pub use crate::domain::DomainAnalysis;

pub use crate::engine::{analyze, AnalysisEngine, AnalysisReport};

pub use crate::port::{
    ClassificationStatus, PortClassification, PortClassifier, PortMethodKind,
};

pub use crate::report::ClassificationStats;
