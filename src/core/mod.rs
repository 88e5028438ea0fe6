pub mod errors;
pub mod types;

pub use errors::{Error, Result, ResultExt};
pub use types::{
    simple_name, Anomaly, AnomalyKind, CertaintyLevel, Classification, ClassificationResult,
    ClassificationStrategy, ConfidenceLevel, DomainKind, Evidence, EvidenceKind, PortDirection,
    PortKind, Severity,
};
