//! Typed edges of the structural graph

use crate::core::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of structural relations between types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    Extends,
    Implements,
    /// Enclosing type to nested type
    Declares,
    FieldType,
    ReturnType,
    ParameterType,
    AnnotatedBy,
    UsesInSignature,
    UsesAsCollectionElement,
    /// Generic derived fallback
    References,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeKind::Extends => "EXTENDS",
            EdgeKind::Implements => "IMPLEMENTS",
            EdgeKind::Declares => "DECLARES",
            EdgeKind::FieldType => "FIELD_TYPE",
            EdgeKind::ReturnType => "RETURN_TYPE",
            EdgeKind::ParameterType => "PARAMETER_TYPE",
            EdgeKind::AnnotatedBy => "ANNOTATED_BY",
            EdgeKind::UsesInSignature => "USES_IN_SIGNATURE",
            EdgeKind::UsesAsCollectionElement => "USES_AS_COLLECTION_ELEMENT",
            EdgeKind::References => "REFERENCES",
        };
        write!(f, "{s}")
    }
}

/// Whether an edge was observed directly or computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeOrigin {
    Raw,
    Derived,
}

/// Rule that justified computing a derived edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DerivationRule {
    SignatureUsage,
    CollectionUnwrap,
    OptionalUnwrap,
}

impl fmt::Display for DerivationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DerivationRule::SignatureUsage => "SIGNATURE_USAGE",
            DerivationRule::CollectionUnwrap => "COLLECTION_UNWRAP",
            DerivationRule::OptionalUnwrap => "OPTIONAL_UNWRAP",
        };
        write!(f, "{s}")
    }
}

/// Proof backing a derived edge: the declaration it was computed from and
/// the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeProof {
    /// `method:<name>` or `field:<name>`
    pub source_ref: String,
    pub rule: DerivationRule,
}

impl EdgeProof {
    pub fn method(name: &str, rule: DerivationRule) -> Self {
        Self {
            source_ref: format!("method:{name}"),
            rule,
        }
    }

    pub fn field(name: &str, rule: DerivationRule) -> Self {
        Self {
            source_ref: format!("field:{name}"),
            rule,
        }
    }
}

/// A directed structural relation between two types.
///
/// Invariant: derived edges carry a proof, raw edges never do. The graph
/// rejects edges violating this at insertion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    pub origin: EdgeOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<EdgeProof>,
}

impl Edge {
    pub fn raw(from: impl Into<String>, to: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            origin: EdgeOrigin::Raw,
            proof: None,
        }
    }

    pub fn derived(
        from: impl Into<String>,
        to: impl Into<String>,
        kind: EdgeKind,
        proof: EdgeProof,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            origin: EdgeOrigin::Derived,
            proof: Some(proof),
        }
    }

    /// Enforce the proof invariant
    pub fn validate(&self) -> Result<()> {
        match (self.origin, &self.proof) {
            (EdgeOrigin::Derived, None) => Err(Error::edge(
                &self.from,
                &self.to,
                format!("derived {} edge is missing its proof", self.kind),
            )),
            (EdgeOrigin::Raw, Some(_)) => Err(Error::edge(
                &self.from,
                &self.to,
                format!("raw {} edge must not carry a proof", self.kind),
            )),
            _ => Ok(()),
        }
    }
}
