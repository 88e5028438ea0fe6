//! Method-shape analysis for port interfaces
//!
//! Interface methods are bucketed by name prefix into coarse kinds. The
//! signature criteria and the kind refiner consume the buckets; downstream
//! generators get the per-method breakdown on the classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{ClassificationResult, DomainKind};
use crate::graph::{SemanticModel, TypeNode, TypeRef};

const SAVE_PREFIXES: [&str; 7] = ["save", "persist", "store", "insert", "add", "update", "upsert"];
const FIND_PREFIXES: [&str; 5] = ["find", "get", "load", "fetch", "retrieve"];
const DELETE_PREFIXES: [&str; 2] = ["delete", "remove"];
const EXISTS_PREFIXES: [&str; 1] = ["exists"];
const COUNT_PREFIXES: [&str; 1] = ["count"];
const PUBLISH_PREFIXES: [&str; 7] = [
    "publish",
    "emit",
    "send",
    "dispatch",
    "fire",
    "broadcast",
    "notify",
];

/// Coarse role of an interface method, assigned by name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortMethodKind {
    Save,
    Find,
    Delete,
    Exists,
    Count,
    Publish,
    Other,
}

impl PortMethodKind {
    pub fn of(method_name: &str) -> Self {
        if starts_with_any(method_name, &SAVE_PREFIXES) {
            return PortMethodKind::Save;
        }
        if starts_with_any(method_name, &FIND_PREFIXES) {
            return PortMethodKind::Find;
        }
        if starts_with_any(method_name, &DELETE_PREFIXES) {
            return PortMethodKind::Delete;
        }
        if starts_with_any(method_name, &EXISTS_PREFIXES) {
            return PortMethodKind::Exists;
        }
        if starts_with_any(method_name, &COUNT_PREFIXES) {
            return PortMethodKind::Count;
        }
        if starts_with_any(method_name, &PUBLISH_PREFIXES) {
            return PortMethodKind::Publish;
        }
        PortMethodKind::Other
    }

    pub fn is_crud(&self) -> bool {
        matches!(
            self,
            PortMethodKind::Save
                | PortMethodKind::Find
                | PortMethodKind::Delete
                | PortMethodKind::Exists
                | PortMethodKind::Count
        )
    }

    pub fn is_publish(&self) -> bool {
        matches!(self, PortMethodKind::Publish)
    }
}

impl fmt::Display for PortMethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortMethodKind::Save => "SAVE",
            PortMethodKind::Find => "FIND",
            PortMethodKind::Delete => "DELETE",
            PortMethodKind::Exists => "EXISTS",
            PortMethodKind::Count => "COUNT",
            PortMethodKind::Publish => "PUBLISH",
            PortMethodKind::Other => "OTHER",
        };
        write!(f, "{s}")
    }
}

fn starts_with_any(name: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| name.starts_with(p))
}

/// Kind of every declared method, in declaration order.
pub fn method_kinds(node: &TypeNode) -> Vec<(String, PortMethodKind)> {
    node.methods
        .iter()
        .map(|m| (m.name.clone(), PortMethodKind::of(&m.name)))
        .collect()
}

pub fn crud_method_count(node: &TypeNode) -> usize {
    node.methods
        .iter()
        .filter(|m| PortMethodKind::of(&m.name).is_crud())
        .count()
}

pub fn has_crud_methods(node: &TypeNode) -> bool {
    crud_method_count(node) > 0
}

/// At least one method, and a strict majority of them CRUD-named.
pub fn crud_majority(node: &TypeNode) -> bool {
    !node.methods.is_empty() && crud_method_count(node) * 2 > node.methods.len()
}

/// True when a publish-verb method takes an `*Event`-typed parameter, or
/// when the interface has publish verbs and no CRUD methods at all.
pub fn looks_like_publisher(node: &TypeNode) -> bool {
    let mut publish = 0usize;
    let mut crud = 0usize;
    for method in &node.methods {
        let kind = PortMethodKind::of(&method.name);
        if kind.is_publish() {
            publish += 1;
            if method
                .params
                .iter()
                .any(|p| p.ty.innermost().simple_name().ends_with("Event"))
            {
                return true;
            }
        } else if kind.is_crud() {
            crud += 1;
        }
    }
    publish > 0 && crud == 0
}

/// Every distinct type named in the interface's signatures, innermost
/// element types only, in first-use order. Within one method the return
/// type comes before the parameters.
pub fn signature_types(node: &TypeNode) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for method in &node.methods {
        if let Some(ret) = &method.return_type {
            push_innermost(ret, &mut seen);
        }
        for param in &method.params {
            push_innermost(&param.ty, &mut seen);
        }
    }
    seen
}

fn push_innermost(ty: &TypeRef, seen: &mut Vec<String>) {
    let raw = ty.innermost().raw;
    if !seen.iter().any(|s| *s == raw) {
        seen.push(raw);
    }
}

/// In-scope types appearing in the port's signatures, first-use order.
pub fn managed_types(node: &TypeNode, model: &SemanticModel) -> Vec<String> {
    signature_types(node)
        .into_iter()
        .filter(|name| model.contains(name))
        .collect()
}

/// First managed type the domain pass classified AGGREGATE_ROOT or ENTITY.
/// Value objects and identifiers are skipped.
pub fn primary_managed_type(managed: &[String], domain: &ClassificationResult) -> Option<String> {
    managed
        .iter()
        .find(|name| {
            matches!(
                domain.kind_of(name),
                DomainKind::AggregateRoot | DomainKind::Entity
            )
        })
        .cloned()
}
