//! Structural discriminators backing the repository phase
//!
//! A repository-shaped interface names the aggregate it manages through its
//! save-like method; a find-by-id-like method corroborates the binding.

use crate::core::{simple_name, Evidence, EvidenceKind};
use crate::graph::{SemanticModel, TypeNode};

pub const SAVE_METHOD_NAMES: [&str; 6] =
    ["save", "persist", "store", "insert", "update", "upsert"];

pub const FIND_BY_ID_NAMES: [&str; 4] = ["findById", "getById", "findByIdentifier", "loadById"];

/// A repository interface and the aggregate type it manages.
#[derive(Debug, Clone)]
pub struct RepositoryBinding {
    pub repository: String,
    pub managed_type: String,
    pub reasoning: String,
    pub evidence: Vec<Evidence>,
}

/// Scans interfaces for repository-shaped signatures.
///
/// Bindings come back in ascending interface-name order, which is what gives
/// the first repository the claim when several manage the same type.
pub fn discover_repository_bindings(model: &SemanticModel) -> Vec<RepositoryBinding> {
    model
        .interfaces()
        .filter_map(|iface| detect(iface, model))
        .collect()
}

fn detect(iface: &TypeNode, model: &SemanticModel) -> Option<RepositoryBinding> {
    if !iface.simple_name.ends_with("Repository") {
        return None;
    }

    let mut evidence = vec![Evidence::new(
        EvidenceKind::Naming,
        format!(
            "Interface '{}' follows Repository naming convention",
            iface.simple_name
        ),
    )];

    let managed = save_method_type(iface, model)?;
    evidence.push(Evidence::new(
        EvidenceKind::Structure,
        format!("Has save method for type {}", simple_name(&managed)),
    ));

    if let Some(found) = find_by_id_type(iface) {
        evidence.push(Evidence::new(
            EvidenceKind::Structure,
            format!("Has findById method returning {}", simple_name(&found)),
        ));
        if found != managed {
            log::warn!(
                "repository '{}': save and findById manage different types ({} vs {})",
                iface.simple_name,
                simple_name(&managed),
                simple_name(&found),
            );
        }
    }

    let reasoning = format!(
        "Type '{}' is managed by repository '{}' - classified as AGGREGATE_ROOT",
        simple_name(&managed),
        iface.simple_name,
    );

    Some(RepositoryBinding {
        repository: iface.qualified_name.clone(),
        managed_type: managed,
        reasoning,
        evidence,
    })
}

/// First save-like method whose single parameter names an in-scope type
fn save_method_type(iface: &TypeNode, model: &SemanticModel) -> Option<String> {
    iface.methods.iter().find_map(|method| {
        if !SAVE_METHOD_NAMES.contains(&method.name.as_str()) {
            return None;
        }
        match method.params.as_slice() {
            [param] if model.contains(&param.ty.raw) => Some(param.ty.raw.clone()),
            _ => None,
        }
    })
}

/// First find-by-id-like method's return type, unwrapping an optional
fn find_by_id_type(iface: &TypeNode) -> Option<String> {
    iface.methods.iter().find_map(|method| {
        if !FIND_BY_ID_NAMES.contains(&method.name.as_str()) {
            return None;
        }
        let ret = method.return_type.as_ref()?;
        if ret.is_optional() {
            ret.first_type_arg().map(|inner| inner.raw.clone())
        } else {
            Some(ret.raw.clone())
        }
    })
}
