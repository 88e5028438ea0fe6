//! Semantic model supplied by the front end
//!
//! The model is an already-resolved snapshot of the analyzed types. Nothing
//! here parses source text; descriptors arrive fully normalized and are never
//! mutated once the model is built.

use crate::core::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

/// Collection raw names unwrapped to their element type
const COLLECTION_NAMES: &[&str] = &["Collection", "List", "Set", "Queue", "Deque", "Iterable"];

/// Optional-style wrapper raw names
const OPTIONAL_NAMES: &[&str] = &["Optional", "Option"];

/// Form of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeForm {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl TypeForm {
    /// Forms the domain phases consider for role assignment
    pub fn is_domain_candidate(&self) -> bool {
        matches!(self, TypeForm::Class | TypeForm::Record | TypeForm::Enum)
    }
}

/// Declaration modifiers relevant to classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Abstract,
    Final,
    Static,
}

/// A possibly generic, possibly array type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// Qualified name of the raw type
    pub raw: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_args: Vec<TypeRef>,
    /// Zero for non-array references
    #[serde(default, skip_serializing_if = "is_zero")]
    pub array_dims: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl TypeRef {
    pub fn named(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            type_args: Vec::new(),
            array_dims: 0,
        }
    }

    pub fn generic(raw: impl Into<String>, type_args: Vec<TypeRef>) -> Self {
        Self {
            raw: raw.into(),
            type_args,
            array_dims: 0,
        }
    }

    /// `List<elem>` shorthand
    pub fn list(elem: TypeRef) -> Self {
        Self::generic("List", vec![elem])
    }

    /// `Set<elem>` shorthand
    pub fn set(elem: TypeRef) -> Self {
        Self::generic("Set", vec![elem])
    }

    /// `Optional<elem>` shorthand
    pub fn optional(elem: TypeRef) -> Self {
        Self::generic("Optional", vec![elem])
    }

    /// Add one array dimension
    pub fn into_array(mut self) -> Self {
        self.array_dims += 1;
        self
    }

    pub fn is_array(&self) -> bool {
        self.array_dims > 0
    }

    pub fn simple_name(&self) -> &str {
        crate::core::types::simple_name(&self.raw)
    }

    pub fn is_collection(&self) -> bool {
        !self.is_array() && COLLECTION_NAMES.contains(&self.simple_name())
    }

    pub fn is_optional(&self) -> bool {
        !self.is_array() && OPTIONAL_NAMES.contains(&self.simple_name())
    }

    pub fn first_type_arg(&self) -> Option<&TypeRef> {
        self.type_args.first()
    }

    /// Strip one layer of array, collection or optional wrapping.
    ///
    /// Returns `None` when the reference is not a wrapper or carries no
    /// element argument.
    pub fn unwrap_element(&self) -> Option<TypeRef> {
        if self.is_array() {
            return Some(TypeRef {
                raw: self.raw.clone(),
                type_args: self.type_args.clone(),
                array_dims: self.array_dims - 1,
            });
        }
        if self.is_collection() || self.is_optional() {
            return self.first_type_arg().cloned();
        }
        None
    }

    /// Strip wrapper layers until a plain reference remains
    pub fn innermost(&self) -> TypeRef {
        let mut current = self.clone();
        while let Some(inner) = current.unwrap_element() {
            current = inner;
        }
        current
    }
}

/// An annotation applied to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationRef {
    /// Simple or qualified name; matching is by simple name
    pub name: String,
    /// Ordered key/value attribute pairs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<(String, String)>,
}

impl AnnotationRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn simple_name(&self) -> &str {
        crate::core::types::simple_name(&self.name)
    }
}

/// A field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationRef>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            modifiers: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Vec<Modifier>) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(&Modifier::Static)
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.contains(&Modifier::Final)
    }
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeRef,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A method declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    /// `None` for void
    pub return_type: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationRef>,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>, params: Vec<ParamDecl>, return_type: Option<TypeRef>) -> Self {
        Self {
            name: name.into(),
            return_type,
            params,
            modifiers: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(&Modifier::Static)
    }
}

/// Where a declaration appeared in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// A type in the analyzed model.
///
/// Identity is the qualified name alone: two nodes compare and hash equal
/// whenever their qualified names match, regardless of other attributes.
/// Graph deduplication depends on this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeNode {
    pub qualified_name: String,
    pub simple_name: String,
    pub package: String,
    pub form: TypeForm,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertype: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodDecl>,
    /// Qualified name of the enclosing type for nested declarations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enclosing_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl PartialEq for TypeNode {
    fn eq(&self, other: &Self) -> bool {
        self.qualified_name == other.qualified_name
    }
}

impl Eq for TypeNode {}

impl Hash for TypeNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qualified_name.hash(state);
    }
}

impl TypeNode {
    pub fn is_interface(&self) -> bool {
        self.form == TypeForm::Interface
    }

    pub fn is_record(&self) -> bool {
        self.form == TypeForm::Record
    }

    /// Annotation lookup by simple name
    pub fn has_annotation(&self, simple: &str) -> bool {
        self.annotations.iter().any(|a| a.simple_name() == simple)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Non-static fields in declaration order
    pub fn instance_fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.fields.iter().filter(|f| !f.is_static())
    }

    /// Whether the simple name carries an `Id`/`ID` suffix
    pub fn has_id_suffix(&self) -> bool {
        self.simple_name.ends_with("Id") || self.simple_name.ends_with("ID")
    }

    /// A type has identity when it declares an instance field named `id` or
    /// `<lowerCamelSimpleName>Id`.
    pub fn has_identity_field(&self) -> bool {
        let own_id = format!("{}Id", lower_camel(&self.simple_name));
        self.instance_fields()
            .any(|f| f.name == "id" || f.name == own_id)
    }

    /// Single-field wrapper whose name marks it as an identifier
    pub fn is_id_wrapper(&self) -> bool {
        self.has_id_suffix() && self.instance_fields().count() == 1
    }

    /// Records, and classes whose every field is final
    pub fn is_immutable_product(&self) -> bool {
        if self.is_record() {
            return true;
        }
        self.form == TypeForm::Class
            && self.instance_fields().next().is_some()
            && self.instance_fields().all(|f| f.is_final())
    }
}

/// Lower the first character of a simple name
pub(crate) fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// The full, deduplicated set of types under analysis.
///
/// Keyed by qualified name; iteration is always ascending by name, which is
/// what keeps downstream passes order-independent of the input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticModel {
    types: BTreeMap<String, TypeNode>,
}

impl SemanticModel {
    /// Build a model from descriptors, rejecting blank or duplicate names
    pub fn new(types: Vec<TypeNode>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for node in types {
            if node.qualified_name.trim().is_empty() {
                return Err(Error::Validation(
                    "semantic model contains a type with an empty qualified name".to_string(),
                ));
            }
            let name = node.qualified_name.clone();
            if map.insert(name.clone(), node).is_some() {
                return Err(Error::Validation(format!(
                    "duplicate type name '{name}' in semantic model"
                )));
            }
        }
        Ok(Self { types: map })
    }

    pub fn get(&self, qualified_name: &str) -> Option<&TypeNode> {
        self.types.get(qualified_name)
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.types.contains_key(qualified_name)
    }

    /// All types, ascending by qualified name
    pub fn types(&self) -> impl Iterator<Item = &TypeNode> {
        self.types.values()
    }

    /// All qualified names, ascending
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &TypeNode> {
        self.types().filter(|t| t.is_interface())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
