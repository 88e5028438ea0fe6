pub mod edge;
pub mod type_graph;
pub mod types;

pub use edge::{DerivationRule, Edge, EdgeKind, EdgeOrigin, EdgeProof};
pub use type_graph::TypeGraph;
pub use types::{
    AnnotationRef, FieldDecl, MethodDecl, Modifier, ParamDecl, SemanticModel, SourceLocation,
    TypeForm, TypeNode, TypeRef,
};
