//! Fluent construction of semantic models
//!
//! Embedders use these builders to assemble a model programmatically; the
//! test suites lean on them heavily.

use crate::core::errors::Result;
use crate::graph::types::{
    AnnotationRef, FieldDecl, MethodDecl, Modifier, ParamDecl, SemanticModel, SourceLocation,
    TypeForm, TypeNode, TypeRef,
};

fn split_qualified(qualified: &str) -> (String, String) {
    match qualified.rsplit_once('.') {
        Some((package, simple)) => (package.to_string(), simple.to_string()),
        None => (String::new(), qualified.to_string()),
    }
}

/// Builder for a single type descriptor.
#[derive(Debug, Clone)]
pub struct TypeNodeBuilder {
    node: TypeNode,
}

impl TypeNodeBuilder {
    fn with_form(qualified: &str, form: TypeForm) -> Self {
        let (package, simple) = split_qualified(qualified);
        Self {
            node: TypeNode {
                qualified_name: qualified.to_string(),
                simple_name: simple,
                package,
                form,
                modifiers: Vec::new(),
                supertype: None,
                interfaces: Vec::new(),
                annotations: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                enclosing_type: None,
                location: None,
            },
        }
    }

    pub fn class(qualified: &str) -> Self {
        Self::with_form(qualified, TypeForm::Class)
    }

    pub fn interface(qualified: &str) -> Self {
        Self::with_form(qualified, TypeForm::Interface)
    }

    pub fn record(qualified: &str) -> Self {
        Self::with_form(qualified, TypeForm::Record)
    }

    pub fn enumeration(qualified: &str) -> Self {
        Self::with_form(qualified, TypeForm::Enum)
    }

    pub fn annotation_type(qualified: &str) -> Self {
        Self::with_form(qualified, TypeForm::Annotation)
    }

    pub fn field(mut self, name: &str, ty: TypeRef) -> Self {
        self.node.fields.push(FieldDecl::new(name, ty));
        self
    }

    pub fn final_field(mut self, name: &str, ty: TypeRef) -> Self {
        self.node
            .fields
            .push(FieldDecl::new(name, ty).with_modifiers(vec![Modifier::Final]));
        self
    }

    pub fn static_field(mut self, name: &str, ty: TypeRef) -> Self {
        self.node
            .fields
            .push(FieldDecl::new(name, ty).with_modifiers(vec![Modifier::Static]));
        self
    }

    /// `List<elem>` field shorthand
    pub fn collection_field(mut self, name: &str, elem: TypeRef) -> Self {
        self.node.fields.push(FieldDecl::new(name, TypeRef::list(elem)));
        self
    }

    /// Add a method; parameter names are synthesized
    pub fn method(mut self, name: &str, params: Vec<TypeRef>, return_type: Option<TypeRef>) -> Self {
        let params = params
            .into_iter()
            .enumerate()
            .map(|(i, ty)| ParamDecl::new(format!("arg{i}"), ty))
            .collect();
        self.node.methods.push(MethodDecl::new(name, params, return_type));
        self
    }

    pub fn annotated(mut self, name: &str) -> Self {
        self.node.annotations.push(AnnotationRef::named(name));
        self
    }

    pub fn extends(mut self, supertype: &str) -> Self {
        self.node.supertype = Some(TypeRef::named(supertype));
        self
    }

    pub fn implements(mut self, iface: &str) -> Self {
        self.node.interfaces.push(TypeRef::named(iface));
        self
    }

    pub fn enclosed_by(mut self, enclosing: &str) -> Self {
        self.node.enclosing_type = Some(enclosing.to_string());
        self
    }

    pub fn located(mut self, file: &str, line: usize) -> Self {
        self.node.location = Some(SourceLocation::new(file, line));
        self
    }

    pub fn build(self) -> TypeNode {
        self.node
    }
}

/// Builder for a whole model.
#[derive(Debug, Clone, Default)]
pub struct SemanticModelBuilder {
    types: Vec<TypeNode>,
}

impl SemanticModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, node: TypeNode) -> Self {
        self.types.push(node);
        self
    }

    pub fn push(&mut self, node: TypeNode) {
        self.types.push(node);
    }

    pub fn build(self) -> Result<SemanticModel> {
        SemanticModel::new(self.types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_derives_simple_name_and_package() {
        let node = TypeNodeBuilder::class("com.shop.Order").build();
        assert_eq!(node.simple_name, "Order");
        assert_eq!(node.package, "com.shop");
        assert_eq!(node.form, TypeForm::Class);

        let bare = TypeNodeBuilder::interface("OrderRepository").build();
        assert_eq!(bare.simple_name, "OrderRepository");
        assert_eq!(bare.package, "");
    }

    #[test]
    fn builder_synthesizes_parameter_names() {
        let node = TypeNodeBuilder::interface("com.shop.OrderRepository")
            .method(
                "save",
                vec![TypeRef::named("com.shop.Order")],
                Some(TypeRef::named("com.shop.Order")),
            )
            .build();
        assert_eq!(node.methods[0].params[0].name, "arg0");
    }

    #[test]
    fn model_builder_feeds_validation() {
        let model = SemanticModelBuilder::new()
            .with(TypeNodeBuilder::class("com.shop.Order").build())
            .with(TypeNodeBuilder::class("com.shop.Customer").build())
            .build()
            .unwrap();
        assert_eq!(model.len(), 2);

        let dup = SemanticModelBuilder::new()
            .with(TypeNodeBuilder::class("com.shop.Order").build())
            .with(TypeNodeBuilder::class("com.shop.Order").build())
            .build();
        assert!(dup.is_err());
    }
}
