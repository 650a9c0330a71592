//! Function values: closures over the scope they were defined in.

use std::rc::Rc;

use fabrique_ast::FunctionExpr;
use fabrique_core::{SourceRange, Type};

use super::ValuePtr;
use crate::eval::Scope;

/// A formal parameter, with its default already evaluated in the defining
/// scope.
#[derive(Debug, Clone)]
pub struct FunctionParam {
    pub name: String,
    pub ty: Type,
    pub default: Option<ValuePtr>,
}

#[derive(Debug)]
pub struct Function {
    ty: Type,
    src: SourceRange,
    params: Vec<FunctionParam>,
    result_ty: Type,
    /// The `function(...)` AST node; shared so the closure can re-enter
    /// evaluation without cloning the subtree.
    body: Rc<FunctionExpr>,
    /// The lexical scope chain captured at the definition site.
    captured: Scope,
}

impl Function {
    pub fn new(
        params: Vec<FunctionParam>,
        result_ty: Type,
        body: Rc<FunctionExpr>,
        captured: Scope,
        ty: Type,
        src: SourceRange,
    ) -> Self {
        Self {
            ty,
            src,
            params,
            result_ty,
            body,
            captured,
        }
    }

    pub fn typ(&self) -> &Type {
        &self.ty
    }

    pub fn source(&self) -> &SourceRange {
        &self.src
    }

    pub fn params(&self) -> &[FunctionParam] {
        &self.params
    }

    pub fn result_type(&self) -> &Type {
        &self.result_ty
    }

    pub fn body(&self) -> &Rc<FunctionExpr> {
        &self.body
    }

    pub fn captured_scope(&self) -> &Scope {
        &self.captured
    }
}
