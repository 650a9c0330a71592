//! Visitor infrastructure for AST traversal.
//!
//! Implement [`Visitor`] and hand it to [`walk_file`] (or any of the finer
//! `walk_*` functions). Each node type has a `visit_*`/`leave_*` method pair:
//!
//! - `visit_*` runs in pre-order and its [`VisitResult`] controls traversal
//! - `leave_*` runs in post-order, and still runs after `SkipChildren`
//! - children are visited in source order
//!
//! The walk functions return `false` once a visitor has asked to [`Stop`],
//! so traversal can be abandoned from any depth.
//!
//! [`Stop`]: VisitResult::Stop

use crate::nodes::*;

/// Result of visiting a node - controls traversal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitResult {
    /// Continue traversal into children.
    #[default]
    Continue,

    /// Skip children, continue with siblings. `leave_*` is still called.
    SkipChildren,

    /// Stop traversal entirely.
    Stop,
}

/// Generates `visit_*`/`leave_*` method pairs with default implementations.
macro_rules! visitor_methods {
    (
        $(
            $base_name:ident : $node_type:ty
        ),* $(,)?
    ) => {
        paste::paste! {
            $(
                #[doc = concat!("Visit a [`", stringify!($node_type), "`] node.")]
                #[allow(unused_variables)]
                fn [<visit_ $base_name>](&mut self, node: &$node_type) -> VisitResult {
                    VisitResult::Continue
                }

                #[doc = concat!("Leave a [`", stringify!($node_type), "`] node.")]
                #[allow(unused_variables)]
                fn [<leave_ $base_name>](&mut self, node: &$node_type) {}
            )*
        }
    };
}

/// Immutable visitor over the AST.
pub trait Visitor {
    // Structure
    visitor_methods! {
        value_binding: ValueBinding,
        identifier: Identifier,
        type_reference: TypeReference,
        parameter: Parameter,
        argument: Argument,
    }

    // Expressions
    visitor_methods! {
        expression: Expression,
        bool_literal: BoolLiteral,
        int_literal: IntLiteral,
        string_literal: StringLiteral,
        filename: Filename,
        file_list: FileList,
        list: ListExpr,
        record: RecordExpr,
        name_reference: NameReference,
        field_access: FieldAccess,
        field_query: FieldQuery,
        call: Call,
        binary_op: BinaryOp,
        unary_op: UnaryOp,
        conditional: Conditional,
        foreach: Foreach,
        function: FunctionExpr,
        action: ActionExpr,
        type_declaration: TypeDeclaration,
        compound: CompoundExpr,
    }
}

/// Expands to the standard enter/children/leave shape of a walk function.
/// `$children` evaluates to `false` if a child walk was stopped.
macro_rules! walk_node {
    ($visitor:ident, $node:ident, $visit:ident, $leave:ident, $children:expr) => {{
        match $visitor.$visit($node) {
            VisitResult::Stop => return false,
            VisitResult::SkipChildren => {}
            VisitResult::Continue => {
                if !$children {
                    return false;
                }
            }
        }
        $visitor.$leave($node);
        true
    }};
}

pub fn walk_file<V: Visitor>(visitor: &mut V, bindings: &[ValueBinding]) -> bool {
    bindings.iter().all(|b| walk_value_binding(visitor, b))
}

pub fn walk_value_binding<V: Visitor>(visitor: &mut V, node: &ValueBinding) -> bool {
    walk_node!(visitor, node, visit_value_binding, leave_value_binding, {
        walk_identifier(visitor, &node.name)
            && node
                .declared_type
                .as_ref()
                .is_none_or(|t| walk_type_reference(visitor, t))
            && walk_expression(visitor, &node.value)
    })
}

pub fn walk_identifier<V: Visitor>(visitor: &mut V, node: &Identifier) -> bool {
    walk_node!(visitor, node, visit_identifier, leave_identifier, true)
}

pub fn walk_type_reference<V: Visitor>(visitor: &mut V, node: &TypeReference) -> bool {
    walk_node!(visitor, node, visit_type_reference, leave_type_reference, {
        match &node.kind {
            TypeRefKind::Named { name, params } => {
                walk_identifier(visitor, name)
                    && params.iter().all(|p| walk_type_reference(visitor, p))
            }
            TypeRefKind::Record { fields } => fields.iter().all(|(name, ty)| {
                walk_identifier(visitor, name) && walk_type_reference(visitor, ty)
            }),
        }
    })
}

pub fn walk_parameter<V: Visitor>(visitor: &mut V, node: &Parameter) -> bool {
    walk_node!(visitor, node, visit_parameter, leave_parameter, {
        walk_identifier(visitor, &node.name)
            && walk_type_reference(visitor, &node.param_type)
            && node
                .default
                .as_ref()
                .is_none_or(|d| walk_expression(visitor, d))
    })
}

pub fn walk_argument<V: Visitor>(visitor: &mut V, node: &Argument) -> bool {
    walk_node!(visitor, node, visit_argument, leave_argument, {
        node.name
            .as_ref()
            .is_none_or(|n| walk_identifier(visitor, n))
            && walk_expression(visitor, &node.value)
    })
}

pub fn walk_expression<V: Visitor>(visitor: &mut V, node: &Expression) -> bool {
    walk_node!(visitor, node, visit_expression, leave_expression, {
        match node {
            Expression::BoolLiteral(e) => walk_bool_literal(visitor, e),
            Expression::IntLiteral(e) => walk_int_literal(visitor, e),
            Expression::StringLiteral(e) => walk_string_literal(visitor, e),
            Expression::Filename(e) => walk_filename(visitor, e),
            Expression::FileList(e) => walk_file_list(visitor, e),
            Expression::List(e) => walk_list(visitor, e),
            Expression::Record(e) => walk_record(visitor, e),
            Expression::NameReference(e) => walk_name_reference(visitor, e),
            Expression::FieldAccess(e) => walk_field_access(visitor, e),
            Expression::FieldQuery(e) => walk_field_query(visitor, e),
            Expression::Call(e) => walk_call(visitor, e),
            Expression::BinaryOp(e) => walk_binary_op(visitor, e),
            Expression::UnaryOp(e) => walk_unary_op(visitor, e),
            Expression::Conditional(e) => walk_conditional(visitor, e),
            Expression::Foreach(e) => walk_foreach(visitor, e),
            Expression::Function(e) => walk_function(visitor, e),
            Expression::Action(e) => walk_action(visitor, e),
            Expression::TypeDeclaration(e) => walk_type_declaration(visitor, e),
            Expression::Compound(e) => walk_compound(visitor, e),
        }
    })
}

pub fn walk_bool_literal<V: Visitor>(visitor: &mut V, node: &BoolLiteral) -> bool {
    walk_node!(visitor, node, visit_bool_literal, leave_bool_literal, true)
}

pub fn walk_int_literal<V: Visitor>(visitor: &mut V, node: &IntLiteral) -> bool {
    walk_node!(visitor, node, visit_int_literal, leave_int_literal, true)
}

pub fn walk_string_literal<V: Visitor>(visitor: &mut V, node: &StringLiteral) -> bool {
    walk_node!(visitor, node, visit_string_literal, leave_string_literal, true)
}

pub fn walk_filename<V: Visitor>(visitor: &mut V, node: &Filename) -> bool {
    walk_node!(visitor, node, visit_filename, leave_filename, true)
}

pub fn walk_file_list<V: Visitor>(visitor: &mut V, node: &FileList) -> bool {
    walk_node!(visitor, node, visit_file_list, leave_file_list, {
        node.files.iter().all(|f| walk_filename(visitor, f))
            && node.arguments.iter().all(|a| walk_argument(visitor, a))
    })
}

pub fn walk_list<V: Visitor>(visitor: &mut V, node: &ListExpr) -> bool {
    walk_node!(visitor, node, visit_list, leave_list, {
        node.elements.iter().all(|e| walk_expression(visitor, e))
    })
}

pub fn walk_record<V: Visitor>(visitor: &mut V, node: &RecordExpr) -> bool {
    walk_node!(visitor, node, visit_record, leave_record, {
        node.fields.iter().all(|f| walk_value_binding(visitor, f))
    })
}

pub fn walk_name_reference<V: Visitor>(visitor: &mut V, node: &NameReference) -> bool {
    walk_node!(visitor, node, visit_name_reference, leave_name_reference, {
        walk_identifier(visitor, &node.name)
    })
}

pub fn walk_field_access<V: Visitor>(visitor: &mut V, node: &FieldAccess) -> bool {
    walk_node!(visitor, node, visit_field_access, leave_field_access, {
        walk_expression(visitor, &node.base) && walk_identifier(visitor, &node.field)
    })
}

pub fn walk_field_query<V: Visitor>(visitor: &mut V, node: &FieldQuery) -> bool {
    walk_node!(visitor, node, visit_field_query, leave_field_query, {
        walk_expression(visitor, &node.base)
            && walk_identifier(visitor, &node.field)
            && walk_expression(visitor, &node.default)
    })
}

pub fn walk_call<V: Visitor>(visitor: &mut V, node: &Call) -> bool {
    walk_node!(visitor, node, visit_call, leave_call, {
        walk_expression(visitor, &node.target)
            && node
                .arguments
                .args
                .iter()
                .all(|a| walk_argument(visitor, a))
    })
}

pub fn walk_binary_op<V: Visitor>(visitor: &mut V, node: &BinaryOp) -> bool {
    walk_node!(visitor, node, visit_binary_op, leave_binary_op, {
        walk_expression(visitor, &node.lhs) && walk_expression(visitor, &node.rhs)
    })
}

pub fn walk_unary_op<V: Visitor>(visitor: &mut V, node: &UnaryOp) -> bool {
    walk_node!(visitor, node, visit_unary_op, leave_unary_op, {
        walk_expression(visitor, &node.operand)
    })
}

pub fn walk_conditional<V: Visitor>(visitor: &mut V, node: &Conditional) -> bool {
    walk_node!(visitor, node, visit_conditional, leave_conditional, {
        walk_expression(visitor, &node.condition)
            && walk_expression(visitor, &node.then_branch)
            && walk_expression(visitor, &node.else_branch)
    })
}

pub fn walk_foreach<V: Visitor>(visitor: &mut V, node: &Foreach) -> bool {
    walk_node!(visitor, node, visit_foreach, leave_foreach, {
        walk_identifier(visitor, &node.loop_var)
            && node
                .explicit_type
                .as_ref()
                .is_none_or(|t| walk_type_reference(visitor, t))
            && walk_expression(visitor, &node.source_value)
            && walk_expression(visitor, &node.body)
    })
}

pub fn walk_function<V: Visitor>(visitor: &mut V, node: &FunctionExpr) -> bool {
    walk_node!(visitor, node, visit_function, leave_function, {
        node.params.iter().all(|p| walk_parameter(visitor, p))
            && walk_type_reference(visitor, &node.result_type)
            && walk_expression(visitor, &node.body)
    })
}

pub fn walk_action<V: Visitor>(visitor: &mut V, node: &ActionExpr) -> bool {
    walk_node!(visitor, node, visit_action, leave_action, {
        node.arguments
            .args
            .iter()
            .all(|a| walk_argument(visitor, a))
            && node.params.iter().all(|p| walk_parameter(visitor, p))
    })
}

pub fn walk_type_declaration<V: Visitor>(visitor: &mut V, node: &TypeDeclaration) -> bool {
    walk_node!(visitor, node, visit_type_declaration, leave_type_declaration, {
        walk_type_reference(visitor, &node.declared)
    })
}

pub fn walk_compound<V: Visitor>(visitor: &mut V, node: &CompoundExpr) -> bool {
    walk_node!(visitor, node, visit_compound, leave_compound, {
        node.bindings.iter().all(|b| walk_value_binding(visitor, b))
            && walk_expression(visitor, &node.result)
    })
}
