//! Post-parse validation.
//!
//! The grammar accepts a superset of well-formed Fabrique; this pass walks a
//! freshly parsed tree and collects the structural errors the grammar cannot
//! express:
//!
//! - reserved names used as binding, field, parameter, or loop-variable names
//! - `in`/`out` parameters outside an `action` (those names are reserved for
//!   tagging action inputs and outputs)
//! - `action` with no arguments at all
//! - duplicate parameter names, and duplicate bindings in a record or
//!   compound expression
//!
//! All problems are collected; nothing stops at the first one.

use fabrique_core::{FabError, Reporter};

use crate::nodes::*;
use crate::visitor::{self, VisitResult, Visitor};

/// Names that cannot be bound by user code: the evaluator-provided values
/// and the primitive type names.
pub const RESERVED_NAMES: &[&str] = &[
    "args", "buildroot", "srcroot", "bool", "int", "string", "file", "list", "maybe", "nil",
];

/// Validates a parsed file, returning every error found.
pub fn validate_file(bindings: &[ValueBinding]) -> Vec<FabError> {
    let mut validator = Validator::default();
    visitor::walk_file(&mut validator, bindings);
    validator.errors
}

/// Validates and reports in one step; `Err` with the first error if any.
pub fn validate_into(bindings: &[ValueBinding], reporter: &mut Reporter) -> Result<(), FabError> {
    let mut errors = validate_file(bindings);
    if errors.is_empty() {
        return Ok(());
    }
    for err in &errors {
        reporter.record(err);
    }
    Err(errors.remove(0))
}

#[derive(Default)]
struct Validator {
    errors: Vec<FabError>,
    /// Depth of `action(...)` nodes currently being walked.
    action_depth: usize,
}

impl Validator {
    fn check_name(&mut self, name: &Identifier, what: &str) {
        if RESERVED_NAMES.contains(&name.name.as_str()) {
            self.errors.push(FabError::syntax(
                format!("reserved name '{}' cannot be used as a {what}", name.name),
                name.span.clone(),
            ));
        }
    }

    fn check_unique_params(&mut self, params: &[Parameter]) {
        for (i, param) in params.iter().enumerate() {
            if params[..i].iter().any(|p| p.name.name == param.name.name) {
                self.errors.push(FabError::syntax(
                    format!("duplicate parameter '{}'", param.name.name),
                    param.name.span.clone(),
                ));
            }
        }
    }

    fn check_unique_bindings(&mut self, bindings: &[ValueBinding]) {
        for (i, binding) in bindings.iter().enumerate() {
            if bindings[..i]
                .iter()
                .any(|b| b.name.name == binding.name.name)
            {
                self.errors.push(FabError::syntax(
                    format!("'{}' is bound more than once", binding.name.name),
                    binding.name.span.clone(),
                ));
            }
        }
    }
}

impl Visitor for Validator {
    fn visit_value_binding(&mut self, node: &ValueBinding) -> VisitResult {
        self.check_name(&node.name, "value name");
        VisitResult::Continue
    }

    fn visit_parameter(&mut self, node: &Parameter) -> VisitResult {
        self.check_name(&node.name, "parameter name");
        let name = node.name.name.as_str();
        if self.action_depth == 0 && (name == "in" || name == "out") {
            self.errors.push(FabError::syntax(
                format!("'{name}' is reserved for action parameters"),
                node.name.span.clone(),
            ));
        }
        VisitResult::Continue
    }

    fn visit_foreach(&mut self, node: &Foreach) -> VisitResult {
        self.check_name(&node.loop_var, "loop variable");
        VisitResult::Continue
    }

    fn visit_function(&mut self, node: &FunctionExpr) -> VisitResult {
        self.check_unique_params(&node.params);
        VisitResult::Continue
    }

    fn visit_action(&mut self, node: &ActionExpr) -> VisitResult {
        if node.arguments.is_empty() {
            self.errors.push(FabError::syntax(
                "action requires at least one argument",
                node.span.clone(),
            ));
        }
        self.check_unique_params(&node.params);
        self.action_depth += 1;
        VisitResult::Continue
    }

    fn leave_action(&mut self, _node: &ActionExpr) {
        self.action_depth -= 1;
    }

    fn visit_record(&mut self, node: &RecordExpr) -> VisitResult {
        self.check_unique_bindings(&node.fields);
        VisitResult::Continue
    }

    fn visit_compound(&mut self, node: &CompoundExpr) -> VisitResult {
        self.check_unique_bindings(&node.bindings);
        VisitResult::Continue
    }
}
