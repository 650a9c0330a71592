//! Code generation: turning an AST back into Fabrique source.
//!
//! The printer produces canonical formatting, so `parse(codegen(ast))` yields
//! a tree that prints identically — the round-trip fixpoint the test suite
//! checks. Parentheses are re-inserted from operator precedence, not stored
//! in the tree.
//!
//! Output runs through [`CodegenState::token`], which tags every lexeme with
//! a [`Style`]. With no highlighter attached the tags are dropped; the CLI
//! attaches an ANSI highlighter for terminal output.

use crate::nodes::*;

/// Formatting hint for a printed lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// `action`, `function`, `foreach`: things that produce work.
    Action,
    /// Literal values.
    Literal,
    /// Names at their definition site.
    Definition,
    /// Operators and punctuation.
    Operator,
    /// Names at a use site.
    Reference,
    /// Type names.
    Type,
    /// Filenames.
    Filename,
    /// Everything else.
    Plain,
}

/// Hook for colorizing output; see the CLI's ANSI implementation.
pub trait Highlight {
    fn paint(&self, style: Style, text: &str) -> String;
}

/// Accumulates printed source.
#[derive(Default)]
pub struct CodegenState<'h> {
    out: String,
    indent: usize,
    highlight: Option<&'h dyn Highlight>,
}

const INDENT: &str = "    ";

impl<'h> CodegenState<'h> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_highlight(highlight: &'h dyn Highlight) -> Self {
        Self {
            out: String::new(),
            indent: 0,
            highlight: Some(highlight),
        }
    }

    /// Append a styled lexeme.
    pub fn token(&mut self, style: Style, text: &str) {
        match self.highlight {
            Some(h) => {
                let painted = h.paint(style, text);
                self.out.push_str(&painted);
            }
            None => self.out.push_str(text),
        }
    }

    pub fn space(&mut self) {
        self.out.push(' ');
    }

    pub fn newline(&mut self) {
        self.out.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent below zero");
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write the current indentation.
    pub fn add_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }
}

impl std::fmt::Display for CodegenState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.out)
    }
}

/// Nodes that can print themselves as Fabrique source.
pub trait Codegen {
    fn codegen(&self, state: &mut CodegenState);
}

/// Print a whole file: one binding per line.
pub fn codegen_file(bindings: &[ValueBinding], state: &mut CodegenState) {
    for binding in bindings {
        state.add_indent();
        binding.codegen(state);
        state.newline();
    }
}

impl Codegen for ValueBinding {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(Style::Definition, &self.name.name);
        if let Some(ty) = &self.declared_type {
            state.token(Style::Operator, ":");
            state.space();
            ty.codegen(state);
        }
        state.space();
        state.token(Style::Operator, "=");
        state.space();
        self.value.codegen(state);
        state.token(Style::Operator, ";");
    }
}

impl Codegen for TypeReference {
    fn codegen(&self, state: &mut CodegenState) {
        match &self.kind {
            TypeRefKind::Named { name, params } => {
                state.token(Style::Type, &name.name);
                if !params.is_empty() {
                    state.token(Style::Operator, "[");
                    for (i, param) in params.iter().enumerate() {
                        if i > 0 {
                            state.token(Style::Operator, ",");
                            state.space();
                        }
                        param.codegen(state);
                    }
                    state.token(Style::Operator, "]");
                }
            }
            TypeRefKind::Record { fields } => {
                state.token(Style::Type, "record");
                state.token(Style::Operator, "[");
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        state.token(Style::Operator, ",");
                        state.space();
                    }
                    state.token(Style::Definition, &name.name);
                    state.token(Style::Operator, ":");
                    ty.codegen(state);
                }
                state.token(Style::Operator, "]");
            }
        }
    }
}

impl Codegen for Parameter {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(Style::Definition, &self.name.name);
        state.token(Style::Operator, ":");
        state.space();
        self.param_type.codegen(state);
        if let Some(default) = &self.default {
            state.space();
            state.token(Style::Operator, "=");
            state.space();
            default.codegen(state);
        }
    }
}

impl Codegen for Argument {
    fn codegen(&self, state: &mut CodegenState) {
        if let Some(name) = &self.name {
            state.token(Style::Definition, &name.name);
            state.space();
            state.token(Style::Operator, "=");
            state.space();
        }
        self.value.codegen(state);
    }
}

impl Codegen for Arguments {
    fn codegen(&self, state: &mut CodegenState) {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                state.token(Style::Operator, ",");
                state.space();
            }
            arg.codegen(state);
        }
    }
}

/// Print an operand, parenthesizing when its binding is too loose for the
/// surrounding context.
fn codegen_operand(expr: &Expression, min_precedence: u8, state: &mut CodegenState) {
    if expr.precedence() < min_precedence {
        state.token(Style::Operator, "(");
        expr.codegen(state);
        state.token(Style::Operator, ")");
    } else {
        expr.codegen(state);
    }
}

impl Codegen for Expression {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Expression::BoolLiteral(e) => {
                state.token(Style::Literal, if e.value { "true" } else { "false" });
            }
            Expression::IntLiteral(e) => {
                state.token(Style::Literal, &e.value.to_string());
            }
            Expression::StringLiteral(e) => {
                state.token(Style::Literal, &format!("'{}'", e.value));
            }
            Expression::Filename(e) => {
                state.token(Style::Filename, &e.name);
            }
            Expression::FileList(e) => e.codegen(state),
            Expression::List(e) => e.codegen(state),
            Expression::Record(e) => {
                codegen_braced(&e.fields, None, state);
            }
            Expression::NameReference(e) => {
                state.token(Style::Reference, &e.name.name);
            }
            Expression::FieldAccess(e) => {
                codegen_operand(&e.base, 7, state);
                state.token(Style::Operator, ".");
                state.token(Style::Reference, &e.field.name);
            }
            Expression::FieldQuery(e) => {
                codegen_operand(&e.base, 7, state);
                state.token(Style::Operator, ".");
                state.token(Style::Reference, &e.field.name);
                state.space();
                state.token(Style::Operator, "?");
                state.space();
                codegen_operand(&e.default, 1, state);
            }
            Expression::Call(e) => {
                codegen_operand(&e.target, 7, state);
                state.token(Style::Operator, "(");
                e.arguments.codegen(state);
                state.token(Style::Operator, ")");
            }
            Expression::BinaryOp(e) => {
                let prec = e.op.precedence();
                let (lhs_min, rhs_min) = if e.op.is_right_associative() {
                    (prec + 1, prec)
                } else {
                    (prec, prec + 1)
                };
                codegen_operand(&e.lhs, lhs_min, state);
                state.space();
                state.token(Style::Operator, e.op.str());
                state.space();
                codegen_operand(&e.rhs, rhs_min, state);
            }
            Expression::UnaryOp(e) => {
                state.token(Style::Operator, e.op.str());
                if e.op == UnaryOperator::Not {
                    state.space();
                }
                codegen_operand(&e.operand, 6, state);
            }
            Expression::Conditional(e) => {
                state.token(Style::Operator, "if");
                state.space();
                e.condition.codegen(state);
                state.space();
                state.token(Style::Operator, "then");
                state.space();
                e.then_branch.codegen(state);
                state.space();
                state.token(Style::Operator, "else");
                state.space();
                e.else_branch.codegen(state);
            }
            Expression::Foreach(e) => {
                state.token(Style::Action, "foreach");
                state.space();
                state.token(Style::Definition, &e.loop_var.name);
                if let Some(ty) = &e.explicit_type {
                    state.token(Style::Operator, ":");
                    state.space();
                    ty.codegen(state);
                }
                state.space();
                state.token(Style::Operator, "<=");
                state.space();
                codegen_operand(&e.source_value, 1, state);
                state.space();
                state.token(Style::Operator, "in");
                state.space();
                e.body.codegen(state);
            }
            Expression::Function(e) => {
                state.token(Style::Action, "function");
                state.token(Style::Operator, "(");
                for (i, param) in e.params.iter().enumerate() {
                    if i > 0 {
                        state.token(Style::Operator, ",");
                        state.space();
                    }
                    param.codegen(state);
                }
                state.token(Style::Operator, "):");
                state.space();
                e.result_type.codegen(state);
                state.space();
                e.body.codegen(state);
            }
            Expression::Action(e) => {
                state.token(Style::Action, "action");
                state.token(Style::Operator, "(");
                e.arguments.codegen(state);
                if !e.params.is_empty() {
                    state.space();
                    state.token(Style::Operator, "<-");
                    state.space();
                    for (i, param) in e.params.iter().enumerate() {
                        if i > 0 {
                            state.token(Style::Operator, ",");
                            state.space();
                        }
                        param.codegen(state);
                    }
                }
                state.token(Style::Operator, ")");
            }
            Expression::TypeDeclaration(e) => {
                state.token(Style::Type, "type");
                state.space();
                e.declared.codegen(state);
            }
            Expression::Compound(e) => {
                codegen_braced(&e.bindings, Some(&e.result), state);
            }
        }
    }
}

impl Codegen for FileList {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(Style::Action, "files");
        state.token(Style::Operator, "(");
        for (i, file) in self.files.iter().enumerate() {
            if i > 0 {
                state.space();
            }
            state.token(Style::Filename, &file.name);
        }
        for arg in &self.arguments {
            state.token(Style::Operator, ",");
            state.space();
            arg.codegen(state);
        }
        state.token(Style::Operator, ")");
    }
}

impl Codegen for ListExpr {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(Style::Operator, "[");
        for element in &self.elements {
            state.space();
            // Elements are postfix-level in the grammar; anything looser
            // needs parentheses to survive the round trip.
            codegen_operand(element, 7, state);
        }
        state.space();
        state.token(Style::Operator, "]");
    }
}

/// Shared printer for record literals and compound expressions:
/// `{ bindings... }` or `{ bindings... result }`.
fn codegen_braced(
    bindings: &[ValueBinding],
    result: Option<&Expression>,
    state: &mut CodegenState,
) {
    state.token(Style::Operator, "{");
    state.newline();
    state.indent();
    for binding in bindings {
        state.add_indent();
        binding.codegen(state);
        state.newline();
    }
    if let Some(result) = result {
        state.add_indent();
        result.codegen(state);
        state.newline();
    }
    state.dedent();
    state.add_indent();
    state.token(Style::Operator, "}");
}
