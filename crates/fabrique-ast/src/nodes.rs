//! AST node definitions.
//!
//! Every node is a plain owned value constructed by the parser and never
//! mutated afterwards. Parents own their children directly; the only shared
//! pieces are function and action bodies, which sit behind an `Rc` so that
//! closures produced during evaluation can re-enter them without cloning the
//! subtree.
//!
//! Operations over the tree (pretty-printing, evaluation, traversal) are
//! dispatched at a single `match` site per operation rather than through
//! virtual calls; see `codegen` and `visitor` for two of them.

use std::rc::Rc;

use fabrique_core::{HasSource, SourceRange};

// ============================================================================
// Leaves
// ============================================================================

/// A name, with the range it was written at.
#[derive(Debug, Clone)]
pub struct Identifier {
    pub name: String,
    pub span: SourceRange,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: SourceRange) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// A name with no source position, for synthesized nodes.
    pub fn synthesized(name: impl Into<String>) -> Self {
        Self::new(name, SourceRange::none())
    }
}

/// A source-level reference to a type, resolved against the type context
/// during evaluation.
#[derive(Debug, Clone)]
pub struct TypeReference {
    pub kind: TypeRefKind,
    pub span: SourceRange,
}

#[derive(Debug, Clone)]
pub enum TypeRefKind {
    /// `int`, `file[in]`, `list[string]`, ...
    Named {
        name: Identifier,
        params: Vec<TypeReference>,
    },
    /// `record[a:int, b:string]`
    Record {
        fields: Vec<(Identifier, TypeReference)>,
    },
}

impl TypeReference {
    pub fn named(name: Identifier, params: Vec<TypeReference>) -> Self {
        let span = name.span.clone();
        Self {
            kind: TypeRefKind::Named { name, params },
            span,
        }
    }
}

/// A top-level or nested binding: `name: type = expression;`.
#[derive(Debug, Clone)]
pub struct ValueBinding {
    pub name: Identifier,
    pub declared_type: Option<TypeReference>,
    pub value: Expression,
    pub span: SourceRange,
}

/// A formal parameter: `name: type` with an optional default.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: Identifier,
    pub param_type: TypeReference,
    pub default: Option<Expression>,
    pub span: SourceRange,
}

/// An actual argument: positional, or `name = value`.
#[derive(Debug, Clone)]
pub struct Argument {
    pub name: Option<Identifier>,
    pub value: Expression,
    pub span: SourceRange,
}

impl Argument {
    pub fn is_positional(&self) -> bool {
        self.name.is_none()
    }
}

/// The argument list of a call or action.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    pub args: Vec<Argument>,
    pub span: SourceRange,
}

impl Arguments {
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone)]
pub enum Expression {
    BoolLiteral(BoolLiteral),
    IntLiteral(IntLiteral),
    StringLiteral(StringLiteral),
    Filename(Filename),
    FileList(FileList),
    List(ListExpr),
    Record(RecordExpr),
    NameReference(NameReference),
    FieldAccess(FieldAccess),
    FieldQuery(FieldQuery),
    Call(Call),
    BinaryOp(BinaryOp),
    UnaryOp(UnaryOp),
    Conditional(Conditional),
    Foreach(Foreach),
    Function(Rc<FunctionExpr>),
    Action(Rc<ActionExpr>),
    TypeDeclaration(TypeDeclaration),
    Compound(CompoundExpr),
}

#[derive(Debug, Clone)]
pub struct BoolLiteral {
    pub value: bool,
    pub span: SourceRange,
}

#[derive(Debug, Clone)]
pub struct IntLiteral {
    pub value: i64,
    pub span: SourceRange,
}

#[derive(Debug, Clone)]
pub struct StringLiteral {
    pub value: String,
    pub span: SourceRange,
}

/// A bare filename word inside `files(...)`.
#[derive(Debug, Clone)]
pub struct Filename {
    pub name: String,
    pub span: SourceRange,
}

/// `files(a.c b.c, kwargs...)`: a list of files sharing keyword arguments.
#[derive(Debug, Clone)]
pub struct FileList {
    pub files: Vec<Filename>,
    pub arguments: Vec<Argument>,
    pub span: SourceRange,
}

/// `[ a b c ]`
#[derive(Debug, Clone)]
pub struct ListExpr {
    pub elements: Vec<Expression>,
    pub span: SourceRange,
}

/// `{ a = 1; b = 'x'; }`
#[derive(Debug, Clone)]
pub struct RecordExpr {
    pub fields: Vec<ValueBinding>,
    pub span: SourceRange,
}

#[derive(Debug, Clone)]
pub struct NameReference {
    pub name: Identifier,
    pub span: SourceRange,
}

/// `base.field`
#[derive(Debug, Clone)]
pub struct FieldAccess {
    pub base: Box<Expression>,
    pub field: Identifier,
    pub span: SourceRange,
}

/// `base.field ? default`
#[derive(Debug, Clone)]
pub struct FieldQuery {
    pub base: Box<Expression>,
    pub field: Identifier,
    pub default: Box<Expression>,
    pub span: SourceRange,
}

/// `target(arguments...)`
#[derive(Debug, Clone)]
pub struct Call {
    pub target: Box<Expression>,
    pub arguments: Arguments,
    pub span: SourceRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    ScalarAdd,
    Prefix,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    And,
    Or,
    Xor,
}

impl BinaryOperator {
    pub fn str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::ScalarAdd => ".+",
            BinaryOperator::Prefix => "::",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
            BinaryOperator::Xor => "xor",
        }
    }

    /// Binding strength; larger binds tighter. The strata match the grammar:
    /// logical < comparison < cons < additive < multiplicative.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::And | BinaryOperator::Or | BinaryOperator::Xor => 1,
            BinaryOperator::Equal | BinaryOperator::NotEqual => 2,
            BinaryOperator::Prefix => 3,
            BinaryOperator::Add | BinaryOperator::Subtract | BinaryOperator::ScalarAdd => 4,
            BinaryOperator::Multiply | BinaryOperator::Divide => 5,
        }
    }

    /// `::` nests to the right; everything else to the left.
    pub fn is_right_associative(self) -> bool {
        self == BinaryOperator::Prefix
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
}

impl UnaryOperator {
    pub fn str(self) -> &'static str {
        match self {
            UnaryOperator::Negate => "-",
            UnaryOperator::Not => "not",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BinaryOp {
    pub lhs: Box<Expression>,
    pub op: BinaryOperator,
    pub rhs: Box<Expression>,
    pub span: SourceRange,
}

#[derive(Debug, Clone)]
pub struct UnaryOp {
    pub op: UnaryOperator,
    pub operand: Box<Expression>,
    pub span: SourceRange,
}

/// `if condition then a else b`; exactly one branch is ever evaluated.
#[derive(Debug, Clone)]
pub struct Conditional {
    pub condition: Box<Expression>,
    pub then_branch: Box<Expression>,
    pub else_branch: Box<Expression>,
    pub span: SourceRange,
}

/// `foreach x: T <= source in body`
#[derive(Debug, Clone)]
pub struct Foreach {
    pub loop_var: Identifier,
    pub explicit_type: Option<TypeReference>,
    pub source_value: Box<Expression>,
    pub body: Box<Expression>,
    pub span: SourceRange,
}

/// `function(params...): result body`
#[derive(Debug)]
pub struct FunctionExpr {
    pub params: Vec<Parameter>,
    pub result_type: TypeReference,
    pub body: Expression,
    pub span: SourceRange,
}

/// `action(args... <- params...)`
#[derive(Debug)]
pub struct ActionExpr {
    pub arguments: Arguments,
    pub params: Vec<Parameter>,
    pub span: SourceRange,
}

/// `type T`: reifies a type as a value.
#[derive(Debug, Clone)]
pub struct TypeDeclaration {
    pub declared: TypeReference,
    pub span: SourceRange,
}

/// `{ bindings... result }`
#[derive(Debug, Clone)]
pub struct CompoundExpr {
    pub bindings: Vec<ValueBinding>,
    pub result: Box<Expression>,
    pub span: SourceRange,
}

// ============================================================================
// Common operations
// ============================================================================

impl HasSource for Expression {
    fn source(&self) -> SourceRange {
        match self {
            Expression::BoolLiteral(e) => e.span.clone(),
            Expression::IntLiteral(e) => e.span.clone(),
            Expression::StringLiteral(e) => e.span.clone(),
            Expression::Filename(e) => e.span.clone(),
            Expression::FileList(e) => e.span.clone(),
            Expression::List(e) => e.span.clone(),
            Expression::Record(e) => e.span.clone(),
            Expression::NameReference(e) => e.span.clone(),
            Expression::FieldAccess(e) => e.span.clone(),
            Expression::FieldQuery(e) => e.span.clone(),
            Expression::Call(e) => e.span.clone(),
            Expression::BinaryOp(e) => e.span.clone(),
            Expression::UnaryOp(e) => e.span.clone(),
            Expression::Conditional(e) => e.span.clone(),
            Expression::Foreach(e) => e.span.clone(),
            Expression::Function(e) => e.span.clone(),
            Expression::Action(e) => e.span.clone(),
            Expression::TypeDeclaration(e) => e.span.clone(),
            Expression::Compound(e) => e.span.clone(),
        }
    }
}

impl HasSource for Identifier {
    fn source(&self) -> SourceRange {
        self.span.clone()
    }
}

impl HasSource for TypeReference {
    fn source(&self) -> SourceRange {
        self.span.clone()
    }
}

impl HasSource for ValueBinding {
    fn source(&self) -> SourceRange {
        self.span.clone()
    }
}

impl HasSource for Parameter {
    fn source(&self) -> SourceRange {
        self.span.clone()
    }
}

impl HasSource for Argument {
    fn source(&self) -> SourceRange {
        self.span.clone()
    }
}

impl Expression {
    /// Binding strength of this expression when printed as an operand.
    /// Postfix and primary forms bind tightest; the prefix forms
    /// (conditionals, foreach, functions) bind loosest and always get
    /// parenthesized inside an operator expression.
    pub fn precedence(&self) -> u8 {
        match self {
            Expression::Conditional(_)
            | Expression::Foreach(_)
            | Expression::Function(_)
            | Expression::Action(_)
            | Expression::TypeDeclaration(_) => 0,
            Expression::BinaryOp(e) => e.op.precedence(),
            Expression::UnaryOp(_) => 6,
            _ => 7,
        }
    }

    /// Is this expression's value known without consulting the filesystem?
    ///
    /// Backends use this to fold substitutable strings into build files.
    pub fn is_static(&self) -> bool {
        match self {
            Expression::BoolLiteral(_)
            | Expression::IntLiteral(_)
            | Expression::StringLiteral(_)
            | Expression::TypeDeclaration(_) => true,
            Expression::List(e) => e.elements.iter().all(Expression::is_static),
            Expression::Record(e) => e.fields.iter().all(|f| f.value.is_static()),
            Expression::BinaryOp(e) => e.lhs.is_static() && e.rhs.is_static(),
            Expression::UnaryOp(e) => e.operand.is_static(),
            Expression::Conditional(e) => {
                e.condition.is_static() && e.then_branch.is_static() && e.else_branch.is_static()
            }
            Expression::FieldAccess(e) => e.base.is_static(),
            Expression::FieldQuery(e) => e.base.is_static() && e.default.is_static(),
            Expression::Compound(e) => {
                e.bindings.iter().all(|b| b.value.is_static()) && e.result.is_static()
            }
            _ => false,
        }
    }
}
