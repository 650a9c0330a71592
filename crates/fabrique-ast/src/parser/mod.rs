//! The Fabrique grammar.
//!
//! A `peg` grammar over the token stream. Precedence is encoded by rule
//! stratification, loosest binding first:
//!
//! ```text
//! expression  = conditional | foreach | function | action | type-decl | logic
//! logic       = compare (('and'|'or'|'xor') compare)*
//! compare     = cons (('=='|'!=') cons)*
//! cons        = additive ('::' cons)?            right-associative
//! additive    = multiplicative (('+'|'.+'|'-') multiplicative)*
//! multiplicative = unary (('*'|'/') unary)*
//! unary       = ('not'|'-') unary | postfix
//! postfix     = primary (call | field access | field query)*
//! ```
//!
//! Every rule assembles exactly one AST node from its children's nodes, so
//! the tree grows bottom-up as the grammar reduces; spans come straight from
//! the underlying tokens.

use std::fmt;
use std::rc::Rc;

use fabrique_core::{HasSource, SourceLocation, SourceRange};
use peg::{Parse, ParseElem, RuleResult};

use crate::nodes::*;
use crate::tokenizer::{TokKind, Token};

mod errors;
pub use errors::ParserError;

type TokenRef<'r, 'a> = &'r Token<'a>;

// ============================================================================
// Token stream adapter
// ============================================================================

/// A parse position, carrying enough context to render a good diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokPos {
    pub span: SourceRange,
    pub offset: usize,
    pub len: usize,
    pub text: String,
}

impl fmt::Display for TokPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.span, self.text)
    }
}

/// The input type the grammar runs over.
pub struct TokVec<'a> {
    tokens: Vec<Token<'a>>,
    eof: TokPos,
}

impl<'a> TokVec<'a> {
    pub fn new(tokens: Vec<Token<'a>>, source: &str, filename: &str) -> Self {
        let eof = match tokens.last() {
            Some(tok) => TokPos {
                span: SourceRange::new(tok.span.end.clone(), tok.span.end.clone()),
                offset: source.len(),
                len: 0,
                text: "end of input".to_string(),
            },
            None => TokPos {
                span: SourceRange::new(
                    SourceLocation::new(filename, 1, 1),
                    SourceLocation::new(filename, 1, 1),
                ),
                offset: 0,
                len: 0,
                text: "end of input".to_string(),
            },
        };
        Self { tokens, eof }
    }
}

impl<'a> Parse for TokVec<'a> {
    type PositionRepr = TokPos;

    fn start(&self) -> usize {
        0
    }

    fn is_eof(&self, pos: usize) -> bool {
        pos >= self.tokens.len()
    }

    fn position_repr(&self, pos: usize) -> TokPos {
        match self.tokens.get(pos) {
            Some(tok) => TokPos {
                span: tok.span.clone(),
                offset: tok.offset,
                len: tok.text.len(),
                text: format!("'{}'", tok.text),
            },
            None => self.eof.clone(),
        }
    }
}

impl<'input, 'a: 'input> ParseElem<'input> for TokVec<'a> {
    type Element = TokenRef<'input, 'a>;

    fn parse_elem(&'input self, pos: usize) -> RuleResult<Self::Element> {
        match self.tokens.get(pos) {
            Some(tok) => RuleResult::Matched(pos + 1, tok),
            None => RuleResult::Failed,
        }
    }
}

// ============================================================================
// Node assembly helpers
// ============================================================================

fn span_toks(a: &Token<'_>, b: &Token<'_>) -> SourceRange {
    SourceRange::span(a.span.clone(), b.span.clone())
}

fn fold_binary(lhs: Expression, tail: Vec<(BinaryOperator, Expression)>) -> Expression {
    tail.into_iter().fold(lhs, |lhs, (op, rhs)| make_binary(lhs, op, rhs))
}

fn make_binary(lhs: Expression, op: BinaryOperator, rhs: Expression) -> Expression {
    let span = SourceRange::over(&lhs, &rhs);
    Expression::BinaryOp(BinaryOp {
        lhs: Box::new(lhs),
        op,
        rhs: Box::new(rhs),
        span,
    })
}

/// One step of postfix syntax, applied left to right onto a base expression.
enum PostfixTail {
    Call(Arguments, SourceRange),
    Access(Identifier),
    Query(Identifier, Expression),
}

fn apply_tail(base: Expression, tail: PostfixTail) -> Expression {
    match tail {
        PostfixTail::Call(arguments, close) => {
            let span = SourceRange::span(base.source(), close);
            Expression::Call(Call {
                target: Box::new(base),
                arguments,
                span,
            })
        }
        PostfixTail::Access(field) => {
            let span = SourceRange::span(base.source(), field.span.clone());
            Expression::FieldAccess(FieldAccess {
                base: Box::new(base),
                field,
                span,
            })
        }
        PostfixTail::Query(field, default) => {
            let span = SourceRange::span(base.source(), default.source());
            Expression::FieldQuery(FieldQuery {
                base: Box::new(base),
                field,
                default: Box::new(default),
                span,
            })
        }
    }
}

// ============================================================================
// Grammar
// ============================================================================

peg::parser! {
    pub grammar fabrique<'a>() for TokVec<'a> {

        // A source file: a sequence of `name = expression;` bindings.
        pub rule file() -> Vec<ValueBinding>
            = bindings:value_binding()* eof() { bindings }

        // A single expression followed by end of input.
        pub rule single_expression() -> Expression
            = e:expression() eof() { e }

        rule eof() = ![_]

        // --------------------------------------------------------------
        // Token helpers
        // --------------------------------------------------------------

        rule op(text: &'static str) -> TokenRef<'input, 'a>
            = [t] {? if t.kind == TokKind::Op && t.text == text { Ok(t) } else { Err(text) } }

        rule kw(text: &'static str) -> TokenRef<'input, 'a>
            = [t] {? if t.kind == TokKind::Keyword && t.text == text { Ok(t) } else { Err(text) } }

        rule comma() = op(",") { }

        rule identifier() -> Identifier
            = [t] {?
                if t.kind == TokKind::Identifier {
                    Ok(Identifier::new(t.text, t.span.clone()))
                } else {
                    Err("identifier")
                }
            }

        rule filename_word() -> Filename
            = [t] {?
                if t.kind == TokKind::Filename {
                    Ok(Filename { name: t.text.to_string(), span: t.span.clone() })
                } else {
                    Err("filename")
                }
            }

        rule integer() -> IntLiteral
            = [t] {?
                if t.kind == TokKind::Integer {
                    t.text
                        .parse::<i64>()
                        .map(|value| IntLiteral { value, span: t.span.clone() })
                        .map_err(|_| "integer")
                } else {
                    Err("integer")
                }
            }

        rule string_lit() -> StringLiteral
            = [t] {?
                if t.kind == TokKind::Str {
                    Ok(StringLiteral {
                        value: t.string_value().to_string(),
                        span: t.span.clone(),
                    })
                } else {
                    Err("string")
                }
            }

        // --------------------------------------------------------------
        // Bindings
        // --------------------------------------------------------------

        rule value_binding() -> ValueBinding
            = name:identifier() declared_type:decl_type()? op("=") value:expression() end:op(";")
            {
                let span = SourceRange::span(name.span.clone(), end.span.clone());
                ValueBinding { name, declared_type, value, span }
            }

        rule decl_type() -> TypeReference
            = op(":") t:type_ref() { t }

        // --------------------------------------------------------------
        // Expressions, loosest binding first
        // --------------------------------------------------------------

        rule expression() -> Expression
            = conditional()
            / foreach_expr()
            / function_expr()
            / action_expr()
            / type_declaration()
            / logic()

        rule conditional() -> Expression
            = start:kw("if") condition:expression()
              kw("then") then_branch:expression()
              kw("else") else_branch:expression()
            {
                let span = SourceRange::span(start.span.clone(), else_branch.source());
                Expression::Conditional(Conditional {
                    condition: Box::new(condition),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                    span,
                })
            }

        rule foreach_expr() -> Expression
            = start:kw("foreach") loop_var:identifier() explicit_type:decl_type()?
              op("<=") source_value:logic() kw("in") body:expression()
            {
                let span = SourceRange::span(start.span.clone(), body.source());
                Expression::Foreach(Foreach {
                    loop_var,
                    explicit_type,
                    source_value: Box::new(source_value),
                    body: Box::new(body),
                    span,
                })
            }

        rule function_expr() -> Expression
            = start:kw("function") op("(") params:(parameter() ** comma()) op(")")
              op(":") result_type:type_ref() body:expression()
            {
                let span = SourceRange::span(start.span.clone(), body.source());
                Expression::Function(Rc::new(FunctionExpr { params, result_type, body, span }))
            }

        rule action_expr() -> Expression
            = start:kw("action") op("(") arguments:arguments()
              params:action_params()? close:op(")")
            {
                Expression::Action(Rc::new(ActionExpr {
                    arguments,
                    params: params.unwrap_or_default(),
                    span: span_toks(start, close),
                }))
            }

        rule action_params() -> Vec<Parameter>
            = op("<-") params:(parameter() ++ comma()) { params }

        rule type_declaration() -> Expression
            = start:kw("type") declared:type_ref()
            {
                let span = SourceRange::span(start.span.clone(), declared.span.clone());
                Expression::TypeDeclaration(TypeDeclaration { declared, span })
            }

        rule logic() -> Expression
            = lhs:compare() tail:(operator:logic_op() rhs:compare() { (operator, rhs) })*
              { fold_binary(lhs, tail) }

        rule logic_op() -> BinaryOperator
            = kw("and") { BinaryOperator::And }
            / kw("or") { BinaryOperator::Or }
            / kw("xor") { BinaryOperator::Xor }

        rule compare() -> Expression
            = lhs:cons() tail:(operator:compare_op() rhs:cons() { (operator, rhs) })*
              { fold_binary(lhs, tail) }

        rule compare_op() -> BinaryOperator
            = op("==") { BinaryOperator::Equal }
            / op("!=") { BinaryOperator::NotEqual }

        rule cons() -> Expression
            = lhs:additive() rhs:(op("::") rhs:cons() { rhs })?
            {
                match rhs {
                    Some(rhs) => make_binary(lhs, BinaryOperator::Prefix, rhs),
                    None => lhs,
                }
            }

        rule additive() -> Expression
            = lhs:multiplicative() tail:(operator:add_op() rhs:multiplicative() { (operator, rhs) })*
              { fold_binary(lhs, tail) }

        rule add_op() -> BinaryOperator
            = op("+") { BinaryOperator::Add }
            / op(".+") { BinaryOperator::ScalarAdd }
            / op("-") { BinaryOperator::Subtract }

        rule multiplicative() -> Expression
            = lhs:unary() tail:(operator:mul_op() rhs:unary() { (operator, rhs) })*
              { fold_binary(lhs, tail) }

        rule mul_op() -> BinaryOperator
            = op("*") { BinaryOperator::Multiply }
            / op("/") { BinaryOperator::Divide }

        rule unary() -> Expression
            = start:kw("not") operand:unary()
            {
                let span = SourceRange::span(start.span.clone(), operand.source());
                Expression::UnaryOp(UnaryOp {
                    op: UnaryOperator::Not,
                    operand: Box::new(operand),
                    span,
                })
            }
            / start:op("-") operand:unary()
            {
                let span = SourceRange::span(start.span.clone(), operand.source());
                Expression::UnaryOp(UnaryOp {
                    op: UnaryOperator::Negate,
                    operand: Box::new(operand),
                    span,
                })
            }
            / postfix()

        rule postfix() -> Expression
            = base:primary() tails:postfix_tail()*
              { tails.into_iter().fold(base, apply_tail) }

        rule postfix_tail() -> PostfixTail
            = op("(") arguments:arguments() close:op(")")
              { PostfixTail::Call(arguments, close.span.clone()) }
            / op(".") field:identifier() default:(op("?") d:logic() { d })?
            {
                match default {
                    Some(d) => PostfixTail::Query(field, d),
                    None => PostfixTail::Access(field),
                }
            }

        // --------------------------------------------------------------
        // Arguments and parameters
        // --------------------------------------------------------------

        rule arguments() -> Arguments
            = args:(argument() ** comma())
            {
                let span = match (args.first(), args.last()) {
                    (Some(first), Some(last)) => SourceRange::over(first, last),
                    _ => SourceRange::none(),
                };
                Arguments { args, span }
            }

        rule argument() -> Argument
            = name:argument_name() op("=") value:expression()
            {
                let span = SourceRange::span(name.span.clone(), value.source());
                Argument { name: Some(name), value, span }
            }
            / value:expression()
            {
                let span = value.source();
                Argument { name: None, value, span }
            }

        rule argument_name() -> Identifier
            = identifier()
            / t:kw("in") { Identifier::new("in", t.span.clone()) }

        rule parameter() -> Parameter
            = name:parameter_name() op(":") param_type:type_ref()
              default:(op("=") d:expression() { d })?
            {
                let end = match &default {
                    Some(d) => d.source(),
                    None => param_type.span.clone(),
                };
                let span = SourceRange::span(name.span.clone(), end);
                Parameter { name, param_type, default, span }
            }

        rule parameter_name() -> Identifier
            = identifier()
            / t:kw("in") { Identifier::new("in", t.span.clone()) }

        // --------------------------------------------------------------
        // Type references
        // --------------------------------------------------------------

        rule type_ref() -> TypeReference
            = record_type()
            / named_type()

        rule record_type() -> TypeReference
            = start:kw("record") op("[") fields:(record_field() ** comma()) close:op("]")
            {
                TypeReference {
                    kind: TypeRefKind::Record { fields },
                    span: span_toks(start, close),
                }
            }

        rule record_field() -> (Identifier, TypeReference)
            = name:identifier() op(":") ty:type_ref() { (name, ty) }

        rule named_type() -> TypeReference
            = name:type_name() params:type_params()?
            {
                let mut span = name.span.clone();
                let params = params.unwrap_or_default();
                if let Some(last) = params.last() {
                    span = SourceRange::span(span, last.span.clone());
                }
                TypeReference { kind: TypeRefKind::Named { name, params }, span }
            }

        rule type_params() -> Vec<TypeReference>
            = op("[") params:(type_param() ++ comma()) op("]") { params }

        rule type_param() -> TypeReference
            = type_ref()
            / t:kw("in") { TypeReference::named(Identifier::new("in", t.span.clone()), vec![]) }

        rule type_name() -> Identifier
            = identifier()
            / t:kw("type") { Identifier::new("type", t.span.clone()) }

        // --------------------------------------------------------------
        // Primary forms
        // --------------------------------------------------------------

        rule primary() -> Expression
            = t:kw("true")
              { Expression::BoolLiteral(BoolLiteral { value: true, span: t.span.clone() }) }
            / t:kw("false")
              { Expression::BoolLiteral(BoolLiteral { value: false, span: t.span.clone() }) }
            / i:integer() { Expression::IntLiteral(i) }
            / s:string_lit() { Expression::StringLiteral(s) }
            / file_list()
            / list_literal()
            / braced()
            / name:identifier()
              { Expression::NameReference(NameReference { span: name.span.clone(), name }) }
            / op("(") e:expression() op(")") { e }

        rule file_list() -> Expression
            = start:kw("files") op("(") files:filename_word()*
              arguments:(comma() a:argument() { a })* close:op(")")
            {
                Expression::FileList(FileList {
                    files,
                    arguments,
                    span: span_toks(start, close),
                })
            }

        rule list_literal() -> Expression
            = start:op("[") elements:postfix()* close:op("]")
            {
                Expression::List(ListExpr { elements, span: span_toks(start, close) })
            }

        // `{ bindings... }` is a record; `{ bindings... result }` is a
        // compound expression.
        rule braced() -> Expression
            = start:op("{") bindings:value_binding()* result:expression()? close:op("}")
            {
                let span = span_toks(start, close);
                match result {
                    Some(result) => Expression::Compound(CompoundExpr {
                        bindings,
                        result: Box::new(result),
                        span,
                    }),
                    None => Expression::Record(RecordExpr { fields: bindings, span }),
                }
            }
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Parses a token stream into the file's top-level bindings.
pub fn parse_tokens<'a>(
    tokens: Vec<Token<'a>>,
    source: &str,
    filename: &str,
) -> Result<Vec<ValueBinding>, ParserError> {
    let tokvec = TokVec::new(tokens, source, filename);
    fabrique::file(&tokvec).map_err(ParserError::from_parse)
}

/// Parses a token stream as a single expression.
pub fn parse_expression_tokens<'a>(
    tokens: Vec<Token<'a>>,
    source: &str,
    filename: &str,
) -> Result<Expression, ParserError> {
    let tokvec = TokVec::new(tokens, source, filename);
    fabrique::single_expression(&tokvec).map_err(ParserError::from_parse)
}
