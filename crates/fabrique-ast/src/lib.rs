//! Fabrique language front end.
//!
//! This crate turns Fabrique source text into an immutable AST and back:
//!
//! - **Parsing**: [`parse_file`] tokenizes and parses a whole file;
//!   [`parse_expression`] handles a single expression (argument definitions,
//!   tests).
//! - **Validation**: [`validate::validate_file`] collects the structural
//!   errors the grammar cannot express (reserved names, empty actions).
//! - **Code generation**: the [`Codegen`] trait prints any node as canonical
//!   Fabrique source; `parse(codegen(ast))` is a fixpoint.
//! - **Traversal**: the [`visitor::Visitor`] trait with `visit_*`/`leave_*`
//!   pairs and `walk_*` functions.
//!
//! # Quick start
//!
//! ```
//! use fabrique_ast::{parse_file, codegen_file, CodegenState};
//!
//! let parsed = parse_file("x = 1 + 2;", "build.fab").expect("parse error");
//! let mut state = CodegenState::new();
//! codegen_file(&parsed.bindings, &mut state);
//! assert_eq!(state.to_string(), "x = 1 + 2;\n");
//! ```

pub mod codegen;
pub mod nodes;
pub mod parser;
pub mod tokenizer;
pub mod validate;
pub mod visitor;

pub use codegen::{codegen_file, Codegen, CodegenState, Highlight, Style};
pub use nodes::*;
pub use parser::{ParserError, TokPos, TokVec};
pub use tokenizer::{tokenize, TokError, TokKind, Token};

use annotate_snippets::{Level, Renderer, Snippet};

/// A successfully parsed translation unit.
#[derive(Debug)]
pub struct ParsedFile {
    pub filename: String,
    pub bindings: Vec<ValueBinding>,
}

/// Tokenizes and parses a Fabrique file.
///
/// # Errors
///
/// Returns a [`ParserError`] if the source does not tokenize or does not
/// match the grammar. Structural checks (reserved names, empty actions) are
/// a separate step; see [`validate::validate_file`].
pub fn parse_file(source: &str, filename: &str) -> Result<ParsedFile, ParserError> {
    let tokens = tokenizer::tokenize(source, filename)?;
    let bindings = parser::parse_tokens(tokens, source, filename)?;
    Ok(ParsedFile {
        filename: filename.to_string(),
        bindings,
    })
}

/// Tokenizes and parses a single expression.
pub fn parse_expression(source: &str, filename: &str) -> Result<Expression, ParserError> {
    let tokens = tokenizer::tokenize(source, filename)?;
    parser::parse_expression_tokens(tokens, source, filename)
}

/// Renders a parse error as an annotated source snippet.
pub fn prettify_error(err: &ParserError, source: &str, filename: &str) -> String {
    let (offset, len) = err.offset_len();
    let start = offset.min(source.len());
    let end = (offset + len).min(source.len()).max(start);

    let title = err.to_string();
    let label = match err {
        ParserError::Tokenize(_) => String::new(),
        ParserError::Parse { expected, .. } => format!("expected {expected}"),
    };

    let snippet = Snippet::source(source)
        .origin(filename)
        .fold(true)
        .annotation(Level::Error.span(start..end).label(&label));
    let message = Level::Error.title(&title).snippet(snippet);

    let rendered = Renderer::plain().render(message).to_string();
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabrique_core::HasSource;

    mod parsing {
        use super::*;

        #[test]
        fn file_is_a_sequence_of_bindings() {
            let parsed = parse_file("x = 1; y = 'two';", "test.fab").expect("parse error");
            assert_eq!(parsed.bindings.len(), 2);
            assert_eq!(parsed.bindings[0].name.name, "x");
            assert_eq!(parsed.bindings[1].name.name, "y");
        }

        #[test]
        fn binding_spans_cover_the_whole_statement() {
            let parsed = parse_file("x = 1 + 2;", "test.fab").expect("parse error");
            let span = parsed.bindings[0].source();
            assert_eq!(span.begin.column, 1);
            assert_eq!(span.end.column, 11);
        }

        #[test]
        fn explicit_types_are_kept() {
            let parsed = parse_file("n: int = 4;", "test.fab").expect("parse error");
            assert!(parsed.bindings[0].declared_type.is_some());
        }

        #[test]
        fn precedence_multiplication_binds_tighter_than_addition() {
            let expr = parse_expression("1 + 2 * 3", "test.fab").expect("parse error");
            let Expression::BinaryOp(add) = &expr else {
                panic!("expected binary op, got {expr:?}");
            };
            assert_eq!(add.op, BinaryOperator::Add);
            let Expression::BinaryOp(mul) = add.rhs.as_ref() else {
                panic!("expected nested multiply");
            };
            assert_eq!(mul.op, BinaryOperator::Multiply);
        }

        #[test]
        fn cons_is_right_associative() {
            let expr = parse_expression("a :: b :: c", "test.fab").expect("parse error");
            let Expression::BinaryOp(outer) = &expr else {
                panic!("expected binary op");
            };
            assert_eq!(outer.op, BinaryOperator::Prefix);
            let Expression::BinaryOp(inner) = outer.rhs.as_ref() else {
                panic!("expected nested cons on the right");
            };
            assert_eq!(inner.op, BinaryOperator::Prefix);
        }

        #[test]
        fn logic_binds_loosest() {
            let expr = parse_expression("a == b and c != d", "test.fab").expect("parse error");
            let Expression::BinaryOp(and) = &expr else {
                panic!("expected binary op");
            };
            assert_eq!(and.op, BinaryOperator::And);
        }

        #[test]
        fn postfix_chains_fold_left() {
            let expr = parse_expression("r.sub.field", "test.fab").expect("parse error");
            let Expression::FieldAccess(outer) = &expr else {
                panic!("expected field access");
            };
            assert_eq!(outer.field.name, "field");
            assert!(matches!(outer.base.as_ref(), Expression::FieldAccess(_)));
        }

        #[test]
        fn field_query_takes_a_default() {
            let expr = parse_expression("r.flags ? 'none'", "test.fab").expect("parse error");
            assert!(matches!(expr, Expression::FieldQuery(_)));
        }

        #[test]
        fn call_arguments_positional_and_keyword() {
            let expr = parse_expression("f(1, x = 2, in = 3)", "test.fab").expect("parse error");
            let Expression::Call(call) = &expr else {
                panic!("expected call");
            };
            let args = &call.arguments.args;
            assert_eq!(args.len(), 3);
            assert!(args[0].is_positional());
            assert_eq!(args[1].name.as_ref().map(|n| n.name.as_str()), Some("x"));
            assert_eq!(args[2].name.as_ref().map(|n| n.name.as_str()), Some("in"));
        }

        #[test]
        fn braces_without_result_are_a_record() {
            let expr = parse_expression("{ a = 1; b = 'x'; }", "test.fab").expect("parse error");
            let Expression::Record(record) = &expr else {
                panic!("expected record, got {expr:?}");
            };
            assert_eq!(record.fields.len(), 2);
        }

        #[test]
        fn braces_with_result_are_a_compound_expression() {
            let expr = parse_expression("{ a = 1; a + 2 }", "test.fab").expect("parse error");
            let Expression::Compound(compound) = &expr else {
                panic!("expected compound, got {expr:?}");
            };
            assert_eq!(compound.bindings.len(), 1);
        }

        #[test]
        fn files_list_with_keyword_arguments() {
            let expr =
                parse_expression("files(a.c b.c, generated = true)", "test.fab").expect("parse");
            let Expression::FileList(files) = &expr else {
                panic!("expected file list");
            };
            assert_eq!(files.files.len(), 2);
            assert_eq!(files.files[0].name, "a.c");
            assert_eq!(files.arguments.len(), 1);
        }

        #[test]
        fn action_with_parameters() {
            let expr = parse_expression(
                "action('cc -c $in -o $out', description = 'compile' <- in: file[in], out: file[out])",
                "test.fab",
            )
            .expect("parse error");
            let Expression::Action(action) = &expr else {
                panic!("expected action");
            };
            assert_eq!(action.arguments.args.len(), 2);
            assert_eq!(action.params.len(), 2);
            assert_eq!(action.params[0].name.name, "in");
        }

        #[test]
        fn foreach_with_explicit_type() {
            let expr = parse_expression("foreach x: int <= numbers in x + 1", "test.fab")
                .expect("parse error");
            let Expression::Foreach(foreach) = &expr else {
                panic!("expected foreach");
            };
            assert_eq!(foreach.loop_var.name, "x");
            assert!(foreach.explicit_type.is_some());
        }

        #[test]
        fn function_literal() {
            let expr =
                parse_expression("function(x: int): int x + 1", "test.fab").expect("parse error");
            let Expression::Function(function) = &expr else {
                panic!("expected function");
            };
            assert_eq!(function.params.len(), 1);
            assert!(matches!(function.body, Expression::BinaryOp(_)));
        }

        #[test]
        fn record_type_reference() {
            let parsed =
                parse_file("r: record[a:int, b:string] = { a = 1; b = 'x'; };", "test.fab")
                    .expect("parse error");
            let ty = parsed.bindings[0].declared_type.as_ref().expect("type");
            assert!(matches!(ty.kind, TypeRefKind::Record { .. }));
        }

        #[test]
        fn type_declaration_expression() {
            let expr = parse_expression("type list[string]", "test.fab").expect("parse error");
            assert!(matches!(expr, Expression::TypeDeclaration(_)));
        }

        #[test]
        fn parenthesized_expressions_regroup() {
            let expr = parse_expression("(1 + 2) * 3", "test.fab").expect("parse error");
            let Expression::BinaryOp(mul) = &expr else {
                panic!("expected binary op");
            };
            assert_eq!(mul.op, BinaryOperator::Multiply);
            assert!(matches!(mul.lhs.as_ref(), Expression::BinaryOp(_)));
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn missing_semicolon_reports_expected_set() {
            let err = parse_file("x = 1", "test.fab").expect_err("should fail");
            let ParserError::Parse { expected, .. } = &err else {
                panic!("expected parse error, got {err:?}");
            };
            assert!(expected.contains(';'), "expected set: {expected}");
        }

        #[test]
        fn error_location_points_at_the_offending_token() {
            let err = parse_file("x = ;", "test.fab").expect_err("should fail");
            let span = err.span();
            assert_eq!(span.begin.line, 1);
            assert_eq!(span.begin.column, 5);
        }

        #[test]
        fn fab_error_carries_the_expected_set_as_detail() {
            let err = parse_file("x = ;", "test.fab").expect_err("should fail");
            let fab = err.to_fab_error();
            let report = fab.to_report();
            assert!(report.detail.expect("detail").starts_with("expected"));
        }

        #[test]
        fn prettified_errors_include_the_source_line() {
            let source = "x = 1 +;";
            let err = parse_file(source, "test.fab").expect_err("should fail");
            let pretty = prettify_error(&err, source, "test.fab");
            assert!(pretty.contains("x = 1 +;"), "snippet was: {pretty}");
            assert!(pretty.contains("test.fab"), "snippet was: {pretty}");
        }
    }

    mod statics {
        use super::*;

        #[test]
        fn literals_and_their_combinations_are_static() {
            for source in ["1 + 2", "'a'", "true and false", "if true then 1 else 2"] {
                let expr = parse_expression(source, "test.fab").expect("parse error");
                assert!(expr.is_static(), "{source} should be static");
            }
        }

        #[test]
        fn names_calls_and_files_are_dynamic() {
            for source in ["x", "f(1)", "files(a.c)"] {
                let expr = parse_expression(source, "test.fab").expect("parse error");
                assert!(!expr.is_static(), "{source} should be dynamic");
            }
        }
    }
}
