use super::{tokenize, TokError, TokKind};

fn kinds_and_texts(source: &str) -> Vec<(TokKind, &str)> {
    tokenize(source, "test.fab")
        .expect("tokenize error")
        .into_iter()
        .map(|t| (t.kind, t.text))
        .collect()
}

#[test]
fn identifiers_and_keywords() {
    assert_eq!(
        kinds_and_texts("srcs if obj_files foreach"),
        vec![
            (TokKind::Identifier, "srcs"),
            (TokKind::Keyword, "if"),
            (TokKind::Identifier, "obj_files"),
            (TokKind::Keyword, "foreach"),
        ]
    );
}

#[test]
fn integer_and_string_literals() {
    assert_eq!(
        kinds_and_texts("42 'hello' \"world\""),
        vec![
            (TokKind::Integer, "42"),
            (TokKind::Str, "'hello'"),
            (TokKind::Str, "\"world\""),
        ]
    );
}

#[test]
fn string_value_strips_quotes() {
    let tokens = tokenize("'cc -c $in'", "test.fab").expect("tokenize error");
    assert_eq!(tokens[0].string_value(), "cc -c $in");
}

#[test]
fn compound_operators() {
    assert_eq!(
        kinds_and_texts(":: .+ == != <= <- = : . +"),
        vec![
            (TokKind::Op, "::"),
            (TokKind::Op, ".+"),
            (TokKind::Op, "=="),
            (TokKind::Op, "!="),
            (TokKind::Op, "<="),
            (TokKind::Op, "<-"),
            (TokKind::Op, "="),
            (TokKind::Op, ":"),
            (TokKind::Op, "."),
            (TokKind::Op, "+"),
        ]
    );
}

#[test]
fn comments_are_skipped() {
    assert_eq!(
        kinds_and_texts("x = 1; # the answer\ny = 2;"),
        vec![
            (TokKind::Identifier, "x"),
            (TokKind::Op, "="),
            (TokKind::Integer, "1"),
            (TokKind::Op, ";"),
            (TokKind::Identifier, "y"),
            (TokKind::Op, "="),
            (TokKind::Integer, "2"),
            (TokKind::Op, ";"),
        ]
    );
}

#[test]
fn files_list_words_are_filenames() {
    assert_eq!(
        kinds_and_texts("files(lib.c sub/util.c)"),
        vec![
            (TokKind::Keyword, "files"),
            (TokKind::Op, "("),
            (TokKind::Filename, "lib.c"),
            (TokKind::Filename, "sub/util.c"),
            (TokKind::Op, ")"),
        ]
    );
}

#[test]
fn dotted_name_outside_files_is_a_field_access() {
    assert_eq!(
        kinds_and_texts("lib.c"),
        vec![
            (TokKind::Identifier, "lib"),
            (TokKind::Op, "."),
            (TokKind::Identifier, "c"),
        ]
    );
}

#[test]
fn files_keyword_arguments_tokenize_normally() {
    assert_eq!(
        kinds_and_texts("files(a.c, generated = true)"),
        vec![
            (TokKind::Keyword, "files"),
            (TokKind::Op, "("),
            (TokKind::Filename, "a.c"),
            (TokKind::Op, ","),
            (TokKind::Identifier, "generated"),
            (TokKind::Op, "="),
            (TokKind::Keyword, "true"),
            (TokKind::Op, ")"),
        ]
    );
}

#[test]
fn files_mode_ends_at_closing_paren() {
    assert_eq!(
        kinds_and_texts("files(a.c) + b.c"),
        vec![
            (TokKind::Keyword, "files"),
            (TokKind::Op, "("),
            (TokKind::Filename, "a.c"),
            (TokKind::Op, ")"),
            (TokKind::Op, "+"),
            (TokKind::Identifier, "b"),
            (TokKind::Op, "."),
            (TokKind::Identifier, "c"),
        ]
    );
}

#[test]
fn files_arguments_track_nested_parens() {
    assert_eq!(
        kinds_and_texts("files(a.c, subdir = dir('x')) 1"),
        vec![
            (TokKind::Keyword, "files"),
            (TokKind::Op, "("),
            (TokKind::Filename, "a.c"),
            (TokKind::Op, ","),
            (TokKind::Identifier, "subdir"),
            (TokKind::Op, "="),
            (TokKind::Identifier, "dir"),
            (TokKind::Op, "("),
            (TokKind::Str, "'x'"),
            (TokKind::Op, ")"),
            (TokKind::Op, ")"),
            (TokKind::Integer, "1"),
        ]
    );
}

#[test]
fn spans_use_one_based_lines_and_columns() {
    let tokens = tokenize("x =\n  42", "test.fab").expect("tokenize error");
    assert_eq!(tokens[0].span.begin.line, 1);
    assert_eq!(tokens[0].span.begin.column, 1);
    assert_eq!(tokens[2].span.begin.line, 2);
    assert_eq!(tokens[2].span.begin.column, 3);
    assert_eq!(tokens[2].offset, 6);
}

#[test]
fn unterminated_string_is_an_error() {
    let err = tokenize("x = 'oops", "test.fab").expect_err("should fail");
    assert!(matches!(err, TokError::UnterminatedString { .. }));
}

#[test]
fn unexpected_character_is_an_error() {
    let err = tokenize("x = 1 @ 2", "test.fab").expect_err("should fail");
    match err {
        TokError::UnexpectedChar { c, .. } => assert_eq!(c, '@'),
        other => panic!("unexpected error: {other:?}"),
    }
}
