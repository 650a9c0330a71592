//! Round-trip tests for the Fabrique parser and pretty-printer.
//!
//! The printer emits canonical formatting, so the invariant is a fixpoint:
//! printing a parse, reparsing it, and printing again must reproduce the
//! first printout byte for byte. Inputs already in canonical form must
//! survive unchanged.

use difference::assert_diff;
use fabrique_ast::{codegen_file, parse_file, prettify_error, CodegenState};
use itertools::Itertools;

/// Helper to visualize whitespace differences in test output.
fn visualize(s: &str) -> String {
    s.replace(' ', "▩").lines().join("↩\n")
}

fn print_source(source: &str, label: &str) -> String {
    let parsed = match parse_file(source, label) {
        Ok(parsed) => parsed,
        Err(err) => panic!("{}", prettify_error(&err, source, label)),
    };
    let mut state = CodegenState::new();
    codegen_file(&parsed.bindings, &mut state);
    state.to_string()
}

/// Printing is a fixpoint of parse∘print.
fn assert_roundtrip(source: &str) {
    let first = print_source(source, "input");
    let second = print_source(&first, "printed");
    if first != second {
        let got = visualize(&second);
        let expected = visualize(&first);
        assert_diff!(expected.as_ref(), got.as_ref(), "", 0);
    }
}

/// Canonical input survives a round trip unchanged.
fn assert_canonical(source: &str) {
    let printed = print_source(source, "canonical");
    if printed != source {
        let got = visualize(&printed);
        let expected = visualize(source);
        assert_diff!(expected.as_ref(), got.as_ref(), "", 0);
    }
}

#[test]
fn roundtrip_literals() {
    assert_roundtrip("x = 1;\ny = 'hello';\nz = true;\nw = false;\n");
}

#[test]
fn roundtrip_operators() {
    assert_roundtrip("a = 1 + 2 * 3;\nb = 'x' + 'y';\nc = x :: y :: z;\nd = xs .+ '.o';\n");
}

#[test]
fn roundtrip_logic_and_comparison() {
    assert_roundtrip("a = x == y and y != z;\nb = not p or q xor r;\n");
}

#[test]
fn roundtrip_parenthesized_grouping() {
    assert_roundtrip("a = (1 + 2) * 3;\nb = (x or y) and z;\nc = -(1 + 2);\n");
}

#[test]
fn roundtrip_conditionals_and_foreach() {
    assert_roundtrip(
        "m = if ready then 1 else 2;\nout = foreach s <= srcs in compile(in = s);\n",
    );
}

#[test]
fn roundtrip_functions_and_calls() {
    assert_roundtrip(
        "f = function(x: int, y: int = 2): int x + y;\nv = f(40, y = 2);\n",
    );
}

#[test]
fn roundtrip_actions() {
    assert_roundtrip(
        "cc = action('cc -c $in -o $out', description = 'compile' <- in: file[in], out: file[out]);\n",
    );
}

#[test]
fn roundtrip_files_and_lists() {
    assert_roundtrip("srcs = files(a.c sub/b.c, generated = false);\nns = [ 1 2 3 ];\n");
}

#[test]
fn roundtrip_records_and_field_access() {
    assert_roundtrip("r = { a = 1; b = 'x'; };\ny = r.b;\nz = r.missing ? 'default';\n");
}

#[test]
fn roundtrip_compound_expressions() {
    assert_roundtrip("v = { tmp = 6; tmp * 7 };\n");
}

#[test]
fn roundtrip_type_annotations() {
    assert_roundtrip(
        "n: int = 1;\nxs: list[file[in]] = files(a.c);\nr: record[a:int] = { a = 1; };\nt = type list[string];\n",
    );
}

#[test]
fn roundtrip_foreach_with_explicit_type() {
    assert_roundtrip("ys = foreach x: int <= xs in x * 2;\n");
}

#[test]
fn canonical_form_is_stable() {
    assert_canonical("x = 1 + 2;\n");
    assert_canonical("srcs = files(a.c b.c);\n");
    assert_canonical("m = if ready then 1 else 2;\n");
}

#[test]
fn canonical_form_of_records_is_stable() {
    assert_canonical("r = {\n    a = 1;\n    b = 'x';\n};\n");
}

#[test]
fn whitespace_and_comments_normalize() {
    let noisy = "x   =  1+2 ;   # trailing comment\n\n\ny='a';\n";
    let clean = print_source(noisy, "noisy");
    assert_eq!(clean, "x = 1 + 2;\ny = 'a';\n");
}
