//! Backend emission tests over a small compile scenario.

use std::path::PathBuf;

use fabrique::backend::{backend_by_name, Backend};
use fabrique::dag::Dag;
use fabrique::eval::Evaluator;
use fabrique::plugin::Registry;
use fabrique_ast::parse_file;
use fabrique_core::{Reporter, TypeContext};
use indexmap::IndexMap;

const COMPILE: &str = "\
cflags = '-O2';
srcs = files(a.c b.c);
cc = action('cc -c $in -o $out', description = 'compile' <- in: file[in], out: file[out]);
objs = foreach s <= srcs in cc(in = s, out = s + '.o');
";

fn compile_dag() -> Dag {
    let parsed = parse_file(COMPILE, "build.fab").expect("parse error");
    let ctx = TypeContext::new();
    let plugins = Registry::new();
    let mut reporter = Reporter::new();
    let mut evaluator = Evaluator::new(
        &ctx,
        &plugins,
        &mut reporter,
        PathBuf::from("/src"),
        PathBuf::from("/build"),
    );
    evaluator.run(&parsed, IndexMap::new()).expect("evaluate")
}

fn emit(backend: &dyn Backend, dag: &Dag) -> String {
    let mut buffer = Vec::new();
    let mut reporter = Reporter::new();
    backend
        .process(dag, &mut buffer, &mut reporter)
        .expect("backend error");
    String::from_utf8(buffer).expect("utf-8 output")
}

#[test]
fn ninja_emits_rules_and_build_statements() {
    let dag = compile_dag();
    let output = emit(backend_by_name("ninja").expect("ninja").as_ref(), &dag);

    assert!(output.contains("rule cc\n"), "output:\n{output}");
    assert!(output.contains("  command = cc -c $in -o $out\n"));
    assert!(output.contains("  description = compile\n"));
    assert!(output.contains("build $buildroot/a.c.o: cc $srcroot/a.c\n"));
    assert!(output.contains("build $buildroot/b.c.o: cc $srcroot/b.c\n"));
    assert!(output.contains("default $buildroot/a.c.o $buildroot/b.c.o\n"));
    assert!(output.contains("cflags = -O2\n"));
}

#[test]
fn make_substitutes_inputs_and_outputs() {
    let dag = compile_dag();
    let output = emit(backend_by_name("make").expect("make").as_ref(), &dag);

    assert!(output.contains("cflags := -O2\n"), "output:\n{output}");
    assert!(output.contains("all: $(buildroot)/a.c.o $(buildroot)/b.c.o\n"));
    assert!(output.contains("$(buildroot)/a.c.o: $(srcroot)/a.c\n"));
    assert!(output.contains("\tcc -c $(srcroot)/a.c -o $(buildroot)/a.c.o\n"));
}

#[test]
fn dot_draws_files_and_build_edges() {
    let dag = compile_dag();
    let output = emit(backend_by_name("dot").expect("dot").as_ref(), &dag);

    assert!(output.starts_with("digraph fabrique {"), "output:\n{output}");
    assert!(output.contains("\"a.c\" [ shape = box ];"));
    assert!(output.contains("\"a.c.o\" [ shape = box, style = dashed ];"));
    assert!(output.contains("\"a.c\" -> build_0;"));
    assert!(output.contains("build_0 -> \"a.c.o\";"));
    assert!(output.trim_end().ends_with('}'));
}

#[test]
fn null_emits_nothing() {
    let dag = compile_dag();
    let output = emit(backend_by_name("null").expect("null").as_ref(), &dag);
    assert!(output.is_empty());
}

#[test]
fn backend_output_is_deterministic() {
    let ninja = backend_by_name("ninja").expect("ninja");
    let first = emit(ninja.as_ref(), &compile_dag());
    let second = emit(ninja.as_ref(), &compile_dag());
    assert_eq!(first, second);
}
