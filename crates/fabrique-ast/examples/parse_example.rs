//! Example demonstrating Fabrique parsing and pretty-printing.
//!
//! Run with: `cargo run --example parse_example`

use fabrique_ast::{codegen_file, parse_file, prettify_error, validate, CodegenState};

fn main() {
    println!("=== fabrique-ast Parsing Example ===\n");

    // 1. Parse a small build description and print it back.
    println!("1. Parse and Pretty-Print");
    println!("   ----------------------");
    let source = "\
srcs = files(a.c b.c);
cc = action('cc -c $in -o $out', description = 'compile' <- in: file[in], out: file[out]);
objs = foreach s <= srcs in cc(in = s, out = s + '.o');
";
    match parse_file(source, "build.fab") {
        Ok(parsed) => {
            let mut state = CodegenState::new();
            codegen_file(&parsed.bindings, &mut state);
            println!("   Parsed {} bindings.", parsed.bindings.len());
            println!("   Round-trip output matches: {}", state.to_string() == source);
        }
        Err(e) => println!("   Error:\n{}", prettify_error(&e, source, "build.fab")),
    }
    println!();

    // 2. Structural validation beyond the grammar.
    println!("2. Validation");
    println!("   ----------");
    let reserved = "srcroot = 'elsewhere';";
    let parsed = parse_file(reserved, "bad.fab").expect("grammatically fine");
    for err in validate::validate_file(&parsed.bindings) {
        println!("   {err}");
    }
    println!();

    // 3. Error handling with an annotated snippet.
    println!("3. Error Handling");
    println!("   --------------");
    let invalid = "objs = foreach s <= srcs in";
    match parse_file(invalid, "invalid.fab") {
        Ok(_) => println!("   Unexpected success!"),
        Err(e) => {
            println!("   Parse error caught (expected):");
            println!("{}", prettify_error(&e, invalid, "invalid.fab"));
        }
    }

    println!("\n=== Example Complete ===");
}
