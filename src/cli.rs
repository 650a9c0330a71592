//! The driver: read, parse, evaluate, emit.
//!
//! [`run`] is the whole pipeline behind the `fab` binary. Backend output is
//! buffered and committed to disk only after the backend succeeds, so a
//! failed run never leaves a partial build file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use fabrique_ast::{codegen_file, parse_file, prettify_error, validate, CodegenState};
use fabrique_core::{FabError, Reporter, SourceRange, TypeContext};
use indexmap::IndexMap;

use crate::backend::backend_by_name;
use crate::dag::{Value, ValuePtr};
use crate::eval::Evaluator;
use crate::highlight::AnsiHighlight;
use crate::plugin::Registry;

/// Everything the front end collects before a run.
#[derive(Debug)]
pub struct RunOptions {
    /// The root Fabrique file.
    pub fabfile: PathBuf,
    /// `name=value` argument definitions.
    pub defines: Vec<(String, String)>,
    /// Where build files are written.
    pub output_dir: PathBuf,
    /// Backend names to run.
    pub formats: Vec<String>,
    /// Stop after parsing; pretty-print the AST to stdout.
    pub parse_only: bool,
    /// Dump the DAG as JSON to stdout.
    pub print_dag: bool,
    /// Write backend output to stdout instead of files.
    pub to_stdout: bool,
    /// Colorize pretty-printed output.
    pub color: bool,
}

/// A `-D name=value` literal: bool, integer, or string.
fn define_value(raw: &str, ctx: &TypeContext) -> ValuePtr {
    let src = SourceRange::none();
    match raw {
        "true" => Value::boolean(true, ctx, src),
        "false" => Value::boolean(false, ctx, src),
        _ => match raw.parse::<i64>() {
            Ok(n) => Value::integer(n, ctx, src),
            Err(_) => Value::string(raw, ctx, src),
        },
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Run the pipeline. Diagnostics accumulate in `reporter`; the first fatal
/// error is returned.
pub fn run(options: &RunOptions, reporter: &mut Reporter) -> Result<(), FabError> {
    let filename = options.fabfile.display().to_string();
    let source = fs::read_to_string(&options.fabfile).map_err(|err| {
        FabError::os(
            format!("cannot read '{filename}': {err}"),
            SourceRange::none(),
        )
    })?;

    tracing::debug!(file = %filename, "parsing");
    let parsed = match parse_file(&source, &filename) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("{}", prettify_error(&err, &source, &filename));
            return Err(err.to_fab_error());
        }
    };
    validate::validate_into(&parsed.bindings, reporter)?;

    if options.parse_only {
        let highlight = AnsiHighlight;
        let mut state = if options.color {
            CodegenState::with_highlight(&highlight)
        } else {
            CodegenState::new()
        };
        codegen_file(&parsed.bindings, &mut state);
        print!("{state}");
        return Ok(());
    }

    let ctx = TypeContext::new();
    let plugins = Registry::new();
    let srcroot = absolute(
        options
            .fabfile
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new(".")),
    );
    let buildroot = absolute(&options.output_dir);

    let args: IndexMap<String, ValuePtr> = options
        .defines
        .iter()
        .map(|(name, value)| (name.clone(), define_value(value, &ctx)))
        .collect();

    tracing::debug!("evaluating");
    let dag = {
        let mut evaluator =
            Evaluator::new(&ctx, &plugins, reporter, srcroot, buildroot);
        evaluator.run(&parsed, args)?
    };

    if options.print_dag {
        let dump = serde_json::to_string_pretty(&dag.to_json())
            .expect("DAG dump is valid JSON");
        println!("{dump}");
    }

    for format in &options.formats {
        let backend = backend_by_name(format).ok_or_else(|| {
            FabError::semantic(
                format!("unknown backend '{format}'"),
                SourceRange::none(),
            )
        })?;

        tracing::debug!(backend = format, "emitting");
        let mut buffer: Vec<u8> = Vec::new();
        backend.process(&dag, &mut buffer, reporter)?;

        if options.to_stdout {
            std::io::stdout().write_all(&buffer).map_err(|err| {
                FabError::os(format!("write failed: {err}"), SourceRange::none())
            })?;
        } else if !buffer.is_empty() {
            fs::create_dir_all(&options.output_dir).map_err(|err| {
                FabError::os(
                    format!(
                        "cannot create '{}': {err}",
                        options.output_dir.display()
                    ),
                    SourceRange::none(),
                )
            })?;
            let path = options.output_dir.join(backend.default_filename());
            fs::write(&path, &buffer).map_err(|err| {
                FabError::os(
                    format!("cannot write '{}': {err}", path.display()),
                    SourceRange::none(),
                )
            })?;
        }
    }
    Ok(())
}
