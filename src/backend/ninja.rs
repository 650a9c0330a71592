//! The Ninja backend.
//!
//! Emits `srcroot`/`buildroot` as ninja variables, one `rule` block per DAG
//! rule, and one `build` statement per build step. Fabrique command strings
//! already use `$in`/`$out`, which ninja expands natively; extra build
//! arguments become indented build-level variables.

use std::io::Write;

use fabrique_core::{FabError, Reporter};

use super::{io_error, renderable_variable, Backend};
use crate::dag::{Dag, File};

pub struct NinjaBackend;

/// `${root}/path` in a file's full name becomes `$root/path` for ninja.
fn ninja_path(file: &File) -> String {
    file.full_name().replace("${", "$").replace('}', "")
}

/// Ninja requires `$`, space, and `:` in paths to be escaped.
fn escape(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            ' ' => out.push_str("$ "),
            ':' => out.push_str("$:"),
            _ => out.push(c),
        }
    }
    out
}

impl Backend for NinjaBackend {
    fn name(&self) -> &'static str {
        "ninja"
    }

    fn default_filename(&self) -> &'static str {
        "build.ninja"
    }

    fn process(
        &self,
        dag: &Dag,
        out: &mut dyn Write,
        reporter: &mut Reporter,
    ) -> Result<(), FabError> {
        let mut emit = || -> std::io::Result<()> {
            writeln!(out, "# generated by fabrique")?;
            writeln!(out)?;

            for (name, value) in &dag.variables {
                if renderable_variable(value) {
                    writeln!(out, "{name} = {value}")?;
                }
            }
            writeln!(out)?;

            for (name, rule) in &dag.rules {
                writeln!(out, "rule {name}")?;
                writeln!(out, "  command = {}", rule.command())?;
                if let Some(description) = rule.description() {
                    writeln!(out, "  description = {description}")?;
                }
                for (arg, value) in rule.arguments() {
                    writeln!(out, "  {arg} = {value}")?;
                }
                writeln!(out)?;
            }

            for build in &dag.builds {
                let outputs = build
                    .outputs()
                    .iter()
                    .map(|f| escape(&ninja_path(f)))
                    .collect::<Vec<_>>()
                    .join(" ");
                let inputs = build
                    .inputs()
                    .iter()
                    .map(|f| escape(&ninja_path(f)))
                    .collect::<Vec<_>>()
                    .join(" ");
                let rule_name = build.rule().name().unwrap_or("phony");
                writeln!(out, "build {outputs}: {rule_name} {inputs}")?;
                for (arg, value) in build.arguments() {
                    writeln!(out, "  {arg} = {value}")?;
                }
            }

            // Default targets: every generated file named by a target.
            let mut defaults = Vec::new();
            for build in &dag.builds {
                for output in build.outputs() {
                    defaults.push(escape(&ninja_path(output)));
                }
            }
            if !defaults.is_empty() {
                writeln!(out)?;
                writeln!(out, "default {}", defaults.join(" "))?;
            }
            Ok(())
        };
        emit().map_err(io_error)?;

        for (name, value) in &dag.variables {
            if !renderable_variable(value) {
                reporter.note(
                    format!("variable '{name}' has no ninja rendering"),
                    value.source(),
                );
            }
        }
        Ok(())
    }
}
