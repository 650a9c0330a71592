//! The POSIX make backend.
//!
//! Emits `srcroot`/`buildroot` as macros, an `all` target covering every
//! build output, and one recipe per build step. Make has no `$in`/`$out`
//! convention, so the command template is substituted textually: `$in` and
//! `$out` expand to the space-joined file lists, `${name}` to rule or build
//! arguments.

use std::io::Write;

use fabrique_core::{FabError, Reporter};
use indexmap::IndexMap;

use super::{io_error, renderable_variable, Backend};
use crate::dag::{Dag, File};

pub struct MakeBackend;

/// `${root}/path` in a file's full name becomes `$(root)/path` for make.
fn make_path(file: &File) -> String {
    file.full_name().replace("${", "$(").replace('}', ")")
}

/// Expand `$name` and `${name}` against the given variables.
fn substitute(template: &str, vars: &IndexMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let rest = &template[i + 1..];
        let (name, consumed) = if let Some(inner) = rest.strip_prefix('{') {
            match inner.find('}') {
                Some(end) => (&inner[..end], end + 2),
                None => (rest, rest.len()),
            }
        } else {
            let end = rest
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                .unwrap_or(rest.len());
            (&rest[..end], end)
        };
        match vars.get(name) {
            Some(value) => out.push_str(value),
            None => {
                out.push('$');
                continue;
            }
        }
        for _ in 0..consumed {
            chars.next();
        }
    }
    out
}

impl Backend for MakeBackend {
    fn name(&self) -> &'static str {
        "make"
    }

    fn default_filename(&self) -> &'static str {
        "Makefile"
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
                    writeln!(out, "{name} := {value}")?;
                }
            }
            writeln!(out)?;

            let all: Vec<String> = dag
                .builds
                .iter()
                .flat_map(|b| b.outputs().iter().map(|f| make_path(f)))
                .collect();
            writeln!(out, ".POSIX:")?;
            writeln!(out, "all: {}", all.join(" "))?;
            writeln!(out)?;

            for build in &dag.builds {
                let outputs = build
                    .outputs()
                    .iter()
                    .map(|f| make_path(f))
                    .collect::<Vec<_>>()
                    .join(" ");
                let inputs = build
                    .inputs()
                    .iter()
                    .map(|f| make_path(f))
                    .collect::<Vec<_>>()
                    .join(" ");

                let mut vars: IndexMap<String, String> = IndexMap::new();
                for (name, value) in build.rule().arguments() {
                    vars.insert(name.clone(), value.to_string());
                }
                for (name, value) in build.arguments() {
                    vars.insert(name.clone(), value.to_string());
                }
                vars.insert("in".to_string(), inputs.clone());
                vars.insert("out".to_string(), outputs.clone());

                let command = substitute(build.rule().command(), &vars);
                writeln!(out, "{outputs}: {inputs}")?;
                writeln!(out, "\t{command}")?;
                writeln!(out)?;
            }
            Ok(())
        };
        emit().map_err(io_error)?;

        for (name, value) in &dag.variables {
            if !renderable_variable(value) {
                reporter.note(
                    format!("variable '{name}' has no make rendering"),
                    value.source(),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitute_expands_both_spellings() {
        let vars = vars(&[("in", "a.c"), ("out", "a.o")]);
        assert_eq!(substitute("cc -c $in -o $out", &vars), "cc -c a.c -o a.o");
        assert_eq!(substitute("cc -c ${in} -o ${out}", &vars), "cc -c a.c -o a.o");
    }

    #[test]
    fn substitute_leaves_unknown_names_alone() {
        let vars = vars(&[("in", "a.c")]);
        assert_eq!(substitute("$in $(CC) $unknown", &vars), "a.c $(CC) $unknown");
    }
}
