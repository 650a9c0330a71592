//! The GraphViz backend: a picture of the build graph.
//!
//! Files are boxes, build steps are ellipses labelled with their rule, and
//! edges run input -> build -> output.

use std::io::Write;

use fabrique_core::{FabError, Reporter};

use super::{io_error, Backend};
use crate::dag::Dag;

pub struct DotBackend;

fn quote(label: &str) -> String {
    format!("\"{}\"", label.replace('"', "\\\""))
}

impl Backend for DotBackend {
    fn name(&self) -> &'static str {
        "dot"
    }

    fn default_filename(&self) -> &'static str {
        "build.dot"
    }

    fn process(
        &self,
        dag: &Dag,
        out: &mut dyn Write,
        _reporter: &mut Reporter,
    ) -> Result<(), FabError> {
        let mut emit = || -> std::io::Result<()> {
            writeln!(out, "digraph fabrique {{")?;
            writeln!(out, "    rankdir = LR;")?;

            for file in &dag.files {
                writeln!(
                    out,
                    "    {} [ shape = box{} ];",
                    quote(&file.filename()),
                    if file.generated() { ", style = dashed" } else { "" },
                )?;
            }

            for (index, build) in dag.builds.iter().enumerate() {
                let label = build.rule().name().unwrap_or("build");
                let node = format!("build_{index}");
                writeln!(out, "    {node} [ shape = ellipse, label = {} ];", quote(label))?;
                for input in build.inputs() {
                    writeln!(out, "    {} -> {node};", quote(&input.filename()))?;
                }
                for output in build.outputs() {
                    writeln!(out, "    {node} -> {};", quote(&output.filename()))?;
                }
            }

            writeln!(out, "}}")?;
            Ok(())
        };
        emit().map_err(io_error)
    }
}
