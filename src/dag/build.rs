//! Build steps: concrete applications of a rule.

use std::rc::Rc;

use fabrique_core::{FabError, SourceRange, Type};
use indexmap::IndexMap;

use super::{File, Rule, ValuePtr};

#[derive(Debug)]
pub struct Build {
    ty: Type,
    src: SourceRange,
    rule: Rc<Rule>,
    inputs: Vec<Rc<File>>,
    outputs: Vec<Rc<File>>,
    /// Non-file arguments, for backends to emit as variables.
    arguments: IndexMap<String, ValuePtr>,
}

impl Build {
    /// Assemble a build step. Every referenced file is frozen here.
    ///
    /// Invariant: a build touches at least one file.
    pub fn new(
        rule: Rc<Rule>,
        inputs: Vec<Rc<File>>,
        outputs: Vec<Rc<File>>,
        arguments: IndexMap<String, ValuePtr>,
        ty: Type,
        src: SourceRange,
    ) -> Result<Self, FabError> {
        if inputs.is_empty() && outputs.is_empty() {
            return Err(FabError::semantic(
                "build step has no input or output files",
                src,
            ));
        }
        for output in &outputs {
            output.set_generated(true, &src)?;
        }
        for file in inputs.iter().chain(&outputs) {
            file.mark_referenced();
        }
        Ok(Self {
            ty,
            src,
            rule,
            inputs,
            outputs,
            arguments,
        })
    }

    pub fn typ(&self) -> &Type {
        &self.ty
    }

    pub fn source(&self) -> &SourceRange {
        &self.src
    }

    pub fn rule(&self) -> &Rc<Rule> {
        &self.rule
    }

    pub fn inputs(&self) -> &[Rc<File>] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Rc<File>] {
        &self.outputs
    }

    pub fn arguments(&self) -> &IndexMap<String, ValuePtr> {
        &self.arguments
    }
}
