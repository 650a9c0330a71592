//! Build rules: reusable command templates.
//!
//! A rule comes from evaluating `action(...)`. It knows its command string,
//! an optional description, extra arguments, and a parameter list whose
//! `file[in]`/`file[out]` tags later classify call arguments into build
//! inputs and outputs. Invoking a rule produces a `Build`.

use std::cell::OnceCell;

use fabrique_core::{SourceRange, Type};
use indexmap::IndexMap;

use super::ValuePtr;

/// A formal parameter of a rule, with its default already evaluated.
#[derive(Debug, Clone)]
pub struct RuleParam {
    pub name: String,
    pub ty: Type,
    pub default: Option<ValuePtr>,
}

impl RuleParam {
    /// Does this parameter name build inputs?
    pub fn is_input(&self) -> bool {
        self.ty.has_files() && !self.ty.has_output()
    }

    /// Does this parameter name build outputs?
    pub fn is_output(&self) -> bool {
        self.ty.has_output()
    }
}

#[derive(Debug)]
pub struct Rule {
    ty: Type,
    src: SourceRange,
    command: String,
    description: Option<String>,
    /// Extra arguments given to `action(...)` beyond the command.
    arguments: IndexMap<String, ValuePtr>,
    params: Vec<RuleParam>,
    /// Type of a single invocation's result (the `out` parameter's type).
    result_ty: Type,
    /// Assigned by the DAG builder from the binding that names this rule.
    name: OnceCell<String>,
}

impl Rule {
    pub fn new(
        command: String,
        description: Option<String>,
        arguments: IndexMap<String, ValuePtr>,
        params: Vec<RuleParam>,
        ty: Type,
        result_ty: Type,
        src: SourceRange,
    ) -> Self {
        Self {
            ty,
            src,
            command,
            description,
            arguments,
            params,
            result_ty,
            name: OnceCell::new(),
        }
    }

    pub fn typ(&self) -> &Type {
        &self.ty
    }

    pub fn source(&self) -> &SourceRange {
        &self.src
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn arguments(&self) -> &IndexMap<String, ValuePtr> {
        &self.arguments
    }

    pub fn params(&self) -> &[RuleParam] {
        &self.params
    }

    pub fn result_type(&self) -> &Type {
        &self.result_ty
    }

    /// The binding name, once the DAG builder has assigned one.
    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    /// Name this rule after its binding; first name wins.
    pub fn set_name(&self, name: &str) {
        let _ = self.name.set(name.to_string());
    }
}
