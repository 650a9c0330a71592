//! Plugins: named value factories reachable via `import('plugin:<name>')`.
//!
//! A plugin contributes a record of values to the evaluating file. The
//! registry is plain data owned by the run — no process-global state, no
//! shared-library loading here; a host that wants dynamic loading registers
//! whatever it loaded before evaluation starts.

use std::collections::HashMap;

use fabrique_core::{FabError, SourceRange, TypeContext};
use indexmap::IndexMap;

use crate::dag::ValuePtr;

/// A named value factory.
pub trait Plugin {
    /// The name after `plugin:` in an import path.
    fn name(&self) -> &str;

    /// Produce the plugin's record of values.
    ///
    /// `args` are the keyword arguments of the `import(...)` call.
    fn create(
        &self,
        ctx: &TypeContext,
        args: IndexMap<String, ValuePtr>,
        src: &SourceRange,
    ) -> Result<ValuePtr, FabError>;
}

/// Maps plugin names to instances.
#[derive(Default)]
pub struct Registry {
    plugins: HashMap<String, Box<dyn Plugin>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin under its own name; the last registration wins.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.insert(plugin.name().to_string(), plugin);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Instantiate a plugin's record.
    pub fn create(
        &self,
        name: &str,
        ctx: &TypeContext,
        args: IndexMap<String, ValuePtr>,
        src: &SourceRange,
    ) -> Result<ValuePtr, FabError> {
        match self.plugins.get(name) {
            Some(plugin) => plugin.create(ctx, args, src),
            None => Err(FabError::os(
                format!("no plugin named '{name}'"),
                src.clone(),
            )),
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::Value;

    struct Version;

    impl Plugin for Version {
        fn name(&self) -> &str {
            "version"
        }

        fn create(
            &self,
            ctx: &TypeContext,
            _args: IndexMap<String, ValuePtr>,
            src: &SourceRange,
        ) -> Result<ValuePtr, FabError> {
            let mut fields = IndexMap::new();
            fields.insert("major".to_string(), Value::integer(1, ctx, src.clone()));
            fields.insert("minor".to_string(), Value::integer(2, ctx, src.clone()));
            Ok(Value::record(fields, ctx, src.clone()))
        }
    }

    #[test]
    fn registered_plugins_resolve_by_name() {
        let mut registry = Registry::new();
        registry.register(Box::new(Version));
        assert!(registry.contains("version"));

        let ctx = TypeContext::new();
        let record = registry
            .create("version", &ctx, IndexMap::new(), &SourceRange::none())
            .expect("create");
        let major = record.field("major", &ctx).expect("major");
        assert_eq!(major.as_int(), Some(1));
    }

    #[test]
    fn unknown_plugins_are_an_os_error() {
        let registry = Registry::new();
        let ctx = TypeContext::new();
        let err = registry
            .create("missing", &ctx, IndexMap::new(), &SourceRange::none())
            .expect_err("should fail");
        assert_eq!(err.exit_code(), 3);
    }
}
