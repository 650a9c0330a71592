//! Built-in functions and the root scope.
//!
//! The root scope a file evaluates in carries:
//!
//! - the builtin functions `file`, `import`, `fields`, `print`, `typeof`
//! - `srcroot` and `buildroot` as absolute path strings
//! - `args`, the record of user-supplied argument definitions
//!
//! `import(path)` parses and evaluates another Fabrique file relative to the
//! importing one and yields its bindings as a record; `import('plugin:x')`
//! consults the plugin registry instead. Imports are cached per path, and
//! import cycles are detected rather than looping.

use std::path::PathBuf;
use std::rc::Rc;

use fabrique_ast as ast;
use fabrique_core::{FabError, SourceRange};
use indexmap::IndexMap;

use super::evaluator::{CallArgs, Evaluator};
use super::Scope;
use crate::dag::{self, BuiltinKind, File, Value, ValuePtr};

impl Evaluator<'_> {
    /// The scope a translation unit evaluates in.
    pub fn root_scope(&mut self, args: IndexMap<String, ValuePtr>) -> Scope {
        self.root_args = args.clone();
        let scope = Scope::root();
        let nowhere = SourceRange::none();

        for kind in [
            BuiltinKind::File,
            BuiltinKind::Import,
            BuiltinKind::Fields,
            BuiltinKind::Print,
            BuiltinKind::TypeOf,
        ] {
            scope
                .define(kind.name(), Value::builtin(kind, self.ctx), &nowhere)
                .expect("fresh root scope");
        }

        scope
            .define(
                "srcroot",
                Value::string(self.srcroot.display().to_string(), self.ctx, nowhere.clone()),
                &nowhere,
            )
            .expect("fresh root scope");
        scope
            .define(
                "buildroot",
                Value::string(
                    self.buildroot.display().to_string(),
                    self.ctx,
                    nowhere.clone(),
                ),
                &nowhere,
            )
            .expect("fresh root scope");
        scope
            .define(
                "args",
                Value::record(args, self.ctx, nowhere.clone()),
                &nowhere,
            )
            .expect("fresh root scope");
        scope
    }

    pub(super) fn call_builtin(
        &mut self,
        kind: BuiltinKind,
        args: CallArgs,
        src: &SourceRange,
        _scope: &Scope,
    ) -> Result<ValuePtr, FabError> {
        match kind {
            BuiltinKind::File => self.builtin_file(args, src),
            BuiltinKind::Import => self.builtin_import(args, src),
            BuiltinKind::Fields => self.builtin_fields(args, src),
            BuiltinKind::Print => self.builtin_print(args, src),
            BuiltinKind::TypeOf => self.builtin_typeof(args, src),
        }
    }

    fn one_positional(
        &self,
        name: &str,
        args: &CallArgs,
        src: &SourceRange,
    ) -> Result<ValuePtr, FabError> {
        match args.positional.as_slice() {
            [(value, _)] => Ok(value.clone()),
            _ => Err(FabError::semantic(
                format!("{name} takes a single positional argument"),
                src.clone(),
            )),
        }
    }

    fn string_argument(&self, value: &ValuePtr, src: &SourceRange) -> Result<String, FabError> {
        value.as_str().map(str::to_string).ok_or_else(|| {
            FabError::wrong_type(value.typ().str(), self.ctx.string_type().str(), src.clone())
        })
    }

    /// `file(path, subdir=..., generated=...)`
    fn builtin_file(&mut self, args: CallArgs, src: &SourceRange) -> Result<ValuePtr, FabError> {
        let path = self.one_positional("file", &args, src)?;
        let path = self.string_argument(&path, src)?;

        let mut subdir = self.current_subdir.clone();
        let mut generated = false;
        for (name, (value, value_src)) in &args.keyword {
            match name.as_str() {
                "subdir" => {
                    let extra = self.string_argument(value, value_src)?;
                    subdir = dag::join_path(&subdir, &extra);
                }
                "generated" => match value.as_bool() {
                    Some(flag) => generated = flag,
                    None => {
                        return Err(FabError::wrong_type(
                            value.typ().str(),
                            self.ctx.boolean_type().str(),
                            value_src.clone(),
                        ));
                    }
                },
                other => {
                    return Err(FabError::semantic(
                        format!("unknown file attribute '{other}'"),
                        value_src.clone(),
                    ));
                }
            }
        }

        let file = File::new(&path, &subdir, self.ctx.file_type(), src.clone());
        file.set_generated(generated, src)?;
        Ok(Value::file(file))
    }

    /// `fields(record)`: the record's field names, as a list of strings.
    fn builtin_fields(&mut self, args: CallArgs, src: &SourceRange) -> Result<ValuePtr, FabError> {
        let value = self.one_positional("fields", &args, src)?;
        let Some(record) = value.as_record() else {
            return Err(FabError::semantic(
                format!("fields() requires a record, not {}", value.typ()),
                src.clone(),
            ));
        };
        let names = record
            .fields()
            .keys()
            .map(|name| Value::string(name.clone(), self.ctx, src.clone()))
            .collect();
        let list = dag::List::with_element_type(
            names,
            &self.ctx.string_type(),
            self.ctx,
            src.clone(),
        );
        Ok(Rc::new(Value::List(list)))
    }

    /// `print(values...)`: pretty-print during evaluation; yields nil.
    fn builtin_print(&mut self, args: CallArgs, src: &SourceRange) -> Result<ValuePtr, FabError> {
        let rendered = args
            .positional
            .iter()
            .map(|(value, _)| value.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!("{rendered}");
        Ok(Value::nil(self.ctx, src.clone()))
    }

    /// `typeof(value)`: the reified type of a value.
    fn builtin_typeof(&mut self, args: CallArgs, src: &SourceRange) -> Result<ValuePtr, FabError> {
        let value = self.one_positional("typeof", &args, src)?;
        Ok(Value::type_value(value.typ().clone(), self.ctx, src.clone()))
    }

    /// `import(path)` / `import('plugin:name', args...)`
    fn builtin_import(&mut self, args: CallArgs, src: &SourceRange) -> Result<ValuePtr, FabError> {
        let (path, _) = args
            .positional
            .first()
            .cloned()
            .ok_or_else(|| FabError::semantic("import requires a path", src.clone()))?;
        if args.positional.len() > 1 {
            return Err(FabError::semantic(
                "import takes a single positional argument",
                src.clone(),
            ));
        }
        let path = self.string_argument(&path, src)?;

        if let Some(plugin_name) = path.strip_prefix("plugin:") {
            let plugin_args: IndexMap<String, ValuePtr> = args
                .keyword
                .iter()
                .map(|(name, (value, _))| (name.clone(), value.clone()))
                .collect();
            return self
                .plugins
                .create(plugin_name, self.ctx, plugin_args, src);
        }

        if !args.keyword.is_empty() {
            return Err(FabError::semantic(
                "import of a file takes no keyword arguments",
                src.clone(),
            ));
        }
        self.import_file(&path, src)
    }

    fn import_file(&mut self, path: &str, src: &SourceRange) -> Result<ValuePtr, FabError> {
        let relative = dag::join_path(&self.current_subdir, path);
        let full: PathBuf = self.srcroot.join(&relative);

        if let Some(cached) = self.import_cache.get(&full) {
            return Ok(cached.clone());
        }
        if self.import_stack.contains(&full) {
            return Err(FabError::semantic(
                format!("circular import of '{relative}'"),
                src.clone(),
            ));
        }

        tracing::debug!(path = %full.display(), "importing");
        let source = std::fs::read_to_string(&full).map_err(|err| {
            FabError::os(
                format!("cannot read '{}': {err}", full.display()),
                src.clone(),
            )
        })?;

        let parsed =
            ast::parse_file(&source, &relative).map_err(|err| err.to_fab_error())?;
        // Validation and evaluation record their own diagnostics; the error
        // surfaced here is a summary pointing at the import site.
        let failed =
            || FabError::semantic(format!("import of '{relative}' failed"), src.clone());
        ast::validate::validate_into(&parsed.bindings, self.reporter).map_err(|_| failed())?;

        // Evaluate the imported file in its own root scope, with paths
        // resolved relative to its directory.
        let saved_subdir = std::mem::replace(
            &mut self.current_subdir,
            match relative.rfind('/') {
                Some(i) => relative[..i].to_string(),
                None => String::new(),
            },
        );
        self.import_stack.push(full.clone());

        let scope = self.root_scope(self.root_args.clone());
        let result = self.evaluate_file(&parsed.bindings, &scope);

        self.import_stack.pop();
        self.current_subdir = saved_subdir;

        let bindings = result.map_err(|_| failed())?;
        let record = Value::record(bindings, self.ctx, src.clone());
        self.import_cache.insert(full, record.clone());
        Ok(record)
    }
}
