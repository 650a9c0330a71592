//! The evaluator: a single-pass reduction of the AST into DAG values.
//!
//! Evaluation is pure and deterministic: bindings evaluate in lexical order,
//! list elements and record fields in declaration order, call arguments
//! positional-then-keyword. Failures are `FabError` values that unwind to
//! one of three boundaries — a top-level binding, a function call frame, or
//! a foreach iteration — where they are recorded against the reporter. A
//! fatal error on a top-level binding aborts DAG production.

use std::collections::HashMap;
use std::path::PathBuf;

use fabrique_ast as ast;
use fabrique_ast::{BinaryOperator, Expression};
use fabrique_core::{FabError, HasSource, Reporter, SourceRange, Type, TypeContext};
use indexmap::IndexMap;

use super::Scope;
use crate::dag::{
    self, apply_binary, apply_unary, Build, Dag, File, Function, FunctionParam, Rule, RuleParam,
    Value, ValuePtr,
};
use crate::plugin::Registry;

/// Evaluated call arguments, positional and keyword, in evaluation order.
#[derive(Debug, Default)]
pub struct CallArgs {
    pub positional: Vec<(ValuePtr, SourceRange)>,
    pub keyword: IndexMap<String, (ValuePtr, SourceRange)>,
}

pub struct Evaluator<'r> {
    pub(super) ctx: &'r TypeContext,
    pub(super) plugins: &'r Registry,
    pub(super) reporter: &'r mut Reporter,
    pub(super) srcroot: PathBuf,
    pub(super) buildroot: PathBuf,
    /// Directory of the file currently being evaluated, relative to srcroot.
    pub(super) current_subdir: String,
    /// The user argument record, shared with imported files.
    pub(super) root_args: IndexMap<String, ValuePtr>,
    pub(super) import_cache: HashMap<PathBuf, ValuePtr>,
    pub(super) import_stack: Vec<PathBuf>,
}

impl<'r> Evaluator<'r> {
    pub fn new(
        ctx: &'r TypeContext,
        plugins: &'r Registry,
        reporter: &'r mut Reporter,
        srcroot: PathBuf,
        buildroot: PathBuf,
    ) -> Self {
        Self {
            ctx,
            plugins,
            reporter,
            srcroot,
            buildroot,
            current_subdir: String::new(),
            root_args: IndexMap::new(),
            import_cache: HashMap::new(),
            import_stack: Vec::new(),
        }
    }

    pub fn type_context(&self) -> &TypeContext {
        self.ctx
    }

    /// Evaluate a whole file's bindings and produce the DAG.
    pub fn run(
        &mut self,
        parsed: &ast::ParsedFile,
        args: IndexMap<String, ValuePtr>,
    ) -> Result<Dag, FabError> {
        let scope = self.root_scope(args);
        let bindings = self.evaluate_file(&parsed.bindings, &scope)?;
        Dag::from_bindings(bindings)
    }

    /// Evaluate top-level bindings in order.
    ///
    /// This is the outermost error boundary: a failing binding is recorded
    /// as a diagnostic and evaluation stops.
    pub fn evaluate_file(
        &mut self,
        bindings: &[ast::ValueBinding],
        scope: &Scope,
    ) -> Result<IndexMap<String, ValuePtr>, FabError> {
        let mut values = IndexMap::new();
        for binding in bindings {
            match self.evaluate_binding(binding, scope) {
                Ok(value) => {
                    values.insert(binding.name.name.clone(), value);
                }
                Err(err) => {
                    self.reporter.record(&err);
                    return Err(err);
                }
            }
        }
        Ok(values)
    }

    /// Evaluate one `name: T = expr` binding and define it in `scope`.
    fn evaluate_binding(
        &mut self,
        binding: &ast::ValueBinding,
        scope: &Scope,
    ) -> Result<ValuePtr, FabError> {
        tracing::debug!(name = %binding.name.name, "evaluating binding");
        let value = self.evaluate(&binding.value, scope)?;
        if let Some(declared) = &binding.declared_type {
            let expected = self.resolve_type(declared)?;
            value.typ().check_subtype(&expected, &binding.value.source())?;
        }
        scope.define(&binding.name.name, value.clone(), &binding.name.span)?;
        Ok(value)
    }

    /// Reduce one expression to a value.
    pub fn evaluate(&mut self, expr: &Expression, scope: &Scope) -> Result<ValuePtr, FabError> {
        match expr {
            Expression::BoolLiteral(e) => Ok(Value::boolean(e.value, self.ctx, e.span.clone())),
            Expression::IntLiteral(e) => Ok(Value::integer(e.value, self.ctx, e.span.clone())),
            Expression::StringLiteral(e) => {
                Ok(Value::string(e.value.clone(), self.ctx, e.span.clone()))
            }
            Expression::Filename(e) => Ok(Value::file(File::new(
                &e.name,
                &self.current_subdir,
                self.ctx.file_type(),
                e.span.clone(),
            ))),
            Expression::FileList(e) => self.evaluate_file_list(e, scope),
            Expression::List(e) => {
                let elements = e
                    .elements
                    .iter()
                    .map(|element| self.evaluate(element, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::list(elements, self.ctx, e.span.clone()))
            }
            Expression::Record(e) => {
                let inner = scope.child();
                let mut fields = IndexMap::new();
                for binding in &e.fields {
                    let value = self.evaluate_binding(binding, &inner)?;
                    fields.insert(binding.name.name.clone(), value);
                }
                Ok(Value::record(fields, self.ctx, e.span.clone()))
            }
            Expression::NameReference(e) => scope.lookup(&e.name.name).ok_or_else(|| {
                FabError::semantic(
                    format!("undefined name '{}'", e.name.name),
                    e.span.clone(),
                )
            }),
            Expression::FieldAccess(e) => {
                let base = self.evaluate(&e.base, scope)?;
                if !base.has_fields() {
                    return Err(FabError::semantic(
                        format!("{} has no fields", base.typ()),
                        e.span.clone(),
                    ));
                }
                base.field(&e.field.name, self.ctx).ok_or_else(|| {
                    FabError::semantic(
                        format!("{} has no field '{}'", base.typ(), e.field.name),
                        e.field.span.clone(),
                    )
                })
            }
            Expression::FieldQuery(e) => {
                let base = self.evaluate(&e.base, scope)?;
                if !base.has_fields() {
                    return Err(FabError::semantic(
                        format!("{} has no fields", base.typ()),
                        e.span.clone(),
                    ));
                }
                match base.field(&e.field.name, self.ctx) {
                    Some(value) => Ok(value),
                    None => self.evaluate(&e.default, scope),
                }
            }
            Expression::Call(e) => self.evaluate_call(e, scope),
            Expression::BinaryOp(e) => {
                let lhs = self.evaluate(&e.lhs, scope)?;
                let rhs = self.evaluate(&e.rhs, scope)?;
                apply_binary(e.op, &lhs, &rhs, self.ctx, &e.span)
            }
            Expression::UnaryOp(e) => {
                let operand = self.evaluate(&e.operand, scope)?;
                apply_unary(e.op, &operand, self.ctx, &e.span)
            }
            Expression::Conditional(e) => self.evaluate_conditional(e, scope),
            Expression::Foreach(e) => self.evaluate_foreach(e, scope),
            Expression::Function(e) => self.evaluate_function_literal(e, scope),
            Expression::Action(e) => self.evaluate_action(e, scope),
            Expression::TypeDeclaration(e) => {
                let declared = self.resolve_type(&e.declared)?;
                Ok(Value::type_value(declared, self.ctx, e.span.clone()))
            }
            Expression::Compound(e) => {
                let inner = scope.child();
                for binding in &e.bindings {
                    self.evaluate_binding(binding, &inner)?;
                }
                self.evaluate(&e.result, &inner)
            }
        }
    }

    fn evaluate_conditional(
        &mut self,
        e: &ast::Conditional,
        scope: &Scope,
    ) -> Result<ValuePtr, FabError> {
        let condition = self.evaluate(&e.condition, scope)?;
        let Some(condition) = condition.as_bool() else {
            return Err(FabError::wrong_type(
                condition.typ().str(),
                self.ctx.boolean_type().str(),
                e.condition.source(),
            ));
        };

        // Both branches must agree on a supertype even though only one is
        // ever evaluated.
        if let (Some(then_ty), Some(else_ty)) = (
            self.static_type(&e.then_branch, scope),
            self.static_type(&e.else_branch, scope),
        ) {
            if self.ctx.supertype_of(&then_ty, &else_ty).is_nil() {
                return Err(FabError::wrong_type(
                    else_ty.str(),
                    then_ty.str(),
                    e.else_branch.source(),
                ));
            }
        }

        if condition {
            self.evaluate(&e.then_branch, scope)
        } else {
            self.evaluate(&e.else_branch, scope)
        }
    }

    fn evaluate_foreach(
        &mut self,
        e: &ast::Foreach,
        scope: &Scope,
    ) -> Result<ValuePtr, FabError> {
        let source_value = self.evaluate(&e.source_value, scope)?;
        let Some(list) = source_value.as_list() else {
            return Err(FabError::semantic(
                format!("cannot iterate over {}", source_value.typ()),
                e.source_value.source(),
            ));
        };

        let loop_var_ty = match &e.explicit_type {
            Some(explicit) => Some(self.resolve_type(explicit)?),
            None => None,
        };

        let mut results = Vec::with_capacity(list.len());
        for (index, element) in list.elements().iter().enumerate() {
            if let Some(expected) = &loop_var_ty {
                element.typ().check_subtype(expected, &e.loop_var.span)?;
            }
            let iteration = scope.child();
            iteration.define(&e.loop_var.name, element.clone(), &e.loop_var.span)?;
            match self.evaluate(&e.body, &iteration) {
                Ok(value) => results.push(value),
                Err(err) => {
                    // Iteration boundary: leave a trail, then unwind.
                    self.reporter
                        .note(format!("in foreach iteration {index}"), e.span.clone());
                    return Err(err);
                }
            }
        }
        Ok(Value::list(results, self.ctx, e.span.clone()))
    }

    fn evaluate_function_literal(
        &mut self,
        e: &std::rc::Rc<ast::FunctionExpr>,
        scope: &Scope,
    ) -> Result<ValuePtr, FabError> {
        let params = self.resolve_params(&e.params, scope)?;
        let result_ty = self.resolve_type(&e.result_type)?;
        let param_types: Vec<Type> = params.iter().map(|p| p.ty.clone()).collect();
        let ty = self.ctx.function(&param_types, &result_ty);
        let function = Function::new(
            params
                .into_iter()
                .map(|p| FunctionParam {
                    name: p.name,
                    ty: p.ty,
                    default: p.default,
                })
                .collect(),
            result_ty,
            e.clone(),
            scope.clone(),
            ty,
            e.span.clone(),
        );
        Ok(std::rc::Rc::new(Value::Function(function)))
    }

    /// Resolve parameter declarations, evaluating defaults in the defining
    /// scope.
    fn resolve_params(
        &mut self,
        params: &[ast::Parameter],
        scope: &Scope,
    ) -> Result<Vec<RuleParam>, FabError> {
        params
            .iter()
            .map(|param| {
                let ty = self.resolve_type(&param.param_type)?;
                let default = match &param.default {
                    Some(default) => {
                        let value = self.evaluate(default, scope)?;
                        value.typ().check_subtype(&ty, &default.source())?;
                        Some(value)
                    }
                    None => None,
                };
                Ok(RuleParam {
                    name: param.name.name.clone(),
                    ty,
                    default,
                })
            })
            .collect()
    }

    fn evaluate_file_list(
        &mut self,
        e: &ast::FileList,
        scope: &Scope,
    ) -> Result<ValuePtr, FabError> {
        let mut subdir = self.current_subdir.clone();
        let mut generated = false;
        for argument in &e.arguments {
            let Some(name) = &argument.name else {
                return Err(FabError::semantic(
                    "file attributes must be named",
                    argument.span.clone(),
                ));
            };
            let value = self.evaluate(&argument.value, scope)?;
            match name.name.as_str() {
                "subdir" => match value.as_str() {
                    Some(extra) => subdir = dag::join_path(&subdir, extra),
                    None => {
                        return Err(FabError::wrong_type(
                            value.typ().str(),
                            self.ctx.string_type().str(),
                            argument.value.source(),
                        ));
                    }
                },
                "generated" => match value.as_bool() {
                    Some(flag) => generated = flag,
                    None => {
                        return Err(FabError::wrong_type(
                            value.typ().str(),
                            self.ctx.boolean_type().str(),
                            argument.value.source(),
                        ));
                    }
                },
                other => {
                    return Err(FabError::semantic(
                        format!("unknown file attribute '{other}'"),
                        name.span.clone(),
                    ));
                }
            }
        }

        let mut elements = Vec::with_capacity(e.files.len());
        for filename in &e.files {
            let file = File::new(
                &filename.name,
                &subdir,
                self.ctx.file_type(),
                filename.span.clone(),
            );
            file.set_generated(generated, &filename.span)?;
            elements.push(Value::file(file));
        }
        let list = dag::List::with_element_type(
            elements,
            &self.ctx.file_type(),
            self.ctx,
            e.span.clone(),
        );
        Ok(std::rc::Rc::new(Value::List(list)))
    }

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------

    fn evaluate_call(&mut self, e: &ast::Call, scope: &Scope) -> Result<ValuePtr, FabError> {
        let target = self.evaluate(&e.target, scope)?;
        let args = self.evaluate_arguments(&e.arguments, scope)?;
        match target.as_ref() {
            Value::Function(function) => self.call_function(function, args, &e.span),
            Value::Rule(rule) => self.invoke_rule(rule, args, &e.span),
            Value::Builtin { kind, .. } => self.call_builtin(*kind, args, &e.span, scope),
            _ => Err(FabError::semantic(
                format!("{} is not callable", target.typ()),
                e.target.source(),
            )),
        }
    }

    /// Evaluate actual arguments in declaration order, enforcing that
    /// positional arguments precede keyword arguments.
    fn evaluate_arguments(
        &mut self,
        arguments: &ast::Arguments,
        scope: &Scope,
    ) -> Result<CallArgs, FabError> {
        let mut args = CallArgs::default();
        for argument in &arguments.args {
            let value = self.evaluate(&argument.value, scope)?;
            match &argument.name {
                Some(name) => {
                    args.keyword
                        .insert(name.name.clone(), (value, argument.span.clone()));
                }
                None => {
                    if !args.keyword.is_empty() {
                        return Err(FabError::semantic(
                            "positional argument follows keyword argument",
                            argument.span.clone(),
                        ));
                    }
                    args.positional.push((value, argument.span.clone()));
                }
            }
        }
        Ok(args)
    }

    /// Match evaluated arguments against formal parameters: positional fill
    /// parameters in declaration order, keywords fill by name, defaults
    /// cover the rest.
    fn match_arguments(
        &self,
        params: &[RuleParam],
        mut args: CallArgs,
        coerce_files: bool,
        src: &SourceRange,
    ) -> Result<IndexMap<String, ValuePtr>, FabError> {
        if args.positional.len() > params.len() {
            return Err(FabError::semantic(
                format!(
                    "too many arguments: expected at most {}, got {}",
                    params.len(),
                    args.positional.len()
                ),
                src.clone(),
            ));
        }

        let mut matched: IndexMap<String, ValuePtr> = IndexMap::new();
        let mut positional = std::mem::take(&mut args.positional).into_iter();

        for param in params {
            let (value, value_src) = if let Some((value, value_src)) = positional.next() {
                if args.keyword.contains_key(&param.name) {
                    return Err(FabError::semantic(
                        format!("argument '{}' given twice", param.name),
                        src.clone(),
                    ));
                }
                (value, value_src)
            } else if let Some((value, value_src)) = args.keyword.shift_remove(&param.name) {
                (value, value_src)
            } else if let Some(default) = &param.default {
                matched.insert(param.name.clone(), default.clone());
                continue;
            } else {
                return Err(FabError::semantic(
                    format!("missing argument '{}'", param.name),
                    src.clone(),
                ));
            };

            let value = self.check_argument(value, param, coerce_files, &value_src)?;
            matched.insert(param.name.clone(), value);
        }

        if let Some((name, (_, arg_src))) = args.keyword.first() {
            return Err(FabError::semantic(
                format!("unknown argument '{name}'"),
                arg_src.clone(),
            ));
        }
        Ok(matched)
    }

    /// Subtype-check one argument, optionally wrapping a lone file into a
    /// singleton list where a file list is expected.
    fn check_argument(
        &self,
        value: ValuePtr,
        param: &RuleParam,
        coerce_files: bool,
        src: &SourceRange,
    ) -> Result<ValuePtr, FabError> {
        if value.typ().is_subtype(&param.ty) {
            return Ok(value);
        }
        if coerce_files && param.ty.is_ordered() {
            if let Some(element_ty) = param.ty.element_type() {
                if value.typ().is_subtype(element_ty) {
                    let list = dag::List::with_element_type(
                        vec![value],
                        element_ty,
                        self.ctx,
                        src.clone(),
                    );
                    return Ok(std::rc::Rc::new(Value::List(list)));
                }
            }
        }
        Err(FabError::wrong_type(
            value.typ().str(),
            param.ty.str(),
            src.clone(),
        ))
    }

    fn call_function(
        &mut self,
        function: &Function,
        args: CallArgs,
        src: &SourceRange,
    ) -> Result<ValuePtr, FabError> {
        let params: Vec<RuleParam> = function
            .params()
            .iter()
            .map(|p| RuleParam {
                name: p.name.clone(),
                ty: p.ty.clone(),
                default: p.default.clone(),
            })
            .collect();
        let matched = self.match_arguments(&params, args, false, src)?;

        let frame = function.captured_scope().child();
        for (name, value) in matched {
            frame.define(name, value, src)?;
        }

        // Call-frame boundary: leave a trail, then unwind.
        let result = match self.evaluate(&function.body().body, &frame) {
            Ok(result) => result,
            Err(err) => {
                self.reporter.note("in function call", src.clone());
                return Err(err);
            }
        };
        result
            .typ()
            .check_subtype(function.result_type(), src)?;
        Ok(result)
    }

    /// Invoke a rule: match arguments, validate types, classify files into
    /// inputs and outputs, and emit a build step.
    fn invoke_rule(
        &mut self,
        rule: &std::rc::Rc<Rule>,
        args: CallArgs,
        src: &SourceRange,
    ) -> Result<ValuePtr, FabError> {
        let matched = self.match_arguments(rule.params(), args, true, src)?;

        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        let mut extra = IndexMap::new();
        let mut result: Option<ValuePtr> = None;

        for param in rule.params() {
            let value = matched
                .get(&param.name)
                .ok_or_else(|| FabError::assertion("argument matching missed a parameter", src.clone()))?
                .clone();
            if param.is_output() {
                collect_files(&value, &mut outputs, src)?;
                if param.name == "out" {
                    result = Some(value.clone());
                }
            } else if param.is_input() {
                collect_files(&value, &mut inputs, src)?;
            } else {
                extra.insert(param.name.clone(), value);
            }
        }

        let result_ty = match &result {
            Some(value) => value.typ().clone(),
            None => rule.result_type().clone(),
        };

        let build = Build::new(rule.clone(), inputs, outputs, extra, result_ty, src.clone())?;
        Ok(std::rc::Rc::new(Value::Build(std::rc::Rc::new(build))))
    }

    fn evaluate_action(
        &mut self,
        e: &std::rc::Rc<ast::ActionExpr>,
        scope: &Scope,
    ) -> Result<ValuePtr, FabError> {
        let args = self.evaluate_arguments(&e.arguments, scope)?;

        let mut positional = args.positional.into_iter();
        let command = match positional.next() {
            Some((value, value_src)) => match value.as_str() {
                Some(command) => command.to_string(),
                None => {
                    return Err(FabError::wrong_type(
                        value.typ().str(),
                        self.ctx.string_type().str(),
                        value_src,
                    ));
                }
            },
            None => {
                return Err(FabError::semantic(
                    "action requires a command argument",
                    e.span.clone(),
                ));
            }
        };
        if let Some((_, extra_src)) = positional.next() {
            return Err(FabError::semantic(
                "action takes a single positional argument",
                extra_src,
            ));
        }

        let mut description = None;
        let mut arguments = IndexMap::new();
        for (name, (value, value_src)) in args.keyword {
            if name == "description" {
                match value.as_str() {
                    Some(text) => description = Some(text.to_string()),
                    None => {
                        return Err(FabError::wrong_type(
                            value.typ().str(),
                            self.ctx.string_type().str(),
                            value_src,
                        ));
                    }
                }
            } else {
                arguments.insert(name, value);
            }
        }

        // Synthesize untagged `in`/`out` parameters when the user did not
        // declare them.
        let mut params = self.resolve_params(&e.params, scope)?;
        if !params.iter().any(|p| p.name == "in") {
            params.insert(
                0,
                RuleParam {
                    name: "in".to_string(),
                    ty: self.ctx.list_of(&self.ctx.input_file_type()),
                    default: None,
                },
            );
        }
        if !params.iter().any(|p| p.name == "out") {
            params.insert(
                1,
                RuleParam {
                    name: "out".to_string(),
                    ty: self.ctx.list_of(&self.ctx.output_file_type()),
                    default: None,
                },
            );
        }

        let result_ty = params
            .iter()
            .find(|p| p.name == "out")
            .map(|p| p.ty.clone())
            .unwrap_or_else(|| self.ctx.file_list_type());
        let param_types: Vec<Type> = params.iter().map(|p| p.ty.clone()).collect();
        let ty = self.ctx.function(&param_types, &result_ty);

        let rule = Rule::new(
            command,
            description,
            arguments,
            params,
            ty,
            result_ty,
            e.span.clone(),
        );
        Ok(std::rc::Rc::new(Value::Rule(std::rc::Rc::new(rule))))
    }

    // ------------------------------------------------------------------
    // Type references and static typing
    // ------------------------------------------------------------------

    /// Resolve a source-level type reference against the type context.
    pub fn resolve_type(&self, reference: &ast::TypeReference) -> Result<Type, FabError> {
        match &reference.kind {
            ast::TypeRefKind::Record { fields } => {
                let resolved = fields
                    .iter()
                    .map(|(name, ty)| Ok((name.name.clone(), self.resolve_type(ty)?)))
                    .collect::<Result<Vec<_>, FabError>>()?;
                Ok(self.ctx.record(resolved))
            }
            ast::TypeRefKind::Named { name, params } => {
                // `file[in]` and `file[out]` tag the file type rather than
                // parameterizing it.
                if name.name == "file" && params.len() == 1 {
                    if let ast::TypeRefKind::Named { name: tag, params: tag_params } =
                        &params[0].kind
                    {
                        if tag_params.is_empty() {
                            match tag.name.as_str() {
                                "in" => return Ok(self.ctx.input_file_type()),
                                "out" => return Ok(self.ctx.output_file_type()),
                                _ => {}
                            }
                        }
                    }
                }

                let resolved = params
                    .iter()
                    .map(|p| self.resolve_type(p))
                    .collect::<Result<Vec<_>, _>>()?;
                self.ctx.find(&name.name, &resolved).ok_or_else(|| {
                    FabError::semantic(
                        format!("unknown type '{}'", name.name),
                        reference.span.clone(),
                    )
                })
            }
        }
    }

    /// Best-effort static type of an expression, used to check that the two
    /// branches of a conditional are compatible without evaluating both.
    /// `None` means "not statically known"; the check is skipped then.
    fn static_type(&self, expr: &Expression, scope: &Scope) -> Option<Type> {
        match expr {
            Expression::BoolLiteral(_) => Some(self.ctx.boolean_type()),
            Expression::IntLiteral(_) => Some(self.ctx.integer_type()),
            Expression::StringLiteral(_) => Some(self.ctx.string_type()),
            Expression::Filename(_) => Some(self.ctx.file_type()),
            Expression::FileList(_) => Some(self.ctx.file_list_type()),
            Expression::TypeDeclaration(_) => Some(self.ctx.type_type()),
            Expression::NameReference(e) => {
                scope.lookup(&e.name.name).map(|v| v.typ().clone())
            }
            Expression::List(e) => {
                let elements = e
                    .elements
                    .iter()
                    .map(|element| self.static_type(element, scope))
                    .collect::<Option<Vec<_>>>()?;
                Some(self.ctx.list_of(&self.ctx.supertype(elements.iter())))
            }
            Expression::Record(e) => {
                let fields = e
                    .fields
                    .iter()
                    .map(|f| Some((f.name.name.clone(), self.static_type(&f.value, scope)?)))
                    .collect::<Option<Vec<_>>>()?;
                Some(self.ctx.record(fields))
            }
            Expression::UnaryOp(e) => self.static_type(&e.operand, scope),
            Expression::BinaryOp(e) => {
                let lhs = self.static_type(&e.lhs, scope)?;
                let rhs = self.static_type(&e.rhs, scope)?;
                match e.op {
                    BinaryOperator::Add | BinaryOperator::ScalarAdd => {
                        self.ctx.on_add(&lhs, &rhs)
                    }
                    BinaryOperator::Prefix => self.ctx.on_prefix_with(&rhs, &lhs),
                    BinaryOperator::Subtract
                    | BinaryOperator::Multiply
                    | BinaryOperator::Divide => self.ctx.on_multiply(&lhs, &rhs),
                    BinaryOperator::Equal | BinaryOperator::NotEqual => {
                        Some(self.ctx.boolean_type())
                    }
                    BinaryOperator::And | BinaryOperator::Or | BinaryOperator::Xor => {
                        (lhs.is_bool() && rhs.is_bool()).then(|| self.ctx.boolean_type())
                    }
                }
            }
            Expression::Conditional(e) => {
                let then_ty = self.static_type(&e.then_branch, scope)?;
                let else_ty = self.static_type(&e.else_branch, scope)?;
                let sup = self.ctx.supertype_of(&then_ty, &else_ty);
                (!sup.is_nil()).then_some(sup)
            }
            Expression::FieldAccess(e) => {
                let base = self.static_type(&e.base, scope)?;
                base.fields()?.get(&e.field.name).cloned()
            }
            Expression::Call(e) => {
                let target = self.static_type(&e.target, scope)?;
                let (_, result) = target.signature()?;
                Some(result.clone())
            }
            _ => None,
        }
    }
}

/// Flatten a value into build files: a file is itself, a list contributes
/// its members, a build contributes its outputs.
fn collect_files(
    value: &ValuePtr,
    into: &mut Vec<std::rc::Rc<File>>,
    src: &SourceRange,
) -> Result<(), FabError> {
    match value.as_ref() {
        Value::File(file) => {
            into.push(file.clone());
            Ok(())
        }
        Value::Build(build) => {
            into.extend(build.outputs().iter().cloned());
            Ok(())
        }
        Value::List(list) => {
            for element in list.elements() {
                collect_files(element, into, src)?;
            }
            Ok(())
        }
        _ => Err(FabError::wrong_type(
            value.typ().str(),
            "file or list[file]",
            src.clone(),
        )),
    }
}
