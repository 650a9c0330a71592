//! Runtime values.
//!
//! Everything the evaluator produces is a [`Value`] behind an `Rc` handle
//! ([`ValuePtr`]): immutable, cheap to share, and carrying its [`Type`] and
//! [`SourceRange`]. Lists and records hold handles to values that may also be
//! named elsewhere; builds point at rules and files the same way. Cycles
//! cannot arise because builds only ever reference rules and files.
//!
//! Operators are dispatched here at a single match site per operation
//! ([`apply_binary`] / [`apply_unary`]); anything a variant does not
//! implement fails with an `unsupported operation` diagnostic carrying the
//! source range of the expression that asked.

use std::fmt;
use std::rc::Rc;

use fabrique_ast::{BinaryOperator, UnaryOperator};
use fabrique_core::{FabError, SourceRange, Type, TypeContext};
use indexmap::IndexMap;

use super::{Build, File, Function, Rule};

/// Shared handle to an immutable value.
pub type ValuePtr = Rc<Value>;

/// Which builtin a [`Value::Builtin`] stands for; the evaluator dispatches
/// on this when the builtin is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    /// `file(path, subdir=..., generated=...)`
    File,
    /// `import(path, args...)`
    Import,
    /// `fields(record)`
    Fields,
    /// `print(values...)`
    Print,
    /// `typeof(value)`
    TypeOf,
}

impl BuiltinKind {
    pub fn name(self) -> &'static str {
        match self {
            BuiltinKind::File => "file",
            BuiltinKind::Import => "import",
            BuiltinKind::Fields => "fields",
            BuiltinKind::Print => "print",
            BuiltinKind::TypeOf => "typeof",
        }
    }
}

#[derive(Debug)]
pub enum Value {
    Nil {
        ty: Type,
        src: SourceRange,
    },
    Boolean {
        value: bool,
        ty: Type,
        src: SourceRange,
    },
    Integer {
        value: i64,
        ty: Type,
        src: SourceRange,
    },
    Str {
        value: String,
        ty: Type,
        src: SourceRange,
    },
    File(Rc<File>),
    List(List),
    Record(Record),
    Rule(Rc<Rule>),
    Build(Rc<Build>),
    Function(Function),
    /// A reified type; its own type is the special `type` type.
    Type {
        referenced: Type,
        ty: Type,
        src: SourceRange,
    },
    Builtin {
        kind: BuiltinKind,
        ty: Type,
    },
}

/// An ordered sequence of values with a common element type.
#[derive(Debug)]
pub struct List {
    ty: Type,
    src: SourceRange,
    elements: Vec<ValuePtr>,
}

impl List {
    /// The element type is the supertype of the members' types.
    pub fn new(elements: Vec<ValuePtr>, ctx: &TypeContext, src: SourceRange) -> Self {
        let element_ty = ctx.supertype(elements.iter().map(|e| e.typ()));
        Self {
            ty: ctx.list_of(&element_ty),
            src,
            elements,
        }
    }

    pub fn with_element_type(
        elements: Vec<ValuePtr>,
        element_ty: &Type,
        ctx: &TypeContext,
        src: SourceRange,
    ) -> Self {
        Self {
            ty: ctx.list_of(element_ty),
            src,
            elements,
        }
    }

    pub fn typ(&self) -> &Type {
        &self.ty
    }

    pub fn elements(&self) -> &[ValuePtr] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// An unordered name → value mapping; iteration order is insertion order.
#[derive(Debug)]
pub struct Record {
    ty: Type,
    src: SourceRange,
    fields: IndexMap<String, ValuePtr>,
}

impl Record {
    pub fn new(fields: IndexMap<String, ValuePtr>, ctx: &TypeContext, src: SourceRange) -> Self {
        let ty = ctx.record(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), value.typ().clone())),
        );
        Self { ty, src, fields }
    }

    pub fn typ(&self) -> &Type {
        &self.ty
    }

    pub fn fields(&self) -> &IndexMap<String, ValuePtr> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<ValuePtr> {
        self.fields.get(name).cloned()
    }
}

// ============================================================================
// Construction
// ============================================================================

impl Value {
    pub fn nil(ctx: &TypeContext, src: SourceRange) -> ValuePtr {
        Rc::new(Value::Nil {
            ty: ctx.nil_type(),
            src,
        })
    }

    pub fn boolean(value: bool, ctx: &TypeContext, src: SourceRange) -> ValuePtr {
        Rc::new(Value::Boolean {
            value,
            ty: ctx.boolean_type(),
            src,
        })
    }

    pub fn integer(value: i64, ctx: &TypeContext, src: SourceRange) -> ValuePtr {
        Rc::new(Value::Integer {
            value,
            ty: ctx.integer_type(),
            src,
        })
    }

    pub fn string(value: impl Into<String>, ctx: &TypeContext, src: SourceRange) -> ValuePtr {
        Rc::new(Value::Str {
            value: value.into(),
            ty: ctx.string_type(),
            src,
        })
    }

    pub fn file(file: File) -> ValuePtr {
        Rc::new(Value::File(Rc::new(file)))
    }

    pub fn list(elements: Vec<ValuePtr>, ctx: &TypeContext, src: SourceRange) -> ValuePtr {
        Rc::new(Value::List(List::new(elements, ctx, src)))
    }

    pub fn record(
        fields: IndexMap<String, ValuePtr>,
        ctx: &TypeContext,
        src: SourceRange,
    ) -> ValuePtr {
        Rc::new(Value::Record(Record::new(fields, ctx, src)))
    }

    pub fn type_value(referenced: Type, ctx: &TypeContext, src: SourceRange) -> ValuePtr {
        Rc::new(Value::Type {
            referenced,
            ty: ctx.type_type(),
            src,
        })
    }

    pub fn builtin(kind: BuiltinKind, ctx: &TypeContext) -> ValuePtr {
        Rc::new(Value::Builtin {
            kind,
            ty: ctx.function(&[], &ctx.nil_type()),
        })
    }
}

// ============================================================================
// The common value contract
// ============================================================================

impl Value {
    pub fn typ(&self) -> &Type {
        match self {
            Value::Nil { ty, .. }
            | Value::Boolean { ty, .. }
            | Value::Integer { ty, .. }
            | Value::Str { ty, .. }
            | Value::Type { ty, .. }
            | Value::Builtin { ty, .. } => ty,
            Value::File(f) => f.typ(),
            Value::List(l) => l.typ(),
            Value::Record(r) => r.typ(),
            Value::Rule(r) => r.typ(),
            Value::Build(b) => b.typ(),
            Value::Function(f) => f.typ(),
        }
    }

    pub fn source(&self) -> SourceRange {
        match self {
            Value::Nil { src, .. }
            | Value::Boolean { src, .. }
            | Value::Integer { src, .. }
            | Value::Str { src, .. }
            | Value::Type { src, .. } => src.clone(),
            Value::Builtin { .. } => SourceRange::none(),
            Value::File(f) => f.source().clone(),
            Value::List(l) => l.src.clone(),
            Value::Record(r) => r.src.clone(),
            Value::Rule(r) => r.source().clone(),
            Value::Build(b) => b.source().clone(),
            Value::Function(f) => f.source().clone(),
        }
    }

    /// Can `field()` ever return something for this value?
    pub fn has_fields(&self) -> bool {
        matches!(self, Value::Record(_) | Value::File(_))
    }

    pub fn field(&self, name: &str, ctx: &TypeContext) -> Option<ValuePtr> {
        match self {
            Value::Record(r) => r.field(name),
            Value::File(f) => f.field(name, ctx),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&Rc<File>> {
        match self {
            Value::File(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_rule(&self) -> Option<&Rc<Rule>> {
        match self {
            Value::Rule(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_build(&self) -> Option<&Rc<Build>> {
        match self {
            Value::Build(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&Type> {
        match self {
            Value::Type { referenced, .. } => Some(referenced),
            _ => None,
        }
    }

    /// A short name for diagnostics.
    fn kind_name(&self) -> &'static str {
        match self {
            Value::Nil { .. } => "nil",
            Value::Boolean { .. } => "boolean",
            Value::Integer { .. } => "integer",
            Value::Str { .. } => "string",
            Value::File(_) => "file",
            Value::List(_) => "list",
            Value::Record(_) => "record",
            Value::Rule(_) => "rule",
            Value::Build(_) => "build",
            Value::Function(_) => "function",
            Value::Type { .. } => "type",
            Value::Builtin { .. } => "builtin function",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil { .. } => write!(f, "nil"),
            Value::Boolean { value, .. } => write!(f, "{value}"),
            Value::Integer { value, .. } => write!(f, "{value}"),
            Value::Str { value, .. } => write!(f, "{value}"),
            Value::File(file) => write!(f, "{}", file.filename()),
            Value::List(list) => {
                write!(f, "[")?;
                for element in &list.elements {
                    write!(f, " {element}")?;
                }
                write!(f, " ]")
            }
            Value::Record(record) => {
                write!(f, "{{ ")?;
                for (name, value) in &record.fields {
                    write!(f, "{name} = {value}; ")?;
                }
                write!(f, "}}")
            }
            Value::Rule(rule) => write!(f, "action('{}')", rule.command()),
            Value::Build(build) => {
                write!(f, "build(")?;
                for input in build.inputs() {
                    write!(f, " {}", input.filename())?;
                }
                write!(f, " =>")?;
                for output in build.outputs() {
                    write!(f, " {}", output.filename())?;
                }
                write!(f, " )")
            }
            Value::Function(function) => write!(f, "{}", function.typ()),
            Value::Type { referenced, .. } => write!(f, "{referenced}"),
            Value::Builtin { kind, .. } => write!(f, "<builtin {}>", kind.name()),
        }
    }
}

// ============================================================================
// Operators
// ============================================================================

fn unsupported(op: &str, value: &Value, src: &SourceRange) -> FabError {
    FabError::semantic(
        format!(
            "unsupported operation: {} does not support {op}",
            value.kind_name()
        ),
        src.clone(),
    )
}

/// Evaluate `lhs <op> rhs`. The single dispatch site for binary operators.
pub fn apply_binary(
    op: BinaryOperator,
    lhs: &ValuePtr,
    rhs: &ValuePtr,
    ctx: &TypeContext,
    src: &SourceRange,
) -> Result<ValuePtr, FabError> {
    match op {
        BinaryOperator::Add => add(lhs, rhs, ctx, src),
        BinaryOperator::ScalarAdd => scalar_add(lhs, rhs, ctx, src),
        BinaryOperator::Prefix => prefix_with(lhs, rhs, ctx, src),
        BinaryOperator::Subtract => integer_op(lhs, rhs, ctx, src, "subtract", |a, b| {
            Some(a.wrapping_sub(b))
        }),
        BinaryOperator::Multiply => integer_op(lhs, rhs, ctx, src, "multiply", |a, b| {
            Some(a.wrapping_mul(b))
        }),
        BinaryOperator::Divide => integer_op(lhs, rhs, ctx, src, "divide", |a, b| {
            if b == 0 {
                None
            } else {
                Some(a.wrapping_div(b))
            }
        }),
        BinaryOperator::Equal => equality(lhs, rhs, false, ctx, src),
        BinaryOperator::NotEqual => equality(lhs, rhs, true, ctx, src),
        BinaryOperator::And => logical(lhs, rhs, ctx, src, "and", |a, b| a && b),
        BinaryOperator::Or => logical(lhs, rhs, ctx, src, "or", |a, b| a || b),
        BinaryOperator::Xor => logical(lhs, rhs, ctx, src, "xor", |a, b| a ^ b),
    }
}

/// Evaluate `<op> operand`.
pub fn apply_unary(
    op: UnaryOperator,
    operand: &ValuePtr,
    ctx: &TypeContext,
    src: &SourceRange,
) -> Result<ValuePtr, FabError> {
    match op {
        UnaryOperator::Negate => match operand.as_int() {
            Some(value) => Ok(Value::integer(value.wrapping_neg(), ctx, src.clone())),
            None => Err(unsupported("negate", operand, src)),
        },
        UnaryOperator::Not => match operand.as_bool() {
            Some(value) => Ok(Value::boolean(!value, ctx, src.clone())),
            None => Err(unsupported("not", operand, src)),
        },
    }
}

fn add(
    lhs: &ValuePtr,
    rhs: &ValuePtr,
    ctx: &TypeContext,
    src: &SourceRange,
) -> Result<ValuePtr, FabError> {
    match (lhs.as_ref(), rhs.as_ref()) {
        (Value::Integer { value: a, .. }, Value::Integer { value: b, .. }) => {
            Ok(Value::integer(a.wrapping_add(*b), ctx, src.clone()))
        }
        (Value::Str { value: a, .. }, Value::Str { value: b, .. }) => {
            Ok(Value::string(format!("{a}{b}"), ctx, src.clone()))
        }
        (Value::File(file), Value::Str { value, .. }) => {
            Ok(Value::file(file.with_suffix(value, src.clone())))
        }
        (Value::Str { value, .. }, Value::File(file)) => {
            Ok(Value::file(file.with_prefix(value, src.clone())))
        }
        (Value::List(a), Value::List(b)) => {
            let elements = a
                .elements
                .iter()
                .chain(b.elements.iter())
                .cloned()
                .collect();
            Ok(Rc::new(Value::List(List::new(elements, ctx, src.clone()))))
        }
        // list[T] + T distributes the scalar over the elements.
        (Value::List(_), _) | (_, Value::List(_)) => scalar_add(lhs, rhs, ctx, src),
        _ => Err(unsupported("add", lhs, src)),
    }
}

/// `.+`: add a scalar to every element of a list.
fn scalar_add(
    lhs: &ValuePtr,
    rhs: &ValuePtr,
    ctx: &TypeContext,
    src: &SourceRange,
) -> Result<ValuePtr, FabError> {
    match (lhs.as_ref(), rhs.as_ref()) {
        (Value::List(list), _) => {
            let elements = list
                .elements
                .iter()
                .map(|element| add(element, rhs, ctx, src))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Rc::new(Value::List(List::new(elements, ctx, src.clone()))))
        }
        (_, Value::List(list)) => {
            let elements = list
                .elements
                .iter()
                .map(|element| add(lhs, element, ctx, src))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Rc::new(Value::List(List::new(elements, ctx, src.clone()))))
        }
        _ => Err(unsupported("scalar add", lhs, src)),
    }
}

/// `::`: prepend an element to a list.
fn prefix_with(
    lhs: &ValuePtr,
    rhs: &ValuePtr,
    ctx: &TypeContext,
    src: &SourceRange,
) -> Result<ValuePtr, FabError> {
    match rhs.as_ref() {
        Value::List(list) => {
            let mut elements = Vec::with_capacity(list.len() + 1);
            elements.push(lhs.clone());
            elements.extend(list.elements.iter().cloned());
            Ok(Rc::new(Value::List(List::new(elements, ctx, src.clone()))))
        }
        _ => Err(unsupported("prefix", rhs, src)),
    }
}

fn integer_op(
    lhs: &ValuePtr,
    rhs: &ValuePtr,
    ctx: &TypeContext,
    src: &SourceRange,
    name: &str,
    op: impl Fn(i64, i64) -> Option<i64>,
) -> Result<ValuePtr, FabError> {
    match (lhs.as_int(), rhs.as_int()) {
        (Some(a), Some(b)) => match op(a, b) {
            Some(result) => Ok(Value::integer(result, ctx, src.clone())),
            None => Err(FabError::semantic("division by zero", src.clone())),
        },
        _ => Err(unsupported(name, lhs, src)),
    }
}

fn logical(
    lhs: &ValuePtr,
    rhs: &ValuePtr,
    ctx: &TypeContext,
    src: &SourceRange,
    name: &str,
    op: impl Fn(bool, bool) -> bool,
) -> Result<ValuePtr, FabError> {
    match (lhs.as_bool(), rhs.as_bool()) {
        (Some(a), Some(b)) => Ok(Value::boolean(op(a, b), ctx, src.clone())),
        _ => Err(unsupported(name, lhs, src)),
    }
}

fn equality(
    lhs: &ValuePtr,
    rhs: &ValuePtr,
    negated: bool,
    ctx: &TypeContext,
    src: &SourceRange,
) -> Result<ValuePtr, FabError> {
    match values_equal(lhs, rhs) {
        Some(equal) => Ok(Value::boolean(equal != negated, ctx, src.clone())),
        None => Err(unsupported("equality", lhs, src)),
    }
}

/// Structural equality; `None` for values with no equality (functions,
/// rules, builds).
fn values_equal(a: &Value, b: &Value) -> Option<bool> {
    match (a, b) {
        (Value::Nil { .. }, Value::Nil { .. }) => Some(true),
        (Value::Boolean { value: a, .. }, Value::Boolean { value: b, .. }) => Some(a == b),
        (Value::Integer { value: a, .. }, Value::Integer { value: b, .. }) => Some(a == b),
        (Value::Str { value: a, .. }, Value::Str { value: b, .. }) => Some(a == b),
        (Value::File(a), Value::File(b)) => {
            Some(a.filename() == b.filename() && a.generated() == b.generated())
        }
        (Value::Type { referenced: a, .. }, Value::Type { referenced: b, .. }) => Some(a == b),
        (Value::List(a), Value::List(b)) => {
            if a.len() != b.len() {
                return Some(false);
            }
            let mut all = true;
            for (x, y) in a.elements.iter().zip(&b.elements) {
                all = all && values_equal(x, y)?;
            }
            Some(all)
        }
        (Value::Record(a), Value::Record(b)) => {
            if a.fields.len() != b.fields.len() {
                return Some(false);
            }
            let mut all = true;
            for (name, x) in &a.fields {
                match b.fields.get(name) {
                    Some(y) => all = all && values_equal(x, y)?,
                    None => return Some(false),
                }
            }
            Some(all)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src() -> SourceRange {
        SourceRange::none()
    }

    #[test]
    fn integer_arithmetic() {
        let ctx = TypeContext::new();
        let a = Value::integer(40, &ctx, src());
        let b = Value::integer(2, &ctx, src());
        let sum = apply_binary(BinaryOperator::Add, &a, &b, &ctx, &src()).expect("add");
        assert_eq!(sum.as_int(), Some(42));
        let product =
            apply_binary(BinaryOperator::Multiply, &a, &b, &ctx, &src()).expect("multiply");
        assert_eq!(product.as_int(), Some(80));
    }

    #[test]
    fn division_by_zero_fails() {
        let ctx = TypeContext::new();
        let a = Value::integer(1, &ctx, src());
        let b = Value::integer(0, &ctx, src());
        let err = apply_binary(BinaryOperator::Divide, &a, &b, &ctx, &src()).expect_err("err");
        assert!(err.to_string().contains("division by zero"));
    }

    #[test]
    fn string_concatenation() {
        let ctx = TypeContext::new();
        let a = Value::string("foo", &ctx, src());
        let b = Value::string("bar", &ctx, src());
        let joined = apply_binary(BinaryOperator::Add, &a, &b, &ctx, &src()).expect("add");
        assert_eq!(joined.as_str(), Some("foobar"));
    }

    #[test]
    fn list_concatenation_joins_element_types() {
        let ctx = TypeContext::new();
        let ints = Value::list(vec![Value::integer(1, &ctx, src())], &ctx, src());
        let more = Value::list(vec![Value::integer(2, &ctx, src())], &ctx, src());
        let joined = apply_binary(BinaryOperator::Add, &ints, &more, &ctx, &src()).expect("add");
        let list = joined.as_list().expect("list");
        assert_eq!(list.len(), 2);
        assert_eq!(list.typ(), &ctx.list_of(&ctx.integer_type()));
    }

    #[test]
    fn cons_prepends_and_updates_element_type() {
        let ctx = TypeContext::new();
        let strings = Value::list(vec![Value::string("b", &ctx, src())], &ctx, src());
        let head = Value::string("a", &ctx, src());
        let consed =
            apply_binary(BinaryOperator::Prefix, &head, &strings, &ctx, &src()).expect("cons");
        let list = consed.as_list().expect("list");
        assert_eq!(list.len(), 2);
        assert_eq!(list.elements()[0].as_str(), Some("a"));
    }

    #[test]
    fn scalar_add_distributes_over_lists() {
        let ctx = TypeContext::new();
        let names = Value::list(
            vec![
                Value::string("a", &ctx, src()),
                Value::string("b", &ctx, src()),
            ],
            &ctx,
            src(),
        );
        let suffix = Value::string(".o", &ctx, src());
        let result =
            apply_binary(BinaryOperator::ScalarAdd, &names, &suffix, &ctx, &src()).expect(".+");
        let list = result.as_list().expect("list");
        assert_eq!(list.elements()[0].as_str(), Some("a.o"));
        assert_eq!(list.elements()[1].as_str(), Some("b.o"));
    }

    #[test]
    fn scalar_add_with_unaddable_elements_fails() {
        let ctx = TypeContext::new();
        let ints = Value::list(vec![Value::integer(1, &ctx, src())], &ctx, src());
        let suffix = Value::string(".o", &ctx, src());
        let err = apply_binary(BinaryOperator::Add, &ints, &suffix, &ctx, &src())
            .expect_err("unsupported");
        assert!(err.to_string().contains("unsupported operation"));
    }

    #[test]
    fn file_suffix_concatenation() {
        let ctx = TypeContext::new();
        let file = Value::file(File::new("a.c", "", ctx.file_type(), src()));
        let suffix = Value::string(".o", &ctx, src());
        let obj = apply_binary(BinaryOperator::Add, &file, &suffix, &ctx, &src()).expect("add");
        assert_eq!(obj.as_file().expect("file").filename(), "a.c.o");
    }

    #[test]
    fn booleans_support_logic_but_not_arithmetic() {
        let ctx = TypeContext::new();
        let t = Value::boolean(true, &ctx, src());
        let f = Value::boolean(false, &ctx, src());
        let xor = apply_binary(BinaryOperator::Xor, &t, &f, &ctx, &src()).expect("xor");
        assert_eq!(xor.as_bool(), Some(true));

        let err = apply_binary(BinaryOperator::Add, &t, &f, &ctx, &src()).expect_err("err");
        assert!(err.to_string().contains("unsupported operation"));
    }

    #[test]
    fn equality_is_structural() {
        let ctx = TypeContext::new();
        let a = Value::list(vec![Value::integer(1, &ctx, src())], &ctx, src());
        let b = Value::list(vec![Value::integer(1, &ctx, src())], &ctx, src());
        let eq = apply_binary(BinaryOperator::Equal, &a, &b, &ctx, &src()).expect("eq");
        assert_eq!(eq.as_bool(), Some(true));
    }

    #[test]
    fn unary_operators() {
        let ctx = TypeContext::new();
        let n = Value::integer(5, &ctx, src());
        let negated = apply_unary(UnaryOperator::Negate, &n, &ctx, &src()).expect("negate");
        assert_eq!(negated.as_int(), Some(-5));

        let t = Value::boolean(true, &ctx, src());
        let inverted = apply_unary(UnaryOperator::Not, &t, &ctx, &src()).expect("not");
        assert_eq!(inverted.as_bool(), Some(false));

        let err = apply_unary(UnaryOperator::Not, &n, &ctx, &src()).expect_err("err");
        assert!(err.to_string().contains("unsupported operation"));
    }
}
