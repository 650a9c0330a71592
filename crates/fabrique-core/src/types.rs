//! The structural type system.
//!
//! All types are interned: [`TypeContext`] owns a table keyed by the
//! canonical string form, and every request for the same `(name, parameters)`
//! pair returns a handle to the same allocation. Handle identity therefore
//! *is* type identity, which makes equality checks O(1) and lets every AST
//! node, scope binding, and DAG value share its type by cheap clone.
//!
//! The subtype lattice:
//!
//! - subtyping is reflexive
//! - `file[in]` and `file[out]` are subtypes of `file`
//! - `list` and `maybe` are covariant in their element type
//! - a record is a subtype of another if it has every field of the other,
//!   each at a subtype (width and depth subtyping)
//! - `supertype(a, b)` is the least upper bound, or `nil` when the two are
//!   incomparable
//!
//! The operator rules (`on_add`, `on_multiply`, `on_prefix_with`) answer
//! "what type does this operator produce?" and return `None` where the
//! operation is unsupported; the evaluator turns that into a diagnostic.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::diag::FabError;
use crate::source::SourceRange;

// ============================================================================
// Type handles
// ============================================================================

/// Direction tag on a `file` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileTag {
    /// A file with no stated direction.
    Any,
    /// An input to a build step (`file[in]`).
    Input,
    /// An output of a build step (`file[out]`).
    Output,
}

#[derive(Debug)]
enum TypeKind {
    Nil,
    Boolean,
    Integer,
    Str,
    /// The type of a reified type value.
    TypeType,
    File(FileTag),
    List,
    Maybe,
    Record(IndexMap<String, Type>),
    Function { params: Vec<Type>, result: Type },
}

#[derive(Debug)]
struct TypeData {
    name: String,
    params: Vec<Type>,
    kind: TypeKind,
    canonical: String,
}

/// An interned type handle.
///
/// Cloning is cheap (reference count bump); equality is pointer identity.
#[derive(Debug, Clone)]
pub struct Type(Rc<TypeData>);

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.canonical)
    }
}

impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.canonical)
    }
}

impl Type {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Ordered type parameters (element type of a list, etc.).
    pub fn params(&self) -> &[Type] {
        &self.0.params
    }

    /// Canonical string form, e.g. `list[file[in]]`.
    pub fn str(&self) -> &str {
        &self.0.canonical
    }

    // ------------------------------------------------------------------
    // Capability predicates
    // ------------------------------------------------------------------

    pub fn is_nil(&self) -> bool {
        matches!(self.0.kind, TypeKind::Nil)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.0.kind, TypeKind::Boolean)
    }

    pub fn is_int(&self) -> bool {
        matches!(self.0.kind, TypeKind::Integer)
    }

    pub fn is_string(&self) -> bool {
        matches!(self.0.kind, TypeKind::Str)
    }

    pub fn is_file(&self) -> bool {
        matches!(self.0.kind, TypeKind::File(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self.0.kind, TypeKind::Function { .. })
    }

    pub fn is_type(&self) -> bool {
        matches!(self.0.kind, TypeKind::TypeType)
    }

    /// Can this be iterated in a fixed order? (Only lists can.)
    pub fn is_ordered(&self) -> bool {
        matches!(self.0.kind, TypeKind::List)
    }

    pub fn is_optional(&self) -> bool {
        matches!(self.0.kind, TypeKind::Maybe)
    }

    pub fn has_fields(&self) -> bool {
        matches!(self.0.kind, TypeKind::Record(_))
    }

    /// Does a value of this type contain files, directly or transitively?
    pub fn has_files(&self) -> bool {
        match &self.0.kind {
            TypeKind::File(_) => true,
            TypeKind::List | TypeKind::Maybe => self.0.params[0].has_files(),
            TypeKind::Record(fields) => fields.values().any(Type::has_files),
            _ => false,
        }
    }

    /// Does a value of this type contain output files?
    pub fn has_output(&self) -> bool {
        match &self.0.kind {
            TypeKind::File(tag) => *tag == FileTag::Output,
            TypeKind::List | TypeKind::Maybe => self.0.params[0].has_output(),
            TypeKind::Record(fields) => fields.values().any(Type::has_output),
            _ => false,
        }
    }

    /// The tag on a `file` type, if this is one.
    pub fn file_tag(&self) -> Option<FileTag> {
        match self.0.kind {
            TypeKind::File(tag) => Some(tag),
            _ => None,
        }
    }

    /// Field types of a record type.
    pub fn fields(&self) -> Option<&IndexMap<String, Type>> {
        match &self.0.kind {
            TypeKind::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Parameter and result types of a function type.
    pub fn signature(&self) -> Option<(&[Type], &Type)> {
        match &self.0.kind {
            TypeKind::Function { params, result } => Some((params, result)),
            _ => None,
        }
    }

    /// Element type of a list or maybe type.
    pub fn element_type(&self) -> Option<&Type> {
        match self.0.kind {
            TypeKind::List | TypeKind::Maybe => self.0.params.first(),
            _ => None,
        }
    }

    /// Is this `list[t]` for the given element type (or a supertype of it)?
    pub fn is_list_of(&self, t: &Type) -> bool {
        self.is_ordered() && t.is_subtype(&self.0.params[0])
    }

    // ------------------------------------------------------------------
    // Subtyping
    // ------------------------------------------------------------------

    pub fn is_subtype(&self, other: &Type) -> bool {
        if self == other {
            return true;
        }
        match (&self.0.kind, &other.0.kind) {
            // An untagged file works wherever a tagged one is required, and
            // vice versa; only `file[in]` and `file[out]` exclude each other.
            (TypeKind::File(a), TypeKind::File(b)) => {
                a == b || *a == FileTag::Any || *b == FileTag::Any
            }
            (TypeKind::List, TypeKind::List) | (TypeKind::Maybe, TypeKind::Maybe) => {
                self.0.params[0].is_subtype(&other.0.params[0])
            }
            (TypeKind::Record(sub), TypeKind::Record(sup)) => sup
                .iter()
                .all(|(name, t)| sub.get(name).is_some_and(|s| s.is_subtype(t))),
            _ => false,
        }
    }

    pub fn is_supertype(&self, other: &Type) -> bool {
        other.is_subtype(self)
    }

    /// Error unless `self` is usable where `expected` is required.
    pub fn check_subtype(&self, expected: &Type, src: &SourceRange) -> Result<(), FabError> {
        if self.is_subtype(expected) {
            Ok(())
        } else {
            Err(FabError::wrong_type(self.str(), expected.str(), src.clone()))
        }
    }
}

// ============================================================================
// The interning context
// ============================================================================

/// Owner and interner of all [`Type`] objects in a run.
///
/// The table is append-only and used from a single thread; handles returned
/// from it stay valid for the life of the context.
pub struct TypeContext {
    table: RefCell<HashMap<String, Type>>,
    nil: Type,
    boolean: Type,
    integer: Type,
    string: Type,
    type_type: Type,
    file: Type,
    input_file: Type,
    output_file: Type,
}

impl fmt::Debug for TypeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeContext")
            .field("interned", &self.table.borrow().len())
            .finish()
    }
}

fn primitive(name: &str, kind: TypeKind) -> Type {
    Type(Rc::new(TypeData {
        name: name.to_string(),
        params: Vec::new(),
        kind,
        canonical: name.to_string(),
    }))
}

impl Default for TypeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeContext {
    pub fn new() -> Self {
        let nil = primitive("nil", TypeKind::Nil);
        let boolean = primitive("bool", TypeKind::Boolean);
        let integer = primitive("int", TypeKind::Integer);
        let string = primitive("string", TypeKind::Str);
        let type_type = primitive("type", TypeKind::TypeType);
        let file = primitive("file", TypeKind::File(FileTag::Any));
        let input_file = Type(Rc::new(TypeData {
            name: "file".to_string(),
            params: Vec::new(),
            kind: TypeKind::File(FileTag::Input),
            canonical: "file[in]".to_string(),
        }));
        let output_file = Type(Rc::new(TypeData {
            name: "file".to_string(),
            params: Vec::new(),
            kind: TypeKind::File(FileTag::Output),
            canonical: "file[out]".to_string(),
        }));

        let mut table = HashMap::new();
        for t in [
            &nil,
            &boolean,
            &integer,
            &string,
            &type_type,
            &file,
            &input_file,
            &output_file,
        ] {
            table.insert(t.str().to_string(), (*t).clone());
        }

        Self {
            table: RefCell::new(table),
            nil,
            boolean,
            integer,
            string,
            type_type,
            file,
            input_file,
            output_file,
        }
    }

    fn intern(&self, build: impl FnOnce() -> TypeData) -> Type {
        let data = build();
        if let Some(existing) = self.table.borrow().get(&data.canonical) {
            return existing.clone();
        }
        let key = data.canonical.clone();
        let t = Type(Rc::new(data));
        self.table.borrow_mut().insert(key, t.clone());
        t
    }

    // ------------------------------------------------------------------
    // Eagerly constructed types
    // ------------------------------------------------------------------

    pub fn nil_type(&self) -> Type {
        self.nil.clone()
    }

    pub fn boolean_type(&self) -> Type {
        self.boolean.clone()
    }

    pub fn integer_type(&self) -> Type {
        self.integer.clone()
    }

    pub fn string_type(&self) -> Type {
        self.string.clone()
    }

    pub fn type_type(&self) -> Type {
        self.type_type.clone()
    }

    pub fn file_type(&self) -> Type {
        self.file.clone()
    }

    pub fn input_file_type(&self) -> Type {
        self.input_file.clone()
    }

    pub fn output_file_type(&self) -> Type {
        self.output_file.clone()
    }

    pub fn file_type_tagged(&self, tag: FileTag) -> Type {
        match tag {
            FileTag::Any => self.file_type(),
            FileTag::Input => self.input_file_type(),
            FileTag::Output => self.output_file_type(),
        }
    }

    /// `list[file]`: the type of most build inputs and outputs.
    pub fn file_list_type(&self) -> Type {
        self.list_of(&self.file)
    }

    // ------------------------------------------------------------------
    // Parameterized constructors
    // ------------------------------------------------------------------

    pub fn list_of(&self, element: &Type) -> Type {
        self.intern(|| TypeData {
            name: "list".to_string(),
            params: vec![element.clone()],
            kind: TypeKind::List,
            canonical: format!("list[{element}]"),
        })
    }

    pub fn maybe(&self, element: &Type) -> Type {
        self.intern(|| TypeData {
            name: "maybe".to_string(),
            params: vec![element.clone()],
            kind: TypeKind::Maybe,
            canonical: format!("maybe[{element}]"),
        })
    }

    /// A record type. Field order is irrelevant to identity: fields are
    /// sorted by name before interning.
    pub fn record(&self, fields: impl IntoIterator<Item = (String, Type)>) -> Type {
        let mut sorted: Vec<(String, Type)> = fields.into_iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        sorted.dedup_by(|a, b| a.0 == b.0);
        let fields: IndexMap<String, Type> = sorted.into_iter().collect();

        let rendered = fields
            .iter()
            .map(|(name, t)| format!("{name}:{t}"))
            .collect::<Vec<_>>()
            .join(", ");

        self.intern(|| TypeData {
            name: "record".to_string(),
            params: Vec::new(),
            kind: TypeKind::Record(fields),
            canonical: format!("record[{rendered}]"),
        })
    }

    pub fn function(&self, params: &[Type], result: &Type) -> Type {
        let rendered = params
            .iter()
            .map(Type::str)
            .collect::<Vec<_>>()
            .join(", ");
        self.intern(|| TypeData {
            name: "function".to_string(),
            params: params.to_vec(),
            kind: TypeKind::Function {
                params: params.to_vec(),
                result: result.clone(),
            },
            canonical: format!("({rendered}) -> {result}"),
        })
    }

    /// Look up a type by source-level name.
    ///
    /// `params` are the bracketed arguments (`list[file]` has one). Returns
    /// `None` for names with no meaning in the type language.
    pub fn find(&self, name: &str, params: &[Type]) -> Option<Type> {
        match (name, params) {
            ("nil", []) => Some(self.nil_type()),
            ("bool", []) => Some(self.boolean_type()),
            ("int", []) => Some(self.integer_type()),
            ("string", []) => Some(self.string_type()),
            ("type", []) => Some(self.type_type()),
            ("file", []) => Some(self.file_type()),
            ("list", [element]) => Some(self.list_of(element)),
            ("maybe", [element]) => Some(self.maybe(element)),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Supremum
    // ------------------------------------------------------------------

    /// Least upper bound of two types, or `nil` if they are incomparable.
    pub fn supertype_of(&self, a: &Type, b: &Type) -> Type {
        if a == b {
            return a.clone();
        }
        // Any two file types join at the untagged file type.
        if a.file_tag().is_some() && b.file_tag().is_some() {
            return self.file_type();
        }
        if b.is_subtype(a) {
            return a.clone();
        }
        if a.is_subtype(b) {
            return b.clone();
        }
        match (&a.0.kind, &b.0.kind) {
            (TypeKind::List, TypeKind::List) => {
                let element = self.supertype_of(&a.0.params[0], &b.0.params[0]);
                if element.is_nil() {
                    self.nil_type()
                } else {
                    self.list_of(&element)
                }
            }
            (TypeKind::Maybe, TypeKind::Maybe) => {
                let element = self.supertype_of(&a.0.params[0], &b.0.params[0]);
                if element.is_nil() {
                    self.nil_type()
                } else {
                    self.maybe(&element)
                }
            }
            _ => self.nil_type(),
        }
    }

    /// Fold of pairwise supertype over any number of types; `nil` if empty.
    pub fn supertype<'t>(&self, types: impl IntoIterator<Item = &'t Type>) -> Type {
        let mut iter = types.into_iter();
        let Some(first) = iter.next() else {
            return self.nil_type();
        };
        iter.fold(first.clone(), |acc, t| self.supertype_of(&acc, t))
    }

    // ------------------------------------------------------------------
    // Operator typing rules
    // ------------------------------------------------------------------

    /// Result type of `lhs + rhs`, or `None` if unsupported.
    pub fn on_add(&self, lhs: &Type, rhs: &Type) -> Option<Type> {
        match (&lhs.0.kind, &rhs.0.kind) {
            (TypeKind::Integer, TypeKind::Integer) => Some(self.integer_type()),
            (TypeKind::Str, TypeKind::Str) => Some(self.string_type()),
            // Appending to / prefixing a file name.
            (TypeKind::File(_), TypeKind::Str) => Some(lhs.clone()),
            (TypeKind::Str, TypeKind::File(_)) => Some(rhs.clone()),
            (TypeKind::List, TypeKind::List) => {
                let element = self.supertype_of(&lhs.0.params[0], &rhs.0.params[0]);
                (!element.is_nil()).then(|| self.list_of(&element))
            }
            // list[T] + T is a scalar add iff T supports add with the
            // element type.
            (TypeKind::List, _) => self
                .on_add(&lhs.0.params[0], rhs)
                .map(|element| self.list_of(&element)),
            (_, TypeKind::List) => self
                .on_add(lhs, &rhs.0.params[0])
                .map(|element| self.list_of(&element)),
            _ => None,
        }
    }

    /// Result type of `lhs * rhs` / `lhs / rhs`, or `None` if unsupported.
    pub fn on_multiply(&self, lhs: &Type, rhs: &Type) -> Option<Type> {
        match (&lhs.0.kind, &rhs.0.kind) {
            (TypeKind::Integer, TypeKind::Integer) => Some(self.integer_type()),
            _ => None,
        }
    }

    /// Result type of `elem :: list`, or `None` if unsupported.
    pub fn on_prefix_with(&self, list: &Type, elem: &Type) -> Option<Type> {
        match &list.0.kind {
            TypeKind::List => {
                let element = self.supertype_of(&list.0.params[0], elem);
                (!element.is_nil()).then(|| self.list_of(&element))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod interning {
        use super::*;

        #[test]
        fn same_name_and_params_is_same_object() {
            let ctx = TypeContext::new();
            let a = ctx.list_of(&ctx.integer_type());
            let b = ctx.list_of(&ctx.integer_type());
            assert_eq!(a, b);
            assert!(Rc::ptr_eq(&a.0, &b.0));
        }

        #[test]
        fn record_field_order_is_irrelevant() {
            let ctx = TypeContext::new();
            let a = ctx.record(vec![
                ("a".to_string(), ctx.integer_type()),
                ("b".to_string(), ctx.string_type()),
            ]);
            let b = ctx.record(vec![
                ("b".to_string(), ctx.string_type()),
                ("a".to_string(), ctx.integer_type()),
            ]);
            assert_eq!(a, b);
        }

        #[test]
        fn find_resolves_primitives() {
            let ctx = TypeContext::new();
            assert_eq!(ctx.find("int", &[]), Some(ctx.integer_type()));
            assert_eq!(ctx.find("file", &[]), Some(ctx.file_type()));
            assert_eq!(ctx.find("no_such_type", &[]), None);
        }

        #[test]
        fn canonical_forms() {
            let ctx = TypeContext::new();
            let files = ctx.list_of(&ctx.input_file_type());
            assert_eq!(files.str(), "list[file[in]]");
            let rec = ctx.record(vec![
                ("b".to_string(), ctx.string_type()),
                ("a".to_string(), ctx.integer_type()),
            ]);
            assert_eq!(rec.str(), "record[a:int, b:string]");
            let f = ctx.function(&[ctx.integer_type()], &ctx.integer_type());
            assert_eq!(f.str(), "(int) -> int");
        }
    }

    mod subtyping {
        use super::*;

        #[test]
        fn reflexive() {
            let ctx = TypeContext::new();
            for t in [
                ctx.nil_type(),
                ctx.integer_type(),
                ctx.list_of(&ctx.string_type()),
                ctx.maybe(&ctx.file_type()),
            ] {
                assert!(t.is_subtype(&t), "{t} should be a subtype of itself");
            }
        }

        #[test]
        fn tagged_files_are_subtypes_of_file() {
            let ctx = TypeContext::new();
            assert!(ctx.input_file_type().is_subtype(&ctx.file_type()));
            assert!(ctx.output_file_type().is_subtype(&ctx.file_type()));
            assert!(!ctx.input_file_type().is_subtype(&ctx.output_file_type()));
            assert!(!ctx.output_file_type().is_subtype(&ctx.input_file_type()));
        }

        #[test]
        fn untagged_files_satisfy_tagged_requirements() {
            let ctx = TypeContext::new();
            assert!(ctx.file_type().is_subtype(&ctx.input_file_type()));
            assert!(ctx.file_type().is_subtype(&ctx.output_file_type()));
        }

        #[test]
        fn lists_are_covariant() {
            let ctx = TypeContext::new();
            let wide = ctx.record(vec![
                ("f".to_string(), ctx.integer_type()),
                ("g".to_string(), ctx.boolean_type()),
            ]);
            let narrow = ctx.record(vec![("f".to_string(), ctx.integer_type())]);
            let sub = ctx.list_of(&wide);
            let sup = ctx.list_of(&narrow);
            assert!(sub.is_subtype(&sup));
            assert!(!sup.is_subtype(&sub));
        }

        #[test]
        fn records_use_width_and_depth() {
            let ctx = TypeContext::new();
            let wide = ctx.record(vec![
                ("f".to_string(), ctx.input_file_type()),
                ("g".to_string(), ctx.boolean_type()),
            ]);
            let narrow = ctx.record(vec![("f".to_string(), ctx.file_type())]);
            assert!(wide.is_subtype(&narrow));
            assert!(!narrow.is_subtype(&wide));

            let mismatched = ctx.record(vec![("f".to_string(), ctx.integer_type())]);
            assert!(!wide.is_subtype(&mismatched));
        }

        #[test]
        fn unrelated_types_are_not_subtypes() {
            let ctx = TypeContext::new();
            assert!(!ctx.integer_type().is_subtype(&ctx.string_type()));
            assert!(!ctx
                .list_of(&ctx.integer_type())
                .is_subtype(&ctx.integer_type()));
        }
    }

    mod supremum {
        use super::*;

        #[test]
        fn supertype_is_an_upper_bound() {
            let ctx = TypeContext::new();
            let a = ctx.input_file_type();
            let b = ctx.output_file_type();
            let sup = ctx.supertype_of(&a, &b);
            assert!(a.is_subtype(&sup));
            assert!(b.is_subtype(&sup));
            assert_eq!(sup, ctx.file_type());
        }

        #[test]
        fn supertype_of_lists_joins_elements() {
            let ctx = TypeContext::new();
            let a = ctx.list_of(&ctx.input_file_type());
            let b = ctx.list_of(&ctx.output_file_type());
            let sup = ctx.supertype_of(&a, &b);
            assert_eq!(sup, ctx.list_of(&ctx.file_type()));
        }

        #[test]
        fn incomparable_types_join_to_nil() {
            let ctx = TypeContext::new();
            let sup = ctx.supertype_of(&ctx.integer_type(), &ctx.string_type());
            assert!(sup.is_nil());
        }

        #[test]
        fn fold_over_empty_is_nil() {
            let ctx = TypeContext::new();
            assert!(ctx.supertype(std::iter::empty()).is_nil());
        }

        #[test]
        fn fold_over_elements() {
            let ctx = TypeContext::new();
            let types = [ctx.input_file_type(), ctx.file_type(), ctx.input_file_type()];
            assert_eq!(ctx.supertype(types.iter()), ctx.file_type());
        }
    }

    mod capabilities {
        use super::*;

        #[test]
        fn only_lists_are_ordered() {
            let ctx = TypeContext::new();
            assert!(ctx.list_of(&ctx.integer_type()).is_ordered());
            assert!(!ctx.integer_type().is_ordered());
            assert!(!ctx.record(vec![]).is_ordered());
        }

        #[test]
        fn has_files_recurses_into_containers() {
            let ctx = TypeContext::new();
            assert!(ctx.file_type().has_files());
            assert!(ctx.list_of(&ctx.input_file_type()).has_files());
            assert!(ctx
                .record(vec![("out".to_string(), ctx.output_file_type())])
                .has_files());
            assert!(!ctx.list_of(&ctx.integer_type()).has_files());
        }

        #[test]
        fn has_output_requires_an_output_tag() {
            let ctx = TypeContext::new();
            assert!(ctx.output_file_type().has_output());
            assert!(ctx.list_of(&ctx.output_file_type()).has_output());
            assert!(!ctx.input_file_type().has_output());
            assert!(!ctx.file_type().has_output());
        }
    }

    mod operator_rules {
        use super::*;

        #[test]
        fn int_plus_int_is_int() {
            let ctx = TypeContext::new();
            assert_eq!(
                ctx.on_add(&ctx.integer_type(), &ctx.integer_type()),
                Some(ctx.integer_type())
            );
        }

        #[test]
        fn list_plus_list_joins_elements() {
            let ctx = TypeContext::new();
            let a = ctx.list_of(&ctx.input_file_type());
            let b = ctx.list_of(&ctx.output_file_type());
            assert_eq!(ctx.on_add(&a, &b), Some(ctx.list_of(&ctx.file_type())));
        }

        #[test]
        fn list_plus_scalar_is_scalar_add() {
            let ctx = TypeContext::new();
            let strings = ctx.list_of(&ctx.string_type());
            assert_eq!(ctx.on_add(&strings, &ctx.string_type()), Some(strings.clone()));
            // int has no add rule against string, so neither does the list
            assert_eq!(ctx.on_add(&strings, &ctx.integer_type()), None);
        }

        #[test]
        fn file_plus_string_is_file() {
            let ctx = TypeContext::new();
            assert_eq!(
                ctx.on_add(&ctx.input_file_type(), &ctx.string_type()),
                Some(ctx.input_file_type())
            );
        }

        #[test]
        fn multiply_is_integers_only() {
            let ctx = TypeContext::new();
            assert_eq!(
                ctx.on_multiply(&ctx.integer_type(), &ctx.integer_type()),
                Some(ctx.integer_type())
            );
            assert_eq!(ctx.on_multiply(&ctx.string_type(), &ctx.string_type()), None);
        }

        #[test]
        fn prefix_updates_the_element_type() {
            let ctx = TypeContext::new();
            let ins = ctx.list_of(&ctx.input_file_type());
            assert_eq!(
                ctx.on_prefix_with(&ins, &ctx.output_file_type()),
                Some(ctx.list_of(&ctx.file_type()))
            );
            assert_eq!(ctx.on_prefix_with(&ctx.integer_type(), &ctx.integer_type()), None);
        }
    }
}
