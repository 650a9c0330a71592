//! File values.
//!
//! A file is `(subdirectory, filename, absolute?, generated?)`. Source files
//! resolve under `${srcroot}`, generated files under `${buildroot}`; the
//! backends substitute those roots when they emit build files.
//!
//! Lifecycle: a file is declared (as a source file, or already generated),
//! may be flipped to generated while builds are being assembled, and freezes
//! the moment a build step references it. Flipping after that point, or
//! flipping an absolute-path file, is an error.

use std::cell::Cell;

use fabrique_core::{FabError, SourceRange, Type, TypeContext};

/// Joins two path segments with `/`, ignoring empty halves.
pub fn join_path(a: &str, b: &str) -> String {
    if a.is_empty() {
        b.to_string()
    } else if b.is_empty() {
        a.to_string()
    } else {
        format!("{}/{}", a.trim_end_matches('/'), b)
    }
}

#[derive(Debug)]
pub struct File {
    ty: Type,
    src: SourceRange,
    /// Name within the subdirectory (the whole path when absolute).
    name: String,
    /// Directory relative to the source root.
    subdirectory: String,
    absolute: bool,
    generated: Cell<bool>,
    /// Set once a build step uses this file; attributes freeze here.
    referenced: Cell<bool>,
}

impl File {
    pub fn new(
        path: impl Into<String>,
        subdirectory: impl Into<String>,
        ty: Type,
        src: SourceRange,
    ) -> Self {
        let name = path.into();
        let absolute = name.starts_with('/');
        Self {
            ty,
            src,
            name,
            subdirectory: if absolute {
                String::new()
            } else {
                subdirectory.into()
            },
            absolute,
            generated: Cell::new(false),
            referenced: Cell::new(false),
        }
    }

    pub fn typ(&self) -> &Type {
        &self.ty
    }

    pub fn source(&self) -> &SourceRange {
        &self.src
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subdirectory(&self) -> &str {
        &self.subdirectory
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn generated(&self) -> bool {
        self.generated.get()
    }

    /// Root-relative filename: `subdirectory/name`.
    pub fn filename(&self) -> String {
        if self.absolute {
            self.name.clone()
        } else {
            join_path(&self.subdirectory, &self.name)
        }
    }

    /// Full name with the root spelled out for backends to substitute.
    pub fn full_name(&self) -> String {
        if self.absolute {
            return self.name.clone();
        }
        let root = if self.generated() {
            "${buildroot}"
        } else {
            "${srcroot}"
        };
        join_path(root, &self.filename())
    }

    /// The directory this file lives in, relative to its root.
    pub fn directory(&self) -> String {
        let filename = self.filename();
        match filename.rfind('/') {
            Some(i) => filename[..i].to_string(),
            None => ".".to_string(),
        }
    }

    /// Flip the source-vs-product flag. One-shot in the builder phase: once
    /// a build references this file the attribute is frozen.
    pub fn set_generated(&self, generated: bool, src: &SourceRange) -> Result<(), FabError> {
        if self.absolute && generated {
            return Err(FabError::semantic(
                "cannot generate a file with an absolute path",
                src.clone(),
            ));
        }
        if self.referenced.get() && generated != self.generated.get() {
            return Err(FabError::semantic(
                format!("file '{}' is already referenced by a build", self.filename()),
                src.clone(),
            ));
        }
        self.generated.set(generated);
        Ok(())
    }

    /// Freeze attributes: called when a build step takes this file.
    pub fn mark_referenced(&self) {
        self.referenced.set(true);
    }

    pub fn is_referenced(&self) -> bool {
        self.referenced.get()
    }

    /// A new file with `suffix` appended to the name. Subdirectory and the
    /// absolute flag carry over; the generated flag starts fresh.
    pub fn with_suffix(&self, suffix: &str, src: SourceRange) -> Self {
        Self {
            ty: self.ty.clone(),
            src,
            name: format!("{}{}", self.name, suffix),
            subdirectory: self.subdirectory.clone(),
            absolute: self.absolute,
            generated: Cell::new(false),
            referenced: Cell::new(false),
        }
    }

    /// A new file with `prefix` prepended to the name.
    pub fn with_prefix(&self, prefix: &str, src: SourceRange) -> Self {
        Self {
            ty: self.ty.clone(),
            src,
            name: format!("{}{}", prefix, self.name),
            subdirectory: self.subdirectory.clone(),
            absolute: self.absolute,
            generated: Cell::new(false),
            referenced: Cell::new(false),
        }
    }

    /// Field lookup: `name`, `subdir`, `fullname`, `generated`.
    pub fn field(&self, name: &str, ctx: &TypeContext) -> Option<super::ValuePtr> {
        use super::Value;
        let value = match name {
            "name" => Value::string(self.name.clone(), ctx, self.src.clone()),
            "subdir" => Value::string(self.subdirectory.clone(), ctx, self.src.clone()),
            "fullname" => Value::string(self.full_name(), ctx, self.src.clone()),
            "generated" => Value::boolean(self.generated(), ctx, self.src.clone()),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TypeContext {
        TypeContext::new()
    }

    fn file(path: &str, subdir: &str) -> File {
        let ctx = ctx();
        File::new(path, subdir, ctx.file_type(), SourceRange::none())
    }

    #[test]
    fn relative_files_resolve_under_srcroot() {
        let f = file("util.c", "lib");
        assert_eq!(f.filename(), "lib/util.c");
        assert_eq!(f.full_name(), "${srcroot}/lib/util.c");
        assert_eq!(f.directory(), "lib");
    }

    #[test]
    fn generated_files_resolve_under_buildroot() {
        let f = file("util.o", "lib");
        f.set_generated(true, &SourceRange::none()).expect("set");
        assert_eq!(f.full_name(), "${buildroot}/lib/util.o");
    }

    #[test]
    fn absolute_files_keep_their_path() {
        let f = file("/usr/include/stdio.h", "ignored");
        assert!(f.is_absolute());
        assert_eq!(f.filename(), "/usr/include/stdio.h");
        assert_eq!(f.full_name(), "/usr/include/stdio.h");
    }

    #[test]
    fn absolute_files_can_never_be_generated() {
        let f = file("/tmp/out", "");
        let err = f.set_generated(true, &SourceRange::none()).expect_err("err");
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn generated_freezes_after_a_build_reference() {
        let f = file("a.o", "");
        f.set_generated(true, &SourceRange::none()).expect("set");
        f.mark_referenced();
        // Re-asserting the same flag is fine; flipping it is not.
        f.set_generated(true, &SourceRange::none()).expect("idempotent");
        let err = f.set_generated(false, &SourceRange::none()).expect_err("err");
        assert!(err.to_string().contains("already referenced"));
    }

    #[test]
    fn suffix_and_prefix_derive_new_files() {
        let f = file("a.c", "src");
        let obj = f.with_suffix(".o", SourceRange::none());
        assert_eq!(obj.filename(), "src/a.c.o");
        assert!(!obj.generated());

        let pre = f.with_prefix("lib", SourceRange::none());
        assert_eq!(pre.filename(), "src/liba.c");
    }
}
