//! Lexical scopes.
//!
//! A scope is a cons-list of frames. Entering a block pushes a frame;
//! a closure captures the whole chain by value, which is cheap because the
//! frames themselves are shared. Names bind at most once per frame; lookup
//! walks outward to the first hit.

use std::cell::RefCell;
use std::rc::Rc;

use fabrique_core::{FabError, SourceRange};
use indexmap::IndexMap;

use crate::dag::ValuePtr;

#[derive(Debug)]
struct Frame {
    bindings: RefCell<IndexMap<String, ValuePtr>>,
    parent: Option<Rc<Frame>>,
}

/// A handle to the innermost frame of a scope chain.
#[derive(Debug, Clone)]
pub struct Scope {
    frame: Rc<Frame>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::root()
    }
}

impl Scope {
    /// A fresh chain with a single empty frame.
    pub fn root() -> Self {
        Self {
            frame: Rc::new(Frame {
                bindings: RefCell::new(IndexMap::new()),
                parent: None,
            }),
        }
    }

    /// A new innermost frame over this chain.
    pub fn child(&self) -> Self {
        Self {
            frame: Rc::new(Frame {
                bindings: RefCell::new(IndexMap::new()),
                parent: Some(self.frame.clone()),
            }),
        }
    }

    /// Bind a name in the innermost frame.
    ///
    /// # Errors
    ///
    /// A name binds at most once per frame; rebinding is a semantic error.
    /// Shadowing a name from an outer frame is fine.
    pub fn define(
        &self,
        name: impl Into<String>,
        value: ValuePtr,
        src: &SourceRange,
    ) -> Result<(), FabError> {
        let name = name.into();
        let mut bindings = self.frame.bindings.borrow_mut();
        match bindings.entry(name) {
            indexmap::map::Entry::Occupied(entry) => Err(FabError::semantic(
                format!("'{}' is already defined in this scope", entry.key()),
                src.clone(),
            )),
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }

    /// Walk outward to the first binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<ValuePtr> {
        let mut frame = Some(&self.frame);
        while let Some(current) = frame {
            if let Some(value) = current.bindings.borrow().get(name) {
                return Some(value.clone());
            }
            frame = current.parent.as_ref();
        }
        None
    }

    /// Is `name` bound in the innermost frame?
    pub fn defined_locally(&self, name: &str) -> bool {
        self.frame.bindings.borrow().contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::Value;
    use fabrique_core::TypeContext;

    fn value(n: i64, ctx: &TypeContext) -> ValuePtr {
        Value::integer(n, ctx, SourceRange::none())
    }

    #[test]
    fn lookup_walks_outward() {
        let ctx = TypeContext::new();
        let outer = Scope::root();
        outer
            .define("x", value(1, &ctx), &SourceRange::none())
            .expect("define");
        let inner = outer.child();
        assert_eq!(inner.lookup("x").expect("x").as_int(), Some(1));
    }

    #[test]
    fn inner_frames_shadow_outer_ones() {
        let ctx = TypeContext::new();
        let outer = Scope::root();
        outer
            .define("x", value(1, &ctx), &SourceRange::none())
            .expect("define");
        let inner = outer.child();
        inner
            .define("x", value(2, &ctx), &SourceRange::none())
            .expect("shadow");
        assert_eq!(inner.lookup("x").expect("x").as_int(), Some(2));
        assert_eq!(outer.lookup("x").expect("x").as_int(), Some(1));
    }

    #[test]
    fn rebinding_in_one_frame_is_an_error() {
        let ctx = TypeContext::new();
        let scope = Scope::root();
        scope
            .define("x", value(1, &ctx), &SourceRange::none())
            .expect("define");
        let err = scope
            .define("x", value(2, &ctx), &SourceRange::none())
            .expect_err("rebind");
        assert!(err.to_string().contains("already defined"));
    }

    #[test]
    fn captured_chains_see_later_outer_bindings() {
        let ctx = TypeContext::new();
        let outer = Scope::root();
        let captured = outer.child();
        outer
            .define("late", value(3, &ctx), &SourceRange::none())
            .expect("define");
        assert_eq!(captured.lookup("late").expect("late").as_int(), Some(3));
    }
}
