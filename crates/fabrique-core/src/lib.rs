//! Core infrastructure for fabrique.
//!
//! This crate provides the pieces shared by the parser and the evaluator:
//! - Source locations and ranges attached to every token, node, and value
//! - Diagnostics: error reports, severities, and the append-only reporter
//! - The structural type system with its interning context

pub mod diag;
pub mod source;
pub mod types;

pub use diag::{ErrorReport, FabError, Reporter, Severity};
pub use source::{HasSource, SourceLocation, SourceRange};
pub use types::{FileTag, Type, TypeContext};
