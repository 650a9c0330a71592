//! Source positions.
//!
//! Every token, AST node, diagnostic, and DAG value carries a [`SourceRange`]
//! so errors and pretty-printed output can point back into the input. Ranges
//! are plain value types: cheap to clone, ordered, and never mutated after
//! construction. Line and column numbers are 1-based; `0` means "unknown",
//! which is what the distinguished [`SourceRange::none`] range uses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single point in a source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    pub filename: String,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(filename: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            filename: filename.into(),
            line,
            column,
        }
    }

    /// True if this location points at real input.
    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_known() {
            return write!(f, "(unknown)");
        }
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// A half-open region of a source file: `begin` inclusive, `end` exclusive.
///
/// Invariant: `end >= begin` whenever both are known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    pub begin: SourceLocation,
    pub end: SourceLocation,
}

impl SourceRange {
    pub fn new(begin: SourceLocation, end: SourceLocation) -> Self {
        debug_assert!(
            !begin.is_known() || !end.is_known() || (begin.filename == end.filename),
            "source range spans files: {} vs {}",
            begin.filename,
            end.filename,
        );
        Self { begin, end }
    }

    /// The distinguished "nowhere" range, used for synthesized constructs.
    pub fn none() -> Self {
        Self::default()
    }

    /// True if this range points at real input.
    pub fn is_known(&self) -> bool {
        self.begin.is_known()
    }

    /// The smallest range covering both operands.
    ///
    /// If either side is the "nowhere" range, the other side wins outright.
    pub fn over(a: &impl HasSource, b: &impl HasSource) -> Self {
        Self::span(a.source(), b.source())
    }

    /// The smallest range covering both ranges.
    pub fn span(a: SourceRange, b: SourceRange) -> Self {
        match (a.is_known(), b.is_known()) {
            (false, _) => b,
            (_, false) => a,
            (true, true) => {
                let begin = if a.begin <= b.begin { a.begin } else { b.begin };
                let end = if a.end >= b.end { a.end } else { b.end };
                Self { begin, end }
            }
        }
    }
}

impl std::error::Error for SourceRange {}

impl fmt::Display for SourceRange {
    /// Writes `file:line:col`, or `file:line:col-line:col` for multi-point
    /// ranges.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_known() {
            return write!(f, "(unknown)");
        }
        write!(f, "{}", self.begin)?;
        if self.end.is_known() && self.end != self.begin {
            write!(f, "-{}:{}", self.end.line, self.end.column)?;
        }
        Ok(())
    }
}

/// Anything that knows where it came from.
pub trait HasSource {
    fn source(&self) -> SourceRange;
}

impl HasSource for SourceRange {
    fn source(&self) -> SourceRange {
        self.clone()
    }
}
