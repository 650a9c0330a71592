//! Diagnostics: error reports, severities, and the reporter sink.
//!
//! Fabrique separates two things that are often conflated:
//!
//! - [`FabError`] is the error *value* that evaluation and parsing functions
//!   return. Every kind in the error taxonomy (syntax, semantic, wrong type,
//!   assertion, OS) is a variant of this one enum, so callers match on a
//!   single type and `?` composes across subsystems.
//! - [`ErrorReport`] is the user-facing *record* of a problem, collected into
//!   the append-only [`Reporter`]. Fatal errors become reports at a small
//!   number of designated boundaries (top-level binding, call frame, foreach
//!   iteration); warnings and notes are only ever reports and never abort.
//!
//! Reports render as `<file>:<line>:<col>: <severity>: <message>` with an
//! optional indented detail block.

use std::fmt;

use thiserror::Error;

use crate::source::SourceRange;

// ============================================================================
// Severity and reports
// ============================================================================

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{name}")
    }
}

/// A single user-facing diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
    pub source: SourceRange,
    pub severity: Severity,
    /// Optional longer explanation, rendered as an indented block.
    pub detail: Option<String>,
}

impl ErrorReport {
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        source: SourceRange,
        detail: Option<String>,
    ) -> Self {
        Self {
            message: message.into(),
            source,
            severity,
            detail,
        }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.source.is_known() {
            write!(f, "{}: ", self.source)?;
        }
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(detail) = &self.detail {
            for line in detail.lines() {
                write!(f, "\n    {line}")?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Reporter
// ============================================================================

/// Append-only sink for diagnostics, owned by a run.
#[derive(Debug, Default)]
pub struct Reporter {
    reports: Vec<ErrorReport>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, report: ErrorReport) {
        self.reports.push(report);
    }

    pub fn error(&mut self, message: impl Into<String>, source: SourceRange) {
        self.report(ErrorReport::new(Severity::Error, message, source, None));
    }

    pub fn error_with_detail(
        &mut self,
        message: impl Into<String>,
        source: SourceRange,
        detail: impl Into<String>,
    ) {
        self.report(ErrorReport::new(
            Severity::Error,
            message,
            source,
            Some(detail.into()),
        ));
    }

    pub fn warning(&mut self, message: impl Into<String>, source: SourceRange) {
        self.report(ErrorReport::new(Severity::Warning, message, source, None));
    }

    pub fn note(&mut self, message: impl Into<String>, source: SourceRange) {
        self.report(ErrorReport::new(Severity::Note, message, source, None));
    }

    /// Record a fatal error value as a diagnostic.
    pub fn record(&mut self, err: &FabError) {
        self.report(err.to_report());
    }

    pub fn has_errors(&self) -> bool {
        self.reports
            .iter()
            .any(|r| r.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.severity == Severity::Error)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorReport> {
        self.reports.iter()
    }

    pub fn into_reports(self) -> Vec<ErrorReport> {
        self.reports
    }
}

// ============================================================================
// Fatal errors
// ============================================================================

/// The unified fatal-error type.
///
/// One variant per kind in the error taxonomy. Evaluation and parsing
/// functions return `Result<T, FabError>`; the designated boundaries convert
/// errors into [`ErrorReport`]s and decide whether the run continues.
#[derive(Debug, Error)]
pub enum FabError {
    /// The parser could not recognize the input.
    #[error("{message}")]
    Syntax {
        message: String,
        source: SourceRange,
        /// Usually the expected-token set.
        detail: Option<String>,
    },

    /// Valid parse, invalid meaning.
    #[error("{message}")]
    Semantic { message: String, source: SourceRange },

    /// An expression's type is not a subtype of the required type.
    #[error("wrong type: have {found}, expected {expected}")]
    WrongType {
        found: String,
        expected: String,
        source: SourceRange,
    },

    /// An internal invariant was violated; indicates a bug.
    #[error("assertion failed: {message}")]
    Assertion { message: String, source: SourceRange },

    /// Filesystem or plugin-load failure.
    #[error("{message}")]
    Os { message: String, source: SourceRange },
}

impl FabError {
    pub fn syntax(message: impl Into<String>, source: SourceRange) -> Self {
        FabError::Syntax {
            message: message.into(),
            source,
            detail: None,
        }
    }

    pub fn syntax_with_detail(
        message: impl Into<String>,
        source: SourceRange,
        detail: impl Into<String>,
    ) -> Self {
        FabError::Syntax {
            message: message.into(),
            source,
            detail: Some(detail.into()),
        }
    }

    pub fn semantic(message: impl Into<String>, source: SourceRange) -> Self {
        FabError::Semantic {
            message: message.into(),
            source,
        }
    }

    pub fn wrong_type(
        found: impl Into<String>,
        expected: impl Into<String>,
        source: SourceRange,
    ) -> Self {
        FabError::WrongType {
            found: found.into(),
            expected: expected.into(),
            source,
        }
    }

    pub fn assertion(message: impl Into<String>, source: SourceRange) -> Self {
        FabError::Assertion {
            message: message.into(),
            source,
        }
    }

    pub fn os(message: impl Into<String>, source: SourceRange) -> Self {
        FabError::Os {
            message: message.into(),
            source,
        }
    }

    /// Where the problem is.
    pub fn source_range(&self) -> &SourceRange {
        match self {
            FabError::Syntax { source, .. }
            | FabError::Semantic { source, .. }
            | FabError::WrongType { source, .. }
            | FabError::Assertion { source, .. }
            | FabError::Os { source, .. } => source,
        }
    }

    /// Stable process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            FabError::Syntax { .. } => 1,
            FabError::Semantic { .. } | FabError::WrongType { .. } => 2,
            FabError::Os { .. } => 3,
            FabError::Assertion { .. } => 70,
        }
    }

    /// The user-facing record of this error.
    pub fn to_report(&self) -> ErrorReport {
        let detail = match self {
            FabError::Syntax { detail, .. } => detail.clone(),
            _ => None,
        };
        ErrorReport::new(
            Severity::Error,
            self.to_string(),
            self.source_range().clone(),
            detail,
        )
    }
}
