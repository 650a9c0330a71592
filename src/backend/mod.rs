//! Backends: emitters that turn a [`Dag`] into build files.
//!
//! A backend is pure: it reads the DAG and writes to the stream it is
//! given, reporting anything noteworthy through the diagnostics sink. The
//! driver buffers backend output and only commits it to disk when the
//! backend succeeds, so a failing run never leaves a partial build file.

use std::io::Write;

use fabrique_core::{FabError, Reporter, SourceRange};

use crate::dag::{Dag, Value, ValuePtr};

mod dot;
mod make;
mod ninja;
mod null;

pub use dot::DotBackend;
pub use make::MakeBackend;
pub use ninja::NinjaBackend;
pub use null::NullBackend;

pub trait Backend {
    /// The name used to select this backend on the command line.
    fn name(&self) -> &'static str;

    /// The filename this backend writes when none is given.
    fn default_filename(&self) -> &'static str;

    /// Emit the DAG to `out`.
    fn process(
        &self,
        dag: &Dag,
        out: &mut dyn Write,
        reporter: &mut Reporter,
    ) -> Result<(), FabError>;
}

/// Look a backend up by its command-line name.
pub fn backend_by_name(name: &str) -> Option<Box<dyn Backend>> {
    match name {
        "make" => Some(Box::new(MakeBackend)),
        "ninja" => Some(Box::new(NinjaBackend)),
        "dot" => Some(Box::new(DotBackend)),
        "null" => Some(Box::new(NullBackend)),
        _ => None,
    }
}

/// Names accepted by [`backend_by_name`].
pub const BACKEND_NAMES: &[&str] = &["make", "ninja", "dot", "null"];

pub(crate) fn io_error(err: std::io::Error) -> FabError {
    FabError::os(format!("write failed: {err}"), SourceRange::none())
}

/// Can this named value be rendered as a plain build-file variable?
pub(crate) fn renderable_variable(value: &ValuePtr) -> bool {
    matches!(
        value.as_ref(),
        Value::Boolean { .. } | Value::Integer { .. } | Value::Str { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_advertised_backend_resolves() {
        for name in BACKEND_NAMES {
            let backend = backend_by_name(name).expect("backend");
            assert_eq!(&backend.name(), name);
        }
        assert!(backend_by_name("scons").is_none());
    }

    #[test]
    fn default_filenames_are_distinct() {
        let mut names: Vec<&str> = BACKEND_NAMES
            .iter()
            .filter_map(|n| backend_by_name(n))
            .map(|b| b.default_filename())
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BACKEND_NAMES.len());
    }
}
