//! The null backend: consumes a DAG and emits nothing. Useful for checking
//! that a fabfile evaluates without writing any build files.

use std::io::Write;

use fabrique_core::{FabError, Reporter};

use super::Backend;
use crate::dag::Dag;

pub struct NullBackend;

impl Backend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn default_filename(&self) -> &'static str {
        "/dev/null"
    }

    fn process(
        &self,
        _dag: &Dag,
        _out: &mut dyn Write,
        _reporter: &mut Reporter,
    ) -> Result<(), FabError> {
        Ok(())
    }
}
