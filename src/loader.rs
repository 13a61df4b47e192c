//! Reads a `.bas` program from disk into an [`Interpreter`]. `LOAD`/`SAVE` are not
//! BASIC statements this crate implements; this is the CLI's file I/O instead.

use std::error::Error;
use std::fmt::{self, Display};
use std::fs;
use std::path::Path;

use log::debug;

use crate::interpreter::Interpreter;

#[derive(Debug)]
pub struct LoadError {
    pub path: String,
    pub source: std::io::Error,
}

impl Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not read program '{}': {}", self.path, self.source)
    }
}

impl Error for LoadError {}

/// Read `path` and feed its lines into a fresh [`Interpreter`].
pub fn load_file(path: impl AsRef<Path>) -> Result<Interpreter, Box<dyn Error>> {
    let path = path.as_ref();
    debug!("loading program from '{}'", path.display());
    let source = fs::read_to_string(path).map_err(|source| LoadError {
        path: path.display().to_string(),
        source,
    })?;

    let mut interp = Interpreter::new();
    interp.load_source(&source)?;
    Ok(interp)
}
