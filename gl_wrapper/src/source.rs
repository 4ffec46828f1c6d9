use std::ffi::CString;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::api::Stage;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not read shader source {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0} shader source is empty")]
    Empty(Stage),
    #[error("{0} shader source contains a NUL byte")]
    InteriorNul(Stage),
}

/// Reads a whole shader file into memory.
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<String, SourceError> {
    let path = path.as_ref();

    std::fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_owned(),
        source,
    })
}

/// Turns stage text into the form handed to the driver.
pub(crate) fn to_c_source(stage: Stage, text: &str) -> Result<CString, SourceError> {
    if text.trim().is_empty() {
        return Err(SourceError::Empty(stage));
    }

    CString::new(text).map_err(|_| SourceError::InteriorNul(stage))
}
