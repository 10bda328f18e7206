/*
This code is part of the FlowPath hydrological analysis library.
Authors: FlowPath Development Team
Created: 11/02/2024
Last Modified: 29/05/2024
License: MIT
*/
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal failure classes of the catchment core. Query points falling
/// outside the catchment are not errors; see `ZoneQuery::Outside`.
#[derive(Error, Debug)]
pub enum FlowpathError {
    #[error("cannot access '{path}': {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse failure in '{file}': {reason}")]
    Parse { file: String, reason: String },

    #[error("capacity exceeded: {0}")]
    Capacity(String),

    #[error("bad catchment topology: {0}")]
    Topology(String),

    #[error("numerical failure: {0}")]
    Numerical(String),
}

impl FlowpathError {
    pub fn file_io(path: impl Into<PathBuf>, source: io::Error) -> FlowpathError {
        FlowpathError::FileIo {
            path: path.into(),
            source,
        }
    }

    pub fn parse(file: impl Into<String>, reason: impl Into<String>) -> FlowpathError {
        FlowpathError::Parse {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

/// Tools expose a `run()` signature whose error currency is
/// `std::io::Error`.
impl From<FlowpathError> for io::Error {
    fn from(e: FlowpathError) -> io::Error {
        let kind = match e {
            FlowpathError::FileIo { .. } => io::ErrorKind::NotFound,
            FlowpathError::Parse { .. } => io::ErrorKind::InvalidData,
            _ => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, e.to_string())
    }
}
