//! Fatal error conditions surfaced while setting up a light-incidence run.
//!
//! Lookups that miss the visibility table are not errors: a segment outside
//! the tabulated envelope simply contributes nothing.

use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Reading input data (HDF5 tables, TOML files) failed.
    Load(String),
    /// Inputs were read successfully but are inconsistent.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Load  (msg) => write!(f, "failed to load input data: {}", msg),
            Error::Config(msg) => write!(f, "inconsistent configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<hdf5::Error> for Error {
    fn from(e: hdf5::Error) -> Self { Error::Load(e.to_string()) }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self { Error::Load(e.to_string()) }
}
