//! All error types for the resmerge crate.
//!
//! These are returned from all fallible operations (parsing, diffing,
//! reconstruction, scanning). Expected conditions — malformed XML, a missing
//! root element, an unreadable mapping document — come back as `Err` values;
//! nothing in the library panics on user input.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("missing <resources> root element")]
    MissingRoot,

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid resource: {0}")]
    InvalidResource(String),

    #[error("directory access error: {0}")]
    DirectoryAccess(String),
}
