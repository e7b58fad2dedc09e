use thiserror::Error;

/// Errors raised by user-entered filter input
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid search pattern '{pattern}': {source}")]
    InvalidHighlight {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid package search '{pattern}': {source}")]
    InvalidPackageSearch {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
