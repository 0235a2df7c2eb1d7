use thiserror::Error;

/// Fatal outcomes of a validation run. Rejected lines are never errors;
/// they end up in the report's invalid list.
#[derive(Error, Debug)]
pub enum AfdError {
    #[error("Failed to read AFD source: {0}")]
    Read(#[from] std::io::Error),

    #[error("AFD source too large: more than {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("Unknown layout '{0}': expected 671 or 1510")]
    UnknownLayout(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
