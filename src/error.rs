use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the universe and its rule tables.
///
/// Stepping never fails; every variant here is raised while building a
/// universe, a rule table or a particle. Each variant carries enough context
/// to be actionable.
#[derive(Debug, Error)]
pub enum Error {
    /// A universe or rule table was constructed with invalid settings
    /// (non-positive grid dimensions, malformed rule patterns, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),
}
