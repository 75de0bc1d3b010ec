use thiserror::Error;

/// Fatal construction-time errors.
///
/// Per the parser's error-handling contract, this is the only error type the
/// crate ever raises to a caller: once a [`crate::reader::LogReader`] is
/// constructed, all parsing failures are handled locally (resync) and never
/// surface. See [`crate::block_decoder`] and [`crate::fmt_prepass`] for the
/// local-recovery policy.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to memory-map {path:?}: {source}")]
    Map {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Crate's `Result` alias.
pub type Result<T> = std::result::Result<T, LogError>;
