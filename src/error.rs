//! Error types for tristage.

use thiserror::Error;

/// Result type alias using tristage's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pipeline operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The peer of a link went away before end-of-stream was exchanged.
    #[error("link closed: {0}")]
    LinkClosed(&'static str),

    /// The result handoff was fulfilled a second time.
    #[error("result handoff already fulfilled")]
    AlreadyFulfilled,

    /// The other side of the result handoff was dropped.
    #[error("result handoff dropped before delivery")]
    ResultDropped,

    /// A stage thread panicked.
    #[error("stage '{stage}' panicked: {message}")]
    StagePanicked {
        /// Stage name.
        stage: &'static str,
        /// Panic payload, if it was a string.
        message: String,
    },

    /// A stage implementation reported a failure of its own.
    #[error("stage failed: {0}")]
    Stage(String),

    /// A stage thread could not be spawned.
    #[error("failed to spawn stage thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// Pipeline configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The blocking task running the pipeline could not be joined.
    #[error("join error: {0}")]
    Join(String),
}
