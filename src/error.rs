use thiserror::Error;

/// Everything the session engine can signal to its caller.
///
/// All of these are recoverable: `EndOfSession` tells the event loop to
/// stop feeding and collect the result, the other two reject a single
/// event or a construction attempt without corrupting any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No more words or characters left in the test, or the session has
    /// already been finalized.
    #[error("no more words or characters left in the test")]
    EndOfSession,

    /// A word was submitted with an embedded delimiter character.
    #[error("word submitted with embedded delimiter {0:?}")]
    InvalidEvent(char),

    /// Degenerate construction input, or an operation the configured mode
    /// does not support. Rejected before any state is touched.
    #[error("invalid session configuration: {0}")]
    Configuration(String),
}
