use thiserror::Error;

/// Errors that can cross a component boundary in this crate.
///
/// Mirrors the three failure classes used throughout the design: bad input
/// (user's fault, exit code 1), a corrupt decomposition library (data
/// shipped with the binary is wrong), and an internal invariant violation
/// (a bug in this crate, never expected in practice).
#[derive(Debug, Error)]
pub enum KoptError {
    #[error("invalid input: {0}")]
    Input(String),

    #[error("corrupt decomposition library: {0}")]
    LibraryCorrupt(String),

    #[error("internal invariant violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, KoptError>;

impl KoptError {
    pub fn input(msg: impl Into<String>) -> Self {
        KoptError::Input(msg.into())
    }

    pub fn library_corrupt(msg: impl Into<String>) -> Self {
        KoptError::LibraryCorrupt(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        KoptError::Invariant(msg.into())
    }
}
