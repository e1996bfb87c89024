use thiserror::Error;

/// Errors surfaced by shelf operations.
///
/// Validation verdicts are *not* errors: a blocked drop comes back as a
/// [`crate::drag::ValidationOutcome`]. This type only covers operations that
/// could not be carried out at all.
#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Another move is still being committed")]
    Busy,

    #[error("Reordering is only available in edit mode")]
    EditModeDisabled,

    #[error("No drag in progress")]
    NoActiveDrag,

    #[error("Unknown element: {0}")]
    UnknownElement(String),

    #[error("Save failed: {0}")]
    Save(String),

    #[error("All storage backends failed to persist '{0}'")]
    BackendsExhausted(String),
}

pub type Result<T> = std::result::Result<T, ShelfError>;
