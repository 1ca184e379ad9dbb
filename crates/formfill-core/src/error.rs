use thiserror::Error;

/// Rejections raised by the region capture state machine
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Selection is not armed")]
    NotArmed,

    #[error("A region capture is already in progress")]
    CaptureInProgress,

    #[error("No region is waiting for a field type")]
    NothingPending,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DesignerError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("No document loaded")]
    NoDocument,

    #[error("Failed to render page: {0}")]
    Render(String),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),
}

impl From<serde_json::Error> for DesignerError {
    fn from(err: serde_json::Error) -> Self {
        DesignerError::SerializationError(err.to_string())
    }
}
