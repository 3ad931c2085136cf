use thiserror::Error;

/// Failures reported by the remote lead store.
///
/// The persistence layer collapses everything into three cases: the request
/// never completed, the store answered with a failure status, or the lead the
/// request addressed does not exist in the store.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote store returned status {0}")]
    Status(u16),

    #[error("Lead not found: {0}")]
    NotFound(String),
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }
}
