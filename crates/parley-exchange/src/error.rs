use parley_assistants::{AssistantsError, RunStatus};
use thiserror::Error;

/// Error classes the HTTP boundary understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    InternalServerError,
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::InternalServerError => 500,
        }
    }
}

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Thread {0} not found")]
    ThreadNotFound(String),

    #[error("Run {run_id} finished with status {status}")]
    RunFailed { run_id: String, status: RunStatus },

    #[error("Run {run_id} retrieval reached the maximum of {attempts} polling attempts")]
    RunTimedOut { run_id: String, attempts: u32 },

    #[error("Unsupported content type: {0}")]
    UnsupportedContent(String),

    #[error("No message found")]
    NoMessageFound,

    #[error("Thread {0} could not be deleted")]
    DeletionNotConfirmed(String),

    #[error(transparent)]
    Remote(#[from] AssistantsError),
}

impl ExchangeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExchangeError::BadRequest(_) => ErrorKind::BadRequest,
            ExchangeError::ThreadNotFound(_) => ErrorKind::NotFound,
            ExchangeError::RunFailed { .. }
            | ExchangeError::RunTimedOut { .. }
            | ExchangeError::UnsupportedContent(_)
            | ExchangeError::NoMessageFound
            | ExchangeError::DeletionNotConfirmed(_)
            | ExchangeError::Remote(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
