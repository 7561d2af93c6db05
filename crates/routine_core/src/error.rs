use thiserror::Error;
use time::Date;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("io_error - {0}")]
    Io(String),
    #[error("not_found - {0}")]
    NotFound(String),
    /// A completion already exists for `date`. Recoverable: callers report it
    /// and leave the routine unchanged.
    #[error("already_completed - routine already completed on {date}")]
    AlreadyCompleted { date: Date },
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn not_found<M: Into<String>>(message: M) -> Self {
        Self::NotFound(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
            Self::NotFound(_) => "not_found",
            Self::AlreadyCompleted { .. } => "already_completed",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput(message)
            | Self::InvalidData(message)
            | Self::Io(message)
            | Self::NotFound(message) => message.clone(),
            Self::AlreadyCompleted { date } => format!("routine already completed on {date}"),
        }
    }

    pub fn is_already_completed(&self) -> bool {
        matches!(self, Self::AlreadyCompleted { .. })
    }
}
