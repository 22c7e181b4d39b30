use crate::db::dao::DaoLayerError;

pub const NOT_FOUND_MESSAGE: &str = "No todo found!";
pub const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    MethodNotAllowed(String),
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::MethodNotAllowed(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// The uniform 404 every todo route answers with.
    pub fn todo_not_found() -> Self {
        Self::not_found(NOT_FOUND_MESSAGE)
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message)
            | Self::NotFound(message)
            | Self::MethodNotAllowed(message)
            | Self::Internal(message) => message.as_str(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

// Storage details stay in the logs; clients only ever see the fixed messages.
impl From<DaoLayerError> for AppError {
    fn from(err: DaoLayerError) -> Self {
        match err {
            DaoLayerError::NotFound { .. } => AppError::todo_not_found(),
            DaoLayerError::Db(_) => AppError::internal(INTERNAL_MESSAGE),
        }
    }
}
