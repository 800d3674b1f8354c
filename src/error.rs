use thiserror::Error;

/// Motion core error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MotionError {
    /// No controller is paired. Recoverable: retry once a device connects.
    #[error("No controller connected")]
    NotConnected,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for motion core operations
pub type MotionResult<T> = Result<T, MotionError>;

impl MotionError {
    /// Status code in the convention of the console motion API: 0 is success,
    /// negative values are failures.
    pub fn status_code(&self) -> i32 {
        match self {
            MotionError::NotConnected => -1,
            MotionError::InvalidConfig(_) => -2,
            MotionError::Internal(_) => -3,
        }
    }
}

/// Map a motion result onto the console's integer status convention
pub fn status_of<T>(result: &MotionResult<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => e.status_code(),
    }
}
