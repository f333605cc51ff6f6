//! Engine error types.

/// Failure reported at the engine boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The engine cannot be used at all (library missing, licensing).
    NotAvailable(String),
    /// The engine does not support the requested operation.
    Unsupported { operation: &'static str },
    /// The engine rejected model data.
    Rejected { message: String },
    /// The engine failed internally; carries its own code and message.
    Backend { code: String, message: String },
    /// A post-solve attribute was read before a successful optimize.
    SolveRequired { operation: &'static str },
}

impl EngineError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::NotAvailable(_) => "ENGINE_NOT_AVAILABLE",
            EngineError::Unsupported { .. } => "ENGINE_UNSUPPORTED",
            EngineError::Rejected { .. } => "ENGINE_REJECTED",
            EngineError::Backend { .. } => "ENGINE_BACKEND",
            EngineError::SolveRequired { .. } => "ENGINE_SOLVE_REQUIRED",
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotAvailable(msg) => {
                write!(f, "[{}] Engine not available: {}", self.code(), msg)
            }
            EngineError::Unsupported { operation } => {
                write!(f, "[{}] Engine does not support {}", self.code(), operation)
            }
            EngineError::Rejected { message } => {
                write!(f, "[{}] Engine rejected model data: {}", self.code(), message)
            }
            EngineError::Backend { code, message } => {
                write!(f, "[{}] Engine error {}: {}", self.code(), code, message)
            }
            EngineError::SolveRequired { operation } => {
                write!(f, "[{}] {} requires a completed solve", self.code(), operation)
            }
        }
    }
}

impl std::error::Error for EngineError {}
