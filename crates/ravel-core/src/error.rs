//! Model-building error types.

use ravel_solver::EngineError;

/// Addressing error for an N-dimensional variable container. Raised
/// immediately at the call site, never deferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Wrong number of indices for the container's rank.
    RankMismatch { expected: usize, got: usize },
    /// One index component is outside its dimension's extent.
    AxisOutOfBounds {
        axis: usize,
        index: usize,
        extent: usize,
    },
}

impl IndexError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            IndexError::RankMismatch { .. } => "INDEX_RANK_MISMATCH",
            IndexError::AxisOutOfBounds { .. } => "INDEX_OUT_OF_BOUNDS",
        }
    }
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexError::RankMismatch { expected, got } => write!(
                f,
                "[{}] Expected {} indices, got {}",
                self.code(),
                expected,
                got
            ),
            IndexError::AxisOutOfBounds {
                axis,
                index,
                extent,
            } => write!(
                f,
                "[{}] Index {} out of bounds for axis {} (extent {})",
                self.code(),
                index,
                axis,
                extent
            ),
        }
    }
}

impl std::error::Error for IndexError {}

/// Errors surfaced while building a model or crossing the engine boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    /// Bad addressing of a variable container.
    Index(IndexError),
    /// A variable family was read before being set.
    FamilyNotInitialized { family: &'static str },
    /// The objective phase finished without setting an objective.
    ObjectiveMissing,
    /// A second objective was set in the same build.
    ObjectiveAlreadySet,
    /// The engine reported a failure.
    Engine(EngineError),
    /// Anything else that went wrong during the build.
    Failed(String),
}

impl BuildError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            BuildError::Index(err) => err.code(),
            BuildError::FamilyNotInitialized { .. } => "FAMILY_NOT_INITIALIZED",
            BuildError::ObjectiveMissing => "OBJECTIVE_MISSING",
            BuildError::ObjectiveAlreadySet => "OBJECTIVE_ALREADY_SET",
            BuildError::Engine(err) => err.code(),
            BuildError::Failed(_) => "BUILD_FAILED",
        }
    }
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Index(err) => err.fmt(f),
            BuildError::FamilyNotInitialized { family } => write!(
                f,
                "[{}] Variable family {} was never set",
                self.code(),
                family
            ),
            BuildError::ObjectiveMissing => {
                write!(f, "[{}] Model has no objective defined", self.code())
            }
            BuildError::ObjectiveAlreadySet => {
                write!(f, "[{}] Model already has an objective", self.code())
            }
            BuildError::Engine(err) => err.fmt(f),
            BuildError::Failed(message) => {
                write!(f, "[{}] Build failed: {}", self.code(), message)
            }
        }
    }
}

impl std::error::Error for BuildError {}

impl From<IndexError> for BuildError {
    fn from(err: IndexError) -> Self {
        BuildError::Index(err)
    }
}

impl From<EngineError> for BuildError {
    fn from(err: EngineError) -> Self {
        BuildError::Engine(err)
    }
}

#[cfg(test)]
mod tests {
    use super::{BuildError, IndexError};
    use ravel_solver::EngineError;

    #[test]
    fn index_error_codes() {
        assert_eq!(
            IndexError::RankMismatch {
                expected: 3,
                got: 2
            }
            .code(),
            "INDEX_RANK_MISMATCH"
        );
        assert_eq!(
            IndexError::AxisOutOfBounds {
                axis: 1,
                index: 5,
                extent: 4
            }
            .code(),
            "INDEX_OUT_OF_BOUNDS"
        );
    }

    #[test]
    fn display_carries_the_offending_values() {
        let err = IndexError::AxisOutOfBounds {
            axis: 1,
            index: 5,
            extent: 4,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("axis 1"));
        assert!(rendered.contains("extent 4"));
    }

    #[test]
    fn build_error_delegates_codes() {
        let err: BuildError = IndexError::RankMismatch {
            expected: 1,
            got: 0,
        }
        .into();
        assert_eq!(err.code(), "INDEX_RANK_MISMATCH");

        let err: BuildError = EngineError::Unsupported { operation: "x" }.into();
        assert_eq!(err.code(), "ENGINE_UNSUPPORTED");

        assert_eq!(
            BuildError::FamilyNotInitialized { family: "Open" }.code(),
            "FAMILY_NOT_INITIALIZED"
        );
        assert_eq!(BuildError::ObjectiveMissing.code(), "OBJECTIVE_MISSING");
    }

    #[test]
    fn family_error_names_the_key() {
        let err = BuildError::FamilyNotInitialized { family: "Assign" };
        assert!(err.to_string().contains("Assign"));
    }
}
