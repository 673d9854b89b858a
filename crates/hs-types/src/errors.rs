use thiserror::Error;

/// Main error type for a hyperparameter search run
#[derive(Error, Debug)]
pub enum SearchError {
    /// Mismatched sample counts, malformed parameter specifications and
    /// out-of-range candidate indices.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A (candidate, fold) unit failed while the error policy was `raise`.
    #[error("Evaluation of candidate {candidate_index} on fold {fold_index} failed: {source}")]
    Evaluation {
        candidate_index: usize,
        fold_index: usize,
        #[source]
        source: ModelError,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A collaborator failed outside the per-fold evaluation, e.g. while
    /// refitting the best candidate or serving a delegated call.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Dispatch or reassembly produced results that do not line up with the
    /// candidate sequence.
    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),
}

impl SearchError {
    /// True for the error kinds a caller can fix by changing its input.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Configuration(_))
    }
}

/// Errors raised by model, scorer and splitter collaborators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("fit failed: {message}")]
    Fit { message: String },

    #[error("prediction failed: {message}")]
    Predict { message: String },

    #[error("scoring failed: {message}")]
    Score { message: String },

    #[error("model is not fitted")]
    NotFitted,

    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    #[error("unknown parameter: {name}")]
    UnknownParameter { name: String },

    #[error("operation not supported by this model: {operation}")]
    Unsupported { operation: String },
}

impl ModelError {
    pub fn fit(message: impl Into<String>) -> Self {
        Self::Fit {
            message: message.into(),
        }
    }

    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }
}

/// Result type alias for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Result type alias for collaborator operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::SearchError::Validation(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::SearchError::Configuration(format!($($arg)*))
    };
}

/// Macro for creating internal consistency errors
#[macro_export]
macro_rules! consistency_error {
    ($($arg:tt)*) => {
        $crate::SearchError::InternalConsistency(format!($($arg)*))
    };
}
