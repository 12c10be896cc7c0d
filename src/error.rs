use thiserror::Error;

/// Errors raised by the preprocessor itself.
///
/// Failures raised inside handler bodies are never converted into this type;
/// they travel back to the caller of `apply()` untouched.
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// A field specifier is empty or contains an empty segment.
    #[error("invalid field spec '{spec}': {reason}")]
    InvalidFieldSpec { spec: String, reason: String },

    /// A plan names a modifier that does not exist.
    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),

    /// A plan names a transformer that does not exist.
    #[error("unknown transformer '{0}'")]
    UnknownTransformer(String),

    /// Write-back could not reach the addressed leaf.
    #[error("path '{0}' does not exist in the record")]
    PathNotFound(String),

    /// The plan document could not be read or parsed.
    #[error("invalid preprocessing plan: {0}")]
    InvalidPlan(String),
}

impl PreprocessError {
    /// True for the errors that are raised while building chains rather
    /// than while running them.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PreprocessError::InvalidFieldSpec { .. }
                | PreprocessError::UnknownModifier(_)
                | PreprocessError::UnknownTransformer(_)
                | PreprocessError::InvalidPlan(_)
        )
    }
}
