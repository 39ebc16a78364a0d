use thiserror::Error;

/// Validation failures raised by data-model constructors.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid quantity {quantity} for food item '{name}'")]
    InvalidQuantity { name: String, quantity: f64 },
    #[error("confidence {confidence} out of range [0, 1] for food item '{name}'")]
    InvalidConfidence { name: String, confidence: f64 },
}

/// Terminal failures of a meal-analysis run.
///
/// Degraded composition lookups are not part of this taxonomy: they are
/// swallowed into default nutrient values by the resolver and only counted.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("vision analysis failed: {0}")]
    Vision(anyhow::Error),
    #[error("no food detected in image")]
    NoFoodDetected,
    #[error("image asset unavailable: {0}")]
    ImageUnavailable(String),
}

impl PipelineError {
    /// The user-facing error category for this failure.
    pub fn user_error_kind(&self) -> ErrorKind {
        match self {
            PipelineError::Vision(_) => ErrorKind::ApiError,
            PipelineError::NoFoodDetected => ErrorKind::NoFoodDetected,
            PipelineError::ImageUnavailable(_) => ErrorKind::InvalidImage,
        }
    }
}

/// Closed set of user-facing error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidImage,
    NoFoodDetected,
    ApiError,
    Timeout,
    UnsupportedMessage,
    RateLimit,
    Unknown,
}
