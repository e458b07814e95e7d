use thiserror::Error;

/// Failure to produce one sample. The sample is dropped; the object survives.
#[derive(Debug, Clone, Error)]
pub enum PropagationError {
    #[error("invalid elements: {0}")]
    Elements(String),
    #[error("time conversion error: {0}")]
    Time(String),
    #[error("propagation error: {0}")]
    Propagation(String),
    #[error("non-finite {0}")]
    NonFinite(&'static str),
}

impl From<sgp4::ElementsError> for PropagationError {
    fn from(err: sgp4::ElementsError) -> Self {
        PropagationError::Elements(err.to_string())
    }
}

impl From<sgp4::Error> for PropagationError {
    fn from(err: sgp4::Error) -> Self {
        PropagationError::Propagation(err.to_string())
    }
}
