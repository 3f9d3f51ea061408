use thiserror::Error;

/// Errors raised while building or evaluating a [`PokerNet`](crate::PokerNet).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("shape mismatch for `{input}`: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        input: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("could not read back network output: {0}")]
    Readback(String),
}

impl NetworkError {
    pub(crate) fn shape(input: &'static str, expected: &[usize], actual: &[usize]) -> Self {
        NetworkError::ShapeMismatch {
            input,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}

/// Failures while persisting or restoring network parameters.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("checkpoint encoding failed: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("checkpoint decoding failed: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("parameter record failed: {0}")]
    Record(#[from] burn::record::RecorderError),
    #[error("recorded weights hold {actual} parameters, config allocates {expected}")]
    ParameterCount { expected: usize, actual: usize },
    #[error("recorded parameter #{index} has shape {actual:?}, config expects {expected:?}")]
    ParameterShape {
        index: usize,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error(transparent)]
    Network(#[from] NetworkError),
}
