use thiserror::Error;

/// Fatal problems with a device description.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Missing required field '{path}'")]
    MissingField { path: String },

    #[error("Invalid value at '{path}': {message}")]
    InvalidValue { path: String, message: String },
}
