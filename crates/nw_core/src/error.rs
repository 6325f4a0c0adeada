use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// The reason carried by the variant, without the kind prefix.
    pub fn reason(&self) -> &str {
        match self {
            Error::InvalidInput(reason)
            | Error::Retrieval(reason)
            | Error::Publish(reason)
            | Error::Configuration(reason) => reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
