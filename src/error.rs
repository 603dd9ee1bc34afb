use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP status error: {0}")]
    HttpStatus(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("External API error: {0}")]
    External(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the failure came from the remote side rather than local setup
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Request(_)
                | Error::HttpStatus(_)
                | Error::Auth(_)
                | Error::External(_)
                | Error::MalformedResponse(_)
        )
    }
}
