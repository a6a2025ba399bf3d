use thiserror::Error;

pub type Result<T> = std::result::Result<T, MailboxError>;

#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for MailboxError {
    fn from(err: reqwest::Error) -> Self {
        MailboxError::Network(err.to_string())
    }
}
