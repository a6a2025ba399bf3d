use thiserror::Error;

#[derive(Error, Debug)]
pub enum WirebriefError {
    #[error("State file error: {0}")]
    State(String),

    #[error("Summary input too short: {len} chars (minimum {min})")]
    InputTooShort { len: usize, min: usize },

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
