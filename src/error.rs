use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filter design failed: {0}")]
    FilterDesign(String),

    #[error("WAV I/O error: {0}")]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, RecorderError>;
