use thiserror::Error;

/// Everything that can go wrong on the way to generated text.
///
/// None of these leave the provider; they are logged and replaced by
/// fallback lines.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("text generation is disabled")]
    Disabled,
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generation endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation returned no text")]
    Empty,
    #[error("malformed generation payload: {0}")]
    Malformed(String),
}
