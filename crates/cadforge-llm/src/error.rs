//! Error types for the language-model boundary.

/// Failures talking to or decoding replies from the hosted model.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("api key missing; set OPENAI_API_KEY or pass one explicitly")]
    AuthenticationMissing,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited by the model service")]
    RateLimited,

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse model reply: {0}")]
    Parse(String),

    #[error("model returned an empty completion")]
    EmptyCompletion,
}
