use thiserror::Error;

/// Errors surfaced to the host. Shape problems inside a live document are
/// repaired rather than reported; only host-facing parsing ends up here.
#[derive(Debug, Error)]
pub enum ZyraError {
    #[error("malformed document json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown block setting `{0}`")]
    UnknownSetting(String),

    #[error("block field `{0}` cannot be patched")]
    ImmutableField(String),

    #[error("invalid value for setting `{key}`: {source}")]
    InvalidSetting {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid editor config: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = ZyraError> = std::result::Result<T, E>;
