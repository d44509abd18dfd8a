/// Shared error type used across all castfeed crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("config: {0}")]
    Config(String),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A pager (transport/API) failure, carried verbatim. The stream
    /// engine never retries these; retry policy belongs to the pager.
    #[error("pager: {0}")]
    Pager(#[from] anyhow::Error),

    #[error("cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
