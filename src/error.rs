//! Error kinds surfaced by the tree engine
//!
//! "Skip" is deliberately absent: a page that is not a repository is a
//! normal outcome, reported through `Resolution::Skip` and `Outcome::Skipped`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The listing below `path` was too large for one response.
    /// Recoverable by a narrower (per-directory) reload.
    #[error("listing for '{path}' is too large to load in one request")]
    Truncated { path: String },

    /// Bad ref, path, or repository.
    #[error("not found: {0}")]
    NotFound(String),

    /// Network or authentication failure.
    #[error("{message}")]
    Transport { status: Option<u16>, message: String },

    /// The submodule manifest could not be decoded or parsed.
    #[error("malformed submodule manifest at line {line}: {message}")]
    ManifestParse { line: usize, message: String },
}

impl Error {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Transport {
            status,
            message: message.into(),
        }
    }

    /// Whether a narrower reload can recover from this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Truncated { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let status = e.status().map(|s| s.as_u16());
        if e.is_connect() {
            return Error::transport(status, format!("cannot connect to host: {}", e));
        }
        if e.is_decode() {
            return Error::transport(status, format!("failed to parse API response: {}", e));
        }
        Error::transport(status, e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
