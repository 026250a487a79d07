// Custom error type for radio show downloads
#[derive(Debug, thiserror::Error)]
pub enum RadioError {
    /// The playlist chain could not be followed: a request failed or an
    /// expected URL was missing from a response body.
    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// Nothing to assemble, or the media tool exited with a failure.
    #[error("Assembly error: {0}")]
    Assembly(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid proxy configuration: {0}")]
    Proxy(String),
}

impl RadioError {
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution(message.into())
    }

    pub fn assembly(message: impl Into<String>) -> Self {
        Self::Assembly(message.into())
    }
}

pub type Result<T> = std::result::Result<T, RadioError>;
