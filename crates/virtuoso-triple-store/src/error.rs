use thiserror::Error;

/// Triple store specific errors
#[derive(Error, Debug)]
pub enum TripleStoreError {
    /// Semaphore closed
    #[error("Semaphore closed")]
    SemaphoreClosed,

    /// The manager was terminated; no further operations are accepted
    #[error("Triple store connection is closed")]
    Closed,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Triple store backend returned an error response
    #[error("Triple store error (status {status}): {message}")]
    Backend { status: u16, message: String },

    /// SQL statement was rejected by the store
    #[error("SQL statement failed: {message}")]
    Sql { message: String },

    /// Failed to connect after multiple retries
    #[error("Failed to connect to triple store after {attempts} attempts")]
    ConnectionFailed { attempts: u32 },

    /// The store rejected the configured credentials
    #[error("Triple store rejected the credentials (status {status})")]
    Authentication { status: u16 },

    /// Username or password missing for a backend that requires them
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Failed to parse response
    #[error("Failed to parse response: {reason}")]
    ParseError { reason: String },

    /// Invalid SPARQL query
    #[error("Invalid SPARQL query: {reason}")]
    InvalidQuery { reason: String },

    /// Value is not an absolute IRI
    #[error("Invalid IRI '{value}': {reason}")]
    InvalidIri { value: String, reason: String },

    /// Caller supplied a value that cannot be embedded into a statement
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Operation is not available on the selected backend
    #[error("Operation '{operation}' is not supported by the {backend} backend")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl TripleStoreError {
    /// Connection could not be established or the transport failed.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            TripleStoreError::ConnectionFailed { .. }
                | TripleStoreError::Authentication { .. }
                | TripleStoreError::MissingCredentials(_)
                | TripleStoreError::Http(_)
        )
    }

    /// The store received the statement and rejected it, or its answer was unreadable.
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            TripleStoreError::Backend { .. }
                | TripleStoreError::Sql { .. }
                | TripleStoreError::InvalidQuery { .. }
                | TripleStoreError::ParseError { .. }
        )
    }

    /// The manager can no longer be used.
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            TripleStoreError::Closed | TripleStoreError::SemaphoreClosed
        )
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, TripleStoreError>;
