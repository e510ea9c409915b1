use std::fmt::Display;

/// Failure reported by a `Connection` while running a statement.
///
/// The message is the driver's own text; the compiler never rewrites it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionError {
    pub message: String,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl Display for ExecutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ExecutionError {}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// A field name (or order token) that does not resolve in its scope.
    UnknownField(String),
    /// An operator operand or combinator of the wrong shape.
    InvalidFilter { field: String, reason: String },
    /// A join path deeper than the definition allows.
    JoinDepthExceeded { depth: usize, max: usize },
    /// Two fields registered under the same name.
    DuplicateField(String),
    /// A JSON request envelope that could not be decoded.
    InvalidRequest(String),
    Execution(ExecutionError),
}

impl QueryError {
    pub fn invalid_filter(field: &str, reason: &str) -> Self {
        Self::InvalidFilter { field: field.to_string(), reason: reason.to_string() }
    }

    pub fn err<T>(self) -> Result<T, QueryError> {
        Err(self)
    }

    /// True for every error raised before the connection is touched.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Execution(_))
    }
}

impl Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::UnknownField(name) => write!(f, "Unknown field \"{}\"", name),
            QueryError::InvalidFilter { field, reason } => {
                write!(f, "Invalid filter on \"{}\": {}", field, reason)
            }
            QueryError::JoinDepthExceeded { depth, max } => {
                write!(f, "Join depth {} exceeds maximum allowed depth {}", depth, max)
            }
            QueryError::DuplicateField(name) => write!(f, "Duplicate field \"{}\"", name),
            QueryError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            QueryError::Execution(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Execution(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ExecutionError> for QueryError {
    fn from(err: ExecutionError) -> Self {
        QueryError::Execution(err)
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::InvalidRequest(err.to_string())
    }
}
