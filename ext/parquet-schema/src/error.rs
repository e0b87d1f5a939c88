use thiserror::Error;

/// Core error type for schema operations
#[derive(Error, Debug)]
pub enum ParquetError {
    /// Structurally invalid construction request (missing length, empty or
    /// duplicate name, unclosed groups)
    #[error("Malformed schema: {0}")]
    MalformedSchema(String),

    /// Logical annotation incompatible with the annotated type or out of its
    /// numeric bounds
    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),

    /// Two schemas that cannot be merged, or a projection that is not a
    /// subset of the schema it projects
    #[error("Incompatible schema: {0}")]
    IncompatibleSchema(String),

    /// Textual schema that does not follow the grammar
    #[error("Parse error at token {position}: {message}")]
    Parse { position: usize, message: String },

    /// Invalid argument errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An error annotated with the operation that produced it
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<ParquetError>,
    },

    /// Number parsing errors
    #[error("Parse int error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
}

/// Result type alias for schema operations
pub type Result<T> = std::result::Result<T, ParquetError>;

impl ParquetError {
    /// Create a new malformed schema error
    pub fn malformed_schema<S: Into<String>>(msg: S) -> Self {
        ParquetError::MalformedSchema(msg.into())
    }

    /// Create a new invalid annotation error
    pub fn invalid_annotation<S: Into<String>>(msg: S) -> Self {
        ParquetError::InvalidAnnotation(msg.into())
    }

    /// Create a new incompatible schema error
    pub fn incompatible_schema<S: Into<String>>(msg: S) -> Self {
        ParquetError::IncompatibleSchema(msg.into())
    }

    /// Create a new parse error at the given token position
    pub fn parse<S: Into<String>>(position: usize, msg: S) -> Self {
        ParquetError::Parse {
            position,
            message: msg.into(),
        }
    }

    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        ParquetError::InvalidArgument(msg.into())
    }

    /// The error underneath any number of context layers
    pub fn root_cause(&self) -> &ParquetError {
        match self {
            ParquetError::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn is_malformed_schema(&self) -> bool {
        matches!(self.root_cause(), ParquetError::MalformedSchema(_))
    }

    pub fn is_invalid_annotation(&self) -> bool {
        matches!(self.root_cause(), ParquetError::InvalidAnnotation(_))
    }
}

/// Extension trait to add context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, ctx: S) -> Result<T>;

    /// Add context with a closure that's only called on error
    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<ParquetError>,
{
    fn context<S: Into<String>>(self, ctx: S) -> Result<T> {
        self.map_err(|e| ParquetError::Context {
            context: ctx.into(),
            source: Box::new(e.into()),
        })
    }

    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T> {
        self.map_err(|e| ParquetError::Context {
            context: f().into(),
            source: Box::new(e.into()),
        })
    }
}
