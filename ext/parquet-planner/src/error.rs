use std::fmt;
use std::path::PathBuf;

use parquet_schema::ParquetError;
use thiserror::Error;

/// A file whose footer could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterFailure {
    pub path: PathBuf,
    pub message: String,
}

impl FooterFailure {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FooterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

fn join_failures(failures: &[FooterFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error type for listing, footer resolution and split planning
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Schema construction, merge or projection failures
    #[error(transparent)]
    Schema(#[from] ParquetError),

    /// File system failures reported by a [`crate::FileSystem`]
    #[error("I/O error on '{}': {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Footer metadata that cannot be planned over
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    /// Every footer that failed to resolve, reported together
    #[error("Failed to read {} footer(s): {}", .0.len(), join_failures(.0))]
    FooterResolution(Vec<FooterFailure>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// An error annotated with the operation that produced it
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<PlannerError>,
    },
}

/// Result type alias for planner operations
pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    pub fn io<P: Into<PathBuf>, S: Into<String>>(path: P, msg: S) -> Self {
        PlannerError::Io {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn not_found<P: Into<PathBuf>>(path: P) -> Self {
        PlannerError::NotFound(path.into())
    }

    pub fn invalid_metadata<S: Into<String>>(msg: S) -> Self {
        PlannerError::InvalidMetadata(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        PlannerError::Config(msg.into())
    }

    pub fn thread_pool<S: Into<String>>(msg: S) -> Self {
        PlannerError::ThreadPool(msg.into())
    }

    /// The innermost error under any added context
    pub fn root_cause(&self) -> &PlannerError {
        match self {
            PlannerError::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Per-path failures of an aggregate footer error, empty otherwise
    pub fn footer_failures(&self) -> &[FooterFailure] {
        match self.root_cause() {
            PlannerError::FooterResolution(failures) => failures,
            _ => &[],
        }
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
    E: Into<PlannerError>,
{
    fn context<S: Into<String>>(self, ctx: S) -> Result<T> {
        self.map_err(|e| PlannerError::Context {
            context: ctx.into(),
            source: Box::new(e.into()),
        })
    }

    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T> {
        self.map_err(|e| PlannerError::Context {
            context: f().into(),
            source: Box::new(e.into()),
        })
    }
}
