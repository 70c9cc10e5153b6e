use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while building or running a pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No stages in pipeline
    #[error("Cannot build a pipeline with no stages")]
    NoStages,

    /// Stage name not present in the transform registry
    #[error("Unknown transform: {0}")]
    UnknownTransform(String),

    /// Thread spawn failure during startup
    #[error("Failed to spawn {thread} thread: {source}")]
    Spawn {
        thread: String,
        #[source]
        source: std::io::Error,
    },

    /// A pipeline thread panicked
    #[error("{0} thread panicked")]
    Panic(&'static str),

    /// An endpoint failed reading or writing its stream
    #[error("{endpoint} endpoint failed: {source}")]
    Endpoint {
        endpoint: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Transform failure for a single item; the worker drops the item and continues
    #[error("Transform failed: {0}")]
    Transform(String),
}
