/// Errors that can occur while starting or joining a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The configuration cannot produce a working pipeline.
    #[error("invalid pipeline config: {0}")]
    Config(String),

    /// The OS refused to start a loop thread.
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        source: std::io::Error,
    },

    /// A loop thread panicked instead of returning.
    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
