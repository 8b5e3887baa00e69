use std::io;

/// Every failure the sampler can hit. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum IfstatError {
    /// Carries clap's rendered usage message.
    #[error("{0}")]
    Usage(String),
    #[error("resolve interface: no interface named '{0}'")]
    NotFound(String),
    #[error("{operation}: {source}")]
    SystemQuery {
        operation: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("{operation}: {source}")]
    Write {
        operation: &'static str,
        #[source]
        source: io::Error,
    },
}

impl IfstatError {
    pub fn system_query(operation: &'static str, source: io::Error) -> Self {
        Self::SystemQuery { operation, source }
    }

    pub fn write(operation: &'static str, source: io::Error) -> Self {
        Self::Write { operation, source }
    }
}
