use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to bind {addr}: {source}")]
    BindError {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ServeError>;
