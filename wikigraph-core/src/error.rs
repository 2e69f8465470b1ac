use thiserror::Error;
use wikigraph_scanner::ScanError;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Source error: {0}")]
    Scan(#[from] ScanError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
