use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain or understand one remote page or file.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("unexpected page layout: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog {} not found, run `fetch` first", .0.display())]
    NotFound(PathBuf),

    #[error("catalog I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed catalog: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("source directory {} does not exist", .0.display())]
    SourceNotFound(PathBuf),

    #[error("extract I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}
