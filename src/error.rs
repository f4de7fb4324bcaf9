use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Input file not found: {0}")]
    MissingInput(PathBuf),
    #[error("Path cannot be expressed as a file URL: {0}")]
    InvalidPath(PathBuf),
    #[error("Browser error: {0}")]
    Browser(String),
    #[error("Navigation failed: {0}")]
    Navigation(String),
    #[error("Screenshot failed: {0}")]
    Screenshot(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
