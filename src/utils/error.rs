// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum DocxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Missing document part: {0}")]
    MissingPart(String),
}

#[derive(Error, Debug)]
pub enum SelectError {
    #[error("Not enough questions for condition {condition}: need {required}, pool has {available}")]
    InsufficientPool {
        condition: String,
        required: usize,
        available: usize,
    },
}

/// Failure to embed one referenced image. Recovered per image inside the
/// writer (a placeholder paragraph is emitted); never aborts the save.
#[derive(Error, Debug)]
pub enum ImageEmbedError {
    #[error("could not read image file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not determine image dimensions: {0}")]
    Dimensions(#[from] image::ImageError),

    #[error("unsupported image extension: {0}")]
    UnsupportedExtension(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Invalid test matrix: {0}")]
    Matrix(#[from] serde_json::Error),

    #[error("Document error: {0}")]
    Docx(#[from] DocxError),

    #[error("Selection failed: {0}")]
    Selection(#[from] SelectError),
}
