use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while configuring or running a loader.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Invalid or missing option combination.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("output channels should be either 3 (RGB) or 1 (grey) but got {0}")]
    InvalidChannels(i64),

    #[error("file not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Loading finished but nothing survived.
    #[error("empty dataset: {0}")]
    EmptyDataset(String),

    #[error("label '{label}' has {available} frames, fewer than time_steps = {time_steps}")]
    TimeSteps {
        label: String,
        available: usize,
        time_steps: usize,
    },

    #[error("row {row}: pixel {index} ('{token}') is not an integer")]
    PixelParse {
        row: usize,
        index: usize,
        token: String,
    },

    #[error("row {row}: {count} pixels cannot be reshaped to {height}x{width}")]
    PixelCount {
        row: usize,
        count: usize,
        height: u32,
        width: u32,
    },

    #[error("failed to decode {}: {source}", .path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("class index {index} outside a label map of {classes} labels")]
    ClassIndex { index: usize, classes: usize },

    #[error("sample shape mismatch: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoaderError {
    /// True for errors raised while validating options, before any sample is read.
    pub fn is_config(&self) -> bool {
        matches!(self, LoaderError::Config(_) | LoaderError::InvalidChannels(_))
    }
}

pub type Result<T> = std::result::Result<T, LoaderError>;
