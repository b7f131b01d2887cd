//! Loaders that turn a FER-style CSV file or a directory of labelled frames
//! into aligned image and label arrays for an emotion classifier.

pub mod data;

pub use data::config::{Channels, ImageDimensions, LoaderConfig, LoaderOptions};
pub use data::csv_loader::CsvDataLoader;
pub use data::directory_loader::DirectoryDataLoader;
pub use data::error::{LoaderError, Result};
pub use data::model::{Dataset, Label, LabelIndexMap, Sample};
