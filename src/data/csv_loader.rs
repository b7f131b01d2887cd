use std::path::Path;

use super::config::{self, CsvColumns, ImageDimensions, LoaderConfig, LoaderOptions};
use super::error::{LoaderError, Result};
use super::image_ops;
use super::model::{Dataset, Label, LabelIndexMap, Sample};

// ---------------------------------------------------------------------------
// CsvDataLoader
// ---------------------------------------------------------------------------

/// Loads images stored inline in a CSV file, FER2013 style:
///
/// ```text
/// emotion,pixels,Usage
/// 0,70 80 82 72 58 ...,Training
/// ```
///
/// The image column holds space-separated grey values; the label column holds
/// the class token. Rows whose label is not in the target set are dropped.
#[derive(Debug, Clone)]
pub struct CsvDataLoader {
    config: LoaderConfig,
    dims: ImageDimensions,
    targets: LabelIndexMap,
    columns: CsvColumns,
}

impl CsvDataLoader {
    /// Validate `options` and check the file's column count.
    pub fn new(options: LoaderOptions) -> Result<Self> {
        let config = LoaderConfig::from_options(&options)?;

        let dims = config
            .image_dimensions
            .ok_or_else(|| LoaderError::Config("image_dimensions is required".into()))?;
        let targets = config
            .target_labels
            .clone()
            .ok_or_else(|| LoaderError::Config("target_emotion_map is required".into()))?;

        let label = config::column_index(options.csv_label_col, "csv_label_col")?;
        let image = config::column_index(options.csv_image_col, "csv_image_col")?;
        if label == image {
            return Err(LoaderError::Config(format!(
                "csv_label_col and csv_image_col must differ, both are {label}"
            )));
        }
        let columns = CsvColumns {
            label,
            image,
            has_header: options.csv_has_header.unwrap_or(true),
        };

        if options.time_steps.is_some() {
            return Err(LoaderError::Config(
                "time_steps is only supported for directory data".into(),
            ));
        }

        check_file(&config.datapath)?;
        let column_count = count_columns(&config.datapath)?;
        for (name, col) in [("csv_label_col", label), ("csv_image_col", image)] {
            if col >= column_count {
                return Err(LoaderError::Config(format!(
                    "{name} = {col} is out of range for a file with {column_count} columns"
                )));
            }
        }

        Ok(CsvDataLoader {
            config,
            dims,
            targets,
            columns,
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Read every row, keep those with a target label, and stack them.
    pub fn load_data(&self) -> Result<Dataset> {
        check_file(&self.config.datapath)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.columns.has_header)
            .flexible(true)
            .from_path(&self.config.datapath)?;

        let mut samples = Vec::new();
        let mut dropped = 0usize;

        for (row_no, result) in reader.records().enumerate() {
            let record = result?;

            let label = Label::parse(record.get(self.columns.label).unwrap_or(""));
            let Some(class_index) = self.targets.index_of(&label) else {
                dropped += 1;
                continue;
            };

            let payload = record.get(self.columns.image).unwrap_or("");
            let values = parse_pixels(payload, row_no)?;
            let pixels =
                image_ops::grey_payload_to_pixels(values, self.dims, self.config.out_channels, row_no)?;

            samples.push(Sample {
                pixels,
                class_index,
            });
        }

        if dropped > 0 {
            log::debug!("Dropped {dropped} rows with labels outside the target set");
        }
        if samples.is_empty() {
            return Err(LoaderError::EmptyDataset(format!(
                "no rows of {} carry a target label",
                self.config.datapath.display()
            )));
        }

        log::info!(
            "Loaded {} images from {}",
            samples.len(),
            self.config.datapath.display()
        );

        let shape = self.config.frame_shape(self.dims);
        Dataset::assemble(
            samples,
            &shape,
            self.targets.clone(),
            self.config.validation_split,
        )
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(LoaderError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(LoaderError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// Width of the first record, header included.
fn count_columns(path: &Path) -> Result<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    match reader.records().next() {
        Some(record) => Ok(record?.len()),
        None => Ok(0),
    }
}

fn parse_pixels(payload: &str, row: usize) -> Result<Vec<u8>> {
    payload
        .split_whitespace()
        .enumerate()
        .map(|(index, tok)| {
            tok.parse::<u8>().map_err(|_| LoaderError::PixelParse {
                row,
                index,
                token: tok.to_string(),
            })
        })
        .collect()
}
