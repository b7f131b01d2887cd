use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::error::{LoaderError, Result};
use super::model::{Label, LabelIndexMap};

/// Smallest and largest accepted frame side.
pub const MIN_IMAGE_SIDE: u32 = 8;
pub const MAX_IMAGE_SIDE: u32 = 512;

const DEFAULT_VALIDATION_SPLIT: f32 = 0.2;

// ---------------------------------------------------------------------------
// LoaderOptions – the raw, unvalidated option set
// ---------------------------------------------------------------------------

/// Every option a loader recognises. Fields are optional so that a missing
/// value can be reported as a configuration error instead of a parse error.
///
/// ```json
/// {
///   "datapath": "image_data/sample.csv",
///   "image_dimensions": [48, 48],
///   "target_emotion_map": [0, 1, 2, 3, 4, 5, 6],
///   "csv_label_col": 0,
///   "csv_image_col": 1
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderOptions {
    pub datapath: Option<PathBuf>,
    /// `(height, width)`.
    pub image_dimensions: Option<(i64, i64)>,
    /// 1 (grey) or 3 (RGB); defaults to 1.
    pub out_channels: Option<i64>,
    #[serde(alias = "target_labels")]
    pub target_emotion_map: Option<Vec<Label>>,
    pub csv_label_col: Option<i64>,
    pub csv_image_col: Option<i64>,
    /// Whether the first CSV row is a header; defaults to true.
    pub csv_has_header: Option<bool>,
    pub time_steps: Option<i64>,
    /// Fraction of samples held out by [`Dataset::split`](super::model::Dataset::split).
    pub validation_split: Option<f32>,
}

impl LoaderOptions {
    pub fn new<P: AsRef<Path>>(datapath: P) -> Self {
        LoaderOptions {
            datapath: Some(datapath.as_ref().to_path_buf()),
            ..Default::default()
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| LoaderError::Config(e.to_string()))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoaderError::PathNotFound(path.to_path_buf()),
            _ => LoaderError::Io(e),
        })?;
        Self::from_json_str(&text)
    }

    pub fn image_dimensions(mut self, height: i64, width: i64) -> Self {
        self.image_dimensions = Some((height, width));
        self
    }

    pub fn out_channels(mut self, channels: i64) -> Self {
        self.out_channels = Some(channels);
        self
    }

    pub fn target_labels<L: Into<Label>>(mut self, labels: impl IntoIterator<Item = L>) -> Self {
        self.target_emotion_map = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn csv_label_col(mut self, col: i64) -> Self {
        self.csv_label_col = Some(col);
        self
    }

    pub fn csv_image_col(mut self, col: i64) -> Self {
        self.csv_image_col = Some(col);
        self
    }

    pub fn csv_has_header(mut self, yes: bool) -> Self {
        self.csv_has_header = Some(yes);
        self
    }

    pub fn time_steps(mut self, steps: i64) -> Self {
        self.time_steps = Some(steps);
        self
    }

    pub fn validation_split(mut self, split: f32) -> Self {
        self.validation_split = Some(split);
        self
    }
}

// ---------------------------------------------------------------------------
// Validated pieces
// ---------------------------------------------------------------------------

/// Frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub height: u32,
    pub width: u32,
}

impl ImageDimensions {
    /// Accepts square frames with a side in `MIN_IMAGE_SIDE..=MAX_IMAGE_SIDE`.
    pub fn new(height: i64, width: i64) -> Result<Self> {
        if height <= 0 || width <= 0 {
            return Err(LoaderError::Config(format!(
                "image dimensions must be positive, got ({height}, {width})"
            )));
        }
        let side_ok = |s: i64| (MIN_IMAGE_SIDE as i64..=MAX_IMAGE_SIDE as i64).contains(&s);
        if height != width || !side_ok(height) {
            return Err(LoaderError::Config(format!(
                "unsupported image dimensions ({height}, {width}): expected a square frame \
                 with a side between {MIN_IMAGE_SIDE} and {MAX_IMAGE_SIDE}"
            )));
        }
        Ok(ImageDimensions {
            height: height as u32,
            width: width as u32,
        })
    }

    pub fn pixel_count(&self) -> usize {
        self.height as usize * self.width as usize
    }
}

/// Output channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Grey,
    Rgb,
}

impl Channels {
    pub fn from_count(count: i64) -> Result<Self> {
        match count {
            1 => Ok(Channels::Grey),
            3 => Ok(Channels::Rgb),
            other => Err(LoaderError::InvalidChannels(other)),
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Channels::Grey => 1,
            Channels::Rgb => 3,
        }
    }
}

/// Zero-based CSV column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvColumns {
    pub label: usize,
    pub image: usize,
    pub has_header: bool,
}

// ---------------------------------------------------------------------------
// LoaderConfig – validated, immutable
// ---------------------------------------------------------------------------

/// Options shared by both loaders, after validation.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub datapath: PathBuf,
    pub image_dimensions: Option<ImageDimensions>,
    pub out_channels: Channels,
    /// Target labels in index order; `None` means "every label found".
    pub target_labels: Option<LabelIndexMap>,
    pub validation_split: f32,
}

impl LoaderConfig {
    /// Validate the options common to both loaders. Touches no files.
    pub fn from_options(options: &LoaderOptions) -> Result<Self> {
        let datapath = options
            .datapath
            .clone()
            .ok_or_else(|| LoaderError::Config("datapath is required".into()))?;

        let image_dimensions = options
            .image_dimensions
            .map(|(h, w)| ImageDimensions::new(h, w))
            .transpose()?;

        let out_channels = Channels::from_count(options.out_channels.unwrap_or(1))?;

        let target_labels = match &options.target_emotion_map {
            None => None,
            Some(labels) if labels.is_empty() => {
                return Err(LoaderError::Config("target label set must not be empty".into()))
            }
            Some(labels) => Some(labels.iter().map(normalize_label).collect()),
        };

        let validation_split = options.validation_split.unwrap_or(DEFAULT_VALIDATION_SPLIT);
        if !(0.0..1.0).contains(&validation_split) {
            return Err(LoaderError::Config(format!(
                "validation_split must be in [0, 1), got {validation_split}"
            )));
        }

        Ok(LoaderConfig {
            datapath,
            image_dimensions,
            out_channels,
            target_labels,
            validation_split,
        })
    }

    /// Per-sample shape `(h, w, c)` for fixed-size frames.
    pub fn frame_shape(&self, dims: ImageDimensions) -> [usize; 3] {
        [
            dims.height as usize,
            dims.width as usize,
            self.out_channels.count(),
        ]
    }
}

/// JSON strings like `"3"` should match CSV tokens parsed as integers.
fn normalize_label(label: &Label) -> Label {
    match label {
        Label::Name(s) => Label::parse(s),
        other => other.clone(),
    }
}

/// Check a CSV column option: present and non-negative.
pub(crate) fn column_index(value: Option<i64>, name: &str) -> Result<usize> {
    match value {
        None => Err(LoaderError::Config(format!("{name} is required for CSV data"))),
        Some(v) if v < 0 => Err(LoaderError::Config(format!(
            "{name} must be non-negative, got {v}"
        ))),
        Some(v) => Ok(v as usize),
    }
}

/// Check the time-series window length.
pub(crate) fn time_steps(value: Option<i64>) -> Result<Option<usize>> {
    match value {
        None => Ok(None),
        Some(v) if v < 1 => Err(LoaderError::Config(format!(
            "time_steps must be a positive integer, got {v}"
        ))),
        Some(v) => Ok(Some(v as usize)),
    }
}
