use std::fmt;

use ndarray::{Array2, ArrayD, Axis, IxDyn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::error::{LoaderError, Result};

/// Seed for the train/test shuffle so splits are reproducible.
const SPLIT_SEED: u64 = 42;

// ---------------------------------------------------------------------------
// Label – a class token
// ---------------------------------------------------------------------------

/// A class token: integer codes come from CSV label columns, names from
/// directory names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Index(i64),
    Name(String),
}

impl Label {
    /// Interpret a raw text token: integers become `Index`, anything else a `Name`.
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        match token.parse::<i64>() {
            Ok(i) => Label::Index(i),
            Err(_) => Label::Name(token.to_string()),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Index(i) => write!(f, "{i}"),
            Label::Name(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Name(s.to_string())
    }
}

impl From<i64> for Label {
    fn from(i: i64) -> Self {
        Label::Index(i)
    }
}

// ---------------------------------------------------------------------------
// LabelIndexMap – label → dense index
// ---------------------------------------------------------------------------

/// Dense zero-based indices for labels, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelIndexMap {
    labels: Vec<Label>,
}

impl LabelIndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index of `label`, assigning the next free one if unseen.
    pub fn insert(&mut self, label: Label) -> usize {
        if let Some(idx) = self.index_of(&label) {
            return idx;
        }
        self.labels.push(label);
        self.labels.len() - 1
    }

    pub fn index_of(&self, label: &Label) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Lookup by display form. An exact name wins; otherwise integer tokens
    /// match `Index` labels, so `map.get("3")` finds a CSV class `3`.
    pub fn get(&self, token: &str) -> Option<usize> {
        self.labels
            .iter()
            .position(|l| matches!(l, Label::Name(s) if s == token))
            .or_else(|| self.index_of(&Label::parse(token)))
    }

    pub fn label(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `(label, index)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&Label, usize)> {
        self.labels.iter().enumerate().map(|(i, l)| (l, i))
    }
}

impl FromIterator<Label> for LabelIndexMap {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        let mut map = LabelIndexMap::new();
        for label in iter {
            map.insert(label);
        }
        map
    }
}

impl Serialize for LabelIndexMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.labels.len()))?;
        for (label, idx) in self.iter() {
            map.serialize_entry(&label.to_string(), &idx)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Sample – one decoded image (or frame sequence) with its class
// ---------------------------------------------------------------------------

/// One decoded sample: row-major pixels in channel-last layout.
#[derive(Debug, Clone)]
pub struct Sample {
    pub pixels: Vec<f32>,
    pub class_index: usize,
}

// ---------------------------------------------------------------------------
// Dataset – aligned images and labels
// ---------------------------------------------------------------------------

/// The loaded dataset.
///
/// `images` has shape `(n, h, w, c)`, or `(n, time_steps, h, w, c)` for
/// time-series loads; `labels` has shape `(n, num_classes)` with one-hot rows.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub images: ArrayD<f32>,
    pub labels: Array2<u8>,
    pub label_index_map: LabelIndexMap,
    validation_split: f32,
}

impl Dataset {
    /// Stack samples into contiguous arrays. Every sample must hold exactly
    /// `sample_shape.iter().product()` pixels.
    pub fn assemble(
        samples: Vec<Sample>,
        sample_shape: &[usize],
        label_index_map: LabelIndexMap,
        validation_split: f32,
    ) -> Result<Self> {
        let per_sample: usize = sample_shape.iter().product();
        let n = samples.len();
        let num_classes = label_index_map.len();

        let mut pixels = Vec::with_capacity(n * per_sample);
        let mut labels = Array2::<u8>::zeros((n, num_classes));
        for (row, sample) in samples.into_iter().enumerate() {
            if sample.class_index >= num_classes {
                return Err(LoaderError::ClassIndex {
                    index: sample.class_index,
                    classes: num_classes,
                });
            }
            labels[[row, sample.class_index]] = 1;
            pixels.extend(sample.pixels);
        }

        let mut shape = Vec::with_capacity(sample_shape.len() + 1);
        shape.push(n);
        shape.extend_from_slice(sample_shape);
        let images = ArrayD::from_shape_vec(IxDyn(&shape), pixels)?;

        Ok(Dataset {
            images,
            labels,
            label_index_map,
            validation_split,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.labels.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shape of a single sample (the image shape without the leading axis).
    pub fn sample_shape(&self) -> &[usize] {
        &self.images.shape()[1..]
    }

    pub fn num_classes(&self) -> usize {
        self.labels.ncols()
    }

    /// Integer class of every sample (position of the hot bit); `None` for a
    /// row with no bit set.
    pub fn class_indices(&self) -> Vec<Option<usize>> {
        self.labels
            .outer_iter()
            .map(|row| row.iter().position(|&v| v == 1))
            .collect()
    }

    /// The label token of sample `i`.
    pub fn label_of(&self, i: usize) -> Option<&Label> {
        let row = self.labels.outer_iter().nth(i)?;
        let class = row.iter().position(|&v| v == 1)?;
        self.label_index_map.label(class)
    }

    pub fn validation_split(&self) -> f32 {
        self.validation_split
    }

    /// Shuffle with a fixed seed and split into `(training, test)`.
    /// The test part holds `round(len * validation_split)` samples.
    pub fn split(&self) -> (Dataset, Dataset) {
        let n = self.len();
        let n_test = ((n as f32) * self.validation_split).round() as usize;

        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
        order.shuffle(&mut rng);
        let (test_idx, train_idx) = order.split_at(n_test.min(n));

        (self.subset(train_idx), self.subset(test_idx))
    }

    fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            images: self.images.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
            label_index_map: self.label_index_map.clone(),
            validation_split: self.validation_split,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(value: f32, class_index: usize) -> Sample {
        Sample {
            pixels: vec![value; 4],
            class_index,
        }
    }

    #[test]
    fn label_parse_prefers_integers() {
        assert_eq!(Label::parse(" 3 "), Label::Index(3));
        assert_eq!(Label::parse("happiness"), Label::Name("happiness".into()));
    }

    #[test]
    fn label_map_assigns_first_seen_order() {
        let mut map = LabelIndexMap::new();
        assert_eq!(map.insert("sadness".into()), 0);
        assert_eq!(map.insert("anger".into()), 1);
        assert_eq!(map.insert("sadness".into()), 0);
        assert_eq!(map.get("anger"), Some(1));
        assert_eq!(map.get("fear"), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn label_map_serializes_as_object() {
        let map: LabelIndexMap = vec![Label::from("happiness"), Label::from(4_i64)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"happiness":0,"4":1}"#);
    }

    #[test]
    fn assemble_aligns_images_and_one_hot_labels() {
        let map: LabelIndexMap = vec![Label::from("a"), Label::from("b")].into_iter().collect();
        let ds = Dataset::assemble(
            vec![sample(1.0, 0), sample(2.0, 1), sample(3.0, 1)],
            &[2, 2, 1],
            map,
            0.2,
        )
        .unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.images.shape(), &[3, 2, 2, 1]);
        assert_eq!(ds.sample_shape(), &[2, 2, 1]);
        assert_eq!(ds.labels.row(0).to_vec(), vec![1, 0]);
        assert_eq!(ds.labels.row(2).to_vec(), vec![0, 1]);
        assert_eq!(ds.class_indices(), vec![Some(0), Some(1), Some(1)]);
        assert_eq!(ds.label_of(1), Some(&Label::from("b")));
        assert_eq!(ds.images[[2, 1, 1, 0]], 3.0);
    }

    #[test]
    fn assemble_rejects_wrong_sample_size() {
        let map: LabelIndexMap = vec![Label::from("a")].into_iter().collect();
        let bad = Sample {
            pixels: vec![0.0; 3],
            class_index: 0,
        };
        let err = Dataset::assemble(vec![bad], &[2, 2, 1], map, 0.0).unwrap_err();
        assert!(matches!(err, LoaderError::Shape(_)));
    }

    #[test]
    fn assemble_rejects_class_outside_label_map() {
        let map: LabelIndexMap = vec![Label::from("a")].into_iter().collect();
        let err = Dataset::assemble(vec![sample(1.0, 3)], &[2, 2, 1], map, 0.0).unwrap_err();
        assert!(matches!(err, LoaderError::ClassIndex { index: 3, classes: 1 }));
        assert!(!err.is_config());
    }

    #[test]
    fn class_indices_report_rows_without_a_hot_bit() {
        let map: LabelIndexMap = vec![Label::from("a"), Label::from("b")].into_iter().collect();
        let mut ds =
            Dataset::assemble(vec![sample(1.0, 1), sample(2.0, 1)], &[2, 2, 1], map, 0.0).unwrap();
        ds.labels[[0, 1]] = 0;

        assert_eq!(ds.class_indices(), vec![None, Some(1)]);
        assert_eq!(ds.label_of(0), None);
    }

    #[test]
    fn label_map_prefers_exact_names() {
        let map: LabelIndexMap = vec![Label::from("03"), Label::from("3")].into_iter().collect();
        assert_eq!(map.get("03"), Some(0));
        assert_eq!(map.get("3"), Some(1));

        let csv_map: LabelIndexMap = vec![Label::from(3_i64)].into_iter().collect();
        assert_eq!(csv_map.get("3"), Some(0));
    }

    #[test]
    fn split_partitions_samples() {
        let map: LabelIndexMap = vec![Label::from("a"), Label::from("b")].into_iter().collect();
        let samples = (0..10).map(|i| sample(i as f32, i % 2)).collect();
        let ds = Dataset::assemble(samples, &[2, 2, 1], map, 0.2).unwrap();

        let (train, test) = ds.split();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        assert_eq!(train.images.shape()[0], train.labels.nrows());

        let mut seen: Vec<f32> = train
            .images
            .outer_iter()
            .chain(test.images.outer_iter())
            .map(|img| img.iter().copied().next().unwrap())
            .collect();
        seen.sort_by(f32::total_cmp);
        assert_eq!(seen, (0..10).map(|i| i as f32).collect::<Vec<_>>());
    }

    #[test]
    fn split_with_zero_ratio_keeps_everything_for_training() {
        let map: LabelIndexMap = vec![Label::from("a")].into_iter().collect();
        let ds = Dataset::assemble(vec![sample(1.0, 0), sample(2.0, 0)], &[2, 2, 1], map, 0.0)
            .unwrap();
        let (train, test) = ds.split();
        assert_eq!(train.len(), 2);
        assert!(test.is_empty());
    }
}
