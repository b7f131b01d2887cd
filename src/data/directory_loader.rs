use std::path::{Path, PathBuf};

use super::config::{self, ImageDimensions, LoaderConfig, LoaderOptions};
use super::error::{LoaderError, Result};
use super::image_ops;
use super::model::{Dataset, Label, LabelIndexMap, Sample};

// ---------------------------------------------------------------------------
// DirectoryDataLoader
// ---------------------------------------------------------------------------

/// Loads images from a tree where every sub-directory is a class:
///
/// ```text
/// root/
///   happiness/
///     frame_000.png
///     frame_001.png
///   sadness/
///     frame_000.png
/// ```
///
/// Labels get indices in lexical order of their directory names; files are
/// read in lexical order too. With `time_steps` set, consecutive files of a
/// label are grouped into non-overlapping windows of that many frames.
#[derive(Debug, Clone)]
pub struct DirectoryDataLoader {
    config: LoaderConfig,
    time_steps: Option<usize>,
}

/// A label directory and its frame files, both sorted.
struct LabelDir {
    name: String,
    files: Vec<PathBuf>,
}

impl DirectoryDataLoader {
    pub fn new(options: LoaderOptions) -> Result<Self> {
        let config = LoaderConfig::from_options(&options)?;
        let time_steps = config::time_steps(options.time_steps)?;

        if options.csv_label_col.is_some() || options.csv_image_col.is_some() {
            return Err(LoaderError::Config(
                "CSV column options are not valid for directory data".into(),
            ));
        }
        if !config.datapath.is_dir() {
            return Err(LoaderError::NotADirectory(config.datapath.clone()));
        }

        Ok(DirectoryDataLoader { config, time_steps })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn time_steps(&self) -> Option<usize> {
        self.time_steps
    }

    /// Walk the tree and decode every frame. Nothing is cached between calls.
    pub fn load_data(&self) -> Result<Dataset> {
        let root = &self.config.datapath;
        if !root.is_dir() {
            return Err(LoaderError::NotADirectory(root.clone()));
        }

        let label_dirs = self.scan(root)?;

        let mut label_index_map = LabelIndexMap::new();
        let mut dims = self.config.image_dimensions;
        let mut samples = Vec::new();

        for dir in &label_dirs {
            let class_index = label_index_map.insert(Label::Name(dir.name.clone()));
            log::debug!("Label '{}' -> {class_index}: {} files", dir.name, dir.files.len());

            if let Some(steps) = self.time_steps {
                if dir.files.len() < steps {
                    return Err(LoaderError::TimeSteps {
                        label: dir.name.clone(),
                        available: dir.files.len(),
                        time_steps: steps,
                    });
                }
            }

            let mut frames = Vec::with_capacity(dir.files.len());
            for path in &dir.files {
                frames.push(self.decode(path, &mut dims)?);
            }

            match self.time_steps {
                None => samples.extend(frames.into_iter().map(|pixels| Sample {
                    pixels,
                    class_index,
                })),
                Some(steps) => {
                    let leftover = frames.len() % steps;
                    if leftover > 0 {
                        log::warn!(
                            "Label '{}': dropping {leftover} trailing frames that do not fill a window of {steps}",
                            dir.name
                        );
                    }
                    for window in frames.chunks_exact(steps) {
                        samples.push(Sample {
                            pixels: window.concat(),
                            class_index,
                        });
                    }
                }
            }
        }

        // `scan` guarantees at least one frame, so `dims` is known here.
        let dims = dims.ok_or_else(|| {
            LoaderError::EmptyDataset(format!("no frames under {}", root.display()))
        })?;
        let frame_shape = self.config.frame_shape(dims);
        let shape: Vec<usize> = match self.time_steps {
            Some(steps) => std::iter::once(steps).chain(frame_shape).collect(),
            None => frame_shape.to_vec(),
        };

        log::info!(
            "Loaded {} samples of shape {:?} across {} labels from {}",
            samples.len(),
            shape,
            label_index_map.len(),
            root.display()
        );

        Dataset::assemble(samples, &shape, label_index_map, self.config.validation_split)
    }

    /// Collect label directories (filtered by the target set, if any) and
    /// their frame files.
    fn scan(&self, root: &Path) -> Result<Vec<LabelDir>> {
        let mut dirs: Vec<(String, PathBuf)> = Vec::new();
        for entry in std::fs::read_dir(root)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                log::debug!("Skipping non UTF-8 directory {}", path.display());
                continue;
            };
            if let Some(targets) = &self.config.target_labels {
                if !is_target(targets, &name) {
                    log::debug!("Skipping label '{name}' outside the target set");
                    continue;
                }
            }
            dirs.push((name, path));
        }
        dirs.sort_by(|a, b| a.0.cmp(&b.0));

        if dirs.is_empty() {
            return Err(LoaderError::EmptyDataset(format!(
                "no label directories in {}",
                root.display()
            )));
        }

        let mut label_dirs = Vec::with_capacity(dirs.len());
        for (name, dir) in dirs {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_file() && image_ops::is_image(&path) {
                    files.push(path);
                } else {
                    log::debug!("Skipping {}", path.display());
                }
            }
            files.sort();

            if files.is_empty() {
                return Err(LoaderError::EmptyDataset(format!(
                    "label directory {} holds no images",
                    dir.display()
                )));
            }
            label_dirs.push(LabelDir { name, files });
        }
        Ok(label_dirs)
    }

    /// Decode one frame. The first frame fixes the size when none was configured.
    fn decode(&self, path: &Path, dims: &mut Option<ImageDimensions>) -> Result<Vec<f32>> {
        let img = image_ops::open(path)?;
        let target = *dims.get_or_insert_with(|| image_ops::dimensions_of(&img));
        Ok(image_ops::to_pixels(&img, target, self.config.out_channels))
    }
}

/// A directory matches a target by its exact name, or by integer value so
/// that a target `3` selects directory `3`.
fn is_target(targets: &LabelIndexMap, name: &str) -> bool {
    targets.index_of(&Label::Name(name.to_string())).is_some()
        || targets.index_of(&Label::parse(name)).is_some()
}
