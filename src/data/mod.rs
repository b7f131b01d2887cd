/// Data layer: option validation, loaders, and the assembled dataset.
///
/// Architecture:
/// ```text
///  options (.json / builder)
///        │
///        ▼
///   ┌──────────┐
///   │  config   │  validate → LoaderConfig (fail fast)
///   └──────────┘
///        │
///        ├──────────────────┐
///        ▼                  ▼
///   ┌────────────┐   ┌──────────────────┐
///   │ csv_loader │   │ directory_loader │  decode via image_ops
///   └────────────┘   └──────────────────┘
///        │                  │
///        └────────┬─────────┘
///                 ▼
///   ┌────────────────┐
///   │ model::Dataset │  images, one-hot labels, label index map
///   └────────────────┘
/// ```

pub mod config;
pub mod csv_loader;
pub mod directory_loader;
pub mod error;
pub mod image_ops;
pub mod model;
