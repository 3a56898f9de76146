//! Landmark datasets for pose classification.
//!
//! [`DatasetBuilder`] runs the pose tracker over a folder of labelled photos
//! and writes one CSV row of keypoints per accepted photo. [`Dataset`] reads
//! those CSVs back and produces classifier features with the same
//! normalization used at inference time.

pub mod builder;
pub mod config;
pub mod dataset;
pub mod error;
pub mod schema;

pub use builder::{
    BuildReport, BuilderConfig, DatasetBuilder, ImageOutcome, SKIPPED_LOG_NAME, list_classes,
    list_images,
};
pub use config::PipelineConfig;
pub use dataset::{Dataset, write_rows};
pub use error::DatasetError;
pub use schema::{ColumnMap, DatasetRow, MAX_CLASSES, header};
