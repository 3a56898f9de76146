//! Landmark dataset extraction from a directory of labelled photos.
//!
//! ```text
//! images_root/
//!   chair/   001.jpg 002.png ...
//!   tree/    ...
//! ```
//!
//! Class numbers follow the sorted directory names. Photos that cannot be
//! used are skipped and reported, never fatal.

use crate::schema::DatasetRow;
use crate::{Dataset, DatasetError, write_rows};
use asana_image::decode_rgb_file;
use asana_pose::{CropRegionTracker, KeypointDetector, Person, PoseError, TrackerConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Minimum per-keypoint score for a photo to be kept.
pub const DEFAULT_DETECTION_THRESHOLD: f32 = 0.1;
/// Written next to the merged CSV, one skip message per line.
pub const SKIPPED_LOG_NAME: &str = "skipped_log.txt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub detection_threshold: f32,
    /// Lowercase file extensions to pick up, without the dot.
    pub extensions: Vec<String>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
            extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
        }
    }
}

impl BuilderConfig {
    pub fn with_detection_threshold(mut self, threshold: f32) -> Self {
        self.detection_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), DatasetError> {
        if !(0.0..=1.0).contains(&self.detection_threshold) {
            return Err(DatasetError::Config(format!(
                "detection_threshold must be in [0, 1], got {}",
                self.detection_threshold
            )));
        }
        if self.extensions.is_empty() {
            return Err(DatasetError::Config("no image extensions configured".into()));
        }
        Ok(())
    }
}

/// Result of running detection on one photo.
#[derive(Debug, Clone)]
pub enum ImageOutcome {
    Accepted(Person),
    /// Human-readable reason the photo was left out.
    Skipped(String),
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub class_names: Vec<String>,
    pub rows: Vec<DatasetRow>,
    pub skipped: Vec<String>,
    pub skipped_log: PathBuf,
}

impl BuildReport {
    pub fn accepted(&self) -> usize {
        self.rows.len()
    }

    pub fn dataset(&self) -> Result<Dataset, DatasetError> {
        Dataset::from_rows(self.rows.clone())
    }
}

pub struct DatasetBuilder<D> {
    detector: D,
    tracker: CropRegionTracker,
    config: BuilderConfig,
}

impl<D: KeypointDetector> DatasetBuilder<D> {
    pub fn new(detector: D) -> Self {
        Self {
            detector,
            tracker: CropRegionTracker::new(),
            config: BuilderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BuilderConfig) -> Result<Self, DatasetError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn with_tracker_config(mut self, config: TrackerConfig) -> Result<Self, DatasetError> {
        self.tracker = CropRegionTracker::with_config(config)?;
        Ok(self)
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn into_detector(self) -> D {
        self.detector
    }

    /// Detect the person in one photo.
    ///
    /// Photos are unrelated, so tracking is reset for each one. Unusable
    /// photos come back as [`ImageOutcome::Skipped`]; detector and crop
    /// failures are errors and stop the build.
    pub fn process_image(&mut self, path: &Path) -> Result<ImageOutcome, DatasetError> {
        let image = match decode_rgb_file(path) {
            Ok(image) => image,
            Err(err) => return Ok(ImageOutcome::Skipped(format!("invalid image ({err})"))),
        };
        let person = match self.tracker.detect(&image, &mut self.detector, true) {
            Ok(person) => person,
            Err(PoseError::InvalidInput(reason)) => {
                return Ok(ImageOutcome::Skipped(format!("no person detected ({reason})")));
            }
            Err(err) => {
                log::error!("detection failed on {}: {}", path.display(), err);
                return Err(err.into());
            }
        };

        let min_score = person.min_score();
        if min_score < self.config.detection_threshold {
            return Ok(ImageOutcome::Skipped(format!(
                "low confidence keypoints (min score {min_score:.3})"
            )));
        }
        Ok(ImageOutcome::Accepted(person))
    }

    /// Extract every class under `images_root` into `output_csv`.
    ///
    /// With `per_class_dir`, each class is also written to `<class>.csv` there.
    pub fn build(
        &mut self,
        images_root: &Path,
        output_csv: &Path,
        per_class_dir: Option<&Path>,
    ) -> Result<BuildReport, DatasetError> {
        let class_names = list_classes(images_root)?;
        log::info!(
            "building dataset from {} ({} classes)",
            images_root.display(),
            class_names.len()
        );

        if let Some(dir) = per_class_dir {
            fs::create_dir_all(dir)?;
        }

        let mut rows = Vec::new();
        let mut skipped = Vec::new();

        for (class_no, class_name) in class_names.iter().enumerate() {
            let class_dir = images_root.join(class_name);
            let image_names = list_images(&class_dir, &self.config.extensions)?;
            let mut class_rows = Vec::new();

            for image_name in &image_names {
                let path = class_dir.join(image_name);
                match self.process_image(&path)? {
                    ImageOutcome::Accepted(person) => {
                        class_rows.push(DatasetRow::from_person(
                            image_name.as_str(),
                            class_name.as_str(),
                            class_no,
                            &person,
                        ));
                    }
                    ImageOutcome::Skipped(reason) => {
                        let message = format!("Skipped {}: {}", path.display(), reason);
                        log::warn!("{}", message);
                        skipped.push(message);
                    }
                }
            }

            log::info!(
                "class {} '{}': {} of {} images accepted",
                class_no,
                class_name,
                class_rows.len(),
                image_names.len()
            );

            if let Some(dir) = per_class_dir {
                write_rows(dir.join(format!("{class_name}.csv")), &class_rows)?;
            }
            rows.append(&mut class_rows);
        }

        let log_dir = match output_csv.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&log_dir)?;
        let skipped_log = log_dir.join(SKIPPED_LOG_NAME);
        let mut log_text = skipped.join("\n");
        if !log_text.is_empty() {
            log_text.push('\n');
        }
        fs::write(&skipped_log, log_text)?;

        write_rows(output_csv, &rows)?;
        log::info!(
            "wrote {} rows to {}, {} skipped",
            rows.len(),
            output_csv.display(),
            skipped.len()
        );

        Ok(BuildReport {
            class_names,
            rows,
            skipped,
            skipped_log,
        })
    }
}

/// Subdirectory names of `root`, sorted.
pub fn list_classes(root: &Path) -> Result<Vec<String>, DatasetError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// File names in `dir` whose extension matches, case-insensitively, sorted.
pub fn list_images(dir: &Path, extensions: &[String]) -> Result<Vec<String>, DatasetError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)));
        if matches && path.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
