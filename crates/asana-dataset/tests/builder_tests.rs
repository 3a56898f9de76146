use asana_base::Tensor;
use asana_dataset::{
    BuilderConfig, Dataset, DatasetBuilder, DatasetError, ImageOutcome, SKIPPED_LOG_NAME,
    list_classes, list_images,
};
use asana_pose::{BodyPart, KeypointDetector, PoseError};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("asana_builder_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path) {
    image::RgbImage::from_pixel(64, 48, image::Rgb([120, 80, 40]))
        .save(path)
        .unwrap();
}

/// Layout:
///
/// ```text
/// images/chair/01.png 02.png 03.JPG(corrupt) notes.txt
/// images/tree/a.png
/// images/README.md
/// ```
fn image_tree(root: &Path) -> PathBuf {
    let images = root.join("images");
    fs::create_dir_all(images.join("chair")).unwrap();
    fs::create_dir_all(images.join("tree")).unwrap();
    write_png(&images.join("chair/01.png"));
    write_png(&images.join("chair/02.png"));
    fs::write(images.join("chair/03.JPG"), b"not an image").unwrap();
    fs::write(images.join("chair/notes.txt"), b"ignored").unwrap();
    write_png(&images.join("tree/a.png"));
    fs::write(images.join("README.md"), b"ignored").unwrap();
    images
}

/// Every keypoint of a call gets the next queued score.
struct ScoreDetector {
    scores: VecDeque<f32>,
    calls: usize,
}

impl ScoreDetector {
    fn new(scores: &[f32]) -> Self {
        Self {
            scores: scores.iter().copied().collect(),
            calls: 0,
        }
    }
}

impl KeypointDetector for ScoreDetector {
    fn input_size(&self) -> (usize, usize) {
        (32, 32)
    }

    fn detect_raw(&mut self, input: &Tensor<u8>) -> Result<Vec<[f32; 3]>, PoseError> {
        assert_eq!(input.shape, vec![32, 32, 3]);
        self.calls += 1;
        let score = self.scores.pop_front().unwrap_or(0.0);
        Ok((0..BodyPart::COUNT)
            .map(|i| [0.5 + i as f32 / 100.0, 0.5 - i as f32 / 100.0, score])
            .collect())
    }
}

/// Fails every call, like a broken inference runtime.
struct BrokenDetector;

impl KeypointDetector for BrokenDetector {
    fn input_size(&self) -> (usize, usize) {
        (32, 32)
    }

    fn detect_raw(&mut self, _input: &Tensor<u8>) -> Result<Vec<[f32; 3]>, PoseError> {
        Err(PoseError::detector(std::io::Error::other("onnx runtime crashed")))
    }
}

/// Returns too few keypoints.
struct ShortDetector;

impl KeypointDetector for ShortDetector {
    fn input_size(&self) -> (usize, usize) {
        (32, 32)
    }

    fn detect_raw(&mut self, _input: &Tensor<u8>) -> Result<Vec<[f32; 3]>, PoseError> {
        Ok(vec![[0.5, 0.5, 0.9]; 5])
    }
}

#[test]
fn test_list_classes_and_images() {
    let root = temp_dir("listing");
    let images = image_tree(&root);

    assert_eq!(list_classes(&images).unwrap(), vec!["chair", "tree"]);
    let extensions = BuilderConfig::default().extensions;
    assert_eq!(
        list_images(&images.join("chair"), &extensions).unwrap(),
        vec!["01.png", "02.png", "03.JPG"]
    );

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_build_dataset() {
    let root = temp_dir("build");
    let images = image_tree(&root);
    let output = root.join("out/train.csv");
    let per_class = root.join("out/per_class");

    let mut builder = DatasetBuilder::new(ScoreDetector::new(&[0.9, 0.05, 0.8]));
    let report = builder.build(&images, &output, Some(&per_class)).unwrap();

    assert_eq!(report.class_names, vec!["chair", "tree"]);
    assert_eq!(report.accepted(), 2);
    assert_eq!(report.skipped.len(), 2);
    assert!(report.skipped[0].contains("02.png") && report.skipped[0].contains("low confidence"));
    assert!(report.skipped[1].contains("03.JPG") && report.skipped[1].contains("invalid image"));
    assert_eq!(builder.into_detector().calls, 3);

    // Skip log sits next to the merged CSV.
    assert_eq!(report.skipped_log, root.join("out").join(SKIPPED_LOG_NAME));
    let log = fs::read_to_string(&report.skipped_log).unwrap();
    assert_eq!(log.lines().collect::<Vec<_>>(), report.skipped);

    let dataset = Dataset::load(&output).unwrap();
    assert_eq!(dataset.class_names(), vec!["chair", "tree"]);
    let rows = dataset.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].image_name.as_str(), rows[0].class_no), ("01.png", 0));
    assert_eq!((rows[1].image_name.as_str(), rows[1].class_no), ("a.png", 1));

    // 64x48 photo: crop center (0.5, 0.5) is the image center.
    let nose = rows[0].keypoints[BodyPart::Nose.index()];
    assert!((nose[0] - 32.0).abs() < 1e-3);
    assert!((nose[1] - 24.0).abs() < 1e-3);
    assert_eq!(nose[2], 0.9);

    let chair = Dataset::load(per_class.join("chair.csv")).unwrap();
    assert_eq!(chair.len(), 1);
    let tree = Dataset::load(per_class.join("tree.csv")).unwrap();
    assert_eq!(tree.rows()[0].class_name, "tree");

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_threshold_is_configurable() {
    let root = temp_dir("threshold");
    let images = image_tree(&root);
    let output = root.join("all.csv");

    let config = BuilderConfig::default().with_detection_threshold(0.0);
    let mut builder = DatasetBuilder::new(ScoreDetector::new(&[0.9, 0.05, 0.8]))
        .with_config(config)
        .unwrap();
    let report = builder.build(&images, &output, None).unwrap();

    assert_eq!(report.accepted(), 3);
    assert_eq!(report.skipped.len(), 1);
    assert!(!root.join("per_class").exists());

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_empty_class_still_writes_header() {
    let root = temp_dir("empty_class");
    let images = root.join("images");
    fs::create_dir_all(images.join("plank")).unwrap();
    let output = root.join("out.csv");

    let report = DatasetBuilder::new(ScoreDetector::new(&[]))
        .build(&images, &output, Some(&root.join("per_class")))
        .unwrap();
    assert_eq!(report.accepted(), 0);
    assert!(Dataset::load(&output).unwrap().is_empty());
    assert!(Dataset::load(root.join("per_class/plank.csv")).unwrap().is_empty());
    assert_eq!(fs::read_to_string(&report.skipped_log).unwrap(), "");

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_invalid_builder_config() {
    let config = BuilderConfig::default().with_detection_threshold(2.0);
    assert!(matches!(
        DatasetBuilder::new(ScoreDetector::new(&[])).with_config(config),
        Err(DatasetError::Config(_))
    ));
}

#[test]
fn test_missing_images_root() {
    let mut builder = DatasetBuilder::new(ScoreDetector::new(&[]));
    let result = builder.build(Path::new("/no/such/images"), Path::new("/tmp/out.csv"), None);
    assert!(matches!(result, Err(DatasetError::Io(_))));
}

#[test]
fn test_detector_failure_stops_build() {
    let root = temp_dir("broken_detector");
    let images = image_tree(&root);
    let output = root.join("out/train.csv");

    let result = DatasetBuilder::new(BrokenDetector).build(&images, &output, None);
    match result {
        Err(DatasetError::Pose(PoseError::Detector(err))) => {
            assert_eq!(err.to_string(), "onnx runtime crashed");
        }
        other => panic!("expected detector error, got {:?}", other),
    }
    assert!(!output.exists());

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_process_image_outcomes() {
    let root = temp_dir("outcomes");
    let images = image_tree(&root);

    let mut builder = DatasetBuilder::new(ShortDetector);
    match builder.process_image(&images.join("chair/01.png")).unwrap() {
        ImageOutcome::Skipped(reason) => assert!(reason.contains("no person detected"), "{}", reason),
        other => panic!("expected skip, got {:?}", other),
    }
    match builder.process_image(&images.join("chair/03.JPG")).unwrap() {
        ImageOutcome::Skipped(reason) => assert!(reason.contains("invalid image"), "{}", reason),
        other => panic!("expected skip, got {:?}", other),
    }

    let mut builder = DatasetBuilder::new(BrokenDetector);
    assert!(matches!(
        builder.process_image(&images.join("tree/a.png")),
        Err(DatasetError::Pose(PoseError::Detector(_)))
    ));

    let mut builder = DatasetBuilder::new(ScoreDetector::new(&[0.7]));
    match builder.process_image(&images.join("tree/a.png")).unwrap() {
        ImageOutcome::Accepted(person) => assert_eq!(person.min_score(), 0.7),
        other => panic!("expected accepted person, got {:?}", other),
    }

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_short_detector_output_is_skipped() {
    let root = temp_dir("short_output");
    let images = image_tree(&root);
    let output = root.join("all.csv");

    let report = DatasetBuilder::new(ShortDetector)
        .build(&images, &output, None)
        .unwrap();
    assert_eq!(report.accepted(), 0);
    assert_eq!(report.skipped.len(), 4);
    assert!(report.skipped[0].contains("01.png") && report.skipped[0].contains("no person detected"));

    fs::remove_dir_all(&root).unwrap();
}
