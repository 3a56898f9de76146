use asana_dataset::{Dataset, DatasetError, DatasetRow, MAX_CLASSES, header, write_rows};
use asana_pose::{BodyPart, EMBEDDING_SIZE, NormalizerConfig, embed};
use std::fs;
use std::path::PathBuf;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("asana_dataset_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn keypoints(shift: f32) -> [[f32; 3]; BodyPart::COUNT] {
    let mut rows = [[0.0; 3]; BodyPart::COUNT];
    for (i, row) in rows.iter_mut().enumerate() {
        let i = i as f32;
        *row = [100.0 + shift + 9.0 * (i % 3.0), 40.0 + 25.0 * i, 0.5 + i / 100.0];
    }
    rows
}

fn row(image: &str, class_name: &str, class_no: usize, shift: f32) -> DatasetRow {
    DatasetRow {
        image_name: image.into(),
        class_name: class_name.into(),
        class_no,
        keypoints: keypoints(shift),
    }
}

fn sample_rows() -> Vec<DatasetRow> {
    vec![
        row("a.jpg", "chair", 0, 0.0),
        row("b.jpg", "chair", 0, 3.5),
        row("c.png", "tree", 1, -10.25),
    ]
}

#[test]
fn test_write_then_load() {
    let dir = temp_dir("roundtrip");
    let path = dir.join("data.csv");
    write_rows(&path, &sample_rows()).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let first_line = text.lines().next().unwrap();
    assert_eq!(first_line, header().join(","));
    assert!(first_line.starts_with("image_name,class_name,class_no,0_x,0_y,0_score,1_x"));

    let dataset = Dataset::load(&path).unwrap();
    assert_eq!(dataset.rows(), sample_rows().as_slice());
    assert_eq!(dataset.class_names(), vec!["chair", "tree"]);
    assert_eq!(dataset.num_classes(), 2);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_load_ignores_extra_columns_and_accepts_float_class() {
    let dir = temp_dir("extra_columns");
    let path = dir.join("data.csv");

    let mut columns = header();
    columns.push("note".into());
    let mut values = sample_rows()[0].to_record().iter().map(String::from).collect::<Vec<_>>();
    values[2] = "0.0".into();
    values.push("hello".into());
    fs::write(&path, format!("{}\n{}\n", columns.join(","), values.join(","))).unwrap();

    let dataset = Dataset::load(&path).unwrap();
    assert_eq!(dataset.rows(), &sample_rows()[..1]);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_load_missing_column() {
    let dir = temp_dir("missing_column");
    let path = dir.join("data.csv");
    let columns: Vec<String> = header().into_iter().filter(|c| c != "7_y").collect();
    fs::write(&path, format!("{}\n", columns.join(","))).unwrap();

    match Dataset::load(&path) {
        Err(DatasetError::Schema(msg)) => assert!(msg.contains("7_y")),
        other => panic!("expected schema error, got {:?}", other),
    }

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_load_bad_number() {
    let dir = temp_dir("bad_number");
    let path = dir.join("data.csv");
    let mut values = sample_rows()[0].to_record().iter().map(String::from).collect::<Vec<_>>();
    values[10] = "abc".into();
    fs::write(&path, format!("{}\n{}\n", header().join(","), values.join(","))).unwrap();

    match Dataset::load(&path) {
        Err(DatasetError::Schema(msg)) => assert!(msg.contains("line 2"), "{}", msg),
        other => panic!("expected schema error, got {:?}", other),
    }

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_load_rejects_out_of_range_class_no() {
    let dir = temp_dir("huge_class_no");
    let path = dir.join("data.csv");

    for class_no in ["18446744073709551615", "4294967296", "1e18", "1024"] {
        let mut values = sample_rows()[0].to_record().iter().map(String::from).collect::<Vec<_>>();
        values[2] = class_no.into();
        fs::write(&path, format!("{}\n{}\n", header().join(","), values.join(","))).unwrap();

        match Dataset::load(&path) {
            Err(DatasetError::Schema(msg)) => assert!(msg.contains("line 2"), "{}", msg),
            other => panic!("expected schema error for {}, got {:?}", class_no, other),
        }
    }

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_from_rows_rejects_class_no_at_limit() {
    let rows = vec![
        row("a.jpg", "chair", 0, 0.0),
        row("b.jpg", "tree", MAX_CLASSES, 0.0),
    ];
    assert!(matches!(Dataset::from_rows(rows), Err(DatasetError::Schema(_))));

    let rows = vec![row("a.jpg", "chair", usize::MAX, 0.0)];
    assert!(matches!(Dataset::from_rows(rows), Err(DatasetError::Schema(_))));

    let last = vec![row("a.jpg", "chair", MAX_CLASSES - 1, 0.0)];
    assert_eq!(Dataset::from_rows(last).unwrap().num_classes(), MAX_CLASSES);
}

#[test]
fn test_load_missing_file() {
    assert!(matches!(
        Dataset::load("/definitely/not/here.csv"),
        Err(DatasetError::Csv(_))
    ));
}

#[test]
fn test_conflicting_class_names() {
    let rows = vec![row("a.jpg", "chair", 0, 0.0), row("b.jpg", "tree", 0, 0.0)];
    assert!(matches!(Dataset::from_rows(rows), Err(DatasetError::Schema(_))));
}

#[test]
fn test_one_hot_labels() {
    let dataset = Dataset::from_rows(sample_rows()).unwrap();
    assert_eq!(
        dataset.one_hot_labels(),
        vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]]
    );
}

#[test]
fn test_class_gaps_keep_numbering() {
    let rows = vec![row("a.jpg", "chair", 0, 0.0), row("c.png", "warrior", 2, 0.0)];
    let dataset = Dataset::from_rows(rows).unwrap();
    assert_eq!(dataset.num_classes(), 3);
    assert_eq!(dataset.class_names(), vec!["chair", "warrior"]);
    assert_eq!(dataset.one_hot_labels()[1], vec![0.0, 0.0, 1.0]);
    assert_eq!(dataset.class_counts(), vec![(0, "chair", 1), (2, "warrior", 1)]);
}

#[test]
fn test_embeddings_match_live_inference() {
    let dataset = Dataset::from_rows(sample_rows()).unwrap();
    let embeddings = dataset.embeddings().unwrap();
    assert_eq!(embeddings.len(), 3);

    for (row, embedding) in dataset.rows().iter().zip(&embeddings) {
        let person = row.person().unwrap();
        assert_eq!(*embedding, embed(&person).unwrap());
    }
    // Translated copies embed identically.
    for (a, b) in embeddings[0].as_slice().iter().zip(embeddings[2].as_slice()) {
        assert!((a - b).abs() < 1e-5);
    }
}

#[test]
fn test_degenerate_row_fails_embedding() {
    let mut bad = row("flat.jpg", "chair", 0, 0.0);
    bad.keypoints = [[1.0, 1.0, 0.9]; BodyPart::COUNT];
    let dataset = Dataset::from_rows(vec![bad]).unwrap();
    assert!(matches!(dataset.embeddings(), Err(DatasetError::Pose(_))));
}

#[test]
fn test_write_embeddings() {
    let dir = temp_dir("embeddings");
    let path = dir.join("features.csv");
    let dataset = Dataset::from_rows(sample_rows()).unwrap();
    dataset.write_embeddings(&path, &NormalizerConfig::default()).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("class_no,nose_x,nose_y,left_eye_x"));
    assert_eq!(lines[0].split(',').count(), EMBEDDING_SIZE + 1);
    assert!(lines[3].starts_with("1,"));

    fs::remove_dir_all(&dir).unwrap();
}
