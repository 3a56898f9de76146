use crate::DatasetError;
use crate::schema::{CLASS_NO, ColumnMap, DatasetRow, MAX_CLASSES, header};
use asana_pose::normalizer::embed_landmarks_with;
use asana_pose::{EMBEDDING_SIZE, Embedding, NormalizerConfig, feature_name};
use csv::{ReaderBuilder, Writer};
use std::path::Path;

/// Landmark rows of one CSV, with the class names they reference.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<DatasetRow>,
    /// Indexed by `class_no`. `None` for numbers no row uses.
    classes: Vec<Option<String>>,
}

impl Dataset {
    /// Fails if two rows give different names to the same `class_no`, or if
    /// a `class_no` is not below [`MAX_CLASSES`].
    pub fn from_rows(rows: Vec<DatasetRow>) -> Result<Self, DatasetError> {
        let mut classes: Vec<Option<String>> = Vec::new();
        for row in &rows {
            if row.class_no >= MAX_CLASSES {
                return Err(DatasetError::Schema(format!(
                    "class_no {} of '{}' exceeds the limit of {} classes",
                    row.class_no, row.image_name, MAX_CLASSES
                )));
            }
            if classes.len() <= row.class_no {
                classes.resize(row.class_no + 1, None);
            }
            match &classes[row.class_no] {
                Some(name) if *name != row.class_name => {
                    return Err(DatasetError::Schema(format!(
                        "class {} is named both '{}' and '{}'",
                        row.class_no, name, row.class_name
                    )));
                }
                Some(_) => {}
                None => classes[row.class_no] = Some(row.class_name.clone()),
            }
        }
        Ok(Self { rows, classes })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
        let columns = ColumnMap::from_header(reader.headers()?)?;

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            // 1-based, header is line 1.
            let line = record.position().map_or(i as u64 + 2, |p| p.line());
            rows.push(columns.parse(&record, line)?);
        }

        log::debug!("loaded {} rows from {}", rows.len(), path.display());
        Self::from_rows(rows)
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// One past the highest `class_no`.
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Names of the classes present, ordered by `class_no`.
    pub fn class_names(&self) -> Vec<&str> {
        self.classes.iter().flatten().map(String::as_str).collect()
    }

    /// `(class_no, class_name, rows)` for every class present.
    pub fn class_counts(&self) -> Vec<(usize, &str, usize)> {
        let mut counts = vec![0; self.classes.len()];
        for row in &self.rows {
            counts[row.class_no] += 1;
        }
        self.classes
            .iter()
            .enumerate()
            .filter_map(|(class_no, name)| Some((class_no, name.as_deref()?, counts[class_no])))
            .collect()
    }

    /// Classifier features per row, via the same transform used at inference time.
    pub fn embeddings(&self) -> Result<Vec<Embedding>, DatasetError> {
        self.embeddings_with(&NormalizerConfig::default())
    }

    pub fn embeddings_with(&self, config: &NormalizerConfig) -> Result<Vec<Embedding>, DatasetError> {
        self.rows
            .iter()
            .map(|row| -> Result<Embedding, DatasetError> {
                let person = row.person()?;
                let embedding = embed_landmarks_with(&person.landmarks(), config).inspect_err(|err| {
                    log::warn!("cannot embed {}/{}: {}", row.class_name, row.image_name, err);
                })?;
                Ok(embedding)
            })
            .collect()
    }

    /// One-hot targets of width [`Dataset::num_classes`].
    pub fn one_hot_labels(&self) -> Vec<Vec<f32>> {
        self.rows
            .iter()
            .map(|row| {
                let mut label = vec![0.0; self.num_classes()];
                label[row.class_no] = 1.0;
                label
            })
            .collect()
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        write_rows(path, &self.rows)
    }

    /// Write `class_no` plus the named embedding features, one line per row.
    pub fn write_embeddings(
        &self,
        path: impl AsRef<Path>,
        config: &NormalizerConfig,
    ) -> Result<(), DatasetError> {
        let embeddings = self.embeddings_with(config)?;
        let mut writer = Writer::from_path(path.as_ref())?;

        let mut columns = vec![CLASS_NO.to_string()];
        columns.extend((0..EMBEDDING_SIZE).filter_map(feature_name));
        writer.write_record(&columns)?;

        for (row, embedding) in self.rows.iter().zip(&embeddings) {
            let mut record = vec![row.class_no.to_string()];
            record.extend(embedding.as_slice().iter().map(f32::to_string));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Write rows under the standard header. An empty slice still gets a header.
pub fn write_rows(path: impl AsRef<Path>, rows: &[DatasetRow]) -> Result<(), DatasetError> {
    let mut writer = Writer::from_path(path.as_ref())?;
    writer.write_record(header())?;
    for row in rows {
        writer.write_record(&row.to_record())?;
    }
    writer.flush()?;
    Ok(())
}
