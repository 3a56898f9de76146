//! On-disk landmark CSV layout.
//!
//! ```text
//! image_name,class_name,class_no,0_x,0_y,0_score,...,16_x,16_y,16_score
//! ```
//!
//! Coordinates are pixels of the source photo, keypoints in `BodyPart` order.

use crate::DatasetError;
use asana_pose::{BodyPart, Person};
use csv::StringRecord;
use std::collections::HashMap;

pub const IMAGE_NAME: &str = "image_name";
pub const CLASS_NAME: &str = "class_name";
pub const CLASS_NO: &str = "class_no";

/// Upper bound (exclusive) on `class_no`. Class tables are indexed by it.
pub const MAX_CLASSES: usize = 1024;

const KEYPOINT_FIELDS: [&str; 3] = ["x", "y", "score"];

/// Full header, keypoint columns named `{index}_{x|y|score}`.
pub fn header() -> Vec<String> {
    let mut columns = vec![IMAGE_NAME.to_string(), CLASS_NAME.to_string(), CLASS_NO.to_string()];
    for i in 0..BodyPart::COUNT {
        for field in KEYPOINT_FIELDS {
            columns.push(format!("{i}_{field}"));
        }
    }
    columns
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    pub image_name: String,
    pub class_name: String,
    pub class_no: usize,
    /// `(x, y, score)` per keypoint.
    pub keypoints: [[f32; 3]; BodyPart::COUNT],
}

impl DatasetRow {
    pub fn from_person(
        image_name: impl Into<String>,
        class_name: impl Into<String>,
        class_no: usize,
        person: &Person,
    ) -> Self {
        Self {
            image_name: image_name.into(),
            class_name: class_name.into(),
            class_no,
            keypoints: person.to_xys_rows(),
        }
    }

    pub fn person(&self) -> Result<Person, DatasetError> {
        Ok(Person::from_xys_rows(&self.keypoints)?)
    }

    pub fn to_record(&self) -> StringRecord {
        let mut record = StringRecord::new();
        record.push_field(&self.image_name);
        record.push_field(&self.class_name);
        record.push_field(&self.class_no.to_string());
        for row in &self.keypoints {
            for value in row {
                record.push_field(&value.to_string());
            }
        }
        record
    }
}

/// Column positions resolved from a header. Extra columns are ignored.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    image_name: usize,
    class_name: usize,
    class_no: usize,
    keypoints: [[usize; 3]; BodyPart::COUNT],
}

impl ColumnMap {
    pub fn from_header(header: &StringRecord) -> Result<Self, DatasetError> {
        let positions: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim(), i))
            .collect();
        let find = |name: &str| {
            positions
                .get(name)
                .copied()
                .ok_or_else(|| DatasetError::Schema(format!("missing column '{name}'")))
        };

        let mut keypoints = [[0; 3]; BodyPart::COUNT];
        for (i, columns) in keypoints.iter_mut().enumerate() {
            for (column, field) in columns.iter_mut().zip(KEYPOINT_FIELDS) {
                *column = find(&format!("{i}_{field}"))?;
            }
        }

        Ok(Self {
            image_name: find(IMAGE_NAME)?,
            class_name: find(CLASS_NAME)?,
            class_no: find(CLASS_NO)?,
            keypoints,
        })
    }

    /// Parse one record. `line` is only used in error messages.
    pub fn parse(&self, record: &StringRecord, line: u64) -> Result<DatasetRow, DatasetError> {
        let field = |index: usize| {
            record
                .get(index)
                .map(str::trim)
                .ok_or_else(|| DatasetError::Schema(format!("line {line}: missing field {index}")))
        };

        let class_no_text = field(self.class_no)?;
        let class_no = parse_class_no(class_no_text)
            .ok_or_else(|| DatasetError::Schema(format!("line {line}: bad class_no '{class_no_text}'")))?;

        let mut keypoints = [[0.0; 3]; BodyPart::COUNT];
        for (values, columns) in keypoints.iter_mut().zip(&self.keypoints) {
            for (value, &column) in values.iter_mut().zip(columns) {
                let text = field(column)?;
                *value = text
                    .parse()
                    .map_err(|_| DatasetError::Schema(format!("line {line}: bad number '{text}'")))?;
            }
        }

        Ok(DatasetRow {
            image_name: field(self.image_name)?.to_string(),
            class_name: field(self.class_name)?.to_string(),
            class_no,
            keypoints,
        })
    }
}

/// Accepts integral floats such as `2.0`, which some tools write.
/// Values at or above [`MAX_CLASSES`] are rejected.
fn parse_class_no(text: &str) -> Option<usize> {
    let class_no = text.parse().ok().or_else(|| {
        let value: f64 = text.parse().ok()?;
        (value >= 0.0 && value < MAX_CLASSES as f64 && value.fract() == 0.0)
            .then_some(value as usize)
    })?;
    (class_no < MAX_CLASSES).then_some(class_no)
}
