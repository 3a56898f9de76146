use crate::BodyPart;

/// Number of features in an [`Embedding`].
pub const EMBEDDING_SIZE: usize = BodyPart::COUNT * 2;

/// Bumped whenever the feature layout or normalization changes. Classifiers
/// trained against one version must not be fed another.
pub const EMBEDDING_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Index of a body part coordinate inside the embedding.
///
/// Layout is `[x0, y0, x1, y1, ..., x16, y16]` in `BodyPart` order.
pub fn feature_index(part: BodyPart, axis: Axis) -> usize {
    part.index() * 2
        + match axis {
            Axis::X => 0,
            Axis::Y => 1,
        }
}

/// Column name for a feature, e.g. `left_wrist_x`.
pub fn feature_name(index: usize) -> Option<String> {
    let part = BodyPart::try_from(index / 2).ok()?;
    let axis = if index % 2 == 0 { "x" } else { "y" };
    Some(format!("{}_{}", part.name(), axis))
}

/// Classifier feature vector: normalized landmarks, flattened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Embedding(pub [f32; EMBEDDING_SIZE]);

impl Embedding {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn get(&self, part: BodyPart, axis: Axis) -> f32 {
        self.0[feature_index(part, axis)]
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.0.to_vec()
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

impl From<Embedding> for [f32; EMBEDDING_SIZE] {
    fn from(embedding: Embedding) -> Self {
        embedding.0
    }
}
