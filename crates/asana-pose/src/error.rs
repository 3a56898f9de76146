use asana_image::ImageError;
use std::fmt;

#[derive(Debug)]
pub enum PoseError {
    /// Non-positive image dimensions, malformed person, bad tensor shape.
    InvalidInput(String),
    /// Pose size too small to normalize by.
    DegenerateGeometry { pose_size: f32 },
    /// Failure reported by the keypoint detector, passed through untouched.
    Detector(Box<dyn std::error::Error + Send + Sync>),
    Image(ImageError),
    Config(String),
}

impl PoseError {
    /// Wrap an upstream detector failure.
    pub fn detector(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        PoseError::Detector(err.into())
    }
}

impl fmt::Display for PoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoseError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            PoseError::DegenerateGeometry { pose_size } => {
                write!(f, "degenerate pose geometry: pose size {pose_size}")
            }
            PoseError::Detector(err) => write!(f, "detector error: {err}"),
            PoseError::Image(err) => write!(f, "image error: {err}"),
            PoseError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for PoseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PoseError::Detector(err) => Some(&**err),
            PoseError::Image(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ImageError> for PoseError {
    fn from(err: ImageError) -> Self {
        PoseError::Image(err)
    }
}

impl From<serde_json::Error> for PoseError {
    fn from(err: serde_json::Error) -> Self {
        PoseError::Config(err.to_string())
    }
}
