use asana_image::ImageError;
use asana_pose::PoseError;
use std::fmt;

#[derive(Debug)]
pub enum DatasetError {
    Io(std::io::Error),
    Csv(csv::Error),
    /// Missing columns, unparsable values, inconsistent classes.
    Schema(String),
    Pose(PoseError),
    Image(ImageError),
    Config(String),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Io(err) => write!(f, "I/O error: {err}"),
            DatasetError::Csv(err) => write!(f, "CSV error: {err}"),
            DatasetError::Schema(msg) => write!(f, "schema error: {msg}"),
            DatasetError::Pose(err) => write!(f, "pose error: {err}"),
            DatasetError::Image(err) => write!(f, "image error: {err}"),
            DatasetError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Io(err) => Some(err),
            DatasetError::Csv(err) => Some(err),
            DatasetError::Pose(err) => Some(err),
            DatasetError::Image(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        DatasetError::Io(err)
    }
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        DatasetError::Csv(err)
    }
}

impl From<PoseError> for DatasetError {
    fn from(err: PoseError) -> Self {
        DatasetError::Pose(err)
    }
}

impl From<ImageError> for DatasetError {
    fn from(err: ImageError) -> Self {
        DatasetError::Image(err)
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        DatasetError::Config(err.to_string())
    }
}
