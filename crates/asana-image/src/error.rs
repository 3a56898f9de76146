use std::fmt;

#[derive(Debug)]
pub enum ImageError {
    Decode(String),
    Io(String),
    Shape(String),
    Tensor(asana_base::TensorError),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::Decode(msg) => write!(f, "decode error: {msg}"),
            ImageError::Io(msg) => write!(f, "io error: {msg}"),
            ImageError::Shape(msg) => write!(f, "shape error: {msg}"),
            ImageError::Tensor(err) => write!(f, "tensor error: {err}"),
        }
    }
}

impl std::error::Error for ImageError {}

impl From<image::ImageError> for ImageError {
    fn from(err: image::ImageError) -> Self {
        ImageError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ImageError {
    fn from(err: std::io::Error) -> Self {
        ImageError::Io(err.to_string())
    }
}

impl From<asana_base::TensorError> for ImageError {
    fn from(err: asana_base::TensorError) -> Self {
        ImageError::Tensor(err)
    }
}
