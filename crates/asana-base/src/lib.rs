pub mod logging;
pub mod tensor;
pub mod vec2;

pub use logging::{
    FileLogger, LogConfig, StdoutLogger, init_file_logger, init_stdout_logger,
};
pub use tensor::{Tensor, TensorError};
pub use vec2::Vec2;

// Re-export log crate so downstream crates can use asana_base::log::*
pub use log;
