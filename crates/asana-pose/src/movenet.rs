use crate::{BodyPart, KeypointDetector, PoseError};
use asana_base::Tensor;
use ndarray::{Array4, ArrayViewD};
use ort::{inputs, session::Session, value::TensorRef};
use std::path::Path;
use std::sync::OnceLock;

static ORT_INIT: OnceLock<()> = OnceLock::new();

fn ensure_ort_init() {
    ORT_INIT.get_or_init(|| {
        let _ = ort::init().commit();
    });
}

/// Element type the exported model expects for its image input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveNetInput {
    /// Raw 0..255 values as `int32` (TF Hub exports).
    Int32,
    /// Raw 0..255 values as `float32`.
    Float32,
}

/// Single-pose MoveNet running on ONNX Runtime.
///
/// Expects one `[1, size, size, 3]` input and one `[1, 1, 17, 3]` output of
/// `(y, x, score)` rows. Lightning uses 192, Thunder 256.
pub struct MoveNetDetector {
    session: Session,
    input_name: String,
    output_name: String,
    input_size: usize,
    input_type: MoveNetInput,
}

impl MoveNetDetector {
    pub const LIGHTNING_INPUT_SIZE: usize = 192;
    pub const THUNDER_INPUT_SIZE: usize = 256;

    pub fn new(model_path: impl AsRef<Path>, input_size: usize) -> Result<Self, PoseError> {
        ensure_ort_init();
        let path = model_path.as_ref();
        let session = Session::builder()
            .and_then(|builder| builder.with_execution_providers(execution_providers()))
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(PoseError::detector)?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| PoseError::InvalidInput(format!("{} has no inputs", path.display())))?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| PoseError::InvalidInput(format!("{} has no outputs", path.display())))?;

        log::info!(
            "loaded MoveNet {} ({}x{}, input '{}', output '{}')",
            path.display(),
            input_size,
            input_size,
            input_name,
            output_name
        );

        Ok(Self {
            session,
            input_name,
            output_name,
            input_size,
            input_type: MoveNetInput::Int32,
        })
    }

    pub fn with_input_type(mut self, input_type: MoveNetInput) -> Self {
        self.input_type = input_type;
        self
    }
}

#[cfg(not(feature = "cuda"))]
fn execution_providers() -> [ort::execution_providers::ExecutionProviderDispatch; 1] {
    [ort::execution_providers::CPUExecutionProvider::default().build()]
}

#[cfg(feature = "cuda")]
fn execution_providers() -> [ort::execution_providers::ExecutionProviderDispatch; 2] {
    [
        ort::execution_providers::CUDAExecutionProvider::default().build(),
        ort::execution_providers::CPUExecutionProvider::default().build(),
    ]
}

fn parse_output(output: ArrayViewD<'_, f32>) -> Result<Vec<[f32; 3]>, PoseError> {
    if output.shape() != [1, 1, BodyPart::COUNT, 3] {
        return Err(PoseError::InvalidInput(format!(
            "expected MoveNet output [1, 1, {}, 3], got {:?}",
            BodyPart::COUNT,
            output.shape()
        )));
    }
    Ok((0..BodyPart::COUNT)
        .map(|i| [output[[0, 0, i, 0]], output[[0, 0, i, 1]], output[[0, 0, i, 2]]])
        .collect())
}

impl KeypointDetector for MoveNetDetector {
    fn input_size(&self) -> (usize, usize) {
        (self.input_size, self.input_size)
    }

    fn detect_raw(&mut self, input: &Tensor<u8>) -> Result<Vec<[f32; 3]>, PoseError> {
        let shape = match input.hwc() {
            Some((h, w, 3)) if h == self.input_size && w == self.input_size => (1, h, w, 3),
            _ => {
                return Err(PoseError::InvalidInput(format!(
                    "expected [{}, {}, 3] input, got {:?}",
                    self.input_size, self.input_size, input.shape
                )));
            }
        };

        let outputs = match self.input_type {
            MoveNetInput::Int32 => {
                let array = Array4::from_shape_vec(shape, input.data.iter().map(|&v| i32::from(v)).collect())
                    .map_err(PoseError::detector)?;
                let tensor = TensorRef::from_array_view(array.view()).map_err(PoseError::detector)?;
                self.session
                    .run(inputs![self.input_name.as_str() => tensor])
                    .map_err(PoseError::detector)?
            }
            MoveNetInput::Float32 => {
                let array = Array4::from_shape_vec(shape, input.data.iter().map(|&v| f32::from(v)).collect())
                    .map_err(PoseError::detector)?;
                let tensor = TensorRef::from_array_view(array.view()).map_err(PoseError::detector)?;
                self.session
                    .run(inputs![self.input_name.as_str() => tensor])
                    .map_err(PoseError::detector)?
            }
        };

        let output = outputs[self.output_name.as_str()]
            .try_extract_array::<f32>()
            .map_err(PoseError::detector)?;
        parse_output(output)
    }
}
