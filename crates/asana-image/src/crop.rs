use crate::ImageError;
use asana_base::Tensor;

/// Crop rectangle in normalized image coordinates.
///
/// Edges may lie outside `[0, 1]`; the part of the crop that falls outside the
/// source image is filled with black.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropBox {
    pub y_min: f32,
    pub x_min: f32,
    pub y_max: f32,
    pub x_max: f32,
}

impl CropBox {
    pub fn new(y_min: f32, x_min: f32, y_max: f32, x_max: f32) -> Self {
        Self {
            y_min,
            x_min,
            y_max,
            x_max,
        }
    }

    /// The whole image.
    pub fn full() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    fn validate(&self) -> Result<(), ImageError> {
        let finite = [self.y_min, self.x_min, self.y_max, self.x_max]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.y_max <= self.y_min || self.x_max <= self.x_min {
            return Err(ImageError::Shape(format!("degenerate crop box {:?}", self)));
        }
        Ok(())
    }
}

/// Crop `image` to `crop` and resample it to `out_height` x `out_width`.
///
/// `image` must be HWC with 3 channels. Sampling is bilinear with pixel
/// centers at half-integer positions. Samples outside the source read as 0,
/// which is the same as zero-padding the crop before resizing it.
pub fn crop_and_resize(
    image: &Tensor<u8>,
    crop: CropBox,
    out_height: usize,
    out_width: usize,
) -> Result<Tensor<u8>, ImageError> {
    let (h, w) = match image.hwc() {
        Some((h, w, 3)) if h > 0 && w > 0 => (h, w),
        _ => {
            return Err(ImageError::Shape(format!(
                "expected non-empty [H, W, 3] image, got {:?}",
                image.shape
            )));
        }
    };
    // fields are public, so the buffer may not match the shape
    let expected = h.checked_mul(w).and_then(|n| n.checked_mul(3));
    if expected != Some(image.data.len()) {
        return Err(ImageError::Shape(format!(
            "image data has {} bytes, shape {:?} needs {:?}",
            image.data.len(),
            image.shape,
            expected
        )));
    }
    if out_height == 0 || out_width == 0 {
        return Err(ImageError::Shape(format!(
            "output size must be positive, got {}x{}",
            out_height, out_width
        )));
    }
    crop.validate()?;

    let top = crop.y_min * h as f32;
    let left = crop.x_min * w as f32;
    let step_y = (crop.y_max - crop.y_min) * h as f32 / out_height as f32;
    let step_x = (crop.x_max - crop.x_min) * w as f32 / out_width as f32;

    let pixel = |y: i64, x: i64, ch: usize| -> f32 {
        if y < 0 || x < 0 || y >= h as i64 || x >= w as i64 {
            0.0
        } else {
            image.data[(y as usize * w + x as usize) * 3 + ch] as f32
        }
    };

    let mut data = vec![0u8; out_height * out_width * 3];
    for oy in 0..out_height {
        let sy = top + (oy as f32 + 0.5) * step_y - 0.5;
        let y0 = sy.floor();
        let fy = sy - y0;
        let y0 = y0 as i64;

        for ox in 0..out_width {
            let sx = left + (ox as f32 + 0.5) * step_x - 0.5;
            let x0 = sx.floor();
            let fx = sx - x0;
            let x0 = x0 as i64;

            for ch in 0..3 {
                let top_row = pixel(y0, x0, ch) * (1.0 - fx) + pixel(y0, x0 + 1, ch) * fx;
                let bottom_row =
                    pixel(y0 + 1, x0, ch) * (1.0 - fx) + pixel(y0 + 1, x0 + 1, ch) * fx;
                let value = top_row * (1.0 - fy) + bottom_row * fy;
                data[(oy * out_width + ox) * 3 + ch] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    Ok(Tensor::new(vec![out_height, out_width, 3], data)?)
}
