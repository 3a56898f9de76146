use asana_image::{ImageError, decode_rgb, decode_rgb_file};
use image::ImageEncoder;

fn encode_png(raw: &[u8], width: u32, height: u32, color: image::ExtendedColorType) -> Vec<u8> {
    let mut buffer = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buffer)
        .write_image(raw, width, height, color)
        .unwrap();
    buffer
}

#[test]
fn test_decode_png_rgb() {
    let img = image::RgbImage::from_fn(3, 2, |x, y| image::Rgb([x as u8 * 10, y as u8 * 20, 7]));
    let buffer = encode_png(img.as_raw(), 3, 2, image::ExtendedColorType::Rgb8);

    let tensor = decode_rgb(&buffer).unwrap();
    assert_eq!(tensor.shape, vec![2, 3, 3]);
    // pixel (y=1, x=2)
    let idx = (1 * 3 + 2) * 3;
    assert_eq!(&tensor.data[idx..idx + 3], &[20, 20, 7]);
}

#[test]
fn test_decode_png_rgba_drops_alpha() {
    let img = image::RgbaImage::from_fn(2, 2, |_, _| image::Rgba([10, 20, 30, 128]));
    let buffer = encode_png(img.as_raw(), 2, 2, image::ExtendedColorType::Rgba8);

    let tensor = decode_rgb(&buffer).unwrap();
    assert_eq!(tensor.shape, vec![2, 2, 3]);
    assert_eq!(&tensor.data[0..3], &[10, 20, 30]);
}

#[test]
fn test_decode_png_grayscale_expands_to_rgb() {
    let buffer = encode_png(&[0, 64, 128, 255], 2, 2, image::ExtendedColorType::L8);

    let tensor = decode_rgb(&buffer).unwrap();
    assert_eq!(tensor.shape, vec![2, 2, 3]);
    assert_eq!(&tensor.data[3..6], &[64, 64, 64]);
}

#[test]
fn test_decode_jpeg_rgb() {
    let mut buffer = Vec::new();
    let img = image::RgbImage::from_fn(8, 4, |_, _| image::Rgb([100, 150, 200]));
    image::codecs::jpeg::JpegEncoder::new(&mut buffer)
        .encode_image(&img)
        .unwrap();

    let tensor = decode_rgb(&buffer).unwrap();
    assert_eq!(tensor.shape, vec![4, 8, 3]);
}

#[test]
fn test_decode_invalid_data() {
    let result = decode_rgb(b"definitely not an image");
    assert!(matches!(result, Err(ImageError::Decode(_))));
}

#[test]
fn test_decode_missing_file() {
    let path = std::env::temp_dir().join(format!("asana-missing-{}.png", std::process::id()));
    let result = decode_rgb_file(&path);
    assert!(matches!(result, Err(ImageError::Io(_))));
}

#[test]
fn test_decode_file_round_trip() {
    let path = std::env::temp_dir().join(format!("asana-decode-{}.png", std::process::id()));
    let img = image::RgbImage::from_fn(5, 7, |_, _| image::Rgb([1, 2, 3]));
    std::fs::write(&path, encode_png(img.as_raw(), 5, 7, image::ExtendedColorType::Rgb8)).unwrap();

    let tensor = decode_rgb_file(&path).unwrap();
    assert_eq!(tensor.hwc(), Some((7, 5, 3)));

    std::fs::remove_file(&path).ok();
}
