//! Image preprocessing ahead of OCR
//!
//! Cleans up photographed or scanned notes so Tesseract has something to
//! work with: grayscale, fixed-strength denoise, upscale small images to a
//! minimum width, equalize the histogram, then binarize with an adaptive
//! threshold (robust to uneven lighting across a photo).

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use imageproc::contrast::{adaptive_threshold, equalize_histogram};
use imageproc::filter::{gaussian_blur_f32, median_filter};

/// Images narrower than this are upscaled before OCR.
pub const MIN_OCR_WIDTH: u32 = 1000;

/// Suffix appended to the upload path for the processed sibling file.
pub const PROCESSED_SUFFIX: &str = "_proc.png";

/// Denoise parameters, fixed. Median knocks out salt-and-pepper noise,
/// the Gaussian pass smooths sensor grain before thresholding.
const MEDIAN_RADIUS: u32 = 1;
const BLUR_SIGMA: f32 = 1.0;

/// Adaptive threshold window: radius 15 = a 31x31 neighborhood.
const THRESHOLD_BLOCK_RADIUS: u32 = 15;

#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("could not read image for preprocessing: {0}")]
    Decode(String),

    #[error("could not write processed image: {0}")]
    Write(String),
}

/// Path of the processed sibling for an upload: `<input_path>_proc.png`.
pub fn processed_path(input: &Path) -> PathBuf {
    let mut path = input.as_os_str().to_os_string();
    path.push(PROCESSED_SUFFIX);
    PathBuf::from(path)
}

/// Preprocess the uploaded image and write the binarized result next to it.
///
/// Returns the path of the processed image. A file that cannot be decoded
/// (missing, truncated, or not an image at all) yields a `Decode` error —
/// the caller aborts that upload and reports it, nothing more.
pub fn preprocess_image(input: &Path) -> Result<PathBuf, PreprocessError> {
    let decoded = image::open(input).map_err(|e| PreprocessError::Decode(e.to_string()))?;
    let gray = decoded.to_luma8();

    let denoised = gaussian_blur_f32(
        &median_filter(&gray, MEDIAN_RADIUS, MEDIAN_RADIUS),
        BLUR_SIGMA,
    );

    // Small photos OCR badly; upscale isotropically to the minimum width.
    let scaled = if denoised.width() < MIN_OCR_WIDTH {
        let scale = MIN_OCR_WIDTH as f32 / denoised.width() as f32;
        let height = ((denoised.height() as f32 * scale).round() as u32).max(1);
        imageops::resize(&denoised, MIN_OCR_WIDTH, height, FilterType::Triangle)
    } else {
        denoised
    };

    let equalized = equalize_histogram(&scaled);
    let binarized = adaptive_threshold(&equalized, THRESHOLD_BLOCK_RADIUS);

    let output = processed_path(input);
    binarized
        .save(&output)
        .map_err(|e| PreprocessError::Write(e.to_string()))?;

    tracing::debug!(
        input = %input.display(),
        output = %output.display(),
        width = binarized.width(),
        height = binarized.height(),
        "preprocessed image for OCR"
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_test_image(path: &Path, width: u32, height: u32) {
        // Light background with a dark band, enough structure to survive
        // thresholding.
        let img = RgbImage::from_fn(width, height, |_, y| {
            if y % 10 < 3 {
                Rgb([20u8, 20, 20])
            } else {
                Rgb([230u8, 228, 225])
            }
        });
        img.save(path).unwrap();
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = preprocess_image(&dir.path().join("missing.png"));
        assert!(matches!(result, Err(PreprocessError::Decode(_))));
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let result = preprocess_image(&path);
        assert!(matches!(result, Err(PreprocessError::Decode(_))));
    }

    #[test]
    fn small_images_are_upscaled_to_min_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.png");
        write_test_image(&path, 400, 300);

        let output = preprocess_image(&path).unwrap();
        assert_eq!(output, dir.path().join("small.png_proc.png"));

        let processed = image::open(&output).unwrap();
        assert!(processed.width() >= MIN_OCR_WIDTH);
    }

    #[test]
    fn wide_images_keep_their_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        write_test_image(&path, 1600, 200);

        let output = preprocess_image(&path).unwrap();
        let processed = image::open(&output).unwrap();
        assert_eq!(processed.width(), 1600);
    }

    #[test]
    fn processed_path_appends_suffix() {
        assert_eq!(
            processed_path(Path::new("static/uploads/note.jpg")),
            PathBuf::from("static/uploads/note.jpg_proc.png")
        );
    }
}
