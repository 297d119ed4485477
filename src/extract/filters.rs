// Grayscale filters shared by line detection and glyph mask extraction.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::morphology::{Mask, grayscale_dilate};

/// Output polarity of [`adaptive_threshold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Pixels brighter than the local threshold become 255.
    Normal,
    /// Pixels brighter than the local threshold become 0 (dark ink turns white).
    Inverse,
}

/// Downscale so that the longer side is at most `max_side`, keeping aspect ratio.
///
/// Images already within bounds are returned unchanged; this never upscales.
pub fn prescale(image: DynamicImage, max_side: u32) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    let longer = width.max(height);
    if longer <= max_side || longer == 0 {
        return image;
    }

    let scale = max_side as f64 / longer as f64;
    let new_width = ((width as f64 * scale).round() as u32).max(1);
    let new_height = ((height as f64 * scale).round() as u32).max(1);
    image.resize_exact(new_width, new_height, FilterType::Triangle)
}

/// Median blur with a square `kernel` (odd edge length).
pub fn median_blur(gray: &GrayImage, kernel: u32) -> GrayImage {
    let radius = kernel / 2;
    if radius == 0 {
        return gray.clone();
    }
    imageproc::filter::median_filter(gray, radius, radius)
}

/// Gaussian smoothing over a `kernel x kernel` window, with sigma derived
/// from the kernel size the way OpenCV does for `sigma = 0`.
///
/// Border pixels are replicated.
pub fn gaussian_smooth(gray: &GrayImage, kernel: u32) -> GrayImage {
    let taps = gaussian_kernel(kernel);
    if taps.len() == 1 {
        return gray.clone();
    }
    imageproc::filter::separable_filter_equal(gray, &taps)
}

/// Normalised 1-D Gaussian with exactly `kernel` taps.
fn gaussian_kernel(kernel: u32) -> Vec<f32> {
    let kernel = kernel.max(1);
    let sigma = sigma_for_kernel(kernel);
    let center = (kernel / 2) as f32;
    let weights: Vec<f32> = (0..kernel)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// `0.3 * ((k - 1) * 0.5 - 1) + 0.8`
fn sigma_for_kernel(kernel: u32) -> f32 {
    let k = kernel.max(1) as f32;
    (0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8).max(0.1)
}

/// Locally-thresholded binarization.
///
/// Each pixel is compared against the Gaussian-weighted mean of its
/// `block_size x block_size` neighbourhood minus `c`.
///
/// # Arguments
/// * `gray`       - Single-channel source
/// * `block_size` - Odd neighbourhood edge in pixels
/// * `c`          - Constant subtracted from the local mean
/// * `polarity`   - Which side of the threshold becomes 255
pub fn adaptive_threshold(
    gray: &GrayImage,
    block_size: u32,
    c: f32,
    polarity: Polarity,
) -> GrayImage {
    let local_mean = gaussian_smooth(gray, block_size);
    let (on, off) = match polarity {
        Polarity::Normal => (255u8, 0u8),
        Polarity::Inverse => (0u8, 255u8),
    };

    let mut out = GrayImage::new(gray.width(), gray.height());
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let value = gray.get_pixel(x, y)[0] as f32;
        let threshold = local_mean.get_pixel(x, y)[0] as f32 - c;
        *pixel = Luma([if value > threshold { on } else { off }]);
    }
    out
}

/// Binary dilation with a `width x height` rectangle anchored at
/// `(width / 2, height / 2)`, applied `iterations` times.
///
/// Both sides must fit an imageproc mask (at most 511 pixels); settings
/// validation enforces this.
pub fn dilate_rect(binary: &GrayImage, width: u32, height: u32, iterations: u32) -> GrayImage {
    let rect = GrayImage::from_pixel(width.max(1), height.max(1), Luma([255]));
    let mask = Mask::from_image(&rect, (width / 2) as u8, (height / 2) as u8);

    let mut current = binary.clone();
    for _ in 0..iterations {
        current = grayscale_dilate(&current, &mask);
    }
    current
}
