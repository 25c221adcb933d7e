//! Mask cleaning: morphological closing, opening and Gaussian smoothing.
//!
//! Closing fills small holes inside a blob, opening then removes isolated
//! specks, and the final blur softens the blob border so that gradient-based
//! stages downstream see a smooth edge. The operators come from `imageproc`;
//! borders replicate the edge pixel.

use ::image::{ImageBuffer, Luma};
use imageproc::distance_transform::Norm;
use imageproc::filter::separable_filter_equal;
use serde::{Deserialize, Serialize};

use crate::{GrayImage, GrayImageView};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Parameters for [`clean_mask`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CleanParams {
    /// Side of the square structuring element (pixels).
    pub kernel_size: usize,
    /// Side of the square Gaussian kernel (odd).
    pub blur_size: usize,
    /// Gaussian sigma; `<= 0` derives it from `blur_size`.
    pub blur_sigma: f64,
}

impl Default for CleanParams {
    fn default() -> Self {
        Self {
            kernel_size: 5,
            blur_size: 9,
            blur_sigma: 1.5,
        }
    }
}

type MorphOp = fn(&::image::GrayImage, Norm, u8) -> ::image::GrayImage;

/// Close, open, then blur a binary mask.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(mask, params), fields(width = mask.width, height = mask.height))
)]
pub fn clean_mask(mask: &GrayImageView<'_>, params: &CleanParams) -> GrayImage {
    let closed = close(mask, params.kernel_size);
    let opened = open(&closed.view(), params.kernel_size);
    gaussian_blur(&opened.view(), params.blur_size, params.blur_sigma)
}

/// Dilation followed by erosion with a `k x k` square.
pub fn close(mask: &GrayImageView<'_>, kernel_size: usize) -> GrayImage {
    morph(mask, kernel_size, imageproc::morphology::close)
}

/// Erosion followed by dilation with a `k x k` square.
pub fn open(mask: &GrayImageView<'_>, kernel_size: usize) -> GrayImage {
    morph(mask, kernel_size, imageproc::morphology::open)
}

fn morph(mask: &GrayImageView<'_>, kernel_size: usize, op: MorphOp) -> GrayImage {
    if kernel_size <= 1 || mask.width == 0 || mask.height == 0 {
        return mask.to_owned();
    }
    // L-inf ball of radius k/2 is the k x k square
    let radius = (kernel_size / 2).min(usize::from(u8::MAX)) as u8;
    op(&mask.to_luma(), Norm::LInf, radius).into()
}

/// Separable Gaussian blur with a `ksize`-tap kernel.
pub fn gaussian_blur(img: &GrayImageView<'_>, ksize: usize, sigma: f64) -> GrayImage {
    let (w, h) = (img.width, img.height);
    if ksize <= 1 || w == 0 || h == 0 {
        return img.to_owned();
    }
    let kernel: Vec<f32> = gaussian_kernel(ksize, sigma)
        .into_iter()
        .map(|k| k as f32)
        .collect();

    // filter in f32 so flat regions round back to their exact value
    let src: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(w as u32, h as u32, |x, y| {
            Luma([f32::from(img.get(x as usize, y as usize))])
        });
    let blurred = separable_filter_equal(&src, &kernel);
    GrayImage {
        width: w,
        height: h,
        data: blurred
            .into_raw()
            .into_iter()
            .map(|v| v.round().clamp(0.0, 255.0) as u8)
            .collect(),
    }
}

fn gaussian_kernel(ksize: usize, sigma: f64) -> Vec<f64> {
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let c = (ksize as f64 - 1.0) * 0.5;
    let mut k: Vec<f64> = (0..ksize)
        .map(|i| {
            let d = i as f64 - c;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = k.iter().sum();
    for v in &mut k {
        *v /= sum;
    }
    k
}
