//! Shared rectified-view preprocessing: blur, adaptive binarization,
//! morphological opening.

use boardsight_core::GrayImage as CoreGray;
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::open;
use serde::{Deserialize, Serialize};

/// Binarization tuning for the rectified view.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PreprocessParams {
    /// Blur sigma applied to the grayscale view before thresholding.
    pub blur_sigma: f32,
    /// Half-width of the adaptive threshold neighborhood (5 ≙ 11×11 block).
    pub block_radius: u32,
    /// Constant subtracted from the local mean; larger keeps only clearly
    /// dark features as foreground.
    pub offset: i32,
    /// Number of 3×3 opening passes applied to the binary mask.
    pub open_passes: u8,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            blur_sigma: 2.0,
            block_radius: 5,
            offset: 11,
            open_passes: 2,
        }
    }
}

/// Blurred grayscale plus the inverted binary mask derived from it.
pub struct Preprocessed {
    pub blurred: GrayImage,
    pub binary: GrayImage,
}

fn to_image_gray(src: &CoreGray) -> GrayImage {
    GrayImage::from_fn(src.width as u32, src.height as u32, |x, y| {
        Luma([src.get(x as usize, y as usize)])
    })
}

/// Summed-area table with one row/column of zero padding.
fn integral_image(img: &GrayImage) -> Vec<u64> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let stride = w + 1;
    let mut tab = vec![0u64; stride * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += img.get_pixel(x as u32, y as u32).0[0] as u64;
            tab[(y + 1) * stride + x + 1] = tab[y * stride + x + 1] + row_sum;
        }
    }
    tab
}

/// Inverted adaptive mean threshold: a pixel is foreground (255) when it is
/// darker than its neighborhood mean minus `offset`. Dark features (hole
/// shadows, rail markings) come out as foreground on the pale board body.
pub fn adaptive_threshold_inv(img: &GrayImage, block_radius: u32, offset: i32) -> GrayImage {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let tab = integral_image(img);
    let stride = w as usize + 1;
    let r = block_radius as i64;

    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let x0 = (x as i64 - r).max(0) as usize;
        let y0 = (y as i64 - r).max(0) as usize;
        let x1 = (x as i64 + r + 1).min(w) as usize;
        let y1 = (y as i64 + r + 1).min(h) as usize;

        let count = ((x1 - x0) * (y1 - y0)) as i64;
        let sum = (tab[y1 * stride + x1] + tab[y0 * stride + x0]
            - tab[y0 * stride + x1]
            - tab[y1 * stride + x0]) as i64;
        let mean = sum / count;

        let v = img.get_pixel(x, y).0[0] as i64;
        if v <= mean - offset as i64 {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Run the full preprocessing chain on a rectified grayscale view.
pub fn preprocess(rect_gray: &CoreGray, params: &PreprocessParams) -> Preprocessed {
    let gray = to_image_gray(rect_gray);
    let blurred = gaussian_blur_f32(&gray, params.blur_sigma);
    let mut binary = adaptive_threshold_inv(&blurred, params.block_radius, params.offset);
    for _ in 0..params.open_passes {
        binary = open(&binary, Norm::LInf, 1);
    }
    Preprocessed { blurred, binary }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_image_sums_blocks() {
        let img = GrayImage::from_fn(4, 3, |_, _| Luma([2u8]));
        let tab = integral_image(&img);
        // Full-image sum sits in the bottom-right cell.
        assert_eq!(tab[3 * 5 + 4], 4 * 3 * 2);
    }

    #[test]
    fn dark_spot_on_pale_background_becomes_foreground() {
        let mut img = GrayImage::from_fn(40, 40, |_, _| Luma([200u8]));
        for y in 18..22 {
            for x in 18..22 {
                img.put_pixel(x, y, Luma([20u8]));
            }
        }
        let bin = adaptive_threshold_inv(&img, 5, 11);
        assert_eq!(bin.get_pixel(20, 20).0[0], 255);
        assert_eq!(bin.get_pixel(5, 5).0[0], 0);
    }

    #[test]
    fn uniform_image_has_no_foreground() {
        let img = GrayImage::from_fn(30, 30, |_, _| Luma([128u8]));
        let bin = adaptive_threshold_inv(&img, 5, 11);
        assert!(bin.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn chain_keeps_dot_features_and_drops_speckle() {
        let mut core = CoreGray::new(60, 60);
        for v in core.data.iter_mut() {
            *v = 200;
        }
        // A real dot feature...
        for y in 27..33usize {
            for x in 27..33usize {
                if (x as i32 - 30).pow(2) + (y as i32 - 30).pow(2) <= 9 {
                    core.set(x, y, 20);
                }
            }
        }
        // ...and a lone dark pixel far away.
        core.set(10, 10, 0);

        let pre = preprocess(&core, &PreprocessParams::default());
        assert_eq!(pre.binary.get_pixel(30, 30).0[0], 255);
        assert_eq!(pre.binary.get_pixel(10, 10).0[0], 0);
    }
}
