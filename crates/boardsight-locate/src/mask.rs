//! Color segmentation: white-ish pixels of the board body.

use boardsight_core::RgbView;
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{close, erode};

use crate::LocatorParams;

/// Saturation and value of a pixel on the OpenCV-compatible 0..=255 scale.
/// Hue is never needed for a white threshold, so it is not computed.
#[inline]
fn saturation_value(rgb: [u8; 3]) -> (u8, u8) {
    let max = rgb[0].max(rgb[1]).max(rgb[2]);
    let min = rgb[0].min(rgb[1]).min(rgb[2]);
    if max == 0 {
        return (0, 0);
    }
    let s = ((max as u32 - min as u32) * 255 / max as u32) as u8;
    (s, max)
}

#[inline]
fn binarize(img: &GrayImage, thresh: u8) -> GrayImage {
    let mut out = img.clone();
    for p in out.pixels_mut() {
        p.0[0] = if p.0[0] >= thresh { 255 } else { 0 };
    }
    out
}

/// Build the cleaned binary board mask:
/// HSV white threshold, blur + re-threshold, morphological close, erode.
pub fn board_mask(frame: &RgbView<'_>, params: &LocatorParams) -> GrayImage {
    let mask = GrayImage::from_fn(frame.width as u32, frame.height as u32, |x, y| {
        let (s, v) = saturation_value(frame.pixel(x as usize, y as usize));
        if s <= params.saturation_max && v >= params.value_min {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });

    let blurred = gaussian_blur_f32(&mask, params.blur_sigma);
    let mask = binarize(&blurred, params.mask_threshold);

    let mask = close(&mask, Norm::LInf, params.close_radius);
    erode(&mask, Norm::LInf, params.erode_radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturation_value_of_white_and_red() {
        assert_eq!(saturation_value([255, 255, 255]), (0, 255));
        let (s, v) = saturation_value([255, 0, 0]);
        assert_eq!(s, 255);
        assert_eq!(v, 255);
    }

    #[test]
    fn mask_keeps_large_white_region_only() {
        let mut data = vec![0u8; 64 * 64 * 3];
        // 30x30 white block at (16,16); everything else dark green.
        for y in 0..64usize {
            for x in 0..64usize {
                let i = (y * 64 + x) * 3;
                if (16..46).contains(&x) && (16..46).contains(&y) {
                    data[i] = 250;
                    data[i + 1] = 250;
                    data[i + 2] = 245;
                } else {
                    data[i + 1] = 80;
                }
            }
        }
        let frame = RgbView {
            width: 64,
            height: 64,
            data: &data,
        };
        let mask = board_mask(&frame, &LocatorParams::default());
        assert_eq!(mask.get_pixel(30, 30).0[0], 255);
        assert_eq!(mask.get_pixel(4, 4).0[0], 0);
    }
}
