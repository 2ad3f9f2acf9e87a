//! background mask construction
//!
//! masks are two-level `GrayImage`s the size of their source image:
//! [`MASK_MAX`] marks pixels matching the background key, [`MASK_MIN`]
//! marks subject pixels. two match metrics exist side by side and are
//! deliberately not unified: detected reference colors are matched with the
//! per-channel box check ([`range_mask`]), caller-supplied key colors with
//! the euclidean check ([`distance_mask`]). the two disagree near the
//! tolerance boundary (a cube vs a sphere in color space) and existing
//! outputs depend on which one a mode uses.

pub mod connectivity;
pub mod grow;

use image::{GrayImage, Luma, Rgb, RgbaImage};

pub const MASK_MIN: u8 = 0;
pub const MASK_MAX: u8 = u8::MAX;

/// marks every pixel whose channels all lie within `tolerance` of the
/// reference, i.e. `|channel - reference| <= tolerance` independently per
/// channel. alpha plays no part in the comparison.
pub fn range_mask(image: &RgbaImage, reference: Rgb<u8>, tolerance: u8) -> GrayImage {
    let (width, height) = image.dimensions();
    let tolerance = i16::from(tolerance);

    GrayImage::from_fn(width, height, |x, y| {
        let pixel = image.get_pixel(x, y);
        // widen before subtracting so 8-bit channels cannot wrap
        let matches = (0..3).all(|channel| {
            let diff = i16::from(pixel[channel]) - i16::from(reference[channel]);
            diff.abs() <= tolerance
        });
        Luma([if matches { MASK_MAX } else { MASK_MIN }])
    })
}

/// marks every pixel whose euclidean distance to the reference is at most
/// `tolerance`. compared in squared form, which is exact since both sides
/// are non-negative.
pub fn distance_mask(image: &RgbaImage, reference: Rgb<u8>, tolerance: u8) -> GrayImage {
    let (width, height) = image.dimensions();
    let limit = u32::from(tolerance).pow(2);

    GrayImage::from_fn(width, height, |x, y| {
        let pixel = image.get_pixel(x, y);
        let distance_squared: u32 = (0..3)
            .map(|channel| {
                let diff = i32::from(pixel[channel]) - i32::from(reference[channel]);
                (diff * diff) as u32
            })
            .sum();
        Luma([if distance_squared <= limit {
            MASK_MAX
        } else {
            MASK_MIN
        }])
    })
}

/// number of background-labelled pixels, used by callers deciding whether a
/// mask found anything at all.
pub fn background_count(mask: &GrayImage) -> usize {
    mask.pixels().filter(|pixel| pixel[0] == MASK_MAX).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient_image() -> RgbaImage {
        RgbaImage::from_fn(16, 16, |x, y| {
            Rgba([(x * 16) as u8, (y * 16) as u8, 128, 255])
        })
    }

    #[test]
    fn masking_is_idempotent() {
        let image = gradient_image();
        let reference = Rgb([128, 128, 128]);

        let first = range_mask(&image, reference, 40);
        let second = range_mask(&image, reference, 40);
        assert_eq!(first, second);

        let first = distance_mask(&image, reference, 40);
        let second = distance_mask(&image, reference, 40);
        assert_eq!(first, second);
    }

    #[test]
    fn background_count_is_monotone_in_tolerance() {
        let image = gradient_image();
        let reference = Rgb([100, 100, 100]);

        let mut previous_range = 0;
        let mut previous_distance = 0;
        for tolerance in (0..=255u16).step_by(15) {
            let by_range = background_count(&range_mask(&image, reference, tolerance as u8));
            let by_distance = background_count(&distance_mask(&image, reference, tolerance as u8));
            assert!(by_range >= previous_range);
            assert!(by_distance >= previous_distance);
            previous_range = by_range;
            previous_distance = by_distance;
        }
    }

    #[test]
    fn channel_extremes_do_not_wrap() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        let reference = Rgb([0, 0, 0]);

        // 255 away per channel: outside any box but the widest one
        assert_eq!(background_count(&range_mask(&image, reference, 254)), 0);
        assert_eq!(background_count(&range_mask(&image, reference, 255)), 4);

        // euclidean distance is sqrt(3) * 255 ~ 441, beyond the u8 range,
        // so even tolerance 255 must not match
        assert_eq!(background_count(&distance_mask(&image, reference, 255)), 0);
    }

    #[test]
    fn box_and_sphere_disagree_at_the_boundary() {
        // a pixel 30 away on every channel sits inside the tolerance-30 box
        // but sqrt(3)*30 ~ 52 away in euclidean terms
        let image = RgbaImage::from_pixel(1, 1, Rgba([130, 130, 130, 255]));
        let reference = Rgb([100, 100, 100]);

        assert_eq!(background_count(&range_mask(&image, reference, 30)), 1);
        assert_eq!(background_count(&distance_mask(&image, reference, 30)), 0);
    }

    #[test]
    fn alpha_does_not_affect_matching() {
        let opaque = RgbaImage::from_pixel(1, 1, Rgba([50, 50, 50, 255]));
        let transparent = RgbaImage::from_pixel(1, 1, Rgba([50, 50, 50, 0]));
        let reference = Rgb([50, 50, 50]);

        assert_eq!(
            range_mask(&opaque, reference, 0),
            range_mask(&transparent, reference, 0)
        );
    }
}
