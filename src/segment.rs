//! single-image background removal

use image::{GrayImage, Rgb, RgbaImage};

use crate::color::{sample_background, CornerSet};
use crate::mask::{self, connectivity, grow, MASK_MAX};

/// how the background key color is found and how far its removal reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// detect the key from the image corners and remove only the matching
    /// regions connected to those corners. enclosed regions of the same
    /// color are treated as subject detail and kept.
    Flood,
    /// detect the key from the image corners and remove every matching
    /// pixel, connected or not.
    AutoColor,
    /// remove every pixel near the given key color. the match uses the
    /// euclidean metric, unlike the per-channel box check of the detected
    /// modes (see the mask module notes on why the two coexist).
    Color(Rgb<u8>),
}

/// turns an image into the same image with its background forced
/// transparent. construction is cheap; one value can serve a whole batch.
#[derive(Debug, Clone, Copy)]
pub struct Segmenter {
    pub mode: KeyMode,
    pub tolerance: u8,
    pub fringe_iterations: u32,
}

impl Segmenter {
    /// computes the final background mask for `image`: tolerance match,
    /// optional connectivity restriction, then fringe growth.
    pub fn background_mask(&self, image: &RgbaImage) -> GrayImage {
        let raw = match self.mode {
            KeyMode::Flood | KeyMode::AutoColor => {
                let reference = sample_background(image, CornerSet::All);
                mask::range_mask(image, reference, self.tolerance)
            }
            KeyMode::Color(reference) => mask::distance_mask(image, reference, self.tolerance),
        };

        let restricted = match self.mode {
            KeyMode::Flood => connectivity::restrict_to_corner_connected(&raw),
            KeyMode::AutoColor | KeyMode::Color(_) => raw,
        };

        grow::grow(&restricted, self.fringe_iterations)
    }

    /// returns `image` with background pixels fully transparent. existing
    /// transparency always survives: alpha is only ever lowered to zero,
    /// never raised. an image with no background match comes back with its
    /// alpha untouched.
    pub fn segment(&self, image: &RgbaImage) -> RgbaImage {
        let mask = self.background_mask(image);
        log::debug!(
            "keying out {} of {} pixels",
            mask::background_count(&mask),
            (image.width() as usize) * (image.height() as usize),
        );
        clear_background(image, &mask)
    }
}

/// intersects the image's alpha with the inverse of the background mask.
pub fn clear_background(image: &RgbaImage, mask: &GrayImage) -> RgbaImage {
    let mut output = image.clone();
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        if mask.get_pixel(x, y)[0] == MASK_MAX {
            pixel[3] = 0;
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([220, 30, 30, 255]);

    /// white 400x400 sheet with a centered opaque red disc of radius 100.
    fn circle_sheet() -> RgbaImage {
        RgbaImage::from_fn(400, 400, |x, y| {
            let dx = x as i64 - 200;
            let dy = y as i64 - 200;
            if dx * dx + dy * dy <= 100 * 100 {
                RED
            } else {
                WHITE
            }
        })
    }

    #[test]
    fn flood_mode_clears_border_connected_background() {
        let segmenter = Segmenter {
            mode: KeyMode::Flood,
            tolerance: 30,
            fringe_iterations: 0,
        };
        let output = segmenter.segment(&circle_sheet());

        // corners and edge midpoints are background
        for (x, y) in [(0, 0), (399, 0), (0, 399), (399, 399), (200, 0)] {
            assert_eq!(output.get_pixel(x, y)[3], 0, "({}, {})", x, y);
        }
        // the white region outside the circle is border-connected too
        assert_eq!(output.get_pixel(40, 40)[3], 0);
        // the disc itself stays opaque
        assert_eq!(output.get_pixel(200, 200)[3], 255);
        assert_eq!(output.get_pixel(140, 200)[3], 255);
    }

    #[test]
    fn flood_mode_keeps_enclosed_background_colored_detail() {
        let mut sheet = circle_sheet();
        // a white spot inside the disc, sealed off from the border
        for y in 195..=205 {
            for x in 195..=205 {
                sheet.put_pixel(x, y, WHITE);
            }
        }

        let flood = Segmenter {
            mode: KeyMode::Flood,
            tolerance: 30,
            fringe_iterations: 0,
        };
        assert_eq!(flood.segment(&sheet).get_pixel(200, 200)[3], 255);

        // the global mode erases the same spot
        let global = Segmenter {
            mode: KeyMode::AutoColor,
            tolerance: 30,
            fringe_iterations: 0,
        };
        assert_eq!(global.segment(&sheet).get_pixel(200, 200)[3], 0);
    }

    #[test]
    fn manual_color_mode_uses_the_supplied_key() {
        let mut image = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 255, 255]));
        image.put_pixel(4, 4, RED);

        let segmenter = Segmenter {
            mode: KeyMode::Color(Rgb([255, 0, 255])),
            tolerance: 10,
            fringe_iterations: 0,
        };
        let output = segmenter.segment(&image);

        assert_eq!(output.get_pixel(0, 0)[3], 0);
        assert_eq!(output.get_pixel(4, 4)[3], 255);
    }

    #[test]
    fn fully_foreground_image_keeps_its_alpha() {
        let image = RgbaImage::from_fn(16, 16, |x, y| Rgba([30, 200, 60, (x * 16 + y) as u8]));

        let segmenter = Segmenter {
            mode: KeyMode::Color(Rgb([255, 0, 255])),
            tolerance: 20,
            fringe_iterations: 2,
        };

        assert_eq!(segmenter.segment(&image), image);
    }

    #[test]
    fn preexisting_transparency_survives_segmentation() {
        let mut image = RgbaImage::from_pixel(8, 8, WHITE);
        // transparent pixel in subject territory, foreground-colored
        image.put_pixel(3, 3, Rgba([220, 30, 30, 0]));

        let segmenter = Segmenter {
            mode: KeyMode::Flood,
            tolerance: 30,
            fringe_iterations: 0,
        };
        let output = segmenter.segment(&image);

        assert_eq!(output.get_pixel(3, 3)[3], 0);
    }

    #[test]
    fn fringe_growth_eats_into_the_subject_boundary() {
        let segmenter_tight = Segmenter {
            mode: KeyMode::Flood,
            tolerance: 30,
            fringe_iterations: 0,
        };
        let segmenter_grown = Segmenter {
            mode: KeyMode::Flood,
            tolerance: 30,
            fringe_iterations: 2,
        };

        let sheet = circle_sheet();
        // the disc's leftmost pixel survives a tight cut but not two rounds
        // of background growth
        assert_eq!(segmenter_tight.segment(&sheet).get_pixel(100, 200)[3], 255);
        assert_eq!(segmenter_grown.segment(&sheet).get_pixel(100, 200)[3], 0);
    }
}
