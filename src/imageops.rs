//! resize, canvas and trim helpers applied after segmentation

use image::imageops::{crop_imm, overlay, resize, FilterType};
use image::RgbaImage;

/// scales the image to fit within `target_w x target_h`, preserving aspect
/// ratio with `scale = min(target_w / w, target_h / h)`. output dimensions
/// are forced even, dropping one pixel from an odd edge, which the sticker
/// platform requires of uploads.
pub fn fit_within(image: &RgbaImage, target_w: u32, target_h: u32) -> RgbaImage {
    let (width, height) = image.dimensions();

    let scale = f64::min(
        f64::from(target_w) / f64::from(width),
        f64::from(target_h) / f64::from(height),
    );
    let mut new_w = (f64::from(width) * scale) as u32;
    let mut new_h = (f64::from(height) * scale) as u32;
    if new_w % 2 != 0 && new_w > 1 {
        new_w -= 1;
    }
    if new_h % 2 != 0 && new_h > 1 {
        new_h -= 1;
    }

    resize(image, new_w.max(1), new_h.max(1), FilterType::Lanczos3)
}

/// centers the image on a fully transparent canvas of exactly
/// `target_w x target_h`. the image is expected to already fit; larger
/// inputs are pinned to the top-left corner by the clamped offsets.
pub fn center_on_canvas(image: &RgbaImage, target_w: u32, target_h: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let offset_x = i64::from(target_w.saturating_sub(width) / 2);
    let offset_y = i64::from(target_h.saturating_sub(height) / 2);

    // a fresh buffer is zero-filled, i.e. fully transparent
    let mut canvas = RgbaImage::new(target_w, target_h);
    overlay(&mut canvas, image, offset_x, offset_y);
    canvas
}

/// crops the image to the bounding box of its non-transparent content,
/// expanded by `padding` pixels on every side (clamped to the image).
/// returns `None` for fully transparent images, which have no content to
/// crop to.
pub fn trim_transparent(image: &RgbaImage, padding: u32) -> Option<RgbaImage> {
    let (width, height) = image.dimensions();

    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] > 0 {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    if min_x == u32::MAX {
        return None;
    }

    let x_start = min_x.saturating_sub(padding);
    let y_start = min_y.saturating_sub(padding);
    let x_end = (max_x + 1).saturating_add(padding).min(width);
    let y_end = (max_y + 1).saturating_add(padding).min(height);

    Some(crop_imm(image, x_start, y_start, x_end - x_start, y_end - y_start).to_image())
}
