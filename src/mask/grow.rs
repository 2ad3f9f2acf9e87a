//! morphological growth of the background label

use image::GrayImage;

use crate::mask::MASK_MAX;

/// dilates the background label `iterations` times with a full 3x3
/// structuring element, absorbing the anti-aliased fringe pixels that
/// survived thresholding at the cost of up to `iterations` pixels of true
/// subject along the boundary. how much edge to trade away is the caller's
/// call, so the count is a parameter rather than a fixed constant.
///
/// growth is 8-connected on purpose, unlike the 4-connected rule used for
/// component labelling: dilation should round off corners, not respect
/// them. zero iterations returns the mask unchanged.
pub fn grow(mask: &GrayImage, iterations: u32) -> GrayImage {
    let mut mask = mask.clone();
    let (width, height) = mask.dimensions();

    for _ in 0..iterations {
        let original = mask.clone();
        for (x, y, pixel) in mask.enumerate_pixels_mut() {
            if pixel[0] == MASK_MAX {
                continue;
            }

            let dx_set = [0i32, 1, 1, 1, 0, -1, -1, -1];
            let dy_set = [1i32, 1, 0, -1, -1, 1, 0, -1];
            for (&dx, &dy) in dx_set.iter().zip(&dy_set) {
                let Some(nx) = x.checked_add_signed(dx).filter(|&nx| nx < width) else {
                    continue;
                };
                let Some(ny) = y.checked_add_signed(dy).filter(|&ny| ny < height) else {
                    continue;
                };
                if original.get_pixel(nx, ny)[0] == MASK_MAX {
                    pixel[0] = MASK_MAX;
                    break;
                }
            }
        }
    }

    mask
}
