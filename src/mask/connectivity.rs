//! border-connectivity restriction for background masks

use std::collections::VecDeque;

use image::{GrayImage, Luma};
use ndarray::Array2;

use crate::mask::{MASK_MAX, MASK_MIN};

/// keeps only the background regions reachable from the image corners.
///
/// the raw tolerance mask marks every pixel near the key color, including
/// subject detail that merely happens to match it. true background always
/// touches the sheet edge, so a flood from the four corners over the
/// background label separates the two: corner-connected regions stay
/// background, enclosed look-alike regions flip to foreground and survive
/// the cutout.
///
/// connectivity is strictly 4-neighbor. diagonal connectivity would leak
/// the flood across thin diagonal subject boundaries and erase enclosed
/// regions it should preserve. the fill is an explicit queue, so mask size
/// is not limited by stack depth.
pub fn restrict_to_corner_connected(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return mask.clone();
    }

    let (w, h) = (width as usize, height as usize);
    let mut reachable = Array2::<bool>::from_elem((w, h), false);
    let mut queue = VecDeque::new();

    let corners = [
        (0, 0),
        (width - 1, 0),
        (0, height - 1),
        (width - 1, height - 1),
    ];
    for (x, y) in corners {
        if mask.get_pixel(x, y)[0] == MASK_MAX && !reachable[[x as usize, y as usize]] {
            reachable[[x as usize, y as usize]] = true;
            queue.push_back((x, y));
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        for (dx, dy) in [(1i32, 0i32), (-1, 0), (0, 1), (0, -1)] {
            let Some(nx) = x.checked_add_signed(dx).filter(|&nx| nx < width) else {
                continue;
            };
            let Some(ny) = y.checked_add_signed(dy).filter(|&ny| ny < height) else {
                continue;
            };
            if !reachable[[nx as usize, ny as usize]] && mask.get_pixel(nx, ny)[0] == MASK_MAX {
                reachable[[nx as usize, ny as usize]] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        if reachable[[x as usize, y as usize]] {
            Luma([MASK_MAX])
        } else {
            Luma([MASK_MIN])
        }
    })
}
