//! background color detection from reference pixels

use image::{Rgb, RgbaImage};

/// which border pixels to read when guessing the background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerSet {
    /// all four corners, for per-image detection.
    All,
    /// only the top two corners. sheet-level detection uses this so that
    /// artwork spilling into the bottom corners does not poison the vote.
    Top,
}

impl CornerSet {
    fn coordinates(self, width: u32, height: u32) -> Vec<(u32, u32)> {
        match self {
            CornerSet::All => vec![
                (0, 0),
                (width - 1, 0),
                (0, height - 1),
                (width - 1, height - 1),
            ],
            CornerSet::Top => vec![(0, 0), (width - 1, 0)],
        }
    }
}

/// guesses the background color by reading the requested corner pixels and
/// taking the most frequent color among them. ties go to the color seen
/// first (corners are read top-left, top-right, bottom-left, bottom-right).
/// a plurality of one is accepted: with four distinct corners any of them is
/// as good a guess as another.
///
/// the alpha channel of the sampled pixels is ignored.
pub fn sample_background(image: &RgbaImage, corners: CornerSet) -> Rgb<u8> {
    let (width, height) = image.dimensions();

    let samples: Vec<Rgb<u8>> = corners
        .coordinates(width, height)
        .into_iter()
        .map(|(x, y)| {
            let pixel = image.get_pixel(x, y);
            Rgb([pixel[0], pixel[1], pixel[2]])
        })
        .collect();

    // four samples at most, so the quadratic count is fine. iterating in
    // sample order keeps the tie-break stable on the first occurrence.
    let mut best = samples[0];
    let mut best_count = 0;
    for candidate in &samples {
        let count = samples.iter().filter(|other| *other == candidate).count();
        if count > best_count {
            best = *candidate;
            best_count = count;
        }
    }

    log::debug!("sampled background color {:?} from {:?} corners", best, corners);

    best
}

/// parses a manual key color given as "R,G,B" with each channel in 0-255.
pub fn parse_rgb(value: &str) -> crate::error::Result<Rgb<u8>> {
    let channels: Vec<u8> = value
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .map_err(|_| crate::error::Error::invalid_parameter("color", value))?;

    match channels[..] {
        [r, g, b] => Ok(Rgb([r, g, b])),
        _ => Err(crate::error::Error::invalid_parameter("color", value)),
    }
}
