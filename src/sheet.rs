//! sheet partitioning into sticker cells

use std::str::FromStr;

use image::{imageops::crop_imm, Rgb, RgbaImage};
use itertools::Itertools;

use crate::color::{sample_background, CornerSet};
use crate::error::Error;
use crate::mask::{self, grow};
use crate::segment::clear_background;

/// aspect ratios inside this band are treated as square sheets. empirical
/// policy tuned on observed sheet formats, not a derived law.
pub const AUTO_SQUARE_MIN: f64 = 0.8;
pub const AUTO_SQUARE_MAX: f64 = 1.2;

/// how a sheet decomposes into cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub rows: u32,
    pub cols: u32,
}

/// an explicit grid, or a guess from the sheet's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridChoice {
    Auto,
    Fixed(GridShape),
}

impl GridChoice {
    /// picks the concrete shape for a sheet. roughly square sheets hold a
    /// 3x3 grid, everything else the wide 2-row 4-column sticker layout.
    /// unusual sheet shapes can be misclassified; pass an explicit grid for
    /// those.
    pub fn resolve(&self, width: u32, height: u32) -> GridShape {
        match *self {
            GridChoice::Fixed(shape) => shape,
            GridChoice::Auto => {
                let ratio = f64::from(width) / f64::from(height);
                if (AUTO_SQUARE_MIN..=AUTO_SQUARE_MAX).contains(&ratio) {
                    GridShape { rows: 3, cols: 3 }
                } else {
                    GridShape { rows: 2, cols: 4 }
                }
            }
        }
    }
}

impl FromStr for GridChoice {
    type Err = Error;

    /// parses `auto` or an explicit `COLSxROWS` value such as `4x2`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("auto") {
            return Ok(GridChoice::Auto);
        }

        let invalid = || Error::invalid_parameter("grid", value);
        let (cols, rows) = value.split_once(['x', 'X']).ok_or_else(invalid)?;
        let cols: u32 = cols.parse().map_err(|_| invalid())?;
        let rows: u32 = rows.parse().map_err(|_| invalid())?;
        if rows == 0 || cols == 0 {
            return Err(invalid());
        }

        Ok(GridChoice::Fixed(GridShape { rows, cols }))
    }
}

/// one cut-out sticker: its 1-based sequence number, the origin of its
/// source rectangle within the sheet, and the pixels themselves.
#[derive(Debug, Clone)]
pub struct Cell {
    pub index: u32,
    pub x: u32,
    pub y: u32,
    pub image: RgbaImage,
}

/// chroma key applied to every cell of a sheet.
///
/// with no manual color the sheet background is detected once from the top
/// two corners and matched per channel in every cell; a manual color is
/// matched by euclidean distance instead. one reference for the whole sheet
/// keeps cells consistent even when a sticker covers its own cell corners.
#[derive(Debug, Clone, Copy)]
pub struct CellKey {
    pub color: Option<Rgb<u8>>,
    pub tolerance: u8,
    pub fringe_iterations: u32,
}

impl CellKey {
    fn key_cell(&self, cell: &RgbaImage, detected: Rgb<u8>) -> RgbaImage {
        let raw = match self.color {
            Some(reference) => mask::distance_mask(cell, reference, self.tolerance),
            None => mask::range_mask(cell, detected, self.tolerance),
        };
        let mask = grow::grow(&raw, self.fringe_iterations);
        clear_background(cell, &mask)
    }
}

/// partitions a sheet into equal cells and optionally chroma-keys each one.
#[derive(Debug, Clone, Copy)]
pub struct SheetSplitter {
    pub grid: GridChoice,
    pub key: Option<CellKey>,
}

impl SheetSplitter {
    /// cuts the sheet into `rows x cols` cells of `width / cols` by
    /// `height / rows` pixels. trailing remainder pixels are dropped from
    /// the last column and row. cells come back in row-major order,
    /// numbered from 1.
    pub fn split(&self, sheet: &RgbaImage) -> Vec<Cell> {
        let (width, height) = sheet.dimensions();
        let GridShape { rows, cols } = self.grid.resolve(width, height);

        let cell_w = width / cols;
        let cell_h = height / rows;
        if cell_w == 0 || cell_h == 0 {
            log::warn!(
                "sheet of {}x{} is too small for a {}x{} grid",
                width,
                height,
                cols,
                rows
            );
            return Vec::new();
        }

        let detected = match self.key {
            Some(CellKey { color: None, .. }) => sample_background(sheet, CornerSet::Top),
            _ => Rgb([0, 0, 0]),
        };

        log::debug!(
            "splitting {}x{} sheet into {} cells of {}x{}",
            width,
            height,
            rows * cols,
            cell_w,
            cell_h
        );

        (0..rows)
            .cartesian_product(0..cols)
            .enumerate()
            .map(|(index, (row, col))| {
                let x = col * cell_w;
                let y = row * cell_h;
                let cell = crop_imm(sheet, x, y, cell_w, cell_h).to_image();

                let image = match &self.key {
                    Some(key) => key.key_cell(&cell, detected),
                    None => cell,
                };

                Cell {
                    index: index as u32 + 1,
                    x,
                    y,
                    image,
                }
            })
            .collect()
    }
}
