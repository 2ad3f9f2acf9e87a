//! batch tools for turning sticker-sheet artwork into individual
//! transparent stickers: sheet splitting, chroma-key background removal,
//! transparent trimming and submission-format resizing.

pub mod color;
pub mod error;
pub mod imageops;
pub mod mask;
pub mod segment;
pub mod sheet;

pub use error::{Error, Result};
pub use segment::{KeyMode, Segmenter};
pub use sheet::{Cell, CellKey, GridChoice, GridShape, SheetSplitter};
