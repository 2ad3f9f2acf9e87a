use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use image::RgbaImage;
use itertools::Itertools;

use stampcut::color::parse_rgb;
use stampcut::error::{Error, Result};
use stampcut::imageops;
use stampcut::{CellKey, GridChoice, KeyMode, Segmenter, SheetSplitter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split sticker sheets into individual cells
    Split(SplitArgs),
    /// Make the background color of each image transparent
    Remove(RemoveArgs),
    /// Crop transparent padding around each image
    Trim(TrimArgs),
    /// Resize images into the submission format
    Format(FormatArgs),
}

#[derive(Args, Debug)]
struct SplitArgs {
    /// Directory of sheet images
    #[arg(long, default_value = "input")]
    input: PathBuf,

    /// Directory for the split cells
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Grid layout: "auto" or COLSxROWS, e.g. 4x2
    #[arg(long, default_value = "auto")]
    grid: GridChoice,

    /// Color tolerance (0-255)
    #[arg(long, default_value_t = 50)]
    tolerance: u8,

    /// Fringe removal strength in dilation rounds, 0 to disable
    #[arg(long, default_value_t = 1)]
    erosion: u32,

    /// Manual key color as "R,G,B" instead of sheet-level detection
    #[arg(long)]
    color: Option<String>,

    /// Emit cropped cells without background removal
    #[arg(long)]
    keep_background: bool,
}

#[derive(Args, Debug)]
struct RemoveArgs {
    /// Directory of images to process
    #[arg(long, default_value = "input_remover")]
    input: PathBuf,

    /// Directory for the processed images
    #[arg(long, default_value = "output_remover")]
    output: PathBuf,

    /// How the background is detected and removed
    #[arg(long, value_enum, default_value = "flood")]
    mode: Mode,

    /// Color tolerance (0-255)
    #[arg(long, default_value_t = 30)]
    tolerance: u8,

    /// Fringe removal strength in dilation rounds, 0 to disable
    #[arg(long, default_value_t = 0)]
    erosion: u32,

    /// Key color as "R,G,B", used by the color mode
    #[arg(long, required_if_eq("mode", "color"))]
    color: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// remove the detected background where it connects to the corners
    Flood,
    /// remove the detected background everywhere
    #[value(name = "auto_color")]
    AutoColor,
    /// remove a manually chosen color everywhere
    Color,
}

#[derive(Args, Debug)]
struct TrimArgs {
    /// Directory of images to trim
    #[arg(long, default_value = "input_trim")]
    input: PathBuf,

    /// Directory for the trimmed images
    #[arg(long, default_value = "output_trim")]
    output: PathBuf,

    /// Padding kept around the content, in pixels
    #[arg(long, default_value_t = 10)]
    padding: u32,
}

#[derive(Args, Debug)]
struct FormatArgs {
    /// Directory of finished stickers
    #[arg(long, default_value = "input_format")]
    input: PathBuf,

    /// Directory for the formatted set
    #[arg(long, default_value = "output_format")]
    output: PathBuf,

    /// Target width of a sticker
    #[arg(long, default_value_t = 370)]
    width: u32,

    /// Target height of a sticker
    #[arg(long, default_value_t = 320)]
    height: u32,

    /// Center each sticker on a transparent canvas of the exact target size
    #[arg(long)]
    canvas: bool,
}

/// at most this many stickers go into one submission set
const MAX_STICKERS: usize = 40;
const MAIN_IMAGE_SIZE: (u32, u32) = (240, 240);
const TAB_IMAGE_SIZE: (u32, u32) = (96, 74);

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Split(args) => run_split(&args),
        Command::Remove(args) => run_remove(&args),
        Command::Trim(args) => run_trim(&args),
        Command::Format(args) => run_format(&args),
    }
}

fn run_split(args: &SplitArgs) -> Result<()> {
    let Some(files) = batch_input(&args.input, &args.output)? else {
        return Ok(());
    };

    let key = if args.keep_background {
        None
    } else {
        let color = args.color.as_deref().map(parse_rgb).transpose()?;
        Some(CellKey {
            color,
            tolerance: args.tolerance,
            fringe_iterations: args.erosion,
        })
    };
    let splitter = SheetSplitter {
        grid: args.grid,
        key,
    };

    log::info!(
        "splitting {} sheets (tolerance {}, erosion {})",
        files.len(),
        args.tolerance,
        args.erosion
    );

    for path in &files {
        if let Err(e) = split_one(&splitter, path, &args.output) {
            log::error!("skipping {:?}: {}", path, e);
        }
    }

    Ok(())
}

fn split_one(splitter: &SheetSplitter, path: &Path, output: &Path) -> Result<()> {
    let sheet = load_rgba(path)?;
    let stem = file_stem(path);

    for cell in splitter.split(&sheet) {
        let target = output.join(format!("{}_{:02}.png", stem, cell.index));
        save_png(&cell.image, &target)?;
        log::info!("saved {:?}", target);
    }

    Ok(())
}

fn run_remove(args: &RemoveArgs) -> Result<()> {
    let Some(files) = batch_input(&args.input, &args.output)? else {
        return Ok(());
    };

    let mode = match args.mode {
        Mode::Flood => KeyMode::Flood,
        Mode::AutoColor => KeyMode::AutoColor,
        Mode::Color => {
            // clap enforces the presence of --color for this mode
            let value = args
                .color
                .as_deref()
                .ok_or_else(|| Error::invalid_parameter("color", ""))?;
            KeyMode::Color(parse_rgb(value)?)
        }
    };
    let segmenter = Segmenter {
        mode,
        tolerance: args.tolerance,
        fringe_iterations: args.erosion,
    };

    log::info!(
        "processing {} images (mode {:?}, tolerance {}, erosion {})",
        files.len(),
        args.mode,
        args.tolerance,
        args.erosion
    );

    for path in &files {
        if let Err(e) = remove_one(&segmenter, path, &args.output) {
            log::error!("skipping {:?}: {}", path, e);
        }
    }

    Ok(())
}

fn remove_one(segmenter: &Segmenter, path: &Path, output: &Path) -> Result<()> {
    let image = load_rgba(path)?;
    let target = output.join(format!("{}_processed.png", file_stem(path)));
    save_png(&segmenter.segment(&image), &target)?;
    log::info!("saved {:?}", target);
    Ok(())
}

fn run_trim(args: &TrimArgs) -> Result<()> {
    let Some(files) = batch_input(&args.input, &args.output)? else {
        return Ok(());
    };

    log::info!("trimming {} images with padding {}", files.len(), args.padding);

    for path in &files {
        if let Err(e) = trim_one(path, args.padding, &args.output) {
            log::error!("skipping {:?}: {}", path, e);
        }
    }

    Ok(())
}

fn trim_one(path: &Path, padding: u32, output: &Path) -> Result<()> {
    let image = load_rgba(path)?;

    let Some(trimmed) = imageops::trim_transparent(&image, padding) else {
        log::info!("skipping {:?}: fully transparent", path);
        return Ok(());
    };

    let target = output.join(format!("{}_trimmed.png", file_stem(path)));
    save_png(&trimmed, &target)?;
    log::info!(
        "saved {:?} ({}x{})",
        target,
        trimmed.width(),
        trimmed.height()
    );
    Ok(())
}

fn run_format(args: &FormatArgs) -> Result<()> {
    let Some(files) = batch_input(&args.input, &args.output)? else {
        return Ok(());
    };

    if files.len() > MAX_STICKERS {
        log::warn!(
            "found {} images but a set holds {}, skipping the extras",
            files.len(),
            MAX_STICKERS
        );
    }

    log::info!("formatting {} images to {}x{}", files.len().min(MAX_STICKERS), args.width, args.height);

    for (position, path) in files.iter().take(MAX_STICKERS).enumerate() {
        if let Err(e) = format_one(args, path, position as u32 + 1) {
            log::error!("skipping {:?}: {}", path, e);
        }
    }

    Ok(())
}

fn format_one(args: &FormatArgs, path: &Path, number: u32) -> Result<()> {
    let image = load_rgba(path)?;

    let target = args.output.join(format!("{:02}.png", number));
    save_png(&render(&image, args.width, args.height, args.canvas), &target)?;
    log::info!("saved {:?}", target);

    // the first sticker also provides the set's main and tab artwork
    if number == 1 {
        let (main_w, main_h) = MAIN_IMAGE_SIZE;
        let main = args.output.join("main.png");
        save_png(&render(&image, main_w, main_h, args.canvas), &main)?;
        log::info!("generated {:?}", main);

        let (tab_w, tab_h) = TAB_IMAGE_SIZE;
        let tab = args.output.join("tab.png");
        save_png(&render(&image, tab_w, tab_h, args.canvas), &tab)?;
        log::info!("generated {:?}", tab);
    }

    Ok(())
}

fn render(image: &RgbaImage, width: u32, height: u32, canvas: bool) -> RgbaImage {
    let fitted = imageops::fit_within(image, width, height);
    if canvas {
        imageops::center_on_canvas(&fitted, width, height)
    } else {
        fitted
    }
}

/// validates the input directory, prepares the output directory and lists
/// the images to process. `None` means the run has nothing to do: an empty
/// input directory is reported and treated as success.
fn batch_input(input: &Path, output: &Path) -> Result<Option<Vec<PathBuf>>> {
    let files = image_files(input)?;
    if files.is_empty() {
        log::warn!("no images found in {:?}", input);
        return Ok(None);
    }
    fs::create_dir_all(output)?;
    Ok(Some(files))
}

/// lists the image files directly inside `dir`, matching the supported
/// extensions case-insensitively, in sorted order.
fn image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::MissingInputDir(dir.to_path_buf()));
    }

    let files = fs::read_dir(dir)?
        .filter_map(|entry| Some(entry.ok()?.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg")
                })
        })
        .sorted()
        .collect();

    Ok(files)
}

/// decodes an image and normalizes it to four channels; images without an
/// alpha channel become fully opaque.
fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).map_err(|e| Error::decode(path, e))?;
    Ok(image.to_rgba8())
}

fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    image.save(path).map_err(|e| Error::encode(path, e))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}
