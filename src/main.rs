//! Veles CLI - Command-line tool for inspecting and rewriting DDS textures.
//!
//! This is the main entry point for the Veles command-line application.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use memmap2::Mmap;
use rayon::prelude::*;
use serde::Serialize;

use veles::dds::header::PixelFormatFlags;
use veles::dds::{
    decode_header, ConversionFlags, DxgiFormat, HeaderKind, PitchMode, TextureLayout, LEGACY_FORMATS,
};
use veles::prelude::*;

/// Veles - DDS texture inspection and conversion tool
#[derive(Parser)]
#[command(name = "veles")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options that change how input files are decoded.
#[derive(clap::Args, Clone, Copy)]
struct DecodeArgs {
    /// Present BGRA/BGRX data as RGBA
    #[arg(long)]
    force_rgb: bool,

    /// Expand 16 bpp formats to RGBA8
    #[arg(long)]
    no_16bpp: bool,

    /// Expand legacy luminance formats to RGBA
    #[arg(long)]
    expand_luminance: bool,

    /// Rows of legacy files are padded to 4 bytes
    #[arg(long)]
    legacy_dword: bool,

    /// Fail on legacy formats that need expansion
    #[arg(long)]
    no_legacy_expansion: bool,

    /// Accept textures beyond the usual size limits
    #[arg(long, env = "VELES_ALLOW_LARGE")]
    allow_large: bool,
}

impl DecodeArgs {
    fn flags(self) -> DecodeFlags {
        let mut flags = DecodeFlags::empty();
        flags.set(DecodeFlags::FORCE_RGB, self.force_rgb);
        flags.set(DecodeFlags::NO_16BPP, self.no_16bpp);
        flags.set(DecodeFlags::EXPAND_LUMINANCE, self.expand_luminance);
        flags.set(DecodeFlags::LEGACY_DWORD, self.legacy_dword);
        flags.set(DecodeFlags::NO_LEGACY_EXPANSION, self.no_legacy_expansion);
        flags.set(DecodeFlags::ALLOW_LARGE_FILES, self.allow_large);
        flags
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the description of one or more DDS files
    Info {
        /// Input files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Decode a DDS file and write it back
    Convert {
        /// Input DDS file
        #[arg(short, long, env = "VELES_INPUT")]
        input: PathBuf,

        /// Output DDS file
        #[arg(short, long, env = "VELES_OUTPUT")]
        output: PathBuf,

        #[command(flatten)]
        decode: DecodeArgs,

        /// Always write the DX10 extended header
        #[arg(long, conflicts_with = "dx9")]
        dx10: bool,

        /// Never write the DX10 extended header
        #[arg(long)]
        dx9: bool,

        /// Keep the header kind of the input
        #[arg(long, conflicts_with_all = ["dx10", "dx9"])]
        keep_header: bool,
    },

    /// Export one subresource as PNG
    ExportPng {
        /// Input DDS file
        #[arg(short, long, env = "VELES_INPUT")]
        input: PathBuf,

        /// Output PNG file
        #[arg(short, long, env = "VELES_OUTPUT")]
        output: PathBuf,

        /// Mip level
        #[arg(long, default_value_t = 0)]
        mip: usize,

        /// Array item (cube face for cube maps)
        #[arg(long, default_value_t = 0)]
        item: usize,

        /// Depth slice of a volume texture
        #[arg(long, default_value_t = 0)]
        slice: usize,
    },

    /// List the legacy pixel formats that can be decoded
    Formats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).parse_default_env().init();

    match cli.command {
        Commands::Info { inputs, json, decode } => {
            cmd_info(&inputs, json, decode.flags())?;
        }
        Commands::Convert {
            input,
            output,
            decode,
            dx10,
            dx9,
            keep_header,
        } => {
            let mut flags = EncodeFlags::empty();
            flags.set(EncodeFlags::FORCE_DX10_EXT, dx10);
            flags.set(EncodeFlags::FORCE_DX9_LEGACY, dx9);
            cmd_convert(&input, &output, decode.flags(), flags, keep_header)?;
        }
        Commands::ExportPng {
            input,
            output,
            mip,
            item,
            slice,
        } => {
            cmd_export_png(&input, &output, mip, item, slice)?;
        }
        Commands::Formats => cmd_formats(),
    }

    Ok(())
}

/// Description of one input file.
#[derive(Serialize)]
struct InfoRecord {
    path: PathBuf,
    #[serde(flatten)]
    metadata: TexMetadata,
    header: HeaderKind,
    conversion: String,
    subresources: usize,
    size: usize,
}

fn map_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mmap = unsafe { Mmap::map(&file) }.with_context(|| format!("Failed to map {}", path.display()))?;
    Ok(mmap)
}

fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let before = paths.len();
        for entry in glob::glob(pattern).with_context(|| format!("Invalid pattern {pattern}"))? {
            paths.push(entry?);
        }
        if paths.len() == before {
            // Not a pattern, or nothing matched: let the open report it.
            paths.push(PathBuf::from(pattern));
        }
    }
    Ok(paths)
}

fn inspect(path: &Path, flags: DecodeFlags) -> Result<InfoRecord> {
    let data = map_file(path)?;
    let decoded = decode_header(&data, flags).with_context(|| format!("Failed to decode {}", path.display()))?;
    let layout = TextureLayout::new(&decoded.metadata, PitchMode::default())?;

    Ok(InfoRecord {
        path: path.to_path_buf(),
        metadata: decoded.metadata,
        header: if decoded.is_dx10() {
            HeaderKind::Dx10
        } else {
            HeaderKind::Legacy
        },
        conversion: format!("{:?}", decoded.mode),
        subresources: layout.subresource_count(),
        size: layout.total_size(),
    })
}

fn cmd_info(inputs: &[String], json: bool, flags: DecodeFlags) -> Result<()> {
    let paths = expand_inputs(inputs)?;
    let start = Instant::now();

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    if paths.len() < 2 {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let results: Vec<(PathBuf, Result<InfoRecord>)> = paths
        .par_iter()
        .map(|path| {
            let result = inspect(path, flags);
            pb.inc(1);
            (path.clone(), result)
        })
        .collect();
    pb.finish_and_clear();

    let mut records = Vec::new();
    let mut errors = 0;
    for (path, result) in results {
        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                eprintln!("Error reading {}: {:#}", path.display(), e);
                errors += 1;
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in &records {
            print_record(record);
        }
        if records.len() + errors > 1 {
            println!(
                "\n{} files in {:?} ({} errors)",
                records.len() + errors,
                start.elapsed(),
                errors
            );
        }
    }

    if errors > 0 && records.is_empty() {
        bail!("No input could be read");
    }

    Ok(())
}

fn print_record(record: &InfoRecord) {
    let meta = &record.metadata;
    println!("{}", record.path.display());
    println!("  Format:      {}", meta.format);
    println!("  Dimension:   {:?}", meta.dimension);
    println!("  Size:        {}x{}x{}", meta.width, meta.height, meta.depth);
    println!("  Array size:  {}", meta.array_size);
    println!("  Mip levels:  {}", meta.mip_levels);
    println!("  Alpha mode:  {:?}", meta.alpha_mode);
    println!("  Header:      {:?}", record.header);
    println!("  Conversion:  {}", record.conversion);
    println!("  Pixel data:  {} bytes in {} subresources", record.size, record.subresources);
}

fn cmd_convert(
    input: &Path,
    output: &Path,
    decode_flags: DecodeFlags,
    encode_flags: EncodeFlags,
    keep_header: bool,
) -> Result<()> {
    println!("Converting: {} -> {}", input.display(), output.display());

    let data = map_file(input)?;
    let texture = decode(&data, decode_flags).context("Failed to decode DDS")?;
    let meta = texture.metadata();
    println!(
        "Decoded {}x{} {} ({} subresources)",
        meta.width,
        meta.height,
        meta.format,
        texture.subresources().len()
    );

    let container = DdsContainer {
        encode_flags,
        keep_header_kind: keep_header,
    };
    let mut file = File::create(output).context("Failed to create output file")?;
    container.save(&texture, &mut file).context("Failed to encode DDS")?;

    println!("Conversion complete");

    Ok(())
}

fn cmd_export_png(input: &Path, output: &Path, mip: usize, item: usize, slice: usize) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    let flags = DecodeFlags::FORCE_RGB | DecodeFlags::NO_16BPP;
    let texture = decode(&data, flags).context("Failed to decode DDS")?;

    let format = texture.metadata().format;
    if format.is_compressed() {
        bail!("{format} is block-compressed; PNG export needs uncompressed data");
    }

    let view = texture
        .image(mip, item, slice)
        .with_context(|| format!("No subresource at mip {mip}, item {item}, slice {slice}"))?;
    let (width, height) = (view.info.width, view.info.height);
    let row_bytes = (width as usize * format.bits_per_pixel() as usize).div_ceil(8);
    let pixels: Vec<u8> = view.rows().flat_map(|row| &row[..row_bytes]).copied().collect();

    let bad_size = || anyhow::anyhow!("Pixel data does not match {width}x{height}");
    match format {
        DxgiFormat::R8G8B8A8_UNORM | DxgiFormat::R8G8B8A8_UNORM_SRGB => {
            image::RgbaImage::from_raw(width, height, pixels)
                .ok_or_else(bad_size)?
                .save(output)?;
        }
        DxgiFormat::R8G8_UNORM => {
            image::GrayAlphaImage::from_raw(width, height, pixels)
                .ok_or_else(bad_size)?
                .save(output)?;
        }
        DxgiFormat::R8_UNORM | DxgiFormat::A8_UNORM => {
            image::GrayImage::from_raw(width, height, pixels)
                .ok_or_else(bad_size)?
                .save(output)?;
        }
        DxgiFormat::R16G16B16A16_UNORM => {
            let words = pixels.chunks_exact(2).map(|w| u16::from_le_bytes([w[0], w[1]])).collect();
            image::ImageBuffer::<image::Rgba<u16>, Vec<u16>>::from_raw(width, height, words)
                .ok_or_else(bad_size)?
                .save(output)?;
        }
        DxgiFormat::R16_UNORM => {
            let words = pixels.chunks_exact(2).map(|w| u16::from_le_bytes([w[0], w[1]])).collect();
            image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::from_raw(width, height, words)
                .ok_or_else(bad_size)?
                .save(output)?;
        }
        _ => bail!("PNG export does not support {format}"),
    }

    println!("Exported {}x{} {} to {}", width, height, format, output.display());

    Ok(())
}

fn cmd_formats() {
    println!("{:<14} {:<22} {:<28} Conversion", "Legacy", "Pixel format", "Canonical");
    for entry in LEGACY_FORMATS {
        let pf = entry.pixel_format;
        let (bits, r, g, b, a) = (pf.rgb_bit_count, pf.r_bit_mask, pf.g_bit_mask, pf.b_bit_mask, pf.a_bit_mask);
        let stored = if pf.has_flags(PixelFormatFlags::FOURCC) {
            format!("FourCC {}", pf.four_cc)
        } else if pf.has_flags(PixelFormatFlags::PAL8) {
            format!("{bits} bpp indexed")
        } else {
            format!("{bits} bpp {r:x}/{g:x}/{b:x}/{a:x}")
        };
        let conversion = entry.flags & (ConversionFlags::CONVERTING | ConversionFlags::PREMULTIPLIED);
        println!(
            "{:<14} {:<22} {:<28} {:?}",
            entry.name,
            stored,
            entry.format.to_string(),
            conversion
        );
    }
}
