//! poly-export - cutscene inspection and frame export
//!
//! Dumps script listings and palette tables from CMD/POL assets and
//! renders cutscene frames to PNG files through the player core.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use polycine::{DirSource, Player, SCREEN_HEIGHT, SCREEN_WIDTH, SynthError};

#[derive(Parser)]
#[command(name = "poly-export")]
#[command(about = "Cutscene inspection and frame export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a cutscene summary and per-frame command listing
    Info {
        /// Cutscene name (loads NAME.CMD + NAME.POL)
        name: String,

        /// Asset directory
        #[arg(short, long, default_value = "DATA")]
        data: PathBuf,

        /// Also list every command of every frame
        #[arg(short, long)]
        verbose: bool,
    },

    /// Render frames to PNG files
    Frames {
        /// Cutscene name
        name: String,

        /// Asset directory
        #[arg(short, long, default_value = "DATA")]
        data: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "frames")]
        out: PathBuf,

        /// Frame range as START..END (end exclusive; defaults to all)
        #[arg(short, long)]
        range: Option<String>,
    },

    /// Print the palettes of a cutscene as hex rows
    Palette {
        /// Cutscene name
        name: String,

        /// Asset directory
        #[arg(short, long, default_value = "DATA")]
        data: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Info {
            name,
            data,
            verbose,
        } => info(&name, &data, verbose),
        Commands::Frames {
            name,
            data,
            out,
            range,
        } => frames(&name, &data, &out, range.as_deref()),
        Commands::Palette { name, data } => palette(&name, &data),
    }
}

fn load_assets(name: &str, data: &PathBuf) -> Result<(Vec<u8>, Vec<u8>)> {
    let upper = name.to_ascii_uppercase();
    let cmd = std::fs::read(data.join(format!("{upper}.CMD")))
        .with_context(|| format!("reading {upper}.CMD from {}", data.display()))?;
    let pol = std::fs::read(data.join(format!("{upper}.POL")))
        .with_context(|| format!("reading {upper}.POL from {}", data.display()))?;
    Ok((cmd, pol))
}

fn info(name: &str, data: &PathBuf, verbose: bool) -> Result<()> {
    let (cmd, pol) = load_assets(name, data)?;
    let pol = poly_pol::parse_pol(&pol)?;
    let script = poly_cmd::parse_cmd(&cmd)?;

    println!("{}:", name.to_ascii_uppercase());
    println!("  shapes:    {}", pol.shape_count());
    println!("  palettes:  {}", pol.palette_count());
    println!("  subscenes: {}", script.subscenes.len());
    println!("  frames:    {}", script.frame_count());

    let mut frame_no = 0usize;
    for sub in &script.subscenes {
        println!("  subscene {} ({} frames):", sub.id, sub.frame_count());
        for frame in &sub.frames {
            if verbose {
                println!("    frame {frame_no}:");
                for cmd in &frame.commands {
                    println!("      {cmd}");
                }
            } else {
                println!("    frame {frame_no}: {} commands", frame.commands.len());
            }
            frame_no += 1;
        }
    }
    Ok(())
}

fn frames(name: &str, data: &PathBuf, out: &PathBuf, range: Option<&str>) -> Result<()> {
    let mut player = Player::new(
        Box::new(DirSource::new(data.clone())),
        Box::new(|| Err(SynthError::Unavailable("headless export".into()))),
    );
    player.set_audio_enabled(false);
    player
        .load(name)
        .with_context(|| format!("loading cutscene {name}"))?;

    let total = player.frame_count();
    let (start, end) = match range {
        Some(spec) => parse_range(spec, total)?,
        None => (0, total),
    };
    std::fs::create_dir_all(out)?;

    let upper = name.to_ascii_uppercase();
    for i in start..end {
        player.go_to_frame(i);
        let path = out.join(format!("{upper}_{i:04}.png"));
        image::RgbaImage::from_raw(
            SCREEN_WIDTH as u32,
            SCREEN_HEIGHT as u32,
            player.framebuffer().to_vec(),
        )
        .context("framebuffer size mismatch")?
        .save(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    }
    println!("wrote {} frames to {}", end - start, out.display());
    Ok(())
}

fn parse_range(spec: &str, total: u32) -> Result<(u32, u32)> {
    let Some((a, b)) = spec.split_once("..") else {
        bail!("range must look like START..END, got {spec:?}");
    };
    let start: u32 = if a.is_empty() { 0 } else { a.parse()? };
    let end: u32 = if b.is_empty() { total } else { b.parse()? };
    if start >= end || end > total {
        bail!("range {start}..{end} out of bounds (0..{total})");
    }
    Ok((start, end))
}

fn palette(name: &str, data: &PathBuf) -> Result<()> {
    let (_, pol) = load_assets(name, data)?;
    let pol = poly_pol::parse_pol(&pol)?;
    for (i, palette) in pol.palettes.iter().enumerate() {
        print!("palette {i}:");
        for color in palette.colors() {
            print!(" #{:02X}{:02X}{:02X}", color.r, color.g, color.b);
        }
        println!();
    }
    Ok(())
}
