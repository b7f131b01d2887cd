use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use image::{GrayImage, Luma};

/// FER2013 emotion codes 0..=6.
const EMOTIONS: [&str; 7] = ["anger", "disgust", "fear", "happiness", "sadness", "surprise", "neutral"];
const SIDE: u32 = 48;

/// Write a FER-style sample CSV and dummy frame directories.
#[derive(Parser)]
#[command(about)]
struct Args {
    /// Output directory.
    #[arg(default_value = "sample_data")]
    out: PathBuf,

    /// Rows per emotion in the CSV.
    #[arg(long, default_value_t = 3)]
    rows_per_label: usize,

    /// Frames per label directory.
    #[arg(long, default_value_t = 8)]
    frames_per_label: usize,
}

/// A smooth pattern that differs per label and per frame.
fn frame(label: usize, step: usize) -> GrayImage {
    GrayImage::from_fn(SIDE, SIDE, |x, y| {
        let v = (x * (label as u32 + 1) + y * 3 + step as u32 * 11) % 256;
        Luma([v as u8])
    })
}

fn write_csv(path: &Path, rows_per_label: usize) -> Result<usize> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "emotion,pixels,Usage")?;

    let mut rows = 0;
    for step in 0..rows_per_label {
        for label in 0..EMOTIONS.len() {
            let pixels: Vec<String> = frame(label, step)
                .as_raw()
                .iter()
                .map(|v| v.to_string())
                .collect();
            let usage = if step == 0 { "PublicTest" } else { "Training" };
            writeln!(out, "{label},{},{usage}", pixels.join(" "))?;
            rows += 1;
        }
    }
    out.flush()?;
    Ok(rows)
}

fn write_directory(root: &Path, labels: &[&str], frames_per_label: usize) -> Result<usize> {
    let mut written = 0;
    for (label_idx, name) in labels.iter().enumerate() {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        for step in 0..frames_per_label {
            let path = dir.join(format!("frame_{step:03}.png"));
            frame(label_idx, step)
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            written += 1;
        }
    }
    Ok(written)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    let csv_path = args.out.join("sample.csv");
    let rows = write_csv(&csv_path, args.rows_per_label)?;
    log::info!("Wrote {rows} rows to {}", csv_path.display());

    let dir = args.out.join("dummy_data_directory");
    let frames = write_directory(&dir, &["happiness", "sadness", "surprise"], args.frames_per_label)?;
    log::info!("Wrote {frames} frames under {}", dir.display());

    std::fs::create_dir_all(args.out.join("dummy_empty_data_directory"))?;

    println!(
        "Wrote {rows} CSV rows and {frames} frames ({SIDE}x{SIDE}) to {}",
        args.out.display()
    );
    Ok(())
}
