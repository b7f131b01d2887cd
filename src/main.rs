//! Load a dataset from a JSON options file and print a summary.
//!
//! ```bash
//! emotion-data csv       options.json
//! emotion-data directory options.json --datapath data/frames -v
//! emotion-data directory options.json --label-map-out labels.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use emotion_data::{CsvDataLoader, Dataset, DirectoryDataLoader, LoaderOptions};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Increase log verbosity: -v = Info, -vv = Debug
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Images stored inline in a CSV file.
    Csv(LoadArgs),
    /// One sub-directory of frames per label.
    Directory(LoadArgs),
}

#[derive(clap::Args)]
struct LoadArgs {
    /// JSON file with loader options.
    options: PathBuf,

    /// Override `datapath` from the options file.
    #[arg(long)]
    datapath: Option<PathBuf>,

    /// Write the label → index map as JSON.
    #[arg(long, value_name = "FILE")]
    label_map_out: Option<PathBuf>,
}

impl LoadArgs {
    fn options(&self) -> Result<LoaderOptions> {
        let mut options = LoaderOptions::from_json_file(&self.options)
            .with_context(|| format!("reading options from {}", self.options.display()))?;
        if let Some(path) = &self.datapath {
            options.datapath = Some(path.clone());
        }
        Ok(options)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let (dataset, args) = match &cli.command {
        Command::Csv(args) => {
            let loader = CsvDataLoader::new(args.options()?).context("configuring CSV loader")?;
            (loader.load_data().context("loading CSV data")?, args)
        }
        Command::Directory(args) => {
            let loader = DirectoryDataLoader::new(args.options()?)
                .context("configuring directory loader")?;
            (loader.load_data().context("loading directory data")?, args)
        }
    };

    print_summary(&dataset);

    if let Some(out) = &args.label_map_out {
        let json = serde_json::to_string_pretty(&dataset.label_index_map)
            .context("serializing label map")?;
        std::fs::write(out, json).with_context(|| format!("writing {}", out.display()))?;
        log::info!("Wrote label map to {}", out.display());
    }

    Ok(())
}

fn print_summary(dataset: &Dataset) {
    println!("samples:      {}", dataset.len());
    println!("sample shape: {:?}", dataset.sample_shape());
    println!("classes:      {}", dataset.num_classes());

    let counts = dataset
        .class_indices()
        .into_iter()
        .flatten()
        .fold(vec![0usize; dataset.num_classes()], |mut acc, c| {
            acc[c] += 1;
            acc
        });
    for (label, idx) in dataset.label_index_map.iter() {
        println!("  {idx:>3}  {:<12} {}", label.to_string(), counts[idx]);
    }

    let (train, test) = dataset.split();
    println!(
        "split:        {} training / {} test (validation_split = {})",
        train.len(),
        test.len(),
        dataset.validation_split()
    );
}
