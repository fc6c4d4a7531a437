use clap::{Parser, Subcommand};
use squarepack::{config, output, process, scan};
use std::path::PathBuf;

/// Shared flags for commands that process images.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the processing cache — force re-processing of all images
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser)]
#[command(name = "squarepack")]
#[command(about = "Batch image normalizer with a byte budget")]
#[command(long_about = "\
Batch image normalizer with a byte budget

Every image in the source directory is scaled to cover the configured
dimensions, center-cropped to exactly that size, flattened over white if it
has transparency, and encoded as a JPEG at the highest quality whose size
fits the byte budget.

Source layout:

  images/
  ├── config.toml                  # Tool config (optional)
  ├── IMG_4821.jpg
  ├── logo.png                     # Transparency flattened over white
  └── shoot-2024/
      └── 001.webp                 # Subdirectories are walked too

Outputs land flat in the output directory as <stem>.jpg. Broken files are
reported per-image and never stop the batch.

Run 'squarepack gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Source directory containing images (and optionally config.toml)
    #[arg(long, default_value = "images", global = true)]
    source: PathBuf,

    /// Output directory for processed JPEGs
    #[arg(long, default_value = "resized", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process all images in the source directory
    Run(CacheArgs),
    /// List discovered images without processing
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(cache_args) => {
            let config = config::load_config(&cli.source)?;
            init_thread_pool(&config.processing);

            let manifest = scan::scan(&cli.source)?;
            if manifest.images.is_empty() {
                println!("No images found in {}", cli.source.display());
                return Ok(());
            }

            let max_bytes = config.output.max_bytes;
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for report in rx {
                    output::print_report(&report, max_bytes);
                }
            });
            let summary = process::process(
                &manifest,
                &cli.source,
                &cli.output,
                &config,
                !cache_args.no_cache,
                Some(tx),
            )?;
            printer.join().unwrap();

            println!("{}", output::format_summary(&summary));
            if summary.cache_stats.hits > 0 {
                println!("Cache: {}", summary.cache_stats);
            }
            if summary.failed() > 0 {
                std::process::exit(1);
            }
        }
        Command::Check => {
            // Validates config as a side effect, same as a run would
            config::load_config(&cli.source)?;
            let manifest = scan::scan(&cli.source)?;
            output::print_check_output(&manifest, &cli.source);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
