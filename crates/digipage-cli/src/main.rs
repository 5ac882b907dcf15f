use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use digipage_core::{
    BookOutcome, CancellationToken, CompletedLog, CropRegion, JsonLogStore, RatioRect,
    ScannerMode, SplitLayout, StationConfig, TransformEngine, book_display_name, display_name,
};
use digipage_station::AppLogger;
use log::LevelFilter;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "dpg", about = "Book scanning station tools", version)]
struct Cli {
    /// Station configuration file
    #[arg(short, long, global = true, default_value = "config.json")]
    config: PathBuf,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the scans waiting in the scan folder
    Scan,

    /// Show staged books and today's archived totals
    Stats,

    /// Crop an image in place
    Crop {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        x: u32,

        #[arg(long)]
        y: u32,

        #[arg(long)]
        width: u32,

        #[arg(long)]
        height: u32,
    },

    /// Rotate an image in place, zooming to keep the frame filled
    Rotate {
        #[arg(short, long)]
        input: PathBuf,

        /// Degrees, positive is clockwise
        #[arg(short, long, allow_hyphen_values = true)]
        angle: f64,
    },

    /// Split a two-page scan into final/{name}_L and final/{name}_R
    Split {
        #[arg(short, long)]
        input: PathBuf,

        /// Where the left page ends, as a fraction of the width
        #[arg(long, default_value = "0.5")]
        ratio: f64,

        /// Do not write the left page
        #[arg(long)]
        no_left: bool,

        /// Do not write the right page
        #[arg(long)]
        no_right: bool,
    },

    /// Cut an image at a pixel column into {name}_L and {name}_R beside it
    SplitAt {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        x: u32,
    },

    /// Delete a scan
    Delete {
        #[arg(short, long)]
        input: PathBuf,

        /// Also delete its split pages under final/
        #[arg(long)]
        with_artifacts: bool,
    },

    /// Put back the pre-edit copy of an image
    Restore {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Move pages into a numbered book folder
    CreateBook {
        /// Book folder name, e.g. Lib-297-00042
        #[arg(short, long)]
        name: String,

        /// Pages to use; defaults to the current scans
        #[arg(short, long, num_args = 1..)]
        pages: Vec<PathBuf>,

        /// Override the configured scanner mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },

    /// Move staged books into their city archives
    Transfer {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Dual,
    Single,
}

impl From<ModeArg> for ScannerMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Dual => Self::DualScan,
            ModeArg::Single => Self::SingleSplit,
        }
    }
}

/// Cancel `token` on Ctrl-C
fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling...");
            token.cancel();
        }
    });
}

async fn confirm(prompt: &str) -> Result<bool> {
    println!("{} [y/N]", prompt);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    AppLogger::new(100, level).init()?;

    let config = StationConfig::load(&cli.config)
        .await
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    let engine = TransformEngine::new(&config.backup_folder);

    match cli.command {
        Commands::Scan => {
            config.validate()?;
            let files = digipage_core::scan_directory(&config.scan_folder).await?;
            for file in &files {
                println!("{}", display_name(file));
            }
            println!("{} scans in {}", files.len(), config.scan_folder.display());
        }

        Commands::Stats => {
            let log_store: Arc<dyn CompletedLog> =
                Arc::new(JsonLogStore::new(&config.completed_log_file));
            let stats =
                digipage_core::calculate_stats(&config.todays_books_folder, log_store).await?;

            println!("Today's books:");
            for (name, pages) in &stats.staged {
                println!("  {:<12} {:>5} pages  ({})", book_display_name(name), pages, name);
            }
            println!(
                "  {} pages in {} books",
                stats.staged_pages(),
                stats.staged.len()
            );
            println!(
                "Archived today: {} pages in {} books",
                stats.archived_pages,
                stats.archived_books.len()
            );
        }

        Commands::Crop {
            input,
            x,
            y,
            width,
            height,
        } => {
            engine.crop(&input, CropRegion::new(x, y, width, height)).await?;
            println!("Cropped {}", input.display());
        }

        Commands::Rotate { input, angle } => {
            engine.rotate(&input, angle).await?;
            println!("Rotated {} by {:.1}°", input.display(), angle);
        }

        Commands::Split {
            input,
            ratio,
            no_left,
            no_right,
        } => {
            if ratio <= 0.0 || ratio >= 1.0 {
                bail!("ratio must be between 0 and 1");
            }
            let layout = SplitLayout {
                left: RatioRect::new(0.0, 0.0, ratio, 1.0),
                right: RatioRect::new(ratio, 0.0, 1.0 - ratio, 1.0),
                left_enabled: !no_left,
                right_enabled: !no_right,
            };
            let output = engine.split_two_page(&input, layout).await?;
            for page in output.left.iter().chain(output.right.iter()) {
                println!("Wrote {}", page.display());
            }
            for stale in &output.removed {
                println!("Removed {}", stale.display());
            }
        }

        Commands::SplitAt { input, x } => {
            let (left, right) = engine.split_at(&input, x).await?;
            println!("Split {} → {}, {}", input.display(), left.display(), right.display());
        }

        Commands::Delete {
            input,
            with_artifacts,
        } => {
            if with_artifacts {
                for removed in engine.delete_with_split_artifacts(&input).await? {
                    println!("Deleted {}", removed.display());
                }
            } else {
                engine.delete(&input).await?;
                println!("Deleted {}", input.display());
            }
        }

        Commands::Restore { input } => {
            engine.restore(&input).await?;
            println!("Restored {}", input.display());
        }

        Commands::CreateBook { name, pages, mode } => {
            config.validate()?;
            let mode = mode.map(ScannerMode::from).unwrap_or(config.scanner_mode);

            let (pages, source_hint) = if !pages.is_empty() {
                let hint = pages[0].parent().map(|p| p.to_path_buf());
                (pages, hint)
            } else {
                let folder = match mode {
                    ScannerMode::DualScan => config.scan_folder.clone(),
                    ScannerMode::SingleSplit => config.final_folder(),
                };
                let pages = digipage_core::scan_directory(&folder).await?;
                (pages, Some(folder))
            };

            let cancel = CancellationToken::new();
            cancel_on_interrupt(cancel.clone());

            let assembler = digipage_core::BookAssembler::new(&config.todays_books_folder);
            let outcome = assembler
                .assemble(&name, pages, source_hint, cancel, |done, total| {
                    eprint!("\rMoving page {}/{}", done, total);
                })
                .await;
            eprintln!();

            match outcome? {
                BookOutcome::Completed { folder, pages } => {
                    println!("Created {} with {} pages → {}", name, pages, folder.display());
                }
                BookOutcome::Cancelled => println!("Cancelled; pages were put back"),
            }
        }

        Commands::Transfer { yes } => {
            config.validate()?;
            let plan =
                digipage_core::prepare_transfer(&config.todays_books_folder, config.city_paths.clone())
                    .await?;

            for warning in &plan.warnings {
                println!("warning: {}", warning);
            }
            if plan.moves.is_empty() {
                println!("Nothing to transfer");
                return Ok(());
            }
            for planned in &plan.moves {
                println!("  {} → {}", planned.name, planned.destination.display());
            }

            if !yes && !confirm(&format!("Move {} books?", plan.moves.len())).await? {
                println!("Transfer not started");
                return Ok(());
            }

            let cancel = CancellationToken::new();
            cancel_on_interrupt(cancel.clone());

            let log_store: Arc<dyn CompletedLog> =
                Arc::new(JsonLogStore::new(&config.completed_log_file));
            let summary = digipage_core::execute_transfer(
                plan.moves,
                log_store,
                cancel,
                |planned, pages| println!("Moved {} ({} pages)", planned.name, pages),
            )
            .await?;

            if summary.cancelled {
                println!("Transfer cancelled after {} books", summary.transferred);
            } else {
                println!("Transferred {} books.", summary.transferred);
            }
        }
    }

    Ok(())
}
