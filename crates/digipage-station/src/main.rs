use anyhow::{Context, Result, bail};
use clap::Parser;
use digipage_core::{CropRegion, ScannerMode, StationConfig, book_display_name, display_name};
use digipage_runtime::StationUpdate;
use digipage_station::{AppLogger, Station, StationEvent};
use log::LevelFilter;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "digipage-station", about = "Headless book scanning station", version)]
struct Cli {
    /// Station configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

const HELP: &str = "\
commands:
  next | prev | end          navigate
  mode dual|single           switch scanner mode
  edit | done                hold / release the edit lock
  crop X Y W H [SLOT]        crop the displayed page (slot 0 or 1)
  rotate DEGREES [SLOT]      rotate the displayed page
  delete                     delete what is displayed
  replace                    start / cancel replacing the displayed pair
  book NAME                  assemble the current pages into a book
  cancel                     cancel the running book or transfer
  transfer | confirm         plan the transfer, then execute it
  stats                      recalculate today's numbers
  log [N|clear]              show the last N log records
  quit";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let logger = AppLogger::new(1000, level);
    logger.init()?;

    let config = StationConfig::load(&cli.config)
        .await
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    let mut station = Station::start(config)?;
    station.subscribe(print_event);

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = station.process_next() => continue,
        };

        let Some(line) = line else { break };
        match run_command(&mut station, &logger, line.trim()).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("error: {:#}", e),
        }
    }

    station.shutdown().await?;
    Ok(())
}

/// Returns `false` when the console should exit
async fn run_command(station: &mut Station, logger: &AppLogger, line: &str) -> Result<bool> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(true);
    };
    let args: Vec<&str> = words.collect();

    match command {
        "next" => refused_unless(station.next(), "navigation is locked")?,
        "prev" => refused_unless(station.prev(), "navigation is locked")?,
        "end" => refused_unless(station.jump_to_end(), "a replacement is in progress")?,
        "mode" => {
            let mode = match args.first().copied() {
                Some("dual") => ScannerMode::DualScan,
                Some("single") => ScannerMode::SingleSplit,
                _ => bail!("usage: mode dual|single"),
            };
            station.set_scanner_mode(mode);
        }
        "edit" => station.set_editing(true),
        "done" => station.set_editing(false),
        "crop" => {
            let numbers = parse_numbers::<u32>(&args)?;
            let &[x, y, w, h, ..] = numbers.as_slice() else {
                bail!("usage: crop X Y W H [SLOT]");
            };
            let path = displayed(station, numbers.get(4).copied().unwrap_or(0) as usize)?;
            station.crop(path, CropRegion::new(x, y, w, h));
        }
        "rotate" => {
            let angle: f64 = args
                .first()
                .context("usage: rotate DEGREES [SLOT]")?
                .parse()
                .context("angle must be a number")?;
            let slot = match args.get(1) {
                Some(slot) => slot.parse().context("slot must be 0 or 1")?,
                None => 0,
            };
            let path = displayed(station, slot)?;
            station.rotate(path, angle);
        }
        "delete" => refused_unless(station.delete_current(), "nothing to delete")?,
        "replace" => {
            station.toggle_replace();
        }
        "book" => {
            let name = args.join(" ");
            if name.is_empty() {
                bail!("usage: book NAME");
            }
            station.create_book(&name).await?;
        }
        "cancel" => refused_unless(station.cancel_current_operation(), "nothing to cancel")?,
        "transfer" => station.prepare_transfer(),
        "confirm" => refused_unless(station.confirm_transfer(), "no transfer is pending")?,
        "stats" => station.calculate_stats(),
        "log" => match args.first().copied() {
            Some("clear") => logger.clear(),
            Some(count) => print_log(logger, count.parse().context("usage: log [N|clear]")?),
            None => print_log(logger, 20),
        },
        "help" => println!("{}", HELP),
        "quit" | "exit" => return Ok(false),
        other => bail!("unknown command {:?} (try help)", other),
    }
    Ok(true)
}

fn print_log(logger: &AppLogger, count: usize) {
    for entry in logger.recent(count) {
        println!(
            "{} {:<5} {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.level,
            entry.message
        );
    }
}

fn refused_unless(accepted: bool, reason: &str) -> Result<()> {
    if !accepted {
        bail!("refused: {}", reason);
    }
    Ok(())
}

fn parse_numbers<T: std::str::FromStr>(args: &[&str]) -> Result<Vec<T>> {
    args.iter()
        .map(|arg| arg.parse::<T>().ok().with_context(|| format!("not a number: {}", arg)))
        .collect()
}

fn displayed(station: &Station, slot: usize) -> Result<PathBuf> {
    station
        .sequence()
        .visible()
        .get(slot)
        .cloned()
        .with_context(|| format!("no page in slot {}", slot))
}

fn print_event(event: &StationEvent) {
    match event {
        StationEvent::ViewChanged(view) => {
            let names: Vec<String> = view.pages.iter().map(|p| display_name(p)).collect();
            println!(
                "[view] {}/{} {}{}{}",
                (view.cursor + 1).min(view.total),
                view.total,
                names.join(" | "),
                if view.editing { " (editing)" } else { "" },
                if view.replacing { " (replacing)" } else { "" },
            );
        }
        StationEvent::InvalidateCache { paths } => {
            log::debug!("Invalidated {} cached pages", paths.len());
        }
        StationEvent::ReplaceProgress { collected } => {
            println!("[replace] {}/2 new scans", collected);
        }
        StationEvent::Status(text) => println!("[status] {}", text),
        StationEvent::Worker(update) => print_update(update),
    }
}

fn print_update(update: &StationUpdate) {
    match update {
        StationUpdate::ScanComplete { files } => println!("[scan] {} images", files.len()),
        StationUpdate::StatsCalculated { stats } => {
            println!(
                "[stats] staged {} pages in {} books, archived {} pages in {} books today",
                stats.staged_pages(),
                stats.staged.len(),
                stats.archived_pages,
                stats.archived_books.len()
            );
            for (name, pages) in &stats.staged {
                println!("        {:<12} {:>5} pages", book_display_name(name), pages);
            }
        }
        StationUpdate::OperationComplete { kind, message, .. } => {
            println!("[done] {}: {}", kind, message);
        }
        StationUpdate::BookProgress { done, total } => println!("[book] {}/{}", done, total),
        StationUpdate::TransferPlanReady { plan } => {
            println!("[transfer] {} books ready", plan.moves.len());
            for planned in &plan.moves {
                println!("  {} -> {}", planned.name, planned.destination.display());
            }
            for warning in &plan.warnings {
                println!("  warning: {}", warning);
            }
            if !plan.moves.is_empty() {
                println!("  type confirm to move them");
            }
        }
        StationUpdate::Error { message, .. } => println!("[error] {}", message),
    }
}
