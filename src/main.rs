use std::env;
use std::io::Write;

use mediagrab::{
    event_channel, find_format, format_catalog, resolve_descriptor, AppState, SimulatedTransfer,
    TransferEvent, TransferTiming,
};

#[tokio::main]
async fn main() {
    mediagrab::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: mediagrab <url> [format-id]");
        eprintln!("       mediagrab formats");
        eprintln!("       mediagrab history");
        eprintln!("       mediagrab clear-history");
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "formats" => {
            print_formats();
            Ok(())
        }
        "history" => print_history().await,
        "clear-history" => clear_history().await,
        url => run_download(url, args.get(2).map(String::as_str)).await,
    };

    if let Err(error) = result {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn print_formats() {
    println!("Available formats:");
    for format in format_catalog() {
        println!(
            "  {:<10} {:<11} {:<10} {}",
            format.id,
            format.quality,
            format.resolution,
            human_bytes(format.file_size)
        );
    }
}

async fn print_history() -> anyhow::Result<()> {
    let state = AppState::new()?;
    let entries = state.history.load();

    if entries.is_empty() {
        println!("No downloads recorded yet.");
        return Ok(());
    }

    for entry in entries {
        println!(
            "{}  {:<9} {}",
            entry.download_date.format("%Y-%m-%d %H:%M"),
            entry.format,
            entry.title
        );
    }
    Ok(())
}

async fn clear_history() -> anyhow::Result<()> {
    let state = AppState::new()?;
    state.history.clear()?;
    println!("Download history cleared.");
    Ok(())
}

async fn run_download(url: &str, format_id: Option<&str>) -> anyhow::Result<()> {
    let state = AppState::new()?;

    let source = state.classifier.classify(url)?;
    println!("Source: {} ({})", source.platform, source.id);

    let descriptor = resolve_descriptor(state.metadata.as_ref(), url, &source).await;
    println!("Title:  {}", descriptor.title);

    let format_id = match format_id {
        Some(id) => id.to_string(),
        None => state.config.read().await.download.default_format.clone(),
    };
    let format = find_format(&format_id)
        .ok_or_else(|| anyhow::anyhow!("Unknown format: {} (try `mediagrab formats`)", format_id))?;
    println!("Format: {} {} ({})", format.quality, format.resolution, human_bytes(format.file_size));

    let (tx, mut rx) = event_channel();
    let mut transfer = SimulatedTransfer::new(
        descriptor.clone(),
        format.clone(),
        TransferTiming::default(),
        tx,
    );
    transfer.start().await?;

    while let Some(event) = rx.recv().await {
        match event {
            TransferEvent::TransferStarted { .. } => {
                println!("Downloading...");
            }
            TransferEvent::TransferProgress { snapshot, .. } => {
                print!(
                    "\r{:>5.1}% of {} at {}/s  ETA {}   ",
                    snapshot.progress_percent,
                    human_bytes(snapshot.total_bytes),
                    human_bytes(snapshot.speed_bps as u64),
                    snapshot
                        .eta_seconds
                        .map(|s| format!("{s}s"))
                        .unwrap_or_else(|| "--".to_string()),
                );
                let _ = std::io::stdout().flush();
            }
            TransferEvent::TransferCompleted { .. } => {
                println!();
                break;
            }
            _ => {}
        }
    }

    if let Some(mut entry) = transfer.history_entry().await {
        let output_dir = state.config.read().await.download.output_directory.clone();
        let extension = if format.id.starts_with("mp3") { "mp3" } else { "mp4" };
        entry.file_path = Some(format!(
            "{}/{}.{}",
            output_dir,
            descriptor.title.replace('/', "_"),
            extension
        ));
        state.history.append(entry)?;
        println!("Done. Recorded to download history.");
    }

    Ok(())
}

fn human_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    let bytes = bytes as f64;
    if bytes >= MB {
        format!("{:.1} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{bytes:.0} B")
    }
}
