mod cli;

use archivist::{config, fileops, library, scanner};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "archivist=trace,archivist_av=debug".to_string()
        } else {
            "archivist=info,archivist_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    match cli.command {
        Commands::Scan {
            directory,
            full,
            concurrency,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_scan(directory, full, concurrency, cli.config.as_deref()))
        }
        Commands::Probe { file, json } => probe_file(&file, json),
        Commands::Rename {
            old_path,
            new_path,
            no_subtitles,
        } => run_rename(&old_path, &new_path, no_subtitles, cli.config.as_deref()),
        Commands::Mv { files, dest } => run_move(&files, &dest),
        Commands::Rm {
            files,
            delete_folders,
        } => run_delete(&files, delete_folders, cli.config.as_deref()),
        Commands::CheckTools => check_tools(),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("archivist {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_scan(
    directory: PathBuf,
    full: bool,
    concurrency: Option<usize>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !directory.exists() {
        anyhow::bail!("Directory does not exist: {:?}", directory);
    }

    // Without ffprobe no file can be probed at all
    archivist_av::require_tool("ffprobe")?;

    let store = library::LibraryStore::new(config.library.resolved_path());
    let prior = store.load()?;
    let snapshot = if full {
        library::Snapshot::new()
    } else {
        prior.snapshot()
    };

    let options = scanner::ScanOptions {
        concurrency: concurrency.unwrap_or(config.scan.concurrency),
        on_progress: Some(Box::new(|progress| {
            if let Some(total) = progress.total_count {
                tracing::info!("Scan progress: {}/{}", progress.processed_count, total);
            }
        })),
    };
    let scanner = scanner::Scanner::new(Arc::new(scanner::FfprobeProber::new()), options);

    // Ctrl-C requests cooperative cancellation; in-flight probes finish
    let cancel = scanner.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Cancellation requested");
            cancel.cancel();
        }
    });

    let outcome = scanner.scan(&directory, snapshot).await?;
    let progress = outcome.progress.clone();

    println!("Scanned {:?}", directory);
    println!("  Files: {}", outcome.records.len());
    println!(
        "  Probed: {}",
        outcome.records.len() - progress.skipped_count
    );
    println!("  Reused: {}", progress.skipped_count);
    println!("  Errors: {}", progress.error_count);
    for error in &progress.errors {
        println!("    {}: {}", error.path.display(), error.error);
    }

    match progress.status {
        scanner::ScanStatus::Completed => {
            let updated = library::Library {
                files: outcome.records,
                last_scan_path: Some(directory),
                last_scan_at: progress.completed_at,
            };
            store.save(&updated)?;
            println!("Library saved to {:?}", store.path());
            Ok(())
        }
        scanner::ScanStatus::Cancelled => {
            println!("Scan cancelled; library not updated");
            Ok(())
        }
        _ => {
            let message = progress
                .error_message
                .clone()
                .unwrap_or_else(|| "scan failed".to_string());
            anyhow::bail!(message)
        }
    }
}

fn probe_file(file: &Path, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let info = archivist_av::probe(file)?;

    if json {
        let json_str = serde_json::to_string_pretty(&info)?;
        println!("{}", json_str);
    } else {
        println!("File: {}", info.path.display());
        println!("Container: {}", info.container);
        println!("Size: {} bytes", info.size_bytes);
        if let Some(duration) = info.duration_secs {
            let secs = duration as u64;
            let mins = secs / 60;
            let hours = mins / 60;
            println!("Duration: {:02}:{:02}:{:02}", hours, mins % 60, secs % 60);
        }
        if let Some(bitrate) = info.bitrate {
            println!("Bitrate: {} b/s", bitrate);
        }

        println!("\nVideo Streams: {}", info.video_streams.len());
        for stream in &info.video_streams {
            println!(
                "  [{}] {} {}x{} ({})",
                stream.index, stream.codec, stream.width, stream.height, stream.resolution
            );
            if let Some(fps) = stream.frame_rate {
                println!("      {:.2} fps", fps);
            }
            if let Some(ref profile) = stream.profile {
                println!("      profile: {}", profile);
            }
        }

        println!("\nAudio Streams: {}", info.audio_streams.len());
        for stream in &info.audio_streams {
            print!(
                "  [{}] {} {}ch ({})",
                stream.index, stream.codec, stream.channels, stream.channel_type
            );
            if let Some(ref lang) = stream.language {
                print!(" ({})", lang);
            }
            if stream.default {
                print!(" [default]");
            }
            println!();
        }

        println!("\nSubtitle Streams: {}", info.subtitle_streams.len());
        for stream in &info.subtitle_streams {
            print!("  [{}] {}", stream.index, stream.codec);
            if let Some(ref lang) = stream.language {
                print!(" ({})", lang);
            }
            if stream.forced {
                print!(" [forced]");
            }
            if stream.default {
                print!(" [default]");
            }
            println!();
        }
    }

    Ok(())
}

fn run_rename(
    old_path: &Path,
    new_path: &Path,
    no_subtitles: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    if no_subtitles {
        fileops::rename_file(old_path, new_path)?;
        println!("Renamed {:?} -> {:?}", old_path, new_path);
        return Ok(());
    }

    let config = config::load_config_or_default(config_path)?;
    let renamed =
        fileops::rename_with_subtitles(old_path, new_path, config.fileops.subtitle_policy)?;

    println!("Renamed {:?} -> {:?}", old_path, new_path);
    if !renamed.is_empty() {
        println!("Subtitles moved:");
        for path in &renamed {
            println!("  {}", path.display());
        }
    }

    Ok(())
}

fn run_move(files: &[PathBuf], dest: &Path) -> Result<()> {
    let result = fileops::batch_move(files, dest);

    println!("Moved {} of {} files", result.success_count, files.len());
    for error in &result.errors {
        println!("  {}: {}", error.path.display(), error.error);
    }

    Ok(())
}

fn run_delete(files: &[PathBuf], delete_folders: bool, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let delete_parent_folders = delete_folders || config.fileops.delete_parent_folders;

    let result = fileops::batch_delete(files, delete_parent_folders);

    println!(
        "Deleted {} of {} files",
        result.files.success_count,
        files.len()
    );
    for error in &result.files.errors {
        println!("  {}: {}", error.path.display(), error.error);
    }
    if delete_parent_folders {
        println!("Folders removed: {}", result.folders_deleted);
        for error in &result.folder_errors {
            println!("  {}: {}", error.path.display(), error.error);
        }
    }

    Ok(())
}

fn check_tools() -> Result<()> {
    println!("Checking external tools...\n");

    let tools = archivist_av::check_tools();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable scanning.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Scan concurrency: {}", config.scan.concurrency);
            println!(
                "  Subtitle policy: {:?}",
                config.fileops.subtitle_policy
            );
            println!("  Library path: {:?}", config.library.resolved_path());
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Scan concurrency: {}", config.scan.concurrency);
            println!("  Library path: {:?}", config.library.resolved_path());
        }
    }

    Ok(())
}
