use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use trackkit::{init_logging, PieceCatalog, TrackSession, TrackSettings, BUILD_DATE, VERSION};

/// Load a saved track and report whether it is raceable
#[derive(Parser)]
#[command(name = "trackkit")]
#[command(version)]
struct Args {
    /// Track file (JSON)
    track: PathBuf,

    /// Settings file (JSON or TOML); defaults to the user config directory
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging()?;
    tracing::info!("trackkit {} (built {})", VERSION, BUILD_DATE);

    let settings = match &args.settings {
        Some(path) => TrackSettings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => TrackSettings::load_or_default(&TrackSettings::default_path()?)?,
    };

    let mut session = TrackSession::new(PieceCatalog::standard(), settings);
    session
        .load_from_file(&args.track)
        .with_context(|| format!("Failed to load track {}", args.track.display()))?;

    let status = session.status();
    println!(
        "{}: {} pieces, start piece: {}, closed loop: {}",
        session.name,
        status.piece_count,
        if status.has_start { "yes" } else { "no" },
        if status.closed { "yes" } else { "no" }
    );

    match session.enter_race_mode() {
        Ok(line) => println!("Race ready, lap length {:.1}", line.length()),
        Err(e) => println!("Not raceable: {}", e),
    }

    Ok(())
}
