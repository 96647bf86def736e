//! Offline runner: one frame through the session pipeline, overlaid output
//! to disk. Useful for tuning parameters against captured stills.

use std::path::PathBuf;
use std::process::ExitCode;

use boardsight::guide::load_placements;
use boardsight::{Session, SessionParams};
use clap::Parser;
use image::ImageReader;
use log::{info, LevelFilter};

#[derive(Parser, Debug)]
#[command(name = "boardsight", about = "Run the breadboard guide pipeline on a still image")]
struct Cli {
    /// Input camera frame (any format the image crate decodes).
    #[arg(short, long)]
    input: PathBuf,

    /// Component placement JSON: [{"ref": "R1", "positions": [[r,c],...]}].
    #[arg(short, long)]
    placements: Option<PathBuf>,

    /// Where to write the overlaid frame.
    #[arg(short, long, default_value = "boardsight-out.png")]
    output: PathBuf,

    /// Number of sequencer ticks to run (one simulated second each).
    #[arg(short, long, default_value_t = 1)]
    ticks: u32,

    /// Log chattiness: -v for debug, -vv for trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    boardsight::core::init_with_level(level)?;

    let mut frame = ImageReader::open(&cli.input)?.decode()?.to_rgb8();

    let placements = match &cli.placements {
        Some(path) => load_placements(&std::fs::read_to_string(path)?)?,
        None => Vec::new(),
    };
    let has_placements = !placements.is_empty();

    let mut session = Session::new(SessionParams::default(), placements);
    if has_placements {
        session.toggle_active(0);
    }

    let delay = SessionParams::default().advance_delay_ms;
    let mut last = None;
    for i in 1..=cli.ticks.max(1) as u64 {
        last = Some(session.process_frame(&mut frame, i * delay));
    }

    if let Some(report) = last {
        match report.outline {
            Some(kind) => info!("board outline: {kind:?}"),
            None => info!("no board found in frame"),
        }
        if report.rectified {
            info!(
                "grid {}x{}, {} holes ({} occupied)",
                report.grid_rows, report.grid_cols, report.hole_count, report.occupied_count
            );
        }
        if let Some(tick) = report.tick {
            info!("sequencer: {}", tick.label());
        }
    }

    frame.save(&cli.output)?;
    info!("wrote {}", cli.output.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
