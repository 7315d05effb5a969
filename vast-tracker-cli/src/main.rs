//! VAST Tracker CLI Application
//!
//! Replays a scripted player session against a parsed VAST ad using the
//! vast-tracker library, and reports:
//! - Every tracker notification, in order
//! - Every beacon URL with its macros resolved
//! - The tracker state at the end of the session

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod beacon;
mod config;
mod report;
mod session;

use config::OutputFormat;

/// VAST Tracker - Replay player sessions against VAST ads
#[derive(Parser, Debug)]
#[command(name = "vast-tracker-cli")]
#[command(about = "Replay scripted player sessions against a VAST ad", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the session file (session.toml)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Ad JSON file, overriding the one named in the session
    #[arg(short, long, value_name = "FILE")]
    ad: Option<PathBuf>,

    /// Output file for the report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Report format, overriding the session's
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("VAST Tracker CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using tracker library v{}", vast_tracker::VERSION);

    log::info!("Loading session from: {:?}", args.config);
    let session_config = config::load_config(&args.config)?;

    let ad_path = match &args.ad {
        Some(path) => path.clone(),
        None => config::resolve_relative(&args.config, &session_config.ad.file),
    };
    log::info!("Loading ad from: {:?}", ad_path);
    let ad = config::load_ad(&ad_path)?;
    log::debug!("Ad has {} creative(s)", ad.creatives.len());

    let report = session::run(&ad, &session_config)?;

    let format = args.format.unwrap_or(session_config.output.format);
    let output = args.output.as_deref().or(session_config.output.path.as_deref());
    report::write_report(&report, format, output)?;

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
