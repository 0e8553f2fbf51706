/// lk7777 command-line tool: probe, inspect, demux, and validate
/// `LK 7777 Streaming` container captures.
///
/// # Command overview
///
/// ```text
/// lk7777 <COMMAND> [OPTIONS]
///
/// Commands:
///   probe      Report the probe score for the start of a file
///   inspect    List the frames of a file (no key needed)
///   demux      Write the decrypted video and audio elementary streams
///   validate   Read a whole file and report any corruption
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log at debug level (RUST_LOG overrides)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                       |
/// |------|-----------------------------------------------|
/// | 0    | Success                                       |
/// | 1    | Error (I/O failure, bad key, corrupt stream)  |
///
/// Diagnostics and logs go to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cmd_demux;
mod cmd_inspect;
mod cmd_probe;
mod cmd_validate;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Tools for lk7777 (`LK 7777 Streaming`) container files.
#[derive(Parser)]
#[command(name = "lk7777", version, about = "LK 7777 Streaming demuxer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level: resync, skipped frames, unaligned decryptions.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Report how confidently the file is recognised as lk7777.
    Probe(ProbeArgs),
    /// List every frame: offset, type, size, timestamp, resync distance.
    Inspect(InspectArgs),
    /// Write decrypted `video.h264` and `audio.mp2` elementary streams.
    Demux(DemuxArgs),
    /// Read the whole file and fail on corruption or truncation.
    Validate(ValidateArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `lk7777 probe`.
#[derive(clap::Args)]
pub struct ProbeArgs {
    /// Path to the capture to probe.
    pub file: PathBuf,
}

/// Arguments for `lk7777 inspect`.
///
/// Frames are located and their headers printed; payloads are skipped,
/// so no decryption key is needed.
///
/// ```text
/// ┌───────────┬──────────────────────────────────────────────┐
/// │ Flag      │ Effect                                       │
/// ├───────────┼──────────────────────────────────────────────┤
/// │ --limit N │ Stop after N frames                          │
/// │ --json    │ One JSON object per frame instead of a table │
/// └───────────┴──────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the capture to inspect.
    pub file: PathBuf,

    /// Stop after this many frames.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Emit JSON lines instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `lk7777 demux`.
#[derive(clap::Args)]
pub struct DemuxArgs {
    /// Path to the capture to demux.
    pub file: PathBuf,

    /// AES-128 key as 32 hex characters.
    #[arg(long, env = "LK7777_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Directory for the elementary streams (created if missing).
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

/// Arguments for `lk7777 validate`.
///
/// Decrypts and reads every frame. Exits 0 when the stream ends cleanly
/// and 1 on corruption, truncation, or a bad key.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Path to the capture to validate.
    pub file: PathBuf,

    /// AES-128 key as 32 hex characters.
    #[arg(long, env = "LK7777_KEY", hide_env_values = true)]
    pub key: Option<String>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    let default = if verbose {
        "lk7777=debug,lk_demux=debug"
    } else {
        "lk7777=info,lk_demux=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Probe(args) => cmd_probe::run(&args),
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Demux(args) => cmd_demux::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_demux_flags() {
        let cli = Cli::try_parse_from([
            "lk7777",
            "-v",
            "demux",
            "capture.lk",
            "--key",
            "000102030405060708090a0b0c0d0e0f",
            "-o",
            "out",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Demux(args) = cli.command else {
            panic!("expected demux");
        };
        assert_eq!(args.output, PathBuf::from("out"));
        assert_eq!(args.key.as_deref(), Some("000102030405060708090a0b0c0d0e0f"));
    }

    #[test]
    fn inspect_takes_limit() {
        let cli = Cli::try_parse_from(["lk7777", "inspect", "a.lk", "--limit", "5", "--json"]).unwrap();
        let Commands::Inspect(args) = cli.command else {
            panic!("expected inspect");
        };
        assert_eq!(args.limit, Some(5));
        assert!(args.json);
    }
}
