//! Purpose: `campuslore` CLI entry point and command dispatch bootstrap.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Feed commands always print a `{success, records}` envelope on stdout.
//! Invariants: Errors are emitted as JSON on stderr (human text on a TTY).
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod render;

use campuslore::api::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS, Error, ErrorKind, ErrorPolicy, TileLayer,
    to_exit_code,
};
use campuslore::notice::{Notice, notice_json};
use render::{ColorChoice, error_json, error_text, notice_label, render_json};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome { exit_code });
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint(clap_error_hint(&err)),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing(cli.verbose);

    let color_mode = cli.color;
    let settings = Settings {
        config: ClientConfig::new(cli.base_url)
            .with_timeout(Duration::from_millis(cli.timeout_ms)),
        policy: cli.errors.into(),
        color_mode,
    };

    command_dispatch::dispatch_command(cli.command, &settings).map_err(|err| (err, color_mode))
}

/// Resolved global options shared by every command.
struct Settings {
    config: ClientConfig,
    policy: ErrorPolicy,
    color_mode: ColorMode,
}

#[derive(Parser)]
#[command(
    name = "campuslore",
    version,
    about = "Fetch and decode campus-history content",
    long_about = None,
    after_help = r#"EXAMPLES
  $ campuslore content "Willis Hall"
  $ campuslore memories --lat 44.4623 --lng -93.1538
  $ campuslore geofences --lat 44.4623 --lng -93.1538 --containing
  $ campuslore decode memories response.json
  $ campuslore distance 44.4623 -93.1538 44.4582 -93.1561

ENVIRONMENT
  CAMPUSLORE_BASE_URL    backend base url (default http://localhost:8080)
  CAMPUSLORE_TIMEOUT_MS  request timeout in milliseconds (default 2000)
  RUST_LOG               tracing filter; overrides -v"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "CAMPUSLORE_BASE_URL",
        default_value = DEFAULT_BASE_URL,
        value_hint = ValueHint::Url,
        help = "Backend base url"
    )]
    base_url: String,
    #[arg(
        long,
        global = true,
        env = "CAMPUSLORE_TIMEOUT_MS",
        default_value_t = DEFAULT_TIMEOUT_MS,
        help = "Request timeout in milliseconds"
    )]
    timeout_ms: u64,
    #[arg(
        long,
        short = 'e',
        global = true,
        value_enum,
        default_value = "stop",
        help = "Malformed element policy: stop fails the batch, skip drops the element"
    )]
    errors: ErrorPolicyCli,
    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "auto",
        help = "Colorize JSON output (auto|always|never)"
    )]
    color: ColorMode,
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Log more (-v info, -vv debug)")]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ErrorPolicyCli {
    Stop,
    Skip,
}

impl From<ErrorPolicyCli> for ErrorPolicy {
    fn from(value: ErrorPolicyCli) -> Self {
        match value {
            ErrorPolicyCli::Stop => ErrorPolicy::Stop,
            ErrorPolicyCli::Skip => ErrorPolicy::Skip,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FeedCli {
    Historical,
    Memories,
    Geofences,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TileLayerCli {
    Base,
    Labels,
}

impl From<TileLayerCli> for TileLayer {
    fn from(value: TileLayerCli) -> Self {
        match value {
            TileLayerCli::Base => TileLayer::Base,
            TileLayerCli::Labels => TileLayer::Labels,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Fetch historical text and image entries for a landmark")]
    Content {
        #[arg(help = "Geofence (landmark) name")]
        geofence: String,
    },
    #[command(about = "Fetch memories posted near a location")]
    Memories {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        #[arg(long, help = "Search radius sent to the backend (default 0.1)")]
        radius: Option<f64>,
    },
    #[command(about = "Fetch geofences near a location")]
    Geofences {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        #[arg(long, help = "Search radius in meters (default 100)")]
        radius: Option<i64>,
        #[arg(long, help = "Keep only geofences whose circle contains the location")]
        containing: bool,
    },
    #[command(about = "Upload a memory (image + description) at a location")]
    Upload {
        #[arg(long)]
        title: String,
        #[arg(long)]
        desc: String,
        #[arg(long)]
        uploader: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        #[arg(long, value_hint = ValueHint::FilePath, help = "JPEG file to upload")]
        image: PathBuf,
        #[arg(long, help = "When the photo was taken, YYYY-MM-DD HH:MM:SS (default: now, UTC)")]
        taken: Option<String>,
    },
    #[command(about = "Decode a saved backend response without touching the network")]
    Decode {
        #[arg(value_enum)]
        feed: FeedCli,
        #[arg(
            long,
            required_if_eq("feed", "historical"),
            help = "Landmark key under `content` (historical feed only)"
        )]
        geofence: Option<String>,
        #[arg(value_hint = ValueHint::FilePath, help = "Response file (default: stdin, or `-`)")]
        input: Option<PathBuf>,
    },
    #[command(about = "Great-circle distance in meters between two coordinates")]
    Distance {
        #[arg(allow_negative_numbers = true)]
        from_lat: f64,
        #[arg(allow_negative_numbers = true)]
        from_lng: f64,
        #[arg(allow_negative_numbers = true)]
        to_lat: f64,
        #[arg(allow_negative_numbers = true)]
        to_lng: f64,
    },
    #[command(about = "Print campus map tile URLs")]
    TileUrl {
        #[arg(long, value_enum, help = "Layer to print (default: all layers)")]
        layer: Option<TileLayerCli>,
        x: u32,
        y: u32,
        zoom: u32,
    },
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    #[command(about = "Print version info")]
    Version,
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    rendered
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_start_matches("error:").trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

fn clap_error_hint(err: &clap::Error) -> String {
    match err.kind() {
        ClapErrorKind::InvalidValue | ClapErrorKind::ValueValidation => {
            "Check the value against `campuslore <command> --help`.".to_string()
        }
        ClapErrorKind::MissingRequiredArgument => {
            "A required argument is missing; see `campuslore <command> --help`.".to_string()
        }
        _ => "Try `campuslore --help`.".to_string(),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "off",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_json(value: Value, color_mode: ColorMode) {
    let use_color = color_mode.use_color(io::stdout().is_terminal());
    println!("{}", render_json(&value, ColorChoice::from_flag(use_color)));
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        let color = ColorChoice::from_flag(color_mode.use_color(is_tty));
        eprintln!("{}", error_text(err, color));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn notice_time_now() -> Option<String> {
    use time::format_description::well_known::Rfc3339;
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    ts.format(&Rfc3339).ok()
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        let color = ColorChoice::from_flag(color_mode.use_color(is_tty));
        eprintln!("{} {} (feed: {})", notice_label(color), notice.message, notice.feed);
        return;
    }

    let value = notice_json(notice);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}
