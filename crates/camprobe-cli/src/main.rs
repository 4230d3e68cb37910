use clap::Parser;
use camprobe_core::{ActivityReport, ActivityResult, ActivityStatus};
use camprobe_detect::Dispatcher;
use tracing::{info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Report whether the webcam is in use right now.
#[derive(Parser, Debug)]
#[command(name = "camprobe", version, about, long_about = None)]
struct Cli {
    /// The format for log output.
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// The minimum log level to display.
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "CAMPROBE_LOG_LEVEL"
    )]
    log_level: tracing::Level,

    /// Output the result as a JSON report.
    #[arg(long)]
    json: bool,

    /// Encode the result in the exit status.
    ///
    /// 0 = active, 1 = inactive, 2 = unknown. Without this flag the exit
    /// status is always 0.
    #[arg(long)]
    exit_status: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Eq)]
enum LogFormat {
    /// Human-readable text format.
    Text,
    /// Machine-readable JSON format.
    Json,
}

mod exit_codes {
    pub const ACTIVE: i32 = 0;
    pub const INACTIVE: i32 = 1;
    pub const UNKNOWN: i32 = 2;
    pub const INTERNAL_ERROR: i32 = 125;
}

fn main() {
    let cli = Cli::parse();

    // Initialize the tracing subscriber
    let filter = EnvFilter::from_default_env().add_directive(cli.log_level.into());

    match cli.log_format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    }

    info!("Initialization complete. Starting detection.");

    let dispatcher = Dispatcher::native();
    let result = dispatcher.detect();
    for warning in &result.warnings {
        warn!(warning = %warning, "probe degraded");
    }

    let status = result.status;
    if cli.json {
        let report = ActivityReport::from_result(result, dispatcher.platform().as_str());
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("Error: {err}");
                std::process::exit(exit_codes::INTERNAL_ERROR);
            }
        }
    } else {
        println!("{}", format_result(&result));
    }

    info!("Detection finished.");

    if cli.exit_status {
        std::process::exit(exit_code(status));
    }
}

fn format_result(result: &ActivityResult) -> String {
    match &result.label {
        Some(label) => format!("camera : {} ({label})", result.status),
        None => format!("camera : {}", result.status),
    }
}

fn exit_code(status: ActivityStatus) -> i32 {
    match status {
        ActivityStatus::Active => exit_codes::ACTIVE,
        ActivityStatus::Inactive => exit_codes::INACTIVE,
        ActivityStatus::Unknown => exit_codes::UNKNOWN,
    }
}
