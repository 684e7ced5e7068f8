//! Binary entry point for `ssi-bot`.
//!
//! Parses the command line, installs the tracing subscriber, loads the configuration and
//! hands over to [`ssi_bot::start`]. The process exits non-zero on any fatal error.

use clap::Parser;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use ssi_bot::base::{config::Config, types::Void};
use tracing::{Level, error};
use tracing_subscriber::{filter::LevelFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Ssi-bot: liveness replies, main channel moderation and onboarding for the SSI Mattermost server.
///
/// Settings are read from `.hidden/config.toml` (or `--config`) and from environment
/// variables prefixed with `SSI_BOT_`, e.g. `SSI_BOT_SERVER_URL` or `SSI_BOT_BOT_PASSWORD`.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Log verbosity: INFO by default, DEBUG with -v, TRACE (with span events) with -vv.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Also export spans to an OTLP collector over HTTP (see `OTEL_EXPORTER_OTLP_ENDPOINT`).
    #[arg(long)]
    otlp: bool,
}

#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    init_tracing(args.verbose, args.otlp)?;

    let config = Config::load(args.config.as_deref())?;

    let result = ssi_bot::start(config).await;

    if let Err(err) = &result {
        error!("Fatal: {:#}", err);
    }

    result
}

/// Install the global subscriber: a console layer, plus an OTLP layer when requested.
fn init_tracing(verbose: u8, otlp: bool) -> Void {
    let (level, span_events) = match verbose {
        0 => (Level::INFO, FmtSpan::NONE),
        1 => (Level::DEBUG, FmtSpan::NONE),
        _ => (Level::TRACE, FmtSpan::NEW | FmtSpan::CLOSE),
    };

    let console = tracing_subscriber::fmt::layer()
        .with_ansi(true)
        .with_level(true)
        .with_target(verbose > 0)
        .with_span_events(span_events);

    let otel = match otlp {
        true => {
            let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
            let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_batch_exporter(exporter).build();

            Some(tracing_opentelemetry::layer().with_tracer(provider.tracer("ssi-bot")))
        }
        false => None,
    };

    tracing_subscriber::registry().with(otel).with(LevelFilter::from_level(level)).with(console).init();

    Ok(())
}
