//! Tracing subscriber setup
//!
//! Log records are handed to a background writer thread so formatting and
//! terminal I/O never run on the request path.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ServerSettings};

/// Output level chosen by the `verbose` / `quiet` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    /// `quiet` overrides `verbose`
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (_, true) => Verbosity::Quiet,
            (true, false) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        }
    }

    /// Default filter directive when `RUST_LOG` is not set
    ///
    /// Quiet mode still lets TLS policy warnings through.
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "off,claude_proxy::tls=warn",
            Verbosity::Normal => "claude_proxy=info,tower_http=warn",
            Verbosity::Verbose => "claude_proxy=debug,tower_http=debug",
        }
    }
}

/// Install the global subscriber
///
/// The returned guard flushes pending records on drop; keep it alive for the
/// lifetime of the process.
pub fn init(settings: &ServerSettings) -> WorkerGuard {
    let verbosity = Verbosity::from_flags(settings.verbose, settings.quiet);
    let filter = if verbosity == Verbosity::Quiet {
        EnvFilter::new(verbosity.filter_directive())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()))
    };

    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let registry = tracing_subscriber::registry().with(filter);
    let result = match settings.log_format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(writer).with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(writer).with_target(true))
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {e}");
    }

    guard
}
