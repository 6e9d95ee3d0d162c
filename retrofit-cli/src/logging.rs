use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Filter used when neither `--log-level` nor `RUST_LOG` is given.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Where log lines go, as chosen on the command line.
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    /// Level or full `EnvFilter` directive; wins over `RUST_LOG`.
    pub directive: Option<String>,
    /// Appended to, never truncated.
    pub file: Option<PathBuf>,
    /// Keeps stderr clean; the file still gets everything.
    pub quiet: bool,
}

/// One line per event: local timestamp, level, module path below the crate,
/// then the event fields.
struct WizardLine;

impl<S, N> FormatEvent<S, N> for WizardLine
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let color = writer.has_ansi_escapes();
        let stamp = Local::now().format("%H:%M:%S%.3f");
        let level = format!("{:>5}", meta.level());
        let target = short_target(meta.target());

        if color {
            write!(
                writer,
                "\x1b[2m{stamp}\x1b[0m {}{level}\x1b[0m \x1b[36m{target}\x1b[0m ",
                level_color(meta.level())
            )?;
        } else {
            write!(writer, "{stamp} {level} {target} ")?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;34m",
        Level::TRACE => "\x1b[1;35m",
    }
}

/// `retrofit_core::wizard::options` -> `wizard::options`
fn short_target(target: &str) -> &str {
    target.split_once("::").map_or(target, |(_, rest)| rest)
}

fn build_filter(directive: Option<&str>) -> anyhow::Result<EnvFilter> {
    match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log level '{directive}'")),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))),
    }
}

/// Installs the global subscriber. Console output goes to stderr so the
/// report on stdout stays pipeable.
pub fn init(settings: &LogSettings) -> anyhow::Result<()> {
    let filter = build_filter(settings.directive.as_deref())?;

    let file_layer = match &settings.file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file '{}'", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .event_format(WizardLine)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let console_layer = (!settings.quiet).then(|| {
        tracing_subscriber::fmt::layer()
            .event_format(WizardLine)
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("a global logger is already installed")
}
