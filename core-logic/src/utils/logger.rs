use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    prelude::*,
    registry::LookupSpan,
    Layer,
};

/// Target used for per-claim and per-cycle result lines. Events on this
/// target reach the console at INFO; everything else only at ERROR.
pub const RESULT_TARGET: &str = "claim_result";

/// Installs the console + hourly rolling file subscriber.
///
/// `file_prefix` names the files under `logs/` (e.g. `smashx.2026-10-18-14`).
/// The returned guard flushes the file writer on drop and MUST be kept alive
/// by the caller.
pub fn setup_logger(file_prefix: &str) -> Option<WorkerGuard> {
    std::fs::create_dir_all("logs").ok();

    let file_appender = tracing_appender::rolling::hourly("logs", file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // File layer: INFO for claim results, WARN for others
    let file_filter = tracing_subscriber::filter::Targets::new()
        .with_target(RESULT_TARGET, tracing::Level::INFO)
        .with_default(tracing::Level::WARN);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(file_filter);

    // Console layer: INFO for claim results, ERROR for others
    let console_filter = tracing_subscriber::filter::Targets::new()
        .with_target(RESULT_TARGET, tracing::Level::INFO)
        .with_default(tracing::Level::ERROR);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(TerminalFormatter)
        .with_filter(console_filter);

    let installed = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init();

    installed.ok().map(|_| guard)
}

/// Errors-only console output, no log files.
pub fn setup_quiet_logger() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::ERROR)
        .try_init();
}

// --- Formatters ---

struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

fn paint_keyword(msg: &str, keyword: &str, style: Style) -> String {
    msg.replace(keyword, &style.paint(keyword).to_string())
}

/// Highlights SUCCESS (or, failing that, FAILED) in a console line.
fn colorize(msg: String) -> String {
    if msg.contains("SUCCESS") {
        paint_keyword(&msg, "SUCCESS", Style::new().fg(Color::LightGreen).bold())
    } else if msg.contains("FAILED") {
        paint_keyword(&msg, "FAILED", Style::new().fg(Color::LightRed).bold())
    } else {
        msg
    }
}

pub struct TerminalFormatter;

impl<S, N> FormatEvent<S, N> for TerminalFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut msg_visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut msg_visitor);

        writeln!(writer, "{}", colorize(msg_visitor.message))
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let level = event.metadata().level();

        write!(writer, "{} [{}] ", timestamp, level)?;

        let mut msg_visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut msg_visitor);
        writeln!(writer, "{}", msg_visitor.message)
    }
}
