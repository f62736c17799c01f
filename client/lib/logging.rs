//! Logging via the tracing crate.

use std::{fmt, io};

use ansi_term::{Color, Style};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    field::MakeExt,
    fmt::{
        format::{self, Writer},
        time::{FormatTime, SystemTime},
        FmtContext, FormatEvent, FormatFields, FormattedFields,
    },
    registry::LookupSpan,
    EnvFilter,
};

/// Logging configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Output format for log.
    format: LoggingFormat,
    /// Abbreviate module names.
    ///
    /// If set, human-readable formats will abbreviate module names, `foo::bar::baz::bizz` will turn
    /// into `f:b:b:bizz`.
    abbreviate_modules: bool,
}

/// Logging output format.
///
/// Defaults to "text".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
enum LoggingFormat {
    /// Text format.
    Text,
    /// JSON format.
    Json,
}

impl Default for LoggingFormat {
    fn default() -> Self {
        LoggingFormat::Text
    }
}

/// Formats events as `time LEVEL spans: [module file:line] fields`.
struct FmtEvent {
    // Whether module segments should be shortened to first letter only.
    abbreviate_modules: bool,
}

impl FmtEvent {
    fn new(abbreviate_modules: bool) -> Self {
        FmtEvent { abbreviate_modules }
    }

    fn module(&self, full_module_path: &str) -> String {
        if !self.abbreviate_modules {
            return full_module_path.to_owned();
        }

        // Up to six levels deep without allocating.
        let mut parts: SmallVec<[&str; 6]> = full_module_path.split("::").collect();
        let count = parts.len();
        // Abbreviate all but last segment.
        for part in parts.iter_mut().take(count.saturating_sub(1)) {
            if let Some(first) = part.get(..1) {
                *part = first;
            }
        }
        parts.join(":")
    }
}

impl<S, N> FormatEvent<S, N> for FmtEvent
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        // print the date/time with dimmed style
        let dimmed = Style::new().dimmed();
        write!(writer, "{}", dimmed.prefix())?;
        SystemTime.format_time(&mut writer)?;
        write!(writer, "{}", dimmed.suffix())?;

        // print the log level in color
        let meta = event.metadata();
        let color = match *meta.level() {
            Level::TRACE => Color::Purple,
            Level::DEBUG => Color::Blue,
            Level::INFO => Color::Green,
            Level::WARN => Color::Yellow,
            Level::ERROR => Color::Red,
        };

        write!(
            writer,
            " {}{:<6}{}",
            color.prefix(),
            meta.level().to_string(),
            color.suffix()
        )?;

        // print the span information, outermost first
        if let Some(scope) = ctx.event_scope() {
            let mut span_seen = false;
            for span in scope.from_root() {
                write!(writer, "{}", span.metadata().name())?;
                span_seen = true;

                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{}}}", fields)?;
                    }
                }
                writer.write_char(':')?;
            }
            if span_seen {
                writer.write_char(' ')?;
            }
        }

        // print the module path, filename and line number with dimmed style
        let module = self.module(meta.module_path().unwrap_or_default());
        let file = if !self.abbreviate_modules {
            meta.file()
                .unwrap_or_default()
                .rsplit('/')
                .next()
                .unwrap_or_default()
        } else {
            ""
        };
        let line = meta.line().unwrap_or_default();

        write!(
            writer,
            "{}[{} {}:{}]{} ",
            dimmed.prefix(),
            module,
            file,
            line,
            dimmed.suffix()
        )?;

        // print the log message and other fields
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Initializes the logging system with the default parameters.
///
/// See `init_with_config` for details.
pub fn init() -> anyhow::Result<()> {
    init_with_config(&Default::default())
}

/// Initializes the logging system.
///
/// This function should only be called once during the lifetime of the application. Do not call
/// this outside of the application or testing code, the installed logger is global.
///
/// Logs go to `stderr`, leaving `stdout` to command output. Filtering follows `RUST_LOG`.
pub fn init_with_config(config: &LoggingConfig) -> anyhow::Result<()> {
    let formatter = format::debug_fn(|writer, field, value| {
        if field.name() == "message" {
            write!(writer, "{:?}", value)
        } else {
            write!(writer, "{}={:?}", field, value)
        }
    })
    .delimited("; ");

    match config.format {
        LoggingFormat::Text => tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_writer(io::stderr)
                .with_env_filter(EnvFilter::from_default_env())
                .fmt_fields(formatter)
                .event_format(FmtEvent::new(config.abbreviate_modules))
                .finish(),
        )?,
        LoggingFormat::Json => tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_writer(io::stderr)
                .with_env_filter(EnvFilter::from_default_env())
                .json()
                .finish(),
        )?,
    }

    Ok(())
}
