use colored::*;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::registry::LookupSpan;

use asnrecon_core::worker::DISCOVERY_TARGET;

use crate::terminal::spinner::SpinnerWriter;

const CRATES: &[&str] = &["asnrecon_cli", "asnrecon_core", "asnrecon_common", "asnrecon_protocols"];

/// One status symbol per line. Discoveries get their own marker so they stand out
/// between the `Testing <range>...` progress lines.
pub struct ReconFormatter;

type Paint = fn(ColoredString) -> ColoredString;

fn marker(level: &Level, target: &str) -> (&'static str, Paint) {
    if target == DISCOVERY_TARGET {
        return ("[*]", |s| s.magenta().bold());
    }
    match *level {
        Level::ERROR => ("[-]", |s| s.red().bold()),
        Level::WARN => ("[!]", |s| s.yellow().bold()),
        Level::INFO => ("[+]", |s| s.green().bold()),
        _ => ("[?]", |s| s.blue()),
    }
}

impl<S, N> FormatEvent<S, N> for ReconFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let (symbol, paint) = marker(meta.level(), meta.target());

        write!(writer, "{} ", paint(symbol.into()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `verbosity`.
pub fn init(verbosity: u8) {
    let level: &str = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let default_directives: String = std::iter::once("warn".to_string())
        .chain(CRATES.iter().map(|krate| format!("{krate}={level}")))
        .collect::<Vec<String>>()
        .join(",");

    let filter: EnvFilter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(ReconFormatter)
        .with_writer(|| SpinnerWriter)
        .init();
}
