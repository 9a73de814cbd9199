use std::io::Write;
use std::sync::OnceLock;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

const TIP: &str = "Press Ctrl+C to stop early";

pub(crate) static SPINNER: OnceLock<ProgressBar> = OnceLock::new();

/// Starts the scan spinner. Log lines are printed above it from now on.
pub fn start() -> &'static ProgressBar {
    SPINNER.get_or_init(init_spinner)
}

fn init_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.blue} {msg} {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ]);

    pb.set_style(style);
    pb.set_message(format!("{}", TIP.italic().white()));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn report_progress(claimed: usize, found: usize) {
    if let Some(pb) = SPINNER.get() {
        pb.set_message(format!(
            "Probed {} addresses, {} domains found",
            claimed.to_string().bold(),
            found.to_string().green().bold()
        ));
    }
}

pub fn finish() {
    if let Some(pb) = SPINNER.get() {
        pb.finish_and_clear();
    }
}

/// Prints one whole line, above the spinner when it is running.
pub fn println(line: &str) {
    let emit = || {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{line}");
    };

    match SPINNER.get() {
        Some(pb) if !pb.is_finished() => pb.suspend(emit),
        _ => emit(),
    }
}

pub struct SpinnerWriter;

impl std::io::Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let msg = String::from_utf8_lossy(buf);
        println(msg.trim_end());
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
