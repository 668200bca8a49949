//! `log` sink writing to the browser console.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{Level, LevelFilter, Log, Metadata, Record};
use web_sys::console;

const PREFIX: &str = "AmberLoader:";

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;
static LINES: AtomicUsize = AtomicUsize::new(0);

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut line = record.args().to_string();
        if !line.starts_with(PREFIX) {
            line = format!("{PREFIX} {line}");
        }
        LINES.fetch_add(1, Ordering::Relaxed);
        let line = line.into();
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            Level::Info => console::info_1(&line),
            Level::Debug | Level::Trace => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Routes `log` records to the console at `level`.
///
/// Safe to call more than once: later calls only change the level.
pub fn install(level: LevelFilter) {
    // Fails only when a logger is already installed, which is fine.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// Console lines written so far.
pub fn lines_written() -> usize {
    LINES.load(Ordering::Relaxed)
}
