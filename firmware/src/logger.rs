//! `log` facade routed onto defmt.

use defmt::Display2Format;
use log::{Level, LevelFilter, Log, Metadata, Record};

struct DefmtLogger;

impl Log for DefmtLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let args = Display2Format(record.args());
        match record.level() {
            Level::Error => defmt::error!("{}", args),
            Level::Warn => defmt::warn!("{}", args),
            Level::Info => defmt::info!("{}", args),
            Level::Debug => defmt::debug!("{}", args),
            Level::Trace => defmt::trace!("{}", args),
        }
    }

    fn flush(&self) {}
}

static LOGGER: DefmtLogger = DefmtLogger;

/// Installs the defmt logger. Must run before any task is spawned.
pub fn init(level: LevelFilter) {
    // Cortex-M0+ has no compare-and-swap, so only the racy setters exist.
    // SAFETY: called once from `main` before the executor runs other code.
    unsafe {
        if log::set_logger_racy(&LOGGER).is_ok() {
            log::set_max_level_racy(level);
        }
    }
}
