//! Stderr logging through `env_logger`, stamped with time since start-up.

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use log::{LevelFilter, Record, SetLoggerError};

static STARTED: OnceLock<Instant> = OnceLock::new();

/// Installs the logger at `level`; timestamps count from this call.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    let started = *STARTED.get_or_init(Instant::now);
    env_logger::Builder::new()
        .filter_level(level)
        .format(move |buf, record| write_record(buf, started.elapsed(), record))
        .try_init()
}

fn write_record(out: &mut impl Write, elapsed: Duration, record: &Record<'_>) -> io::Result<()> {
    writeln!(
        out,
        "[+{:>6} ms] {:<5} {}: {}",
        elapsed.as_millis(),
        record.level(),
        record.target(),
        record.args()
    )
}
