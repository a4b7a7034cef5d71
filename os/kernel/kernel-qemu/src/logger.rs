use crate::qemu_trace;
use core::fmt;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// `log` sink writing to the QEMU debug console.
///
/// Stateless; filtering uses the global [`log::max_level`], which
/// [`QemuLogger::init`] sets.
pub struct QemuLogger;

static LOGGER: QemuLogger = QemuLogger;

impl QemuLogger {
    /// Installs the logger. Call once during early init.
    ///
    /// # Errors
    /// Fails if a logger was already installed.
    pub fn init(max_level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_logger(&LOGGER)?;
        log::set_max_level(max_level);
        Ok(())
    }
}

/// Formats one record as a `[LEVEL] target: message` line.
fn write_record(out: &mut impl fmt::Write, record: &Record<'_>) -> fmt::Result {
    writeln!(out, "[{}] {}: {}", record.level(), record.target(), record.args())
}

/// Adapter that lets [`write_record`] target the debug port.
struct TraceWriter;

impl fmt::Write for TraceWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        qemu_trace!("{s}");
        Ok(())
    }
}

impl Log for QemuLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // Keep a record from being split by output from interrupt context.
        #[cfg(feature = "enabled")]
        let _guard = unsafe { kernel_arch::InterruptGuard::new() };

        let _ = write_record(&mut TraceWriter, record);
    }

    fn flush(&self) {}
}
