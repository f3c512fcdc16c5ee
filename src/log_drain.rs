//! Log output.
//!
//! Drains a `LogStream` into any byte sink (UART, USB console, test
//! buffer). The firmware calls `drain_into` from the control loop between
//! dial events, never while a tone or a dwell window is timing.
//!
//! Line format: `[ms] LEVEL: message\n`
//!
//! Timestamps come from the sample-tick clock. On hardware that clock is
//! paused in `power_down`, so `[ms]` counts awake time (tones, dwell
//! windows, settle naps), not time since boot.

use crate::diag::DiagSnapshot;
use crate::logging::{LogEntry, LogStream};
use crate::timing::ticks_to_ms;

/// Largest formatted line.
pub const LINE_BUF_LEN: usize = 160;

struct BufWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> core::fmt::Write for BufWriter<'a> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.buf.len() - self.pos;
        let to_write = bytes.len().min(remaining);
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        Ok(())
    }
}

/// Format log entry to a line.
///
/// Returns the number of bytes written.
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    use core::fmt::Write;

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = write!(
        writer,
        "[{:8}] {}: {}\n",
        ticks_to_ms(entry.timestamp),
        entry.level.as_str(),
        core::str::from_utf8(&entry.msg[..entry.len as usize]).unwrap_or("<invalid utf8>")
    );
    writer.pos
}

/// Write every pending entry to `sink`, then report (and reset) the drop
/// counter if anything was lost.
///
/// Returns the number of entries written.
pub fn drain_into<const N: usize, F>(stream: &LogStream<N>, mut sink: F) -> usize
where
    F: FnMut(&[u8]),
{
    use core::fmt::Write;

    let mut line = [0u8; LINE_BUF_LEN];
    let mut count = 0;

    while let Some(entry) = stream.drain() {
        let len = format_log_entry(&entry, &mut line);
        sink(&line[..len]);
        count += 1;
    }

    let dropped = stream.dropped();
    if dropped > 0 {
        let mut writer = BufWriter { buf: &mut line, pos: 0 };
        let _ = write!(writer, "[WARN] Dropped: {}\n", dropped);
        let len = writer.pos;
        sink(&line[..len]);
        stream.reset_dropped();
    }

    count
}

/// One-line summary of the diagnostic counters.
pub fn format_diag(snapshot: &DiagSnapshot, buf: &mut [u8]) -> usize {
    use core::fmt::Write;

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = write!(
        writer,
        "diag: dropped={} repaired={} store_fail={} bad_slot={} last={}\n",
        snapshot.dropped_digits,
        snapshot.config_repairs,
        snapshot.store_failures,
        snapshot.slot_out_of_range,
        snapshot.last_code.as_str()
    );
    writer.pos
}
