//! The two fixed endpoint stages: a line reader feeding the first buffer
//! and a line writer draining the last one.
//!
//! Both share the stage workers' shutdown obligation toward their adjacent
//! buffer: the reader closes it on end-of-input (or on any failure), the
//! writer closes it on a sink failure so upstream stops producing.

use crate::buffer::Buffer;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// A line consisting of exactly these bytes terminates input; it is not
/// itself processed. Embedded occurrences are ordinary data.
pub const END_SENTINEL: &[u8] = b"<END>";

/// Read byte lines from `source` into `buffer` until the sentinel or EOF,
/// then close the buffer. Returns the number of lines produced.
///
/// Lines are pushed without their terminator. If a push observes closure
/// (the consumer side died early), reading stops and the buffer is closed
/// as usual.
pub fn read_into<R: BufRead>(mut source: R, buffer: &Buffer<Vec<u8>>) -> io::Result<u64> {
    let mut produced = 0u64;
    let result = loop {
        let mut line = Vec::new();
        match source.read_until(b'\n', &mut line) {
            Ok(0) => break Ok(()),
            Ok(_) => {
                if line.last() == Some(&b'\n') {
                    line.pop();
                }
                if line == END_SENTINEL {
                    break Ok(());
                }
                if buffer.push(line).is_err() {
                    debug!("input buffer closed early, reader stopping");
                    break Ok(());
                }
                produced += 1;
            }
            Err(err) => break Err(err),
        }
    };
    buffer.close();
    debug!(lines = produced, "reader finished");
    result.map(|()| produced)
}

/// Pop lines from `buffer` and write each to `sink` with a trailing
/// newline, flushing per line, until end-of-stream. Returns the number of
/// lines emitted.
pub fn write_from<W: Write>(mut sink: W, buffer: &Buffer<Vec<u8>>) -> io::Result<u64> {
    let mut emitted = 0u64;
    while let Some(line) = buffer.pop() {
        if let Err(err) = write_line(&mut sink, &line) {
            // Unblock upstream producers before surfacing the failure
            buffer.close();
            return Err(err);
        }
        emitted += 1;
    }
    debug!(lines = emitted, "writer finished");
    Ok(emitted)
}

fn write_line<W: Write>(sink: &mut W, line: &[u8]) -> io::Result<()> {
    sink.write_all(line)?;
    sink.write_all(b"\n")?;
    sink.flush()
}
