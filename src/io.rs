//! Interruption-tolerant transfer loops over a raw byte channel.

use std::io::{self, ErrorKind, Read, Write};

/// Read until `buf` is full or the stream ends.
///
/// Interrupted reads are retried with no progress counted. Returns the number
/// of bytes actually read; anything short of `buf.len()` means end-of-stream
/// was reached (0 = the stream ended before the first byte).
pub(crate) fn read_full<R: Read>(src: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;

    while total < buf.len() {
        match src.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(total)
}

/// Write all of `buf`, retrying interrupted writes.
pub(crate) fn write_full<W: Write>(dst: &mut W, buf: &[u8]) -> io::Result<()> {
    let mut total = 0;

    while total < buf.len() {
        match dst.write(&buf[total..]) {
            Ok(0) => {
                return Err(io::Error::new(
                    ErrorKind::WriteZero,
                    "channel accepted no bytes",
                ));
            }
            Ok(n) => total += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(())
}
