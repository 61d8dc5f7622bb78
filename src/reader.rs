//! Raster stream reading: framing, page headers, and pixel decoding.
//!
//! Compressed (V2) streams route every byte through a two-row staging
//! buffer, which may read ahead of the current page; the packbits decoder
//! stages one output row at a time so callers can consume pixel bytes in
//! slices of any size.

use std::io::Read;

use crate::error::RasterError;
use crate::header::{PageHeader, HEADER_V2_SIZE};
use crate::limits::Limits;
use crate::sync::SyncWord;
use crate::{io, swap};

/// Reading side of a raster stream.
///
/// Created over any byte channel implementing [`Read`]; an inherited pipe or
/// file descriptor can be wrapped via `std::fs::File::from(OwnedFd)`. Pages
/// are consumed in order: a header, then pixel bytes until the page's rows
/// are exhausted.
#[derive(Debug)]
pub struct RasterReader<R> {
    inner: R,
    sync: SyncWord,
    limits: Limits,
    header: PageHeader,
    /// Bytes per pixel (chunked) or per color plane (planar) — the
    /// replication unit for repeat runs.
    bpp: usize,
    /// Rows not yet delivered on the current page.
    remaining: u32,
    /// Times the staged row has still to be emitted.
    count: u32,
    /// One decoded row, staged for slice-wise delivery.
    pixels: Vec<u8>,
    /// Read cursor into `pixels`.
    pcurrent: usize,
    stage: Staging,
}

impl<R: Read> RasterReader<R> {
    /// Open a raster stream for reading: consume and validate the sync word.
    pub fn open(inner: R) -> Result<RasterReader<R>, RasterError> {
        Self::open_with_limits(inner, Limits::default())
    }

    /// Open with resource limits applied to each page header.
    pub fn open_with_limits(mut inner: R, limits: Limits) -> Result<RasterReader<R>, RasterError> {
        let mut magic = [0u8; 4];
        if io::read_full(&mut inner, &mut magic)? < magic.len() {
            return Err(RasterError::UnexpectedEof);
        }
        let sync = SyncWord::from_bytes(magic).ok_or(RasterError::BadSync)?;

        Ok(RasterReader {
            inner,
            sync,
            limits,
            header: PageHeader::default(),
            bpp: 0,
            remaining: 0,
            count: 0,
            pixels: Vec::new(),
            pcurrent: 0,
            stage: Staging::default(),
        })
    }

    /// The decoded sync word this stream opened with.
    pub fn sync(&self) -> SyncWord {
        self.sync
    }

    /// The current page header (default-valued before the first page).
    pub fn header(&self) -> &PageHeader {
        &self.header
    }

    /// Rows not yet delivered on the current page.
    pub fn rows_remaining(&self) -> u32 {
        self.remaining
    }

    /// Release the underlying channel.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read the next page header.
    pub fn read_header(&mut self) -> Result<PageHeader, RasterError> {
        let mut slot = [0u8; HEADER_V2_SIZE];
        let len = self.sync.header_len();
        self.fill_header_slot(&mut slot, 0, len)?;
        self.accept_header(&slot)
    }

    /// Read the next page header, returning only its short-header prefix
    /// (the extension fields of the returned copy are zeroed).
    pub fn read_header_v1(&mut self) -> Result<PageHeader, RasterError> {
        let mut header = self.read_header()?;
        header.clear_extension();
        Ok(header)
    }

    /// Read one whole page: header plus fully decoded pixel data.
    ///
    /// Returns `Ok(None)` when the stream ends cleanly at a page boundary,
    /// and `Err(UnexpectedEof)` when it ends inside a page.
    pub fn next_page(&mut self) -> Result<Option<(PageHeader, Vec<u8>)>, RasterError> {
        let mut slot = [0u8; HEADER_V2_SIZE];
        let len = self.sync.header_len();

        // Probe a single byte to tell an orderly end of stream apart from a
        // truncated header.
        if self.stage.start < self.stage.end {
            slot[0] = self.stage.buf[self.stage.start];
            self.stage.start += 1;
        } else {
            let n = io::read_full(&mut self.inner, &mut slot[..1])?;
            if n == 0 {
                return Ok(None);
            }
        }
        self.fill_header_slot(&mut slot, 1, len)?;
        let header = self.accept_header(&slot)?;

        let line = header.cups_bytes_per_line as usize;
        let total = u64::from(self.remaining) * line as u64;
        let total = usize::try_from(total)
            .map_err(|_| RasterError::LimitExceeded(format!("page of {total} bytes")))?;
        let mut data = vec![0u8; total];
        if total > 0 {
            self.read_pixels(&mut data)?;
        }
        Ok(Some((header, data)))
    }

    /// Read pixel bytes into `buf`.
    ///
    /// Callers may request any byte count; the decoder resumes mid-row
    /// across calls. Returns the requested length — if the page's rows run
    /// out mid-call the tail of `buf` is left untouched, and the next call
    /// fails with [`RasterError::PageExhausted`].
    ///
    /// On uncompressed streams the page's remaining row count is decremented
    /// by `buf.len() / cups_bytes_per_line`, so reads should be row-aligned.
    pub fn read_pixels(&mut self, buf: &mut [u8]) -> Result<usize, RasterError> {
        if self.remaining == 0 {
            return Err(RasterError::PageExhausted);
        }
        let line = self.header.cups_bytes_per_line as usize;
        if line == 0 {
            return Err(RasterError::InvalidData(
                "page has zero bytes per line".into(),
            ));
        }
        let swap_row = self.swap_elements();

        if !self.sync.compressed() {
            self.remaining = self.remaining.saturating_sub((buf.len() / line) as u32);
            if io::read_full(&mut self.inner, buf)? < buf.len() {
                return Err(RasterError::UnexpectedEof);
            }
            if swap_row {
                swap::swap_pairs(buf);
            }
            return Ok(buf.len());
        }

        let bpp = self.bpp;
        if bpp == 0 {
            return Err(RasterError::InvalidData("page has zero-size pixels".into()));
        }

        let mut pos = 0;
        let mut wanted = buf.len();
        while wanted > 0 && self.remaining > 0 {
            let bytes;
            if self.count == 0 {
                // Start a new row definition: the repeat token, then inner
                // packbits tokens until the row is full.
                let mut token = [0u8; 1];
                self.stage.read_into(&mut self.inner, &mut token, line)?;
                self.count = u32::from(token[0]) + 1;

                // A single-use row wanted at exactly row size can be decoded
                // straight into the caller's buffer.
                let direct = wanted == line && self.count == 1;
                if direct {
                    let row = &mut buf[pos..pos + line];
                    decode_row(&mut self.inner, &mut self.stage, row, bpp, line)?;
                    if swap_row {
                        swap::swap_pairs(row);
                    }
                } else {
                    decode_row(&mut self.inner, &mut self.stage, &mut self.pixels, bpp, line)?;
                    if swap_row {
                        swap::swap_pairs(&mut self.pixels);
                    }
                }

                if wanted >= line {
                    bytes = line;
                    self.pcurrent = 0;
                    self.count -= 1;
                    self.remaining -= 1;
                } else {
                    bytes = wanted;
                    self.pcurrent = bytes;
                }
                if !direct {
                    buf[pos..pos + bytes].copy_from_slice(&self.pixels[..bytes]);
                }
            } else {
                // Emit more of the staged row.
                bytes = (line - self.pcurrent).min(wanted);
                buf[pos..pos + bytes]
                    .copy_from_slice(&self.pixels[self.pcurrent..self.pcurrent + bytes]);
                self.pcurrent += bytes;
                if self.pcurrent >= line {
                    self.pcurrent = 0;
                    self.count -= 1;
                    self.remaining -= 1;
                }
            }
            pos += bytes;
            wanted -= bytes;
        }

        Ok(buf.len())
    }

    /// 12- and 16-bit pixel elements need byte-order correction on
    /// byte-reversed streams.
    fn swap_elements(&self) -> bool {
        self.sync.swapped
            && (self.header.cups_bits_per_color == 16
                || self.header.cups_bits_per_pixel == 12
                || self.header.cups_bits_per_pixel == 16)
    }

    fn fill_header_slot(
        &mut self,
        slot: &mut [u8; HEADER_V2_SIZE],
        from: usize,
        len: usize,
    ) -> Result<(), RasterError> {
        let dest = &mut slot[from..len];
        if self.sync.compressed() {
            // Header bytes may already be sitting in the staging buffer from
            // the previous page's read-ahead.
            let line = self.header.cups_bytes_per_line as usize;
            self.stage.read_into(&mut self.inner, dest, line)
        } else {
            if io::read_full(&mut self.inner, dest)? < dest.len() {
                return Err(RasterError::UnexpectedEof);
            }
            Ok(())
        }
    }

    fn accept_header(&mut self, slot: &[u8; HEADER_V2_SIZE]) -> Result<PageHeader, RasterError> {
        let mut header = PageHeader::decode(slot, self.sync.swapped)?;
        header.normalize(self.sync.version);
        self.limits.check(&header)?;

        self.bpp = header.bytes_per_pixel() as usize;
        self.remaining = header.rows();
        if self.sync.compressed() {
            let line = header.cups_bytes_per_line as usize;
            self.pixels.clear();
            self.pixels.resize(line, 0);
            self.pcurrent = 0;
            self.count = 0;
        }
        self.header = header.clone();
        Ok(header)
    }
}

// ── Compressed-input staging ─────────────────────────────────────────

/// Two-row read-ahead buffer for compressed streams. `start..end` index the
/// buffered bytes not yet handed out.
#[derive(Default, Debug)]
struct Staging {
    buf: Vec<u8>,
    start: usize,
    end: usize,
}

impl Staging {
    /// Deliver exactly `dest.len()` bytes, refilling from `src` as needed.
    ///
    /// Small residual requests refill the buffer up to its capacity and
    /// copy; larger ones read straight into `dest`.
    fn read_into<R: Read>(
        &mut self,
        src: &mut R,
        dest: &mut [u8],
        line: usize,
    ) -> Result<(), RasterError> {
        let want = 2 * line;
        if want > self.buf.len() {
            // Grow in place; buffered bytes keep their offsets.
            self.buf.resize(want, 0);
        }

        let mut total = 0;
        while total < dest.len() {
            if self.start == self.end {
                if dest.len() - total < 16 {
                    let n = io::read_full(src, &mut self.buf)?;
                    if n == 0 {
                        return Err(RasterError::UnexpectedEof);
                    }
                    self.start = 0;
                    self.end = n;
                } else {
                    let n = io::read_full(src, &mut dest[total..])?;
                    if n == 0 {
                        return Err(RasterError::UnexpectedEof);
                    }
                    total += n;
                    continue;
                }
            }

            let count = (dest.len() - total).min(self.end - self.start);
            dest[total..total + count].copy_from_slice(&self.buf[self.start..self.start + count]);
            self.start += count;
            total += count;
        }
        Ok(())
    }
}

// ── Packbits row decoding ────────────────────────────────────────────

/// Materialize one row of `line` bytes from the inner token stream.
///
/// A token with the high bit set introduces `257 - token` literal elements;
/// otherwise one element follows, repeated `token + 1` times. Runs are
/// clamped to the row boundary; a repeat clamped below a whole element ends
/// the row early.
fn decode_row<R: Read>(
    src: &mut R,
    stage: &mut Staging,
    row: &mut [u8],
    bpp: usize,
    line: usize,
) -> Result<(), RasterError> {
    let mut pos = 0;
    let mut left = line;

    while left > 0 {
        let mut token = [0u8; 1];
        stage.read_into(src, &mut token, line)?;
        let token = token[0];

        if token & 0x80 != 0 {
            let count = ((257 - usize::from(token)) * bpp).min(left);
            stage.read_into(src, &mut row[pos..pos + count], line)?;
            pos += count;
            left -= count;
        } else {
            let mut count = ((usize::from(token) + 1) * bpp).min(left);
            if count < bpp {
                break;
            }
            left -= count;

            stage.read_into(src, &mut row[pos..pos + bpp], line)?;
            pos += bpp;
            count -= bpp;
            while count >= bpp {
                row.copy_within(pos - bpp..pos, pos);
                pos += bpp;
                count -= bpp;
            }
            if count > 0 {
                // Trailing partial element, clamped to the row.
                row.copy_within(pos - bpp..pos - bpp + count, pos);
                pos += count;
            }
        }
    }
    Ok(())
}
