//! Raster stream writing.
//!
//! The writer always emits the native, uncompressed stream form: a V0 sync
//! word, then per page a full-size header record followed by raw row-major
//! pixel bytes.

use std::io::Write;

use crate::error::RasterError;
use crate::header::PageHeader;
use crate::sync::{SyncVersion, SyncWord};
use crate::io;

/// Writing side of a raster stream.
pub struct RasterWriter<W> {
    inner: W,
    header: PageHeader,
    /// Rows not yet written on the current page.
    remaining: u32,
}

impl<W: Write> RasterWriter<W> {
    /// Open a raster stream for writing: emit the sync word.
    pub fn open(mut inner: W) -> Result<RasterWriter<W>, RasterError> {
        io::write_full(&mut inner, &SyncWord::NATIVE.to_bytes())?;
        Ok(RasterWriter {
            inner,
            header: PageHeader::default(),
            remaining: 0,
        })
    }

    /// The current page header (default-valued before the first page).
    pub fn header(&self) -> &PageHeader {
        &self.header
    }

    /// Rows not yet written on the current page.
    pub fn rows_remaining(&self) -> u32 {
        self.remaining
    }

    /// Start a new page from a full header.
    pub fn write_header(&mut self, header: &PageHeader) -> Result<(), RasterError> {
        self.put_header(header.clone())
    }

    /// Start a new page from a short header: the extension fields of
    /// `header` are ignored and written as zero, then filled in by
    /// derivation where applicable.
    pub fn write_header_v1(&mut self, header: &PageHeader) -> Result<(), RasterError> {
        let mut header = header.clone();
        header.clear_extension();
        self.put_header(header)
    }

    fn put_header(&mut self, mut header: PageHeader) -> Result<(), RasterError> {
        header.normalize(SyncVersion::V0);
        self.remaining = header.rows();
        self.header = header;
        io::write_full(&mut self.inner, &self.header.encode())?;
        Ok(())
    }

    /// Write pixel bytes verbatim. The writer never compresses.
    ///
    /// The page's remaining row count is decremented by
    /// `buf.len() / cups_bytes_per_line`, so writes should be row-aligned.
    pub fn write_pixels(&mut self, buf: &[u8]) -> Result<usize, RasterError> {
        if self.remaining == 0 {
            return Err(RasterError::PageExhausted);
        }
        let line = self.header.cups_bytes_per_line as usize;
        if line == 0 {
            return Err(RasterError::InvalidData(
                "page has zero bytes per line".into(),
            ));
        }
        self.remaining = self.remaining.saturating_sub((buf.len() / line) as u32);
        io::write_full(&mut self.inner, buf)?;
        Ok(buf.len())
    }

    /// Flush the channel and release it.
    pub fn finish(mut self) -> Result<W, RasterError> {
        self.inner.flush()?;
        Ok(self.inner)
    }

    /// Release the underlying channel without flushing.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
