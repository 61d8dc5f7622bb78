//! # zenraster
//!
//! Streaming reader and writer for CUPS-style page raster streams, the
//! page-at-a-time interchange format printing pipelines pass between
//! rasterizers, filters, and printer drivers.
//!
//! A stream is a 4-byte sync word followed by pages; each page is a
//! fixed-layout header record and then pixel data. Six sync magics select
//! the stream revision, word byte order, and (for V2) a row-keyed packbits
//! compression. The reader handles all six forms, correcting header and
//! 12/16-bit pixel byte order as needed; the writer emits the native,
//! uncompressed form only, matching what rasterizers produce.
//!
//! ## Reading
//!
//! Streams are strictly sequential — no seeking, and a framing error
//! abandons the stream. Pixel bytes may be consumed in slices of any size;
//! the decoder resumes mid-row across calls.
//!
//! ```no_run
//! use std::fs::File;
//! use zenraster::RasterReader;
//!
//! # fn main() -> Result<(), zenraster::RasterError> {
//! let mut reader = RasterReader::open(File::open("page.ras")?)?;
//! while let Some((header, pixels)) = reader.next_page()? {
//!     println!(
//!         "{}x{} page, {} bytes",
//!         header.cups_width,
//!         header.cups_height,
//!         pixels.len()
//!     );
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Writing
//!
//! ```
//! use std::io::Cursor;
//! use zenraster::{ColorOrder, ColorSpace, PageHeader, RasterReader, RasterWriter};
//!
//! # fn main() -> Result<(), zenraster::RasterError> {
//! let mut header = PageHeader::default();
//! header.cups_width = 8;
//! header.cups_height = 2;
//! header.cups_bits_per_color = 8;
//! header.cups_bits_per_pixel = 8;
//! header.cups_bytes_per_line = 8;
//! header.cups_color_order = ColorOrder::Chunked;
//! header.cups_color_space = ColorSpace::K;
//!
//! let mut writer = RasterWriter::open(Vec::new())?;
//! writer.write_header(&header)?;
//! writer.write_pixels(&[0x55; 16])?;
//! let stream = writer.finish()?;
//!
//! let mut reader = RasterReader::open(Cursor::new(stream))?;
//! let page = reader.read_header()?;
//! assert_eq!(page.cups_width, 8);
//! let mut pixels = [0u8; 16];
//! reader.read_pixels(&mut pixels)?;
//! assert_eq!(pixels, [0x55; 16]);
//! # Ok(())
//! # }
//! ```
//!
//! Wrap slow channels in `std::io::BufReader`/`BufWriter`; uncompressed
//! streams in particular are read with no internal buffering.

#![forbid(unsafe_code)]

mod error;
mod header;
mod io;
mod limits;
mod reader;
mod swap;
mod sync;
mod writer;

pub use error::RasterError;
pub use header::{ColorOrder, ColorSpace, PageHeader, Text64, HEADER_V1_SIZE, HEADER_V2_SIZE};
pub use limits::Limits;
pub use reader::RasterReader;
pub use sync::{SyncVersion, SyncWord};
pub use writer::RasterWriter;
