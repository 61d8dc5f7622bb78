//! Compressed (V2) stream decoding: row-repeat tokens, literal and repeat
//! runs, clamping, and slice-wise delivery.

use std::io::{self, Cursor, ErrorKind, Read};
use zenraster::{
    ColorOrder, ColorSpace, PageHeader, RasterError, RasterReader, HEADER_V2_SIZE,
};

fn page_header(width: u32, height: u32, bits: u32, bytes_per_line: u32) -> PageHeader {
    let mut header = PageHeader::default();
    header.cups_width = width;
    header.cups_height = height;
    header.cups_bits_per_color = bits.min(8);
    header.cups_bits_per_pixel = bits;
    header.cups_bytes_per_line = bytes_per_line;
    header.cups_color_order = ColorOrder::Chunked;
    header.cups_color_space = ColorSpace::K;
    header
}

/// A native compressed stream: V2 sync, one header record, token bytes.
fn compressed_stream(header: &PageHeader, tokens: &[u8]) -> Vec<u8> {
    let mut stream = b"RaS2".to_vec();
    stream.extend_from_slice(&header.encode());
    stream.extend_from_slice(tokens);
    stream
}

fn open(stream: Vec<u8>) -> RasterReader<Cursor<Vec<u8>>> {
    RasterReader::open(Cursor::new(stream)).unwrap()
}

// ── Token decoding ───────────────────────────────────────────────────

#[test]
fn repeat_run_fills_repeated_rows() {
    // Row emitted twice; one repeat run of four 0xAA bytes.
    let stream = compressed_stream(&page_header(4, 2, 8, 4), &[0x01, 0x03, 0xAA]);
    let mut reader = open(stream);
    reader.read_header().unwrap();

    let mut out = [0u8; 8];
    assert_eq!(reader.read_pixels(&mut out).unwrap(), 8);
    assert_eq!(out, [0xAA; 8]);
}

#[test]
fn literal_and_repeat_runs_compose_a_row() {
    // Three literal elements, then one repeated element.
    let tokens = [0x00, 0xFE, 0x11, 0x22, 0x33, 0x00, 0x44];
    let stream = compressed_stream(&page_header(4, 2, 8, 4), &tokens);
    let mut reader = open(stream);
    reader.read_header().unwrap();

    let mut out = [0u8; 4];
    reader.read_pixels(&mut out).unwrap();
    assert_eq!(out, [0x11, 0x22, 0x33, 0x44]);
}

#[test]
fn row_token_replicates_row() {
    // R = 3: the row is emitted four times.
    let stream = compressed_stream(&page_header(4, 4, 8, 4), &[0x03, 0x03, 0x55]);
    let mut reader = open(stream);
    reader.read_header().unwrap();

    let mut out = [0u8; 16];
    reader.read_pixels(&mut out).unwrap();
    assert_eq!(out, [0x55; 16]);
}

#[test]
fn single_byte_reads_deliver_the_same_stream() {
    let stream = compressed_stream(&page_header(4, 2, 8, 4), &[0x01, 0x03, 0xAA]);
    let mut reader = open(stream);
    reader.read_header().unwrap();

    for _ in 0..8 {
        let mut byte = [0u8; 1];
        assert_eq!(reader.read_pixels(&mut byte).unwrap(), 1);
        assert_eq!(byte[0], 0xAA);
    }
    assert!(matches!(
        reader.read_pixels(&mut [0u8; 1]),
        Err(RasterError::PageExhausted)
    ));
}

// ── Slice invariance ─────────────────────────────────────────────────

/// A three-row page mixing literal runs, repeat runs, and a replicated row.
fn varied_stream() -> (Vec<u8>, Vec<u8>) {
    let tokens = [
        0x00, 0xFB, 0x10, 0x21, 0x32, 0x43, 0x54, 0x65, // literal row
        0x01, 0x02, 0x77, 0x01, 0x88, 0x00, 0x99, // two repeat-run rows
    ];
    let expected = vec![
        0x10, 0x21, 0x32, 0x43, 0x54, 0x65, //
        0x77, 0x77, 0x77, 0x88, 0x88, 0x99, //
        0x77, 0x77, 0x77, 0x88, 0x88, 0x99, //
    ];
    let stream = compressed_stream(&page_header(6, 3, 8, 6), &tokens);
    (stream, expected)
}

#[test]
fn decoded_output_is_slice_invariant() {
    let (stream, expected) = varied_stream();

    for chunk in [18, 6, 1, 5, 7] {
        let mut reader = open(stream.clone());
        reader.read_header().unwrap();
        let mut out = vec![0u8; 18];
        let mut pos = 0;
        while pos < out.len() {
            let end = (pos + chunk).min(out.len());
            reader.read_pixels(&mut out[pos..end]).unwrap();
            pos = end;
        }
        assert_eq!(out, expected, "chunk size {chunk}");
    }
}

#[test]
fn next_page_decodes_whole_compressed_page() {
    let (stream, expected) = varied_stream();
    let mut reader = open(stream);
    let (header, data) = reader.next_page().unwrap().unwrap();
    assert_eq!(header.cups_height, 3);
    assert_eq!(data, expected);
    assert!(reader.next_page().unwrap().is_none());
}

#[test]
fn two_compressed_pages_survive_read_ahead() {
    // Small rows keep the staging buffer tiny, forcing its refills to read
    // across the page boundary into the next header.
    let header = page_header(4, 1, 8, 4);
    let mut stream = compressed_stream(&header, &[0x00, 0x03, 0x0F]);
    stream.extend_from_slice(&header.encode());
    stream.extend_from_slice(&[0x00, 0x03, 0xF0]);

    let mut reader = open(stream);
    let (_, d1) = reader.next_page().unwrap().unwrap();
    assert_eq!(d1, [0x0F; 4]);
    let (_, d2) = reader.next_page().unwrap().unwrap();
    assert_eq!(d2, [0xF0; 4]);
    assert!(reader.next_page().unwrap().is_none());
}

// ── Clamping ─────────────────────────────────────────────────────────

#[test]
fn literal_run_is_clamped_to_row() {
    // Token claims eight literal elements; the row holds four.
    let tokens = [0x00, 0xF9, 0xDE, 0xAD, 0xBE, 0xEF];
    let stream = compressed_stream(&page_header(4, 1, 8, 4), &tokens);
    let mut reader = open(stream);
    reader.read_header().unwrap();

    let mut out = [0u8; 4];
    reader.read_pixels(&mut out).unwrap();
    assert_eq!(out, [0xDE, 0xAD, 0xBE, 0xEF]);
}

#[test]
fn repeat_run_partial_element_is_clamped_to_row() {
    // 16-bit elements in a 5-byte row: three repeats of AB CD only fit
    // two and a half elements.
    let tokens = [0x00, 0x02, 0xAB, 0xCD];
    let stream = compressed_stream(&page_header(2, 1, 16, 5), &tokens);
    let mut reader = open(stream);
    reader.read_header().unwrap();

    let mut out = [0u8; 5];
    reader.read_pixels(&mut out).unwrap();
    assert_eq!(out, [0xAB, 0xCD, 0xAB, 0xCD, 0xAB]);
}

#[test]
fn repeat_clamped_below_one_element_ends_the_row() {
    // After two whole elements only one byte of row remains; the next
    // repeat token cannot fit a 16-bit element and must not derail the
    // decoder. The unreached tail stays zero.
    let tokens = [0x00, 0x01, 0xAB, 0xCD, 0x00];
    let stream = compressed_stream(&page_header(2, 1, 16, 5), &tokens);
    let mut reader = open(stream);
    reader.read_header().unwrap();

    let mut out = [0xEEu8; 5];
    reader.read_pixels(&mut out[..3]).unwrap();
    reader.read_pixels(&mut out[3..]).unwrap();
    assert_eq!(out, [0xAB, 0xCD, 0xAB, 0xCD, 0x00]);
}

// ── Byte-order correction ────────────────────────────────────────────

#[test]
fn reversed_16bit_rows_are_swapped_after_decode() {
    let header = page_header(2, 1, 16, 4);
    let mut record = header.encode();
    for word in record[256..580].chunks_exact_mut(4) {
        word.reverse();
    }
    let mut stream = b"2SaR".to_vec();
    stream.extend_from_slice(&record);
    // Two literal 16-bit elements.
    stream.extend_from_slice(&[0x00, 0xFF, 0x12, 0x34, 0x56, 0x78]);

    let mut reader = RasterReader::open(Cursor::new(stream)).unwrap();
    assert!(reader.sync().compressed());
    assert!(reader.sync().swapped);
    reader.read_header().unwrap();

    let mut out = [0u8; 4];
    reader.read_pixels(&mut out).unwrap();
    assert_eq!(out, [0x34, 0x12, 0x78, 0x56]);
}

// ── Exhaustion and truncation ────────────────────────────────────────

#[test]
fn early_page_end_reports_requested_length() {
    // The page holds eight bytes; twelve are requested. The call reports
    // the requested length and leaves the tail untouched.
    let stream = compressed_stream(&page_header(4, 2, 8, 4), &[0x01, 0x03, 0xAA]);
    let mut reader = open(stream);
    reader.read_header().unwrap();

    let mut out = [0xEEu8; 12];
    assert_eq!(reader.read_pixels(&mut out).unwrap(), 12);
    assert_eq!(&out[..8], &[0xAA; 8]);
    assert_eq!(&out[8..], &[0xEE; 4]);
    assert!(matches!(
        reader.read_pixels(&mut out),
        Err(RasterError::PageExhausted)
    ));
}

#[test]
fn truncated_token_stream_fails() {
    // Literal run promises four bytes but the stream ends after two.
    let tokens = [0x00, 0xFD, 0x01, 0x02];
    let stream = compressed_stream(&page_header(4, 1, 8, 4), &tokens);
    let mut reader = open(stream);
    reader.read_header().unwrap();

    let mut out = [0u8; 4];
    assert!(matches!(
        reader.read_pixels(&mut out),
        Err(RasterError::UnexpectedEof)
    ));
}

// ── Interruption transparency ────────────────────────────────────────

/// Wraps a stream, delivering at most three bytes per read and interposing
/// an interruption before every successful transfer.
struct Choppy {
    data: Vec<u8>,
    pos: usize,
    ready: bool,
}

impl Read for Choppy {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.ready {
            self.ready = true;
            return Err(io::Error::new(ErrorKind::Interrupted, "signal"));
        }
        self.ready = false;
        let n = buf.len().min(3).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[test]
fn interruptions_do_not_alter_output() {
    let (stream, expected) = varied_stream();
    let mut reader = RasterReader::open(Choppy {
        data: stream,
        pos: 0,
        ready: false,
    })
    .unwrap();
    let (_, data) = reader.next_page().unwrap().unwrap();
    assert_eq!(data, expected);
}

// ── Wire shape ───────────────────────────────────────────────────────

#[test]
fn compressed_header_sits_right_after_sync() {
    let (stream, _) = varied_stream();
    assert_eq!(&stream[..4], b"RaS2");
    let header = PageHeader::decode(&stream[4..4 + HEADER_V2_SIZE], false).unwrap();
    assert_eq!(header.cups_bytes_per_line, 6);
}
