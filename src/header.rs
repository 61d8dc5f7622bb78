//! The fixed-layout page header record.
//!
//! Every page starts with this record: four 64-byte text fields, then 81
//! consecutive 32-bit scalar words beginning at `advance_distance`, then a
//! further text region. The short (V1) header is the first 420 bytes of the
//! full 1796-byte record. On byte-reversed streams only the 81-word scalar
//! region is reversed; text is preserved verbatim.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use core::fmt;
use core::marker::PhantomData;

use crate::error::RasterError;
use crate::sync::SyncVersion;

/// Size in bytes of the short page header.
pub const HEADER_V1_SIZE: usize = 420;
/// Size in bytes of the full page header.
pub const HEADER_V2_SIZE: usize = 1796;

/// Offset of the first scalar word (`advance_distance`).
const WORDS_START: usize = 256;
/// Number of byte-order-sensitive scalar words.
const WORD_COUNT: usize = 81;

// ── Text fields ──────────────────────────────────────────────────────

/// A fixed 64-byte text field, NUL-padded by convention but preserved
/// byte-for-byte on the wire.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Text64(pub [u8; 64]);

impl Text64 {
    /// Build a text field from a string, truncating to 63 bytes so the
    /// field stays NUL-terminated.
    pub fn new(s: &str) -> Text64 {
        let mut buf = [0u8; 64];
        let n = s.len().min(63);
        buf[..n].copy_from_slice(&s.as_bytes()[..n]);
        Text64(buf)
    }

    /// The field up to its first NUL, as UTF-8. `None` if not valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(64);
        core::str::from_utf8(&self.0[..end]).ok()
    }
}

impl Default for Text64 {
    fn default() -> Text64 {
        Text64([0u8; 64])
    }
}

impl fmt::Debug for Text64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "{s:?}"),
            None => write!(f, "{:02x?}", &self.0[..]),
        }
    }
}

// ── Color order ──────────────────────────────────────────────────────

/// How color components are laid out in the pixel data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorOrder {
    /// All components of a pixel stored together.
    #[default]
    Chunked,
    /// Components grouped per row band.
    Banded,
    /// Each component stored as its own full-height raster.
    Planar,
    /// Unrecognized code, preserved as is.
    Other(u32),
}

impl ColorOrder {
    pub fn from_u32(value: u32) -> ColorOrder {
        match value {
            0 => ColorOrder::Chunked,
            1 => ColorOrder::Banded,
            2 => ColorOrder::Planar,
            other => ColorOrder::Other(other),
        }
    }

    pub fn as_u32(self) -> u32 {
        match self {
            ColorOrder::Chunked => 0,
            ColorOrder::Banded => 1,
            ColorOrder::Planar => 2,
            ColorOrder::Other(other) => other,
        }
    }
}

// ── Color space ──────────────────────────────────────────────────────

/// Color space of the page, using the format's code assignments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorSpace {
    /// Luminance.
    #[default]
    W,
    Rgb,
    Rgba,
    /// Black ink.
    K,
    Cmy,
    Ymc,
    Cmyk,
    Ymck,
    Kcmy,
    /// Black, cyan, magenta, yellow, light-cyan, light-magenta.
    KcmyCm,
    Gmck,
    Gmcs,
    /// White ink (as black).
    White,
    Gold,
    Silver,
    CieXyz,
    CieLab,
    Rgbw,
    Icc1,
    Icc2,
    Icc3,
    Icc4,
    Icc5,
    Icc6,
    Icc7,
    Icc8,
    Icc9,
    IccA,
    IccB,
    IccC,
    IccD,
    IccE,
    IccF,
    /// Unrecognized code, preserved as is.
    Other(u32),
}

impl ColorSpace {
    pub fn from_u32(value: u32) -> ColorSpace {
        match value {
            0 => ColorSpace::W,
            1 => ColorSpace::Rgb,
            2 => ColorSpace::Rgba,
            3 => ColorSpace::K,
            4 => ColorSpace::Cmy,
            5 => ColorSpace::Ymc,
            6 => ColorSpace::Cmyk,
            7 => ColorSpace::Ymck,
            8 => ColorSpace::Kcmy,
            9 => ColorSpace::KcmyCm,
            10 => ColorSpace::Gmck,
            11 => ColorSpace::Gmcs,
            12 => ColorSpace::White,
            13 => ColorSpace::Gold,
            14 => ColorSpace::Silver,
            15 => ColorSpace::CieXyz,
            16 => ColorSpace::CieLab,
            17 => ColorSpace::Rgbw,
            32 => ColorSpace::Icc1,
            33 => ColorSpace::Icc2,
            34 => ColorSpace::Icc3,
            35 => ColorSpace::Icc4,
            36 => ColorSpace::Icc5,
            37 => ColorSpace::Icc6,
            38 => ColorSpace::Icc7,
            39 => ColorSpace::Icc8,
            40 => ColorSpace::Icc9,
            41 => ColorSpace::IccA,
            42 => ColorSpace::IccB,
            43 => ColorSpace::IccC,
            44 => ColorSpace::IccD,
            45 => ColorSpace::IccE,
            46 => ColorSpace::IccF,
            other => ColorSpace::Other(other),
        }
    }

    pub fn as_u32(self) -> u32 {
        match self {
            ColorSpace::W => 0,
            ColorSpace::Rgb => 1,
            ColorSpace::Rgba => 2,
            ColorSpace::K => 3,
            ColorSpace::Cmy => 4,
            ColorSpace::Ymc => 5,
            ColorSpace::Cmyk => 6,
            ColorSpace::Ymck => 7,
            ColorSpace::Kcmy => 8,
            ColorSpace::KcmyCm => 9,
            ColorSpace::Gmck => 10,
            ColorSpace::Gmcs => 11,
            ColorSpace::White => 12,
            ColorSpace::Gold => 13,
            ColorSpace::Silver => 14,
            ColorSpace::CieXyz => 15,
            ColorSpace::CieLab => 16,
            ColorSpace::Rgbw => 17,
            ColorSpace::Icc1 => 32,
            ColorSpace::Icc2 => 33,
            ColorSpace::Icc3 => 34,
            ColorSpace::Icc4 => 35,
            ColorSpace::Icc5 => 36,
            ColorSpace::Icc6 => 37,
            ColorSpace::Icc7 => 38,
            ColorSpace::Icc8 => 39,
            ColorSpace::Icc9 => 40,
            ColorSpace::IccA => 41,
            ColorSpace::IccB => 42,
            ColorSpace::IccC => 43,
            ColorSpace::IccD => 44,
            ColorSpace::IccE => 45,
            ColorSpace::IccF => 46,
            ColorSpace::Other(other) => other,
        }
    }

    /// Number of color planes implied by this space, or `None` for codes the
    /// codec does not recognize.
    pub fn num_colors(self, bits_per_pixel: u32) -> Option<u32> {
        use ColorSpace::*;
        match self {
            W | K | White | Gold | Silver => Some(1),
            Rgb | Cmy | Ymc | CieXyz | CieLab | Icc1 | Icc2 | Icc3 | Icc4 | Icc5 | Icc6 | Icc7
            | Icc8 | Icc9 | IccA | IccB | IccC | IccD | IccE | IccF => Some(3),
            Rgba | Rgbw | Cmyk | Ymck | Kcmy | Gmck | Gmcs => Some(4),
            KcmyCm => Some(if bits_per_pixel < 8 { 6 } else { 4 }),
            Other(_) => None,
        }
    }
}

// ── The header record ────────────────────────────────────────────────

/// A page description record.
///
/// Holds the full (V2) layout; short-header pages occupy the fields up to
/// and including `cups_row_step`, with the extension left zero. The
/// lowercase `cups_` fields are the ones this codec itself interprets; the
/// rest are carried for the consumer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageHeader {
    pub media_class: Text64,
    pub media_color: Text64,
    pub media_type: Text64,
    pub output_type: Text64,
    pub advance_distance: u32,
    pub advance_media: u32,
    pub collate: u32,
    pub cut_media: u32,
    pub duplex: u32,
    pub hw_resolution: [u32; 2],
    pub imaging_bounding_box: [u32; 4],
    pub insert_sheet: u32,
    pub jog: u32,
    pub leading_edge: u32,
    pub margins: [u32; 2],
    pub manual_feed: u32,
    pub media_position: u32,
    pub media_weight: u32,
    pub mirror_print: u32,
    pub negative_print: u32,
    pub num_copies: u32,
    pub orientation: u32,
    pub output_face_up: u32,
    pub page_size: [u32; 2],
    pub separations: u32,
    pub tray_switch: u32,
    pub tumble: u32,
    pub cups_width: u32,
    pub cups_height: u32,
    pub cups_media_type: u32,
    pub cups_bits_per_color: u32,
    pub cups_bits_per_pixel: u32,
    pub cups_bytes_per_line: u32,
    pub cups_color_order: ColorOrder,
    pub cups_color_space: ColorSpace,
    pub cups_compression: u32,
    pub cups_row_count: u32,
    pub cups_row_feed: u32,
    pub cups_row_step: u32,
    // Extension fields (full header only).
    pub cups_num_colors: u32,
    pub cups_borderless_scaling_factor: f32,
    pub cups_page_size: [f32; 2],
    pub cups_imaging_bbox: [f32; 4],
    pub cups_integer: [u32; 16],
    pub cups_real: [f32; 16],
    pub cups_string: [Text64; 16],
    pub cups_marker_type: Text64,
    pub cups_rendering_intent: Text64,
    pub cups_page_size_name: Text64,
}

impl PageHeader {
    /// Decode a header record from raw bytes.
    ///
    /// `bytes` must hold a full-size record; a short-header page is decoded
    /// from its 420 bytes zero-extended to full size. When `swapped` is set
    /// the 81-word scalar region is read byte-reversed; text is taken
    /// verbatim either way.
    pub fn decode(bytes: &[u8], swapped: bool) -> Result<PageHeader, RasterError> {
        if bytes.len() < HEADER_V2_SIZE {
            return Err(RasterError::UnexpectedEof);
        }
        if swapped {
            Ok(Self::decode_with::<LittleEndian>(bytes))
        } else {
            Ok(Self::decode_with::<BigEndian>(bytes))
        }
    }

    fn decode_with<E: ByteOrder>(bytes: &[u8]) -> PageHeader {
        let mut f = Fields::<E>::new(bytes);
        PageHeader {
            media_class: f.text(),
            media_color: f.text(),
            media_type: f.text(),
            output_type: f.text(),
            advance_distance: f.word(),
            advance_media: f.word(),
            collate: f.word(),
            cut_media: f.word(),
            duplex: f.word(),
            hw_resolution: [f.word(), f.word()],
            imaging_bounding_box: [f.word(), f.word(), f.word(), f.word()],
            insert_sheet: f.word(),
            jog: f.word(),
            leading_edge: f.word(),
            margins: [f.word(), f.word()],
            manual_feed: f.word(),
            media_position: f.word(),
            media_weight: f.word(),
            mirror_print: f.word(),
            negative_print: f.word(),
            num_copies: f.word(),
            orientation: f.word(),
            output_face_up: f.word(),
            page_size: [f.word(), f.word()],
            separations: f.word(),
            tray_switch: f.word(),
            tumble: f.word(),
            cups_width: f.word(),
            cups_height: f.word(),
            cups_media_type: f.word(),
            cups_bits_per_color: f.word(),
            cups_bits_per_pixel: f.word(),
            cups_bytes_per_line: f.word(),
            cups_color_order: ColorOrder::from_u32(f.word()),
            cups_color_space: ColorSpace::from_u32(f.word()),
            cups_compression: f.word(),
            cups_row_count: f.word(),
            cups_row_feed: f.word(),
            cups_row_step: f.word(),
            cups_num_colors: f.word(),
            cups_borderless_scaling_factor: f.real(),
            cups_page_size: [f.real(), f.real()],
            cups_imaging_bbox: [f.real(), f.real(), f.real(), f.real()],
            cups_integer: core::array::from_fn(|_| f.word()),
            cups_real: core::array::from_fn(|_| f.real()),
            cups_string: core::array::from_fn(|_| f.text()),
            cups_marker_type: f.text(),
            cups_rendering_intent: f.text(),
            cups_page_size_name: f.text(),
        }
    }

    /// Encode this header as a full-size record in native byte order.
    pub fn encode(&self) -> [u8; HEADER_V2_SIZE] {
        let mut out = [0u8; HEADER_V2_SIZE];
        let mut f = FieldsMut::<BigEndian>::new(&mut out);
        f.text(&self.media_class);
        f.text(&self.media_color);
        f.text(&self.media_type);
        f.text(&self.output_type);
        debug_assert_eq!(f.pos, WORDS_START);
        f.word(self.advance_distance);
        f.word(self.advance_media);
        f.word(self.collate);
        f.word(self.cut_media);
        f.word(self.duplex);
        f.words(&self.hw_resolution);
        f.words(&self.imaging_bounding_box);
        f.word(self.insert_sheet);
        f.word(self.jog);
        f.word(self.leading_edge);
        f.words(&self.margins);
        f.word(self.manual_feed);
        f.word(self.media_position);
        f.word(self.media_weight);
        f.word(self.mirror_print);
        f.word(self.negative_print);
        f.word(self.num_copies);
        f.word(self.orientation);
        f.word(self.output_face_up);
        f.words(&self.page_size);
        f.word(self.separations);
        f.word(self.tray_switch);
        f.word(self.tumble);
        f.word(self.cups_width);
        f.word(self.cups_height);
        f.word(self.cups_media_type);
        f.word(self.cups_bits_per_color);
        f.word(self.cups_bits_per_pixel);
        f.word(self.cups_bytes_per_line);
        f.word(self.cups_color_order.as_u32());
        f.word(self.cups_color_space.as_u32());
        f.word(self.cups_compression);
        f.word(self.cups_row_count);
        f.word(self.cups_row_feed);
        f.word(self.cups_row_step);
        f.word(self.cups_num_colors);
        f.real(self.cups_borderless_scaling_factor);
        f.reals(&self.cups_page_size);
        f.reals(&self.cups_imaging_bbox);
        f.words(&self.cups_integer);
        f.reals(&self.cups_real);
        debug_assert_eq!(f.pos, WORDS_START + WORD_COUNT * 4);
        for s in &self.cups_string {
            f.text(s);
        }
        f.text(&self.cups_marker_type);
        f.text(&self.cups_rendering_intent);
        f.text(&self.cups_page_size_name);
        debug_assert_eq!(f.pos, HEADER_V2_SIZE);
        out
    }

    /// Bytes per pixel (chunked layouts) or per color plane (all others).
    pub fn bytes_per_pixel(&self) -> u32 {
        if self.cups_color_order == ColorOrder::Chunked {
            self.cups_bits_per_pixel.div_ceil(8)
        } else {
            self.cups_bits_per_color.div_ceil(8)
        }
    }

    /// Total pixel rows on this page: the height, times the plane count for
    /// planar layouts.
    pub fn rows(&self) -> u32 {
        if self.cups_color_order == ColorOrder::Planar {
            self.cups_height.saturating_mul(self.cups_num_colors)
        } else {
            self.cups_height
        }
    }

    /// Fill in the fields this codec derives rather than transports.
    ///
    /// `cups_num_colors` is computed from the color space when the stream
    /// revision predates the field (`version` V1) or when it arrives zero;
    /// a recognized nonzero value is preserved, and unrecognized color-space
    /// codes leave it untouched.
    pub(crate) fn normalize(&mut self, version: SyncVersion) {
        if version == SyncVersion::V1 || self.cups_num_colors == 0 {
            if let Some(n) = self
                .cups_color_space
                .num_colors(self.cups_bits_per_pixel)
            {
                self.cups_num_colors = n;
            }
        }
    }

    /// Zero the extension fields, leaving the short-header prefix.
    pub(crate) fn clear_extension(&mut self) {
        self.cups_num_colors = 0;
        self.cups_borderless_scaling_factor = 0.0;
        self.cups_page_size = [0.0; 2];
        self.cups_imaging_bbox = [0.0; 4];
        self.cups_integer = [0; 16];
        self.cups_real = [0.0; 16];
        self.cups_string = [Text64::default(); 16];
        self.cups_marker_type = Text64::default();
        self.cups_rendering_intent = Text64::default();
        self.cups_page_size_name = Text64::default();
    }
}

// ── Field cursors ────────────────────────────────────────────────────

struct Fields<'a, E> {
    buf: &'a [u8],
    pos: usize,
    order: PhantomData<E>,
}

impl<'a, E: ByteOrder> Fields<'a, E> {
    fn new(buf: &'a [u8]) -> Self {
        Fields {
            buf,
            pos: 0,
            order: PhantomData,
        }
    }

    fn text(&mut self) -> Text64 {
        let mut out = [0u8; 64];
        out.copy_from_slice(&self.buf[self.pos..self.pos + 64]);
        self.pos += 64;
        Text64(out)
    }

    fn word(&mut self) -> u32 {
        let v = E::read_u32(&self.buf[self.pos..self.pos + 4]);
        self.pos += 4;
        v
    }

    fn real(&mut self) -> f32 {
        let v = E::read_f32(&self.buf[self.pos..self.pos + 4]);
        self.pos += 4;
        v
    }
}

struct FieldsMut<'a, E> {
    buf: &'a mut [u8],
    pos: usize,
    order: PhantomData<E>,
}

impl<'a, E: ByteOrder> FieldsMut<'a, E> {
    fn new(buf: &'a mut [u8]) -> Self {
        FieldsMut {
            buf,
            pos: 0,
            order: PhantomData,
        }
    }

    fn text(&mut self, value: &Text64) {
        self.buf[self.pos..self.pos + 64].copy_from_slice(&value.0);
        self.pos += 64;
    }

    fn word(&mut self, value: u32) {
        E::write_u32(&mut self.buf[self.pos..self.pos + 4], value);
        self.pos += 4;
    }

    fn words(&mut self, values: &[u32]) {
        for &v in values {
            self.word(v);
        }
    }

    fn real(&mut self, value: f32) {
        E::write_f32(&mut self.buf[self.pos..self.pos + 4], value);
        self.pos += 4;
    }

    fn reals(&mut self, values: &[f32]) {
        for &v in values {
            self.real(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_geometry() {
        // The scalar region must span exactly the documented word count.
        assert_eq!(WORDS_START + WORD_COUNT * 4, 580);
        assert_eq!(HEADER_V1_SIZE, 420);
        assert_eq!(HEADER_V2_SIZE, 1796);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let mut header = PageHeader::default();
        header.media_class = Text64::new("PwgRaster");
        header.advance_distance = 7;
        header.hw_resolution = [600, 600];
        header.cups_width = 2550;
        header.cups_height = 3300;
        header.cups_bits_per_color = 8;
        header.cups_bits_per_pixel = 24;
        header.cups_bytes_per_line = 7650;
        header.cups_color_order = ColorOrder::Chunked;
        header.cups_color_space = ColorSpace::Rgb;
        header.cups_num_colors = 3;
        header.cups_borderless_scaling_factor = 1.5;
        header.cups_integer[3] = 42;
        header.cups_real[0] = 0.25;
        header.cups_string[2] = Text64::new("profile");
        header.cups_page_size_name = Text64::new("Letter");

        let bytes = header.encode();
        let decoded = PageHeader::decode(&bytes, false).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn swapped_decode_reverses_scalars_only() {
        let mut header = PageHeader::default();
        header.media_class = Text64::new("verbatim");
        header.cups_width = 8;
        header.cups_page_size_name = Text64::new("A4");

        let mut bytes = header.encode();
        // Reverse each word in the scalar region, as a byte-reversed
        // producer would have laid them out.
        for word in bytes[WORDS_START..WORDS_START + WORD_COUNT * 4].chunks_exact_mut(4) {
            word.reverse();
        }

        let decoded = PageHeader::decode(&bytes, true).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn num_colors_mapping() {
        assert_eq!(ColorSpace::K.num_colors(8), Some(1));
        assert_eq!(ColorSpace::CieLab.num_colors(8), Some(3));
        assert_eq!(ColorSpace::Cmyk.num_colors(32), Some(4));
        assert_eq!(ColorSpace::KcmyCm.num_colors(1), Some(6));
        assert_eq!(ColorSpace::KcmyCm.num_colors(8), Some(4));
        assert_eq!(ColorSpace::Other(29).num_colors(8), None);
    }

    #[test]
    fn color_codes_roundtrip() {
        for code in 0..64 {
            assert_eq!(ColorSpace::from_u32(code).as_u32(), code);
        }
        for code in 0..8 {
            assert_eq!(ColorOrder::from_u32(code).as_u32(), code);
        }
    }
}
