//! Stream framing: the 32-bit sync word that opens every raster stream.
//!
//! Six magics encode three orthogonal flags: stream revision, word byte
//! order, and (for V2) compression. The native spelling is big-endian;
//! reversed streams spell the same magic backwards and carry their header
//! words little-endian.

const SYNC_V0: u32 = 0x5261_5374; // "RaSt"
const SYNC_V0_REV: u32 = 0x7453_6152; // "tSaR"
const SYNC_V1: u32 = 0x5261_5331; // "RaS1"
const SYNC_V1_REV: u32 = 0x3153_6152; // "1SaR"
const SYNC_V2: u32 = 0x5261_5332; // "RaS2"
const SYNC_V2_REV: u32 = 0x3253_6152; // "2SaR"

/// Stream revision encoded in the sync word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncVersion {
    /// Original revision. Despite the name, streams of this revision carry
    /// full-size (V2-layout) page headers.
    V0,
    /// Revision with the short page header.
    V1,
    /// Revision with the full page header and packbits-compressed pixels.
    V2,
}

/// Decoded sync word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncWord {
    pub version: SyncVersion,
    /// Header words (and 12/16-bit pixel elements) arrive byte-reversed.
    pub swapped: bool,
}

impl SyncWord {
    /// The form every writer emits: native V0, uncompressed.
    pub const NATIVE: SyncWord = SyncWord {
        version: SyncVersion::V0,
        swapped: false,
    };

    /// Recognize a sync word, or `None` if the magic is unknown.
    pub fn from_bytes(bytes: [u8; 4]) -> Option<SyncWord> {
        let (version, swapped) = match u32::from_be_bytes(bytes) {
            SYNC_V0 => (SyncVersion::V0, false),
            SYNC_V0_REV => (SyncVersion::V0, true),
            SYNC_V1 => (SyncVersion::V1, false),
            SYNC_V1_REV => (SyncVersion::V1, true),
            SYNC_V2 => (SyncVersion::V2, false),
            SYNC_V2_REV => (SyncVersion::V2, true),
            _ => return None,
        };
        Some(SyncWord { version, swapped })
    }

    /// The wire spelling of this sync word.
    pub fn to_bytes(self) -> [u8; 4] {
        let value = match (self.version, self.swapped) {
            (SyncVersion::V0, false) => SYNC_V0,
            (SyncVersion::V0, true) => SYNC_V0_REV,
            (SyncVersion::V1, false) => SYNC_V1,
            (SyncVersion::V1, true) => SYNC_V1_REV,
            (SyncVersion::V2, false) => SYNC_V2,
            (SyncVersion::V2, true) => SYNC_V2_REV,
        };
        value.to_be_bytes()
    }

    /// Whether pixel data on this stream is packbits-compressed.
    pub fn compressed(self) -> bool {
        self.version == SyncVersion::V2
    }

    /// Bytes of page header this stream carries per page. Only V1 streams
    /// use the short header; V0 and V2 both carry the full record.
    pub(crate) fn header_len(self) -> usize {
        match self.version {
            SyncVersion::V1 => crate::header::HEADER_V1_SIZE,
            _ => crate::header::HEADER_V2_SIZE,
        }
    }
}
