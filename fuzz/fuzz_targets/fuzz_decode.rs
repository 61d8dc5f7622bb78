#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use zenraster::{Limits, RasterReader};

fuzz_target!(|data: &[u8]| {
    // Bound the header-driven allocations, then decode pages until the
    // stream runs out or goes bad — must never panic.
    let limits = Limits {
        max_width: Some(1 << 16),
        max_height: Some(1 << 12),
        max_bytes_per_line: Some(1 << 16),
        max_page_bytes: Some(1 << 24),
    };
    let Ok(mut reader) = RasterReader::open_with_limits(Cursor::new(data.to_vec()), limits) else {
        return;
    };
    while let Ok(Some(_page)) = reader.next_page() {}
});
