//! Resource limits applied when a page header is accepted.
//!
//! The decoder allocates its row scratch and staging buffers from
//! header-supplied sizes; limits let a consumer bound those allocations
//! before they happen. All fields default to `None` (no limit).

use crate::error::RasterError;
use crate::header::PageHeader;

#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum bytes per decoded row (bounds the scratch and staging
    /// buffers, which hold one and two rows respectively).
    pub max_bytes_per_line: Option<u64>,
    /// Maximum decoded bytes per page (rows times row size), as would be
    /// allocated by [`crate::RasterReader::next_page`].
    pub max_page_bytes: Option<u64>,
}

impl Limits {
    pub(crate) fn check(&self, header: &PageHeader) -> Result<(), RasterError> {
        if let Some(max_w) = self.max_width {
            let width = header.cups_width;
            if u64::from(width) > max_w {
                return Err(RasterError::LimitExceeded(format!(
                    "width {width} exceeds limit {max_w}"
                )));
            }
        }
        if let Some(max_h) = self.max_height {
            let height = header.cups_height;
            if u64::from(height) > max_h {
                return Err(RasterError::LimitExceeded(format!(
                    "height {height} exceeds limit {max_h}"
                )));
            }
        }
        if let Some(max_line) = self.max_bytes_per_line {
            let line = header.cups_bytes_per_line;
            if u64::from(line) > max_line {
                return Err(RasterError::LimitExceeded(format!(
                    "row size {line} exceeds limit {max_line}"
                )));
            }
        }
        if let Some(max_page) = self.max_page_bytes {
            let total = u64::from(header.rows()) * u64::from(header.cups_bytes_per_line);
            if total > max_page {
                return Err(RasterError::LimitExceeded(format!(
                    "page of {total} bytes exceeds limit {max_page}"
                )));
            }
        }
        Ok(())
    }
}
