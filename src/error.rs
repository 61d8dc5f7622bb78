use std::io;

/// Errors from raster stream reading and writing.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RasterError {
    #[error("stream does not start with a recognized sync word")]
    BadSync,

    #[error("unexpected end of stream")]
    UnexpectedEof,

    #[error("no rows remain on the current page")]
    PageExhausted,

    #[error("invalid raster data: {0}")]
    InvalidData(String),

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
