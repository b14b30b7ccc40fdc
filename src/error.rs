use thiserror::Error;

/// I/O errors that can occur when acquiring or reading the file bytes
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// File does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// Any other failure while opening, reading or mapping the file
    #[error("Read error: {0}")]
    Read(String),
}

/// Errors that can occur when parsing TIFF files.
///
/// Every variant is fatal: parsing stops and no partial structure is returned.
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(IoError),

    /// Byte order marker is neither II nor MM
    #[error("Malformed header: bad byte order marker (0x{0:04X})")]
    InvalidByteOrder(u16),

    /// Version field is neither 42 (TIFF) nor 43 (BigTIFF)
    #[error("Malformed header: bad magic number: {0}")]
    InvalidMagic(u16),

    /// File is too small to contain a valid TIFF header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// A directory read ran past the end of the buffer
    #[error("Truncated data: need {requested} bytes at offset {offset}, file size is {size}")]
    TruncatedData {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// A next-IFD pointer leads back to an already visited directory
    #[error("Circular IFD chain: offset {0} was already visited")]
    CircularChain(u64),

    /// The IFD chain holds more directories than the configured maximum
    #[error("IFD chain too long: more than {0} directories")]
    ChainTooLong(usize),
}

impl From<IoError> for TiffError {
    fn from(error: IoError) -> Self {
        match error {
            IoError::RangeOutOfBounds {
                offset,
                requested,
                size,
            } => TiffError::TruncatedData {
                offset,
                requested,
                size,
            },
            other => TiffError::Io(other),
        }
    }
}
