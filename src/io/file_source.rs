use std::fs::File;
use std::path::Path;

use bytes::Bytes;
use memmap2::Mmap;
use tracing::debug;

use super::ByteSource;
use crate::error::IoError;

/// A local file made available as a [`ByteSource`].
///
/// The file is either read fully into memory or memory-mapped. Both forms
/// are immutable for the lifetime of the source.
pub enum FileSource {
    /// Whole file read into memory
    Loaded(Bytes),

    /// Read-only memory map of the file
    Mapped(Mmap),
}

impl FileSource {
    /// Read the whole file into memory.
    pub fn open(path: &Path) -> Result<Self, IoError> {
        let data = std::fs::read(path).map_err(|e| map_io_error(path, e))?;
        debug!(path = %path.display(), size = data.len(), "Loaded file");
        Ok(FileSource::Loaded(Bytes::from(data)))
    }

    /// Memory-map the file instead of reading it.
    ///
    /// The mapping is only valid as long as no other process truncates the
    /// file while it is being validated.
    pub fn map(path: &Path) -> Result<Self, IoError> {
        let file = File::open(path).map_err(|e| map_io_error(path, e))?;
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| map_io_error(path, e))?;
        debug!(path = %path.display(), size = mmap.len(), "Mapped file");
        Ok(FileSource::Mapped(mmap))
    }

    /// Borrow the file contents.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileSource::Loaded(bytes) => bytes.as_ref(),
            FileSource::Mapped(mmap) => &mmap[..],
        }
    }
}

impl ByteSource for FileSource {
    #[inline]
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<&[u8], IoError> {
        self.as_bytes().read_exact_at(offset, len)
    }

    #[inline]
    fn size(&self) -> u64 {
        self.as_bytes().len() as u64
    }
}

fn map_io_error(path: &Path, error: std::io::Error) -> IoError {
    if error.kind() == std::io::ErrorKind::NotFound {
        IoError::NotFound(path.display().to_string())
    } else {
        IoError::Read(format!("{}: {}", path.display(), error))
    }
}
