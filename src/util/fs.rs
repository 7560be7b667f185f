//! Input buffer loading for the `wdump` subcommands.
//!
//! Provides [`read_input`] to load a whole file, or a window of it, either
//! through buffered reads or by memory-mapping the file.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::ops::Deref;
use std::path::Path;

use crate::DumpError;

/// Byte window within an input file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    /// Absolute byte offset where the message starts.
    pub offset: u64,
    /// Number of bytes to take (default: through end of file).
    pub length: Option<usize>,
}

/// Loaded input bytes.
pub enum InputBuffer {
    Owned(Vec<u8>),
    Mapped {
        mmap: memmap2::Mmap,
        start: usize,
        end: usize,
    },
}

impl Deref for InputBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            InputBuffer::Owned(data) => data.as_slice(),
            InputBuffer::Mapped { mmap, start, end } => &mmap[*start..*end],
        }
    }
}

/// Read `window` of the file at `path`.
///
/// An offset at or past the end of a non-empty file is an argument error.
/// A window that extends past the end is clipped to the file.
pub fn read_input<P: AsRef<Path>>(
    path: P,
    window: Window,
    use_mmap: bool,
) -> Result<InputBuffer, DumpError> {
    let path = path.as_ref();
    let mut file = File::open(path)
        .map_err(|e| DumpError::Io(format!("Cannot open {}: {}", path.display(), e)))?;

    let file_size = file
        .metadata()
        .map_err(|e| DumpError::Io(format!("Cannot stat {}: {}", path.display(), e)))?
        .len();

    if window.offset > 0 && window.offset >= file_size {
        return Err(DumpError::Argument(format!(
            "Offset {} is beyond file size {}",
            window.offset, file_size
        )));
    }

    let available = (file_size - window.offset) as usize;
    let read_len = window.length.map_or(available, |len| len.min(available));

    if use_mmap && file_size > 0 {
        // The mapped file must not be truncated by another process while mapped.
        let mmap = unsafe {
            memmap2::Mmap::map(&file)
                .map_err(|e| DumpError::Io(format!("Cannot mmap {}: {}", path.display(), e)))?
        };
        let start = window.offset as usize;
        return Ok(InputBuffer::Mapped {
            mmap,
            start,
            end: start + read_len,
        });
    }

    file.seek(SeekFrom::Start(window.offset)).map_err(|e| {
        DumpError::Io(format!("Cannot seek to offset {}: {}", window.offset, e))
    })?;

    let mut buf = vec![0u8; read_len];
    file.read_exact(&mut buf).map_err(|e| {
        DumpError::Io(format!(
            "Cannot read {} bytes at offset {}: {}",
            read_len, window.offset, e
        ))
    })?;

    Ok(InputBuffer::Owned(buf))
}
