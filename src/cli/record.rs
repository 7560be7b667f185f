use std::io::Write;

use crate::cli::{renderer, write_dump};
use crate::layout::document::RecordDoc;
use crate::layout::iter::EncoderLayoutIterator;
use crate::util::fs::{read_input, Window};
use crate::DumpError;

/// Options for the `wdump record` subcommand.
pub struct RecordOptions {
    /// Path to the encoded message.
    pub file: String,
    /// Path to the JSON value document.
    pub doc: String,
    /// The buffer carries no Length/Prefix framing.
    pub unframed: bool,
    /// Byte offset of the message within the file.
    pub offset: u64,
    /// Number of bytes to read.
    pub length: Option<usize>,
    pub no_offsets: bool,
    pub no_padding: bool,
    /// Memory-map the input file.
    pub mmap: bool,
}

/// Hex dump a buffer against the encoded layout of a value document.
pub fn execute(opts: &RecordOptions, writer: &mut dyn Write) -> Result<(), DumpError> {
    let record = RecordDoc::load(&opts.doc)?;
    let window = Window {
        offset: opts.offset,
        length: opts.length,
    };
    let buffer = read_input(&opts.file, window, opts.mmap)?;

    let annotations = if opts.unframed {
        EncoderLayoutIterator::without_framing(&record)
    } else {
        EncoderLayoutIterator::new(&record)
    };

    write_dump(
        &renderer(opts.no_offsets, opts.no_padding),
        &opts.file,
        &buffer,
        annotations,
        writer,
    )
}
