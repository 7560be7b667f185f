use std::io::Write;

use crate::cli::{renderer, write_dump};
use crate::layout::{eager, Annotation};
use crate::util::fs::{read_input, Window};
use crate::DumpError;

/// Options for the `wdump annotate` subcommand.
pub struct AnnotateOptions {
    /// Path to the encoded message.
    pub file: String,
    /// Path to a JSON array of `{"name", "size"}` annotations.
    pub layout: String,
    /// Byte offset of the message within the file.
    pub offset: u64,
    /// Number of bytes to read.
    pub length: Option<usize>,
    pub no_offsets: bool,
    pub no_padding: bool,
    /// Memory-map the input file.
    pub mmap: bool,
}

/// Load an annotation list from a JSON file.
pub fn load_annotations(path: &str) -> Result<Vec<Annotation>, DumpError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| DumpError::Io(format!("Cannot read {}: {}", path, e)))?;
    serde_json::from_str(&text)
        .map_err(|e| DumpError::Parse(format!("Invalid annotation list in {}: {}", path, e)))
}

/// Hex dump a buffer against a fixed annotation list.
pub fn execute(opts: &AnnotateOptions, writer: &mut dyn Write) -> Result<(), DumpError> {
    let annotations = load_annotations(&opts.layout)?;
    let window = Window {
        offset: opts.offset,
        length: opts.length,
    };
    let buffer = read_input(&opts.file, window, opts.mmap)?;

    write_dump(
        &renderer(opts.no_offsets, opts.no_padding),
        &opts.file,
        &buffer,
        eager(&annotations),
        writer,
    )
}
