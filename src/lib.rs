//! Annotated hex dumps of binary-encoded messages.
//!
//! The `wiredump-utils` crate (library name `wiredump`) reconstructs the
//! field-by-field byte layout of a message produced by a length-prefixed,
//! little-endian binary encoder, and renders the encoded bytes as an
//! offset-labeled hex dump with one block per field.
//!
//! # CLI Reference
//!
//! The `wdump` binary (feature `cli`, on by default) wraps the library:
//!
//! | Command | Purpose |
//! |---------|---------|
//! | [`wdump annotate`](cli::app::Commands::Annotate) | Hex dump a buffer against a fixed JSON list of annotations |
//! | [`wdump record`](cli::app::Commands::Record) | Hex dump a buffer against the layout of a JSON value document |
//! | [`wdump layout`](cli::app::Commands::Layout) | Print the annotation stream of a value document without a buffer |
//! | [`wdump completions`](cli::app::Commands::Completions) | Generate shell completions |
//!
//! # Library API
//!
//! ## Quick example
//!
//! ```
//! use wiredump::layout::Annotation;
//! use wiredump::util::hex::render_from_list;
//!
//! let buffer = [0x00, 0x00, 0x00, 0x04, 0xde, 0xad, 0xbe, 0xef];
//! let annotations = [Annotation::new("Length", 4), Annotation::new("Data", 4)];
//!
//! let mut out = Vec::new();
//! render_from_list(&buffer, &annotations, &mut out).unwrap();
//! let text = String::from_utf8(out).unwrap();
//! assert!(text.starts_with("0x0000 | 00 00 00 04"));
//! assert!(text.ends_with("0x0008 | \n"));
//! ```
//!
//! ## Key entry points
//!
//! | Type / Function | Purpose |
//! |-----------------|---------|
//! | [`Annotation`](layout::Annotation) | A named byte range for one encoded field |
//! | [`Record`](layout::schema::Record) | Compile-time field descriptors plus field values |
//! | [`EncoderLayoutIterator`](layout::iter::EncoderLayoutIterator) | Lazy annotation stream matching the encoder's layout rules |
//! | [`HexDumpRenderer`](util::hex::HexDumpRenderer) | Formats bytes against an annotation stream |
//! | [`render_from_list`](util::hex::render_from_list) | Render with a pre-built annotation list |
//! | [`render_from_record`](util::hex::render_from_record) | Render with the layout of a record value |
//!
//! ## Feature flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli` | on | Builds the `wdump` binary and the [`cli`] module. |

#[cfg(feature = "cli")]
pub mod cli;
pub mod layout;
pub mod util;

use thiserror::Error;

/// Errors returned by `wiredump` operations.
#[derive(Error, Debug)]
pub enum DumpError {
    /// An I/O error occurred (file open, read, or write failure).
    #[error("I/O error: {0}")]
    Io(String),

    /// A parse error occurred (malformed layout or value document).
    #[error("Parse error: {0}")]
    Parse(String),

    /// An invalid argument was supplied (window past end of file, bad option, etc.).
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// The buffer ended before the bytes an annotation declares.
    #[error("Buffer underflow: field needs {size} bytes at offset {offset}, buffer has {len}")]
    BufferUnderflow {
        /// Running offset of the field that did not fit.
        offset: usize,
        /// Declared size of that field.
        size: usize,
        /// Total buffer length.
        len: usize,
    },

    /// A field descriptor breaks the encoder's tagging rules.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// The traversal state machine ran past its own bounds.
    #[error("Traversal underflow: {0}")]
    TraversalUnderflow(String),
}
