//! CLI subcommand implementations for the `wdump` binary.
//!
//! CLI argument parsing uses clap derive macros, with the top-level
//! [`app::Cli`] struct and [`app::Commands`] enum defined in [`app`] and
//! shared between `main.rs` and `build.rs` (for man page generation) via
//! `include!()`.
//!
//! Each subcommand module follows the same pattern: an `Options` struct
//! holding the parsed arguments and a
//! `pub fn execute(opts, writer) -> Result<(), DumpError>` entry point. The
//! `writer: &mut dyn Write` parameter allows output to be captured in tests
//! or redirected to a file via the global `--output` flag.
//!
//! # Subcommands
//!
//! | Command | Module | Purpose |
//! |---------|--------|---------|
//! | `wdump annotate` | [`annotate`] | Hex dump against a JSON annotation list |
//! | `wdump record` | [`record`] | Hex dump against the layout of a JSON value document |
//! | `wdump layout` | [`layout`] | Print a value document's annotation stream |
//!
//! A dump that fails part way (buffer underflow, invalid schema) is
//! discarded: nothing of it reaches the writer. The `wprintln!` macro wraps
//! `writeln!` to convert `io::Error` into `DumpError`.

pub mod annotate;
pub mod app;
pub mod layout;
pub mod record;

/// Write a line to the given writer, converting io::Error to DumpError.
macro_rules! wprintln {
    ($w:expr) => {
        writeln!($w).map_err(|e| $crate::DumpError::Io(e.to_string()))
    };
    ($w:expr, $($arg:tt)*) => {
        writeln!($w, $($arg)*).map_err(|e| $crate::DumpError::Io(e.to_string()))
    };
}

pub(crate) use wprintln;

use std::io::Write;

use colored::Colorize;
use log::{info, warn};

use crate::layout::Annotation;
use crate::util::hex::{HexDumpRenderer, Padding};
use crate::DumpError;

/// Build a renderer from the `--no-offsets` / `--no-padding` flags.
pub(crate) fn renderer(no_offsets: bool, no_padding: bool) -> HexDumpRenderer {
    HexDumpRenderer::new()
        .with_offsets(!no_offsets)
        .with_padding(if no_padding {
            Padding::Bare
        } else {
            Padding::Placeholder
        })
}

/// Render a full dump into memory, then write it with a header line.
///
/// Nothing is written if rendering fails.
pub(crate) fn write_dump<I>(
    renderer: &HexDumpRenderer,
    source: &str,
    buffer: &[u8],
    annotations: I,
    writer: &mut dyn Write,
) -> Result<(), DumpError>
where
    I: IntoIterator<Item = Result<Annotation, DumpError>>,
{
    let mut body = Vec::new();
    let consumed = renderer.render(buffer, annotations, &mut body)?;
    info!("{}: {} of {} bytes annotated", source, consumed, buffer.len());

    wprintln!(writer, "Hex dump of {} ({} bytes):", source, buffer.len())?;
    wprintln!(writer)?;
    writer
        .write_all(&body)
        .map_err(|e| DumpError::Io(format!("Cannot write hex dump: {}", e)))?;

    if consumed < buffer.len() {
        let trailing = buffer.len() - consumed;
        warn!("{}: {} trailing bytes not covered by the layout", source, trailing);
        wprintln!(
            writer,
            "{} {} trailing bytes not covered by the layout",
            "Note:".yellow(),
            trailing
        )?;
    }

    Ok(())
}
