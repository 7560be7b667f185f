use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use crate::cli::wprintln;
use crate::layout::document::RecordDoc;
use crate::layout::iter::EncoderLayoutIterator;
use crate::layout::Annotation;
use crate::DumpError;

/// Options for the `wdump layout` subcommand.
pub struct LayoutOptions {
    /// Path to the JSON value document.
    pub doc: String,
    /// Leave out the Length/Prefix framing fields.
    pub unframed: bool,
    /// Emit output as JSON.
    pub json: bool,
}

#[derive(Serialize)]
struct LayoutEntry {
    offset: usize,
    size: usize,
    name: String,
}

/// Print the annotation stream of a value document with running offsets.
pub fn execute(opts: &LayoutOptions, writer: &mut dyn Write) -> Result<(), DumpError> {
    let record = RecordDoc::load(&opts.doc)?;
    let iter = if opts.unframed {
        EncoderLayoutIterator::without_framing(&record)
    } else {
        EncoderLayoutIterator::new(&record)
    };
    let annotations: Vec<Annotation> = iter.collect::<Result<_, _>>()?;

    let mut offset = 0usize;
    let mut entries = Vec::with_capacity(annotations.len());
    for a in annotations {
        let end = offset.checked_add(a.size).ok_or_else(|| {
            DumpError::Argument(format!("{} at offset {} overflows the layout", a.name, offset))
        })?;
        entries.push(LayoutEntry {
            offset,
            size: a.size,
            name: a.name,
        });
        offset = end;
    }

    if opts.json {
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| DumpError::Parse(format!("JSON serialization error: {}", e)))?;
        wprintln!(writer, "{}", json)?;
        return Ok(());
    }

    wprintln!(writer, "{:<8} {:>6}  {}", "Offset", "Size", "Field")?;
    for entry in &entries {
        wprintln!(
            writer,
            "0x{:04x}   {:>6}  {}",
            entry.offset,
            entry.size,
            entry.name.cyan()
        )?;
    }
    wprintln!(writer)?;
    wprintln!(
        writer,
        "Total: {} fields, {} bytes",
        entries.len(),
        format!("{}", offset).bold()
    )?;

    Ok(())
}
