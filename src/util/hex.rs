//! Annotated hex dump rendering.
//!
//! Consumes a byte buffer together with an ordered annotation stream and
//! writes one block of lines per annotated field:
//!
//! ```text
//! 0x0000 | 00 00 00 04 .. .. .. .. .. .. .. .. .. .. .. .. Length
//! 0x0004 | de ad be ef .. .. .. .. .. .. .. .. .. .. .. .. Data
//! 0x0008 |
//! ```
//!
//! - Each line starts with `0x` + the 4-digit running offset + ` | `.
//! - Bytes are lowercase two-digit tokens, at most 16 per line. Wrapping
//!   restarts at every field boundary.
//! - The field name follows the last token of the field's last line. With
//!   [`Padding::Placeholder`] the missing columns of that line are filled
//!   with `..` so names line up.
//! - A final line holds only the offset prefix for the total consumed length.

use std::io::Write;

use log::debug;

use crate::layout::iter::EncoderLayoutIterator;
use crate::layout::schema::Record;
use crate::layout::{eager, Annotation, AnnotationSource};
use crate::DumpError;

/// Hex tokens per display line.
pub const BYTES_PER_LINE: usize = 16;

/// Filler token for unused columns on a field's last line.
pub const PLACEHOLDER: &str = "..";

/// Column fill policy for a field's partially-filled last line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Padding {
    /// Pad to 16 columns with [`PLACEHOLDER`] tokens.
    #[default]
    Placeholder,
    /// Put the name right after the last byte.
    Bare,
}

/// Format a running offset as a line prefix, e.g. `0x001f | `.
pub fn format_line_offset(offset: usize) -> String {
    format!("0x{:04x} | ", offset)
}

/// Renders buffers against annotation streams.
#[derive(Debug, Clone, Copy)]
pub struct HexDumpRenderer {
    show_offsets: bool,
    padding: Padding,
}

impl Default for HexDumpRenderer {
    fn default() -> Self {
        HexDumpRenderer {
            show_offsets: true,
            padding: Padding::Placeholder,
        }
    }
}

impl HexDumpRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the `0xNNNN | ` prefix on field lines.
    pub fn with_offsets(mut self, show_offsets: bool) -> Self {
        self.show_offsets = show_offsets;
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Format the lines for one field starting at `offset`.
    pub fn format_field(&self, bytes: &[u8], offset: usize, name: &str) -> String {
        let line_count = bytes.len().div_ceil(BYTES_PER_LINE).max(1);
        let mut out = String::with_capacity(line_count * (BYTES_PER_LINE * 3 + 10) + name.len());

        for line in 0..line_count {
            let start = line * BYTES_PER_LINE;
            let chunk = &bytes[start.min(bytes.len())..(start + BYTES_PER_LINE).min(bytes.len())];

            if self.show_offsets {
                out.push_str(&format_line_offset(offset + start));
            }

            let mut columns: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
            if line + 1 == line_count {
                if self.padding == Padding::Placeholder {
                    columns.resize(BYTES_PER_LINE, PLACEHOLDER.to_string());
                }
                columns.push(name.to_string());
            }
            out.push_str(&columns.join(" "));
            out.push('\n');
        }

        out
    }

    /// Render `buffer` against a fallible annotation stream.
    ///
    /// Returns the number of bytes consumed. Fails with
    /// [`DumpError::BufferUnderflow`] before writing anything for a field
    /// that extends past the end of the buffer.
    pub fn render<I>(
        &self,
        buffer: &[u8],
        annotations: I,
        writer: &mut dyn Write,
    ) -> Result<usize, DumpError>
    where
        I: IntoIterator<Item = Result<Annotation, DumpError>>,
    {
        let mut offset = 0usize;

        for item in annotations {
            let annotation = item?;
            let end = offset
                .checked_add(annotation.size)
                .filter(|&end| end <= buffer.len())
                .ok_or(DumpError::BufferUnderflow {
                    offset,
                    size: annotation.size,
                    len: buffer.len(),
                })?;

            let text = self.format_field(&buffer[offset..end], offset, &annotation.name);
            writer
                .write_all(text.as_bytes())
                .map_err(|e| DumpError::Io(format!("Cannot write hex dump: {}", e)))?;
            offset = end;
        }

        writeln!(writer, "{}", format_line_offset(offset))
            .and_then(|_| writer.flush())
            .map_err(|e| DumpError::Io(format!("Cannot write hex dump: {}", e)))?;

        debug!("rendered {} of {} bytes", offset, buffer.len());
        Ok(offset)
    }
}

/// Hex dump `buffer` against a pre-built annotation list.
pub fn render_from_list(
    buffer: &[u8],
    annotations: &[Annotation],
    writer: &mut dyn Write,
) -> Result<usize, DumpError> {
    HexDumpRenderer::default().render(buffer, eager(annotations), writer)
}

/// Hex dump `buffer` against the list a fixed-layout type hands out.
pub fn render_from_source<S>(
    buffer: &[u8],
    source: &S,
    writer: &mut dyn Write,
) -> Result<usize, DumpError>
where
    S: AnnotationSource + ?Sized,
{
    render_from_list(buffer, &source.annotations(), writer)
}

/// Hex dump `buffer` against the encoded layout of `record`.
pub fn render_from_record(
    buffer: &[u8],
    record: &dyn Record,
    writer: &mut dyn Write,
) -> Result<usize, DumpError> {
    HexDumpRenderer::default().render(buffer, EncoderLayoutIterator::new(record), writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_text(renderer: HexDumpRenderer, buffer: &[u8], list: &[Annotation]) -> String {
        let mut out = Vec::new();
        renderer.render(buffer, eager(list), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_line_offset() {
        assert_eq!(format_line_offset(0), "0x0000 | ");
        assert_eq!(format_line_offset(0x1f), "0x001f | ");
        assert_eq!(format_line_offset(0x12345), "0x12345 | ");
    }

    #[test]
    fn test_short_field_is_padded() {
        let line = HexDumpRenderer::new().format_field(&[0xde, 0xad], 4, "Data");
        let expected = format!("0x0004 | de ad{} Data\n", " ..".repeat(14));
        assert_eq!(line, expected);
    }

    #[test]
    fn test_bare_padding() {
        let renderer = HexDumpRenderer::new().with_padding(Padding::Bare);
        assert_eq!(renderer.format_field(&[0x0a], 0, "Flag"), "0x0000 | 0a Flag\n");
    }

    #[test]
    fn test_full_line_has_no_placeholders() {
        let bytes: Vec<u8> = (0..16).collect();
        let line = HexDumpRenderer::new().format_field(&bytes, 0, "Hash");
        assert_eq!(
            line,
            "0x0000 | 00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f Hash\n"
        );
    }

    #[test]
    fn test_wrap_restarts_per_field() {
        let bytes: Vec<u8> = (0..20).collect();
        let text = HexDumpRenderer::new().format_field(&bytes, 3, "Blob");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "0x0003 | 00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f"
        );
        assert!(lines[1].starts_with("0x0013 | 10 11 12 13 .."));
        assert!(lines[1].ends_with(".. Blob"));
    }

    #[test]
    fn test_zero_size_field() {
        let line = HexDumpRenderer::new()
            .with_padding(Padding::Bare)
            .format_field(&[], 8, "Empty");
        assert_eq!(line, "0x0008 | Empty\n");

        let padded = HexDumpRenderer::new().format_field(&[], 8, "Empty");
        assert_eq!(padded, format!("0x0008 | {} Empty\n", vec![".."; 16].join(" ")));
    }

    #[test]
    fn test_without_offsets() {
        let renderer = HexDumpRenderer::new()
            .with_offsets(false)
            .with_padding(Padding::Bare);
        let list = [Annotation::new("A", 1), Annotation::new("B", 1)];
        let text = render_text(renderer, &[1, 2], &list);
        assert_eq!(text, "01 A\n02 B\n0x0002 | \n");
    }

    #[test]
    fn test_render_reports_consumed() {
        let mut out = Vec::new();
        let consumed = render_from_list(
            &[0u8; 10],
            &[Annotation::new("A", 4), Annotation::new("B", 2)],
            &mut out,
        )
        .unwrap();
        assert_eq!(consumed, 6);
        assert!(String::from_utf8(out).unwrap().ends_with("0x0006 | \n"));
    }

    #[test]
    fn test_underflow_writes_nothing_for_field() {
        let mut out = Vec::new();
        let err = render_from_list(
            &[0u8; 6],
            &[Annotation::new("Length", 4), Annotation::new("Body", 6)],
            &mut out,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            DumpError::BufferUnderflow {
                offset: 4,
                size: 6,
                len: 6
            }
        ));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Length"));
        assert!(!text.contains("Body"));
    }
}
