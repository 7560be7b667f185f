//! JSON value documents.
//!
//! A value document describes one concrete value tree: the declared fields
//! of each record and, for every sequence, its actual elements. Loaded
//! documents implement [`Record`], so the layout iterator walks them exactly
//! like compiled record types.
//!
//! ```json
//! {"fields": [
//!   {"name": "Header", "record": {"fields": [{"name": "Ver", "scalar": "u16"}]}},
//!   {"name": "Nonce", "scalar": 4},
//!   {"name": "cache", "scalar": 8, "private": true},
//!   {"name": "Items", "sequence": [{"scalar": 3}, {"scalar": 3}], "tag": ",omitempty"}
//! ]}
//! ```
//!
//! Each field carries exactly one of `scalar` (a byte size or a primitive
//! type name), `record`, or `sequence`. `tag` uses the encoder's tag syntax.

use std::path::Path;

use serde::Deserialize;

use crate::layout::iter::encoded_len;
use crate::layout::schema::{
    Element, ElementRef, FieldDef, FieldKind, FieldRef, FieldTag, Record, Sequence, Visibility,
};
use crate::layout::PREFIX_SIZE;
use crate::DumpError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScalarSpec {
    Size(usize),
    Type(String),
}

#[derive(Debug, Deserialize)]
struct RawValue {
    scalar: Option<ScalarSpec>,
    record: Option<RawRecord>,
    sequence: Option<Vec<RawValue>>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: String,
    #[serde(default)]
    tag: String,
    #[serde(default)]
    private: bool,
    #[serde(flatten)]
    value: RawValue,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    fields: Vec<RawField>,
}

/// Encoded width of a primitive type name.
pub fn scalar_type_size(name: &str) -> Option<usize> {
    match name {
        "u8" | "i8" | "bool" => Some(1),
        "u16" | "i16" => Some(2),
        "u32" | "i32" | "f32" => Some(4),
        "u64" | "i64" | "f64" => Some(8),
        _ => None,
    }
}

/// A value in a document.
#[derive(Debug, Clone)]
pub enum ValueDoc {
    Scalar(usize),
    Record(RecordDoc),
    Sequence {
        items: Vec<ValueDoc>,
        /// Encoded size including the count prefix. Only sequences that are
        /// themselves sequence elements carry it.
        encoded: Option<usize>,
    },
}

impl ValueDoc {
    fn kind(&self) -> FieldKind {
        match self {
            ValueDoc::Scalar(_) => FieldKind::Scalar,
            ValueDoc::Record(_) => FieldKind::Record,
            ValueDoc::Sequence { .. } => FieldKind::Sequence,
        }
    }

    fn element_size(&self) -> Result<usize, DumpError> {
        match self {
            ValueDoc::Scalar(size) => Ok(*size),
            ValueDoc::Record(record) => encoded_len(record),
            ValueDoc::Sequence { items, encoded } => match encoded {
                Some(encoded) => Ok(*encoded),
                None => sequence_size(items, ""),
            },
        }
    }

    fn build(raw: RawValue, path: &str, is_element: bool) -> Result<Self, DumpError> {
        match (raw.scalar, raw.record, raw.sequence) {
            (Some(ScalarSpec::Size(size)), None, None) => Ok(ValueDoc::Scalar(size)),
            (Some(ScalarSpec::Type(name)), None, None) => scalar_type_size(&name)
                .map(ValueDoc::Scalar)
                .ok_or_else(|| {
                    DumpError::Parse(format!("{}: unknown scalar type '{}'", path, name))
                }),
            (None, Some(record), None) => Ok(ValueDoc::Record(RecordDoc::build(record, path)?)),
            (None, None, Some(raw_items)) => {
                let mut items = Vec::with_capacity(raw_items.len());
                for (i, raw_item) in raw_items.into_iter().enumerate() {
                    items.push(ValueDoc::build(raw_item, &format!("{}[{}]", path, i), true)?);
                }
                let encoded = if is_element {
                    Some(sequence_size(&items, path)?)
                } else {
                    None
                };
                Ok(ValueDoc::Sequence { items, encoded })
            }
            _ => Err(DumpError::Parse(format!(
                "{}: expected exactly one of 'scalar', 'record', 'sequence'",
                path
            ))),
        }
    }
}

/// Count prefix plus the encoded size of every element.
fn sequence_size(items: &[ValueDoc], path: &str) -> Result<usize, DumpError> {
    items.iter().try_fold(PREFIX_SIZE, |total, item| {
        total
            .checked_add(item.element_size()?)
            .ok_or_else(|| DumpError::Parse(format!("{}: encoded size overflows usize", path)))
    })
}

impl Element for ValueDoc {
    fn as_element(&self) -> ElementRef<'_> {
        match self {
            ValueDoc::Scalar(size) => ElementRef::Scalar(*size),
            ValueDoc::Record(record) => ElementRef::Record(record),
            ValueDoc::Sequence { encoded, .. } => {
                ElementRef::Scalar(encoded.unwrap_or(PREFIX_SIZE))
            }
        }
    }
}

/// A record loaded from a value document.
#[derive(Debug, Clone)]
pub struct RecordDoc {
    defs: Vec<FieldDef>,
    values: Vec<ValueDoc>,
}

impl RecordDoc {
    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, DumpError> {
        let raw: RawRecord = serde_json::from_str(text)
            .map_err(|e| DumpError::Parse(format!("Invalid value document: {}", e)))?;
        RecordDoc::build(raw, "")
    }

    /// Read and parse a document file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DumpError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DumpError::Io(format!("Cannot read {}: {}", path.display(), e)))?;
        RecordDoc::from_json(&text)
    }

    fn build(raw: RawRecord, path: &str) -> Result<Self, DumpError> {
        let mut defs = Vec::with_capacity(raw.fields.len());
        let mut values = Vec::with_capacity(raw.fields.len());

        for field in raw.fields {
            let qualified = if path.is_empty() {
                field.name.clone()
            } else {
                format!("{}.{}", path, field.name)
            };
            let value = ValueDoc::build(field.value, &qualified, false)?;
            defs.push(FieldDef {
                name: field.name.into(),
                kind: value.kind(),
                tag: FieldTag::parse(&field.tag),
                visibility: if field.private {
                    Visibility::Private
                } else {
                    Visibility::Public
                },
            });
            values.push(value);
        }

        Ok(RecordDoc { defs, values })
    }
}

impl Record for RecordDoc {
    fn schema(&self) -> &[FieldDef] {
        &self.defs
    }

    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        self.values.get(index).map(|value| match value {
            ValueDoc::Scalar(size) => FieldRef::Scalar(*size),
            ValueDoc::Record(record) => FieldRef::Record(record),
            ValueDoc::Sequence { items, .. } => FieldRef::Sequence(items as &dyn Sequence),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::iter::layout_of;

    #[test]
    fn test_parse_nested_document() {
        let doc = RecordDoc::from_json(
            r#"{"fields": [
                {"name": "Header", "record": {"fields": [{"name": "Ver", "scalar": "u16"}]}},
                {"name": "Nonce", "scalar": 4}
            ]}"#,
        )
        .unwrap();

        assert_eq!(doc.schema().len(), 2);
        assert_eq!(doc.schema()[0].kind, FieldKind::Record);
        let layout = layout_of(&doc).unwrap();
        let names: Vec<&str> = layout.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Length", "Prefix", "Header.Ver", "Nonce"]);
        assert_eq!(layout[2].size, 2);
    }

    #[test]
    fn test_tags_and_private() {
        let doc = RecordDoc::from_json(
            r#"{"fields": [
                {"name": "Skipped", "scalar": 8, "tag": "-"},
                {"name": "cache", "scalar": 8, "private": true},
                {"name": "Items", "sequence": [], "tag": ",omitempty"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(doc.schema()[0].tag, FieldTag::Skip);
        assert_eq!(doc.schema()[1].visibility, Visibility::Private);
        assert_eq!(doc.schema()[2].tag, FieldTag::OmitEmpty);
        assert_eq!(layout_of(&doc).unwrap().len(), 2);
    }

    #[test]
    fn test_nested_sequence_element_size() {
        let doc = RecordDoc::from_json(
            r#"{"fields": [
                {"name": "Rows", "sequence": [{"sequence": [{"scalar": 1}, {"scalar": 1}]}]}
            ]}"#,
        )
        .unwrap();

        let layout = layout_of(&doc).unwrap();
        assert_eq!(layout[3], crate::layout::Annotation::new("Rows[0]", 6));
    }

    #[test]
    fn test_record_elements_are_not_sized_at_load() {
        let doc = RecordDoc::from_json(
            r#"{"fields": [
                {"name": "Rows", "sequence": [{"record": {"fields": [
                    {"name": "Items", "sequence": [{"scalar": 1}], "tag": ",omitempty"},
                    {"name": "Id", "scalar": 1}
                ]}}]}
            ]}"#,
        )
        .unwrap();

        let err = layout_of(&doc).unwrap_err();
        assert!(matches!(err, DumpError::InvalidSchema(_)));
    }

    #[test]
    fn test_nested_sequence_size_overflow() {
        let err = RecordDoc::from_json(
            r#"{"fields": [
                {"name": "Rows", "sequence": [{"sequence": [{"scalar": 18446744073709551615}]}]}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DumpError::Parse(_)));
        assert!(err.to_string().contains("Rows[0]"));
    }

    #[test]
    fn test_unknown_scalar_type() {
        let err = RecordDoc::from_json(r#"{"fields": [{"name": "X", "scalar": "u128"}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("unknown scalar type"));
    }

    #[test]
    fn test_ambiguous_field() {
        let err = RecordDoc::from_json(
            r#"{"fields": [{"name": "X", "scalar": 1, "sequence": []}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DumpError::Parse(_)));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            RecordDoc::from_json("{"),
            Err(DumpError::Parse(_))
        ));
    }

    #[test]
    fn test_scalar_type_size() {
        assert_eq!(scalar_type_size("bool"), Some(1));
        assert_eq!(scalar_type_size("i64"), Some(8));
        assert_eq!(scalar_type_size("string"), None);
    }
}
