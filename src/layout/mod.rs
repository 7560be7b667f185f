//! Encoded-layout annotations.
//!
//! An [`Annotation`] names one contiguous byte range of an encoded message.
//! Annotations come from one of two sources:
//!
//! - **Eager**: a caller-built, ordered `&[Annotation]` for layouts already
//!   known up front (fixed-schema messages), or any [`AnnotationSource`]
//!   that hands out such a list.
//! - **Lazy**: an [`EncoderLayoutIterator`](iter::EncoderLayoutIterator)
//!   that walks a [`Record`](schema::Record) value in the same order, and
//!   with the same skip and length-prefix rules, as the binary encoder.
//!
//! Consumed in order against the encoded buffer, either source partitions
//! the buffer left to right with no gaps or overlaps.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`schema`] | Field descriptors, the [`Record`](schema::Record) trait, encoded sizes |
//! | [`frame`] | Traversal frames and the explicit frame stack |
//! | [`iter`] | The lazy layout iterator |
//! | [`document`] | JSON value documents usable as records |

pub mod document;
pub mod frame;
pub mod iter;
pub mod schema;

use serde::{Deserialize, Serialize};

use crate::DumpError;

/// Name of the synthetic total-length framing field.
pub const FRAMING_LENGTH: &str = "Length";
/// Name of the synthetic message-type framing field.
pub const FRAMING_PREFIX: &str = "Prefix";
/// Encoded size of each framing field and of every sequence count prefix.
pub const PREFIX_SIZE: usize = 4;

/// A named chunk of an encoded buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Fully-qualified field name (e.g. `Header.Nonce`, `Items[2]`).
    pub name: String,
    /// Encoded size in bytes.
    pub size: usize,
}

impl Annotation {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Annotation {
            name: name.into(),
            size,
        }
    }
}

/// A type that describes its own fixed layout.
pub trait AnnotationSource {
    /// The ordered annotation list covering the encoded form.
    fn annotations(&self) -> Vec<Annotation>;
}

impl AnnotationSource for [Annotation] {
    fn annotations(&self) -> Vec<Annotation> {
        self.to_vec()
    }
}

impl AnnotationSource for Vec<Annotation> {
    fn annotations(&self) -> Vec<Annotation> {
        self.clone()
    }
}

/// Adapt a pre-built annotation list to the fallible stream the renderer consumes.
pub fn eager(
    annotations: &[Annotation],
) -> impl Iterator<Item = Result<Annotation, DumpError>> + '_ {
    annotations.iter().cloned().map(Ok)
}

/// Total encoded size covered by a list of annotations.
pub fn total_size(annotations: &[Annotation]) -> usize {
    annotations
        .iter()
        .fold(0usize, |total, a| total.saturating_add(a.size))
}
