//! Compile-time field descriptors for encoded record types.
//!
//! The binary encoder serializes a record by visiting its fields in
//! declaration order. Each record type describes that order once, as a
//! `const` slice of [`FieldDef`], and hands out field values through the
//! [`Record`] trait. The layout iterator reads nothing else.
//!
//! ```
//! use wiredump::layout::schema::{FieldDef, FieldRef, Record};
//!
//! struct Ping {
//!     nonce: u32,
//! }
//!
//! impl Record for Ping {
//!     fn schema(&self) -> &[FieldDef] {
//!         const FIELDS: &[FieldDef] = &[FieldDef::scalar("Nonce")];
//!         FIELDS
//!     }
//!
//!     fn field(&self, index: usize) -> Option<FieldRef<'_>> {
//!         match index {
//!             0 => Some(FieldRef::scalar(&self.nonce)),
//!             _ => None,
//!         }
//!     }
//! }
//! ```
//!
//! # Encoded sizes
//!
//! | Rust type | Encoded size |
//! |-----------|--------------|
//! | `u8`..`u64`, `i8`..`i64`, `f32`, `f64` | type width |
//! | `bool` | 1 |
//! | `[T; N]` | sum of elements, no prefix |
//! | `str`, `String` | 4-byte length + bytes |
//! | `[T]`, `Vec<T>` | 4-byte count + sum of elements |
//! | `BTreeMap<K, V>` | 4-byte count + sum of keys and values |

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::layout::PREFIX_SIZE;

/// Shape of a field as the encoder sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Fixed-size or self-contained value emitted as one annotation.
    Scalar,
    /// Nested record flattened into the parent's layout.
    Record,
    /// Variable-length sequence: a 4-byte count followed by its elements.
    Sequence,
}

/// Encoder directive attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldTag {
    #[default]
    Plain,
    /// Never serialized (encoder tag `-`).
    Skip,
    /// Dropped when empty (encoder tag `,omitempty`). Only legal on the last field.
    OmitEmpty,
}

impl FieldTag {
    /// Parse an encoder struct tag.
    ///
    /// Recognizes `-` and the `omitempty` option; everything else is `Plain`.
    ///
    /// ```
    /// use wiredump::layout::schema::FieldTag;
    ///
    /// assert_eq!(FieldTag::parse("-"), FieldTag::Skip);
    /// assert_eq!(FieldTag::parse(",omitempty"), FieldTag::OmitEmpty);
    /// assert_eq!(FieldTag::parse("txns,omitempty"), FieldTag::OmitEmpty);
    /// assert_eq!(FieldTag::parse("txns"), FieldTag::Plain);
    /// ```
    pub fn parse(tag: &str) -> FieldTag {
        let tag = tag.trim();
        if tag == "-" {
            return FieldTag::Skip;
        }
        if tag.split(',').skip(1).any(|opt| opt.trim() == "omitempty") {
            FieldTag::OmitEmpty
        } else {
            FieldTag::Plain
        }
    }
}

/// Whether a field belongs to the serialized contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    /// Internal field; the encoder never sees it.
    Private,
}

/// Descriptor for one declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: Cow<'static, str>,
    pub kind: FieldKind,
    pub tag: FieldTag,
    pub visibility: Visibility,
}

impl FieldDef {
    pub const fn new(
        name: &'static str,
        kind: FieldKind,
        tag: FieldTag,
        visibility: Visibility,
    ) -> Self {
        FieldDef {
            name: Cow::Borrowed(name),
            kind,
            tag,
            visibility,
        }
    }

    pub const fn scalar(name: &'static str) -> Self {
        Self::new(name, FieldKind::Scalar, FieldTag::Plain, Visibility::Public)
    }

    pub const fn record(name: &'static str) -> Self {
        Self::new(name, FieldKind::Record, FieldTag::Plain, Visibility::Public)
    }

    pub const fn sequence(name: &'static str) -> Self {
        Self::new(name, FieldKind::Sequence, FieldTag::Plain, Visibility::Public)
    }

    /// A trailing sequence dropped from the encoding when empty.
    pub const fn omit_empty(name: &'static str) -> Self {
        Self::new(name, FieldKind::Sequence, FieldTag::OmitEmpty, Visibility::Public)
    }

    /// A field tagged `-`.
    pub const fn skipped(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, FieldTag::Skip, Visibility::Public)
    }

    /// An internal field outside the serialized contract.
    pub const fn private(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, FieldTag::Plain, Visibility::Private)
    }

    /// Whether the encoder writes any bytes for this field at all.
    pub fn is_encoded(&self) -> bool {
        self.tag != FieldTag::Skip && self.visibility == Visibility::Public
    }
}

/// A value whose encoded layout can be walked field by field.
///
/// `schema()` and `field()` must agree: for every index in
/// `0..schema().len()`, `field(index)` returns a value of the declared
/// [`FieldKind`]. Skipped and private fields may return any value.
pub trait Record {
    /// Declared fields, in encoding order.
    fn schema(&self) -> &[FieldDef];

    /// Value of the field at `index`.
    fn field(&self, index: usize) -> Option<FieldRef<'_>>;
}

/// A variable-length sequence field.
pub trait Sequence {
    fn len(&self) -> usize;

    fn element(&self, index: usize) -> Option<ElementRef<'_>>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Value handed out by [`Record::field`].
#[derive(Clone, Copy)]
pub enum FieldRef<'a> {
    /// Encoded size of a scalar field.
    Scalar(usize),
    Record(&'a dyn Record),
    Sequence(&'a dyn Sequence),
}

impl<'a> FieldRef<'a> {
    /// A scalar field sized by its encoded form.
    pub fn scalar<T: EncodedSize + ?Sized>(value: &T) -> Self {
        FieldRef::Scalar(value.encoded_size())
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldRef::Scalar(_) => FieldKind::Scalar,
            FieldRef::Record(_) => FieldKind::Record,
            FieldRef::Sequence(_) => FieldKind::Sequence,
        }
    }
}

/// One element of a [`Sequence`].
#[derive(Clone, Copy)]
pub enum ElementRef<'a> {
    /// Encoded size of the element.
    Scalar(usize),
    Record(&'a dyn Record),
}

/// Types that can be elements of a `Vec`-backed [`Sequence`].
///
/// Primitive types are implemented here; record types implement it by
/// returning [`ElementRef::Record`].
pub trait Element {
    fn as_element(&self) -> ElementRef<'_>;
}

impl<T: Element> Sequence for [T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn element(&self, index: usize) -> Option<ElementRef<'_>> {
        self.get(index).map(Element::as_element)
    }
}

impl<T: Element> Sequence for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn element(&self, index: usize) -> Option<ElementRef<'_>> {
        self.as_slice().element(index)
    }
}

/// Byte size of a value in the encoder's output.
pub trait EncodedSize {
    fn encoded_size(&self) -> usize;
}

macro_rules! fixed_width {
    ($($t:ty),*) => {
        $(
            impl EncodedSize for $t {
                fn encoded_size(&self) -> usize {
                    std::mem::size_of::<$t>()
                }
            }

            impl Element for $t {
                fn as_element(&self) -> ElementRef<'_> {
                    ElementRef::Scalar(self.encoded_size())
                }
            }
        )*
    };
}

fixed_width!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl EncodedSize for bool {
    fn encoded_size(&self) -> usize {
        1
    }
}

impl Element for bool {
    fn as_element(&self) -> ElementRef<'_> {
        ElementRef::Scalar(1)
    }
}

impl EncodedSize for str {
    fn encoded_size(&self) -> usize {
        PREFIX_SIZE + self.len()
    }
}

impl EncodedSize for String {
    fn encoded_size(&self) -> usize {
        self.as_str().encoded_size()
    }
}

impl Element for String {
    fn as_element(&self) -> ElementRef<'_> {
        ElementRef::Scalar(self.encoded_size())
    }
}

impl<T: EncodedSize, const N: usize> EncodedSize for [T; N] {
    fn encoded_size(&self) -> usize {
        self.iter().map(EncodedSize::encoded_size).sum()
    }
}

impl<T: EncodedSize, const N: usize> Element for [T; N] {
    fn as_element(&self) -> ElementRef<'_> {
        ElementRef::Scalar(self.encoded_size())
    }
}

impl<T: EncodedSize> EncodedSize for [T] {
    fn encoded_size(&self) -> usize {
        PREFIX_SIZE + self.iter().map(EncodedSize::encoded_size).sum::<usize>()
    }
}

impl<T: EncodedSize> EncodedSize for Vec<T> {
    fn encoded_size(&self) -> usize {
        self.as_slice().encoded_size()
    }
}

impl<T: EncodedSize> Element for Vec<T> {
    fn as_element(&self) -> ElementRef<'_> {
        ElementRef::Scalar(self.encoded_size())
    }
}

impl<K: EncodedSize, V: EncodedSize> EncodedSize for BTreeMap<K, V> {
    fn encoded_size(&self) -> usize {
        PREFIX_SIZE
            + self
                .iter()
                .map(|(k, v)| k.encoded_size() + v.encoded_size())
                .sum::<usize>()
    }
}
