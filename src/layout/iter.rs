//! Lazy layout traversal matching the binary encoder.
//!
//! [`EncoderLayoutIterator`] yields one [`Annotation`] per pull, in the exact
//! order the encoder writes bytes:
//!
//! 1. `Length` (4 bytes), the total payload length.
//! 2. `Prefix` (4 bytes), the message type.
//! 3. The record's fields in declaration order, depth first:
//!    - fields tagged `-` and private fields contribute nothing;
//!    - scalars emit one annotation sized by their encoded form;
//!    - nested records are flattened, names qualified as `Outer.Inner`;
//!    - sequences emit `Name#length` (4 bytes) then `Name[i]` per element,
//!      record elements being flattened as `Name[i].Field`;
//!    - an empty trailing sequence tagged `omitempty` ends the record with
//!      no annotation at all.
//!
//! The iterator is single use. Once it returns `None` or an error it stays
//! finished; walk the record again with a fresh iterator.

use std::iter::FusedIterator;

use log::{trace, warn};

use crate::layout::frame::{FrameOrigin, LayoutFrame, TraversalStack};
use crate::layout::schema::{ElementRef, FieldRef, FieldTag, Record};
use crate::layout::{Annotation, FRAMING_LENGTH, FRAMING_PREFIX, PREFIX_SIZE};
use crate::DumpError;

/// Outcome of advancing the top frame by one field or element.
enum Step<'a> {
    Emit(Annotation),
    Push(LayoutFrame<'a>),
    Continue,
}

/// Pull-based annotation stream over a borrowed record.
pub struct EncoderLayoutIterator<'a> {
    stack: TraversalStack<'a>,
    length_emitted: bool,
    prefix_emitted: bool,
    finished: bool,
}

impl<'a> EncoderLayoutIterator<'a> {
    /// Iterate over a framed message: `Length`, `Prefix`, then the fields.
    pub fn new(record: &'a dyn Record) -> Self {
        EncoderLayoutIterator {
            stack: TraversalStack::new(LayoutFrame::root(record)),
            length_emitted: false,
            prefix_emitted: false,
            finished: false,
        }
    }

    /// Iterate over a bare encoding with no `Length`/`Prefix` framing.
    pub fn without_framing(record: &'a dyn Record) -> Self {
        EncoderLayoutIterator {
            length_emitted: true,
            prefix_emitted: true,
            ..Self::new(record)
        }
    }

    /// Number of frames currently on the traversal stack.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Pull the next annotation. `Ok(None)` marks the end of the stream.
    pub fn next_annotation(&mut self) -> Result<Option<Annotation>, DumpError> {
        if self.finished {
            return Ok(None);
        }
        if !self.length_emitted {
            self.length_emitted = true;
            return Ok(Some(Annotation::new(FRAMING_LENGTH, PREFIX_SIZE)));
        }
        if !self.prefix_emitted {
            self.prefix_emitted = true;
            return Ok(Some(Annotation::new(FRAMING_PREFIX, PREFIX_SIZE)));
        }

        match self.advance() {
            Ok(Some(annotation)) => {
                trace!("annotation {} ({} bytes)", annotation.name, annotation.size);
                Ok(Some(annotation))
            }
            Ok(None) => {
                self.finished = true;
                Ok(None)
            }
            Err(e) => {
                self.finished = true;
                Err(e)
            }
        }
    }

    fn advance(&mut self) -> Result<Option<Annotation>, DumpError> {
        loop {
            let exhausted = match self.stack.top() {
                Some(top) => top.is_exhausted(),
                None => return Ok(None),
            };

            if exhausted {
                let done = self.stack.pop().ok_or_else(|| {
                    DumpError::TraversalUnderflow("pop from an empty frame stack".to_string())
                })?;
                match self.stack.top_mut() {
                    Some(parent) => parent.resume_after(done.origin),
                    None => return Ok(None),
                }
                continue;
            }

            match self.step()? {
                Step::Emit(annotation) => return Ok(Some(annotation)),
                Step::Push(frame) => self.stack.push(frame),
                Step::Continue => {}
            }
        }
    }

    fn step(&mut self) -> Result<Step<'a>, DumpError> {
        let frame = self.stack.top_mut().ok_or_else(|| {
            DumpError::TraversalUnderflow("advance with an empty frame stack".to_string())
        })?;
        let record: &'a dyn Record = frame.value;
        let index = frame.field_index;

        let def = frame.current_field().ok_or_else(|| {
            DumpError::TraversalUnderflow(format!(
                "field {} of '{}' is past the declared {} fields",
                index, frame.path_prefix, frame.field_count
            ))
        })?;

        if !def.is_encoded() {
            frame.field_index += 1;
            return Ok(Step::Continue);
        }

        let value = record.field(index).ok_or_else(|| {
            DumpError::TraversalUnderflow(format!(
                "record has no value for declared field {}",
                frame.qualify(&def.name)
            ))
        })?;

        if value.kind() != def.kind {
            return Err(DumpError::TraversalUnderflow(format!(
                "field {} is declared {:?} but holds {:?}",
                frame.qualify(&def.name),
                def.kind,
                value.kind()
            )));
        }

        if def.tag == FieldTag::OmitEmpty && frame.sequence_index.is_none() {
            let name = frame.qualify(&def.name);
            if !frame.is_last_field() {
                warn!("omitempty on non-terminal field {}", name);
                return Err(DumpError::InvalidSchema(format!(
                    "omitempty is only allowed on the last field, found on {}",
                    name
                )));
            }
            match value {
                FieldRef::Sequence(seq) if seq.is_empty() => {
                    frame.exhaust();
                    return Ok(Step::Continue);
                }
                FieldRef::Sequence(seq) => {
                    warn!("omitempty field {} holds {} elements", name, seq.len());
                    return Err(DumpError::InvalidSchema(format!(
                        "omitempty field {} is not empty ({} elements)",
                        name,
                        seq.len()
                    )));
                }
                _ => {
                    return Err(DumpError::InvalidSchema(format!(
                        "omitempty is only allowed on sequence fields, found on {}",
                        name
                    )));
                }
            }
        }

        match value {
            FieldRef::Scalar(size) => {
                frame.field_index += 1;
                Ok(Step::Emit(Annotation::new(frame.qualify(&def.name), size)))
            }
            FieldRef::Record(child) => Ok(Step::Push(LayoutFrame::nested(
                child,
                format!("{}.", frame.qualify(&def.name)),
                FrameOrigin::Field,
            ))),
            FieldRef::Sequence(seq) => match frame.sequence_index {
                None => {
                    frame.sequence_index = Some(0);
                    Ok(Step::Emit(Annotation::new(
                        format!("{}#length", frame.qualify(&def.name)),
                        PREFIX_SIZE,
                    )))
                }
                Some(i) if i < seq.len() => {
                    let name = format!("{}[{}]", frame.qualify(&def.name), i);
                    match seq.element(i) {
                        Some(ElementRef::Scalar(size)) => {
                            frame.sequence_index = Some(i + 1);
                            Ok(Step::Emit(Annotation::new(name, size)))
                        }
                        Some(ElementRef::Record(child)) => Ok(Step::Push(LayoutFrame::nested(
                            child,
                            format!("{}.", name),
                            FrameOrigin::Element,
                        ))),
                        None => Err(DumpError::TraversalUnderflow(format!(
                            "sequence has no element {} (length {})",
                            name,
                            seq.len()
                        ))),
                    }
                }
                Some(_) => {
                    frame.sequence_index = None;
                    frame.field_index += 1;
                    Ok(Step::Continue)
                }
            },
        }
    }
}

impl Iterator for EncoderLayoutIterator<'_> {
    type Item = Result<Annotation, DumpError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_annotation().transpose()
    }
}

impl FusedIterator for EncoderLayoutIterator<'_> {}

/// Collect the full framed layout of a record.
pub fn layout_of(record: &dyn Record) -> Result<Vec<Annotation>, DumpError> {
    EncoderLayoutIterator::new(record).collect()
}

/// Encoded size of a record's fields, framing excluded.
///
/// Fails with [`DumpError::Argument`] if the field sizes overflow `usize`.
pub fn encoded_len(record: &dyn Record) -> Result<usize, DumpError> {
    EncoderLayoutIterator::without_framing(record).try_fold(0usize, |total, a| {
        let a = a?;
        total.checked_add(a.size).ok_or_else(|| {
            DumpError::Argument(format!("Encoded length overflows at field {}", a.name))
        })
    })
}
