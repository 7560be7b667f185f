//! Traversal frames.
//!
//! A [`LayoutFrame`] holds the position inside one record: which field is
//! next, and, while a sequence field is being expanded, which element.
//! Frames live on an explicit [`TraversalStack`]; descending into a nested
//! record pushes, finishing a record pops. There is no recursion.

use log::debug;

use crate::layout::schema::{FieldDef, Record};

/// How a frame was entered, which decides how its parent resumes after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOrigin {
    /// The top-level record.
    Root,
    /// A nested record field; the parent moves to its next field.
    Field,
    /// A record element of a sequence; the parent moves to the next element.
    Element,
}

/// Position state for one record being traversed.
pub struct LayoutFrame<'a> {
    pub value: &'a dyn Record,
    pub field_index: usize,
    pub field_count: usize,
    /// `Some(i)` while expanding element `i` of the current sequence field.
    pub sequence_index: Option<usize>,
    /// Qualified name prefix inherited from ancestors, e.g. `Header.`.
    pub path_prefix: String,
    pub origin: FrameOrigin,
}

impl<'a> LayoutFrame<'a> {
    pub fn root(value: &'a dyn Record) -> Self {
        Self::nested(value, String::new(), FrameOrigin::Root)
    }

    pub fn nested(value: &'a dyn Record, path_prefix: String, origin: FrameOrigin) -> Self {
        LayoutFrame {
            value,
            field_index: 0,
            field_count: value.schema().len(),
            sequence_index: None,
            path_prefix,
            origin,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.field_index >= self.field_count
    }

    /// Mark every remaining field as consumed.
    pub fn exhaust(&mut self) {
        self.field_index = self.field_count;
        self.sequence_index = None;
    }

    pub fn current_field(&self) -> Option<&'a FieldDef> {
        let value: &'a dyn Record = self.value;
        value.schema().get(self.field_index)
    }

    pub fn is_last_field(&self) -> bool {
        self.field_index + 1 == self.field_count
    }

    /// `prefix + name`.
    pub fn qualify(&self, name: &str) -> String {
        format!("{}{}", self.path_prefix, name)
    }

    /// Advance past a child frame that has just been popped.
    pub fn resume_after(&mut self, child: FrameOrigin) {
        match child {
            FrameOrigin::Element => {
                self.sequence_index = self.sequence_index.map(|i| i + 1);
            }
            FrameOrigin::Field | FrameOrigin::Root => {
                self.field_index += 1;
                self.sequence_index = None;
            }
        }
    }
}

/// LIFO stack of frames; the top is the frame being advanced.
pub struct TraversalStack<'a> {
    frames: Vec<LayoutFrame<'a>>,
}

impl<'a> TraversalStack<'a> {
    pub fn new(root: LayoutFrame<'a>) -> Self {
        TraversalStack { frames: vec![root] }
    }

    pub fn push(&mut self, frame: LayoutFrame<'a>) {
        debug!(
            "push frame '{}' ({} fields) at depth {}",
            frame.path_prefix,
            frame.field_count,
            self.frames.len()
        );
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<LayoutFrame<'a>> {
        let frame = self.frames.pop()?;
        debug!(
            "pop frame '{}' at depth {}",
            frame.path_prefix,
            self.frames.len()
        );
        Some(frame)
    }

    pub fn top(&self) -> Option<&LayoutFrame<'a>> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut LayoutFrame<'a>> {
        self.frames.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
