//! Structured Record Layout
//!
//! A [`ResourceFormat`] is the ordered list of attributes making up one
//! record (a vertex, a pixel, a generic buffer element) together with the
//! record stride.
//!
//! # Layout rules
//!
//! - Each appended attribute starts at `align(size, alignment)`.
//! - After each attribute, `size = align(offset + data_size, alignment)`.
//! - Updating an attribute in place re-packs every attribute after it; gaps
//!   are not preserved.
//!
//! ```rust,ignore
//! let mut format = ResourceFormat::new();
//! format.append_float("position", 3);
//! format.append_uint("color", 4, true);
//! assert_eq!(format.size(), 16);
//! ```

use std::fmt;

use crate::format::attribute::AttributeFormat;
use crate::format::type_constant::TypeConstant;
use crate::utils::interner::{self, StringId};

/// Rounds `value` up to the next multiple of `alignment`.
#[inline]
#[must_use]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        value
    } else {
        value.div_ceil(alignment) * alignment
    }
}

/// Ordered attribute layout of one structured record.
///
/// Equality and ordering compare `(size, alignment, attributes)`
/// lexicographically: reordering attributes yields a different format even
/// when the stride matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceFormat {
    size: usize,
    attribute_alignment: usize,
    attributes: Vec<AttributeFormat>,
}

impl Default for ResourceFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceFormat {
    /// Creates an empty format with byte alignment 1.
    #[must_use]
    pub fn new() -> Self {
        Self::with_alignment(1)
    }

    /// Creates an empty format aligning every attribute to `alignment` bytes.
    #[must_use]
    pub fn with_alignment(alignment: usize) -> Self {
        Self {
            size: 0,
            attribute_alignment: alignment.max(1),
            attributes: Vec::new(),
        }
    }

    /// Record stride in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    #[must_use]
    pub fn attribute_alignment(&self) -> usize {
        self.attribute_alignment
    }

    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &[AttributeFormat] {
        &self.attributes
    }

    #[inline]
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Changes the alignment and re-lays out every attribute.
    pub fn set_attribute_alignment(&mut self, alignment: usize) {
        self.attribute_alignment = alignment.max(1);
        self.relayout_from(0);
    }

    // === Building ===

    /// Appends an attribute at the end of the record and returns it with its
    /// assigned offset.
    pub fn append_attribute(
        &mut self,
        name: impl Into<StringId>,
        data_type: TypeConstant,
        num_values: u32,
        normalized: bool,
        internal_type: u32,
    ) -> &AttributeFormat {
        let attr = AttributeFormat::new(name.into(), data_type, num_values, normalized, internal_type);
        self.push_attribute(attr)
    }

    /// Appends a pre-built attribute, keeping its data size (which may be
    /// overridden for packed internal types) but assigning a fresh offset.
    pub fn append(&mut self, attr: AttributeFormat) -> &AttributeFormat {
        self.push_attribute(attr)
    }

    pub fn append_float(&mut self, name: impl Into<StringId>, num_values: u32) -> &AttributeFormat {
        self.append_attribute(name, TypeConstant::Float, num_values, false, 0)
    }

    pub fn append_half(&mut self, name: impl Into<StringId>, num_values: u32) -> &AttributeFormat {
        self.append_attribute(name, TypeConstant::Half, num_values, false, 0)
    }

    /// Appends `num_values` x `uint8`, optionally normalized to `[0, 1]`.
    pub fn append_uint(
        &mut self,
        name: impl Into<StringId>,
        num_values: u32,
        normalized: bool,
    ) -> &AttributeFormat {
        self.append_attribute(name, TypeConstant::UInt8, num_values, normalized, 0)
    }

    /// Appends `num_values` x `int8`, optionally normalized to `[-1, 1]`.
    pub fn append_int(
        &mut self,
        name: impl Into<StringId>,
        num_values: u32,
        normalized: bool,
    ) -> &AttributeFormat {
        self.append_attribute(name, TypeConstant::Int8, num_values, normalized, 0)
    }

    fn push_attribute(&mut self, attr: AttributeFormat) -> &AttributeFormat {
        let offset = align_up(self.size, self.attribute_alignment);
        let attr = attr.with_offset(offset);
        self.size = align_up(offset + attr.data_size(), self.attribute_alignment);
        self.attributes.push(attr);
        &self.attributes[self.attributes.len() - 1]
    }

    /// Replaces the attribute with the same name, re-packing all following
    /// attributes. Appends `attr` when no attribute has that name.
    pub fn update_attribute(&mut self, attr: AttributeFormat) -> &AttributeFormat {
        match self.attribute_location(attr.name_id()) {
            Some(location) => {
                let offset = self.attributes[location].offset();
                self.attributes[location] = attr.with_offset(offset);
                self.relayout_from(location + 1);
                &self.attributes[location]
            }
            None => self.push_attribute(attr),
        }
    }

    /// Recomputes offsets of attributes `start..` and the record size.
    fn relayout_from(&mut self, start: usize) {
        let alignment = self.attribute_alignment;
        let mut cursor = match start.checked_sub(1).and_then(|i| self.attributes.get(i)) {
            Some(prev) => align_up(prev.offset() + prev.data_size(), alignment),
            None => 0,
        };
        for attr in &mut self.attributes[start..] {
            let offset = align_up(cursor, alignment);
            *attr = attr.clone().with_offset(offset);
            cursor = align_up(offset + attr.data_size(), alignment);
        }
        self.size = cursor;
    }

    /// Concatenates `other`'s attributes after this format's, rebasing their
    /// offsets by this format's current size. The larger alignment wins.
    pub fn merge(&mut self, other: &ResourceFormat) {
        let base = self.size;
        self.attribute_alignment = self.attribute_alignment.max(other.attribute_alignment);
        self.attributes.extend(
            other
                .attributes
                .iter()
                .map(|attr| attr.clone().with_offset(base + attr.offset())),
        );
        self.size = align_up(base + other.size, self.attribute_alignment);
    }

    // === Lookup ===

    /// Position of the first attribute named `name`.
    #[must_use]
    pub fn attribute_location(&self, name: impl Into<StringId>) -> Option<usize> {
        let name = name.into();
        self.attributes.iter().position(|a| a.name_id() == name)
    }

    /// Location lookup that never interns: unknown strings are simply absent.
    #[must_use]
    pub fn attribute_location_by_str(&self, name: &str) -> Option<usize> {
        interner::get(name).and_then(|id| self.attribute_location(id))
    }

    #[must_use]
    pub fn has_attribute(&self, name: impl Into<StringId>) -> bool {
        self.attribute_location(name).is_some()
    }

    /// Returns the named attribute, or an empty sentinel (see
    /// [`AttributeFormat::is_empty`]) when it is absent.
    #[must_use]
    pub fn attribute(&self, name: impl Into<StringId>) -> AttributeFormat {
        self.attribute_location(name)
            .map(|location| self.attributes[location].clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn attribute_at(&self, location: usize) -> Option<&AttributeFormat> {
        self.attributes.get(location)
    }
}

impl fmt::Display for ResourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceFormat({} bytes", self.size)?;
        if self.attribute_alignment > 1 {
            write!(f, ", align {}", self.attribute_alignment)?;
        }
        f.write_str(")")?;
        for attr in &self.attributes {
            write!(f, "\n  {attr}")?;
        }
        Ok(())
    }
}
