use std::fmt;

use crate::format::type_constant::TypeConstant;
use crate::utils::interner::StringId;

/// One named, typed field of a structured record.
///
/// Attributes are placed by [`ResourceFormat`](super::ResourceFormat), which
/// assigns the byte offset. A default-constructed attribute has zero
/// components and acts as the "not found" sentinel of attribute lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeFormat {
    name_id: StringId,
    data_type: TypeConstant,
    num_values: u32,
    normalized: bool,
    internal_type: u32,
    data_size: usize,
    offset: usize,
}

impl Default for AttributeFormat {
    fn default() -> Self {
        Self {
            name_id: StringId::new(""),
            data_type: TypeConstant::UInt8,
            num_values: 0,
            normalized: false,
            internal_type: 0,
            data_size: 0,
            offset: 0,
        }
    }
}

impl AttributeFormat {
    /// Creates an unplaced attribute. The data size is derived from the
    /// component count and the byte width of `data_type`.
    #[must_use]
    pub fn new(
        name_id: StringId,
        data_type: TypeConstant,
        num_values: u32,
        normalized: bool,
        internal_type: u32,
    ) -> Self {
        Self {
            name_id,
            data_type,
            num_values,
            normalized,
            internal_type,
            data_size: num_values as usize * data_type.num_bytes(),
            offset: 0,
        }
    }

    /// Overrides the derived data size, for packed internal types whose
    /// components do not occupy whole scalars.
    #[must_use]
    pub fn with_data_size(mut self, data_size: usize) -> Self {
        self.data_size = data_size;
        self
    }

    #[must_use]
    pub(crate) fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    #[inline]
    #[must_use]
    pub fn name_id(&self) -> StringId {
        self.name_id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name_id.as_str()
    }

    #[inline]
    #[must_use]
    pub fn data_type(&self) -> TypeConstant {
        self.data_type
    }

    /// Number of components (1..4 for typical vertex data).
    #[inline]
    #[must_use]
    pub fn num_values(&self) -> u32 {
        self.num_values
    }

    #[inline]
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Opaque layout tag, `0` for plain scalar layouts.
    #[inline]
    #[must_use]
    pub fn internal_type(&self) -> u32 {
        self.internal_type
    }

    /// Byte size of the attribute within one record.
    #[inline]
    #[must_use]
    pub fn data_size(&self) -> usize {
        self.data_size
    }

    /// Byte offset within the owning record.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// `true` for the sentinel returned by failed lookups.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_values == 0
    }
}

impl fmt::Display for AttributeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} x {}", self.name(), self.num_values, self.data_type)?;
        if self.normalized {
            f.write_str(" (normalized)")?;
        }
        if self.internal_type != 0 {
            write!(f, " [internal {:#x}]", self.internal_type)?;
        }
        write!(f, " @{}", self.offset)
    }
}
