//! Custom Accessor Registry
//!
//! The standard strategies (plain cast, unsigned and signed normalization)
//! only cover layouts with one whole scalar per component. Layouts with an
//! internal type tag (packed or block-compressed) and scalar kinds without a
//! native arithmetic path (`half`) are served by [`CustomAttributeAccessor`]s
//! looked up here.
//!
//! The registry is an explicit context object. Build it once at startup and
//! pass it to the accessor factories:
//!
//! ```rust,ignore
//! let registry = AccessorRegistry::with_builtin();
//! let acc = ResourceAccessor::create(bytes, &format, &registry);
//! ```

use std::fmt;
use std::sync::Arc;

use half::f16;
use rustc_hash::FxHashMap;

use crate::accessor::convert::Normalization;
use crate::format::attribute::AttributeFormat;
use crate::format::pixel_format::InternalType;
use crate::format::type_constant::{Scalar, TypeConstant};

/// Component codec for a layout the standard strategies cannot express.
///
/// Components travel as `f64`. With [`Normalization::Unsigned`] or
/// [`Normalization::Signed`] the values are normalized (`[0, 1]` or `[-1, 1]`)
/// and are rescaled to the caller's integer range by the accessor.
pub trait CustomAttributeAccessor: Send + Sync + fmt::Debug {
    fn normalization(&self) -> Normalization {
        Normalization::None
    }

    /// Decodes up to `out.len()` components from `record` (the attribute's
    /// `data_size` bytes). Returns the number of components written.
    fn read_components(&self, attribute: &AttributeFormat, record: &[u8], out: &mut [f64]) -> usize;

    /// Encodes up to `values.len()` components into `record`. Returns the
    /// number of components consumed.
    fn write_components(&self, attribute: &AttributeFormat, record: &mut [u8], values: &[f64]) -> usize;
}

/// Builds a custom accessor for an attribute, or declines with `None`.
pub type AccessorFactory =
    Arc<dyn Fn(&AttributeFormat) -> Option<Arc<dyn CustomAttributeAccessor>> + Send + Sync>;

/// Maps internal type tags and scalar kinds to custom accessor factories.
#[derive(Clone, Default)]
pub struct AccessorRegistry {
    by_internal_type: FxHashMap<u32, AccessorFactory>,
    by_data_type: FxHashMap<TypeConstant, AccessorFactory>,
}

impl fmt::Debug for AccessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut internal: Vec<_> = self.by_internal_type.keys().copied().collect();
        internal.sort_unstable();
        let mut types: Vec<_> = self.by_data_type.keys().copied().collect();
        types.sort_unstable();
        f.debug_struct("AccessorRegistry")
            .field("internal_types", &internal)
            .field("data_types", &types)
            .finish()
    }
}

impl AccessorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the half-float type accessor and the packed
    /// RGB565 internal type accessor.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register_type_accessor(
            TypeConstant::Half,
            Arc::new(|_: &AttributeFormat| Some(Arc::new(HalfAccessor) as Arc<dyn CustomAttributeAccessor>)),
        );
        registry.register_accessor(
            u32::from(InternalType::Rgb565.id()),
            Arc::new(|attr: &AttributeFormat| {
                (attr.data_size() >= 2).then(|| Arc::new(Rgb565Accessor) as Arc<dyn CustomAttributeAccessor>)
            }),
        );
        registry
    }

    /// Registers a factory for attributes tagged with `internal_type`.
    /// Replaces any previous registration for the tag.
    pub fn register_accessor(&mut self, internal_type: u32, factory: AccessorFactory) {
        if self.by_internal_type.insert(internal_type, factory).is_some() {
            log::debug!("Replaced accessor for internal type {internal_type:#x}");
        }
    }

    #[must_use]
    pub fn has_accessor(&self, internal_type: u32) -> bool {
        self.by_internal_type.contains_key(&internal_type)
    }

    /// Registers a factory for untagged attributes of scalar kind `data_type`.
    /// Takes precedence over the standard strategies for that kind.
    pub fn register_type_accessor(&mut self, data_type: TypeConstant, factory: AccessorFactory) {
        if self.by_data_type.insert(data_type, factory).is_some() {
            log::debug!("Replaced accessor for data type {data_type}");
        }
    }

    #[must_use]
    pub fn has_type_accessor(&self, data_type: TypeConstant) -> bool {
        self.by_data_type.contains_key(&data_type)
    }

    /// Factory lookup for an attribute with a non-zero internal type.
    pub(crate) fn resolve_internal(&self, attr: &AttributeFormat) -> Option<Arc<dyn CustomAttributeAccessor>> {
        self.by_internal_type
            .get(&attr.internal_type())
            .and_then(|factory| factory(attr))
    }

    pub(crate) fn resolve_data_type(&self, attr: &AttributeFormat) -> Option<Arc<dyn CustomAttributeAccessor>> {
        self.by_data_type
            .get(&attr.data_type())
            .and_then(|factory| factory(attr))
    }
}

// ============================================================================
// Built-in accessors
// ============================================================================

/// IEEE 754 binary16 components.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalfAccessor;

impl CustomAttributeAccessor for HalfAccessor {
    fn read_components(&self, attribute: &AttributeFormat, record: &[u8], out: &mut [f64]) -> usize {
        let count = out.len().min(attribute.num_values() as usize).min(record.len() / 2);
        for (i, slot) in out.iter_mut().take(count).enumerate() {
            *slot = f16::read_ne(&record[i * 2..]).to_f64();
        }
        count
    }

    fn write_components(&self, attribute: &AttributeFormat, record: &mut [u8], values: &[f64]) -> usize {
        let count = values.len().min(attribute.num_values() as usize).min(record.len() / 2);
        for (i, value) in values.iter().take(count).enumerate() {
            f16::from_f64(*value).write_ne(&mut record[i * 2..]);
        }
        count
    }
}

/// 16-bit R5 G6 B5, red in the high bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rgb565Accessor;

const RGB565_FIELDS: [(u32, u16); 3] = [(11, 0x1F), (5, 0x3F), (0, 0x1F)];

impl CustomAttributeAccessor for Rgb565Accessor {
    fn normalization(&self) -> Normalization {
        Normalization::Unsigned
    }

    fn read_components(&self, _attribute: &AttributeFormat, record: &[u8], out: &mut [f64]) -> usize {
        let packed = u16::read_ne(record);
        let count = out.len().min(RGB565_FIELDS.len());
        for (slot, (shift, mask)) in out.iter_mut().zip(RGB565_FIELDS).take(count) {
            *slot = f64::from((packed >> shift) & mask) / f64::from(mask);
        }
        count
    }

    fn write_components(&self, _attribute: &AttributeFormat, record: &mut [u8], values: &[f64]) -> usize {
        let mut packed = u16::read_ne(record);
        let count = values.len().min(RGB565_FIELDS.len());
        for (value, (shift, mask)) in values.iter().zip(RGB565_FIELDS).take(count) {
            let field = (value.clamp(0.0, 1.0) * f64::from(mask)).round() as u16;
            packed = (packed & !(mask << shift)) | (field << shift);
        }
        packed.write_ne(record);
        count
    }
}
