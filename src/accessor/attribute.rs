//! Typed access to one attribute of strided records.
//!
//! [`AttributeCodec`] picks a conversion strategy for an [`AttributeFormat`]
//! once; reads and writes are then generic over the caller's scalar type and
//! monomorphized per (stored type, requested type) pair.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::accessor::convert::{self, Normalization};
use crate::accessor::registry::{AccessorRegistry, CustomAttributeAccessor};
use crate::errors::{ResourceError, Result};
use crate::format::attribute::AttributeFormat;
use crate::format::type_constant::{Scalar, TypeConstant};

/// Runs `$body` with `$T` aliased to the Rust type of a stored scalar kind.
macro_rules! with_stored_type {
    ($tc:expr, $T:ident => $body:expr) => {
        match $tc {
            TypeConstant::UInt8 => {
                type $T = u8;
                $body
            }
            TypeConstant::UInt16 => {
                type $T = u16;
                $body
            }
            TypeConstant::UInt32 => {
                type $T = u32;
                $body
            }
            TypeConstant::UInt64 => {
                type $T = u64;
                $body
            }
            TypeConstant::Int8 => {
                type $T = i8;
                $body
            }
            TypeConstant::Int16 => {
                type $T = i16;
                $body
            }
            TypeConstant::Int32 => {
                type $T = i32;
                $body
            }
            TypeConstant::Int64 => {
                type $T = i64;
                $body
            }
            TypeConstant::Float => {
                type $T = f32;
                $body
            }
            TypeConstant::Double => {
                type $T = f64;
                $body
            }
            TypeConstant::Half => {
                type $T = half::f16;
                $body
            }
            TypeConstant::Bool => {
                type $T = bool;
                $body
            }
        }
    };
}

/// Conversion strategy of an attribute.
#[derive(Clone)]
pub enum AccessorKind {
    /// Plain numeric cast in both directions.
    Standard,
    /// Stored unsigned integers map to `[0, 1]`.
    UnsignedNormalized,
    /// Stored signed integers map to `[-1, 1]`.
    SignedNormalized,
    /// Registered codec for packed or non-arithmetic layouts.
    Custom(Arc<dyn CustomAttributeAccessor>),
}

impl fmt::Debug for AccessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("Standard"),
            Self::UnsignedNormalized => f.write_str("UnsignedNormalized"),
            Self::SignedNormalized => f.write_str("SignedNormalized"),
            Self::Custom(custom) => f.debug_tuple("Custom").field(custom).finish(),
        }
    }
}

impl AccessorKind {
    fn normalization(&self) -> Normalization {
        match self {
            Self::Standard => Normalization::None,
            Self::UnsignedNormalized => Normalization::Unsigned,
            Self::SignedNormalized => Normalization::Signed,
            Self::Custom(custom) => custom.normalization(),
        }
    }
}

/// An attribute format bound to its conversion strategy.
///
/// Operates on one record slice at a time: `record` always starts at the
/// attribute's first byte.
#[derive(Debug, Clone)]
pub struct AttributeCodec {
    attribute: AttributeFormat,
    kind: AccessorKind,
}

impl AttributeCodec {
    /// Selects the strategy for `attribute`.
    ///
    /// Lookup order: internal type registrations, scalar kind registrations,
    /// then the standard strategies switched on `(normalized, data_type)`.
    /// Returns `None` (with a warning) when nothing can serve the attribute,
    /// e.g. an unregistered internal type or `half` without a handler.
    #[must_use]
    pub fn create(attribute: &AttributeFormat, registry: &AccessorRegistry) -> Option<Self> {
        let kind = if attribute.internal_type() != 0 {
            let Some(custom) = registry.resolve_internal(attribute) else {
                log::warn!(
                    "No accessor registered for internal type {:#x} of attribute '{}'",
                    attribute.internal_type(),
                    attribute.name()
                );
                return None;
            };
            AccessorKind::Custom(custom)
        } else if let Some(custom) = registry.resolve_data_type(attribute) {
            AccessorKind::Custom(custom)
        } else {
            match (attribute.is_normalized(), attribute.data_type()) {
                (_, TypeConstant::Half) => {
                    log::warn!(
                        "No accessor registered for half-float attribute '{}'",
                        attribute.name()
                    );
                    return None;
                }
                (
                    true,
                    TypeConstant::UInt8 | TypeConstant::UInt16 | TypeConstant::UInt32 | TypeConstant::UInt64,
                ) => AccessorKind::UnsignedNormalized,
                (true, TypeConstant::Int8 | TypeConstant::Int16 | TypeConstant::Int32 | TypeConstant::Int64) => {
                    AccessorKind::SignedNormalized
                }
                _ => AccessorKind::Standard,
            }
        };
        Some(Self {
            attribute: attribute.clone(),
            kind,
        })
    }

    #[inline]
    #[must_use]
    pub fn attribute(&self) -> &AttributeFormat {
        &self.attribute
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> &AccessorKind {
        &self.kind
    }

    /// Reads up to `out.len()` components. Returns the number read.
    ///
    /// Only the first `data_size` bytes of `record` are touched, so an
    /// attribute whose `data_size` was shrunk yields fewer components.
    pub fn read_record<S: Scalar>(&self, record: &[u8], out: &mut [S]) -> usize {
        let count = out.len().min(self.attribute.num_values() as usize);
        match &self.kind {
            AccessorKind::Custom(custom) => {
                let mut tmp: SmallVec<[f64; 4]> = SmallVec::from_elem(0.0, count);
                let record = &record[..self.attribute.data_size()];
                let read = custom.read_components(&self.attribute, record, &mut tmp).min(count);
                let mode = custom.normalization();
                for (slot, value) in out.iter_mut().zip(&tmp[..read]) {
                    *slot = convert::from_f64(*value, mode);
                }
                read
            }
            kind => {
                let mode = kind.normalization();
                let record = &record[..self.attribute.data_size().min(record.len())];
                with_stored_type!(self.attribute.data_type(), T => {
                    let width = std::mem::size_of::<T>();
                    let count = count.min(record.len() / width);
                    for (slot, chunk) in out.iter_mut().zip(record.chunks_exact(width)).take(count) {
                        *slot = convert::convert_read::<T, S>(T::read_ne(chunk), mode);
                    }
                    count
                })
            }
        }
    }

    /// Writes up to `values.len()` components. Returns the number written.
    ///
    /// Only the first `data_size` bytes of `record` are touched.
    pub fn write_record<S: Scalar>(&self, record: &mut [u8], values: &[S]) -> usize {
        let count = values.len().min(self.attribute.num_values() as usize);
        match &self.kind {
            AccessorKind::Custom(custom) => {
                let mode = custom.normalization();
                let tmp: SmallVec<[f64; 4]> = values[..count].iter().map(|v| convert::to_f64(*v, mode)).collect();
                let record = &mut record[..self.attribute.data_size()];
                custom.write_components(&self.attribute, record, &tmp)
            }
            kind => {
                let mode = kind.normalization();
                let size = self.attribute.data_size().min(record.len());
                let record = &mut record[..size];
                with_stored_type!(self.attribute.data_type(), T => {
                    let width = std::mem::size_of::<T>();
                    let count = count.min(record.len() / width);
                    for (value, chunk) in values.iter().zip(record.chunks_exact_mut(width)).take(count) {
                        let stored: T = convert::convert_write::<S, T>(*value, mode);
                        stored.write_ne(chunk);
                    }
                    count
                })
            }
        }
    }
}

/// Typed view of one attribute across strided records in `data`.
///
/// `B` is any byte store: `&[u8]` for read-only views, `&mut [u8]` or
/// `Vec<u8>` for read/write views.
#[derive(Debug, Clone)]
pub struct AttributeAccessor<B> {
    data: B,
    stride: usize,
    codec: AttributeCodec,
}

impl<B: AsRef<[u8]>> AttributeAccessor<B> {
    /// Creates an accessor for `attribute` over records `stride` bytes apart.
    ///
    /// Returns `None` (with a warning) when no strategy matches the attribute.
    #[must_use]
    pub fn create(data: B, stride: usize, attribute: &AttributeFormat, registry: &AccessorRegistry) -> Option<Self> {
        let codec = AttributeCodec::create(attribute, registry)?;
        Some(Self { data, stride, codec })
    }

    #[inline]
    #[must_use]
    pub fn attribute(&self) -> &AttributeFormat {
        self.codec.attribute()
    }

    #[inline]
    #[must_use]
    pub fn codec(&self) -> &AttributeCodec {
        &self.codec
    }

    #[inline]
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of records whose start lies inside the store.
    ///
    /// Rounds up, so a trailing partial record is counted. This differs from
    /// `ResourceAccessor::element_count`, which counts only whole records.
    #[must_use]
    pub fn record_starts(&self) -> usize {
        let len = self.data.as_ref().len();
        if self.stride == 0 {
            usize::from(len > 0)
        } else {
            len.div_ceil(self.stride)
        }
    }

    /// Checks that record `index` starts inside the store and that the
    /// attribute's bytes of that record end inside it.
    pub fn assert_range(&self, index: usize) -> Result<usize> {
        let len = self.data.as_ref().len();
        let start = index.saturating_mul(self.stride);
        if start >= len {
            return Err(ResourceError::IndexOutOfRange {
                index,
                count: self.record_starts(),
            });
        }
        let begin = start + self.attribute().offset();
        let end = begin + self.attribute().data_size();
        if end > len {
            return Err(ResourceError::RecordOverflow { index, end, len });
        }
        Ok(begin)
    }

    /// Reads up to `out.len()` components of record `index`.
    pub fn read_values<S: Scalar>(&self, index: usize, out: &mut [S]) -> Result<usize> {
        let begin = self.assert_range(index)?;
        Ok(self.codec.read_record(&self.data.as_ref()[begin..], out))
    }

    /// Reads the first component of record `index`.
    pub fn read_value<S: Scalar>(&self, index: usize) -> Result<S> {
        let mut out = [S::default()];
        self.read_values(index, &mut out)?;
        Ok(out[0])
    }

    /// Reads all components of record `index`.
    pub fn read_values_vec<S: Scalar>(&self, index: usize) -> Result<Vec<S>> {
        let mut out = vec![S::default(); self.attribute().num_values() as usize];
        let read = self.read_values(index, &mut out)?;
        out.truncate(read);
        Ok(out)
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    pub fn into_inner(self) -> B {
        self.data
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> AttributeAccessor<B> {
    /// Writes up to `values.len()` components of record `index`.
    pub fn write_values<S: Scalar>(&mut self, index: usize, values: &[S]) -> Result<usize> {
        let begin = self.assert_range(index)?;
        Ok(self.codec.write_record(&mut self.data.as_mut()[begin..], values))
    }

    /// Writes the first component of record `index`.
    pub fn write_value<S: Scalar>(&mut self, index: usize, value: S) -> Result<()> {
        self.write_values(index, &[value]).map(|_| ())
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data.as_mut()
    }
}
