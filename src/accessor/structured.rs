//! Whole-record typed views.
//!
//! When a `#[repr(C)]` Rust struct mirrors a [`ResourceFormat`] exactly,
//! records can be moved as values instead of attribute by attribute.

use std::marker::PhantomData;

use bytemuck::Pod;

use crate::errors::{ResourceError, Result};
use crate::format::resource_format::ResourceFormat;

/// Reads and writes records of a buffer as `T`.
///
/// The format stride must equal `size_of::<T>()`. Records need not be
/// aligned for `T`.
#[derive(Debug)]
pub struct StructuredAccessor<T, B> {
    data: B,
    element_count: usize,
    _marker: PhantomData<T>,
}

impl<T: Pod, B: AsRef<[u8]>> StructuredAccessor<T, B> {
    pub fn new(data: B, format: &ResourceFormat) -> Result<Self> {
        let size = std::mem::size_of::<T>();
        if format.size() != size || size == 0 {
            return Err(ResourceError::ElementSizeMismatch {
                expected: format.size(),
                actual: size,
            });
        }
        let element_count = data.as_ref().len() / size;
        Ok(Self {
            data,
            element_count,
            _marker: PhantomData,
        })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.element_count
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.element_count == 0
    }

    fn byte_range(&self, index: usize) -> Result<std::ops::Range<usize>> {
        if index >= self.element_count {
            return Err(ResourceError::IndexOutOfRange {
                index,
                count: self.element_count,
            });
        }
        let size = std::mem::size_of::<T>();
        Ok(index * size..(index + 1) * size)
    }

    pub fn get(&self, index: usize) -> Result<T> {
        let range = self.byte_range(index)?;
        Ok(bytemuck::pod_read_unaligned(&self.data.as_ref()[range]))
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.data
            .as_ref()
            .chunks_exact(std::mem::size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
    }

    pub fn into_inner(self) -> B {
        self.data
    }
}

impl<T: Pod, B: AsRef<[u8]> + AsMut<[u8]>> StructuredAccessor<T, B> {
    pub fn set(&mut self, index: usize, value: &T) -> Result<()> {
        let range = self.byte_range(index)?;
        self.data.as_mut()[range].copy_from_slice(bytemuck::bytes_of(value));
        Ok(())
    }
}
