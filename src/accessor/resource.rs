//! Record-level access to a structured buffer.
//!
//! A [`ResourceAccessor`] binds one [`AttributeCodec`] per attribute of a
//! [`ResourceFormat`] to a contiguous byte store. Records are addressed by
//! index, attributes by location or name.
//!
//! # Boundary behavior
//!
//! - `element_count = len / stride` truncates: a trailing partial record is
//!   not addressable.
//! - Reads by unknown name fail with [`ResourceError::UnknownAttribute`];
//!   writes by unknown name are ignored, which keeps optional-attribute
//!   write paths simple.

use glam::{Vec3, Vec4};

use crate::accessor::attribute::AttributeCodec;
use crate::accessor::registry::AccessorRegistry;
use crate::errors::{ResourceError, Result};
use crate::format::resource_format::ResourceFormat;
use crate::format::type_constant::Scalar;

#[derive(Debug, Clone)]
pub struct ResourceAccessor<B> {
    data: B,
    format: ResourceFormat,
    codecs: Vec<Option<AttributeCodec>>,
    element_count: usize,
}

impl<B: AsRef<[u8]>> ResourceAccessor<B> {
    /// Binds `format` to `data`.
    ///
    /// Attributes without a matching strategy stay unreadable (a warning is
    /// logged by the codec factory); every other attribute remains usable.
    #[must_use]
    pub fn create(data: B, format: &ResourceFormat, registry: &AccessorRegistry) -> Self {
        let codecs = format
            .attributes()
            .iter()
            .map(|attr| AttributeCodec::create(attr, registry))
            .collect();
        let element_count = data.as_ref().len().checked_div(format.size()).unwrap_or(0);
        Self {
            data,
            format: format.clone(),
            codecs,
            element_count,
        }
    }

    #[inline]
    #[must_use]
    pub fn format(&self) -> &ResourceFormat {
        &self.format
    }

    /// Number of whole records in the store.
    #[inline]
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Location of the attribute named `name`, if present.
    #[must_use]
    pub fn location(&self, name: &str) -> Option<usize> {
        self.format.attribute_location_by_str(name)
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    pub fn into_inner(self) -> B {
        self.data
    }

    // === Range checks ===

    pub fn assert_location(&self, location: usize) -> Result<&AttributeCodec> {
        match self.codecs.get(location) {
            Some(Some(codec)) => Ok(codec),
            Some(None) => Err(ResourceError::NoAccessor(
                self.format.attributes()[location].name().to_string(),
            )),
            None => Err(ResourceError::LocationOutOfRange {
                location,
                count: self.codecs.len(),
            }),
        }
    }

    /// Checks record and attribute bounds; returns the attribute's codec and
    /// the byte offset of its data in record `index`.
    pub fn assert_range(&self, index: usize, location: usize) -> Result<(&AttributeCodec, usize)> {
        let codec = self.assert_location(location)?;
        if index >= self.element_count {
            return Err(ResourceError::IndexOutOfRange {
                index,
                count: self.element_count,
            });
        }
        Ok((codec, index * self.format.size() + codec.attribute().offset()))
    }

    fn require_location(&self, name: &str) -> Result<usize> {
        self.location(name)
            .ok_or_else(|| ResourceError::UnknownAttribute(name.to_string()))
    }

    // === Typed reads ===

    /// Reads up to `out.len()` components of attribute `location` of record `index`.
    pub fn read_values<S: Scalar>(&self, index: usize, location: usize, out: &mut [S]) -> Result<usize> {
        let (codec, begin) = self.assert_range(index, location)?;
        Ok(codec.read_record(&self.data.as_ref()[begin..], out))
    }

    pub fn read_value<S: Scalar>(&self, index: usize, location: usize) -> Result<S> {
        let mut out = [S::default()];
        self.read_values(index, location, &mut out)?;
        Ok(out[0])
    }

    pub fn read_values_vec<S: Scalar>(&self, index: usize, location: usize) -> Result<Vec<S>> {
        let (codec, _) = self.assert_range(index, location)?;
        let mut out = vec![S::default(); codec.attribute().num_values() as usize];
        let read = self.read_values(index, location, &mut out)?;
        out.truncate(read);
        Ok(out)
    }

    pub fn read_values_by_name<S: Scalar>(&self, index: usize, name: &str, out: &mut [S]) -> Result<usize> {
        let location = self.require_location(name)?;
        self.read_values(index, location, out)
    }

    pub fn read_value_by_name<S: Scalar>(&self, index: usize, name: &str) -> Result<S> {
        let location = self.require_location(name)?;
        self.read_value(index, location)
    }

    /// Reads up to three components as a vector; missing components are zero.
    pub fn read_vec3(&self, index: usize, name: &str) -> Result<Vec3> {
        let mut out = [0.0f32; 3];
        self.read_values_by_name(index, name, &mut out)?;
        Ok(Vec3::from_array(out))
    }

    /// Reads up to four components as a vector; missing components are zero.
    pub fn read_vec4(&self, index: usize, name: &str) -> Result<Vec4> {
        let mut out = [0.0f32; 4];
        self.read_values_by_name(index, name, &mut out)?;
        Ok(Vec4::from_array(out))
    }

    // === Raw access ===

    /// Bytes of record `index`, bypassing attribute typing.
    pub fn read_raw(&self, index: usize) -> Result<&[u8]> {
        if index >= self.element_count {
            return Err(ResourceError::IndexOutOfRange {
                index,
                count: self.element_count,
            });
        }
        let stride = self.format.size();
        Ok(&self.data.as_ref()[index * stride..(index + 1) * stride])
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ResourceAccessor<B> {
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data.as_mut()
    }

    // === Typed writes ===

    /// Writes up to `values.len()` components of attribute `location` of record `index`.
    pub fn write_values<S: Scalar>(&mut self, index: usize, location: usize, values: &[S]) -> Result<usize> {
        let (_, begin) = self.assert_range(index, location)?;
        let written = match &self.codecs[location] {
            Some(codec) => codec.write_record(&mut self.data.as_mut()[begin..], values),
            None => 0,
        };
        Ok(written)
    }

    pub fn write_value<S: Scalar>(&mut self, index: usize, location: usize, value: S) -> Result<()> {
        self.write_values(index, location, &[value]).map(|_| ())
    }

    /// Writes by name. Unknown names are ignored and report zero components.
    pub fn write_values_by_name<S: Scalar>(&mut self, index: usize, name: &str, values: &[S]) -> Result<usize> {
        match self.location(name) {
            Some(location) => self.write_values(index, location, values),
            None => Ok(0),
        }
    }

    pub fn write_value_by_name<S: Scalar>(&mut self, index: usize, name: &str, value: S) -> Result<()> {
        self.write_values_by_name(index, name, &[value]).map(|_| ())
    }

    /// Overwrites record `index` with `bytes`, which must be exactly one stride long.
    pub fn write_raw(&mut self, index: usize, bytes: &[u8]) -> Result<()> {
        let stride = self.format.size();
        if bytes.len() != stride {
            return Err(ResourceError::ElementSizeMismatch {
                expected: stride,
                actual: bytes.len(),
            });
        }
        if index >= self.element_count {
            return Err(ResourceError::IndexOutOfRange {
                index,
                count: self.element_count,
            });
        }
        self.data.as_mut()[index * stride..(index + 1) * stride].copy_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex_format() -> ResourceFormat {
        let mut format = ResourceFormat::new();
        format.append_float("position", 3);
        format.append_uint("color", 4, true);
        format
    }

    #[test]
    fn test_element_count_truncates() {
        let format = vertex_format();
        let acc = ResourceAccessor::create(vec![0u8; 16 * 3 + 5], &format, &AccessorRegistry::new());
        assert_eq!(acc.element_count(), 3);
        assert!(acc.read_raw(3).is_err());
    }

    #[test]
    fn test_unknown_name_write_is_ignored() {
        let format = vertex_format();
        let mut acc = ResourceAccessor::create(vec![0u8; 32], &format, &AccessorRegistry::new());
        assert_eq!(acc.write_values_by_name(0, "tangent", &[1.0f32]), Ok(0));
        assert!(acc.data().iter().all(|b| *b == 0));
        assert!(matches!(
            acc.read_value_by_name::<f32>(0, "tangent"),
            Err(ResourceError::UnknownAttribute(_))
        ));
    }

    #[test]
    fn test_location_out_of_range() {
        let format = vertex_format();
        let acc = ResourceAccessor::create(vec![0u8; 32], &format, &AccessorRegistry::new());
        assert_eq!(
            acc.read_value::<f32>(0, 2),
            Err(ResourceError::LocationOutOfRange { location: 2, count: 2 })
        );
    }
}
