//! Scalar Type Constants
//!
//! [`TypeConstant`] enumerates the primitive scalar kinds a resource attribute
//! can store. [`Scalar`] ties each kind to the Rust type that represents it,
//! which is what the accessor layer is generic over.

use std::fmt;
use std::str::FromStr;

use half::f16;

/// Primitive scalar kinds.
///
/// The discriminant is the 4-bit base type encoded into [`PixelFormat`](super::PixelFormat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TypeConstant {
    UInt8 = 0,
    UInt16 = 1,
    UInt32 = 2,
    UInt64 = 3,
    Int8 = 4,
    Int16 = 5,
    Int32 = 6,
    Int64 = 7,
    Float = 8,
    Double = 9,
    Half = 10,
    Bool = 11,
}

impl TypeConstant {
    /// All scalar kinds in discriminant order.
    pub const ALL: [TypeConstant; 12] = [
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Float,
        Self::Double,
        Self::Half,
        Self::Bool,
    ];

    /// Byte width of one value of this kind.
    #[inline]
    #[must_use]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::UInt8 | Self::Int8 | Self::Bool => 1,
            Self::UInt16 | Self::Int16 | Self::Half => 2,
            Self::UInt32 | Self::Int32 | Self::Float => 4,
            Self::UInt64 | Self::Int64 | Self::Double => 8,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double | Self::Half)
    }

    #[inline]
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 | Self::Float | Self::Double | Self::Half
        )
    }

    /// Unsigned integer kinds, including `Bool`.
    #[inline]
    #[must_use]
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64 | Self::Bool
        )
    }

    /// Human-readable type name, as used by `Display` and `FromStr`.
    #[must_use]
    pub const fn type_string(self) -> &'static str {
        match self {
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::Double => "double",
            Self::Half => "half",
            Self::Bool => "bool",
        }
    }

    /// Inverse of the `repr(u8)` discriminant.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        if (value as usize) < Self::ALL.len() {
            Some(Self::ALL[value as usize])
        } else {
            None
        }
    }
}

impl fmt::Display for TypeConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_string())
    }
}

/// Returned when parsing an unknown type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scalar type name '{0}'")]
pub struct UnknownTypeName(pub String);

impl FromStr for TypeConstant {
    type Err = UnknownTypeName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.type_string() == s)
            .ok_or_else(|| UnknownTypeName(s.to_string()))
    }
}

// ============================================================================
// Scalar values
// ============================================================================

/// A scalar widened to the largest representation of its family.
///
/// Used as the carrier for plain (non-normalizing) casts so that 64-bit
/// integers survive without a detour through `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl Number {
    #[inline]
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Unsigned(v) => v as f64,
            Number::Signed(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

/// Rust types that represent one [`TypeConstant`].
///
/// Conversions between scalars follow `as`-cast semantics: integer narrowing
/// truncates, float-to-integer saturates.
pub trait Scalar: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    const TYPE: TypeConstant;

    /// Largest representable magnitude, used by normalization.
    /// `1.0` for float kinds.
    const MAX_F64: f64;

    fn to_number(self) -> Number;
    fn from_number(n: Number) -> Self;

    /// Reads a value from the first `TYPE.num_bytes()` bytes, native endian.
    fn read_ne(bytes: &[u8]) -> Self;
    /// Writes the value into the first `TYPE.num_bytes()` bytes, native endian.
    fn write_ne(self, bytes: &mut [u8]);
}

macro_rules! impl_scalar {
    ($ty:ty, $tc:ident, $variant:ident, $wide:ty, $max:expr) => {
        impl Scalar for $ty {
            const TYPE: TypeConstant = TypeConstant::$tc;
            const MAX_F64: f64 = $max;

            #[inline]
            fn to_number(self) -> Number {
                Number::$variant(self as $wide)
            }

            #[inline]
            fn from_number(n: Number) -> Self {
                match n {
                    Number::Unsigned(v) => v as $ty,
                    Number::Signed(v) => v as $ty,
                    Number::Float(v) => v as $ty,
                }
            }

            #[inline]
            fn read_ne(bytes: &[u8]) -> Self {
                bytemuck::pod_read_unaligned(&bytes[..std::mem::size_of::<$ty>()])
            }

            #[inline]
            fn write_ne(self, bytes: &mut [u8]) {
                bytes[..std::mem::size_of::<$ty>()].copy_from_slice(bytemuck::bytes_of(&self));
            }
        }
    };
}

impl_scalar!(u8, UInt8, Unsigned, u64, u8::MAX as f64);
impl_scalar!(u16, UInt16, Unsigned, u64, u16::MAX as f64);
impl_scalar!(u32, UInt32, Unsigned, u64, u32::MAX as f64);
impl_scalar!(u64, UInt64, Unsigned, u64, u64::MAX as f64);
impl_scalar!(i8, Int8, Signed, i64, i8::MAX as f64);
impl_scalar!(i16, Int16, Signed, i64, i16::MAX as f64);
impl_scalar!(i32, Int32, Signed, i64, i32::MAX as f64);
impl_scalar!(i64, Int64, Signed, i64, i64::MAX as f64);
impl_scalar!(f32, Float, Float, f64, 1.0);
impl_scalar!(f64, Double, Float, f64, 1.0);

impl Scalar for f16 {
    const TYPE: TypeConstant = TypeConstant::Half;
    const MAX_F64: f64 = 1.0;

    #[inline]
    fn to_number(self) -> Number {
        Number::Float(self.to_f64())
    }

    #[inline]
    fn from_number(n: Number) -> Self {
        f16::from_f64(n.as_f64())
    }

    #[inline]
    fn read_ne(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(&bytes[..2])
    }

    #[inline]
    fn write_ne(self, bytes: &mut [u8]) {
        bytes[..2].copy_from_slice(bytemuck::bytes_of(&self));
    }
}

impl Scalar for bool {
    const TYPE: TypeConstant = TypeConstant::Bool;
    const MAX_F64: f64 = 1.0;

    #[inline]
    fn to_number(self) -> Number {
        Number::Unsigned(u64::from(self))
    }

    #[inline]
    fn from_number(n: Number) -> Self {
        match n {
            Number::Unsigned(v) => v != 0,
            Number::Signed(v) => v != 0,
            Number::Float(v) => v != 0.0,
        }
    }

    #[inline]
    fn read_ne(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    #[inline]
    fn write_ne(self, bytes: &mut [u8]) {
        bytes[0] = u8::from(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_bytes_table() {
        let expected = [1, 2, 4, 8, 1, 2, 4, 8, 4, 8, 2, 1];
        for (t, bytes) in TypeConstant::ALL.into_iter().zip(expected) {
            assert_eq!(t.num_bytes(), bytes, "{t}");
        }
    }

    #[test]
    fn test_predicates_partition_kinds() {
        for t in TypeConstant::ALL {
            assert_ne!(t.is_signed(), t.is_unsigned(), "{t}");
        }
        assert!(TypeConstant::Half.is_float());
        assert!(!TypeConstant::Int32.is_float());
    }

    #[test]
    fn test_type_string_round_trip() {
        for t in TypeConstant::ALL {
            assert_eq!(t.type_string().parse::<TypeConstant>(), Ok(t));
            assert_eq!(TypeConstant::from_u8(t as u8), Some(t));
        }
        assert!("quad".parse::<TypeConstant>().is_err());
        assert_eq!(TypeConstant::from_u8(12), None);
    }

    #[test]
    fn test_unknown_name_error_message() {
        let err = "quad".parse::<TypeConstant>().unwrap_err();
        assert_eq!(err, UnknownTypeName("quad".to_string()));
        assert_eq!(err.to_string(), "unknown scalar type name 'quad'");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn test_scalar_casts_follow_as_semantics() {
        assert_eq!(u8::from_number(300u32.to_number()), 44);
        assert_eq!(u8::from_number((-1.5f32).to_number()), 0);
        assert_eq!(i64::from_number(u64::MAX.to_number()), -1);
        assert_eq!(u64::from_number((u64::MAX - 1).to_number()), u64::MAX - 1);
        assert!(bool::from_number(2.0f64.to_number()));
    }

    #[test]
    fn test_scalar_bytes_unaligned() {
        let mut bytes = [0u8; 9];
        0x1234_5678u32.write_ne(&mut bytes[1..]);
        assert_eq!(u32::read_ne(&bytes[1..]), 0x1234_5678);
        f16::from_f32(0.5).write_ne(&mut bytes[5..]);
        assert_eq!(f16::read_ne(&bytes[5..]).to_f32(), 0.5);
    }
}
