//! Normalized integer conversion.
//!
//! A normalized unsigned integer `v` of type `T` stands for `v / T::MAX` in
//! `[0, 1]`; a normalized signed one stands for `max(v / T::MAX, -1)` in
//! `[-1, 1]`. Float types pass through unchanged.

use crate::format::type_constant::{Number, Scalar};

/// How stored values map to requested values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Normalization {
    /// Plain numeric cast.
    #[default]
    None,
    /// Stored integers represent `[0, 1]`.
    Unsigned,
    /// Stored integers represent `[-1, 1]`.
    Signed,
}

/// Maps an unsigned-normalized `value` to `[0, 1]`.
#[inline]
pub fn normalize_unsigned<T: Scalar>(value: T) -> f64 {
    let v = value.to_number().as_f64();
    if T::TYPE.is_float() { v } else { v / T::MAX_F64 }
}

/// Maps `x` in `[0, 1]` onto the full range of `S`. Out-of-range inputs
/// saturate at the bounds of `S`.
#[inline]
pub fn unnormalize_unsigned<S: Scalar>(x: f64) -> S {
    if S::TYPE.is_float() {
        S::from_number(Number::Float(x))
    } else {
        S::from_number(Number::Float((x * S::MAX_F64).round()))
    }
}

/// Maps a signed-normalized `value` to `[-1, 1]`.
#[inline]
pub fn normalize_signed<T: Scalar>(value: T) -> f64 {
    let v = value.to_number().as_f64();
    if T::TYPE.is_float() {
        v
    } else {
        (v / T::MAX_F64).max(-1.0)
    }
}

/// Maps `x` in `[-1, 1]` onto the symmetric range of `S`.
#[inline]
pub fn unnormalize_signed<S: Scalar>(x: f64) -> S {
    if S::TYPE.is_float() {
        S::from_number(Number::Float(x))
    } else {
        S::from_number(Number::Float((x * S::MAX_F64).round()))
    }
}

/// Converts a stored value to the requested type under `mode`.
#[inline]
pub fn convert_read<T: Scalar, S: Scalar>(stored: T, mode: Normalization) -> S {
    match mode {
        Normalization::None => S::from_number(stored.to_number()),
        Normalization::Unsigned => unnormalize_unsigned::<S>(normalize_unsigned(stored)),
        Normalization::Signed => unnormalize_signed::<S>(normalize_signed(stored)),
    }
}

/// Converts a caller value to the stored type under `mode`.
#[inline]
pub fn convert_write<S: Scalar, T: Scalar>(value: S, mode: Normalization) -> T {
    match mode {
        Normalization::None => T::from_number(value.to_number()),
        Normalization::Unsigned => unnormalize_unsigned::<T>(normalize_unsigned(value)),
        Normalization::Signed => unnormalize_signed::<T>(normalize_signed(value)),
    }
}

/// Maps an intermediate `f64` produced by a custom accessor to `S`.
#[inline]
pub(crate) fn from_f64<S: Scalar>(value: f64, mode: Normalization) -> S {
    match mode {
        Normalization::None => S::from_number(Number::Float(value)),
        Normalization::Unsigned => unnormalize_unsigned::<S>(value),
        Normalization::Signed => unnormalize_signed::<S>(value),
    }
}

/// Maps a caller value to the `f64` a custom accessor consumes.
#[inline]
pub(crate) fn to_f64<S: Scalar>(value: S, mode: Normalization) -> f64 {
    match mode {
        Normalization::None => value.to_number().as_f64(),
        Normalization::Unsigned => normalize_unsigned(value),
        Normalization::Signed => normalize_signed(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_extremes() {
        assert_eq!(normalize_unsigned(255u8), 1.0);
        assert_eq!(normalize_unsigned(0u16), 0.0);
        assert_eq!(unnormalize_unsigned::<u16>(1.0), u16::MAX);
        assert_eq!(unnormalize_unsigned::<u64>(1.0), u64::MAX);
        assert_eq!(unnormalize_unsigned::<u8>(2.0), u8::MAX);
        assert_eq!(unnormalize_unsigned::<u8>(-0.5), 0);
    }

    #[test]
    fn test_signed_clamps_minimum() {
        assert_eq!(normalize_signed(i8::MIN), -1.0);
        assert_eq!(normalize_signed(i8::MAX), 1.0);
        assert_eq!(unnormalize_signed::<i16>(-1.0), -i16::MAX);
    }

    #[test]
    fn test_widening_read() {
        let wide: u16 = convert_read(255u8, Normalization::Unsigned);
        assert_eq!(wide, u16::MAX);
        let f: f32 = convert_read(128u8, Normalization::Unsigned);
        assert!((f - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_plain_cast_write() {
        let stored: u8 = convert_write(3.9f32, Normalization::None);
        assert_eq!(stored, 3);
        let stored: i16 = convert_write(-0.5f64, Normalization::Signed);
        assert_eq!(stored, -16384);
    }
}
