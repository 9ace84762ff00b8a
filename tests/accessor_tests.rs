//! Accessor Tests
//!
//! Tests for:
//! - AttributeAccessor: plain casts, normalized round trips, range checks
//! - ResourceAccessor: by-name access, vector reads, truncation boundary
//! - AccessorRegistry: half-float and packed RGB565 strategies, custom registration
//! - StructuredAccessor: whole-record views

use std::sync::Arc;

use half::f16;
use strata::accessor::{
    AccessorKind, AccessorRegistry, AttributeAccessor, AttributeCodec, CustomAttributeAccessor, ResourceAccessor,
    StructuredAccessor,
};
use strata::format::{AttributeFormat, InternalType, ResourceFormat, TypeConstant};
use strata::{ResourceError, StringId};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn attr(name: &str, data_type: TypeConstant, num_values: u32, normalized: bool) -> AttributeFormat {
    AttributeFormat::new(StringId::new(name), data_type, num_values, normalized, 0)
}

// ============================================================================
// AttributeAccessor Tests
// ============================================================================

#[test]
fn attribute_accessor_plain_cast() {
    let a = attr("value", TypeConstant::Int16, 2, false);
    let registry = AccessorRegistry::new();
    let mut acc = AttributeAccessor::create(vec![0u8; 8], 4, &a, &registry).expect("standard accessor");

    acc.write_values(1, &[-3.7f32, 40000.0]).unwrap();
    let back: Vec<i32> = acc.read_values_vec(1).unwrap();
    // float -> int16 truncates toward zero and saturates
    assert_eq!(back, vec![-3, i32::from(i16::MAX)]);
}

#[test]
fn attribute_accessor_unorm8_round_trip_within_one_step() {
    let a = attr("weight", TypeConstant::UInt8, 1, true);
    let registry = AccessorRegistry::new();
    let mut acc = AttributeAccessor::create(vec![0u8; 256], 1, &a, &registry).unwrap();

    for i in 0..=255u8 {
        let x = f32::from(i) / 255.0;
        acc.write_value(usize::from(i), x).unwrap();
        let back: f32 = acc.read_value(usize::from(i)).unwrap();
        assert!((back - x).abs() <= 1.0 / 255.0, "{x} -> {back}");
    }
}

fn normalized_sweep_values(t: TypeConstant) -> Vec<f64> {
    let mut values = vec![0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0];
    if t.is_signed() {
        values.extend([-1.0, -0.75, -0.5, -0.3, -0.01]);
    }
    values
}

/// Largest value representable by an integer kind, as `f64`.
fn integer_max(t: TypeConstant) -> f64 {
    match t {
        TypeConstant::UInt8 => f64::from(u8::MAX),
        TypeConstant::UInt16 => f64::from(u16::MAX),
        TypeConstant::UInt32 => f64::from(u32::MAX),
        TypeConstant::UInt64 => u64::MAX as f64,
        TypeConstant::Int8 => f64::from(i8::MAX),
        TypeConstant::Int16 => f64::from(i16::MAX),
        TypeConstant::Int32 => f64::from(i32::MAX),
        TypeConstant::Int64 => i64::MAX as f64,
        other => panic!("{other} is not an integer kind"),
    }
}

#[test]
fn attribute_accessor_normalized_round_trip_every_integer_kind() {
    let registry = AccessorRegistry::new();
    let kinds = TypeConstant::ALL
        .into_iter()
        .filter(|t| !t.is_float() && *t != TypeConstant::Bool);

    for t in kinds {
        let a = attr("n", t, 1, true);
        let values = normalized_sweep_values(t);
        let width = t.num_bytes();
        let mut acc = AttributeAccessor::create(vec![0u8; values.len() * width], width, &a, &registry)
            .unwrap_or_else(|| panic!("{t} has a standard accessor"));
        if t.is_signed() {
            assert!(matches!(acc.codec().kind(), AccessorKind::SignedNormalized), "{t}");
        } else {
            assert!(matches!(acc.codec().kind(), AccessorKind::UnsignedNormalized), "{t}");
        }

        let step = (1.0 / integer_max(t)).max(1e-12);
        for (i, x) in values.iter().copied().enumerate() {
            acc.write_value(i, x).unwrap();
            let back: f64 = acc.read_value(i).unwrap();
            assert!((back - x).abs() <= step, "{t}: {x} -> {back}");

            acc.write_value(i, x as f32).unwrap();
            let back: f32 = acc.read_value(i).unwrap();
            assert!(
                (f64::from(back) - x).abs() <= step + f64::from(f32::EPSILON),
                "{t} via f32: {x} -> {back}"
            );
        }
    }
}

#[test]
fn attribute_accessor_snorm16_round_trip_within_one_step() {
    let a = attr("n", TypeConstant::Int16, 1, true);
    let registry = AccessorRegistry::new();
    let mut acc = AttributeAccessor::create(vec![0u8; 2], 2, &a, &registry).unwrap();

    for i in -100..=100 {
        let x = i as f32 / 100.0;
        acc.write_value(0, x).unwrap();
        let back: f32 = acc.read_value(0).unwrap();
        assert!((back - x).abs() <= 1.0 / 32767.0, "{x} -> {back}");
    }
}

#[test]
fn attribute_accessor_normalized_integer_writes_rescale_across_widths() {
    let registry = AccessorRegistry::new();

    let a = attr("u16", TypeConstant::UInt16, 2, true);
    let mut acc = AttributeAccessor::create(vec![0u8; 4], 4, &a, &registry).unwrap();
    acc.write_values(0, &[u8::MAX, 0]).unwrap();
    assert_eq!(acc.read_values_vec::<u16>(0).unwrap(), vec![u16::MAX, 0]);
    assert_eq!(acc.read_values_vec::<u8>(0).unwrap(), vec![u8::MAX, 0]);
    assert_eq!(acc.read_values_vec::<u32>(0).unwrap(), vec![u32::MAX, 0]);

    let a = attr("u8", TypeConstant::UInt8, 2, true);
    let mut acc = AttributeAccessor::create(vec![0u8; 2], 2, &a, &registry).unwrap();
    acc.write_values(0, &[u16::MAX, 32768]).unwrap();
    assert_eq!(acc.read_values_vec::<u8>(0).unwrap(), vec![255, 128]);

    let a = attr("i16", TypeConstant::Int16, 2, true);
    let mut acc = AttributeAccessor::create(vec![0u8; 4], 4, &a, &registry).unwrap();
    acc.write_values(0, &[i8::MAX, -i8::MAX]).unwrap();
    assert_eq!(acc.read_values_vec::<i16>(0).unwrap(), vec![i16::MAX, -i16::MAX]);
    assert_eq!(acc.read_values_vec::<i8>(0).unwrap(), vec![i8::MAX, -i8::MAX]);
    assert_eq!(acc.read_values_vec::<i32>(0).unwrap(), vec![i32::MAX, -i32::MAX]);
}

#[test]
fn attribute_accessor_shrunk_data_size_reads_within_store() {
    let registry = AccessorRegistry::new();
    let a = attr("p", TypeConstant::Float, 4, false).with_data_size(4);
    let store = 1.5f32.to_ne_bytes();
    let acc = AttributeAccessor::create(&store[..], 4, &a, &registry).unwrap();

    let mut out = [0.0f32; 4];
    assert_eq!(acc.read_values(0, &mut out).unwrap(), 1);
    assert_eq!(out, [1.5, 0.0, 0.0, 0.0]);
    assert_eq!(acc.read_values_vec::<f32>(0).unwrap(), vec![1.5]);
}

#[test]
fn attribute_accessor_snorm_clamps_minimum() {
    let a = attr("n", TypeConstant::Int8, 1, true);
    let registry = AccessorRegistry::new();
    let acc = AttributeAccessor::create(vec![0x80u8], 1, &a, &registry).unwrap();
    let v: f32 = acc.read_value(0).unwrap();
    assert!(approx(v, -1.0));
}

#[test]
fn attribute_accessor_normalized_to_integer_rescales() {
    let a = attr("c", TypeConstant::UInt8, 1, true);
    let registry = AccessorRegistry::new();
    let acc = AttributeAccessor::create(vec![255u8], 1, &a, &registry).unwrap();
    let wide: u16 = acc.read_value(0).unwrap();
    assert_eq!(wide, u16::MAX);
}

#[test]
fn attribute_accessor_index_past_end_fails() {
    let a = attr("p", TypeConstant::Float, 1, false);
    let registry = AccessorRegistry::new();
    let acc = AttributeAccessor::create(vec![0u8; 8], 4, &a, &registry).unwrap();
    assert!(matches!(
        acc.read_value::<f32>(2),
        Err(ResourceError::IndexOutOfRange { index: 2, .. })
    ));
}

#[test]
fn attribute_accessor_fewer_components_than_requested() {
    let a = attr("p", TypeConstant::Float, 2, false);
    let registry = AccessorRegistry::new();
    let mut acc = AttributeAccessor::create(vec![0u8; 8], 8, &a, &registry).unwrap();
    assert_eq!(acc.write_values(0, &[1.0f32, 2.0, 3.0, 4.0]).unwrap(), 2);
    let mut out = [0.0f64; 4];
    assert_eq!(acc.read_values(0, &mut out).unwrap(), 2);
    assert_eq!(out, [1.0, 2.0, 0.0, 0.0]);
}

// ============================================================================
// Registry Tests
// ============================================================================

#[test]
fn half_requires_registered_accessor() {
    init_logger();
    let a = attr("h", TypeConstant::Half, 2, false);
    assert!(AttributeCodec::create(&a, &AccessorRegistry::new()).is_none());

    let registry = AccessorRegistry::with_builtin();
    let mut acc = AttributeAccessor::create(vec![0u8; 4], 4, &a, &registry).expect("half accessor");
    acc.write_values(0, &[0.5f32, -2.0]).unwrap();
    assert_eq!(&acc.data()[0..2], &f16::from_f32(0.5).to_ne_bytes());
    let back: Vec<f32> = acc.read_values_vec(0).unwrap();
    assert_eq!(back, vec![0.5, -2.0]);
}

#[test]
fn rgb565_packs_normalized_channels() {
    let a = AttributeFormat::new(
        StringId::new("color565"),
        TypeConstant::UInt16,
        3,
        true,
        u32::from(InternalType::Rgb565.id()),
    )
    .with_data_size(2);
    let registry = AccessorRegistry::with_builtin();
    let mut acc = AttributeAccessor::create(vec![0u8; 2], 2, &a, &registry).expect("565 accessor");

    acc.write_values(0, &[1.0f32, 0.0, 1.0]).unwrap();
    assert_eq!(u16::from_ne_bytes([acc.data()[0], acc.data()[1]]), 0xF81F);

    let rgb: Vec<u8> = acc.read_values_vec(0).unwrap();
    assert_eq!(rgb, vec![255, 0, 255]);
}

#[test]
fn unregistered_internal_type_has_no_accessor() {
    init_logger();
    let a = AttributeFormat::new(StringId::new("packed"), TypeConstant::UInt32, 1, false, 0x4242);
    assert!(AttributeCodec::create(&a, &AccessorRegistry::with_builtin()).is_none());
}

#[derive(Debug)]
struct Doubling;

impl CustomAttributeAccessor for Doubling {
    fn read_components(&self, attribute: &AttributeFormat, record: &[u8], out: &mut [f64]) -> usize {
        let count = out.len().min(attribute.num_values() as usize);
        for (i, slot) in out.iter_mut().take(count).enumerate() {
            *slot = f64::from(record[i]) * 2.0;
        }
        count
    }

    fn write_components(&self, attribute: &AttributeFormat, record: &mut [u8], values: &[f64]) -> usize {
        let count = values.len().min(attribute.num_values() as usize);
        for (i, value) in values.iter().take(count).enumerate() {
            record[i] = (value / 2.0) as u8;
        }
        count
    }
}

#[test]
fn custom_type_accessor_overrides_standard() {
    let mut registry = AccessorRegistry::new();
    registry.register_type_accessor(
        TypeConstant::UInt8,
        Arc::new(|_: &AttributeFormat| Some(Arc::new(Doubling) as Arc<dyn CustomAttributeAccessor>)),
    );
    assert!(registry.has_type_accessor(TypeConstant::UInt8));

    let a = attr("d", TypeConstant::UInt8, 1, false);
    let codec = AttributeCodec::create(&a, &registry).unwrap();
    assert!(matches!(codec.kind(), AccessorKind::Custom(_)));

    let acc = AttributeAccessor::create(vec![21u8], 1, &a, &registry).unwrap();
    let v: u32 = acc.read_value(0).unwrap();
    assert_eq!(v, 42);
}

// ============================================================================
// ResourceAccessor Tests
// ============================================================================

fn vertex_format() -> ResourceFormat {
    let mut format = ResourceFormat::new();
    format.append_float("position", 3);
    format.append_int("normal", 3, true);
    format.append_uint("color", 4, true);
    format
}

#[test]
fn resource_accessor_by_name_round_trip() -> anyhow::Result<()> {
    let format = vertex_format();
    let registry = AccessorRegistry::new();
    let mut bytes = vec![0u8; format.size() * 4];
    let mut acc = ResourceAccessor::create(&mut bytes[..], &format, &registry);
    assert_eq!(acc.element_count(), 4);

    acc.write_values_by_name(2, "position", &[1.0f32, 2.0, 3.0])?;
    acc.write_values_by_name(2, "normal", &[0.0f32, -1.0, 0.0])?;
    acc.write_values_by_name(2, "color", &[1.0f32, 0.5, 0.0, 1.0])?;

    assert_eq!(acc.read_vec3(2, "position")?, glam::Vec3::new(1.0, 2.0, 3.0));
    let normal = acc.read_vec3(2, "normal")?;
    assert!(approx(normal.y, -1.0));

    let red: u8 = acc.read_value_by_name(2, "color")?;
    assert_eq!(red, 255);
    let color = acc.read_vec4(2, "color")?;
    assert!((color.y - 0.5).abs() <= 1.0 / 255.0);

    // other records untouched
    assert!(acc.read_raw(1)?.iter().all(|b| *b == 0));
    Ok(())
}

#[test]
fn resource_accessor_trailing_partial_record_is_unreachable() {
    let format = vertex_format();
    let registry = AccessorRegistry::new();
    let acc = ResourceAccessor::create(vec![0u8; format.size() * 2 + format.size() - 1], &format, &registry);
    assert_eq!(acc.element_count(), 2);
    assert!(acc.read_value::<f32>(1, 0).is_ok());
    assert!(matches!(
        acc.read_value::<f32>(2, 0),
        Err(ResourceError::IndexOutOfRange { index: 2, count: 2 })
    ));
}

#[test]
fn resource_accessor_shrunk_data_size_stays_inside_record() {
    let mut format = ResourceFormat::new();
    format.append(attr("p", TypeConstant::Float, 4, false).with_data_size(4));
    assert_eq!(format.size(), 4);

    let registry = AccessorRegistry::new();
    let mut acc = ResourceAccessor::create(vec![0u8; 4], &format, &registry);
    assert_eq!(acc.write_values(0, 0, &[2.0f32, 3.0, 4.0, 5.0]).unwrap(), 1);

    let mut out = [0.0f32; 4];
    assert_eq!(acc.read_values(0, 0, &mut out).unwrap(), 1);
    assert_eq!(out, [2.0, 0.0, 0.0, 0.0]);
}

#[test]
fn resource_accessor_unsupported_attribute_keeps_others_usable() {
    init_logger();
    let mut format = ResourceFormat::new();
    format.append_half("h", 2);
    format.append_float("f", 1);
    let mut acc = ResourceAccessor::create(vec![0u8; 8], &format, &AccessorRegistry::new());

    assert!(matches!(acc.read_value::<f32>(0, 0), Err(ResourceError::NoAccessor(_))));
    acc.write_value(0, 1, 7.5f32).unwrap();
    assert!(approx(acc.read_value(0, 1).unwrap(), 7.5));
}

#[test]
fn resource_accessor_write_raw_checks_stride() {
    let format = vertex_format();
    let mut acc = ResourceAccessor::create(vec![0u8; format.size()], &format, &AccessorRegistry::new());
    assert!(matches!(
        acc.write_raw(0, &[1, 2, 3]),
        Err(ResourceError::ElementSizeMismatch { .. })
    ));
    let record = vec![9u8; format.size()];
    acc.write_raw(0, &record).unwrap();
    assert_eq!(acc.read_raw(0).unwrap(), &record[..]);
}

// ============================================================================
// StructuredAccessor Tests
// ============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct Particle {
    position: [f32; 3],
    life: f32,
}

#[test]
fn structured_accessor_matches_attribute_view() {
    let mut format = ResourceFormat::new();
    format.append_float("position", 3);
    format.append_float("life", 1);

    let mut bytes = vec![0u8; format.size() * 3];
    {
        let mut structured = StructuredAccessor::<Particle, _>::new(&mut bytes[..], &format).unwrap();
        structured
            .set(
                2,
                &Particle {
                    position: [4.0, 5.0, 6.0],
                    life: 0.25,
                },
            )
            .unwrap();
    }

    let acc = ResourceAccessor::create(&bytes[..], &format, &AccessorRegistry::new());
    let life: f32 = acc.read_value_by_name(2, "life").unwrap();
    assert!(approx(life, 0.25));
    assert_eq!(acc.read_vec3(2, "position").unwrap(), glam::Vec3::new(4.0, 5.0, 6.0));
}
