//! Format Tests
//!
//! Tests for:
//! - TypeConstant: byte widths, parsing round trip
//! - ResourceFormat: offset layout, alignment, update/merge, equality
//! - PixelFormat: field packing, block sizes, image size computation
//! - PixelFormat <-> ResourceFormat conversion

use strata::format::{AttributeFormat, InternalType, PixelFormat, ResourceFormat, TypeConstant, compute_image_size_bytes};
use strata::StringId;

// ============================================================================
// TypeConstant Tests
// ============================================================================

#[test]
fn type_constant_byte_widths() {
    let widths: Vec<usize> = TypeConstant::ALL.iter().map(|t| t.num_bytes()).collect();
    assert_eq!(widths, vec![1, 2, 4, 8, 1, 2, 4, 8, 4, 8, 2, 1]);
}

#[test]
fn type_constant_name_round_trip() {
    for t in TypeConstant::ALL {
        let parsed: TypeConstant = t.type_string().parse().expect("known name");
        assert_eq!(parsed, t);
    }
    assert!("quad".parse::<TypeConstant>().is_err());
}

// ============================================================================
// ResourceFormat Layout Tests
// ============================================================================

fn vertex_format() -> ResourceFormat {
    let mut format = ResourceFormat::new();
    format.append_float("position", 3);
    format.append_float("normal", 3);
    format.append_uint("color", 4, true);
    format
}

#[test]
fn resource_format_offsets_are_packed() {
    let format = vertex_format();
    let offsets: Vec<usize> = format.attributes().iter().map(AttributeFormat::offset).collect();
    assert_eq!(offsets, vec![0, 12, 24]);
    assert_eq!(format.size(), 28);
}

#[test]
fn resource_format_offsets_are_monotonic_and_inside_record() {
    let mut format = ResourceFormat::with_alignment(4);
    format.append_uint("a", 1, false);
    format.append_half("b", 3);
    format.append_int("c", 2, true);
    format.append_float("d", 1);

    let mut prev_end = 0;
    for attr in format.attributes() {
        assert!(attr.offset() >= prev_end);
        assert_eq!(attr.offset() % 4, 0);
        prev_end = attr.offset() + attr.data_size();
    }
    assert!(prev_end <= format.size());
    assert_eq!(format.size() % 4, 0);
}

#[test]
fn resource_format_set_alignment_relayouts() {
    let mut format = vertex_format();
    format.set_attribute_alignment(16);
    let offsets: Vec<usize> = format.attributes().iter().map(AttributeFormat::offset).collect();
    assert_eq!(offsets, vec![0, 16, 32]);
    assert_eq!(format.size(), 48);
}

#[test]
fn resource_format_update_attribute_repacks_followers() {
    let mut format = vertex_format();
    let wider = AttributeFormat::new(StringId::new("normal"), TypeConstant::Float, 4, false, 0);
    format.update_attribute(wider);

    assert_eq!(format.attribute_count(), 3);
    assert_eq!(format.attribute("normal").num_values(), 4);
    assert_eq!(format.attribute("color").offset(), 28);
    assert_eq!(format.size(), 32);
}

#[test]
fn resource_format_update_missing_appends() {
    let mut format = vertex_format();
    let uv = AttributeFormat::new(StringId::new("uv"), TypeConstant::Float, 2, false, 0);
    format.update_attribute(uv);
    assert_eq!(format.attribute_location("uv"), Some(3));
    assert_eq!(format.size(), 36);
}

#[test]
fn resource_format_merge_rebases_offsets() {
    let mut a = ResourceFormat::new();
    a.append_float("position", 3);
    let mut b = ResourceFormat::new();
    b.append_uint("color", 4, true);

    a.merge(&b);
    assert_eq!(a.attribute("color").offset(), 12);
    assert_eq!(a.size(), 16);
}

#[test]
fn resource_format_missing_attribute_is_empty_sentinel() {
    let format = vertex_format();
    assert!(format.attribute("tangent").is_empty());
    assert!(!format.has_attribute("tangent"));
    assert_eq!(format.attribute_location_by_str("never-interned-name"), None);
}

#[test]
fn resource_format_equality_depends_on_order() {
    let a = vertex_format();
    let b = vertex_format();
    assert_eq!(a, b);

    let mut reordered = ResourceFormat::new();
    reordered.append_float("normal", 3);
    reordered.append_float("position", 3);
    reordered.append_uint("color", 4, true);
    assert_ne!(a, reordered);
    assert_eq!(a.size(), reordered.size());
}

// ============================================================================
// PixelFormat Tests
// ============================================================================

#[test]
fn pixel_format_parts_round_trip() {
    for format in PixelFormat::ALL.iter().copied() {
        let rebuilt = PixelFormat::from_parts(
            format.base_type().expect("named format has a base type"),
            format.channel_count(),
            format.is_normalized(),
            format.is_srgb(),
            format.internal_type_id(),
        );
        assert_eq!(rebuilt, format, "{format}");
    }
}

#[test]
fn pixel_format_invalid_channels_is_unknown() {
    assert!(PixelFormat::from_parts(TypeConstant::UInt8, 0, true, false, 0).is_unknown());
    assert!(PixelFormat::from_parts(TypeConstant::UInt8, 5, true, false, 0).is_unknown());
}

#[test]
fn pixel_format_compressed_block_info() {
    let bc1 = PixelFormat::BC1RGBAUNorm;
    assert!(bc1.is_compressed());
    assert_eq!(bc1.internal_type(), Some(InternalType::Bc1));
    assert_eq!(bc1.block_dimensions(), (4, 4, 1));
    assert_eq!(bc1.block_size_bytes(), 8);

    assert!(!PixelFormat::RGBA16SFloat.is_compressed());
    assert_eq!(PixelFormat::RGBA16SFloat.block_size_bytes(), 8);
    assert!(PixelFormat::D24UNormS8UInt.is_depth_stencil());
}

#[test]
fn compute_image_size_rounds_up_blocks() {
    assert_eq!(compute_image_size_bytes(PixelFormat::RGBA8UNorm, 64, 64, 1), 64 * 64 * 4);
    assert_eq!(compute_image_size_bytes(PixelFormat::BC1RGBAUNorm, 5, 5, 1), 2 * 2 * 8);
    assert_eq!(compute_image_size_bytes(PixelFormat::BC7UNorm, 4, 4, 1), 16);
    assert_eq!(compute_image_size_bytes(PixelFormat::R32SFloat, 3, 3, 3), 27 * 4);
}

#[test]
fn pixel_format_resource_format_round_trip() {
    for format in [PixelFormat::RGBA8UNorm, PixelFormat::RG16SFloat, PixelFormat::R5G6B5UNorm, PixelFormat::BC3UNorm] {
        let resource = format.to_resource_format().expect("named format");
        assert_eq!(resource.attribute_count(), 1);
        assert_eq!(resource.size(), format.block_size_bytes());
        assert_eq!(PixelFormat::from_resource_format(&resource), format, "{format}");
    }
}

#[test]
fn pixel_format_srgb_is_dropped_by_resource_format() {
    let resource = PixelFormat::RGBA8UNormSRGB.to_resource_format().expect("named format");
    assert_eq!(PixelFormat::from_resource_format(&resource), PixelFormat::RGBA8UNorm);
    assert!(PixelFormat::Unknown.to_resource_format().is_none());
}

// ============================================================================
// Serialization Tests
// ============================================================================

#[cfg(feature = "serde")]
#[test]
fn resource_format_serializes_names_as_strings() {
    let format = vertex_format();
    let json = serde_json::to_string(&format).unwrap();
    assert!(json.contains("\"position\""));

    let back: ResourceFormat = serde_json::from_str(&json).unwrap();
    assert_eq!(back, format);
}

#[cfg(feature = "serde")]
#[test]
fn pixel_format_serializes_as_raw_value() {
    let json = serde_json::to_string(&PixelFormat::RGBA8UNorm).unwrap();
    let back: PixelFormat = serde_json::from_str(&json).unwrap();
    assert_eq!(back, PixelFormat::RGBA8UNorm);
}
