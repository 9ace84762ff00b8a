//! Error Types
//!
//! This module defines the error type returned by the strict accessor paths.
//!
//! # Overview
//!
//! Only usage errors surface as [`ResourceError`]:
//! - Out-of-range record indices and attribute locations
//! - Unknown attribute names on strict lookup paths
//! - Typed views whose record size does not match the format stride
//!
//! Soft failures (invalid regions, mismatched bitmaps, unowned resources) are
//! reported through `log::warn!` and a `false` return value instead.
//!
//! ```rust,ignore
//! use strata::errors::{ResourceError, Result};
//!
//! fn first_position(acc: &ResourceAccessor<&[u8]>) -> Result<f32> {
//!     acc.read_value_by_name::<f32>(0, "position")
//! }
//! ```

use thiserror::Error;

/// The error type of the accessor layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    // ========================================================================
    // Range Errors
    // ========================================================================
    /// Record index past the last element.
    #[error("Index out of range: {index} (element count: {count})")]
    IndexOutOfRange {
        /// The requested record index
        index: usize,
        /// Number of addressable records
        count: usize,
    },

    /// Attribute location past the last attribute of the format.
    #[error("Attribute location out of range: {location} (attribute count: {count})")]
    LocationOutOfRange {
        /// The requested attribute location
        location: usize,
        /// Number of attributes in the format
        count: usize,
    },

    /// The addressed attribute bytes end past the backing store.
    #[error("Record {index} overflows the data store: ends at byte {end}, store has {len}")]
    RecordOverflow {
        /// The requested record index
        index: usize,
        /// First byte past the addressed attribute
        end: usize,
        /// Length of the backing store
        len: usize,
    },

    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// No attribute with the given name exists in the format.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// No accessor is available for the attribute at this location.
    #[error("No accessor for attribute: {0}")]
    NoAccessor(String),

    // ========================================================================
    // Layout Errors
    // ========================================================================
    /// A typed record view does not match the format stride.
    #[error("Element size mismatch: format stride is {expected} bytes, type is {actual} bytes")]
    ElementSizeMismatch {
        /// Stride of the resource format
        expected: usize,
        /// Size of the requested record type
        actual: usize,
    },
}

/// Alias for `Result<T, ResourceError>`.
pub type Result<T> = std::result::Result<T, ResourceError>;
