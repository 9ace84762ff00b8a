//! Utility Module
//!
//! - [`interner`]: String interning for attribute, device and type names
//!
//! ```rust,ignore
//! use strata::utils::interner;
//!
//! let a = interner::intern("position");
//! let b = interner::intern("position");
//! assert_eq!(a, b); // O(1) comparison
//! ```

pub mod interner;

pub use interner::StringId;
