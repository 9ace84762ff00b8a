//! Global String Interner
//!
//! Maps attribute, device and type names to compact integer keys. Two
//! [`StringId`]s compare equal iff they were interned from the same string.

use std::fmt;
use std::sync::LazyLock;

use lasso::{Key, Spur, ThreadedRodeo};

/// Global interner instance
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::new);

/// Interned string key.
///
/// Ordering follows interning order, not lexical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(u32);

impl StringId {
    /// Interns `s` and returns its key.
    #[inline]
    pub fn new(s: &str) -> Self {
        intern(s)
    }

    /// Resolves the key back to its string.
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        resolve(self)
    }

    #[inline]
    fn spur(self) -> Option<Spur> {
        Spur::try_from_usize(self.0 as usize)
    }
}

impl From<&str> for StringId {
    fn from(s: &str) -> Self {
        intern(s)
    }
}

impl fmt::Display for StringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interns a string, returning its key.
///
/// Returns the existing key when the string is already interned.
#[inline]
pub fn intern(s: &str) -> StringId {
    StringId(INTERNER.get_or_intern(s).into_usize() as u32)
}

/// Looks up an already interned string without allocating.
#[inline]
pub fn get(s: &str) -> Option<StringId> {
    INTERNER.get(s).map(|spur| StringId(spur.into_usize() as u32))
}

/// Resolves a key back to its string.
///
/// Keys can only be minted by this module, so an unresolvable key yields `""`.
#[inline]
pub fn resolve(id: StringId) -> &'static str {
    id.spur()
        .and_then(|spur| INTERNER.try_resolve(&spur))
        .unwrap_or("")
}

#[cfg(feature = "serde")]
impl serde::Serialize for StringId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for StringId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Ok(intern(&name))
    }
}
