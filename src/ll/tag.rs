//! Public method tags.

use std::fmt;

/// A hash of a public method's name.
///
/// Unlike [`Label`][crate::ll::label::Label]s, tags don't need an allocator: anyone who knows a
/// method's name can compute its tag, so code generated without access to the runtime can still
/// address methods. Classes keep their public methods sorted by tag and resolve tags with a
/// binary search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Tag(i32);

impl Tag {
    /// Computes the tag of a method name.
    ///
    /// Each byte is folded in as `accu * 223 + byte`; the result is truncated to 31 bits and
    /// sign-extended from bit 30, so tags are identical on 32- and 64-bit hosts.
    pub fn of(name: &str) -> Self {
        let accu = name
            .bytes()
            .fold(0_u64, |accu, byte| accu.wrapping_mul(223).wrapping_add(u64::from(byte)));
        let low = (accu & 0x7fff_ffff) as u32;
        Self(((low << 1) as i32) >> 1)
    }

    /// Creates a tag from its raw value.
    pub fn from_i32(x: i32) -> Self {
        Self(x)
    }

    /// Returns the raw value of the tag.
    pub fn to_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}", self.0)
    }
}
