//! Opaque storage identity.

use std::fmt;

/// Address of a storage block, used to test whether two handles share it.
/// Views into a block are identified by the block address offset to their
/// first element.
///
/// Two handles denote literally the same elements when they have equal
/// identity and equal count. Equal-valued elements in different blocks
/// never compare identical.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(usize);

impl Identity {
    /// Build an identity from a block address.
    pub fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    /// Identity of anything reachable through `ptr`.
    pub fn of<T: ?Sized>(ptr: *const T) -> Self {
        Self(ptr as *const () as usize)
    }

    /// The raw address.
    pub fn addr(self) -> usize {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_pointer_matches_addr() {
        let x = 5u64;
        let id = Identity::of(&x as *const u64);
        assert_eq!(id.addr(), &x as *const u64 as usize);
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(Identity::from_addr(255).to_string(), "0xff");
    }

    #[test]
    fn fat_pointer_identity_uses_data_address() {
        let v = [1u8, 2, 3];
        let s: &[u8] = &v;
        assert_eq!(Identity::of(s as *const [u8]), Identity::of(v.as_ptr()));
    }
}
