//! Utility functions for getting hashes
use std::hash::{DefaultHasher, Hash, Hasher};

pub(crate) fn calculate_hash<T: Hash + ?Sized>(t: &T) -> u64 {
    let mut s = DefaultHasher::new();
    t.hash(&mut s);
    s.finish()
}

pub(crate) fn hash_as_hex_string<T: Hash + ?Sized>(t: &T) -> String {
    format!("{:x}", calculate_hash(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_for_equal_input() {
        assert_eq!(hash_as_hex_string("ATPase_tx"), hash_as_hex_string("ATPase_tx"));
        assert_ne!(hash_as_hex_string("M_ATPase_tx"), hash_as_hex_string("B_ATPase_tx"));
    }
}
