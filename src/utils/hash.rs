// ----------------------------------------------
// FNV-1a hash utilities
// ----------------------------------------------

pub type FNV1aHash = u64;
pub type StringHash = FNV1aHash;
pub const NULL_HASH: FNV1aHash = 0;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

pub const fn fnv1a_from_str(s: &str) -> FNV1aHash {
    if s.is_empty() {
        return NULL_HASH;
    }
    fnv1a_from_bytes(s.as_bytes())
}

pub const fn fnv1a_from_bytes(bytes: &[u8]) -> FNV1aHash {
    let mut hash = FNV_OFFSET;
    let mut i = 0;

    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }

    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_known_values() {
        assert_eq!(fnv1a_from_str(""), NULL_HASH);
        assert_eq!(fnv1a_from_str("a"), 0xaf63dc4c8601ec8c);
        assert_eq!(fnv1a_from_str("minimap"), fnv1a_from_bytes(b"minimap"));
    }
}
