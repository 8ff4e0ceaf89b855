use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

const BLOB_DOMAIN: &[u8] = b"snapdiff-blob-v1:";

/// Content identity of a snapshot entry.
///
/// An `ObjectId` is a 32-byte BLAKE3 hash. The diff engine only ever compares
/// ids for equality: two entries with equal ids are treated as byte-identical
/// without reading their content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; 32]);

impl ObjectId {
    /// Hash file content into its identity.
    ///
    /// The hash is domain-separated so a blob id never collides with a raw
    /// BLAKE3 digest of the same bytes computed elsewhere.
    pub fn for_content(data: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(BLOB_DOMAIN);
        hasher.update(data);
        Self(*hasher.finalize().as_bytes())
    }

    /// Create an `ObjectId` from a pre-computed hash.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The null object ID (all zeros).
    pub const fn null() -> Self {
        Self([0u8; 32])
    }

    /// Returns `true` if this is the null object ID.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 7 characters, git style).
    pub fn short_hex(&self) -> String {
        let mut s = hex::encode(&self.0[..4]);
        s.truncate(7);
        s
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for ObjectId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn for_content_is_deterministic() {
        let a = ObjectId::for_content(b"Original content\nfor file1\n");
        let b = ObjectId::for_content(b"Original content\nfor file1\n");
        assert_eq!(a, b);
    }

    #[test]
    fn different_content_produces_different_ids() {
        assert_ne!(ObjectId::for_content(b"hello"), ObjectId::for_content(b"world"));
    }

    #[test]
    fn domain_separated_from_raw_blake3() {
        let raw = *blake3::hash(b"data").as_bytes();
        assert_ne!(ObjectId::for_content(b"data"), ObjectId::from_hash(raw));
    }

    #[test]
    fn empty_content_is_not_null() {
        assert!(!ObjectId::for_content(b"").is_null());
        assert!(ObjectId::null().is_null());
    }

    #[test]
    fn short_hex_is_7_chars() {
        let id = ObjectId::for_content(b"test");
        assert_eq!(id.short_hex().len(), 7);
        assert!(id.to_hex().starts_with(&id.short_hex()));
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = ObjectId::from_hex("abcd").unwrap_err();
        assert_eq!(err, TypeError::InvalidLength { expected: 32, actual: 2 });
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(matches!(ObjectId::from_hex("zz"), Err(TypeError::InvalidHex(_))));
    }

    #[test]
    fn serde_json_roundtrip() {
        let id = ObjectId::for_content(b"serde");
        let json = serde_json::to_string(&id).unwrap();
        let parsed: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    proptest! {
        #[test]
        fn hex_roundtrip(bytes in proptest::array::uniform32(any::<u8>())) {
            let id = ObjectId::from_hash(bytes);
            prop_assert_eq!(ObjectId::from_hex(&id.to_hex()).unwrap(), id);
        }
    }
}
