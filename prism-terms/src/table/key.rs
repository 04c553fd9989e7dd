//! Term keys and the transient hashed values handed out by value sources

use ahash::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

/// Fixed seeds so that every value source hashes identical bytes identically.
static TERM_HASHER: RandomState = RandomState::with_seeds(
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
);

/// Hash raw term bytes the way bucket tables expect.
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    BuildHasher::hash_one(&TERM_HASHER, bytes)
}

/// A borrowed term value together with its hash.
///
/// The bytes are transient: they usually point into a reusable buffer owned
/// by the value source and must be copied before they are retained.
#[derive(Clone, Copy)]
pub struct HashedBytes<'a> {
    bytes: &'a [u8],
    hash: u64,
}

impl<'a> HashedBytes<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            hash: hash_bytes(bytes),
        }
    }

    /// Pair bytes with a hash computed earlier by [`hash_bytes`].
    pub fn with_hash(bytes: &'a [u8], hash: u64) -> Self {
        debug_assert_eq!(hash, hash_bytes(bytes), "hash does not match term bytes");
        Self { bytes, hash }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }
}

impl fmt::Debug for HashedBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedBytes")
            .field("bytes", &String::from_utf8_lossy(self.bytes))
            .field("hash", &self.hash)
            .finish()
    }
}

/// An owned, immutable term with its precomputed hash.
///
/// Equality is byte equality; the hash only short-circuits mismatches.
#[derive(Clone)]
pub struct TermKey {
    bytes: Box<[u8]>,
    hash: u64,
}

impl TermKey {
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        let bytes = bytes.into();
        let hash = hash_bytes(&bytes);
        Self { bytes, hash }
    }

    /// Take ownership of bytes already copied out of a transient value.
    pub(crate) fn from_owned(bytes: Box<[u8]>, hash: u64) -> Self {
        debug_assert_eq!(hash, hash_bytes(&bytes));
        Self { bytes, hash }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn hash_value(&self) -> u64 {
        self.hash
    }

    pub fn matches(&self, value: HashedBytes<'_>) -> bool {
        self.hash == value.hash && *self.bytes == *value.bytes
    }

    pub fn into_bytes(self) -> Box<[u8]> {
        self.bytes
    }
}

impl PartialEq for TermKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.bytes == other.bytes
    }
}

impl Eq for TermKey {}

impl Hash for TermKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for TermKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TermKey({:?})", String::from_utf8_lossy(&self.bytes))
    }
}
