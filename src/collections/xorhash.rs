use std::{
    collections::{HashMap, HashSet},
    hash::{BuildHasherDefault, Hasher},
};

/// A HashMap that uses the XorHasher
pub type XorHashMap<K, V> = HashMap<K, V, BuildHasherDefault<XorHasher>>;

/// A HashSet that uses the XorHasher
pub type XorHashSet<T> = HashSet<T, BuildHasherDefault<XorHasher>>;

/// A Hasher that returns integer keys as-is and xors anything else byte by byte.
///
/// Node ids and pool indices are dense integers, so this is all the hashing they need.
#[derive(Default)]
pub struct XorHasher(u64);

impl Hasher for XorHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes.iter() {
            self.0 ^= *byte as u64;
        }
    }

    #[inline]
    fn write_u32(&mut self, i: u32) {
        self.0 = i as u64;
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.0 = i;
    }

    #[inline]
    fn write_usize(&mut self, i: usize) {
        self.0 = i as u64;
    }
}
