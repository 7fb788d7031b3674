use crate::collections::XorHashMap;
use std::{collections::hash_map::Iter, fmt::Debug, hash::Hash};

pub trait PoolId: Hash + Eq + Debug + Default + Copy + Clone {
    /// Generate a new id using this id as a seed.
    /// Typically an id is based on an integer and this
    /// method will increment it.
    fn next(&self) -> Self;
}

pub trait PoolObject: Default {
    /// Clear the object prior to reuse
    fn clear(&mut self);
}

/// A hashmap-based memory pool.
///
/// Rust hashmaps *never implicitly shrink*, so they work as a sparse data-store.
/// Deleted values are kept on a free-list and cleared before they are handed out again,
/// which keeps their heap allocations (strings, child lists) alive between uses.
/// Ids are never reused.
#[derive(Debug)]
pub struct HashPool<I, V>
where
    I: PoolId,
    V: PoolObject,
{
    id: I,
    inner: XorHashMap<I, V>,
    free_list: Vec<V>,
}

impl<I, V> Default for HashPool<I, V>
where
    I: PoolId,
    V: PoolObject,
{
    #[inline]
    fn default() -> HashPool<I, V> {
        HashPool {
            id: I::default(),
            inner: XorHashMap::default(),
            free_list: Vec::default(),
        }
    }
}

impl<I, V> HashPool<I, V>
where
    I: PoolId,
    V: PoolObject,
{
    #[inline]
    pub fn new() -> HashPool<I, V> {
        HashPool::default()
    }

    /// Take a cleared value off the free-list, or a fresh default one.
    #[inline]
    fn recycle(&mut self) -> V {
        if let Some(mut value) = self.free_list.pop() {
            value.clear();
            value
        } else {
            V::default()
        }
    }

    #[inline]
    pub fn allocate(&mut self) -> (I, &mut V) {
        let value = self.recycle();
        let id = self.register(value);
        // The id was inserted just above
        (id, self.inner.entry(id).or_default())
    }

    /// Allocate a value and let `factory` fill it in before anyone else sees it.
    #[inline]
    pub fn create<F: FnOnce(I, &mut V)>(&mut self, factory: F) -> I {
        let (id, value) = self.allocate();
        factory(id, value);
        id
    }

    #[inline]
    pub fn delete(&mut self, id: &I) -> bool {
        if let Some(value) = self.inner.remove(id) {
            self.free_list.push(value);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn register(&mut self, value: V) -> I {
        self.id = self.id.next();
        self.inner.insert(self.id, value);
        self.id
    }

    #[inline]
    pub fn contains(&self, id: I) -> bool {
        self.inner.contains_key(&id)
    }

    #[inline]
    pub fn get(&self, id: I) -> Option<&V> {
        self.inner.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: I) -> Option<&mut V> {
        self.inner.get_mut(&id)
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, I, V> {
        self.inner.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
