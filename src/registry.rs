//! One pool per factory type, owned by whoever builds the game world.

use crate::{
    collections::XorHashMap,
    factory::Factory,
    pool::ObjectPool,
    scene::SceneGraph,
};
use std::{
    any::{type_name, Any, TypeId},
    collections::hash_map::Entry,
};

/// Holds at most one `ObjectPool` per factory type.
///
/// A factory type fixes its config type too, so this is also one pool per
/// (config, factory) pairing.
#[derive(Default)]
pub struct PoolRegistry {
    pools: XorHashMap<TypeId, Box<dyn Any>>,
}

impl PoolRegistry {
    #[inline]
    pub fn new() -> PoolRegistry {
        PoolRegistry::default()
    }

    /// Register `pool`, unless a pool for the same factory type is already here.
    ///
    /// The first pool wins. A latecomer is destroyed along with its container and
    /// the existing pool is returned instead.
    pub fn install<F: Factory>(
        &mut self,
        scene: &mut SceneGraph,
        pool: ObjectPool<F>,
    ) -> &mut ObjectPool<F> {
        let slot = match self.pools.entry(TypeId::of::<ObjectPool<F>>()) {
            Entry::Occupied(entry) => {
                log::warn!(
                    "A pool for {} already exists, discarding the new one at {:?}",
                    type_name::<F>(),
                    pool.container()
                );
                pool.destroy(scene);
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                log::info!(
                    "Installed pool for {} at {:?}",
                    type_name::<F>(),
                    pool.container()
                );
                entry.insert(Box::new(pool))
            }
        };
        match slot.downcast_mut::<ObjectPool<F>>() {
            Some(pool) => pool,
            None => unreachable!("pool registry slot holds the wrong type"),
        }
    }

    #[inline]
    pub fn get<F: Factory>(&self) -> Option<&ObjectPool<F>> {
        self.pools
            .get(&TypeId::of::<ObjectPool<F>>())
            .and_then(|pool| pool.downcast_ref())
    }

    #[inline]
    pub fn get_mut<F: Factory>(&mut self) -> Option<&mut ObjectPool<F>> {
        self.pools
            .get_mut(&TypeId::of::<ObjectPool<F>>())
            .and_then(|pool| pool.downcast_mut())
    }

    #[inline]
    pub fn contains<F: Factory>(&self) -> bool {
        self.pools.contains_key(&TypeId::of::<ObjectPool<F>>())
    }

    /// Take a pool back out, e.g. to `destroy` it.
    pub fn remove<F: Factory>(&mut self) -> Option<ObjectPool<F>> {
        self.pools
            .remove(&TypeId::of::<ObjectPool<F>>())
            .and_then(|pool| pool.downcast().ok())
            .map(|pool| *pool)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
