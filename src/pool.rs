//! The object pool itself.
//!
//! A pool owns a container node in the scene. Every object it creates is parented
//! under that container and starts out inactive. An object is available for reuse
//! whenever it is not active in the hierarchy; callers flip objects to active once
//! they put them to work, and hand them back with `return_to_pool`.
//!
//! The pool never destroys individual objects. They go away when the whole pool is destroyed.

use crate::{
    collections::XorHashSet,
    config::{PoolConfig, RandomSelection},
    error::{PoolError, PoolResult},
    factory::Factory,
    scene::{NodeId, SceneGraph},
};
use rand::{rngs::StdRng, seq::IteratorRandom, Rng, SeedableRng};

const CONTAINER_LABEL: &str = "object pool";

pub struct ObjectPool<F: Factory> {
    container: NodeId,
    target_count: usize,
    factory: F,
    /// In creation order.
    objects: Vec<NodeId>,
    members: XorHashSet<NodeId>,
    random_selection: RandomSelection,
    rng: StdRng,
    checked_indices: XorHashSet<usize>,
}

impl<F: Factory> ObjectPool<F> {
    /// Set up the pool and its container node and hand the object config to the factory.
    ///
    /// Nothing is created until `activate` is called.
    pub fn new(
        scene: &mut SceneGraph,
        mut factory: F,
        config: PoolConfig<F::Config>,
    ) -> ObjectPool<F> {
        let PoolConfig {
            amount_to_pool,
            object_config,
            seed,
            random_selection,
        } = config;

        factory.set_config(object_config);
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        ObjectPool {
            container: scene.spawn(CONTAINER_LABEL),
            target_count: amount_to_pool,
            factory,
            objects: Vec::with_capacity(amount_to_pool),
            members: XorHashSet::default(),
            random_selection,
            rng,
            checked_indices: XorHashSet::default(),
        }
    }

    /// Start over with a fresh collection of `target_count` inactive objects.
    ///
    /// Objects from an earlier activation stay in the scene under the container
    /// but are no longer tracked by the pool.
    pub fn activate(&mut self, scene: &mut SceneGraph) -> PoolResult<()> {
        if !self.objects.is_empty() {
            log::debug!(
                "Re-activating pool {:?}, dropping {} tracked object(s)",
                self.container,
                self.objects.len()
            );
        }
        self.objects.clear();
        self.members.clear();
        for _ in 0..self.target_count {
            self.create_object(scene)?;
        }
        log::debug!(
            "Pool {:?} populated with {} object(s)",
            self.container,
            self.objects.len()
        );
        Ok(())
    }

    fn create_object(&mut self, scene: &mut SceneGraph) -> PoolResult<NodeId> {
        let id = self
            .factory
            .create_object(scene)
            .map_err(PoolError::Factory)?;
        let parked = scene
            .set_parent(id, Some(self.container))
            .and_then(|_| scene.set_active(id, false));
        if let Err(err) = parked {
            // Not under the container, so `destroy` would never reach it
            scene.destroy(id);
            return Err(err);
        }
        self.objects.push(id);
        self.members.insert(id);
        Ok(id)
    }

    fn grow(&mut self, scene: &mut SceneGraph) -> PoolResult<NodeId> {
        let id = self.create_object(scene)?;
        log::debug!(
            "Pool {:?} had nothing free, grew to {} object(s)",
            self.container,
            self.objects.len()
        );
        Ok(id)
    }

    #[inline]
    fn is_available(scene: &SceneGraph, id: NodeId) -> bool {
        scene.contains(id) && !scene.is_active_in_hierarchy(id)
    }

    /// Stop tracking objects that were destroyed behind the pool's back.
    fn forget_destroyed(&mut self, scene: &SceneGraph) {
        let before = self.objects.len();
        let members = &mut self.members;
        self.objects.retain(|id| {
            let alive = scene.contains(*id);
            if !alive {
                members.remove(id);
            }
            alive
        });
        if self.objects.len() != before {
            log::warn!(
                "Pool {:?} lost {} object(s) destroyed outside the pool",
                self.container,
                before - self.objects.len()
            );
        }
    }

    /// The first inactive object in creation order, or a brand new one if every object is busy.
    ///
    /// The returned object is left inactive; activating it is up to the caller.
    pub fn get_pooled_object(&mut self, scene: &mut SceneGraph) -> PoolResult<NodeId> {
        self.forget_destroyed(scene);
        let free = self
            .objects
            .iter()
            .copied()
            .find(|id| Self::is_available(scene, *id));
        match free {
            Some(id) => Ok(id),
            None => self.grow(scene),
        }
    }

    /// A randomly chosen inactive object, or a brand new one if every object is busy.
    ///
    /// How the choice is made depends on the pool's `RandomSelection`.
    pub fn get_random_pooled_object(&mut self, scene: &mut SceneGraph) -> PoolResult<NodeId> {
        self.forget_destroyed(scene);
        let free = match self.random_selection {
            RandomSelection::Sampled => self.sample_random(scene),
            RandomSelection::Uniform => self
                .objects
                .iter()
                .copied()
                .filter(|id| Self::is_available(scene, *id))
                .choose(&mut self.rng),
        };
        match free {
            Some(id) => Ok(id),
            None => self.grow(scene),
        }
    }

    /// Draw indices until one is free or every index has come up at least once.
    fn sample_random(&mut self, scene: &SceneGraph) -> Option<NodeId> {
        let len = self.objects.len();
        self.checked_indices.clear();
        while self.checked_indices.len() < len {
            let index = self.rng.gen_range(0..len);
            let id = self.objects[index];
            if Self::is_available(scene, id) {
                return Some(id);
            }
            self.checked_indices.insert(index);
        }
        None
    }

    /// Mark an object as free again. Returning an already free object is fine.
    ///
    /// Objects this pool did not create are rejected and left untouched.
    pub fn return_to_pool(&self, scene: &mut SceneGraph, id: NodeId) -> PoolResult<()> {
        if !self.members.contains(&id) {
            log::warn!(
                "{:?} was returned to pool {:?} but never came from it",
                id,
                self.container
            );
            return Err(PoolError::NotPooled(id));
        }
        scene.set_active(id, false)
    }

    /// Tear the pool down, destroying its container and every object under it.
    pub fn destroy(self, scene: &mut SceneGraph) -> usize {
        log::debug!(
            "Destroying pool {:?} with {} tracked object(s)",
            self.container,
            self.objects.len()
        );
        scene.destroy(self.container)
    }

    #[inline]
    pub fn container(&self) -> NodeId {
        self.container
    }

    #[inline]
    pub fn target_count(&self) -> usize {
        self.target_count
    }

    #[inline]
    pub fn objects(&self) -> &[NodeId] {
        &self.objects
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    /// How many tracked objects are currently free.
    pub fn available(&self, scene: &SceneGraph) -> usize {
        self.objects
            .iter()
            .filter(|id| Self::is_available(scene, **id))
            .count()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[inline]
    pub fn random_selection(&self) -> RandomSelection {
        self.random_selection
    }

    #[inline]
    pub fn factory(&self) -> &F {
        &self.factory
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{factory::FnFactory, util::BoxedError};
    use std::{cell::Cell, rc::Rc};

    /// Spawns `E1`, `E2`, ... and counts how often it was asked to.
    #[derive(Default)]
    struct LabelFactory {
        prefix: String,
        created: usize,
        fail_after: Option<usize>,
    }

    impl Factory for LabelFactory {
        type Config = String;

        fn set_config(&mut self, config: String) {
            self.prefix = config;
        }

        fn create_object(&mut self, scene: &mut SceneGraph) -> Result<NodeId, BoxedError> {
            if self.fail_after == Some(self.created) {
                return Err("out of ammo".into());
            }
            self.created += 1;
            Ok(scene.spawn(format!("{}{}", self.prefix, self.created)))
        }
    }

    fn pool_with(
        scene: &mut SceneGraph,
        amount: usize,
        selection: RandomSelection,
    ) -> ObjectPool<LabelFactory> {
        let config = PoolConfig::new("E".to_string())
            .with_amount(amount)
            .with_seed(0x5eed)
            .with_random_selection(selection);
        let mut pool = ObjectPool::new(scene, LabelFactory::default(), config);
        pool.activate(scene).unwrap();
        pool
    }

    fn label(scene: &SceneGraph, id: NodeId) -> &str {
        scene.node(id).unwrap().label()
    }

    #[test]
    fn activation_populates_inactive_children() {
        let mut scene = SceneGraph::new();
        let pool = pool_with(&mut scene, 5, RandomSelection::Sampled);

        assert_eq!(5, pool.len());
        assert_eq!(5, pool.available(&scene));
        for id in pool.objects() {
            let node = scene.node(*id).unwrap();
            assert!(!node.active_self());
            assert_eq!(Some(pool.container()), node.parent());
        }
        assert_eq!(pool.objects(), scene.node(pool.container()).unwrap().children());
    }

    #[test]
    fn construction_alone_creates_nothing() {
        let mut scene = SceneGraph::new();
        let config = PoolConfig::new("E".to_string());
        let pool = ObjectPool::new(&mut scene, LabelFactory::default(), config);
        assert!(pool.is_empty());
        assert_eq!(20, pool.target_count());
        assert_eq!(1, scene.len());
    }

    #[test]
    fn sequential_retrieval_then_growth() {
        let mut scene = SceneGraph::new();
        let mut pool = pool_with(&mut scene, 3, RandomSelection::Sampled);
        let labels: Vec<_> = pool
            .objects()
            .iter()
            .map(|id| label(&scene, *id).to_string())
            .collect();
        assert_eq!(vec!["E1", "E2", "E3"], labels);

        for expected in &["E1", "E2", "E3"] {
            let id = pool.get_pooled_object(&mut scene).unwrap();
            assert_eq!(*expected, label(&scene, id));
            scene.set_active(id, true).unwrap();
        }
        assert_eq!(3, pool.len());

        let id = pool.get_pooled_object(&mut scene).unwrap();
        assert_eq!("E4", label(&scene, id));
        assert_eq!(4, pool.len());
        assert!(!scene.is_active_self(id));
        assert_eq!(Some(pool.container()), scene.node(id).unwrap().parent());
    }

    #[test]
    fn retrieval_reuses_without_growing() {
        let mut scene = SceneGraph::new();
        let mut pool = pool_with(&mut scene, 3, RandomSelection::Sampled);
        let second = pool.objects()[1];
        scene.set_active(pool.objects()[0], true).unwrap();

        assert_eq!(second, pool.get_pooled_object(&mut scene).unwrap());
        // Not activated for us, so we get the same one again
        assert_eq!(second, pool.get_pooled_object(&mut scene).unwrap());
        assert_eq!(3, pool.len());
        assert_eq!(3, pool.factory().created);
    }

    #[test]
    fn return_makes_an_object_available_again() {
        let mut scene = SceneGraph::new();
        let mut pool = pool_with(&mut scene, 2, RandomSelection::Sampled);
        for id in pool.objects().to_vec() {
            scene.set_active(id, true).unwrap();
        }
        let first = pool.objects()[0];
        pool.return_to_pool(&mut scene, first).unwrap();
        assert_eq!(first, pool.get_pooled_object(&mut scene).unwrap());
        assert_eq!(2, pool.len());
    }

    #[test]
    fn returning_twice_is_harmless() {
        let mut scene = SceneGraph::new();
        let pool = pool_with(&mut scene, 1, RandomSelection::Sampled);
        let id = pool.objects()[0];
        pool.return_to_pool(&mut scene, id).unwrap();
        pool.return_to_pool(&mut scene, id).unwrap();
        assert!(!scene.is_active_self(id));
    }

    #[test]
    fn foreign_objects_are_rejected() {
        let mut scene = SceneGraph::new();
        let pool = pool_with(&mut scene, 1, RandomSelection::Sampled);
        let stranger = scene.spawn("stranger");

        assert!(matches!(
            pool.return_to_pool(&mut scene, stranger),
            Err(PoolError::NotPooled(id)) if id == stranger
        ));
        assert!(scene.is_active_self(stranger));
    }

    #[test]
    fn sampled_random_finds_the_only_free_object() {
        let mut scene = SceneGraph::new();
        let mut pool = pool_with(&mut scene, 6, RandomSelection::Sampled);
        let free = pool.objects()[4];
        for id in pool.objects().to_vec() {
            if id != free {
                scene.set_active(id, true).unwrap();
            }
        }
        for _ in 0..10 {
            assert_eq!(free, pool.get_random_pooled_object(&mut scene).unwrap());
        }
        assert_eq!(6, pool.len());
    }

    #[test]
    fn random_retrieval_grows_by_one_when_all_busy() {
        for selection in &[RandomSelection::Sampled, RandomSelection::Uniform] {
            let mut scene = SceneGraph::new();
            let mut pool = pool_with(&mut scene, 4, *selection);
            for id in pool.objects().to_vec() {
                scene.set_active(id, true).unwrap();
            }

            let id = pool.get_random_pooled_object(&mut scene).unwrap();
            assert_eq!("E5", label(&scene, id));
            assert_eq!(5, pool.len());
            // Four for population and one for the growth
            assert_eq!(5, pool.factory().created);
        }
    }

    #[test]
    fn random_retrieval_on_an_empty_pool_creates_one() {
        for selection in &[RandomSelection::Sampled, RandomSelection::Uniform] {
            let mut scene = SceneGraph::new();
            let mut pool = pool_with(&mut scene, 0, *selection);
            assert!(pool.is_empty());
            let id = pool.get_random_pooled_object(&mut scene).unwrap();
            assert_eq!(&[id], pool.objects());
        }
    }

    #[test]
    fn uniform_random_only_picks_free_objects() {
        let mut scene = SceneGraph::new();
        let mut pool = pool_with(&mut scene, 8, RandomSelection::Uniform);
        let objects = pool.objects().to_vec();
        for id in objects.iter().step_by(2) {
            scene.set_active(*id, true).unwrap();
        }

        let mut seen = XorHashSet::default();
        for _ in 0..200 {
            let id = pool.get_random_pooled_object(&mut scene).unwrap();
            assert!(!scene.is_active_self(id));
            seen.insert(id);
        }
        assert_eq!(4, seen.len());
        assert_eq!(8, pool.len());
    }

    #[test]
    fn same_seed_same_picks() {
        let picks = |scene: &mut SceneGraph| {
            let mut pool = pool_with(scene, 10, RandomSelection::Sampled);
            (0..5)
                .map(|_| {
                    let id = pool.get_random_pooled_object(scene).unwrap();
                    pool.objects().iter().position(|other| *other == id).unwrap()
                })
                .collect::<Vec<_>>()
        };
        let mut a = SceneGraph::new();
        let mut b = SceneGraph::new();
        assert_eq!(picks(&mut a), picks(&mut b));
    }

    #[test]
    fn inactive_container_frees_everything() {
        let mut scene = SceneGraph::new();
        let mut pool = pool_with(&mut scene, 2, RandomSelection::Sampled);
        for id in pool.objects().to_vec() {
            scene.set_active(id, true).unwrap();
        }
        assert_eq!(0, pool.available(&scene));

        scene.set_active(pool.container(), false).unwrap();
        assert_eq!(2, pool.available(&scene));
        let first = pool.objects()[0];
        assert_eq!(first, pool.get_pooled_object(&mut scene).unwrap());
    }

    #[test]
    fn reactivation_starts_a_fresh_collection() {
        let mut scene = SceneGraph::new();
        let mut pool = pool_with(&mut scene, 2, RandomSelection::Sampled);
        let old = pool.objects()[0];

        pool.activate(&mut scene).unwrap();
        assert_eq!(2, pool.len());
        assert!(!pool.contains(old));
        assert_eq!(4, pool.factory().created);
        // The previous objects still hang off the container
        assert_eq!(4, scene.node(pool.container()).unwrap().children().len());
    }

    #[test]
    fn factory_failure_propagates() {
        let mut scene = SceneGraph::new();
        let factory = LabelFactory {
            fail_after: Some(2),
            ..LabelFactory::default()
        };
        let config = PoolConfig::new("E".to_string()).with_amount(3);
        let mut pool = ObjectPool::new(&mut scene, factory, config);
        assert!(matches!(pool.activate(&mut scene), Err(PoolError::Factory(_))));
        assert_eq!(2, pool.len());
    }

    #[test]
    fn destroyed_objects_are_never_handed_out() {
        let mut scene = SceneGraph::new();
        let mut pool = pool_with(&mut scene, 2, RandomSelection::Sampled);
        let dead = pool.objects()[0];
        let live = pool.objects()[1];
        scene.destroy(dead);
        assert_eq!(1, pool.available(&scene));

        let id = pool.get_pooled_object(&mut scene).unwrap();
        assert_eq!(live, id);
        assert!(!pool.contains(dead));
        assert_eq!(&[live], pool.objects());
        scene.set_active(id, true).unwrap();

        let id = pool.get_pooled_object(&mut scene).unwrap();
        assert!(scene.contains(id));
        assert_eq!("E3", label(&scene, id));
        assert_eq!(2, pool.len());
    }

    #[test]
    fn random_retrieval_skips_destroyed_objects() {
        for selection in &[RandomSelection::Sampled, RandomSelection::Uniform] {
            let mut scene = SceneGraph::new();
            let mut pool = pool_with(&mut scene, 3, *selection);
            for id in pool.objects().to_vec() {
                scene.destroy(id);
            }
            let id = pool.get_random_pooled_object(&mut scene).unwrap();
            assert!(scene.contains(id));
            assert_eq!(&[id], pool.objects());
        }
    }

    #[test]
    fn objects_that_cannot_be_parked_are_cleaned_up() {
        let mut scene = SceneGraph::new();
        let container = Rc::new(Cell::new(NodeId::default()));
        let target = Rc::clone(&container);
        let factory = FnFactory::new(move |_: &(), scene: &mut SceneGraph| {
            let rogue = scene.spawn("rogue");
            // Hang the pool under the new object so it cannot go under the pool
            scene.set_parent(target.get(), Some(rogue))?;
            Ok(rogue)
        });
        let config = PoolConfig::new(()).with_amount(1);
        let mut pool = ObjectPool::new(&mut scene, factory, config);
        container.set(pool.container());

        assert!(matches!(
            pool.activate(&mut scene),
            Err(PoolError::ParentCycle(_))
        ));
        assert!(pool.is_empty());
        assert!(scene.is_empty());
    }

    #[test]
    fn destroy_removes_container_and_objects() {
        let mut scene = SceneGraph::new();
        let bystander = scene.spawn("bystander");
        let pool = pool_with(&mut scene, 3, RandomSelection::Sampled);
        let objects = pool.objects().to_vec();

        assert_eq!(4, pool.destroy(&mut scene));
        assert_eq!(1, scene.len());
        assert!(scene.contains(bystander));
        assert!(objects.iter().all(|id| !scene.contains(*id)));
    }
}
