use crate::{scene::SceneGraph, scene::NodeId, util::BoxedError};
use std::marker::PhantomData;

/// Builds the objects a pool hands out.
///
/// `set_config` is called once by the pool before the first `create_object`. Calling
/// it again simply overwrites the stored config.
///
/// `create_object` must return a fully built node already living in `scene`. When that
/// is not possible it returns an error; the pool never receives a half-built object.
pub trait Factory: 'static {
    type Config;

    fn set_config(&mut self, config: Self::Config);

    fn create_object(&mut self, scene: &mut SceneGraph) -> Result<NodeId, BoxedError>;
}

/// A `Factory` backed by a closure, for when a whole type is overkill.
///
/// ```
/// use scenepool::{factory::{Factory, FnFactory}, scene::SceneGraph};
///
/// let mut factory =
///     FnFactory::new(|label: &String, scene: &mut SceneGraph| Ok(scene.spawn(label)));
/// factory.set_config("spark".to_string());
///
/// let mut scene = SceneGraph::new();
/// let id = factory.create_object(&mut scene).unwrap();
/// assert_eq!("spark", scene.node(id).unwrap().label());
/// ```
pub struct FnFactory<C, F> {
    config: Option<C>,
    build: F,
    marker: PhantomData<fn(&C)>,
}

impl<C, F> FnFactory<C, F>
where
    F: FnMut(&C, &mut SceneGraph) -> Result<NodeId, BoxedError>,
{
    #[inline]
    pub fn new(build: F) -> FnFactory<C, F> {
        FnFactory {
            config: None,
            build,
            marker: PhantomData,
        }
    }

    #[inline]
    pub fn config(&self) -> Option<&C> {
        self.config.as_ref()
    }
}

impl<C, F> Factory for FnFactory<C, F>
where
    C: 'static,
    F: FnMut(&C, &mut SceneGraph) -> Result<NodeId, BoxedError> + 'static,
{
    type Config = C;

    #[inline]
    fn set_config(&mut self, config: C) {
        self.config = Some(config);
    }

    fn create_object(&mut self, scene: &mut SceneGraph) -> Result<NodeId, BoxedError> {
        match &self.config {
            Some(config) => (self.build)(config, scene),
            None => Err("create_object called before set_config".into()),
        }
    }
}
