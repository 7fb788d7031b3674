//! Recycle scene objects instead of creating and destroying them every frame.
//!
//! An [`ObjectPool`](pool::ObjectPool) pre-creates a batch of objects through a
//! [`Factory`](factory::Factory), parks them inactive under a container node in the
//! [`SceneGraph`](scene::SceneGraph), and hands out inactive ones on request, creating
//! more only when every object is busy. [`PoolRegistry`](registry::PoolRegistry) keeps
//! one pool per factory type for the whole game.

pub mod collections;
pub mod config;
pub mod error;
pub mod factory;
pub mod pool;
pub mod registry;
pub mod scene;
pub mod util;

pub use config::{PoolConfig, RandomSelection};
pub use error::{PoolError, PoolResult};
pub use factory::{Factory, FnFactory};
pub use pool::ObjectPool;
pub use registry::PoolRegistry;
pub use scene::{NodeId, SceneGraph};
